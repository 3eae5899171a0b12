//! 区域视觉元素模块
//!
//! [`RegionElement`] 是区域在波形容器中的虚拟元素：语义标记（part）、
//! 背景色、位置、内容和调整手柄。它总是从 [`RegionData`] 整体渲染出来，
//! 所以一次修改中的多个字段会一起反映到元素上。

use crate::structure::{Content, RegionData};
use egui::{pos2, Rect};

/// 调整手柄所在的一侧
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandleSide {
    Start,
    End,
}

/// 元素内被指针命中的部位
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementPart {
    Body,
    Handle(HandleSide),
}

#[derive(Clone, Debug, PartialEq)]
pub enum ElementChild {
    Content(Content),
    Handle(HandleSide),
}

/// 元素位置，均为内容区域的比例（0.0 ~ 1.0）
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ElementLayout {
    pub left: f32,
    pub width: f32,
    pub top: f32,
    pub height: f32,
}

impl ElementLayout {
    fn compute(data: &RegionData, duration: f64, channels: usize) -> Self {
        let (left, width) = if duration > 0.0 {
            (
                (data.start / duration) as f32,
                ((data.end - data.start) / duration) as f32,
            )
        } else {
            (0.0, 0.0)
        };
        // 指定了通道时只占据该通道的泳道
        let (top, height) = match data.channel_idx {
            Some(idx) if channels > 0 && idx < channels => {
                let lane = 1.0 / channels as f32;
                (idx as f32 * lane, lane)
            }
            _ => (0.0, 1.0),
        };
        Self {
            left,
            width,
            top,
            height,
        }
    }

    /// 映射到给定的内容矩形
    pub fn rect_in(&self, content: Rect) -> Rect {
        let min = pos2(
            content.min.x + self.left * content.width(),
            content.min.y + self.top * content.height(),
        );
        let max = pos2(
            min.x + self.width * content.width(),
            min.y + self.height * content.height(),
        );
        Rect::from_min_max(min, max)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RegionElement {
    part: String,
    background: Option<String>,
    layout: ElementLayout,
    children: Vec<ElementChild>,
}

impl RegionElement {
    pub fn render(data: &RegionData, duration: f64, channels: usize) -> Self {
        let marker = data.is_marker();
        let part = format!("{} {}", if marker { "marker" } else { "region" }, data.id);

        let mut children = Vec::with_capacity(3);
        if let Some(content) = &data.content {
            children.push(ElementChild::Content(content.clone()));
        }
        if data.resize && !marker {
            children.push(ElementChild::Handle(HandleSide::Start));
            children.push(ElementChild::Handle(HandleSide::End));
        }

        Self {
            part,
            background: if marker { None } else { Some(data.color.clone()) },
            layout: ElementLayout::compute(data, duration, channels),
            children,
        }
    }

    /// 形如 `"region my-id"` 或 `"marker my-id"`
    pub fn part(&self) -> &str {
        &self.part
    }

    pub fn is_marker(&self) -> bool {
        self.part.starts_with("marker ")
    }

    pub fn background(&self) -> Option<&str> {
        self.background.as_deref()
    }

    pub fn layout(&self) -> ElementLayout {
        self.layout
    }

    pub fn children(&self) -> &[ElementChild] {
        &self.children
    }

    pub fn content(&self) -> Option<&Content> {
        self.children.iter().find_map(|child| match child {
            ElementChild::Content(content) => Some(content),
            ElementChild::Handle(_) => None,
        })
    }

    pub fn handle_count(&self) -> usize {
        self.children
            .iter()
            .filter(|child| matches!(child, ElementChild::Handle(_)))
            .count()
    }

    pub fn has_handle(&self, side: HandleSide) -> bool {
        self.children.contains(&ElementChild::Handle(side))
    }

    /// 元素的全部文本（手柄不含文本）
    pub fn text_content(&self) -> String {
        self.content().map(Content::text_content).unwrap_or_default()
    }
}

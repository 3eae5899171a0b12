use crate::element::{ElementChild, HandleSide, RegionElement};
use crate::plugin::RegionsPluginOptions;
use crate::utils::parse_css_color;
use egui::*;

/// 绘制样式
#[derive(Clone, Debug)]
pub struct RegionStyle {
    pub handle_width: f32,
    pub marker_width: f32,
    pub fallback_fill: Color32,
    pub marker_color: Color32,
    pub handle_color: Color32,
    pub text_color: Color32,
}

impl RegionStyle {
    /// 手柄和标记线宽度取自插件选项，与命中测试保持一致
    pub fn with_options(self, options: &RegionsPluginOptions) -> Self {
        Self {
            handle_width: options.handle_width,
            marker_width: options.marker_width,
            ..self
        }
    }
}

impl Default for RegionStyle {
    fn default() -> Self {
        let options = RegionsPluginOptions::default();
        Self {
            handle_width: options.handle_width,
            marker_width: options.marker_width,
            fallback_fill: Color32::from_rgba_unmultiplied(0, 0, 0, 26),
            marker_color: Color32::from_rgb(100, 200, 255),
            handle_color: Color32::from_rgba_unmultiplied(0, 0, 0, 128),
            text_color: Color32::WHITE,
        }
    }
}

/// 绘制虚线垂直线的工具函数
pub fn draw_dashed_vertical_line(painter: &Painter, x: f32, top: f32, bottom: f32, stroke: Stroke) {
    let dash_len = 2.0;
    let gap_len = 2.0;
    let mut y = top;
    while y < bottom {
        let next = (y + dash_len).min(bottom);
        painter.line_segment([Pos2::new(x, y), Pos2::new(x, next)], stroke);
        y += dash_len + gap_len;
    }
}

/// 绘制一个区域元素；`content_rect` 是整个（已滚动的）内容区域的全局坐标
pub fn draw_region(painter: &Painter, element: &RegionElement, content_rect: Rect, style: &RegionStyle) {
    let rect = element.layout().rect_in(content_rect);

    if element.is_marker() {
        // 标记：一条竖线，内容显示在线的右侧
        draw_dashed_vertical_line(
            painter,
            rect.min.x,
            rect.min.y,
            rect.max.y,
            Stroke::new(style.marker_width, style.marker_color),
        );
        draw_content(painter, element, Pos2::new(rect.min.x + style.marker_width + 2.0, rect.min.y + 2.0), style);
        return;
    }

    let fill = element
        .background()
        .and_then(parse_css_color)
        .unwrap_or(style.fallback_fill);
    painter.rect_filled(rect, 0.0, fill);

    for child in element.children() {
        if let ElementChild::Handle(side) = child {
            let x = match side {
                HandleSide::Start => rect.min.x,
                HandleSide::End => rect.max.x - style.handle_width,
            };
            let handle = Rect::from_min_size(Pos2::new(x, rect.min.y), Vec2::new(style.handle_width, rect.height()));
            painter.rect_filled(handle.shrink2(Vec2::new(style.handle_width / 3.0, 0.0)), 0.0, style.handle_color);
        }
    }

    draw_content(painter, element, rect.min + Vec2::new(style.handle_width, 2.0), style);
}

fn draw_content(painter: &Painter, element: &RegionElement, pos: Pos2, style: &RegionStyle) {
    let text = element.text_content();
    if text.is_empty() {
        return;
    }
    painter.text(pos, Align2::LEFT_TOP, text, FontId::proportional(12.0), style.text_color);
}

/// 绘制播放头
pub fn draw_playhead(painter: &Painter, x: f32, top: f32, bottom: f32) {
    painter.line_segment(
        [Pos2::new(x, top), Pos2::new(x, bottom)],
        Stroke::new(2.0, Color32::from_rgba_premultiplied(100, 200, 255, 128)),
    );
}

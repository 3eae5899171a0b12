//! 指针输入模块
//!
//! 宿主把底层指针事件（按下/移动/抬起/单击/双击）交给插件处理，
//! 插件通过 [`Propagation`] 告诉宿主是否还应执行自己的默认行为（如点击定位）。

use crate::element::ElementPart;
use crate::structure::RegionKey;
use egui::Pos2;
use std::cell::Cell;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
    Click,
    DoubleClick,
}

/// 指针落点
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitTarget {
    Region { key: RegionKey, part: ElementPart },
    /// 容器内没有区域的空白处
    Background,
    Outside,
}

/// 插件处理完事件后，宿主是否应继续执行默认行为
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Propagation {
    Continue,
    Stop,
}

/// 一次指针事件
///
/// 克隆共享同一个传播标志：任何监听器调用
/// [`stop_propagation`](Self::stop_propagation) 都会影响宿主看到的结果。
#[derive(Clone, Debug)]
pub struct PointerEvent {
    kind: PointerKind,
    pos: Pos2,
    pointer_id: u64,
    target: Option<HitTarget>,
    stopped: Rc<Cell<bool>>,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, pos: Pos2) -> Self {
        Self {
            kind,
            pos,
            pointer_id: 0,
            target: None,
            stopped: Rc::new(Cell::new(false)),
        }
    }

    pub fn down(pos: Pos2) -> Self {
        Self::new(PointerKind::Down, pos)
    }

    pub fn moved(pos: Pos2) -> Self {
        Self::new(PointerKind::Move, pos)
    }

    pub fn up(pos: Pos2) -> Self {
        Self::new(PointerKind::Up, pos)
    }

    pub fn click(pos: Pos2) -> Self {
        Self::new(PointerKind::Click, pos)
    }

    pub fn double_click(pos: Pos2) -> Self {
        Self::new(PointerKind::DoubleClick, pos)
    }

    pub fn with_pointer_id(mut self, pointer_id: u64) -> Self {
        self.pointer_id = pointer_id;
        self
    }

    /// 直接指定落点，跳过命中测试（相当于在某个元素上派发事件）
    pub fn with_target(mut self, target: HitTarget) -> Self {
        self.target = Some(target);
        self
    }

    pub fn kind(&self) -> PointerKind {
        self.kind
    }

    /// 全局坐标
    pub fn pos(&self) -> Pos2 {
        self.pos
    }

    pub fn pointer_id(&self) -> u64 {
        self.pointer_id
    }

    pub fn target(&self) -> Option<HitTarget> {
        self.target
    }

    pub fn stop_propagation(&self) {
        self.stopped.set(true);
    }

    pub fn propagation(&self) -> Propagation {
        if self.stopped.get() {
            Propagation::Stop
        } else {
            Propagation::Continue
        }
    }
}

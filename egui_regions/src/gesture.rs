//! 拖拽手势模块
//!
//! 把 按下 → 移动 → 抬起 的指针序列解释为创建、移动、调整起点或终点。
//!
//! 状态机只有三个状态：`Idle`、`Pending`（已按下，尚未超过拖拽阈值）和
//! `Dragging`。对全局指针流的订阅只在状态转换时获取和释放：
//! 每个进行中的手势持有一个 [`GlobalPointerGuard`]，手势结束或被中止时
//! guard 随状态一起被丢弃，不会遗留监听器。

use crate::element::HandleSide;
use crate::geometry::clamp_time;
use egui::{Pos2, Vec2};
use std::cell::Cell;
use std::rc::Rc;

/// 手势的语义类型
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragKind {
    Create,
    Move,
    ResizeStart,
    ResizeEnd,
}

/// 全局（document 级）指针监听器的计数
#[derive(Clone, Debug, Default)]
pub struct DocumentListeners {
    active: Rc<Cell<usize>>,
}

impl DocumentListeners {
    pub fn acquire(&self) -> GlobalPointerGuard {
        self.active.set(self.active.get() + 1);
        GlobalPointerGuard {
            active: self.active.clone(),
        }
    }

    pub fn active(&self) -> usize {
        self.active.get()
    }
}

/// 手势期间对全局指针移动/抬起事件的订阅，drop 时释放
#[derive(Debug)]
pub struct GlobalPointerGuard {
    active: Rc<Cell<usize>>,
}

impl Drop for GlobalPointerGuard {
    fn drop(&mut self) {
        self.active.set(self.active.get().saturating_sub(1));
    }
}

struct Gesture<T> {
    target: T,
    pointer_id: u64,
    origin: Pos2,
    _listeners: GlobalPointerGuard,
}

enum GestureState<T> {
    Idle,
    Pending(Gesture<T>),
    Dragging(Gesture<T>),
}

/// 一次移动的结果
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureStep {
    /// 这次移动刚好越过拖拽阈值
    pub promoted: bool,
    /// 相对按下位置的累计位移
    pub delta: Vec2,
}

/// 手势结束时的结果
#[derive(Debug)]
pub struct GestureEnd<T> {
    pub target: T,
    /// 是否曾越过阈值；否则应当作普通点击处理
    pub dragged: bool,
    pub delta: Vec2,
}

pub struct GestureController<T> {
    threshold: f32,
    listeners: DocumentListeners,
    state: GestureState<T>,
}

impl<T> GestureController<T> {
    pub fn new(threshold: f32, listeners: DocumentListeners) -> Self {
        Self {
            threshold,
            listeners,
            state: GestureState::Idle,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, GestureState::Idle)
    }

    /// 开始一个手势；已有手势进行中时忽略并返回 `false`
    pub fn begin(&mut self, target: T, pointer_id: u64, origin: Pos2) -> bool {
        if !self.is_idle() {
            return false;
        }
        self.state = GestureState::Pending(Gesture {
            target,
            pointer_id,
            origin,
            _listeners: self.listeners.acquire(),
        });
        true
    }

    pub fn target(&self) -> Option<&T> {
        match &self.state {
            GestureState::Idle => None,
            GestureState::Pending(g) | GestureState::Dragging(g) => Some(&g.target),
        }
    }

    pub fn target_mut(&mut self) -> Option<&mut T> {
        match &mut self.state {
            GestureState::Idle => None,
            GestureState::Pending(g) | GestureState::Dragging(g) => Some(&mut g.target),
        }
    }

    /// 处理全局指针移动；低于阈值或不属于当前手势时返回 `None`
    pub fn on_move(&mut self, pointer_id: u64, pos: Pos2) -> Option<GestureStep> {
        let state = std::mem::replace(&mut self.state, GestureState::Idle);
        let (state, step) = match state {
            GestureState::Pending(g) if g.pointer_id == pointer_id => {
                let delta = pos - g.origin;
                if delta.x.abs() >= self.threshold || delta.y.abs() >= self.threshold {
                    (
                        GestureState::Dragging(g),
                        Some(GestureStep {
                            promoted: true,
                            delta,
                        }),
                    )
                } else {
                    (GestureState::Pending(g), None)
                }
            }
            GestureState::Dragging(g) if g.pointer_id == pointer_id => {
                let delta = pos - g.origin;
                (
                    GestureState::Dragging(g),
                    Some(GestureStep {
                        promoted: false,
                        delta,
                    }),
                )
            }
            other => (other, None),
        };
        self.state = state;
        step
    }

    /// 处理全局指针抬起，结束手势
    pub fn on_up(&mut self, pointer_id: u64, pos: Pos2) -> Option<GestureEnd<T>> {
        let state = std::mem::replace(&mut self.state, GestureState::Idle);
        match state {
            GestureState::Pending(g) if g.pointer_id == pointer_id => Some(GestureEnd {
                delta: pos - g.origin,
                target: g.target,
                dragged: false,
            }),
            GestureState::Dragging(g) if g.pointer_id == pointer_id => Some(GestureEnd {
                delta: pos - g.origin,
                target: g.target,
                dragged: true,
            }),
            other => {
                self.state = other;
                None
            }
        }
    }

    /// 中止当前手势，返回它的目标
    pub fn abort(&mut self) -> Option<T> {
        match std::mem::replace(&mut self.state, GestureState::Idle) {
            GestureState::Idle => None,
            GestureState::Pending(g) | GestureState::Dragging(g) => Some(g.target),
        }
    }

    /// 仅当目标满足条件时中止
    pub fn abort_if(&mut self, pred: impl FnOnce(&T) -> bool) -> Option<T> {
        if self.target().map_or(false, pred) {
            self.abort()
        } else {
            None
        }
    }
}

/// 拖拽计算出的新区间
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragSpan {
    pub start: f64,
    pub end: f64,
    /// 正在被拖动的一端；移动整个区域时为 `None`
    pub side: Option<HandleSide>,
}

/// 由手势开始时的区间 `anchor` 和累计时间增量 `dt` 计算新区间
///
/// 调整一端越过另一端时两端互换角色，结果总是满足 `start <= end`。
pub fn drag_span(kind: DragKind, anchor: (f64, f64), dt: f64, duration: f64) -> DragSpan {
    let (start, end) = anchor;
    match kind {
        DragKind::Move => {
            let mut dt = dt.max(-start);
            if duration > 0.0 {
                dt = dt.min(duration - end);
            }
            DragSpan {
                start: start + dt,
                end: end + dt,
                side: None,
            }
        }
        DragKind::ResizeStart => {
            let moved = clamp_time(start + dt, duration);
            if moved <= end {
                DragSpan {
                    start: moved,
                    end,
                    side: Some(HandleSide::Start),
                }
            } else {
                DragSpan {
                    start: end,
                    end: moved,
                    side: Some(HandleSide::End),
                }
            }
        }
        DragKind::ResizeEnd | DragKind::Create => {
            let moved = clamp_time(end + dt, duration);
            if moved >= start {
                DragSpan {
                    start,
                    end: moved,
                    side: Some(HandleSide::End),
                }
            } else {
                DragSpan {
                    start: moved,
                    end: start,
                    side: Some(HandleSide::Start),
                }
            }
        }
    }
}

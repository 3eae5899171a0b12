//! 事件模块
//!
//! 定义了插件级事件（宿主监听）和区域级事件（单个区域监听）。

use crate::bus::BusEvent;
use crate::element::HandleSide;
use crate::pointer::PointerEvent;
use crate::region::Region;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegionEventKind {
    Created,
    Update,
    Updated,
    Removed,
    Initialized,
    Clicked,
    DoubleClicked,
    In,
    Out,
}

impl RegionEventKind {
    pub fn name(self) -> &'static str {
        match self {
            RegionEventKind::Created => "region-created",
            RegionEventKind::Update => "region-update",
            RegionEventKind::Updated => "region-updated",
            RegionEventKind::Removed => "region-removed",
            RegionEventKind::Initialized => "region-initialized",
            RegionEventKind::Clicked => "region-clicked",
            RegionEventKind::DoubleClicked => "region-double-clicked",
            RegionEventKind::In => "region-in",
            RegionEventKind::Out => "region-out",
        }
    }
}

/// 插件向外部监听器广播的事件
#[derive(Clone, Debug)]
pub enum RegionEvent {
    /// 区域已加入集合
    Created(Region),
    /// 拖拽过程中的临时几何变化
    Update(Region, Option<HandleSide>),
    /// 已提交的修改（拖拽结束或 `set_options`）
    Updated(Region),
    Removed(Region),
    /// 拖拽创建越过阈值，区域尚未加入集合
    Initialized(Region),
    Clicked(Region, PointerEvent),
    DoubleClicked(Region, PointerEvent),
    /// 播放位置进入区域
    In(Region),
    /// 播放位置离开区域
    Out(Region),
}

impl RegionEvent {
    pub fn region(&self) -> &Region {
        match self {
            RegionEvent::Created(r)
            | RegionEvent::Update(r, _)
            | RegionEvent::Updated(r)
            | RegionEvent::Removed(r)
            | RegionEvent::Initialized(r)
            | RegionEvent::Clicked(r, _)
            | RegionEvent::DoubleClicked(r, _)
            | RegionEvent::In(r)
            | RegionEvent::Out(r) => r,
        }
    }
}

impl BusEvent for RegionEvent {
    type Kind = RegionEventKind;

    fn kind(&self) -> RegionEventKind {
        match self {
            RegionEvent::Created(_) => RegionEventKind::Created,
            RegionEvent::Update(..) => RegionEventKind::Update,
            RegionEvent::Updated(_) => RegionEventKind::Updated,
            RegionEvent::Removed(_) => RegionEventKind::Removed,
            RegionEvent::Initialized(_) => RegionEventKind::Initialized,
            RegionEvent::Clicked(..) => RegionEventKind::Clicked,
            RegionEvent::DoubleClicked(..) => RegionEventKind::DoubleClicked,
            RegionEvent::In(_) => RegionEventKind::In,
            RegionEvent::Out(_) => RegionEventKind::Out,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegionLocalEventKind {
    Click,
    DoubleClick,
    Update,
    UpdateEnd,
    Remove,
    Play,
}

/// 单个区域自己的事件
#[derive(Clone, Debug)]
pub enum RegionLocalEvent {
    Click(PointerEvent),
    DoubleClick(PointerEvent),
    Update(Option<HandleSide>),
    UpdateEnd,
    Remove,
    Play(Option<f64>),
}

impl BusEvent for RegionLocalEvent {
    type Kind = RegionLocalEventKind;

    fn kind(&self) -> RegionLocalEventKind {
        match self {
            RegionLocalEvent::Click(_) => RegionLocalEventKind::Click,
            RegionLocalEvent::DoubleClick(_) => RegionLocalEventKind::DoubleClick,
            RegionLocalEvent::Update(_) => RegionLocalEventKind::Update,
            RegionLocalEvent::UpdateEnd => RegionLocalEventKind::UpdateEnd,
            RegionLocalEvent::Remove => RegionLocalEventKind::Remove,
            RegionLocalEvent::Play(_) => RegionLocalEventKind::Play,
        }
    }
}

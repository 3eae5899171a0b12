//! # egui_regions
//!
//! 波形上的区域（region）与标记（marker）编辑组件库。
//!
//! ## 功能特性
//!
//! - **区域管理**：创建、查询、修改、移除区域和标记（起点等于终点的区域）
//! - **拖拽编辑**：移动区域、拖动两端手柄调整大小、在空白处拖拽创建新区域
//! - **事件通知**：`region-created`、`region-updated`、`region-clicked` 等生命周期事件
//! - **播放联动**：从区域起点播放，播放头进入/离开区域时发出通知
//! - **多通道**：区域可以限定在某一个通道的泳道内
//!
//! ## 基本使用
//!
//! ```rust
//! use egui::{pos2, vec2, Rect};
//! use egui_regions::{
//!     RegionEvent, RegionEventKind, RegionParams, RegionsPlugin, RegionsPluginOptions,
//!     StaticWaveform,
//! };
//! use std::{cell::RefCell, rc::Rc};
//!
//! let host = Rc::new(RefCell::new(StaticWaveform::new(
//!     20.0,
//!     Rect::from_min_size(pos2(0.0, 0.0), vec2(400.0, 200.0)),
//! )));
//! let plugin = RegionsPlugin::new(host, RegionsPluginOptions::default());
//!
//! plugin.on(RegionEventKind::Created, |event: &RegionEvent| {
//!     println!("created {}", event.region().id());
//! });
//!
//! let region = plugin.add_region(RegionParams::span(3.0, 8.0).with_color("rgba(255, 0, 0, 0.3)"));
//! region.set_content("Verse");
//! assert_eq!(region.element().unwrap().text_content(), "Verse");
//! ```
//!
//! ## 集成到宿主应用
//!
//! 宿主实现 [`WaveformHost`]，每帧调用 [`RegionsView::ui`] 绘制并转发指针输入，
//! 再调用 [`RegionsPlugin::sync_playback`] 更新进入/离开状态：
//!
//! ```rust,ignore
//! let out = view.ui(ui, &plugin, waveform_rect);
//! if let Some(time) = out.seek {
//!     host.borrow_mut().set_time(time);
//! }
//! plugin.sync_playback();
//! ```

pub mod bus;
pub mod editor;
pub mod element;
pub mod geometry;
pub mod gesture;
pub mod host;
pub mod plugin;
pub mod pointer;
pub mod region;
pub mod structure;
pub mod ui;
pub mod utils;
pub mod validate;

pub use bus::{BusEvent, EventBus, ListenerId};
pub use editor::{RegionEvent, RegionEventKind, RegionLocalEvent, RegionLocalEventKind};
pub use element::{ElementChild, ElementLayout, ElementPart, HandleSide, RegionElement};
pub use geometry::{TimeScale, Viewport};
pub use gesture::{DocumentListeners, DragKind, GestureController};
pub use host::{StaticWaveform, WaveformHost};
pub use plugin::{DragSelectionHandle, RegionsPlugin, RegionsPluginOptions};
pub use pointer::{HitTarget, PointerEvent, PointerKind, Propagation};
pub use region::Region;
pub use structure::{Content, ContentNode, RegionData, RegionKey, RegionParams, DEFAULT_REGION_COLOR};
pub use ui::{
    draw_playhead, draw_region, RegionStyle, RegionsView, RegionsViewResponse, StatusBar, Toolbar,
    ToolbarAction,
};
pub use validate::{sanitize, Limits, OptionIssue};

//! 区域集合管理模块
//!
//! [`RegionsPlugin`] 拥有一个波形实例上的全部区域：分配 id、维护不变量、
//! 提供增删查接口、解释指针手势并把生命周期事件转发给外部监听器。
//!
//! 一切都运行在 UI 线程上。监听器被调用时插件不持有任何内部借用，
//! 所以监听器看到的总是已经提交的状态，并且可以再次调用插件。

use crate::bus::{EventBus, ListenerId};
use crate::editor::{RegionEvent, RegionEventKind, RegionLocalEvent};
use crate::element::{ElementPart, HandleSide};
use crate::geometry::TimeScale;
use crate::gesture::{drag_span, DocumentListeners, DragKind, DragSpan, GestureController};
use crate::host::WaveformHost;
use crate::pointer::{HitTarget, PointerEvent, PointerKind, Propagation};
use crate::region::Region;
use crate::structure::{
    generate_region_id, RegionData, RegionKey, RegionParams, DEFAULT_REGION_COLOR,
};
use crate::validate::{sanitize, Limits};
use egui::{pos2, Pos2, Rect};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegionsPluginOptions {
    /// 单击与拖拽的分界（像素，任一方向）
    pub drag_threshold: f32,
    pub handle_width: f32,
    pub marker_width: f32,
    /// 标记在其时间点之后多长时间内仍算作“播放中”（秒）
    pub marker_tolerance: f64,
    pub default_color: String,
    /// 同时把插件事件排队，供 `take_events` 轮询
    pub queue_events: bool,
}

impl Default for RegionsPluginOptions {
    fn default() -> Self {
        Self {
            drag_threshold: 3.0,
            handle_width: 6.0,
            marker_width: 2.0,
            marker_tolerance: 0.05,
            default_color: DEFAULT_REGION_COLOR.to_string(),
            queue_events: false,
        }
    }
}

struct DragSelection {
    params: RegionParams,
    generation: u64,
}

enum GestureTarget {
    Region {
        region: Region,
        kind: DragKind,
        anchor: (f64, f64),
    },
    Create {
        params: RegionParams,
        generation: u64,
        anchor_time: f64,
        /// 越过阈值后才创建，结束时才加入集合
        region: Option<Region>,
    },
}

enum MoveAction {
    Update {
        region: Region,
        span: DragSpan,
    },
    Initialized(Region),
    Grow {
        region: Region,
        span: DragSpan,
    },
}

pub(crate) struct PluginShared {
    options: RegionsPluginOptions,
    host: Rc<RefCell<dyn WaveformHost>>,
    regions: RefCell<Vec<Region>>,
    events: EventBus<RegionEvent>,
    listeners: DocumentListeners,
    gesture: RefCell<GestureController<GestureTarget>>,
    selection: RefCell<Option<DragSelection>>,
    selection_generation: Cell<u64>,
    active: RefCell<Vec<RegionKey>>,
    suppress_click: Cell<bool>,
    destroyed: Cell<bool>,
}

impl PluginShared {
    pub(crate) fn limits(&self) -> Limits {
        let host = self.host.borrow();
        Limits {
            duration: host.duration(),
            channels: host.channel_count(),
        }
    }

    fn time_scale(&self) -> TimeScale {
        self.host.borrow().time_scale()
    }

    fn to_container(&self, pos: Pos2) -> Pos2 {
        self.host.borrow().to_container(pos)
    }

    pub(crate) fn id_taken(&self, id: &str, except: RegionKey) -> bool {
        self.regions
            .borrow()
            .iter()
            .any(|r| r.key() != except && r.id() == id)
    }

    pub(crate) fn contains(&self, key: RegionKey) -> bool {
        self.regions.borrow().iter().any(|r| r.key() == key)
    }

    pub(crate) fn emit(&self, event: RegionEvent) {
        self.events.emit(event);
    }

    pub(crate) fn play(&self, start: f64, end: Option<f64>) {
        self.host.borrow_mut().play(start, end);
    }

    fn find(&self, key: RegionKey) -> Option<Region> {
        self.regions.borrow().iter().find(|r| r.key() == key).cloned()
    }

    fn find_by_id(&self, id: &str) -> Option<Region> {
        self.regions.borrow().iter().find(|r| r.id() == id).cloned()
    }

    fn unique_id(&self) -> String {
        loop {
            let id = generate_region_id();
            if self.find_by_id(&id).is_none() {
                return id;
            }
        }
    }

    fn snapshot(&self) -> Vec<Region> {
        self.regions.borrow().clone()
    }

    fn build_region(self: &Rc<Self>, params: &RegionParams) -> Region {
        let id = match &params.id {
            Some(id) if self.find_by_id(id).is_none() => id.clone(),
            _ => self.unique_id(),
        };
        let limits = self.limits();
        let base = RegionData::new(id.clone(), self.options.default_color.clone());
        let params = RegionParams {
            id: None,
            ..params.clone()
        };
        let (data, issues) = sanitize(&base, &params, limits, |_| false);
        for issue in &issues {
            log::warn!("region `{}`: {}", id, issue);
        }
        Region::new(data, limits, Rc::downgrade(self))
    }

    fn insert(&self, region: Region) {
        self.regions.borrow_mut().push(region.clone());
        log::debug!("region `{}` created [{}, {}]", region.id(), region.start(), region.end());
        self.emit(RegionEvent::Created(region));
    }

    fn add_region(self: &Rc<Self>, params: RegionParams) -> Region {
        if let Some(existing) = params.id.as_deref().and_then(|id| self.find_by_id(id)) {
            log::debug!("replacing region `{}`", existing.id());
            existing.remove();
        }
        let params = RegionParams {
            end: params.end.or(params.start),
            ..params
        };
        let region = self.build_region(&params);
        if self.destroyed.get() {
            log::warn!("add_region called after destroy; region `{}` is detached", region.id());
            region.detach_element();
            return region;
        }
        self.insert(region.clone());
        region
    }

    /// 从集合中移除并通知；由 `Region::remove` 调用
    pub(crate) fn detach(&self, region: &Region) {
        if !region.detach_element() {
            return;
        }
        let key = region.key();
        self.abort_gesture_for(key);

        let was_member = {
            let mut regions = self.regions.borrow_mut();
            let before = regions.len();
            regions.retain(|r| r.key() != key);
            regions.len() != before
        };
        self.active.borrow_mut().retain(|k| *k != key);

        log::debug!("region `{}` removed", region.id());
        region.emit_local(RegionLocalEvent::Remove);
        if was_member {
            self.emit(RegionEvent::Removed(region.clone()));
        }
    }

    fn abort_gesture_for(&self, key: RegionKey) {
        let aborted = self.gesture.borrow_mut().abort_if(|target| match target {
            GestureTarget::Region { region, .. } => region.key() == key,
            GestureTarget::Create {
                region: Some(region),
                ..
            } => region.key() == key,
            GestureTarget::Create { region: None, .. } => false,
        });
        if aborted.is_some() {
            log::debug!("gesture aborted: its region was removed");
        }
    }

    /// 中止进行中的拖拽创建；临时区域没有进入集合，因此不发任何通知
    fn abort_creation(&self, generation: Option<u64>) {
        let aborted = self.gesture.borrow_mut().abort_if(|target| match target {
            GestureTarget::Create { generation: g, .. } => generation.map_or(true, |want| *g == want),
            GestureTarget::Region { .. } => false,
        });
        if let Some(GestureTarget::Create { region, .. }) = aborted {
            if let Some(region) = region {
                region.detach_element();
            }
            log::debug!("drag selection aborted");
        }
    }

    fn clear_regions(&self) {
        self.abort_creation(None);
        for region in self.snapshot() {
            region.remove();
        }
    }

    fn enable_drag_selection(self: &Rc<Self>, params: RegionParams) -> DragSelectionHandle {
        let generation = self.selection_generation.get() + 1;
        self.selection_generation.set(generation);
        if let Some(previous) = self.selection.borrow_mut().replace(DragSelection { params, generation }) {
            self.abort_creation(Some(previous.generation));
        }
        log::debug!("drag selection enabled");
        DragSelectionHandle {
            plugin: Rc::downgrade(self),
            generation,
        }
    }

    fn disable_drag_selection(&self, generation: u64) {
        let disabled = {
            let mut selection = self.selection.borrow_mut();
            match selection.as_ref() {
                Some(current) if current.generation == generation => selection.take().is_some(),
                _ => false,
            }
        };
        if disabled {
            self.abort_creation(Some(generation));
            log::debug!("drag selection disabled");
        }
    }

    fn is_selection_active(&self, generation: u64) -> bool {
        self.selection
            .borrow()
            .as_ref()
            .map_or(false, |s| s.generation == generation)
    }

    fn pending_region(&self) -> Option<Region> {
        match self.gesture.borrow().target() {
            Some(GestureTarget::Create { region, .. }) => region.clone(),
            _ => None,
        }
    }

    fn hit_test(&self, pos: Pos2) -> HitTarget {
        let viewport = self.host.borrow().viewport();
        if pos.x < 0.0 || pos.y < 0.0 || pos.x > viewport.width || pos.y > viewport.height {
            return HitTarget::Outside;
        }
        let content = viewport.content_rect();
        let handle = self.options.handle_width;

        // 后插入的区域在上层，优先命中
        for region in self.snapshot().iter().rev() {
            let Some(element) = region.element() else {
                continue;
            };
            let rect = element.layout().rect_in(content);
            if element.is_marker() {
                let zone = Rect::from_min_max(
                    pos2(rect.min.x - handle / 2.0, rect.min.y),
                    pos2(rect.min.x + self.options.marker_width + handle / 2.0, rect.max.y),
                );
                if zone.contains(pos) {
                    return HitTarget::Region {
                        key: region.key(),
                        part: ElementPart::Body,
                    };
                }
                continue;
            }
            if !rect.contains(pos) {
                continue;
            }
            let part = if element.has_handle(HandleSide::Start) && pos.x - rect.min.x < handle {
                ElementPart::Handle(HandleSide::Start)
            } else if element.has_handle(HandleSide::End) && rect.max.x - pos.x < handle {
                ElementPart::Handle(HandleSide::End)
            } else {
                ElementPart::Body
            };
            return HitTarget::Region {
                key: region.key(),
                part,
            };
        }
        HitTarget::Background
    }

    fn handle_pointer(self: &Rc<Self>, event: &PointerEvent) -> Propagation {
        if self.destroyed.get() {
            return Propagation::Continue;
        }
        match event.kind() {
            PointerKind::Down => self.on_pointer_down(event),
            PointerKind::Move => self.on_pointer_move(event),
            PointerKind::Up => self.on_pointer_up(event),
            PointerKind::Click => self.on_click(event, false),
            PointerKind::DoubleClick => self.on_click(event, true),
        }
        event.propagation()
    }

    fn on_pointer_down(&self, event: &PointerEvent) {
        self.suppress_click.set(false);
        if !self.gesture.borrow().is_idle() {
            log::debug!("pointer down ignored: a gesture is already in progress");
            return;
        }

        let pos = self.to_container(event.pos());
        let target = event.target().unwrap_or_else(|| self.hit_test(pos));
        match target {
            HitTarget::Region { key, part } => {
                let Some(region) = self.find(key) else {
                    return;
                };
                let data = region.data();
                let resizable = data.resize && !data.is_marker();
                let kind = match part {
                    ElementPart::Body if data.drag => Some(DragKind::Move),
                    ElementPart::Handle(HandleSide::Start) if resizable => Some(DragKind::ResizeStart),
                    ElementPart::Handle(HandleSide::End) if resizable => Some(DragKind::ResizeEnd),
                    _ => None,
                };
                if let Some(kind) = kind {
                    let target = GestureTarget::Region {
                        region,
                        kind,
                        anchor: (data.start, data.end),
                    };
                    if self.gesture.borrow_mut().begin(target, event.pointer_id(), pos) {
                        log::debug!("{:?} gesture armed on region `{}`", kind, data.id);
                    }
                    event.stop_propagation();
                }
            }
            HitTarget::Background => {
                let selection = self
                    .selection
                    .borrow()
                    .as_ref()
                    .map(|s| (s.params.clone(), s.generation));
                if let Some((params, generation)) = selection {
                    let anchor_time = self.time_scale().x_to_time(pos.x);
                    let target = GestureTarget::Create {
                        params,
                        generation,
                        anchor_time,
                        region: None,
                    };
                    if self.gesture.borrow_mut().begin(target, event.pointer_id(), pos) {
                        log::debug!("drag selection armed at {:.3}s", anchor_time);
                    }
                }
            }
            HitTarget::Outside => {}
        }
    }

    fn on_pointer_move(self: &Rc<Self>, event: &PointerEvent) {
        let pos = self.to_container(event.pos());
        let scale = self.time_scale();

        let action = {
            let mut gesture = self.gesture.borrow_mut();
            let Some(step) = gesture.on_move(event.pointer_id(), pos) else {
                return;
            };
            let dt = scale.dx_to_dt(step.delta.x);
            let action = match gesture.target_mut() {
                Some(GestureTarget::Region { region, kind, anchor }) => {
                    if region.is_removed() {
                        None
                    } else {
                        Some(MoveAction::Update {
                            region: region.clone(),
                            span: drag_span(*kind, *anchor, dt, scale.duration),
                        })
                    }
                }
                Some(GestureTarget::Create {
                    params,
                    anchor_time,
                    region,
                    ..
                }) => {
                    let span = drag_span(DragKind::Create, (*anchor_time, *anchor_time), dt, scale.duration);
                    match region.clone() {
                        Some(region) if region.is_removed() => None,
                        Some(region) => Some(MoveAction::Grow { region, span }),
                        None => {
                            let created = self.build_region(&RegionParams {
                                start: Some(span.start),
                                end: Some(span.end),
                                ..params.clone()
                            });
                            *region = Some(created.clone());
                            Some(MoveAction::Initialized(created))
                        }
                    }
                }
                None => None,
            };
            if action.is_none() {
                gesture.abort();
                log::debug!("gesture aborted: its region disappeared");
                return;
            }
            if step.promoted {
                log::debug!("gesture promoted to drag");
            }
            action
        };

        let limits = self.limits();
        match action {
            Some(MoveAction::Update { region, span }) => {
                event.stop_propagation();
                if !region.data().length_allowed(span.end - span.start) {
                    log::trace!("drag step rejected by length limits");
                    return;
                }
                if region.start() == span.start && region.end() == span.end {
                    return;
                }
                region.set_span(span.start, span.end, limits);
                region.emit_local(RegionLocalEvent::Update(span.side));
                if self.contains(region.key()) {
                    self.emit(RegionEvent::Update(region, span.side));
                }
            }
            Some(MoveAction::Initialized(region)) => {
                event.stop_propagation();
                self.emit(RegionEvent::Initialized(region));
            }
            Some(MoveAction::Grow { region, span }) => {
                event.stop_propagation();
                region.set_span(span.start, span.end, limits);
            }
            None => {}
        }
    }

    fn on_pointer_up(&self, event: &PointerEvent) {
        let pos = self.to_container(event.pos());
        let Some(end) = self.gesture.borrow_mut().on_up(event.pointer_id(), pos) else {
            return;
        };
        if !end.dragged {
            // 保持为普通点击，由随后的 Click 事件处理
            return;
        }
        // 拖拽结束后的那次点击不应让宿主定位播放
        self.suppress_click.set(true);
        event.stop_propagation();

        let scale = self.time_scale();
        let limits = self.limits();
        let dt = scale.dx_to_dt(end.delta.x);
        match end.target {
            GestureTarget::Region {
                region,
                kind,
                anchor,
            } => {
                if region.is_removed() {
                    return;
                }
                let span = drag_span(kind, anchor, dt, scale.duration);
                if region.data().length_allowed(span.end - span.start) {
                    region.set_span(span.start, span.end, limits);
                }
                log::debug!("region `{}` committed [{}, {}]", region.id(), region.start(), region.end());
                region.emit_local(RegionLocalEvent::UpdateEnd);
                if self.contains(region.key()) {
                    self.emit(RegionEvent::Updated(region));
                }
            }
            GestureTarget::Create {
                anchor_time,
                region: Some(region),
                generation,
                ..
            } => {
                if !self.is_selection_active(generation) {
                    region.detach_element();
                    return;
                }
                if region.is_removed() {
                    return;
                }
                let span = drag_span(DragKind::Create, (anchor_time, anchor_time), dt, scale.duration);
                region.set_span(span.start, span.end, limits);
                if self.id_taken(&region.id(), region.key()) {
                    region.set_options(RegionParams::default().with_id(self.unique_id()));
                }
                self.insert(region);
            }
            GestureTarget::Create { region: None, .. } => {}
        }
    }

    fn on_click(&self, event: &PointerEvent, double: bool) {
        if !double && self.suppress_click.replace(false) {
            event.stop_propagation();
            return;
        }
        let pos = self.to_container(event.pos());
        let target = event.target().unwrap_or_else(|| self.hit_test(pos));
        let HitTarget::Region { key, .. } = target else {
            return;
        };
        let Some(region) = self.find(key) else {
            return;
        };
        if double {
            region.emit_local(RegionLocalEvent::DoubleClick(event.clone()));
            self.emit(RegionEvent::DoubleClicked(region, event.clone()));
        } else {
            region.emit_local(RegionLocalEvent::Click(event.clone()));
            self.emit(RegionEvent::Clicked(region, event.clone()));
        }
    }

    fn on_time_update(&self, time: f64) {
        let tolerance = self.options.marker_tolerance;
        let now_active: Vec<Region> = self
            .snapshot()
            .into_iter()
            .filter(|r| r.data().contains_time(time, tolerance))
            .collect();
        let now_keys: Vec<RegionKey> = now_active.iter().map(Region::key).collect();
        let previous = self.active.replace(now_keys.clone());

        for region in now_active {
            if !previous.contains(&region.key()) {
                self.emit(RegionEvent::In(region));
            }
        }
        for key in previous {
            if !now_keys.contains(&key) {
                if let Some(region) = self.find(key) {
                    self.emit(RegionEvent::Out(region));
                }
            }
        }
    }

    fn refresh(&self) {
        let limits = self.limits();
        for region in self.snapshot() {
            region.render(limits);
        }
        if let Some(region) = self.pending_region() {
            region.render(limits);
        }
    }

    fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }
        self.events.un_all();
        self.selection.borrow_mut().take();
        self.abort_creation(None);
        self.gesture.borrow_mut().abort();
        let regions = std::mem::take(&mut *self.regions.borrow_mut());
        for region in regions {
            region.detach_element();
            region.clear_listeners();
        }
        self.active.borrow_mut().clear();
        log::debug!("regions plugin destroyed");
    }
}

/// 拖拽创建模式的关闭句柄
///
/// 调用 [`disable`](Self::disable) 才会关闭该模式；丢弃句柄不会。
/// 再次调用 `enable_drag_selection` 后，旧句柄失效。
#[derive(Clone, Debug)]
pub struct DragSelectionHandle {
    plugin: Weak<PluginShared>,
    generation: u64,
}

impl DragSelectionHandle {
    /// 幂等
    pub fn disable(&self) {
        if let Some(plugin) = self.plugin.upgrade() {
            plugin.disable_drag_selection(self.generation);
        }
    }

    pub fn is_active(&self) -> bool {
        self.plugin
            .upgrade()
            .map_or(false, |plugin| plugin.is_selection_active(self.generation))
    }
}

/// 区域插件
///
/// ```no_run
/// use egui_regions::{RegionParams, RegionsPlugin, RegionsPluginOptions, StaticWaveform};
/// use egui::{pos2, vec2, Rect};
/// use std::{cell::RefCell, rc::Rc};
///
/// let host = Rc::new(RefCell::new(StaticWaveform::new(
///     20.0,
///     Rect::from_min_size(pos2(0.0, 0.0), vec2(400.0, 200.0)),
/// )));
/// let plugin = RegionsPlugin::new(host, RegionsPluginOptions::default());
/// let region = plugin.add_region(RegionParams::span(1.5, 10.1).with_content("Hello"));
/// assert_eq!(plugin.regions().len(), 1);
/// region.remove();
/// ```
pub struct RegionsPlugin {
    shared: Rc<PluginShared>,
}

impl RegionsPlugin {
    pub fn new<H: WaveformHost + 'static>(host: Rc<RefCell<H>>, options: RegionsPluginOptions) -> Self {
        let listeners = DocumentListeners::default();
        let events = if options.queue_events {
            EventBus::with_queue()
        } else {
            EventBus::new()
        };
        let host: Rc<RefCell<dyn WaveformHost>> = host;
        Self {
            shared: Rc::new(PluginShared {
                gesture: RefCell::new(GestureController::new(options.drag_threshold, listeners.clone())),
                options,
                host,
                regions: RefCell::new(Vec::new()),
                events,
                listeners,
                selection: RefCell::new(None),
                selection_generation: Cell::new(0),
                active: RefCell::new(Vec::new()),
                suppress_click: Cell::new(false),
                destroyed: Cell::new(false),
            }),
        }
    }

    pub fn options(&self) -> &RegionsPluginOptions {
        &self.shared.options
    }

    /// 创建区域并立即加入集合
    ///
    /// 缺省值：`drag = true`、`resize = true`、自动生成 id、`end = start`（标记）。
    /// 如果 `id` 已被占用，旧区域先被移除。
    pub fn add_region(&self, params: RegionParams) -> Region {
        self.shared.add_region(params)
    }

    /// 按插入顺序返回当前区域的快照
    pub fn regions(&self) -> Vec<Region> {
        self.shared.snapshot()
    }

    pub fn region_by_id(&self, id: &str) -> Option<Region> {
        self.shared.find_by_id(id)
    }

    pub fn clear_regions(&self) {
        self.shared.clear_regions();
    }

    /// 开启拖拽创建：在空白处拖拽会用 `params` 作为默认选项创建新区域
    pub fn enable_drag_selection(&self, params: RegionParams) -> DragSelectionHandle {
        self.shared.enable_drag_selection(params)
    }

    pub fn is_drag_selection_enabled(&self) -> bool {
        self.shared.selection.borrow().is_some()
    }

    /// 正在拖拽创建、尚未加入集合的区域
    pub fn pending_region(&self) -> Option<Region> {
        self.shared.pending_region()
    }

    /// 处理一次指针事件；返回值告诉宿主是否继续执行自己的默认行为
    pub fn handle_pointer(&self, event: &PointerEvent) -> Propagation {
        self.shared.handle_pointer(event)
    }

    /// `pos` 是相对容器左上角的坐标
    pub fn hit_test(&self, pos: Pos2) -> HitTarget {
        self.shared.hit_test(pos)
    }

    pub fn on(&self, kind: RegionEventKind, listener: impl FnMut(&RegionEvent) + 'static) -> ListenerId {
        self.shared.events.on(kind, listener)
    }

    pub fn once(&self, kind: RegionEventKind, listener: impl FnMut(&RegionEvent) + 'static) -> ListenerId {
        self.shared.events.once(kind, listener)
    }

    pub fn on_any(&self, listener: impl FnMut(&RegionEvent) + 'static) -> ListenerId {
        self.shared.events.on_any(listener)
    }

    pub fn un(&self, id: ListenerId) -> bool {
        self.shared.events.un(id)
    }

    pub fn un_all(&self) {
        self.shared.events.un_all();
    }

    /// 仅在 `queue_events` 开启时有内容
    pub fn take_events(&self) -> Vec<RegionEvent> {
        self.shared.events.take_events()
    }

    /// 播放位置变化时调用，发出 `region-in` / `region-out`
    pub fn on_time_update(&self, time: f64) {
        self.shared.on_time_update(time);
    }

    /// 读取宿主当前播放位置并更新进入/离开状态
    pub fn sync_playback(&self) {
        let time = self.shared.host.borrow().current_time();
        self.shared.on_time_update(time);
    }

    /// 宿主时长或通道数变化后重新布局所有元素
    pub fn refresh(&self) {
        self.shared.refresh();
    }

    pub fn time_scale(&self) -> TimeScale {
        self.shared.time_scale()
    }

    pub fn is_gesture_active(&self) -> bool {
        !self.shared.gesture.borrow().is_idle()
    }

    /// 当前挂在全局指针流上的手势监听器数量
    pub fn global_listener_count(&self) -> usize {
        self.shared.listeners.active()
    }

    /// 卸载插件：取消所有订阅、中止手势、静默卸下全部元素
    pub fn destroy(&self) {
        self.shared.destroy();
    }
}

impl Drop for RegionsPlugin {
    fn drop(&mut self) {
        self.shared.destroy();
    }
}

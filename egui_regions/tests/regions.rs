use egui::{pos2, vec2, Pos2, Rect};
use egui_regions::{
    BusEvent, ContentNode, ElementPart, HandleSide, HitTarget, PointerEvent, Propagation, RegionEvent,
    RegionEventKind, RegionLocalEvent, RegionLocalEventKind, RegionParams, RegionsPlugin,
    RegionsPluginOptions, StaticWaveform, WaveformHost,
};
use std::cell::RefCell;
use std::rc::Rc;

/// 20 秒音频，400x200 的容器：每秒 20 像素
fn setup() -> (Rc<RefCell<StaticWaveform>>, RegionsPlugin) {
    setup_with(StaticWaveform::new(
        20.0,
        Rect::from_min_size(pos2(0.0, 0.0), vec2(400.0, 200.0)),
    ))
}

fn setup_with(host: StaticWaveform) -> (Rc<RefCell<StaticWaveform>>, RegionsPlugin) {
    let host = Rc::new(RefCell::new(host));
    let plugin = RegionsPlugin::new(host.clone(), RegionsPluginOptions::default());
    (host, plugin)
}

fn record(plugin: &RegionsPlugin) -> Rc<RefCell<Vec<RegionEventKind>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    plugin.on_any(move |event| sink.borrow_mut().push(event.kind()));
    log
}

/// 模拟宿主的指针分发：插件没有阻止传播时，点击由宿主定位播放
fn gesture(plugin: &RegionsPlugin, host: &Rc<RefCell<StaticWaveform>>, path: &[Pos2]) {
    let (first, last) = match (path.first(), path.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return,
    };
    plugin.handle_pointer(&PointerEvent::down(first));
    for pos in &path[1..] {
        plugin.handle_pointer(&PointerEvent::moved(*pos));
    }
    if plugin.handle_pointer(&PointerEvent::up(last)) == Propagation::Continue
        && plugin.handle_pointer(&PointerEvent::click(last)) == Propagation::Continue
    {
        host.borrow_mut().handle_click(last);
    }
}

#[test]
fn create_and_remove_region() {
    let (_, plugin) = setup();
    let log = record(&plugin);
    let region = plugin.add_region(RegionParams::span(1.5, 10.1).with_content("Hello"));
    assert_eq!(plugin.regions().len(), 1);
    assert!(region.element().is_some());

    region.remove();
    assert!(region.element().is_none());
    assert!(plugin.regions().is_empty());
    assert_eq!(*log.borrow(), vec![RegionEventKind::Created, RegionEventKind::Removed]);
}

#[test]
fn dragging_a_region_moves_it_and_does_not_seek() {
    let (host, plugin) = setup();
    let region = plugin.add_region(RegionParams::span(3.0, 8.0));
    let updated = Rc::new(RefCell::new(0));
    let counter = updated.clone();
    plugin.on(RegionEventKind::Updated, move |_| *counter.borrow_mut() += 1);

    gesture(
        &plugin,
        &host,
        &[pos2(90.0, 100.0), pos2(150.0, 100.0), pos2(190.0, 100.0)],
    );

    assert!(region.start() > 3.0);
    assert_eq!((region.start(), region.end()), (8.0, 13.0));
    assert_eq!(*updated.borrow(), 1);
    assert_eq!(host.borrow().current_time(), 0.0);
    assert_eq!(plugin.global_listener_count(), 0);
}

#[test]
fn set_color_updates_background() {
    let (_, plugin) = setup();
    let region = plugin.add_region(RegionParams::span(3.0, 8.0));
    region.set_options(RegionParams::default().with_color("rgba(255, 0, 0, 0.5)"));
    assert_eq!(
        region.element().unwrap().background(),
        Some("rgba(255, 0, 0, 0.5)")
    );
}

#[test]
fn set_position_and_resize_together() {
    let (_, plugin) = setup();
    let region = plugin.add_region(RegionParams::span(3.0, 8.0).with_content("x"));
    let log = record(&plugin);
    region.set_options(RegionParams::span(10.0, 12.0).with_resize(false));

    let element = region.element().unwrap();
    assert_eq!((region.start(), region.end()), (10.0, 12.0));
    assert_eq!(element.layout().left, 0.5);
    assert_eq!(element.handle_count(), 0);
    assert_eq!(*log.borrow(), vec![RegionEventKind::Updated]);
}

#[test]
fn marker_has_no_background() {
    let (_, plugin) = setup();
    let marker = plugin.add_region(RegionParams::new(3.0).with_content("M"));
    assert!(marker.is_marker());
    assert_eq!((marker.start(), marker.end()), (3.0, 3.0));
    let element = marker.element().unwrap();
    assert_eq!(element.background(), None);
    assert!(element.part().starts_with("marker "));
    assert_eq!(element.handle_count(), 0);
}

#[test]
fn drag_selection_creates_region() {
    let (host, plugin) = setup();
    plugin.add_region(RegionParams::span(15.0, 18.0));
    let log = record(&plugin);
    let handle = plugin.enable_drag_selection(RegionParams::default().with_content("Drag"));

    gesture(
        &plugin,
        &host,
        &[pos2(40.0, 100.0), pos2(60.0, 100.0), pos2(100.0, 100.0)],
    );

    assert_eq!(
        *log.borrow(),
        vec![RegionEventKind::Initialized, RegionEventKind::Created]
    );
    assert_eq!(host.borrow().current_time(), 0.0);
    let regions = plugin.regions();
    assert_eq!(regions.len(), 2);
    assert_eq!((regions[1].start(), regions[1].end()), (2.0, 5.0));
    assert_eq!(regions[1].element().unwrap().text_content(), "Drag");

    plugin.clear_regions();
    handle.disable();
    assert!(plugin.regions().is_empty());
    assert!(!handle.is_active());

    // 关闭后在空白处拖拽只是一次点击定位
    gesture(&plugin, &host, &[pos2(40.0, 100.0), pos2(100.0, 100.0)]);
    assert!(plugin.regions().is_empty());
    assert_eq!(host.borrow().current_time(), 5.0);
}

#[test]
fn drag_selection_below_threshold_creates_nothing() {
    let (host, plugin) = setup();
    let log = record(&plugin);
    let _handle = plugin.enable_drag_selection(RegionParams::default());
    gesture(
        &plugin,
        &host,
        &[pos2(40.0, 100.0), pos2(41.0, 101.0), pos2(40.0, 100.0)],
    );
    assert!(log.borrow().is_empty());
    assert!(plugin.regions().is_empty());
    assert_eq!(host.borrow().current_time(), 2.0);
}

#[test]
fn stale_selection_handle_cannot_disable_newer_mode() {
    let (_, plugin) = setup();
    let old = plugin.enable_drag_selection(RegionParams::default());
    let new = plugin.enable_drag_selection(RegionParams::default().with_color("red"));
    assert!(!old.is_active());
    old.disable();
    assert!(new.is_active());
    new.disable();
    new.disable();
    assert!(!plugin.is_drag_selection_enabled());
}

#[test]
fn region_play_starts_host_at_region_start() {
    let (host, plugin) = setup();
    let region = plugin.add_region(RegionParams::span(3.0, 8.0));
    let played = Rc::new(RefCell::new(None));
    let sink = played.clone();
    region.on(RegionLocalEventKind::Play, move |event| {
        if let RegionLocalEvent::Play(end) = event {
            *sink.borrow_mut() = Some(*end);
        }
    });

    plugin.on(RegionEventKind::Clicked, |event| {
        if let RegionEvent::Clicked(region, pointer) = event {
            pointer.stop_propagation();
            region.play(None);
        }
    });
    gesture(&plugin, &host, &[pos2(100.0, 100.0)]);

    assert!(host.borrow().is_playing());
    assert_eq!(host.borrow().current_time(), 3.0);
    assert_eq!(*played.borrow(), Some(None));

    region.play(Some(4.0));
    assert_eq!(host.borrow().play_end(), Some(4.0));
}

#[test]
fn click_on_region_propagates_to_host_by_default() {
    let (host, plugin) = setup();
    let region = plugin.add_region(RegionParams::span(3.0, 8.0));
    let clicks = Rc::new(RefCell::new(0));
    let counter = clicks.clone();
    region.on(RegionLocalEventKind::Click, move |_| *counter.borrow_mut() += 1);

    gesture(&plugin, &host, &[pos2(100.0, 100.0)]);
    assert_eq!(*clicks.borrow(), 1);
    assert_eq!(host.borrow().current_time(), 5.0);
}

#[test]
fn double_click_is_reported() {
    let (_, plugin) = setup();
    let region = plugin.add_region(RegionParams::span(3.0, 8.0));
    let log = record(&plugin);
    plugin.handle_pointer(&PointerEvent::double_click(pos2(100.0, 100.0)));
    assert_eq!(*log.borrow(), vec![RegionEventKind::DoubleClicked]);
    assert!(!region.is_removed());
}

#[test]
fn content_replaces_previous_content() {
    let (_, plugin) = setup();
    let region = plugin.add_region(RegionParams::span(3.0, 8.0).with_content("Hello"));
    region.set_content("Updated");
    assert_eq!(region.element().unwrap().text_content(), "Updated");

    region.set_content(ContentNode::new("div").with_text("HTML content"));
    let element = region.element().unwrap();
    assert_eq!(element.text_content(), "HTML content");
    assert_eq!(element.children().len(), 3);
}

#[test]
fn id_update_changes_part() {
    let (_, plugin) = setup();
    let region = plugin.add_region(RegionParams::span(3.0, 8.0).with_id("first"));
    region.set_options(RegionParams::default().with_id("renamed"));
    assert_eq!(region.id(), "renamed");
    assert_eq!(region.element().unwrap().part(), "region renamed");
    assert_eq!(plugin.region_by_id("renamed"), Some(region));
}

#[test]
fn resize_false_renders_no_children() {
    let (host, plugin) = setup();
    let region = plugin.add_region(RegionParams::span(3.0, 8.0).with_resize(false));
    assert!(region.element().unwrap().children().is_empty());

    // 边缘位置只能拖动整个区域
    assert_eq!(
        plugin.hit_test(pos2(61.0, 100.0)),
        HitTarget::Region {
            key: region.key(),
            part: ElementPart::Body
        }
    );
    gesture(&plugin, &host, &[pos2(61.0, 100.0), pos2(81.0, 100.0)]);
    assert_eq!((region.start(), region.end()), (4.0, 9.0));
}

#[test]
fn resize_end_handle_reports_side() {
    let (host, plugin) = setup();
    let region = plugin.add_region(RegionParams::span(3.0, 8.0));
    let sides = Rc::new(RefCell::new(Vec::new()));
    let sink = sides.clone();
    plugin.on(RegionEventKind::Update, move |event| {
        if let RegionEvent::Update(_, side) = event {
            sink.borrow_mut().push(*side);
        }
    });
    gesture(&plugin, &host, &[pos2(158.0, 100.0), pos2(198.0, 100.0)]);
    assert_eq!((region.start(), region.end()), (3.0, 10.0));
    assert_eq!(*sides.borrow(), vec![Some(HandleSide::End)]);
}

#[test]
fn channel_lanes_split_the_height() {
    let (_, plugin) = setup_with(
        StaticWaveform::new(20.0, Rect::from_min_size(pos2(0.0, 0.0), vec2(400.0, 200.0))).with_channels(2),
    );
    let region = plugin.add_region(RegionParams::span(0.0, 10.0).with_channel(1));
    let layout = region.element().unwrap().layout();
    assert_eq!((layout.top, layout.height), (0.5, 0.5));

    // 上半部分不属于这个区域
    assert_eq!(plugin.hit_test(pos2(100.0, 50.0)), HitTarget::Background);
    assert!(matches!(plugin.hit_test(pos2(100.0, 150.0)), HitTarget::Region { .. }));

    let out_of_range = plugin.add_region(RegionParams::span(0.0, 10.0).with_channel(5));
    assert_eq!(out_of_range.channel_idx(), None);
}

#[test]
fn remove_is_idempotent() {
    let (_, plugin) = setup();
    let region = plugin.add_region(RegionParams::span(3.0, 8.0));
    let removed = Rc::new(RefCell::new(0));
    let counter = removed.clone();
    region.on(RegionLocalEventKind::Remove, move |_| *counter.borrow_mut() += 1);
    let log = record(&plugin);

    region.remove();
    region.remove();
    assert_eq!(*removed.borrow(), 1);
    assert_eq!(*log.borrow(), vec![RegionEventKind::Removed]);
}

#[test]
fn clear_mid_drag_selection_aborts_cleanly() {
    let (host, plugin) = setup();
    let log = record(&plugin);
    let _handle = plugin.enable_drag_selection(RegionParams::default());

    plugin.handle_pointer(&PointerEvent::down(pos2(40.0, 100.0)));
    plugin.handle_pointer(&PointerEvent::moved(pos2(80.0, 100.0)));
    let pending = plugin.pending_region().unwrap();
    assert!(plugin.is_gesture_active());

    plugin.clear_regions();
    assert!(!plugin.is_gesture_active());
    assert_eq!(plugin.global_listener_count(), 0);
    assert!(pending.is_removed());
    assert!(plugin.pending_region().is_none());

    plugin.handle_pointer(&PointerEvent::moved(pos2(120.0, 100.0)));
    plugin.handle_pointer(&PointerEvent::up(pos2(120.0, 100.0)));
    assert_eq!(*log.borrow(), vec![RegionEventKind::Initialized]);
    assert!(plugin.regions().is_empty());
    assert_eq!(host.borrow().current_time(), 0.0);
}

#[test]
fn second_pointer_is_ignored_while_dragging() {
    let (_, plugin) = setup();
    let a = plugin.add_region(RegionParams::span(3.0, 8.0));
    let b = plugin.add_region(RegionParams::span(12.0, 14.0));

    plugin.handle_pointer(&PointerEvent::down(pos2(100.0, 100.0)));
    plugin.handle_pointer(&PointerEvent::down(pos2(260.0, 100.0)).with_pointer_id(7));
    plugin.handle_pointer(&PointerEvent::moved(pos2(300.0, 100.0)).with_pointer_id(7));
    plugin.handle_pointer(&PointerEvent::moved(pos2(120.0, 100.0)));
    plugin.handle_pointer(&PointerEvent::up(pos2(120.0, 100.0)));

    assert_eq!((a.start(), a.end()), (4.0, 9.0));
    assert_eq!((b.start(), b.end()), (12.0, 14.0));
}

#[test]
fn playback_enters_and_leaves_regions() {
    let (host, plugin) = setup();
    let region = plugin.add_region(RegionParams::span(2.0, 3.0));
    let log = record(&plugin);

    host.borrow_mut().play(1.5, None);
    for _ in 0..20 {
        host.borrow_mut().advance(0.1);
        plugin.sync_playback();
    }
    assert_eq!(*log.borrow(), vec![RegionEventKind::In, RegionEventKind::Out]);
    assert!(!region.is_removed());
}

#[test]
fn zoomed_and_scrolled_container_maps_pointer_to_time() {
    // 每秒 50 像素，向右滚动 100 像素
    let (host, plugin) = setup_with(
        StaticWaveform::new(20.0, Rect::from_min_size(pos2(0.0, 0.0), vec2(400.0, 200.0))).with_zoom(50.0, 100.0),
    );
    let region = plugin.add_region(RegionParams::span(3.0, 8.0));
    // 3 秒位于内容 150px，即容器 50px
    assert!(matches!(plugin.hit_test(pos2(60.0, 100.0)), HitTarget::Region { .. }));
    gesture(&plugin, &host, &[pos2(60.0, 100.0), pos2(110.0, 100.0)]);
    assert_eq!((region.start(), region.end()), (4.0, 9.0));
}

#[test]
fn params_load_from_json() {
    let (_, plugin) = setup();
    let params = RegionParams::from_json(
        r#"{"id":"intro","start":1,"end":4,"color":"rgba(0, 255, 0, 0.2)","resize":false,"channelIdx":0}"#,
    )
    .unwrap();
    let region = plugin.add_region(params);
    assert_eq!(region.id(), "intro");
    assert_eq!((region.start(), region.end()), (1.0, 4.0));
    assert!(!region.resize());
    assert_eq!(region.channel_idx(), Some(0));
}

#[test]
fn out_of_range_times_are_clamped() {
    let (_, plugin) = setup();
    let region = plugin.add_region(RegionParams::span(-5.0, 50.0));
    assert_eq!((region.start(), region.end()), (0.0, 20.0));
}

#[test]
fn unknown_duration_only_clamps_lower_bound() {
    let (host, plugin) = setup_with(StaticWaveform::new(
        0.0,
        Rect::from_min_size(pos2(0.0, 0.0), vec2(400.0, 200.0)),
    ));
    let region = plugin.add_region(RegionParams::span(-1.0, 30.0));
    assert_eq!((region.start(), region.end()), (0.0, 30.0));

    host.borrow_mut().set_duration(60.0);
    plugin.refresh();
    assert_eq!(region.element().unwrap().layout().width, 0.5);
}

#[test]
fn explicit_target_overrides_hit_testing() {
    let (host, plugin) = setup();
    let region = plugin.add_region(RegionParams::span(3.0, 8.0));
    let body = HitTarget::Region {
        key: region.key(),
        part: ElementPart::Body,
    };
    // 300px 处是空白，事件直接派发在区域元素上
    let outside = pos2(300.0, 100.0);
    assert_eq!(plugin.hit_test(outside), HitTarget::Background);

    plugin.handle_pointer(&PointerEvent::down(outside).with_target(body));
    plugin.handle_pointer(&PointerEvent::moved(pos2(340.0, 100.0)));
    assert_eq!(
        plugin.handle_pointer(&PointerEvent::up(pos2(340.0, 100.0))),
        Propagation::Stop
    );
    assert_eq!((region.start(), region.end()), (5.0, 10.0));

    let log = record(&plugin);
    plugin.handle_pointer(&PointerEvent::down(outside).with_target(body));
    plugin.handle_pointer(&PointerEvent::up(outside));
    plugin.handle_pointer(&PointerEvent::click(outside).with_target(body));
    assert_eq!(*log.borrow(), vec![RegionEventKind::Clicked]);
    assert_eq!((region.start(), region.end()), (5.0, 10.0));
    assert_eq!(host.borrow().current_time(), 0.0);
}

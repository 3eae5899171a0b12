//! UI 模块
//!
//! 把 [`RegionsPlugin`] 接到 egui 上：绘制区域元素，把原始指针事件翻译成
//! [`PointerEvent`] 交给插件，并在插件没有阻止传播时把点击交还给宿主做定位。

mod renderer;
mod statusbar;
mod toolbar;

pub use renderer::{draw_dashed_vertical_line, draw_playhead, draw_region, RegionStyle};
pub use statusbar::StatusBar;
pub use toolbar::{Toolbar, ToolbarAction};

use crate::element::{ElementPart, HandleSide};
use crate::pointer::{HitTarget, PointerEvent, Propagation};
use crate::plugin::RegionsPlugin;
use egui::*;

/// 一帧交互的结果
pub struct RegionsViewResponse {
    pub response: Response,
    /// 点击没有被区域吞掉时，宿主应定位到的时间
    pub seek: Option<f64>,
}

/// 区域覆盖层
///
/// 视图本身不保存区域，只保存跨帧的指针状态；宿主的容器矩形必须与传入的
/// `rect` 一致，这样插件的坐标换算才和绘制对得上。
#[derive(Default)]
pub struct RegionsView {
    style: RegionStyle,
    pressed: bool,
}

impl RegionsView {
    pub fn new(style: RegionStyle) -> Self {
        Self {
            style,
            pressed: false,
        }
    }

    pub fn ui(&mut self, ui: &mut Ui, plugin: &RegionsPlugin, rect: Rect) -> RegionsViewResponse {
        let response = ui.allocate_rect(rect, Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        let style = self.style.clone().with_options(plugin.options());

        let viewport_content = plugin.time_scale().viewport.content_rect();
        let content_rect = viewport_content.translate(rect.min.to_vec2());
        for region in plugin.regions() {
            if let Some(element) = region.element() {
                renderer::draw_region(&painter, &element, content_rect, &style);
            }
        }
        if let Some(element) = plugin.pending_region().and_then(|r| r.element()) {
            renderer::draw_region(&painter, &element, content_rect, &style);
        }

        let (events, double_clicked, hover) = ui.input(|i| {
            (
                i.events.clone(),
                i.pointer.button_double_clicked(PointerButton::Primary),
                i.pointer.hover_pos(),
            )
        });
        let mut seek = self.process_events(plugin, rect, &events);
        if double_clicked {
            if let Some(pos) = hover {
                seek = self.process_double_click(plugin, rect, pos, seek);
            }
        }

        if plugin.is_gesture_active() {
            ui.ctx().request_repaint();
        }
        if let Some(pos) = hover.filter(|p| rect.contains(*p)) {
            if let Some(icon) = cursor_for(plugin.hit_test(pos - rect.min.to_vec2())) {
                ui.ctx().set_cursor_icon(icon);
            }
        }

        RegionsViewResponse { response, seek }
    }

    /// 翻译一帧的原始输入事件；返回点击定位的时间
    pub fn process_events(&mut self, plugin: &RegionsPlugin, rect: Rect, events: &[Event]) -> Option<f64> {
        let mut seek = None;
        for event in events {
            match event {
                Event::PointerButton {
                    pos,
                    button: PointerButton::Primary,
                    pressed: true,
                    ..
                } if rect.contains(*pos) => {
                    self.pressed = true;
                    plugin.handle_pointer(&PointerEvent::down(*pos));
                }
                Event::PointerMoved(pos) if self.pressed => {
                    plugin.handle_pointer(&PointerEvent::moved(*pos));
                }
                Event::PointerButton {
                    pos,
                    button: PointerButton::Primary,
                    pressed: false,
                    ..
                } if self.pressed => {
                    self.pressed = false;
                    if plugin.handle_pointer(&PointerEvent::up(*pos)) == Propagation::Stop {
                        // 拖拽结束：让插件消费掉随后的点击
                        plugin.handle_pointer(&PointerEvent::click(*pos));
                        continue;
                    }
                    if rect.contains(*pos)
                        && plugin.handle_pointer(&PointerEvent::click(*pos)) == Propagation::Continue
                    {
                        let local = *pos - rect.min.to_vec2();
                        seek = Some(plugin.time_scale().x_to_time(local.x));
                    }
                }
                Event::PointerGone if self.pressed => {
                    self.pressed = false;
                }
                _ => {}
            }
        }
        seek
    }

    /// 双击交给插件；被区域监听器阻止传播时撤销本帧的定位
    pub fn process_double_click(
        &mut self,
        plugin: &RegionsPlugin,
        rect: Rect,
        pos: Pos2,
        seek: Option<f64>,
    ) -> Option<f64> {
        if !rect.contains(pos) {
            return seek;
        }
        match plugin.handle_pointer(&PointerEvent::double_click(pos)) {
            Propagation::Stop => None,
            Propagation::Continue => seek,
        }
    }
}

fn cursor_for(target: HitTarget) -> Option<CursorIcon> {
    match target {
        HitTarget::Region {
            part: ElementPart::Handle(HandleSide::Start | HandleSide::End),
            ..
        } => Some(CursorIcon::ResizeHorizontal),
        HitTarget::Region { .. } => Some(CursorIcon::Grab),
        HitTarget::Background | HitTarget::Outside => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{StaticWaveform, WaveformHost};
    use crate::plugin::RegionsPluginOptions;
    use crate::structure::RegionParams;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn button(pos: Pos2, pressed: bool) -> Event {
        Event::PointerButton {
            pos,
            button: PointerButton::Primary,
            pressed,
            modifiers: Modifiers::NONE,
        }
    }

    fn setup() -> (Rc<RefCell<StaticWaveform>>, RegionsPlugin, Rect) {
        let rect = Rect::from_min_size(pos2(100.0, 50.0), vec2(400.0, 200.0));
        let host = Rc::new(RefCell::new(StaticWaveform::new(20.0, rect)));
        let plugin = RegionsPlugin::new(host.clone(), RegionsPluginOptions::default());
        (host, plugin, rect)
    }

    #[test]
    fn background_click_seeks() {
        let (_, plugin, rect) = setup();
        let mut view = RegionsView::default();
        let seek = view.process_events(&plugin, rect, &[button(pos2(200.0, 60.0), true), button(pos2(200.0, 60.0), false)]);
        assert_eq!(seek, Some(5.0));
    }

    #[test]
    fn drag_moves_region_without_seeking() {
        let (host, plugin, rect) = setup();
        let region = plugin.add_region(RegionParams::span(3.0, 8.0));
        let mut view = RegionsView::default();
        let events = [
            button(pos2(190.0, 60.0), true),
            Event::PointerMoved(pos2(230.0, 60.0)),
            button(pos2(230.0, 60.0), false),
        ];
        let seek = view.process_events(&plugin, rect, &events);
        assert_eq!(seek, None);
        assert_eq!((region.start(), region.end()), (5.0, 10.0));
        assert_eq!(host.borrow().current_time(), 0.0);

        // 下一次普通点击不受影响
        let seek = view.process_events(&plugin, rect, &[button(pos2(400.0, 60.0), true), button(pos2(400.0, 60.0), false)]);
        assert_eq!(seek, Some(15.0));
    }

    #[test]
    fn click_stopped_by_listener_does_not_seek() {
        let (_, plugin, rect) = setup();
        plugin.add_region(RegionParams::span(3.0, 8.0));
        plugin.on(crate::editor::RegionEventKind::Clicked, |event| {
            if let crate::editor::RegionEvent::Clicked(_, pointer) = event {
                pointer.stop_propagation();
            }
        });
        let mut view = RegionsView::default();
        let seek = view.process_events(&plugin, rect, &[button(pos2(190.0, 60.0), true), button(pos2(190.0, 60.0), false)]);
        assert_eq!(seek, None);
    }

    #[test]
    fn double_click_stopped_by_listener_cancels_seek() {
        let (_, plugin, rect) = setup();
        plugin.add_region(RegionParams::span(3.0, 8.0));
        plugin.on(crate::editor::RegionEventKind::DoubleClicked, |event| {
            if let crate::editor::RegionEvent::DoubleClicked(_, pointer) = event {
                pointer.stop_propagation();
            }
        });
        let mut view = RegionsView::default();

        let pos = pos2(190.0, 60.0);
        let seek = view.process_events(&plugin, rect, &[button(pos, true), button(pos, false)]);
        assert_eq!(seek, Some(4.5));
        assert_eq!(view.process_double_click(&plugin, rect, pos, seek), None);

        // 空白处的双击不会撤销定位
        let pos = pos2(400.0, 60.0);
        let seek = view.process_events(&plugin, rect, &[button(pos, true), button(pos, false)]);
        assert_eq!(view.process_double_click(&plugin, rect, pos, seek), Some(15.0));
    }

    #[test]
    fn style_widths_follow_plugin_options() {
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(400.0, 200.0));
        let host = Rc::new(RefCell::new(StaticWaveform::new(20.0, rect)));
        let options = RegionsPluginOptions {
            handle_width: 10.0,
            marker_width: 4.0,
            ..Default::default()
        };
        let plugin = RegionsPlugin::new(host, options);
        let style = RegionStyle::default().with_options(plugin.options());
        assert_eq!((style.handle_width, style.marker_width), (10.0, 4.0));
    }
}

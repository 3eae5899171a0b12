use eframe::egui;
use egui_regions::{
    draw_playhead, BusEvent, Content, ContentNode, DragSelectionHandle, RegionEvent, RegionEventKind,
    RegionParams, RegionsPlugin, RegionsPluginOptions, RegionsView, StatusBar, Toolbar, ToolbarAction,
    WaveformHost,
};
use std::cell::RefCell;
use std::rc::Rc;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let native_options = eframe::NativeOptions::default();
    eframe::run_native(
        "egui_regions Example",
        native_options,
        Box::new(|_cc| Ok(Box::new(RegionsApp::new()))),
    )
}

/// 演示用的宿主：合成波形，按帧推进的播放
struct DemoWaveform {
    duration: f64,
    current_time: f64,
    playing: bool,
    play_end: Option<f64>,
    rect: egui::Rect,
    peaks: Vec<f32>,
}

impl DemoWaveform {
    fn new(duration: f64) -> Self {
        let peaks = (0..800)
            .map(|i| {
                let t = i as f32 / 800.0 * duration as f32;
                let envelope = (t * 0.7).sin().abs() * 0.8 + 0.2;
                envelope * ((t * 13.0).sin() * 0.5 + (t * 31.0).cos() * 0.5).abs()
            })
            .collect();
        Self {
            duration,
            current_time: 0.0,
            playing: false,
            play_end: None,
            rect: egui::Rect::NOTHING,
            peaks,
        }
    }

    fn advance(&mut self, dt: f64) {
        if !self.playing {
            return;
        }
        let limit = self.play_end.unwrap_or(self.duration);
        self.current_time = (self.current_time + dt).min(limit);
        if self.current_time >= limit {
            self.playing = false;
            self.play_end = None;
        }
    }

    fn paint(&self, painter: &egui::Painter) {
        let rect = self.rect;
        painter.rect_filled(rect, 0.0, egui::Color32::from_gray(30));
        let mid = rect.center().y;
        let step = rect.width() / self.peaks.len() as f32;
        for (i, peak) in self.peaks.iter().enumerate() {
            let x = rect.min.x + i as f32 * step;
            let h = peak * rect.height() * 0.45;
            painter.line_segment(
                [egui::pos2(x, mid - h), egui::pos2(x, mid + h)],
                egui::Stroke::new(1.0, egui::Color32::from_rgb(90, 140, 200)),
            );
        }
    }
}

impl WaveformHost for DemoWaveform {
    fn duration(&self) -> f64 {
        self.duration
    }

    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn play(&mut self, start: f64, end: Option<f64>) {
        self.current_time = start.clamp(0.0, self.duration);
        self.play_end = end;
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn set_time(&mut self, time: f64) {
        self.current_time = time.clamp(0.0, self.duration);
    }

    fn container_rect(&self) -> egui::Rect {
        self.rect
    }
}

struct RegionsApp {
    host: Rc<RefCell<DemoWaveform>>,
    plugin: RegionsPlugin,
    view: RegionsView,
    selection: Option<DragSelectionHandle>,
    event_log: Vec<String>,
    last_update: f64,
}

impl RegionsApp {
    fn new() -> Self {
        let host = Rc::new(RefCell::new(DemoWaveform::new(20.0)));
        let options = RegionsPluginOptions {
            queue_events: true,
            ..Default::default()
        };
        let plugin = RegionsPlugin::new(host.clone(), options);

        // 单击区域从区域起点播放到终点，而不是定位到点击处
        plugin.on(RegionEventKind::Clicked, |event| {
            if let RegionEvent::Clicked(region, pointer) = event {
                pointer.stop_propagation();
                region.play(Some(region.end()));
            }
        });

        plugin.add_region(
            RegionParams::span(1.5, 4.0)
                .with_color("rgba(255, 120, 0, 0.3)")
                .with_content("Intro"),
        );
        plugin.add_region(
            RegionParams::span(6.0, 11.0)
                .with_color("rgba(0, 200, 120, 0.3)")
                .with_content(ContentNode::new("div").with_child(ContentNode::new("b").with_text("Verse"))),
        );
        plugin.add_region(RegionParams::new(13.0).with_content("Drop"));
        plugin.add_region(
            RegionParams::span(15.0, 18.0)
                .with_drag(false)
                .with_resize(false)
                .with_content(Content::from("Locked")),
        );

        Self {
            host,
            plugin,
            view: RegionsView::default(),
            selection: None,
            event_log: Vec::new(),
            last_update: 0.0,
        }
    }

    fn apply(&mut self, action: ToolbarAction) {
        match action {
            ToolbarAction::TogglePlayback => {
                let mut host = self.host.borrow_mut();
                if host.is_playing() {
                    host.pause();
                } else {
                    let time = host.current_time();
                    host.play(time, None);
                }
            }
            ToolbarAction::Stop => {
                let mut host = self.host.borrow_mut();
                host.pause();
                host.set_time(0.0);
            }
            ToolbarAction::AddRegion => {
                let start = self.host.borrow().current_time();
                self.plugin
                    .add_region(RegionParams::span(start, start + 2.0).with_color("rgba(120, 120, 255, 0.3)"));
            }
            ToolbarAction::AddMarker => {
                let time = self.host.borrow().current_time();
                self.plugin.add_region(RegionParams::new(time).with_content("Marker"));
            }
            ToolbarAction::SetDragSelection(true) => {
                self.selection = Some(
                    self.plugin
                        .enable_drag_selection(RegionParams::default().with_color("rgba(255, 0, 0, 0.1)")),
                );
            }
            ToolbarAction::SetDragSelection(false) => {
                if let Some(handle) = self.selection.take() {
                    handle.disable();
                }
            }
            ToolbarAction::ClearRegions => self.plugin.clear_regions(),
        }
    }
}

impl eframe::App for RegionsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = ctx.input(|i| i.time);
        let dt = now - self.last_update;
        self.last_update = now;
        if self.host.borrow().is_playing() {
            if dt > 0.0 && dt < 1.0 {
                self.host.borrow_mut().advance(dt);
            }
            ctx.request_repaint();
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            let (time, duration, playing) = {
                let host = self.host.borrow();
                (host.current_time(), host.duration(), host.is_playing())
            };
            let mut toolbar = Toolbar::new(time, duration);
            toolbar.set_playing(playing);
            toolbar.set_drag_selection(self.plugin.is_drag_selection_enabled());
            let mut actions = Vec::new();
            toolbar.ui(ui, &mut |action| actions.push(action));
            for action in actions {
                self.apply(action);
            }
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            let position = self.host.borrow().current_time();
            StatusBar::from_plugin(&self.plugin, position).ui(ui);
        });

        egui::SidePanel::right("events").min_width(240.0).show(ctx, |ui| {
            ui.heading("Events");
            egui::ScrollArea::vertical().stick_to_bottom(true).show(ui, |ui| {
                for line in &self.event_log {
                    ui.monospace(line);
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let rect = egui::Rect::from_min_size(ui.cursor().min, egui::vec2(ui.available_width(), 220.0));
            if self.host.borrow().rect != rect {
                self.host.borrow_mut().rect = rect;
                self.plugin.refresh();
            }
            self.host.borrow().paint(&ui.painter_at(rect));

            let out = self.view.ui(ui, &self.plugin, rect);
            if let Some(time) = out.seek {
                self.host.borrow_mut().set_time(time);
            }

            let (time, duration) = {
                let host = self.host.borrow();
                (host.current_time(), host.duration())
            };
            if duration > 0.0 {
                let x = rect.min.x + (time / duration) as f32 * rect.width();
                draw_playhead(&ui.painter_at(rect), x, rect.min.y, rect.max.y);
            }
        });

        self.plugin.sync_playback();

        for event in self.plugin.take_events() {
            log::info!("[RegionEvent] {:?}", event);
            let region = event.region();
            self.event_log.push(format!(
                "{} {} [{:.2}, {:.2}]",
                event.kind().name(),
                region.id(),
                region.start(),
                region.end()
            ));
        }
        if self.event_log.len() > 200 {
            let excess = self.event_log.len() - 200;
            self.event_log.drain(..excess);
        }
    }
}

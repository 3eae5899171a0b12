//! Toolbar module
//!
//! Playback controls, time display and the region editing actions shown above the waveform.

use crate::utils::format_time;
use egui::*;

/// 工具栏上被点击的动作，由宿主执行
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolbarAction {
    TogglePlayback,
    Stop,
    AddRegion,
    AddMarker,
    SetDragSelection(bool),
    ClearRegions,
}

pub struct Toolbar {
    is_playing: bool,
    current_time: f64,
    duration: f64,
    drag_selection: bool,
}

impl Toolbar {
    pub fn new(current_time: f64, duration: f64) -> Self {
        Self {
            is_playing: false,
            current_time,
            duration,
            drag_selection: false,
        }
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.is_playing = playing;
    }

    pub fn set_drag_selection(&mut self, enabled: bool) {
        self.drag_selection = enabled;
    }

    pub fn ui(&mut self, ui: &mut Ui, action_callback: &mut dyn FnMut(ToolbarAction)) {
        ui.horizontal(|ui| {
            ui.label(format!(
                "Time: {} / {}",
                format_time(self.current_time),
                format_time(self.duration)
            ));
            ui.separator();

            if ui
                .button(if self.is_playing { "⏸ Pause" } else { "▶ Play" })
                .clicked()
            {
                action_callback(ToolbarAction::TogglePlayback);
            }
            if ui.button("⏹ Stop").clicked() {
                action_callback(ToolbarAction::Stop);
            }

            ui.separator();

            if ui.button("Add region").clicked() {
                action_callback(ToolbarAction::AddRegion);
            }
            if ui.button("Add marker").clicked() {
                action_callback(ToolbarAction::AddMarker);
            }

            let mut drag_selection = self.drag_selection;
            if ui.checkbox(&mut drag_selection, "Drag to create").changed() {
                action_callback(ToolbarAction::SetDragSelection(drag_selection));
            }

            ui.separator();

            if ui.button("Clear").clicked() {
                action_callback(ToolbarAction::ClearRegions);
            }
        });
    }
}

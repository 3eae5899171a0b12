//! Status bar module
//!
//! Displays region and marker counts, the active regions under the playhead, and the playback position.

use crate::plugin::RegionsPlugin;
use crate::utils::format_time;
use egui::*;

#[derive(Default)]
pub struct StatusBar {
    region_count: usize,
    marker_count: usize,
    playing_ids: Vec<String>,
    position: f64,
}

impl StatusBar {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从插件读取一帧的统计
    pub fn from_plugin(plugin: &RegionsPlugin, position: f64) -> Self {
        let regions = plugin.regions();
        let marker_count = regions.iter().filter(|r| r.is_marker()).count();
        let tolerance = plugin.options().marker_tolerance;
        Self {
            region_count: regions.len() - marker_count,
            marker_count,
            playing_ids: regions
                .iter()
                .filter(|r| r.data().contains_time(position, tolerance))
                .map(|r| r.id())
                .collect(),
            position,
        }
    }

    pub fn region_count(&self) -> usize {
        self.region_count
    }

    pub fn marker_count(&self) -> usize {
        self.marker_count
    }

    pub fn playing_ids(&self) -> &[String] {
        &self.playing_ids
    }

    pub fn ui(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.label(format!("Regions: {}", self.region_count));
            ui.separator();
            ui.label(format!("Markers: {}", self.marker_count));
            ui.separator();
            if self.playing_ids.is_empty() {
                ui.label("Playing: -");
            } else {
                ui.label(format!("Playing: {}", self.playing_ids.join(", ")));
            }
            ui.separator();
            ui.label(format!("Position: {}", format_time(self.position)));
        });
    }
}

//! 宿主接口模块
//!
//! 波形渲染/播放引擎是外部协作者：它拥有总时长、播放位置、可滚动缩放的
//! 容器以及通道数。插件只通过 [`WaveformHost`] 访问这些状态。

use crate::geometry::{clamp_time, TimeScale, Viewport};
use egui::{Pos2, Rect};

pub trait WaveformHost {
    /// 总时长（秒）；尚未解码时为 0
    fn duration(&self) -> f64;

    fn current_time(&self) -> f64;

    fn is_playing(&self) -> bool;

    /// 从 `start` 开始播放，可选在 `end` 处停止
    fn play(&mut self, start: f64, end: Option<f64>);

    fn pause(&mut self);

    fn set_time(&mut self, time: f64);

    /// 可见容器在全局坐标中的矩形
    fn container_rect(&self) -> Rect;

    fn scroll_left(&self) -> f32 {
        0.0
    }

    /// 缩放后内容的总宽度
    fn scroll_width(&self) -> f32 {
        self.container_rect().width()
    }

    fn channel_count(&self) -> usize {
        1
    }

    fn viewport(&self) -> Viewport {
        let rect = self.container_rect();
        Viewport::new(rect.width(), rect.height()).with_scroll(self.scroll_left(), self.scroll_width())
    }

    fn time_scale(&self) -> TimeScale {
        TimeScale::new(self.duration(), self.viewport())
    }

    /// 全局坐标转换为相对容器左上角的坐标
    fn to_container(&self, pos: Pos2) -> Pos2 {
        let origin = self.container_rect().min;
        Pos2::new(pos.x - origin.x, pos.y - origin.y)
    }
}

/// 不依赖任何窗口的简单宿主：固定时长、可选缩放、模拟播放
///
/// 测试和无界面场景使用它；点击定位（click-to-seek）由 [`handle_click`](Self::handle_click) 模拟。
#[derive(Clone, Debug)]
pub struct StaticWaveform {
    duration: f64,
    current_time: f64,
    playing: bool,
    play_end: Option<f64>,
    rect: Rect,
    scroll_left: f32,
    scroll_width: f32,
    channels: usize,
}

impl StaticWaveform {
    pub fn new(duration: f64, rect: Rect) -> Self {
        Self {
            duration,
            current_time: 0.0,
            playing: false,
            play_end: None,
            rect,
            scroll_left: 0.0,
            scroll_width: rect.width(),
            channels: 1,
        }
    }

    pub fn with_channels(mut self, channels: usize) -> Self {
        self.channels = channels;
        self
    }

    /// 按每秒像素数缩放并滚动到 `scroll_left`
    pub fn with_zoom(mut self, px_per_sec: f32, scroll_left: f32) -> Self {
        let viewport = Viewport::zoomed(
            self.rect.width(),
            self.rect.height(),
            px_per_sec,
            self.duration,
            scroll_left,
        );
        self.scroll_left = viewport.scroll_left;
        self.scroll_width = viewport.scroll_width;
        self
    }

    pub fn set_duration(&mut self, duration: f64) {
        self.duration = duration;
        if self.scroll_width < self.rect.width() {
            self.scroll_width = self.rect.width();
        }
    }

    pub fn play_end(&self) -> Option<f64> {
        self.play_end
    }

    /// 推进模拟播放，到达终点时暂停
    pub fn advance(&mut self, dt: f64) {
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

    /// 宿主自身的点击定位行为
    pub fn handle_click(&mut self, pos: Pos2) {
        let local = self.to_container(pos);
        let time = self.time_scale().x_to_time(local.x);
        self.set_time(time);
    }
}

impl WaveformHost for StaticWaveform {
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
        self.current_time = clamp_time(start, self.duration);
        self.play_end = end;
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn set_time(&mut self, time: f64) {
        self.current_time = clamp_time(time, self.duration);
    }

    fn container_rect(&self) -> Rect {
        self.rect
    }

    fn scroll_left(&self) -> f32 {
        self.scroll_left
    }

    fn scroll_width(&self) -> f32 {
        self.scroll_width
    }

    fn channel_count(&self) -> usize {
        self.channels
    }
}

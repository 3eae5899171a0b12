//! 坐标映射模块
//!
//! 在波形容器内的像素偏移和时间之间相互转换。容器可以滚动和缩放，
//! 因此映射总是以可见宽度、滚动偏移和内容总宽度作为输入。

use egui::{pos2, vec2, Rect};

/// 波形容器当前的可见区域
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,        // 可见宽度（像素）
    pub height: f32,
    pub scroll_left: f32,  // 水平滚动偏移（像素）
    pub scroll_width: f32, // 缩放后内容的总宽度（像素）
}

impl Viewport {
    /// 不滚动、不缩放：整个时长都可见
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            scroll_left: 0.0,
            scroll_width: width,
        }
    }

    pub fn with_scroll(mut self, scroll_left: f32, scroll_width: f32) -> Self {
        self.scroll_left = scroll_left;
        self.scroll_width = scroll_width;
        self
    }

    /// 按每秒像素数缩放；内容宽度不会小于可见宽度
    pub fn zoomed(width: f32, height: f32, px_per_sec: f32, duration: f64, scroll_left: f32) -> Self {
        let scroll_width = (duration as f32 * px_per_sec).max(width);
        let max_scroll = (scroll_width - width).max(0.0);
        Self {
            width,
            height,
            scroll_left: scroll_left.clamp(0.0, max_scroll),
            scroll_width,
        }
    }

    pub fn content_width(&self) -> f32 {
        if self.scroll_width > 0.0 {
            self.scroll_width
        } else {
            self.width
        }
    }

    /// 整个（可能滚出视野的）内容区域，坐标相对于容器左上角
    pub fn content_rect(&self) -> Rect {
        Rect::from_min_size(
            pos2(-self.scroll_left, 0.0),
            vec2(self.content_width(), self.height),
        )
    }
}

/// 将时间限制在 `[0, duration]`；时长未知（<= 0）时只限制下界
pub fn clamp_time(time: f64, duration: f64) -> f64 {
    if duration > 0.0 {
        time.clamp(0.0, duration)
    } else {
        time.max(0.0)
    }
}

/// 像素与时间之间的纯函数映射
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeScale {
    pub duration: f64,
    pub viewport: Viewport,
}

impl TimeScale {
    pub fn new(duration: f64, viewport: Viewport) -> Self {
        Self { duration, viewport }
    }

    /// 容器内的 x 坐标（像素）转换为时间（秒），结果限制在 `[0, duration]`
    pub fn x_to_time(&self, x: f32) -> f64 {
        let width = self.viewport.content_width();
        if self.duration <= 0.0 || width <= 0.0 {
            return 0.0;
        }
        let rel = (x + self.viewport.scroll_left) as f64 / width as f64;
        clamp_time(rel * self.duration, self.duration)
    }

    /// 时间（秒）转换为容器内的 x 坐标（像素）
    pub fn time_to_x(&self, time: f64) -> f32 {
        if self.duration <= 0.0 {
            return -self.viewport.scroll_left;
        }
        let rel = clamp_time(time, self.duration) / self.duration;
        (rel * self.viewport.content_width() as f64) as f32 - self.viewport.scroll_left
    }

    /// 拖拽像素增量对应的时间增量（不做限制）
    pub fn dx_to_dt(&self, dx: f32) -> f64 {
        let width = self.viewport.content_width();
        if self.duration <= 0.0 || width <= 0.0 {
            return 0.0;
        }
        dx as f64 / width as f64 * self.duration
    }
}

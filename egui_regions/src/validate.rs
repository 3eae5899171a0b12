//! 选项校验模块
//!
//! 选项在调用边界处被修复而不是拒绝：时间被限制到 `[0, duration]`，
//! 无效字段被忽略，其余字段照常生效。发现的问题以 [`OptionIssue`] 返回，
//! 由调用方记录日志。

use crate::geometry::clamp_time;
use crate::structure::{RegionData, RegionParams};

/// 校验时发现并已修复的问题
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum OptionIssue {
    #[error("`{field}` is not a finite number and was ignored")]
    NonFinite { field: &'static str },
    #[error("`{field}` = {value} was clamped to {clamped}")]
    Clamped {
        field: &'static str,
        value: f64,
        clamped: f64,
    },
    #[error("channel index {index} is out of range for {channels} channel(s) and was ignored")]
    ChannelOutOfRange { index: usize, channels: usize },
    #[error("region id `{0}` is already in use; the id change was ignored")]
    DuplicateId(String),
    #[error("start {start} is after end {end}; the endpoints were swapped")]
    Inverted { start: f64, end: f64 },
}

/// 校验所需的宿主状态
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Limits {
    pub duration: f64,
    pub channels: usize,
}

fn checked_time(
    field: &'static str,
    value: f64,
    duration: f64,
    issues: &mut Vec<OptionIssue>,
) -> Option<f64> {
    if !value.is_finite() {
        issues.push(OptionIssue::NonFinite { field });
        return None;
    }
    let clamped = clamp_time(value, duration);
    if clamped != value {
        issues.push(OptionIssue::Clamped {
            field,
            value,
            clamped,
        });
    }
    Some(clamped)
}

fn checked_length(field: &'static str, value: f64, issues: &mut Vec<OptionIssue>) -> Option<f64> {
    if !value.is_finite() {
        issues.push(OptionIssue::NonFinite { field });
        return None;
    }
    if value < 0.0 {
        issues.push(OptionIssue::Clamped {
            field,
            value,
            clamped: 0.0,
        });
        return Some(0.0);
    }
    Some(value)
}

/// 将 `params` 合并到 `base` 上，返回修复后的数据和发现的问题
///
/// `id_taken` 判断某个 id 是否已被集合中的其他区域占用。
/// 结果总是满足 `start <= end`。
pub fn sanitize(
    base: &RegionData,
    params: &RegionParams,
    limits: Limits,
    id_taken: impl Fn(&str) -> bool,
) -> (RegionData, Vec<OptionIssue>) {
    let mut next = base.clone();
    let mut issues = Vec::new();

    if let Some(id) = &params.id {
        if *id != base.id {
            if id_taken(id) {
                issues.push(OptionIssue::DuplicateId(id.clone()));
            } else {
                next.id = id.clone();
            }
        }
    }

    if let Some(start) = params.start {
        if let Some(start) = checked_time("start", start, limits.duration, &mut issues) {
            next.start = start;
        }
    }
    if let Some(end) = params.end {
        if let Some(end) = checked_time("end", end, limits.duration, &mut issues) {
            next.end = end;
        }
    }
    if next.start > next.end {
        issues.push(OptionIssue::Inverted {
            start: next.start,
            end: next.end,
        });
        std::mem::swap(&mut next.start, &mut next.end);
    }

    if let Some(color) = &params.color {
        next.color = color.clone();
    }
    if let Some(content) = &params.content {
        next.content = Some(content.clone());
    }
    if let Some(drag) = params.drag {
        next.drag = drag;
    }
    if let Some(resize) = params.resize {
        next.resize = resize;
    }

    if let Some(index) = params.channel_idx {
        if limits.channels > 0 && index >= limits.channels {
            issues.push(OptionIssue::ChannelOutOfRange {
                index,
                channels: limits.channels,
            });
        } else {
            next.channel_idx = Some(index);
        }
    }

    if let Some(min) = params.min_length {
        if let Some(min) = checked_length("minLength", min, &mut issues) {
            next.min_length = min;
        }
    }
    if let Some(max) = params.max_length {
        if let Some(max) = checked_length("maxLength", max, &mut issues) {
            next.max_length = Some(max);
        }
    }

    (next, issues)
}

//! 工具函数模块
//!
//! 包含通用的工具函数：时间格式化和 CSS 颜色解析。

use egui::Color32;

/// 将时间（秒）格式化为 "MM:SS.mmm" 格式
///
/// # 示例
///
/// ```
/// use egui_regions::utils::format_time;
///
/// let formatted = format_time(125.5);
/// assert_eq!(formatted, "02:05.500");
/// ```
pub fn format_time(time_seconds: f64) -> String {
    let time_seconds = time_seconds.max(0.0);
    let minutes = (time_seconds / 60.0) as u32;
    let seconds = (time_seconds % 60.0) as u32;
    let milliseconds = ((time_seconds % 1.0) * 1000.0).round().min(999.0) as u32;
    format!("{:02}:{:02}.{:03}", minutes, seconds, milliseconds)
}

/// 解析区域使用的 CSS 颜色字符串
///
/// 支持 `rgb(r, g, b)`、`rgba(r, g, b, a)`、`#rgb`、`#rrggbb`、`#rrggbbaa`
/// 以及少量颜色名。无法识别时返回 `None`，调用方自行决定回退颜色。
///
/// ```
/// use egui::Color32;
/// use egui_regions::utils::parse_css_color;
///
/// assert_eq!(parse_css_color("#ff0000"), Some(Color32::from_rgb(255, 0, 0)));
/// assert_eq!(parse_css_color("nonsense"), None);
/// ```
pub fn parse_css_color(css: &str) -> Option<Color32> {
    let css = css.trim().to_ascii_lowercase();
    if let Some(hex) = css.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some(args) = css
        .strip_prefix("rgba(")
        .or_else(|| css.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_rgb_args(args);
    }
    match css.as_str() {
        "transparent" => Some(Color32::TRANSPARENT),
        "black" => Some(Color32::BLACK),
        "white" => Some(Color32::WHITE),
        "red" => Some(Color32::from_rgb(255, 0, 0)),
        "green" => Some(Color32::from_rgb(0, 128, 0)),
        "blue" => Some(Color32::from_rgb(0, 0, 255)),
        "yellow" => Some(Color32::from_rgb(255, 255, 0)),
        "gray" | "grey" => Some(Color32::from_rgb(128, 128, 128)),
        _ => None,
    }
}

fn parse_hex(hex: &str) -> Option<Color32> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            // 简写形式每位重复一次
            let mut rgb = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                rgb[i] = v * 17;
            }
            Some(Color32::from_rgb(rgb[0], rgb[1], rgb[2]))
        }
        6 => Some(Color32::from_rgb(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        8 => Some(Color32::from_rgba_unmultiplied(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
            channel(&hex[6..8])?,
        )),
        _ => None,
    }
}

fn parse_rgb_args(args: &str) -> Option<Color32> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    let channel = |s: &str| -> Option<u8> {
        let v: f32 = s.parse().ok()?;
        Some(v.clamp(0.0, 255.0).round() as u8)
    };
    match parts.as_slice() {
        [r, g, b] => Some(Color32::from_rgb(channel(r)?, channel(g)?, channel(b)?)),
        [r, g, b, a] => {
            let alpha: f32 = a.parse().ok()?;
            Some(Color32::from_rgba_unmultiplied(
                channel(r)?,
                channel(g)?,
                channel(b)?,
                (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
            ))
        }
        _ => None,
    }
}

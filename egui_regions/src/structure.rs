//! 数据结构模块
//!
//! 定义了区域编辑器使用的核心数据结构，包括区域数据记录、区域内容以及
//! 创建/修改区域时使用的选项参数。

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

static REGION_KEY_COUNTER: AtomicU64 = AtomicU64::new(1);
static REGION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// 区域的内部稳定键
///
/// 与用户可见、可重命名的 `id` 不同，键在区域的整个生命周期内保持不变，
/// 手势状态和命中测试都通过它引用区域。
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegionKey(pub u64);

impl RegionKey {
    pub fn next() -> Self {
        RegionKey(REGION_KEY_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// 生成一个新的区域 id（单调递增）
pub fn generate_region_id() -> String {
    format!("region-{}", REGION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// 富内容节点
///
/// 宿主预先构建好的元素树，作为不透明句柄插入到区域元素中。
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContentNode {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ContentNode>,
}

impl ContentNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: ContentNode) -> Self {
        self.children.push(child);
        self
    }

    /// 按文档顺序拼接自身及所有子节点的文本
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(text) = &self.text {
            out.push_str(text);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }
}

/// 区域内容：纯文本或富元素，二者互斥
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Node(ContentNode),
}

impl Content {
    pub fn text_content(&self) -> String {
        match self {
            Content::Text(text) => text.clone(),
            Content::Node(node) => node.text_content(),
        }
    }
}

impl From<&str> for Content {
    fn from(value: &str) -> Self {
        Content::Text(value.to_string())
    }
}

impl From<String> for Content {
    fn from(value: String) -> Self {
        Content::Text(value)
    }
}

impl From<ContentNode> for Content {
    fn from(value: ContentNode) -> Self {
        Content::Node(value)
    }
}

pub const DEFAULT_REGION_COLOR: &str = "rgba(0, 0, 0, 0.1)";

/// 区域的纯数据记录
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionData {
    pub id: String,
    pub start: f64,      // 开始时间（秒）
    pub end: f64,        // 结束时间（秒），start == end 时为标记
    pub color: String,   // CSS 颜色字符串
    pub content: Option<Content>,
    pub drag: bool,
    pub resize: bool,
    pub channel_idx: Option<usize>,
    pub min_length: f64,
    pub max_length: Option<f64>,
}

impl RegionData {
    pub fn new(id: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            start: 0.0,
            end: 0.0,
            color: color.into(),
            content: None,
            drag: true,
            resize: true,
            channel_idx: None,
            min_length: 0.0,
            max_length: None,
        }
    }

    pub fn is_marker(&self) -> bool {
        self.start == self.end
    }

    /// 长度是否满足 min/max 限制
    pub fn length_allowed(&self, length: f64) -> bool {
        length >= self.min_length && self.max_length.map_or(true, |max| length <= max)
    }

    /// 播放位置是否落在区域内；标记在其时间点之后 `tolerance` 秒内视为命中
    pub fn contains_time(&self, time: f64, tolerance: f64) -> bool {
        let end = if self.is_marker() {
            self.start + tolerance
        } else {
            self.end
        };
        self.start <= time && time <= end
    }
}

/// 创建或修改区域时的选项
///
/// 所有字段都是可选的：`add_region` 对缺省字段使用默认值，
/// `set_options` 只合并出现的字段。字段名按 camelCase 反序列化，
/// 以便宿主直接使用自己保存的选项对象。
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegionParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drag: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resize: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_idx: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<f64>,
}

impl RegionParams {
    pub fn new(start: f64) -> Self {
        Self {
            start: Some(start),
            ..Default::default()
        }
    }

    pub fn span(start: f64, end: f64) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..Default::default()
        }
    }

    /// 从宿主保存的 JSON 选项对象解析
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_start(mut self, start: f64) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_end(mut self, end: f64) -> Self {
        self.end = Some(end);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<Content>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_drag(mut self, drag: bool) -> Self {
        self.drag = Some(drag);
        self
    }

    pub fn with_resize(mut self, resize: bool) -> Self {
        self.resize = Some(resize);
        self
    }

    pub fn with_channel(mut self, channel_idx: usize) -> Self {
        self.channel_idx = Some(channel_idx);
        self
    }

    pub fn with_min_length(mut self, min_length: f64) -> Self {
        self.min_length = Some(min_length);
        self
    }

    pub fn with_max_length(mut self, max_length: f64) -> Self {
        self.max_length = Some(max_length);
        self
    }
}

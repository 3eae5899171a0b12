//! 区域实体模块
//!
//! [`Region`] 是对一个区域的句柄：数据记录加上它独占的视觉元素。
//! 所有修改（编程调用或拖拽）都走同一条路径：先整体校验、写入数据，
//! 再一次性重新渲染元素，最后才通知监听器。

use crate::bus::{EventBus, ListenerId};
use crate::editor::{RegionEvent, RegionLocalEvent, RegionLocalEventKind};
use crate::element::RegionElement;
use crate::plugin::PluginShared;
use crate::structure::{Content, RegionData, RegionKey, RegionParams};
use crate::validate::{sanitize, Limits};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

pub(crate) struct RegionInner {
    key: RegionKey,
    data: RefCell<RegionData>,
    element: RefCell<Option<RegionElement>>,
    events: EventBus<RegionLocalEvent>,
    plugin: Weak<PluginShared>,
}

#[derive(Clone)]
pub struct Region {
    inner: Rc<RegionInner>,
}

impl Region {
    pub(crate) fn new(data: RegionData, limits: Limits, plugin: Weak<PluginShared>) -> Self {
        let element = RegionElement::render(&data, limits.duration, limits.channels);
        Self {
            inner: Rc::new(RegionInner {
                key: RegionKey::next(),
                data: RefCell::new(data),
                element: RefCell::new(Some(element)),
                events: EventBus::new(),
                plugin,
            }),
        }
    }

    pub fn key(&self) -> RegionKey {
        self.inner.key
    }

    pub fn id(&self) -> String {
        self.inner.data.borrow().id.clone()
    }

    pub fn start(&self) -> f64 {
        self.inner.data.borrow().start
    }

    pub fn end(&self) -> f64 {
        self.inner.data.borrow().end
    }

    pub fn color(&self) -> String {
        self.inner.data.borrow().color.clone()
    }

    pub fn content(&self) -> Option<Content> {
        self.inner.data.borrow().content.clone()
    }

    pub fn drag(&self) -> bool {
        self.inner.data.borrow().drag
    }

    pub fn resize(&self) -> bool {
        self.inner.data.borrow().resize
    }

    pub fn channel_idx(&self) -> Option<usize> {
        self.inner.data.borrow().channel_idx
    }

    pub fn is_marker(&self) -> bool {
        self.inner.data.borrow().is_marker()
    }

    /// 数据记录的快照
    pub fn data(&self) -> RegionData {
        self.inner.data.borrow().clone()
    }

    /// 视觉元素的快照；区域被移除后为 `None`
    pub fn element(&self) -> Option<RegionElement> {
        self.inner.element.borrow().clone()
    }

    pub fn is_removed(&self) -> bool {
        self.inner.element.borrow().is_none()
    }

    pub fn on(
        &self,
        kind: RegionLocalEventKind,
        listener: impl FnMut(&RegionLocalEvent) + 'static,
    ) -> ListenerId {
        self.inner.events.on(kind, listener)
    }

    pub fn once(
        &self,
        kind: RegionLocalEventKind,
        listener: impl FnMut(&RegionLocalEvent) + 'static,
    ) -> ListenerId {
        self.inner.events.once(kind, listener)
    }

    pub fn un(&self, id: ListenerId) -> bool {
        self.inner.events.un(id)
    }

    /// 合并部分选项并一次性重新渲染
    ///
    /// 对已移除的区域调用时什么也不做。修改生效后先发出区域级
    /// `UpdateEnd`，再由插件发出 `region-updated`，都在返回之前完成。
    pub fn set_options(&self, params: RegionParams) {
        if self.is_removed() {
            log::debug!("set_options on removed region `{}` ignored", self.id());
            return;
        }
        let Some(plugin) = self.inner.plugin.upgrade() else {
            log::debug!("set_options on detached region `{}` ignored", self.id());
            return;
        };

        let limits = plugin.limits();
        let base = self.data();
        let (next, issues) = sanitize(&base, &params, limits, |id| plugin.id_taken(id, self.key()));
        for issue in &issues {
            log::warn!("region `{}`: {}", base.id, issue);
        }
        if next == base {
            return;
        }

        *self.inner.data.borrow_mut() = next;
        self.render(limits);

        self.emit_local(RegionLocalEvent::UpdateEnd);
        if plugin.contains(self.key()) {
            plugin.emit(RegionEvent::Updated(self.clone()));
        }
    }

    /// 只替换内容，旧内容被整体移除
    pub fn set_content(&self, content: impl Into<Content>) {
        self.set_options(RegionParams {
            content: Some(content.into()),
            ..Default::default()
        });
    }

    /// 移除区域；第二次调用是空操作
    pub fn remove(&self) {
        if self.is_removed() {
            return;
        }
        match self.inner.plugin.upgrade() {
            Some(plugin) => plugin.detach(self),
            None => {
                self.detach_element();
                self.emit_local(RegionLocalEvent::Remove);
            }
        }
    }

    /// 请求宿主从区域起点开始播放，可选在 `end` 处停止
    pub fn play(&self, end: Option<f64>) {
        if self.is_removed() {
            return;
        }
        let Some(plugin) = self.inner.plugin.upgrade() else {
            return;
        };
        self.emit_local(RegionLocalEvent::Play(end));
        plugin.play(self.start(), end);
    }

    pub(crate) fn render(&self, limits: Limits) {
        let data = self.inner.data.borrow();
        if let Some(element) = self.inner.element.borrow_mut().as_mut() {
            *element = RegionElement::render(&data, limits.duration, limits.channels);
        }
    }

    /// 手势路径：只改几何并重新渲染
    pub(crate) fn set_span(&self, start: f64, end: f64, limits: Limits) {
        {
            let mut data = self.inner.data.borrow_mut();
            data.start = start;
            data.end = end;
        }
        self.render(limits);
    }

    /// 卸下视觉元素；返回之前是否还挂着
    pub(crate) fn detach_element(&self) -> bool {
        self.inner.element.borrow_mut().take().is_some()
    }

    pub(crate) fn emit_local(&self, event: RegionLocalEvent) {
        self.inner.events.emit(event);
    }

    pub(crate) fn clear_listeners(&self) {
        self.inner.events.un_all();
    }
}

impl PartialEq for Region {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Region {}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.inner.data.borrow();
        f.debug_struct("Region")
            .field("key", &self.inner.key)
            .field("id", &data.id)
            .field("start", &data.start)
            .field("end", &data.end)
            .field("removed", &self.is_removed())
            .finish()
    }
}

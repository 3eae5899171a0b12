//! 事件总线模块
//!
//! 固定事件集合的类型化发布/订阅。监听器在分发时不持有总线的借用，
//! 因此监听器内部可以安全地再次修改插件（添加、删除区域等）。

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// 可在总线上分发的事件
pub trait BusEvent: Clone + 'static {
    type Kind: Copy + Eq + fmt::Debug + 'static;

    fn kind(&self) -> Self::Kind;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

type Callback<E> = Rc<RefCell<dyn FnMut(&E)>>;

struct Listener<E: BusEvent> {
    id: ListenerId,
    kind: Option<E::Kind>,
    once: bool,
    callback: Callback<E>,
}

pub struct EventBus<E: BusEvent> {
    listeners: RefCell<Vec<Listener<E>>>,
    next_id: Cell<u64>,
    queue: Option<RefCell<Vec<E>>>,
}

impl<E: BusEvent> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: BusEvent> EventBus<E> {
    pub fn new() -> Self {
        Self {
            listeners: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
            queue: None,
        }
    }

    /// 除了通知监听器，还把事件排队等待 [`take_events`](Self::take_events) 取走
    pub fn with_queue() -> Self {
        Self {
            queue: Some(RefCell::new(Vec::new())),
            ..Self::new()
        }
    }

    fn subscribe(&self, kind: Option<E::Kind>, once: bool, callback: Callback<E>) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push(Listener {
            id,
            kind,
            once,
            callback,
        });
        id
    }

    pub fn on(&self, kind: E::Kind, listener: impl FnMut(&E) + 'static) -> ListenerId {
        self.subscribe(Some(kind), false, Rc::new(RefCell::new(listener)))
    }

    pub fn once(&self, kind: E::Kind, listener: impl FnMut(&E) + 'static) -> ListenerId {
        self.subscribe(Some(kind), true, Rc::new(RefCell::new(listener)))
    }

    pub fn on_any(&self, listener: impl FnMut(&E) + 'static) -> ListenerId {
        self.subscribe(None, false, Rc::new(RefCell::new(listener)))
    }

    /// 取消订阅；返回监听器是否存在
    pub fn un(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|l| l.id != id);
        listeners.len() != before
    }

    pub fn un_all(&self) {
        self.listeners.borrow_mut().clear();
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn emit(&self, event: E) {
        if let Some(queue) = &self.queue {
            queue.borrow_mut().push(event.clone());
        }

        let kind = event.kind();
        let matched: Vec<Callback<E>> = {
            let mut listeners = self.listeners.borrow_mut();
            let matched: Vec<Callback<E>> = listeners
                .iter()
                .filter(|l| l.kind.map_or(true, |k| k == kind))
                .map(|l| l.callback.clone())
                .collect();
            listeners.retain(|l| !(l.once && l.kind == Some(kind)));
            matched
        };

        for callback in matched {
            match callback.try_borrow_mut() {
                Ok(mut listener) => (&mut *listener)(&event),
                Err(_) => log::warn!("listener re-entered while handling {:?}; skipped", kind),
            }
        }
    }

    pub fn take_events(&self) -> Vec<E> {
        self.queue
            .as_ref()
            .map(|queue| std::mem::take(&mut *queue.borrow_mut()))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Ping {
        A(u32),
        B,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum PingKind {
        A,
        B,
    }

    impl BusEvent for Ping {
        type Kind = PingKind;

        fn kind(&self) -> PingKind {
            match self {
                Ping::A(_) => PingKind::A,
                Ping::B => PingKind::B,
            }
        }
    }

    #[test]
    fn delivers_only_matching_kind() {
        let bus = EventBus::<Ping>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        bus.on(PingKind::A, move |e| sink.borrow_mut().push(*e));
        bus.emit(Ping::A(1));
        bus.emit(Ping::B);
        bus.emit(Ping::A(2));
        assert_eq!(*seen.borrow(), vec![Ping::A(1), Ping::A(2)]);
    }

    #[test]
    fn once_fires_a_single_time() {
        let bus = EventBus::<Ping>::new();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        bus.once(PingKind::B, move |_| c.set(c.get() + 1));
        bus.emit(Ping::A(0));
        bus.emit(Ping::B);
        bus.emit(Ping::B);
        assert_eq!(count.get(), 1);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn un_removes_listener() {
        let bus = EventBus::<Ping>::new();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let id = bus.on_any(move |_| c.set(c.get() + 1));
        bus.emit(Ping::B);
        assert!(bus.un(id));
        assert!(!bus.un(id));
        bus.emit(Ping::B);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn listener_may_subscribe_during_emit() {
        let bus = Rc::new(EventBus::<Ping>::new());
        let inner = bus.clone();
        bus.once(PingKind::A, move |_| {
            inner.on(PingKind::B, |_| {});
        });
        bus.emit(Ping::A(7));
        assert_eq!(bus.listener_count(), 1);
    }

    #[test]
    fn queue_collects_events_when_enabled() {
        let bus = EventBus::<Ping>::with_queue();
        bus.emit(Ping::A(3));
        bus.emit(Ping::B);
        assert_eq!(bus.take_events(), vec![Ping::A(3), Ping::B]);
        assert!(bus.take_events().is_empty());

        let plain = EventBus::<Ping>::new();
        plain.emit(Ping::B);
        assert!(plain.take_events().is_empty());
    }
}

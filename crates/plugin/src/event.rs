use anyhow::Result;
use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::trace;

/// A shared cancellation flag.
///
/// Cloning a handle does not copy the flag, both handles observe and modify
/// the same state. Derived events hold a clone of the handle belonging to the
/// event they were derived from.
#[derive(Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn new() -> CancelHandle {
        Default::default()
    }

    pub fn get(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn set(&self, cancelled: bool) {
        self.0.store(cancelled, Ordering::Release);
    }

    /// Whether both handles refer to the same flag.
    pub fn same_flag(&self, other: &CancelHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CancelHandle").field(&self.get()).finish()
    }
}

pub trait Event: Any + Send {
    /// The cancellation flag of this event, if it can be cancelled.
    fn cancel_handle(&self) -> Option<&CancelHandle> {
        None
    }
}

pub trait Cancellable: Event {
    fn is_cancelled(&self) -> bool;
    fn set_cancelled(&mut self, cancel: bool);
}

/// Handlers run from `Lowest` to `Monitor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventPriority {
    Lowest,
    Low,
    Normal,
    High,
    Highest,
    /// Should only observe the outcome, not change it.
    Monitor,
}

type Handler<E> = Box<dyn Fn(&EventBus, &mut E) -> Result<()> + Send + Sync>;

struct RegisteredHandler<E> {
    priority: EventPriority,
    ignore_cancelled: bool,
    handler: Handler<E>,
}

/// All handlers registered for one event type.
pub struct HandlerList<E> {
    handlers: Vec<RegisteredHandler<E>>,
}

impl<E> Default for HandlerList<E> {
    fn default() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }
}

impl<E: Event> HandlerList<E> {
    fn register(&mut self, priority: EventPriority, ignore_cancelled: bool, handler: Handler<E>) {
        // Handlers of equal priority keep their registration order
        let idx = self
            .handlers
            .partition_point(|registered| registered.priority <= priority);
        self.handlers.insert(
            idx,
            RegisteredHandler {
                priority,
                ignore_cancelled,
                handler,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Owns one [`HandlerList`] per event type.
#[derive(Default)]
pub struct EventBus {
    handler_lists: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> EventBus {
        Default::default()
    }

    pub fn register<E, F>(&mut self, priority: EventPriority, ignore_cancelled: bool, handler: F)
    where
        E: Event,
        F: Fn(&EventBus, &mut E) -> Result<()> + Send + Sync + 'static,
    {
        self.handlers_mut::<E>()
            .register(priority, ignore_cancelled, Box::new(handler));
    }

    /// The handler list of `E`, or `None` if nothing was ever registered for it.
    pub fn handlers<E: Event>(&self) -> Option<&HandlerList<E>> {
        self.handler_lists
            .get(&TypeId::of::<E>())
            .and_then(|list| list.downcast_ref::<HandlerList<E>>())
    }

    fn handlers_mut<E: Event>(&mut self) -> &mut HandlerList<E> {
        let list = self
            .handler_lists
            .entry(TypeId::of::<E>())
            .or_insert_with(|| Box::new(HandlerList::<E>::default()));
        match list.downcast_mut::<HandlerList<E>>() {
            Some(list) => list,
            None => unreachable!("Handler list is keyed by the TypeId of its event"),
        }
    }

    pub fn handler_count<E: Event>(&self) -> usize {
        self.handlers::<E>().map_or(0, HandlerList::len)
    }

    /// Runs every handler registered for `E` in priority order.
    ///
    /// The first handler error stops dispatch and is returned as is.
    pub fn call<E: Event>(&self, event: &mut E) -> Result<()> {
        let Some(list) = self.handlers::<E>() else {
            return Ok(());
        };

        for registered in &list.handlers {
            let cancelled = event.cancel_handle().is_some_and(CancelHandle::get);
            if cancelled && registered.ignore_cancelled {
                trace!(
                    "Skipping {:?} handler for cancelled {}",
                    registered.priority,
                    type_name::<E>()
                );
                continue;
            }
            (registered.handler)(self, event)?;
        }
        Ok(())
    }
}

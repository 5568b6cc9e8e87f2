//! The event api warp extensions are written against.
//!
//! A host owns an [`EventBus`](event::EventBus), registers handlers on it and
//! calls events through it. There is no global handler state: every handler
//! list lives inside the bus it was registered on.

#![deny(rust_2018_idioms)]

pub mod event;
pub mod player;

pub use event::{CancelHandle, Cancellable, Event, EventBus, EventPriority, HandlerList};
pub use player::{HyphenatedUUID, Player, PlayerCommandPreprocessEvent};

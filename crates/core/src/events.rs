//! Events fired when a player runs an Essentials warp command.
//!
//! Both events share the cancellation flag of the
//! [`PlayerCommandPreprocessEvent`] they were created from. Cancelling a warp
//! event cancels the command itself, and a command cancelled by someone else
//! shows up as a cancelled warp event.

use std::sync::Arc;
use warpevents_plugin::{
    CancelHandle, Cancellable, Event, Player, PlayerCommandPreprocessEvent,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarpAction {
    Create,
    Delete,
}

macro_rules! warp_event {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $name {
            player: Arc<Player>,
            warp_name: Option<String>,
            cancelled: CancelHandle,
        }

        impl $name {
            pub fn new(command: &PlayerCommandPreprocessEvent, warp_name: Option<String>) -> Self {
                Self {
                    player: command.player().clone(),
                    warp_name,
                    cancelled: command.cancelled().clone(),
                }
            }

            pub fn player(&self) -> &Arc<Player> {
                &self.player
            }

            /// `None` if the command had no arguments.
            pub fn warp_name(&self) -> Option<&str> {
                self.warp_name.as_deref()
            }
        }

        impl Event for $name {
            fn cancel_handle(&self) -> Option<&CancelHandle> {
                Some(&self.cancelled)
            }
        }

        impl Cancellable for $name {
            fn is_cancelled(&self) -> bool {
                self.cancelled.get()
            }

            fn set_cancelled(&mut self, cancel: bool) {
                self.cancelled.set(cancel);
            }
        }
    };
}

warp_event!(
    /// A player is about to create (or overwrite) a warp.
    WarpCreateEvent
);

warp_event!(
    /// A player is about to delete a warp.
    WarpDeleteEvent
);

/// Either warp event, for observers that treat both alike.
#[derive(Debug)]
pub enum WarpOutcomeEvent {
    Create(WarpCreateEvent),
    Delete(WarpDeleteEvent),
}

impl WarpOutcomeEvent {
    pub fn new(
        action: WarpAction,
        command: &PlayerCommandPreprocessEvent,
        warp_name: Option<String>,
    ) -> WarpOutcomeEvent {
        match action {
            WarpAction::Create => {
                WarpOutcomeEvent::Create(WarpCreateEvent::new(command, warp_name))
            }
            WarpAction::Delete => {
                WarpOutcomeEvent::Delete(WarpDeleteEvent::new(command, warp_name))
            }
        }
    }

    pub fn action(&self) -> WarpAction {
        match self {
            WarpOutcomeEvent::Create(_) => WarpAction::Create,
            WarpOutcomeEvent::Delete(_) => WarpAction::Delete,
        }
    }

    pub fn player(&self) -> &Arc<Player> {
        match self {
            WarpOutcomeEvent::Create(event) => event.player(),
            WarpOutcomeEvent::Delete(event) => event.player(),
        }
    }

    pub fn warp_name(&self) -> Option<&str> {
        match self {
            WarpOutcomeEvent::Create(event) => event.warp_name(),
            WarpOutcomeEvent::Delete(event) => event.warp_name(),
        }
    }
}

impl Event for WarpOutcomeEvent {
    fn cancel_handle(&self) -> Option<&CancelHandle> {
        match self {
            WarpOutcomeEvent::Create(event) => event.cancel_handle(),
            WarpOutcomeEvent::Delete(event) => event.cancel_handle(),
        }
    }
}

impl Cancellable for WarpOutcomeEvent {
    fn is_cancelled(&self) -> bool {
        match self {
            WarpOutcomeEvent::Create(event) => event.is_cancelled(),
            WarpOutcomeEvent::Delete(event) => event.is_cancelled(),
        }
    }

    fn set_cancelled(&mut self, cancel: bool) {
        match self {
            WarpOutcomeEvent::Create(event) => event.set_cancelled(cancel),
            WarpOutcomeEvent::Delete(event) => event.set_cancelled(cancel),
        }
    }
}

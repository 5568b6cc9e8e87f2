use super::parser;
use crate::events::{WarpAction, WarpOutcomeEvent};
use crate::permissions::{DELWARP_PERMISSION, PermissionOracle, SETWARP_PERMISSION};
use anyhow::Result;
use tracing::{debug, trace};
use warpevents_plugin::{Cancellable, EventBus, EventPriority, PlayerCommandPreprocessEvent};

/// Essentials commands that create a warp.
pub const CREATE_COMMANDS: [&str; 4] = ["/setwarp", "/esetwarp", "/createwarp", "/ecreatewarp"];

/// Essentials commands that delete a warp.
pub const DELETE_COMMANDS: [&str; 6] = [
    "/delwarp",
    "/edelwarp",
    "/remwarp",
    "/eremwarp",
    "/rmwarp",
    "/ermwarp",
];

/// Watches player commands and fires [`WarpCreateEvent`] or
/// [`WarpDeleteEvent`] for the Essentials warp commands.
///
/// [`WarpCreateEvent`]: crate::events::WarpCreateEvent
/// [`WarpDeleteEvent`]: crate::events::WarpDeleteEvent
pub struct WarpCommandListener<P> {
    permissions: P,
}

impl<P> WarpCommandListener<P>
where
    P: PermissionOracle,
    P::Error: std::error::Error + Send + Sync + 'static,
{
    pub fn new(permissions: P) -> Self {
        Self { permissions }
    }

    /// Which warp command `command` is, if any. Matching is exact.
    pub fn classify(command: &str) -> Option<WarpAction> {
        if CREATE_COMMANDS.contains(&command) {
            Some(WarpAction::Create)
        } else if DELETE_COMMANDS.contains(&command) {
            Some(WarpAction::Delete)
        } else {
            None
        }
    }

    /// Handles one command notification and returns the warp event fired for
    /// it, if any. Cancelled notifications are ignored.
    ///
    /// Errors from the permission oracle and from warp event handlers are
    /// returned unchanged.
    pub fn on_command(
        &self,
        bus: &EventBus,
        event: &PlayerCommandPreprocessEvent,
    ) -> Result<Option<WarpAction>> {
        if event.is_cancelled() {
            return Ok(None);
        }

        let player = event.player();
        let buffer = event.message();
        let input = parser::extract_command(buffer);

        let action = if self.permissions.has_permission(player, SETWARP_PERMISSION)?
            && CREATE_COMMANDS.contains(&input)
        {
            WarpAction::Create
        } else if self.permissions.has_permission(player, DELWARP_PERMISSION)?
            && DELETE_COMMANDS.contains(&input)
        {
            WarpAction::Delete
        } else {
            trace!("Ignoring command {} from {}", input, player.username);
            return Ok(None);
        };

        let warp_name = parser::extract_warp_name(buffer).map(str::to_owned);
        debug!(
            "{} ran {} ({:?}) for warp {:?}",
            player.username, input, action, warp_name
        );

        match WarpOutcomeEvent::new(action, event, warp_name) {
            WarpOutcomeEvent::Create(mut create) => bus.call(&mut create)?,
            WarpOutcomeEvent::Delete(mut delete) => bus.call(&mut delete)?,
        }

        if event.is_cancelled() {
            debug!("{:?} warp command from {} was cancelled", action, player.username);
        }
        Ok(Some(action))
    }
}

impl<P> WarpCommandListener<P>
where
    P: PermissionOracle + Send + Sync + 'static,
    P::Error: std::error::Error + Send + Sync + 'static,
{
    /// Subscribes the listener to command notifications at low priority,
    /// skipping notifications that are already cancelled.
    pub fn register(self, bus: &mut EventBus) {
        bus.register::<PlayerCommandPreprocessEvent, _>(
            EventPriority::Low,
            true,
            move |bus, event| {
                self.on_command(bus, event)?;
                Ok(())
            },
        );
    }
}

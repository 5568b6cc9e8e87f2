use std::sync::{Arc, Mutex};
use warpevents_core::commands::WarpCommandListener;
use warpevents_core::events::{WarpAction, WarpCreateEvent, WarpDeleteEvent};
use warpevents_core::permissions::PermissionOracle;
use warpevents_plugin::{Cancellable, EventBus, EventPriority, Player, PlayerCommandPreprocessEvent};

/// A warp event as seen by an observer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observed {
    pub action: WarpAction,
    pub username: String,
    pub warp_name: Option<String>,
    pub cancelled: bool,
}

/// An event bus with the warp listener registered and a monitor recording
/// every warp event that reaches it.
pub struct TestServer {
    pub bus: EventBus,
    observed: Arc<Mutex<Vec<Observed>>>,
}

impl TestServer {
    pub fn new<P>(permissions: P) -> TestServer
    where
        P: PermissionOracle + Send + Sync + 'static,
        P::Error: std::error::Error + Send + Sync + 'static,
    {
        let mut bus = EventBus::new();
        WarpCommandListener::new(permissions).register(&mut bus);

        let observed = Arc::new(Mutex::new(Vec::new()));
        let o = observed.clone();
        bus.register::<WarpCreateEvent, _>(EventPriority::Monitor, false, move |_, event| {
            o.lock().unwrap().push(Observed {
                action: WarpAction::Create,
                username: event.player().username.clone(),
                warp_name: event.warp_name().map(str::to_owned),
                cancelled: event.is_cancelled(),
            });
            Ok(())
        });
        let o = observed.clone();
        bus.register::<WarpDeleteEvent, _>(EventPriority::Monitor, false, move |_, event| {
            o.lock().unwrap().push(Observed {
                action: WarpAction::Delete,
                username: event.player().username.clone(),
                warp_name: event.warp_name().map(str::to_owned),
                cancelled: event.is_cancelled(),
            });
            Ok(())
        });

        TestServer { bus, observed }
    }

    /// Dispatches `message` as typed by `username` and returns the notification.
    pub fn run(&self, username: &str, message: &str) -> PlayerCommandPreprocessEvent {
        let mut event = PlayerCommandPreprocessEvent::new(Arc::new(Player::offline(username)), message);
        self.bus.call(&mut event).unwrap();
        event
    }

    pub fn observed(&self) -> Vec<Observed> {
        self.observed.lock().unwrap().clone()
    }
}

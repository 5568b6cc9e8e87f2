use crate::event::{CancelHandle, Cancellable, Event};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;
use std::sync::Arc;

pub struct HyphenatedUUID(pub u128);

impl fmt::Display for HyphenatedUUID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut hex = format!("{:032x}", self.0);
        hex.insert(8, '-');
        hex.insert(13, '-');
        hex.insert(18, '-');
        hex.insert(23, '-');
        f.write_str(&hex)
    }
}

impl FromStr for HyphenatedUUID {
    type Err = ParseIntError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.replace('-', "");
        Ok(HyphenatedUUID(u128::from_str_radix(&hex, 16)?))
    }
}

/// The identity of a connected player, as handed out by the host.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Player {
    pub uuid: u128,
    pub username: String,
}

impl fmt::Debug for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Player")
            .field("username", &self.username)
            .field("uuid", &HyphenatedUUID(self.uuid).to_string())
            .finish()
    }
}

impl Player {
    pub fn new(uuid: u128, username: impl Into<String>) -> Player {
        Player {
            uuid,
            username: username.into(),
        }
    }

    /// A player in offline mode, identified the same way vanilla servers do.
    pub fn offline(username: impl Into<String>) -> Player {
        let username = username.into();
        Player::new(Player::generate_offline_uuid(&username), username)
    }

    pub fn generate_offline_uuid(username: &str) -> u128 {
        u128::from_be_bytes(md5::compute(format!("OfflinePlayer:{}", username)).0)
            // Encode version and varient into uuid
            & (!(0xC << 60) & !(0xF << 76))
            | ((0x8 << 60) | (0x3 << 76))
    }
}

/// Sent by the host for every raw command line a player types, before the
/// command is executed. A cancelled notification is not executed.
#[derive(Debug)]
pub struct PlayerCommandPreprocessEvent {
    player: Arc<Player>,
    message: String,
    cancelled: CancelHandle,
}

impl PlayerCommandPreprocessEvent {
    pub fn new(player: Arc<Player>, message: impl Into<String>) -> Self {
        Self {
            player,
            message: message.into(),
            cancelled: CancelHandle::new(),
        }
    }

    pub fn player(&self) -> &Arc<Player> {
        &self.player
    }

    /// The raw command line, including the leading slash.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cancelled(&self) -> &CancelHandle {
        &self.cancelled
    }
}

impl Event for PlayerCommandPreprocessEvent {
    fn cancel_handle(&self) -> Option<&CancelHandle> {
        Some(&self.cancelled)
    }
}

impl Cancellable for PlayerCommandPreprocessEvent {
    fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }

    fn set_cancelled(&mut self, cancel: bool) {
        self.cancelled.set(cancel);
    }
}

#[test]
fn offline_uuid_is_version_3() {
    let uuid = Player::generate_offline_uuid("Notch");
    assert_eq!((uuid >> 76) & 0xF, 0x3);
    assert_eq!((uuid >> 62) & 0x3, 0x2);
    assert_eq!(Player::offline("Notch").uuid, uuid);
    assert_ne!(Player::generate_offline_uuid("notch"), uuid);
}

#[test]
fn hyphenated_uuid_round_trip() {
    let text = "069a79f4-44e9-4726-a5be-fca90e38aaf5";
    let uuid: HyphenatedUUID = text.parse().unwrap();
    assert_eq!(uuid.0, 0x069a79f444e94726a5befca90e38aaf5);
    assert_eq!(uuid.to_string(), text);
}

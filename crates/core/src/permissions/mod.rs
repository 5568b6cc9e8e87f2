use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet, VecDeque};
use std::convert::Infallible;
use thiserror::Error;
use tracing::debug;
use warpevents_plugin::Player;

pub const SETWARP_PERMISSION: &str = "essentials.setwarp";
pub const DELWARP_PERMISSION: &str = "essentials.delwarp";

#[derive(Debug, Error)]
pub enum PermissionsError {
    #[error("Group '{group}' referenced by '{owner}' does not exist")]
    UnknownGroup { group: String, owner: String },
}

/// Answers whether a player holds a permission node.
///
/// Errors are not handled by the warp listener, they are returned to whoever
/// dispatched the command.
pub trait PermissionOracle {
    type Error;

    fn has_permission(&self, player: &Player, node: &str) -> Result<bool, Self::Error>;
}

/// Grants everything. Used when no permission system is set up.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

impl PermissionOracle for AllowAll {
    type Error = Infallible;

    fn has_permission(&self, _: &Player, _: &str) -> Result<bool, Infallible> {
        Ok(true)
    }
}

/// `None` means permissions are not enabled, so everything is allowed.
impl<O: PermissionOracle> PermissionOracle for Option<O> {
    type Error = O::Error;

    fn has_permission(&self, player: &Player, node: &str) -> Result<bool, O::Error> {
        match self {
            Some(oracle) => oracle.has_permission(player, node),
            None => Ok(true),
        }
    }
}

#[derive(Debug)]
enum PathSegment {
    WildCard,
    Named(String),
}

#[derive(Debug)]
struct PermissionNode {
    path: Vec<PathSegment>,
    value: bool,
}

impl PermissionNode {
    fn matches(&self, str: &str) -> bool {
        let mut segments = str.split('.');
        for path_segment in &self.path {
            match (path_segment, segments.next()) {
                (PathSegment::WildCard, Some(_)) => return true,
                (PathSegment::Named(name), Some(segment)) if name == segment => {}
                _ => return false,
            }
        }
        segments.next().is_none()
    }

    fn specificity(&self) -> usize {
        self.path
            .iter()
            .take_while(|segment| matches!(segment, PathSegment::Named(_)))
            .count()
    }
}

#[derive(Debug, Default)]
pub struct PlayerPermissionsCache {
    nodes: Vec<PermissionNode>,
}

impl PlayerPermissionsCache {
    /// The value of the most specific node matching `name`. Between equally
    /// specific nodes the one inserted first wins.
    pub fn get_node_val(&self, name: &str) -> Option<bool> {
        self.nodes
            .iter()
            .filter(|node| node.matches(name))
            .min_by_key(|node| Reverse(node.specificity()))
            .map(|node| node.value)
    }

    pub fn insert(&mut self, name: &str, value: bool) {
        let path = name
            .split('.')
            .map(|s| match s {
                "*" => PathSegment::WildCard,
                s => PathSegment::Named(s.to_owned()),
            })
            .collect();
        self.nodes.push(PermissionNode { path, value });
    }
}

/// Node values per user and per group. A node named `group.<name>` set to
/// `true` makes the owner inherit every node of that group.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct PermissionsConfig {
    #[serde(default)]
    pub users: IndexMap<String, IndexMap<String, bool>>,
    #[serde(default)]
    pub groups: IndexMap<String, IndexMap<String, bool>>,
}

/// Resolved permission caches for every configured user.
#[derive(Debug, Default)]
pub struct PermissionStore {
    players: HashMap<String, PlayerPermissionsCache>,
}

impl PermissionStore {
    pub fn from_config(config: &PermissionsConfig) -> Result<PermissionStore, PermissionsError> {
        let mut players = HashMap::new();
        for (username, nodes) in &config.users {
            let cache = load_player_cache(config, username, nodes)?;
            debug!(
                "Loaded {} permission nodes for {}",
                cache.nodes.len(),
                username
            );
            players.insert(username.clone(), cache);
        }
        Ok(PermissionStore { players })
    }

    pub fn player_cache(&self, username: &str) -> Option<&PlayerPermissionsCache> {
        self.players.get(username)
    }
}

/// Inserts the player's own nodes first, then the nodes of every group they
/// inherit, breadth first. Each group is loaded once.
fn load_player_cache(
    config: &PermissionsConfig,
    username: &str,
    nodes: &IndexMap<String, bool>,
) -> Result<PlayerPermissionsCache, PermissionsError> {
    let mut cache = PlayerPermissionsCache::default();
    let mut loaded = HashSet::new();
    let mut pending = VecDeque::from([(username, nodes)]);

    while let Some((owner, nodes)) = pending.pop_front() {
        for (path_str, &value) in nodes {
            cache.insert(path_str, value);

            let Some(group_name) = path_str.strip_prefix("group.") else {
                continue;
            };
            if !value {
                continue;
            }
            let Some((group_name, group_nodes)) = config.groups.get_key_value(group_name) else {
                return Err(PermissionsError::UnknownGroup {
                    group: group_name.to_owned(),
                    owner: owner.to_owned(),
                });
            };
            if loaded.insert(group_name.as_str()) {
                pending.push_back((group_name.as_str(), group_nodes));
            }
        }
    }
    Ok(cache)
}

impl PermissionOracle for PermissionStore {
    type Error = PermissionsError;

    fn has_permission(&self, player: &Player, node: &str) -> Result<bool, PermissionsError> {
        // Players and nodes that are not configured are denied
        Ok(self
            .player_cache(&player.username)
            .and_then(|cache| cache.get_node_val(node))
            .unwrap_or(false))
    }
}

//! Advancement event types and the handler trait the host dispatches them through.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A connected player, as seen by this plugin.
pub trait Player: Send + Sync {
    fn name(&self) -> &str;

    fn uuid(&self) -> Uuid;

    /// Send an already-localized line to the player's chat.
    fn send_system_message(&self, message: &str);
}

/// Handler for one host event type.
pub trait EventHandler<E>: Send + Sync {
    fn handle<'a>(&'a self, event: &'a E) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>>;
}

/// Namespaced advancement identifier, e.g. `minecraft:story/mine_stone`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdvancementId(String);

impl AdvancementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AdvancementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Advancement type, shown by its icon frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AdvancementFrame {
    Task,
    Goal,
    Challenge,
    /// Frame name the plugin doesn't know how to reward.
    Other(String),
}

impl AdvancementFrame {
    /// Parse the frame name sent by the server.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "task" => Self::Task,
            "goal" => Self::Goal,
            "challenge" => Self::Challenge,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Task => "task",
            Self::Goal => "goal",
            Self::Challenge => "challenge",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for AdvancementFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Display metadata. Advancements without it are invisible recipe/root entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvancementDisplay {
    pub title: String,
    pub frame: AdvancementFrame,
    /// Hidden until earned. Hidden advancements still earn rewards when announced.
    pub hidden: bool,
    pub announce_to_chat: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advancement {
    pub id: AdvancementId,
    pub display: Option<AdvancementDisplay>,
}

impl Advancement {
    #[must_use]
    pub fn title(&self) -> &str {
        self.display
            .as_ref()
            .map_or_else(|| self.id.as_str(), |display| display.title.as_str())
    }
}

/// Fired after a player has been granted an advancement.
#[derive(Clone)]
pub struct PlayerAdvancementEvent {
    /// The player who earned the advancement.
    pub player: Arc<dyn Player>,
    pub advancement: Advancement,
}

impl PlayerAdvancementEvent {
    #[must_use]
    pub fn new(player: Arc<dyn Player>, advancement: Advancement) -> Self {
        Self {
            player,
            advancement,
        }
    }

    #[must_use]
    pub fn get_player(&self) -> &Arc<dyn Player> {
        &self.player
    }
}

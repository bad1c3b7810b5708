//! Narrow interfaces onto the host game client.
//!
//! The scouter never reaches into the client directly. Everything it needs is
//! behind these traits so the host (or a test) decides what a position,
//! world or inventory is.

use std::collections::HashMap;
use std::sync::Arc;

use crate::premove::PremoveIndicator;
use crate::types::{Coordinate, ItemId, WorldId, WorldMetadata};
use crate::view::ViewState;

/// Lifecycle stage of the host client, in the order it moves through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GameState {
    Unknown,
    Starting,
    LoginScreen,
    LoginScreenAuthenticator,
    LoggingIn,
    Loading,
    LoggedIn,
    ConnectionLost,
    Hopping,
}

impl GameState {
    /// True when this state is `other` or any later stage.
    pub fn at_least(self, other: GameState) -> bool {
        self >= other
    }
}

/// Per-world location codes published by the client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorldLocationTable {
    locations: HashMap<WorldId, i32>,
}

impl WorldLocationTable {
    pub fn new(locations: HashMap<WorldId, i32>) -> Self {
        Self { locations }
    }

    pub fn get(&self, world: WorldId) -> Option<i32> {
        self.locations.get(&world).copied()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

impl FromIterator<(WorldId, i32)> for WorldLocationTable {
    fn from_iter<I: IntoIterator<Item = (WorldId, i32)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// The running game client.
pub trait GameClient: Send + Sync {
    fn game_state(&self) -> GameState;

    /// World the local player is connected to.
    fn world(&self) -> WorldId;

    /// Absolute position of the local player, if logged in.
    fn player_position(&self) -> Option<Coordinate>;

    /// Whether the player's world view is an instance.
    fn is_instanced(&self) -> bool;

    /// Player position mapped from the instance back onto its template map.
    fn template_position(&self) -> Option<Coordinate>;

    fn inventory_contains(&self, item: ItemId) -> bool;

    /// World location codes.
    ///
    /// Only valid on the client context; callers must go through
    /// [`crate::dispatch::ClientThread`].
    fn world_locations(&self) -> Option<WorldLocationTable>;
}

/// Source of the public world list.
pub trait WorldListProvider: Send + Sync {
    /// Current world list, or `None` if it could not be fetched.
    fn worlds(&self) -> Option<Vec<WorldMetadata>>;
}

/// A line for the chat log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub text: String,
    pub color: IndicatorColor,
}

/// Colors used by the premove indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorColor {
    Green,
    Red,
}

/// Consumer of everything the scouter wants displayed.
///
/// Always called on the client context.
pub trait Presenter: Send + Sync {
    /// The world list changed or should simply be re-rendered.
    fn world_list_updated(&self, view: &ViewState);

    fn show_premove(&self, indicator: &PremoveIndicator);

    fn hide_premove(&self);

    fn chat_message(&self, message: &ChatMessage);
}

/// State types that can hand client tasks the game client.
pub trait HostAccess {
    fn game_client(&self) -> &Arc<dyn GameClient>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_state_ordering() {
        assert!(GameState::LoggedIn.at_least(GameState::LoginScreen));
        assert!(GameState::LoginScreen.at_least(GameState::LoginScreen));
        assert!(GameState::Loading.at_least(GameState::LoginScreen));
        assert!(!GameState::Starting.at_least(GameState::LoginScreen));
        assert!(!GameState::Unknown.at_least(GameState::Starting));
    }

    #[test]
    fn test_location_table_lookup() {
        let table: WorldLocationTable = [(WorldId(302), -42), (WorldId(330), -73)]
            .into_iter()
            .collect();
        assert_eq!(table.get(WorldId(302)), Some(-42));
        assert_eq!(table.get(WorldId(999)), None);
        assert_eq!(table.len(), 2);
    }
}

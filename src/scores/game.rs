//! Game selection and player codes.

use std::str::FromStr;

use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::error_handling::DatabaseError;

/// The games the scoreboard knows about.
///
/// `All` is the aggregate pseudo-game: it names no table of its own and
/// fans reads out across every playable game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display)]
#[strum(ascii_case_insensitive)]
pub enum Game {
    #[strum(serialize = "UNO")]
    Uno,
    #[strum(serialize = "Chess")]
    Chess,
    #[strum(serialize = "Carrom")]
    Carrom,
    #[strum(serialize = "ALL")]
    All,
}

impl Game {
    /// Parses a game name case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `UnknownGameError` for anything other than UNO, Chess, Carrom or ALL.
    pub fn parse(name: &str) -> Result<Self, DatabaseError> {
        Game::from_str(name.trim()).map_err(|_| DatabaseError::UnknownGameError(name.to_string()))
    }

    /// Every game backed by a real table, in display order.
    pub fn playable() -> impl Iterator<Item = Game> {
        Game::iter().filter(|g| !g.is_aggregate())
    }

    pub fn is_aggregate(self) -> bool {
        self == Game::All
    }

    /// Row id of this game in the `Inventory` table.
    pub fn inventory_id(self) -> Option<i64> {
        match self {
            Game::Uno => Some(1),
            Game::Chess => Some(2),
            Game::Carrom => Some(3),
            Game::All => None,
        }
    }

    /// Table name used when the inventory has no row for this game.
    pub fn static_table(self) -> &'static str {
        match self {
            Game::Uno => "UNO",
            Game::Chess => "Chess",
            Game::Carrom => "Carrom",
            Game::All => "ALL",
        }
    }
}

/// Derives the one-character row code from a player's name.
///
/// # Errors
///
/// Returns `EmptyPlayerName` when `player` has no non-whitespace character.
pub fn player_code(player: &str) -> Result<String, DatabaseError> {
    player
        .trim()
        .chars()
        .next()
        .map(String::from)
        .ok_or(DatabaseError::EmptyPlayerName)
}

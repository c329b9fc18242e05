//! Game score storage.
//!
//! - `game`: the game enumeration and player codes
//! - `repository`: single-table operations through the retry guard
//! - `aggregate`: parallel reads across every game's table

mod aggregate;
mod game;
mod models;
mod repository;

pub use aggregate::ConcurrentAggregator;
pub use game::{player_code, Game};
pub use models::{AddOutcome, LogAndClearSummary, ScoreRecord, TableScores};
pub use repository::ScoreRepository;

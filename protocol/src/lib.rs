//! Wire contract with the remote Minesweeper service.
//!
//! Field names follow the server's JSON exactly; nothing in here has
//! behavior beyond shape helpers. The server owns the rules, we own the
//! spelling.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Linear dimension, used for individual coordinates or board width/height
pub type Coord = u8;

/// Shorthand for a (row, col) position
pub type Coord2 = (Coord, Coord);

/// Area dimension, used for mine/cell counts
pub type CellCount = u16;

/// Opaque game id assigned by the service
pub type GameId = u64;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Beginner,
    Intermediate,
    Expert,
}

impl DifficultyLevel {
    pub const ALL: [DifficultyLevel; 3] = [Self::Beginner, Self::Intermediate, Self::Expert];

    /// Path segment used by the service routes (`/game/new/{difficulty}`)
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Expert => "expert",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Expert => "Expert",
        }
    }

    /// The board layout for each difficulty. This table is the single
    /// source of truth for dimensions; boards returned by the service are
    /// checked against it, never the other way around.
    pub const fn config(self) -> GameConfig {
        match self {
            Self::Beginner => GameConfig {
                difficulty: Self::Beginner,
                width: 9,
                height: 9,
                mines: 10,
            },
            Self::Intermediate => GameConfig {
                difficulty: Self::Intermediate,
                width: 16,
                height: 16,
                mines: 40,
            },
            Self::Expert => GameConfig {
                difficulty: Self::Expert,
                width: 30,
                height: 16,
                mines: 99,
            },
        }
    }
}

impl Default for DifficultyLevel {
    fn default() -> Self {
        Self::Beginner
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub difficulty: DifficultyLevel,
    pub width: Coord,
    pub height: Coord,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn total_cells(&self) -> CellCount {
        (self.width as CellCount) * (self.height as CellCount)
    }
}

/// One cell as the service reports it. Absent fields default, matching the
/// server-side model defaults.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CellState {
    #[serde(default)]
    pub is_revealed: bool,
    #[serde(default)]
    pub is_mine: bool,
    #[serde(default)]
    pub is_flagged: bool,
    #[serde(default)]
    pub adjacent_mines: u8,
}

/// The authoritative board as last returned by the service, replaced
/// wholesale on every response. Row-major.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub board: Vec<Vec<CellState>>,
    #[serde(default)]
    pub game_over: bool,
    #[serde(default)]
    pub won: bool,
    /// Mines minus flags; goes negative when over-flagged
    pub mines_remaining: i32,
}

impl BoardSnapshot {
    pub fn rows(&self) -> usize {
        self.board.len()
    }

    pub fn cols(&self) -> usize {
        self.board.first().map_or(0, Vec::len)
    }

    pub fn cell_at(&self, (row, col): Coord2) -> Option<&CellState> {
        self.board.get(row as usize)?.get(col as usize)
    }

    /// The server sets `won` together with `game_over` on a win, but the
    /// client treats either flag as terminal.
    pub fn is_finished(&self) -> bool {
        self.game_over || self.won
    }

    /// Checks the board is rectangular and sized for `config`.
    pub fn matches_config(&self, config: &GameConfig) -> bool {
        self.rows() == config.height as usize
            && self
                .board
                .iter()
                .all(|row| row.len() == config.width as usize)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveAction {
    Reveal,
    Flag,
}

/// Body of `POST /game/{id}/move`
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameMove {
    pub row: Coord,
    pub col: Coord,
    pub action: MoveAction,
}

/// Response of `POST /game/new/{difficulty}` and `POST /game/{id}/restart`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewGameResponse {
    pub game_id: GameId,
    pub state: BoardSnapshot,
}

/// Body of `POST /game/{id}/complete`, sent once after a won game
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompletionReport {
    pub user_name: String,
    pub duration: u32,
    pub moves: u32,
}

/// One row of `GET /leaderboard/{difficulty}`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_name: String,
    pub best_time: u32,
    /// ISO-8601 timestamp string
    pub played_at: String,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DifficultyStats {
    pub games: u32,
    pub wins: u32,
    /// None until the player has won at this difficulty
    pub best_time: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsByDifficulty {
    pub beginner: DifficultyStats,
    pub intermediate: DifficultyStats,
    pub expert: DifficultyStats,
}

impl StatsByDifficulty {
    pub fn for_difficulty(&self, difficulty: DifficultyLevel) -> &DifficultyStats {
        match difficulty {
            DifficultyLevel::Beginner => &self.beginner,
            DifficultyLevel::Intermediate => &self.intermediate,
            DifficultyLevel::Expert => &self.expert,
        }
    }
}

/// Response of `GET /stats/{user_name}`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub user_name: String,
    pub stats: StatsByDifficulty,
}

/// Response of `GET /game/config`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfigurations {
    pub difficulties: DifficultyTable,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifficultyTable {
    pub beginner: GameConfig,
    pub intermediate: GameConfig,
    pub expert: GameConfig,
}

impl DifficultyTable {
    pub fn for_difficulty(&self, difficulty: DifficultyLevel) -> &GameConfig {
        match difficulty {
            DifficultyLevel::Beginner => &self.beginner,
            DifficultyLevel::Intermediate => &self.intermediate,
            DifficultyLevel::Expert => &self.expert,
        }
    }
}

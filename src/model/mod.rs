use serde::{Deserialize, Serialize};

/// Read-only view of a single cell, as a front-end should draw it.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(tag = "state")]
pub enum CellView {
    #[serde(rename = "hidden")]
    Hidden,
    #[serde(rename = "flagged")]
    Flagged,
    #[serde(rename = "revealed")]
    Revealed { adjacent: u8 },
    #[serde(rename = "mine")]
    Mine,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct GameParams {
    pub width: usize,
    pub height: usize,
}

impl Default for GameParams {
    fn default() -> Self {
        Self {
            width: 9,
            height: 9,
        }
    }
}

/// Session life cycle. `Over` is terminal; a finished session is replaced,
/// never resumed.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(tag = "status")]
pub enum GameStatus {
    #[serde(rename = "not_started")]
    NotStarted,
    #[serde(rename = "playing")]
    Playing,
    #[serde(rename = "over")]
    Over { won: bool },
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct CellUpdate {
    pub pos: Pos,
    pub value: CellView,
}

/// Full observable state of a session at one point in time.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Snapshot {
    pub width: usize,
    pub height: usize,
    pub mines: usize,
    pub status: GameStatus,
    pub elapsed_seconds: u64,
    pub field: Vec<Vec<CellView>>,
}

/// Formats a second count as `MM:SS` for display next to the board.
pub fn format_elapsed(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

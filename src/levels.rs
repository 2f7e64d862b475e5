use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::{
    logic::Game,
    model::{CellUpdate, GameParams, GameStatus, Pos, Snapshot},
    store::PersistenceStore,
};

/// Side lengths of the square boards, in difficulty order.
pub const LEVELS: [usize; 6] = [4, 8, 12, 16, 20, 32];

fn level_params(level: usize) -> GameParams {
    let side = LEVELS[level];
    GameParams {
        width: side,
        height: side,
    }
}

/// Ties a [`Game`] session to the difficulty ladder and the injected store.
///
/// One session is live at a time; selecting a level, resetting, or the
/// auto-advance after a first completion replaces it with a fresh board.
pub struct Minesweeper {
    store: Arc<dyn PersistenceStore>,
    level: usize,
    game: Game,
}

impl Minesweeper {
    /// Restores the persisted level (falling back to the first) and builds
    /// a fresh session for it.
    pub fn new(store: Arc<dyn PersistenceStore>) -> Self {
        let level = store
            .current_level()
            .filter(|&level| level < LEVELS.len())
            .unwrap_or(0);
        info!("starting at level {}", level);
        Self {
            game: Game::new(level_params(level)),
            store,
            level,
        }
    }

    pub fn level(&self) -> usize {
        self.level
    }

    /// Best completion time stored for the current level.
    pub fn record(&self) -> Option<u64> {
        self.store.record(self.level)
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn snapshot(&self) -> Snapshot {
        self.game.snapshot()
    }

    /// Replaces the session with a fresh board at the current level.
    pub fn reset(&mut self) {
        self.game = Game::new(level_params(self.level));
    }

    /// Moves `delta` steps along the difficulty ladder and starts a fresh
    /// session there. Returns the new level, or `None` when the move is
    /// rejected: out of range, or advancing past a level that has not been
    /// completed yet.
    #[instrument(level = "trace", skip(self))]
    pub fn select_level(&mut self, delta: i32) -> Option<usize> {
        if delta > 0 && self.store.record(self.level).is_none() {
            debug!("level {} has no record yet, cannot advance", self.level);
            return None;
        }

        let candidate = self.level as i32 + delta;
        if candidate < 0 || candidate >= LEVELS.len() as i32 {
            debug!("level {} is out of range", candidate);
            return None;
        }

        self.set_level(candidate as usize);
        Some(self.level)
    }

    pub fn reveal(&mut self, pos: Pos, force_reopen: bool) -> Vec<CellUpdate> {
        let was_over = matches!(self.game.status(), GameStatus::Over { .. });
        let updates = self.game.reveal(pos, force_reopen);

        if !was_over && let GameStatus::Over { won: true } = self.game.status() {
            self.finish_won_session();
        }

        updates
    }

    pub fn toggle_flag(&mut self, pos: Pos) -> Vec<CellUpdate> {
        self.game.toggle_flag(pos)
    }

    fn set_level(&mut self, level: usize) {
        self.level = level;
        self.store.set_current_level(level);
        self.game = Game::new(level_params(level));
        info!("switched to level {} ({}x{})", level, LEVELS[level], LEVELS[level]);
    }

    fn finish_won_session(&mut self) {
        let elapsed = self.game.elapsed_seconds();
        let previous = self.store.record(self.level);

        if previous.is_none_or(|record| elapsed < record) {
            info!("new record for level {}: {}s", self.level, elapsed);
            self.store.set_record(self.level, elapsed);
        }

        // A first completion unlocks the next level and enters it directly.
        if previous.is_none() && self.level + 1 < LEVELS.len() {
            self.set_level(self.level + 1);
        }
    }
}

use std::cmp::{max, min};

use rand::Rng;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    data::{Cell, Field},
    model::{CellUpdate, CellView, GameParams, GameStatus, Pos, Snapshot},
    timer::GameTimer,
};

/// Fraction of the board carrying mines.
const MINE_DENSITY: f64 = 0.2;

fn validate_params(params: &mut GameParams) {
    params.width = max(params.width, 1);
    params.height = max(params.height, 1);
}

impl From<&Cell> for CellView {
    fn from(value: &Cell) -> Self {
        match (value.open, value.mine, value.flag) {
            (false, _, true) => Self::Flagged,
            (false, _, false) => Self::Hidden,
            (true, true, _) => Self::Mine,
            (true, false, _) => Self::Revealed {
                adjacent: value.adjacent,
            },
        }
    }
}

impl Field {
    fn new(mut params: GameParams) -> Self {
        validate_params(&mut params);
        Self {
            width: params.width,
            height: params.height,
            mines: 0,
            revealed: 0,
            cells: vec![Cell::default(); params.width * params.height],
        }
    }

    fn index(&self, pos: Pos) -> Option<usize> {
        if pos.x < self.width && pos.y < self.height {
            Some(pos.x + pos.y * self.width)
        } else {
            None
        }
    }

    fn pos(&self, index: usize) -> Pos {
        Pos {
            x: index % self.width,
            y: index / self.width,
        }
    }

    /// Indices of the up-to-8 in-bounds neighbors, in row-major order.
    fn neighbors(&self, index: usize) -> Vec<usize> {
        let Pos { x, y } = self.pos(index);
        let mut neighbors = Vec::with_capacity(8);

        for dy in -1i32..=1 {
            for dx in -1i32..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }

                let new_x = x as i32 + dx;
                let new_y = y as i32 + dy;

                if new_x >= 0
                    && new_x < self.width as i32
                    && new_y >= 0
                    && new_y < self.height as i32
                {
                    neighbors.push(new_x as usize + new_y as usize * self.width);
                }
            }
        }

        neighbors
    }

    fn set_mine(&mut self, index: usize) {
        self.cells[index].mine = true;
        for neighbor in self.neighbors(index) {
            self.cells[neighbor].adjacent += 1;
        }
    }

    /// Rejection-sampling placement: draw uniform in-bounds positions and
    /// skip the excluded first click and cells that already carry a mine.
    fn place_mines(&mut self, exclude: Pos) {
        let total = self.width * self.height;
        // A target of `total` cells or more would never terminate; one cell
        // always stays clear for the excluded first click.
        let target = min(
            (total as f64 * MINE_DENSITY) as usize,
            total.saturating_sub(1),
        );
        let mut rng = rand::rng();

        let mut placed = 0;
        while placed < target {
            let x = rng.random_range(0..self.width);
            let y = rng.random_range(0..self.height);
            if x == exclude.x && y == exclude.y {
                continue;
            }

            let index = x + y * self.width;
            if self.cells[index].mine {
                continue;
            }

            self.set_mine(index);
            placed += 1;
        }

        self.mines = target;
        debug!(
            "placed {} mines on a {}x{} field",
            target, self.width, self.height
        );
    }

    fn has_won(&self) -> bool {
        self.width * self.height == self.mines + self.revealed
    }

    fn open_cell(&mut self, index: usize, updates: &mut Vec<CellUpdate>) {
        let pos = self.pos(index);
        let cell = &mut self.cells[index];
        cell.open = true;
        if !cell.mine {
            self.revealed += 1;
        }
        updates.push(CellUpdate {
            pos,
            value: (&*cell).into(),
        });
    }

    /// Opens `pos` and, for a zero-adjacency cell, cascades through the
    /// connected zero region and its numbered border.
    ///
    /// Explicit worklist instead of recursion; the open flag doubles as the
    /// visited guard, so every cell is pushed at most once.
    fn open(&mut self, pos: Pos, updates: &mut Vec<CellUpdate>) {
        let Some(start) = self.index(pos) else {
            return;
        };
        if self.cells[start].open {
            return;
        }

        self.open_cell(start, updates);
        if self.cells[start].mine || self.cells[start].adjacent != 0 {
            return;
        }

        let mut worklist = vec![start];
        while let Some(index) = worklist.pop() {
            for neighbor in self.neighbors(index) {
                let cell = &self.cells[neighbor];
                if cell.open || cell.mine || cell.flag {
                    continue;
                }

                self.open_cell(neighbor, updates);
                if self.cells[neighbor].adjacent == 0 {
                    worklist.push(neighbor);
                }
            }
        }
    }
}

/// One playable session. The minefield is generated on the first reveal, the
/// timer runs while the status is `Playing`, and `Over` is terminal.
pub struct Game {
    id: Uuid,
    pub(crate) field: Field,
    pub(crate) status: GameStatus,
    timer: GameTimer,
}

impl Game {
    #[instrument(level = "trace")]
    pub fn new(params: GameParams) -> Self {
        let id = Uuid::new_v4();
        info!(
            "creating game {}: {}x{} board",
            id, params.width, params.height
        );
        Self {
            id,
            field: Field::new(params),
            status: GameStatus::NotStarted,
            timer: GameTimer::default(),
        }
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.timer.elapsed_seconds()
    }

    pub fn cell(&self, pos: Pos) -> Option<CellView> {
        let index = self.field.index(pos)?;
        Some((&self.field.cells[index]).into())
    }

    /// Reveals the cell at `pos`.
    ///
    /// The first reveal of a session generates the minefield with `pos`
    /// excluded, so it can never strike a mine. With `force_reopen` set, a
    /// mine reveal does not end the game, and on a finished game an open
    /// cell is closed again without touching the outcome.
    #[instrument(level = "trace", skip(self), fields(game = %self.id, x = pos.x, y = pos.y))]
    pub fn reveal(&mut self, pos: Pos, force_reopen: bool) -> Vec<CellUpdate> {
        let mut updates = Vec::new();

        let Some(index) = self.field.index(pos) else {
            warn!("ignoring reveal at out-of-range position ({}, {})", pos.x, pos.y);
            return updates;
        };

        if let GameStatus::Over { .. } = self.status {
            if force_reopen && self.field.cells[index].open {
                let cell = &mut self.field.cells[index];
                cell.open = false;
                if !cell.mine {
                    self.field.revealed -= 1;
                }
                updates.push(CellUpdate {
                    pos,
                    value: (&*cell).into(),
                });
            } else {
                debug!("ignoring reveal on finished game");
            }
            return updates;
        }

        if self.field.cells[index].flag {
            debug!("ignoring reveal on flagged cell ({}, {})", pos.x, pos.y);
            return updates;
        }

        match self.status {
            GameStatus::NotStarted => {
                self.field.place_mines(pos);
                self.status = GameStatus::Playing;
                self.timer.start();
            }
            // An already-open mine (opened with the modifier earlier) is
            // inert, like any other open cell.
            GameStatus::Playing
                if self.field.cells[index].mine
                    && !self.field.cells[index].open
                    && !force_reopen =>
            {
                warn!("game {} hit a mine at ({}, {})", self.id, pos.x, pos.y);
                self.field.open_cell(index, &mut updates);
                self.finish(false);
                return updates;
            }
            _ => {}
        }

        self.field.open(pos, &mut updates);
        if self.field.has_won() {
            self.finish(true);
        }

        updates
    }

    #[instrument(level = "trace", skip(self), fields(game = %self.id, x = pos.x, y = pos.y))]
    pub fn toggle_flag(&mut self, pos: Pos) -> Vec<CellUpdate> {
        let mut updates = Vec::new();

        let Some(index) = self.field.index(pos) else {
            warn!("ignoring flag at out-of-range position ({}, {})", pos.x, pos.y);
            return updates;
        };

        if let GameStatus::Over { .. } = self.status {
            debug!("ignoring flag on finished game");
            return updates;
        }

        let cell = &mut self.field.cells[index];
        if cell.open {
            debug!("ignoring flag on open cell ({}, {})", pos.x, pos.y);
            return updates;
        }

        cell.flag = !cell.flag;
        updates.push(CellUpdate {
            pos,
            value: (&*cell).into(),
        });
        updates
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            width: self.field.width,
            height: self.field.height,
            mines: self.field.mines,
            status: self.status,
            elapsed_seconds: self.timer.elapsed_seconds(),
            field: self
                .field
                .cells
                .iter()
                .map(|cell| cell.into())
                .collect::<Vec<CellView>>()
                .chunks(self.field.width)
                .map(|chunk| chunk.to_vec())
                .collect(),
        }
    }

    fn finish(&mut self, won: bool) {
        self.status = GameStatus::Over { won };
        let elapsed = self.timer.stop();
        if won {
            info!("game {} won in {}s, all safe cells revealed", self.id, elapsed);
        } else {
            info!("game {} lost after {}s", self.id, elapsed);
        }
    }

    /// Builds a `Playing` session with a fixed minefield, bypassing random
    /// generation.
    #[cfg(test)]
    pub(crate) fn with_mines(params: GameParams, mines: &[Pos]) -> Self {
        let mut game = Self::new(params);
        for &pos in mines {
            let index = game.field.index(pos).unwrap();
            game.field.set_mine(index);
        }
        game.field.mines = mines.len();
        game.status = GameStatus::Playing;
        game
    }
}

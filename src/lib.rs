//! Minesweeper Game Engine
//!
//! This library implements a complete minesweeper engine: constrained
//! minefield generation with a guaranteed safe first click, flood-fill
//! reveals, a per-second game timer, and a difficulty ladder gated by
//! persisted best times. Rendering and input handling are left to the host;
//! the engine exposes plain data ([`Snapshot`], [`CellUpdate`]) to draw from.
//!
//! The timer runs on the tokio runtime, so sessions must live inside one.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use minesweeper_engine::{MemoryStore, Minesweeper, Pos};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut game = Minesweeper::new(Arc::new(MemoryStore::new()));
//!
//!     // The first reveal places the mines and starts the clock.
//!     game.reveal(Pos { x: 0, y: 0 }, false);
//!     game.toggle_flag(Pos { x: 1, y: 1 });
//!
//!     let snapshot = game.snapshot();
//!     println!(
//!         "level {}: {:?} after {}s",
//!         game.level(),
//!         snapshot.status,
//!         snapshot.elapsed_seconds
//!     );
//! }
//! ```
//!
//! Hosts that manage difficulty themselves can drive [`Game`] directly and
//! skip the level manager. Durable best times come from whatever
//! [`PersistenceStore`] the host injects; [`MemoryStore`] and
//! [`JsonFileStore`] are provided.

mod data;
pub mod levels;
pub mod logic;
pub mod model;
pub mod store;
pub mod timer;

pub use levels::{LEVELS, Minesweeper};
pub use logic::Game;
pub use model::{CellUpdate, CellView, GameParams, GameStatus, Pos, Snapshot, format_elapsed};
pub use store::{JsonFileStore, MemoryStore, PersistenceStore};
pub use timer::GameTimer;

use std::sync::Arc;
use std::{env, fs};

use minesweeper_engine::{
    CellView, GameStatus, JsonFileStore, LEVELS, MemoryStore, Minesweeper, PersistenceStore, Pos,
};
use uuid::Uuid;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[tokio::test]
async fn plays_a_session_to_completion() {
    init_tracing();

    let store = Arc::new(MemoryStore::new());
    let mut game = Minesweeper::new(store.clone());
    assert_eq!(game.level(), 0);

    let side = LEVELS[0];
    let updates = game.reveal(Pos { x: 0, y: 0 }, false);
    assert!(!updates.is_empty());

    // The first click is always safe.
    assert!(!matches!(
        game.snapshot().status,
        GameStatus::Over { won: false }
    ));

    // Sweep the board; the session has to terminate one way or the other.
    'sweep: for y in 0..side {
        for x in 0..side {
            if store.record(0).is_some() {
                break 'sweep;
            }
            if let GameStatus::Over { .. } = game.snapshot().status {
                break 'sweep;
            }
            game.reveal(Pos { x, y }, false);
        }
    }

    if store.record(0).is_some() {
        // Won: record stored, ladder advanced, fresh board at level 1.
        assert_eq!(game.level(), 1);
        assert_eq!(store.current_level(), Some(1));
        assert_eq!(game.snapshot().status, GameStatus::NotStarted);
        assert_eq!(game.snapshot().width, LEVELS[1]);
    } else {
        // Lost: terminal session, no record, no level change.
        assert_eq!(game.snapshot().status, GameStatus::Over { won: false });
        assert_eq!(game.level(), 0);
        assert!(game.reveal(Pos { x: 0, y: 0 }, false).is_empty());
    }
}

#[tokio::test]
async fn flags_are_visible_in_snapshots_and_block_reveals() {
    init_tracing();

    let mut game = Minesweeper::new(Arc::new(MemoryStore::new()));

    game.toggle_flag(Pos { x: 1, y: 1 });
    assert_eq!(game.snapshot().field[1][1], CellView::Flagged);

    // A flagged cell cannot be revealed, not even as the first click.
    assert!(game.reveal(Pos { x: 1, y: 1 }, false).is_empty());
    assert_eq!(game.snapshot().status, GameStatus::NotStarted);

    game.toggle_flag(Pos { x: 1, y: 1 });
    assert_eq!(game.snapshot().field[1][1], CellView::Hidden);
}

#[test]
fn level_and_records_survive_a_restart() {
    init_tracing();

    let path = env::temp_dir().join(format!("minesweeper-engine-{}.json", Uuid::new_v4()));

    {
        let store = Arc::new(JsonFileStore::open(&path).unwrap());
        store.set_record(0, 12);
        store.set_current_level(1);

        let game = Minesweeper::new(store);
        assert_eq!(game.level(), 1);
        assert_eq!(game.snapshot().width, LEVELS[1]);
    }

    let store = Arc::new(JsonFileStore::open(&path).unwrap());
    assert_eq!(store.record(0), Some(12));

    let game = Minesweeper::new(store);
    assert_eq!(game.level(), 1);
    assert_eq!(game.snapshot().status, GameStatus::NotStarted);

    let _ = fs::remove_file(&path);
}

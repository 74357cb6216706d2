#![forbid(unsafe_code)]

mod board;
mod game;
mod hooks;
mod saving;

pub use board::{adjacents, Board, Coord, Tile, TileState, DEFAULT_BOMB_CHANCE, MINE};
pub use game::{
    EffectToggles, Event, EventKind, Game, GameStats, CASCADE_DELAY_MS, MINE_FADE_MS,
    SWEEP_BASE_DELAY_MS, SWEEP_STEP_MS,
};
pub use hooks::{Hooks, NoopHooks};
pub use saving::{SaveData, SaveError};

use itertools::Itertools;
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{Board, Coord, TileState, DEFAULT_BOMB_CHANCE};
use crate::game::{EffectToggles, Game};
use crate::hooks::Hooks;

/// Persisted form of a session. Only touched tiles get an address; everything
/// else regenerates from the seed. The separator encodes the tile's state:
/// `x,y` is revealed, `x.y` is flagged.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SaveData {
    pub seed: u64,
    pub board: Vec<String>,
}

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("malformed tile address {0:?}")]
    BadAddress(String),
    #[error("could not read save data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("could not access save file: {0}")]
    Io(#[from] std::io::Error),
}

fn encode(point: Coord, state: TileState) -> String {
    let sep = if state == TileState::Revealed { ',' } else { '.' };
    format!("{}{}{}", point.0, sep, point.1)
}

fn decode(address: &str) -> Result<(Coord, TileState), SaveError> {
    let (sep, state) = if address.contains(',') {
        (',', TileState::Revealed)
    } else {
        ('.', TileState::Flagged)
    };
    fn bad(address: &str) -> SaveError {
        SaveError::BadAddress(address.to_owned())
    }
    let (x, y) = address.split_once(sep).ok_or_else(|| bad(address))?;
    let x = x.parse().map_err(|_| bad(address))?;
    let y = y.parse().map_err(|_| bad(address))?;
    Ok(((x, y), state))
}

impl Board {
    /// Emits an address for every revealed or flagged tile. Tiles that were
    /// merely generated are omitted; they come back identically on demand.
    pub fn to_save(&self) -> SaveData {
        let board = self
            .iter()
            .filter_map(|(point, tile)| match tile.state {
                TileState::Revealed => Some(encode(point, TileState::Revealed)),
                TileState::Flagged | TileState::FlaggedIncorrect => {
                    Some(encode(point, TileState::Flagged))
                }
                TileState::Unrevealed => None,
            })
            .sorted()
            .collect();
        SaveData { seed: self.seed(), board }
    }

    /// Rebuilds a board from a save. All-or-nothing: any unparseable address
    /// fails the whole restore and no board is produced. Tiles are generated
    /// (so their values come from the seed) and then stamped with their saved
    /// state, with `interacted_at` left in the past so no animation replays.
    /// Duplicate addresses are harmless; nothing here is counter-driven.
    pub fn from_save(data: &SaveData) -> Result<Self, SaveError> {
        let entries: Vec<(Coord, TileState)> =
            data.board.iter().map(|addr| decode(addr)).collect::<Result<_, _>>()?;

        let mut board = Board::new(data.seed, DEFAULT_BOMB_CHANCE);
        for (point, state) in entries {
            board.generate(point);
            board.update(point, |tile| {
                tile.state = state;
                tile.interacted_at = 0;
            });
        }
        info!("restored {} saved tiles (seed {})", board.len(), data.seed);
        Ok(board)
    }
}

impl<H: Hooks> Game<H> {
    pub fn save_data(&self) -> SaveData {
        self.board().to_save()
    }

    /// Restores a session without re-running any reveal logic: no cascades,
    /// no sounds, and stats recounted from the finished board.
    pub fn restore(data: &SaveData, toggles: EffectToggles, hooks: H) -> Result<Self, SaveError> {
        Ok(Game::from_board(Board::from_save(data)?, toggles, hooks))
    }
}

use std::collections::HashMap;

use itertools::iproduct;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub type Coord = (i64, i64);

/// Value a tile holds when it is a mine.
pub const MINE: i8 = -1;

pub const DEFAULT_BOMB_CHANCE: f64 = 0.18;

pub fn adjacents((x, y): Coord) -> impl Iterator<Item = Coord> {
    [(x, y-1), (x+1, y-1), (x+1, y), (x+1, y+1), (x, y+1), (x-1, y+1), (x-1, y), (x-1, y-1)].into_iter()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileState {
    Unrevealed,
    Revealed,
    Flagged,
    /// Terminal; only applied by the post-loss sweep to flags that weren't mines.
    FlaggedIncorrect,
}

impl TileState {
    pub fn is_flagged(self) -> bool {
        matches!(self, Self::Flagged | Self::FlaggedIncorrect)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    /// -1 for a mine, otherwise the mine count of the 8-neighborhood. Only
    /// mutated through back-fill as missing neighbors come into existence.
    pub value: i8,
    pub state: TileState,
    /// Millisecond stamp of the last reveal/flag transition. Drives animation
    /// timing only; never gameplay.
    pub interacted_at: u64,
    /// Set once a detonated mine's explosion effect has fired.
    pub exploded: bool,
}

impl Tile {
    fn new(value: i8) -> Self {
        Tile { value, state: TileState::Unrevealed, interacted_at: 0, exploded: false }
    }

    pub fn is_mine(self) -> bool {
        self.value == MINE
    }
}

/// Derives a stream key unique to `(seed, x, y)`. splitmix64-style finalizer
/// so that neighboring coordinates don't correlate.
fn cell_seed(seed: u64, (x, y): Coord) -> u64 {
    let mut h = seed ^ (x as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    h ^= (y as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    h = (h ^ (h >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h = (h ^ (h >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    h ^ (h >> 31)
}

/// The sparse, unbounded minefield. Tiles exist only once something touches
/// them; everything else is implied by the seed.
pub struct Board {
    tiles: HashMap<Coord, Tile>,
    seed: u64,
    bomb_chance: f64,
}

impl Board {
    pub fn new(seed: u64, bomb_chance: f64) -> Self {
        Board { tiles: HashMap::new(), seed, bomb_chance }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn get(&self, point: Coord) -> Option<Tile> {
        self.tiles.get(&point).copied()
    }

    /// Lookup-or-generate. Idempotent: an existing tile is returned unchanged.
    ///
    /// A freshly generated tile's count covers only the neighbors that already
    /// exist; the remainder is back-filled when those neighbors generate. The
    /// count is exact once the full 8-neighborhood exists, which reveal
    /// guarantees by forcing a 5×5 block first.
    pub fn generate(&mut self, point: Coord) -> Tile {
        if let Some(&tile) = self.tiles.get(&point) {
            return tile;
        }

        let mut rng = StdRng::seed_from_u64(cell_seed(self.seed, point));
        let mut tile = Tile::new(if rng.gen::<f64>() < self.bomb_chance { MINE } else { 0 });

        for adj in adjacents(point) {
            let Some(neighbor) = self.tiles.get_mut(&adj) else { continue };
            if tile.is_mine() {
                if !neighbor.is_mine() {
                    neighbor.value += 1;
                }
            } else if neighbor.is_mine() {
                tile.value += 1;
            }
        }

        self.tiles.insert(point, tile);
        tile
    }

    /// Generates first so a partial update can never drop a tile's value.
    pub(crate) fn update(&mut self, point: Coord, f: impl FnOnce(&mut Tile)) {
        self.generate(point);
        f(self.tiles.get_mut(&point).unwrap());
    }

    /// Forces the 5×5 block centered on `point` into existence, making the
    /// center's count (and its neighbors' counts) exact before it is acted on.
    pub fn resolve_area(&mut self, (x, y): Coord) {
        for (dx, dy) in iproduct!(-2i64..=2, -2i64..=2) {
            if (dx, dy) != (0, 0) {
                self.generate((x + dx, y + dy));
            }
        }
        self.generate((x, y));
    }

    /// A generated zero-tile in the strictly positive quadrant whose
    /// coordinate parity matches `parity`, if any exists yet.
    pub fn first_zero(&self, parity: i64) -> Option<Coord> {
        self.tiles.iter().find_map(|(&(x, y), tile)| {
            (tile.value == 0 && (x + y).rem_euclid(2) == parity && x > 0 && y > 0).then(|| (x, y))
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (Coord, Tile)> + '_ {
        self.tiles.iter().map(|(&p, &t)| (p, t))
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Test/restore hook: place a tile verbatim. Generation never overwrites
    /// it afterwards, but back-fill applies to it like any other tile.
    pub(crate) fn put(&mut self, point: Coord, tile: Tile) {
        self.tiles.insert(point, tile);
    }
}

use crate::board::Coord;
use crate::game::GameStats;

/// Presentation side effects the engine fires into. Everything is
/// fire-and-forget; the engine never reads anything back, so the core is
/// fully constructible without audio or rendering present.
pub trait Hooks {
    /// Sound effect by name: `blip_1`..`blip_8`, `flag_down`, `flag_up`,
    /// `charge`, `confetti`.
    fn play(&mut self, _effect: &str) {}

    /// Fired after every state mutation.
    fn stats_changed(&mut self, _stats: GameStats) {}

    /// Fired once, on loss.
    fn set_game_active(&mut self, _active: bool) {}

    /// Particle pop at a tile (flag placement, incorrect-flag reveal,
    /// explosion debris).
    fn pop(&mut self, _point: Coord) {}

    /// Camera shake on detonation.
    fn shake(&mut self) {}
}

/// Stub for tests and headless use.
pub struct NoopHooks;

impl Hooks for NoopHooks {}

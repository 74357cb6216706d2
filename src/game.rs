use itertools::{iproduct, Itertools};
use log::{debug, info};

use crate::board::{adjacents, Board, Coord, TileState, DEFAULT_BOMB_CHANCE};
use crate::hooks::Hooks;

/// Delay before a zero-tile's neighbors reveal, producing the staggered
/// cascade instead of an instant flood.
pub const CASCADE_DELAY_MS: u64 = 100;
/// Delay after loss before the incorrect-flag sweep starts.
pub const SWEEP_BASE_DELAY_MS: u64 = 1000;
/// Gap between consecutive incorrect-flag reveals in the sweep.
pub const SWEEP_STEP_MS: u64 = 150;
/// How long the detonated mine fades in before the explosion effect fires.
pub const MINE_FADE_MS: u64 = 1000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GameStats {
    pub flags: u32,
    pub revealed: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    Reveal,
    IncorrectFlag,
}

/// A deferred action, drained by `tick` once its time has passed.
#[derive(Clone, Copy, Debug)]
pub struct Event {
    pub point: Coord,
    pub kind: EventKind,
    pub at: u64,
}

/// Settings-derived switches. They gate optional side effects only, never
/// state transitions.
#[derive(Clone, Copy, Debug)]
pub struct EffectToggles {
    pub particles: bool,
    pub borders: bool,
    pub camera_shake: bool,
}

impl Default for EffectToggles {
    fn default() -> Self {
        EffectToggles { particles: true, borders: true, camera_shake: true }
    }
}

/// One session of the game: the board plus everything that changes as the
/// player interacts with it. Discarded wholesale on new game or load.
pub struct Game<H: Hooks> {
    board: Board,
    queue: Vec<Event>,
    stats: GameStats,
    active: bool,
    now: u64,
    detonated: Option<Coord>,
    toggles: EffectToggles,
    pub hooks: H,
}

impl<H: Hooks> Game<H> {
    pub fn new(seed: u64, hooks: H) -> Self {
        Self::with_config(seed, DEFAULT_BOMB_CHANCE, EffectToggles::default(), hooks)
    }

    pub fn with_config(seed: u64, bomb_chance: f64, toggles: EffectToggles, hooks: H) -> Self {
        Self::from_board(Board::new(seed, bomb_chance), toggles, hooks)
    }

    /// Wraps an already-populated board (the restore path). Stats are
    /// recounted from the board rather than trusted from anywhere else.
    pub(crate) fn from_board(board: Board, toggles: EffectToggles, hooks: H) -> Self {
        let stats = recount(&board);
        Game {
            board,
            queue: Vec::new(),
            stats,
            active: true,
            now: 0,
            detonated: None,
            toggles,
            hooks,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn stats(&self) -> GameStats {
        self.stats
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn toggles(&self) -> EffectToggles {
        self.toggles
    }

    pub fn pending_events(&self) -> &[Event] {
        &self.queue
    }

    /// Advances the simulation clock and runs every deferred event whose time
    /// has passed. `now` is milliseconds from session start and must be
    /// monotonic.
    pub fn tick(&mut self, now: u64) {
        self.now = now;

        let mut ran = false;
        let mut i = 0;
        while i < self.queue.len() {
            if self.queue[i].at <= now {
                let event = self.queue.swap_remove(i);
                self.dispatch(event);
                ran = true;
            } else {
                i += 1;
            }
        }

        // the detonated mine fades in; the explosion fires once the fade is up
        if let Some(point) = self.detonated {
            let tile = self.board.generate(point);
            if !tile.exploded && now >= tile.interacted_at + MINE_FADE_MS {
                self.board.update(point, |t| t.exploded = true);
                self.hooks.play("confetti");
                if self.toggles.particles {
                    self.hooks.pop(point);
                }
                if self.toggles.camera_shake {
                    self.hooks.shake();
                }
            }
        }

        if ran {
            self.publish_stats();
        }
    }

    fn dispatch(&mut self, event: Event) {
        match event.kind {
            // cascades die with the session
            EventKind::Reveal if self.active => self.reveal_inner(event.point),
            EventKind::Reveal => {}
            EventKind::IncorrectFlag => {
                let now = self.now;
                self.board.update(event.point, |t| {
                    t.state = TileState::FlaggedIncorrect;
                    t.interacted_at = now;
                });
                self.hooks.play("flag_up");
                if self.toggles.particles {
                    self.hooks.pop(event.point);
                }
            }
        }
    }

    pub fn attempt_reveal(&mut self, point: Coord) {
        if !self.active {
            return;
        }
        self.reveal_inner(point);
        self.publish_stats();
    }

    fn reveal_inner(&mut self, point: Coord) {
        let mut work = vec![point];
        while let Some(point) = work.pop() {
            if self.board.generate(point).state.is_flagged() {
                continue;
            }
            // counts are only trustworthy once the 5×5 block exists
            self.board.resolve_area(point);
            let tile = self.board.generate(point);

            match tile.state {
                TileState::Revealed => {
                    // chord: a satisfied number auto-clears its neighborhood
                    let flags = adjacents(point)
                        .filter(|&adj| self.board.generate(adj).state.is_flagged())
                        .count() as i8;
                    if flags == tile.value {
                        for adj in adjacents(point) {
                            if self.board.generate(adj).state == TileState::Unrevealed {
                                work.push(adj);
                            }
                        }
                    }
                }
                TileState::Unrevealed => {
                    let now = self.now;
                    self.board.update(point, |t| {
                        t.state = TileState::Revealed;
                        t.interacted_at = now;
                    });
                    self.stats.revealed += 1;
                    if tile.is_mine() {
                        self.lose(point);
                        return;
                    }
                    self.hooks.play(&format!("blip_{}", tile.value.max(1)));
                    if tile.value == 0 {
                        self.enqueue_cascade(point);
                    }
                }
                TileState::Flagged | TileState::FlaggedIncorrect => {}
            }
        }
    }

    fn enqueue_cascade(&mut self, point: Coord) {
        for adj in adjacents(point) {
            // the already-queued check is what stops repeated floods
            if self.queue.iter().any(|e| e.kind == EventKind::Reveal && e.point == adj) {
                continue;
            }
            self.queue.push(Event {
                point: adj,
                kind: EventKind::Reveal,
                at: self.now + CASCADE_DELAY_MS,
            });
        }
    }

    pub fn toggle_flag(&mut self, point: Coord) {
        if !self.active {
            return;
        }
        let tile = self.board.generate(point);
        let now = self.now;
        match tile.state {
            TileState::Revealed | TileState::FlaggedIncorrect => return,
            TileState::Unrevealed => {
                self.board.update(point, |t| {
                    t.state = TileState::Flagged;
                    t.interacted_at = now;
                });
                self.stats.flags += 1;
                self.hooks.play("flag_down");
                if self.toggles.particles {
                    self.hooks.pop(point);
                }
            }
            TileState::Flagged => {
                self.board.update(point, |t| {
                    t.state = TileState::Unrevealed;
                    t.interacted_at = now;
                });
                self.stats.flags -= 1;
                self.hooks.play("flag_up");
            }
        }
        self.publish_stats();
    }

    fn lose(&mut self, point: Coord) {
        info!("mine detonated at {:?}", point);
        self.active = false;
        self.detonated = Some(point);
        self.hooks.play("charge");
        self.hooks.set_game_active(false);

        // sweep every misplaced flag, one by one
        let misflagged = self
            .board
            .iter()
            .filter(|&(_, t)| t.state == TileState::Flagged && !t.is_mine())
            .map(|(p, _)| p)
            .sorted()
            .collect::<Vec<_>>();
        debug!("queueing {} incorrect flags", misflagged.len());
        let mut delay = SWEEP_BASE_DELAY_MS;
        for p in misflagged {
            self.queue.push(Event { point: p, kind: EventKind::IncorrectFlag, at: self.now + delay });
            delay += SWEEP_STEP_MS;
        }
    }

    /// Somewhere pleasant to start: pre-generates a block in the positive
    /// quadrant and picks a zero-tile matching the seed's parity, so the
    /// camera can open on a guaranteed cascade. Falls back to (1, 1) if the
    /// block happens to contain no zero at all.
    pub fn suggest_spawn(&mut self) -> Coord {
        let parity = (self.board.seed() % 2) as i64;
        for (x, y) in iproduct!(1i64..=32, 1i64..=32) {
            self.board.generate((x, y));
        }
        self.board
            .first_zero(parity)
            .or_else(|| self.board.first_zero(1 - parity))
            .unwrap_or((1, 1))
    }

    fn publish_stats(&mut self) {
        self.hooks.stats_changed(self.stats);
    }
}

/// Aggregates are always derived by scanning, never trusted incrementally
/// across a restore.
pub(crate) fn recount(board: &Board) -> GameStats {
    let mut stats = GameStats::default();
    for (_, tile) in board.iter() {
        match tile.state {
            TileState::Revealed => stats.revealed += 1,
            TileState::Flagged | TileState::FlaggedIncorrect => stats.flags += 1,
            TileState::Unrevealed => {}
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Tile, MINE};
    use crate::hooks::Hooks;

    #[derive(Default)]
    struct Recorder {
        sounds: Vec<String>,
        stats: Vec<GameStats>,
        deactivated: bool,
        pops: usize,
        shakes: usize,
    }

    impl Hooks for Recorder {
        fn play(&mut self, effect: &str) {
            self.sounds.push(effect.to_owned());
        }
        fn stats_changed(&mut self, stats: GameStats) {
            self.stats.push(stats);
        }
        fn set_game_active(&mut self, active: bool) {
            if !active {
                self.deactivated = true;
            }
        }
        fn pop(&mut self, _point: Coord) {
            self.pops += 1;
        }
        fn shake(&mut self) {
            self.shakes += 1;
        }
    }

    fn empty_game() -> Game<Recorder> {
        // zero density: every generated tile is an empty zero
        Game::with_config(0, 0.0, EffectToggles::default(), Recorder::default())
    }

    fn mine() -> Tile {
        Tile { value: MINE, state: TileState::Unrevealed, interacted_at: 0, exploded: false }
    }

    #[test]
    fn zero_reveal_queues_stagger() {
        let mut game = empty_game();
        game.attempt_reveal((0, 0));

        assert_eq!(game.board().get((0, 0)).unwrap().state, TileState::Revealed);
        assert_eq!(game.stats().revealed, 1);
        assert_eq!(game.hooks.sounds, vec!["blip_1"]);

        let events = game.pending_events();
        assert_eq!(events.len(), 8);
        assert!(events.iter().all(|e| e.kind == EventKind::Reveal && e.at == CASCADE_DELAY_MS));
        let targets: Vec<Coord> = events.iter().map(|e| e.point).sorted().collect();
        let expected: Vec<Coord> = adjacents((0, 0)).sorted().collect();
        assert_eq!(targets, expected);
    }

    #[test]
    fn cascade_waits_for_its_delay() {
        let mut game = empty_game();
        game.attempt_reveal((0, 0));
        game.tick(CASCADE_DELAY_MS - 1);
        assert_eq!(game.stats().revealed, 1);
        game.tick(CASCADE_DELAY_MS);
        assert_eq!(game.stats().revealed, 9);
    }

    #[test]
    fn reveal_is_noop_on_flagged() {
        let mut game = empty_game();
        game.toggle_flag((2, 2));
        game.attempt_reveal((2, 2));
        assert_eq!(game.board().get((2, 2)).unwrap().state, TileState::Flagged);
        assert_eq!(game.stats().revealed, 0);
        assert!(game.pending_events().is_empty());
    }

    #[test]
    fn flag_toggle_is_net_zero() {
        let mut game = empty_game();
        game.toggle_flag((4, -1));
        assert_eq!(game.stats().flags, 1);
        assert_eq!(game.hooks.pops, 1);
        game.toggle_flag((4, -1));
        assert_eq!(game.stats().flags, 0);
        assert_eq!(game.board().get((4, -1)).unwrap().state, TileState::Unrevealed);
        assert_eq!(game.hooks.sounds, vec!["flag_down", "flag_up"]);
        // un-flagging doesn't pop
        assert_eq!(game.hooks.pops, 1);
        // both transitions were published
        assert_eq!(
            game.hooks.stats,
            vec![GameStats { flags: 1, revealed: 0 }, GameStats { flags: 0, revealed: 0 }]
        );
    }

    #[test]
    fn flag_on_revealed_is_noop() {
        let mut game = empty_game();
        game.attempt_reveal((0, 0));
        game.toggle_flag((0, 0));
        assert_eq!(game.board().get((0, 0)).unwrap().state, TileState::Revealed);
        assert_eq!(game.stats().flags, 0);
    }

    #[test]
    fn chord_clears_satisfied_neighborhood() {
        let mut game = empty_game();
        game.board_mut().put((1, 1), mine());
        game.board_mut().put((0, 0), Tile { value: 1, ..mine() });
        game.toggle_flag((1, 1));
        game.attempt_reveal((0, 0));
        assert_eq!(game.board().get((0, 0)).unwrap().state, TileState::Revealed);

        // one flag next to a revealed 1: chording clears the rest
        game.attempt_reveal((0, 0));
        for adj in adjacents((0, 0)) {
            let tile = game.board().get(adj).unwrap();
            if adj == (1, 1) {
                assert_eq!(tile.state, TileState::Flagged);
            } else {
                assert_eq!(tile.state, TileState::Revealed, "{adj:?} not chorded");
            }
        }
        assert!(game.is_active());
    }

    #[test]
    fn unsatisfied_chord_reveals_nothing() {
        let mut game = empty_game();
        game.board_mut().put((1, 1), mine());
        game.board_mut().put((0, 0), Tile { value: 1, ..mine() });
        game.attempt_reveal((0, 0));
        let before = game.stats().revealed;
        game.attempt_reveal((0, 0));
        assert_eq!(game.stats().revealed, before);
    }

    #[test]
    fn loss_sweeps_incorrect_flags() {
        let mut game = empty_game();
        game.board_mut().put((5, 5), mine());
        game.board_mut().put((7, 7), mine());
        game.toggle_flag((3, 3)); // wrong
        game.toggle_flag((5, 5)); // right
        game.attempt_reveal((7, 7));

        assert!(!game.is_active());
        assert!(game.hooks.deactivated);
        assert!(game.hooks.sounds.contains(&"charge".to_owned()));

        // only the wrong flag is queued for the sweep
        let sweep: Vec<&Event> =
            game.pending_events().iter().filter(|e| e.kind == EventKind::IncorrectFlag).collect();
        assert_eq!(sweep.len(), 1);
        assert_eq!(sweep[0].point, (3, 3));
        assert_eq!(sweep[0].at, SWEEP_BASE_DELAY_MS);

        game.tick(SWEEP_BASE_DELAY_MS);
        assert_eq!(game.board().get((3, 3)).unwrap().state, TileState::FlaggedIncorrect);
        assert_eq!(game.board().get((5, 5)).unwrap().state, TileState::Flagged);
    }

    #[test]
    fn sweep_is_staggered() {
        let mut game = empty_game();
        game.board_mut().put((9, 9), mine());
        game.toggle_flag((1, 1));
        game.toggle_flag((2, 2));
        game.toggle_flag((3, 3));
        game.attempt_reveal((9, 9));

        let times: Vec<u64> = game
            .pending_events()
            .iter()
            .filter(|e| e.kind == EventKind::IncorrectFlag)
            .map(|e| e.at)
            .sorted()
            .collect();
        assert_eq!(
            times,
            vec![
                SWEEP_BASE_DELAY_MS,
                SWEEP_BASE_DELAY_MS + SWEEP_STEP_MS,
                SWEEP_BASE_DELAY_MS + 2 * SWEEP_STEP_MS,
            ]
        );
    }

    #[test]
    fn explosion_fires_once_after_fade() {
        let mut game = empty_game();
        game.board_mut().put((0, 0), mine());
        game.attempt_reveal((0, 0));
        assert!(!game.is_active());

        game.tick(MINE_FADE_MS - 1);
        assert_eq!(game.hooks.shakes, 0);
        game.tick(MINE_FADE_MS);
        assert!(game.board().get((0, 0)).unwrap().exploded);
        assert_eq!(game.hooks.shakes, 1);
        assert_eq!(game.hooks.sounds.iter().filter(|s| *s == "confetti").count(), 1);

        game.tick(MINE_FADE_MS * 3);
        assert_eq!(game.hooks.shakes, 1);
    }

    #[test]
    fn no_input_after_loss() {
        let mut game = empty_game();
        game.board_mut().put((0, 0), mine());
        game.attempt_reveal((0, 0));
        let stats = game.stats();
        game.attempt_reveal((10, 10));
        game.toggle_flag((11, 11));
        assert_eq!(game.stats(), stats);
    }

    #[test]
    fn toggles_gate_effects_not_state() {
        let toggles = EffectToggles { particles: false, borders: true, camera_shake: false };
        let mut game = Game::with_config(0, 0.0, toggles, Recorder::default());
        game.board_mut().put((0, 0), mine());
        game.toggle_flag((2, 2));
        assert_eq!(game.hooks.pops, 0);
        assert_eq!(game.board().get((2, 2)).unwrap().state, TileState::Flagged);
        game.attempt_reveal((0, 0));
        game.tick(MINE_FADE_MS);
        assert_eq!(game.hooks.shakes, 0);
        assert!(game.board().get((0, 0)).unwrap().exploded);
    }

    #[test]
    fn suggest_spawn_is_positive_zero() {
        let mut game = empty_game();
        let (x, y) = game.suggest_spawn();
        assert!(x > 0 && y > 0);
        assert_eq!(game.board().get((x, y)).unwrap().value, 0);
    }
}

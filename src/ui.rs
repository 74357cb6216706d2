use std::io::{stdout, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crossterm::event::{
    poll, read, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::style::{Attribute, Stylize};
use crossterm::{cursor, queue, style, terminal, Result};

use infinisweeper::{adjacents, Coord, Game, Hooks, TileState};

use crate::options::{IconSet, Theme};

/// Terminal-side half of the engine's hook surface. Sounds have nowhere to go
/// here, so they are logged; stats and activity are read straight off the
/// game each frame instead.
pub struct TermHooks;

impl Hooks for TermHooks {
    fn play(&mut self, effect: &str) {
        log::debug!("sfx {effect}");
    }
}

struct Camera {
    game: Game<TermHooks>,
    theme: Theme,
    icons: IconSet,
    w: u16,
    h: u16,
    x: i64,
    y: i64,
}

impl Camera {
    fn new(game: Game<TermHooks>, theme: Theme, icons: IconSet, (w, h): (u16, u16)) -> Self {
        Self { game, theme, icons, w, h, x: 0, y: 0 }
    }

    fn center_on(&mut self, (x, y): Coord) {
        self.x = x - self.w as i64 / 2;
        self.y = y - self.h as i64 / 2;
    }

    fn show_tile(&mut self, point: Coord) -> Result<()> {
        // rendering generates whatever it touches, like the original's draw
        // path; counts out here may lag until the neighborhood fills in
        let tile = self.game.board_mut().generate(point);
        let parity = (point.0 + point.1).rem_euclid(2) as usize;

        match tile.state {
            TileState::Unrevealed => {
                queue!(stdout(), style::SetBackgroundColor(self.theme.hidden[parity]))?;
                print!(" ");
            }
            TileState::Flagged => {
                queue!(stdout(), style::SetBackgroundColor(self.theme.hidden[parity]))?;
                print!("{}", self.icons.flag.to_string().with(self.theme.flag));
            }
            TileState::FlaggedIncorrect => {
                queue!(stdout(), style::SetBackgroundColor(self.theme.revealed[parity]))?;
                print!("{}", self.icons.incorrect_flag.to_string().with(self.theme.mine));
            }
            TileState::Revealed => {
                let bg = if self.game.toggles().borders && self.on_frontier(point) {
                    self.theme.border
                } else {
                    self.theme.revealed[parity]
                };
                queue!(stdout(), style::SetBackgroundColor(bg), style::SetAttribute(Attribute::Bold))?;
                if tile.is_mine() {
                    let icon = if tile.exploded { self.icons.exploded } else { self.icons.mine };
                    print!("{}", icon.to_string().with(self.theme.mine));
                } else if tile.value == 0 {
                    print!(" ");
                } else {
                    let c = self.theme.nums[tile.value as usize - 1];
                    print!("{}", char::from(b'0' + tile.value as u8).to_string().with(c));
                }
                queue!(stdout(), style::SetAttribute(Attribute::Reset))?;
            }
        }
        Ok(())
    }

    fn on_frontier(&mut self, point: Coord) -> bool {
        adjacents(point).any(|adj| self.game.board_mut().generate(adj).state != TileState::Revealed)
    }

    fn draw(&mut self) -> Result<()> {
        queue!(stdout(), cursor::MoveTo(0, 0))?;
        let rows = self.h.saturating_sub(1);
        for y in self.y..self.y + rows as i64 {
            for x in self.x..self.x + self.w as i64 {
                self.show_tile((x, y))?;
            }
            queue!(stdout(), cursor::MoveToNextLine(1))?;
        }
        self.draw_status()
    }

    fn draw_status(&mut self) -> Result<()> {
        let stats = self.game.stats();
        let status = if self.game.is_active() {
            format!(
                " dug {}  flags {}  seed {}  [esc] quit",
                stats.revealed,
                stats.flags,
                self.game.board().seed()
            )
        } else {
            format!(" BOOM! dug {}  [esc] quit", stats.revealed)
        };
        queue!(stdout(), style::ResetColor, terminal::Clear(terminal::ClearType::CurrentLine))?;
        print!("{}", &status[..status.len().min(self.w as usize)]);
        Ok(())
    }

    fn click(&mut self, col: u16, row: u16) {
        if row + 1 >= self.h {
            return;
        }
        self.game.attempt_reveal((self.x + col as i64, self.y + row as i64));
    }

    fn flag(&mut self, col: u16, row: u16) {
        if row + 1 >= self.h {
            return;
        }
        self.game.toggle_flag((self.x + col as i64, self.y + row as i64));
    }

    fn pan(&mut self, dx: i64, dy: i64) {
        self.x += dx;
        self.y += dy;
    }
}

fn persist(game: &Game<TermHooks>, path: &Path) {
    let data = game.save_data();
    match serde_json::to_string(&data).map_err(infinisweeper::SaveError::from).and_then(|text| {
        std::fs::write(path, text)?;
        Ok(())
    }) {
        Ok(()) => log::debug!("saved {} tiles", data.board.len()),
        Err(e) => log::warn!("save failed: {e}"),
    }
}

pub fn game_loop(mut game: Game<TermHooks>, theme: Theme, icons: IconSet, save_path: PathBuf, autosave: bool) -> Result<()> {
    terminal::enable_raw_mode()?;
    queue!(stdout(), terminal::EnterAlternateScreen, terminal::DisableLineWrap, cursor::Hide, EnableMouseCapture)?;

    // fresh boards open on a friendly zero; restored ones on a dug tile
    let spawn = if game.board().is_empty() {
        game.suggest_spawn()
    } else {
        game.board()
            .iter()
            .find(|&(_, t)| t.state == TileState::Revealed)
            .map_or((0, 0), |(p, _)| p)
    };

    let mut cam = Camera::new(game, theme, icons, terminal::size()?);
    cam.center_on(spawn);

    let started = Instant::now();
    let mut speed: i64 = 1;
    let mut hold = None;
    let mut click_active = false;
    let mut was_active = cam.game.is_active();
    cam.draw()?;

    loop {
        cam.game.tick(started.elapsed().as_millis() as u64);
        if was_active && !cam.game.is_active() {
            // the session is over; a dead board is not worth resuming
            let _ = std::fs::remove_file(&save_path);
            was_active = false;
        }
        cam.draw()?;
        stdout().flush()?;

        if !poll(Duration::from_millis(16))? {
            continue;
        }
        let mut ev;
        // read off buffered drag events instead of doing them all for smoothness
        loop {
            ev = read()?;
            if matches!(ev, Event::Mouse(MouseEvent { kind: MouseEventKind::Drag(_), .. }))
                && poll(Duration::from_secs(0))?
            {
                continue;
            }
            break;
        }
        let mut interacted = false;
        match ev {
            Event::Key(event) => match event.code {
                KeyCode::Esc => break,
                KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => break,
                KeyCode::Char('w') => cam.pan(0, -speed),
                KeyCode::Char('a') => cam.pan(-speed, 0),
                KeyCode::Char('s') => cam.pan(0, speed),
                KeyCode::Char('d') => cam.pan(speed, 0),
                _ => {}
            },
            Event::Resize(w, h) => {
                cam.w = w;
                cam.h = h;
            }
            Event::Mouse(event) => match event.kind {
                MouseEventKind::Down(MouseButton::Left) => {
                    hold = Some((event.column, event.row));
                    click_active = true;
                }
                MouseEventKind::Drag(_) => {
                    if let Some((col, row)) = hold {
                        cam.pan(col as i64 - event.column as i64, row as i64 - event.row as i64);
                        hold = Some((event.column, event.row));
                        click_active = false;
                    }
                }
                MouseEventKind::Up(_) => {
                    hold = None;
                    if click_active {
                        cam.click(event.column, event.row);
                        click_active = false;
                        interacted = true;
                    }
                }
                MouseEventKind::Down(MouseButton::Right) => {
                    cam.flag(event.column, event.row);
                    interacted = true;
                }
                MouseEventKind::ScrollDown => speed = (speed - 1).max(1),
                MouseEventKind::ScrollUp => speed = (speed + 1).min(10),
                _ => {}
            },
        }
        if interacted && autosave && cam.game.is_active() {
            persist(&cam.game, &save_path);
        }
    }

    if autosave && cam.game.is_active() {
        persist(&cam.game, &save_path);
    }

    queue!(stdout(), cursor::Show, terminal::EnableLineWrap, terminal::LeaveAlternateScreen, DisableMouseCapture)?;
    stdout().flush()?;
    terminal::disable_raw_mode()?;
    Ok(())
}

#![forbid(unsafe_code)]

mod options;
mod ui;

use clap::Parser;
use directories::ProjectDirs;

use infinisweeper::{EffectToggles, Game, SaveData};

fn parse_chance(s: &str) -> Result<f64, &'static str> {
    let f = s.parse().map_err(|_| "invalid number")?;
    if !(0.0..=1.0).contains(&f) {
        return Err("mine chance out of range");
    }
    Ok(f)
}

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    #[clap(long, short, help = "Seed for a fresh board. Random if omitted.")]
    seed: Option<u64>,
    #[clap(long, short, default_value = "0.18", help = "The chance of any tile being a mine, between 0 and 1.", value_parser = parse_chance)]
    mine_chance: f64,
    #[clap(long, short, default_value = "garden", value_enum)]
    theme: options::ThemeChoice,
    #[clap(long, short, default_value = "ascii", value_enum)]
    iconset: options::IconSetChoice,
    #[clap(long, short, help = "Save automatically after every click.")]
    autosave: bool,
    #[clap(long, help = "Delete any existing save and start fresh.")]
    reset: bool,
    #[clap(long, help = "Skip particle pop effects.")]
    no_particles: bool,
    #[clap(long, help = "Skip highlighting the edges of dug regions.")]
    no_borders: bool,
    #[clap(long, help = "Skip the camera shake when a mine goes off.")]
    no_camera_shake: bool,
    #[clap(
        help = "The path to the save file. Will be created if it doesn't exist. Defaults to the value of INFINISWEEPER_SAVE if set, or to a reasonable platform-dependent config folder.",
        env = "INFINISWEEPER_SAVE",
    )]
    save_path: Option<std::path::PathBuf>,
}

fn load_save(path: &std::path::Path) -> Option<SaveData> {
    let text = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&text) {
        Ok(data) => Some(data),
        Err(e) => {
            log::warn!("ignoring unreadable save file: {e}");
            None
        }
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let path = args.save_path.clone().unwrap_or(
        match ProjectDirs::from("", "", "infinisweeper") {
            Some(p) => p.data_dir().join("save.json"),
            None => {
                eprintln!("couldn't find a save file path to use. please pass a path as an argument or set INFINISWEEPER_SAVE");
                std::process::exit(1);
            },
        }
    );
    if path.is_dir() {
        eprintln!("is a directory");
        std::process::exit(1);
    }
    std::fs::create_dir_all(path.parent().unwrap()).expect("failed creating directories");
    if args.reset {
        let _ = std::fs::remove_file(&path);
    }

    let toggles = EffectToggles {
        particles: !args.no_particles,
        borders: !args.no_borders,
        camera_shake: !args.no_camera_shake,
    };

    // a broken or missing save means a fresh board, never a half-restored one
    let game = load_save(&path)
        .and_then(|data| match Game::restore(&data, toggles, ui::TermHooks) {
            Ok(game) => Some(game),
            Err(e) => {
                log::warn!("save could not be restored: {e}");
                None
            }
        })
        .unwrap_or_else(|| {
            let seed = args.seed.unwrap_or_else(rand::random);
            Game::with_config(seed, args.mine_chance, toggles, ui::TermHooks)
        });

    ui::game_loop(game, args.theme.theme(), args.iconset.iconset(), path, args.autosave).unwrap();
}

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{info, LevelFilter};
use ratatui::{backend::CrosstermBackend, Terminal};
use tui_dispatch::EffectStore;

use minipoke::action::Action;
use minipoke::data::GameData;
use minipoke::dice::{seed_from_time, SeededDice};
use minipoke::grid::{Grid, Position};
use minipoke::reducer::reducer;
use minipoke::runtime::{dispatch_action, Store};
use minipoke::state::AppState;
use minipoke::ui;

#[derive(Parser, Debug)]
#[command(name = "minipoke")]
#[command(about = "Walk a tiny route, battle wild Pokémon and trainers, fill your party")]
struct Args {
    /// RNG seed (defaults to one derived from the clock)
    #[arg(long)]
    seed: Option<u64>,

    /// RON game-data file (defaults to the built-in Kanto data)
    #[arg(long)]
    data: Option<PathBuf>,

    /// Start on a generated grid with this many rows
    #[arg(long, requires = "cols", value_parser = clap::value_parser!(u16).range(2..))]
    rows: Option<u16>,

    /// Start on a generated grid with this many columns
    #[arg(long, requires = "rows", value_parser = clap::value_parser!(u16).range(2..))]
    cols: Option<u16>,

    /// Log to stderr at this level (redirect it, the TUI owns the terminal)
    #[arg(long, value_enum)]
    log_level: Option<LogLevel>,

    /// Print the JSON schema of the game-data file and exit
    #[arg(long)]
    print_data_schema: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn main() -> io::Result<()> {
    let args = Args::parse();

    if args.print_data_schema {
        let schema = schemars::schema_for!(GameData);
        let json = serde_json::to_string_pretty(&schema).map_err(io::Error::other)?;
        println!("{json}");
        return Ok(());
    }

    if let Some(level) = args.log_level {
        simple_logger::SimpleLogger::new()
            .with_level(level.into())
            .init()
            .map_err(io::Error::other)?;
    }

    let data = match &args.data {
        Some(path) => GameData::load(path).map_err(io::Error::other)?,
        None => GameData::default(),
    };
    let seed = args.seed.unwrap_or_else(seed_from_time);
    info!("starting with seed {seed}");
    let state = initial_state(data, seed, args.rows.zip(args.cols));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, state);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn initial_state(data: GameData, seed: u64, size: Option<(u16, u16)>) -> AppState {
    let Some((rows, cols)) = size else {
        return AppState::new(data, seed);
    };
    let mut dice = SeededDice::new(seed);
    let grid = Grid::generate(&mut dice, rows, cols);
    let player = Position::new(rows / 2, cols / 2);
    AppState::with_grid(data, dice.next_seed(), grid, player)
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    state: AppState,
) -> io::Result<()> {
    let mut store: Store = EffectStore::new(state, reducer);
    dispatch_action(&mut store, Action::Init);

    loop {
        terminal.draw(|frame| ui::render(frame, frame.area(), store.state()))?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                match ui::handle_key(key, store.state()) {
                    Some(Action::Quit) => break,
                    Some(action) => {
                        dispatch_action(&mut store, action);
                    }
                    None => {}
                }
            }
            Event::Resize(width, height) => {
                dispatch_action(&mut store, Action::UiTerminalResize(width, height));
            }
            _ => {}
        }
    }

    Ok(())
}

use std::fs::File;
use std::io::{self, Stdout, Write};
use std::path::Path;
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use ball_maze::config::Config;
use ball_maze::input::{command_for, Command};
use ball_maze::render::{render_title, Renderer, Viewport};
use ball_maze::{ArcadeWorld, GameSession, MazeError};
use clap::Parser;
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), MazeError> {
    let config = Config::parse();
    init_logging(config.log_file.as_deref())?;

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, &config);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    info!(ok = result.is_ok(), "shutting down");
    result
}

fn init_logging(path: Option<&Path>) -> Result<(), MazeError> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn run(stdout: &mut Stdout, config: &Config) -> Result<(), MazeError> {
    let mut rng = config.rng();
    let (term_w, term_h) = terminal::size()?;
    let viewport = Viewport::fit(term_w, term_h, config.rows, config.columns)?;
    let mut session = GameSession::new(
        ArcadeWorld::new(),
        config.rows as usize,
        config.columns as usize,
        viewport.cell_width,
        viewport.cell_height,
    )?;
    let mut renderer = Renderer::new(viewport);

    if !wait_for_start(stdout)? {
        return Ok(());
    }
    session.start(&mut rng)?;

    let tick = config.tick();
    let frame_time = config.frame_time();
    let mut last_tick = Instant::now();

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            match command_for(key) {
                Some(Command::Steer(dir)) => session.steer(dir),
                Some(Command::Reset) => {
                    session.reset(&mut rng)?;
                    renderer.invalidate();
                }
                Some(Command::Quit) => return Ok(()),
                None => {}
            }
        }

        if last_tick.elapsed() >= tick {
            last_tick = Instant::now();
            session.tick();
        }
        renderer.render(stdout, &session)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

/// Show the title screen until a key is pressed. `false` means quit.
fn wait_for_start(stdout: &mut Stdout) -> io::Result<bool> {
    render_title(stdout)?;
    loop {
        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    return Ok(!matches!(key.code, KeyCode::Char('q') | KeyCode::Esc));
                }
                Event::Resize(..) => render_title(stdout)?,
                _ => {}
            }
        }
        stdout.flush()?;
    }
}

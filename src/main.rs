#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;
#[cfg(not(target_arch = "wasm32"))]
use pinpong::{config, session, CliRenderer, FrameLimiter, Game, Renderer};
#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

/// Two-player Pong in the terminal.
///
/// Left paddle: W/S. Right paddle: Up/Down. P pauses, R re-serves,
/// Esc quits.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Parser)]
#[command(name = "pinpong", version)]
struct Cli {
    /// Seed for serve directions (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `pinpong=trace`
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Restore terminal state - called on panic
#[cfg(not(target_arch = "wasm32"))]
fn restore_terminal() {
    use crossterm::{
        cursor,
        event::PopKeyboardEnhancementFlags,
        execute,
        terminal::{disable_raw_mode, LeaveAlternateScreen},
    };
    let _ = disable_raw_mode();
    let _ = execute!(
        std::io::stdout(),
        PopKeyboardEnhancementFlags,
        LeaveAlternateScreen,
        cursor::Show
    );
}

/// Logs go to a file only; stdout belongs to the game.
#[cfg(not(target_arch = "wasm32"))]
fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let Some(path) = &cli.log_file else {
        return Ok(());
    };
    let file = std::fs::File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_new(&cli.log_level)?)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        restore_terminal();
        original_hook(panic_info);
    }));

    let mut game = match cli.seed {
        Some(seed) => Game::seeded(seed),
        None => Game::from_entropy(),
    };
    tracing::info!(seed = ?cli.seed, "starting {}", config::TITLE);

    let mut renderer = CliRenderer::new();
    renderer.open()?;

    let mut limiter = FrameLimiter::new(config::FPS);
    let result = session::run(&mut game, &mut renderer, &mut limiter);

    // Release the display before any error is printed
    let cleanup = renderer.cleanup();
    session::finish(result, cleanup)?;
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {}

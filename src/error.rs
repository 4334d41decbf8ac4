use std::io;
use thiserror::Error;

/// Fatal errors: anything that stops the game outside normal play.
#[derive(Debug, Error)]
pub enum PongError {
    #[error("failed to open display")]
    Display(#[source] io::Error),

    #[error("terminal too small: need at least {min_cols}x{min_rows}, got {cols}x{rows}")]
    TerminalTooSmall {
        cols: u16,
        rows: u16,
        min_cols: u16,
        min_rows: u16,
    },

    #[error("display I/O failed")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, PongError>;

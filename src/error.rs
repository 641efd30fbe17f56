use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MazeError {
    #[error("invalid maze dimensions: {rows} rows x {columns} columns (both must be at least 1)")]
    InvalidDimensions { rows: usize, columns: usize },

    #[error("invalid cell size {width}x{height} (both must be finite and positive)")]
    InvalidCellSize { width: f32, height: f32 },

    #[error("terminal too small: need at least {needed_cols}x{needed_rows} (cols x rows), have {cols}x{rows}")]
    TerminalTooSmall {
        needed_cols: u16,
        needed_rows: u16,
        cols: u16,
        rows: u16,
    },

    #[error("terminal i/o failed: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, MazeError>;

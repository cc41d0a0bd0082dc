//! Reading and writing grids and LOR lists

pub mod lors;
pub mod pgm;
pub mod raw;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Unparsable content at the given (1-based) line
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Content parsed, but inconsistent with the format
    #[error("malformed file: {0}")]
    Format(String),
}

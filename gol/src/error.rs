// error.rs - Error types for the generation engine

use thiserror::Error;

/// Everything that can stop a run before it produces its final grid.
#[derive(Error, Debug)]
pub enum Error {
    /// Run parameters that the engine cannot work with
    #[error("Configuration error: {0}")]
    Config(String),

    /// The input collaborator delivered the wrong number of cells
    #[error("Input grid has {got} cells, expected {expected}")]
    InputSize { expected: usize, got: usize },

    /// PGM image whose size does not match the run
    #[error("PGM error: {0}")]
    Pgm(String),

    /// Image that could not be decoded or encoded
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A collaborator task hung up before answering
    #[error("Channel closed: {0}")]
    ChannelClosed(&'static str),

    /// A spawned task panicked or was cancelled
    #[error("Task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn pgm(msg: impl Into<String>) -> Self {
        Self::Pgm(msg.into())
    }
}

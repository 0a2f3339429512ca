//! Crate-level error type.

use thiserror::Error;

use crate::engine::EngineError;

#[derive(Error, Debug)]
pub enum MpvError {
  /// The engine could not be created or initialized. Fatal for the host.
  #[error("Playback engine unavailable: {0}")]
  EngineUnavailable(String),

  #[error("Failed to initialize renderer: {0}")]
  Render(EngineError),

  #[error("Engine error: {0}")]
  Engine(#[from] EngineError),

  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("Invalid configuration: {0}")]
  InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, MpvError>;

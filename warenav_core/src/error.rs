//! Error types shared across warenav crates

use thiserror::Error;

/// Result alias used throughout warenav
pub type NavResult<T> = Result<T, NavError>;

/// Errors raised by the grid, the planners and configuration loading
#[derive(Debug, Error)]
pub enum NavError {
    /// Start or goal does not resolve to a cell of the grid
    #[error("Invalid endpoint ({x}, {y}): outside the grid")]
    InvalidEndpoint { x: i32, y: i32 },

    /// Dequeue or peek on an empty priority queue
    #[error("Priority queue is empty")]
    EmptyQueue,

    /// The requested planner kind was never configured on the facade
    #[error("Planner not configured: {0}")]
    PlannerNotConfigured(String),

    /// An agent id that the simulation does not know about
    #[error("Unknown agent: {0}")]
    UnknownAgent(u32),

    /// Invalid configuration values
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NavError {
    /// Build a configuration error from anything printable
    pub fn config(msg: impl Into<String>) -> Self {
        NavError::Config(msg.into())
    }

    /// Invalid endpoint error for a coordinate pair
    pub fn invalid_endpoint(x: i32, y: i32) -> Self {
        NavError::InvalidEndpoint { x, y }
    }
}

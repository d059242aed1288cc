//! Basis quoting bot application.
//!
//! Wires the decision core to the outside world:
//! - `session`: the single-threaded event dispatcher owning all trading state
//! - `app`: tokio event loop bridging session-layer channels to the session
//! - `config`: TOML application configuration
//! - `logging`: tracing subscriber setup

pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;

pub use app::Application;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use session::{SessionError, TraderSession};

//! Secret Santa
//!
//! Assigns gift-giving pairs by rejection-sampling a derangement of the
//! participant list, optionally emails each buyer their recipient, and can
//! repeat the draw many times to gather draw-count statistics.

pub mod assign;
pub mod config;
pub mod notify;
pub mod run;
pub mod stats;

use thiserror::Error;

// Re-export main types
pub use assign::{AssignError, Assigner, Assignment};
pub use config::{ConfigError, EmailConfig, GeneralConfig, SantaConfig, TlsMode};
pub use notify::{Letter, Mailer, Notifier, SmtpMailer, TransportError};
pub use run::{run, RunReport};
pub use stats::RunStatistics;

/// Top-level failure of a Secret Santa run. Every variant is fatal.
#[derive(Debug, Error)]
pub enum SantaError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Assign(#[from] AssignError),
    #[error("Error sending email: {0}")]
    Transport(#[from] TransportError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

//! Alert delivery channels.
//!
//! The console channel always fires; the email channel either sends over
//! SMTP or, in test mode, prints the mail to the console instead.

pub mod console;
pub mod email;

pub use console::ConsoleChannel;
pub use email::{EmailNotifier, EmailSettings};

/// How a mail ended up being delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Printed to the console (test mode or missing credentials)
    Console,
    Smtp,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("invalid address '{0}'")]
    Address(String),
    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
    #[error("mail task failed: {0}")]
    Task(String),
}

/// Outbound mail transport.
pub trait Mailer: Send + Sync {
    fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<Delivery, NotifyError>;
}

#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
pub mod core;
pub mod error;

pub mod app;
pub use app::run;
pub use error::{Error, Result};

//! User accounts: records, the JSON-backed store and the auth service.

pub mod auth;
pub mod model;
pub mod store;

pub use auth::{AuthError, AuthService};
pub use model::{NotificationMethod, Preferences, UserRecord};
pub use store::UserStore;

pub mod accounts;
pub mod alerts;
pub mod config;
pub mod detector;
pub mod history;
pub mod locations;
pub mod model;
pub mod monitor;
pub mod notify;
pub mod scheduler;
pub mod storage;

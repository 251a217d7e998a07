//! # tdm-backend
//!
//! Service shell around the TDM crates: configuration, logging and the
//! wired application context. The domain logic lives in the workspace
//! members (`tdm-commons`, `tdm-sql`, `tdm-store`, `tdm-catalog`,
//! `tdm-jobs`); this crate only assembles them.

pub mod config;
pub mod lifecycle;
pub mod logging;

pub use config::AppConfig;
pub use lifecycle::{bootstrap, AppContext};

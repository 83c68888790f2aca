pub mod config;
pub mod control_plane;
pub mod error;
pub mod export;
pub mod keys;
pub mod reconcile;
pub mod registrar;
pub mod registry;
pub mod report;

pub use error::{Result, SyncError};

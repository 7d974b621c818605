// Lolipop - bootstrap, run, and track developer projects

pub mod config;
pub mod envs;
pub mod git;
pub mod identity;
pub mod init;
pub mod models;
pub mod paths;
pub mod scripts;
pub mod store;
pub mod tracker;

// Re-export main types for convenience
pub use config::{Descriptor, EnvSpec};
pub use models::{GitInfo, ProjectRecord};
pub use paths::AppDirs;
pub use store::TrackingStore;
pub use tracker::Tracker;

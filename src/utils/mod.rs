//! Utility modules for common functionality

pub mod filesystem;
pub mod retry;
pub mod validators;

// Re-export commonly used functions
pub use filesystem::{ensure_directory_exists, is_clone_dir_dangerous};
pub use retry::{AttemptError, Retry};
pub use validators::{ValidationError, validate_config};

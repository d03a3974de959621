//! Settings loading from `.aicommrc` files.

pub mod settings;

pub use settings::{CONFIG_FILE_NAME, CommitStyle, ProviderKind, Settings};

//! User configuration stored in `~/.overlaymap/config.ini`.
//!
//! [`ConfigFile`] groups one settings struct per INI section. A missing file
//! yields defaults, and a present file only overrides the keys it names.
//! [`ConfigKey`] gives typed access by `section.key` name for the CLI.
//!
//! # Example
//!
//! ```
//! use overlaymap::config::{ConfigFile, ConfigKey};
//!
//! let mut config = ConfigFile::default();
//! ConfigKey::SelectionTolerance.set(&mut config, "12").unwrap();
//! assert_eq!(config.selection.tolerance, 12);
//! assert_eq!(ConfigKey::RenderVectorColor.get(&config), "#3388ff");
//! ```

mod defaults;
mod file;
mod keys;
mod parser;
mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use keys::{ConfigKey, ConfigKeyError};
pub use settings::{
    CompareSettings, ConfigFile, EditSettings, LoggingSettings, RenderSettings, SelectionSettings,
};

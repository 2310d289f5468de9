//! INI parsing logic for converting `Ini` → `ConfigFile`.

use ini::Ini;
use tracing::warn;

use super::file::ConfigFileError;
use super::keys::{ConfigKey, ConfigKeyError};
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the
/// INI. Unknown keys in known sections are logged and ignored.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    for key in ConfigKey::all() {
        let Some(section) = ini.section(Some(key.section())) else {
            continue;
        };
        let Some(value) = section.get(key.key_name()) else {
            continue;
        };
        key.set(&mut config, value).map_err(|e| match e {
            ConfigKeyError::ValidationFailed { reason, .. } => ConfigFileError::InvalidValue {
                section: key.section().to_string(),
                key: key.key_name().to_string(),
                value: value.to_string(),
                reason,
            },
            ConfigKeyError::UnknownKey(name) => ConfigFileError::InvalidValue {
                section: key.section().to_string(),
                key: name,
                value: value.to_string(),
                reason: "unknown key".to_string(),
            },
        })?;
    }

    for (section, properties) in ini.iter() {
        let Some(section) = section else { continue };
        for (name, _) in properties.iter() {
            let full = format!("{}.{}", section, name);
            if full.parse::<ConfigKey>().is_err() {
                warn!(key = %full, "Ignoring unknown configuration key");
            }
        }
    }

    Ok(config)
}

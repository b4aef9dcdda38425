//! Engine configuration, stored as plain JSON next to the application data.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Encryption engine settings.
///
/// All fields have defaults, so a partial or missing file still loads.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Recompute and check the integrity hash before opening a record.
    #[serde(default = "default_tamper_detection")]
    pub tamper_detection: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tamper_detection: default_tamper_detection(),
        }
    }
}

const fn default_tamper_detection() -> bool {
    true
}

impl EngineConfig {
    /// Load from `path`, falling back to defaults when the file is missing
    /// or invalid.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        load_json_or_default(path)
    }

    /// Persist to `path` atomically.
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` if the write or rename fails.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        save_json_atomic(self, path)
    }
}

/// Read a JSON config file.
///
/// Returns [`Default::default()`] when the file is missing or contains
/// invalid JSON (corrupt-file recovery).
#[must_use]
pub fn load_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    fs::read_to_string(path).map_or_else(
        |_| T::default(),
        |contents| {
            serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), "invalid config file, using defaults: {e}");
                T::default()
            })
        },
    )
}

/// Write `value` as pretty JSON to `path`.
///
/// Uses an atomic write pattern (write to a sibling `.tmp`, then rename)
/// and restricts permissions to the owner on Unix.
///
/// # Errors
///
/// Returns an `io::Error` if the directory does not exist or the file
/// system rejects the write/rename.
pub fn save_json_atomic<T: Serialize>(value: &T, path: &Path) -> std::io::Result<()> {
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    fs::write(&tmp, &json)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
    }

    fs::rename(&tmp, path)
}

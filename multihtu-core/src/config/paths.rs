//! Default path resolution for configuration files
//!
//! Follows XDG Base Directory conventions when available, with sensible fallbacks.

use std::path::PathBuf;

/// Returns the default path for the static configuration file.
///
/// Uses XDG config directory if available:
/// - Linux/macOS: `~/.config/multihtu/config.toml`
/// - Fallback: `/etc/multihtu/config.toml`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("/etc"))
        .join("multihtu")
        .join("config.toml")
}

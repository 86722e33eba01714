//! XDG Base Directory paths for typeconv.
//!
//! | Purpose | XDG Variable | Default | typeconv Path |
//! |---------|--------------|---------|---------------|
//! | Config | `$XDG_CONFIG_HOME` | `~/.config` | `$XDG_CONFIG_HOME/typeconv/config.toml` |
//! | History | `$XDG_DATA_HOME` | `~/.local/share` | `$XDG_DATA_HOME/typeconv/history.txt` |

use std::path::PathBuf;

use directories::BaseDirs;

/// Uses `$XDG_CONFIG_HOME/typeconv` or falls back to `~/.config/typeconv`.
pub fn config_dir() -> PathBuf {
    BaseDirs::new()
        .map(|d| d.config_dir().to_path_buf())
        .unwrap_or_else(|| home_fallback().join(".config"))
        .join("typeconv")
}

/// Uses `$XDG_DATA_HOME/typeconv` or falls back to `~/.local/share/typeconv`.
pub fn data_dir() -> PathBuf {
    BaseDirs::new()
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| home_fallback().join(".local").join("share"))
        .join("typeconv")
}

pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

pub fn history_file() -> PathBuf {
    data_dir().join("history.txt")
}

fn home_fallback() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

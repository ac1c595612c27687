//! Path helpers — data directory resolution and `~` expansion.

use std::path::PathBuf;

/// Get the Voxpipe data directory (e.g. `~/.voxpipe/`).
pub fn get_data_path() -> PathBuf {
    let home = home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".voxpipe")
}

/// Expand `~` to the home directory in a path string.
pub fn expand_home(path: &str) -> PathBuf {
    let home = || home_dir().unwrap_or_else(|| PathBuf::from("."));
    if path == "~" {
        home()
    } else if let Some(rest) = path.strip_prefix("~/") {
        home().join(rest)
    } else {
        PathBuf::from(path)
    }
}

/// Helper to get home directory.
fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| std::env::var("USERPROFILE").ok().map(PathBuf::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_path_ends_with_voxpipe() {
        let path = get_data_path();
        assert!(path.ends_with(".voxpipe"));
    }

    #[test]
    fn test_expand_home_tilde() {
        let expanded = expand_home("~/media/audio");
        assert!(!expanded.starts_with("~"));
        assert!(expanded.to_str().unwrap().ends_with("media/audio"));
    }

    #[test]
    fn test_expand_home_absolute() {
        let expanded = expand_home("/var/lib/voxpipe");
        assert_eq!(expanded, PathBuf::from("/var/lib/voxpipe"));
    }
}

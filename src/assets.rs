use std::path::{Path, PathBuf};

pub const SOUND_FILE: &str = "ding.mp3";
pub const TRAY_ICON_FILE: &str = "icon.png";

/// Directories searched for bundled resources, most specific first.
fn search_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        dirs.push(exe_dir.join("assets"));
        // macOS bundles keep resources next to the MacOS/ directory
        dirs.push(exe_dir.join("../Resources"));
        dirs.push(exe_dir);
    }
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd.join("assets"));
    }
    dirs
}

fn resolve_in(dirs: &[PathBuf], name: &str) -> Option<PathBuf> {
    dirs.iter().map(|dir| dir.join(name)).find(|path| path.is_file())
}

/// Path of a bundled resource. When nothing is found the returned path does
/// not exist and callers degrade.
pub fn resource_path(name: &str) -> PathBuf {
    let dirs = search_dirs();
    resolve_in(&dirs, name).unwrap_or_else(|| {
        dirs.last()
            .cloned()
            .unwrap_or_else(|| PathBuf::from("assets"))
            .join(name)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn first_directory_holding_the_file_wins() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        std::fs::write(second.path().join(SOUND_FILE), b"").unwrap();

        let dirs = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        assert_eq!(resolve_in(&dirs, SOUND_FILE), Some(second.path().join(SOUND_FILE)));

        std::fs::write(first.path().join(SOUND_FILE), b"").unwrap();
        assert_eq!(resolve_in(&dirs, SOUND_FILE), Some(first.path().join(SOUND_FILE)));
    }

    #[test]
    fn missing_resource_resolves_to_nonexistent_path() {
        let path = resource_path("definitely-not-bundled.bin");
        assert!(!path.exists());
        assert!(path.ends_with("definitely-not-bundled.bin"));
    }
}

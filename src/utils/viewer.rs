//! Locating and launching an external document viewer.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::config::ViewerConfig;

/// Finds a program able to display a downloaded document.
pub trait ViewerLookup {
    fn find(&self) -> Option<PathBuf>;
}

/// Probes the configured program names against `PATH`, in order.
#[derive(Debug, Clone)]
pub struct PathViewerLookup {
    programs: Vec<String>,
    search_path: Option<std::ffi::OsString>,
}

impl PathViewerLookup {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            programs: config.programs.clone(),
            search_path: std::env::var_os("PATH"),
        }
    }

    /// Search these directories instead of the process `PATH`
    pub fn search_path(mut self, path: impl Into<std::ffi::OsString>) -> Self {
        self.search_path = Some(path.into());
        self
    }
}

impl ViewerLookup for PathViewerLookup {
    fn find(&self) -> Option<PathBuf> {
        let search_path = self.search_path.as_ref()?;
        let dirs: Vec<PathBuf> = std::env::split_paths(search_path).collect();

        self.programs.iter().find_map(|program| {
            dirs.iter()
                .map(|dir| dir.join(program))
                .find(|candidate| is_executable(candidate))
        })
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Launch `viewer` on `document` without waiting for it to exit
pub fn open_in_viewer(viewer: &Path, document: &Path) -> std::io::Result<()> {
    tracing::info!("Opening {} with {}", document.display(), viewer.display());
    Command::new(viewer)
        .arg(document)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(programs: &[&str]) -> ViewerConfig {
        ViewerConfig {
            programs: programs.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[cfg(unix)]
    fn make_program(dir: &Path, name: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        std::fs::write(&path, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn test_first_configured_program_wins() {
        let dir = tempfile::tempdir().unwrap();
        make_program(dir.path(), "evince");
        let zathura = make_program(dir.path(), "zathura");

        let lookup = PathViewerLookup::new(&config(&["mupdf", "zathura", "evince"]))
            .search_path(dir.path().as_os_str());
        assert_eq!(lookup.find(), Some(zathura));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_executable_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mupdf"), "").unwrap();

        let lookup =
            PathViewerLookup::new(&config(&["mupdf"])).search_path(dir.path().as_os_str());
        assert_eq!(lookup.find(), None);
    }

    #[test]
    fn test_nothing_found() {
        let dir = tempfile::tempdir().unwrap();
        let lookup = PathViewerLookup::new(&config(&["no-such-viewer"]))
            .search_path(dir.path().as_os_str());
        assert!(lookup.find().is_none());
    }
}

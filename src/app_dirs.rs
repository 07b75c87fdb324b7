use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Log file location; the terminal is owned by the UI so logs go to disk
    pub fn log_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("hovertrace");
            Some(state_dir.join("hovertrace.log"))
        } else {
            ProjectDirs::from("", "", "hovertrace")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("hovertrace.log"))
        }
    }
}

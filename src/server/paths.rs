// pulp-image/src/server/paths.rs
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

const RESULTS_DIR: &str = "pulp-image-results";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Expands a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let home = dirs::home_dir();
    match (path, home) {
        ("~", Some(home)) => home,
        (p, Some(home)) if p.starts_with("~/") || p.starts_with("~\\") => home.join(&p[2..]),
        (p, _) => PathBuf::from(p),
    }
}

pub fn current_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Accepts only `YYYY-MM-DD_HH-mm-ss`, which keeps the value safe as a folder name.
pub fn valid_timestamp(timestamp: &str) -> bool {
    chrono::NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).is_ok()
        && timestamp.len() == 19
}

/// `~/pulp-image-results/<timestamp>`, with a fresh timestamp when the given one is unusable.
pub fn default_output_dir(timestamp: Option<&str>) -> PathBuf {
    let stamp = match timestamp {
        Some(t) if valid_timestamp(t) => t.to_string(),
        _ => current_timestamp(),
    };
    let base = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join(RESULTS_DIR).join(stamp)
}

/// Whether creating `path` looks possible: the nearest existing ancestor must be a directory.
pub fn can_create(path: &Path) -> bool {
    path.ancestors()
        .skip(1)
        .find(|ancestor| ancestor.exists())
        .map(|ancestor| ancestor.is_dir())
        .unwrap_or(false)
}

/// Opens a folder in the platform file manager.
pub fn open_folder(path: &Path) -> io::Result<()> {
    if !path.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("Folder does not exist: {}", path.display()),
        ));
    }

    let program = if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else {
        "xdg-open"
    };

    Command::new(program).arg(path).spawn()?;
    Ok(())
}

// pulp-image/src/utils/mod.rs
use crate::core::{NamingStrategy, ProcessConfig};
use std::collections::HashSet;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Computes where `input_path` is written under `config`.
///
/// Path-only: nothing is created or checked on disk. `file_index` is the
/// 0-based batch position and only feeds `{index}` in rename templates.
pub fn build_output_path(
    input_path: &Path,
    config: &ProcessConfig,
    file_index: Option<usize>,
) -> io::Result<PathBuf> {
    let output_dir = resolve_path(&config.out_dir)?;

    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    let extension = match config.format {
        Some(format) => format.extension().to_string(),
        None => input_path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_string(),
    };

    let file_name = match &config.naming {
        NamingStrategy::Template { pattern } => {
            let index = file_index.map(|i| i + 1).unwrap_or(1);
            let name = pattern
                .replace("{name}", stem)
                .replace("{ext}", &extension)
                .replace("{index}", &index.to_string());
            let has_extension = Path::new(&name)
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.contains('.'));
            if has_extension || extension.is_empty() {
                name
            } else {
                format!("{}.{}", name, extension)
            }
        }
        NamingStrategy::Suffix { auto, custom } => {
            let mut parts: Vec<String> = Vec::new();
            if *auto {
                match (config.width, config.height) {
                    (Some(w), Some(h)) => parts.push(format!("{}x{}", w, h)),
                    (Some(w), None) => parts.push(format!("{}w", w)),
                    (None, Some(h)) => parts.push(format!("{}h", h)),
                    (None, None) => {}
                }
            }
            if let Some(custom) = custom.as_deref().filter(|s| !s.is_empty()) {
                parts.push(custom.to_string());
            }

            let suffix = if parts.is_empty() {
                String::new()
            } else {
                format!("-{}", parts.join("-"))
            };

            if extension.is_empty() {
                format!("{}{}", stem, suffix)
            } else {
                format!("{}{}.{}", stem, suffix, extension)
            }
        }
    };

    // Templates may carry `..`; fold them so path equality checks see the real target.
    resolve_path(&output_dir.join(file_name))
}

/// Makes `path` absolute against the working directory and folds `.`/`..`
/// lexically, without touching the filesystem.
pub fn resolve_path(path: &Path) -> io::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut resolved = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other.as_os_str()),
        }
    }
    Ok(resolved)
}

/// Creates output directories lazily, at most once per directory per run.
#[derive(Debug, Default)]
pub struct OutputDirs {
    ensured: HashSet<PathBuf>,
}

impl OutputDirs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ensure(&mut self, dir: &Path) -> io::Result<()> {
        if self.ensured.contains(dir) {
            return Ok(());
        }
        std::fs::create_dir_all(dir)?;
        log::debug!("Ensured output directory {}", dir.display());
        self.ensured.insert(dir.to_path_buf());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeStats {
    pub bytes_saved: i64,
    pub percent_saved: f64,
}

pub fn calculate_stats(original_size: u64, final_size: u64) -> SizeStats {
    let bytes_saved = original_size as i64 - final_size as i64;
    SizeStats {
        bytes_saved,
        percent_saved: percent_of(bytes_saved, original_size),
    }
}

/// `saved / original * 100` rounded to two decimals; 0 when nothing was read.
pub fn percent_of(saved: i64, original: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    round2(saved as f64 / original as f64 * 100.0)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let base = 1024_f64;
    let bytes_f64 = bytes as f64;
    let exponent = ((bytes_f64.log10() / base.log10()).floor() as usize).min(UNITS.len() - 1);
    let size = bytes_f64 / base.powi(exponent as i32);

    if exponent == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.2} {}", size, UNITS[exponent])
    }
}

/// Signed variant used for savings, which go negative when output grows.
pub fn format_signed_size(bytes: i64) -> String {
    if bytes < 0 {
        format!("-{}", format_file_size(bytes.unsigned_abs()))
    } else {
        format_file_size(bytes as u64)
    }
}

pub fn sanitize_filename(filename: &str) -> String {
    let invalid_chars = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];
    let cleaned: String = filename
        .chars()
        .map(|c| if invalid_chars.contains(&c) || c.is_control() { '_' } else { c })
        .collect();

    match cleaned.trim_matches('.') {
        "" => "image".to_string(),
        _ => cleaned,
    }
}

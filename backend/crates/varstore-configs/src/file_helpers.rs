use std::path::{Path, PathBuf};

/// Resolve a directory setting to an absolute path, relative to the working directory.
///
/// Paths that cannot be resolved are returned unchanged.
pub fn normalize_dir_path(path: &str) -> String {
    let trimmed = path.trim();
    let candidate = Path::new(trimmed);
    if candidate.is_absolute() {
        return trimmed.to_string();
    }
    match std::env::current_dir() {
        Ok(cwd) => join_path(cwd, trimmed).to_string_lossy().into_owned(),
        Err(_) => trimmed.to_string(),
    }
}

/// Join without producing `./` segments for the current directory.
pub fn join_path(base: impl Into<PathBuf>, segment: &str) -> PathBuf {
    let mut base = base.into();
    let segment = segment.trim_start_matches("./");
    if !segment.is_empty() && segment != "." {
        base.push(segment);
    }
    base
}

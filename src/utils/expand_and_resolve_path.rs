use anyhow::{Context, Result};
use log::warn;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Expands ~ and env vars if possible (only for UTF-8 paths), and always returns an absolute PathBuf.
/// Does NOT fail if the file does not exist.
pub fn expand_and_resolve_path<P: AsRef<Path>>(input: P) -> Result<PathBuf> {
    let input = input.as_ref();
    let expanded: PathBuf = match input.to_str() {
        Some(s) => match shellexpand::full(s) {
            Ok(expanded) => PathBuf::from(expanded.as_ref()),
            Err(e) => {
                warn!("Failed to expand path {:?} ({}). Using original path.", input, e);
                input.to_path_buf()
            }
        },
        None => {
            warn!("Path {:?} is not valid UTF-8. Skipping path expansion.", input);
            input.to_path_buf()
        }
    };

    // Try canonicalize, else make absolute
    if let Ok(absolute) = fs::canonicalize(&expanded) {
        return Ok(absolute);
    }
    let abs = if expanded.is_absolute() {
        expanded
    } else {
        env::current_dir()
            .context("Failed to get current directory")?
            .join(expanded)
    };
    Ok(path_clean::clean(abs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_path_is_canonical() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = expand_and_resolve_path(dir.path()).unwrap();
        assert_eq!(resolved, fs::canonicalize(dir.path()).unwrap());
    }

    #[test]
    fn missing_path_is_absolute_and_clean() {
        let resolved = expand_and_resolve_path("does/not/../exist").unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("does/exist"));
    }
}

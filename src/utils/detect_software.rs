use log::debug;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Look for an executable on a PATH-style search list without spawning it.
pub fn find_in_path(program: &str, path_var: Option<&OsStr>) -> Option<PathBuf> {
    let path_var = path_var?;
    for dir in std::env::split_paths(path_var) {
        let candidate = dir.join(program);
        if is_executable(&candidate) {
            debug!("Found {} at {}", program, candidate.display());
            return Some(candidate);
        }
    }
    debug!("{} is not in PATH", program);
    None
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    match std::fs::metadata(path) {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    #[test]
    fn only_executables_are_found() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("qsub");
        std::fs::write(&exe, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).unwrap();
        let plain = dir.path().join("sbatch");
        std::fs::write(&plain, "not executable").unwrap();

        let path_var = std::env::join_paths([dir.path()]).unwrap();
        assert_eq!(find_in_path("qsub", Some(&path_var)), Some(exe));
        assert_eq!(find_in_path("sbatch", Some(&path_var)), None);
        assert_eq!(find_in_path("qsub", None), None);
    }
}

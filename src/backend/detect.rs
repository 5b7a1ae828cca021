use log::{debug, info};
use std::ffi::OsStr;
use std::sync::OnceLock;

use super::Backend;
use crate::runtime;
use crate::utils::find_in_path;

/// Environment variable naming the backend explicitly, skipping PATH probing
pub const BACKEND_ENV_VAR: &str = "CLUSTER_BACKEND";

/// Resolve the backend from an explicit override, else by probing a PATH list.
/// No process is spawned.
pub fn resolve_backend_with(
    override_name: Option<&str>,
    path_var: Option<&OsStr>,
) -> runtime::Result<Backend> {
    if let Some(name) = override_name.filter(|n| !n.trim().is_empty()) {
        let backend: Backend = name.parse()?;
        debug!("Backend {} selected by override", backend);
        return Ok(backend);
    }

    for backend in Backend::ALL {
        if find_in_path(backend.probe_program(), path_var).is_some() {
            info!("Detected {} backend", backend);
            return Ok(backend);
        }
    }
    Err(runtime::Error::NoBackendAvailable)
}

/// Resolve from $CLUSTER_BACKEND and $PATH.
pub fn resolve_backend() -> runtime::Result<Backend> {
    let override_name = std::env::var(BACKEND_ENV_VAR).ok();
    let path_var = std::env::var_os("PATH");
    resolve_backend_with(override_name.as_deref(), path_var.as_deref())
}

/// As resolve_backend, memoized for the process lifetime once it succeeds.
pub fn resolve_backend_once() -> runtime::Result<Backend> {
    static BACKEND: OnceLock<Backend> = OnceLock::new();
    if let Some(backend) = BACKEND.get() {
        return Ok(*backend);
    }
    let backend = resolve_backend()?;
    Ok(*BACKEND.get_or_init(|| backend))
}

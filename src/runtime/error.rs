use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(
        "No cluster backend available. Put 'sbatch' (Slurm) or 'qsub' (Torque) in your $PATH, or set ${}.",
        crate::backend::BACKEND_ENV_VAR
    )]
    NoBackendAvailable,

    #[error("Backend '{}' is not supported. Expected one of: slurm, torque.", name)]
    UnsupportedBackend { name: String },

    #[error("Input root {:?} is unavailable{}.", path, Error::format_msg_as_detail(msg))]
    InputRootUnavailable {
        path: std::path::PathBuf,
        msg: Option<String>,
    },

    #[error("Failed trying to execute '{}': {}", cmd, source)]
    CommandExecutionFailed {
        cmd: String,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Command '{}' exited with {}{}",
        cmd,
        Error::format_exit_code(code),
        Error::format_msg_as_detail(stderr)
    )]
    CommandFailed {
        cmd: String,
        code: Option<i32>,
        stderr: Option<String>,
    },

    #[error("Could not read the output of '{}'{}", cmd, Error::format_msg_as_detail(msg))]
    MalformedOutput { cmd: String, msg: Option<String> },

    #[error("Failed formatting command for {:?}{}", path, Error::format_msg_as_detail(msg))]
    FormatFailed {
        path: std::path::PathBuf,
        msg: Option<String>,
    },

    #[error("Invalid job options{}", Error::format_msg_as_detail(msg))]
    InvalidJobOptions { msg: Option<String> },

    #[error("Invalid pattern '{}': {}", pattern, source)]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Failed creating directory {:?}: {}", path, source)]
    DirectoryCreationFailed {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path {:?} is not below {:?}.", path, root)]
    PathNotBelowRoot {
        path: std::path::PathBuf,
        root: std::path::PathBuf,
    },
}

impl Error {
    #[cold]
    pub fn unsupported_backend<N: Into<String>>(name: N) -> Self {
        Error::UnsupportedBackend { name: name.into() }
    }

    #[cold]
    pub fn input_root_unavailable<P: AsRef<std::path::Path>, M: Into<String>>(
        path: P,
        msg: Option<M>,
    ) -> Self {
        Error::InputRootUnavailable {
            path: path.as_ref().to_path_buf(),
            msg: msg.map(|m| m.into()),
        }
    }

    #[cold]
    pub fn command_execution_failed<C: Into<String>>(cmd: C, source: std::io::Error) -> Self {
        Error::CommandExecutionFailed {
            cmd: cmd.into(),
            source,
        }
    }

    #[cold]
    pub fn command_failed<C: Into<String>, M: Into<String>>(
        cmd: C,
        code: Option<i32>,
        stderr: Option<M>,
    ) -> Self {
        Error::CommandFailed {
            cmd: cmd.into(),
            code,
            stderr: stderr.map(|m| m.into()),
        }
    }

    #[cold]
    pub fn malformed_output<C: Into<String>, M: Into<String>>(cmd: C, msg: Option<M>) -> Self {
        Error::MalformedOutput {
            cmd: cmd.into(),
            msg: msg.map(|m| m.into()),
        }
    }

    #[cold]
    pub fn format_failed<P: AsRef<std::path::Path>, M: Into<String>>(
        path: P,
        msg: Option<M>,
    ) -> Self {
        Error::FormatFailed {
            path: path.as_ref().to_path_buf(),
            msg: msg.map(|m| m.into()),
        }
    }

    #[cold]
    pub fn invalid_job_options<M: Into<String>>(msg: M) -> Self {
        Error::InvalidJobOptions {
            msg: Some(msg.into()),
        }
    }

    #[cold]
    pub fn invalid_pattern<P: Into<String>>(pattern: P, source: regex::Error) -> Self {
        Error::InvalidPattern {
            pattern: pattern.into(),
            source,
        }
    }

    #[cold]
    pub fn directory_creation_failed<P: AsRef<std::path::Path>>(
        path: P,
        source: std::io::Error,
    ) -> Self {
        Error::DirectoryCreationFailed {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    #[cold]
    pub fn path_not_below_root<P: AsRef<std::path::Path>, R: AsRef<std::path::Path>>(
        path: P,
        root: R,
    ) -> Self {
        Error::PathNotBelowRoot {
            path: path.as_ref().to_path_buf(),
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Errors after which nothing else in a run can be meaningfully done.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::NoBackendAvailable
                | Error::UnsupportedBackend { .. }
                | Error::InputRootUnavailable { .. }
                | Error::DirectoryCreationFailed { .. }
        )
    }

    pub fn format_msg_as_detail(msg: &Option<String>) -> String {
        match msg {
            Some(m) if !m.trim().is_empty() => format!(" ({})", m.trim()),
            _ => String::new(),
        }
    }

    fn format_exit_code(code: &Option<i32>) -> String {
        match code {
            Some(c) => format!("exit code {}", c),
            None => "no exit code (killed by signal)".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

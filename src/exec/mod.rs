mod shell;

pub use shell::CommandOutput;
pub use shell::ShellExecutor;
pub use shell::DEFAULT_SHELL_PATH;

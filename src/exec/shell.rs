use log::{debug, warn};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::runtime;
use crate::utils::{args_to_string, command_to_string};

pub const DEFAULT_SHELL_PATH: &str = "/bin/sh";

const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

///////////////////////////////
/// Runs scheduler client programs. Spawns directly, falls back to the shell
/// once when the program cannot be found or executed on its own.
#[derive(Clone, Debug)]
pub struct ShellExecutor {
    timeout: Option<Duration>,
    shell: PathBuf,
}

impl Default for ShellExecutor {
    fn default() -> Self {
        ShellExecutor::new()
    }
}

impl ShellExecutor {
    pub fn new() -> Self {
        ShellExecutor {
            timeout: None,
            shell: PathBuf::from(DEFAULT_SHELL_PATH),
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_shell<P: Into<PathBuf>>(mut self, shell: P) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Run `program args...`, optionally feeding `stdin`, and return decoded output.
    /// Launch problems and timeouts are CommandExecutionFailed; a non-zero exit is CommandFailed.
    pub fn run<S: AsRef<str>>(
        &self,
        program: &str,
        args: &[S],
        stdin: Option<&str>,
    ) -> runtime::Result<CommandOutput> {
        let mut direct = Command::new(program);
        direct.args(args.iter().map(|a| a.as_ref()));
        let cmd_string = command_to_string(&direct);

        let (child, launch_error) = match self.spawn(&mut direct, stdin.is_some()) {
            Ok(child) => (child, None),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied
                ) =>
            {
                let mut fallback = self.fallback_command(program, args, e.kind());
                debug!(
                    "Direct execution of '{}' failed ({}), retrying as {}",
                    program,
                    e,
                    command_to_string(&fallback)
                );
                match self.spawn(&mut fallback, stdin.is_some()) {
                    Ok(child) => (child, Some(e)),
                    Err(_) => return Err(runtime::Error::command_execution_failed(&cmd_string, e)),
                }
            }
            Err(e) => return Err(runtime::Error::command_execution_failed(&cmd_string, e)),
        };

        let (status, output) = self.wait(child, stdin, &cmd_string)?;
        if !status.success() {
            // 126/127 from the shell: it could not run the program either
            if let Some(e) = launch_error {
                if matches!(status.code(), Some(126) | Some(127)) {
                    debug!("{}: {}", self.shell.display(), output.stderr.trim());
                    return Err(runtime::Error::command_execution_failed(cmd_string, e));
                }
            }
            return Err(runtime::Error::command_failed(
                cmd_string,
                status.code(),
                Some(output.stderr),
            ));
        }
        Ok(output)
    }

    /// Not found: let the shell resolve the name. Not executable: read the file as a
    /// script (wrapper scripts on noexec mounts).
    fn fallback_command<S: AsRef<str>>(
        &self,
        program: &str,
        args: &[S],
        kind: io::ErrorKind,
    ) -> Command {
        let mut cmd = Command::new(&self.shell);
        if kind == io::ErrorKind::PermissionDenied && program.contains('/') {
            cmd.arg(program).args(args.iter().map(|a| a.as_ref()));
        } else {
            let mut argv: Vec<&str> = vec![program];
            argv.extend(args.iter().map(|a| a.as_ref()));
            cmd.arg("-c").arg(args_to_string(&argv));
        }
        cmd
    }

    fn spawn(&self, cmd: &mut Command, with_stdin: bool) -> io::Result<Child> {
        cmd.stdin(if with_stdin {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    }

    fn wait(
        &self,
        mut child: Child,
        stdin: Option<&str>,
        cmd_string: &str,
    ) -> runtime::Result<(ExitStatus, CommandOutput)> {
        // Drain both pipes off-thread so a chatty child never blocks on a full pipe
        let stdout_reader = child.stdout.take().map(spawn_reader);
        let stderr_reader = child.stderr.take().map(spawn_reader);

        if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
            if let Err(e) = pipe.write_all(input.as_bytes()) {
                // The child may legitimately exit without reading everything
                if e.kind() != io::ErrorKind::BrokenPipe {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(runtime::Error::command_execution_failed(cmd_string, e));
                }
            }
            // Dropping the pipe closes it, signalling EOF
        }

        let status = match self.timeout {
            None => child
                .wait()
                .map_err(|e| runtime::Error::command_execution_failed(cmd_string, e))?,
            Some(timeout) => {
                let deadline = Instant::now() + timeout;
                loop {
                    match child.try_wait() {
                        Ok(Some(status)) => break status,
                        Ok(None) if Instant::now() >= deadline => {
                            warn!("'{}' did not finish within {:?}, killing it", cmd_string, timeout);
                            let _ = child.kill();
                            let _ = child.wait();
                            return Err(runtime::Error::command_execution_failed(
                                cmd_string,
                                io::Error::new(
                                    io::ErrorKind::TimedOut,
                                    format!("timed out after {:?}", timeout),
                                ),
                            ));
                        }
                        Ok(None) => thread::sleep(POLL_INTERVAL),
                        Err(e) => {
                            return Err(runtime::Error::command_execution_failed(cmd_string, e))
                        }
                    }
                }
            }
        };

        let output = CommandOutput {
            stdout: join_reader(stdout_reader),
            stderr: join_reader(stderr_reader),
        };
        Ok((status, output))
    }
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn join_reader(handle: Option<thread::JoinHandle<Vec<u8>>>) -> String {
    match handle {
        Some(handle) => {
            let bytes = handle.join().unwrap_or_default();
            String::from_utf8_lossy(&bytes).into_owned()
        }
        None => String::new(),
    }
}

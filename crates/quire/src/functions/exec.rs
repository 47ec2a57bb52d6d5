//! Process execution helpers, available only with the exec capability.

use std::io::{Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

use minijinja::Error;
use wait_timeout::ChildExt;

use super::{helper_error, invalid, FunctionRegistry};

/// Failure of a shell command started by the exec helpers.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Command `{0}` timed out after {1:?}")]
    Timeout(String, Duration),
    #[error("Command `{0}` failed with status {1}")]
    CommandFailed(String, ExitStatus),
    #[error("Command output was not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Runs `command` through the platform shell and returns its stdout.
///
/// `input`, if given, is written to the child's stdin; otherwise stdin is
/// closed. Stderr is inherited. With a `timeout` the child is killed once it
/// runs longer than that.
pub fn run_shell(
    command: &str,
    input: Option<&str>,
    timeout: Option<Duration>,
) -> Result<String, ShellError> {
    let mut cmd = if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(command);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(command);
        c
    };

    cmd.stdin(if input.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    })
    .stdout(Stdio::piped())
    .stderr(Stdio::inherit());

    tracing::debug!(command, "running shell command");
    let mut child = cmd.spawn()?;

    // Drain stdout on its own thread so a chatty child never blocks on a
    // full pipe while we wait for it.
    let reader = child.stdout.take().map(|mut stdout| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            stdout.read_to_end(&mut buf).map(|_| buf)
        })
    });

    if let (Some(mut stdin), Some(input)) = (child.stdin.take(), input) {
        if let Err(err) = stdin.write_all(input.as_bytes()) {
            drop(stdin);
            // The child may already have exited; reap it either way.
            let _ = child.kill();
            let _ = child.wait();
            if let Some(handle) = reader {
                let _ = handle.join();
            }
            return Err(err.into());
        }
    }

    wait(&mut child, command, timeout)?;

    let bytes = match reader {
        Some(handle) => handle.join().unwrap_or_else(|_| Ok(Vec::new()))?,
        None => Vec::new(),
    };
    Ok(String::from_utf8(bytes)?)
}

fn wait(child: &mut Child, command: &str, timeout: Option<Duration>) -> Result<(), ShellError> {
    let status = match timeout {
        Some(duration) => match child.wait_timeout(duration)? {
            Some(status) => status,
            None => {
                child.kill()?;
                child.wait()?;
                return Err(ShellError::Timeout(command.to_string(), duration));
            }
        },
        None => child.wait()?,
    };
    if !status.success() {
        return Err(ShellError::CommandFailed(command.to_string(), status));
    }
    Ok(())
}

pub fn functions() -> FunctionRegistry {
    let mut registry = FunctionRegistry::new();
    registry.add("exec", |command: String| -> Result<String, Error> {
        run_shell(&command, None, None).map_err(|e| helper_error("exec failed", e))
    });
    registry.add(
        "execTimeout",
        |command: String, seconds: f64| -> Result<String, Error> {
            if !seconds.is_finite() || seconds <= 0.0 {
                return Err(invalid(format!("execTimeout: invalid timeout {}", seconds)));
            }
            run_shell(&command, None, Some(Duration::from_secs_f64(seconds)))
                .map_err(|e| helper_error("exec failed", e))
        },
    );
    registry.add("pipe", |command: String, input: String| -> Result<String, Error> {
        run_shell(&command, Some(&input), None).map_err(|e| helper_error("pipe failed", e))
    });
    registry
}

//! Launching the watched command and reading its merged output.

use crate::error::{Error, Result};
use std::io::{self, PipeReader, Read};
use std::process::{Child, Command, Stdio};
use tracing::{debug, warn};

/// The argv to execute for the user's command words.
///
/// Without `use_exec` the words are joined with spaces and handed to
/// `/bin/sh -c`, so shell syntax in them works. With it they are executed
/// directly.
pub fn exec_command(args: &[String], use_exec: bool) -> Vec<String> {
    if use_exec {
        return args.to_vec();
    }
    vec!["/bin/sh".to_string(), "-c".to_string(), args.join(" ")]
}

/// Human readable form of the command words, quoted where a shell would need
/// it. Used as the header title.
pub fn display_command(args: &[String]) -> String {
    shell_words::join(args)
}

/// A running child whose stdout and stderr share one pipe.
///
/// Reading yields the combined output in the order it was written. Closing
/// interrupts the child if it is still running and reaps it.
#[derive(Debug)]
pub struct ChildOutput {
    reader: Option<PipeReader>,
    child: Option<Child>,
}

impl ChildOutput {
    /// Start `argv[0]` with the remaining words as arguments.
    ///
    /// # Errors
    ///
    /// [`Error::Spawn`] if `argv` is empty, the pipe cannot be created or
    /// the program cannot be started.
    pub fn spawn(argv: &[String]) -> Result<Self> {
        let spawn_error = |source| Error::Spawn {
            command: argv.join(" "),
            source,
        };
        let Some((program, args)) = argv.split_first() else {
            return Err(spawn_error(io::Error::new(
                io::ErrorKind::InvalidInput,
                "empty command",
            )));
        };

        let (reader, writer) = io::pipe().map_err(spawn_error)?;
        let stderr = writer.try_clone().map_err(spawn_error)?;

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(writer)
            .stderr(stderr);
        let child = cmd.spawn().map_err(spawn_error)?;
        // Our copies of the write end must go, or the reader never sees EOF.
        drop(cmd);

        debug!(pid = child.id(), ?argv, "command started");
        Ok(Self {
            reader: Some(reader),
            child: Some(child),
        })
    }

    /// Stop reading, interrupt the child if still running, and wait for it.
    ///
    /// Idempotent. Failures are logged, not returned: the cycle's output is
    /// already complete.
    pub fn close(&mut self) {
        self.reader.take();
        let Some(mut child) = self.child.take() else {
            return;
        };

        match child.try_wait() {
            Ok(Some(status)) => {
                debug!(%status, "command exited");
                return;
            }
            Ok(None) => interrupt(&mut child),
            Err(e) => warn!("unable to poll command status: {e}"),
        }
        match child.wait() {
            Ok(status) => debug!(%status, "command reaped"),
            Err(e) => warn!("unable to wait for command: {e}"),
        }
    }
}

impl Read for ChildOutput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.reader.as_mut() {
            Some(reader) => reader.read(buf),
            None => Ok(0),
        }
    }
}

impl Drop for ChildOutput {
    fn drop(&mut self) {
        self.close();
    }
}

/// Ask the child to stop the way Ctrl-C would.
#[cfg(unix)]
fn interrupt(child: &mut Child) {
    let Ok(pid) = i32::try_from(child.id()) else {
        return;
    };
    // SAFETY: `libc::kill` takes plain integers. The child has not been
    // reaped yet, so `pid` still names it.
    #[allow(unsafe_code)]
    let rc = unsafe { libc::kill(pid, libc::SIGINT) };
    if rc != 0 {
        warn!("unable to interrupt command: {}", io::Error::last_os_error());
    }
}

#[cfg(not(unix))]
fn interrupt(child: &mut Child) {
    if let Err(e) = child.kill() {
        warn!("unable to stop command: {e}");
    }
}

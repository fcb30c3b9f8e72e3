//! Process execution service for running external tools.
//!
//! Every call blocks until the child exits. Standard output is streamed by a
//! reader thread over a channel so the optional bounded wait also covers
//! reads from a child that stops producing output.

use crate::error::{ProcessError, ProcessResult};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

/// How often a bounded wait polls the child
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Build the argument vector for a tool subcommand
pub fn build_argv(verb: &str, args: &[&str]) -> Vec<String> {
    std::iter::once(verb)
        .chain(args.iter().copied())
        .map(str::to_string)
        .collect()
}

/// Handle to a running child whose stdout is consumed line by line
pub struct ProcessHandle {
    program: String,
    child: Child,
    lines: Receiver<io::Result<String>>,
    deadline: Option<Instant>,
    timeout: Option<Duration>,
    reaped: bool,
}

impl ProcessHandle {
    /// Next stdout line, `None` once the stream is exhausted
    pub fn next_line(&mut self) -> ProcessResult<Option<String>> {
        let received = match self.deadline {
            Some(deadline) => self
                .lines
                .recv_timeout(deadline.saturating_duration_since(Instant::now())),
            None => self
                .lines
                .recv()
                .map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(Ok(line)) => Ok(Some(line)),
            Ok(Err(source)) => Err(ProcessError::Read {
                program: self.program.clone(),
                source,
            }),
            Err(RecvTimeoutError::Disconnected) => Ok(None),
            Err(RecvTimeoutError::Timeout) => Err(self.abort()),
        }
    }

    /// Wait for the process to complete
    pub fn wait(&mut self) -> ProcessResult<i32> {
        let status = wait_until(&mut self.child, &self.program, self.deadline, self.timeout)?;
        self.reaped = true;
        Ok(exit_code(status))
    }

    /// Drain stdout, then wait for the exit code
    pub fn read_to_end(mut self) -> ProcessResult<(i32, Vec<String>)> {
        let mut lines = Vec::new();
        while let Some(line) = self.next_line()? {
            lines.push(line);
        }
        let code = self.wait()?;
        Ok((code, lines))
    }

    fn abort(&mut self) -> ProcessError {
        let _ = self.child.kill();
        let _ = self.child.wait();
        self.reaped = true;
        timeout_error(&self.program, self.timeout)
    }
}

impl Iterator for ProcessHandle {
    type Item = ProcessResult<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        // Abandoned early (e.g. only the first line was wanted)
        if !self.reaped {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// Process execution service
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
}

impl ProcessRunner {
    /// Create a runner; `None` waits forever
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    fn command(program: &str, argv: &[String], working_dir: &Path) -> Command {
        let mut command = Command::new(program);
        command
            .args(argv)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stderr(Stdio::null());
        command
    }

    fn spawn(&self, mut command: Command, program: &str) -> ProcessResult<Child> {
        command.spawn().map_err(|source| ProcessError::Launch {
            program: program.to_string(),
            source,
        })
    }

    fn deadline(&self) -> Option<Instant> {
        self.timeout.map(|timeout| Instant::now() + timeout)
    }

    /// Spawn a command and stream its stdout
    pub fn run(
        &self,
        program: &str,
        argv: &[String],
        working_dir: &Path,
    ) -> ProcessResult<ProcessHandle> {
        tracing::debug!("Running {} {:?} in {}", program, argv, working_dir.display());

        let mut command = Self::command(program, argv, working_dir);
        command.stdout(Stdio::piped());
        let mut child = self.spawn(command, program)?;
        let deadline = self.deadline();

        let (tx, rx) = mpsc::channel();
        if let Some(stdout) = child.stdout.take() {
            std::thread::spawn(move || {
                let reader = BufReader::new(stdout);
                for line in reader.lines() {
                    let failed = line.is_err();
                    if tx.send(line).is_err() || failed {
                        break;
                    }
                }
            });
        }

        Ok(ProcessHandle {
            program: program.to_string(),
            child,
            lines: rx,
            deadline,
            timeout: self.timeout,
            reaped: false,
        })
    }

    /// Run a command with stdout written straight into `destination`
    pub fn run_redirected(
        &self,
        program: &str,
        argv: &[String],
        working_dir: &Path,
        destination: File,
    ) -> ProcessResult<i32> {
        tracing::debug!(
            "Running {} {:?} in {} (stdout redirected)",
            program,
            argv,
            working_dir.display()
        );

        let mut command = Self::command(program, argv, working_dir);
        command.stdout(Stdio::from(destination));
        let mut child = self.spawn(command, program)?;
        let status = wait_until(&mut child, program, self.deadline(), self.timeout)?;
        Ok(exit_code(status))
    }

    /// Run a command for its exit code only
    pub fn status(&self, program: &str, argv: &[String], working_dir: &Path) -> ProcessResult<i32> {
        tracing::debug!("Running {} {:?} in {}", program, argv, working_dir.display());

        let mut command = Self::command(program, argv, working_dir);
        command.stdout(Stdio::null());
        let mut child = self.spawn(command, program)?;
        let status = wait_until(&mut child, program, self.deadline(), self.timeout)?;
        Ok(exit_code(status))
    }
}

fn wait_until(
    child: &mut Child,
    program: &str,
    deadline: Option<Instant>,
    timeout: Option<Duration>,
) -> ProcessResult<ExitStatus> {
    let Some(deadline) = deadline else {
        return child.wait().map_err(|source| ProcessError::Wait {
            program: program.to_string(),
            source,
        });
    };

    loop {
        let polled = child.try_wait().map_err(|source| ProcessError::Wait {
            program: program.to_string(),
            source,
        })?;
        if let Some(status) = polled {
            return Ok(status);
        }

        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(timeout_error(program, timeout));
        }

        std::thread::sleep(POLL_INTERVAL);
    }
}

fn timeout_error(program: &str, timeout: Option<Duration>) -> ProcessError {
    ProcessError::Timeout {
        program: program.to_string(),
        timeout: timeout.unwrap_or_default(),
    }
}

/// Exit code, -1 when terminated by a signal
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

//! Subprocess plumbing shared by the tool wrappers.

use std::collections::HashMap;
use std::fs::File;
use std::process::{Command, Stdio};

use tracing::{debug, trace};

use crate::error::CiaoResult;

/// Captured result of one external tool invocation.
#[derive(Debug)]
pub(crate) struct ToolOutput {
    /// Printable command line, for logs and error messages.
    pub command: String,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// Both streams concatenated and trimmed — the "did it say anything"
    /// check dmcoords relies on.
    pub fn combined(&self) -> String {
        format!("{}{}", self.stdout, self.stderr).trim().to_string()
    }
}

/// Run `program` with `args`, waiting for completion and capturing output.
///
/// When `env` is supplied the child runs under exactly that environment
/// and nothing of the parent leaks through; a sourced CIAO environment is
/// complete, including `PATH`. With `None` the parent environment is
/// inherited.
pub(crate) fn run_tool(
    program: &str,
    args: &[String],
    env: Option<&HashMap<String, String>>,
) -> CiaoResult<ToolOutput> {
    let command = command_line(program, args);
    debug!("running: {command}");

    let mut cmd = Command::new(program);
    cmd.args(args).stdin(Stdio::null());
    if let Some(env) = env {
        cmd.env_clear().envs(env);
    }

    let output = cmd.output()?;
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    trace!("stdout: {stdout:?} stderr: {stderr:?}");

    Ok(ToolOutput {
        command,
        stdout,
        stderr,
    })
}

/// Run a tool whose stdout is routed into `sink`.
///
/// Some CIAO executables chat on stdout while their real product is a file
/// they write themselves; the chatter goes to the sink and the exit code
/// carries no signal, so nothing is returned.
pub(crate) fn run_tool_stdout_to(
    program: &str,
    args: &[String],
    env: Option<&HashMap<String, String>>,
    sink: File,
) -> CiaoResult<()> {
    let command = command_line(program, args);
    debug!("running: {command}");

    let mut cmd = Command::new(program);
    cmd.args(args).stdin(Stdio::null()).stdout(sink);
    if let Some(env) = env {
        cmd.env_clear().envs(env);
    }

    cmd.status()?;
    Ok(())
}

/// Printable form of a command for logs and error messages.
pub(crate) fn command_line(program: &str, args: &[String]) -> String {
    let mut line = String::from(program);
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

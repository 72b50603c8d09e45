use anyhow::{anyhow, Context, Result};
use std::ffi::OsStr;
use std::process::{Child, Command, Stdio};
use tracing::trace;

use crate::constants::{POWERSHELL_ARGS, POWERSHELL_EXE};

pub fn run_command<I: IntoIterator<Item = S>, S: AsRef<OsStr>>(
    program: &str,
    arguments: I,
) -> Result<Child> {
    Command::new(program)
        .args(arguments)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to execute command '{program}'"))
}

/// Runs a PowerShell script and returns its standard output.
///
/// ### Arguments
/// - `script` - the script to be passed to `-Command`
pub fn run_powershell(script: &str) -> Result<String> {
    trace!("Running PowerShell script:\n{script}");

    let arguments = POWERSHELL_ARGS.iter().copied().chain([script]);
    let output = run_command(POWERSHELL_EXE, arguments)?
        .wait_with_output()
        .context("failed to wait for process to exit")?;

    if !output.status.success() {
        return Err(anyhow!(
            "PowerShell exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

pub mod cli;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod host;
pub mod models;
pub mod resolver;
pub mod utils;
pub mod validation;

use crate::config::DesiredOptions;
use crate::engine::converge;
use crate::error::WinsResult;
use crate::host::Host;
use crate::models::{DesiredConfig, Report};

/// Validates the given options and converges the host to them.
///
/// Validation happens before the host is queried, so malformed options never touch the host.
///
/// ### Arguments
/// - `host` - the host to configure
/// - `options` - the raw desired state
/// - `check_mode` - only report what would change
pub fn run<H: Host>(host: &H, options: &DesiredOptions, check_mode: bool) -> WinsResult<Report> {
    let desired = DesiredConfig::try_from(options)?;

    converge(host, &desired, check_mode)
}

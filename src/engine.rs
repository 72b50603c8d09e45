use tracing::{debug, info, warn};

use crate::constants::GLOBAL_SETTINGS_ITEM;
use crate::error::{WinsError, WinsResult};
use crate::host::Host;
use crate::models::{ChangeSet, ConfigSnapshot, DesiredConfig, Report};
use crate::resolver::resolve;

/// Applies change sets to a host and reports the resulting state.
pub struct ConvergenceEngine<'h, H: Host> {
    host: &'h H,
}

impl<'h, H: Host> ConvergenceEngine<'h, H> {
    /// Creates a new instance of the `ConvergenceEngine`.
    ///
    /// ### Arguments
    /// - `host` - the host to apply changes to
    pub fn new(host: &'h H) -> Self {
        Self { host }
    }

    /// Applies the given change set, global settings first, then adapters in order.
    ///
    /// The first failing write aborts the run. Writes that succeeded before it stay applied.
    ///
    /// ### Arguments
    /// - `change_set` - the changes to apply
    ///
    /// ### Returns
    /// - `Report` - built from a fresh read of the host after applying
    pub fn apply(&self, change_set: ChangeSet) -> WinsResult<Report> {
        let mut applied: Vec<String> = Vec::new();
        let mut changed = false;
        let mut reboot_required = false;

        if !change_set.global_changes.is_empty() {
            let changes = &change_set.global_changes;
            info!("Applying {GLOBAL_SETTINGS_ITEM}: {changes}");

            let outcome = self
                .host
                .write(changes)
                .map_err(|err| apply_error(GLOBAL_SETTINGS_ITEM.to_owned(), &applied, err))?;

            if outcome.reboot_required {
                warn!("Host requested a reboot after applying {GLOBAL_SETTINGS_ITEM}");
            }

            changed = true;
            reboot_required |= changes.requires_reboot() || outcome.reboot_required;
            applied.push(GLOBAL_SETTINGS_ITEM.to_owned());
        }

        for (name, change) in change_set
            .per_adapter_changes
            .iter()
            .filter(|(_, change)| !change.is_empty())
        {
            let item = format!("adapter '{name}'");
            info!("Applying WINS servers to {item}: {change}");

            let outcome = self
                .host
                .set_servers(name, change)
                .map_err(|err| apply_error(item.clone(), &applied, err))?;

            if outcome.reboot_required {
                warn!("Host requested a reboot after applying {item}");
            }

            changed = true;
            reboot_required |= outcome.reboot_required;
            applied.push(item);
        }

        // Writes already happened, so a failed re-read must still say what was applied.
        let config = match self.snapshot() {
            Ok(config) => config,
            Err(WinsError::Host(reason)) if !applied.is_empty() => {
                return Err(WinsError::ReadBack { applied, reason })
            }
            Err(err) => return Err(err),
        };

        Ok(Report {
            changed,
            reboot_required,
            check_mode: false,
            config,
        })
    }

    /// Reports what `apply` would do with the given change set without writing anything.
    pub fn plan(&self, change_set: &ChangeSet) -> WinsResult<Report> {
        if !change_set.global_changes.is_empty() {
            info!(
                "Would apply {GLOBAL_SETTINGS_ITEM}: {}",
                change_set.global_changes
            );
        }
        for (name, change) in &change_set.per_adapter_changes {
            info!("Would apply WINS servers to adapter '{name}': {change}");
        }

        Ok(Report {
            changed: !change_set.is_empty(),
            reboot_required: change_set.requires_reboot(),
            check_mode: true,
            config: self.snapshot()?,
        })
    }

    /// Reads the current configuration of the host.
    pub fn snapshot(&self) -> WinsResult<ConfigSnapshot> {
        let global = self.host.read().map_err(host_error)?;
        let adapters = self.host.list().map_err(host_error)?;

        Ok(ConfigSnapshot::new(global, adapters))
    }
}

/// Converges the host to the desired state.
///
/// ### Arguments
/// - `host` - the host to read from and apply changes to
/// - `desired` - the validated desired state
/// - `check_mode` - only report what would change
pub fn converge<H: Host>(host: &H, desired: &DesiredConfig, check_mode: bool) -> WinsResult<Report> {
    let current_global = host.read().map_err(host_error)?;
    let current_adapters = host.list().map_err(host_error)?;

    let change_set = resolve(desired, &current_global, &current_adapters)?;
    debug!("Resolved change set: {change_set:?}");

    let engine = ConvergenceEngine::new(host);
    if check_mode {
        return engine.plan(&change_set);
    }

    if change_set.is_empty() {
        info!("WINS settings are already in the desired state");
    }

    engine.apply(change_set)
}

fn host_error(err: anyhow::Error) -> WinsError {
    WinsError::Host(format!("{err:#}"))
}

fn apply_error(item: String, applied: &[String], err: anyhow::Error) -> WinsError {
    WinsError::ApplyError {
        item,
        applied: applied.to_vec(),
        reason: format!("{err:#}"),
    }
}

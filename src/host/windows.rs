use anyhow::{Context, Result};
use tracing::debug;

use crate::host::wmi::{
    enable_wins_script, parse_adapters, parse_global, parse_return_value,
    set_wins_server_script, LIST_ADAPTERS_SCRIPT, READ_GLOBAL_SCRIPT,
};
use crate::host::{AdapterRegistry, GlobalWinsSettings};
use crate::models::{Adapter, AdapterChange, GlobalChanges, GlobalConfig, WriteOutcome};
use crate::utils::command::run_powershell;

/// WINS settings of the local Windows host, managed through CIM.
#[derive(Debug, Default)]
pub struct SystemHost;

impl SystemHost {
    pub fn new() -> Self {
        Self
    }
}

impl AdapterRegistry for SystemHost {
    fn list(&self) -> Result<Vec<Adapter>> {
        let output = run_powershell(LIST_ADAPTERS_SCRIPT).context("failed to list adapters")?;
        let adapters = parse_adapters(&output)?;
        debug!("Enumerated {} IP-enabled adapters", adapters.len());

        Ok(adapters)
    }

    fn set_servers(&self, name: &str, change: &AdapterChange) -> Result<WriteOutcome> {
        let script = set_wins_server_script(change);
        debug!(
            "Setting WINS servers on adapter '{name}' (interface index {})",
            change.interface_index
        );

        let output = run_powershell(&script)
            .with_context(|| format!("failed to set WINS servers on adapter '{name}'"))?;

        parse_return_value(&output)
            .with_context(|| format!("failed to set WINS servers on adapter '{name}'"))
    }
}

impl GlobalWinsSettings for SystemHost {
    fn read(&self) -> Result<GlobalConfig> {
        let output =
            run_powershell(READ_GLOBAL_SCRIPT).context("failed to read global WINS settings")?;

        parse_global(&output)
    }

    fn write(&self, changes: &GlobalChanges) -> Result<WriteOutcome> {
        // EnableWINS takes every setting at once, so unset fields are filled from the host.
        let settings = changes.merged_with(&self.read()?);
        let output = run_powershell(&enable_wins_script(&settings))
            .context("failed to write global WINS settings")?;

        parse_return_value(&output).context("failed to write global WINS settings")
    }
}

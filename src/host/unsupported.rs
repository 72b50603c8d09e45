use anyhow::{bail, Result};

use crate::host::{AdapterRegistry, GlobalWinsSettings};
use crate::models::{Adapter, AdapterChange, GlobalChanges, GlobalConfig, WriteOutcome};

/// Host backend for targets without WINS support. Every call fails.
#[derive(Debug, Default)]
pub struct SystemHost;

impl SystemHost {
    pub fn new() -> Self {
        Self
    }
}

fn unsupported<T>() -> Result<T> {
    bail!(
        "WINS settings can only be managed on Windows (current target: {})",
        std::env::consts::OS
    )
}

impl AdapterRegistry for SystemHost {
    fn list(&self) -> Result<Vec<Adapter>> {
        unsupported()
    }

    fn set_servers(&self, _name: &str, _change: &AdapterChange) -> Result<WriteOutcome> {
        unsupported()
    }
}

impl GlobalWinsSettings for SystemHost {
    fn read(&self) -> Result<GlobalConfig> {
        unsupported()
    }

    fn write(&self, _changes: &GlobalChanges) -> Result<WriteOutcome> {
        unsupported()
    }
}

//! Access to the host's WINS configuration.
//!
//! The rest of the crate only talks to the host through [`AdapterRegistry`] and
//! [`GlobalWinsSettings`]; [`SystemHost`] is the implementation for the current target.

pub mod wmi;

#[cfg(target_os = "windows")]
mod windows;
#[cfg(target_os = "windows")]
pub use windows::SystemHost;

#[cfg(not(target_os = "windows"))]
mod unsupported;
#[cfg(not(target_os = "windows"))]
pub use unsupported::SystemHost;

use anyhow::Result;

use crate::error::{WinsError, WinsResult};
use crate::models::{Adapter, AdapterChange, GlobalChanges, GlobalConfig, WriteOutcome};

pub trait AdapterRegistry {
    /// Enumerates the network adapters on the host.
    ///
    /// The order is stable within a single call only.
    fn list(&self) -> Result<Vec<Adapter>>;

    /// Sets the WINS servers of the adapter with the given name.
    ///
    /// Servers left unset in `change` keep their current value.
    fn set_servers(&self, name: &str, change: &AdapterChange) -> Result<WriteOutcome>;

    /// Looks up a single adapter by name.
    fn get(&self, name: &str) -> WinsResult<Adapter> {
        let adapters = self
            .list()
            .map_err(|err| WinsError::Host(format!("{err:#}")))?;

        adapters
            .into_iter()
            .find(|adapter| adapter.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| WinsError::AdapterNotFound {
                names: vec![name.to_owned()],
            })
    }
}

pub trait GlobalWinsSettings {
    /// Reads the host-wide WINS settings.
    fn read(&self) -> Result<GlobalConfig>;

    /// Writes the given host-wide WINS settings, leaving unset fields untouched.
    fn write(&self, changes: &GlobalChanges) -> Result<WriteOutcome>;
}

/// A host exposing both adapter and host-wide WINS settings.
pub trait Host: AdapterRegistry + GlobalWinsSettings {}

impl<T: AdapterRegistry + GlobalWinsSettings> Host for T {}

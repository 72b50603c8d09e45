use std::fmt;
use std::net::Ipv4Addr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::validation::ScopeId;

/// Host-wide WINS settings as currently configured on the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    pub enable_dns: bool,
    pub enable_lmhosts_lookup: bool,
    pub scope_id: String,
}

/// A partial set of host-wide WINS settings.
///
/// `None` means "leave as is", which is distinct from `Some(false)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalChanges {
    pub enable_dns: Option<bool>,
    pub enable_lmhosts_lookup: Option<bool>,
    pub scope_id: Option<ScopeId>,
}

impl GlobalChanges {
    pub fn is_empty(&self) -> bool {
        self.enable_dns.is_none() && self.enable_lmhosts_lookup.is_none() && self.scope_id.is_none()
    }

    /// Changing the NetBIOS scope requires the NetBT stack to renegotiate names.
    pub fn requires_reboot(&self) -> bool {
        self.scope_id.is_some()
    }

    /// Returns the settings that result from applying these changes on top of `current`.
    pub fn merged_with(&self, current: &GlobalConfig) -> GlobalConfig {
        GlobalConfig {
            enable_dns: self.enable_dns.unwrap_or(current.enable_dns),
            enable_lmhosts_lookup: self
                .enable_lmhosts_lookup
                .unwrap_or(current.enable_lmhosts_lookup),
            scope_id: self
                .scope_id
                .as_ref()
                .map(|scope_id| scope_id.as_str().to_owned())
                .unwrap_or_else(|| current.scope_id.clone()),
        }
    }
}

impl fmt::Display for GlobalChanges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fields = Vec::new();

        if let Some(enable_dns) = self.enable_dns {
            fields.push(format!("enable_dns={enable_dns}"));
        }
        if let Some(enable_lmhosts_lookup) = self.enable_lmhosts_lookup {
            fields.push(format!("enable_lmhosts_lookup={enable_lmhosts_lookup}"));
        }
        if let Some(scope_id) = &self.scope_id {
            fields.push(format!("scope_id={scope_id}"));
        }

        f.write_str(&fields.join(", "))
    }
}

/// A network adapter as enumerated on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adapter {
    pub name: String,
    pub interface_index: u32,
    pub primary_server: Option<Ipv4Addr>,
    pub secondary_server: Option<Ipv4Addr>,
}

/// WINS server changes for a single adapter.
///
/// `interface_index` identifies the adapter towards the host and is never user-supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterChange {
    pub interface_index: u32,
    pub primary_server: Option<Ipv4Addr>,
    pub secondary_server: Option<Ipv4Addr>,
}

impl AdapterChange {
    pub fn is_empty(&self) -> bool {
        self.primary_server.is_none() && self.secondary_server.is_none()
    }
}

impl fmt::Display for AdapterChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fields = Vec::new();

        if let Some(primary_server) = self.primary_server {
            fields.push(format!("primary_server={primary_server}"));
        }
        if let Some(secondary_server) = self.secondary_server {
            fields.push(format!("secondary_server={secondary_server}"));
        }

        f.write_str(&fields.join(", "))
    }
}

/// The validated, declared state a run converges to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesiredConfig {
    pub global: GlobalChanges,
    /// Adapters to configure servers on; empty means every adapter on the host.
    pub adapter_names: Vec<String>,
    pub primary_server: Option<Ipv4Addr>,
    pub secondary_server: Option<Ipv4Addr>,
}

/// The minimal set of writes needed to reach a desired state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub global_changes: GlobalChanges,
    /// Keyed by adapter name, in resolved target order.
    pub per_adapter_changes: IndexMap<String, AdapterChange>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.global_changes.is_empty()
            && self
                .per_adapter_changes
                .values()
                .all(AdapterChange::is_empty)
    }

    /// Adapter server changes take effect immediately, only the global settings can require a reboot.
    pub fn requires_reboot(&self) -> bool {
        self.global_changes.requires_reboot()
    }
}

/// What a host reported after accepting a write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOutcome {
    pub reboot_required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdapterSnapshot {
    pub interface_index: u32,
    pub primary_server: Option<Ipv4Addr>,
    pub secondary_server: Option<Ipv4Addr>,
}

/// The WINS configuration of the host at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigSnapshot {
    pub enable_dns: bool,
    pub enable_lmhosts_lookup: bool,
    pub scope_id: String,
    pub adapters: IndexMap<String, AdapterSnapshot>,
}

impl ConfigSnapshot {
    pub fn new(global: GlobalConfig, adapters: Vec<Adapter>) -> Self {
        let adapters = adapters
            .into_iter()
            .map(|adapter| {
                (
                    adapter.name,
                    AdapterSnapshot {
                        interface_index: adapter.interface_index,
                        primary_server: adapter.primary_server,
                        secondary_server: adapter.secondary_server,
                    },
                )
            })
            .collect();

        Self {
            enable_dns: global.enable_dns,
            enable_lmhosts_lookup: global.enable_lmhosts_lookup,
            scope_id: global.scope_id,
            adapters,
        }
    }
}

/// The result of a single run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub changed: bool,
    pub reboot_required: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub check_mode: bool,
    pub config: ConfigSnapshot,
}

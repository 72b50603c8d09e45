use anyhow::{bail, Result};
use rstest::fixture;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use winsconf::host::{AdapterRegistry, GlobalWinsSettings};
use winsconf::models::{Adapter, AdapterChange, GlobalChanges, GlobalConfig, WriteOutcome};

pub const WINS_PRIMARY: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 40);
pub const WINS_SECONDARY: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 50);

struct HostState {
    global: GlobalConfig,
    adapters: Vec<Adapter>,
}

/// An in-memory host that records every read and write made against it.
pub struct MemoryHost {
    state: Mutex<HostState>,
    reads: AtomicUsize,
    writes: AtomicUsize,
    list_calls: AtomicUsize,
    failing_list_call: Option<usize>,
    failing_adapter: Option<String>,
    fail_global: bool,
    reboot_on_write: bool,
}

impl MemoryHost {
    pub fn new(global: GlobalConfig, adapters: Vec<Adapter>) -> Self {
        Self {
            state: Mutex::new(HostState { global, adapters }),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
            failing_list_call: None,
            failing_adapter: None,
            fail_global: false,
            reboot_on_write: false,
        }
    }

    /// Makes writes to the given adapter fail.
    pub fn failing_on(mut self, name: &str) -> Self {
        self.failing_adapter = Some(name.to_owned());
        self
    }

    /// Makes the `call`-th adapter enumeration (1-based) and every later one fail.
    pub fn failing_list_from(mut self, call: usize) -> Self {
        self.failing_list_call = Some(call);
        self
    }

    /// Makes writes to the global settings fail.
    pub fn failing_global(mut self) -> Self {
        self.fail_global = true;
        self
    }

    /// Makes every accepted write report that a reboot is required.
    pub fn requesting_reboot(mut self) -> Self {
        self.reboot_on_write = true;
        self
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn global(&self) -> GlobalConfig {
        self.state.lock().unwrap().global.clone()
    }

    pub fn adapter(&self, name: &str) -> Adapter {
        self.state
            .lock()
            .unwrap()
            .adapters
            .iter()
            .find(|adapter| adapter.name == name)
            .cloned()
            .unwrap()
    }

    /// Changes the host behind the engine's back.
    pub fn set_primary(&self, name: &str, server: Option<Ipv4Addr>) {
        let mut state = self.state.lock().unwrap();
        let adapter = state
            .adapters
            .iter_mut()
            .find(|adapter| adapter.name == name)
            .unwrap();
        adapter.primary_server = server;
    }
}

impl AdapterRegistry for MemoryHost {
    fn list(&self) -> Result<Vec<Adapter>> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        let call = self.list_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing_list_call.is_some_and(|failing| call >= failing) {
            bail!("transient enumeration failure");
        }

        Ok(self.state.lock().unwrap().adapters.clone())
    }

    fn set_servers(&self, name: &str, change: &AdapterChange) -> Result<WriteOutcome> {
        self.writes.fetch_add(1, Ordering::SeqCst);

        if self.failing_adapter.as_deref() == Some(name) {
            bail!("WMI returned 91 (access denied)");
        }

        let mut state = self.state.lock().unwrap();
        let Some(adapter) = state
            .adapters
            .iter_mut()
            .find(|adapter| adapter.interface_index == change.interface_index)
        else {
            bail!("no IP configuration found for interface index {}", change.interface_index);
        };

        if let Some(primary_server) = change.primary_server {
            adapter.primary_server = Some(primary_server);
        }
        if let Some(secondary_server) = change.secondary_server {
            adapter.secondary_server = Some(secondary_server);
        }

        Ok(WriteOutcome {
            reboot_required: self.reboot_on_write,
        })
    }
}

impl GlobalWinsSettings for MemoryHost {
    fn read(&self) -> Result<GlobalConfig> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.state.lock().unwrap().global.clone())
    }

    fn write(&self, changes: &GlobalChanges) -> Result<WriteOutcome> {
        self.writes.fetch_add(1, Ordering::SeqCst);

        if self.fail_global {
            bail!("WMI returned 65 (unknown failure)");
        }

        let mut state = self.state.lock().unwrap();
        state.global = changes.merged_with(&state.global);

        Ok(WriteOutcome {
            reboot_required: self.reboot_on_write,
        })
    }
}

pub fn adapter(name: &str, interface_index: u32) -> Adapter {
    Adapter {
        name: name.to_owned(),
        interface_index,
        primary_server: None,
        secondary_server: None,
    }
}

#[fixture]
pub fn global() -> GlobalConfig {
    GlobalConfig {
        enable_dns: true,
        enable_lmhosts_lookup: true,
        scope_id: String::new(),
    }
}

#[fixture]
pub fn host(global: GlobalConfig) -> MemoryHost {
    MemoryHost::new(
        global,
        vec![adapter("A", 4), adapter("B", 7), adapter("C", 9)],
    )
}

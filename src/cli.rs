use clap::Parser;
use std::path::PathBuf;

use crate::config::{ConfigOverrides, DesiredOptions, LogOverrides};
use crate::constants::DEFAULT_ENV_PREFIX;

#[derive(Parser)]
#[command(name = "winsconf", about = "Converges the WINS settings of this host")]
pub struct Args {
    /// Path to a TOML file with the desired state
    #[arg(long)]
    pub config_path: Option<PathBuf>,
    #[arg(long, default_value = DEFAULT_ENV_PREFIX)]
    pub env_prefix: String,
    /// Whether DNS is used for names WINS, broadcast and LMHOSTS cannot resolve
    #[arg(long)]
    pub enable_dns: Option<bool>,
    /// Whether the LMHOSTS file is searched for names WINS and broadcast cannot resolve
    #[arg(long)]
    pub enable_lmhosts_lookup: Option<bool>,
    /// NetBIOS scope ID, '*' for the null scope; an empty value is ignored
    #[arg(long)]
    pub scope_id: Option<String>,
    /// Adapter to set WINS servers on, may be repeated; defaults to all adapters
    #[arg(long = "adapter-name", value_name = "NAME")]
    pub adapter_names: Vec<String>,
    /// Primary WINS server in dotted decimal notation
    #[arg(long)]
    pub primary_server: Option<String>,
    /// Secondary WINS server in dotted decimal notation
    #[arg(long)]
    pub secondary_server: Option<String>,
    /// Report what would change without applying anything
    #[arg(long)]
    pub check: bool,
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Args {
    /// Returns the configuration layer given on the command line.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            desired: DesiredOptions {
                enable_dns: self.enable_dns,
                enable_lmhosts_lookup: self.enable_lmhosts_lookup,
                scope_id: self.scope_id.clone(),
                adapter_names: self.adapter_names.clone(),
                primary_server: self.primary_server.clone(),
                secondary_server: self.secondary_server.clone(),
            },
            check: self.check.then_some(true),
            log: LogOverrides {
                level: self.log_level.clone(),
            },
        }
    }
}

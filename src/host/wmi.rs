//! PowerShell scripts against the `Win32_NetworkAdapterConfiguration` CIM class and parsing
//! of their output.
//!
//! Scripts are plain strings so they can be built and checked on any target; only
//! [`SystemHost`](crate::host::SystemHost) on Windows executes them.

use std::net::Ipv4Addr;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::models::{Adapter, AdapterChange, GlobalConfig, WriteOutcome};

/// Lists IP-enabled adapter configurations joined with their connection names.
pub const LIST_ADAPTERS_SCRIPT: &str = r#"$ErrorActionPreference = 'Stop'
$adapters = @(Get-CimInstance -ClassName Win32_NetworkAdapter | Where-Object { $_.NetConnectionID })
@(Get-CimInstance -ClassName Win32_NetworkAdapterConfiguration -Filter 'IPEnabled = True' | ForEach-Object {
    $config = $_
    $adapter = $adapters | Where-Object { $_.InterfaceIndex -eq $config.InterfaceIndex } | Select-Object -First 1
    if ($adapter) {
        [PSCustomObject]@{
            Name = $adapter.NetConnectionID
            InterfaceIndex = $config.InterfaceIndex
            WINSPrimaryServer = $config.WINSPrimaryServer
            WINSSecondaryServer = $config.WINSSecondaryServer
        }
    }
}) | ConvertTo-Json -Compress"#;

/// Reads the host-wide settings, which every IP-enabled configuration reports identically.
pub const READ_GLOBAL_SCRIPT: &str = r#"$ErrorActionPreference = 'Stop'
Get-CimInstance -ClassName Win32_NetworkAdapterConfiguration -Filter 'IPEnabled = True' |
    Select-Object -First 1 DNSEnabledForWINSResolution, WINSEnableLMHostsLookup, WINSScopeID |
    ConvertTo-Json -Compress"#;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawAdapter {
    name: String,
    interface_index: u32,
    #[serde(rename = "WINSPrimaryServer", default)]
    wins_primary_server: Option<String>,
    #[serde(rename = "WINSSecondaryServer", default)]
    wins_secondary_server: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawGlobal {
    #[serde(rename = "DNSEnabledForWINSResolution", default)]
    dns_enabled_for_wins_resolution: Option<bool>,
    #[serde(rename = "WINSEnableLMHostsLookup", default)]
    wins_enable_lmhosts_lookup: Option<bool>,
    #[serde(rename = "WINSScopeID", default)]
    wins_scope_id: Option<String>,
}

/// `ConvertTo-Json` emits a bare object for a single-element pipeline.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

fn parse_json_list<T: DeserializeOwned>(output: &str) -> Result<Vec<T>> {
    let output = output.trim();
    if output.is_empty() {
        return Ok(Vec::new());
    }

    let parsed: OneOrMany<T> =
        serde_json::from_str(output).context("failed to parse PowerShell JSON output")?;

    Ok(match parsed {
        OneOrMany::Many(items) => items,
        OneOrMany::One(item) => vec![item],
    })
}

fn parse_server(value: Option<String>) -> Result<Option<Ipv4Addr>> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => Ipv4Addr::from_str(value)
            .map(Some)
            .with_context(|| format!("host reported an invalid WINS server address '{value}'")),
    }
}

/// Parses the output of [`LIST_ADAPTERS_SCRIPT`].
pub fn parse_adapters(output: &str) -> Result<Vec<Adapter>> {
    parse_json_list::<RawAdapter>(output)?
        .into_iter()
        .map(|raw| -> Result<Adapter> {
            Ok(Adapter {
                primary_server: parse_server(raw.wins_primary_server)
                    .with_context(|| format!("adapter '{}'", raw.name))?,
                secondary_server: parse_server(raw.wins_secondary_server)
                    .with_context(|| format!("adapter '{}'", raw.name))?,
                name: raw.name,
                interface_index: raw.interface_index,
            })
        })
        .collect()
}

/// Parses the output of [`READ_GLOBAL_SCRIPT`].
pub fn parse_global(output: &str) -> Result<GlobalConfig> {
    let raw = parse_json_list::<RawGlobal>(output)?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("no IP-enabled network adapter configuration found"))?;

    // WMI leaves these null while unconfigured, which Windows treats as disabled.
    Ok(GlobalConfig {
        enable_dns: raw.dns_enabled_for_wins_resolution.unwrap_or(false),
        enable_lmhosts_lookup: raw.wins_enable_lmhosts_lookup.unwrap_or(false),
        scope_id: raw.wins_scope_id.unwrap_or_default(),
    })
}

/// Quotes a value as a single-quoted PowerShell string literal.
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn bool_literal(value: bool) -> &'static str {
    if value {
        "$true"
    } else {
        "$false"
    }
}

/// Builds the `EnableWINS` call for a fully populated set of host-wide settings.
pub fn enable_wins_script(settings: &GlobalConfig) -> String {
    format!(
        "$ErrorActionPreference = 'Stop'\n\
         (Invoke-CimMethod -ClassName Win32_NetworkAdapterConfiguration -MethodName EnableWINS \
         -Arguments @{{ DNSEnabledForWINSResolution = {}; WINSEnableLMHostsLookup = {}; WINSScopeID = {} }}).ReturnValue",
        bool_literal(settings.enable_dns),
        bool_literal(settings.enable_lmhosts_lookup),
        quote(&settings.scope_id),
    )
}

/// Builds the `SetWINSServer` call for one adapter; unset servers keep the configured value.
pub fn set_wins_server_script(change: &AdapterChange) -> String {
    let server = |value: Option<Ipv4Addr>, property: &str| match value {
        Some(address) => quote(&address.to_string()),
        None => format!("$config.{property}"),
    };

    format!(
        "$ErrorActionPreference = 'Stop'\n\
         $config = Get-CimInstance -ClassName Win32_NetworkAdapterConfiguration -Filter 'InterfaceIndex = {index}'\n\
         if (-not $config) {{ throw 'no IP configuration found for interface index {index}' }}\n\
         $primary = {primary}\n\
         $secondary = {secondary}\n\
         if ($null -eq $primary) {{ $primary = '' }}\n\
         if ($null -eq $secondary) {{ $secondary = '' }}\n\
         (Invoke-CimMethod -InputObject $config -MethodName SetWINSServer \
         -Arguments @{{ WINSPrimaryServer = $primary; WINSSecondaryServer = $secondary }}).ReturnValue",
        index = change.interface_index,
        primary = server(change.primary_server, "WINSPrimaryServer"),
        secondary = server(change.secondary_server, "WINSSecondaryServer"),
    )
}

fn describe_return_value(code: u32) -> &'static str {
    match code {
        64 => "method not supported on this platform",
        65 => "unknown failure",
        70 => "invalid IP address",
        84 => "IP not enabled on adapter",
        91 => "access denied",
        100 => "DHCP not enabled on adapter",
        _ => "unexpected WMI return value",
    }
}

/// Interprets the `ReturnValue` printed by a WMI method call.
pub fn parse_return_value(output: &str) -> Result<WriteOutcome> {
    let output = output.trim();
    let code: u32 = output
        .lines()
        .last()
        .unwrap_or_default()
        .trim()
        .parse()
        .with_context(|| format!("failed to parse WMI return value from '{output}'"))?;

    match code {
        0 => Ok(WriteOutcome {
            reboot_required: false,
        }),
        1 => Ok(WriteOutcome {
            reboot_required: true,
        }),
        code => bail!("WMI returned {code} ({})", describe_return_value(code)),
    }
}

//! Conversion of raw run options into a typed [`DesiredConfig`].
//!
//! Everything in here is pure and runs before the host is queried.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::DesiredOptions;
use crate::constants::{NULL_SCOPE_ID, SCOPE_ID_PATTERN};
use crate::error::{WinsError, WinsResult};
use crate::models::{DesiredConfig, GlobalChanges};

static SCOPE_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SCOPE_ID_PATTERN).expect("scope ID pattern is valid"));

/// A validated NetBIOS scope ID: either the null scope `*` or a domain-like name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeId(String);

impl ScopeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_null_scope(&self) -> bool {
        self.0 == NULL_SCOPE_ID
    }

    /// Whether the host's current scope ID already satisfies this one.
    ///
    /// Hosts report the null scope as an empty string.
    pub fn matches(&self, current: &str) -> bool {
        if self.is_null_scope() {
            current.is_empty() || current == NULL_SCOPE_ID
        } else {
            self.0.eq_ignore_ascii_case(current)
        }
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parses a scope ID option. An empty value requests no change.
pub fn parse_scope_id(value: &str) -> WinsResult<Option<ScopeId>> {
    if value.is_empty() {
        return Ok(None);
    }

    if value.starts_with('.') {
        return Err(WinsError::invalid(
            "scope_id",
            value,
            "must not start with a period",
        ));
    }

    if !SCOPE_ID_REGEX.is_match(value) {
        return Err(WinsError::invalid(
            "scope_id",
            value,
            "must be '*' or a domain name of at least two dot-separated labels",
        ));
    }

    Ok(Some(ScopeId(value.to_owned())))
}

/// Parses a WINS server option in dotted decimal notation. An empty value requests no change.
pub fn parse_server(field: &'static str, value: &str) -> WinsResult<Option<Ipv4Addr>> {
    if value.is_empty() {
        return Ok(None);
    }

    Ipv4Addr::from_str(value)
        .map(Some)
        .map_err(|err| WinsError::invalid(field, value, err.to_string()))
}

impl TryFrom<&DesiredOptions> for DesiredConfig {
    type Error = WinsError;

    fn try_from(options: &DesiredOptions) -> WinsResult<Self> {
        let scope_id = match options.scope_id.as_deref() {
            Some(value) => parse_scope_id(value)?,
            None => None,
        };
        let primary_server = match options.primary_server.as_deref() {
            Some(value) => parse_server("primary_server", value)?,
            None => None,
        };
        let secondary_server = match options.secondary_server.as_deref() {
            Some(value) => parse_server("secondary_server", value)?,
            None => None,
        };

        if let Some(name) = options.adapter_names.iter().find(|name| name.trim().is_empty()) {
            return Err(WinsError::invalid(
                "adapter_names",
                name,
                "adapter names must not be blank",
            ));
        }

        Ok(DesiredConfig {
            global: GlobalChanges {
                enable_dns: options.enable_dns,
                enable_lmhosts_lookup: options.enable_lmhosts_lookup,
                scope_id,
            },
            adapter_names: options.adapter_names.clone(),
            primary_server,
            secondary_server,
        })
    }
}

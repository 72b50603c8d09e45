//! Computes the minimal [`ChangeSet`] between a declared state and a host snapshot.

use indexmap::IndexMap;
use std::net::Ipv4Addr;
use tracing::debug;

use crate::error::{WinsError, WinsResult};
use crate::models::{Adapter, AdapterChange, ChangeSet, DesiredConfig, GlobalChanges, GlobalConfig};

/// Resolves the changes required to move the host from its current state to `desired`.
///
/// ### Arguments
/// - `desired` - the validated desired state
/// - `current_global` - the host-wide settings as read from the host
/// - `current_adapters` - a single snapshot of the host's adapters
///
/// ### Returns
/// - `ChangeSet` - empty if the host already is in the desired state
pub fn resolve(
    desired: &DesiredConfig,
    current_global: &GlobalConfig,
    current_adapters: &[Adapter],
) -> WinsResult<ChangeSet> {
    let global_changes = resolve_global(&desired.global, current_global);
    let targets = select_targets(&desired.adapter_names, current_adapters)?;

    let mut per_adapter_changes = IndexMap::new();
    for adapter in targets {
        let change = AdapterChange {
            interface_index: adapter.interface_index,
            primary_server: differing(desired.primary_server, adapter.primary_server),
            secondary_server: differing(desired.secondary_server, adapter.secondary_server),
        };

        if change.is_empty() {
            debug!("Adapter '{}' is already in the desired state", adapter.name);
            continue;
        }

        per_adapter_changes.insert(adapter.name.clone(), change);
    }

    Ok(ChangeSet {
        global_changes,
        per_adapter_changes,
    })
}

fn resolve_global(desired: &GlobalChanges, current: &GlobalConfig) -> GlobalChanges {
    GlobalChanges {
        enable_dns: desired
            .enable_dns
            .filter(|enable_dns| *enable_dns != current.enable_dns),
        enable_lmhosts_lookup: desired
            .enable_lmhosts_lookup
            .filter(|enable_lmhosts_lookup| *enable_lmhosts_lookup != current.enable_lmhosts_lookup),
        scope_id: desired
            .scope_id
            .clone()
            .filter(|scope_id| !scope_id.matches(&current.scope_id)),
    }
}

fn differing(desired: Option<Ipv4Addr>, current: Option<Ipv4Addr>) -> Option<Ipv4Addr> {
    desired.filter(|address| Some(*address) != current)
}

/// Selects the adapters named in `names`, or every adapter if `names` is empty.
///
/// Names are matched case-insensitively, duplicates are dropped and every unknown name is
/// reported in a single error.
fn select_targets<'a>(names: &[String], adapters: &'a [Adapter]) -> WinsResult<Vec<&'a Adapter>> {
    if names.is_empty() {
        return Ok(adapters.iter().collect());
    }

    let mut targets: Vec<&Adapter> = Vec::with_capacity(names.len());
    let mut missing = Vec::new();

    for name in names {
        match adapters
            .iter()
            .find(|adapter| adapter.name.eq_ignore_ascii_case(name))
        {
            Some(adapter) if targets.iter().any(|target| target.name == adapter.name) => {}
            Some(adapter) => targets.push(adapter),
            None if missing
                .iter()
                .any(|reported: &String| reported.eq_ignore_ascii_case(name)) => {}
            None => missing.push(name.clone()),
        }
    }

    if !missing.is_empty() {
        return Err(WinsError::AdapterNotFound { names: missing });
    }

    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::parse_scope_id;

    const WINS_A: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 40);
    const WINS_B: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 50);

    fn adapter(name: &str, interface_index: u32, primary_server: Option<Ipv4Addr>) -> Adapter {
        Adapter {
            name: name.to_owned(),
            interface_index,
            primary_server,
            secondary_server: None,
        }
    }

    fn adapters() -> Vec<Adapter> {
        vec![
            adapter("Ethernet", 4, None),
            adapter("Public", 7, Some(WINS_A)),
            adapter("Backup", 9, None),
        ]
    }

    fn global() -> GlobalConfig {
        GlobalConfig {
            enable_dns: true,
            enable_lmhosts_lookup: true,
            scope_id: String::new(),
        }
    }

    #[test]
    fn unset_fields_produce_no_changes() {
        let change_set = resolve(&DesiredConfig::default(), &global(), &adapters()).unwrap();

        assert!(change_set.is_empty());
        assert!(change_set.per_adapter_changes.is_empty());
    }

    #[test]
    fn only_differing_global_fields_are_changed() {
        let desired = DesiredConfig {
            global: GlobalChanges {
                enable_dns: Some(true),
                enable_lmhosts_lookup: Some(false),
                scope_id: parse_scope_id("test.local").unwrap(),
            },
            ..Default::default()
        };

        let change_set = resolve(&desired, &global(), &adapters()).unwrap();

        assert_eq!(change_set.global_changes.enable_dns, None);
        assert_eq!(change_set.global_changes.enable_lmhosts_lookup, Some(false));
        assert!(change_set.global_changes.scope_id.is_some());
    }

    #[test]
    fn null_scope_is_a_no_op_on_an_empty_host_scope() {
        let desired = DesiredConfig {
            global: GlobalChanges {
                scope_id: parse_scope_id("*").unwrap(),
                ..Default::default()
            },
            ..Default::default()
        };

        let change_set = resolve(&desired, &global(), &adapters()).unwrap();

        assert!(change_set.is_empty());
    }

    #[test]
    fn servers_apply_to_all_adapters_by_default() {
        let desired = DesiredConfig {
            primary_server: Some(WINS_A),
            ..Default::default()
        };

        let change_set = resolve(&desired, &global(), &adapters()).unwrap();

        // "Public" already uses WINS_A
        assert_eq!(
            change_set.per_adapter_changes.keys().collect::<Vec<_>>(),
            vec!["Ethernet", "Backup"]
        );
        assert_eq!(change_set.per_adapter_changes["Backup"].interface_index, 9);
        assert_eq!(change_set.per_adapter_changes["Backup"].secondary_server, None);
    }

    #[test]
    fn servers_apply_to_named_adapters_in_given_order() {
        let desired = DesiredConfig {
            adapter_names: vec!["Backup".to_owned(), "ethernet".to_owned(), "Backup".to_owned()],
            secondary_server: Some(WINS_B),
            ..Default::default()
        };

        let change_set = resolve(&desired, &global(), &adapters()).unwrap();

        assert_eq!(
            change_set.per_adapter_changes.keys().collect::<Vec<_>>(),
            vec!["Backup", "Ethernet"]
        );
    }

    #[test]
    fn unknown_adapters_are_reported_together() {
        let desired = DesiredConfig {
            adapter_names: vec![
                "Public".to_owned(),
                "DoesNotExist".to_owned(),
                "Missing".to_owned(),
                "DoesNotExist".to_owned(),
            ],
            primary_server: Some(WINS_B),
            ..Default::default()
        };

        let err = resolve(&desired, &global(), &adapters()).unwrap_err();

        match err {
            WinsError::AdapterNotFound { names } => {
                assert_eq!(names, vec!["DoesNotExist", "Missing"])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_names_differing_only_in_case_are_reported_once() {
        let desired = DesiredConfig {
            adapter_names: vec!["Nope".to_owned(), "NOPE".to_owned(), "nope".to_owned()],
            ..Default::default()
        };

        let err = resolve(&desired, &global(), &adapters()).unwrap_err();

        match err {
            WinsError::AdapterNotFound { names } => assert_eq!(names, vec!["Nope"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn targeting_without_servers_still_validates_names() {
        let desired = DesiredConfig {
            adapter_names: vec!["Nope".to_owned()],
            ..Default::default()
        };
        assert!(resolve(&desired, &global(), &adapters()).is_err());

        let desired = DesiredConfig {
            adapter_names: vec!["Public".to_owned()],
            ..Default::default()
        };
        let change_set = resolve(&desired, &global(), &adapters()).unwrap();
        assert!(change_set.is_empty());
    }

    #[test]
    fn converged_adapter_yields_empty_change_set() {
        let desired = DesiredConfig {
            adapter_names: vec!["Public".to_owned()],
            primary_server: Some(WINS_A),
            ..Default::default()
        };

        let change_set = resolve(&desired, &global(), &adapters()).unwrap();

        assert!(change_set.is_empty());
    }
}

//! Pool selection, export and import.

use chrono::{TimeZone, Utc};
use seiza::pools::{self, ImportDialog, PoolExport, PoolSummary, SelectedPools};
use seiza::{MemoryLocation, MemoryStore, SyncContext};
use std::sync::Arc;

fn selection() -> SelectedPools {
    SelectedPools::new(SyncContext::new(
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryLocation::new("/staking")),
    ))
}

#[test]
fn add_and_remove_guards() {
    let pools = selection();
    pools.add_pool("X").unwrap();
    assert_eq!(pools.selected(), vec!["X"]);
    assert!(pools.add_pool("X").is_err());
    pools.remove_pool("X").unwrap();
    assert!(pools.selected().is_empty());
    assert!(pools.remove_pool("Y").is_err());
}

#[test]
fn export_then_import_restores_selection() {
    let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    let json = PoolExport::new(
        &[PoolSummary { name: "A".into(), pool_hash: "h1".into() }],
        now,
    )
    .to_json()
    .unwrap();
    assert_eq!(pools::export_file_name(now), "seiza-pools-2026-03-01.json");

    let target = selection();
    let mut dialog = ImportDialog::default();
    assert!(dialog.import(&target, &json));
    assert_eq!(target.selected(), vec!["h1"]);
    assert!(!dialog.show_error);
}

#[test]
fn bad_hash_leaves_selection_and_flags_error() {
    let target = selection();
    target.add_pool("keep").unwrap();
    let mut dialog = ImportDialog::default();
    let bad = r#"{"type":"seiza-pool-export:1","export_time":"x","pools":[{"hash":"h1"},{"hash":7}]}"#;
    assert!(!dialog.import(&target, bad));
    assert!(dialog.show_error);
    assert_eq!(target.selected(), vec!["keep"]);

    dialog.dismiss();
    assert!(!dialog.show_error);
}

#[test]
fn later_export_versions_are_accepted() {
    assert_eq!(
        pools::parse_pool_export(r#"{"type":"seiza-pool-export:2","pools":[{"hash":"a","name":null}]}"#).unwrap(),
        vec!["a"]
    );
}

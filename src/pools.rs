//! Selected stake pools and the share/export file format.
//!
//! The selection is an ordered, duplicate-free list of pool hashes kept in the
//! `selectedPools` synchronized field. Adding a pool twice or removing one that
//! is not selected is a caller bug and returns an error.

use crate::sync::{SyncContext, SyncedField};
use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SELECTED_POOLS_KEY: &str = "selectedPools";
pub const EXPORT_TYPE: &str = "seiza-pool-export:1";
const EXPORT_TYPE_PREFIX: &str = "seiza-pool-export:";

pub struct SelectedPools {
    field: SyncedField<Vec<String>>,
}

impl SelectedPools {
    pub fn new(ctx: SyncContext) -> Self {
        Self {
            field: SyncedField::new(ctx, SELECTED_POOLS_KEY, Vec::new()).with_transform(dedup),
        }
    }

    pub fn field(&self) -> &SyncedField<Vec<String>> {
        &self.field
    }

    pub fn selected(&self) -> Vec<String> {
        self.field.read()
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.selected().iter().any(|h| h == hash)
    }

    pub fn add_pool(&self, hash: &str) -> Result<()> {
        let mut pools = self.selected();
        if pools.iter().any(|h| h == hash) {
            bail!("pool {hash} is already selected");
        }
        pools.push(hash.to_string());
        self.field.write(pools);
        Ok(())
    }

    pub fn remove_pool(&self, hash: &str) -> Result<()> {
        let mut pools = self.selected();
        let Some(pos) = pools.iter().position(|h| h == hash) else {
            bail!("pool {hash} is not selected");
        };
        pools.remove(pos);
        self.field.write(pools);
        Ok(())
    }

    /// Add if absent, remove if present. Returns whether the pool is now selected.
    pub fn toggle_pool(&self, hash: &str) -> Result<bool> {
        if self.contains(hash) {
            self.remove_pool(hash)?;
            Ok(false)
        } else {
            self.add_pool(hash)?;
            Ok(true)
        }
    }

    pub fn set_pools(&self, pools: Vec<String>) {
        self.field.write(pools);
    }

    pub fn clear(&self) {
        self.field.write(Vec::new());
    }
}

fn dedup(pools: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(pools.len());
    for p in pools {
        if !out.contains(&p) {
            out.push(p);
        }
    }
    out
}

/// Display fields of a pool as shown in lists.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoolSummary {
    pub name: String,
    #[serde(rename = "poolHash")]
    pub pool_hash: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportedPool {
    pub hash: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoolExport {
    #[serde(rename = "type")]
    pub kind: String,
    pub export_time: String,
    pub pools: Vec<ExportedPool>,
}

impl PoolExport {
    pub fn new(pools: &[PoolSummary], now: DateTime<Utc>) -> Self {
        Self {
            kind: EXPORT_TYPE.to_string(),
            export_time: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            pools: pools
                .iter()
                .map(|p| ExportedPool {
                    hash: p.pool_hash.clone(),
                    name: (!p.name.is_empty()).then(|| p.name.clone()),
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("encode pool export")
    }
}

/// Suggested download name, e.g. `seiza-pools-2026-10-19.json`.
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("seiza-pools-{}.json", now.format("%Y-%m-%d"))
}

/// Parse an exported file and return the pool hashes, in file order.
///
/// Fails on malformed JSON, an unknown `type`, a missing `pools` array, or any
/// entry without a string `hash`.
pub fn parse_pool_export(text: &str) -> Result<Vec<String>> {
    let doc: Value = serde_json::from_str(text).context("pool export is not valid JSON")?;

    let kind = doc
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("pool export has no type"))?;
    if !kind.starts_with(EXPORT_TYPE_PREFIX) {
        bail!("unsupported export type '{kind}'");
    }

    let entries = doc
        .get("pools")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("pool export has no pools array"))?;

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            entry
                .get("hash")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| anyhow!("pool #{i} has no string hash"))
        })
        .collect()
}

/// Import flow state: the selection is replaced only when the whole file is valid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportDialog {
    pub show_error: bool,
}

impl ImportDialog {
    /// Returns `true` when the selection was replaced.
    pub fn import(&mut self, pools: &SelectedPools, text: &str) -> bool {
        match parse_pool_export(text) {
            Ok(hashes) => {
                log::info!("[pools] imported {} pools", hashes.len());
                pools.set_pools(hashes);
                self.show_error = false;
                true
            }
            Err(e) => {
                log::warn!("[pools] import rejected: {e:#}");
                self.show_error = true;
                false
            }
        }
    }

    pub fn dismiss(&mut self) {
        self.show_error = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;
    use crate::location::MemoryLocation;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn pools() -> SelectedPools {
        SelectedPools::new(SyncContext::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryLocation::new("/staking")),
        ))
    }

    #[test]
    fn add_and_remove_guards() {
        let p = pools();
        assert!(p.selected().is_empty());
        p.add_pool("X").unwrap();
        assert_eq!(p.selected(), vec!["X"]);
        let err = p.add_pool("X").unwrap_err();
        assert!(err.to_string().contains("already selected"));
        p.remove_pool("X").unwrap();
        assert!(p.selected().is_empty());
        assert!(p.remove_pool("Y").is_err());
    }

    #[test]
    fn toggle_and_order() {
        let p = pools();
        assert!(p.toggle_pool("a").unwrap());
        assert!(p.toggle_pool("b").unwrap());
        assert!(p.toggle_pool("c").unwrap());
        assert!(!p.toggle_pool("b").unwrap());
        assert_eq!(p.selected(), vec!["a", "c"]);
    }

    #[test]
    fn duplicates_from_url_are_dropped() {
        let ctx = SyncContext::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryLocation::with_search(
                "/staking",
                "selectedPools=%5B%22a%22%2C%22a%22%2C%22b%22%5D",
            )),
        );
        assert_eq!(SelectedPools::new(ctx).selected(), vec!["a", "b"]);
    }

    #[test]
    fn export_shape() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap();
        let export = PoolExport::new(
            &[PoolSummary { name: "A".into(), pool_hash: "h1".into() }],
            now,
        );
        let json: Value = serde_json::from_str(&export.to_json().unwrap()).unwrap();
        assert_eq!(json["type"], "seiza-pool-export:1");
        assert_eq!(json["export_time"], "2026-10-19T08:30:00.000Z");
        assert_eq!(json["pools"][0]["hash"], "h1");
        assert_eq!(export_file_name(now), "seiza-pools-2026-10-19.json");
    }

    #[test]
    fn parse_rejects_bad_files() {
        assert!(parse_pool_export("not json").is_err());
        assert!(parse_pool_export(r#"{"type":"other","pools":[]}"#).is_err());
        assert!(parse_pool_export(r#"{"type":"seiza-pool-export:1"}"#).is_err());
        assert!(parse_pool_export(r#"{"type":"seiza-pool-export:1","pools":[{"hash":1}]}"#).is_err());
        assert_eq!(
            parse_pool_export(r#"{"type":"seiza-pool-export:1","pools":[{"hash":"h"}]}"#).unwrap(),
            vec!["h"]
        );
    }

    #[test]
    fn failed_import_keeps_selection() {
        let p = pools();
        p.add_pool("keep").unwrap();
        let mut dialog = ImportDialog::default();
        let bad = r#"{"type":"seiza-pool-export:1","pools":[{"hash":"h1"},{"name":"x"}]}"#;
        assert!(!dialog.import(&p, bad));
        assert!(dialog.show_error);
        assert_eq!(p.selected(), vec!["keep"]);
        dialog.dismiss();
        assert!(!dialog.show_error);
    }
}

//! Staking screens: the pool list and the pool comparison.
//!
//! Screen state lives in synchronized fields so a whole screen can be shared
//! as a link ([`StakingListSync::get_screen_url_query`]) or restored from one
//! ([`StakingListSync::set_screen_storage_from_query`]).

use crate::config::Config;
use crate::debounce::Debouncer;
use crate::filters::{self, FilterableRow, RangeFilters, SortBy, SortOrder, TextFilter};
use crate::formatters::Formatters;
use crate::loading::{LoadState, QueryClient, QueryHandle, QueryOptions, RequestId, View};
use crate::pools::{self, ImportDialog, PoolExport, PoolSummary, SelectedPools};
use crate::query;
use crate::scroll::ScrollController;
use crate::sync::{self, QuerySynced, Reconcile, SyncContext, SyncedField};
use crate::table::{
    Category, Cell, Column, DesktopMatrix, Layout, MatrixSnapshot, MobileCards, MobileSnapshot,
    PaginatedTable, TableSnapshot, Tone,
};
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::rc::Rc;

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

pub const STAKING_PATH: &str = "/staking";

pub const SORT_BY_KEY: &str = "sortBy";
pub const SHOW_FILTERS_KEY: &str = "showFilters";
pub const SEARCH_TEXT_KEY: &str = "searchText";
pub const PERFORMANCE_KEY: &str = "performance";
pub const USER_ADA_KEY: &str = "userAda";

/// Total ADA supply; larger simulated stakes are clamped to it.
pub const MAX_ADA_SUPPLY: u64 = 45_000_000_000;
pub const DEFAULT_USER_ADA: u64 = 10_000;

/// Numeric fields that get a range slider in the filter panel.
pub const RANGE_FIELDS: &[&str] = &["stake", "pledge", "margin", "saturation", "revenue"];

pub const POOL_LIST_QUERY: &str = r#"query StakePools($performance: PerformanceInterval!) {
  stakePools {
    hash
    name
    ticker
    liveStake
    pledge
    margin
    fixedCost
    summary(interval: $performance) { revenue saturation blocks }
  }
}"#;

/// Interval over which pool performance is averaged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Performance {
    #[default]
    Epoch,
    Month,
    Year,
}

impl Performance {
    pub fn as_str(self) -> &'static str {
        match self {
            Performance::Epoch => "epoch",
            Performance::Month => "month",
            Performance::Year => "year",
        }
    }
}

pub fn default_sort() -> SortBy {
    SortBy::new("revenue", SortOrder::Desc)
}

// ------------------------------- pool rows ---------------------------------

/// Flattened pool as displayed in lists and the comparison.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PoolRow {
    pub hash: String,
    pub name: String,
    pub ticker: String,
    /// Lovelace.
    pub stake: u64,
    pub pledge: u64,
    pub fixed_cost: u64,
    pub margin: f64,
    /// Return on stake over the selected performance interval.
    pub revenue: f64,
    pub saturation: f64,
    pub blocks: u64,
    /// Simulated reward for the user's stake, in lovelace.
    pub rewards: Option<u64>,
}

impl PoolRow {
    pub fn summary(&self) -> PoolSummary {
        PoolSummary {
            name: self.name.clone(),
            pool_hash: self.hash.clone(),
        }
    }

    pub fn with_rewards(mut self, user_ada: u64) -> Self {
        let lovelace = user_ada as f64 * crate::formatters::LOVELACE_PER_ADA as f64;
        self.rewards = Some((lovelace * self.revenue).max(0.0).round() as u64);
        self
    }
}

impl FilterableRow for PoolRow {
    fn numeric(&self, field: &str) -> Option<f64> {
        match field {
            "stake" => Some(self.stake as f64),
            "pledge" => Some(self.pledge as f64),
            "fixedCost" => Some(self.fixed_cost as f64),
            "margin" => Some(self.margin),
            "revenue" => Some(self.revenue),
            "saturation" => Some(self.saturation),
            "blocks" => Some(self.blocks as f64),
            "rewards" => self.rewards.map(|r| r as f64),
            _ => None,
        }
    }

    fn text(&self, field: &str) -> Option<&str> {
        match field {
            "name" => Some(&self.name),
            "ticker" => Some(&self.ticker),
            "hash" => Some(&self.hash),
            _ => None,
        }
    }
}

/// Lovelace amounts arrive either as numbers or as decimal strings.
fn amount(v: Option<&Value>) -> u64 {
    match v {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(s)) => s.parse().unwrap_or(0),
        _ => 0,
    }
}

fn ratio(v: Option<&Value>) -> f64 {
    match v {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Reshape the `stakePools` response into rows. Pools without a hash are skipped.
pub fn reshape_pool_list(data: Value) -> Result<Vec<PoolRow>> {
    let pools = data
        .get("stakePools")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("response has no stakePools"))?;

    Ok(pools
        .iter()
        .filter_map(|p| {
            let hash = p.get("hash")?.as_str()?.to_string();
            let summary = p.get("summary");
            let text = |k: &str| p.get(k).and_then(Value::as_str).unwrap_or("").to_string();
            Some(PoolRow {
                name: text("name"),
                ticker: text("ticker"),
                stake: amount(p.get("liveStake")),
                pledge: amount(p.get("pledge")),
                fixed_cost: amount(p.get("fixedCost")),
                margin: ratio(p.get("margin")),
                revenue: ratio(summary.and_then(|s| s.get("revenue"))),
                saturation: ratio(summary.and_then(|s| s.get("saturation"))),
                blocks: amount(summary.and_then(|s| s.get("blocks"))),
                rewards: None,
                hash,
            })
        })
        .collect())
}

// ---------------------------- list screen sync ------------------------------

/// The synchronized fields of the pool list screen.
pub struct StakingListSync {
    pub selected_pools: SelectedPools,
    pub sort_by: SyncedField<SortBy>,
    pub show_filters: SyncedField<bool>,
    pub search_text: Rc<SyncedField<String>>,
    pub performance: SyncedField<Performance>,
}

impl StakingListSync {
    pub fn new(ctx: SyncContext) -> Self {
        Self {
            selected_pools: SelectedPools::new(ctx.clone()),
            sort_by: SyncedField::new(ctx.clone(), SORT_BY_KEY, default_sort()),
            show_filters: SyncedField::new(ctx.clone(), SHOW_FILTERS_KEY, false),
            search_text: Rc::new(SyncedField::new(ctx.clone(), SEARCH_TEXT_KEY, String::new())),
            performance: SyncedField::new(ctx, PERFORMANCE_KEY, Performance::default()),
        }
    }

    fn fields(&self) -> [&dyn QuerySynced; 5] {
        [
            self.selected_pools.field(),
            &self.sort_by,
            &self.show_filters,
            &*self.search_text,
            &self.performance,
        ]
    }

    pub fn get_screen_url_query(&self) -> String {
        sync::screen_url_query(&self.fields())
    }

    pub fn set_screen_storage_from_query(&self, query: &str) {
        sync::set_screen_storage_from_query(&self.fields(), query);
    }

    /// First-mount reconciliation of `url_query` against stored state.
    pub fn mount(&self, url_query: &str, auto_sync: bool) -> Reconcile {
        sync::reconcile(&self.fields(), url_query, auto_sync)
    }

    /// Clear every field on this screen.
    pub fn reset(&self) {
        log::debug!("[staking] resetting list screen state");
        self.selected_pools.field().reset();
        self.sort_by.reset();
        self.show_filters.reset();
        self.search_text.reset();
        self.performance.reset();
    }
}

pub fn user_ada_field(ctx: SyncContext) -> SyncedField<u64> {
    SyncedField::new(ctx, USER_ADA_KEY, DEFAULT_USER_ADA).with_transform(|v| v.min(MAX_ADA_SUPPLY))
}

// ----------------------------- debounced input ------------------------------

/// Text-box style input: the draft updates immediately, the field is written
/// once typing pauses.
pub struct DebouncedInput<T> {
    field: Rc<SyncedField<T>>,
    draft: Option<T>,
    debouncer: Debouncer,
}

impl<T> DebouncedInput<T>
where
    T: Clone + Serialize + DeserializeOwned + 'static,
{
    pub fn new(field: Rc<SyncedField<T>>, delay: Duration) -> Self {
        Self {
            field,
            draft: None,
            debouncer: Debouncer::new(delay),
        }
    }

    pub fn field(&self) -> &SyncedField<T> {
        &self.field
    }

    /// What the input box shows.
    pub fn value(&self) -> T {
        self.draft.clone().unwrap_or_else(|| self.field.read())
    }

    pub fn input(&mut self, now: Instant, value: T) {
        self.draft = Some(value.clone());
        let field = self.field.clone();
        self.debouncer.schedule(now, move || field.write(value));
    }

    /// Returns `true` when a pending value was committed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let fired = self.debouncer.fire_due(now);
        if fired {
            self.draft = None;
        }
        fired
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn flush(&mut self) -> bool {
        let fired = self.debouncer.flush();
        self.draft = None;
        fired
    }

    pub fn dispose(&mut self) {
        self.debouncer.cancel();
        self.draft = None;
    }
}

// -------------------------------- columns ----------------------------------

fn pool_href(row: &PoolRow) -> String {
    format!("/staking/pools/{}", row.hash)
}

fn saturation_tone(s: f64) -> Tone {
    if s > 1.0 {
        Tone::Bad
    } else if s > 0.9 {
        Tone::Warning
    } else {
        Tone::Good
    }
}

fn name_column() -> Column<PoolRow> {
    Column::custom("name", "Pool", |r: &PoolRow, _: &Formatters| {
        let text = if r.name.is_empty() { r.hash.clone() } else { r.name.clone() };
        Cell::Link { text, href: pool_href(r) }
    })
}

fn saturation_column() -> Column<PoolRow> {
    Column::custom("saturation", "Saturation", |r: &PoolRow, f: &Formatters| Cell::Badge {
        text: f.percent(r.saturation),
        tone: saturation_tone(r.saturation),
    })
}

fn rewards_column() -> Column<PoolRow> {
    Column::custom("rewards", "Your rewards", |r: &PoolRow, f: &Formatters| match r.rewards {
        Some(l) => Cell::text(f.ada(l)),
        None => Cell::Empty,
    })
}

pub fn list_columns() -> Vec<Column<PoolRow>> {
    vec![
        name_column(),
        Column::formatted("ticker", "Ticker", |r: &PoolRow, _: &Formatters| r.ticker.clone()),
        Column::formatted("stake", "Live stake", |r: &PoolRow, f: &Formatters| f.ada_compact(r.stake)),
        Column::formatted("revenue", "Revenue", |r: &PoolRow, f: &Formatters| f.percent(r.revenue)),
        Column::formatted("margin", "Margin", |r: &PoolRow, f: &Formatters| f.percent(r.margin)),
        saturation_column(),
        rewards_column(),
    ]
}

pub fn compare_categories() -> Vec<Category<PoolRow>> {
    vec![
        Category::new(
            "general",
            "General",
            vec![
                name_column().with_height(48),
                Column::formatted("ticker", "Ticker", |r: &PoolRow, _: &Formatters| r.ticker.clone()),
                Column::formatted("hash", "Pool id", |r: &PoolRow, f: &Formatters| f.short_hash(&r.hash)),
            ],
        ),
        Category::new(
            "performance",
            "Performance",
            vec![
                Column::formatted("revenue", "Revenue", |r: &PoolRow, f: &Formatters| f.percent(r.revenue)),
                Column::formatted("blocks", "Blocks", |r: &PoolRow, f: &Formatters| f.int(r.blocks)),
                rewards_column(),
            ],
        ),
        Category::new(
            "economics",
            "Economics",
            vec![
                Column::formatted("stake", "Live stake", |r: &PoolRow, f: &Formatters| f.ada(r.stake)),
                Column::formatted("pledge", "Pledge", |r: &PoolRow, f: &Formatters| f.ada(r.pledge)),
                Column::formatted("margin", "Margin", |r: &PoolRow, f: &Formatters| f.percent(r.margin)),
                Column::formatted("fixedCost", "Fixed cost", |r: &PoolRow, f: &Formatters| {
                    f.ada(r.fixed_cost)
                }),
                saturation_column(),
            ],
        ),
    ]
}

// -------------------------------- session ----------------------------------

/// Which placeholder, if any, the list screen shows instead of its table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListStatus {
    Loading,
    Error,
    /// Loaded, but no pool matches.
    Empty,
    Ready,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ListSnapshot {
    pub status: ListStatus,
    pub loading: bool,
    pub error: Option<String>,
    pub show_filters: bool,
    pub search_text: String,
    pub sort_by: SortBy,
    pub performance: Performance,
    pub user_ada: u64,
    pub selected_pools: Vec<String>,
    pub active_filters: usize,
    pub import_error: bool,
    pub table: Option<TableSnapshot>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum CompareSnapshot {
    Desktop(MatrixSnapshot),
    Mobile(MobileSnapshot),
}

/// Everything the staking screens need, wired to one store and one URL.
pub struct StakingSession {
    config: Config,
    pub list: StakingListSync,
    pub search: DebouncedInput<String>,
    pub user_ada: DebouncedInput<u64>,
    pools: QueryHandle<Vec<PoolRow>>,
    pub ranges: RangeFilters,
    table: PaginatedTable<PoolRow>,
    pub matrix: DesktopMatrix<PoolRow>,
    pub cards: MobileCards<PoolRow>,
    import: ImportDialog,
    pub fmt: Formatters,
}

impl StakingSession {
    pub fn new(ctx: SyncContext, config: Config) -> Self {
        let list = StakingListSync::new(ctx.clone());
        let delay = Duration::from_millis(config.input_debounce_ms);
        let search = DebouncedInput::new(list.search_text.clone(), delay);
        let user_ada = DebouncedInput::new(Rc::new(user_ada_field(ctx.clone())), delay);
        let scroll = ScrollController::new(
            f64::from(config.scroll_step_px),
            Duration::from_millis(config.scroll_interval_ms),
            Duration::from_millis(config.overlay_debounce_ms),
        );
        let identifier = |r: &PoolRow| r.hash.clone();

        Self {
            table: PaginatedTable::new(list_columns(), identifier, config.rows_per_page),
            matrix: DesktopMatrix::new(compare_categories(), identifier, scroll),
            cards: MobileCards::new(ctx, compare_categories(), identifier),
            list,
            search,
            user_ada,
            pools: QueryHandle::new(POOL_LIST_QUERY, reshape_pool_list),
            ranges: RangeFilters::default(),
            import: ImportDialog::default(),
            fmt: Formatters::default(),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Reconcile the list screen, and bring the stored ADA amount into a URL
    /// that has none.
    pub fn mount(&self, url_query: &str) -> Reconcile {
        let outcome = self.list.mount(url_query, self.config.auto_sync);
        if query::parse(url_query).get(USER_ADA_KEY).is_none() {
            self.user_ada.field().restore_url();
        }
        log::debug!("[staking] mount -> {outcome:?}");
        outcome
    }

    pub fn pools_state(&self) -> &LoadState<Vec<PoolRow>> {
        self.pools.state()
    }

    pub fn pool_query_options(&self) -> QueryOptions {
        QueryOptions::new(json!({ "performance": self.list.performance.read().as_str() }))
    }

    /// Start a pool list request; `None` when nothing should be fetched.
    pub fn begin_refresh(&mut self, now: Instant) -> Option<(RequestId, QueryOptions)> {
        let options = self.pool_query_options();
        self.pools.begin(&options, now).map(|id| (id, options))
    }

    /// Apply a pool list response. Range bounds are recomputed for the new
    /// dataset; active selections that still fit are kept.
    pub fn complete_refresh(&mut self, id: RequestId, result: Result<Value>) {
        if !self.pools.complete(id, result) {
            return;
        }
        let state = self.pools.state();
        if let (Some(rows), None) = (&state.data, &state.error) {
            let mut ranges = RangeFilters::from_rows(rows, RANGE_FIELDS);
            ranges.carry_over(&self.ranges);
            self.ranges = ranges;
        }
    }

    pub async fn refresh(&mut self, client: &dyn QueryClient) {
        if let Some((id, options)) = self.begin_refresh(Instant::now()) {
            let result = client.query(POOL_LIST_QUERY, options.variables).await;
            self.complete_refresh(id, result);
        }
    }

    /// Loaded pools with simulated rewards for the current ADA amount.
    fn rows(&self) -> Vec<PoolRow> {
        let ada = self.user_ada.field().read();
        self.pools
            .state()
            .data
            .iter()
            .flatten()
            .cloned()
            .map(|r| r.with_rewards(ada))
            .collect()
    }

    /// Rows after search, range filters and sort.
    pub fn visible_rows(&self) -> Vec<PoolRow> {
        let text = TextFilter::compile(&self.list.search_text.read());
        filters::apply(&self.rows(), &text, &self.ranges, &self.list.sort_by.read())
    }

    /// Selected pools in selection order; hashes not in the loaded list are skipped.
    pub fn compare_rows(&self) -> Vec<PoolRow> {
        let rows = self.rows();
        self.list
            .selected_pools
            .selected()
            .iter()
            .filter_map(|h| rows.iter().find(|r| &r.hash == h).cloned())
            .collect()
    }

    pub fn list_snapshot(&self, page: usize) -> ListSnapshot {
        let state = self.pools.state();
        let visible = self.visible_rows();
        let status = match state.view(|_| visible.is_empty()) {
            View::Loading => ListStatus::Loading,
            View::Error(_) => ListStatus::Error,
            View::Empty => ListStatus::Empty,
            View::Ready(_) => ListStatus::Ready,
        };
        ListSnapshot {
            status,
            loading: state.loading,
            error: state.error.as_ref().map(|e| e.user_message()),
            show_filters: self.list.show_filters.read(),
            search_text: self.search.value(),
            sort_by: self.list.sort_by.read(),
            performance: self.list.performance.read(),
            user_ada: self.user_ada.value(),
            selected_pools: self.list.selected_pools.selected(),
            active_filters: self.ranges.active_count(),
            import_error: self.import.show_error,
            table: state
                .data
                .as_ref()
                .map(|_| self.table.snapshot(&visible, page, &self.fmt)),
        }
    }

    pub fn compare_snapshot(&self, viewport_width: u32) -> CompareSnapshot {
        let rows = self.compare_rows();
        match Layout::for_width(viewport_width, self.config.mobile_breakpoint_px) {
            Layout::Desktop => CompareSnapshot::Desktop(self.matrix.snapshot(&rows, &self.fmt)),
            Layout::Mobile => CompareSnapshot::Mobile(self.cards.snapshot(&rows, &self.fmt)),
        }
    }

    pub fn toggle_sort(&self, field: &str) {
        let next = self.list.sort_by.read().toggled(field);
        self.list.sort_by.write(next);
    }

    pub fn set_performance(&self, p: Performance) {
        self.list.performance.write(p);
    }

    pub fn toggle_filters(&self) {
        let shown = self.list.show_filters.read();
        self.list.show_filters.write(!shown);
    }

    /// Advance timers: debounced inputs, hold-to-scroll and overlay recompute.
    pub fn tick(&mut self, now: Instant) {
        self.search.poll(now);
        self.user_ada.poll(now);
        self.matrix.scroll.tick(now, &mut self.matrix.container);
        self.matrix.scroll.poll(now);
    }

    /// Whether [`tick`](Self::tick) still has anything to do.
    pub fn has_pending_work(&self) -> bool {
        self.search.is_pending() || self.user_ada.is_pending() || self.matrix.scroll.has_pending_work()
    }

    pub fn export(&self, now: DateTime<Utc>) -> Result<(String, String)> {
        let rows = self.rows();
        let summaries: Vec<PoolSummary> = self
            .list
            .selected_pools
            .selected()
            .into_iter()
            .map(|hash| match rows.iter().find(|r| r.hash == hash) {
                Some(r) => r.summary(),
                None => PoolSummary { name: String::new(), pool_hash: hash },
            })
            .collect();
        let json = PoolExport::new(&summaries, now).to_json()?;
        log::info!("[staking] exported {} pools", summaries.len());
        Ok((pools::export_file_name(now), json))
    }

    pub fn import(&mut self, text: &str) -> bool {
        self.import.import(&self.list.selected_pools, text)
    }

    pub fn dismiss_import_error(&mut self) {
        self.import.dismiss();
    }

    /// Screen teardown: pending inputs are dropped, not committed.
    pub fn dispose(&mut self) {
        self.search.dispose();
        self.user_ada.dispose();
        self.matrix.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;
    use crate::location::{Location, MemoryLocation};
    use std::sync::Arc;

    fn ctx() -> (SyncContext, Arc<MemoryLocation>) {
        let store = Arc::new(MemoryStore::new());
        let location = Arc::new(MemoryLocation::new("/staking"));
        (SyncContext::new(store, location.clone()), location)
    }

    #[test]
    fn fresh_screen_query_has_every_field() {
        let (ctx, _) = ctx();
        let list = StakingListSync::new(ctx);
        let q = query::parse(&list.get_screen_url_query());
        assert_eq!(q.get("selectedPools"), Some("[]"));
        assert_eq!(q.get("sortBy"), Some(r#"{"field":"revenue","order":"desc"}"#));
        assert_eq!(q.get("showFilters"), Some("false"));
        assert_eq!(q.get("searchText"), Some(""));
        assert_eq!(q.get("performance"), Some("epoch"));
    }

    #[test]
    fn stored_query_round_trips_through_adoption() {
        let (ctx, _) = ctx();
        let list = StakingListSync::new(ctx);
        list.selected_pools.add_pool("p1").unwrap();
        list.selected_pools.add_pool("p2").unwrap();
        list.sort_by.write(SortBy::new("margin", SortOrder::Asc));
        list.search_text.write("ticker:abc".into());
        list.performance.write(Performance::Year);
        let q = list.get_screen_url_query();

        let (other_ctx, _) = self::ctx();
        let other = StakingListSync::new(other_ctx);
        other.set_screen_storage_from_query(&q);
        assert!(query::parse(&other.get_screen_url_query()).same_pairs(&query::parse(&q)));
    }

    #[test]
    fn mount_adopts_shared_link() {
        let (ctx, location) = ctx();
        let list = StakingListSync::new(ctx);
        let link = "performance=month&showFilters=true";
        location.replace_search(link);
        assert_eq!(list.mount(link, true), Reconcile::AdoptedFromUrl);
        assert_eq!(list.performance.persisted(), Performance::Month);
        assert!(list.show_filters.persisted());
        assert_eq!(list.mount(&list.get_screen_url_query(), true), Reconcile::RenderDirect);
    }

    #[test]
    fn user_ada_is_clamped() {
        let (ctx, _) = ctx();
        let field = user_ada_field(ctx);
        field.write(u64::MAX);
        assert_eq!(field.read(), MAX_ADA_SUPPLY);
    }

    #[test]
    fn debounced_search_commits_after_pause() {
        let (ctx, location) = ctx();
        let field = Rc::new(SyncedField::new(ctx, SEARCH_TEXT_KEY, String::new()));
        let mut input = DebouncedInput::new(field.clone(), Duration::from_millis(1000));
        let t0 = Instant::now();
        input.input(t0, "ab".into());
        input.input(t0 + Duration::from_millis(300), "abc".into());
        assert_eq!(input.value(), "abc");
        assert_eq!(field.read(), "");
        assert!(!input.poll(t0 + Duration::from_millis(1000)));
        assert!(input.poll(t0 + Duration::from_millis(1300)));
        assert_eq!(location.search(), "searchText=abc");

        input.input(t0 + Duration::from_millis(2000), "zzz".into());
        input.dispose();
        assert_eq!(field.read(), "abc");
    }

    #[test]
    fn reshape_flattens_summary() {
        let data = json!({"stakePools": [
            {"hash": "aa", "name": "Alpha", "ticker": "ALP", "liveStake": "5000000",
             "pledge": 100, "margin": 0.02, "fixedCost": "340000000",
             "summary": {"revenue": 0.045, "saturation": 0.5, "blocks": 12}},
            {"name": "no hash"}
        ]});
        let rows = reshape_pool_list(data).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].stake, 5_000_000);
        assert_eq!(rows[0].fixed_cost, 340_000_000);
        assert_eq!(rows[0].blocks, 12);
        assert!((rows[0].revenue - 0.045).abs() < 1e-12);
        assert!(reshape_pool_list(json!({})).is_err());
    }

    #[test]
    fn rewards_follow_user_stake() {
        let row = reshape_pool_list(json!({"stakePools": [
            {"hash": "aa", "summary": {"revenue": 0.05}}
        ]}))
        .unwrap()
        .remove(0)
        .with_rewards(1_000);
        assert_eq!(row.rewards, Some(50_000_000));
        assert_eq!(row.numeric("rewards"), Some(50_000_000.0));
    }
}

//! Comparison matrix and paginated table renderers.
//!
//! Both consume declarative column configuration ([`Column`], grouped into
//! [`Category`]s) and produce serializable snapshots for the DOM layer, the
//! same one-way Rust -> JS flow used for the rest of the UI.

use crate::formatters::{visual_hash, Formatters};
use crate::pagination::Pagination;
use crate::scroll::{EdgeOverlays, ScrollContainer, ScrollController, ScrollState};
use crate::sync::{SyncContext, SyncedField};
use serde::Serialize;
use std::collections::BTreeMap;

pub const EXPANDED_KEY: &str = "compareExpanded";

/// One rendered cell.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Cell {
    Text { text: String },
    Badge { text: String, tone: Tone },
    Link { text: String, href: String },
    Empty,
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text { text: s.into() }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Neutral,
    Good,
    Warning,
    Bad,
}

type FormatFn<R> = Box<dyn Fn(&R, &Formatters) -> String>;
type RenderFn<R> = Box<dyn Fn(&R, &Formatters) -> Cell>;

/// The two ways a column produces its content.
pub enum ColumnKind<R> {
    /// Plain text from a pure formatter.
    Formatted(FormatFn<R>),
    /// Anything else (badges, links, empty cells).
    Custom(RenderFn<R>),
}

pub struct Column<R> {
    pub id: &'static str,
    pub label: String,
    /// Fixed row height, so labels and values line up across columns.
    pub height: Option<u32>,
    pub kind: ColumnKind<R>,
}

impl<R> Column<R> {
    pub fn formatted(
        id: &'static str,
        label: &str,
        f: impl Fn(&R, &Formatters) -> String + 'static,
    ) -> Self {
        Self {
            id,
            label: label.to_string(),
            height: None,
            kind: ColumnKind::Formatted(Box::new(f)),
        }
    }

    pub fn custom(
        id: &'static str,
        label: &str,
        f: impl Fn(&R, &Formatters) -> Cell + 'static,
    ) -> Self {
        Self {
            id,
            label: label.to_string(),
            height: None,
            kind: ColumnKind::Custom(Box::new(f)),
        }
    }

    pub fn with_height(mut self, px: u32) -> Self {
        self.height = Some(px);
        self
    }

    pub fn render(&self, row: &R, fmt: &Formatters) -> Cell {
        match &self.kind {
            ColumnKind::Formatted(f) => Cell::text(f(row, fmt)),
            ColumnKind::Custom(f) => f(row, fmt),
        }
    }
}

pub struct Category<R> {
    pub id: &'static str,
    pub label: String,
    pub columns: Vec<Column<R>>,
}

impl<R> Category<R> {
    pub fn new(id: &'static str, label: &str, columns: Vec<Column<R>>) -> Self {
        Self {
            id,
            label: label.to_string(),
            columns,
        }
    }
}

type IdentifierFn<R> = Box<dyn Fn(&R) -> String>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    Desktop,
    Mobile,
}

impl Layout {
    pub fn for_width(width_px: u32, mobile_breakpoint_px: u32) -> Self {
        if width_px < mobile_breakpoint_px {
            Layout::Mobile
        } else {
            Layout::Desktop
        }
    }
}

// ----------------------------- desktop matrix -------------------------------

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LabelCell {
    pub category: String,
    pub label: String,
    pub height: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ValueColumn {
    pub id: String,
    pub visual_hash: String,
    pub cells: Vec<Cell>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatrixSnapshot {
    pub fullscreen: bool,
    pub labels: Vec<LabelCell>,
    pub columns: Vec<ValueColumn>,
    pub scroll: ScrollState,
    pub overlays: EdgeOverlays,
}

/// Fixed label column plus one horizontally scrollable column per row entity.
pub struct DesktopMatrix<R> {
    categories: Vec<Category<R>>,
    identifier: IdentifierFn<R>,
    pub scroll: ScrollController,
    pub container: ScrollContainer,
}

impl<R> DesktopMatrix<R> {
    pub fn new(
        categories: Vec<Category<R>>,
        identifier: impl Fn(&R) -> String + 'static,
        scroll: ScrollController,
    ) -> Self {
        Self {
            categories,
            identifier: Box::new(identifier),
            scroll,
            container: ScrollContainer::new(0.0, 0.0),
        }
    }

    /// Record measured sizes of the active scroll container.
    pub fn measure(&mut self, scroll_width: f64, client_width: f64) {
        self.container.scroll_width = scroll_width;
        self.container.client_width = client_width;
        self.container.scroll_by(0.0);
    }

    /// Fullscreen re-parents scrolling to the modal container, which starts at the left edge.
    pub fn set_fullscreen(&mut self, on: bool) {
        if self.scroll.is_fullscreen() != on {
            self.scroll.set_fullscreen(on);
            self.container.scroll_left = 0.0;
        }
    }

    pub fn snapshot(&self, rows: &[R], fmt: &Formatters) -> MatrixSnapshot {
        let labels = self
            .categories
            .iter()
            .flat_map(|cat| {
                cat.columns.iter().map(move |col| LabelCell {
                    category: cat.label.clone(),
                    label: col.label.clone(),
                    height: col.height,
                })
            })
            .collect();

        let columns = rows
            .iter()
            .map(|row| {
                let id = (self.identifier)(row);
                ValueColumn {
                    visual_hash: visual_hash(&id),
                    id,
                    cells: self
                        .categories
                        .iter()
                        .flat_map(|cat| cat.columns.iter().map(move |col| col.render(row, fmt)))
                        .collect(),
                }
            })
            .collect();

        MatrixSnapshot {
            fullscreen: self.scroll.is_fullscreen(),
            labels,
            columns,
            scroll: self.scroll.state(),
            overlays: EdgeOverlays::of(&self.container),
        }
    }

    pub fn dispose(&mut self) {
        self.scroll.dispose();
    }
}

// ------------------------------ mobile cards --------------------------------

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MobileField {
    pub label: String,
    pub values: Vec<Cell>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MobileCard {
    pub id: String,
    pub label: String,
    pub expanded: bool,
    /// Empty when collapsed.
    pub fields: Vec<MobileField>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MobileSnapshot {
    pub identifiers: Vec<String>,
    pub cards: Vec<MobileCard>,
}

/// One expandable card per category; expand state is persisted per category id.
pub struct MobileCards<R> {
    categories: Vec<Category<R>>,
    identifier: IdentifierFn<R>,
    expanded: SyncedField<BTreeMap<String, bool>>,
}

impl<R> MobileCards<R> {
    pub fn new(
        ctx: SyncContext,
        categories: Vec<Category<R>>,
        identifier: impl Fn(&R) -> String + 'static,
    ) -> Self {
        Self {
            categories,
            identifier: Box::new(identifier),
            expanded: SyncedField::new(ctx, EXPANDED_KEY, BTreeMap::new()),
        }
    }

    /// Categories without an entry are expanded.
    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.read().get(id).copied().unwrap_or(true)
    }

    pub fn toggle(&self, id: &str) {
        let mut state = self.expanded.read();
        let next = !state.get(id).copied().unwrap_or(true);
        state.insert(id.to_string(), next);
        self.expanded.write(state);
    }

    pub fn expand_all(&self) {
        self.set_all(true);
    }

    pub fn collapse_all(&self) {
        self.set_all(false);
    }

    fn set_all(&self, value: bool) {
        let state = self
            .categories
            .iter()
            .map(|c| (c.id.to_string(), value))
            .collect();
        self.expanded.write(state);
    }

    pub fn snapshot(&self, rows: &[R], fmt: &Formatters) -> MobileSnapshot {
        let state = self.expanded.read();
        let cards = self
            .categories
            .iter()
            .map(|cat| {
                let expanded = state.get(cat.id).copied().unwrap_or(true);
                let fields = if expanded {
                    cat.columns
                        .iter()
                        .map(|col| MobileField {
                            label: col.label.clone(),
                            values: rows.iter().map(|r| col.render(r, fmt)).collect(),
                        })
                        .collect()
                } else {
                    Vec::new()
                };
                MobileCard {
                    id: cat.id.to_string(),
                    label: cat.label.clone(),
                    expanded,
                    fields,
                }
            })
            .collect();

        MobileSnapshot {
            identifiers: rows.iter().map(|r| (self.identifier)(r)).collect(),
            cards,
        }
    }
}

// ---------------------------- paginated table -------------------------------

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableRow {
    pub id: String,
    pub visual_hash: String,
    pub cells: Vec<Cell>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableSnapshot {
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
    pub pagination: Pagination,
    pub total_count: usize,
}

pub struct PaginatedTable<R> {
    columns: Vec<Column<R>>,
    identifier: IdentifierFn<R>,
    rows_per_page: usize,
}

impl<R> PaginatedTable<R> {
    pub fn new(
        columns: Vec<Column<R>>,
        identifier: impl Fn(&R) -> String + 'static,
        rows_per_page: usize,
    ) -> Self {
        Self {
            columns,
            identifier: Box::new(identifier),
            rows_per_page,
        }
    }

    /// Render `page` of `rows`. An invalid page yields no rows (page `0`).
    pub fn snapshot(&self, rows: &[R], page: usize, fmt: &Formatters) -> TableSnapshot {
        let pagination = Pagination::new(rows.len(), self.rows_per_page, page);
        TableSnapshot {
            headers: self.columns.iter().map(|c| c.label.clone()).collect(),
            rows: pagination
                .slice(rows)
                .iter()
                .map(|row| {
                    let id = (self.identifier)(row);
                    TableRow {
                        visual_hash: visual_hash(&id),
                        id,
                        cells: self.columns.iter().map(|c| c.render(row, fmt)).collect(),
                    }
                })
                .collect(),
            pagination,
            total_count: rows.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::{KvStore, MemoryStore};
    use crate::location::MemoryLocation;
    use std::sync::Arc;

    struct Pool {
        hash: &'static str,
        name: &'static str,
        stake: u64,
        saturated: bool,
    }

    fn categories() -> Vec<Category<Pool>> {
        vec![
            Category::new(
                "general",
                "General",
                vec![
                    Column::formatted("name", "Name", |p: &Pool, _| p.name.to_string()).with_height(48),
                    Column::formatted("stake", "Stake", |p: &Pool, f| f.ada(p.stake)),
                ],
            ),
            Category::new(
                "health",
                "Health",
                vec![Column::custom("saturation", "Saturation", |p: &Pool, _| {
                    if p.saturated {
                        Cell::Badge { text: "saturated".into(), tone: Tone::Bad }
                    } else {
                        Cell::Empty
                    }
                })],
            ),
        ]
    }

    fn pools() -> Vec<Pool> {
        vec![
            Pool { hash: "h1", name: "A", stake: 2_000_000, saturated: false },
            Pool { hash: "h2", name: "B", stake: 5_000_000, saturated: true },
        ]
    }

    #[test]
    fn desktop_matrix_columns_per_row() {
        let matrix = DesktopMatrix::new(categories(), |p: &Pool| p.hash.to_string(), ScrollController::default());
        let snap = matrix.snapshot(&pools(), &Formatters::default());
        assert_eq!(snap.labels.len(), 3);
        assert_eq!(snap.labels[0].height, Some(48));
        assert_eq!(snap.labels[2].category, "Health");
        assert_eq!(snap.columns.len(), 2);
        assert_eq!(snap.columns[1].id, "h2");
        assert_eq!(snap.columns[1].cells[1], Cell::text("5.00 ADA"));
        assert_eq!(snap.columns[0].cells[2], Cell::Empty);
        assert!(!snap.fullscreen);
    }

    #[test]
    fn fullscreen_resets_scroll_position() {
        let mut matrix = DesktopMatrix::new(categories(), |p: &Pool| p.hash.to_string(), ScrollController::default());
        matrix.measure(1200.0, 400.0);
        matrix.container.scroll_by(300.0);
        assert!(matrix.snapshot(&pools(), &Formatters::default()).overlays.left);
        matrix.set_fullscreen(true);
        let snap = matrix.snapshot(&pools(), &Formatters::default());
        assert!(snap.fullscreen);
        assert!(!snap.overlays.left);
        assert!(snap.overlays.right);
    }

    #[test]
    fn mobile_cards_expand_state_is_persisted() {
        let store = Arc::new(MemoryStore::new());
        let ctx = SyncContext::new(store.clone(), Arc::new(MemoryLocation::default()));
        let cards = MobileCards::new(ctx, categories(), |p: &Pool| p.hash.to_string());

        assert!(cards.is_expanded("general"));
        cards.toggle("health");
        assert!(!cards.is_expanded("health"));

        let snap = cards.snapshot(&pools(), &Formatters::default());
        assert_eq!(snap.identifiers, vec!["h1", "h2"]);
        assert_eq!(snap.cards[0].fields.len(), 2);
        assert_eq!(snap.cards[0].fields[0].values, vec![Cell::text("A"), Cell::text("B")]);
        assert!(snap.cards[1].fields.is_empty());

        cards.collapse_all();
        assert!(!cards.is_expanded("general"));
        assert_eq!(store.get(EXPANDED_KEY).as_deref(), Some(r#"{"general":false,"health":false}"#));
        cards.expand_all();
        assert!(cards.is_expanded("general") && cards.is_expanded("health"));
    }

    #[test]
    fn paginated_table_pages() {
        let table = PaginatedTable::new(
            vec![Column::formatted("name", "Name", |p: &Pool, _| p.name.to_string())],
            |p: &Pool| p.hash.to_string(),
            1,
        );
        let rows = pools();
        let snap = table.snapshot(&rows, 2, &Formatters::default());
        assert_eq!(snap.headers, vec!["Name"]);
        assert_eq!(snap.rows.len(), 1);
        assert_eq!(snap.rows[0].id, "h2");
        assert_eq!(snap.pagination.page_count, 2);

        let snap = table.snapshot(&rows, 3, &Formatters::default());
        assert_eq!(snap.pagination.page, 0);
        assert!(snap.rows.is_empty());
    }

    #[test]
    fn layout_breakpoint() {
        assert_eq!(Layout::for_width(500, 960), Layout::Mobile);
        assert_eq!(Layout::for_width(960, 960), Layout::Desktop);
    }
}

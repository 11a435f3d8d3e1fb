//! Sorting, range filters and the search-text filter for pool lists.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Field access needed by sorting and filtering. Rows expose numeric columns
/// (`"revenue"`, `"fees"`, ...) and text columns (`"name"`, `"ticker"`, `"hash"`).
pub trait FilterableRow {
    fn numeric(&self, field: &str) -> Option<f64>;
    fn text(&self, field: &str) -> Option<&str>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn flipped(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortBy {
    pub field: String,
    pub order: SortOrder,
}

impl SortBy {
    pub fn new(field: &str, order: SortOrder) -> Self {
        Self {
            field: field.to_string(),
            order,
        }
    }

    /// Header click: same field flips the order, a new field starts descending.
    pub fn toggled(&self, field: &str) -> Self {
        if self.field == field {
            Self::new(field, self.order.flipped())
        } else {
            Self::new(field, SortOrder::Desc)
        }
    }
}

/// Stable sort; rows missing the field go last regardless of order.
pub fn sort_rows<R: FilterableRow>(rows: &mut [R], sort: &SortBy) {
    rows.sort_by(|a, b| {
        let ord = match (a.numeric(&sort.field), b.numeric(&sort.field)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            (Some(_), None) => return Ordering::Less,
            (None, Some(_)) => return Ordering::Greater,
            (None, None) => match (a.text(&sort.field), b.text(&sort.field)) {
                (Some(x), Some(y)) => x.to_lowercase().cmp(&y.to_lowercase()),
                (Some(_), None) => return Ordering::Less,
                (None, Some(_)) => return Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        };
        match sort.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}

/// Active range for one numeric column. `range` is the dataset's `[min, max]`
/// and never changes; `value` is the user's selection (`None` = inactive).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RangeFilter {
    pub field: String,
    pub range: (f64, f64),
    pub value: Option<(f64, f64)>,
}

impl RangeFilter {
    pub fn matches<R: FilterableRow>(&self, row: &R) -> bool {
        let Some((lo, hi)) = self.value else {
            return true;
        };
        row.numeric(&self.field)
            .map(|v| v >= lo && v <= hi)
            .unwrap_or(false)
    }
}

/// Range filters for a fixed dataset.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RangeFilters {
    filters: Vec<RangeFilter>,
}

impl RangeFilters {
    /// Compute `[min, max]` per field from the unfiltered rows. Fields with no
    /// values get `(0, 0)`.
    pub fn from_rows<R: FilterableRow>(rows: &[R], fields: &[&str]) -> Self {
        let filters = fields
            .iter()
            .map(|field| {
                let mut values = rows.iter().filter_map(|r| r.numeric(field));
                let range = match values.next() {
                    Some(first) => values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))),
                    None => (0.0, 0.0),
                };
                RangeFilter {
                    field: field.to_string(),
                    range,
                    value: None,
                }
            })
            .collect();
        Self { filters }
    }

    pub fn get(&self, field: &str) -> Option<&RangeFilter> {
        self.filters.iter().find(|f| f.field == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RangeFilter> {
        self.filters.iter()
    }

    /// Set or clear one filter. The selection is clamped into the dataset range
    /// and normalized so that `lo <= hi`. Returns `false` for an unknown field.
    pub fn set_value(&mut self, field: &str, value: Option<(f64, f64)>) -> bool {
        let Some(filter) = self.filters.iter_mut().find(|f| f.field == field) else {
            return false;
        };
        filter.value = value.map(|(a, b)| {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let (min, max) = filter.range;
            (lo.clamp(min, max), hi.clamp(min, max))
        });
        true
    }

    /// Keep the selections of `previous` that still fit inside this dataset's ranges.
    pub fn carry_over(&mut self, previous: &RangeFilters) {
        for filter in &mut self.filters {
            let Some((lo, hi)) = previous.get(&filter.field).and_then(|f| f.value) else {
                continue;
            };
            let (min, max) = filter.range;
            if min <= lo && hi <= max {
                filter.value = Some((lo, hi));
            }
        }
    }

    pub fn reset_all(&mut self) {
        for f in &mut self.filters {
            f.value = None;
        }
    }

    pub fn active_count(&self) -> usize {
        self.filters.iter().filter(|f| f.value.is_some()).count()
    }

    pub fn matches<R: FilterableRow>(&self, row: &R) -> bool {
        self.filters.iter().all(|f| f.matches(row))
    }
}

/// Search text compiled into per-field token lists.
///
/// Syntax: whitespace-separated tokens, `field:value` to target a field
/// (`name`, `ticker`, `hash`/`id`); comma-separated values are alternatives.
/// Bare tokens that look like a pool hash go to `hash`, others match anywhere.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextFilter {
    pub name: Vec<String>,
    pub ticker: Vec<String>,
    pub hash: Vec<String>,
    pub free: Vec<String>,
}

impl TextFilter {
    pub fn compile(q: &str) -> Self {
        let mut f = TextFilter::default();
        for tok in q.split_whitespace() {
            let mut it = tok.splitn(2, ':');
            if let (Some(k), Some(v)) = (it.next(), it.next()) {
                f.push(k, v);
            } else if is_likely_pool_hash(tok) {
                f.hash.push(tok.to_lowercase());
            } else {
                f.free.push(tok.to_lowercase());
            }
        }
        f
    }

    fn push(&mut self, k: &str, v: &str) {
        let values: Vec<String> = v
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        match &*k.to_lowercase() {
            "name" => self.name.extend(values),
            "ticker" => self.ticker.extend(values),
            "hash" | "id" | "pool" => self.hash.extend(values),
            _ => self
                .free
                .extend(values.into_iter().map(|v| format!("{k}:{v}"))),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.ticker.is_empty() && self.hash.is_empty() && self.free.is_empty()
    }

    pub fn matches<R: FilterableRow>(&self, row: &R) -> bool {
        if self.is_empty() {
            return true;
        }
        let field = |name: &str| row.text(name).unwrap_or("").to_lowercase();
        let name = field("name");
        let ticker = field("ticker");
        let hash = field("hash");

        let any = |vals: &[String], hay: &str| vals.is_empty() || vals.iter().any(|v| hay.contains(v));

        if !any(&self.name, &name) || !any(&self.ticker, &ticker) || !any(&self.hash, &hash) {
            return false;
        }
        if !self.free.is_empty() {
            let hay = [name, ticker, hash].join(" ");
            if !self.free.iter().any(|v| hay.contains(v)) {
                return false;
            }
        }
        true
    }
}

/// Pool ids are 56 hex characters; accept a long hex prefix too.
fn is_likely_pool_hash(tok: &str) -> bool {
    tok.len() >= 16 && tok.len() <= 64 && tok.chars().all(|c| c.is_ascii_hexdigit())
}

/// Filter then sort, returning owned rows for display.
pub fn apply<R: FilterableRow + Clone>(
    rows: &[R],
    text: &TextFilter,
    ranges: &RangeFilters,
    sort: &SortBy,
) -> Vec<R> {
    let mut out: Vec<R> = rows
        .iter()
        .filter(|r| text.matches(*r) && ranges.matches(*r))
        .cloned()
        .collect();
    sort_rows(&mut out, sort);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug)]
    struct Row {
        name: &'static str,
        ticker: &'static str,
        hash: &'static str,
        revenue: Option<f64>,
    }

    impl FilterableRow for Row {
        fn numeric(&self, field: &str) -> Option<f64> {
            match field {
                "revenue" => self.revenue,
                _ => None,
            }
        }
        fn text(&self, field: &str) -> Option<&str> {
            match field {
                "name" => Some(self.name),
                "ticker" => Some(self.ticker),
                "hash" => Some(self.hash),
                _ => None,
            }
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { name: "Alpha", ticker: "ALP", hash: "aa11bb22cc33dd44ee55", revenue: Some(5.0) },
            Row { name: "Beta", ticker: "BET", hash: "ff00ff00ff00ff00ff00", revenue: Some(9.0) },
            Row { name: "Gamma", ticker: "GAM", hash: "1234567890abcdef1234", revenue: None },
            Row { name: "Delta", ticker: "DEL", hash: "deadbeefdeadbeef0000", revenue: Some(1.0) },
        ]
    }

    #[test]
    fn sort_desc_keeps_missing_last() {
        let mut r = rows();
        sort_rows(&mut r, &SortBy::new("revenue", SortOrder::Desc));
        let names: Vec<_> = r.iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Beta", "Alpha", "Delta", "Gamma"]);

        sort_rows(&mut r, &SortBy::new("revenue", SortOrder::Asc));
        let names: Vec<_> = r.iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Delta", "Alpha", "Beta", "Gamma"]);
    }

    #[test]
    fn sort_toggle() {
        let s = SortBy::new("revenue", SortOrder::Desc);
        assert_eq!(s.toggled("revenue").order, SortOrder::Asc);
        assert_eq!(s.toggled("fees"), SortBy::new("fees", SortOrder::Desc));
    }

    #[test]
    fn ranges_computed_once_and_clamped() {
        let mut filters = RangeFilters::from_rows(&rows(), &["revenue", "missing"]);
        assert_eq!(filters.get("revenue").unwrap().range, (1.0, 9.0));
        assert_eq!(filters.get("missing").unwrap().range, (0.0, 0.0));

        assert!(filters.set_value("revenue", Some((100.0, 4.0))));
        assert_eq!(filters.get("revenue").unwrap().value, Some((4.0, 9.0)));
        assert!(!filters.set_value("nope", None));

        let kept: Vec<_> = rows().into_iter().filter(|r| filters.matches(r)).map(|r| r.name).collect();
        assert_eq!(kept, vec!["Alpha", "Beta"]);

        filters.reset_all();
        assert_eq!(filters.active_count(), 0);
    }

    #[test]
    fn selections_survive_a_reload_that_still_fits() {
        let mut old = RangeFilters::from_rows(&rows(), &["revenue"]);
        old.set_value("revenue", Some((2.0, 8.0)));

        let mut fresh = RangeFilters::from_rows(&rows(), &["revenue"]);
        fresh.carry_over(&old);
        assert_eq!(fresh.get("revenue").unwrap().value, Some((2.0, 8.0)));

        // revenue now spans 5..9, so 2..8 no longer fits
        let narrower: Vec<_> = rows().into_iter().filter(|r| r.revenue.is_some_and(|v| v >= 3.0)).collect();
        let mut fresh = RangeFilters::from_rows(&narrower, &["revenue"]);
        fresh.carry_over(&old);
        assert_eq!(fresh.get("revenue").unwrap().value, None);
    }

    #[test]
    fn text_filter_fields_and_free() {
        let r = rows();
        let f = TextFilter::compile("ticker:alp,bet");
        assert_eq!(r.iter().filter(|x| f.matches(*x)).count(), 2);

        let f = TextFilter::compile("deadbeefdeadbeef");
        assert_eq!(f.hash, vec!["deadbeefdeadbeef"]);
        assert_eq!(r.iter().filter(|x| f.matches(*x)).map(|x| x.name).collect::<Vec<_>>(), vec!["Delta"]);

        let f = TextFilter::compile("mm");
        assert_eq!(r.iter().filter(|x| f.matches(*x)).map(|x| x.name).collect::<Vec<_>>(), vec!["Gamma"]);

        assert!(TextFilter::compile("   ").is_empty());
    }

    #[test]
    fn apply_filters_then_sorts() {
        let out = apply(
            &rows(),
            &TextFilter::compile("a"),
            &RangeFilters::default(),
            &SortBy::new("name", SortOrder::Asc),
        );
        let names: Vec<_> = out.iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Alpha", "Beta", "Delta", "Gamma"]);
    }
}

use std::path::Path;
use std::sync::Arc;

use crate::color::ValueColors;
use crate::data::aggregate::DashboardSummary;
use crate::data::filter::{filtered_indices, observed, Dimension, FilterSelection};
use crate::data::loader::{LoadCache, LoadReport};
use crate::data::model::OrderTable;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// The table is read-only once loaded; every interaction only mutates the
/// selection and re-derives `visible_indices` and `summary` from scratch.
#[derive(Default)]
pub struct AppState {
    /// Cleaned table (None until the user loads a file).
    pub table: Option<Arc<OrderTable>>,

    /// Current per-dimension selections.
    pub selection: FilterSelection,

    /// Indices of records passing the current selection.
    pub visible_indices: Vec<usize>,

    /// Aggregate views over the visible subset.
    pub summary: DashboardSummary,

    /// Colour assignments for the scatter's categories.
    pub category_colors: Option<ValueColors>,

    /// Colour assignments for the segment-share chart.
    pub segment_colors: Option<ValueColors>,

    /// Cosmetic theme flag.
    pub dark_mode: bool,

    /// Status / warning message shown in the top bar.
    pub status_message: Option<String>,

    /// Checksum-keyed cache of the last loaded source.
    pub load_cache: LoadCache,
}

impl AppState {
    /// Load a CSV through the cache and make it the active table.
    pub fn load_file(&mut self, path: &Path) {
        match self.load_cache.load(path) {
            Ok((table, report, cache_hit)) => {
                if cache_hit {
                    log::info!(
                        "source unchanged, reusing cached table ({} records)",
                        table.len()
                    );
                } else {
                    log::info!(
                        "loaded {} records from {} ({} rows excluded)",
                        report.rows_kept,
                        path.display(),
                        report.total_excluded()
                    );
                }
                self.set_table(table, report);
            }
            Err(e) => {
                log::error!("failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Ingest a cleaned table: seed default selections, colours, and the
    /// initial subset.
    pub fn set_table(&mut self, table: Arc<OrderTable>, report: LoadReport) {
        self.selection = FilterSelection::all_observed(&table);
        self.category_colors = Some(ValueColors::new(&table.categories));
        self.segment_colors = Some(ValueColors::new(&table.segments));

        self.status_message = if report.total_excluded() > 0 {
            Some(format!(
                "Loaded {} rows, excluded {} malformed",
                report.rows_kept,
                report.total_excluded()
            ))
        } else {
            None
        };

        self.table = Some(table);
        self.refilter();
    }

    /// Re-derive the subset and every aggregate view from the current
    /// selection. Full recompute, never incremental.
    pub fn refilter(&mut self) {
        match &self.table {
            Some(table) => {
                self.visible_indices = filtered_indices(table, &self.selection);
                self.summary = DashboardSummary::compute(table, &self.visible_indices);
            }
            None => {
                self.visible_indices.clear();
                self.summary = DashboardSummary::default();
            }
        }
    }

    /// Toggle a single value in a dimension's selection.
    pub fn toggle_value(&mut self, dim: Dimension, value: &str) {
        let selected = self.selection.selected_mut(dim);
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.refilter();
    }

    /// Select every observed value in a dimension.
    pub fn select_all(&mut self, dim: Dimension) {
        if let Some(table) = &self.table {
            let all = observed(table, dim).clone();
            *self.selection.selected_mut(dim) = all;
            self.refilter();
        }
    }

    /// Clear a dimension's selection, hiding every record.
    pub fn select_none(&mut self, dim: Dimension) {
        self.selection.selected_mut(dim).clear();
        self.refilter();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::OrderRecord;

    fn rec(region: &str, category: &str, sub: &str) -> OrderRecord {
        OrderRecord {
            order_id: "X-1".to_string(),
            order_date: None,
            ship_date: None,
            region: region.to_string(),
            segment: "Consumer".to_string(),
            category: category.to_string(),
            sub_category: sub.to_string(),
            customer_name: "Someone".to_string(),
            sales: 10.0,
            profit: 1.0,
        }
    }

    fn loaded_state() -> AppState {
        let table = OrderTable::from_records(vec![
            rec("West", "Technology", "Phones"),
            rec("East", "Furniture", "Chairs"),
        ]);
        let mut state = AppState::default();
        state.set_table(Arc::new(table), LoadReport::default());
        state
    }

    #[test]
    fn set_table_seeds_full_selection_and_summary() {
        let state = loaded_state();
        assert_eq!(state.visible_indices, vec![0, 1]);
        assert_eq!(state.summary.kpis.total_sales, 20.0);
        assert!(state.selection.regions.contains("West"));
        assert!(state.selection.regions.contains("East"));
    }

    #[test]
    fn toggle_and_select_none_recompute_everything() {
        let mut state = loaded_state();

        state.toggle_value(Dimension::Region, "East");
        assert_eq!(state.visible_indices, vec![0]);
        assert_eq!(state.summary.kpis.total_sales, 10.0);

        state.select_none(Dimension::Category);
        assert!(state.visible_indices.is_empty());
        assert_eq!(state.summary.kpis.total_sales, 0.0);

        state.select_all(Dimension::Category);
        state.toggle_value(Dimension::Region, "East");
        assert_eq!(state.visible_indices, vec![0, 1]);
    }
}

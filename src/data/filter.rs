use std::collections::BTreeSet;

use super::model::{OrderRecord, OrderTable};

// ---------------------------------------------------------------------------
// Filter selection: which values are allowed per dimension
// ---------------------------------------------------------------------------

/// One of the three filterable dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Region,
    Category,
    SubCategory,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::Region, Dimension::Category, Dimension::SubCategory];

    pub fn label(self) -> &'static str {
        match self {
            Dimension::Region => "Region",
            Dimension::Category => "Category",
            Dimension::SubCategory => "Sub-Category",
        }
    }
}

/// The user's per-dimension selections.
///
/// An empty set for a dimension means "exclude everything", not "no
/// filter"; the default selection is every observed value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub regions: BTreeSet<String>,
    pub categories: BTreeSet<String>,
    pub sub_categories: BTreeSet<String>,
}

impl FilterSelection {
    /// Select every value observed in the table (the default state).
    pub fn all_observed(table: &OrderTable) -> Self {
        Self {
            regions: table.regions.clone(),
            categories: table.categories.clone(),
            sub_categories: table.sub_categories.clone(),
        }
    }

    pub fn selected(&self, dim: Dimension) -> &BTreeSet<String> {
        match dim {
            Dimension::Region => &self.regions,
            Dimension::Category => &self.categories,
            Dimension::SubCategory => &self.sub_categories,
        }
    }

    pub fn selected_mut(&mut self, dim: Dimension) -> &mut BTreeSet<String> {
        match dim {
            Dimension::Region => &mut self.regions,
            Dimension::Category => &mut self.categories,
            Dimension::SubCategory => &mut self.sub_categories,
        }
    }

    /// Whether a record passes all three dimension filters. Pure
    /// conjunction: membership in every selected set is required.
    pub fn retains(&self, rec: &OrderRecord) -> bool {
        self.regions.contains(&rec.region)
            && self.categories.contains(&rec.category)
            && self.sub_categories.contains(&rec.sub_category)
    }
}

/// The table's distinct values for one dimension.
pub fn observed(table: &OrderTable, dim: Dimension) -> &BTreeSet<String> {
    match dim {
        Dimension::Region => &table.regions,
        Dimension::Category => &table.categories,
        Dimension::SubCategory => &table.sub_categories,
    }
}

/// Indices of records passing the current selection, in original order.
pub fn filtered_indices(table: &OrderTable, selection: &FilterSelection) -> Vec<usize> {
    table
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| selection.retains(rec))
        .map(|(i, _)| i)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

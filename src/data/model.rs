use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

// ---------------------------------------------------------------------------
// OrderRecord – one cleaned row of the source table
// ---------------------------------------------------------------------------

/// A single order line item.
///
/// `order_id` is not unique across records: an order with three line items
/// occupies three rows sharing the same id. Field order matches the export
/// header schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRecord {
    #[serde(rename = "OrderID")]
    pub order_id: String,
    /// `None` marks a date that was missing or failed to parse.
    #[serde(rename = "OrderDate")]
    pub order_date: Option<NaiveDate>,
    #[serde(rename = "ShipDate")]
    pub ship_date: Option<NaiveDate>,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Segment")]
    pub segment: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "SubCategory")]
    pub sub_category: String,
    #[serde(rename = "CustomerName")]
    pub customer_name: String,
    #[serde(rename = "Sales")]
    pub sales: f64,
    #[serde(rename = "Profit")]
    pub profit: f64,
}

// ---------------------------------------------------------------------------
// OrderTable – the complete cleaned dataset
// ---------------------------------------------------------------------------

/// The cleaned table, immutable for the lifetime of a session, plus the
/// distinct sorted value sets that seed the default filter selections.
#[derive(Debug, Clone, Default)]
pub struct OrderTable {
    /// All cleaned records, in source order.
    pub records: Vec<OrderRecord>,
    pub regions: BTreeSet<String>,
    pub segments: BTreeSet<String>,
    pub categories: BTreeSet<String>,
    pub sub_categories: BTreeSet<String>,
}

impl OrderTable {
    /// Build the distinct-value indexes from cleaned records.
    pub fn from_records(records: Vec<OrderRecord>) -> Self {
        let mut regions = BTreeSet::new();
        let mut segments = BTreeSet::new();
        let mut categories = BTreeSet::new();
        let mut sub_categories = BTreeSet::new();

        for rec in &records {
            regions.insert(rec.region.clone());
            segments.insert(rec.segment.clone());
            categories.insert(rec.category.clone());
            sub_categories.insert(rec.sub_category.clone());
        }

        OrderTable {
            records,
            regions,
            segments,
            categories,
            sub_categories,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

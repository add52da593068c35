use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use chrono::{Datelike, NaiveDate};

use super::model::{OrderRecord, OrderTable};

/// Bar count caps, matching the dashboard's chart layout.
pub const TOP_CUSTOMERS: usize = 5;
pub const TOP_SUBCATEGORIES: usize = 10;

// ---------------------------------------------------------------------------
// Derived types
// ---------------------------------------------------------------------------

/// Calendar year-month bucket derived from an order date (day discarded).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// One point of the monthly sales/profit series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthPoint {
    pub month: MonthKey,
    pub sales: f64,
    pub profit: f64,
}

/// One unaggregated point of the sales-vs-profit scatter.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub sales: f64,
    pub profit: f64,
    pub category: String,
}

/// Headline totals over the current subset.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Kpis {
    pub total_sales: f64,
    pub total_profit: f64,
    /// Distinct OrderID values, not row count: one order may span several
    /// line-item rows.
    pub distinct_orders: usize,
}

// ---------------------------------------------------------------------------
// Grouping primitives
// ---------------------------------------------------------------------------

fn subset<'a>(table: &'a OrderTable, indices: &'a [usize]) -> impl Iterator<Item = &'a OrderRecord> {
    indices.iter().map(move |&i| &table.records[i])
}

fn by_customer(rec: &OrderRecord) -> &str {
    &rec.customer_name
}
fn by_segment(rec: &OrderRecord) -> &str {
    &rec.segment
}
fn by_region(rec: &OrderRecord) -> &str {
    &rec.region
}
fn by_category(rec: &OrderRecord) -> &str {
    &rec.category
}
fn by_sub_category(rec: &OrderRecord) -> &str {
    &rec.sub_category
}
fn sales_of(rec: &OrderRecord) -> f64 {
    rec.sales
}
fn profit_of(rec: &OrderRecord) -> f64 {
    rec.profit
}

/// Group records by `key`, summing `value`. Groups come back in
/// first-encounter order, so a later stable sort breaks ties by the first
/// occurrence of each key.
fn grouped_sum<'a>(
    records: impl Iterator<Item = &'a OrderRecord>,
    key: fn(&OrderRecord) -> &str,
    value: fn(&OrderRecord) -> f64,
) -> Vec<(String, f64)> {
    let mut groups: Vec<(String, f64)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for rec in records {
        let k = key(rec);
        match index.get(k) {
            Some(&i) => groups[i].1 += value(rec),
            None => {
                index.insert(k.to_string(), groups.len());
                groups.push((k.to_string(), value(rec)));
            }
        }
    }
    groups
}

fn sort_desc(mut groups: Vec<(String, f64)>) -> Vec<(String, f64)> {
    groups.sort_by(|a, b| b.1.total_cmp(&a.1));
    groups
}

// ---------------------------------------------------------------------------
// Aggregate views
// ---------------------------------------------------------------------------

/// Top `n` customers by summed sales, descending.
pub fn top_customers_by_sales(table: &OrderTable, indices: &[usize], n: usize) -> Vec<(String, f64)> {
    let mut ranked = sort_desc(grouped_sum(subset(table, indices), by_customer, sales_of));
    ranked.truncate(n);
    ranked
}

/// Summed sales per segment, descending; consumed as proportions of the
/// subset total.
pub fn sales_share_by_segment(table: &OrderTable, indices: &[usize]) -> Vec<(String, f64)> {
    sort_desc(grouped_sum(subset(table, indices), by_segment, sales_of))
}

/// Monthly sales and profit, ascending by calendar month. Records with an
/// unknown order date do not contribute to this view.
pub fn monthly_sales_profit(table: &OrderTable, indices: &[usize]) -> Vec<MonthPoint> {
    let mut buckets: BTreeMap<MonthKey, (f64, f64)> = BTreeMap::new();
    for rec in subset(table, indices) {
        if let Some(date) = rec.order_date {
            let slot = buckets.entry(MonthKey::from_date(date)).or_insert((0.0, 0.0));
            slot.0 += rec.sales;
            slot.1 += rec.profit;
        }
    }
    buckets
        .into_iter()
        .map(|(month, (sales, profit))| MonthPoint { month, sales, profit })
        .collect()
}

/// Raw per-record (sales, profit, category) passthrough, in subset order.
pub fn scatter_points(table: &OrderTable, indices: &[usize]) -> Vec<ScatterPoint> {
    subset(table, indices)
        .map(|rec| ScatterPoint {
            sales: rec.sales,
            profit: rec.profit,
            category: rec.category.clone(),
        })
        .collect()
}

/// Summed sales per region, descending.
pub fn sales_by_region(table: &OrderTable, indices: &[usize]) -> Vec<(String, f64)> {
    sort_desc(grouped_sum(subset(table, indices), by_region, sales_of))
}

/// Summed sales per category, descending.
pub fn sales_by_category(table: &OrderTable, indices: &[usize]) -> Vec<(String, f64)> {
    sort_desc(grouped_sum(subset(table, indices), by_category, sales_of))
}

/// Top `n` sub-categories by summed profit, descending.
pub fn top_subcategories_by_profit(
    table: &OrderTable,
    indices: &[usize],
    n: usize,
) -> Vec<(String, f64)> {
    let mut ranked = sort_desc(grouped_sum(subset(table, indices), by_sub_category, profit_of));
    ranked.truncate(n);
    ranked
}

/// Headline totals. An empty subset yields zeros, never an error.
pub fn kpis(table: &OrderTable, indices: &[usize]) -> Kpis {
    let mut totals = Kpis::default();
    let mut orders: HashSet<&str> = HashSet::new();
    for rec in subset(table, indices) {
        totals.total_sales += rec.sales;
        totals.total_profit += rec.profit;
        orders.insert(rec.order_id.as_str());
    }
    totals.distinct_orders = orders.len();
    totals
}

// ---------------------------------------------------------------------------
// DashboardSummary – every view, bundled
// ---------------------------------------------------------------------------

/// Every aggregate view the dashboard renders, derived from one subset.
/// Rebuilt from scratch whenever the filter selection changes; never
/// updated incrementally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardSummary {
    pub kpis: Kpis,
    pub top_customers: Vec<(String, f64)>,
    pub segment_share: Vec<(String, f64)>,
    pub monthly: Vec<MonthPoint>,
    pub scatter: Vec<ScatterPoint>,
    pub region_sales: Vec<(String, f64)>,
    pub category_sales: Vec<(String, f64)>,
    pub subcategory_profit: Vec<(String, f64)>,
}

impl DashboardSummary {
    pub fn compute(table: &OrderTable, indices: &[usize]) -> Self {
        Self {
            kpis: kpis(table, indices),
            top_customers: top_customers_by_sales(table, indices, TOP_CUSTOMERS),
            segment_share: sales_share_by_segment(table, indices),
            monthly: monthly_sales_profit(table, indices),
            scatter: scatter_points(table, indices),
            region_sales: sales_by_region(table, indices),
            category_sales: sales_by_category(table, indices),
            subcategory_profit: top_subcategories_by_profit(table, indices, TOP_SUBCATEGORIES),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(customer: &str, sales: f64) -> OrderRecord {
        OrderRecord {
            order_id: format!("O-{customer}"),
            order_date: None,
            ship_date: None,
            region: "West".to_string(),
            segment: "Consumer".to_string(),
            category: "Technology".to_string(),
            sub_category: "Phones".to_string(),
            customer_name: customer.to_string(),
            sales,
            profit: sales * 0.2,
        }
    }

    fn all(table: &OrderTable) -> Vec<usize> {
        (0..table.len()).collect()
    }

    #[test]
    fn top_customers_sums_and_ranks() {
        let table = OrderTable::from_records(vec![rec("A", 100.0), rec("B", 50.0), rec("A", 30.0)]);
        let idx = all(&table);
        let top = top_customers_by_sales(&table, &idx, 5);
        assert_eq!(
            top,
            vec![("A".to_string(), 130.0), ("B".to_string(), 50.0)]
        );
    }

    #[test]
    fn top_n_truncates_and_never_exceeds_subset_total() {
        let records: Vec<OrderRecord> = (0..8).map(|i| rec(&format!("C{i}"), 10.0 * (i + 1) as f64)).collect();
        let table = OrderTable::from_records(records);
        let idx = all(&table);

        let top = top_customers_by_sales(&table, &idx, TOP_CUSTOMERS);
        assert_eq!(top.len(), TOP_CUSTOMERS);

        let top_sum: f64 = top.iter().map(|(_, v)| v).sum();
        let subset_sum = kpis(&table, &idx).total_sales;
        assert!(top_sum <= subset_sum);
    }

    #[test]
    fn ties_break_by_first_encounter() {
        let table = OrderTable::from_records(vec![rec("B", 50.0), rec("A", 50.0), rec("C", 80.0)]);
        let idx = all(&table);
        let top = top_customers_by_sales(&table, &idx, 3);
        // C leads; B and A tie, so B keeps its earlier encounter position.
        assert_eq!(top[0].0, "C");
        assert_eq!(top[1].0, "B");
        assert_eq!(top[2].0, "A");
    }

    #[test]
    fn month_bucketing_combines_same_calendar_month() {
        let mut a = rec("A", 100.0);
        a.order_date = NaiveDate::from_ymd_opt(2020, 1, 15);
        let mut b = rec("B", 50.0);
        b.order_date = NaiveDate::from_ymd_opt(2020, 1, 28);
        let mut c = rec("C", 10.0);
        c.order_date = NaiveDate::from_ymd_opt(2020, 3, 2);
        let undated = rec("D", 999.0);

        let table = OrderTable::from_records(vec![c, a, b, undated]);
        let idx = all(&table);
        let series = monthly_sales_profit(&table, &idx);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].month.to_string(), "2020-01");
        assert_eq!(series[0].sales, 150.0);
        assert_eq!(series[1].month.to_string(), "2020-03");
        assert_eq!(series[1].sales, 10.0);
    }

    #[test]
    fn empty_subset_degrades_to_zero() {
        let table = OrderTable::from_records(vec![rec("A", 100.0)]);
        let summary = DashboardSummary::compute(&table, &[]);
        assert_eq!(summary.kpis.total_sales, 0.0);
        assert_eq!(summary.kpis.total_profit, 0.0);
        assert_eq!(summary.kpis.distinct_orders, 0);
        assert!(summary.top_customers.is_empty());
        assert!(summary.segment_share.is_empty());
        assert!(summary.monthly.is_empty());
        assert!(summary.scatter.is_empty());
        assert!(summary.region_sales.is_empty());
        assert!(summary.category_sales.is_empty());
        assert!(summary.subcategory_profit.is_empty());
    }

    #[test]
    fn distinct_orders_counts_ids_not_rows() {
        let mut first = rec("A", 100.0);
        first.order_id = "ORD-1".to_string();
        let mut second = rec("A", 30.0);
        second.order_id = "ORD-1".to_string();
        let mut third = rec("B", 50.0);
        third.order_id = "ORD-2".to_string();

        let table = OrderTable::from_records(vec![first, second, third]);
        let idx = all(&table);
        let totals = kpis(&table, &idx);
        assert_eq!(totals.distinct_orders, 2);
        assert!(totals.distinct_orders <= idx.len());
        assert_eq!(totals.total_sales, 180.0);
    }

    #[test]
    fn distinct_orders_equals_rows_iff_single_line_items() {
        let mut a = rec("A", 10.0);
        a.order_id = "ORD-1".to_string();
        let mut b = rec("B", 20.0);
        b.order_id = "ORD-2".to_string();
        let table = OrderTable::from_records(vec![a, b]);
        let idx = all(&table);
        assert_eq!(kpis(&table, &idx).distinct_orders, idx.len());
    }

    #[test]
    fn segment_share_partitions_the_total() {
        let mut corp = rec("A", 60.0);
        corp.segment = "Corporate".to_string();
        let table = OrderTable::from_records(vec![rec("B", 100.0), corp, rec("C", 40.0)]);
        let idx = all(&table);

        let share = sales_share_by_segment(&table, &idx);
        let share_sum: f64 = share.iter().map(|(_, v)| v).sum();
        assert_eq!(share_sum, kpis(&table, &idx).total_sales);
        assert_eq!(share[0], ("Consumer".to_string(), 140.0));
        assert_eq!(share[1], ("Corporate".to_string(), 60.0));
    }

    #[test]
    fn scatter_is_a_passthrough_in_subset_order() {
        let table = OrderTable::from_records(vec![rec("A", 100.0), rec("B", 50.0)]);
        let points = scatter_points(&table, &[1, 0]);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].sales, 50.0);
        assert_eq!(points[1].sales, 100.0);
        assert_eq!(points[0].category, "Technology");
    }

    #[test]
    fn subcategory_profit_takes_top_ten() {
        let records: Vec<OrderRecord> = (0..12)
            .map(|i| {
                let mut r = rec(&format!("C{i}"), 10.0);
                r.sub_category = format!("Sub{i:02}");
                r.profit = i as f64;
                r
            })
            .collect();
        let table = OrderTable::from_records(records);
        let idx = all(&table);

        let top = top_subcategories_by_profit(&table, &idx, TOP_SUBCATEGORIES);
        assert_eq!(top.len(), 10);
        assert_eq!(top[0], ("Sub11".to_string(), 11.0));
        assert_eq!(top[9], ("Sub02".to_string(), 2.0));
    }
}

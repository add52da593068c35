use chrono::NaiveDate;
use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::OrderTable;
use crate::state::AppState;
use crate::ui::charts;

// ---------------------------------------------------------------------------
// Central panel – KPI tiles, chart grid, raw-data table
// ---------------------------------------------------------------------------

/// Render the central dashboard.
pub fn central_panel(ui: &mut Ui, state: &AppState) {
    let Some(table) = &state.table else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a CSV to explore orders  (File → Open…)");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            kpi_row(ui, state);

            section_header(ui, "Sales Performance");
            ui.columns(2, |cols: &mut [Ui]| {
                cols[0].label(RichText::new("Top 5 Customers by Sales").strong());
                charts::grouped_bar_chart(
                    &mut cols[0],
                    "top_customers",
                    &state.summary.top_customers,
                    "Sales ($)",
                    charts::SALES_BLUE,
                );
                cols[1].label(RichText::new("Segment-wise Sales Share").strong());
                charts::share_bar_chart(
                    &mut cols[1],
                    "segment_share",
                    &state.summary.segment_share,
                    state.segment_colors.as_ref(),
                );
            });

            section_header(ui, "Trend & Profitability");
            ui.columns(2, |cols: &mut [Ui]| {
                cols[0].label(RichText::new("Monthly Sales & Profit Trend").strong());
                charts::monthly_trend_chart(&mut cols[0], &state.summary.monthly);
                cols[1].label(RichText::new("Profit vs Sales by Category").strong());
                charts::scatter_chart(
                    &mut cols[1],
                    &state.summary.scatter,
                    state.category_colors.as_ref(),
                );
            });

            section_header(ui, "Regional & Categorical Performance");
            ui.columns(2, |cols: &mut [Ui]| {
                cols[0].label(RichText::new("Sales by Region").strong());
                charts::grouped_bar_chart(
                    &mut cols[0],
                    "region_sales",
                    &state.summary.region_sales,
                    "Total Sales ($)",
                    charts::SALES_BLUE,
                );
                cols[1].label(RichText::new("Sales by Category").strong());
                charts::grouped_bar_chart(
                    &mut cols[1],
                    "category_sales",
                    &state.summary.category_sales,
                    "Total Sales ($)",
                    charts::SALES_BLUE,
                );
            });

            section_header(ui, "Detailed Profitability");
            ui.label(RichText::new("Top 10 Profitable Sub-Categories").strong());
            charts::grouped_bar_chart(
                ui,
                "subcategory_profit",
                &state.summary.subcategory_profit,
                "Total Profit ($)",
                charts::PROFIT_GREEN,
            );

            ui.add_space(8.0);
            raw_data_table(ui, state, table);
        });
}

fn section_header(ui: &mut Ui, title: &str) {
    ui.add_space(12.0);
    ui.heading(title);
    ui.separator();
}

// ---------------------------------------------------------------------------
// KPI tiles
// ---------------------------------------------------------------------------

fn kpi_row(ui: &mut Ui, state: &AppState) {
    let k = &state.summary.kpis;
    ui.columns(3, |cols: &mut [Ui]| {
        kpi_tile(
            &mut cols[0],
            "Total Sales",
            &format!("${}", format_currency(k.total_sales)),
        );
        kpi_tile(
            &mut cols[1],
            "Total Profit",
            &format!("${}", format_currency(k.total_profit)),
        );
        kpi_tile(&mut cols[2], "Total Orders", &k.distinct_orders.to_string());
    });
}

fn kpi_tile(ui: &mut Ui, title: &str, value: &str) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.vertical_centered(|ui: &mut Ui| {
            ui.label(title);
            ui.heading(RichText::new(value).strong());
        });
    });
}

/// `1234567.891` → `"1,234,567.89"`.
fn format_currency(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let (whole, frac) = (cents / 100, cents % 100);

    let digits = whole.to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}{grouped}.{frac:02}", if negative { "-" } else { "" })
}

// ---------------------------------------------------------------------------
// Raw-data table
// ---------------------------------------------------------------------------

const TABLE_COLUMNS: [&str; 10] = [
    "Order ID",
    "Order Date",
    "Ship Date",
    "Region",
    "Segment",
    "Category",
    "Sub-Category",
    "Customer",
    "Sales",
    "Profit",
];

fn raw_data_table(ui: &mut Ui, state: &AppState, table: &OrderTable) {
    egui::CollapsingHeader::new(RichText::new("Raw data").strong())
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .max_scroll_height(320.0)
                .columns(Column::auto().resizable(true), TABLE_COLUMNS.len())
                .header(20.0, |mut header| {
                    for title in TABLE_COLUMNS {
                        header.col(|ui: &mut Ui| {
                            ui.strong(title);
                        });
                    }
                })
                .body(|body| {
                    body.rows(18.0, state.visible_indices.len(), |mut row| {
                        let rec = &table.records[state.visible_indices[row.index()]];
                        row.col(|ui: &mut Ui| {
                            ui.label(&rec.order_id);
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(date_label(rec.order_date));
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(date_label(rec.ship_date));
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(&rec.region);
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(&rec.segment);
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(&rec.category);
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(&rec.sub_category);
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(&rec.customer_name);
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(format!("{:.2}", rec.sales));
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(format!("{:.2}", rec.profit));
                        });
                    });
                });
        });
}

fn date_label(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "–".to_owned())
}

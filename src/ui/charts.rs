use std::ops::RangeInclusive;

use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoints, Points};

use crate::color::ValueColors;
use crate::data::aggregate::{MonthPoint, ScatterPoint};

const CHART_HEIGHT: f32 = 260.0;

pub const SALES_BLUE: Color32 = Color32::from_rgb(0x1f, 0x61, 0x8d);
pub const PROFIT_GREEN: Color32 = Color32::from_rgb(0x11, 0x7a, 0x65);

/// Formatter that maps integer axis positions back to group labels.
fn index_labels(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark, _range| {
        let rounded = mark.value.round();
        if (mark.value - rounded).abs() > 0.05 || rounded < 0.0 {
            return String::new();
        }
        labels.get(rounded as usize).cloned().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Bar charts
// ---------------------------------------------------------------------------

/// Vertical bar chart over (label, value) groups, one bar per group.
pub fn grouped_bar_chart(
    ui: &mut Ui,
    id: &str,
    groups: &[(String, f64)],
    y_label: &str,
    color: Color32,
) {
    let bars: Vec<Bar> = groups
        .iter()
        .enumerate()
        .map(|(i, (name, value))| Bar::new(i as f64, *value).name(name).width(0.6))
        .collect();
    let labels: Vec<String> = groups.iter().map(|(name, _)| name.clone()).collect();

    Plot::new(id.to_owned())
        .height(CHART_HEIGHT)
        .y_axis_label(y_label)
        .x_axis_formatter(index_labels(labels))
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(color));
        });
}

/// Share-of-total bars: each group plotted as a percentage of the sum,
/// coloured per value when a colour map is available.
pub fn share_bar_chart(
    ui: &mut Ui,
    id: &str,
    groups: &[(String, f64)],
    colors: Option<&ValueColors>,
) {
    let total: f64 = groups.iter().map(|(_, v)| v).sum();
    let bars: Vec<Bar> = groups
        .iter()
        .enumerate()
        .map(|(i, (name, value))| {
            let pct = if total > 0.0 { value / total * 100.0 } else { 0.0 };
            let mut bar = Bar::new(i as f64, pct)
                .name(format!("{name} {pct:.1}%"))
                .width(0.6);
            if let Some(colors) = colors {
                bar = bar.fill(colors.color_for(name));
            }
            bar
        })
        .collect();
    let labels: Vec<String> = groups.iter().map(|(name, _)| name.clone()).collect();

    Plot::new(id.to_owned())
        .height(CHART_HEIGHT)
        .y_axis_label("Share of sales (%)")
        .x_axis_formatter(index_labels(labels))
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

// ---------------------------------------------------------------------------
// Monthly trend
// ---------------------------------------------------------------------------

/// Monthly sales and profit lines over the time-bucketed series.
pub fn monthly_trend_chart(ui: &mut Ui, series: &[MonthPoint]) {
    let sales: PlotPoints = series
        .iter()
        .enumerate()
        .map(|(i, p)| [i as f64, p.sales])
        .collect();
    let profit: PlotPoints = series
        .iter()
        .enumerate()
        .map(|(i, p)| [i as f64, p.profit])
        .collect();
    let labels: Vec<String> = series.iter().map(|p| p.month.to_string()).collect();

    Plot::new("monthly_trend")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .y_axis_label("Amount ($)")
        .x_axis_formatter(index_labels(labels))
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(sales).name("Sales").color(SALES_BLUE).width(2.0));
            plot_ui.line(
                Line::new(profit)
                    .name("Profit")
                    .color(PROFIT_GREEN)
                    .width(2.0),
            );
        });
}

// ---------------------------------------------------------------------------
// Scatter
// ---------------------------------------------------------------------------

/// Sales vs profit per order line, one series per category so the legend
/// lists each category once.
pub fn scatter_chart(ui: &mut Ui, points: &[ScatterPoint], colors: Option<&ValueColors>) {
    let mut by_category: Vec<(String, Vec<[f64; 2]>)> = Vec::new();
    for p in points {
        match by_category.iter_mut().find(|(c, _)| *c == p.category) {
            Some((_, pts)) => pts.push([p.sales, p.profit]),
            None => by_category.push((p.category.clone(), vec![[p.sales, p.profit]])),
        }
    }

    Plot::new("sales_profit_scatter")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Sales ($)")
        .y_axis_label("Profit ($)")
        .show(ui, |plot_ui| {
            for (category, pts) in by_category {
                let color = colors
                    .map(|c| c.color_for(&category))
                    .unwrap_or(Color32::LIGHT_BLUE);
                plot_ui.points(Points::new(pts).name(category).color(color).radius(2.5));
            }
        });
}

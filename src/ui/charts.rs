use std::f64::consts::TAU;
use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};
use eframe::egui::{self, Color32, RichText, Stroke, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Line, Plot, PlotPoints, Points,
    Polygon,
};

use sales_dashboard::data::aggregate::{RevenueHeatmap, SummaryMetrics};
use sales_dashboard::Month;

use crate::color::{heat_color, heat_text_color};
use crate::state::AppState;
use crate::ui::format;

const CHART_HEIGHT: f32 = 280.0;

/// Segments used for a full circle in the region pie.
const PIE_SEGMENTS: usize = 96;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render every dashboard section, top to bottom.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Sales Dashboard");
            ui.add_space(4.0);

            section(ui, "Summary Metrics");
            summary_cards(ui, &state.tables.summary);

            section(ui, "Revenue Over Time");
            revenue_by_month_chart(ui, state);

            section(ui, &format!("Top {} Products by Units Sold", state.top_n));
            top_products_chart(ui, state);

            section(ui, "Revenue Distribution by Region");
            region_pie(ui, state);

            section(ui, "Revenue Heatmap by Region and Product");
            heatmap_grid(ui, &state.tables.heatmap);

            section(ui, "Revenue Over Time by Product");
            monthly_product_area(ui, state);

            section(ui, "Revenue Distribution by Product");
            revenue_box_plot(ui, state);

            section(ui, "Revenue and Units Sold Over Time");
            daily_chart(ui, state);

            ui.separator();
            section(ui, "Filtered Sales Data");
            filtered_table(ui, state);
        });
}

fn section(ui: &mut Ui, title: &str) {
    ui.add_space(12.0);
    ui.label(RichText::new(title).strong().size(18.0));
    ui.add_space(4.0);
}

const NO_MATCH_NOTE: &str = "No sales match the current filters.";
const NO_REVENUE_NOTE: &str = "The matching sales have no revenue to share out.";

fn empty_note(ui: &mut Ui) {
    ui.label(RichText::new(NO_MATCH_NOTE).weak());
}

/// Why the pie cannot be drawn, if it cannot.
fn pie_note(row_count: usize, total_revenue: f64) -> Option<&'static str> {
    if row_count == 0 {
        Some(NO_MATCH_NOTE)
    } else if total_revenue <= 0.0 {
        Some(NO_REVENUE_NOTE)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

fn summary_cards(ui: &mut Ui, summary: &SummaryMetrics) {
    ui.columns(3, |cols: &mut [Ui]| {
        metric(&mut cols[0], "Total Units Sold", format::thousands(summary.total_units));
        metric(&mut cols[1], "Total Revenue", format::currency(summary.total_revenue));
        metric(
            &mut cols[2],
            "Avg Revenue per Unit",
            format::average(summary.avg_revenue_per_unit),
        );
    });
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.group(|ui: &mut Ui| {
        ui.set_min_width(ui.available_width());
        ui.label(RichText::new(label).weak());
        ui.label(RichText::new(value).size(26.0).strong());
    });
}

// ---------------------------------------------------------------------------
// Axis helpers
// ---------------------------------------------------------------------------

fn month_axis(mark: GridMark, _range: &RangeInclusive<f64>) -> String {
    if (mark.value - mark.value.round()).abs() > 1e-6 {
        return String::new();
    }
    Month::from_ordinal(mark.value.round() as i64).to_string()
}

fn date_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

fn date_axis(mark: GridMark, _range: &RangeInclusive<f64>) -> String {
    NaiveDate::from_num_days_from_ce_opt(mark.value.round() as i32)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Labels the integer positions of a categorical axis.
fn category_axis(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark: GridMark, _range: &RangeInclusive<f64>| {
        let i = mark.value.round();
        if (mark.value - i).abs() > 1e-6 || i < 0.0 {
            return String::new();
        }
        labels.get(i as usize).cloned().unwrap_or_default()
    }
}

fn base_plot<'a>(id: &str) -> Plot<'a> {
    Plot::new(id.to_string())
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .allow_scroll(false)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_zoom(true)
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

fn revenue_by_month_chart(ui: &mut Ui, state: &AppState) {
    let points: Vec<[f64; 2]> = state
        .tables
        .revenue_by_month
        .iter()
        .map(|m| [m.month.ordinal() as f64, m.revenue])
        .collect();

    base_plot("revenue_by_month")
        .x_axis_formatter(month_axis)
        .x_axis_label("Month")
        .y_axis_label("Revenue")
        .include_y(0.0)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(points.clone()))
                    .name("Revenue")
                    .color(Color32::LIGHT_BLUE)
                    .width(2.0),
            );
            plot_ui.points(Points::new(points).radius(3.5).color(Color32::LIGHT_BLUE));
        });
}

fn top_products_chart(ui: &mut Ui, state: &AppState) {
    let top = &state.tables.top_products;
    let labels: Vec<String> = top.iter().map(|p| p.product.clone()).collect();

    let bars: Vec<Bar> = top
        .iter()
        .enumerate()
        .map(|(i, p)| {
            Bar::new(i as f64, p.units as f64)
                .name(&p.product)
                .width(0.7)
                .fill(state.product_colors.color_for(&p.product))
        })
        .collect();

    base_plot("top_products")
        .x_axis_formatter(category_axis(labels))
        .y_axis_label("Units sold")
        .include_y(0.0)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Units sold"));
        });
}

/// Pie wedges drawn as convex polygons of at most a quarter turn each.
fn region_pie(ui: &mut Ui, state: &AppState) {
    let regions = &state.tables.revenue_by_region;
    let total: f64 = regions.iter().map(|r| r.revenue).sum();
    if let Some(note) = pie_note(state.tables.row_count, total) {
        ui.label(RichText::new(note).weak());
        return;
    }

    Plot::new("revenue_by_region")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            let mut angle = 0.0f64;
            for r in regions {
                let share = r.revenue / total;
                let sweep = share * TAU;
                let color = state.region_colors.color_for(&r.region);
                let name = format!("{} ({:.1}%)", r.region, share * 100.0);

                for (from, to) in wedge_pieces(angle, angle + sweep) {
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(sector_points(from, to)))
                            .name(&name)
                            .fill_color(color)
                            .stroke(Stroke::new(1.0, color)),
                    );
                }
                angle += sweep;
            }
        });
}

fn wedge_pieces(start: f64, end: f64) -> Vec<(f64, f64)> {
    let quarter = TAU / 4.0;
    let mut pieces = Vec::new();
    let mut from = start;
    while end - from > 1e-9 {
        let to = (from + quarter).min(end);
        pieces.push((from, to));
        from = to;
    }
    pieces
}

fn sector_points(from: f64, to: f64) -> Vec<[f64; 2]> {
    let steps = (((to - from) / TAU * PIE_SEGMENTS as f64).ceil() as usize).max(1);
    let mut points = Vec::with_capacity(steps + 2);
    points.push([0.0, 0.0]);
    for s in 0..=steps {
        // Clockwise from twelve o'clock.
        let a = from + (to - from) * s as f64 / steps as f64;
        points.push([a.sin(), a.cos()]);
    }
    points
}

fn heatmap_grid(ui: &mut Ui, heatmap: &RevenueHeatmap) {
    if heatmap.is_empty() {
        empty_note(ui);
        return;
    }
    let max = heatmap.max_cell();
    let row_totals = heatmap.row_totals();
    let col_totals = heatmap.column_totals();

    egui::ScrollArea::horizontal()
        .id_salt("heatmap_scroll")
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new("revenue_heatmap")
                .spacing([2.0, 2.0])
                .min_col_width(80.0)
                .show(ui, |ui: &mut Ui| {
                    ui.strong("region \\ product");
                    for product in &heatmap.products {
                        ui.strong(product);
                    }
                    ui.strong("Total");
                    ui.end_row();

                    for (r, region) in heatmap.regions.iter().enumerate() {
                        ui.strong(region);
                        for value in &heatmap.cells[r] {
                            let t = if max > 0.0 { (value / max) as f32 } else { 0.0 };
                            ui.label(
                                RichText::new(format!(" {value:.2} "))
                                    .monospace()
                                    .background_color(heat_color(t))
                                    .color(heat_text_color(t)),
                            );
                        }
                        ui.label(RichText::new(format!("{:.2}", row_totals[r])).monospace());
                        ui.end_row();
                    }

                    ui.strong("Total");
                    for total in &col_totals {
                        ui.label(RichText::new(format!("{total:.2}")).monospace());
                    }
                    ui.label(
                        RichText::new(format!("{:.2}", row_totals.iter().sum::<f64>()))
                            .monospace()
                            .strong(),
                    );
                    ui.end_row();
                });
        });
}

/// Stacked area: each band is a run of trapezoids between consecutive months.
fn monthly_product_area(ui: &mut Ui, state: &AppState) {
    let rows = &state.tables.revenue_by_month_and_product;

    // Rows are dense and ordered by month then product, so each month is
    // one contiguous chunk with the same product order.
    let products: Vec<&str> = match rows.first() {
        Some(first) => rows
            .iter()
            .take_while(|r| r.month == first.month)
            .map(|r| r.product.as_str())
            .collect(),
        None => Vec::new(),
    };
    let stacks: Vec<(f64, Vec<f64>)> = if products.is_empty() {
        Vec::new()
    } else {
        rows.chunks(products.len())
            .map(|chunk| {
                let mut cumulative = 0.0;
                let tops = chunk
                    .iter()
                    .map(|r| {
                        cumulative += r.revenue;
                        cumulative
                    })
                    .collect();
                (chunk[0].month.ordinal() as f64, tops)
            })
            .collect()
    };

    base_plot("revenue_by_month_and_product")
        .x_axis_formatter(month_axis)
        .y_axis_label("Revenue")
        .include_y(0.0)
        .show(ui, |plot_ui| {
            for (p, product) in products.iter().enumerate() {
                let color = state.product_colors.color_for(product);
                let band = |tops: &Vec<f64>| {
                    let lo = if p == 0 { 0.0 } else { tops[p - 1] };
                    (lo, tops[p])
                };

                for pair in stacks.windows(2) {
                    let (x0, tops0) = &pair[0];
                    let (x1, tops1) = &pair[1];
                    let (lo0, hi0) = band(tops0);
                    let (lo1, hi1) = band(tops1);
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(vec![
                            [*x0, lo0],
                            [*x1, lo1],
                            [*x1, hi1],
                            [*x0, hi0],
                        ]))
                        .name(*product)
                        .fill_color(color.gamma_multiply(0.8))
                        .stroke(Stroke::new(0.5, color)),
                    );
                }

                let tops: Vec<[f64; 2]> = stacks.iter().map(|(x, tops)| [*x, band(tops).1]).collect();
                plot_ui.points(Points::new(tops).radius(2.5).color(color).name(*product));
            }
        });
}

fn revenue_box_plot(ui: &mut Ui, state: &AppState) {
    let summaries = &state.tables.distribution_summaries;
    let labels: Vec<String> = summaries.keys().cloned().collect();

    base_plot("revenue_distribution")
        .x_axis_formatter(category_axis(labels))
        .y_axis_label("Revenue")
        .show(ui, |plot_ui| {
            for (i, (product, s)) in summaries.iter().enumerate() {
                let color = state.product_colors.color_for(product);
                let x = i as f64;
                let elem = BoxElem::new(
                    x,
                    BoxSpread::new(s.lower_whisker, s.q1, s.median, s.q3, s.upper_whisker),
                )
                .name(product)
                .box_width(0.6)
                .fill(color.gamma_multiply(0.4))
                .stroke(Stroke::new(1.5, color));
                plot_ui.box_plot(BoxPlot::new(vec![elem]).name(product));

                if !s.outliers.is_empty() {
                    let outliers: Vec<[f64; 2]> = s.outliers.iter().map(|v| [x, *v]).collect();
                    plot_ui.points(Points::new(outliers).radius(2.5).color(color).name(product));
                }
            }
        });
}

fn daily_chart(ui: &mut Ui, state: &AppState) {
    let daily = &state.tables.daily;
    let revenue: Vec<[f64; 2]> = daily.iter().map(|d| [date_x(d.date), d.revenue]).collect();
    let units: Vec<[f64; 2]> = daily
        .iter()
        .map(|d| [date_x(d.date), d.units as f64])
        .collect();

    base_plot("daily_revenue_units")
        .x_axis_formatter(date_axis)
        .x_axis_label("Date")
        .include_y(0.0)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(revenue.clone()))
                    .name("revenue")
                    .color(Color32::LIGHT_BLUE)
                    .width(1.5),
            );
            plot_ui.points(Points::new(revenue).radius(2.0).color(Color32::LIGHT_BLUE).name("revenue"));
            plot_ui.line(
                Line::new(PlotPoints::from(units.clone()))
                    .name("units_sold")
                    .color(Color32::LIGHT_RED)
                    .width(1.5),
            );
            plot_ui.points(Points::new(units).radius(2.0).color(Color32::LIGHT_RED).name("units_sold"));
        });
}

// ---------------------------------------------------------------------------
// Raw rows
// ---------------------------------------------------------------------------

fn filtered_table(ui: &mut Ui, state: &AppState) {
    let rows = &state.rows_newest_first;
    if rows.is_empty() {
        empty_note(ui);
        return;
    }
    let transactions = &state.dataset.transactions;

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .max_scroll_height(360.0)
        .column(Column::auto().at_least(90.0))
        .columns(Column::auto().at_least(80.0), 2)
        .columns(Column::remainder().at_least(80.0), 2)
        .header(20.0, |mut header| {
            for title in ["date", "region", "product", "units_sold", "revenue"] {
                header.col(|ui: &mut Ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, rows.len(), |mut row| {
                let tx = &transactions[rows[row.index()]];
                row.col(|ui: &mut Ui| {
                    ui.label(tx.date.format("%Y-%m-%d").to_string());
                });
                row.col(|ui: &mut Ui| {
                    ui.label(&tx.region);
                });
                row.col(|ui: &mut Ui| {
                    ui.label(&tx.product);
                });
                row.col(|ui: &mut Ui| {
                    ui.label(format::thousands(tx.units_sold));
                });
                row.col(|ui: &mut Ui| {
                    ui.label(format!("{:.2}", tx.revenue));
                });
            });
        });
}

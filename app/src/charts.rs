//! Painting the exploratory charts from the precomputed `adclick::eda` data.

use crate::app::DashboardApp;

use adclick::eda::{BoxStats, Histogram, PieChart, ScatterChart, ViolinChart};
use adclick::Insight;
use eframe::egui::{self, Align2, Color32, FontId, Pos2, RichText, Sense, Shape, Stroke, Ui, Vec2};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, MarkerShape, Plot, PlotPoints,
    Points, Polygon,
};

const PLOT_HEIGHT: f32 = 320.0;
/// Marker sizes used to encode salary on the scatter chart.
const SIZE_BUCKETS: usize = 4;
/// Straight segments per full turn of the donut.
const PIE_SEGMENTS: f64 = 128.0;

fn label_name(clicked: bool) -> String {
    format!("Clicked = {}", u8::from(clicked))
}

fn scatter_color(clicked: bool) -> Color32 {
    if clicked {
        Color32::RED
    } else {
        Color32::GRAY
    }
}

fn pie_color(clicked: bool) -> Color32 {
    if clicked {
        Color32::RED
    } else {
        ecolor::hex_color!("#87ceeb")
    }
}

fn spread(stats: &BoxStats) -> BoxSpread {
    BoxSpread::new(
        stats.lower_whisker,
        stats.q1,
        stats.median,
        stats.q3,
        stats.upper_whisker,
    )
}

/// Time on site against salary, colored by label, marker size by salary, with OLS trendlines.
pub fn scatter_plot(ui: &mut Ui, chart: &ScatterChart) {
    Plot::new("scatter_time_salary")
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .allow_scroll(false)
        .x_axis_label("Time Spent on Site")
        .y_axis_label("Salary")
        .show(ui, |plot_ui| {
            for group in &chart.groups {
                let color = scatter_color(group.clicked);
                let name = label_name(group.clicked);

                let mut buckets: Vec<Vec<[f64; 2]>> = vec![Vec::new(); SIZE_BUCKETS];
                for point in &group.points {
                    buckets[chart.size_bucket(point[1], SIZE_BUCKETS)].push(*point);
                }
                for (size, points) in buckets.into_iter().enumerate() {
                    if points.is_empty() {
                        continue;
                    }
                    plot_ui.points(
                        Points::new(points)
                            .name(&name)
                            .color(color.gamma_multiply(0.7))
                            .shape(MarkerShape::Circle)
                            .filled(true)
                            .radius(2.0 + 1.5 * size as f32),
                    );
                }

                if let Some(trend) = &group.trendline {
                    plot_ui.line(
                        Line::new(PlotPoints::from(trend.endpoints().to_vec()))
                            .name(format!("{name} (OLS trend)"))
                            .color(color)
                            .width(2.0),
                    );
                }
            }
        });
}

/// Stacked histogram of time on site with a marginal box plot per label above it.
pub fn histogram_plot(ui: &mut Ui, histogram: &Histogram) {
    let lo = histogram.edges[0];
    let hi = histogram.edges[histogram.edges.len() - 1];

    Plot::new("histogram_time_marginal")
        .height(70.0)
        .show_axes([false, false])
        .allow_scroll(false)
        .include_x(lo)
        .include_x(hi)
        .show(ui, |plot_ui| {
            for (row, (clicked, stats)) in histogram.boxes.iter().enumerate() {
                let color = DashboardApp::label_color(*clicked);
                let elem = BoxElem::new(row as f64, spread(stats))
                    .box_width(0.6)
                    .whisker_width(0.3)
                    .fill(color.gamma_multiply(0.4))
                    .stroke(Stroke::new(1.5, color));
                plot_ui.box_plot(
                    BoxPlot::new(vec![elem])
                        .name(label_name(*clicked))
                        .color(color)
                        .horizontal(),
                );
            }
        });

    let width = histogram.bin_width();
    let centers = histogram.bin_centers();
    let mut stacked: Vec<BarChart> = Vec::new();
    for (clicked, counts) in &histogram.counts {
        let bars = centers
            .iter()
            .zip(counts)
            .map(|(&x, &count)| Bar::new(x, count as f64).width(width))
            .collect();
        let below: Vec<&BarChart> = stacked.iter().collect();
        let chart = BarChart::new(bars)
            .name(label_name(*clicked))
            .color(DashboardApp::label_color(*clicked))
            .stack_on(&below);
        stacked.push(chart);
    }

    Plot::new("histogram_time")
        .height(PLOT_HEIGHT - 70.0)
        .legend(Legend::default())
        .allow_scroll(false)
        .include_x(lo)
        .include_x(hi)
        .include_y(0.0)
        .x_axis_label("Time Spent on Site")
        .y_axis_label("count")
        .show(ui, |plot_ui| {
            for chart in stacked {
                plot_ui.bar_chart(chart);
            }
        });
}

/// Donut of the label shares, painted directly.
pub fn pie_chart(ui: &mut Ui, pie: &PieChart) {
    let size = ui.available_width().min(PLOT_HEIGHT);
    let (response, painter) = ui.allocate_painter(Vec2::splat(size), Sense::hover());
    let center = response.rect.center();
    let outer = size * 0.45;
    let inner = outer * pie.hole as f32;

    for slice in &pie.slices {
        let color = pie_color(slice.clicked);
        let sweep = slice.end_angle - slice.start_angle;
        let steps = (sweep / std::f64::consts::TAU * PIE_SEGMENTS).ceil().max(1.0) as usize;

        // each segment is a convex quad between the two radii
        for i in 0..steps {
            let a0 = slice.start_angle + sweep * i as f64 / steps as f64;
            let a1 = slice.start_angle + sweep * (i + 1) as f64 / steps as f64;
            painter.add(Shape::convex_polygon(
                vec![
                    polar(center, inner, a0),
                    polar(center, outer, a0),
                    polar(center, outer, a1),
                    polar(center, inner, a1),
                ],
                color,
                Stroke::NONE,
            ));
        }

        let mid = (slice.start_angle + slice.end_angle) / 2.0;
        painter.text(
            polar(center, (inner + outer) / 2.0, mid),
            Align2::CENTER_CENTER,
            format!("{:.1}%", slice.fraction * 100.0),
            FontId::proportional(14.0),
            Color32::BLACK,
        );
    }

    ui.horizontal(|ui| {
        for slice in &pie.slices {
            ui.colored_label(
                pie_color(slice.clicked),
                format!("■ {} ({} users)", label_name(slice.clicked), slice.count),
            );
        }
    });
}

/// Clockwise from twelve o'clock, in screen coordinates.
fn polar(center: Pos2, radius: f32, angle: f64) -> Pos2 {
    let angle = angle as f32;
    Pos2::new(
        center.x + radius * angle.sin(),
        center.y - radius * angle.cos(),
    )
}

/// Salary density per label with an inner box plot.
pub fn violin_plot(ui: &mut Ui, chart: &ViolinChart) {
    Plot::new("violin_salary")
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .allow_scroll(false)
        .x_axis_label("Clicked")
        .y_axis_label("Salary")
        .x_axis_formatter(|mark, _range| {
            if mark.value == 0.0 || mark.value == 1.0 {
                format!("{}", mark.value as u8)
            } else {
                String::new()
            }
        })
        .show(ui, |plot_ui| {
            for violin in &chart.violins {
                let color = DashboardApp::label_color(violin.clicked);
                let name = label_name(violin.clicked);
                let x = violin.position;

                // the outline is not convex, so fill it slice by slice
                for pair in violin.outline.windows(2) {
                    let (y0, w0) = pair[0];
                    let (y1, w1) = pair[1];
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(vec![
                            [x - w0, y0],
                            [x + w0, y0],
                            [x + w1, y1],
                            [x - w1, y1],
                        ]))
                        .name(&name)
                        .fill_color(color.gamma_multiply(0.35))
                        .stroke(Stroke::NONE),
                    );
                }

                let mut outline = violin.polygon();
                if let Some(&first) = outline.first() {
                    outline.push(first);
                }
                plot_ui.line(
                    Line::new(PlotPoints::from(outline))
                        .name(&name)
                        .color(color)
                        .width(1.5),
                );

                let elem = BoxElem::new(x, spread(&violin.stats))
                    .box_width(0.08)
                    .whisker_width(0.0)
                    .fill(color)
                    .stroke(Stroke::new(1.0, Color32::BLACK));
                plot_ui.box_plot(BoxPlot::new(vec![elem]).name(&name).color(color));
            }
        });
}

/// The hard-coded commentary under a chart.
pub fn insight_box(ui: &mut Ui, insight: &Insight) {
    let text = Color32::from_rgb(18, 60, 110);
    ui.label(RichText::new("🔍 Insight:").strong());
    egui::Frame::group(ui.style())
        .fill(Color32::from_rgb(228, 241, 253))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            for bullet in insight.bullets {
                ui.label(RichText::new(format!("• {bullet}")).color(text));
            }
        });
}

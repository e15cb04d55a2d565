//! Data behind the exploratory charts.
//!
//! Everything here is plain numbers: the dashboard turns it into plots. Four fixed
//! charts are built, each paired with a hard-coded [`Insight`].

use std::f64::consts::PI;

use ndarray::{Array1, Array2, ArrayView1, Axis};
use ndarray_stats::histogram::{Bins, Edges, Grid, HistogramExt};
use ndarray_stats::interpolate::Linear;
use ndarray_stats::QuantileExt;
use noisy_float::types::{n64, N64};

use crate::dataset::{Column, Dataset};

/// Bins of the time-on-site histogram.
pub const HISTOGRAM_BINS: usize = 25;
/// Inner radius of the donut as a fraction of the outer radius.
pub const PIE_HOLE: f64 = 0.4;
/// Points at which each violin outline is sampled.
pub const VIOLIN_SAMPLES: usize = 100;
/// Half of the widest violin, in category units.
pub const VIOLIN_HALF_WIDTH: f64 = 0.4;

/// Static commentary shown under a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Insight {
    pub bullets: &'static [&'static str],
}

/// The four charts, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdaChart {
    Scatter,
    TimeHistogram,
    ClickShare,
    SalaryViolin,
}

impl EdaChart {
    pub const ALL: [EdaChart; 4] = [
        EdaChart::Scatter,
        EdaChart::TimeHistogram,
        EdaChart::ClickShare,
        EdaChart::SalaryViolin,
    ];

    pub fn heading(self) -> &'static str {
        match self {
            EdaChart::Scatter => "1. Time on Site vs Salary (Colored by Clicked)",
            EdaChart::TimeHistogram => "2. Time Spent on Site Distribution",
            EdaChart::ClickShare => "3. Clicked vs Not Clicked",
            EdaChart::SalaryViolin => "4. Salary Distribution by Clicked Status",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            EdaChart::Scatter => "Relationship Between Time on Site & Salary",
            EdaChart::TimeHistogram => "Distribution of Time Spent on Website",
            EdaChart::ClickShare => "Percentage of Users Who Clicked Ads",
            EdaChart::SalaryViolin => "Salary Levels for Clicking vs Not Clicking Users",
        }
    }

    pub fn insight(self) -> Insight {
        let bullets: &'static [&'static str] = match self {
            EdaChart::Scatter => &[
                "Users who click ads tend to spend more time on the website.",
                "Higher salary does not strongly influence clicking behavior.",
            ],
            EdaChart::TimeHistogram => &[
                "The majority spend lower to mid-range time on site.",
                "Users who spend very high time are more likely to click.",
            ],
            EdaChart::ClickShare => &[
                "A small percentage of users actually click ads.",
                "Most users scroll without interacting.",
            ],
            EdaChart::SalaryViolin => &[
                "Salary does not significantly differentiate who clicks ads.",
                "Ad behavior seems driven more by time on website than income.",
            ],
        };
        Insight { bullets }
    }
}

/// Least-squares line `y = slope * x + intercept`, drawn over `x_range`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trendline {
    pub slope: f64,
    pub intercept: f64,
    pub x_range: (f64, f64),
}

impl Trendline {
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// The two end points of the drawn segment.
    pub fn endpoints(&self) -> [[f64; 2]; 2] {
        let (lo, hi) = self.x_range;
        [[lo, self.at(lo)], [hi, self.at(hi)]]
    }
}

/// Ordinary least squares fit. `None` with fewer than two points or no spread in `x`.
pub fn ols(xs: &[f64], ys: &[f64]) -> Option<Trendline> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);
    let mean_x = mean(xs);
    let mean_y = mean(ys);
    let sxx: f64 = xs.iter().map(|x| (x - mean_x).powi(2)).sum();
    if sxx == 0.0 {
        return None;
    }
    let sxy: f64 = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();
    let slope = sxy / sxx;
    Some(Trendline {
        slope,
        intercept: mean_y - slope * mean_x,
        x_range: min_max(xs),
    })
}

/// Scatter points of one label.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterGroup {
    pub clicked: bool,
    /// `[time, salary]`
    pub points: Vec<[f64; 2]>,
    pub trendline: Option<Trendline>,
}

/// Scatter chart: one group per label present in the data, not-clicked first.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterChart {
    pub groups: Vec<ScatterGroup>,
    /// Salary range, used to size the markers.
    pub salary_range: (f64, f64),
}

impl ScatterChart {
    pub fn build(dataset: &Dataset) -> Self {
        let groups = labels_present(dataset)
            .into_iter()
            .map(|clicked| {
                let xs = dataset.column_where(Column::TimeSpent, clicked);
                let ys = dataset.column_where(Column::Salary, clicked);
                let trendline = ols(&xs, &ys);
                ScatterGroup {
                    clicked,
                    points: xs.into_iter().zip(ys).map(|(x, y)| [x, y]).collect(),
                    trendline,
                }
            })
            .collect();
        Self {
            groups,
            salary_range: min_max(&dataset.column(Column::Salary)),
        }
    }

    /// Marker size bucket `0..buckets` for a salary, growing with salary.
    pub fn size_bucket(&self, salary: f64, buckets: usize) -> usize {
        let (lo, hi) = self.salary_range;
        if buckets == 0 || hi <= lo {
            return 0;
        }
        let t = ((salary - lo) / (hi - lo)).clamp(0.0, 1.0);
        ((t * buckets as f64) as usize).min(buckets - 1)
    }
}

/// Equal-width histogram stacked by label, with the marginal box statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// `bins + 1` increasing edges.
    pub edges: Vec<f64>,
    /// Per label, the count in each bin.
    pub counts: Vec<(bool, Vec<usize>)>,
    /// Box statistics of each label, for the marginal plot.
    pub boxes: Vec<(bool, BoxStats)>,
}

impl Histogram {
    pub fn build(dataset: &Dataset, bins: usize) -> Self {
        let bins = bins.max(1);
        let (lo, hi) = min_max(&dataset.column(Column::TimeSpent));
        let (lo, hi) = if hi > lo { (lo, hi) } else { (lo - 0.5, lo + 0.5) };
        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();

        let mut counts = Vec::new();
        let mut boxes = Vec::new();
        for clicked in labels_present(dataset) {
            let values = dataset.column_where(Column::TimeSpent, clicked);
            counts.push((clicked, bin_counts(&values, &edges)));
            if let Some(stats) = BoxStats::from_values(&values) {
                boxes.push((clicked, stats));
            }
        }
        Self {
            edges,
            counts,
            boxes,
        }
    }

    pub fn bin_width(&self) -> f64 {
        self.edges[1] - self.edges[0]
    }

    pub fn bin_centers(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect()
    }
}

/// Counts `values` into the bins delimited by `edges`; the last bin is closed on the
/// right, so the maximum is counted.
fn bin_counts(values: &[f64], edges: &[f64]) -> Vec<usize> {
    let Some((&top, inner)) = edges.split_last() else {
        return Vec::new();
    };
    let span = top - inner.first().copied().unwrap_or(top);
    let closed_top = top + (top.abs() + span) * 1e-9;
    let grid_edges: Vec<N64> = inner
        .iter()
        .copied()
        .chain(std::iter::once(closed_top))
        .filter_map(N64::try_new)
        .collect();
    let grid = Grid::from(vec![Bins::new(Edges::from(grid_edges))]);

    let observed: Vec<N64> = values.iter().copied().filter_map(N64::try_new).collect();
    match Array2::from_shape_vec((observed.len(), 1), observed) {
        Ok(observations) => observations.histogram(grid).counts().iter().copied().collect(),
        Err(_) => vec![0; inner.len()],
    }
}

/// One slice of the click share donut.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieSlice {
    pub clicked: bool,
    pub count: usize,
    pub fraction: f64,
    /// Angles in radians, clockwise from twelve o'clock.
    pub start_angle: f64,
    pub end_angle: f64,
}

/// Share of each label.
#[derive(Debug, Clone, PartialEq)]
pub struct PieChart {
    pub slices: Vec<PieSlice>,
    pub hole: f64,
}

impl PieChart {
    pub fn build(dataset: &Dataset) -> Self {
        let (not_clicked, clicked) = dataset.label_counts();
        let total = (not_clicked + clicked) as f64;
        let mut angle = 0.0;
        let slices = [(false, not_clicked), (true, clicked)]
            .into_iter()
            .filter(|&(_, count)| count > 0)
            .map(|(label, count)| {
                let fraction = count as f64 / total;
                let start_angle = angle;
                angle += fraction * 2.0 * PI;
                PieSlice {
                    clicked: label,
                    count,
                    fraction,
                    start_angle,
                    end_angle: angle,
                }
            })
            .collect();
        Self {
            slices,
            hole: PIE_HOLE,
        }
    }
}

/// Quartiles and Tukey whiskers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxStats {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
}

impl BoxStats {
    /// Quartiles are linearly interpolated; whiskers reach the furthest observation
    /// within 1.5 IQR of the box. `None` for an empty slice.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut data: Array1<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if data.is_empty() {
            return None;
        }
        let q1 = quantile(&mut data, 0.25)?;
        let median = quantile(&mut data, 0.5)?;
        let q3 = quantile(&mut data, 0.75)?;
        let iqr = q3 - q1;
        let lower_fence = q1 - 1.5 * iqr;
        let upper_fence = q3 + 1.5 * iqr;
        let lower_whisker = data
            .iter()
            .copied()
            .filter(|&v| v >= lower_fence)
            .fold(q1, f64::min);
        let upper_whisker = data
            .iter()
            .copied()
            .filter(|&v| v <= upper_fence)
            .fold(q3, f64::max);
        Some(Self {
            lower_whisker,
            q1,
            median,
            q3,
            upper_whisker,
        })
    }

    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Linear interpolation between closest ranks (numpy's default).
fn quantile(data: &mut Array1<f64>, q: f64) -> Option<f64> {
    data.quantile_axis_skipnan_mut(Axis(0), n64(q), &Linear)
        .ok()
        .map(|value| value.into_scalar())
}

/// A mirrored density outline around `position` on the x axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ViolinShape {
    pub clicked: bool,
    pub position: f64,
    /// `(salary, half_width)` pairs, increasing in salary.
    pub outline: Vec<(f64, f64)>,
    pub stats: BoxStats,
}

impl ViolinShape {
    /// Closed polygon: right side upwards, then left side downwards.
    pub fn polygon(&self) -> Vec<[f64; 2]> {
        let right = self
            .outline
            .iter()
            .map(|&(y, w)| [self.position + w, y]);
        let left = self
            .outline
            .iter()
            .rev()
            .map(|&(y, w)| [self.position - w, y]);
        right.chain(left).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViolinChart {
    pub violins: Vec<ViolinShape>,
}

impl ViolinChart {
    pub fn build(dataset: &Dataset) -> Self {
        let mut violins = Vec::new();
        for clicked in labels_present(dataset) {
            let values = dataset.column_where(Column::Salary, clicked);
            let Some(stats) = BoxStats::from_values(&values) else {
                continue;
            };
            let density = kde_outline(&values, VIOLIN_SAMPLES);
            // every violin gets the same maximum width
            let peak = density.iter().fold(0.0_f64, |acc, &(_, d)| acc.max(d));
            let outline = density
                .into_iter()
                .map(|(y, d)| {
                    let w = if peak > 0.0 { d / peak * VIOLIN_HALF_WIDTH } else { 0.0 };
                    (y, w)
                })
                .collect();
            violins.push(ViolinShape {
                clicked,
                position: if clicked { 1.0 } else { 0.0 },
                outline,
                stats,
            });
        }
        Self { violins }
    }
}

/// Silverman's rule of thumb: `1.059 * min(σ, IQR / 1.349) * n^(-1/5)`.
///
/// Falls back to whichever spread is non-zero, and to 1.0 for constant data.
pub fn silverman_bandwidth(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 1.0;
    }
    let sd = ArrayView1::from(values).std(1.0);
    let iqr = BoxStats::from_values(values).map(|s| s.iqr()).unwrap_or(0.0) / 1.349;
    let spread = match (sd > 0.0, iqr > 0.0) {
        (true, true) => sd.min(iqr),
        (true, false) => sd,
        (false, true) => iqr,
        (false, false) => return 1.0,
    };
    1.059 * spread * (n as f64).powf(-0.2)
}

/// Gaussian kernel density estimate at `x`.
pub fn gaussian_kde(values: &[f64], bandwidth: f64, x: f64) -> f64 {
    if values.is_empty() || bandwidth <= 0.0 {
        return 0.0;
    }
    let norm = 1.0 / ((2.0 * PI).sqrt() * bandwidth * values.len() as f64);
    values
        .iter()
        .map(|v| {
            let u = (x - v) / bandwidth;
            (-0.5 * u * u).exp()
        })
        .sum::<f64>()
        * norm
}

/// Density sampled over the data range extended by two bandwidths on each side.
fn kde_outline(values: &[f64], samples: usize) -> Vec<(f64, f64)> {
    let bandwidth = silverman_bandwidth(values);
    let (lo, hi) = min_max(values);
    let (lo, hi) = (lo - 2.0 * bandwidth, hi + 2.0 * bandwidth);
    let samples = samples.max(2);
    (0..samples)
        .map(|i| {
            let y = lo + (hi - lo) * i as f64 / (samples - 1) as f64;
            (y, gaussian_kde(values, bandwidth, y))
        })
        .collect()
}

/// All chart data for one dataset; built once per load.
#[derive(Debug, Clone, PartialEq)]
pub struct EdaReport {
    pub scatter: ScatterChart,
    pub histogram: Histogram,
    pub pie: PieChart,
    pub violin: ViolinChart,
}

impl EdaReport {
    pub fn build(dataset: &Dataset) -> Self {
        Self {
            scatter: ScatterChart::build(dataset),
            histogram: Histogram::build(dataset, HISTOGRAM_BINS),
            pie: PieChart::build(dataset),
            violin: ViolinChart::build(dataset),
        }
    }
}

/// Labels that occur in the dataset, `false` before `true`.
fn labels_present(dataset: &Dataset) -> Vec<bool> {
    let (not_clicked, clicked) = dataset.label_counts();
    let mut labels = Vec::with_capacity(2);
    if not_clicked > 0 {
        labels.push(false);
    }
    if clicked > 0 {
        labels.push(true);
    }
    labels
}

fn mean(values: &[f64]) -> f64 {
    ArrayView1::from(values).mean().unwrap_or(0.0)
}

/// `(0, 0)` when there is no non-NaN value.
fn min_max(values: &[f64]) -> (f64, f64) {
    let values = ArrayView1::from(values);
    let (lo, hi) = (*values.min_skipnan(), *values.max_skipnan());
    if lo.is_nan() || hi.is_nan() { (0.0, 0.0) } else { (lo, hi) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::AdRecord;
    use approx::assert_abs_diff_eq;

    fn record(time_spent: f64, salary: f64, clicked: bool) -> AdRecord {
        AdRecord {
            time_spent,
            salary,
            clicked,
        }
    }

    fn sample() -> Dataset {
        Dataset::from_records(
            vec![
                record(10.0, 20_000.0, false),
                record(12.0, 40_000.0, false),
                record(14.0, 30_000.0, false),
                record(16.0, 50_000.0, false),
                record(30.0, 60_000.0, true),
                record(40.0, 45_000.0, true),
            ],
            "sample",
        )
        .unwrap()
    }

    #[test]
    fn ols_recovers_a_line() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [1.0, 3.0, 5.0, 7.0];
        let line = ols(&xs, &ys).unwrap();
        assert_abs_diff_eq!(line.slope, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(line.intercept, 1.0, epsilon = 1e-12);
        assert_eq!(line.x_range, (0.0, 3.0));
    }

    #[test]
    fn ols_needs_spread_in_x() {
        assert!(ols(&[1.0], &[2.0]).is_none());
        assert!(ols(&[1.0, 1.0], &[2.0, 3.0]).is_none());
    }

    #[test]
    fn quartiles_interpolate_linearly() {
        let stats = BoxStats::from_values(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_abs_diff_eq!(stats.q1, 1.75);
        assert_abs_diff_eq!(stats.median, 2.5);
        assert_abs_diff_eq!(stats.q3, 3.25);
        assert_eq!(stats.lower_whisker, 1.0);
        assert_eq!(stats.upper_whisker, 4.0);
    }

    #[test]
    fn whiskers_exclude_outliers() {
        let stats = BoxStats::from_values(&[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert_eq!(stats.upper_whisker, 4.0);
        assert!(BoxStats::from_values(&[]).is_none());
    }

    #[test]
    fn histogram_counts_every_row_once() {
        let dataset = sample();
        let histogram = Histogram::build(&dataset, HISTOGRAM_BINS);
        assert_eq!(histogram.edges.len(), HISTOGRAM_BINS + 1);
        let total: usize = histogram
            .counts
            .iter()
            .map(|(_, c)| c.iter().sum::<usize>())
            .sum();
        assert_eq!(total, dataset.len());
        // the maximum lands in the last bin
        let clicked = &histogram.counts[1];
        assert!(clicked.0);
        assert_eq!(clicked.1[HISTOGRAM_BINS - 1], 1);
        assert_eq!(histogram.boxes.len(), 2);
    }

    #[test]
    fn histogram_of_constant_column_is_finite() {
        let dataset = Dataset::from_records(vec![record(5.0, 1.0, true)], "one").unwrap();
        let histogram = Histogram::build(&dataset, HISTOGRAM_BINS);
        assert!(histogram.bin_width() > 0.0);
        assert_eq!(histogram.counts[0].1.iter().sum::<usize>(), 1);
    }

    #[test]
    fn pie_fractions_cover_the_circle() {
        let pie = PieChart::build(&sample());
        assert_eq!(pie.slices.len(), 2);
        assert_abs_diff_eq!(pie.slices[0].fraction, 4.0 / 6.0, epsilon = 1e-12);
        assert_abs_diff_eq!(pie.slices[1].end_angle, 2.0 * PI, epsilon = 1e-12);
        assert_eq!(pie.hole, PIE_HOLE);
    }

    #[test]
    fn violin_is_symmetric_and_bounded() {
        let chart = ViolinChart::build(&sample());
        assert_eq!(chart.violins.len(), 2);
        for violin in &chart.violins {
            assert_eq!(violin.outline.len(), VIOLIN_SAMPLES);
            let widest = violin.outline.iter().fold(0.0_f64, |acc, &(_, w)| acc.max(w));
            assert_abs_diff_eq!(widest, VIOLIN_HALF_WIDTH, epsilon = 1e-12);
            let polygon = violin.polygon();
            assert_eq!(polygon.len(), 2 * VIOLIN_SAMPLES);
            assert_abs_diff_eq!(
                polygon[0][0] - violin.position,
                violin.position - polygon[polygon.len() - 1][0],
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn bandwidth_uses_the_iqr_when_it_is_narrower() {
        // sd = sqrt(2.5) = 1.581, IQR / 1.349 = 2 / 1.349 = 1.483
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let expected = 1.059 * (2.0 / 1.349) * 5.0_f64.powf(-0.2);
        assert_abs_diff_eq!(silverman_bandwidth(&values), expected, epsilon = 1e-12);
        assert_abs_diff_eq!(silverman_bandwidth(&values), 1.137_94, epsilon = 1e-5);
    }

    #[test]
    fn bandwidth_uses_the_standard_deviation_when_it_is_narrower() {
        // sd = sqrt(1 / 3) = 0.577, IQR / 1.349 = 1 / 1.349 = 0.741
        let values = [0.0, 0.0, 1.0, 1.0];
        let expected = 1.059 * (1.0_f64 / 3.0).sqrt() * 4.0_f64.powf(-0.2);
        assert_abs_diff_eq!(silverman_bandwidth(&values), expected, epsilon = 1e-12);
    }

    #[test]
    fn violin_outline_spans_two_bandwidths_past_the_data() {
        let dataset = sample();
        let chart = ViolinChart::build(&dataset);
        for violin in &chart.violins {
            let salaries = dataset.column_where(Column::Salary, violin.clicked);
            let bw = silverman_bandwidth(&salaries);
            let (lo, hi) = min_max(&salaries);
            let first = violin.outline.first().unwrap().0;
            let last = violin.outline.last().unwrap().0;
            assert_abs_diff_eq!(first, lo - 2.0 * bw, epsilon = 1e-6);
            assert_abs_diff_eq!(last, hi + 2.0 * bw, epsilon = 1e-6);
        }
    }

    #[test]
    fn histogram_bins_use_half_open_intervals() {
        let values = [0.0, 1.0, 1.5, 2.0, 3.0];
        let edges = [0.0, 1.0, 2.0, 3.0];
        // interior edges open the next bin, the top edge closes the last one
        assert_eq!(bin_counts(&values, &edges), vec![1, 2, 2]);
    }

    #[test]
    fn kde_integrates_to_about_one() {
        let values = [1.0, 2.0, 2.5, 4.0];
        let bw = silverman_bandwidth(&values);
        let step = 0.01;
        let area: f64 = (-1_000..1_000)
            .map(|i| gaussian_kde(&values, bw, i as f64 * step) * step)
            .sum();
        assert_abs_diff_eq!(area, 1.0, epsilon = 1e-3);
    }

    #[test]
    fn every_chart_builds_for_a_single_row() {
        let dataset = Dataset::from_records(vec![record(5.0, 1_000.0, false)], "one").unwrap();
        let report = EdaReport::build(&dataset);
        assert_eq!(report.scatter.groups.len(), 1);
        assert!(report.scatter.groups[0].trendline.is_none());
        assert_eq!(report.pie.slices.len(), 1);
        let outline = &report.violin.violins[0].outline;
        assert!(outline.iter().all(|(y, w)| y.is_finite() && w.is_finite()));
    }

    #[test]
    fn marker_size_grows_with_salary() {
        let scatter = ScatterChart::build(&sample());
        assert_eq!(scatter.size_bucket(20_000.0, 4), 0);
        assert_eq!(scatter.size_bucket(60_000.0, 4), 3);
        assert!(scatter.size_bucket(30_000.0, 4) <= scatter.size_bucket(50_000.0, 4));
    }

    #[test]
    fn every_chart_has_commentary() {
        for chart in EdaChart::ALL {
            assert!(!chart.insight().bullets.is_empty());
            assert!(!chart.title().is_empty());
        }
    }
}

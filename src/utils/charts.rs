use crate::models::HistoricalChampionRecord;
use serde::Serialize;

/// Number of bins used for the champion points distribution
pub const DEFAULT_BINS: usize = 10;

const BAR_WIDTH: usize = 40;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

impl HistogramBin {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Equal-width bins spanning [min, max]. The last bin is closed on the right.
/// A single distinct value gets a unit-wide range centered on it.
pub fn histogram(points: &[u32], bins: usize) -> Vec<HistogramBin> {
    let (min, max) = match (points.iter().min(), points.iter().max()) {
        (Some(&min), Some(&max)) if bins > 0 => (f64::from(min), f64::from(max)),
        _ => return Vec::new(),
    };
    let (lower, upper) = if min == max {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };
    let width = (upper - lower) / bins as f64;

    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: lower + width * i as f64,
            upper: if i + 1 == bins {
                upper
            } else {
                lower + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();

    for &p in points {
        let idx = (((f64::from(p) - lower) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }

    out
}

/// (season, points) pairs in dataset order
pub fn trend_series(records: &[HistoricalChampionRecord]) -> Vec<(String, u32)> {
    records
        .iter()
        .map(|r| (r.season.clone(), r.points))
        .collect()
}

fn bar(len: usize) -> String {
    "#".repeat(len)
}

/// Text histogram for the terminal, marking the bin holding the mean
pub fn render_histogram_text(bins: &[HistogramBin], mean: f64) -> String {
    let max_count = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1);
    let mean_bin = bins.iter().position(|b| b.contains(mean));
    let mut out = String::new();
    for (i, b) in bins.iter().enumerate() {
        let len = b.count * BAR_WIDTH / max_count;
        let marker = if mean_bin == Some(i) { "  <- mean" } else { "" };
        out.push_str(&format!(
            "{:>6.1} - {:>6.1} | {:<width$} {}{}\n",
            b.lower,
            b.upper,
            bar(len),
            b.count,
            marker,
            width = BAR_WIDTH
        ));
    }
    out
}

/// Text bar chart of champion points per season, with a mean reference line
pub fn render_trend_text(records: &[HistoricalChampionRecord], mean: f64) -> String {
    let (lo, hi) = match (
        records.iter().map(|r| r.points).min(),
        records.iter().map(|r| r.points).max(),
    ) {
        (Some(lo), Some(hi)) => (lo.saturating_sub(5), hi),
        _ => return String::new(),
    };
    let span = f64::from((hi - lo).max(1));
    let scale = |value: f64| (((value - f64::from(lo)) / span) * BAR_WIDTH as f64).round() as usize;

    let mut out = String::new();
    for (season, points) in trend_series(records) {
        out.push_str(&format!(
            "{:>9} | {:<width$} {}\n",
            season,
            bar(scale(f64::from(points))),
            points,
            width = BAR_WIDTH
        ));
    }
    out.push_str(&format!(
        "{:>9} | {}| {:.1}\n",
        "mean",
        " ".repeat(scale(mean).min(BAR_WIDTH)),
        mean
    ));
    out
}

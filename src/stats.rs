//! Descriptive statistics over a dataset.
//!
//! [`summarize`] produces mean, median, mode and population standard
//! deviation. Values render with six fractional digits, except for an empty
//! dataset where every statistic is a bare `0`.

use std::fmt;

use clap::ValueEnum;

/// One displayed statistic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Statistic {
    /// Placeholder for an empty dataset. Renders as `0`.
    Zero,
    Value(f64),
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statistic::Zero => f.write_str("0"),
            Statistic::Value(value) => f.write_str(&to_fixed(*value)),
        }
    }
}

/// Six fractional digits, with halves rounded away from zero.
///
/// `{:.6}` rounds exact halves to even, so `1.0078125` would show as
/// `1.007812`. A double is an exact half at the sixth digit only when it is
/// an odd multiple of `1/128`. Those end in `...25` or `...75` at the
/// seventh digit, so rounding up bumps a `2` or a `7` and never carries.
/// `-0.0` shows as `0`.
fn to_fixed(value: f64) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    let scaled = value.abs() * 128.0;
    if scaled.fract() != 0.0 || scaled % 2.0 != 1.0 {
        return format!("{:.6}", value);
    }

    let mut digits = format!("{:.7}", value).into_bytes();
    digits.pop();
    if let Some(last) = digits.last_mut() {
        *last += 1;
    }
    String::from_utf8_lossy(&digits).into_owned()
}

/// Which elements of the sorted data make up the median.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MedianRule {
    /// Average of the elements at `ceil(n / 2)` and `floor(n / 2)`.
    ///
    /// Matches the numbers existing dashboards show. For odd `n` this is not
    /// the middle element: `[1, 2, 3, 4, 5]` gives `3.5`.
    #[default]
    Compat,
    /// Middle element, or the average of the two middle elements.
    Textbook,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub mean: Statistic,
    pub median: Statistic,
    pub mode: Statistic,
    pub std_dev: Statistic,
}

impl Summary {
    pub const EMPTY: Summary = Summary {
        mean: Statistic::Zero,
        median: Statistic::Zero,
        mode: Statistic::Zero,
        std_dev: Statistic::Zero,
    };

    /// Labelled statistics in display order.
    pub fn labelled(&self) -> [(&'static str, Statistic); 4] {
        [
            ("Mean", self.mean),
            ("Mode", self.mode),
            ("Std Deviation", self.std_dev),
            ("Median", self.median),
        ]
    }
}

impl Default for Summary {
    fn default() -> Self {
        Summary::EMPTY
    }
}

/// Computes the four statistics of `values`.
///
/// The input is left untouched; sorting happens on a copy.
pub fn summarize(values: &[f64], rule: MedianRule) -> Summary {
    if values.is_empty() {
        return Summary::EMPTY;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let count = sorted.len() as f64;
    let mean = values.iter().sum::<f64>() / count;
    let variance = sorted
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / count;

    Summary {
        mean: Statistic::Value(mean),
        median: Statistic::Value(median(&sorted, rule)),
        mode: Statistic::Value(mode(&sorted)),
        std_dev: Statistic::Value(variance.sqrt()),
    }
}

// `sorted` must be non-empty and ascending.
fn median(sorted: &[f64], rule: MedianRule) -> f64 {
    let len = sorted.len();
    let mid = len / 2;
    match rule {
        MedianRule::Compat => {
            // ceil(n / 2) runs past the end for a single element.
            let upper = ((len + 1) / 2).min(len - 1);
            (sorted[upper] + sorted[mid]) / 2.0
        }
        MedianRule::Textbook if len % 2 == 1 => sorted[mid],
        MedianRule::Textbook => (sorted[mid - 1] + sorted[mid]) / 2.0,
    }
}

// Longest run in sorted data. The first run wins ties, so the smallest value.
fn mode(sorted: &[f64]) -> f64 {
    let mut best = sorted[0];
    let mut best_count = 0;
    let mut start = 0;
    while start < sorted.len() {
        let value = sorted[start];
        let run = sorted[start..]
            .iter()
            .take_while(|&&other| other == value)
            .count()
            .max(1);
        if run > best_count {
            best = value;
            best_count = run;
        }
        start += run;
    }
    best
}

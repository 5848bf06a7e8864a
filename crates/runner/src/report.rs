//! Experiment reports and utility statistics

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ExperimentError, ExperimentResult};

/// Bins used for the trial utility histogram
pub const HISTOGRAM_BINS: usize = 10;

/// Widest histogram bar in the text report
const BAR_WIDTH: usize = 40;

/// Equal-width histogram over `[lower, upper]`
///
/// The last bin is closed on the right, so the maximum lands in it. A sample
/// with no spread is centred in a window of width one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub lower: f64,
    pub upper: f64,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn new(values: &[f64], bins: usize) -> Self {
        let bins = bins.max(1);
        let (min, max) = min_max(values).unwrap_or((0.0, 0.0));
        let (lower, upper) = if max > min {
            (min, max)
        } else {
            (min - 0.5, max + 0.5)
        };

        let width = (upper - lower) / bins as f64;
        let mut counts = vec![0; bins];
        for &value in values {
            let bin = ((value - lower) / width) as usize;
            counts[bin.min(bins - 1)] += 1;
        }

        Self {
            lower,
            upper,
            counts,
        }
    }

    pub fn bin_width(&self) -> f64 {
        (self.upper - self.lower) / self.counts.len() as f64
    }

    /// `counts.len() + 1` bin boundaries
    pub fn edges(&self) -> Vec<f64> {
        let width = self.bin_width();
        (0..=self.counts.len())
            .map(|i| self.lower + width * i as f64)
            .collect()
    }
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
    )
}

/// Summary statistics of total utility across trials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtilitySummary {
    pub mean: f64,
    /// Midpoint of the two middle values for an even count
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub histogram: Histogram,
}

impl UtilitySummary {
    /// Summarize a sample; an empty sample summarizes to zeros
    pub fn from_values(values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        let mean = if n == 0 {
            0.0
        } else {
            sorted.iter().sum::<f64>() / n as f64
        };
        let median = match n {
            0 => 0.0,
            n if n % 2 == 1 => sorted[n / 2],
            n => (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0,
        };
        let (min, max) = min_max(&sorted).unwrap_or((0.0, 0.0));

        Self {
            mean,
            median,
            min,
            max,
            histogram: Histogram::new(&sorted, HISTOGRAM_BINS),
        }
    }
}

/// Outcome of a complete experiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentReport {
    /// Experiment name
    pub scenario: String,
    /// Display name of the policy
    pub policy: String,
    pub trials: usize,
    pub num_students: usize,
    pub num_sessions: usize,
    /// Base seed, for replaying the run
    pub seed: u64,
    /// Total utility of each trial, in trial order
    pub utilities: Vec<f64>,
    /// Total currency spent in each trial
    pub payments: Vec<f64>,
    pub summary: UtilitySummary,
}

impl ExperimentReport {
    pub fn to_json(&self) -> ExperimentResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ExperimentError::Encode(e.to_string()))
    }
}

impl fmt::Display for ExperimentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} ({}): trials={}, n={}, k={}, seed={}",
            self.policy, self.scenario, self.trials, self.num_students, self.num_sessions, self.seed
        )?;
        writeln!(
            f,
            "Mean: {:.2}, Median: {:.2}, Min: {:.2}, Max: {:.2}",
            self.summary.mean, self.summary.median, self.summary.min, self.summary.max
        )?;

        let histogram = &self.summary.histogram;
        let tallest = histogram.counts.iter().copied().max().unwrap_or(0).max(1);
        let edges = histogram.edges();
        for (i, &count) in histogram.counts.iter().enumerate() {
            let bar = "#".repeat(count * BAR_WIDTH / tallest);
            writeln!(
                f,
                "  {:>12.2} .. {:<12.2} {:>5} {}",
                edges[i],
                edges[i + 1],
                count,
                bar
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_summary_odd_count() {
        let summary = UtilitySummary::from_values(&[5.0, 1.0, 3.0]);

        assert_relative_eq!(summary.mean, 3.0);
        assert_eq!(summary.median, 3.0);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 5.0);
    }

    #[test]
    fn test_summary_even_count_median_is_midpoint() {
        let summary = UtilitySummary::from_values(&[4.0, 1.0, 3.0, 10.0]);
        assert_relative_eq!(summary.median, 3.5);
        assert_relative_eq!(summary.mean, 4.5);
    }

    #[test]
    fn test_empty_summary_is_zero() {
        let summary = UtilitySummary::from_values(&[]);
        assert_eq!(summary.mean, 0.0);
        assert_eq!(summary.median, 0.0);
        assert_eq!(summary.histogram.counts.iter().sum::<usize>(), 0);
    }

    #[test]
    fn test_histogram_bins() {
        let values: Vec<f64> = (0..=10).map(|i| i as f64).collect();
        let histogram = Histogram::new(&values, 10);

        assert_eq!(histogram.lower, 0.0);
        assert_eq!(histogram.upper, 10.0);
        // maximum falls into the closed last bin
        assert_eq!(histogram.counts, vec![1, 1, 1, 1, 1, 1, 1, 1, 1, 2]);
        assert_eq!(histogram.edges().len(), 11);
        assert_relative_eq!(histogram.bin_width(), 1.0);
    }

    #[test]
    fn test_histogram_without_spread() {
        let histogram = Histogram::new(&[7.0, 7.0, 7.0], 10);

        assert_relative_eq!(histogram.lower, 6.5);
        assert_relative_eq!(histogram.upper, 7.5);
        assert_eq!(histogram.counts[5], 3);
    }

    #[test]
    fn test_text_report_lists_every_bin() {
        let utilities = vec![10.0, 20.0, 30.0];
        let report = ExperimentReport {
            scenario: "current".to_string(),
            policy: "Current".to_string(),
            trials: 3,
            num_students: 5,
            num_sessions: 2,
            seed: 1,
            summary: UtilitySummary::from_values(&utilities),
            payments: vec![0.0; 3],
            utilities,
        };

        let text = report.to_string();
        assert!(text.starts_with("Current (current): trials=3"));
        assert!(text.contains("Mean: 20.00, Median: 20.00"));
        assert_eq!(text.lines().count(), 2 + HISTOGRAM_BINS);

        let json = report.to_json().unwrap();
        let decoded: ExperimentReport = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, report);
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical metric columns, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Contribution,
    ValueMtd,
    ValueYtd,
    GrowthMtd,
    GrowthL3m,
    GrowthYtd,
    AchievementMtd,
    AchievementYtd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Whole units, never negative in the extracts.
    Magnitude,
    /// Signed, one decimal place.
    Percentage,
}

impl MetricKind {
    pub fn decimals(self) -> i32 {
        match self {
            MetricKind::Magnitude => 0,
            MetricKind::Percentage => 1,
        }
    }

    pub fn round(self, value: f64) -> f64 {
        round_to(value, self.decimals())
    }
}

impl Metric {
    pub const ALL: [Metric; 8] = [
        Metric::Contribution,
        Metric::ValueMtd,
        Metric::ValueYtd,
        Metric::GrowthMtd,
        Metric::GrowthL3m,
        Metric::GrowthYtd,
        Metric::AchievementMtd,
        Metric::AchievementYtd,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Metric::Contribution => "Contribution",
            Metric::ValueMtd => "Value MTD",
            Metric::ValueYtd => "Value YTD",
            Metric::GrowthMtd => "Growth MTD",
            Metric::GrowthL3m => "Growth L3M",
            Metric::GrowthYtd => "Growth YTD",
            Metric::AchievementMtd => "Achievement MTD",
            Metric::AchievementYtd => "Achievement YTD",
        }
    }

    pub fn kind(self) -> MetricKind {
        match self {
            Metric::ValueMtd | Metric::ValueYtd => MetricKind::Magnitude,
            _ => MetricKind::Percentage,
        }
    }

    pub fn position(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10_f64.powi(decimals);
    let rounded = (value * factor).round() / factor;
    // keep -0.0 out of the output
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

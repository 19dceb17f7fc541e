//! Series identities and their fixed display styling.

use std::fmt;

/// RGBA fill plus RGB border for one bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorStyle {
    pub fill: [u8; 4],
    pub border: [u8; 3],
}

/// One of the three population columns that can be charted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SeriesKind {
    Total,
    Male,
    Female,
}

impl SeriesKind {
    /// Canonical order used for series and single-region labels.
    pub const ALL: [SeriesKind; 3] = [SeriesKind::Total, SeriesKind::Male, SeriesKind::Female];

    /// Display label (legend entries, single-region categories).
    pub fn label(self) -> &'static str {
        match self {
            SeriesKind::Total => "Total",
            SeriesKind::Male => "Male",
            SeriesKind::Female => "Female",
        }
    }

    /// Column name used in the dataset header and in summaries.
    pub fn column_name(self) -> &'static str {
        match self {
            SeriesKind::Total => "total",
            SeriesKind::Male => "male",
            SeriesKind::Female => "female",
        }
    }

    /// Color assignment keyed on series identity only.
    pub fn style(self) -> ColorStyle {
        match self {
            // Red
            SeriesKind::Total => ColorStyle {
                fill: [255, 99, 132, 51],
                border: [255, 99, 132],
            },
            // Blue
            SeriesKind::Male => ColorStyle {
                fill: [54, 162, 235, 51],
                border: [54, 162, 235],
            },
            // Yellow
            SeriesKind::Female => ColorStyle {
                fill: [255, 205, 86, 51],
                border: [255, 205, 86],
            },
        }
    }
}

impl fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Parse a population cell. Whitespace is ignored; non-finite values are rejected.
pub fn parse_population(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().parse().ok()?;
    value.is_finite().then_some(value)
}

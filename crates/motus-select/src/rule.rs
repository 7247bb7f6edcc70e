//! Prefix-based column retention rules.
//!
//! The column naming convention carries the semantics: window-aggregate
//! statistics (`kurtosis_*`, `max_*`, ...) are populated only on
//! window-summary rows, while per-instant sensor readings (`roll_*`,
//! `gyros_*`, ...) are populated everywhere. Filtering is expressed as an
//! explicit rule table — one `(prefix, retention)` pair per prefix —
//! applied once over the column list, so the classification is inspectable
//! rather than buried in a pattern.

/// What a matching rule does with a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retention {
    /// Drop the column from the output.
    Exclude,
    /// Keep the column (reserved for rule tables that whitelist).
    Retain,
}

/// A single column-name rule: columns starting with `prefix` get `retention`.
#[derive(Debug, Clone, Copy)]
pub struct FilterRule {
    /// Column-name prefix this rule matches.
    pub prefix: &'static str,
    /// What to do with matching columns.
    pub retention: Retention,
}

/// Rules excluding window-aggregate statistic columns.
///
/// These columns are populated only on window-summary rows and are unusable
/// for per-instant prediction.
#[must_use]
pub fn window_aggregate_rules() -> Vec<FilterRule> {
    const PREFIXES: [&str; 8] = [
        "kurtosis",
        "skewness",
        "max",
        "min",
        "amplitude",
        "var",
        "avg",
        "stddev",
    ];
    PREFIXES
        .iter()
        .map(|&prefix| FilterRule {
            prefix,
            retention: Retention::Exclude,
        })
        .collect()
}

/// Rules excluding per-axis derived sensor columns, leaving only the
/// `total`/`roll`/`pitch`/`yaw` aggregate readings.
#[must_use]
pub fn derived_sensor_rules() -> Vec<FilterRule> {
    const PREFIXES: [&str; 3] = ["gyros", "accel", "magnet"];
    PREFIXES
        .iter()
        .map(|&prefix| FilterRule {
            prefix,
            retention: Retention::Exclude,
        })
        .collect()
}

/// Apply a rule table to a column list.
///
/// Returns one keep/drop flag per column plus the number of columns any
/// rule matched. Columns matched by no rule are kept; the first matching
/// rule wins.
#[must_use]
pub(crate) fn apply_rules(columns: &[String], rules: &[FilterRule]) -> (Vec<bool>, usize) {
    let mut matched = 0;
    let keep: Vec<bool> = columns
        .iter()
        .map(|name| {
            match rules.iter().find(|r| name.starts_with(r.prefix)) {
                Some(rule) => {
                    matched += 1;
                    rule.retention == Retention::Retain
                }
                None => true,
            }
        })
        .collect();
    (keep, matched)
}

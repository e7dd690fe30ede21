//! Validation rule, finding and report types.

use std::fmt;
use std::ops::RangeInclusive;

use serde::Serialize;

/// Accepted discount fraction.
pub const DISCOUNT_RANGE: RangeInclusive<f64> = 0.0..=1.0;

/// Accepted calendar years.
pub const YEAR_RANGE: RangeInclusive<i64> = 2000..=2030;

/// Accepted week numbers.
pub const WEEK_RANGE: RangeInclusive<i64> =
    crate::calendar::FIRST_WEEK..=crate::calendar::LAST_WEEK;

/// Absolute tolerance of the sales consistency check. A deviation of
/// exactly this amount is not a mismatch.
pub const DEFAULT_SALES_TOLERANCE: f64 = 0.01;

/// Whether a rule violation is logged as a warning or an error.
///
/// Neither level stops the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// The fixed battery of data-quality checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// Null or NaN cells in any column.
    NullCount,
    /// Negative values in a non-negative numeric column.
    Negative,
    /// Discount outside [`DISCOUNT_RANGE`].
    DiscountRange,
    /// Flag column value outside `{"Yes", "No"}`.
    FlagDomain,
    /// Year outside [`YEAR_RANGE`].
    YearRange,
    /// Week number outside [`WEEK_RANGE`].
    WeekRange,
    /// Sales differ from `units * price * (1 - discount)` by more than the tolerance.
    SalesConsistency,
}

impl Rule {
    pub const ALL: [Rule; 7] = [
        Rule::NullCount,
        Rule::Negative,
        Rule::DiscountRange,
        Rule::FlagDomain,
        Rule::YearRange,
        Rule::WeekRange,
        Rule::SalesConsistency,
    ];

    pub fn severity(self) -> Severity {
        match self {
            Rule::NullCount | Rule::SalesConsistency => Severity::Warning,
            Rule::Negative
            | Rule::DiscountRange
            | Rule::FlagDomain
            | Rule::YearRange
            | Rule::WeekRange => Severity::Error,
        }
    }

    /// Log prefix identifying the rule.
    pub fn tag(self) -> &'static str {
        match self {
            Rule::NullCount => "[NULL CHECK]",
            Rule::Negative => "[NEGATIVE CHECK]",
            Rule::DiscountRange => "[DISCOUNT CHECK]",
            Rule::FlagDomain => "[ON FLYER CHECK]",
            Rule::YearRange => "[YEAR CHECK]",
            Rule::WeekRange => "[WEEK CHECK]",
            Rule::SalesConsistency => "[SALES CHECK]",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A `(column, rule, violation count)` triple produced by one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub column: String,
    pub rule: Rule,
    pub violations: u64,
}

impl Finding {
    pub fn new(column: impl Into<String>, rule: Rule, violations: u64) -> Self {
        Self {
            column: column.into(),
            rule,
            violations,
        }
    }

    pub fn severity(&self) -> Severity {
        self.rule.severity()
    }
}

/// Findings collected while validating one dataset.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub label: String,
    pub findings: Vec<Finding>,
    /// Checks that could not run because their column is absent or the
    /// engine rejected the query.
    pub skipped: Vec<String>,
}

impl ValidationReport {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Number of findings raised by `rule`.
    pub fn count(&self, rule: Rule) -> usize {
        self.findings.iter().filter(|f| f.rule == rule).count()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity() == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity() == Severity::Warning)
    }

    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severities_match_rule_table() {
        assert_eq!(Rule::NullCount.severity(), Severity::Warning);
        assert_eq!(Rule::SalesConsistency.severity(), Severity::Warning);
        for rule in [
            Rule::Negative,
            Rule::DiscountRange,
            Rule::FlagDomain,
            Rule::YearRange,
            Rule::WeekRange,
        ] {
            assert_eq!(rule.severity(), Severity::Error, "{rule:?}");
        }
    }

    #[test]
    fn bounds_are_inclusive() {
        assert!(DISCOUNT_RANGE.contains(&0.0));
        assert!(DISCOUNT_RANGE.contains(&1.0));
        assert!(!DISCOUNT_RANGE.contains(&1.01));
        assert!(YEAR_RANGE.contains(&2000) && YEAR_RANGE.contains(&2030));
        assert!(!YEAR_RANGE.contains(&1999));
        assert!(WEEK_RANGE.contains(&1) && WEEK_RANGE.contains(&53));
        assert!(!WEEK_RANGE.contains(&0));
    }

    #[test]
    fn report_splits_errors_and_warnings() {
        let mut report = ValidationReport::new("Promotion_data.csv");
        report.findings.push(Finding::new("Price", Rule::Negative, 1));
        report.findings.push(Finding::new("Units", Rule::NullCount, 2));
        report.findings.push(Finding::new("Sales $", Rule::Negative, 3));

        assert_eq!(report.count(Rule::Negative), 2);
        assert_eq!(report.errors().count(), 2);
        assert_eq!(report.warnings().count(), 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn every_rule_has_a_distinct_tag() {
        let mut tags: Vec<_> = Rule::ALL.iter().map(|r| r.tag()).collect();
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(tags.len(), Rule::ALL.len());
    }
}

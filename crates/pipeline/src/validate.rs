//! Advisory data-quality checks.
//!
//! Every check runs as its own counting query against a temporary view of
//! the dataset. A violation is logged at the rule's severity and recorded
//! in the returned [`ValidationReport`]; a check that cannot run is logged
//! and recorded as skipped. Nothing here filters, corrects or fails the
//! dataset.

use datafusion::arrow::datatypes::DataType;

use promoflow_core::columns::{normalize_column_name, quote_ident, quote_literal, raw};
use promoflow_core::config::ValidationPolicy;
use promoflow_core::validation::{
    Finding, Rule, Severity, ValidationReport, DISCOUNT_RANGE, WEEK_RANGE, YEAR_RANGE,
};

use crate::dataset::Dataset;
use crate::engine::EngineSession;
use crate::error::PipelineError;

/// Run the full battery of checks against `dataset`.
pub async fn validate(
    session: &EngineSession,
    dataset: &Dataset,
    label: &str,
    policy: &ValidationPolicy,
) -> ValidationReport {
    tracing::info!(dataset = label, "Starting data validation");
    let mut report = ValidationReport::new(label);

    let view = format!("validate_{}", normalize_column_name(label));
    if let Err(e) = session.register_view(&view, dataset) {
        tracing::error!(dataset = label, error = ?e, "Could not expose dataset for validation");
        report.skipped.push("all checks".to_string());
        return report;
    }

    let checker = Checker {
        session,
        view: &view,
        label,
        columns: dataset
            .frame()
            .schema()
            .fields()
            .iter()
            .map(|f| (f.name().clone(), f.data_type().clone()))
            .collect(),
    };

    checker.null_counts(&mut report).await;
    checker.negatives(&mut report).await;
    checker.discount_range(&mut report).await;
    checker.flag_domain(&mut report).await;
    checker.year_range(&mut report).await;
    checker.week_range(&mut report).await;
    checker.sales_consistency(&mut report, policy.sales_tolerance).await;

    if let Err(e) = session.deregister_view(&view) {
        tracing::warn!(view = %view, error = %e, "Failed to drop validation view");
    }
    tracing::info!(
        dataset = label,
        errors = report.errors().count(),
        warnings = report.warnings().count(),
        "Data validation finished",
    );
    report
}

struct Checker<'a> {
    session: &'a EngineSession,
    view: &'a str,
    label: &'a str,
    columns: Vec<(String, DataType)>,
}

impl Checker<'_> {
    fn has(&self, column: &str) -> bool {
        self.columns.iter().any(|(name, _)| name == column)
    }

    /// Null (and NaN, for floating columns) cells per column, in one query.
    async fn null_counts(&self, report: &mut ValidationReport) {
        let selects: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, (name, data_type))| {
                let c = quote_ident(name);
                let condition = if data_type.is_floating() {
                    format!("{c} IS NULL OR isnan({c})")
                } else {
                    format!("{c} IS NULL")
                };
                format!("SUM(CASE WHEN {condition} THEN 1 ELSE 0 END) AS \"c{i}\"")
            })
            .collect();
        if selects.is_empty() {
            return;
        }

        let query = format!("SELECT {} FROM {}", selects.join(", "), quote_ident(self.view));
        match self.session.first_row_as_i64(&query).await {
            Ok(counts) => {
                for ((name, _), n) in self.columns.iter().zip(counts) {
                    let n = n.unwrap_or(0).max(0) as u64;
                    self.record(report, name, Rule::NullCount, n);
                }
            }
            Err(e) => self.skip(report, Rule::NullCount, "*", &e),
        }
    }

    async fn negatives(&self, report: &mut ValidationReport) {
        for column in raw::NON_NEGATIVE {
            if !self.has(column) {
                continue;
            }
            let predicate = format!("{} < 0", quote_ident(column));
            self.count(report, Rule::Negative, column, &predicate).await;
        }
    }

    async fn discount_range(&self, report: &mut ValidationReport) {
        let c = quote_ident(raw::DISCOUNT);
        let predicate = format!(
            "{c} < {} OR {c} > {}",
            DISCOUNT_RANGE.start(),
            DISCOUNT_RANGE.end()
        );
        self.count_required(report, Rule::DiscountRange, raw::DISCOUNT, &predicate)
            .await;
    }

    async fn flag_domain(&self, report: &mut ValidationReport) {
        let allowed: Vec<String> = raw::FLAG_DOMAIN.iter().map(|v| quote_literal(v)).collect();
        let predicate = format!(
            "NOT (CAST({} AS VARCHAR) IN ({}))",
            quote_ident(raw::ON_FLYER),
            allowed.join(", ")
        );
        self.count_required(report, Rule::FlagDomain, raw::ON_FLYER, &predicate)
            .await;
    }

    async fn year_range(&self, report: &mut ValidationReport) {
        let c = quote_ident(raw::YEAR);
        let predicate = format!("{c} < {} OR {c} > {}", YEAR_RANGE.start(), YEAR_RANGE.end());
        self.count_required(report, Rule::YearRange, raw::YEAR, &predicate)
            .await;
    }

    async fn week_range(&self, report: &mut ValidationReport) {
        let c = quote_ident(raw::WEEK_NUMBER);
        let predicate = format!("{c} < {} OR {c} > {}", WEEK_RANGE.start(), WEEK_RANGE.end());
        self.count_required(report, Rule::WeekRange, raw::WEEK_NUMBER, &predicate)
            .await;
    }

    /// `|sales - units * price * (1 - discount)| > tolerance`.
    async fn sales_consistency(&self, report: &mut ValidationReport, tolerance: f64) {
        let needed = [raw::SALES, raw::UNITS, raw::PRICE, raw::DISCOUNT];
        if let Some(missing) = needed.iter().find(|c| !self.has(c)) {
            self.skip_missing(report, Rule::SalesConsistency, missing);
            return;
        }
        let predicate = format!(
            "abs(CAST({s} AS DOUBLE) - CAST({u} AS DOUBLE) * CAST({p} AS DOUBLE) * (1 - CAST({d} AS DOUBLE))) > {tolerance}",
            s = quote_ident(raw::SALES),
            u = quote_ident(raw::UNITS),
            p = quote_ident(raw::PRICE),
            d = quote_ident(raw::DISCOUNT),
        );
        self.count(report, Rule::SalesConsistency, raw::SALES, &predicate)
            .await;
    }

    async fn count_required(
        &self,
        report: &mut ValidationReport,
        rule: Rule,
        column: &str,
        predicate: &str,
    ) {
        if self.has(column) {
            self.count(report, rule, column, predicate).await;
        } else {
            self.skip_missing(report, rule, column);
        }
    }

    async fn count(&self, report: &mut ValidationReport, rule: Rule, column: &str, predicate: &str) {
        match self.session.count_where(self.view, predicate).await {
            Ok(n) => self.record(report, column, rule, n),
            Err(e) => self.skip(report, rule, column, &e),
        }
    }

    fn record(&self, report: &mut ValidationReport, column: &str, rule: Rule, violations: u64) {
        if violations == 0 {
            return;
        }
        let message = describe(rule, column, violations, self.label);
        match rule.severity() {
            Severity::Warning => tracing::warn!(
                rule = ?rule,
                column,
                violations,
                dataset = self.label,
                "{message}"
            ),
            Severity::Error => tracing::error!(
                rule = ?rule,
                column,
                violations,
                dataset = self.label,
                "{message}"
            ),
        }
        report.findings.push(Finding::new(column, rule, violations));
    }

    fn skip(&self, report: &mut ValidationReport, rule: Rule, column: &str, error: &PipelineError) {
        tracing::warn!(
            rule = ?rule,
            column,
            dataset = self.label,
            error = %error,
            "{} check could not run",
            rule.tag()
        );
        report.skipped.push(format!("{} {column}", rule.tag()));
    }

    fn skip_missing(&self, report: &mut ValidationReport, rule: Rule, column: &str) {
        tracing::warn!(
            rule = ?rule,
            column,
            dataset = self.label,
            "{} skipped: column '{column}' is missing",
            rule.tag()
        );
        report.skipped.push(format!("{} {column}", rule.tag()));
    }
}

fn describe(rule: Rule, column: &str, n: u64, label: &str) -> String {
    let tag = rule.tag();
    match rule {
        Rule::NullCount => format!("{tag} Column '{column}' has {n} nulls in '{label}'."),
        Rule::Negative => {
            format!("{tag} Column '{column}' has {n} negative values in '{label}'.")
        }
        Rule::DiscountRange => format!(
            "{tag} Found {n} invalid discount values (not between {} and {}) in '{label}'.",
            DISCOUNT_RANGE.start(),
            DISCOUNT_RANGE.end()
        ),
        Rule::FlagDomain => {
            format!("{tag} Found {n} invalid values in '{column}' column in '{label}'.")
        }
        Rule::YearRange => format!("{tag} Found {n} invalid year values in '{label}'."),
        Rule::WeekRange => format!("{tag} Found {n} invalid week numbers in '{label}'."),
        Rule::SalesConsistency => {
            format!("{tag} Found {n} sales consistency mismatches in '{label}'.")
        }
    }
}

//! Severity classification and report rendering.

use std::io::Write;

use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::config::ScoreConfig;
use crate::core::Result;
use crate::score::{AggregateReport, ScopeFailure, ScoreEntry};

/// Severity of a scored scope relative to configured thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Dangerous,
    Moderate,
    Ok,
}

impl Severity {
    /// Classify a raw score. Pure function of the score and the thresholds;
    /// the scoring math never depends on it.
    pub fn classify(score: f64, config: &ScoreConfig) -> Self {
        if score >= config.dangerous_threshold {
            Self::Dangerous
        } else if score >= config.moderate_threshold {
            Self::Moderate
        } else {
            Self::Ok
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Dangerous => "dangerous",
            Self::Moderate => "moderate",
            Self::Ok => "ok",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One ranked entry joined with its severity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredScope {
    #[serde(flatten)]
    pub entry: ScoreEntry,
    pub severity: Severity,
}

/// The full render-ready report: ranked scopes, rollups, and the failures
/// captured during the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredReport {
    pub scopes: Vec<ScoredScope>,
    pub total_score: f64,
    pub average_score: f64,
    pub failures: Vec<ScopeFailure>,
}

impl ScoredReport {
    /// Join an aggregate with its failures, classifying every entry.
    pub fn new(
        report: AggregateReport,
        failures: Vec<ScopeFailure>,
        config: &ScoreConfig,
    ) -> Self {
        let scopes = report
            .entries
            .into_iter()
            .map(|entry| {
                let severity = Severity::classify(entry.raw_score, config);
                ScoredScope { entry, severity }
            })
            .collect();
        Self {
            scopes,
            total_score: report.total_score,
            average_score: report.average_score,
            failures,
        }
    }

    /// Number of scopes in the dangerous band.
    pub fn dangerous_count(&self) -> usize {
        self.scopes
            .iter()
            .filter(|scope| scope.severity == Severity::Dangerous)
            .count()
    }
}

/// Output format enum.
#[derive(Clone, Copy, Debug, Default)]
pub enum Format {
    #[default]
    Text,
    Json,
}

impl Format {
    /// Render a report to the writer.
    pub fn write<W: Write>(&self, report: &ScoredReport, writer: &mut W) -> Result<()> {
        match self {
            Format::Text => write_text(report, writer),
            Format::Json => write_json(report, writer),
        }
    }
}

fn write_json<W: Write>(report: &ScoredReport, writer: &mut W) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, report)?;
    writeln!(writer)?;
    Ok(())
}

fn write_text<W: Write>(report: &ScoredReport, writer: &mut W) -> Result<()> {
    writeln!(writer, "{:>8}  {:<9}  scope", "score", "severity")?;
    for scope in &report.scopes {
        // Pad before coloring so the ANSI codes do not break alignment.
        let label = format!("{:<9}", scope.severity.label());
        let label = match scope.severity {
            Severity::Dangerous => label.red().bold(),
            Severity::Moderate => label.yellow(),
            Severity::Ok => label.green(),
        };
        let location = scope
            .entry
            .span
            .map(|span| format!("  ({}-{})", span.start_line, span.end_line))
            .unwrap_or_default();
        writeln!(
            writer,
            "{:>8.1}  {}  {}{}",
            scope.entry.raw_score, label, scope.entry.scope_name, location
        )?;
    }

    writeln!(writer)?;
    writeln!(
        writer,
        "{} scopes, total {:.1}, average {:.1}",
        report.scopes.len(),
        report.total_score,
        report.average_score
    )?;

    if !report.failures.is_empty() {
        writeln!(writer)?;
        for failure in &report.failures {
            writeln!(writer, "{} {}: {}", "failed".red(), failure.scope, failure.message)?;
        }
    }
    Ok(())
}

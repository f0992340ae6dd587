//! CLI implementation using clap.

use std::fs;
use std::io::stdout;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use ignore::WalkBuilder;

use crate::adapter::{json, RubyAdapter};
use crate::config::Config;
use crate::core::ScopeRoot;
use crate::report::{Format, ScoredReport};
use crate::score::{aggregate, score_roots, ScopeFailure, Scorer};

/// Flay - flog-style complexity scoring for Ruby codebases.
#[derive(Parser)]
#[command(name = "flay")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the file or directory to analyze
    #[arg(short, long, default_value = ".")]
    pub path: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Score a pre-parsed JSON syntax-tree document instead of Ruby sources
    /// (use - for stdin)
    #[arg(long, value_name = "FILE")]
    pub ast: Option<PathBuf>,

    /// Exit non-zero when any scope scores in the dangerous band
    #[arg(long)]
    pub check: bool,
}

/// Output format choices.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Run the CLI: load config, gather roots, score, render, enforce --check.
pub fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load_default(&cli.path)?,
    };

    let scorer = Scorer::new(
        config.weights.build_table()?,
        config.weights.nesting_factor,
        config.weights.max_depth,
    );

    let (roots, mut failures) = match &cli.ast {
        Some(file) if file.as_os_str() == "-" => {
            (json::roots_from_reader(std::io::stdin().lock())?, Vec::new())
        }
        Some(file) => {
            let data = fs::read_to_string(file)
                .with_context(|| format!("reading syntax trees from {}", file.display()))?;
            (json::roots_from_json(&data)?, Vec::new())
        }
        None => parse_ruby_sources(&cli.path, &config)?,
    };

    let run = score_roots(&scorer, &roots, None)?;
    failures.extend(run.failures);
    let report = ScoredReport::new(aggregate(run.entries), failures, &config.score);

    let format = match cli.format {
        OutputFormat::Text => Format::Text,
        OutputFormat::Json => Format::Json,
    };
    format.write(&report, &mut stdout())?;

    if cli.check {
        let dangerous = report.dangerous_count();
        if dangerous > 0 {
            anyhow::bail!("{dangerous} scope(s) scored in the dangerous band");
        }
        if report.scopes.is_empty() && !report.failures.is_empty() {
            anyhow::bail!("every input failed to score");
        }
    }
    Ok(())
}

/// Parse every Ruby file under `path`, capturing per-file failures instead of
/// aborting the run.
fn parse_ruby_sources(
    path: &Path,
    config: &Config,
) -> anyhow::Result<(Vec<ScopeRoot>, Vec<ScopeFailure>)> {
    let files = ruby_files(path, &config.exclude_patterns)?;
    let adapter = RubyAdapter::new();
    let mut roots = Vec::with_capacity(files.len());
    let mut failures = Vec::new();
    for file in files {
        match adapter.parse_file(&file) {
            Ok(root) => roots.push(root),
            Err(err) => failures.push(ScopeFailure {
                scope: file.display().to_string(),
                message: err.to_string(),
            }),
        }
    }
    Ok((roots, failures))
}

/// Collect Ruby source files, respecting .gitignore and the configured
/// exclude globs. Sorted for deterministic ordering.
fn ruby_files(path: &Path, exclude_patterns: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut excludes = globset::GlobSetBuilder::new();
    for pattern in exclude_patterns {
        let glob = globset::Glob::new(pattern)
            .with_context(|| format!("invalid exclude pattern: {pattern}"))?;
        excludes.add(glob);
    }
    let excludes = excludes.build()?;

    let walker = WalkBuilder::new(path)
        .hidden(true)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .build();

    let mut files = Vec::new();
    for entry in walker.flatten() {
        let entry_path = entry.path();
        if entry_path.is_dir() || !is_ruby(entry_path) {
            continue;
        }
        if excludes.is_match(entry_path) {
            continue;
        }
        files.push(entry_path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

fn is_ruby(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext, "rb" | "rake" | "gemspec"))
}

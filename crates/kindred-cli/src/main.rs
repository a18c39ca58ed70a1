// SPDX-License-Identifier: AGPL-3.0-or-later
//! Kindred CLI - parse, check, lay out and re-format genealogy files
//!
//! JSON goes to stdout; logs go to stderr and are filtered with `RUST_LOG`
//! (default `warn`, `--verbose` raises it to `debug`).

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser as ClapParser, Subcommand};
use kindred_core::{
    compute_layout, GedcomHandler, LayoutConfig, ParseConfig, ParseOutcome, Parser, RenderConfig,
    Renderer,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(ClapParser, Debug)]
#[command(name = "kindred", version, about = "Genealogy file parsing and family tree layout")]
struct Cli {
    /// Log parser and layout decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Skip the permissive union recovery pass
    #[arg(long, global = true)]
    no_recovery: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the parsed graph and its diagnostics as JSON
    Parse { file: PathBuf },
    /// Print diagnostics; exits non-zero when there are any
    Check { file: PathBuf },
    /// Print computed coordinates as JSON
    Layout(LayoutArgs),
    /// Print the graph back in normalised line format
    Format { file: PathBuf },
}

#[derive(Args, Debug)]
struct LayoutArgs {
    file: PathBuf,

    /// TOML file with layout settings; flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Lay out this person's ancestors only
    #[arg(long)]
    focal: Option<String>,

    #[arg(long)]
    generations: Option<usize>,

    #[arg(long)]
    h_gap: Option<f64>,

    #[arg(long)]
    v_gap: Option<f64>,

    #[arg(long)]
    node_size: Option<f64>,
}

impl LayoutArgs {
    fn resolve_config(&self) -> Result<LayoutConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading layout config {}", path.display()))?;
                toml::from_str(&text)
                    .with_context(|| format!("parsing layout config {}", path.display()))?
            }
            None => LayoutConfig::default(),
        };
        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut LayoutConfig) {
        if let Some(focal) = &self.focal {
            config.focal = Some(focal.clone());
        }
        if let Some(generations) = self.generations {
            config.max_generations = generations;
        }
        if let Some(gap) = self.h_gap {
            config.horizontal_gap = gap;
        }
        if let Some(gap) = self.v_gap {
            config.vertical_gap = gap;
        }
        if let Some(size) = self.node_size {
            config.node_size = size;
        }
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

fn parse_file(path: &Path, config: &ParseConfig) -> Result<ParseOutcome> {
    let input = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let outcome = GedcomHandler::new().parse(&input, config);
    tracing::info!(
        file = %path.display(),
        people = outcome.graph.people.len(),
        unions = outcome.graph.unions.len(),
        diagnostics = outcome.diagnostics.len(),
        "parsed"
    );
    Ok(outcome)
}

fn run(cli: Cli) -> Result<ExitCode> {
    let parse_config = ParseConfig {
        structural_recovery: !cli.no_recovery,
        ..ParseConfig::default()
    };

    match cli.command {
        Command::Parse { file } => {
            let outcome = parse_file(&file, &parse_config)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Command::Check { file } => {
            let outcome = parse_file(&file, &parse_config)?;
            for diagnostic in &outcome.diagnostics {
                println!("{diagnostic}");
            }
            if !outcome.diagnostics.is_empty() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Layout(args) => {
            let config = args.resolve_config()?;
            let outcome = parse_file(&args.file, &parse_config)?;
            let layout = compute_layout(&outcome.graph, &config)?;
            println!("{}", serde_json::to_string_pretty(&layout)?);
        }
        Command::Format { file } => {
            let outcome = parse_file(&file, &parse_config)?;
            let text = GedcomHandler::new().render(&outcome.graph, &RenderConfig::default())?;
            print!("{text}");
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    run(cli)
}

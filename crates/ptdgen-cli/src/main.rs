//! ptdgen CLI - Protocol Tracking Document generator
//!
//! Builds the schedule grid from visit and form tables, grafts it into a PTD
//! template workbook together with the study-specific forms sheet, and
//! formats the result.

mod diagnostics;
mod output;
mod pipeline;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use ptdgen_core::{PtdConfig, Severity};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use diagnostics::{ExitCode, TerminalEmitter};
use pipeline::{GraftInputs, GridInputs};

#[derive(Parser)]
#[command(name = "ptdgen")]
#[command(author, version, about = "Protocol Tracking Document generator", long_about = None)]
struct Cli {
    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Layout/graft configuration file (JSON or TOML)
    #[arg(short, long, global = true, env = "PTDGEN_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Template and output flags shared by `graft` and `build`
#[derive(clap::Args)]
struct TemplateArgs {
    /// PTD template workbook
    #[arg(long, value_name = "XLSX")]
    template: PathBuf,

    /// Study-specific forms workbook (first sheet is grafted)
    #[arg(long, value_name = "XLSX")]
    study_forms: PathBuf,

    /// Output workbook. Omit when using --inplace
    #[arg(short, long, value_name = "XLSX")]
    out: Option<PathBuf>,

    /// Save over --template
    #[arg(long)]
    inplace: bool,

    /// Values-only copy with header styling; skips post-formatting
    #[arg(long)]
    fast: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the schedule grid workbook
    Grid {
        /// Visit table (CSV or spreadsheet)
        #[arg(long, value_name = "FILE")]
        visits: PathBuf,

        /// Forms table (CSV or spreadsheet)
        #[arg(long, value_name = "FILE")]
        forms: PathBuf,

        /// Output workbook
        #[arg(short, long, value_name = "XLSX")]
        out: PathBuf,
    },

    /// Graft a schedule grid and forms workbook into a template
    Graft {
        /// Schedule grid workbook (first sheet is grafted)
        #[arg(long, value_name = "XLSX")]
        schedule: PathBuf,

        #[command(flatten)]
        template: TemplateArgs,
    },

    /// Build the schedule grid and graft it into a template
    Build {
        /// Visit table (CSV or spreadsheet)
        #[arg(long, value_name = "FILE")]
        visits: PathBuf,

        /// Forms table (CSV or spreadsheet)
        #[arg(long, value_name = "FILE")]
        forms: PathBuf,

        #[command(flatten)]
        template: TemplateArgs,
    },
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let threshold = if cli.quiet {
        Severity::Error
    } else if cli.verbose > 0 {
        Severity::Info
    } else {
        Severity::Warning
    };
    let mut emitter = TerminalEmitter::stderr(threshold);
    let config = ptdgen_parser::load_config(cli.config.as_deref());

    let code = match run(cli.command, &config, &mut emitter) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::Failure
        }
    };
    emitter.finish();
    code.into()
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(
    command: Commands,
    config: &PtdConfig,
    emitter: &mut TerminalEmitter<std::io::Stderr>,
) -> Result<ExitCode> {
    match command {
        Commands::Grid { visits, forms, out } => {
            let inputs = GridInputs {
                visits: &visits,
                forms: &forms,
            };
            let written = pipeline::run_grid(&inputs, &out, config, emitter)?;
            println!("Schedule grid written to: {}", output::absolute(&written).display());
        }
        Commands::Graft { schedule, template } => {
            let Some(out) = output_path(&template) else {
                return Ok(ExitCode::Usage);
            };
            let inputs = GraftInputs {
                template: &template.template,
                schedule: &schedule,
                study_forms: &template.study_forms,
                fast: template.fast,
            };
            let written = pipeline::run_graft(&inputs, &out, config, emitter)?;
            print_success(&written);
        }
        Commands::Build {
            visits,
            forms,
            template,
        } => {
            let Some(out) = output_path(&template) else {
                return Ok(ExitCode::Usage);
            };
            let grid = GridInputs {
                visits: &visits,
                forms: &forms,
            };
            let written = pipeline::run_build(
                &grid,
                &template.template,
                &template.study_forms,
                template.fast,
                &out,
                config,
                emitter,
            )?;
            print_success(&written);
        }
    }
    Ok(ExitCode::Success)
}

/// Resolve the output path, printing the usage error when there is none
fn output_path(args: &TemplateArgs) -> Option<PathBuf> {
    match output::resolve_output(args.out.as_deref(), args.inplace, &args.template) {
        Ok(path) => Some(path),
        Err(message) => {
            eprintln!("Error: {message}");
            None
        }
    }
}

fn print_success(path: &Path) {
    println!("Combined PTD file written successfully to: {}", path.display());
}

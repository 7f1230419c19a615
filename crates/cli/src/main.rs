mod commands;
mod config;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Table-driven LR parser runner.
#[derive(Parser)]
#[command(name = "lrtable", version, about = "Table-driven LR parser runner")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Log every shift, reduce and goto to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a TOML config file (default: ./lrtable.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a token sequence through a parse table
    Parse {
        /// Path to the parse-table JSON document
        table: PathBuf,
        /// Whitespace-separated tokens; the end marker is appended
        input: String,
        /// Path to an override table JSON document
        #[arg(long)]
        overrides: Option<PathBuf>,
        /// Ignore any override table, including one named in the config
        #[arg(long, conflicts_with = "overrides")]
        no_overrides: bool,
        /// Print every step of the run
        #[arg(long)]
        trace: bool,
    },

    /// List the conflict cells of a parse table
    Conflicts {
        /// Path to the parse-table JSON document
        table: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            report_error(&format!("config error: {}", e), cli.output, cli.quiet);
            process::exit(1);
        }
    };

    match cli.command {
        Commands::Parse {
            table,
            input,
            overrides,
            no_overrides,
            trace,
        } => {
            let overrides = if no_overrides {
                None
            } else {
                overrides.or_else(|| config.parser.overrides.clone())
            };
            commands::parse::cmd_parse(commands::parse::ParseOptions {
                table: &table,
                input: &input,
                overrides: overrides.as_deref(),
                settings: &config.parser,
                trace,
                output: cli.output,
                quiet: cli.quiet,
            });
        }
        Commands::Conflicts { table } => {
            commands::conflicts::cmd_conflicts(&table, cli.output, cli.quiet);
        }
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}

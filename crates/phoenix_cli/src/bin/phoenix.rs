//! Phoenix CLI entry point.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;

use phoenix_cli::commands::{self, OutputFormat};
use phoenix_cli::Repl;
use phoenix_compiler::CompilerConfig;
use phoenix_foundation::{Error, ErrorKind, Result};
use phoenix_parser::{ParserConfig, PhoenixParser};

#[derive(Parser)]
#[command(name = "phoenix")]
#[command(version, about = "Compile frame grammars and parse sentences against them")]
struct Cli {
    /// More log output; repeat for more detail
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile <DIR>/<NAME>.gra into <DIR>/<NAME>.net
    Compile {
        /// Grammar directory
        dir: PathBuf,
        /// Grammar name
        name: String,
        /// Option override, e.g. `-o MAXNFA=20000`
        #[arg(short = 'o', long = "option", value_name = "NAME=VALUE")]
        options: Vec<String>,
    },
    /// Parse sentences against a compiled grammar
    Parse(ParseArgs),
    /// Recompute the concept leaf flags of a net file
    Leaves {
        /// The `.net` file to rewrite
        net_file: PathBuf,
    },
    /// Print the default parser options as JSON
    Config,
}

#[derive(Args)]
struct ParseArgs {
    /// Grammar directory
    dir: PathBuf,
    /// Grammar name
    name: String,
    /// Frame definitions file
    #[arg(long)]
    frames: Option<PathBuf>,
    /// Net priorities file
    #[arg(long)]
    priorities: Option<PathBuf>,
    /// Options file, one `NAME VALUE` per line
    #[arg(long = "options", value_name = "FILE")]
    options_file: Option<PathBuf>,
    /// Option override, e.g. `-o MAX_PARSES=3`
    #[arg(short = 'o', long = "option", value_name = "NAME=VALUE")]
    options: Vec<String>,
    /// Print extracts instead of trees
    #[arg(long, conflicts_with = "json")]
    extract: bool,
    /// Print outcomes as JSON
    #[arg(long)]
    json: bool,
    /// Read sentences from a file instead of stdin
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Start the interactive REPL
    #[arg(long, conflicts_with = "input")]
    interactive: bool,
}

impl ParseArgs {
    fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else if self.extract {
            OutputFormat::Extracts
        } else {
            OutputFormat::Full
        }
    }

    fn parser_config(&self, verbose: u8) -> Result<ParserConfig> {
        let mut config = ParserConfig::default();
        if let Some(path) = &self.options_file {
            config.load_options(path)?;
        }
        for option in &self.options {
            let (name, value) = split_option(option)?;
            config.set_option(name, value)?;
        }
        config.verbose = config.verbose.max(verbose.saturating_add(1));
        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: LevelFilter) {
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Compile { dir, name, options } => {
            init_logging(verbosity(cli.verbose));
            let mut config = CompilerConfig::default();
            for option in &options {
                let (key, value) = split_option(option)?;
                config.set_option(key, value)?;
            }
            let compilation = commands::compile(&dir, &name, &config)?;
            let errors = compilation.report.errors().count();
            println!(
                "{} nets compiled, {} warnings, {errors} errors",
                compilation.nets.len(),
                compilation.report.warnings().count()
            );
            Ok(())
        }
        Command::Parse(args) => {
            let config = args.parser_config(cli.verbose)?;
            init_logging(config.log_level());
            let grammar = commands::load_grammar(
                &args.dir,
                &args.name,
                args.frames.clone(),
                args.priorities.clone(),
                &config,
            )?;
            let format = args.format();
            let mut parser = PhoenixParser::new(&grammar, config);

            if args.interactive {
                return Repl::new(parser)?.with_format(format).run();
            }
            let stdout = io::stdout();
            let mut output = stdout.lock();
            let count = match &args.input {
                Some(path) => {
                    let file = File::open(path).map_err(|e| Error::io(path, e))?;
                    commands::parse_lines(&mut parser, BufReader::new(file), &mut output, format)?
                }
                None => commands::parse_lines(&mut parser, io::stdin().lock(), &mut output, format)?,
            };
            log::info!("parsed {count} sentences");
            Ok(())
        }
        Command::Leaves { net_file } => {
            init_logging(verbosity(cli.verbose));
            let leaves = commands::recompute_leaves(&net_file)?;
            println!("{leaves} concept leaves");
            Ok(())
        }
        Command::Config => {
            let json = serde_json::to_string_pretty(&ParserConfig::default())
                .map_err(|e| Error::new(ErrorKind::Internal(e.to_string())))?;
            println!("{json}");
            Ok(())
        }
    }
}

/// Warnings are on by default, like the parser's own verbosity.
fn verbosity(verbose: u8) -> LevelFilter {
    ParserConfig {
        verbose: verbose.saturating_add(1),
        ..ParserConfig::default()
    }
    .log_level()
}

fn split_option(option: &str) -> Result<(&str, &str)> {
    option
        .split_once('=')
        .map(|(name, value)| (name.trim(), value.trim()))
        .ok_or_else(|| Error::invalid_option(option, "expected NAME=VALUE"))
}

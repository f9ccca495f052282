use clap::Parser as ClapParser;
use horizon::compiler::{compile_files, CompilationUnit};
use horizon::config::Config;
use horizon::error::CompilerError;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(ClapParser)]
#[command(author, version, about = "Horizon language front-end")]
struct Cli {
    /// Source files to compile (only the first one is evaluated)
    files: Vec<PathBuf>,

    /// Enable debug logging and every dump
    #[arg(short, long)]
    debug: bool,

    /// Print the token stream as JSON
    #[arg(long)]
    show_tokens: bool,

    /// Print the syntax tree as JSON
    #[arg(long)]
    show_trees: bool,

    /// Print the evaluated values as JSON
    #[arg(long)]
    show_values: bool,

    /// Read options from this file instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("HORIZON_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config, CompilerError> {
    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_env();
    config.enable(cli.debug, cli.show_tokens, cli.show_trees, cli.show_values);
    Ok(config)
}

fn dump<T: Serialize>(unit: &CompilationUnit, value: &T) -> Result<(), CompilerError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| CompilerError::IO {
        path: unit.path.clone(),
        source: source.into(),
    })?;

    println!("({})", unit.path.display());
    println!("{}", json);
    Ok(())
}

fn run(cli: &Cli, config: &Config) -> Result<(), CompilerError> {
    let units = compile_files(&cli.files)?;

    for unit in &units {
        debug!(
            "{}: {} tokens, {} statements, {} values",
            unit.path.display(),
            unit.tokens.len(),
            unit.tree.body.len(),
            unit.values.len()
        );

        if config.dump_tokens() {
            dump(unit, &unit.tokens)?;
        }
        if config.dump_trees() {
            dump(unit, &unit.tree)?;
        }
        if config.dump_values() {
            dump(unit, &unit.values)?;
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(error) => {
            init_logging(cli.debug);
            eprintln!("{}", error);
            return ExitCode::FAILURE;
        }
    };
    init_logging(config.debug);

    if cli.files.is_empty() {
        println!("Horizon v{}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{}", error);
            ExitCode::FAILURE
        }
    }
}

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use cypher::{EvalConfig, SourceFile, StdHost, DEFAULT_MAX_CALL_DEPTH};
use log::{debug, info, LevelFilter};
use simple_logger::SimpleLogger;

const SAMPLE: &str = include_str!("sample.cyp");

#[derive(Parser, Debug)]
#[command(version, about = "Run a Cypher program", long_about = None)]
pub struct Config {
    /// Program to run. Runs a built-in sample when omitted.
    pub input: Option<PathBuf>,

    /// Print failures as JSON diagnostics
    #[arg(long)]
    pub json: bool,

    /// Maximum depth of nested function calls
    #[arg(long, default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    pub max_depth: usize,

    /// Log more (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Config {
    fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn main() -> ExitCode {
    let config = Config::parse();

    if let Err(e) = SimpleLogger::new().with_level(config.log_level()).init() {
        eprintln!("could not start logging: {e}");
    }

    let source = match &config.input {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(text) => SourceFile::new(path.display().to_string(), text),
            Err(e) => {
                println!("Error: could not read {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => {
            info!("no input file, running the built-in sample");
            SourceFile::new("<sample>", SAMPLE)
        }
    };

    debug!("running {} ({} lines)", source.name, source.line_count());
    let eval_config = EvalConfig::default().with_max_call_depth(config.max_depth);
    match cypher::run_with(&source.source, &mut StdHost, eval_config) {
        Ok(value) => {
            if let Some(value) = value {
                info!("program returned {value}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            report(&config, &source, &e);
            ExitCode::FAILURE
        }
    }
}

fn report(config: &Config, source: &SourceFile, error: &cypher::Error) {
    if !config.json {
        println!("Error: {error}");
        return;
    }
    match serde_json::to_string_pretty(&error.to_diagnostic(source)) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            debug!("diagnostic serialization failed: {e}");
            println!("Error: {error}");
        }
    }
}

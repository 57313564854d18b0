use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use data_filter::cli::run_repl;
use data_filter::config::Config;
use data_filter::session::Session;

#[derive(Parser, Debug)]
#[command(name = "data-filter", version, about = "Interactively filter, sort and summarize CSV, JSON and XML data")]
struct Args {
    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,

    /// File to load before the prompt appears
    file: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let config = match &args.config {
        Some(path) => Config::load(path).with_context(|| format!("invalid config {}", path.display()))?,
        None => Config::default(),
    };

    let mut session = Session::new(config);
    if let Some(file) = &args.file {
        match session.load(file) {
            Ok(message) => println!("{message}"),
            Err(err) => eprintln!("error: {err:#}"),
        }
    }

    let stdin = io::stdin();
    run_repl(&mut session, stdin.lock(), io::stdout())
}

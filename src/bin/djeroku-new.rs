use anyhow::Result;
use clap::Parser;

use djeroku::config;
use djeroku::project;

#[derive(Parser)]
#[command(
    name = "djeroku-new",
    version,
    about = "Creates a new django project skeleton, a virtualenv, and a \
             djeroku.toml ready for `djeroku heroku_setup`"
)]
struct Cli {
    /// Name for the new project
    project_name: String,

    /// Increase output verbosity
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    if cli.verbose {
        eprintln!("[debug] log level set to debug");
    }

    let cwd = std::env::current_dir()?;
    let config = config::load(&cwd)?;
    project::create_project(&cwd, &cli.project_name, &config, cli.verbose)
}

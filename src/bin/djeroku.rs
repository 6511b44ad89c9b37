use anyhow::Result;

use djeroku::commands;
use djeroku::config;
use djeroku::registry::CommandContext;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let registry = commands::builtin()?;

    // Dispatch is by command name, not clap: the first argument picks a
    // registry entry and everything after it goes to the handler untouched.
    let command_name = args.first().map(String::as_str).unwrap_or("usage");
    if matches!(command_name, "-h" | "--help" | "usage") {
        print!("{}", commands::usage_text(&registry));
        return Ok(());
    }

    let config = config::load(&std::env::current_dir()?)?;
    let ctx = CommandContext {
        registry: &registry,
        config: &config,
    };

    let command = registry.resolve(command_name)?;
    (command.handler)(&ctx, &args[1..])
}

//! Corvid CLI - encode, decode and sign from the command line.

mod commands;
mod output;
mod telemetry;

use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = commands::Cli::parse();
    telemetry::init_telemetry(&cli.log_level, cli.json_logs)?;

    let result = match commands::load_config(cli.config.as_deref()) {
        Ok(config) => commands::execute(cli.command, &config).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(value) => println!("{}", output::render(&value)),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

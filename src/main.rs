use clap::Parser;
use opvault::cli::{Cli, Commands};

/// Environment variable holding the log filter (e.g. `debug`, `opvault=trace`).
const LOG_ENV: &str = "OPVAULT_LOG";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => opvault::cli::commands::init::execute(&cli),
        Commands::Add {
            ref title,
            ref username,
            ref url,
            ref password,
            ref notes,
        } => opvault::cli::commands::add::execute(
            &cli,
            title,
            username,
            url,
            password.as_deref(),
            notes,
        ),
        Commands::Note {
            ref title,
            ref body,
        } => opvault::cli::commands::note::execute(&cli, title, body),
        Commands::List => opvault::cli::commands::list::execute(&cli),
        Commands::Show { ref uuid, reveal } => {
            opvault::cli::commands::show::execute(&cli, uuid, reveal)
        }
        Commands::Verify => opvault::cli::commands::verify::execute(&cli),
        Commands::Generate {
            length,
            digits,
            symbols,
        } => opvault::cli::commands::generate::execute(length, digits, symbols),
    };

    if let Err(e) = result {
        opvault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}

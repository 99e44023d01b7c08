mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use opnshaper_core::{Shaper, ShaperConfig};

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);
    output::init_color(&cli.global.color);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a firewall connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "opnshaper", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let shaper_config = build_shaper_config(&cli.global)?;
            let shaper = Shaper::connect(&shaper_config)?
                .with_auto_commit(!cli.global.no_reconfigure);

            tracing::debug!(command = ?cmd, url = %shaper_config.url, "dispatching command");
            commands::dispatch(cmd, &shaper, &cli.global).await
        }
    }
}

/// Build a `ShaperConfig` from the config file, profile, and CLI overrides.
fn build_shaper_config(global: &cli::GlobalOpts) -> Result<ShaperConfig, CliError> {
    let cfg = config::load_config_or_default();
    let profile_name = config::active_profile_name(global, &cfg);

    if let Some(profile) = cfg.profiles.get(&profile_name) {
        return config::resolve_profile(profile, &profile_name, global, &cfg.defaults);
    }

    // A profile named explicitly must exist
    if global.profile.is_some() {
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: cfg.available_profiles(),
        });
    }

    config::from_flags(global, &profile_name, &cfg.defaults)
}

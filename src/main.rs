use anyhow::Result;
use clap::Parser;
use codemask::cli::{Cli, Commands};
use codemask::commands::{self, ObfuscateConfig};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Obfuscate {
            path,
            output,
            mapping,
            mapping_format,
            strategy,
            prefix,
            seed,
            force,
            no_cache,
            dry_run,
            jobs,
            quiet,
            verbosity,
        } => {
            let config = ObfuscateConfig {
                path,
                output,
                mapping,
                mapping_format,
                strategy,
                prefix,
                seed,
                force,
                no_cache,
                dry_run,
                jobs,
                quiet,
                verbosity,
            };
            commands::handle_obfuscate(config)?;
            Ok(())
        }
        Commands::Init { force } => commands::init_config(force),
        Commands::Clean { path } => commands::clean_cache(&path),
    }
}

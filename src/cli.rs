use crate::naming::NamingStrategy;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MappingFormatArg {
    Json,
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "codemask")]
#[command(about = "Identifier obfuscator for Objective-C and Swift codebases", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Obfuscate identifiers across a project
    Obfuscate {
        /// Project root to process
        path: PathBuf,

        /// Write transformed files into this directory instead of in place
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Mapping export file (defaults to the configured path, if any)
        #[arg(long = "mapping")]
        mapping: Option<PathBuf>,

        /// Mapping export format
        #[arg(long = "mapping-format", value_enum)]
        mapping_format: Option<MappingFormatArg>,

        /// Naming strategy
        #[arg(long, value_enum)]
        strategy: Option<NamingStrategy>,

        /// Prefix for the prefix and pattern strategies
        #[arg(long)]
        prefix: Option<String>,

        /// Seed for reproducible name generation
        #[arg(long)]
        seed: Option<u64>,

        /// Reprocess every file, ignoring the incremental cache
        #[arg(short, long)]
        force: bool,

        /// Skip loading and persisting the incremental cache
        #[arg(long = "no-cache")]
        no_cache: bool,

        /// Run the whole pipeline without writing any file
        #[arg(long = "dry-run")]
        dry_run: bool,

        /// Number of worker threads (defaults to the number of cores)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,

        /// Increase verbosity level (can be repeated: -v, -vv)
        #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
        verbosity: u8,
    },

    /// Create a .codemask.toml configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Remove a project's incremental cache
    Clean {
        /// Project root holding the cache
        path: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obfuscate_parses_with_defaults() {
        let cli = Cli::try_parse_from(["codemask", "obfuscate", "."]).unwrap();
        match cli.command {
            Commands::Obfuscate {
                path,
                force,
                no_cache,
                dry_run,
                ..
            } => {
                assert_eq!(path, PathBuf::from("."));
                assert!(!force);
                assert!(!no_cache);
                assert!(!dry_run);
            }
            _ => panic!("expected obfuscate"),
        }
    }

    #[test]
    fn strategy_and_seed_flags_parse() {
        let cli = Cli::try_parse_from([
            "codemask",
            "obfuscate",
            ".",
            "--strategy",
            "prefix",
            "--prefix",
            "XY",
            "--seed",
            "42",
            "-vv",
        ])
        .unwrap();
        match cli.command {
            Commands::Obfuscate {
                strategy,
                prefix,
                seed,
                verbosity,
                ..
            } => {
                assert_eq!(strategy, Some(NamingStrategy::Prefix));
                assert_eq!(prefix.as_deref(), Some("XY"));
                assert_eq!(seed, Some(42));
                assert_eq!(verbosity, 2);
            }
            _ => panic!("expected obfuscate"),
        }
    }

    #[test]
    fn clean_requires_a_path() {
        assert!(Cli::try_parse_from(["codemask", "clean"]).is_err());
        assert!(Cli::try_parse_from(["codemask", "clean", "."]).is_ok());
    }
}

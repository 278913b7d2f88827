use crate::io;
use anyhow::Result;
use std::path::PathBuf;

pub fn init_config(force: bool) -> Result<()> {
    let config_path = PathBuf::from(".codemask.toml");

    if config_path.exists() && !force {
        anyhow::bail!("Configuration file already exists. Use --force to overwrite.");
    }

    let default_config = r#"# Codemask Configuration

[naming]
strategy = "random"      # random | prefix | pattern | dictionary
prefix = "CM"
min_length = 8
max_length = 16
# pattern = "{prefix}{type}{index}"
# seed = 42
# deterministic = true

[whitelist]
names = []
prefixes = []
use_system_defaults = true

[ignore]
patterns = [
    "Pods/**",
    "Carthage/**",
    "**/*.generated.swift"
]

[output]
# directory = "obfuscated"
# mapping_file = "mapping.json"
# mapping_format = "json"
"#;

    io::write_file(&config_path, default_config)?;
    println!("Created .codemask.toml configuration file");

    Ok(())
}

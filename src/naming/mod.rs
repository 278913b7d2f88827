//! Replacement-name generation.
//!
//! The generator is the sequential barrier of the pipeline: it must see the
//! fully merged, ordered symbol set before issuing names, because every
//! choice depends on the names already issued and, in deterministic mode, on
//! the draw order of the seeded RNG.

pub mod table;

pub use table::{MappingEntry, RenameMap, SymbolTable};

use crate::core::{CodemaskError, CodemaskResult, SymbolKind};
use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Curated words for the dictionary strategy
const DICTIONARY: &[&str] = &[
    "Amber", "Anchor", "Aspen", "Atlas", "Aurora", "Basil", "Beacon", "Birch", "Bolt", "Breeze",
    "Brook", "Canyon", "Cedar", "Cinder", "Cliff", "Cloud", "Comet", "Coral", "Crest", "Delta",
    "Drift", "Dune", "Ember", "Fable", "Falcon", "Fern", "Flint", "Frost", "Gale", "Glacier",
    "Grove", "Harbor", "Hazel", "Heron", "Ivory", "Jasper", "Juniper", "Kestrel", "Lagoon",
    "Larch", "Lumen", "Maple", "Meadow", "Mesa", "Mistral", "Nimbus", "Oasis", "Onyx", "Opal",
    "Orchid", "Osprey", "Pebble", "Pine", "Quartz", "Raven", "Reef", "Ridge", "Sable", "Sage",
    "Sierra", "Slate", "Summit", "Tarn", "Thicket", "Tundra", "Vale", "Walnut", "Willow", "Wren",
    "Zephyr",
];

/// How replacement names are produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NamingStrategy {
    /// Letters only, length sampled uniformly in `[min_length, max_length]`
    #[default]
    Random,
    /// `<prefix><counter>`
    Prefix,
    /// Template with `{prefix}`, `{type}`, `{index}` tokens
    Pattern,
    /// Words drawn from a curated list
    Dictionary,
}

/// `[naming]` section of the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingConfig {
    #[serde(default)]
    pub strategy: NamingStrategy,
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_min_length")]
    pub min_length: usize,
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    /// Template for the pattern strategy
    #[serde(default)]
    pub pattern: Option<String>,
    /// Require reproducible output; rejected without a seed
    #[serde(default)]
    pub deterministic: bool,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            strategy: NamingStrategy::Random,
            prefix: default_prefix(),
            min_length: default_min_length(),
            max_length: default_max_length(),
            pattern: None,
            deterministic: false,
            seed: None,
        }
    }
}

impl NamingConfig {
    /// Reject invalid naming settings before any file is touched
    pub fn validate(&self) -> CodemaskResult<()> {
        if self.min_length == 0 {
            return Err(CodemaskError::Config(
                "naming.min_length must be at least 1".to_string(),
            ));
        }
        if self.min_length > self.max_length {
            return Err(CodemaskError::Config(format!(
                "naming.min_length ({}) exceeds naming.max_length ({})",
                self.min_length, self.max_length
            )));
        }
        if self.strategy == NamingStrategy::Prefix && self.prefix.is_empty() {
            return Err(CodemaskError::Config(
                "prefix strategy requires a non-empty naming.prefix".to_string(),
            ));
        }
        if self.strategy == NamingStrategy::Pattern {
            let pattern = self.pattern.as_deref().unwrap_or("");
            if !pattern.contains("{index}") {
                return Err(CodemaskError::Config(
                    "pattern strategy requires naming.pattern containing {index}".to_string(),
                ));
            }
        }
        if self.deterministic && self.seed.is_none() {
            return Err(CodemaskError::Config(
                "deterministic mode requires naming.seed".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_prefix() -> String {
    "CM".to_string()
}

fn default_min_length() -> usize {
    8
}

fn default_max_length() -> usize {
    16
}

/// Issues unique replacement names, one per original name, append-only
/// within a run.
pub struct NameGenerator {
    config: NamingConfig,
    rng: StdRng,
    issued: HashSet<String>,
    /// Original project names the generator must never collide with
    reserved: HashSet<String>,
    counter: usize,
}

impl NameGenerator {
    pub fn new(config: &NamingConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config: config.clone(),
            rng,
            issued: HashSet::new(),
            reserved: HashSet::new(),
            counter: 0,
        }
    }

    /// Register names the generator must avoid producing
    pub fn reserve<I: IntoIterator<Item = String>>(&mut self, names: I) {
        self.reserved.extend(names);
    }

    /// Produce the next unique replacement name for a symbol of `kind`
    pub fn next_name(&mut self, kind: SymbolKind) -> String {
        loop {
            let candidate = self.candidate(kind);
            if !self.issued.contains(&candidate) && !self.reserved.contains(&candidate) {
                self.issued.insert(candidate.clone());
                return candidate;
            }
            // Collision: counter-based strategies advance, random draws again
            self.counter += 1;
        }
    }

    fn candidate(&mut self, kind: SymbolKind) -> String {
        match self.config.strategy {
            NamingStrategy::Random => self.random_name(),
            NamingStrategy::Prefix => {
                let name = format!("{}{}", self.config.prefix, self.counter);
                self.counter += 1;
                name
            }
            NamingStrategy::Pattern => {
                let pattern = self.config.pattern.as_deref().unwrap_or("{prefix}{index}");
                let name = pattern
                    .replace("{prefix}", &self.config.prefix)
                    .replace("{type}", kind.display_name())
                    .replace("{index}", &self.counter.to_string());
                self.counter += 1;
                name
            }
            NamingStrategy::Dictionary => self.dictionary_name(),
        }
    }

    fn random_name(&mut self) -> String {
        let length = self
            .rng
            .gen_range(self.config.min_length..=self.config.max_length);
        (0..length)
            .map(|_| {
                let letters = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
                letters[self.rng.gen_range(0..letters.len())] as char
            })
            .collect()
    }

    fn dictionary_name(&mut self) -> String {
        let first = DICTIONARY[self.rng.gen_range(0..DICTIONARY.len())];
        let second = DICTIONARY[self.rng.gen_range(0..DICTIONARY.len())];
        if first == second {
            format!("{first}{}", self.counter)
        } else {
            format!("{first}{second}")
        }
    }
}

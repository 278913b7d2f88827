//! The obfuscate command: discover, classify, parse, rename, transform.
//!
//! The rename map is regenerated from the current symbol set on every run;
//! there is no persisted name mapping. On an incremental run only Added and
//! Modified files are transformed, so renames that newly affect unchanged
//! files require `--force`. Supplying a seed makes independent runs agree
//! on the generated names.

use crate::cache::{ChangeSet, IncrementalCache};
use crate::cli::MappingFormatArg;
use crate::config::CodemaskConfig;
use crate::core::{ParsedFile, RunSummary, TransformResult};
use crate::io::output::MappingFormat;
use crate::io::{self, create_mapping_writer, walker};
use crate::naming::{NamingStrategy, RenameMap, SymbolTable};
use crate::parsers;
use crate::progress::{ProgressConfig, ProgressManager, TEMPLATE_PARSE, TEMPLATE_TRANSFORM};
use crate::transform::CodeTransformer;
use anyhow::{Context, Result};
use chrono::Utc;
use colored::*;
use indicatif::ParallelProgressIterator;
use rayon::prelude::*;
use serde_json::json;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub struct ObfuscateConfig {
    pub path: PathBuf,
    pub output: Option<PathBuf>,
    pub mapping: Option<PathBuf>,
    pub mapping_format: Option<MappingFormatArg>,
    pub strategy: Option<NamingStrategy>,
    pub prefix: Option<String>,
    pub seed: Option<u64>,
    pub force: bool,
    pub no_cache: bool,
    pub dry_run: bool,
    pub jobs: Option<usize>,
    pub quiet: bool,
    pub verbosity: u8,
}

pub fn handle_obfuscate(options: ObfuscateConfig) -> Result<RunSummary> {
    let project_root = options
        .path
        .canonicalize()
        .with_context(|| format!("project root {} not found", options.path.display()))?;

    // Configuration problems must surface before any file is touched.
    let config = merged_config(&project_root, &options)?;

    if let Some(jobs) = options.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .ok();
    }

    let progress = ProgressManager::new(ProgressConfig::from_env(
        options.quiet,
        options.verbosity,
    ));

    let all_files = walker::find_project_files(&project_root, config.ignore.patterns.clone())?;

    let mut cache = if options.no_cache {
        IncrementalCache::new(&project_root)
    } else {
        IncrementalCache::load_or_new(&project_root)
    };
    let force = options.force || options.no_cache;
    let (files_to_process, changes) = cache.get_files_to_process(&all_files, force);

    log_changes(&changes, options.verbosity);

    let mut summary = RunSummary {
        files_discovered: all_files.len(),
        ..RunSummary::default()
    };

    if files_to_process.is_empty() {
        log::info!("nothing to do: every file is unchanged");
        if !options.no_cache && !options.dry_run {
            cache.finalize(&[], &changes.deleted)?;
        }
        return Ok(summary);
    }

    // Parse phase: shared-nothing parallel map, merged by path so the
    // symbol order feeding the name generator is stable.
    let whitelist = config.whitelist();
    let parse_bar = progress.create_bar(files_to_process.len() as u64, TEMPLATE_PARSE);
    parse_bar.set_message("Parsing");
    let parsed_files: BTreeMap<PathBuf, ParsedFile> = files_to_process
        .par_iter()
        .progress_with(parse_bar)
        .filter_map(|path| match parsers::parse_file(path, &whitelist) {
            Ok(parsed) => Some((path.clone(), parsed)),
            Err(e) => {
                log::warn!("skipping {}: {e}", path.display());
                None
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        .collect();

    summary.files_skipped = files_to_process.len() - parsed_files.len();
    for parsed in parsed_files.values() {
        summary.symbols_extracted += parsed.symbols.len();
        *summary
            .language_breakdown
            .entry(parsed.language)
            .or_insert(0) += 1;
    }

    // Name generation is the sequential barrier: it needs the full merged
    // symbol set before the map can be frozen.
    let mut table = SymbolTable::new(whitelist.clone());
    for parsed in parsed_files.values() {
        table.add_file(parsed);
    }
    let rename_map = table.generate(&config.naming)?;
    summary.names_generated = rename_map.len();

    // Transform phase: embarrassingly parallel over the frozen map.
    let transformer = CodeTransformer::new(&rename_map);
    let transform_bar = progress.create_bar(parsed_files.len() as u64, TEMPLATE_TRANSFORM);
    transform_bar.set_message("Transforming");
    let outcomes: Vec<(PathBuf, Option<PathBuf>, TransformResult)> = parsed_files
        .par_iter()
        .progress_with(transform_bar)
        .map(|(path, parsed)| {
            let (result, destination) = transform_one(
                path,
                parsed,
                &transformer,
                &project_root,
                options.output.as_deref(),
                options.dry_run,
            );
            (path.clone(), destination, result)
        })
        .collect();

    // The snapshot must describe the tree a later run will walk: in-place
    // runs record the written destination (the original may have been
    // renamed away), output-dir runs record the untouched original.
    let mut processed = Vec::new();
    for (path, destination, result) in &outcomes {
        if result.is_clean() {
            summary.total_replacements += result.replacements;
            summary.files_processed += 1;
            let snapshot_path = match (options.output.as_deref(), destination) {
                (None, Some(destination)) => destination.clone(),
                _ => path.clone(),
            };
            processed.push(snapshot_path);
        } else {
            summary.files_skipped += 1;
            for error in &result.errors {
                log::error!("{}: {error}", path.display());
            }
        }
    }

    if let Some(mapping_path) = mapping_destination(&options, &config, &project_root) {
        if !options.dry_run {
            export_mapping(&mapping_path, &options, &config, &rename_map, &summary)?;
        }
    }

    if !options.no_cache && !options.dry_run {
        cache.finalize(&processed, &changes.deleted)?;
    }

    print_summary(&summary, &changes, options.dry_run, options.quiet);
    Ok(summary)
}

/// Fold CLI overrides into the loaded configuration, then validate
fn merged_config(project_root: &Path, options: &ObfuscateConfig) -> Result<CodemaskConfig> {
    let mut config = CodemaskConfig::load(project_root)?;
    if let Some(strategy) = options.strategy {
        config.naming.strategy = strategy;
    }
    if let Some(prefix) = &options.prefix {
        config.naming.prefix = prefix.clone();
    }
    if let Some(seed) = options.seed {
        config.naming.seed = Some(seed);
    }
    config.validate()?;
    Ok(config)
}

/// Transform one file into a fresh buffer and, unless this is a dry run,
/// write it at its (possibly renamed) destination. Returns the destination
/// actually written, if any.
fn transform_one(
    path: &Path,
    parsed: &ParsedFile,
    transformer: &CodeTransformer,
    project_root: &Path,
    output_dir: Option<&Path>,
    dry_run: bool,
) -> (TransformResult, Option<PathBuf>) {
    let content = match io::read_file(path) {
        Ok(content) => content,
        Err(e) => {
            return (
                TransformResult {
                    transformed_content: String::new(),
                    replacements: 0,
                    errors: vec![format!("failed to read: {e}")],
                },
                None,
            )
        }
    };

    let mut result = transformer.transform(&content);
    if !result.is_clean() || dry_run {
        return (result, None);
    }

    let file_name = transformer.output_file_name(path, parsed);
    let destination = match output_dir {
        Some(output_dir) => {
            let relative = path.parent().and_then(|parent| {
                parent.strip_prefix(project_root).ok().map(Path::to_path_buf)
            });
            let target_dir = relative
                .map(|rel| output_dir.join(rel))
                .unwrap_or_else(|| output_dir.to_path_buf());
            if let Err(e) = io::ensure_dir(&target_dir) {
                result.errors.push(format!("failed to create output dir: {e}"));
                return (result, None);
            }
            target_dir.join(&file_name)
        }
        None => path.with_file_name(&file_name),
    };

    if let Err(e) = io::write_file(&destination, &result.transformed_content) {
        result
            .errors
            .push(format!("failed to write {}: {e}", destination.display()));
        return (result, None);
    }

    // In-place runs drop the old file when the base name changed, keeping
    // header/implementation pairs under their new name only.
    if output_dir.is_none() && destination != path {
        if let Err(e) = fs::remove_file(path) {
            result
                .errors
                .push(format!("failed to remove {}: {e}", path.display()));
            return (result, Some(destination));
        }
    }

    (result, Some(destination))
}

fn mapping_destination(
    options: &ObfuscateConfig,
    config: &CodemaskConfig,
    project_root: &Path,
) -> Option<PathBuf> {
    options.mapping.clone().or_else(|| {
        config
            .output
            .mapping_file
            .as_ref()
            .map(|name| project_root.join(name))
    })
}

fn mapping_format(options: &ObfuscateConfig, config: &CodemaskConfig) -> MappingFormat {
    match options.mapping_format {
        Some(MappingFormatArg::Json) => MappingFormat::Json,
        Some(MappingFormatArg::Csv) => MappingFormat::Csv,
        None => config
            .output
            .mapping_format
            .as_deref()
            .and_then(MappingFormat::from_name)
            .unwrap_or_default(),
    }
}

fn export_mapping(
    mapping_path: &Path,
    options: &ObfuscateConfig,
    config: &CodemaskConfig,
    rename_map: &RenameMap,
    summary: &RunSummary,
) -> Result<()> {
    let format = mapping_format(options, config);
    let file = fs::File::create(mapping_path)
        .with_context(|| format!("failed to create {}", mapping_path.display()))?;
    let metadata = json!({
        "tool": "codemask",
        "version": env!("CARGO_PKG_VERSION"),
        "generated_at": Utc::now().to_rfc3339(),
        "strategy": config.naming.strategy,
        "files_processed": summary.files_processed,
        "symbols_extracted": summary.symbols_extracted,
        "names_generated": summary.names_generated,
    });
    create_mapping_writer(format, file).write_mapping(rename_map, Some(metadata))?;
    log::info!("mapping exported to {}", mapping_path.display());
    Ok(())
}

fn log_changes(changes: &ChangeSet, verbosity: u8) {
    log::info!(
        "{} added, {} modified, {} deleted, {} unchanged",
        changes.added.len(),
        changes.modified.len(),
        changes.deleted.len(),
        changes.unchanged.len()
    );
    if verbosity > 0 {
        for path in &changes.added {
            log::debug!("added: {}", path.display());
        }
        for path in &changes.modified {
            log::debug!("modified: {}", path.display());
        }
        for path in &changes.deleted {
            log::debug!("deleted: {}", path.display());
        }
    }
}

fn print_summary(summary: &RunSummary, changes: &ChangeSet, dry_run: bool, quiet: bool) {
    if quiet {
        return;
    }
    let heading = if dry_run {
        "Dry run complete".yellow().bold()
    } else {
        "Obfuscation complete".green().bold()
    };
    println!("{heading}");
    println!(
        "  files: {} discovered, {} processed, {} skipped",
        summary.files_discovered, summary.files_processed, summary.files_skipped
    );
    println!(
        "  changes: {} added, {} modified, {} deleted, {} unchanged",
        changes.added.len(),
        changes.modified.len(),
        changes.deleted.len(),
        changes.unchanged.len()
    );
    println!(
        "  symbols: {} extracted, {} names generated, {} replacements",
        summary.symbols_extracted, summary.names_generated, summary.total_replacements
    );
}

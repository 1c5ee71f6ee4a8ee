use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use colored::Colorize;
use keybridge_schema::{
    describe, detect_all, emit, KeyResolver, ResolutionError, ResolutionReport, StoreBuilder,
};
use keybridge_store::InMemoryEngine;
use serde::Serialize;
use serde_json::json;

use crate::cli::*;
use crate::manifest::Manifest;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Candidates(args) => cmd_candidates(&args.manifest, format),
        Command::Check(args) => cmd_check(&args.manifest, format),
        Command::Emit(args) => cmd_emit(&args.manifest, format),
        Command::Build(args) => cmd_build(args, format),
    }
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_candidates(path: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let manifest = Manifest::load(path)?;
    let candidates = detect_all(&manifest.tables);

    if format == OutputFormat::Json {
        return print_json(&candidates);
    }

    println!("Store {} v{}", manifest.store.name.bold(), manifest.store.version);
    for (table, set) in &candidates {
        let status = if set.is_empty() {
            "no key".red()
        } else if set.is_ambiguous() {
            "ambiguous".yellow()
        } else {
            "single".green()
        };
        let chosen = manifest
            .keys
            .get(table.as_str())
            .map(|f| format!(" -> {}", f.as_str().cyan()))
            .unwrap_or_default();
        println!("  {:<24} {:<10} {}{}", table.as_str().bold(), status, set, chosen);
    }
    Ok(())
}

fn cmd_check(path: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let manifest = Manifest::load(path)?;
    let resolver = KeyResolver::new(manifest.resolution.clone());
    let report = resolver.diagnose(&manifest.tables, &manifest.keys);

    if format == OutputFormat::Json {
        print_json(&report)?;
    } else {
        print_report(&report);
    }

    if !report.is_clean() {
        bail!("{} issue(s) in {}", report.issues.len(), path.display());
    }
    Ok(())
}

fn print_report(report: &ResolutionReport) {
    for stage in &report.stage_results {
        let mark = if stage.passed() { "✓".green() } else { "✗".red() };
        println!("  {} {}", mark, stage.stage_name);
    }
    if report.is_clean() {
        println!("{} Key mapping resolves every table", "✓".green().bold());
        return;
    }
    for issue in &report.issues {
        println!("  {} [{}] {}", "✗".red().bold(), issue.code().yellow(), issue);
    }
}

fn cmd_emit(path: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let manifest = Manifest::load(path)?;
    let resolver = KeyResolver::new(manifest.resolution.clone());
    let validated = resolver
        .validate(&manifest.tables, &manifest.keys)
        .map_err(rejected)?;

    let specs = emit(&validated);
    let descriptor = describe(&validated, &manifest.store.name, manifest.store.version)?;
    let fingerprint = descriptor.fingerprint()?;

    if format == OutputFormat::Json {
        return print_json(&json!({
            "store": descriptor.name,
            "version": descriptor.version,
            "fingerprint": fingerprint.to_hex(),
            "keys": specs,
        }));
    }

    println!(
        "Store {} v{} ({})",
        descriptor.name.bold(),
        descriptor.version,
        fingerprint.short_hex().dimmed()
    );
    for (table, spec) in &specs {
        let resolved = validated.get(table.as_str());
        let value_type = resolved.map(|r| r.value_type.type_name()).unwrap_or("json");
        println!(
            "  {:<24} key {} ({}), unique, externally supplied",
            table.as_str().bold(),
            spec.field_name().as_str().cyan(),
            value_type
        );
    }
    Ok(())
}

fn cmd_build(args: BuildArgs, format: OutputFormat) -> anyhow::Result<()> {
    let manifest = Manifest::load(&args.manifest)?;
    let name = args.name.unwrap_or(manifest.store.name);
    let version = args.store_version.unwrap_or(manifest.store.version);

    let store = StoreBuilder::new(Arc::new(InMemoryEngine::new()))
        .with_config(manifest.resolution)
        .schema(manifest.tables)
        .keys(manifest.keys)
        .map_err(rejected)?
        .build(&name, version)
        .with_context(|| format!("failed to build store '{name}' v{version}"))?;

    if format == OutputFormat::Json {
        return print_json(&json!({
            "id": store.id().to_string(),
            "store": store.name(),
            "version": store.version(),
            "fingerprint": store.fingerprint().to_hex(),
            "keys": store.key_specs(),
        }));
    }

    println!(
        "{} Built store {} v{}",
        "✓".green().bold(),
        store.name().bold(),
        store.version()
    );
    println!("  Id: {}", store.id().to_string().cyan());
    println!("  Fingerprint: {}", store.fingerprint().short_hex().dimmed());
    for (table, spec) in store.key_specs() {
        println!("  {:<24} key {}", table.as_str().bold(), spec.field_name().as_str().cyan());
    }
    Ok(())
}

fn rejected(err: ResolutionError) -> anyhow::Error {
    anyhow::anyhow!("key mapping rejected for table '{}': {}", err.table(), err)
}

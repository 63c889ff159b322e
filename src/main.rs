use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use sweepsafe::cleaner::{self, DryRunLedger, SafeDelete};
use sweepsafe::cli::args::{Cli, Commands, ConfigAction, OutputFormat, WhitelistAction};
use sweepsafe::cli::output;
use sweepsafe::common::cancel::CancelToken;
use sweepsafe::common::config::{Config, TargetCatalog};
use sweepsafe::common::safety::{self, PathGuard};
use sweepsafe::common::{format, logging, permissions};
use sweepsafe::scanner::targets::{Category, ScanResult};
use sweepsafe::scanner::{self, ScanContext};
use sweepsafe::whitelist::Whitelist;

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = Config::load()?;

    let log_dir = matches!(cli.command, Commands::Clean { .. }).then(Config::logs_dir);
    let _log_guard = logging::init(cli.verbose || config.debug, cli.quiet, log_dir.as_deref());

    match cli.command {
        Commands::Scan {
            detailed,
            ref categories,
        } => cmd_scan(&cli, &config, detailed, categories),

        Commands::Clean {
            execute,
            dry_run,
            yes,
            ref export,
            ref categories,
        } => {
            let dry_run = dry_run || (!execute && config.dry_run_by_default);
            cmd_clean(&cli, &config, dry_run, yes, export.clone(), categories)
        }

        Commands::Whitelist { ref action } => cmd_whitelist(&cli, &config, action),

        Commands::Config { ref action } => cmd_config(action, config),

        Commands::Completions { shell } => {
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            clap_complete::generate(
                clap_complete::Shell::from(shell),
                &mut cmd,
                "sweepsafe",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    }
}

// ─── Scan ─────────────────────────────────────────────────────────────────────

fn run_scan(
    config: &Config,
    whitelist: &Whitelist,
    categories: &[Category],
) -> Result<(Vec<ScanResult>, Duration)> {
    let catalog = TargetCatalog::load_or_builtin(&config.targets_path())?;
    let targets = catalog.filter(categories);

    let guard = PathGuard::system_default();
    let ctx = ScanContext::new(&guard)
        .with_whitelist(Some(whitelist))
        .elevated(permissions::is_elevated());

    let start = Instant::now();
    let results = scanner::scan_all_with(&targets, &ctx);
    Ok((results, start.elapsed()))
}

fn cmd_scan(cli: &Cli, config: &Config, detailed: bool, categories: &[Category]) -> Result<()> {
    let whitelist = Whitelist::load(config.whitelist_path())?;
    let (results, elapsed) = run_scan(config, &whitelist, categories)?;

    match cli.format {
        OutputFormat::Human => output::print_scan_results(&results, elapsed, detailed),
        OutputFormat::Json => output::print_scan_json(&results),
        OutputFormat::Quiet => output::print_scan_quiet(&results),
    }

    Ok(())
}

// ─── Clean ────────────────────────────────────────────────────────────────────

fn cmd_clean(
    cli: &Cli,
    config: &Config,
    dry_run: bool,
    yes: bool,
    export: Option<PathBuf>,
    categories: &[Category],
) -> Result<()> {
    let whitelist = Arc::new(Whitelist::load(config.whitelist_path())?);
    let (results, elapsed) = run_scan(config, &whitelist, categories)?;
    let human = matches!(cli.format, OutputFormat::Human);

    if dry_run {
        let ledger = DryRunLedger::from_results(&results);
        match cli.format {
            OutputFormat::Human => ledger.print_summary(),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&ledger.items())?),
            OutputFormat::Quiet => println!(
                "{}  {}",
                format::format_size(ledger.total_size()),
                ledger.count()
            ),
        }

        let export_path = export.unwrap_or_else(|| config.export_path());
        ledger.export_to_file(&export_path)?;
        if human {
            println!("  {} Report saved to {}", "✓".green(), export_path.display());
            println!();
        }
        return Ok(());
    }

    let total_items = scanner::total_item_count(&results);
    let total_bytes = scanner::total_size_all(&results);

    if total_items == 0 {
        if human {
            println!("  {} Nothing to clean!", "✨");
        }
        return Ok(());
    }

    if human {
        output::print_scan_results(&results, elapsed, false);
    }

    if let Err(limit) = safety::validate_clean_operation(total_items, total_bytes) {
        if !yes {
            anyhow::bail!("{} Re-run with --yes to proceed anyway.", limit);
        }
        eprintln!("  {} {}", "⚠".yellow(), limit);
    }

    if !yes && !confirm(total_items, total_bytes)? {
        println!("  {} Cancelled", "✗".red());
        return Ok(());
    }

    let cancel = CancelToken::new();
    let deleter = SafeDelete::new(PathGuard::system_default())
        .with_whitelist(whitelist)
        .with_cancel(cancel.clone());
    let report = cleaner::delete_results(&deleter, &results, false, &cancel, human && !cli.quiet);

    match cli.format {
        OutputFormat::Human => output::print_batch_report(&report),
        OutputFormat::Json => output::print_batch_json(&report),
        OutputFormat::Quiet => output::print_batch_quiet(&report),
    }

    Ok(())
}

fn confirm(items: usize, bytes: u64) -> Result<bool> {
    use std::io::Write;

    print!(
        "\n  {} PERMANENTLY DELETE {} ({})? [y/N] ",
        "❓",
        format::format_count(items),
        format::format_size(bytes)
    );
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

// ─── Whitelist ────────────────────────────────────────────────────────────────

fn cmd_whitelist(cli: &Cli, config: &Config, action: &WhitelistAction) -> Result<()> {
    let whitelist = Whitelist::load(config.whitelist_path())?;

    match action {
        WhitelistAction::List => {
            let patterns = whitelist.list();
            match cli.format {
                OutputFormat::Human => output::print_whitelist(&patterns, whitelist.path()),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&patterns)?),
                OutputFormat::Quiet => patterns.iter().for_each(|p| println!("{}", p)),
            }
        }
        WhitelistAction::Add { pattern } => {
            whitelist.add(pattern)?;
            whitelist.save()?;
            if !cli.quiet {
                println!("  {} Added {}", "✓".green(), pattern);
            }
        }
        WhitelistAction::Remove { pattern } => {
            whitelist.remove(pattern)?;
            whitelist.save()?;
            if !cli.quiet {
                println!("  {} Removed {}", "✓".green(), pattern);
            }
        }
    }

    Ok(())
}

// ─── Config ───────────────────────────────────────────────────────────────────

fn cmd_config(action: &ConfigAction, mut config: Config) -> Result<()> {
    match action {
        ConfigAction::Show => {
            println!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Path => {
            println!("data dir:   {}", Config::data_dir().display());
            println!("config:     {}", Config::config_path().display());
            println!("whitelist:  {}", config.whitelist_path().display());
            println!("targets:    {}", config.targets_path().display());
            println!("report:     {}", config.export_path().display());
            println!("logs:       {}", Config::logs_dir().display());
        }
        ConfigAction::Init => {
            Config::init_dirs()?;
            config.save()?;
            println!("  {} SweepSafe initialized at {}", "✓".green(), Config::data_dir().display());
        }
        ConfigAction::Set { key, value } => {
            match key.as_str() {
                "dry_run_by_default" => {
                    config.dry_run_by_default = value
                        .parse()
                        .with_context(|| format!("Expected true or false, got '{}'", value))?
                }
                "debug" => {
                    config.debug = value
                        .parse()
                        .with_context(|| format!("Expected true or false, got '{}'", value))?
                }
                "whitelist_file" => config.whitelist_file = Some(PathBuf::from(value)),
                "targets_file" => config.targets_file = Some(PathBuf::from(value)),
                "export_file" => config.export_file = Some(PathBuf::from(value)),
                _ => anyhow::bail!("Unknown config key: {}", key),
            }
            config.save()?;
            println!("  {} Set {} = {}", "✓".green(), key, value);
        }
    }
    Ok(())
}

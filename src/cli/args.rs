use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::scanner::targets::Category;

/// SweepSafe: scan caches, preview deletions, delete through one guarded path
#[derive(Parser, Debug)]
#[command(
    name = "sweepsafe",
    version,
    about = "A safety-first cleanup utility",
    long_about = "SweepSafe scans temp directories, browser and developer caches, and\n\
                   deletes them only through a guard that refuses system paths.\n\
                   Every clean is a dry run unless --execute is given.",
    after_help = "EXAMPLES:\n  \
        sweepsafe scan                               Scan every catalog target\n  \
        sweepsafe scan --category dev,browser        Scan selected categories\n  \
        sweepsafe --format json scan                 Machine-readable results\n  \
        sweepsafe clean                              Preview and export a report\n  \
        sweepsafe clean --execute                    Delete after confirmation\n  \
        sweepsafe whitelist add '~/.cache/keep/*'    Never touch matching paths\n  \
        sweepsafe config show                        Print the configuration"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Quiet mode, minimal output
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan for cleanable files
    Scan {
        /// Show individual files in results
        #[arg(long)]
        detailed: bool,

        /// Only scan specific categories
        #[arg(long = "category", value_delimiter = ',')]
        categories: Vec<Category>,
    },

    /// Preview or remove the files a scan finds
    Clean {
        /// Really delete (the default is a dry run)
        #[arg(long, conflicts_with = "dry_run")]
        execute: bool,

        /// Force a dry run even when the config disables it
        #[arg(long)]
        dry_run: bool,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,

        /// Where to write the dry-run report
        #[arg(long, value_name = "PATH")]
        export: Option<PathBuf>,

        /// Only clean specific categories
        #[arg(long = "category", value_delimiter = ',')]
        categories: Vec<Category>,
    },

    /// Manage the whitelist of paths that are never cleaned
    Whitelist {
        #[command(subcommand)]
        action: WhitelistAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Subcommand, Debug)]
pub enum WhitelistAction {
    /// List whitelist patterns
    List,

    /// Add a pattern
    Add {
        /// Glob pattern; may contain %VAR%, $VAR or ~
        pattern: String,
    },

    /// Remove a pattern
    Remove {
        /// Pattern exactly as listed
        pattern: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print the data directory and the files SweepSafe uses
    Path,

    /// Write the default configuration and create the data directories
    Init,

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Quiet,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

impl From<CompletionShell> for clap_complete::Shell {
    fn from(shell: CompletionShell) -> Self {
        match shell {
            CompletionShell::Bash => clap_complete::Shell::Bash,
            CompletionShell::Zsh => clap_complete::Shell::Zsh,
            CompletionShell::Fish => clap_complete::Shell::Fish,
            CompletionShell::Powershell => clap_complete::Shell::PowerShell,
        }
    }
}

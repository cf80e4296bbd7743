use clap::{Parser, Subcommand};
use std::path::Path;

use napfix_core::config::{config_path, load_config, AppConfig};
use napfix_core::detect::ReasonFilter;
use napfix_core::repair::{FileReport, RepairOptions};
use napfix_core::scan::{process, resolve_mode, Mode};

#[derive(Parser)]
#[command(name = "napfix")]
#[command(about = "Repair subtitle files mangled by a windows-1250/windows-1252 mismatch")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fix affected files in place
    Fix {
        /// File or directory to fix (defaults to the current directory)
        path: Option<String>,

        /// Do not keep a .bak copy of rewritten files
        #[arg(long)]
        no_backup: bool,

        /// Report what would change without writing anything
        #[arg(long)]
        dry_run: bool,

        /// No reason lines (same as --verbosity 0)
        #[arg(short, long, conflicts_with_all = ["verbose", "verbosity"])]
        quiet: bool,

        /// All reason lines (same as --verbosity 2)
        #[arg(short, long, conflicts_with = "verbosity")]
        verbose: bool,

        /// Reason detail: 0 none, 1 only why not, 2 all
        #[arg(long)]
        verbosity: Option<u8>,
    },

    /// Detect affected files without writing
    Check {
        /// File or directory to check (defaults to the current directory)
        path: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Initialize default config file
    Init,
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Key (dot-separated path)
        key: String,
        /// Value
        value: String,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let result = match &cli.command {
        Commands::Fix {
            path,
            no_backup,
            dry_run,
            quiet,
            verbose,
            verbosity,
        } => run_fix(
            path.as_deref(),
            *no_backup,
            *dry_run,
            resolve_verbosity(*quiet, *verbose, *verbosity),
            cli.json,
        ),
        Commands::Check { path } => run_check(path.as_deref(), cli.json),
        Commands::Config { action } => run_config(action, cli.json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Flags beat the config file; the config default applies when none is given.
fn resolve_verbosity(quiet: bool, verbose: bool, verbosity: Option<u8>) -> Option<u8> {
    if quiet {
        Some(0)
    } else if verbose {
        Some(2)
    } else {
        verbosity
    }
}

fn run_fix(
    path: Option<&str>,
    no_backup: bool,
    dry_run: bool,
    verbosity: Option<u8>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cfg = load_config();
    let mut opts = napfix_core::config::repair_options_from_config(&cfg);
    if no_backup {
        opts.backup = false;
    }
    opts.dry_run = dry_run;
    if let Some(v) = verbosity {
        opts.reasons = ReasonFilter::from_verbosity(v);
    }

    let mode = resolve_mode(path.map(Path::new))?;
    if !json {
        println!("Working in directory {}", std::env::current_dir()?.display());
        println!("Mode: {}", mode.describe());
        println!("Selected: {}", mode.path().display());
        println!();
    }

    let reports = process(&mode, &opts, &cfg)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    if reports.is_empty() {
        println!("Dir is empty.");
        return Ok(());
    }
    for report in &reports {
        print_report(report, dry_run);
        println!();
    }
    let fixed = reports.iter().filter(|r| r.fixed).count();
    let verb = if dry_run { "would be fixed" } else { "fixed" };
    println!("{} of {} file(s) {}", fixed, reports.len(), verb);
    Ok(())
}

fn print_report(report: &FileReport, dry_run: bool) {
    println!("{}", report.path);
    for reason in &report.reasons {
        println!("    {}", reason);
    }
    if !report.fixed {
        println!("Not fixing.");
    } else if dry_run {
        println!("Would fix {}", report.path);
    } else {
        println!("Fixing {}", report.path);
        if report.bytes_written > 0 {
            println!("Success");
        } else {
            println!("No bytes written.");
        }
    }
}

fn run_check(
    path: Option<&str>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cfg = load_config();
    let opts = RepairOptions {
        dry_run: true,
        ..napfix_core::config::repair_options_from_config(&cfg)
    };
    let mode = resolve_mode(path.map(Path::new))?;
    let reports = process(&mode, &opts, &cfg)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }
    for report in &reports {
        let verdict = if report.fixed { "needs fixing" } else { "ok" };
        println!("{}: {}", report.path, verdict);
        for reason in &report.reasons {
            println!("    {}", reason);
        }
    }
    if let Mode::Directory(_) = mode {
        if reports.is_empty() {
            println!("Dir is empty.");
        }
    }
    Ok(())
}

fn run_config(
    action: &ConfigAction,
    json: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    match action {
        ConfigAction::Init => {
            let path = config_path().ok_or("Could not determine config directory")?;
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let default_cfg = AppConfig::default();
            let toml = toml::to_string_pretty(&default_cfg)?;
            std::fs::write(&path, toml)?;
            println!("Wrote default config to {}", path.display());
        }
        ConfigAction::Show => {
            let cfg = load_config();
            if json {
                println!("{}", serde_json::to_string_pretty(&cfg)?);
            } else {
                println!("{}", toml::to_string_pretty(&cfg)?);
            }
        }
        ConfigAction::Set { key, value } => {
            let path = config_path().ok_or("Could not determine config directory")?;
            let mut cfg: AppConfig = if path.exists() {
                let s = std::fs::read_to_string(&path)?;
                toml::from_str(&s).unwrap_or_else(|_| AppConfig::default())
            } else {
                AppConfig::default()
            };

            set_config_key(&mut cfg, key, value)?;

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let toml = toml::to_string_pretty(&cfg)?;
            std::fs::write(&path, toml)?;
            if !json {
                println!("Updated {}", key);
            }
        }
    }
    Ok(())
}

fn set_config_key(
    cfg: &mut AppConfig,
    key: &str,
    value: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let parts: Vec<&str> = key.splitn(2, '.').collect();
    match parts.as_slice() {
        ["repair", sub] => match *sub {
            "backup" => cfg.repair.backup = value.parse()?,
            "verbosity" => cfg.repair.verbosity = value.parse()?,
            _ => return Err(format!("Unknown key: {}", key).into()),
        },
        ["extensions", sub] => {
            let list = value.split(',').map(|s| s.trim().to_string()).collect();
            match *sub {
                "subtitle" => cfg.extensions.subtitle = list,
                "video" => cfg.extensions.video = list,
                _ => return Err(format!("Unknown key: {}", key).into()),
            }
        }
        _ => return Err(format!("Unknown key: {}", key).into()),
    }
    Ok(())
}

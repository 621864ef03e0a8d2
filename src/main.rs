// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! dirsort: sort a directory's files into category folders

use clap::{Parser, Subcommand};
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};

use dirsort::config::AppConfig;
use dirsort::sink::{ConsoleSink, JsonLinesSink, NullSink, OutputSink};
use dirsort::{DirsortError, Organizer, Result};

/// dirsort CLI - sort files into category folders
#[derive(Parser, Debug)]
#[command(name = "dirsort")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version = "1.0.0")]
#[command(about = "Sort a directory's files into category folders", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "dirsort.json", global = true)]
    config: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Output format for results
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json", "jsonl"])]
    format: String,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sort the files of a directory into category folders
    Sort {
        /// Directory to organize (prompted for if omitted)
        dir: Option<PathBuf>,

        /// Files downloaded from a URL containing this go to "School"
        #[arg(short, long)]
        school: Option<String>,

        /// Only sort into these categories (comma separated)
        #[arg(long, value_delimiter = ',')]
        only: Vec<String>,

        /// Glob pattern of file names to leave in place (repeatable)
        #[arg(long)]
        ignore: Vec<String>,

        /// Show where files would go without moving them
        #[arg(long)]
        dry_run: bool,

        /// Do not read download sources from extended attributes
        #[arg(long)]
        no_provenance: bool,
    },

    /// List the categories and the extensions they claim
    Categories {
        /// Only show these categories (comma separated)
        #[arg(long, value_delimiter = ',')]
        only: Vec<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "dirsort.json")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate configuration file
    Validate,
}

/// Options for one sort run, after merging CLI flags over the config file
#[derive(Debug, Default)]
struct SortOptions {
    dir: Option<PathBuf>,
    school: Option<String>,
    only: Vec<String>,
    ignore: Vec<String>,
    dry_run: bool,
    no_provenance: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = AppConfig::load(&cli.config)?;

    match cli.command {
        Some(Commands::Sort { dir, school, only, ignore, dry_run, no_provenance }) => {
            let options = SortOptions { dir, school, only, ignore, dry_run, no_provenance };
            run_sort(config, options, &cli.format)
        }
        Some(Commands::Categories { only }) => {
            run_categories(config, only, &cli.format)?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Config { action }) => {
            run_config_command(config, action, &cli.config)?;
            Ok(ExitCode::SUCCESS)
        }
        None => {
            // Default: prompt for everything
            run_sort(config, SortOptions::default(), &cli.format)
        }
    }
}

/// Sort one directory
fn run_sort(mut config: AppConfig, options: SortOptions, format: &str) -> Result<ExitCode> {
    if !options.only.is_empty() {
        config.categories = options.only;
    }
    config.ignore.extend(options.ignore);
    if options.no_provenance {
        config.provenance.enabled = false;
    }

    let table = config.category_table()?;
    let ignore = config.ignore_patterns()?;

    let interactive = io::stdin().is_terminal();
    let stdin = io::stdin();
    let mut input = stdin.lock();

    let school = match options.school.or(config.school.clone()) {
        Some(s) => s,
        None if interactive => prompt(&mut input, "Please enter your school name")?,
        None => String::new(),
    };

    let dir = match options.dir.or(config.directory.as_ref().map(PathBuf::from)) {
        Some(d) => d,
        None => {
            let answer = prompt(&mut input, "Please enter the path of the folder you want to organize")?;
            if answer.is_empty() {
                return Err(DirsortError::Config("No directory given".to_string()));
            }
            PathBuf::from(answer)
        }
    };

    if school.is_empty() && config.provenance.enabled {
        warn!("Empty school name: every file with a recorded download source goes to School");
    }

    let provenance = config.provenance_lookup();
    info!("Download source lookup: {}", provenance.name());

    let organizer = Organizer::new(table, &school, provenance)
        .with_ignore(ignore)
        .with_dry_run(options.dry_run);

    let mut sink: Box<dyn OutputSink> = match format {
        "jsonl" => Box::new(JsonLinesSink::stdout()),
        "json" => Box::new(NullSink),
        _ => Box::new(ConsoleSink::stdout()),
    };

    let report = organizer.run(&dir, sink.as_mut())?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    if report.summary.failed > 0 {
        Ok(ExitCode::from(2))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Ask a question on stdout and read one trimmed line
fn prompt(input: &mut impl BufRead, question: &str) -> Result<String> {
    print!("{}: ", question);
    io::stdout().flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Print the category table
fn run_categories(mut config: AppConfig, only: Vec<String>, format: &str) -> Result<()> {
    if !only.is_empty() {
        config.categories = only;
    }
    let table = config.category_table()?;

    if format == "text" {
        for category in table.categories() {
            println!("{:<10} {}", category.label, category.extensions.join(" "));
        }
        println!("{:<10} (downloaded from the school)", dirsort::categories::SCHOOL);
        println!("{:<10} (anything else)", dirsort::categories::OTHER);
    } else {
        println!("{}", serde_json::to_string_pretty(table.categories())?);
    }
    Ok(())
}

/// Run config commands
fn run_config_command(config: AppConfig, action: ConfigCommands, config_path: &Path) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let json = serde_json::to_string_pretty(&config)?;
            println!("{}", json);
        }
        ConfigCommands::Generate { output, force } => {
            if output.exists() && !force {
                return Err(DirsortError::Config(format!(
                    "{:?} already exists. Use --force to overwrite",
                    output
                )));
            }
            AppConfig::default().save(&output)?;
            println!("Generated config at {:?}", output);
        }
        ConfigCommands::Validate => {
            let table = config.category_table()?;
            let patterns = config.ignore_patterns()?;
            println!("Configuration at {:?} is valid", config_path);
            println!("  Categories: {:?}", table.labels());
            println!("  School: {}", config.school.as_deref().unwrap_or("(none)"));
            println!("  Ignore patterns: {}", patterns.len());
            println!(
                "  Download sources: {}",
                if config.provenance.enabled { config.provenance.attribute.as_str() } else { "disabled" }
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["dirsort"]).unwrap();
        assert!(!cli.verbose);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_sort_command() {
        let cli = Cli::try_parse_from([
            "dirsort", "sort", "/tmp/downloads", "--school", "edu", "--only", "Image,Document",
            "--dry-run",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Sort { dir, school, only, dry_run, .. }) => {
                assert_eq!(dir, Some(PathBuf::from("/tmp/downloads")));
                assert_eq!(school.as_deref(), Some("edu"));
                assert_eq!(only, vec!["Image".to_string(), "Document".to_string()]);
                assert!(dry_run);
            }
            _ => panic!("Expected Sort command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["dirsort", "--format", "xml"]).is_err());
    }

    #[test]
    fn test_prompt_trims_input() {
        let mut input = io::Cursor::new("  mit.edu \n");
        assert_eq!(prompt(&mut input, "School").unwrap(), "mit.edu");
    }
}

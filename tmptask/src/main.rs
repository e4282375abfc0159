//! Allocate and write transient temp files from the command line.
//!
//! `tmptask path` prints a freshly allocated path without touching the
//! filesystem. `tmptask write` runs a one-task collection that writes the
//! given lines and then cleans up, keeping the file only with `--keep`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use tmptask::collection::{Collection, CollectionReport};
use tmptask::core::path::allocate;
use tmptask::core::types::ResourcePath;
use tmptask::exit_codes;
use tmptask::io::config::{TmpFileConfig, load_config};
use tmptask::io::tmp_file::TmpFileTask;
use tmptask::logging;

#[derive(Parser)]
#[command(
    name = "tmptask",
    version,
    about = "Allocate and write transient temp files"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print an allocated path without creating anything.
    Path {
        #[command(flatten)]
        alloc: AllocArgs,
    },
    /// Write lines to a temp file inside a collection, then clean up.
    Write {
        #[command(flatten)]
        alloc: AllocArgs,
        /// Line of content (repeatable).
        #[arg(long = "line")]
        lines: Vec<String>,
        /// Keep the file after the collection completes.
        #[arg(long)]
        keep: bool,
        /// Print the cleanup report as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
struct AllocArgs {
    /// TOML file with defaults (missing file means built-in defaults).
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    stem: Option<String>,
    /// Appended verbatim, e.g. `.txt`.
    #[arg(long, allow_hyphen_values = true)]
    extension: Option<String>,
    /// Parent directory (defaults to the system temp directory).
    #[arg(long)]
    base_dir: Option<PathBuf>,
    /// Do not insert a random fragment after the stem.
    #[arg(long)]
    no_random: bool,
}

#[derive(Serialize)]
struct WriteOutput<'a> {
    path: &'a ResourcePath,
    #[serde(flatten)]
    report: &'a CollectionReport,
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Path { alloc } => cmd_path(&alloc),
        Command::Write {
            alloc,
            lines,
            keep,
            json,
        } => cmd_write(&alloc, lines, keep, json),
    }
}

fn cmd_path(alloc: &AllocArgs) -> Result<i32> {
    let cfg = resolve_config(alloc)?;
    let path = allocate(
        &cfg.path_request(),
        &std::env::temp_dir(),
        &mut rand::thread_rng(),
    );
    println!("{path}");
    Ok(exit_codes::OK)
}

fn cmd_write(alloc: &AllocArgs, lines: Vec<String>, keep: bool, json: bool) -> Result<i32> {
    let mut cfg = resolve_config(alloc)?;
    if keep {
        cfg.transient = false;
    }

    let mut collection = Collection::new();
    let path = collection.add_transient(TmpFileTask::from_config(&cfg).lines(lines));
    let report = match collection.run() {
        Ok(report) => report,
        Err(err) => {
            eprintln!("{:#}", err);
            return Ok(exit_codes::ROLLED_BACK);
        }
    };

    if json {
        let output = WriteOutput {
            path: &path,
            report: &report,
        };
        let buf = serde_json::to_string_pretty(&output).context("serialize report")?;
        println!("{buf}");
    } else {
        println!("{path}");
    }
    Ok(exit_codes::OK)
}

/// Layer command-line flags over the config file.
fn resolve_config(alloc: &AllocArgs) -> Result<TmpFileConfig> {
    let mut cfg = match &alloc.config {
        Some(path) => load_config(path)?,
        None => TmpFileConfig::default(),
    };
    if let Some(stem) = &alloc.stem {
        cfg.stem = stem.clone();
    }
    if let Some(extension) = &alloc.extension {
        cfg.extension = extension.clone();
    }
    if let Some(base_dir) = &alloc.base_dir {
        cfg.base_dir = base_dir.clone();
    }
    if alloc.no_random {
        cfg.include_random = false;
    }
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_path_defaults() {
        let cli = Cli::parse_from(["tmptask", "path"]);
        let Command::Path { alloc } = cli.command else {
            panic!("expected path command");
        };
        assert!(alloc.config.is_none());
        assert!(!alloc.no_random);
    }

    #[test]
    fn parse_write_with_lines() {
        let cli = Cli::parse_from([
            "tmptask", "write", "--line", "a", "--line", "b", "--keep",
        ]);
        let Command::Write {
            lines, keep, json, ..
        } = cli.command
        else {
            panic!("expected write command");
        };
        assert_eq!(lines, vec!["a".to_string(), "b".to_string()]);
        assert!(keep);
        assert!(!json);
    }

    #[test]
    fn flags_override_config_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config_path = temp.path().join("tmptask.toml");
        std::fs::write(&config_path, "stem = \"from-file\"\nextension = \".md\"\n")
            .expect("write config");

        let cfg = resolve_config(&AllocArgs {
            config: Some(config_path),
            stem: Some("from-flag".to_string()),
            no_random: true,
            ..AllocArgs::default()
        })
        .expect("resolve");

        assert_eq!(cfg.stem, "from-flag");
        assert_eq!(cfg.extension, ".md");
        assert!(!cfg.include_random);
    }
}

mod cargo;
mod commands;
mod core;
mod graph;
mod release;
mod utils;

use clap::{Parser, Subcommand};
use core::error::{DriftError, print_error};
use core::vcs::{CacheMode, Git};
use release::changelog::ChangelogOptions;
use std::path::PathBuf;

/// Detect changed crates and generate changelogs for Cargo monorepos
#[derive(Parser)]
#[command(name = "cargo")]
#[command(bin_name = "cargo")]
#[command(styles = get_styles())]
enum CargoCli {
  Drift(DriftCli),
}

#[derive(Parser)]
#[command(name = "drift")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct DriftCli {
  /// Persist the git response cache to this directory (shared across
  /// concurrent invocations)
  #[arg(long, global = true)]
  cache_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// List packages changed since their last tagged release
  Changed {
    /// Output full change verdicts in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Generate release notes for the package at the current directory
  Changelog {
    /// Generate from this commit to HEAD instead of the last release tag
    #[arg(long)]
    from_commit: Option<String>,

    /// Include this many historical releases
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    releases: Option<u32>,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
    )
    .with_writer(std::io::stderr)
    .init();

  let CargoCli::Drift(cli) = CargoCli::parse();

  let cwd = match std::env::current_dir() {
    Ok(dir) => dir,
    Err(e) => {
      eprintln!("Error: Failed to get current directory: {}", e);
      std::process::exit(1);
    }
  };

  let cache_mode = match cli.cache_dir {
    Some(dir) => CacheMode::Persistent(dir),
    None => CacheMode::Memory,
  };
  let git = Git::new(cache_mode);

  let result = match cli.command {
    Commands::Changed { json } => commands::run_changed(&git, &cwd, json),
    Commands::Changelog { from_commit, releases } => {
      let options = ChangelogOptions {
        from_commit,
        release_count: releases.map(|n| n as usize),
      };
      commands::run_changelog(&git, &cwd, &options)
    }
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: DriftError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}

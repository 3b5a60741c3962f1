//! `notefiler` command-line entry point.
//!
//! # Responsibility
//! - Load `config.json` (or the path given as `CONFIG_PATH`).
//! - Start file logging when the config names a `log_dir`.
//! - Run one filer pass, printing one progress line per inbox file.
//! - Exit non-zero with the offending path on any fatal error.

use clap::Parser;
use log::warn;
use notefiler_core::{
    default_log_level, init_logging, run_with_progress, Classification, FilerConfig,
    PipelineError, DEFAULT_CONFIG_FILE,
};
use std::path::PathBuf;
use std::process::ExitCode;

/// File a flat notes inbox into Boxes, Notebooks and Notes.
#[derive(Parser, Debug)]
#[command(name = "notefiler", version)]
struct Cli {
    /// JSON config naming the inbox, notebooks and boxes paths.
    #[arg(value_name = "CONFIG_PATH", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run_cli(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_cli(cli: &Cli) -> Result<(), PipelineError> {
    let config = FilerConfig::from_file(&cli.config)?;

    if let Some(log_dir) = &config.log_dir {
        let level = config.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    println!("Processing Inbox:");
    let report = run_with_progress(&config, |path, classification| {
        match classification {
            Classification::Ignored(reason) => {
                println!("{} ignored ({})", path.display(), reason.as_str())
            }
            other => println!("{} {}", path.display(), other.describe()),
        }
    })?;

    if !report.ignored.is_empty() {
        warn!(
            "event=cli_done module=cli status=ok ignored={} inbox={}",
            report.ignored.len(),
            config.inbox_path.display()
        );
    }
    println!(
        "Filed {} boxes, {} notebooks, {} notes; digest has {} weeks.",
        report.filed.boxes.len(),
        report.filed.notebooks.len(),
        report.filed.notes.len(),
        report.digest_weeks
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::{CommandFactory, Parser};
    use std::path::PathBuf;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn config_path_defaults_to_config_json() {
        let cli = Cli::try_parse_from(["notefiler"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("config.json"));
    }

    #[test]
    fn config_path_is_positional() {
        let cli = Cli::try_parse_from(["notefiler", "/vault/filer.json"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("/vault/filer.json"));
    }

    #[test]
    fn help_and_version_are_not_config_paths() {
        let help = Cli::try_parse_from(["notefiler", "--help"]).unwrap_err();
        assert_eq!(help.kind(), clap::error::ErrorKind::DisplayHelp);
        let version = Cli::try_parse_from(["notefiler", "--version"]).unwrap_err();
        assert_eq!(version.kind(), clap::error::ErrorKind::DisplayVersion);
        let unknown = Cli::try_parse_from(["notefiler", "--bogus"]).unwrap_err();
        assert_eq!(unknown.kind(), clap::error::ErrorKind::UnknownArgument);
    }
}

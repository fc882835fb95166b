#![forbid(unsafe_code)]

use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "wikiman", version, about = "Read Wikipedia articles as manpages")]
struct Cli {
    /// Article name, e.g. "Rust (programming language)"
    #[arg(value_name = "ARTICLE")]
    article: String,

    /// Fetch and render again even if a cached page exists
    #[arg(short = 'f', long = "refresh")]
    refresh: bool,

    #[arg(short = 'c', long = "config", value_name = "PATH")]
    config: Option<PathBuf>,

    #[arg(short = 'b', long = "base-path", value_name = "DIR")]
    base_path: Option<PathBuf>,

    #[arg(
        short = 's',
        long = "section",
        value_name = "SECTION",
        value_parser = clap::value_parser!(u8).range(1..=9)
    )]
    section: Option<u8>,

    #[arg(short = 'l', long = "language", value_name = "LANG")]
    language: Option<String>,

    #[arg(long = "pager", value_name = "PROGRAM")]
    pager: Option<String>,

    /// Render this local HTML file instead of fetching the article
    #[arg(long = "html", value_name = "PATH")]
    html: Option<PathBuf>,

    /// Passed through to the pager
    #[arg(
        value_name = "PAGER_ARGS",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pager_args: Vec<String>,
}

fn resolve_config(cli: &Cli) -> wikiman::Result<wikiman::Config> {
    let mut config = match &cli.config {
        Some(path) => wikiman::Config::load(path)?,
        None => wikiman::Config::default(),
    };
    if let Some(base_path) = &cli.base_path {
        config.base_path = base_path.clone();
    }
    if let Some(section) = cli.section {
        config.section = section;
    }
    if let Some(language) = &cli.language {
        config.language = language.clone();
    }
    if let Some(pager) = &cli.pager {
        config.pager = pager.clone();
    }
    config.force_refresh |= cli.refresh || cli.html.is_some();
    Ok(config)
}

fn read_html(cli: &Cli, config: &wikiman::Config, slug: &str) -> wikiman::Result<String> {
    match &cli.html {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => wikiman::fetch_html(&wikiman::article_url(&config.language, slug)),
    }
}

fn render_page(cli: &Cli, config: &wikiman::Config, slug: &str, path: &Path) -> wikiman::Result<()> {
    let html = read_html(cli, config, slug)?;
    let options = wikiman::ManpageOptions::new(slug, config.section);
    let roff = wikiman::convert_html_to_roff(&html, &options)?;
    wikiman::write_artifact(path, &roff)
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("WIKIMAN_LOG").unwrap_or_else(|_| EnvFilter::new("wikiman=warn"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    let slug = wikiman::article_slug(&cli.article);
    let path = wikiman::cache_path(&config.base_path, &slug, config.section);
    if config.force_refresh || !path.exists() {
        render_page(&cli, &config, &slug, &path)?;
    } else {
        debug!(path = %path.display(), "using cached manpage");
    }

    let status = Command::new(&config.pager)
        .args(&cli.pager_args)
        .arg("-l")
        .arg(&path)
        .status()?;
    Ok(ExitCode::from(exit_status(status.code())))
}

/// Pager exit status, or 1 when it was killed or reported something a
/// process exit code cannot carry.
fn exit_status(code: Option<i32>) -> u8 {
    code.and_then(|code| u8::try_from(code).ok()).unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("parse args")
    }

    #[test]
    fn trailing_arguments_go_to_the_pager() {
        let cli = parse(&["wikiman", "-f", "Rust", "--", "-P", "less -R"]);
        assert!(cli.refresh);
        assert_eq!(cli.article, "Rust");
        assert_eq!(cli.pager_args, vec!["-P", "less -R"]);
    }

    #[test]
    fn flags_override_defaults() {
        let cli = parse(&[
            "wikiman", "-s", "7", "-l", "fr", "-b", "/tmp/pages", "--pager", "cat", "Paris",
        ]);
        let config = resolve_config(&cli).expect("config");
        assert_eq!(config.section, 7);
        assert_eq!(config.language, "fr");
        assert_eq!(config.base_path, PathBuf::from("/tmp/pages"));
        assert_eq!(config.pager, "cat");
        assert!(!config.force_refresh);
    }

    #[test]
    fn local_html_forces_refresh() {
        let cli = parse(&["wikiman", "--html", "page.html", "Paris"]);
        assert!(resolve_config(&cli).expect("config").force_refresh);
    }

    #[test]
    fn section_outside_range_is_rejected() {
        assert!(Cli::try_parse_from(["wikiman", "-s", "10", "Paris"]).is_err());
    }

    #[test]
    fn exit_status_falls_back_to_failure() {
        assert_eq!(exit_status(Some(0)), 0);
        assert_eq!(exit_status(Some(16)), 16);
        assert_eq!(exit_status(None), 1);
        assert_eq!(exit_status(Some(-1)), 1);
    }
}

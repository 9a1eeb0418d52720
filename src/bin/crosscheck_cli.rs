//! Cross-check one answer against live web search and print the report.
//!
//! Usage: `crosscheck-cli [--config <path>] [--prior <0..1>] <query> <answer>`
//!
//! The JSON report goes to stdout; tracing output goes to stderr.

use std::path::PathBuf;

use anyhow::{Context, bail};
use crosscheck::{Crosscheck, CrosscheckConfig};

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    prior: Option<f64>,
    query: String,
    answer: String,
}

fn parse_args(argv: &[String]) -> anyhow::Result<Option<Args>> {
    let mut args = Args::default();
    let mut positional = Vec::new();
    let mut iter = argv.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "help" | "--help" | "-h" => return Ok(None),
            "--config" | "-c" => {
                let path = iter.next().context("--config requires a path")?;
                args.config = Some(PathBuf::from(path));
            }
            "--prior" => {
                let raw = iter.next().context("--prior requires a number")?;
                args.prior = Some(raw.parse().with_context(|| format!("invalid prior `{raw}`"))?);
            }
            _ => positional.push(arg.clone()),
        }
    }
    let [query, answer] = <[String; 2]>::try_from(positional)
        .map_err(|p| anyhow::anyhow!("expected <query> <answer>, got {} arguments", p.len()))?;
    if query.trim().is_empty() {
        bail!("query must not be empty");
    }
    args.query = query;
    args.answer = answer;
    Ok(Some(args))
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<CrosscheckConfig> {
    if let Some(path) = path {
        return CrosscheckConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()));
    }
    let default_path = CrosscheckConfig::default_config_path();
    if default_path.exists() {
        tracing::debug!(path = %default_path.display(), "using default config file");
        return CrosscheckConfig::from_file(&default_path)
            .with_context(|| format!("loading {}", default_path.display()));
    }
    Ok(CrosscheckConfig::default())
}

fn print_usage() {
    println!("usage: crosscheck-cli [--config <path>] [--prior <0..1>] <query> <answer>");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let Some(args) = parse_args(&argv)? else {
        print_usage();
        return Ok(());
    };

    let config = load_config(args.config.as_ref())?;
    let crosscheck = Crosscheck::new(config)?;
    let report = crosscheck.answer(&args.query, &args.answer, args.prior).await;
    crosscheck.shutdown().await;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn parses_positionals_and_flags() {
        let args = parse_args(&argv(&["--prior", "0.7", "what is ebitda", "An earnings metric", "-c", "x.toml"]))
            .unwrap()
            .unwrap();
        assert_eq!(args.query, "what is ebitda");
        assert_eq!(args.answer, "An earnings metric");
        assert_eq!(args.prior, Some(0.7));
        assert_eq!(args.config, Some(PathBuf::from("x.toml")));
    }

    #[test]
    fn help_short_circuits() {
        assert!(parse_args(&argv(&["--help"])).unwrap().is_none());
    }

    #[test]
    fn wrong_arity_and_bad_prior_are_errors() {
        assert!(parse_args(&argv(&["only a query"])).is_err());
        assert!(parse_args(&argv(&["q", "a", "extra"])).is_err());
        assert!(parse_args(&argv(&["--prior", "high", "q", "a"])).is_err());
        assert!(parse_args(&argv(&["--config"])).is_err());
        assert!(parse_args(&argv(&["  ", "a"])).is_err());
    }
}

//! Command-line interface
//!
//! Loads a fixture set and the pricing configuration, then dispatches to a subcommand.

use std::{io, path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand, ValueEnum};
use jiff::{Zoned, civil::DateTime};
use promocart::{
    config::{ConfigError, PricingConfig},
    fixtures::{Fixture, FixtureError},
    receipt::ReceiptError,
};
use thiserror::Error;

mod check;
mod list_discounts;
mod list_promotions;
pub(crate) mod logging;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error("failed to load pricing configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to load fixtures: {0}")]
    Fixture(#[from] FixtureError),

    #[error("failed to write output: {0}")]
    Receipt(#[from] ReceiptError),

    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

/// Output format for command results.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Terminal tables
    #[default]
    Table,

    /// Pretty-printed JSON
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "promocart", about = "Apply promo codes to fixture carts", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) logging: logging::LoggingConfig,

    /// Directory holding the fixture sets
    #[arg(long, env = "PROMOCART_FIXTURES", default_value = "./fixtures")]
    fixtures: PathBuf,

    /// Fixture set to load
    #[arg(long, default_value = "tea-shop")]
    set: String,

    /// Pricing configuration file (YAML); defaults apply when omitted
    #[arg(long, env = "PROMOCART_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Price a fixture cart with a promo code
    Check(check::CheckArgs),

    /// List the promotions in the fixture set
    ListPromotions(list_promotions::ListPromotionsArgs),

    /// List the flat discounts in the fixture set
    ListDiscounts(list_discounts::ListDiscountsArgs),
}

impl Cli {
    /// Parse arguments, reading a `.env` file first if there is one.
    pub(crate) fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    pub(crate) fn run(self) -> Result<ExitCode, CliError> {
        let fixture = self.load_fixture()?;
        let config = self.pricing_config()?;

        match self.command {
            Commands::Check(args) => check::run(args, &fixture, &config),
            Commands::ListPromotions(args) => list_promotions::run(&args, &fixture),
            Commands::ListDiscounts(args) => list_discounts::run(&args, &fixture),
        }
    }

    #[tracing::instrument(
        name = "promocart.cli.load_fixture",
        skip(self),
        fields(set = %self.set),
        err
    )]
    fn load_fixture(&self) -> Result<Fixture, FixtureError> {
        let mut fixture = Fixture::with_base_path(&self.fixtures);

        fixture.load_set(&self.set)?;

        tracing::debug!(
            carts = fixture.cart_names().len(),
            promotions = fixture.catalog().promotions().count(),
            "fixture set loaded"
        );

        Ok(fixture)
    }

    fn pricing_config(&self) -> Result<PricingConfig, ConfigError> {
        self.config
            .as_deref()
            .map_or_else(|| Ok(PricingConfig::default()), PricingConfig::load)
    }
}

/// `now` as given, or the local wall-clock time.
fn resolve_now(now: Option<DateTime>) -> DateTime {
    now.unwrap_or_else(|| Zoned::now().datetime())
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn check_arguments_parse() -> TestResult {
        let cli = Cli::try_parse_from([
            "promocart",
            "--set",
            "tea-shop",
            "check",
            "--cart",
            "two-coffees",
            "--code",
            "PICK",
            "--select",
            "mug,cup",
            "--now",
            "2026-06-01T12:00:00",
            "--format",
            "json",
        ])?;

        let Commands::Check(args) = cli.command else {
            panic!("expected the check command");
        };

        assert_eq!(args.select, vec!["mug".to_string(), "cup".to_string()]);
        assert_eq!(args.now.map(|now| now.date().day()), Some(1));
        assert!(matches!(args.format, OutputFormat::Json));

        Ok(())
    }

    #[test]
    fn list_discounts_arguments_parse() -> TestResult {
        let cli = Cli::try_parse_from([
            "promocart",
            "list-discounts",
            "--now",
            "2026-06-10T09:00:00",
            "--format",
            "json",
        ])?;

        assert!(matches!(cli.command, Commands::ListDiscounts(_)));

        Ok(())
    }

    #[test]
    fn check_requires_a_code() {
        let result = Cli::try_parse_from(["promocart", "check", "--cart", "three-teas"]);

        assert!(result.is_err());
    }

    #[test]
    fn resolve_now_prefers_the_given_time() {
        let now = jiff::civil::date(2026, 6, 1).at(9, 30, 0, 0);

        assert_eq!(resolve_now(Some(now)), now);
    }
}

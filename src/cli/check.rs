//! `check`: price a fixture cart with a promo code.

use std::{
    io::{self, Write},
    process::ExitCode,
};

use clap::Args;
use jiff::civil::DateTime;
use promocart::{
    calculator::{PromotionCalculator, PromotionOutcome, PromotionRequest},
    config::PricingConfig,
    fixtures::Fixture,
    products::ProductId,
    receipt::{ErrorView, OutcomeView, write_json, write_selection},
};

use super::{CliError, OutputFormat, resolve_now};

/// Exit status when the promotion is rejected.
const REJECTED: u8 = 2;

#[derive(Debug, Args)]
pub(crate) struct CheckArgs {
    /// Cart name from the fixture set
    #[arg(long)]
    pub(crate) cart: String,

    /// Promo code (case-sensitive)
    #[arg(long)]
    pub(crate) code: String,

    /// Discounted product ids to choose, comma separated
    #[arg(long, value_delimiter = ',')]
    pub(crate) select: Vec<String>,

    /// Evaluation time, e.g. 2026-06-01T12:00:00; the local time when omitted
    #[arg(long)]
    pub(crate) now: Option<DateTime>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub(crate) format: OutputFormat,
}

pub(crate) fn run(
    args: CheckArgs,
    fixture: &Fixture,
    config: &PricingConfig,
) -> Result<ExitCode, CliError> {
    let cart = fixture.cart(&args.cart)?.clone();
    let mut request = PromotionRequest::new(args.code, cart);

    if !args.select.is_empty() {
        let selection: Vec<ProductId> = args.select.into_iter().map(ProductId::from).collect();

        request = request.with_selection(selection);
    }

    let calculator = PromotionCalculator::from_snapshot(fixture.catalog(), config)?;
    let outcome = calculator.calculate(&request, resolve_now(args.now));

    let mut out = io::stdout().lock();

    match (outcome, args.format) {
        (Ok(outcome), OutputFormat::Json) => write_json(&mut out, &OutcomeView::from(&outcome))?,
        (Ok(PromotionOutcome::Priced(result)), OutputFormat::Table) => result.write_to(&mut out)?,
        (Ok(PromotionOutcome::SelectionRequired(candidates)), OutputFormat::Table) => {
            write_selection(&mut out, &candidates)?;
        }
        (Err(error), OutputFormat::Json) => {
            write_json(&mut out, &ErrorView::from(&error))?;

            return Ok(ExitCode::from(REJECTED));
        }
        (Err(error), OutputFormat::Table) => {
            writeln!(io::stderr(), "{:?}: {error}", error.kind())?;

            return Ok(ExitCode::from(REJECTED));
        }
    }

    Ok(ExitCode::SUCCESS)
}

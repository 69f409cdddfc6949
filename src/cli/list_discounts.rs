//! `list-discounts`

use std::{io, process::ExitCode};

use clap::Args;
use jiff::civil::DateTime;
use promocart::{
    fixtures::Fixture,
    receipt::{FlatDiscountView, write_flat_discounts, write_json},
};

use super::{CliError, OutputFormat, resolve_now};

#[derive(Debug, Args)]
pub(crate) struct ListDiscountsArgs {
    /// Time the active column is computed for; the local time when omitted
    #[arg(long)]
    now: Option<DateTime>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

pub(crate) fn run(args: &ListDiscountsArgs, fixture: &Fixture) -> Result<ExitCode, CliError> {
    let today = resolve_now(args.now).date();
    let discounts = fixture.catalog().flat_discounts();
    let out = io::stdout().lock();

    match args.format {
        OutputFormat::Table => write_flat_discounts(out, discounts, today)?,
        OutputFormat::Json => {
            let views: Vec<FlatDiscountView> = discounts
                .map(|discount| FlatDiscountView::new(discount, today))
                .collect();

            write_json(out, &views)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

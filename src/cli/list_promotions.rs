//! `list-promotions`

use std::{io, process::ExitCode};

use clap::Args;
use jiff::civil::DateTime;
use promocart::{
    fixtures::Fixture,
    receipt::{PromotionView, write_json, write_promotions},
};

use super::{CliError, OutputFormat, resolve_now};

#[derive(Debug, Args)]
pub(crate) struct ListPromotionsArgs {
    /// Time the status column is computed for; the local time when omitted
    #[arg(long)]
    now: Option<DateTime>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

pub(crate) fn run(args: &ListPromotionsArgs, fixture: &Fixture) -> Result<ExitCode, CliError> {
    let now = resolve_now(args.now);
    let catalog = fixture.catalog();
    let out = io::stdout().lock();

    match args.format {
        OutputFormat::Table => write_promotions(out, catalog.promotions(), now)?,
        OutputFormat::Json => {
            let mut views: Vec<(&str, PromotionView)> = catalog
                .promotions()
                .map(|(promotion, products)| {
                    (promotion.promo_code(), PromotionView::new(promotion, products, now))
                })
                .collect();

            views.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));

            let views: Vec<PromotionView> = views.into_iter().map(|(_, view)| view).collect();

            write_json(out, &views)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

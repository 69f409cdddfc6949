//! Promocart CLI
//!
//! Applies promo codes to the carts in a YAML fixture set.

use std::process::ExitCode;

mod cli;

fn main() -> ExitCode {
    let cli = match cli::Cli::load() {
        Ok(cli) => cli,
        Err(error) => error.exit(),
    };

    if let Err(error) = cli::logging::init(&cli.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging is not available when its own setup fails."
        )]
        {
            eprintln!("failed to initialise logging: {error}");
        }

        return ExitCode::FAILURE;
    }

    match cli.run() {
        Ok(code) => code,
        Err(error) => {
            tracing::error!(error = %error, "command failed");

            #[expect(
                clippy::print_stderr,
                reason = "errors are reported to the terminal as well as the log."
            )]
            {
                eprintln!("error: {error}");
            }

            ExitCode::FAILURE
        }
    }
}

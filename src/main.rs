use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use price_tracker::cli::{parse_cron_job, Shell};
use price_tracker::configuration::get_configuration;
use price_tracker::create_app;
use price_tracker::errors::Error;
use price_tracker::telemetry::init_tracing;
use std::io;
use std::process::ExitCode;
use tracing::info;

/// Track product prices and get an email once they drop.
#[derive(Debug, Parser)]
#[command(name = "price-tracker", version)]
struct Cli {
    /// `cron_job=true` checks every tracked price once and exits.
    /// Absent or false opens the shell.
    #[arg(value_name = "cron_job=<value>", value_parser = cron_job_flag)]
    cron_job: Option<bool>,
    /// Keep checking every `scheduler.interval_secs` until interrupted.
    #[arg(long, requires = "cron_job")]
    repeat: bool,
}

impl Cli {
    /// Whether this invocation is a scheduled run rather than the shell.
    fn scheduled(&self) -> Result<bool, clap::Error> {
        let scheduled = self.cron_job.unwrap_or(false);
        if self.repeat && !scheduled {
            return Err(Cli::command().error(
                ErrorKind::ArgumentConflict,
                "--repeat only applies to cron_job=true",
            ));
        }
        Ok(scheduled)
    }
}

fn cron_job_flag(raw: &str) -> Result<bool, String> {
    parse_cron_job(raw).map_err(|e| e.to_string())
}

async fn run(cli: Cli, scheduled: bool) -> Result<(), Error> {
    let configuration = get_configuration()?;
    init_tracing(&configuration.log_level);
    let app = create_app(configuration).await?;

    if !scheduled {
        let stdin = io::stdin();
        let mut shell = Shell::new(app.db.clone(), stdin.lock(), io::stdout());
        shell.run().await?;
        return Ok(());
    }

    let scheduler = app.scheduler()?;
    if cli.repeat {
        let period = app.settings.scheduler.interval();
        info!(every_secs = period.as_secs(), "starting repeated price checks");
        tokio::select! {
            _ = scheduler.run_every(period, |summary| println!("{summary}")) => {}
            _ = tokio::signal::ctrl_c() => info!("stopping price checks"),
        }
    } else {
        let summary = scheduler.run_once().await?;
        println!("{summary}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let scheduled = match cli.scheduled() {
        Ok(scheduled) => scheduled,
        Err(e) => e.exit(),
    };
    match run(cli, scheduled).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("price-tracker: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<bool, clap::Error> {
        Cli::try_parse_from(args)?.scheduled()
    }

    #[test]
    fn cron_job_selects_scheduled_run() {
        assert!(parse(&["price-tracker", "cron_job=true"]).expect("Failed to parse"));
        assert!(parse(&["price-tracker", "cron_job=1", "--repeat"]).expect("Failed to parse"));
        assert!(!parse(&["price-tracker"]).expect("Failed to parse"));
        assert!(!parse(&["price-tracker", "cron_job=false"]).expect("Failed to parse"));
    }

    #[test]
    fn repeat_without_cron_job_is_rejected() {
        let missing = parse(&["price-tracker", "--repeat"]).expect_err("Accepted --repeat");
        assert_eq!(missing.kind(), ErrorKind::MissingRequiredArgument);
        let disabled =
            parse(&["price-tracker", "cron_job=false", "--repeat"]).expect_err("Accepted --repeat");
        assert_eq!(disabled.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn unknown_cron_job_value_is_rejected() {
        let error = parse(&["price-tracker", "cron_job=sometimes"]).expect_err("Accepted value");
        assert_eq!(error.kind(), ErrorKind::ValueValidation);
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::process::ExitCode;

use clap::Parser;
use ghactivity_app::cli::{Cli, Command};
use ghactivity_app::{CrawlError, SummaryReport, crawl, summarize, summary_json};
use ghactivity_fetcher::Fetcher;
use ghactivity_source::ActivitySource;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = e.exit_code();
            eprintln!("Error: {:#}", anyhow::Error::from(e));
            ExitCode::from(code)
        }
    }
}

async fn run(cli: Cli) -> Result<(), CrawlError> {
    match cli.command {
        Command::Crawl(args) => {
            let config = args.config()?;
            let source = args.source(&config);
            log::info!(
                "Crawling activity of {} from {} ({})",
                config.username(),
                args.api_url,
                source.source_name()
            );

            let fetcher = Fetcher::new(source, config)
                .with_retry_policy(args.retry_policy())
                .with_page_delay(args.page_delay());

            let report = crawl(&fetcher, &args.output).await?;

            println!(
                "Wrote {} records to {} ({} pages, {} skipped, {} outside window)\n",
                report.written,
                report.output.display(),
                report.pages,
                report.skipped,
                report.out_of_window
            );
            print!("{}", SummaryReport::new(&report.summary, 10));
        }
        Command::Summarize(args) => {
            let summary = summarize(&args.input, &args.user)?;
            if args.json {
                println!("{}", summary_json(&summary)?);
            } else {
                print!("{}", SummaryReport::new(&summary, args.top));
            }
        }
    }

    Ok(())
}

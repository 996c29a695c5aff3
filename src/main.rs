//! Main entry point for hkget CLI

use clap::Parser;
use hkget::cli::output::OutputFormatter;
use hkget::cli::Args;
use hkget::{Extractor, HkError};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.default_log_filter());
    debug!("Starting hkget with args: {:?}", args);

    // Initialize output formatter
    let formatter = OutputFormatter::new(args.verbosity_level());

    if args.url.is_empty() {
        formatter.print_help();
        return ExitCode::SUCCESS;
    }

    match run(&args, &formatter).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            formatter.error(&describe_error(&error));
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args, formatter: &OutputFormatter) -> Result<(), HkError> {
    let extractor = build_extractor(args);

    if args.list_episodes {
        let episodes = extractor.list_episodes(&args.url).await?;
        let current = args
            .episode
            .or_else(|| hkget::utils::parse_episode_url(&args.url).ok().map(|u| u.episode));
        formatter.print_episode_list(&episodes, current);
        return Ok(());
    }

    let media = extractor.extract_episode(&args.url, args.episode).await?;
    info!("Extraction completed: {}", media.title);

    if args.print_url {
        formatter.print_urls(&media);
    } else if args.dump_json {
        formatter.print_json(&media)?;
    } else {
        formatter.print_media_info(&media);
    }

    Ok(())
}

fn build_extractor(args: &Args) -> Extractor {
    let mut extractor = Extractor::new()
        .with_timeout(args.timeout_duration())
        .with_max_retries(args.retries);

    if let Some(user_agent) = &args.user_agent {
        extractor = extractor.with_user_agent(user_agent);
    }
    if let Some(referer) = &args.referer {
        extractor = extractor.with_referer(referer);
    }
    if let Some(proxy) = &args.proxy {
        extractor = extractor.with_proxy(proxy);
    }

    extractor
}

/// User-facing message for an extraction failure
fn describe_error(error: &HkError) -> String {
    match error {
        HkError::EpisodeNotFound { .. } => format!("episode not found: {}", error),
        e if e.is_unsupported_page() => format!("unsupported page format: {}", error),
        _ => error.to_string(),
    }
}

/// Initialize logging system
fn init_logging(default_filter: &str) {
    // RUST_LOG wins over the verbosity flags
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

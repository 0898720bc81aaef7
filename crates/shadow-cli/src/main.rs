use clap::Parser;
use shadow_core::ShadowError;

mod bootstrap;
mod cli;
mod commands;
mod output;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("shadowctl error: {error:#}");
        if let Some(hint) = failure_hint(&error) {
            eprintln!("hint: {hint}");
        }
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let flags = cli.global_flags();
    let config = bootstrap::load_config()?;

    match &cli.command {
        cli::Commands::Status(args) => commands::status::handle(args, &config, &flags).await,
        cli::Commands::Report(args) => commands::report::handle(args, &config, &flags).await,
        cli::Commands::Provision(args) => commands::provision::handle(args, &config, &flags).await,
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("SHADOWSYNC_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

/// Follow-up advice for store failures tied to one asset.
fn failure_hint(error: &anyhow::Error) -> Option<String> {
    let shadow = error.downcast_ref::<ShadowError>()?;
    let asset = shadow.asset()?;
    if shadow.is_retryable() {
        Some(format!("the store failed transiently on '{asset}', retrying may succeed"))
    } else if matches!(shadow, ShadowError::NotFound { .. }) {
        Some(format!("'{asset}' has no shadow yet, check the id or `shadowctl report` it first"))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Context;
    use shadow_core::AssetId;

    use super::*;

    #[test]
    fn transient_failures_suggest_a_retry() {
        let error = Err::<(), _>(ShadowError::Transient {
            asset: AssetId::new("bus-1"),
            message: "HTTP 503".into(),
        })
        .context("batch failed")
        .unwrap_err();
        let hint = failure_hint(&error).unwrap();
        assert!(hint.contains("bus-1"));
        assert!(hint.contains("retrying"));
    }

    #[test]
    fn missing_shadow_points_at_the_id() {
        let error = anyhow::Error::from(ShadowError::NotFound {
            asset: AssetId::new("ghost"),
        });
        assert!(failure_hint(&error).unwrap().contains("'ghost' has no shadow"));
    }

    #[test]
    fn errors_without_an_asset_get_no_hint() {
        let error = anyhow::Error::from(ShadowError::Auth("expired".into()));
        assert!(failure_hint(&error).is_none());
        assert!(failure_hint(&anyhow::anyhow!("bad flag")).is_none());
    }
}

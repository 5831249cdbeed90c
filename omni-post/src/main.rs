//! omni-post - Publish one message to many providers

use clap::Parser;
use libomnicast::logging::LoggingConfig;
use libomnicast::variant::generate_variant;
use libomnicast::{
    BatchResult, Config, Dispatcher, OmnicastError, PostRequest, ProviderRegistry, Result,
};
use std::io::{IsTerminal, Read, Write};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "omni-post")]
#[command(version, about = "Publish one message to Bluesky, Mastodon, Slack and Discord")]
#[command(long_about = r#"Publish one message to several providers at once and report each outcome.

EXAMPLES:
    # Post to every configured provider
    omni-post "Hello world"

    # Pick providers (repeatable or comma-separated)
    omni-post "Hello world" --provider bluesky,mastodon
    omni-post "Hello world" -p slack -p discord

    # Read the message from stdin, print JSON results
    echo "Release 1.2 is out" | omni-post --format json

    # Add hashtags and a call to action before posting
    omni-post --variant "We shipped the new dashboard. Try it today!"

    # Show which providers are configured
    omni-post --list-providers

CONFIGURATION:
    $OMNICAST_CONFIG or ~/.config/omnicast/config.toml, overlaid with
    BLUESKY_IDENTIFIER, BLUESKY_APP_PASSWORD, MASTODON_INSTANCE,
    MASTODON_ACCESS_TOKEN, SLACK_WEBHOOK_URL, DISCORD_WEBHOOK_URL

EXIT CODES:
    0 - At least one provider succeeded
    1 - Every provider failed, or configuration error
    3 - Invalid input (empty message, no providers)
"#)]
struct Cli {
    /// Message to post (reads from stdin if not provided)
    content: Option<String>,

    /// Provider(s) to post to; defaults to the configured ones
    #[arg(short = 'p', long = "provider", value_name = "PROVIDER", value_delimiter = ',')]
    providers: Vec<String>,

    /// Output format
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Rewrite the message with hashtags and a call to action first
    #[arg(long)]
    variant: bool,

    /// Print which providers are configured and exit
    #[arg(long)]
    list_providers: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    LoggingConfig::from_env(cli.verbose).init();

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    let config = Config::load()?;

    if cli.list_providers {
        print_capabilities(&config, &cli.format);
        return Ok(0);
    }

    let content = match cli.content {
        Some(content) => content,
        None => read_stdin()?,
    };
    let message = if cli.variant {
        generate_variant(&content)
    } else {
        content
    };

    let providers = select_providers(cli.providers, &config);
    tracing::debug!("Requested providers: {:?}", providers);

    let registry = Arc::new(ProviderRegistry::from_config(&config)?);
    let dispatcher = Dispatcher::new(registry).with_timeout(config.timeout());

    let batch = dispatcher
        .dispatch_request(PostRequest { message, providers })
        .await?;

    print_batch(&batch, &cli.format);

    Ok(if batch.any_ok { 0 } else { 1 })
}

/// Explicit providers win, then `defaults.providers`, then everything configured
fn select_providers(requested: Vec<String>, config: &Config) -> Vec<String> {
    let requested: Vec<String> = requested
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();

    if !requested.is_empty() {
        return requested;
    }
    if !config.defaults.providers.is_empty() {
        return config.defaults.providers.clone();
    }
    config
        .configured_providers()
        .iter()
        .map(|kind| kind.as_str().to_string())
        .collect()
}

fn read_stdin() -> Result<String> {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(String::new());
    }

    let mut content = String::new();
    stdin
        .read_to_string(&mut content)
        .map_err(|e| OmnicastError::InvalidInput(format!("Failed to read stdin: {}", e)))?;
    Ok(content)
}

fn print_batch(batch: &BatchResult, format: &str) {
    let mut stdout = std::io::stdout().lock();

    let written = if format == "json" {
        serde_json::to_writer_pretty(&mut stdout, batch)
            .map_err(std::io::Error::from)
            .and_then(|_| writeln!(stdout))
    } else {
        batch.results.iter().try_for_each(|result| {
            if result.ok {
                match &result.url {
                    Some(url) => writeln!(stdout, "{}: Success {}", result.provider, url),
                    None => writeln!(stdout, "{}: Success", result.provider),
                }
            } else {
                writeln!(
                    stdout,
                    "{}: Failed - {}",
                    result.provider,
                    result.error.as_deref().unwrap_or("Failed")
                )
            }
        })
    };

    if let Err(e) = written {
        tracing::warn!("Failed to write results: {}", e);
    }
}

fn print_capabilities(config: &Config, format: &str) {
    let capabilities = config.capabilities();

    if format == "json" {
        println!("{}", serde_json::json!({ "providers": capabilities }));
    } else {
        for (kind, configured) in capabilities {
            let status = if configured { "configured" } else { "not configured" };
            println!("{}: {}", kind, status);
        }
    }
}

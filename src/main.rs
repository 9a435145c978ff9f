use anyhow::Result;
use console::Term;
use guardian_news::{config, news};
use std::env;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt as tfmt};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they don't tear the list on stdout.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    // Parse a minimal CLI: optional --config <path>
    let mut args = env::args().skip(1);
    let mut config_override: Option<String> = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                if let Some(p) = args.next() {
                    config_override = Some(p);
                }
            }
            "-h" | "--help" => {
                print_help();
                return Ok(());
            }
            _ => {}
        }
    }

    let cfg = config::load(config_override)?;
    info!(topic = %cfg.topic, endpoint = %cfg.endpoint, "configuration loaded");

    let _ = Term::stdout().clear_screen();
    news::run(&cfg).await
}

fn print_help() {
    println!("guardian-news");
    println!("Usage: guardian-news [--config <path>]");
    println!("  --config <path>   Path to a config.toml (endpoint, topic, api_key, open_command, header)");
    println!("  RUST_LOG          Log filter, e.g. RUST_LOG=debug (logs go to stderr)");
}

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tempd::{Service, Settings};

#[derive(Parser, Debug)]
#[command(name = "tempd")]
#[command(about = "Aggregates 1-wire sensor readings and serves them to pull-based collectors")]
struct Args {
    /// Path to the configuration file (default: tempd.toml, if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on for report connections
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on for report connections
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level filter (e.g. "info", "tempd=debug"); RUST_LOG takes precedence
    #[arg(long)]
    log_level: Option<String>,

    /// Measurement process and its arguments
    #[arg(last = true)]
    command: Vec<String>,
}

impl Args {
    fn apply(self, settings: &mut Settings) {
        if let Some(host) = self.host {
            settings.listen.host = host;
        }
        if let Some(port) = self.port {
            settings.listen.port = port;
        }
        if let Some(level) = self.log_level {
            settings.logging.level = level;
        }

        let mut command = self.command.into_iter();
        if let Some(path) = command.next() {
            settings.process.path = PathBuf::from(path);
            settings.process.args = command.collect();
        }
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref()).context("loading configuration")?;
    args.apply(&mut settings);
    settings.validate()?;

    init_tracing(&settings.logging.level);

    let running = Service::start(&settings).await?;
    running
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_command_replaces_process() {
        let args = Args::parse_from([
            "tempd",
            "--port",
            "4000",
            "--",
            "/opt/onewire-probe",
            "/dev/ttyUSB0",
        ]);
        let mut settings = Settings::default();
        args.apply(&mut settings);

        assert_eq!(settings.listen.port, 4000);
        assert_eq!(settings.listen.host, "127.0.0.1");
        assert_eq!(settings.process.path, PathBuf::from("/opt/onewire-probe"));
        assert_eq!(settings.process.args, vec!["/dev/ttyUSB0"]);
    }

    #[test]
    fn no_overrides_keep_settings() {
        let args = Args::parse_from(["tempd"]);
        let mut settings = Settings::default();
        args.apply(&mut settings);

        assert_eq!(settings.listen.addr(), "127.0.0.1:31338");
        assert_eq!(settings.process.path, PathBuf::from("onewire-probe"));
        assert_eq!(settings.logging.level, "info");
    }
}

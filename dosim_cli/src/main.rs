mod cli;
mod run;

use clap::Parser;
use cli::{Cli, Commands, FILE_GUARD};
use eyre::{Result, WrapErr};
use std::fs;
use std::path::Path;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Cli::parse();

    let cfg = load_config(&args)?;
    init_tracing(&args, &cfg.logging)?;
    cfg.validate().wrap_err("invalid configuration")?;

    match &args.cmd {
        Commands::Run {
            seed,
            period_s,
            ticks,
            dry_run,
        } => run::run_simulation(
            &cfg,
            &run::RunOpts {
                seed: *seed,
                period_s: *period_s,
                ticks: *ticks,
                dry_run: *dry_run,
            },
        ),
        Commands::CheckConfig => {
            let tls = if cfg.mqtt.tls { "tls" } else { "plain" };
            println!(
                "config ok: {} device(s), period {}s, broker {}:{} ({tls}), qos {}, \
                 topic root {}/{}",
                cfg.sim.devices.len(),
                cfg.sim.period_s,
                cfg.mqtt.host,
                cfg.mqtt.port,
                cfg.mqtt.qos,
                cfg.sim.topic_root,
                cfg.sim.product_code,
            );
            Ok(())
        }
    }
}

/// Config precedence: file (when given or present at the default path),
/// then environment-variable overrides on top.
fn load_config(args: &Cli) -> Result<dosim_config::Config> {
    let default_path = Path::new("etc/dosim.toml");
    let mut cfg = if let Some(path) = &args.config {
        let content = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read config file {}", path.display()))?;
        dosim_config::load_toml(&content)
            .wrap_err_with(|| format!("failed to parse config file {}", path.display()))?
    } else if default_path.exists() {
        let content = fs::read_to_string(default_path).wrap_err("failed to read etc/dosim.toml")?;
        dosim_config::load_toml(&content).wrap_err("failed to parse etc/dosim.toml")?
    } else {
        dosim_config::Config::default()
    };
    cfg.apply_env().wrap_err("invalid environment override")?;
    Ok(cfg)
}

/// Console layer (pretty or JSON) plus an optional JSON-lines file layer
/// with the configured rotation policy.
fn init_tracing(args: &Cli, logging: &dosim_config::Logging) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level.clone()));

    // Console logs go to stderr; stdout is reserved for dry-run records.
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    layers.push(if args.json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().with_writer(std::io::stderr).boxed()
    });

    if let Some(path) = &logging.file {
        let path = Path::new(path);
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
        let file_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_else(|| "dosim.log".into());
        let appender = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, file_name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, file_name),
            _ => tracing_appender::rolling::never(dir, file_name),
        };
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        layers.push(
            fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_ansi(false)
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .init();
    Ok(())
}

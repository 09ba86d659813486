use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};
use paycore::PayCoreConfig;

#[derive(Subcommand, Debug)]
pub enum ConfigCmd {
    /// Validate a payments.toml file without starting anything.
    Check(ConfigArgs),
    /// Load and pretty-print the resolved configuration as JSON.
    Dump(ConfigArgs),
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Path to the payments.toml file.
    #[arg(long, default_value = "config/payments.toml")]
    pub config: String,
}

pub fn run(cmd: ConfigCmd) -> Result<()> {
    match cmd {
        ConfigCmd::Check(args) => run_check(args),
        ConfigCmd::Dump(args) => run_dump(args),
    }
}

fn run_check(args: ConfigArgs) -> Result<()> {
    PayCoreConfig::from_file(&args.config)
        .map_err(|e| anyhow!("invalid config: {e}"))?;
    println!("{} is valid", args.config);
    Ok(())
}

fn run_dump(args: ConfigArgs) -> Result<()> {
    let config = PayCoreConfig::from_file(&args.config)
        .map_err(|e| anyhow!("invalid config: {e}"))?;

    let view = serde_json::json!({
        "gateways": config.gateways,
        "max_attempts": config.max_attempts,
        "cb": {
            "failure_threshold": config.sentinel_params.failure_threshold,
            "recovery_timeout_secs": config.sentinel_params.recovery_timeout.as_secs(),
            "window_size": config.sentinel_params.window_size,
        },
        "rng_seed": config.rng_seed,
    });
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

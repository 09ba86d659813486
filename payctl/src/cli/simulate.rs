use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Args;
use paycore::gateway::{SimulatedGateway, SimulatedGatewayParams};
use paycore::orchestrator::{Orchestrator, ProcessRequest};
use paycore::router::{Router, StdRngSource};
use paycore::sentinel::Sentinel;
use paycore::PayCoreConfig;
use rust_decimal::Decimal;

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Path to the payments.toml file.
    #[arg(long, default_value = "config/payments.toml")]
    pub config: String,

    /// Number of transactions to drive through the engine.
    #[arg(long, default_value_t = 10)]
    pub count: u32,

    /// Per-gateway simulated success rate in (0, 1].
    #[arg(long, default_value_t = 0.9)]
    pub success_rate: f64,
}

pub async fn run(args: SimulateArgs) -> Result<()> {
    let config = PayCoreConfig::from_file(&args.config)
        .map_err(|e| anyhow!("invalid config: {e}"))?;

    let rng = match config.rng_seed {
        Some(seed) => StdRngSource::seeded(seed),
        None => StdRngSource::from_os_entropy(),
    };
    let router = Arc::new(Router::new(config.gateways.clone(), Box::new(rng)));
    let sentinel = Arc::new(Sentinel::new(config.sentinel_params));

    let fleet = config.gateways.iter().map(|g| {
        (
            g.clone(),
            SimulatedGatewayParams {
                success_rate: args.success_rate,
                ..SimulatedGatewayParams::default()
            },
        )
    });
    let gateway_effect = Arc::new(SimulatedGateway::new(fleet));

    let orchestrator = Orchestrator::new(
        config.gateways.clone(),
        router,
        sentinel,
        gateway_effect,
        config.max_attempts,
    );

    let mut successes = 0u32;
    for _ in 0..args.count {
        let response = orchestrator
            .process(
                ProcessRequest {
                    transaction_id: None,
                    amount: Decimal::new(1000, 2),
                    currency: "USD".to_string(),
                    payment_method: "card".to_string(),
                    merchant_id: "simulated-merchant".to_string(),
                    client_metadata: Default::default(),
                },
                None,
            )
            .await;
        if response.success {
            successes += 1;
        }
    }

    println!(
        "{successes}/{} transactions succeeded",
        args.count
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&orchestrator.observe())?
    );
    Ok(())
}

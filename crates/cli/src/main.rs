//! Command line interface for the concentrated-liquidity periphery.
use anyhow::{Result, anyhow, bail};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use periphery_domain::fees::FeeAmount;
use periphery_domain::params::ExactInputSingleParams;
use periphery_domain::path::Path;
use periphery_domain::pool::{PoolKey, compute_pool_address};
use periphery_domain::token::parse_address;
use periphery_execution::fixture::CompleteFixture;
use periphery_execution::periphery::{Call, CallOutput};
use periphery_execution::router::{RouterCall, RouterOutput};
use periphery_execution::sequencer::SharedPeriphery;
use periphery_simulation::world::World;
use primitive_types::U256;
use serde_json::{Value, json};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "periphery")]
#[command(about = "Swap routing and liquidity tooling for concentrated-liquidity pools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a multi-hop swap path
    EncodePath {
        /// Comma-separated token addresses, in swap order
        #[arg(long, value_delimiter = ',', required = true)]
        tokens: Vec<String>,

        /// Comma-separated pool fees in hundredths of a bip (500, 3000, 10000)
        #[arg(long, value_delimiter = ',', required = true)]
        fees: Vec<u32>,
    },
    /// Decode a hex-encoded swap path into its hops
    DecodePath {
        /// Path bytes, with or without a 0x prefix
        path: String,
    },
    /// Compute the deterministic address of a pool
    PoolAddress {
        /// Pool factory address
        #[arg(long, env = "PERIPHERY_FACTORY")]
        factory: String,

        /// First token address (either order)
        #[arg(long)]
        token_a: String,

        /// Second token address (either order)
        #[arg(long)]
        token_b: String,

        /// Pool fee in hundredths of a bip
        #[arg(long, default_value_t = 3000)]
        fee: u32,
    },
    /// Deploy the reference fixture and run one exact-input swap
    DemoSwap {
        /// Amount of the first test token to sell
        #[arg(long, default_value_t = 1000)]
        amount_in: u128,

        /// Minimum acceptable output
        #[arg(long, default_value_t = 0)]
        amount_out_minimum: u128,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::EncodePath { tokens, fees } => {
            let tokens = tokens
                .iter()
                .map(|t| parse_address(t.trim()))
                .collect::<Result<Vec<_>, _>>()?;
            let fees = fees
                .iter()
                .map(|&f| FeeAmount::from_pips(f))
                .collect::<Result<Vec<_>, _>>()?;
            let path = Path::encode(&tokens, &fees)?;
            println!("{path}");
        }
        Commands::DecodePath { path } => {
            let path: Path = path.trim().parse()?;
            let hops: Vec<Value> = path
                .hops()?
                .into_iter()
                .map(|hop| {
                    json!({
                        "token_in": format!("{:?}", hop.token_in),
                        "fee": hop.fee.pips(),
                        "token_out": format!("{:?}", hop.token_out),
                    })
                })
                .collect();
            let decoded = json!({
                "pools": path.num_pools(),
                "hops": hops,
            });
            println!("{}", serde_json::to_string_pretty(&decoded)?);
        }
        Commands::PoolAddress {
            factory,
            token_a,
            token_b,
            fee,
        } => {
            let factory = parse_address(factory)?;
            let key = PoolKey::new(
                parse_address(token_a)?,
                parse_address(token_b)?,
                FeeAmount::from_pips(*fee)?,
            )?;
            let pool = compute_pool_address(factory, &key);
            println!("{pool:?}");
        }
        Commands::DemoSwap {
            amount_in,
            amount_out_minimum,
        } => {
            let report =
                demo_swap(U256::from(*amount_in), U256::from(*amount_out_minimum)).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

/// Sells `amount_in` of the first fixture token for the second through the
/// shared submission handle and reports the balances around the swap.
async fn demo_swap(amount_in: U256, amount_out_minimum: U256) -> Result<Value> {
    let mut fixture = CompleteFixture::new()?;
    let [token_in, token_out, _] = fixture.tokens;
    let pool = fixture.create_pool(token_in, token_out)?;
    let trader = fixture.trader;
    info!(pool = ?pool, trader = ?trader, "Fixture deployed");

    let shared = SharedPeriphery::new(fixture.periphery);
    let balances = |world: &World| {
        json!({
            "trader": {
                "token_in": world.balance_of(token_in, trader).to_string(),
                "token_out": world.balance_of(token_out, trader).to_string(),
            },
            "pool": {
                "token_in": world.balance_of(token_in, pool).to_string(),
                "token_out": world.balance_of(token_out, pool).to_string(),
            },
        })
    };

    let before = shared.read(|p| balances(p.world())).await;
    let params =
        ExactInputSingleParams::new(token_in, token_out, FeeAmount::Medium, trader, amount_in)
            .with_amount_out_minimum(amount_out_minimum);
    let output = shared
        .submit(
            trader,
            U256::zero(),
            Call::Router(RouterCall::ExactInputSingle(params)),
        )
        .await?;
    let amount_out = match output {
        CallOutput::Router(RouterOutput::Amount(amount)) => amount,
        other => bail!("unexpected swap output: {other:?}"),
    };
    let after = shared.read(|p| balances(p.world())).await;
    let receipt = shared
        .read(|p| p.last_receipt().cloned())
        .await
        .ok_or_else(|| anyhow!("swap left no receipt"))?;

    Ok(json!({
        "pool": format!("{pool:?}"),
        "token_in": format!("{token_in:?}"),
        "token_out": format!("{token_out:?}"),
        "amount_in": amount_in.to_string(),
        "amount_out": amount_out.to_string(),
        "receipt": receipt.id.to_string(),
        "events": receipt.events.len(),
        "before": before,
        "after": after,
    }))
}

/// Fetch a pool and its fee history from the subgraph and print them
use clap::Parser;
use clmm_apr::{
    apis::SubgraphClient,
    config::{read_config_file, API_KEY_ENV, CONFIG_FILE_PATH},
    display::render_stats_table,
    logger::{self, LogTag},
    pools::{average_daily_fees, PoolDataSource},
};

#[derive(Parser)]
#[command(name = "tool_subgraph_probe")]
#[command(about = "Debug tool for the subgraph pool queries", long_about = None)]
struct Args {
    /// Pool address (defaults to position.pool_address)
    #[arg(long)]
    pool: Option<String>,

    /// Days of fee history to request
    #[arg(long, default_value = "7")]
    days: u32,

    #[arg(long, default_value = CONFIG_FILE_PATH)]
    config: String,

    /// Subgraph gateway API key (falls back to SUBGRAPH_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Print the raw pool entity as well
    #[arg(long)]
    raw: bool,

    // Read by the logger from the raw argument store
    #[arg(long)]
    debug_api: bool,
    #[arg(long)]
    debug_subgraph: bool,
    #[arg(long)]
    debug_all: bool,
    #[arg(long)]
    verbose: bool,
    #[arg(long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init();

    let mut cfg = read_config_file(&args.config)?;
    if let Some(key) = args.api_key.or_else(|| std::env::var(API_KEY_ENV).ok()) {
        cfg.subgraph.api_key = key;
    }
    let pool_id = args.pool.unwrap_or_else(|| cfg.position.pool_address.clone());
    let client = SubgraphClient::new(&cfg.subgraph, cfg.estimator.default_tick_spacing)?;

    println!("Subgraph probe: {}\n", pool_id);
    println!("{}", "=".repeat(80));

    println!("\n[POOL STATE]\n");
    if args.raw {
        match client.fetch_pool(&pool_id).await {
            Ok(Some(raw)) => println!("{:#?}", raw),
            Ok(None) => println!("Pool not found"),
            Err(e) => println!("Failed to fetch pool: {}", e),
        }
        println!();
    }
    match client.get_pool_state(&pool_id).await {
        Ok(pool) => {
            println!("Name:          {}", pool.name());
            println!("Fee tier:      {}% (spacing {})", pool.fee_tier_percent(), pool.tick_spacing);
            println!("Tick:          {}", pool.current_tick);
            println!("Price:         {:.6}", pool.current_price);
            println!("Liquidity:     {}", pool.liquidity);
            println!("TVL:           ${:.2}", pool.total_value_locked_usd);
            println!("Fees (pool):   ${:.2}", pool.recent_fees_usd);
        }
        Err(e) => {
            logger::error(LogTag::Subgraph, &format!("Pool state unavailable: {}", e));
        }
    }

    println!("\n[FEE HISTORY: {} days]\n", args.days);
    match client.get_historical_fees(&pool_id, args.days).await {
        Ok(samples) if samples.is_empty() => println!("No day data in window"),
        Ok(samples) => {
            for sample in &samples {
                println!(
                    "{}  fees ${:>12.2}  volume ${:>16.2}",
                    sample.date.format("%Y-%m-%d"),
                    sample.fees_usd,
                    sample.volume_usd
                );
            }
            println!("\nAverage daily fees: ${:.2}", average_daily_fees(&samples));
        }
        Err(e) => println!("Failed to fetch fee history: {}", e),
    }

    println!("\n{}", "=".repeat(80));
    println!("\n[API STATS]");
    println!("{}", render_stats_table(&client.get_stats().await));

    Ok(())
}

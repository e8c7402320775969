use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use clmm_apr::{
    apis::SubgraphClient,
    apr::{estimate_for_pool, EmissionsPolicy, TickModel},
    arguments::print_debug_info,
    config::{self, CONFIG_FILE_PATH},
    display,
    errors::AprError,
    logger::{self, LogTag},
};

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    Interpolated,
    Proportional,
}

#[derive(Clone, Copy, ValueEnum)]
enum TickModelArg {
    Anchored,
    Exact,
}

#[derive(Parser)]
#[command(name = "clmm_apr")]
#[command(about = "Estimate the APR of a concentrated-liquidity position", long_about = None)]
struct Args {
    /// Lower bound of the price range in USD (give both bounds or neither)
    #[arg(requires = "upper")]
    lower: Option<f64>,

    /// Upper bound of the price range in USD
    upper: Option<f64>,

    /// Pool address (defaults to position.pool_address)
    #[arg(long)]
    pool: Option<String>,

    /// Configuration file
    #[arg(long, default_value = CONFIG_FILE_PATH)]
    config: String,

    /// Subgraph gateway API key (overrides config and SUBGRAPH_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Days of fee history to average
    #[arg(long)]
    days: Option<u32>,

    /// Emissions estimation policy
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// Price to tick model
    #[arg(long, value_enum)]
    tick_model: Option<TickModelArg>,

    /// Print the report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Write the default configuration to --config and exit
    #[arg(long)]
    init_config: bool,

    // Logging flags are read from the raw argument store by the logger;
    // they are declared here so clap accepts them.
    #[arg(long)]
    debug_api: bool,
    #[arg(long)]
    debug_ticks: bool,
    #[arg(long)]
    debug_fees: bool,
    #[arg(long)]
    debug_emissions: bool,
    #[arg(long)]
    debug_subgraph: bool,
    #[arg(long)]
    debug_report: bool,
    #[arg(long)]
    debug_config: bool,
    #[arg(long)]
    debug_system: bool,
    #[arg(long)]
    debug_all: bool,
    #[arg(long)]
    verbose: bool,
    #[arg(long)]
    quiet: bool,
    #[arg(long)]
    no_color: bool,
}

fn unavailable_message(err: &AprError) -> String {
    if err.is_recoverable() {
        format!("Subgraph request failed, retry later: {}", err)
    } else {
        format!("Pool data unavailable, no estimate produced: {}", err)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logger::init();

    if args.no_color {
        colored::control::set_override(false);
    }

    if args.init_config {
        config::save_config(&config::Config::default(), &args.config)
            .with_context(|| format!("failed to write {}", args.config))?;
        logger::info(
            LogTag::Config,
            &format!("Wrote default configuration to {}", args.config),
        );
        return Ok(());
    }

    print_debug_info();

    let mut cfg = config::load_config_from_path(&args.config).context("failed to load configuration")?;

    if let Some(key) = args.api_key {
        cfg.subgraph.api_key = key;
    }
    if let Some(days) = args.days {
        cfg.estimator.history_days = days;
    }
    if let Some(policy) = args.policy {
        cfg.estimator.emissions_policy = match policy {
            PolicyArg::Interpolated => EmissionsPolicy::Interpolated,
            PolicyArg::Proportional => EmissionsPolicy::Proportional,
        };
    }
    if let Some(model) = args.tick_model {
        cfg.estimator.tick_model = match model {
            TickModelArg::Anchored => TickModel::AnchoredLog,
            TickModelArg::Exact => TickModel::Exact,
        };
    }
    cfg.validate()?;

    let pool_id = args.pool.unwrap_or_else(|| cfg.position.pool_address.clone());
    let lower = args.lower.unwrap_or(cfg.position.lower_price_usd);
    let upper = args.upper.unwrap_or(cfg.position.upper_price_usd);

    logger::info(
        LogTag::System,
        &format!("Estimating APR for {} over ${} - ${}", pool_id, lower, upper),
    );

    let client = SubgraphClient::new(&cfg.subgraph, cfg.estimator.default_tick_spacing)?;

    let report = match estimate_for_pool(&client, &pool_id, lower, upper, &cfg.estimator).await {
        Ok(report) => report,
        Err(e) if e.is_unavailable() => {
            logger::error(LogTag::System, &unavailable_message(&e));
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        display::print_report(&report);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_come_in_pairs() {
        assert!(Args::try_parse_from(["clmm_apr", "2000"]).is_err());

        let args = Args::try_parse_from(["clmm_apr", "2000", "2100"]).unwrap();
        assert_eq!(args.lower, Some(2000.0));
        assert_eq!(args.upper, Some(2100.0));

        let args = Args::try_parse_from(["clmm_apr", "--json"]).unwrap();
        assert!(args.lower.is_none() && args.upper.is_none());
    }

    #[test]
    fn test_unavailable_message_suggests_retry_for_transport_errors() {
        let transport = AprError::transport("pool", "connection reset");
        assert!(unavailable_message(&transport).contains("retry later"));

        let missing = AprError::data_unavailable("pool 0xabc", "not found in subgraph");
        assert!(!unavailable_message(&missing).contains("retry"));
    }
}

/// Print the emissions APR curve over a sweep of range widths
///
/// Calibration aid for the reference table: shows how the configured policy
/// (or both policies with --compare) behaves between and beyond the
/// reference widths.
use clap::Parser;
use clmm_apr::{
    apr::{EmissionsEstimator, EmissionsPolicy},
    config::{read_config_file, CONFIG_FILE_PATH},
    display::render_reference_table,
    logger,
};
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Parser)]
#[command(name = "tool_reference_curve")]
#[command(about = "Emissions APR by range width for the configured reference table", long_about = None)]
struct Args {
    /// Configuration file
    #[arg(long, default_value = CONFIG_FILE_PATH)]
    config: String,

    /// Narrowest width in USD
    #[arg(long, default_value = "50")]
    min_width: f64,

    /// Widest width in USD
    #[arg(long, default_value = "600")]
    max_width: f64,

    /// Number of sample points
    #[arg(long, default_value = "12")]
    steps: usize,

    /// Show both policies side by side
    #[arg(long)]
    compare: bool,
}

#[derive(Tabled)]
struct CurveRow {
    #[tabled(rename = "Width (USD)")]
    width: String,
    #[tabled(rename = "Interpolated")]
    interpolated: String,
    #[tabled(rename = "Proportional")]
    proportional: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init();

    if !(args.min_width > 0.0 && args.max_width > args.min_width) || args.steps < 2 {
        anyhow::bail!("need 0 < --min-width < --max-width and --steps >= 2");
    }

    let estimator_cfg = read_config_file(&args.config)?.estimator;
    let interpolated = EmissionsEstimator::interpolated(estimator_cfg.references.clone())?;
    let proportional =
        EmissionsEstimator::proportional(estimator_cfg.proportional_reference.clone())?;

    let show = |estimator: &EmissionsEstimator, width: f64| -> anyhow::Result<String> {
        let selected = args.compare || estimator.policy() == estimator_cfg.emissions_policy;
        if selected {
            Ok(format!("{:.2}%", estimator.estimate(width, true)?))
        } else {
            Ok("-".to_string())
        }
    };

    let step = (args.max_width - args.min_width) / (args.steps - 1) as f64;
    let mut rows = Vec::with_capacity(args.steps);
    for i in 0..args.steps {
        let width = args.min_width + step * i as f64;
        rows.push(CurveRow {
            width: format!("${:.2}", width),
            interpolated: show(&interpolated, width)?,
            proportional: show(&proportional, width)?,
        });
    }

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()));

    println!("Reference table:");
    println!("{}", render_reference_table(&interpolated.references()));
    println!();
    let policy = if args.compare {
        "both policies".to_string()
    } else {
        format!("{} policy", estimator_cfg.emissions_policy)
    };
    println!("Emissions APR curve ({}):", policy);
    println!("{}", table);

    if estimator_cfg.emissions_policy == EmissionsPolicy::Proportional && !args.compare {
        println!(
            "Widths at or below ${:.2} saturate at {:.2}%",
            estimator_cfg.proportional_reference.width_usd, estimator_cfg.proportional_reference.apr
        );
    }

    Ok(())
}

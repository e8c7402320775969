/// Console rendering of an `AprReport`
use crate::apis::stats::ApiStats;
use crate::apr::emissions::ReferencePoint;
use crate::apr::report::AprReport;
use crate::apr::ticks::TickModel;
use colored::*;
use tabled::{
    settings::{object::Columns, object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct ReferenceRow {
    #[tabled(rename = "Price Range")]
    range: String,
    #[tabled(rename = "Width (USD)")]
    width: String,
    #[tabled(rename = "Emissions APR")]
    apr: String,
}

fn metric(metric: &str, value: String) -> MetricRow {
    MetricRow {
        metric: metric.to_string(),
        value,
    }
}

fn styled(rows: Vec<MetricRow>) -> String {
    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .with(Modify::new(Columns::one(1)).with(Alignment::right()));
    table.to_string()
}

pub fn render_pool_table(report: &AprReport) -> String {
    let pool = &report.pool;
    styled(vec![
        metric("Pool", format!("{} ({})", pool.name, pool.id)),
        metric("Fee Tier", format!("{}%", pool.fee_tier_percent)),
        metric("Current Price", format!("${:.2}", pool.current_price)),
        metric("Current Tick", pool.current_tick.to_string()),
        metric("Tick Spacing", pool.tick_spacing.to_string()),
        metric("TVL", format!("${:.2}", pool.total_value_locked_usd)),
    ])
}

pub fn render_position_table(report: &AprReport) -> String {
    let position = &report.position;
    styled(vec![
        metric(
            "Price Range",
            format!(
                "${:.2} - ${:.2}",
                position.lower_price_usd, position.upper_price_usd
            ),
        ),
        metric(
            "Range Width",
            format!(
                "${:.2} ({:.2}% of price)",
                position.width_usd, position.width_percent
            ),
        ),
        metric(
            "Tick Range",
            format!("{} to {}", position.ticks.lower_tick, position.ticks.upper_tick),
        ),
        metric("Tick Width", position.ticks.tick_width().to_string()),
        metric("Position Bins", position.bin_count.to_string()),
        metric(
            "Status",
            if position.in_range {
                "IN RANGE".to_string()
            } else {
                "OUT OF RANGE".to_string()
            },
        ),
        metric("Tick Model", position.tick_model.to_string()),
    ])
}

pub fn render_apr_table(report: &AprReport) -> String {
    let fees = &report.fees;
    styled(vec![
        metric("Daily Fees", format!("${:.2} ({})", fees.daily_fees_usd, fees.source)),
        metric("Annual Fees", format!("${:.2}", fees.annual_fees_usd)),
        metric("Active Range APR", format!("{:.2}%", fees.active_range_apr)),
        metric("Fee APR", format!("{:.2}%", fees.fee_apr)),
        metric(
            "Emissions APR",
            format!("{:.2}% ({})", report.emissions_apr, report.emissions_policy),
        ),
        metric("Total APR", format!("{:.2}%", report.total_apr)),
    ])
}

pub fn render_reference_table(references: &[ReferencePoint]) -> String {
    let rows: Vec<ReferenceRow> = references
        .iter()
        .map(|r| ReferenceRow {
            range: match (r.lower_price, r.upper_price) {
                (Some(lower), Some(upper)) => format!("${:.2} - ${:.2}", lower, upper),
                _ => "-".to_string(),
            },
            width: format!("${:.2}", r.width_usd),
            apr: format!("{:.2}%", r.apr),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .with(Modify::new(Columns::new(1..=2)).with(Alignment::right()));
    table.to_string()
}

pub fn render_stats_table(stats: &ApiStats) -> String {
    styled(vec![
        metric("Requests", stats.total_requests.to_string()),
        metric("Successful", stats.successful_requests.to_string()),
        metric("Failed", stats.failed_requests.to_string()),
        metric("Success Rate", format!("{:.1}%", stats.success_rate())),
        metric("Avg Response", format!("{:.0}ms", stats.average_response_time_ms)),
        metric(
            "Last Error",
            stats.last_error.clone().unwrap_or_else(|| "-".to_string()),
        ),
    ])
}

/// How the numbers above were produced
pub fn method_notes(report: &AprReport) -> Vec<String> {
    let mut notes = vec![
        format!(
            "Fee APR: annual fees / TVL x 100, divided across {} bins of {} ticks, only while in range.",
            report.position.bin_count, report.pool.tick_spacing
        ),
        format!(
            "Emissions APR: {} estimate from the reference ranges by range width, 0 when out of range.",
            report.emissions_policy
        ),
    ];
    if report.position.tick_model == TickModel::AnchoredLog {
        notes.push(
            "Ticks: anchored on the current (tick, price) pair; accuracy drops far from the current price."
                .to_string(),
        );
    }
    notes
}

pub fn print_report(report: &AprReport) {
    println!();
    println!("{}", "CONCENTRATED LIQUIDITY APR ESTIMATE".bright_cyan().bold());
    println!("{}", render_pool_table(report));
    println!();
    println!("{}", "POSITION".bright_white().bold());
    println!("{}", render_position_table(report));
    println!();
    println!("{}", "APR".bright_white().bold());
    println!("{}", render_apr_table(report));

    let total = format!("{:.2}%", report.total_apr);
    let total = if report.position.in_range {
        total.bright_green().bold()
    } else {
        total.bright_red().bold()
    };
    println!("Projected total APR: {}", total);

    println!();
    println!("{}", "REFERENCE RANGES".bright_white().bold());
    println!("{}", render_reference_table(&report.references));

    println!();
    for note in method_notes(report) {
        println!("  {} {}", "-".dimmed(), note.dimmed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apr::report::estimate_position_apr;
    use crate::config::EstimatorConfig;
    use crate::pools::source::testing::reference_pool;

    fn report() -> AprReport {
        estimate_position_apr(
            &reference_pool(),
            &[],
            2083.95,
            2235.04,
            &EstimatorConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_tables_contain_key_figures() {
        let report = report();
        let pool = render_pool_table(&report);
        assert!(pool.contains("WETH/USDC"));
        assert!(pool.contains("0.3%"));
        assert!(pool.contains("-199000"));

        let position = render_position_table(&report);
        assert!(position.contains("-200040 to -198180"));
        assert!(position.contains("31"));
        assert!(position.contains("IN RANGE"));

        let apr = render_apr_table(&report);
        assert!(apr.contains("Total APR"));
        assert!(apr.contains("fallback"));
    }

    #[test]
    fn test_reference_table_lists_observed_ranges() {
        let table = render_reference_table(&report().references);
        assert!(table.contains("$2083.95 - $2235.04"));
        assert!(table.contains("299.24%"));
        assert!(table.contains("149.62%"));
    }

    #[test]
    fn test_method_notes_flag_approximation() {
        let notes = method_notes(&report());
        assert_eq!(notes.len(), 3);
        assert!(notes[2].contains("anchored"));
    }
}

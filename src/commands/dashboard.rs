use std::collections::BTreeMap;

use clap::Args;
use colored::*;

use crate::client::ApiClient;
use crate::services::dashboard::{fetch_dashboard, summarize};
use crate::utils::errors::AppResult;

#[derive(Debug, Args)]
pub struct DashboardArgs {
    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

fn print_buckets(title: &str, counts: &BTreeMap<String, usize>) {
    println!("{}", title.bright_blue().bold());
    if counts.is_empty() {
        println!("   (none)");
    }
    for (status, count) in counts {
        println!("   {:<12} {:>5} {}", status, count, "▇".repeat((*count).min(40)));
    }
}

pub async fn execute(client: &ApiClient, args: DashboardArgs) -> AppResult<()> {
    let data = fetch_dashboard(client).await?;
    let summary = summarize(&data);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", "📊 DASHBOARD".bright_green().bold());
    println!("{}", "============".bright_green());
    println!(
        "   {} loads · {} dispatchers · {} brokers",
        summary.total_loads, summary.total_dispatchers, summary.total_brokers
    );
    println!();

    print_buckets("🚚 Loads by status", &summary.load_status_counts);
    print_buckets("🧑 Drivers by status", &summary.driver_status_counts);
    print_buckets("🚛 Trucks by status", &summary.truck_status_counts);
    print_buckets("📦 Trailers by status", &summary.trailer_status_counts);

    println!("{}", "📈 Loads per day".bright_blue().bold());
    for point in &summary.load_trend {
        println!("   {} {:>5}", point.date, point.count);
    }

    println!("{}", "🏁 Driver performance".bright_blue().bold());
    println!("   {:<28} {:>9} {:>9} {:>9}", "driver", "completed", "cancelled", "on time");
    for driver in &summary.driver_performance {
        println!(
            "   {:<28} {:>9} {:>9} {:>9}",
            driver.name, driver.completed, driver.cancelled, driver.on_time
        );
    }

    println!("{}", "💰 Top brokers".bright_blue().bold());
    for (rank, broker) in summary.top_brokers.iter().enumerate() {
        println!(
            "   {}. {:<28} {:>12} ({} loads)",
            rank + 1,
            broker.name,
            broker.total_rate.round_dp(2),
            broker.loads
        );
    }
    Ok(())
}

//! Dashboard aggregation
//!
//! Fetches the six collections the dashboard needs in one concurrent join and
//! reduces them client-side into status buckets and a few chart series.
//! Nothing is persisted; every call recomputes from scratch.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::client::ApiClient;
use crate::models::{CustomerBroker, Dispatcher, Driver, Load, LoadStatus, Trailer, Truck};
use crate::utils::errors::AppResult;

const TOP_BROKERS: usize = 5;
const UNKNOWN_STATUS: &str = "UNKNOWN";

/// Raw collections behind the dashboard
#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    pub loads: Vec<Load>,
    pub dispatchers: Vec<Dispatcher>,
    pub drivers: Vec<Driver>,
    pub trucks: Vec<Truck>,
    pub trailers: Vec<Trailer>,
    pub brokers: Vec<CustomerBroker>,
}

/// Loads created on one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub count: usize,
}

/// Per-driver delivery figures
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriverPerformance {
    pub driver_id: i64,
    pub name: String,
    pub completed: usize,
    pub cancelled: usize,
    pub on_time: usize,
}

/// Summed load pay per broker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokerRevenue {
    pub broker_id: i64,
    pub name: String,
    pub loads: usize,
    pub total_rate: Decimal,
}

/// Everything the dashboard renders
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total_loads: usize,
    pub load_status_counts: BTreeMap<String, usize>,
    pub driver_status_counts: BTreeMap<String, usize>,
    pub truck_status_counts: BTreeMap<String, usize>,
    pub trailer_status_counts: BTreeMap<String, usize>,
    pub total_dispatchers: usize,
    pub total_brokers: usize,
    pub load_trend: Vec<TrendPoint>,
    pub driver_performance: Vec<DriverPerformance>,
    pub top_brokers: Vec<BrokerRevenue>,
}

/// Fetch all collections concurrently; any failure fails the whole dashboard
pub async fn fetch_dashboard(client: &ApiClient) -> AppResult<DashboardData> {
    let (loads, dispatchers, drivers, trucks, trailers, brokers) = futures::try_join!(
        client.list::<Load>(),
        client.list::<Dispatcher>(),
        client.list::<Driver>(),
        client.list::<Truck>(),
        client.list::<Trailer>(),
        client.list::<CustomerBroker>(),
    )?;

    info!(
        "📊 Dashboard data: {} loads, {} drivers, {} trucks, {} trailers",
        loads.len(),
        drivers.len(),
        trucks.len(),
        trailers.len()
    );

    Ok(DashboardData {
        loads,
        dispatchers,
        drivers,
        trucks,
        trailers,
        brokers,
    })
}

fn count_by<'a, I>(statuses: I) -> BTreeMap<String, usize>
where
    I: Iterator<Item = Option<&'a String>>,
{
    let mut counts = BTreeMap::new();
    for status in statuses {
        let key = status
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.to_uppercase())
            .unwrap_or_else(|| UNKNOWN_STATUS.to_string());
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

fn load_status_counts(loads: &[Load]) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = LoadStatus::ALL
        .iter()
        .map(|status| (status.as_str().to_string(), 0))
        .collect();
    for load in loads {
        *counts.entry(load.load_status.as_str().to_string()).or_insert(0) += 1;
    }
    counts
}

fn load_trend(loads: &[Load]) -> Vec<TrendPoint> {
    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for created in loads.iter().filter_map(|load| load.created_at) {
        *per_day.entry(created.date_naive()).or_insert(0) += 1;
    }
    per_day
        .into_iter()
        .map(|(date, count)| TrendPoint { date, count })
        .collect()
}

fn is_on_time(load: &Load) -> bool {
    match (load.delivered_at, load.delivery_date) {
        (Some(delivered), Some(due)) => {
            load.load_status.is_completed() && delivered.date_naive() <= due
        }
        _ => false,
    }
}

fn driver_performance(loads: &[Load], drivers: &[Driver]) -> Vec<DriverPerformance> {
    let names: HashMap<i64, String> = drivers
        .iter()
        .filter_map(|driver| driver.id.map(|id| (id, driver.full_name())))
        .collect();

    let mut stats: HashMap<i64, DriverPerformance> = HashMap::new();
    for load in loads {
        let Some(driver_id) = load.driver_id() else {
            continue;
        };
        let entry = stats.entry(driver_id).or_insert_with(|| {
            let name = names
                .get(&driver_id)
                .cloned()
                .or_else(|| {
                    load.driver
                        .as_ref()
                        .and_then(|reference| reference.object())
                        .map(Driver::full_name)
                })
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| format!("driver #{}", driver_id));
            DriverPerformance {
                driver_id,
                name,
                completed: 0,
                cancelled: 0,
                on_time: 0,
            }
        });

        if load.load_status.is_completed() {
            entry.completed += 1;
        }
        if load.load_status == LoadStatus::Cancelled {
            entry.cancelled += 1;
        }
        if is_on_time(load) {
            entry.on_time += 1;
        }
    }

    let mut performance: Vec<DriverPerformance> = stats.into_values().collect();
    performance.sort_by(|a, b| b.completed.cmp(&a.completed).then_with(|| a.name.cmp(&b.name)));
    performance
}

fn top_brokers(loads: &[Load], brokers: &[CustomerBroker]) -> Vec<BrokerRevenue> {
    let names: HashMap<i64, String> = brokers
        .iter()
        .filter_map(|broker| broker.id.map(|id| (id, broker.display_name())))
        .collect();

    let mut totals: HashMap<i64, BrokerRevenue> = HashMap::new();
    for load in loads {
        let Some(broker_id) = load.customer_broker_id() else {
            continue;
        };
        let entry = totals.entry(broker_id).or_insert_with(|| BrokerRevenue {
            broker_id,
            name: names
                .get(&broker_id)
                .cloned()
                .or_else(|| {
                    load.customer_broker
                        .as_ref()
                        .and_then(|reference| reference.object())
                        .map(CustomerBroker::display_name)
                })
                .unwrap_or_else(|| format!("broker #{}", broker_id)),
            loads: 0,
            total_rate: Decimal::ZERO,
        });
        entry.loads += 1;
        entry.total_rate += load.load_pay.unwrap_or(Decimal::ZERO);
    }

    let mut ranked: Vec<BrokerRevenue> = totals.into_values().collect();
    ranked.sort_by(|a, b| {
        b.total_rate
            .cmp(&a.total_rate)
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked.truncate(TOP_BROKERS);
    ranked
}

/// Reduce the raw collections into the dashboard figures
pub fn summarize(data: &DashboardData) -> DashboardSummary {
    DashboardSummary {
        total_loads: data.loads.len(),
        load_status_counts: load_status_counts(&data.loads),
        driver_status_counts: count_by(data.drivers.iter().map(|d| d.driver_status.as_ref())),
        truck_status_counts: count_by(data.trucks.iter().map(|t| t.truck_status.as_ref())),
        trailer_status_counts: count_by(data.trailers.iter().map(|t| t.trailer_status.as_ref())),
        total_dispatchers: data.dispatchers.len(),
        total_brokers: data.brokers.len(),
        load_trend: load_trend(&data.loads),
        driver_performance: driver_performance(&data.loads, &data.drivers),
        top_brokers: top_brokers(&data.loads, &data.brokers),
    }
}

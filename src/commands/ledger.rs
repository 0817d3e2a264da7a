//! Driver pay and expense, truck expense sub-resources

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use colored::*;
use rust_decimal::Decimal;
use serde_json::Value;

use super::read_form_file;
use crate::client::ApiClient;
use crate::models::{DriverExpense, DriverPay, TruckExpense};
use crate::utils::errors::AppResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LedgerKind {
    DriverPay,
    DriverExpense,
    TruckExpense,
}

#[derive(Debug, Args)]
pub struct LedgerArgs {
    pub kind: LedgerKind,

    /// Driver or truck id
    pub owner: i64,

    /// Add an entry from a JSON file instead of listing
    #[arg(long)]
    pub add: Option<PathBuf>,
}

fn entry_from_file<T: serde::de::DeserializeOwned>(path: &Path) -> AppResult<T> {
    Ok(serde_json::from_value(Value::Object(read_form_file(path)?))?)
}

fn print_entries(title: String, entries: impl Iterator<Item = (Option<Decimal>, String)>) {
    println!("{}", title.bright_cyan().bold());
    let mut total = Decimal::ZERO;
    for (amount, label) in entries {
        let amount = amount.unwrap_or(Decimal::ZERO);
        total += amount;
        println!("   {:>10}  {}", amount.round_dp(2), label);
    }
    println!("   {:>10}  total", total.round_dp(2).to_string().bold());
}

pub async fn execute(client: &ApiClient, args: LedgerArgs) -> AppResult<()> {
    match (args.kind, args.add) {
        (LedgerKind::DriverPay, Some(file)) => {
            let entry: DriverPay = entry_from_file(&file)?;
            client.create_driver_pay(args.owner, &entry).await?;
            println!("{} pay added for driver {}", "✅".green(), args.owner);
        }
        (LedgerKind::DriverExpense, Some(file)) => {
            let entry: DriverExpense = entry_from_file(&file)?;
            client.create_driver_expense(args.owner, &entry).await?;
            println!("{} expense added for driver {}", "✅".green(), args.owner);
        }
        (LedgerKind::TruckExpense, Some(file)) => {
            let entry: TruckExpense = entry_from_file(&file)?;
            client.create_truck_expense(args.owner, &entry).await?;
            println!("{} expense added for truck {}", "✅".green(), args.owner);
        }
        (LedgerKind::DriverPay, None) => {
            let pays = client.driver_pays(args.owner).await?;
            print_entries(
                format!("💵 driver {} pay", args.owner),
                pays.into_iter().map(|p| {
                    let date = p.pay_date.map(|d| d.to_string()).unwrap_or_default();
                    (p.amount, format!("{} {}", date, p.pay_type.unwrap_or_default()))
                }),
            );
        }
        (LedgerKind::DriverExpense, None) => {
            let expenses = client.driver_expenses(args.owner).await?;
            print_entries(
                format!("🧾 driver {} expenses", args.owner),
                expenses.into_iter().map(|e| {
                    let date = e.date.map(|d| d.to_string()).unwrap_or_default();
                    (e.amount, format!("{} {}", date, e.expense_type.unwrap_or_default()))
                }),
            );
        }
        (LedgerKind::TruckExpense, None) => {
            let expenses = client.truck_expenses(args.owner).await?;
            print_entries(
                format!("🧾 truck {} expenses", args.owner),
                expenses.into_iter().map(|e| {
                    let date = e.date.map(|d| d.to_string()).unwrap_or_default();
                    (e.amount, format!("{} {}", date, e.category.unwrap_or_default()))
                }),
            );
        }
    }
    Ok(())
}

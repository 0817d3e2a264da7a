//! IFTA fuel-tax records
//!
//! Compliance records kept apart from the load workflow: per-quarter mileage
//! and fuel entries, the tax rates they are priced at, and generated reports.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::de::{opt_decimal, opt_id};
use super::Resource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ifta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub quarter: Option<String>,
    pub state: Option<String>,
    #[serde(deserialize_with = "opt_id")]
    pub driver: Option<i64>,
    pub weekly_number: Option<i32>,
    pub invoice_number: Option<String>,
    #[serde(deserialize_with = "opt_decimal")]
    pub total_miles: Option<Decimal>,
    #[serde(deserialize_with = "opt_decimal")]
    pub taxable_gallons: Option<Decimal>,
    #[serde(deserialize_with = "opt_decimal")]
    pub fuel_gallons: Option<Decimal>,
}

impl Resource for Ifta {
    const PATH: &'static str = "ifta";
    const NAME: &'static str = "IFTA record";

    fn record_id(&self) -> Option<i64> {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuelTaxRate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub quarter: Option<String>,
    pub state: Option<String>,
    #[serde(deserialize_with = "opt_decimal")]
    pub rate: Option<Decimal>,
    #[serde(deserialize_with = "opt_decimal")]
    pub mpg: Option<Decimal>,
}

impl Resource for FuelTaxRate {
    const PATH: &'static str = "fuel-tax-rates";
    const NAME: &'static str = "fuel tax rate";

    fn record_id(&self) -> Option<i64> {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IftaReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub quarter: Option<String>,
    #[serde(deserialize_with = "opt_id")]
    pub driver: Option<i64>,
    #[serde(deserialize_with = "opt_decimal")]
    pub total_miles: Option<Decimal>,
    #[serde(deserialize_with = "opt_decimal")]
    pub total_gallons: Option<Decimal>,
    #[serde(deserialize_with = "opt_decimal")]
    pub total_tax: Option<Decimal>,
    pub file: Option<String>,
}

impl Resource for IftaReport {
    const PATH: &'static str = "ifta-reports";
    const NAME: &'static str = "IFTA report";

    fn record_id(&self) -> Option<i64> {
        self.id
    }
}

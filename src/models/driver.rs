//! Driver model and the nested pay / expense sub-resources

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::de::{opt_date, opt_decimal, opt_id};
use super::Resource;
use crate::utils::validation::{validate_non_negative_amount, validate_phone};

/// Driver record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Driver {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,
    pub driver_status: Option<String>,
    pub driver_type: Option<String>,
    pub license_number: Option<String>,
    pub license_state: Option<String>,
    #[serde(deserialize_with = "opt_date")]
    pub license_expiration: Option<NaiveDate>,
    #[serde(deserialize_with = "opt_date")]
    pub hire_date: Option<NaiveDate>,
    #[serde(deserialize_with = "opt_id")]
    pub truck: Option<i64>,
    #[serde(deserialize_with = "opt_id")]
    pub trailer: Option<i64>,
    #[serde(deserialize_with = "opt_id")]
    pub dispatcher: Option<i64>,
    #[serde(deserialize_with = "opt_decimal")]
    pub rate_per_mile: Option<Decimal>,
}

impl Driver {
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        )
        .trim()
        .to_string()
    }
}

impl Resource for Driver {
    const PATH: &'static str = "driver";
    const NAME: &'static str = "driver";

    fn record_id(&self) -> Option<i64> {
        self.id
    }
}

/// Pay entry for a driver (`/driver/{id}/pay/`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DriverPay {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(deserialize_with = "opt_id")]
    pub driver: Option<i64>,
    #[serde(deserialize_with = "opt_id")]
    pub load: Option<i64>,
    pub pay_type: Option<String>,
    #[serde(deserialize_with = "opt_decimal")]
    #[validate(custom = "validate_non_negative_amount")]
    pub amount: Option<Decimal>,
    #[serde(deserialize_with = "opt_date")]
    pub pay_date: Option<NaiveDate>,
    pub note: Option<String>,
}

/// Expense charged to a driver (`/driver/{id}/expense/`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DriverExpense {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(deserialize_with = "opt_id")]
    pub driver: Option<i64>,
    pub expense_type: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "opt_decimal")]
    #[validate(custom = "validate_non_negative_amount")]
    pub amount: Option<Decimal>,
    #[serde(deserialize_with = "opt_date")]
    pub date: Option<NaiveDate>,
}

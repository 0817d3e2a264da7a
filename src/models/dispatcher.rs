//! Dispatcher and employee models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::de::{opt_date, opt_decimal, opt_id};
use super::Resource;

/// Dispatcher record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dispatcher {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(deserialize_with = "opt_id")]
    pub user: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub dispatcher_status: Option<String>,
    pub company_name: Option<String>,
    #[serde(deserialize_with = "opt_decimal")]
    pub salary: Option<Decimal>,
}

impl Dispatcher {
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

impl Resource for Dispatcher {
    const PATH: &'static str = "dispatcher";
    const NAME: &'static str = "dispatcher";

    fn record_id(&self) -> Option<i64> {
        self.id
    }
}

/// Office employee record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Employee {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(deserialize_with = "opt_id")]
    pub user: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub employee_status: Option<String>,
    #[serde(deserialize_with = "opt_date")]
    pub hire_date: Option<NaiveDate>,
    #[serde(deserialize_with = "opt_decimal")]
    pub salary: Option<Decimal>,
}

impl Resource for Employee {
    const PATH: &'static str = "employee";
    const NAME: &'static str = "employee";

    fn record_id(&self) -> Option<i64> {
        self.id
    }
}

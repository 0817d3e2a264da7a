//! Truck and trailer models
//!
//! Trucks and trailers are plain persisted records. Trucks also expose a
//! nested expense sub-resource.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::de::{opt_date, opt_decimal, opt_id};
use super::Resource;
use crate::utils::validation::validate_non_negative_amount;

/// Truck record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Truck {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub unit_number: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub vin: Option<String>,
    pub plate_number: Option<String>,
    pub state: Option<String>,
    pub truck_status: Option<String>,
    #[serde(deserialize_with = "opt_decimal")]
    pub current_mileage: Option<Decimal>,
    pub fuel_type: Option<String>,
    #[serde(deserialize_with = "opt_date")]
    pub registration_expiration: Option<NaiveDate>,
}

impl Truck {
    /// Short label for lists: unit number, else make and model
    pub fn display_name(&self) -> String {
        match &self.unit_number {
            Some(unit) if !unit.is_empty() => unit.clone(),
            _ => format!(
                "{} {}",
                self.make.as_deref().unwrap_or_default(),
                self.model.as_deref().unwrap_or_default()
            )
            .trim()
            .to_string(),
        }
    }
}

impl Resource for Truck {
    const PATH: &'static str = "truck";
    const NAME: &'static str = "truck";

    fn record_id(&self) -> Option<i64> {
        self.id
    }
}

/// Trailer record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Trailer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub trailer_number: Option<String>,
    pub trailer_type: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub vin: Option<String>,
    pub plate_number: Option<String>,
    pub trailer_status: Option<String>,
}

impl Resource for Trailer {
    const PATH: &'static str = "trailer";
    const NAME: &'static str = "trailer";

    fn record_id(&self) -> Option<i64> {
        self.id
    }
}

/// Expense booked against a truck (`/truck/{id}/expense/`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TruckExpense {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(deserialize_with = "opt_id")]
    pub truck: Option<i64>,
    pub category: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "opt_decimal")]
    #[validate(custom = "validate_non_negative_amount")]
    pub amount: Option<Decimal>,
    #[serde(deserialize_with = "opt_date")]
    pub date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truck_display_name() {
        let truck = Truck {
            unit_number: Some("T-104".into()),
            ..Truck::default()
        };
        assert_eq!(truck.display_name(), "T-104");

        let truck = Truck {
            make: Some("Freightliner".into()),
            model: Some("Cascadia".into()),
            ..Truck::default()
        };
        assert_eq!(truck.display_name(), "Freightliner Cascadia");
    }

    #[test]
    fn test_truck_from_backend() {
        let truck: Truck = serde_json::from_value(json!({
            "id": 4,
            "make": "Volvo",
            "current_mileage": "412000.5",
            "registration_expiration": "2025-06-30",
            "unknown_field": true
        }))
        .unwrap();
        assert_eq!(truck.id, Some(4));
        assert_eq!(truck.current_mileage, Some(Decimal::new(4120005, 1)));
        assert!(truck.registration_expiration.is_some());
    }
}

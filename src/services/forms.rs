//! Create and edit forms
//!
//! Form state is a flat JSON object. Before submitting, numeric strings are
//! turned into numbers and blank nullable numbers into `null`, then the body
//! goes out as a single create (POST) or update (PUT/PATCH) request.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Number, Value};
use tracing::{debug, info};
use validator::{ValidationError, ValidationErrors};

use crate::client::ApiClient;
use crate::models::ResourceKind;
use crate::utils::errors::AppResult;
use crate::utils::validation::{is_blank, validate_date};

lazy_static! {
    static ref NUMERIC: Regex = Regex::new(r"^-?\d+(\.\d+)?$").unwrap();
}

/// Per-resource coercion and validation rules
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormSchema {
    pub required: &'static [&'static str],
    /// Numeric strings become numbers; blanks are left as they are
    pub numeric: &'static [&'static str],
    /// Numeric strings become numbers; blanks become `null`
    pub nullable_numeric: &'static [&'static str],
    pub dates: &'static [&'static str],
}

impl FormSchema {
    pub fn for_resource(kind: ResourceKind) -> FormSchema {
        match kind {
            ResourceKind::Load => FormSchema {
                required: &[],
                numeric: &["total_miles"],
                nullable_numeric: &[
                    "load_pay", "driver_pay", "total_pay", "per_mile", "mile", "empty_mile",
                ],
                dates: &["pickup_date", "delivery_date"],
            },
            ResourceKind::Driver => FormSchema {
                required: &["first_name", "last_name"],
                numeric: &[],
                nullable_numeric: &["rate_per_mile", "truck", "trailer", "dispatcher"],
                dates: &["license_expiration", "hire_date"],
            },
            ResourceKind::Dispatcher => FormSchema {
                required: &["first_name", "last_name"],
                numeric: &[],
                nullable_numeric: &["salary"],
                dates: &[],
            },
            ResourceKind::Employee => FormSchema {
                required: &["first_name", "last_name"],
                numeric: &[],
                nullable_numeric: &["salary"],
                dates: &["hire_date"],
            },
            ResourceKind::Truck => FormSchema {
                required: &["unit_number"],
                numeric: &["year"],
                nullable_numeric: &["current_mileage"],
                dates: &["registration_expiration"],
            },
            ResourceKind::Trailer => FormSchema {
                required: &["trailer_number"],
                numeric: &["year"],
                nullable_numeric: &[],
                dates: &[],
            },
            ResourceKind::Broker => FormSchema {
                required: &["company_name"],
                ..FormSchema::default()
            },
            ResourceKind::Team => FormSchema {
                required: &["name"],
                ..FormSchema::default()
            },
            ResourceKind::Unit => FormSchema {
                required: &["unit_number"],
                numeric: &[],
                nullable_numeric: &["truck", "trailer", "driver", "team"],
                dates: &[],
            },
            ResourceKind::Ifta => FormSchema {
                required: &["quarter", "state"],
                numeric: &["weekly_number"],
                nullable_numeric: &["total_miles", "taxable_gallons", "fuel_gallons", "driver"],
                dates: &[],
            },
            ResourceKind::FuelTaxRate => FormSchema {
                required: &["quarter", "state"],
                numeric: &["rate", "mpg"],
                nullable_numeric: &[],
                dates: &[],
            },
            ResourceKind::IftaReport => FormSchema {
                required: &["quarter"],
                numeric: &[],
                nullable_numeric: &["total_miles", "total_gallons", "total_tax", "driver"],
                dates: &[],
            },
            ResourceKind::User => FormSchema {
                required: &["email"],
                numeric: &[],
                nullable_numeric: &["role", "location"],
                dates: &[],
            },
            ResourceKind::Role | ResourceKind::Location => FormSchema {
                required: &["name"],
                ..FormSchema::default()
            },
        }
    }

    /// Apply the numeric rules to raw form state
    pub fn coerce(&self, mut form: Map<String, Value>) -> Map<String, Value> {
        for (name, value) in form.iter_mut() {
            let nullable = self.nullable_numeric.contains(&name.as_str());
            if !nullable && !self.numeric.contains(&name.as_str()) {
                continue;
            }
            let Value::String(raw) = &*value else {
                continue;
            };
            let raw = raw.trim().to_string();
            if raw.is_empty() {
                if nullable {
                    *value = Value::Null;
                }
            } else if let Some(number) = parse_number(&raw) {
                *value = Value::Number(number);
            }
        }
        form
    }

    /// Required fields present and dates well formed
    pub fn validate(&self, form: &Map<String, Value>) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        for field in self.required {
            if form.get(*field).map(is_blank).unwrap_or(true) {
                let mut error = ValidationError::new("required");
                error.message = Some(format!("{} is required", field.replace('_', " ")).into());
                errors.add(*field, error);
            }
        }

        for field in self.dates {
            if let Some(Value::String(raw)) = form.get(*field) {
                if raw.trim().is_empty() {
                    continue;
                }
                if let Err(error) = validate_date(raw.trim()) {
                    errors.add(*field, error);
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn parse_number(raw: &str) -> Option<Number> {
    if !NUMERIC.is_match(raw) {
        return None;
    }
    if raw.contains('.') {
        raw.parse::<f64>().ok().and_then(Number::from_f64)
    } else {
        raw.parse::<i64>().ok().map(Number::from)
    }
}

/// Validate then coerce, yielding the request body
pub fn prepare(kind: ResourceKind, form: Map<String, Value>) -> AppResult<Value> {
    let schema = FormSchema::for_resource(kind);
    schema.validate(&form)?;
    Ok(Value::Object(schema.coerce(form)))
}

/// POST a new record from form state
pub async fn submit_create(
    client: &ApiClient,
    kind: ResourceKind,
    form: Map<String, Value>,
) -> AppResult<Value> {
    let body = prepare(kind, form)?;
    debug!("Creating {} with {}", kind, body);
    let created: Value = client.post_json(&kind.collection_path(), &body).await?;
    let id = created.get("id").cloned().unwrap_or_default();
    info!("✅ Created {} {}", kind, id);
    Ok(created)
}

/// PUT (or PATCH when `partial`) an existing record from form state
pub async fn submit_update(
    client: &ApiClient,
    kind: ResourceKind,
    id: i64,
    form: Map<String, Value>,
    partial: bool,
) -> AppResult<Value> {
    let schema = FormSchema::for_resource(kind);
    let body = if partial {
        // A partial body only carries what changed
        Value::Object(schema.coerce(form))
    } else {
        prepare(kind, form)?
    };

    let path = kind.record_path(id);
    let updated: Value = if partial {
        client.patch_json(&path, &body).await?
    } else {
        client.put_json(&path, &body).await?
    };
    info!("✅ Updated {} {}", kind, id);
    Ok(updated)
}

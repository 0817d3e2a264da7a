//! Load model
//!
//! A load is the one record with a lifecycle: it moves through a fixed,
//! ordered sequence of stages from booking to yard return. The stage sequence
//! is an enum with a total order so illegal stage values cannot exist.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::broker::CustomerBroker;
use super::de::{opt_date, opt_decimal};
use super::dispatcher::Dispatcher;
use super::driver::Driver;
use super::vehicle::{Trailer, Truck};
use super::Resource;

/// Stages of the load workflow, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LoadStage {
    Open,
    Covered,
    Dispatched,
    Loading,
    OnRoute,
    Unloading,
    Delivered,
    Completed,
    InYard,
}

impl LoadStage {
    pub const ALL: [LoadStage; 9] = [
        LoadStage::Open,
        LoadStage::Covered,
        LoadStage::Dispatched,
        LoadStage::Loading,
        LoadStage::OnRoute,
        LoadStage::Unloading,
        LoadStage::Delivered,
        LoadStage::Completed,
        LoadStage::InYard,
    ];

    pub const FIRST: LoadStage = LoadStage::Open;
    pub const LAST: LoadStage = LoadStage::InYard;

    /// Zero-based position in the sequence
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<LoadStage> {
        Self::ALL.get(index).copied()
    }

    /// Following stage, `None` at the last one
    pub fn next(self) -> Option<LoadStage> {
        Self::from_index(self.index() + 1)
    }

    /// Preceding stage, `None` at the first one
    pub fn previous(self) -> Option<LoadStage> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    pub fn is_last(self) -> bool {
        self == Self::LAST
    }

    /// Display label shown in the stepper
    pub fn label(self) -> &'static str {
        match self {
            LoadStage::Open => "Open",
            LoadStage::Covered => "Covered",
            LoadStage::Dispatched => "Dispatched",
            LoadStage::Loading => "Loading",
            LoadStage::OnRoute => "On Route",
            LoadStage::Unloading => "Unloading",
            LoadStage::Delivered => "Delivered",
            LoadStage::Completed => "Completed",
            LoadStage::InYard => "In Yard",
        }
    }

    /// Status persisted as `load_status` while the load sits in this stage
    pub fn status(self) -> LoadStatus {
        match self {
            LoadStage::Open => LoadStatus::Open,
            LoadStage::Covered => LoadStatus::Covered,
            LoadStage::Dispatched => LoadStatus::Dispatched,
            LoadStage::Loading => LoadStatus::Loading,
            LoadStage::OnRoute => LoadStatus::OnRoute,
            LoadStage::Unloading => LoadStatus::Unloading,
            LoadStage::Delivered => LoadStatus::Delivered,
            LoadStage::Completed => LoadStatus::Completed,
            LoadStage::InYard => LoadStatus::InYard,
        }
    }
}

impl fmt::Display for LoadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `load_status` values as stored by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoadStatus {
    #[default]
    Open,
    Covered,
    Dispatched,
    Loading,
    OnRoute,
    Unloading,
    Delivered,
    Completed,
    InYard,
    /// Set outside the stepper; has no stage
    Cancelled,
}

impl LoadStatus {
    pub const ALL: [LoadStatus; 10] = [
        LoadStatus::Open,
        LoadStatus::Covered,
        LoadStatus::Dispatched,
        LoadStatus::Loading,
        LoadStatus::OnRoute,
        LoadStatus::Unloading,
        LoadStatus::Delivered,
        LoadStatus::Completed,
        LoadStatus::InYard,
        LoadStatus::Cancelled,
    ];

    pub fn stage(self) -> Option<LoadStage> {
        LoadStage::ALL.iter().copied().find(|stage| stage.status() == self)
    }

    /// Wire value, e.g. `ON_ROUTE`
    pub fn as_str(self) -> &'static str {
        match self {
            LoadStatus::Open => "OPEN",
            LoadStatus::Covered => "COVERED",
            LoadStatus::Dispatched => "DISPATCHED",
            LoadStatus::Loading => "LOADING",
            LoadStatus::OnRoute => "ON_ROUTE",
            LoadStatus::Unloading => "UNLOADING",
            LoadStatus::Delivered => "DELIVERED",
            LoadStatus::Completed => "COMPLETED",
            LoadStatus::InYard => "IN_YARD",
            LoadStatus::Cancelled => "CANCELLED",
        }
    }

    /// Delivered or any later stage
    pub fn is_completed(self) -> bool {
        matches!(
            self,
            LoadStatus::Delivered | LoadStatus::Completed | LoadStatus::InYard
        )
    }
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LoadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase().replace([' ', '-'], "_");
        LoadStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| format!("unknown load status '{}'", s))
    }
}

/// A foreign record embedded either as a nested object (fetch) or a raw id (edit)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reference<T> {
    Id(i64),
    Object(T),
}

impl<T: Resource> Reference<T> {
    pub fn id(&self) -> Option<i64> {
        match self {
            Reference::Id(id) => Some(*id),
            Reference::Object(record) => record.record_id(),
        }
    }

    pub fn object(&self) -> Option<&T> {
        match self {
            Reference::Object(record) => Some(record),
            Reference::Id(_) => None,
        }
    }
}

/// File fields a load can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttachmentKind {
    CommercialInvoice,
    RateConfirmation,
    Document,
    ProofOfDelivery,
    BillOfLading,
}

impl AttachmentKind {
    pub const ALL: [AttachmentKind; 5] = [
        AttachmentKind::CommercialInvoice,
        AttachmentKind::RateConfirmation,
        AttachmentKind::Document,
        AttachmentKind::ProofOfDelivery,
        AttachmentKind::BillOfLading,
    ];

    /// Backend field name
    pub fn field_name(self) -> &'static str {
        match self {
            AttachmentKind::CommercialInvoice => "commercial_invoice",
            AttachmentKind::RateConfirmation => "rate_confirmation",
            AttachmentKind::Document => "document",
            AttachmentKind::ProofOfDelivery => "proof_of_delivery",
            AttachmentKind::BillOfLading => "bill_of_lading",
        }
    }
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

impl std::str::FromStr for AttachmentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        let wanted = match wanted.as_str() {
            "rate_con" => "rate_confirmation",
            "bol" => "bill_of_lading",
            "pod" => "proof_of_delivery",
            "invoice" => "commercial_invoice",
            other => other,
        };
        AttachmentKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.field_name() == wanted)
            .ok_or_else(|| format!("unknown attachment kind '{}'", s))
    }
}

/// A file field value: a reference already stored by the backend, or a local
/// file selected for upload
#[derive(Debug, Clone, PartialEq)]
pub enum Attachment {
    Stored(String),
    Pending(PathBuf),
}

impl Attachment {
    pub fn is_pending(&self) -> bool {
        matches!(self, Attachment::Pending(_))
    }

    pub fn pending_path(&self) -> Option<&PathBuf> {
        match self {
            Attachment::Pending(path) => Some(path),
            Attachment::Stored(_) => None,
        }
    }
}

impl Serialize for Attachment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Attachment::Stored(url) => serializer.serialize_str(url),
            Attachment::Pending(path) => serializer.serialize_str(&path.to_string_lossy()),
        }
    }
}

fn opt_attachment<'de, D>(deserializer: D) -> Result<Option<Attachment>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .filter(|url| !url.trim().is_empty())
        .map(Attachment::Stored))
}

/// Load record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Load {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub load_id: Option<String>,
    pub reference_id: Option<String>,
    pub load_status: LoadStatus,

    pub customer_broker: Option<Reference<CustomerBroker>>,
    pub driver: Option<Reference<Driver>>,
    pub dispatcher: Option<Reference<Dispatcher>>,
    pub truck: Option<Reference<Truck>>,
    pub trailer: Option<Reference<Trailer>>,

    #[serde(deserialize_with = "opt_decimal")]
    pub load_pay: Option<Decimal>,
    #[serde(deserialize_with = "opt_decimal")]
    pub driver_pay: Option<Decimal>,
    #[serde(deserialize_with = "opt_decimal")]
    pub total_pay: Option<Decimal>,
    #[serde(deserialize_with = "opt_decimal")]
    pub per_mile: Option<Decimal>,
    #[serde(deserialize_with = "opt_decimal")]
    pub mile: Option<Decimal>,
    #[serde(deserialize_with = "opt_decimal")]
    pub empty_mile: Option<Decimal>,
    #[serde(deserialize_with = "opt_decimal")]
    pub total_miles: Option<Decimal>,

    pub pickup_location: Option<String>,
    pub delivery_location: Option<String>,
    #[serde(deserialize_with = "opt_date")]
    pub pickup_date: Option<NaiveDate>,
    #[serde(deserialize_with = "opt_date")]
    pub delivery_date: Option<NaiveDate>,

    pub note: Option<String>,

    #[serde(deserialize_with = "opt_attachment")]
    pub commercial_invoice: Option<Attachment>,
    #[serde(deserialize_with = "opt_attachment")]
    pub rate_confirmation: Option<Attachment>,
    #[serde(deserialize_with = "opt_attachment")]
    pub document: Option<Attachment>,
    #[serde(deserialize_with = "opt_attachment")]
    pub proof_of_delivery: Option<Attachment>,
    #[serde(deserialize_with = "opt_attachment")]
    pub bill_of_lading: Option<Attachment>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Fields the workflow can require before leaving a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadField {
    ReferenceId,
    CustomerBroker,
    LoadPay,
    TotalMiles,
    Driver,
    Dispatcher,
    Truck,
    PickupLocation,
    DeliveryLocation,
    PickupDate,
    DriverPay,
    Mile,
    EmptyMile,
    DeliveryDate,
    TotalPay,
    PerMile,
}

impl LoadField {
    pub fn as_str(self) -> &'static str {
        match self {
            LoadField::ReferenceId => "reference_id",
            LoadField::CustomerBroker => "customer_broker",
            LoadField::LoadPay => "load_pay",
            LoadField::TotalMiles => "total_miles",
            LoadField::Driver => "driver",
            LoadField::Dispatcher => "dispatcher",
            LoadField::Truck => "truck",
            LoadField::PickupLocation => "pickup_location",
            LoadField::DeliveryLocation => "delivery_location",
            LoadField::PickupDate => "pickup_date",
            LoadField::DriverPay => "driver_pay",
            LoadField::Mile => "mile",
            LoadField::EmptyMile => "empty_mile",
            LoadField::DeliveryDate => "delivery_date",
            LoadField::TotalPay => "total_pay",
            LoadField::PerMile => "per_mile",
        }
    }
}

fn text_present(value: &Option<String>) -> bool {
    value.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false)
}

fn amount_present(value: &Option<Decimal>) -> bool {
    value.map(|d| !d.is_zero()).unwrap_or(false)
}

impl Load {
    /// Stage matching the current `load_status`; cancelled loads have none
    pub fn stage(&self) -> Option<LoadStage> {
        self.load_status.stage()
    }

    /// Whether a required field holds a non-empty, non-zero value
    pub fn has(&self, field: LoadField) -> bool {
        match field {
            LoadField::ReferenceId => text_present(&self.reference_id),
            LoadField::CustomerBroker => self.customer_broker.is_some(),
            LoadField::LoadPay => amount_present(&self.load_pay),
            LoadField::TotalMiles => amount_present(&self.total_miles),
            LoadField::Driver => self.driver.is_some(),
            LoadField::Dispatcher => self.dispatcher.is_some(),
            LoadField::Truck => self.truck.is_some(),
            LoadField::PickupLocation => text_present(&self.pickup_location),
            LoadField::DeliveryLocation => text_present(&self.delivery_location),
            LoadField::PickupDate => self.pickup_date.is_some(),
            LoadField::DriverPay => amount_present(&self.driver_pay),
            LoadField::Mile => amount_present(&self.mile),
            LoadField::EmptyMile => amount_present(&self.empty_mile),
            LoadField::DeliveryDate => self.delivery_date.is_some(),
            LoadField::TotalPay => amount_present(&self.total_pay),
            LoadField::PerMile => amount_present(&self.per_mile),
        }
    }

    pub fn attachment(&self, kind: AttachmentKind) -> Option<&Attachment> {
        match kind {
            AttachmentKind::CommercialInvoice => self.commercial_invoice.as_ref(),
            AttachmentKind::RateConfirmation => self.rate_confirmation.as_ref(),
            AttachmentKind::Document => self.document.as_ref(),
            AttachmentKind::ProofOfDelivery => self.proof_of_delivery.as_ref(),
            AttachmentKind::BillOfLading => self.bill_of_lading.as_ref(),
        }
    }

    pub fn set_attachment(&mut self, kind: AttachmentKind, attachment: Option<Attachment>) {
        let slot = match kind {
            AttachmentKind::CommercialInvoice => &mut self.commercial_invoice,
            AttachmentKind::RateConfirmation => &mut self.rate_confirmation,
            AttachmentKind::Document => &mut self.document,
            AttachmentKind::ProofOfDelivery => &mut self.proof_of_delivery,
            AttachmentKind::BillOfLading => &mut self.bill_of_lading,
        };
        *slot = attachment;
    }

    /// Attachments selected locally and not yet uploaded
    pub fn pending_attachments(&self) -> Vec<(AttachmentKind, PathBuf)> {
        AttachmentKind::ALL
            .iter()
            .filter_map(|kind| {
                self.attachment(*kind)
                    .and_then(Attachment::pending_path)
                    .map(|path| (*kind, path.clone()))
            })
            .collect()
    }

    pub fn customer_broker_id(&self) -> Option<i64> {
        self.customer_broker.as_ref().and_then(Reference::id)
    }

    pub fn driver_id(&self) -> Option<i64> {
        self.driver.as_ref().and_then(Reference::id)
    }
}

impl Resource for Load {
    const PATH: &'static str = "load";
    const NAME: &'static str = "load";

    fn record_id(&self) -> Option<i64> {
        self.id
    }
}

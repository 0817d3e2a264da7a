//! Backend records
//!
//! Serde models mirroring the REST resources. Every record tolerates missing
//! and unknown fields so list screens keep working across backend revisions.

use serde::de::DeserializeOwned;
use serde::Serialize;

pub mod auth;
pub mod broker;
pub mod chat;
pub mod de;
pub mod dispatcher;
pub mod driver;
pub mod ifta;
pub mod kind;
pub mod load;
pub mod page;
pub mod team;
pub mod vehicle;

pub use auth::{Location, LoginRequest, LoginResponse, RegisterRequest, Role, User};
pub use broker::CustomerBroker;
pub use chat::{ChatMessage, NewChatMessage};
pub use dispatcher::{Dispatcher, Employee};
pub use driver::{Driver, DriverExpense, DriverPay};
pub use ifta::{FuelTaxRate, Ifta, IftaReport};
pub use kind::ResourceKind;
pub use load::{Attachment, AttachmentKind, Load, LoadField, LoadStage, LoadStatus, Reference};
pub use page::Page;
pub use team::{Team, Unit};
pub use vehicle::{Trailer, Truck, TruckExpense};

/// A REST collection the client can list, fetch, create, update and delete
pub trait Resource: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection path below the API base, without slashes (`load`, `auth/role`)
    const PATH: &'static str;
    /// Human name used in messages
    const NAME: &'static str;

    fn record_id(&self) -> Option<i64>;

    fn collection_path() -> String {
        format!("/{}/", Self::PATH)
    }

    fn record_path(id: i64) -> String {
        format!("/{}/{}/", Self::PATH, id)
    }
}

//! Customer broker model

use serde::{Deserialize, Serialize};

use super::Resource;

/// Freight broker on the customer side, referenced by loads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerBroker {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub company_name: Option<String>,
    pub contact_person: Option<String>,
    pub email_address: Option<String>,
    pub phone_number: Option<String>,
    pub mc_number: Option<String>,
    pub address: Option<String>,
    pub billing_type: Option<String>,
    pub status: Option<String>,
}

impl CustomerBroker {
    pub fn display_name(&self) -> String {
        self.company_name
            .clone()
            .unwrap_or_else(|| format!("broker #{}", self.id.unwrap_or_default()))
    }
}

impl Resource for CustomerBroker {
    const PATH: &'static str = "customer_broker";
    const NAME: &'static str = "customer broker";

    fn record_id(&self) -> Option<i64> {
        self.id
    }
}

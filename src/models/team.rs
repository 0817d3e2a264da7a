//! Teams and units
//!
//! A unit groups one truck, one trailer and one driver operated together,
//! optionally tied to a team of dispatchers.

use serde::{Deserialize, Serialize};

use super::de::opt_id;
use super::Resource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Team {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: Option<String>,
    pub dispatchers: Vec<i64>,
    pub units: Vec<i64>,
    pub comment: Option<String>,
}

impl Resource for Team {
    const PATH: &'static str = "team";
    const NAME: &'static str = "team";

    fn record_id(&self) -> Option<i64> {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Unit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub unit_number: Option<String>,
    #[serde(deserialize_with = "opt_id")]
    pub truck: Option<i64>,
    #[serde(deserialize_with = "opt_id")]
    pub trailer: Option<i64>,
    #[serde(deserialize_with = "opt_id")]
    pub driver: Option<i64>,
    #[serde(deserialize_with = "opt_id")]
    pub team: Option<i64>,
    pub unit_status: Option<String>,
}

impl Resource for Unit {
    const PATH: &'static str = "unit";
    const NAME: &'static str = "unit";

    fn record_id(&self) -> Option<i64> {
        self.id
    }
}

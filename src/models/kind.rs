//! Runtime selector over the REST resources, for generic list and form screens

use std::fmt;

use clap::ValueEnum;

use super::{
    CustomerBroker, Dispatcher, Driver, Employee, FuelTaxRate, Ifta, IftaReport, Load, Location,
    Resource, Role, Team, Trailer, Truck, Unit, User,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ResourceKind {
    Load,
    Driver,
    Dispatcher,
    Employee,
    Truck,
    Trailer,
    #[value(alias = "customer-broker")]
    Broker,
    Team,
    Unit,
    Ifta,
    FuelTaxRate,
    IftaReport,
    User,
    Role,
    Location,
}

impl ResourceKind {
    pub fn path(self) -> &'static str {
        match self {
            ResourceKind::Load => Load::PATH,
            ResourceKind::Driver => Driver::PATH,
            ResourceKind::Dispatcher => Dispatcher::PATH,
            ResourceKind::Employee => Employee::PATH,
            ResourceKind::Truck => Truck::PATH,
            ResourceKind::Trailer => Trailer::PATH,
            ResourceKind::Broker => CustomerBroker::PATH,
            ResourceKind::Team => Team::PATH,
            ResourceKind::Unit => Unit::PATH,
            ResourceKind::Ifta => Ifta::PATH,
            ResourceKind::FuelTaxRate => FuelTaxRate::PATH,
            ResourceKind::IftaReport => IftaReport::PATH,
            ResourceKind::User => User::PATH,
            ResourceKind::Role => Role::PATH,
            ResourceKind::Location => Location::PATH,
        }
    }

    pub fn collection_path(self) -> String {
        format!("/{}/", self.path())
    }

    pub fn record_path(self, id: i64) -> String {
        format!("/{}/{}/", self.path(), id)
    }

    /// Field the status chips match against, if the resource has one
    pub fn status_field(self) -> Option<&'static str> {
        match self {
            ResourceKind::Load => Some("load_status"),
            ResourceKind::Driver => Some("driver_status"),
            ResourceKind::Dispatcher => Some("dispatcher_status"),
            ResourceKind::Employee => Some("employee_status"),
            ResourceKind::Truck => Some("truck_status"),
            ResourceKind::Trailer => Some("trailer_status"),
            ResourceKind::Broker => Some("status"),
            ResourceKind::Unit => Some("unit_status"),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(ResourceKind::Broker.collection_path(), "/customer_broker/");
        assert_eq!(ResourceKind::FuelTaxRate.record_path(3), "/fuel-tax-rates/3/");
        assert_eq!(ResourceKind::Role.collection_path(), "/auth/role/");
    }

    #[test]
    fn test_cli_names() {
        assert_eq!(ResourceKind::from_str("fuel-tax-rate", true), Ok(ResourceKind::FuelTaxRate));
        assert_eq!(ResourceKind::from_str("customer-broker", true), Ok(ResourceKind::Broker));
        assert_eq!(ResourceKind::Team.status_field(), None);
    }
}

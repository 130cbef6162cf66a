//! Typed conversation context: which guided dialogue a phone is in, which step
//! it has reached, and the fields collected so far.

use serde::Serialize;

use cargolink_domain::vehicle::VehicleType;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "flow", rename_all = "snake_case")]
pub enum FlowState {
    Welcome {
        step: WelcomeStep,
    },
    TruckerRegistration {
        step: TruckerStep,
        data: TruckerRegistrationData,
    },
    ShipperRegistration {
        step: ShipperStep,
        data: ShipperRegistrationData,
    },
    MainMenu,
}

impl FlowState {
    pub fn welcome() -> Self {
        Self::Welcome {
            step: WelcomeStep::Initial,
        }
    }

    /// Trucker registration from the name prompt with nothing collected.
    pub fn trucker_registration() -> Self {
        Self::TruckerRegistration {
            step: TruckerStep::CollectName,
            data: TruckerRegistrationData::default(),
        }
    }

    /// Shipper registration from the company prompt with nothing collected.
    pub fn shipper_registration() -> Self {
        Self::ShipperRegistration {
            step: ShipperStep::CollectCompany,
            data: ShipperRegistrationData::default(),
        }
    }

    pub fn flow_name(&self) -> &'static str {
        match self {
            Self::Welcome { .. } => "welcome",
            Self::TruckerRegistration { .. } => "trucker_registration",
            Self::ShipperRegistration { .. } => "shipper_registration",
            Self::MainMenu => "main_menu",
        }
    }

    pub fn step_name(&self) -> &'static str {
        match self {
            Self::Welcome { step } => step.as_str(),
            Self::TruckerRegistration { step, .. } => step.as_str(),
            Self::ShipperRegistration { step, .. } => step.as_str(),
            Self::MainMenu => "menu_selection",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WelcomeStep {
    Initial,
    RoleSelection,
}

impl WelcomeStep {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::RoleSelection => "role_selection",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TruckerStep {
    CollectName,
    ValidateName,
    ValidateVehicle,
    ValidateVehicleType,
    ValidateCapacity,
    ConfirmRegistration,
}

impl TruckerStep {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CollectName => "collect_name",
            Self::ValidateName => "validate_name",
            Self::ValidateVehicle => "validate_vehicle",
            Self::ValidateVehicleType => "validate_vehicle_type",
            Self::ValidateCapacity => "validate_capacity",
            Self::ConfirmRegistration => "confirm_registration",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipperStep {
    CollectCompany,
    ValidateCompany,
    ValidateGst,
    CollectContactName,
    ConfirmRegistration,
}

impl ShipperStep {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CollectCompany => "collect_company",
            Self::ValidateCompany => "validate_company",
            Self::ValidateGst => "validate_gst",
            Self::CollectContactName => "collect_contact_name",
            Self::ConfirmRegistration => "confirm_registration",
        }
    }
}

/// Trucker fields collected one step at a time.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TruckerRegistrationData {
    pub name: Option<String>,
    pub vehicle_no: Option<String>,
    pub vehicle_type: Option<VehicleType>,
    pub capacity: Option<f64>,
}

/// Shipper fields collected one step at a time.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShipperRegistrationData {
    pub company: Option<String>,
    pub gst: Option<String>,
    /// Derived from the GST state code.
    pub state: Option<String>,
    pub contact_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_name_flow_and_step() {
        let state = FlowState::TruckerRegistration {
            step: TruckerStep::ValidateVehicleType,
            data: TruckerRegistrationData::default(),
        };
        assert_eq!(state.flow_name(), "trucker_registration");
        assert_eq!(state.step_name(), "validate_vehicle_type");
        assert_eq!(FlowState::welcome().step_name(), "initial");
    }

    #[test]
    fn should_start_registrations_with_empty_data() {
        match FlowState::trucker_registration() {
            FlowState::TruckerRegistration { step, data } => {
                assert_eq!(step, TruckerStep::CollectName);
                assert_eq!(data, TruckerRegistrationData::default());
            }
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn should_serialize_with_flow_tag() {
        let state = FlowState::ShipperRegistration {
            step: ShipperStep::ValidateGst,
            data: ShipperRegistrationData {
                company: Some("ABC Logistics".to_owned()),
                ..Default::default()
            },
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["flow"], "shipper_registration");
        assert_eq!(json["step"], "validate_gst");
        assert_eq!(json["data"]["company"], "ABC Logistics");
    }
}

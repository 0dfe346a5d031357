use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Owner id the provider reports for addresses drawn from its own pool.
pub const DEFAULT_POOL_OWNER: &str = "amazon";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("Invalid instance name: {0}")]
    InvalidInstanceName(String),
    #[error("Invalid instance record: {0}")]
    InvalidInstanceRecord(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;

/// Lifecycle state as observed from the provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InstanceState {
    Pending,
    Running,
    Stopping,
    Stopped,
    ShuttingDown,
    Terminated,
    /// A state name this crate does not know about. Kept verbatim so it can
    /// still be reported back to the user.
    Unknown(String),
}

impl InstanceState {
    pub fn from_provider(name: &str) -> Self {
        match name {
            "pending" => Self::Pending,
            "running" => Self::Running,
            "stopping" => Self::Stopping,
            "stopped" => Self::Stopped,
            "shutting-down" => Self::ShuttingDown,
            "terminated" => Self::Terminated,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::ShuttingDown => "shutting-down",
            Self::Terminated => "terminated",
            Self::Unknown(name) => name,
        }
    }

    /// Every state the provider documents, in lifecycle order.
    pub fn known() -> [InstanceState; 6] {
        [
            Self::Pending,
            Self::Running,
            Self::Stopping,
            Self::Stopped,
            Self::ShuttingDown,
            Self::Terminated,
        ]
    }
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for InstanceState {
    fn from(value: String) -> Self {
        Self::from_provider(&value)
    }
}

impl From<InstanceState> for String {
    fn from(value: InstanceState) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressStability {
    /// Reserved by the account; survives restarts.
    Stable,
    /// Drawn from the provider pool; changes on every start.
    Dynamic,
}

impl AddressStability {
    pub fn classify(ip_owner_id: Option<&str>) -> Self {
        match ip_owner_id {
            Some(owner) if owner != DEFAULT_POOL_OWNER => Self::Stable,
            _ => Self::Dynamic,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Stable => "stable IP",
            Self::Dynamic => "dynamic IP",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AddressAssociation {
    pub public_ip: Option<String>,
    pub ip_owner_id: Option<String>,
}

impl AddressAssociation {
    pub fn stability(&self) -> AddressStability {
        AddressStability::classify(self.ip_owner_id.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NetworkInterface {
    pub association: Option<AddressAssociation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicAddress {
    pub ip: String,
    pub stability: AddressStability,
}

/// What an instance record says about its public address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressReading {
    /// The instance has zero or several interfaces.
    AmbiguousTopology(usize),
    /// The single interface has no association yet.
    NotAssociated,
    /// Associated, but the address field is not populated yet.
    Unassigned,
    Assigned(PublicAddress),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub instance_id: String,
    pub name: String,
    pub state: InstanceState,
    pub network_interfaces: Vec<NetworkInterface>,
}

impl Instance {
    pub fn new(
        instance_id: impl Into<String>,
        name: impl Into<String>,
        state: InstanceState,
    ) -> Result<Self> {
        let instance_id = instance_id.into();
        let name = name.into();

        if instance_id.is_empty() {
            return Err(CoreError::InvalidInstanceRecord(format!(
                "instance tagged '{name}' has no instance id"
            )));
        }
        if name.is_empty() {
            return Err(CoreError::InvalidInstanceName(
                "name tag cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            instance_id,
            name,
            state,
            network_interfaces: Vec::new(),
        })
    }

    pub fn with_interface(mut self, interface: NetworkInterface) -> Self {
        self.network_interfaces.push(interface);
        self
    }

    pub fn read_address(&self) -> AddressReading {
        let [interface] = self.network_interfaces.as_slice() else {
            return AddressReading::AmbiguousTopology(self.network_interfaces.len());
        };

        let Some(association) = &interface.association else {
            return AddressReading::NotAssociated;
        };

        match &association.public_ip {
            Some(ip) => AddressReading::Assigned(PublicAddress {
                ip: ip.clone(),
                stability: association.stability(),
            }),
            None => AddressReading::Unassigned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn associated(ip: Option<&str>, owner: Option<&str>) -> NetworkInterface {
        NetworkInterface {
            association: Some(AddressAssociation {
                public_ip: ip.map(ToString::to_string),
                ip_owner_id: owner.map(ToString::to_string),
            }),
        }
    }

    fn instance() -> Instance {
        Instance::new("i-0abc", "Foo", InstanceState::Running).unwrap()
    }

    #[test]
    fn test_state_round_trips_provider_names() {
        for state in InstanceState::known() {
            assert_eq!(InstanceState::from_provider(state.as_str()), state);
        }
        assert_eq!(InstanceState::ShuttingDown.to_string(), "shutting-down");
    }

    #[test]
    fn test_unknown_state_is_kept_verbatim() {
        let state = InstanceState::from_provider("hibernating");
        assert_eq!(state, InstanceState::Unknown("hibernating".to_string()));
        assert_eq!(state.to_string(), "hibernating");
    }

    #[test]
    fn test_state_serializes_as_provider_name() {
        let json = serde_json::to_string(&InstanceState::ShuttingDown).unwrap();
        assert_eq!(json, "\"shutting-down\"");
        let back: InstanceState = serde_json::from_str("\"stopped\"").unwrap();
        assert_eq!(back, InstanceState::Stopped);
    }

    #[test]
    fn test_instance_requires_id_and_name() {
        assert!(matches!(
            Instance::new("", "Foo", InstanceState::Stopped),
            Err(CoreError::InvalidInstanceRecord(_))
        ));
        assert!(matches!(
            Instance::new("i-1", "", InstanceState::Stopped),
            Err(CoreError::InvalidInstanceName(_))
        ));
    }

    #[test]
    fn test_stability_labels() {
        assert_eq!(AddressStability::Stable.label(), "stable IP");
        assert_eq!(AddressStability::Dynamic.label(), "dynamic IP");
    }

    #[test]
    fn test_read_address_without_interfaces() {
        assert_eq!(
            instance().read_address(),
            AddressReading::AmbiguousTopology(0)
        );
    }

    #[test]
    fn test_read_address_with_two_interfaces() {
        let instance = instance()
            .with_interface(associated(Some("203.0.113.5"), None))
            .with_interface(NetworkInterface::default());
        assert_eq!(instance.read_address(), AddressReading::AmbiguousTopology(2));
    }

    #[test]
    fn test_read_address_not_associated() {
        let instance = instance().with_interface(NetworkInterface::default());
        assert_eq!(instance.read_address(), AddressReading::NotAssociated);
    }

    #[test]
    fn test_read_address_unassigned() {
        let instance = instance().with_interface(associated(None, Some("amazon")));
        assert_eq!(instance.read_address(), AddressReading::Unassigned);
    }

    #[test]
    fn test_read_address_dynamic() {
        let instance = instance().with_interface(associated(Some("203.0.113.5"), Some("amazon")));
        assert_eq!(
            instance.read_address(),
            AddressReading::Assigned(PublicAddress {
                ip: "203.0.113.5".to_string(),
                stability: AddressStability::Dynamic,
            })
        );
    }

    #[test]
    fn test_read_address_stable() {
        let instance =
            instance().with_interface(associated(Some("198.51.100.7"), Some("123456789012")));
        assert_eq!(
            instance.read_address(),
            AddressReading::Assigned(PublicAddress {
                ip: "198.51.100.7".to_string(),
                stability: AddressStability::Stable,
            })
        );
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(100))]

            // Classification depends only on the owner tag, never on the address.
            #[test]
            fn property_owner_tag_decides_stability(
                ip in "[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}",
                owner in proptest::option::of("[a-z0-9]{1,12}"),
            ) {
                let association = AddressAssociation {
                    public_ip: Some(ip),
                    ip_owner_id: owner.clone(),
                };
                let expected = match owner.as_deref() {
                    Some(o) if o != DEFAULT_POOL_OWNER => AddressStability::Stable,
                    _ => AddressStability::Dynamic,
                };
                prop_assert_eq!(association.stability(), expected);
            }

            #[test]
            fn property_default_pool_owner_is_always_dynamic(
                ip in "[0-9.]{7,15}",
            ) {
                let association = AddressAssociation {
                    public_ip: Some(ip),
                    ip_owner_id: Some(DEFAULT_POOL_OWNER.to_string()),
                };
                prop_assert_eq!(association.stability(), AddressStability::Dynamic);
            }
        }
    }
}

//! Building devices from a type name, for displays created by type

use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use thiserror::Error;
use vitrine_core::{Device, DeviceType, GenericDevice, Macros};

/// Named constructor arguments
pub type ConstructorArgs = BTreeMap<String, String>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    #[error("Unknown device type: {0}")]
    UnknownType(String),
    #[error("Missing argument '{argument}' for device type {type_name}")]
    MissingArgument { type_name: String, argument: String },
    #[error("Device type {type_name} rejected its arguments: {message}")]
    Rejected { type_name: String, message: String },
}

/// Instantiates devices by type name
pub trait DeviceFactory {
    fn instantiate(&self, type_name: &str, args: &ConstructorArgs) -> Result<Rc<dyn Device>, ConstructionError>;
}

/// Factory over a set of declared device types
///
/// Builds [`GenericDevice`]s: `name` is required, `prefix` is optional, and
/// any remaining arguments become the device metadata.
#[derive(Debug, Clone, Default)]
pub struct DeviceCatalog {
    types: HashMap<String, DeviceType>,
}

impl DeviceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type under its bare and module-qualified names
    pub fn register(&mut self, device_type: DeviceType) {
        let qualified = device_type.qualified_name();
        if qualified != device_type.name {
            self.types.insert(qualified, device_type.clone());
        }
        self.types.insert(device_type.name.clone(), device_type);
    }

    pub fn get(&self, type_name: &str) -> Option<&DeviceType> {
        self.types.get(type_name)
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl FromIterator<DeviceType> for DeviceCatalog {
    fn from_iter<I: IntoIterator<Item = DeviceType>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for device_type in iter {
            catalog.register(device_type);
        }
        catalog
    }
}

impl DeviceFactory for DeviceCatalog {
    fn instantiate(&self, type_name: &str, args: &ConstructorArgs) -> Result<Rc<dyn Device>, ConstructionError> {
        let device_type = self
            .get(type_name)
            .ok_or_else(|| ConstructionError::UnknownType(type_name.to_string()))?;

        let name = args
            .get("name")
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ConstructionError::MissingArgument {
                type_name: type_name.to_string(),
                argument: "name".to_string(),
            })?;

        let mut device = GenericDevice::new(name, device_type.clone());
        if let Some(prefix) = args.get("prefix") {
            device = device.with_prefix(prefix.clone());
        }

        let metadata: Macros = args
            .iter()
            .filter(|(key, _)| key.as_str() != "name" && key.as_str() != "prefix")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if !metadata.is_empty() {
            device = device.with_metadata(metadata);
        }

        Ok(Rc::new(device))
    }
}

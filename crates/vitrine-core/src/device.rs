//! Device abstraction consumed by the display engine

use serde::{Deserialize, Serialize};

use crate::macros::Macros;

/// Statically declared type information for a device
///
/// Carries the type's own name plus its supertypes, most-derived first.
/// The chain may include the common root type; the ancestor resolver drops it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceType {
    /// Type name (e.g. "Motor")
    pub name: String,
    /// Module or namespace the type lives in, if any
    #[serde(default)]
    pub module: Option<String>,
    /// Supertype names, nearest first (e.g. ["PositionerBase", "Device"])
    #[serde(default)]
    pub parents: Vec<String>,
}

impl DeviceType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: None,
            parents: Vec::new(),
        }
    }

    pub fn with_parents<I, S>(mut self, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parents = parents.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// The type followed by its supertypes, most-derived first
    pub fn ancestors(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.parents.iter().map(String::as_str))
    }

    /// Module-qualified type name (`module::Type`), or the bare name
    pub fn qualified_name(&self) -> String {
        match &self.module {
            Some(module) if !module.is_empty() => format!("{}::{}", module, self.name),
            _ => self.name.clone(),
        }
    }
}

/// A hardware or software device that can be displayed
pub trait Device {
    /// Device name, always present
    fn name(&self) -> &str;

    /// Declared type of the device
    fn device_type(&self) -> &DeviceType;

    /// Address or PV prefix, if the device has one
    fn prefix(&self) -> Option<&str> {
        None
    }

    /// Key-value metadata from an external store, if the device carries any
    fn metadata(&self) -> Option<Macros> {
        None
    }
}

/// Plain data device, used for catalog-defined devices and tests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericDevice {
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub metadata: Option<Macros>,
}

impl GenericDevice {
    pub fn new(name: impl Into<String>, device_type: DeviceType) -> Self {
        Self {
            name: name.into(),
            device_type,
            prefix: None,
            metadata: None,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Macros) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

impl Device for GenericDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn device_type(&self) -> &DeviceType {
        &self.device_type
    }

    fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    fn metadata(&self) -> Option<Macros> {
        self.metadata.clone()
    }
}

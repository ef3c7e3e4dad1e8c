//! Ancestor chain derivation for device types

use crate::device::DeviceType;

/// Name of the root type every device derives from
pub const DEFAULT_ROOT_TYPE: &str = "Device";

/// Derives the ordered list of type names used for filename matching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncestorResolver {
    root: String,
}

impl Default for AncestorResolver {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_TYPE)
    }
}

impl AncestorResolver {
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Type name and supertypes, most-derived first, without the root type
    ///
    /// Names repeated through diamond-shaped hierarchies keep their first
    /// (most specific) position.
    pub fn resolve(&self, device_type: &DeviceType) -> Vec<String> {
        let mut chain: Vec<String> = Vec::new();
        for name in device_type.ancestors() {
            if name.is_empty() || name == self.root {
                continue;
            }
            if !chain.iter().any(|seen| seen == name) {
                chain.push(name.to_string());
            }
        }
        chain
    }
}

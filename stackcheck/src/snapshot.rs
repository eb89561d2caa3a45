use serde::{Deserialize, Serialize};

use crate::core::classifier::{ResourceClass, classify_type};
use crate::core::property::PropertyValue;
use crate::core::urn::{TypeToken, Urn};

/// Deployment-level metadata written by the engine.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Manifest {
    pub time: Option<String>,
    pub magic: Option<String>,
    pub version: Option<String>,
}

/// One deployed resource as exported by the engine.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ResourceRecord {
    pub urn: Urn,
    #[serde(default)]
    pub custom: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Type as recorded by the engine; classification uses the URN instead.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub recorded_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Urn>,
    /// Provider reference, `<provider-urn>::<provider-id>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default = "PropertyValue::empty_mapping")]
    pub inputs: PropertyValue,
    #[serde(default = "PropertyValue::empty_mapping")]
    pub outputs: PropertyValue,
}

impl ResourceRecord {
    pub fn new(urn: Urn, outputs: PropertyValue) -> Self {
        Self {
            urn,
            custom: true,
            id: None,
            recorded_type: None,
            parent: None,
            provider: None,
            inputs: PropertyValue::empty_mapping(),
            outputs,
        }
    }

    pub fn type_token(&self) -> TypeToken<'_> {
        self.urn.type_token()
    }

    pub fn name(&self) -> &str {
        self.urn.name()
    }

    pub fn class(&self) -> ResourceClass {
        classify_type(self.type_token())
    }

    /// Provider URN and id split out of the `provider` reference.
    pub fn provider_ref(&self) -> Option<(&str, &str)> {
        self.provider.as_deref()?.rsplit_once("::")
    }
}

/// Point-in-time resource graph produced by one apply.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct DeploymentSnapshot {
    #[serde(default)]
    pub manifest: Manifest,
    #[serde(default)]
    pub resources: Vec<ResourceRecord>,
}

impl DeploymentSnapshot {
    pub fn new(resources: Vec<ResourceRecord>) -> Self {
        Self {
            manifest: Manifest::default(),
            resources,
        }
    }
}

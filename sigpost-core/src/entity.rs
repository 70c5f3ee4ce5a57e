//! The entity a signal is about
//!
//! An entity is the machine, file, identity, or organization the finding
//! applies to. It can optionally point at an external asset-management
//! system, carry descriptive attributes, or carry connection details that
//! let the consumer assess the asset on its own.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::str_enum;
use crate::severity::SeverityLevel;

str_enum! {
    /// What kind of object the signal concerns.
    EntityType {
        Machine => "machine",
        File => "file",
        Identity => "identity",
        Organization => "organization",
    }
}

/// Pointer to an external asset/identity management system (CMDB, LDAP,
/// ServiceNow, ...) where more details about the entity can be found.
/// Never carries ownership of credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityManagement {
    /// Type of the management system. Example: "ldap"
    #[serde(rename = "type")]
    pub management_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_string: Option<String>,

    /// Name-value pairs used to infer the connection details.
    pub lookup_attributes: BTreeMap<String, String>,
}

/// One IP interface of a machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpAddress {
    /// Interface name. Example: "eth0"
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv4: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv6: Option<String>,
}

/// Descriptive attributes of the asset. All optional, but the quality
/// scorer rewards the sub-classification and the C/I/A requirements.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_addresses: Option<Vec<IpAddress>>,

    /// Free-text sub-classification: an OS name for a machine, a file
    /// extension for a file, "user"/"group"/"role" for an identity.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub attribute_type: Option<String>,

    /// Business criticality of the asset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criticality: Option<SeverityLevel>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidentiality_requirement: Option<SeverityLevel>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub integrity_requirement: Option<SeverityLevel>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_requirement: Option<SeverityLevel>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, Vec<String>>>,
}

/// Remote-connection descriptor allowing a consumer to independently
/// assess the entity. Secret-bearing fields are opaque strings: this crate
/// never validates, transforms, or logs them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionAttributes {
    /// Type of connection. Example: "ssh", "pim", "db"
    #[serde(rename = "type")]
    pub connection_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_string: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Second password some Unix-like systems require.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privileged_password: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_passphrase: Option<String>,

    /// Any additional properties needed to establish the connection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, String>>,
}

/// The asset, identity, or file a signal refers to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    #[serde(rename = "type")]
    pub entity_type: EntityType,

    /// Ideally a fully qualified name: an FQDN, an IP, an email id, a
    /// filename, an ARN, a CIDR block.
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_management: Option<EntityManagement>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_attributes: Option<EntityAttributes>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_attributes: Option<ConnectionAttributes>,
}

impl Entity {
    /// A bare entity with no attributes.
    pub fn new(entity_type: EntityType, name: &str) -> Self {
        Self {
            entity_type,
            name: name.to_string(),
            entity_management: None,
            entity_attributes: None,
            connection_attributes: None,
        }
    }

    pub fn with_attributes(mut self, attributes: EntityAttributes) -> Self {
        self.entity_attributes = Some(attributes);
        self
    }
}

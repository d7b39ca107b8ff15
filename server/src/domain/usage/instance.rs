//! Instance identifiers
//!
//! Usage is reported per instance as `<instance>__<organizationId>`.

use std::fmt;
use std::str::FromStr;

use super::UsageError;

const SEPARATOR: &str = "__";

/// Parsed `<instance>__<organizationId>` identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceId {
    pub instance: String,
    pub organization_id: String,
}

impl FromStr for InstanceId {
    type Err = UsageError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| UsageError::InvalidInstanceId {
            instance_id: raw.to_string(),
            reason: reason.to_string(),
        };

        let mut parts = raw.split(SEPARATOR);
        let (Some(instance), Some(organization_id), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid("expected exactly one '__' separating instance and organization"));
        };

        if instance.trim().is_empty() {
            return Err(invalid("instance part is empty"));
        }
        if organization_id.trim().is_empty() {
            return Err(invalid("organization part is empty"));
        }

        Ok(Self {
            instance: instance.to_string(),
            organization_id: organization_id.to_string(),
        })
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.instance, SEPARATOR, self.organization_id)
    }
}

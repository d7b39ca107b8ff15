//! Plan entitlements
//!
//! The plan tier is derived from the license key on every call:
//! - no key, or an unrecognized one: `Oss`
//! - `PRO-<body>`: `Pro`
//! - `ENT-<body>`: `Enterprise`
//!
//! Each tier unlocks a fixed set of capabilities.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EntitlementError {
    #[error(
        "Your {tier} plan does not include '{capability}'. Please upgrade your plan to use this feature."
    )]
    PermissionDenied {
        capability: Capability,
        tier: PlanTier,
    },
    #[error("Unknown capability '{0}'")]
    UnknownCapability(String),
}

// ============================================================================
// TIERS AND CAPABILITIES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Oss,
    Pro,
    Enterprise,
}

impl PlanTier {
    /// Classify a license key. Never fails; anything unrecognized is `Oss`.
    pub fn from_license_key(license_key: Option<&str>) -> Self {
        let Some(key) = license_key.map(str::trim) else {
            return PlanTier::Oss;
        };

        let (tier, body) = if let Some(body) = key.strip_prefix("ENT-") {
            (PlanTier::Enterprise, body)
        } else if let Some(body) = key.strip_prefix("PRO-") {
            (PlanTier::Pro, body)
        } else {
            return PlanTier::Oss;
        };

        let well_formed = !body.is_empty()
            && body
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if well_formed { tier } else { PlanTier::Oss }
    }

    pub fn capabilities(&self) -> &'static [Capability] {
        match self {
            PlanTier::Oss => &[],
            PlanTier::Pro => &[Capability::AuditLogs, Capability::DataRetentionPolicies],
            PlanTier::Enterprise => &Capability::ALL,
        }
    }

    pub fn includes(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Oss => "oss",
            PlanTier::Pro => "pro",
            PlanTier::Enterprise => "enterprise",
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PlanTier::Oss => "OSS",
            PlanTier::Pro => "PRO",
            PlanTier::Enterprise => "ENTERPRISE",
        })
    }
}

/// Capability gated by plan tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    CustomRbac,
    AuditLogs,
    Sso,
    DataRetentionPolicies,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::CustomRbac,
        Capability::AuditLogs,
        Capability::Sso,
        Capability::DataRetentionPolicies,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::CustomRbac => "custom-rbac",
            Capability::AuditLogs => "audit-logs",
            Capability::Sso => "sso",
            Capability::DataRetentionPolicies => "data-retention-policies",
        }
    }
}

impl FromStr for Capability {
    type Err = EntitlementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| EntitlementError::UnknownCapability(s.to_string()))
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// GATE
// ============================================================================

/// Answers capability checks for the configured license key
#[derive(Clone, Default)]
pub struct EntitlementGate {
    license_key: Option<String>,
}

impl fmt::Debug for EntitlementGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntitlementGate")
            .field("license_key", &self.license_key.as_ref().map(|_| "***"))
            .field("tier", &self.current_plan())
            .finish()
    }
}

impl EntitlementGate {
    pub fn new(license_key: Option<String>) -> Self {
        Self { license_key }
    }

    pub fn current_plan(&self) -> PlanTier {
        PlanTier::from_license_key(self.license_key.as_deref())
    }

    pub fn has_entitlement_for_current_plan(&self, capability: Capability) -> bool {
        self.current_plan().includes(capability)
    }

    /// Fail with a permission error naming the capability when the plan lacks it
    pub fn require_entitlement_for_current_plan(
        &self,
        capability: Capability,
    ) -> Result<(), EntitlementError> {
        let tier = self.current_plan();
        if tier.includes(capability) {
            Ok(())
        } else {
            tracing::debug!(%capability, %tier, "Entitlement denied");
            Err(EntitlementError::PermissionDenied { capability, tier })
        }
    }
}

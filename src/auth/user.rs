use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ClaimsRecord;

/// Service permission names
pub mod permissions {
    pub const CHAT: &str = "chat";
    pub const ANALYTICS: &str = "analytics";
    pub const ADMIN: &str = "admin";
}

/// Cognito groups that widen a user's permissions
pub mod groups {
    pub const PREMIUM: &str = "Premium";
    pub const ADMINISTRATORS: &str = "Administrators";
}

/// Subscription tier. Unknown tier names are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UserTier {
    #[default]
    Standard,
    Premium,
    Admin,
    Other(String),
}

impl UserTier {
    pub fn as_str(&self) -> &str {
        match self {
            UserTier::Standard => "standard",
            UserTier::Premium => "premium",
            UserTier::Admin => "admin",
            UserTier::Other(name) => name,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserTier::Admin)
    }
}

impl From<&str> for UserTier {
    fn from(value: &str) -> Self {
        match value {
            "" | "standard" => UserTier::Standard,
            "premium" => UserTier::Premium,
            "admin" => UserTier::Admin,
            other => UserTier::Other(other.to_string()),
        }
    }
}

impl From<String> for UserTier {
    fn from(value: String) -> Self {
        UserTier::from(value.as_str())
    }
}

impl From<UserTier> for String {
    fn from(tier: UserTier) -> Self {
        tier.as_str().to_string()
    }
}

impl fmt::Display for UserTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Permission name to grant. A name that is not present is not granted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServicePermissions(BTreeMap<String, bool>);

impl ServicePermissions {
    /// Baseline set: chat granted, analytics and admin denied
    pub fn baseline() -> Self {
        let mut map = BTreeMap::new();
        map.insert(permissions::CHAT.to_string(), true);
        map.insert(permissions::ANALYTICS.to_string(), false);
        map.insert(permissions::ADMIN.to_string(), false);
        Self(map)
    }

    pub fn grant(&mut self, permission: &str) {
        self.0.insert(permission.to_string(), true);
    }

    pub fn grants(&self, permission: &str) -> bool {
        self.0.get(permission).copied().unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(name, granted)| (name.as_str(), *granted))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
}

/// Identity attached to an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnterpriseUser {
    pub user_id: String,
    pub email: String,
    pub user_tier: UserTier,
    pub service_permissions: ServicePermissions,
    pub groups: Vec<String>,
    pub department: String,
    pub role: String,
    pub profile: UserProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_expires_at: Option<DateTime<Utc>>,
}

impl EnterpriseUser {
    /// Project token claims onto a user.
    ///
    /// Group grants accumulate first; the admin tier then forces every
    /// permission on, whatever the groups said.
    pub fn from_claims(claims: &ClaimsRecord) -> Self {
        let tier = UserTier::from(claims.user_tier.as_str());

        let mut service_permissions = ServicePermissions::baseline();
        for group in &claims.groups {
            match group.as_str() {
                groups::PREMIUM => service_permissions.grant(permissions::ANALYTICS),
                groups::ADMINISTRATORS => {
                    service_permissions.grant(permissions::ANALYTICS);
                    service_permissions.grant(permissions::ADMIN);
                }
                _ => {}
            }
        }

        if tier.is_admin() {
            service_permissions.grant(permissions::ANALYTICS);
            service_permissions.grant(permissions::ADMIN);
        }

        Self {
            user_id: claims.sub.clone(),
            email: claims.email.clone(),
            user_tier: tier,
            service_permissions,
            groups: claims.groups.clone(),
            department: claims.department.clone().unwrap_or_default(),
            role: claims.role.clone().unwrap_or_default(),
            profile: UserProfile {
                first_name: claims.first_name.clone().unwrap_or_default(),
                last_name: claims.last_name.clone().unwrap_or_default(),
                phone_number: claims.phone_number.clone().unwrap_or_default(),
            },
            token_expires_at: claims
                .exp
                .and_then(|exp| DateTime::<Utc>::from_timestamp(exp, 0)),
        }
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.service_permissions.grants(permission)
    }

    /// Group membership check. Route "roles" are Cognito groups.
    pub fn has_role(&self, role: &str) -> bool {
        self.groups.iter().any(|g| g == role)
    }

    pub fn is_premium(&self) -> bool {
        matches!(self.user_tier, UserTier::Premium | UserTier::Admin)
    }

    pub fn is_admin(&self) -> bool {
        self.user_tier.is_admin() || self.has_role(groups::ADMINISTRATORS)
    }

    /// Name used when greeting the user
    pub fn display_name(&self) -> &str {
        if !self.profile.first_name.is_empty() {
            &self.profile.first_name
        } else if !self.email.is_empty() {
            &self.email
        } else {
            &self.user_id
        }
    }
}

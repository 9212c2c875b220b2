use super::{AuthError, EnterpriseUser, UserTier};

/// A single route requirement evaluated against the request's identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    Authenticated,
    /// Passes when the user belongs to at least one of these groups
    AnyRole(Vec<String>),
    /// Passes when the user's tier is listed; the admin tier always passes
    AnyTier(Vec<UserTier>),
    Permission(String),
}

impl Guard {
    pub fn require_authenticated() -> Self {
        Guard::Authenticated
    }

    pub fn require_any_role<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Guard::AnyRole(roles.into_iter().map(Into::into).collect())
    }

    pub fn require_any_tier<I, T>(tiers: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<UserTier>,
    {
        Guard::AnyTier(tiers.into_iter().map(Into::into).collect())
    }

    pub fn require_permission(permission: impl Into<String>) -> Self {
        Guard::Permission(permission.into())
    }

    /// Every guard first demands an identity, then applies its own rule.
    pub fn check(&self, user: Option<&EnterpriseUser>) -> Result<(), AuthError> {
        let user = user.ok_or(AuthError::AuthenticationRequired)?;

        match self {
            Guard::Authenticated => Ok(()),
            Guard::AnyRole(roles) => {
                if roles.iter().any(|role| user.has_role(role)) {
                    Ok(())
                } else {
                    Err(AuthError::InsufficientPermissions(format!(
                        "User must have one of the following roles: {}",
                        bracketed(roles.iter().map(String::as_str))
                    )))
                }
            }
            Guard::AnyTier(tiers) => {
                if user.user_tier.is_admin() || tiers.contains(&user.user_tier) {
                    Ok(())
                } else {
                    Err(AuthError::InsufficientTier(format!(
                        "User must have one of the following tiers: {}",
                        bracketed(tiers.iter().map(UserTier::as_str))
                    )))
                }
            }
            Guard::Permission(permission) => {
                if user.has_permission(permission) {
                    Ok(())
                } else {
                    Err(AuthError::InsufficientPermissions(format!(
                        "User does not have permission: {}",
                        permission
                    )))
                }
            }
        }
    }
}

/// `[a b c]`, the list form used in rejection messages
fn bracketed<'a>(names: impl Iterator<Item = &'a str>) -> String {
    format!("[{}]", names.collect::<Vec<_>>().join(" "))
}

/// Guards declared on a route, evaluated left to right.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuardChain {
    guards: Vec<Guard>,
}

impl GuardChain {
    pub fn new(guards: Vec<Guard>) -> Self {
        Self { guards }
    }

    pub fn then(mut self, guard: Guard) -> Self {
        self.guards.push(guard);
        self
    }

    /// The first failing guard decides the rejection; later guards do not run.
    pub fn evaluate(&self, user: Option<&EnterpriseUser>) -> Result<(), AuthError> {
        self.guards.iter().try_for_each(|guard| guard.check(user))
    }

    pub fn guards(&self) -> &[Guard] {
        &self.guards
    }
}

impl FromIterator<Guard> for GuardChain {
    fn from_iter<I: IntoIterator<Item = Guard>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{permissions, ClaimsRecord};
    use tokio_test::{assert_err, assert_ok};

    fn user(tier: &str, groups: &[&str]) -> EnterpriseUser {
        EnterpriseUser::from_claims(&ClaimsRecord {
            sub: "user-1".to_string(),
            user_tier: tier.to_string(),
            groups: groups.iter().map(|g| g.to_string()).collect(),
            ..Default::default()
        })
    }

    #[test]
    fn test_every_guard_requires_identity() {
        let guards = [
            Guard::require_authenticated(),
            Guard::require_any_role(["Administrators"]),
            Guard::require_any_tier(["premium"]),
            Guard::require_permission(permissions::CHAT),
        ];

        for guard in guards {
            assert_eq!(guard.check(None), Err(AuthError::AuthenticationRequired));
        }
    }

    #[test]
    fn test_authenticated_passes_with_identity() {
        assert_ok!(Guard::require_authenticated().check(Some(&user("", &[]))));
    }

    #[test]
    fn test_role_checks_groups() {
        let guard = Guard::require_any_role(["Administrators", "Editors"]);

        assert_ok!(guard.check(Some(&user("", &["Editors"]))));
        assert_err!(guard.check(Some(&user("", &["Premium"]))));

        // The admin tier does not stand in for group membership
        let err = guard.check(Some(&user("admin", &[]))).unwrap_err();
        assert_eq!(err.code(), "insufficient_permissions");
    }

    #[test]
    fn test_role_match_is_case_sensitive() {
        let guard = Guard::require_any_role(["Administrators"]);
        assert_err!(guard.check(Some(&user("", &["administrators"]))));
    }

    #[test]
    fn test_role_rejection_message() {
        let err = Guard::require_any_role(["Administrators"])
            .check(Some(&user("", &[])))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "User must have one of the following roles: [Administrators]"
        );
    }

    #[test]
    fn test_rejection_lists_every_name() {
        let err = Guard::require_any_role(["Premium", "Administrators"])
            .check(Some(&user("", &[])))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "User must have one of the following roles: [Premium Administrators]"
        );

        let err = Guard::require_any_tier(["premium", "admin"])
            .check(Some(&user("standard", &[])))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "User must have one of the following tiers: [premium admin]"
        );
    }

    #[test]
    fn test_tier_gate() {
        let guard = Guard::require_any_tier(["premium"]);

        assert_ok!(guard.check(Some(&user("premium", &[]))));

        let err = guard.check(Some(&user("", &[]))).unwrap_err();
        assert_eq!(err.code(), "insufficient_tier");
        assert_eq!(
            err.to_string(),
            "User must have one of the following tiers: [premium]"
        );
    }

    #[test]
    fn test_admin_tier_passes_any_tier_gate() {
        let admin = user("admin", &[]);

        for tiers in [vec!["premium"], vec!["standard"], vec!["gold", "platinum"], vec![]] {
            assert_ok!(Guard::require_any_tier(tiers).check(Some(&admin)));
        }
    }

    #[test]
    fn test_administrators_group_does_not_pass_tier_gate() {
        let guard = Guard::require_any_tier(["premium"]);
        assert_err!(guard.check(Some(&user("standard", &["Administrators"]))));
    }

    #[test]
    fn test_permission_gate() {
        let premium = user("premium", &["Premium"]);

        assert_ok!(Guard::require_permission(permissions::ANALYTICS).check(Some(&premium)));
        assert_ok!(Guard::require_permission(permissions::CHAT).check(Some(&premium)));

        let err = Guard::require_permission(permissions::ADMIN)
            .check(Some(&premium))
            .unwrap_err();
        assert_eq!(err, AuthError::InsufficientPermissions("User does not have permission: admin".to_string()));

        assert_err!(Guard::require_permission("billing").check(Some(&user("admin", &[]))));
    }

    #[test]
    fn test_chain_reports_first_failure() {
        let chain = GuardChain::new(vec![
            Guard::require_authenticated(),
            Guard::require_permission(permissions::ADMIN),
        ]);

        assert_eq!(chain.evaluate(None), Err(AuthError::AuthenticationRequired));

        let err = chain.evaluate(Some(&user("", &[]))).unwrap_err();
        assert_eq!(err.code(), "insufficient_permissions");

        assert_ok!(chain.evaluate(Some(&user("", &["Administrators"]))));
    }

    #[test]
    fn test_chain_short_circuits_in_order() {
        let chain: GuardChain = [
            Guard::require_any_tier(["premium"]),
            Guard::require_permission(permissions::ADMIN),
        ]
        .into_iter()
        .collect();

        // Both guards would fail; the tier guard runs first
        let err = chain.evaluate(Some(&user("standard", &[]))).unwrap_err();
        assert_eq!(err.code(), "insufficient_tier");
    }

    #[test]
    fn test_empty_chain_passes() {
        assert_ok!(GuardChain::default().evaluate(None));
        let chain = GuardChain::default().then(Guard::require_authenticated());
        assert_eq!(chain.guards().len(), 1);
    }
}

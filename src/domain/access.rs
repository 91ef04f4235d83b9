use crate::domain::models::{RoleName, User};

/// Page-level access requirements checked against the session user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteGuard {
    Authenticated,
    Manager,
    GeneralManager,
    Admin,
}

impl RoleName {
    fn rank(&self) -> u8 {
        match self {
            Self::Employee => 0,
            Self::Manager => 1,
            Self::GeneralManager => 2,
            Self::Admin => 3,
        }
    }
}

impl RouteGuard {
    pub fn allows(&self, user: Option<&User>) -> bool {
        let Some(user) = user else {
            return false;
        };
        let required = match self {
            Self::Authenticated => return true,
            Self::Manager => RoleName::Manager,
            Self::GeneralManager => RoleName::GeneralManager,
            Self::Admin => RoleName::Admin,
        };
        user.role
            .as_ref()
            .is_some_and(|role| role.name.rank() >= required.rank())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Permissions, Role};

    fn user_with_role(name: Option<RoleName>) -> User {
        User {
            id: 1,
            email: "someone@example.com".to_string(),
            username: "someone".to_string(),
            role: name.map(|name| Role {
                id: 1,
                name,
                permissions: Permissions::default(),
            }),
            clock: None,
            working_times: Vec::new(),
        }
    }

    #[test]
    fn anonymous_visitor_is_always_rejected() {
        for guard in [
            RouteGuard::Authenticated,
            RouteGuard::Manager,
            RouteGuard::GeneralManager,
            RouteGuard::Admin,
        ] {
            assert!(!guard.allows(None));
        }
    }

    #[test]
    fn guards_follow_role_hierarchy() {
        let employee = user_with_role(Some(RoleName::Employee));
        let manager = user_with_role(Some(RoleName::Manager));
        let general_manager = user_with_role(Some(RoleName::GeneralManager));
        let admin = user_with_role(Some(RoleName::Admin));

        assert!(RouteGuard::Authenticated.allows(Some(&employee)));
        assert!(!RouteGuard::Manager.allows(Some(&employee)));
        assert!(RouteGuard::Manager.allows(Some(&manager)));
        assert!(!RouteGuard::GeneralManager.allows(Some(&manager)));
        assert!(RouteGuard::GeneralManager.allows(Some(&general_manager)));
        assert!(RouteGuard::Manager.allows(Some(&admin)));
        assert!(!RouteGuard::Admin.allows(Some(&general_manager)));
        assert!(RouteGuard::Admin.allows(Some(&admin)));
    }

    #[test]
    fn user_without_role_only_passes_authentication() {
        let user = user_with_role(None);
        assert!(RouteGuard::Authenticated.allows(Some(&user)));
        assert!(!RouteGuard::Manager.allows(Some(&user)));
    }
}

use crate::{
    errors::ServiceError,
    model::{Principal, Role, Session},
};

/// Actions the portal gates. Each one needs at least `required_role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Chat,
    SearchHistory,
    ListDocuments,
    DeleteDocument,
    UploadDocument,
    ViewAnalytics,
    ManageUsers,
}

impl Capability {
    pub const ALL: [Capability; 7] = [
        Capability::Chat,
        Capability::SearchHistory,
        Capability::ListDocuments,
        Capability::DeleteDocument,
        Capability::UploadDocument,
        Capability::ViewAnalytics,
        Capability::ManageUsers,
    ];

    pub fn required_role(&self) -> Role {
        match self {
            Capability::Chat
            | Capability::SearchHistory
            | Capability::ListDocuments
            | Capability::DeleteDocument => Role::User,
            Capability::UploadDocument | Capability::ViewAnalytics | Capability::ManageUsers => {
                Role::Admin
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    LoginRequired,
    Denied,
}

/// Borrowed credentials of a session that passed the guard.
#[derive(Debug, Clone, Copy)]
pub struct Grant<'a> {
    pub token: &'a str,
    pub principal: &'a Principal,
}

pub fn is_admin(session: &Session) -> bool {
    session.principal().is_some_and(Principal::is_admin)
}

pub fn check(session: &Session, capability: Capability) -> Access {
    match session.principal() {
        None => Access::LoginRequired,
        Some(principal) => match capability.required_role() {
            Role::User => Access::Granted,
            Role::Admin if principal.is_admin() => Access::Granted,
            Role::Admin => Access::Denied,
        },
    }
}

pub fn authorize(session: &Session, capability: Capability) -> Result<Grant<'_>, ServiceError> {
    match session {
        Session::Anonymous => Err(ServiceError::NotAuthenticated),
        Session::Authenticated { token, principal } => match check(session, capability) {
            Access::Granted => Ok(Grant { token, principal }),
            Access::LoginRequired => Err(ServiceError::NotAuthenticated),
            Access::Denied => Err(ServiceError::AccessDenied(
                "Access denied. Admin privileges required.".into(),
            )),
        },
    }
}

/// Admins may not demote or deactivate their own account.
pub fn ensure_not_self(principal: &Principal, target_id: i64) -> Result<(), ServiceError> {
    if principal.id == target_id {
        return Err(ServiceError::validation(
            "You cannot change your own role or deactivate yourself",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::principal;

    fn sessions() -> [(Session, &'static str); 3] {
        [
            (Session::Anonymous, "anonymous"),
            (
                Session::authenticated("tok-u", principal(2, "alice", Role::User)),
                "user",
            ),
            (
                Session::authenticated("tok-a", principal(1, "admin", Role::Admin)),
                "admin",
            ),
        ]
    }

    #[test]
    fn decision_table() {
        for (session, who) in sessions() {
            for capability in Capability::ALL {
                let expected = match (who, capability.required_role()) {
                    ("anonymous", _) => Access::LoginRequired,
                    ("user", Role::Admin) => Access::Denied,
                    _ => Access::Granted,
                };
                assert_eq!(check(&session, capability), expected, "{who} / {capability:?}");
            }
        }
    }

    #[test]
    fn is_admin_requires_authentication_and_role() {
        let [anonymous, user, admin] = sessions();
        assert!(!is_admin(&anonymous.0));
        assert!(!is_admin(&user.0));
        assert!(is_admin(&admin.0));
    }

    #[test]
    fn authorize_maps_to_errors() {
        let [anonymous, user, admin] = sessions();

        assert!(matches!(
            authorize(&anonymous.0, Capability::Chat),
            Err(ServiceError::NotAuthenticated)
        ));
        assert!(matches!(
            authorize(&user.0, Capability::ManageUsers),
            Err(ServiceError::AccessDenied(_))
        ));

        let grant = authorize(&admin.0, Capability::ManageUsers).unwrap();
        assert_eq!(grant.token, "tok-a");
        assert_eq!(grant.principal.username, "admin");
    }

    #[test]
    fn admins_cannot_target_themselves() {
        let admin = principal(1, "admin", Role::Admin);
        assert!(ensure_not_self(&admin, 1).is_err());
        assert!(ensure_not_self(&admin, 2).is_ok());
    }
}

//! Who may do what to which account.
//!
//! Handlers ask [`authorize`] before touching anything; the decision depends
//! only on its arguments.

use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Administrator,
    Bodeguero,
    Vendedor,
    Other(String),
}

impl Role {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "administrador" | "administrator" => Role::Administrator,
            "bodeguero" => Role::Bodeguero,
            "vendedor" => Role::Vendedor,
            _ => Role::Other(name.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
    pub is_superuser: bool,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.is_superuser || self.role == Role::Administrator
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    IssuePasswordReset,
    ViewResetTokens,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Account(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

pub fn authorize(actor: &Actor, action: Action, resource: Resource) -> Decision {
    match (action, resource) {
        (Action::IssuePasswordReset | Action::ViewResetTokens, Resource::Account(id)) => {
            if actor.is_admin() || actor.user_id == id {
                Decision::Allow
            } else {
                Decision::Deny
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: &str, is_superuser: bool) -> Actor {
        Actor {
            user_id: Uuid::new_v4(),
            role: Role::from_name(role),
            is_superuser,
        }
    }

    #[test]
    fn role_names_parse_case_insensitively() {
        assert_eq!(Role::from_name("Administrador"), Role::Administrator);
        assert_eq!(Role::from_name("administrador"), Role::Administrator);
        assert_eq!(Role::from_name(" BODEGUERO "), Role::Bodeguero);
        assert_eq!(Role::from_name("Vendedor"), Role::Vendedor);
        assert_eq!(Role::from_name("Cajero"), Role::Other("Cajero".to_string()));
    }

    #[test]
    fn admins_may_act_on_any_account() {
        let target = Resource::Account(Uuid::new_v4());
        for admin in [actor("Administrador", false), actor("Vendedor", true)] {
            assert_eq!(authorize(&admin, Action::IssuePasswordReset, target), Decision::Allow);
            assert_eq!(authorize(&admin, Action::ViewResetTokens, target), Decision::Allow);
        }
    }

    #[test]
    fn staff_may_only_act_on_their_own_account() {
        for role in ["Bodeguero", "Vendedor", "Cajero"] {
            let staff = actor(role, false);
            let own = Resource::Account(staff.user_id);
            let other = Resource::Account(Uuid::new_v4());

            assert_eq!(authorize(&staff, Action::IssuePasswordReset, own), Decision::Allow);
            assert_eq!(authorize(&staff, Action::ViewResetTokens, own), Decision::Allow);
            assert_eq!(authorize(&staff, Action::IssuePasswordReset, other), Decision::Deny);
            assert_eq!(authorize(&staff, Action::ViewResetTokens, other), Decision::Deny);
        }
    }
}

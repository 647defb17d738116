use serde::{Deserialize, Serialize};

/// User roles as assigned by the admin panel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    Seller,
    Client,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin | Role::Admin)
    }
}

/// The caller's identity and capability, as established by the auth layer.
///
/// The booking core never decides who is an admin; it only consumes the
/// capability the session layer hands it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    Customer { id: String },
    Staff { id: String, role: Role },
}

impl Actor {
    pub fn id(&self) -> &str {
        match self {
            Actor::Customer { id } => id,
            Actor::Staff { id, .. } => id,
        }
    }

    /// Staff with an admin role bypass the per-booking seat cap and may
    /// toggle seat blocks.
    pub fn is_admin(&self) -> bool {
        matches!(self, Actor::Staff { role, .. } if role.is_admin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staff_admin_capability() {
        let admin = Actor::Staff {
            id: "a1".into(),
            role: Role::Admin,
        };
        let seller = Actor::Staff {
            id: "s1".into(),
            role: Role::Seller,
        };
        let customer = Actor::Customer { id: "c1".into() };

        assert!(admin.is_admin());
        assert!(!seller.is_admin());
        assert!(!customer.is_admin());
    }
}

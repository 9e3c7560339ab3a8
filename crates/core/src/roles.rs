//! Well-known user role names.

/// Full access, including user management.
pub const ROLE_ADMIN: &str = "admin";

/// Regular operator account.
pub const ROLE_MEMBER: &str = "member";

/// Returns `true` if `role` is one of the known role names.
pub fn is_known_role(role: &str) -> bool {
    matches!(role, ROLE_ADMIN | ROLE_MEMBER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_roles() {
        assert!(is_known_role("admin"));
        assert!(is_known_role("member"));
        assert!(!is_known_role("root"));
    }
}

//! Allow-list authorization

/// Membership test against the static allow-list of usernames.
#[derive(Debug, Clone, Default)]
pub struct Authorizer {
    allowed: Vec<String>,
}

impl Authorizer {
    /// Create an authorizer over the given allow-list.
    #[must_use]
    pub const fn new(allowed: Vec<String>) -> Self {
        Self { allowed }
    }

    /// Returns true if `identity` is on the allow-list.
    ///
    /// The empty identity is never authorized.
    ///
    /// # Examples
    ///
    /// ```
    /// use imagesnap_bot::bot::Authorizer;
    ///
    /// let auth = Authorizer::new(vec!["alice".to_string()]);
    /// assert!(auth.is_authorized("alice"));
    /// assert!(!auth.is_authorized("mallory"));
    /// ```
    #[must_use]
    pub fn is_authorized(&self, identity: &str) -> bool {
        !identity.is_empty() && self.allowed.iter().any(|id| id == identity)
    }

    /// The allow-list, in configured order
    #[must_use]
    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_is_exact() {
        let auth = Authorizer::new(vec!["alice".to_string(), "bob".to_string()]);

        assert!(auth.is_authorized("alice"));
        assert!(auth.is_authorized("bob"));
        assert!(!auth.is_authorized("Alice"));
        assert!(!auth.is_authorized("alice "));
        assert!(!auth.is_authorized("mallory"));
    }

    #[test]
    fn test_empty_identity_rejected() {
        let auth = Authorizer::new(vec![String::new()]);
        assert!(!auth.is_authorized(""));
        assert!(!Authorizer::default().is_authorized(""));
    }
}

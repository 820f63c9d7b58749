use std::sync::Arc;

/// Gate for the single shared admin secret.
///
/// One process-wide plaintext secret, compared byte for byte. No hashing,
/// no lockout, no per-user credentials.
#[derive(Clone)]
pub struct AuthService {
    secret: Arc<str>,
}

impl AuthService {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: Arc::from(secret),
        }
    }

    pub fn check(&self, candidate: &str) -> bool {
        candidate.as_bytes() == self.secret.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_exact_match_only() {
        let gate = AuthService::new("4490");

        assert!(gate.check("4490"));
        assert!(!gate.check("449"));
        assert!(!gate.check("44900"));
        assert!(!gate.check(" 4490"));
        assert!(!gate.check(""));
    }

    #[test]
    fn comparison_is_case_sensitive() {
        let gate = AuthService::new("Secret");

        assert!(gate.check("Secret"));
        assert!(!gate.check("secret"));
    }
}

use sha2::{Digest, Sha256};

/// Hash a bearer token the way the auth service stores it (SHA-256 hex).
/// Only the hash ever reaches the store.
pub fn hash_access_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    let out = hasher.finalize();
    hex::encode(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable_hex() {
        let a = hash_access_token("token-1");
        assert_eq!(a, hash_access_token("token-1"));
        assert_ne!(a, hash_access_token("token-2"));
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// User ID (subject claim)
    pub sub: String,
    pub username: String,
    /// Role name, `staff` or `student`
    pub role: String,
    /// Permission names granted by the role
    pub permissions: Vec<String>,
    /// Expiration (Unix timestamp)
    pub exp: usize,
    /// Issued-at (Unix timestamp)
    pub iat: usize,
}

impl Claims {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(permissions: &[&str]) -> Claims {
        Claims {
            sub: "user-id-123".to_string(),
            username: "jdoe".to_string(),
            role: "student".to_string(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            exp: 1234567890,
            iat: 1234567800,
        }
    }

    #[test]
    fn test_claims_serialize() {
        let serialized = serde_json::to_string(&claims(&["enrollments:create"])).unwrap();
        assert!(serialized.contains(r#""sub":"user-id-123""#));
        assert!(serialized.contains(r#""role":"student""#));
        assert!(serialized.contains(r#""permissions":["enrollments:create"]"#));
    }

    #[test]
    fn test_claims_deserialize() {
        let json = r#"{"sub":"u-1","username":"staff1","role":"staff","permissions":["enrollments:review"],"exp":9999999999,"iat":9999999900}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.username, "staff1");
        assert_eq!(claims.role, "staff");
        assert!(claims.has_permission("enrollments:review"));
    }

    #[test]
    fn test_has_permission_is_exact_match() {
        let claims = claims(&["programs:read"]);
        assert!(claims.has_permission("programs:read"));
        assert!(!claims.has_permission("programs:manage"));
        assert!(!claims.has_permission("programs"));
    }
}

use crate::{abstract_trait::JwtServiceTrait, errors::ServiceError};
use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

const DEMO_USER_ID: &str = "local-user";
const DEMO_ROLE: &str = "admin";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: String,
    pub role: String,
    pub scope: Vec<String>,
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn new(user_id: &str, role: &str, scope: &[&str], iat: usize, exp: usize) -> Self {
        Claims {
            user_id: user_id.to_string(),
            role: role.to_string(),
            scope: scope.iter().map(|s| s.to_string()).collect(),
            exp,
            iat,
        }
    }
}

/// Demo HS256 signer. Every issued token carries the same admin identity.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub jwt_secret: String,
}

impl JwtConfig {
    pub fn new(jwt_secret: &str) -> Self {
        JwtConfig {
            jwt_secret: jwt_secret.to_string(),
        }
    }
}

impl JwtServiceTrait for JwtConfig {
    fn generate_token(&self) -> Result<String, ServiceError> {
        let now = Utc::now();
        let iat = now.timestamp() as usize;
        let exp = (now + Duration::hours(1)).timestamp() as usize;

        let claims = Claims::new(
            DEMO_USER_ID,
            DEMO_ROLE,
            &["create", "update", "delete"],
            iat,
            exp,
        );

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )
        .map_err(ServiceError::Jwt)
    }

    fn verify_token(&self, token: &str) -> Result<Claims, ServiceError> {
        let decoding_key = DecodingKey::from_secret(self.jwt_secret.as_ref());
        let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
            .map_err(ServiceError::Jwt)?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies_with_same_secret() {
        let jwt = JwtConfig::new("secret");
        let token = jwt.generate_token().unwrap();
        let claims = jwt.verify_token(&token).unwrap();

        assert_eq!(claims.user_id, "local-user");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.scope, vec!["create", "update", "delete"]);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let token = JwtConfig::new("one").generate_token().unwrap();
        assert!(matches!(
            JwtConfig::new("two").verify_token(&token),
            Err(ServiceError::Jwt(_))
        ));
    }
}

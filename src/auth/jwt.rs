use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct JwtService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    expiry: Duration,
}

impl JwtService {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            encoding: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.jwt_issuer.clone(),
            audience: config.jwt_audience.clone(),
            expiry: Duration::minutes(config.jwt_expiry_minutes),
        })
    }

    pub fn expires_in_seconds(&self) -> i64 {
        self.expiry.num_seconds()
    }

    pub fn generate_token(&self, user_id: Uuid, email: &str) -> Result<String> {
        let now = Utc::now();
        let exp = now + self.expiry;
        let claims = Claims {
            sub: user_id,
            email: email.to_owned(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp() as usize,
            exp: exp.timestamp() as usize,
        };

        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(&[self.audience.clone()]);
        validation.set_issuer(&[self.issuer.clone()]);
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub iss: String,
    pub aud: String,
    pub iat: usize,
    pub exp: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str, audience: &str) -> AppConfig {
        AppConfig {
            database_url: "postgres://localhost/kennel".to_string(),
            database_max_pool_size: 1,
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            jwt_secret: secret.to_string(),
            jwt_issuer: "kennel-test".to_string(),
            jwt_audience: audience.to_string(),
            jwt_expiry_minutes: 30,
            refresh_token_expiry_days: 7,
            cors_allowed_origin: None,
            max_pedigree_generations: 5,
        }
    }

    #[test]
    fn issued_token_verifies_with_same_service() {
        let jwt = JwtService::from_config(&config("secret", "clients")).unwrap();
        let user_id = Uuid::new_v4();
        let token = jwt.generate_token(user_id, "breeder@example.com").unwrap();

        let claims = jwt.verify_token(&token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "breeder@example.com");
        assert_eq!(jwt.expires_in_seconds(), 30 * 60);
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let issuer = JwtService::from_config(&config("secret-a", "clients")).unwrap();
        let verifier = JwtService::from_config(&config("secret-b", "clients")).unwrap();
        let token = issuer.generate_token(Uuid::new_v4(), "a@b.pl").unwrap();
        assert!(verifier.verify_token(&token).is_err());
    }

    #[test]
    fn rejects_token_for_other_audience() {
        let issuer = JwtService::from_config(&config("secret", "mobile")).unwrap();
        let verifier = JwtService::from_config(&config("secret", "clients")).unwrap();
        let token = issuer.generate_token(Uuid::new_v4(), "a@b.pl").unwrap();
        assert!(verifier.verify_token(&token).is_err());
    }
}

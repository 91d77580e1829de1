//! JWT 令牌签发实现
//!
//! 访问令牌和刷新令牌共用一个密钥，以 `kind` 声明区分用途，
//! 杜绝刷新令牌被当作访问令牌使用（反之亦然）。
//! iat 截断到秒：JWT 数字日期只有秒级精度，
//! 会话旋转标记的比对依赖这一点。

use application::tokens::{AccessClaims, RefreshClaims, TokenError, TokenIssuer, TokenPair};
use chrono::{DateTime, Duration};
use config::JwtConfig;
use domain::{DeviceId, Timestamp, UserId};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const KIND_ACCESS: &str = "access";
const KIND_REFRESH: &str = "refresh";

#[derive(Debug, Serialize, Deserialize)]
struct AccessTokenClaims {
    sub: Uuid,
    kind: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct RefreshTokenClaims {
    sub: Uuid,
    device_id: Uuid,
    kind: String,
    iat: i64,
    exp: i64,
}

pub struct JwtTokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtTokenIssuer {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::default();
        // 默认 60 秒 leeway 会让刚过期的刷新令牌继续通过
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            access_ttl: Duration::seconds(config.access_ttl_seconds),
            refresh_ttl: Duration::seconds(config.refresh_ttl_seconds),
        }
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue_pair(
        &self,
        user_id: UserId,
        device_id: DeviceId,
        now: Timestamp,
    ) -> Result<TokenPair, TokenError> {
        let issued_at = DateTime::from_timestamp(now.timestamp(), 0)
            .ok_or_else(|| TokenError::Issue("timestamp out of range".to_owned()))?;
        let refresh_expires_at = issued_at + self.refresh_ttl;

        let access_claims = AccessTokenClaims {
            sub: user_id.into(),
            kind: KIND_ACCESS.to_owned(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.access_ttl).timestamp(),
        };
        let refresh_claims = RefreshTokenClaims {
            sub: user_id.into(),
            device_id: device_id.into(),
            kind: KIND_REFRESH.to_owned(),
            iat: issued_at.timestamp(),
            exp: refresh_expires_at.timestamp(),
        };

        let access_token = encode(&Header::default(), &access_claims, &self.encoding_key)
            .map_err(|err| TokenError::Issue(err.to_string()))?;
        let refresh_token = encode(&Header::default(), &refresh_claims, &self.encoding_key)
            .map_err(|err| TokenError::Issue(err.to_string()))?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            refresh_issued_at: issued_at,
            refresh_expires_at,
        })
    }

    fn verify_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let data = decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| TokenError::Invalid)?;
        if data.claims.kind != KIND_ACCESS {
            return Err(TokenError::Invalid);
        }
        Ok(AccessClaims {
            user_id: data.claims.sub,
        })
    }

    fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        let data = decode::<RefreshTokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| TokenError::Invalid)?;
        if data.claims.kind != KIND_REFRESH {
            return Err(TokenError::Invalid);
        }
        Ok(RefreshClaims {
            user_id: data.claims.sub,
            device_id: data.claims.device_id,
            issued_at: DateTime::from_timestamp(data.claims.iat, 0).ok_or(TokenError::Invalid)?,
        })
    }
}

use axum::Json;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::common::ApiResponse;
use crate::config::Config;

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password.as_bytes(), DEFAULT_COST)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password.as_bytes(), hash)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32, // 用户ID
    pub exp: i64, // 过期时间
    pub iat: i64, // 签发时间
}

pub fn generate_token(user_id: i32, config: &Config) -> Result<String, jsonwebtoken::errors::Error> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::seconds(config.jwt_expiration().as_secs() as i64))
        .expect("valid timestamp")
        .timestamp();

    let claims = Claims {
        sub: user_id,
        exp: expiration,
        iat: Utc::now().timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
}

pub fn verify_token(token: &str, config: &Config) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

/// 解码前端上传的base64图像，兼容 `data:image/...;base64,` 前缀
pub fn decode_base64_image(data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let payload = if data.contains("data:image") {
        data.split_once(',').map(|(_, rest)| rest).unwrap_or(data)
    } else {
        data
    };
    BASE64.decode(payload.trim())
}

/// 把解码后的图像写入临时文件，调用方负责删除
pub async fn write_temp_image(bytes: &[u8]) -> std::io::Result<std::path::PathBuf> {
    let path = std::env::temp_dir().join(format!("{}.jpg", uuid::Uuid::new_v4()));
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}

/// 清洗上传文件名，去掉路径分隔符等危险字符
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect()
}

pub fn success_to_api_response<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        code: 0,
        msg: "success".into(),
        resp_data: Some(data),
    })
}

pub fn error_to_api_response<T>(code: i32, msg: String) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        code,
        msg,
        resp_data: None,
    })
}

pub mod error_codes {
    pub const SUCCESS: i32 = 0;
    pub const VALIDATION_ERROR: i32 = 1000;
    pub const ALREADY_EXISTS: i32 = 1001;
    pub const AUTH_FAILED: i32 = 1002;
    pub const PERMISSION_DENIED: i32 = 1003;
    pub const NOT_FOUND: i32 = 1004;
    pub const INTERNAL_ERROR: i32 = 5000;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            database_url: "postgres://localhost/test".into(),
            jwt_secret: "test-secret".into(),
            jwt_expiration_secs: 3600,
            server_host: "127.0.0.1".into(),
            server_port: 3000,
            upload_dir: "uploads".into(),
            max_upload_bytes: 1024,
            face_match_tolerance: 0.6,
            blink_threshold: 0.3,
            min_blinks_required: 2,
        }
    }

    #[test]
    fn token_roundtrip() {
        let config = test_config();
        let token = generate_token(42, &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.sub, 42);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_rejects_wrong_secret() {
        let config = test_config();
        let token = generate_token(42, &config).unwrap();
        let mut other = test_config();
        other.jwt_secret = "another-secret".into();
        assert!(verify_token(&token, &other).is_err());
    }

    #[test]
    fn password_roundtrip() {
        let hashed = hash_password("s3cret").unwrap();
        assert!(verify_password("s3cret", &hashed).unwrap());
        assert!(!verify_password("wrong", &hashed).unwrap());
    }

    #[test]
    fn decode_plain_base64() {
        let encoded = BASE64.encode(b"fake-jpeg-bytes");
        assert_eq!(decode_base64_image(&encoded).unwrap(), b"fake-jpeg-bytes");
    }

    #[test]
    fn decode_strips_data_url_prefix() {
        let encoded = format!("data:image/jpeg;base64,{}", BASE64.encode(b"pixels"));
        assert_eq!(decode_base64_image(&encoded).unwrap(), b"pixels");
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode_base64_image("!!!not base64!!!").is_err());
    }

    #[test]
    fn sanitize_strips_path_components() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "....etcpasswd");
        assert_eq!(sanitize_filename("face photo (1).jpg"), "facephoto1.jpg");
        assert_eq!(sanitize_filename("ok-name_01.png"), "ok-name_01.png");
    }
}

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub loyalty: LoyaltyConfig,
    #[serde(default)]
    pub booking: BookingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 允许跨域的前端地址, 为空时放行任意来源 (仅用于本地开发)
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub session_expires_in: i64, // seconds
    pub admin_username: String,
    /// bcrypt 哈希, 用 `washbook-backend hash-password <明文>` 生成
    pub admin_password_hash: String,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(default)]
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoyaltyConfig {
    /// 每多少货币单位累积 1 积分
    pub earn_divisor: i64,
    /// 1 积分抵扣的货币单位
    pub point_value: i64,
}

impl Default for LoyaltyConfig {
    fn default() -> Self {
        Self {
            earn_divisor: 10_000,
            point_value: 1_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfig {
    /// 生成预约编号使用的本地时区 (WIB = +7)
    pub utc_offset_hours: i32,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: 7,
        }
    }
}

fn default_cookie_name() -> String {
    "wash_session".to_string()
}

fn get_env(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn override_parse<T: std::str::FromStr>(name: &str, target: &mut T) {
    if let Some(v) = get_env(name).and_then(|v| v.parse::<T>().ok()) {
        *target = v;
    }
}

fn override_string(name: &str, target: &mut String) {
    if let Some(v) = get_env(name) {
        *target = v;
    }
}

impl Config {
    pub fn from_toml() -> anyhow::Result<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => toml::from_str(&config_str)
                .with_context(|| format!("Failed to parse config file {config_path}"))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // 数据库 URL 在无配置文件时必须提供
                let database_url = get_env("DATABASE_URL").ok_or_else(|| {
                    anyhow!("DATABASE_URL is not set and no config file was found at {config_path}")
                })?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                        cors_origins: Vec::new(),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    auth: AuthConfig {
                        jwt_secret: get_env("JWT_SECRET")
                            .unwrap_or_else(|| "change-me-in-production".to_string()),
                        session_expires_in: get_env_parse("SESSION_EXPIRES_IN", 43_200i64),
                        admin_username: get_env("ADMIN_USERNAME")
                            .unwrap_or_else(|| "admin".to_string()),
                        admin_password_hash: get_env("ADMIN_PASSWORD_HASH").unwrap_or_default(),
                        cookie_name: get_env("SESSION_COOKIE_NAME")
                            .unwrap_or_else(default_cookie_name),
                        cookie_secure: get_env_parse("SESSION_COOKIE_SECURE", false),
                    },
                    loyalty: LoyaltyConfig::default(),
                    booking: BookingConfig::default(),
                }
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Cannot read config file {config_path}"));
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        override_string("SERVER_HOST", &mut config.server.host);
        override_parse("SERVER_PORT", &mut config.server.port);
        if let Some(origins) = get_env("CORS_ORIGINS") {
            config.server.cors_origins = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }
        override_string("DATABASE_URL", &mut config.database.url);
        override_parse("DB_MAX_CONNECTIONS", &mut config.database.max_connections);
        override_string("JWT_SECRET", &mut config.auth.jwt_secret);
        override_parse("SESSION_EXPIRES_IN", &mut config.auth.session_expires_in);
        override_string("ADMIN_USERNAME", &mut config.auth.admin_username);
        override_string("ADMIN_PASSWORD_HASH", &mut config.auth.admin_password_hash);
        override_string("SESSION_COOKIE_NAME", &mut config.auth.cookie_name);
        override_parse("SESSION_COOKIE_SECURE", &mut config.auth.cookie_secure);
        override_parse("LOYALTY_EARN_DIVISOR", &mut config.loyalty.earn_divisor);
        override_parse("LOYALTY_POINT_VALUE", &mut config.loyalty.point_value);
        override_parse(
            "BOOKING_UTC_OFFSET_HOURS",
            &mut config.booking.utc_offset_hours,
        );

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.loyalty.earn_divisor <= 0 || self.loyalty.point_value <= 0 {
            return Err(anyhow!(
                "loyalty.earn_divisor and loyalty.point_value must be positive"
            ));
        }
        if !(-12..=14).contains(&self.booking.utc_offset_hours) {
            return Err(anyhow!("booking.utc_offset_hours out of range"));
        }
        if self.auth.admin_password_hash.is_empty() {
            log::warn!("auth.admin_password_hash is empty, admin login is disabled");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_toml_uses_defaults() {
        let raw = r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [database]
            url = "postgres://localhost/wash"
            max_connections = 5

            [auth]
            jwt_secret = "s3cret"
            session_expires_in = 3600
            admin_username = "owner"
            admin_password_hash = "$2b$04$abc"
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.server.port, 9000);
        assert!(config.server.cors_origins.is_empty());
        assert_eq!(config.auth.cookie_name, "wash_session");
        assert!(!config.auth.cookie_secure);
        assert_eq!(config.loyalty.earn_divisor, 10_000);
        assert_eq!(config.loyalty.point_value, 1_000);
        assert_eq!(config.booking.utc_offset_hours, 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_loyalty_rates() {
        let raw = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            [database]
            url = "postgres://localhost/wash"
            max_connections = 5
            [auth]
            jwt_secret = "s"
            session_expires_in = 60
            admin_username = "admin"
            admin_password_hash = "x"
            [loyalty]
            earn_divisor = 0
            point_value = 1000
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert!(config.validate().is_err());
    }
}

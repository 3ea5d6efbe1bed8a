use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use strum_macros::{Display, EnumString};

use crate::attendance::stats::LatenessRule;
use crate::auth::password::hash_admin_password;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum StorageKind {
    File,
    Memory,
}

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    pub storage: StorageKind,
    pub data_dir: String,
    pub jwt_secret: String,
    pub access_token_ttl: usize,

    pub admin_username: String,
    /// Argon2 PHC string derived from `ADMIN_PASSWORD` at startup.
    pub admin_password_hash: String,

    pub lateness_rule: LatenessRule,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_clock_in_per_min: u32,
    pub rate_admin_per_min: u32,

    pub api_prefix: String,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = var_or(key, default);
    raw.parse::<T>()
        .map_err(|e| anyhow::anyhow!("{key}={raw:?} is invalid: {e}"))
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let admin_password = var_or("ADMIN_PASSWORD", "admin123");

        Ok(Self {
            server_addr: var_or("SERVER_ADDR", "127.0.0.1:8080"),
            storage: parse_var("STORAGE", "file")?,
            data_dir: var_or("DATA_DIR", "data"),
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            access_token_ttl: parse_var("ACCESS_TOKEN_TTL", "28800")?, // default 8 h

            admin_username: var_or("ADMIN_USERNAME", "admin"),
            admin_password_hash: hash_admin_password(&admin_password)?,

            lateness_rule: parse_var("LATENESS_RULE", "lexical")?,

            rate_login_per_min: parse_var("RATE_LOGIN_PER_MIN", "30")?,
            rate_clock_in_per_min: parse_var("RATE_CLOCK_IN_PER_MIN", "60")?,
            rate_admin_per_min: parse_var("RATE_ADMIN_PER_MIN", "1000")?,

            api_prefix: var_or("API_PREFIX", "/api"),
        })
    }

    /// Memory-backed configuration with defaults; used by the HTTP tests.
    pub fn in_memory(jwt_secret: &str, admin_password: &str) -> Result<Self> {
        Ok(Self {
            server_addr: "127.0.0.1:0".into(),
            storage: StorageKind::Memory,
            data_dir: String::new(),
            jwt_secret: jwt_secret.into(),
            access_token_ttl: 900,
            admin_username: "admin".into(),
            admin_password_hash: hash_admin_password(admin_password)?,
            lateness_rule: LatenessRule::Lexical,
            rate_login_per_min: 1000,
            rate_clock_in_per_min: 1000,
            rate_admin_per_min: 1000,
            api_prefix: "/api".into(),
        })
    }
}

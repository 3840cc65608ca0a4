use std::env;
use std::str::FromStr;

use chrono::{NaiveTime, Weekday};
use dotenvy::dotenv;

use crate::policy::LeavePolicy;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,

    // Rate limiting
    pub rate_protected_per_min: u32,
    pub rate_submit_per_min: u32,

    pub api_prefix: String,

    pub policy: LeavePolicy,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),

            rate_protected_per_min: parse_or("RATE_PROTECTED_PER_MIN", 1000),
            rate_submit_per_min: parse_or("RATE_SUBMIT_PER_MIN", 30),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            policy: policy_from_env(),
        }
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("{key} has an invalid value: {raw}")),
        Err(_) => default,
    }
}

fn time_or(key: &str, default: NaiveTime) -> NaiveTime {
    match env::var(key) {
        Ok(raw) => NaiveTime::parse_from_str(raw.trim(), "%H:%M")
            .unwrap_or_else(|_| panic!("{key} must be HH:MM, got {raw}")),
        Err(_) => default,
    }
}

/// Policy defaults with optional `LEAVE_*` overrides.
fn policy_from_env() -> LeavePolicy {
    let defaults = LeavePolicy::default();

    let rest_day = match env::var("LEAVE_REST_DAY") {
        Ok(raw) => Weekday::from_str(raw.trim())
            .unwrap_or_else(|_| panic!("LEAVE_REST_DAY must be a weekday name, got {raw}")),
        Err(_) => defaults.rest_day,
    };

    let policy = LeavePolicy {
        rest_day,
        business_open: time_or("LEAVE_BUSINESS_OPEN", defaults.business_open),
        business_close: time_or("LEAVE_BUSINESS_CLOSE", defaults.business_close),
        max_attachments: parse_or("LEAVE_MAX_ATTACHMENTS", defaults.max_attachments),
        max_attachment_bytes: parse_or("LEAVE_MAX_ATTACHMENT_BYTES", defaults.max_attachment_bytes),
        ..defaults
    };

    assert!(
        policy.business_open < policy.business_close,
        "LEAVE_BUSINESS_OPEN must be before LEAVE_BUSINESS_CLOSE"
    );
    policy
}

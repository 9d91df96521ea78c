use anyhow::Result;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database_url: String,
    pub report_path: String,
    pub admin_users: Vec<String>,
}

fn parse_admin_users(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn load() -> Result<Config> {
    let database_url =
        env::var("LOTTO_DB_PATH").unwrap_or_else(|_| "data/lotto.db".to_string());

    let report_path = env::var("LOTTO_REPORT_PATH").unwrap_or_else(|_| "reports".to_string());

    let admin_users = env::var("LOTTO_ADMIN_USERS")
        .map(|raw| parse_admin_users(&raw))
        .unwrap_or_else(|_| vec!["admin".to_string()]);

    if admin_users.is_empty() {
        anyhow::bail!("LOTTO_ADMIN_USERS must name at least one admin user");
    }

    Ok(Config {
        database_url,
        report_path,
        admin_users,
    })
}

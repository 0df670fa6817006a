//! Configuration

use once_cell::sync::Lazy;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub web_addr: String,
    pub cors: String,
    pub data_file: String,
    pub meta_file: String,
    pub admin_token: String,
}

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv::dotenv().ok();

    Config {
        web_addr: env::var("WEB_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        cors: env::var("WEB_CORS").unwrap_or_else(|_| "*".to_string()),
        data_file: env::var("DATA_FILE").unwrap_or_else(|_| "votes.json".to_string()),
        meta_file: env::var("META_FILE").unwrap_or_else(|_| "votes_meta.json".to_string()),
        admin_token: env::var("ADMIN_TOKEN").unwrap_or_default(),
    }
});

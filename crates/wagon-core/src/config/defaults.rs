//! Default value functions used by serde for config deserialization.

pub fn default_name() -> String {
    "Wagon".to_string()
}

pub fn default_data_dir() -> String {
    "~/.wagon".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_host() -> String {
    "127.0.0.1".to_string()
}

pub fn default_port() -> u16 {
    3000
}

pub fn default_token_ttl_hours() -> i64 {
    24
}

pub fn default_db_path() -> String {
    "~/.wagon/data/wagon.db".to_string()
}

pub fn default_true() -> bool {
    true
}

pub fn default_device_name() -> String {
    "WAGON".to_string()
}

pub fn default_country_code() -> String {
    "92".to_string()
}

pub fn default_pairing_timeout_secs() -> u64 {
    120
}

pub fn default_poll_secs() -> u64 {
    30
}

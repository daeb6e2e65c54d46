use std::time::Duration;

use crate::Result;
pub use clap::Parser;
use libris_types::config::BackendConfig;

#[derive(Debug, Clone, clap::Parser)]
pub struct ServerConfig {
    #[arg(
        short,
        long,
        default_value_t = 3000,
        env = "LIBRIS_LISTEN_PORT",
        help = "Port to listen on"
    )]
    pub port: u16,
    #[arg(
        short,
        long,
        default_value = "127.0.0.1",
        env = "LIBRIS_LISTEN_ADDRESS",
        help = "Address to listen on"
    )]
    pub listen_address: String,

    #[command(flatten)]
    pub backend: BackendConfig,

    #[arg(
        long,
        env = "LIBRIS_TOKEN_VALIDITY",
        default_value = "1 day",
        help = "Default token validity in human friendly format (e.g. 1d, 1h, 1m, 1s - or combined)",
        value_parser = humantime::parse_duration
    )]
    pub token_validity: Duration,

    #[arg(
        long,
        env = "LIBRIS_DEFAULT_PAGE_SIZE",
        default_value = "10",
        help = "Page size used when the listing request does not give a valid limit"
    )]
    pub default_page_size: u32,

    #[arg(long, env = "LIBRIS_NO_CORS", help = "Disable CORS")]
    pub no_cors: bool,
}

impl ServerConfig {
    pub fn load() -> Result<Self> {
        ServerConfig::try_parse().map_err(|e| e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let config = ServerConfig::try_parse_from([
            "libris-server",
            "--port",
            "3033",
            "--data-dir",
            "/tmp/libris-test",
            "--token-validity",
            "2h 30m",
        ])
        .unwrap();
        assert_eq!(config.port, 3033);
        assert_eq!(config.token_validity, Duration::from_secs(9000));
        assert_eq!(config.default_page_size, 10);
        assert_eq!(
            config.backend.database_url(),
            "sqlite:///tmp/libris-test/libris.db"
        );
        assert!(!config.no_cors);
    }
}

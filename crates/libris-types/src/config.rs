use clap::Parser;
use std::path::PathBuf;

/// Storage related settings shared by the server and tooling.
#[derive(Debug, Clone, Parser)]
pub struct BackendConfig {
    #[arg(
        long,
        env = "LIBRIS_DATABASE_URL",
        help = "Database URL e.g. sqlite://file.db, default is sqlite://[data-dir]/libris.db, where data-dir is set by --data-dir"
    )]
    database_url: Option<String>,

    #[arg(
        long,
        env = "LIBRIS_DATA_DIR",
        help = "Data directory (database, token secret), default is system default like ~/.local/share/libris",
        default_value_t = default_data_dir()
    )]
    data_dir: String,
}

fn default_data_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("libris"))
        .unwrap_or_else(|| PathBuf::from("libris"))
        .to_string_lossy()
        .to_string()
}

impl BackendConfig {
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    pub fn database_url(&self) -> String {
        self.database_url
            .clone()
            .unwrap_or_else(|| format!("sqlite://{}/libris.db", self.data_dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_database_url() {
        let config = BackendConfig::try_parse_from(["libris", "--data-dir", "/tmp/lib"]).unwrap();
        assert_eq!(config.database_url(), "sqlite:///tmp/lib/libris.db");
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/lib"));
    }
}

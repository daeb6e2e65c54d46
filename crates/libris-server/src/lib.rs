pub mod config;
pub mod run;

use std::path::Path;

use config::ServerConfig;
use libris_app::state::{AppConfig, AppState};
use tokio::{fs, io::AsyncWriteExt as _};
use tracing::info;

pub type Error = anyhow::Error;
pub type Result<T, E = Error> = std::result::Result<T, E>;

const SECRET_LEN: usize = 32;

pub async fn build_state(config: &ServerConfig) -> Result<AppState> {
    let data_dir = config.backend.data_dir();
    if !data_dir.is_dir() {
        fs::create_dir_all(&data_dir).await?;
        info!("Created data directory {}", data_dir.display());
    }

    let pool = libris_dal::new_pool(&config.backend.database_url()).await?;
    libris_dal::migrate(&pool).await?;

    let secret = read_secret(&data_dir).await?;
    let tokens = libris_auth::token::TokenManager::new(&secret, config.token_validity);
    let app_config = AppConfig {
        default_page_size: config.default_page_size,
    };
    Ok(AppState::new(app_config, pool, tokens))
}

async fn read_secret(data_dir: &Path) -> Result<Vec<u8>, std::io::Error> {
    let secret_file = data_dir.join("secret");

    let secret = if fs::try_exists(&secret_file).await? {
        fs::read(&secret_file).await?
    } else {
        let random_bytes = rand::random::<[u8; SECRET_LEN]>();
        #[cfg(unix)]
        let mut file = {
            use std::fs::OpenOptions;
            use std::os::unix::fs::OpenOptionsExt;
            {
                // only accessible by the current user
                let _f = OpenOptions::new()
                    .mode(0o600)
                    .create(true)
                    .write(true)
                    .truncate(true)
                    .open(&secret_file)?;
            }
            fs::File::options().write(true).open(&secret_file).await?
        };
        #[cfg(not(unix))]
        let mut file = fs::File::create(&secret_file).await?;

        file.write_all(&random_bytes).await?;
        info!("Generated new token secret");
        random_bytes.to_vec()
    };
    Ok(secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_secret_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let first = read_secret(dir.path()).await.unwrap();
        assert_eq!(first.len(), SECRET_LEN);
        let second = read_secret(dir.path()).await.unwrap();
        assert_eq!(first, second);
    }
}

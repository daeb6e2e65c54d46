pub mod rest;

use std::{path::Path, time::Duration};

use anyhow::{Result, anyhow};
use libris_app::auth::AccessGranted;
use libris_server::config::{Parser, ServerConfig};
use rand::Rng as _;
use reqwest::{
    Url,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use serde_json::json;
use tempfile::TempDir;
use tracing::{debug, error};

fn random_port() -> Result<u16> {
    let mut rng = rand::rng();

    let mut retries = 3;
    while retries > 0 {
        let port: u16 = rng.random_range(3030..4030);
        let addr: std::net::SocketAddr = format!("127.0.0.1:{}", port).parse()?;
        match std::net::TcpStream::connect_timeout(&addr, Duration::from_millis(100)) {
            Err(e) if e.kind() == std::io::ErrorKind::ConnectionRefused => return Ok(port),
            Err(_) => retries -= 1,
            Ok(_) => retries -= 1,
        }
    }

    Err(anyhow!("Could not find a free port"))
}

pub struct ConfigGuard {
    #[allow(dead_code)]
    data_dir: TempDir,
}

pub fn test_config(test_name: &str, base_dir: &Path) -> Result<(ServerConfig, ConfigGuard)> {
    let tmp_data_dir = TempDir::with_prefix_in(format!("{}_", test_name), base_dir)?;
    let data_dir = tmp_data_dir.path().to_string_lossy().to_string();
    let port = random_port()?.to_string();
    let args = &[
        "libris-e2e-tests",
        "--data-dir",
        &data_dir,
        "--port",
        &port,
        "--token-validity",
        "10m",
    ];
    let config = ServerConfig::try_parse_from(args)?;
    Ok((
        config,
        ConfigGuard {
            data_dir: tmp_data_dir,
        },
    ))
}

pub async fn prepare_env(test_name: &str) -> Result<(ServerConfig, ConfigGuard)> {
    let base_dir = std::env::temp_dir();
    test_config(test_name, &base_dir)
}

pub fn base_url(config: &ServerConfig) -> Result<Url> {
    Ok(format!("http://127.0.0.1:{}/", config.port).parse()?)
}

/// Starts the server in background and waits until it answers health check.
pub async fn spawn_server(args: ServerConfig) -> Result<Url> {
    let base_url = base_url(&args)?;
    tokio::spawn(async move {
        if let Err(e) = libris_server::run::run(args).await {
            error!("Server failed: {e}");
        }
    });

    let client = reqwest::Client::new();
    let health = base_url.join("health")?;
    for _ in 0..50 {
        match client.get(health.clone()).send().await {
            Ok(response) if response.status().is_success() => return Ok(base_url),
            Ok(response) => debug!("Server not ready: {}", response.status()),
            Err(e) => debug!("Server not ready: {e}"),
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    Err(anyhow!("Server did not start"))
}

pub async fn register_reader(client: &reqwest::Client, base_url: &Url) -> Result<AccessGranted> {
    let payload = json!({
        "firstname": "Test",
        "lastname": "Reader",
        "username": "reader",
        "email": "reader@example.com",
        "password": "password123"
    });
    let response = client
        .post(base_url.join("auth/register")?)
        .json(&payload)
        .send()
        .await?;
    if response.status().as_u16() != 201 {
        return Err(anyhow!("Registration failed: {}", response.status()));
    }
    Ok(response.json().await?)
}

/// Spawns server and returns client authorized as a freshly registered reader.
pub async fn launch_env(args: ServerConfig) -> Result<(reqwest::Client, Url)> {
    let base_url = spawn_server(args).await?;
    let access = register_reader(&reqwest::Client::new(), &base_url).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", access.access_token))?,
    );
    let client = reqwest::Client::builder()
        .default_headers(headers)
        .build()?;
    Ok((client, base_url))
}

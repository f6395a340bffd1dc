use anyhow::{Context, Result, anyhow};
use appwrite::Client;
use dotenvy::dotenv;
use keyring::Entry;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use url::Url;

pub const KEYRING_SERVICE: &str = "aw-api-key";
pub const KEYRING_USER: &str = "Appwrite";

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct ConfigFile {
    pub endpoint: Option<Url>,
    pub project: Option<String>,
    pub chunk_size: Option<u64>,
    pub self_signed: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
struct ConfigEnv {
    appwrite_endpoint: Option<Url>,
    appwrite_project: Option<String>,
    appwrite_api_key: Option<String>,
    appwrite_chunk_size: Option<u64>,
    appwrite_self_signed: Option<bool>,
}

#[derive(Debug)]
pub struct Config {
    pub endpoint: Url,
    pub project: String,
    pub api_key: String,
    pub chunk_size: u64,
    pub self_signed: bool,
}

impl Config {
    pub fn client(&self) -> Result<Client> {
        let client = Client::new(self.endpoint.clone())
            .with_project(&self.project)
            .with_key(&self.api_key)
            .with_chunk_size(self.chunk_size)
            .with_self_signed(self.self_signed)
            .context("Failed to build HTTP client")?;
        Ok(client)
    }
}

fn merge_config(
    base: ConfigFile,
    override_config: ConfigEnv,
    keyring_api_key: impl FnOnce() -> Result<String>,
) -> Result<Config> {
    let endpoint = override_config
        .appwrite_endpoint
        .or(base.endpoint)
        .ok_or(anyhow!("No Appwrite endpoint provided"))?;

    let project = override_config
        .appwrite_project
        .or(base.project)
        .ok_or(anyhow!("No Appwrite project provided"))?;

    let api_key = match override_config.appwrite_api_key {
        Some(api_key) => api_key,
        None => keyring_api_key()?,
    };

    let chunk_size = override_config
        .appwrite_chunk_size
        .or(base.chunk_size)
        .unwrap_or(appwrite::DEFAULT_CHUNK_SIZE);

    let self_signed = override_config
        .appwrite_self_signed
        .or(base.self_signed)
        .unwrap_or(false);

    Ok(Config {
        endpoint,
        project,
        api_key,
        chunk_size,
        self_signed,
    })
}

fn read_keyring_api_key() -> Result<String> {
    let entry = Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
    let api_key = entry
        .get_secret()
        .context("API key not specified via environment variable nor present in OS keyring")?;
    Ok(String::from_utf8(api_key)?)
}

fn config_path() -> Result<PathBuf> {
    let project_dirs = directories::ProjectDirs::from("io", "appwrite", "aw")
        .ok_or(anyhow!("Unable to determine home directory"))?;
    Ok(project_dirs.config_dir().join("config.toml"))
}

pub fn read_file_config() -> Result<ConfigFile> {
    let config_file = config_path()?;
    if let Ok(config) = fs::read_to_string(&config_file) {
        toml::from_str(&config)
            .with_context(|| format!("Failed to parse {}", config_file.display()))
    } else {
        Ok(ConfigFile::default())
    }
}

pub fn read_config() -> Result<Config> {
    let _ = dotenv();
    let env_config = envy::from_env::<ConfigEnv>().unwrap_or_default();

    merge_config(read_file_config()?, env_config, read_keyring_api_key)
}

pub fn write_config(config: ConfigFile) -> Result<()> {
    let config_file = config_path()?;
    if let Some(parent) = config_file.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }
    fs::write(&config_file, toml::to_string_pretty(&config)?)
        .with_context(|| format!("Failed to write {}", config_file.display()))?;
    Ok(())
}

pub fn set_api_key_keyring(api_key: String) -> Result<()> {
    let entry = Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
    entry.set_secret(api_key.as_bytes())?;
    println!("API key set for use with aw");
    Ok(())
}

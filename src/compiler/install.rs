//! On-demand installation of solc release binaries.
//!
//! Binaries come from the official mirror, are checked against the keccak256
//! digest published in the platform's `list.json`, and are cached per version.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use alloy::primitives::{keccak256, B256};
use serde::Deserialize;

use crate::{
    config::Config,
    error::{AppError, Result},
    ethereum::constants::SOLC_BINARIES_URL,
};

/// One entry of a platform's `list.json`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolcBuild {
    /// File name relative to the platform directory.
    pub path: String,
    /// Release version, e.g. `0.8.0`.
    pub version: String,
    /// Keccak256 digest of the file.
    pub keccak256: B256,
}

/// A platform's `list.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct SolcBuildList {
    /// All published builds, nightlies included.
    pub builds: Vec<SolcBuild>,
    /// Release version to file name.
    pub releases: HashMap<String, String>,
}

impl SolcBuildList {
    /// Find the release build for `version`.
    pub fn release(&self, version: &str) -> Option<&SolcBuild> {
        let path = self.releases.get(version)?;
        self.builds.iter().find(|b| &b.path == path)
    }
}

/// Resolves solc binaries, downloading missing versions.
#[derive(Debug, Clone)]
pub struct SolcInstaller {
    /// HTTP client for the binary mirror.
    client: reqwest::Client,
    /// Mirror base URL.
    base_url: String,
    /// Where downloaded binaries are kept.
    cache_dir: PathBuf,
    /// Binary that overrides installation altogether.
    solc_path: Option<PathBuf>,
}

impl SolcInstaller {
    /// Create an installer caching binaries in `cache_dir`.
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        Self::with_options(cache_dir, SOLC_BINARIES_URL.to_string(), None)
    }

    /// Create an installer with a custom mirror and optional binary override.
    pub fn with_options(
        cache_dir: PathBuf,
        base_url: String,
        solc_path: Option<PathBuf>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| AppError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, base_url, cache_dir, solc_path })
    }

    /// Create an installer from the solc settings of `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache_dir = config.solc_cache_dir.clone().unwrap_or_else(default_cache_dir);
        Self::with_options(cache_dir, SOLC_BINARIES_URL.to_string(), config.solc_path.clone())
    }

    /// Get the cache directory.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Path a cached binary for `version` lives at.
    pub fn binary_path(&self, version: &str) -> PathBuf {
        let name = format!("solc-v{}{}", version, std::env::consts::EXE_SUFFIX);
        self.cache_dir.join(name)
    }

    /// Return a solc binary for `version`, installing it if needed.
    pub async fn ensure_installed(&self, version: &str) -> Result<PathBuf> {
        if let Some(path) = &self.solc_path {
            tracing::debug!(solc = %path.display(), "Using configured solc binary");
            return Ok(path.clone());
        }

        validate_version(version)?;

        let binary = self.binary_path(version);
        if tokio::fs::try_exists(&binary).await? {
            tracing::debug!(solc = %binary.display(), "Using cached solc binary");
            return Ok(binary);
        }

        self.install(version, &binary).await?;
        Ok(binary)
    }

    async fn install(&self, version: &str, binary: &Path) -> Result<()> {
        let platform = platform()?;
        tracing::info!(version = %version, platform = %platform, "Installing solc");

        let list_url = format!("{}/{}/list.json", self.base_url, platform);
        let list: SolcBuildList = self
            .client
            .get(&list_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::Compilation(format!("cannot fetch {}: {}", list_url, e)))?
            .json()
            .await
            .map_err(|e| AppError::Compilation(format!("invalid build list: {}", e)))?;

        let build = list.release(version).ok_or_else(|| {
            AppError::Compilation(format!("solc {} is not released for {}", version, platform))
        })?;

        let url = format!("{}/{}/{}", self.base_url, platform, build.path);
        let bytes = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::Compilation(format!("cannot download {}: {}", url, e)))?
            .bytes()
            .await
            .map_err(|e| AppError::Compilation(format!("cannot download {}: {}", url, e)))?;

        verify_checksum(&bytes, build)?;

        tokio::fs::create_dir_all(&self.cache_dir).await?;
        let mut partial = binary.as_os_str().to_owned();
        partial.push(".part");
        let partial = PathBuf::from(partial);
        tokio::fs::write(&partial, &bytes).await?;
        make_executable(&partial).await?;
        tokio::fs::rename(&partial, binary).await?;

        tracing::info!(version = %version, solc = %binary.display(), "solc installed");
        Ok(())
    }
}

/// Directory of the official mirror serving binaries for this host.
pub fn platform() -> Result<&'static str> {
    match (std::env::consts::OS, std::env::consts::ARCH) {
        ("linux", "x86_64") => Ok("linux-amd64"),
        // Apple silicon runs the amd64 builds through Rosetta.
        ("macos", _) => Ok("macosx-amd64"),
        ("windows", "x86_64") => Ok("windows-amd64"),
        (os, arch) => Err(AppError::Compilation(format!(
            "no prebuilt solc for {}-{}; set SOLC_PATH",
            os, arch
        ))),
    }
}

/// Reject anything that is not a plain `major.minor.patch` version.
pub fn validate_version(version: &str) -> Result<()> {
    let parts: Vec<&str> = version.split('.').collect();
    let valid = parts.len() == 3
        && parts.iter().all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()));

    if valid {
        Ok(())
    } else {
        Err(AppError::Compilation(format!("invalid solc version: {:?}", version)))
    }
}

fn verify_checksum(bytes: &[u8], build: &SolcBuild) -> Result<()> {
    let actual = keccak256(bytes);
    if actual != build.keccak256 {
        return Err(AppError::Compilation(format!(
            "checksum mismatch for {}: expected {}, got {}",
            build.path, build.keccak256, actual
        )));
    }
    Ok(())
}

fn default_cache_dir() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(|home| PathBuf::from(home).join(".ctf-web3").join("solc"))
        .unwrap_or_else(|| std::env::temp_dir().join("ctf-web3-solc"))
}

#[cfg(unix)]
async fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

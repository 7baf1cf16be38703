//! Configuration management
//!
//! denv keeps its bucket credentials in a plain `KEY=value` env file under a
//! per-user directory: `~/.config/denv/.env` (or `~/denv/.env` on Windows).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result};

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "DENV_CONFIG_DIR";

/// Name of the env file inside the configuration directory
const ENV_FILE_NAME: &str = ".env";

pub const ACCESS_KEY_VAR: &str = "AWS_ACCESS_KEY";
pub const SECRET_KEY_VAR: &str = "AWS_SECRET_KEY";
pub const BUCKET_NAME_VAR: &str = "AWS_BUCKET_NAME";
pub const BUCKET_REGION_VAR: &str = "AWS_BUCKET_REGION";
pub const ENDPOINT_VAR: &str = "AWS_ENDPOINT_URL";

/// Filesystem locations denv reads and writes
///
/// Resolved once at startup and passed by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    /// Directory holding the env file
    pub config_dir: PathBuf,
    /// The env file itself
    pub env_file: PathBuf,
}

impl Paths {
    /// Resolve the default locations for the current user
    ///
    /// `DENV_CONFIG_DIR` takes precedence over the home directory.
    pub fn resolve() -> Result<Self> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::in_dir(PathBuf::from(dir)));
        }

        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".into()))?;
        Ok(Self::for_home(&home))
    }

    /// Default locations under a given home directory
    pub fn for_home(home: &Path) -> Self {
        if cfg!(windows) {
            Self::in_dir(home.join("denv"))
        } else {
            Self::in_dir(home.join(".config").join("denv"))
        }
    }

    /// Locations inside an explicit configuration directory
    pub fn in_dir(config_dir: PathBuf) -> Self {
        let env_file = config_dir.join(ENV_FILE_NAME);
        Self {
            config_dir,
            env_file,
        }
    }
}

/// Bucket credentials and location
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Credentials {
    /// Access key ID
    pub access_key: String,

    /// Secret access key
    #[serde(skip)]
    pub secret_key: String,

    /// Bucket holding the stashed files
    pub bucket_name: String,

    /// Region the bucket lives in
    pub bucket_region: String,

    /// Custom endpoint for S3-compatible stores
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl Credentials {
    /// Names of required fields that are empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            (ACCESS_KEY_VAR, &self.access_key),
            (SECRET_KEY_VAR, &self.secret_key),
            (BUCKET_NAME_VAR, &self.bucket_name),
            (BUCKET_REGION_VAR, &self.bucket_region),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Whether every required field is set
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Fail with [`Error::ConfigIncomplete`] unless every required field is set
    pub fn require_complete(&self) -> Result<()> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::ConfigIncomplete(missing.join(", ")))
        }
    }

    /// Build from parsed env-file values
    fn from_values(values: &HashMap<String, String>) -> Result<Self> {
        let get = |name: &str| values.get(name).cloned().unwrap_or_default();

        let endpoint = values
            .get(ENDPOINT_VAR)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(|v| {
                url::Url::parse(v)
                    .map(|_| v.to_string())
                    .map_err(|e| Error::Config(format!("Invalid {ENDPOINT_VAR} '{v}': {e}")))
            })
            .transpose()?;

        Ok(Self {
            access_key: get(ACCESS_KEY_VAR),
            secret_key: get(SECRET_KEY_VAR),
            bucket_name: get(BUCKET_NAME_VAR),
            bucket_region: get(BUCKET_REGION_VAR),
            endpoint,
        })
    }

    /// Render as env-file content
    fn to_env_file(&self) -> String {
        let mut content = format!(
            "{ACCESS_KEY_VAR}={}\n{SECRET_KEY_VAR}={}\n{BUCKET_NAME_VAR}={}\n{BUCKET_REGION_VAR}={}\n",
            self.access_key, self.secret_key, self.bucket_name, self.bucket_region
        );
        if let Some(endpoint) = &self.endpoint {
            content.push_str(&format!("{ENDPOINT_VAR}={endpoint}\n"));
        }
        content
    }
}

/// Parse `KEY=value` lines
///
/// Blank lines and `#` comments are skipped, an optional `export ` prefix is
/// accepted, and one layer of matching quotes around the value is removed.
pub fn parse_env(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), unquote(value.trim()).to_string()))
        })
        .collect()
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Configuration manager handles loading and saving credentials
#[derive(Debug)]
pub struct ConfigManager {
    paths: Paths,
}

impl ConfigManager {
    /// Create a ConfigManager for the given locations
    pub fn new(paths: Paths) -> Self {
        Self { paths }
    }

    /// Get the resolved locations
    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    /// Create the configuration directory and an empty env file if missing
    pub fn ensure(&self) -> Result<()> {
        std::fs::create_dir_all(&self.paths.config_dir)?;
        if !self.paths.env_file.exists() {
            tracing::debug!(path = %self.paths.env_file.display(), "creating empty env file");
            std::fs::write(&self.paths.env_file, "")?;
        }
        Ok(())
    }

    /// Load credentials from the env file
    ///
    /// A missing file yields empty credentials.
    pub fn load(&self) -> Result<Credentials> {
        Credentials::from_values(&self.read_values()?)
    }

    /// Load credentials, letting process environment variables override the file
    pub fn load_with_env(&self) -> Result<Credentials> {
        let mut values = self.read_values()?;
        for name in [
            ACCESS_KEY_VAR,
            SECRET_KEY_VAR,
            BUCKET_NAME_VAR,
            BUCKET_REGION_VAR,
            ENDPOINT_VAR,
        ] {
            if let Ok(value) = std::env::var(name) {
                if !value.is_empty() {
                    values.insert(name.to_string(), value);
                }
            }
        }

        Credentials::from_values(&values)
    }

    fn read_values(&self) -> Result<HashMap<String, String>> {
        if !self.paths.env_file.exists() {
            return Ok(HashMap::new());
        }
        let content = std::fs::read_to_string(&self.paths.env_file)?;
        Ok(parse_env(&content))
    }

    /// Save credentials to disk
    ///
    /// Creates the directory if needed and restricts the file to its owner on
    /// Unix systems.
    pub fn save(&self, credentials: &Credentials) -> Result<()> {
        std::fs::create_dir_all(&self.paths.config_dir)?;
        std::fs::write(&self.paths.env_file, credentials.to_env_file())?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.paths.env_file, permissions)?;
        }

        Ok(())
    }
}

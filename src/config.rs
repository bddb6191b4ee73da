use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::draft::ImagePolicy;
use crate::schema::DEFAULT_AUTHORITY;

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ShopitConfig {
    pub database: Option<String>,
    pub authority: Option<String>,
    pub require_image: Option<bool>,
    pub port: Option<u16>,
}

impl ShopitConfig {
    /// Database path, relative paths resolved against `base`
    pub fn database_path(&self, base: &Path) -> PathBuf {
        match &self.database {
            Some(db) => base.join(db),
            None => default_database_path_in(base),
        }
    }

    pub fn authority(&self) -> &str {
        self.authority.as_deref().unwrap_or(DEFAULT_AUTHORITY)
    }

    pub fn image_policy(&self) -> ImagePolicy {
        ImagePolicy::from_required(self.require_image.unwrap_or(false))
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("shopit.toml")
}

pub fn default_database_path_in(base: &Path) -> PathBuf {
    base.join(".shopit").join("inventory.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<ShopitConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: ShopitConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &ShopitConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ShopitConfig::default();
        let base = Path::new("/srv/shop");
        assert_eq!(config.database_path(base), PathBuf::from("/srv/shop/.shopit/inventory.db"));
        assert_eq!(config.authority(), "stockapp");
        assert_eq!(config.image_policy(), ImagePolicy::Optional);
        assert_eq!(config.port(), DEFAULT_PORT);
    }

    #[test]
    fn test_write_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shopit.toml");
        let config = ShopitConfig {
            database: Some("data/stock.db".into()),
            authority: Some("shop".into()),
            require_image: Some(true),
            port: None,
        };

        write_config(&path, &config, false).unwrap();
        assert!(write_config(&path, &config, false).is_err());
        write_config(&path, &config, true).unwrap();

        let loaded = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.image_policy(), ImagePolicy::Required);
        assert!(load_config(Some(&dir.path().join("missing.toml"))).unwrap().is_none());
    }

    #[test]
    fn test_ensure_db_dir() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("nested").join("inventory.db");
        ensure_db_dir(&db).unwrap();
        assert!(db.parent().unwrap().is_dir());
    }
}

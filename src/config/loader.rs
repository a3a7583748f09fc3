use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use tracing::debug;

use crate::config::AppConfig;

const CONFIG_DIR: &str = "stockdesk";
const CONFIG_FILE: &str = "config.toml";

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Load the user's config file, falling back to defaults when there is none.
pub fn load() -> Result<AppConfig> {
    let Some(path) = config_path() else {
        debug!("No config directory found, using defaults");
        return Ok(AppConfig::default());
    };
    load_from(&path)
}

/// Load the config at `path`. A missing file yields the defaults; a file that
/// does not parse is an error.
pub fn load_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        debug!(?path, "Config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read config file {}", path.display()))?;
    let config: AppConfig = toml::from_str(&content)
        .wrap_err_with(|| format!("Invalid config file {}", path.display()))?;
    debug!(?path, "Loaded config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use super::*;
    use crate::api::DEFAULT_BASE_URL;
    use crate::config::{DashboardAction, KeyResolver, NavAction};

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.theme.name, "Catppuccin Mocha");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
            [api]
            base_url = "https://shop.example.com/api"

            [keybindings.dashboard]
            logout = "ctrl+l"
            "#,
        )
        .unwrap();

        let config = load_from(&path).unwrap();
        assert_eq!(config.api.base_url, "https://shop.example.com/api");
        assert_eq!(config.theme.name, "Catppuccin Mocha");

        let resolver = KeyResolver::new(std::sync::Arc::new(config.keybindings));
        let ctrl_l = KeyEvent::new(KeyCode::Char('l'), KeyModifiers::CONTROL);
        assert!(resolver.matches_dashboard(&ctrl_l, DashboardAction::Logout));
        let n = KeyEvent::new(KeyCode::Char('n'), KeyModifiers::NONE);
        assert!(resolver.matches_dashboard(&n, DashboardAction::New));
        let down = KeyEvent::new(KeyCode::Down, KeyModifiers::NONE);
        assert!(resolver.matches_nav(&down, NavAction::Down));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[keybindings.global]\nquit = \"hyper+q\"\n").unwrap();
        assert!(load_from(&path).is_err());
    }
}

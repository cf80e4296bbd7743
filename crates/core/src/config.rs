//! Config file parsing for `~/.config/napfix/config.toml`.
//!
//! Use `repair_options_from_config` to build repair options from the loaded
//! config so backup and verbosity defaults apply.

use serde::{Deserialize, Serialize};

use crate::detect::ReasonFilter;
use crate::repair::RepairOptions;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub repair: RepairConfig,
    #[serde(default)]
    pub extensions: ExtensionsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepairConfig {
    /// Keep a `.bak` copy of every file before rewriting it.
    #[serde(default = "default_backup")]
    pub backup: bool,
    /// 0 = no reasons, 1 = only reasons why not, 2 = all reasons.
    #[serde(default = "default_verbosity")]
    pub verbosity: u8,
}

fn default_backup() -> bool {
    true
}
fn default_verbosity() -> u8 {
    2
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            backup: true,
            verbosity: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionsConfig {
    #[serde(default = "default_subtitle_exts")]
    pub subtitle: Vec<String>,
    #[serde(default = "default_video_exts")]
    pub video: Vec<String>,
}

fn default_subtitle_exts() -> Vec<String> {
    ["txt", "srt", "sub", "mpl"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_video_exts() -> Vec<String> {
    ["mp4", "avi", "mkv", "rmvb", "xvid"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for ExtensionsConfig {
    fn default() -> Self {
        Self {
            subtitle: default_subtitle_exts(),
            video: default_video_exts(),
        }
    }
}

/// Load config from the default path (`~/.config/napfix/config.toml`).
/// Missing or unreadable config falls back to defaults.
pub fn load_config() -> AppConfig {
    let config_path = match config_path() {
        Some(p) => p,
        None => return AppConfig::default(),
    };

    let content = match std::fs::read_to_string(&config_path) {
        Ok(c) => c,
        Err(_) => return AppConfig::default(),
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(cfg) => cfg,
        Err(_) => AppConfig::default(),
    }
}

/// Return the default config file path (for init and show).
pub fn config_path() -> Option<std::path::PathBuf> {
    dirs::config_dir().map(|mut p| {
        p.push("napfix");
        p.push("config.toml");
        p
    })
}

/// Build repair options from config. CLI flags override these afterwards.
pub fn repair_options_from_config(cfg: &AppConfig) -> RepairOptions {
    RepairOptions {
        backup: cfg.repair.backup,
        dry_run: false,
        reasons: ReasonFilter::from_verbosity(cfg.repair.verbosity),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_match_the_documented_tables() {
        let cfg = AppConfig::default();
        assert!(cfg.repair.backup);
        assert_eq!(cfg.repair.verbosity, 2);
        assert_eq!(cfg.extensions.subtitle, ["txt", "srt", "sub", "mpl"]);
        assert_eq!(
            cfg.extensions.video,
            ["mp4", "avi", "mkv", "rmvb", "xvid"]
        );
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let cfg: AppConfig = toml::from_str("[repair]\nbackup = false\n").unwrap();
        assert!(!cfg.repair.backup);
        assert_eq!(cfg.repair.verbosity, 2);
        assert_eq!(cfg.extensions.subtitle.len(), 4);
    }

    #[test]
    fn options_builder_maps_verbosity() {
        let mut cfg = AppConfig::default();
        cfg.repair.verbosity = 0;
        let opts = repair_options_from_config(&cfg);
        assert!(opts.backup);
        assert!(!opts.dry_run);
        assert_eq!(opts.reasons, ReasonFilter::None);
    }

    #[test]
    fn config_roundtrips_through_toml() {
        let cfg = AppConfig::default();
        let s = toml::to_string_pretty(&cfg).unwrap();
        let back: AppConfig = toml::from_str(&s).unwrap();
        assert_eq!(back.repair.verbosity, cfg.repair.verbosity);
        assert_eq!(back.extensions.subtitle, cfg.extensions.subtitle);
    }
}

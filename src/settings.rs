//! Settings persistence using TOML
//!
//! Stores settings in ~/.config/blockfall/settings.toml (or platform equivalent)

use crate::game::Rules;
use crate::lookahead::MAX_LOOKAHEAD;
use crate::score::ScoreTable;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Game settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Keybindings
    pub keys: KeyBindings,
    /// Visual settings
    pub visual: VisualSettings,
    /// Gameplay settings
    pub gameplay: GameplaySettings,
}

/// Key bindings (stored as strings for easy editing)
/// Each action can have one or more keys bound to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub move_left: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub move_right: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub rotate: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub place: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub accelerate: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub pause: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub restart: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub quit: Vec<String>,
}

/// Deserialize keys as either a single string or array of strings
fn deserialize_keys<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};

    struct KeysVisitor;

    impl<'de> Visitor<'de> for KeysVisitor {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a string or array of strings")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: de::SeqAccess<'de>,
        {
            let mut keys = Vec::new();
            while let Some(key) = seq.next_element::<String>()? {
                keys.push(key);
            }
            Ok(keys)
        }
    }

    deserializer.deserialize_any(KeysVisitor)
}

/// Serialize keys: single key as string, multiple as array
fn serialize_keys<S>(keys: &[String], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match keys {
        [key] => serializer.serialize_str(key),
        _ => serializer.collect_seq(keys),
    }
}

/// Visual settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualSettings {
    /// Ghost piece visibility
    pub show_ghost: bool,
    /// Block style: "solid", "bracket", "round"
    pub block_style: String,
}

/// Gameplay settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplaySettings {
    /// Gravity interval in milliseconds
    pub drop_delay_ms: u64,
    /// Gravity interval while accelerating
    pub fast_drop_delay_ms: u64,
    /// Number of upcoming pieces to preview
    pub lookahead: usize,
    /// Delayed Auto Shift in milliseconds
    pub das_ms: u64,
    /// Auto Repeat Rate in milliseconds
    pub arr_ms: u64,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            move_left: vec!["Left".to_string(), "a".to_string()],
            move_right: vec!["Right".to_string(), "d".to_string()],
            rotate: vec!["Up".to_string(), "w".to_string()],
            place: vec!["Down".to_string(), "s".to_string()],
            accelerate: vec!["Space".to_string()],
            pause: vec!["p".to_string(), "Esc".to_string()],
            restart: vec!["r".to_string()],
            quit: vec!["q".to_string()],
        }
    }
}

impl Default for VisualSettings {
    fn default() -> Self {
        Self {
            show_ghost: true,
            block_style: "solid".to_string(),
        }
    }
}

impl Default for GameplaySettings {
    fn default() -> Self {
        Self {
            drop_delay_ms: 500,
            fast_drop_delay_ms: 60,
            lookahead: 5,
            das_ms: 170,
            arr_ms: 50,
        }
    }
}

impl GameplaySettings {
    /// Engine rules for these settings. Delays are at least 1 ms and the
    /// preview holds between one and `MAX_LOOKAHEAD` pieces.
    pub fn rules(&self) -> Rules {
        Rules {
            drop_delay: Duration::from_millis(self.drop_delay_ms.max(1)),
            fast_drop_delay: Duration::from_millis(self.fast_drop_delay_ms.max(1)),
            lookahead: self.lookahead.clamp(1, MAX_LOOKAHEAD),
            scoring: ScoreTable::default(),
        }
    }
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "blockfall", "blockfall")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("settings.toml"))
    }

    /// Load settings from file, or fall back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            return Self::default();
        };

        match fs::read_to_string(&path) {
            Ok(contents) => Self::from_toml(&contents).unwrap_or_else(|e| {
                tracing::warn!("ignoring {}: {:#}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Parse settings; missing fields take their defaults
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid settings file")
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize settings")
    }

    /// Save settings to file
    pub fn save(&self) -> Result<()> {
        let dir = Self::config_dir().context("could not determine config directory")?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;

        let path = dir.join("settings.toml");
        fs::write(&path, self.to_toml()?)
            .with_context(|| format!("failed to write {}", path.display()))?;

        tracing::info!("settings saved to {}", path.display());
        Ok(())
    }
}

impl VisualSettings {
    /// Get the block characters based on style
    pub fn block_chars(&self) -> (&'static str, &'static str) {
        match self.block_style.as_str() {
            "bracket" => ("[]", ".."),
            "round" => ("()", ".."),
            _ => ("██", "░░"), // "solid" or default
        }
    }
}

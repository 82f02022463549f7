//! Application-level configuration loading, including the runtime deck presets.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "PLANNING_POKER_BACK_CONFIG_PATH";

/// Deck preset identifier used when a room does not request one explicitly.
pub const DEFAULT_DECK_TYPE: &str = "fibonacci";

/// A named deck of cards a room can vote with.
#[derive(Debug, Clone)]
pub struct DeckPreset {
    /// Preset identifier (e.g. `fibonacci`, `tshirt`).
    pub deck_type: String,
    /// Optional visual theme hint forwarded to clients.
    pub theme: Option<String>,
    /// Ordered card labels.
    pub cards: Vec<String>,
}

impl DeckPreset {
    /// Serialize the card list into the JSON string stored on the room row.
    pub fn encoded_cards(&self) -> String {
        serde_json::to_string(&self.cards).unwrap_or_else(|_| "[]".into())
    }
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    presets: Vec<DeckPreset>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to the
    /// baked-in deck presets.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        count = config.presets.len(),
                        "loaded deck presets from config"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Look a preset up by its identifier.
    pub fn preset(&self, deck_type: &str) -> Option<&DeckPreset> {
        self.presets
            .iter()
            .find(|preset| preset.deck_type == deck_type)
    }

    /// Preset used when a room does not ask for a specific one.
    ///
    /// Falls back to the first configured preset when [`DEFAULT_DECK_TYPE`]
    /// is absent from the loaded set; the built-in set always contains it.
    pub fn default_preset(&self) -> &DeckPreset {
        self.preset(DEFAULT_DECK_TYPE)
            .unwrap_or_else(|| &self.presets[0])
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            presets: default_presets(),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    decks: Vec<RawDeck>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let mut presets: Vec<DeckPreset> = value.decks.into_iter().map(Into::into).collect();
        if presets.is_empty() {
            presets = default_presets();
        }
        Self { presets }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of a single deck entry inside the configuration file.
struct RawDeck {
    deck_type: String,
    #[serde(default)]
    theme: Option<String>,
    cards: Vec<String>,
}

impl From<RawDeck> for DeckPreset {
    fn from(value: RawDeck) -> Self {
        Self {
            deck_type: value.deck_type,
            theme: value.theme,
            cards: value.cards,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn cards(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|label| label.to_string()).collect()
}

/// Built-in deck presets shipped with the binary.
fn default_presets() -> Vec<DeckPreset> {
    vec![
        DeckPreset {
            deck_type: "fibonacci".into(),
            theme: None,
            cards: cards(&[
                "0", "1", "2", "3", "5", "8", "13", "21", "34", "55", "89", "?", "☕",
            ]),
        },
        DeckPreset {
            deck_type: "modified-fibonacci".into(),
            theme: None,
            cards: cards(&[
                "0", "0.5", "1", "2", "3", "5", "8", "13", "20", "40", "100", "?", "☕",
            ]),
        },
        DeckPreset {
            deck_type: "tshirt".into(),
            theme: Some("fabric".into()),
            cards: cards(&["XS", "S", "M", "L", "XL", "XXL", "?"]),
        },
        DeckPreset {
            deck_type: "powers-of-2".into(),
            theme: None,
            cards: cards(&["1", "2", "4", "8", "16", "32", "64", "?"]),
        },
    ]
}

use crate::engine::PercentPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Which keypad is visible. Purely a UI selector; the evaluator
/// behaves the same in every mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Basic,
    Scientific,
    Conversions,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Basic, Mode::Scientific, Mode::Conversions];

    pub fn id(self) -> &'static str {
        match self {
            Mode::Basic => "basic",
            Mode::Scientific => "scientific",
            Mode::Conversions => "conversions",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Mode::Basic => "Basic",
            Mode::Scientific => "Scientific",
            Mode::Conversions => "Conversions",
        }
    }

    pub fn from_id(id: &str) -> Option<Mode> {
        Mode::ALL.into_iter().find(|mode| mode.id() == id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub theme: ThemeConfig,
    pub calculator: CalculatorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub background_color: String,
    pub text_color: String,
    pub accent_color: String,
    pub font_size: i32,
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculatorConfig {
    pub mode: Mode,
    pub percent_policy: PercentPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: ThemeConfig {
                background_color: "#0a0a0a".to_string(),
                text_color: "#ffffff".to_string(),
                accent_color: "#ff9500".to_string(), // iOS calculator orange
                font_size: 18,
                width: 380,
                height: 560,
            },
            calculator: CalculatorConfig {
                mode: Mode::Basic,
                percent_policy: PercentPolicy::default(),
            },
        }
    }
}

impl Config {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("culichi_calc")
            .join("config.toml")
    }

    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = Self::config_path();

        if !path.exists() {
            let default = Config::default();
            default.save()?;
            return Ok(default);
        }

        let contents = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string(self)?;
        fs::write(&path, contents)?;
        Ok(())
    }
}

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Color theme for the whole app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

/// Persisted user preferences. Currently just the theme.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Prefs {
    #[serde(default)]
    pub theme: Theme,
}

impl Prefs {
    /// Directory: ~/.config/echo-assistant/
    fn dir() -> PathBuf {
        let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("echo-assistant");
        p
    }

    fn path() -> PathBuf {
        Self::dir().join("prefs.json")
    }

    /// Load from disk. A missing file, unreadable storage, or an
    /// unrecognized theme value all fall back to the defaults.
    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        fs::create_dir_all(Self::dir())?;
        self.save_to(&Self::path())
    }

    fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    fn temp_path(suffix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        std::env::temp_dir().join(format!("echo-assistant-prefs-{suffix}-{nanos}.json"))
    }

    #[test]
    fn theme_round_trips_through_disk() {
        for theme in [Theme::Dark, Theme::Light] {
            let path = temp_path("roundtrip");
            let prefs = Prefs { theme };
            prefs.save_to(&path).unwrap();
            assert_eq!(Prefs::load_from(&path), prefs);
            let _ = fs::remove_file(&path);
        }
    }

    #[test]
    fn missing_file_loads_dark_default() {
        let path = temp_path("missing");
        assert_eq!(Prefs::load_from(&path).theme, Theme::Dark);
    }

    #[test]
    fn unrecognized_stored_value_falls_back_to_default() {
        let path = temp_path("garbage");
        fs::write(&path, r#"{"theme":"solarized"}"#).unwrap();
        assert_eq!(Prefs::load_from(&path).theme, Theme::Dark);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn theme_serializes_as_lowercase_string() {
        let json = serde_json::to_string(&Prefs { theme: Theme::Light }).unwrap();
        assert!(json.contains(r#""light""#));
    }
}

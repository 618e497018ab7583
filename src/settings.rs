use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub globe: GlobeSettings,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct GlobeSettings {
    pub nodes: Option<PathBuf>,      // JSON array of reports
    pub density: Option<f32>,        // Device pixels per logical pixel
    pub time_step: Option<f32>,      // Seconds per frame
    pub rotation_step: Option<f32>,  // Radians per frame
    pub star_count: Option<usize>,
    pub log_file: Option<PathBuf>,
}

impl Settings {
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content),
            Err(_) => Self::default(),
        }
    }

    pub fn parse(content: &str) -> Self {
        toml::from_str(content).unwrap_or_default()
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("civiglobe")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_globe_section() {
        let s = Settings::parse(
            r#"
            [globe]
            nodes = "/tmp/reports.json"
            density = 2.0
            star_count = 50
            "#,
        );
        assert_eq!(s.globe.nodes, Some(PathBuf::from("/tmp/reports.json")));
        assert_eq!(s.globe.density, Some(2.0));
        assert_eq!(s.globe.star_count, Some(50));
        assert_eq!(s.globe.time_step, None);
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        let s = Settings::parse("[globe\nnodes = ");
        assert_eq!(s.globe, GlobeSettings::default());
    }

    #[test]
    fn config_path_is_namespaced() {
        assert!(Settings::config_path().ends_with("civiglobe/config.toml"));
    }
}

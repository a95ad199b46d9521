//! Page configuration
//!
//! A page is one TOML document: `[scroll]` settings, the ordered
//! `[[features]]` table, `[[videos]]` and `[[bindings]]`. The page the
//! project ships with is embedded and available through [`PageConfig::builtin`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use scrollstage_shared::{FeatureSpec, TableError, TimelineBinding, VideoSpec};

use crate::router::ScrollConfig;

const BUILTIN_PAGE: &str = include_str!("../assets/page.toml");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read page config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid page config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize page config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error(transparent)]
    Table(#[from] TableError),
    #[error("invalid scroll settings: {0}")]
    InvalidScroll(&'static str),
    #[error("feature id '{0}' used more than once")]
    DuplicateFeature(String),
    #[error("sequence length must be positive and finite (got {0})")]
    InvalidSequenceLength(f64),
}

/// Complete page description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    #[serde(default)]
    pub scroll: ScrollConfig,
    /// Ticked in this order every frame
    #[serde(default)]
    pub features: Vec<FeatureSpec>,
    #[serde(default)]
    pub videos: Vec<VideoSpec>,
    #[serde(default)]
    pub bindings: Vec<TimelineBinding>,
}

impl PageConfig {
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(src)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let src = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&src)?;
        tracing::info!(
            path = %path.display(),
            features = config.features.len(),
            "loaded page config"
        );
        Ok(config)
    }

    /// The embedded page table
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_toml_str(BUILTIN_PAGE)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(reason) = self.scroll.invalid_reason() {
            return Err(ConfigError::InvalidScroll(reason));
        }
        let mut seen = hashbrown::HashSet::new();
        for feature in &self.features {
            if !seen.insert(feature.id.as_str()) {
                return Err(ConfigError::DuplicateFeature(feature.id.clone()));
            }
            feature.validate()?;
        }
        for video in &self.videos {
            video.validate()?;
        }
        for binding in &self.bindings {
            binding.validate()?;
        }
        Ok(())
    }

    pub fn feature(&self, id: &str) -> Option<&FeatureSpec> {
        self.features.iter().find(|f| f.id == id)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use scrollstage_shared::FeatureKind;

    use super::*;

    #[test]
    fn test_builtin_page_parses() {
        let page = PageConfig::builtin().unwrap();
        assert_eq!(page.scroll.pixels_per_second, 8000.0);
        assert_eq!(page.videos.len(), 4);
        assert!(page.videos.iter().all(|v| v.vimeo_id == "358401068"));

        let ids: Vec<_> = page.features.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(
            ids,
            [
                "scroll-hint",
                "plants",
                "bottle-glass",
                "bottle-label",
                "particles",
                "silhouette",
                "ipad-slides",
                "food-body"
            ]
        );
    }

    #[test]
    fn test_builtin_thresholds() {
        let page = PageConfig::builtin().unwrap();

        let FeatureKind::Threshold(bottle) = &page.feature("bottle-glass").unwrap().effect else {
            panic!("bottle-glass should be a threshold feature");
        };
        let threshold = bottle.entries[0].threshold;
        assert_eq!(threshold.enter, 0.29);
        assert_eq!(threshold.exit_bound(), 0.2873245662504144);

        let FeatureKind::Threshold(particles) = &page.feature("particles").unwrap().effect else {
            panic!("particles should be a threshold feature");
        };
        assert_eq!(particles.entries.len(), 4);
        assert_eq!(particles.parent.as_deref(), Some("particle_pla"));

        let FeatureKind::LiquidFill(food) = &page.feature("food-body").unwrap().effect else {
            panic!("food-body should be a liquid fill");
        };
        assert_eq!(food.fill.start, 0.6125082558553067);
        assert_eq!(food.fill.end, 0.673999559687717);
        assert_eq!(food.companions.len(), 4);
        assert_eq!(food.on_resolve.len(), 2);

        let plants = page.feature("plants").unwrap();
        let window = plants.window.unwrap();
        assert!(!window.contains(0.07112736879540721));
        assert!(window.contains(0.09483649172720961));
        let FeatureKind::Threshold(grass) = &plants.effect else {
            panic!("plants should be a threshold feature");
        };
        assert!(!grass.entries[0].threshold.enters(0.076));

        let particles = page.feature("particles").unwrap().window.unwrap();
        assert!(!particles.contains(0.2766177242629003));
        assert!(!particles.contains(0.534031058951040));
    }

    #[test]
    fn test_duplicate_feature_rejected() {
        let src = r#"
[[features]]
id = "a"
[features.effect]
kind = "visibility_window"
node = "n"
start = 0.1

[[features]]
id = "a"
[features.effect]
kind = "visibility_window"
node = "m"
start = 0.2
"#;
        assert!(matches!(
            PageConfig::from_toml_str(src),
            Err(ConfigError::DuplicateFeature(id)) if id == "a"
        ));
    }

    #[test]
    fn test_invalid_video_rejected() {
        let src = r#"
[[videos]]
id = "video1"
start = 0.2
end = 0.1
vimeo_id = "1"
"#;
        assert!(matches!(
            PageConfig::from_toml_str(src),
            Err(ConfigError::Table(TableError::InvalidVideo { .. }))
        ));
    }

    #[test]
    fn test_invalid_scroll_rejected() {
        let src = "[scroll]\nsmoothing = 2.0\n";
        assert!(matches!(
            PageConfig::from_toml_str(src),
            Err(ConfigError::InvalidScroll(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(BUILTIN_PAGE.as_bytes()).unwrap();
        let loaded = PageConfig::load(file.path()).unwrap();
        assert_eq!(loaded, PageConfig::builtin().unwrap());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = PageConfig::load(&dir.path().join("page.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}

//! `scrollstage check`

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use scrollstage_core::PageConfig;
use scrollstage_core::shared::FeatureKind;

/// A validated page and what it contains
#[derive(Debug)]
pub struct CheckSummary {
    pub page: PageConfig,
    pub source: String,
}

impl CheckSummary {
    fn kind_name(kind: &FeatureKind) -> &'static str {
        match kind {
            FeatureKind::Threshold(_) => "threshold",
            FeatureKind::VisibilityWindow(_) => "visibility_window",
            FeatureKind::LiquidFill(_) => "liquid_fill",
            FeatureKind::Slideshow(_) => "slideshow",
        }
    }
}

impl fmt::Display for CheckSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} is valid", self.source)?;
        for feature in &self.page.features {
            write!(
                f,
                "  {:<14} {:<18}",
                feature.id,
                Self::kind_name(&feature.effect)
            )?;
            if let Some(window) = feature.window {
                write!(f, " [{:.4}, {:.4}]", window.start, window.end)?;
            }
            writeln!(f)?;
        }
        write!(
            f,
            "  {} videos, {} timeline bindings",
            self.page.videos.len(),
            self.page.bindings.len()
        )
    }
}

/// Load and validate a page config, the built-in page when `path` is `None`
pub fn check(path: Option<&Path>) -> Result<CheckSummary> {
    let (page, source) = match path {
        Some(path) => {
            tracing::info!("Checking page config {:?}", path);
            let page = PageConfig::load(path)
                .with_context(|| format!("Failed to load page config {}", path.display()))?;
            (page, path.display().to_string())
        }
        None => (
            PageConfig::builtin().context("Built-in page config is invalid")?,
            "built-in page".to_string(),
        ),
    };
    Ok(CheckSummary { page, source })
}

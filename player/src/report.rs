//! JSON run report

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use scrollstage_core::{
    KeyframeTimeline, MemoryScene, MemoryTextures, OverlayEvent, ScrollRouter, Timeline, Viewport,
};

/// Final state of a replayed scroll path
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub frames: u64,
    pub progress: f64,
    pub target_position: f64,
    pub current_position: f64,
    pub timeline_position: f64,
    pub scroll_enabled: bool,
    pub viewport: Viewport,
    pub open_videos: Vec<String>,
    pub loaded_assets: Vec<String>,
    /// Visible node names per loaded asset
    pub visible: BTreeMap<String, Vec<String>>,
    pub texture_requests: usize,
    pub notices: Vec<String>,
    /// Every overlay call, in order
    pub events: Vec<OverlayEvent>,
}

impl RunReport {
    pub fn collect(
        router: &ScrollRouter,
        scene: &MemoryScene,
        timeline: &KeyframeTimeline,
        textures: &MemoryTextures,
        loaded_assets: Vec<String>,
        events: Vec<OverlayEvent>,
    ) -> Self {
        let visible = loaded_assets
            .iter()
            .map(|asset| (asset.clone(), scene.visible_names(asset)))
            .collect();
        let notices = events
            .iter()
            .filter_map(|e| match e {
                OverlayEvent::Notice { message } => Some(message.clone()),
                _ => None,
            })
            .collect();

        Self {
            frames: router.frame_count(),
            progress: router.progress(),
            target_position: router.target_position(),
            current_position: router.current_position(),
            timeline_position: timeline.position(),
            scroll_enabled: router.is_scroll_enabled(),
            viewport: router.viewport(),
            open_videos: router.open_videos().into_iter().map(String::from).collect(),
            loaded_assets,
            visible,
            texture_requests: textures.request_count(),
            notices,
            events,
        }
    }

    /// Pretty JSON to `path`, or stdout
    pub fn write(&self, path: Option<&Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize report")?;
        match path {
            Some(path) => {
                std::fs::write(path, json)
                    .with_context(|| format!("Failed to write report {}", path.display()))?;
                tracing::info!("Report written to {:?}", path);
            }
            None => println!("{json}"),
        }
        Ok(())
    }
}

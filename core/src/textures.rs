//! Image loading collaborator
//!
//! Loads are asynchronous on the host. A request is polled every tick until
//! it settles, so the caller can drop a load it no longer needs.

use hashbrown::HashMap;

use crate::scene::TextureId;

/// Progress of an asynchronous load
#[derive(Debug, Clone, PartialEq)]
pub enum AssetState<T> {
    Pending,
    Ready(T),
    Failed(String),
}

/// Texture loader
pub trait TextureSource {
    /// Start loading `path`, or poll a load already in flight
    fn request(&mut self, path: &str) -> AssetState<TextureId>;
}

#[derive(Debug)]
struct Load {
    remaining: u32,
    id: TextureId,
}

/// Loader that settles every request after a fixed number of polls
#[derive(Debug, Default)]
pub struct MemoryTextures {
    latency: u32,
    loads: HashMap<String, Load>,
    missing: Vec<String>,
    requests: usize,
}

impl MemoryTextures {
    /// `latency` polls return `Pending` before a load settles
    pub fn new(latency: u32) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    /// Make loads of `path` fail
    pub fn with_missing(mut self, path: impl Into<String>) -> Self {
        self.missing.push(path.into());
        self
    }

    /// Total number of `request` calls
    pub fn request_count(&self) -> usize {
        self.requests
    }

    /// Paths that were requested at least once
    pub fn requested_paths(&self) -> impl Iterator<Item = &str> {
        self.loads.keys().map(String::as_str)
    }
}

impl TextureSource for MemoryTextures {
    fn request(&mut self, path: &str) -> AssetState<TextureId> {
        self.requests += 1;
        if self.missing.iter().any(|m| m == path) {
            return AssetState::Failed(format!("{path}: not found"));
        }
        let next_id = TextureId(self.loads.len() as u32);
        let latency = self.latency;
        let load = self.loads.entry(path.to_string()).or_insert(Load {
            remaining: latency,
            id: next_id,
        });
        if load.remaining > 0 {
            load.remaining -= 1;
            return AssetState::Pending;
        }
        AssetState::Ready(load.id)
    }
}

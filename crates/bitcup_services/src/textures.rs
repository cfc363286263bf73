//! Texture lookup
//!
//! The chat client learns cheermote texture ids as donations arrive and
//! registers them here; the engine consults the cache when deciding whether
//! an override id is usable or the tier default should stand in.

use bitcup_core::{Denomination, TextureResolver};
use std::collections::HashSet;

/// Built-in per-tier texture name.
pub fn default_texture(denom: Denomination) -> &'static str {
    match denom {
        Denomination::Bit1 => "bit1",
        Denomination::Bit100 => "bit100",
        Denomination::Bit1000 => "bit1000",
        Denomination::Bit5000 => "bit5000",
        Denomination::Bit10000 => "bit10000",
    }
}

/// Set of override texture ids the presentation layer has loaded.
#[derive(Debug, Default)]
pub struct TextureCache {
    known: HashSet<String>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: impl Into<String>) {
        self.known.insert(id.into());
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}

impl TextureResolver for TextureCache {
    fn resolves(&self, id: &str) -> bool {
        self.known.contains(id)
    }
}

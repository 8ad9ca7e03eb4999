//! Font capability and the shared font cache.

use crate::error::Result;
use crate::renderer::Surface;
use farso_core::alloc::HashMap;
use farso_core::geometry::{Color, Rect};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Horizontal text alignment inside a text area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontAlignment {
    #[default]
    Left,
    Center,
    Right,
}

impl FontAlignment {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "left" => Some(Self::Left),
            "center" | "centre" => Some(Self::Center),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

/// A loaded font. Rasterization belongs to the backend.
pub trait Font: Send + Sync {
    fn name(&self) -> &str;
    fn text_width(&self, text: &str, size: u32) -> i32;
    fn line_height(&self, size: u32) -> i32;
    /// Writes `text` into `area` of `surface`.
    fn blit(
        &self,
        surface: &mut dyn Surface,
        area: Rect,
        text: &str,
        size: u32,
        color: Color,
        align: FontAlignment,
    );
}

/// Font cache keyed by file path.
///
/// Guarded by its own lock so text metrics can be queried without taking
/// the controller lock.
pub struct FontManager {
    fonts: RwLock<HashMap<PathBuf, Arc<dyn Font>>>,
    default_font: RwLock<Option<PathBuf>>,
}

impl FontManager {
    pub fn new() -> Self {
        Self {
            fonts: RwLock::new(HashMap::new()),
            default_font: RwLock::new(None),
        }
    }

    /// Returns the cached font for `path`, loading it with `load` on a miss.
    ///
    /// A failing loader leaves the cache untouched.
    pub fn get_or_load<F>(&self, path: &Path, load: F) -> Result<Arc<dyn Font>>
    where
        F: FnOnce(&Path) -> Result<Arc<dyn Font>>,
    {
        if let Some(font) = self.fonts.read().get(path) {
            return Ok(Arc::clone(font));
        }
        let font = load(path)?;
        tracing::debug!("Loaded font {}", path.display());
        self.fonts
            .write()
            .insert(path.to_path_buf(), Arc::clone(&font));
        Ok(font)
    }

    pub fn get(&self, path: &Path) -> Option<Arc<dyn Font>> {
        self.fonts.read().get(path).cloned()
    }

    pub fn insert(&self, path: impl Into<PathBuf>, font: Arc<dyn Font>) {
        self.fonts.write().insert(path.into(), font);
    }

    pub fn set_default_font(&self, path: Option<PathBuf>) {
        *self.default_font.write() = path;
    }

    pub fn default_font(&self) -> Option<Arc<dyn Font>> {
        let path = self.default_font.read().clone()?;
        self.get(&path)
    }

    pub fn len(&self) -> usize {
        self.fonts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.read().is_empty()
    }

    /// Drops every cached font and the default font selection.
    pub fn clear(&self) {
        self.fonts.write().clear();
        *self.default_font.write() = None;
    }
}

impl Default for FontManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    struct FixedFont;

    impl Font for FixedFont {
        fn name(&self) -> &str {
            "fixed"
        }

        fn text_width(&self, text: &str, size: u32) -> i32 {
            text.chars().count() as i32 * size as i32 / 2
        }

        fn line_height(&self, size: u32) -> i32 {
            size as i32
        }

        fn blit(&self, _: &mut dyn Surface, _: Rect, _: &str, _: u32, _: Color, _: FontAlignment) {}
    }

    #[test]
    fn test_get_or_load_caches() {
        let fonts = FontManager::new();
        let mut loads = 0;
        for _ in 0..3 {
            fonts
                .get_or_load(Path::new("fixed.ttf"), |_| {
                    loads += 1;
                    Ok(Arc::new(FixedFont) as Arc<dyn Font>)
                })
                .unwrap();
        }
        assert_eq!(loads, 1);
        assert_eq!(fonts.len(), 1);
    }

    #[test]
    fn test_failed_load_is_refused() {
        let fonts = FontManager::new();
        let result = fonts.get_or_load(Path::new("missing.ttf"), |path| {
            Err(Error::FontLoad {
                path: path.to_path_buf(),
                reason: "not found".into(),
            })
        });
        assert!(result.is_err());
        assert!(fonts.is_empty());
    }

    #[test]
    fn test_default_font() {
        let fonts = FontManager::new();
        fonts.insert("fixed.ttf", Arc::new(FixedFont));
        assert!(fonts.default_font().is_none());
        fonts.set_default_font(Some("fixed.ttf".into()));
        assert_eq!(fonts.default_font().unwrap().name(), "fixed");
        fonts.clear();
        assert!(fonts.default_font().is_none());
    }
}

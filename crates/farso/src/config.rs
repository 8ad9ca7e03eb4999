use std::path::PathBuf;

/// Font size of the cursor tip when the skin has no `cursor_tip` element.
pub const DEFAULT_TIP_FONT_SIZE: u32 = 10;
/// Space between the tip text and its frame.
pub const DEFAULT_TIP_PADDING: i32 = 2;

/// Settings applied by `Controller::init`.
///
/// Every resource here is optional; a failing one is logged and skipped.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub skin: Option<PathBuf>,
    pub default_font: Option<PathBuf>,
    pub cursor_image: Option<PathBuf>,
    pub cursor_tip_font_size: u32,
    pub cursor_tip_padding: i32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        ControllerConfig {
            skin: None,
            default_font: None,
            cursor_image: None,
            cursor_tip_font_size: DEFAULT_TIP_FONT_SIZE,
            cursor_tip_padding: DEFAULT_TIP_PADDING,
        }
    }
}

impl ControllerConfig {
    pub fn with_skin(mut self, path: impl Into<PathBuf>) -> Self {
        self.skin = Some(path.into());
        self
    }

    pub fn with_default_font(mut self, path: impl Into<PathBuf>) -> Self {
        self.default_font = Some(path.into());
        self
    }

    pub fn with_cursor_image(mut self, path: impl Into<PathBuf>) -> Self {
        self.cursor_image = Some(path.into());
        self
    }

    pub fn with_cursor_tip_font_size(mut self, size: u32) -> Self {
        self.cursor_tip_font_size = size;
        self
    }

    pub fn with_cursor_tip_padding(mut self, padding: i32) -> Self {
        self.cursor_tip_padding = padding;
        self
    }
}

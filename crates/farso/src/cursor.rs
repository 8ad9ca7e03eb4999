//! Mouse cursor image and its textual tip.
//!
//! Both live on renderers created through the junction, outside the render
//! queue, and are painted after every widget renderer.

use crate::config::ControllerConfig;
use crate::error::Result;
use crate::font::{Font, FontAlignment};
use crate::render_queue::{CURSOR_SUB_GROUP, CURSOR_TIP_SUB_GROUP};
use crate::renderer::{ControllerRendererJunction, Draw, Renderer, WidgetRenderer};
use crate::skin::{Skin, SkinElementType};
use farso_core::geometry::{Color, Point, Rect, Size};
use std::path::Path;
use std::sync::Arc;

/// Size of the cursor renderer before an image is set.
pub const DEFAULT_CURSOR_SIZE: i32 = 16;

const TIP_BACKGROUND: Color = Color::rgba(255, 255, 225, 230);
const TIP_BORDER: Color = Color::rgb(64, 64, 64);
const TIP_TEXT: Color = Color::BLACK;

/// Where the tip goes for a pointer at `pointer`: below and right of the
/// cursor, flipped to the other side of the pointer when it would overflow,
/// and always inside `screen`.
pub fn tip_position(pointer: Point, cursor: Size, tip: Size, screen: Size) -> Point {
    let mut x = pointer.x + cursor.width;
    if x + tip.width > screen.width {
        x = pointer.x - tip.width;
    }
    let mut y = pointer.y + cursor.height;
    if y + tip.height > screen.height {
        y = pointer.y - tip.height;
    }
    Point::new(
        x.min(screen.width - tip.width).max(0),
        y.min(screen.height - tip.height).max(0),
    )
}

struct CursorTip {
    text: String,
    renderer: Box<dyn WidgetRenderer>,
}

pub struct Cursor {
    renderer: Box<dyn WidgetRenderer>,
    has_image: bool,
    tip: Option<CursorTip>,
    visible: bool,
    position: Point,
    tip_font_size: u32,
    tip_padding: i32,
}

impl Cursor {
    pub(crate) fn new(junction: &mut dyn ControllerRendererJunction, config: &ControllerConfig) -> Self {
        let mut renderer = junction.create_floating_renderer(DEFAULT_CURSOR_SIZE, DEFAULT_CURSOR_SIZE);
        renderer.set_render_queue_sub_group(CURSOR_SUB_GROUP);
        renderer.hide();
        Self {
            renderer,
            has_image: false,
            tip: None,
            visible: true,
            position: Point::default(),
            tip_font_size: config.cursor_tip_font_size,
            tip_padding: config.cursor_tip_padding,
        }
    }

    /// Replaces the cursor image with the one at `path`.
    pub fn set_image(
        &mut self,
        path: &Path,
        renderer: &mut dyn Renderer,
        junction: &mut dyn ControllerRendererJunction,
    ) -> Result<()> {
        let image = renderer.load_image_to_surface(path)?;
        let mut target = junction.create_floating_renderer(image.width(), image.height());
        {
            let surface = target.surface_mut();
            let dest = surface.rect();
            surface.lock();
            renderer.draw().blit(image.as_ref(), image.rect(), surface, dest);
            surface.unlock();
        }
        target.set_render_queue_sub_group(CURSOR_SUB_GROUP);
        target.set_position(self.position.x, self.position.y);
        target.upload_surface();
        if self.visible {
            target.show();
        } else {
            target.hide();
        }
        self.renderer = target;
        self.has_image = true;
        tracing::info!("Cursor image set to {}", path.display());
        Ok(())
    }

    pub fn has_image(&self) -> bool {
        self.has_image
    }

    /// Shows `text` next to the cursor, or removes the tip for `None`.
    ///
    /// Without a font the tip is skipped.
    pub(crate) fn set_tip(
        &mut self,
        text: Option<&str>,
        font: Option<Arc<dyn Font>>,
        skin: Option<&Skin>,
        draw: &mut dyn Draw,
        junction: &mut dyn ControllerRendererJunction,
        screen: Size,
    ) {
        let Some(text) = text.filter(|t| !t.is_empty()) else {
            self.tip = None;
            return;
        };
        if self.tip.as_ref().is_some_and(|tip| tip.text == text) {
            return;
        }
        let Some(font) = font else {
            tracing::warn!("No font for the cursor tip, tip skipped");
            self.tip = None;
            return;
        };

        let element = skin.and_then(|s| s.element(SkinElementType::CursorTip));
        let size = match (skin, element) {
            (Some(skin), Some(_)) => skin.font_size_for(SkinElementType::CursorTip),
            _ => self.tip_font_size,
        };
        let pad = self.tip_padding;
        let width = font.text_width(text, size) + 2 * pad;
        let height = font.line_height(size) + 2 * pad;

        let mut renderer = junction.create_floating_renderer(width, height);
        {
            let surface = renderer.surface_mut();
            let area = Rect::from_size(0, 0, width, height);
            surface.lock();
            let skinned = match skin {
                Some(skin) => skin.draw_element(&mut *draw, &mut *surface, SkinElementType::CursorTip, area),
                None => false,
            };
            if !skinned {
                draw.set_color(TIP_BACKGROUND);
                draw.fill_rectangle(surface, area);
                draw.set_color(TIP_BORDER);
                draw.draw_rectangle(surface, area);
            }
            let color = element.and_then(|e| e.font_color).unwrap_or(TIP_TEXT);
            let align = element.map_or(FontAlignment::Left, |e| e.font_align);
            font.blit(surface, area.inset(pad, pad, pad, pad), text, size, color, align);
            surface.unlock();
        }
        renderer.set_render_queue_sub_group(CURSOR_TIP_SUB_GROUP);
        renderer.upload_surface();
        if self.visible {
            renderer.show();
        } else {
            renderer.hide();
        }
        self.tip = Some(CursorTip {
            text: text.to_owned(),
            renderer,
        });
        self.place(screen);
    }

    pub fn tip(&self) -> Option<&str> {
        self.tip.as_ref().map(|tip| tip.text.as_str())
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        let renderers = std::iter::once(&mut self.renderer).chain(self.tip.as_mut().map(|t| &mut t.renderer));
        for (idx, renderer) in renderers.enumerate() {
            // The cursor image renderer stays hidden until an image is set.
            if visible && (idx > 0 || self.has_image) {
                renderer.show();
            } else {
                renderer.hide();
            }
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn renderer(&self) -> &dyn WidgetRenderer {
        self.renderer.as_ref()
    }

    pub fn tip_renderer(&self) -> Option<&dyn WidgetRenderer> {
        self.tip.as_ref().map(|tip| tip.renderer.as_ref())
    }

    fn place(&mut self, screen: Size) {
        self.renderer.set_position(self.position.x, self.position.y);
        let cursor = self.renderer.size();
        if let Some(tip) = &mut self.tip {
            let at = tip_position(self.position, cursor, tip.renderer.size(), screen);
            tip.renderer.set_position(at.x, at.y);
        }
    }

    pub(crate) fn update(&mut self, pointer: Point, screen: Size) {
        self.position = pointer;
        self.place(screen);
    }

    /// Paints the cursor, then its tip.
    pub(crate) fn render(&mut self) {
        if self.renderer.is_visible() {
            self.renderer.render(CURSOR_SUB_GROUP);
        }
        if let Some(tip) = &mut self.tip
            && tip.renderer.is_visible()
        {
            tip.renderer.render(CURSOR_TIP_SUB_GROUP);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: Size = Size::new(800, 600);
    const CURSOR: Size = Size::new(16, 16);

    #[test]
    fn test_tip_below_right_of_cursor() {
        let at = tip_position(Point::new(100, 100), CURSOR, Size::new(50, 20), SCREEN);
        assert_eq!(at, Point::new(116, 116));
    }

    #[test]
    fn test_tip_flips_near_screen_edges() {
        let at = tip_position(Point::new(790, 590), CURSOR, Size::new(50, 20), SCREEN);
        assert_eq!(at, Point::new(740, 570));
    }

    #[test]
    fn test_tip_clamped_inside_screen() {
        // Wider than the space on either side of the pointer.
        let at = tip_position(Point::new(10, 5), CURSOR, Size::new(795, 20), SCREEN);
        assert_eq!(at, Point::new(0, 21));
        let at = tip_position(Point::new(0, 0), CURSOR, Size::new(900, 700), SCREEN);
        assert_eq!(at, Point::new(0, 0));
    }
}

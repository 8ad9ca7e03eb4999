//! Backend contracts.
//!
//! A backend (immediate-mode quads, SDL textures, a 3D engine overlay, or the
//! recording mock in `farso-test-utils`) implements these traits; the
//! controller never touches pixels itself.

use crate::error::Result;
use crate::font::Font;
use farso_core::geometry::{Color, Point, Rect, Size};
use std::any::Any;
use std::path::Path;
use std::sync::Arc;

/// CPU side pixel buffer. Must be locked while drawn into.
pub trait Surface: Any + Send {
    fn width(&self) -> i32;
    fn height(&self) -> i32;
    fn lock(&mut self);
    fn unlock(&mut self);
    fn is_locked(&self) -> bool;

    fn as_any(&self) -> &dyn Any;

    fn rect(&self) -> Rect {
        Rect::from_size(0, 0, self.width(), self.height())
    }
}

/// Primitive drawing operations on surfaces.
pub trait Draw: Send {
    fn set_color(&mut self, color: Color);
    fn draw_rectangle(&mut self, surface: &mut dyn Surface, rect: Rect);
    fn fill_rectangle(&mut self, surface: &mut dyn Surface, rect: Rect);
    fn draw_line(&mut self, surface: &mut dyn Surface, from: Point, to: Point);
    /// Resets `rect` to fully transparent pixels.
    fn clear(&mut self, surface: &mut dyn Surface, rect: Rect);
    /// Copies `src` of `source` into `dest` of `target`, stretching as needed.
    fn blit(&mut self, source: &dyn Surface, src: Rect, target: &mut dyn Surface, dest: Rect);
}

/// A surface placed on screen: backs one root or floating widget (or the
/// cursor and its tip).
pub trait WidgetRenderer: Send {
    fn surface(&self) -> &dyn Surface;
    fn surface_mut(&mut self) -> &mut dyn Surface;

    fn set_position(&mut self, x: i32, y: i32);
    fn position(&self) -> Point;

    fn show(&mut self);
    fn hide(&mut self);
    fn is_visible(&self) -> bool;

    /// Pushes the CPU side pixels to the backend.
    fn upload_surface(&mut self);

    /// Paints the surface; only called on backends that need manual
    /// composition. `depth` is the render queue sub-group.
    fn render(&mut self, depth: u8);

    fn set_render_queue_sub_group(&mut self, group: u8);
    fn render_queue_sub_group(&self) -> u8;

    fn size(&self) -> Size {
        let surface = self.surface();
        Size::new(surface.width(), surface.height())
    }

    /// Screen rectangle covered by this renderer.
    fn screen_rect(&self) -> Rect {
        let pos = self.position();
        let size = self.size();
        Rect::from_size(pos.x, pos.y, size.width, size.height)
    }
}

/// Backend glue for renderers living outside the widget tree.
pub trait ControllerRendererJunction: Send {
    fn create_floating_renderer(&mut self, width: i32, height: i32) -> Box<dyn WidgetRenderer>;
}

/// The backend itself.
pub trait Renderer: Send {
    fn create_widget_renderer(&mut self, width: i32, height: i32) -> Box<dyn WidgetRenderer>;
    fn create_junction(&mut self) -> Box<dyn ControllerRendererJunction>;

    /// Saves the host render state and switches to 2D overlay drawing.
    fn enter_2d_mode(&mut self);
    /// Restores whatever [`Renderer::enter_2d_mode`] saved.
    fn restore_3d_mode(&mut self);

    /// True for immediate-mode backends that must be told what to paint;
    /// false when the host scene graph composites renderers on its own.
    fn should_manual_render(&self) -> bool;

    fn load_image_to_surface(&mut self, path: &Path) -> Result<Box<dyn Surface>>;
    fn load_font(&mut self, path: &Path) -> Result<Arc<dyn Font>>;

    fn draw(&mut self) -> &mut dyn Draw;

    fn screen_size(&self) -> Size;
}

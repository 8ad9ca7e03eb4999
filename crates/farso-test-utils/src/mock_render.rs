//! Recording mock of the backend traits.
//!
//! Nothing is rasterized. Surfaces only know their size and lock state,
//! drawing operations and renderer calls are appended to a [`CallLog`].

use farso::error::{Error, Result};
use farso::font::{Font, FontAlignment};
use farso::renderer::{ControllerRendererJunction, Draw, Renderer, Surface, WidgetRenderer};
use farso_core::alloc::HashMap;
use farso_core::geometry::{Color, Point, Rect, Size};
use parking_lot::Mutex;
use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Size of images loaded from disk without a registered size.
pub const DEFAULT_IMAGE_SIZE: Size = Size::new(64, 64);

/// Records a backend call for verification in tests.
///
/// `renderer` fields are mock renderer serials, in creation order.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    CreateRenderer {
        renderer: usize,
        width: i32,
        height: i32,
        floating: bool,
    },
    DropRenderer {
        renderer: usize,
    },
    SetPosition {
        renderer: usize,
        x: i32,
        y: i32,
    },
    Show {
        renderer: usize,
    },
    Hide {
        renderer: usize,
    },
    SetSubGroup {
        renderer: usize,
        group: u8,
    },
    Upload {
        renderer: usize,
    },
    Render {
        renderer: usize,
        depth: u8,
    },

    Enter2d,
    Restore3d,
    LoadImage {
        path: PathBuf,
    },
    LoadFont {
        path: PathBuf,
    },

    FillRectangle {
        rect: Rect,
        color: Color,
    },
    DrawRectangle {
        rect: Rect,
        color: Color,
    },
    DrawLine {
        from: Point,
        to: Point,
    },
    Clear {
        rect: Rect,
    },
    Blit {
        src: Rect,
        dest: Rect,
    },
    Text {
        text: String,
        area: Rect,
    },
}

impl RenderCall {
    /// Whether the call draws into a surface.
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            RenderCall::FillRectangle { .. }
                | RenderCall::DrawRectangle { .. }
                | RenderCall::DrawLine { .. }
                | RenderCall::Clear { .. }
                | RenderCall::Blit { .. }
                | RenderCall::Text { .. }
        )
    }
}

/// Shared, cloneable call log.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<RenderCall>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, call: RenderCall) {
        self.calls.lock().push(call);
    }

    /// Get a copy of all recorded calls (for test assertions).
    pub fn calls(&self) -> Vec<RenderCall> {
        self.calls.lock().clone()
    }

    /// Count calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&RenderCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|call| pred(call)).count()
    }

    /// Count drawing operations of any kind.
    pub fn count_draws(&self) -> usize {
        self.count(RenderCall::is_draw)
    }

    pub fn count_uploads(&self) -> usize {
        self.count(|call| matches!(call, RenderCall::Upload { .. }))
    }

    /// Serials of the renderers painted, in paint order.
    pub fn rendered(&self) -> Vec<(usize, u8)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                RenderCall::Render { renderer, depth } => Some((*renderer, *depth)),
                _ => None,
            })
            .collect()
    }

    /// Serials of the renderers dropped so far.
    pub fn dropped(&self) -> Vec<usize> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                RenderCall::DropRenderer { renderer } => Some(*renderer),
                _ => None,
            })
            .collect()
    }

    /// Serials of the renderers created and not dropped yet.
    pub fn live_renderers(&self) -> Vec<usize> {
        let calls = self.calls.lock();
        let mut live = Vec::new();
        for call in calls.iter() {
            match call {
                RenderCall::CreateRenderer { renderer, .. } => live.push(*renderer),
                RenderCall::DropRenderer { renderer } => live.retain(|r| r != renderer),
                _ => {}
            }
        }
        live
    }

    /// Last position set on renderer `serial`.
    pub fn last_position(&self, serial: usize) -> Option<Point> {
        self.calls.lock().iter().rev().find_map(|call| match call {
            RenderCall::SetPosition { renderer, x, y } if *renderer == serial => {
                Some(Point::new(*x, *y))
            }
            _ => None,
        })
    }

    /// Clear recorded calls (useful between test steps).
    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    /// Get total number of recorded calls.
    pub fn len(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.lock().is_empty()
    }
}

/// A surface that only tracks its size and lock state.
#[derive(Debug)]
pub struct MockSurface {
    width: i32,
    height: i32,
    locked: bool,
}

impl MockSurface {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            locked: false,
        }
    }
}

impl Surface for MockSurface {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn lock(&mut self) {
        self.locked = true;
    }

    fn unlock(&mut self) {
        self.locked = false;
    }

    fn is_locked(&self) -> bool {
        self.locked
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Mock drawing primitives.
///
/// Panics when asked to draw into an unlocked surface.
#[derive(Debug)]
pub struct MockDraw {
    log: CallLog,
    color: Color,
}

impl MockDraw {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            color: Color::WHITE,
        }
    }

    fn check(surface: &dyn Surface) {
        assert!(surface.is_locked(), "drawing into an unlocked surface");
    }
}

impl Draw for MockDraw {
    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn draw_rectangle(&mut self, surface: &mut dyn Surface, rect: Rect) {
        Self::check(surface);
        self.log.push(RenderCall::DrawRectangle {
            rect,
            color: self.color,
        });
    }

    fn fill_rectangle(&mut self, surface: &mut dyn Surface, rect: Rect) {
        Self::check(surface);
        self.log.push(RenderCall::FillRectangle {
            rect,
            color: self.color,
        });
    }

    fn draw_line(&mut self, surface: &mut dyn Surface, from: Point, to: Point) {
        Self::check(surface);
        self.log.push(RenderCall::DrawLine { from, to });
    }

    fn clear(&mut self, surface: &mut dyn Surface, rect: Rect) {
        Self::check(surface);
        self.log.push(RenderCall::Clear { rect });
    }

    fn blit(&mut self, _source: &dyn Surface, src: Rect, target: &mut dyn Surface, dest: Rect) {
        Self::check(target);
        self.log.push(RenderCall::Blit { src, dest });
    }
}

/// A placed surface that records what it is asked to do.
pub struct MockWidgetRenderer {
    serial: usize,
    log: CallLog,
    surface: MockSurface,
    position: Point,
    visible: bool,
    sub_group: u8,
}

impl MockWidgetRenderer {
    fn new(serial: usize, log: CallLog, width: i32, height: i32, floating: bool) -> Self {
        log.push(RenderCall::CreateRenderer {
            renderer: serial,
            width,
            height,
            floating,
        });
        Self {
            serial,
            log,
            surface: MockSurface::new(width, height),
            position: Point::default(),
            visible: true,
            sub_group: 0,
        }
    }

    pub fn serial(&self) -> usize {
        self.serial
    }
}

impl WidgetRenderer for MockWidgetRenderer {
    fn surface(&self) -> &dyn Surface {
        &self.surface
    }

    fn surface_mut(&mut self) -> &mut dyn Surface {
        &mut self.surface
    }

    fn set_position(&mut self, x: i32, y: i32) {
        self.position = Point::new(x, y);
        self.log.push(RenderCall::SetPosition {
            renderer: self.serial,
            x,
            y,
        });
    }

    fn position(&self) -> Point {
        self.position
    }

    fn show(&mut self) {
        self.visible = true;
        self.log.push(RenderCall::Show {
            renderer: self.serial,
        });
    }

    fn hide(&mut self) {
        self.visible = false;
        self.log.push(RenderCall::Hide {
            renderer: self.serial,
        });
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn upload_surface(&mut self) {
        self.log.push(RenderCall::Upload {
            renderer: self.serial,
        });
    }

    fn render(&mut self, depth: u8) {
        self.log.push(RenderCall::Render {
            renderer: self.serial,
            depth,
        });
    }

    fn set_render_queue_sub_group(&mut self, group: u8) {
        self.sub_group = group;
        self.log.push(RenderCall::SetSubGroup {
            renderer: self.serial,
            group,
        });
    }

    fn render_queue_sub_group(&self) -> u8 {
        self.sub_group
    }
}

impl Drop for MockWidgetRenderer {
    fn drop(&mut self) {
        self.log.push(RenderCall::DropRenderer {
            renderer: self.serial,
        });
    }
}

/// Monospace font: every character is half the size wide.
#[derive(Debug)]
pub struct MockFont {
    name: String,
    log: CallLog,
}

impl MockFont {
    pub fn new(name: impl Into<String>, log: CallLog) -> Self {
        Self {
            name: name.into(),
            log,
        }
    }
}

impl Font for MockFont {
    fn name(&self) -> &str {
        &self.name
    }

    fn text_width(&self, text: &str, size: u32) -> i32 {
        (text.chars().count() as u32 * size / 2) as i32
    }

    fn line_height(&self, size: u32) -> i32 {
        size as i32
    }

    fn blit(
        &self,
        surface: &mut dyn Surface,
        area: Rect,
        text: &str,
        _size: u32,
        _color: Color,
        _align: FontAlignment,
    ) {
        assert!(surface.is_locked(), "writing text into an unlocked surface");
        self.log.push(RenderCall::Text {
            text: text.to_owned(),
            area,
        });
    }
}

/// Floating renderer factory sharing the log and serials of its backend.
pub struct MockJunction {
    log: CallLog,
    serials: Arc<AtomicUsize>,
}

impl ControllerRendererJunction for MockJunction {
    fn create_floating_renderer(&mut self, width: i32, height: i32) -> Box<dyn WidgetRenderer> {
        let serial = self.serials.fetch_add(1, Ordering::Relaxed);
        Box::new(MockWidgetRenderer::new(
            serial,
            self.log.clone(),
            width,
            height,
            true,
        ))
    }
}

/// Mock backend.
///
/// Images and fonts load when registered with [`MockRenderer::with_image`]
/// or [`MockRenderer::with_font`], or when the file exists on disk. Other
/// paths fail like a real backend would.
pub struct MockRenderer {
    log: CallLog,
    serials: Arc<AtomicUsize>,
    draw: MockDraw,
    manual_render: bool,
    screen: Size,
    images: HashMap<PathBuf, Size>,
    fonts: Vec<PathBuf>,
}

impl MockRenderer {
    pub fn new() -> Self {
        let log = CallLog::new();
        Self {
            draw: MockDraw::new(log.clone()),
            log,
            serials: Arc::new(AtomicUsize::new(0)),
            manual_render: true,
            screen: Size::new(800, 600),
            images: HashMap::new(),
            fonts: Vec::new(),
        }
    }

    /// Handle on the call log, valid after the backend moved away.
    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    /// Backends composited by a host scene graph are never asked to render.
    pub fn with_manual_render(mut self, manual: bool) -> Self {
        self.manual_render = manual;
        self
    }

    pub fn with_screen_size(mut self, width: i32, height: i32) -> Self {
        self.screen = Size::new(width, height);
        self
    }

    pub fn with_image(mut self, path: impl Into<PathBuf>, width: i32, height: i32) -> Self {
        self.images.insert(path.into(), Size::new(width, height));
        self
    }

    pub fn with_font(mut self, path: impl Into<PathBuf>) -> Self {
        self.fonts.push(path.into());
        self
    }
}

impl Default for MockRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for MockRenderer {
    fn create_widget_renderer(&mut self, width: i32, height: i32) -> Box<dyn WidgetRenderer> {
        let serial = self.serials.fetch_add(1, Ordering::Relaxed);
        Box::new(MockWidgetRenderer::new(
            serial,
            self.log.clone(),
            width,
            height,
            false,
        ))
    }

    fn create_junction(&mut self) -> Box<dyn ControllerRendererJunction> {
        Box::new(MockJunction {
            log: self.log.clone(),
            serials: Arc::clone(&self.serials),
        })
    }

    fn enter_2d_mode(&mut self) {
        self.log.push(RenderCall::Enter2d);
    }

    fn restore_3d_mode(&mut self) {
        self.log.push(RenderCall::Restore3d);
    }

    fn should_manual_render(&self) -> bool {
        self.manual_render
    }

    fn load_image_to_surface(&mut self, path: &Path) -> Result<Box<dyn Surface>> {
        self.log.push(RenderCall::LoadImage {
            path: path.to_path_buf(),
        });
        let size = match self.images.get(path) {
            Some(size) => *size,
            None if path.is_file() => DEFAULT_IMAGE_SIZE,
            None => {
                return Err(Error::ImageLoad {
                    path: path.to_path_buf(),
                    reason: "no such image".into(),
                });
            }
        };
        Ok(Box::new(MockSurface::new(size.width, size.height)))
    }

    fn load_font(&mut self, path: &Path) -> Result<Arc<dyn Font>> {
        self.log.push(RenderCall::LoadFont {
            path: path.to_path_buf(),
        });
        if !self.fonts.iter().any(|f| f == path) && !path.is_file() {
            return Err(Error::FontLoad {
                path: path.to_path_buf(),
                reason: "no such font".into(),
            });
        }
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Arc::new(MockFont::new(name, self.log.clone())))
    }

    fn draw(&mut self) -> &mut dyn Draw {
        &mut self.draw
    }

    fn screen_size(&self) -> Size {
        self.screen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renderer_serials_are_shared_with_junction() {
        let mut backend = MockRenderer::new();
        let log = backend.log();
        let mut junction = backend.create_junction();

        let a = backend.create_widget_renderer(10, 10);
        let b = junction.create_floating_renderer(5, 5);
        drop(a);

        assert_eq!(log.live_renderers(), vec![1]);
        assert_eq!(log.dropped(), vec![0]);
        drop(b);
        assert!(log.live_renderers().is_empty());
    }

    #[test]
    fn test_missing_resources_fail() {
        let mut backend = MockRenderer::new().with_image("atlas.png", 32, 16);
        let image = backend.load_image_to_surface(Path::new("atlas.png")).unwrap();
        assert_eq!((image.width(), image.height()), (32, 16));
        assert!(backend.load_image_to_surface(Path::new("missing.png")).is_err());
        assert!(backend.load_font(Path::new("missing.ttf")).is_err());
    }

    #[test]
    #[should_panic(expected = "unlocked surface")]
    fn test_drawing_requires_lock() {
        let mut backend = MockRenderer::new();
        let mut surface = MockSurface::new(4, 4);
        backend.draw().fill_rectangle(&mut surface, Rect::new(0, 0, 3, 3));
    }

    #[test]
    fn test_clear_calls() {
        let mut backend = MockRenderer::new();
        let log = backend.log();
        backend.enter_2d_mode();
        assert_eq!(log.len(), 1);
        log.clear();
        assert!(log.is_empty());
    }
}

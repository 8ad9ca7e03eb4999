//! What a behaviour sees while it is called back.
//!
//! Both contexts borrow state the controller already holds locked, so a
//! behaviour can raise events, change focus or queue removals without ever
//! taking the controller lock itself.

use crate::event::{Event, EventType};
use crate::font::{Font, FontAlignment, FontManager};
use crate::renderer::{Draw, Surface};
use crate::skin::{DEFAULT_FONT_SIZE, Skin, SkinElementType};
use crate::stage::Stage;
use crate::tree::{NodeId, WidgetTree};
use crate::widget::WidgetBase;
use farso_core::geometry::{Color, Point, Rect};
use std::sync::Arc;

/// Input-time access to the controller on behalf of one widget.
pub struct TreatContext<'a> {
    node: NodeId,
    stage: &'a mut Stage,
    skin: Option<&'a Skin>,
}

impl<'a> TreatContext<'a> {
    pub(crate) fn new(node: NodeId, stage: &'a mut Stage, skin: Option<&'a Skin>) -> Self {
        Self { node, stage, skin }
    }

    /// The widget being treated.
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn base(&self) -> &WidgetBase {
        self.stage.tree.base(self.node)
    }

    pub fn base_of(&self, id: NodeId) -> Option<&WidgetBase> {
        self.stage.tree.get_base(id)
    }

    pub fn tree(&self) -> &WidgetTree {
        &self.stage.tree
    }

    pub fn skin(&self) -> Option<&'a Skin> {
        self.skin
    }

    /// Hit-test rectangle in the space of the `local` point handed to
    /// `treat`.
    pub fn bounds(&self) -> Rect {
        self.stage.tree.bounds_in_parent(self.node, self.skin)
    }

    pub fn bounds_of(&self, id: NodeId) -> Rect {
        self.stage.tree.bounds_in_parent(id, self.skin)
    }

    /// Stored position; the screen position for root widgets.
    pub fn position(&self) -> Point {
        let base = self.base();
        Point::new(base.x, base.y)
    }

    pub fn is_active(&self) -> bool {
        self.base().is_active()
    }

    pub fn set_event(&mut self, kind: EventType) {
        self.stage.set_event(self.node, kind);
    }

    pub fn last_event(&self) -> Event {
        self.stage.last_event
    }

    pub fn active_widget(&self) -> Option<NodeId> {
        self.stage.active
    }

    /// Makes this widget the active one.
    pub fn activate(&mut self) {
        self.stage.set_active_widget(Some(self.node));
    }

    pub fn set_dirty(&mut self) {
        self.stage.tree.set_dirty(self.node);
    }

    pub fn set_dirty_with_parent(&mut self) {
        self.stage.tree.set_dirty_with_parent(self.node);
    }

    /// Queues this widget for removal at the top of the next pass.
    pub fn mark_to_remove(&mut self) {
        self.stage.mark_to_remove(self.node);
    }

    pub fn move_to(&mut self, x: i32, y: i32) {
        self.stage.set_position(self.node, x, y);
    }

    /// Moves one of this widget's descendants.
    pub fn set_position_of(&mut self, id: NodeId, x: i32, y: i32) {
        if self.stage.tree.is_ancestor(self.node, id) {
            self.stage.set_position(id, x, y);
        }
    }

    /// Shows or hides one of this widget's descendants.
    pub fn set_visible_of(&mut self, id: NodeId, visible: bool) {
        if self.stage.tree.is_ancestor(self.node, id) {
            self.stage.set_visible(id, visible);
        }
    }

    /// Enters or leaves keyboard text-edit mode with this widget as editor.
    pub fn set_text_editor(&mut self, editing: bool) {
        if editing {
            self.stage.text_editor = Some(self.node);
        } else if self.stage.text_editor == Some(self.node) {
            self.stage.text_editor = None;
        }
    }
}

/// Draw-time access for one widget: its surface, primitives, skin and fonts.
pub struct DrawContext<'a> {
    base: &'a WidgetBase,
    surface: &'a mut dyn Surface,
    draw: &'a mut dyn Draw,
    skin: Option<&'a Skin>,
    fonts: &'a FontManager,
    parent_body: Rect,
    bounds: Rect,
}

impl<'a> DrawContext<'a> {
    pub(crate) fn new(
        base: &'a WidgetBase,
        surface: &'a mut dyn Surface,
        draw: &'a mut dyn Draw,
        skin: Option<&'a Skin>,
        fonts: &'a FontManager,
        parent_body: Rect,
        bounds: Rect,
    ) -> Self {
        Self {
            base,
            surface,
            draw,
            skin,
            fonts,
            parent_body,
            bounds,
        }
    }

    pub fn base(&self) -> &'a WidgetBase {
        self.base
    }

    /// The widget's rectangle in surface coordinates.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// The parent's body in surface coordinates.
    pub fn parent_body(&self) -> Rect {
        self.parent_body
    }

    pub fn skin(&self) -> Option<&'a Skin> {
        self.skin
    }

    pub fn fonts(&self) -> &FontManager {
        self.fonts
    }

    pub fn surface(&mut self) -> &mut dyn Surface {
        &mut *self.surface
    }

    pub fn primitives(&mut self) -> &mut dyn Draw {
        &mut *self.draw
    }

    /// Paints a skin element over `rect`. False without a skin or element.
    pub fn draw_skin_element(&mut self, kind: SkinElementType, rect: Rect) -> bool {
        match self.skin {
            Some(skin) => skin.draw_element(&mut *self.draw, &mut *self.surface, kind, rect),
            None => false,
        }
    }

    pub fn fill(&mut self, rect: Rect, color: Color) {
        self.draw.set_color(color);
        self.draw.fill_rectangle(&mut *self.surface, rect);
    }

    pub fn outline(&mut self, rect: Rect, color: Color) {
        self.draw.set_color(color);
        self.draw.draw_rectangle(&mut *self.surface, rect);
    }

    pub fn line(&mut self, from: Point, to: Point, color: Color) {
        self.draw.set_color(color);
        self.draw.draw_line(&mut *self.surface, from, to);
    }

    pub fn clear(&mut self, rect: Rect) {
        self.draw.clear(&mut *self.surface, rect);
    }

    fn font_for(&self, kind: SkinElementType) -> Option<Arc<dyn Font>> {
        self.skin
            .and_then(|skin| skin.font_for(kind))
            .and_then(|path| self.fonts.get(path))
            .or_else(|| self.fonts.default_font())
    }

    /// Writes `text` with the font settings of `kind` inside `rect`.
    ///
    /// Returns false when no font is available.
    pub fn write_text(&mut self, kind: SkinElementType, rect: Rect, text: &str) -> bool {
        if text.is_empty() {
            return true;
        }
        let Some(font) = self.font_for(kind) else {
            return false;
        };
        let element = self.skin.and_then(|skin| skin.element(kind));
        let size = self
            .skin
            .map_or(DEFAULT_FONT_SIZE, |skin| skin.font_size_for(kind));
        let color = element.and_then(|e| e.font_color).unwrap_or(Color::WHITE);
        let align = element.map_or(FontAlignment::Left, |e| e.font_align);
        let area = element.map_or(rect, |e| {
            e.text_area(rect.width(), rect.height())
                .translate(rect.x1, rect.y1)
        });
        font.blit(&mut *self.surface, area, text, size, color, align);
        true
    }
}

use super::{Button, fallback};
use crate::context::{DrawContext, TreatContext};
use crate::controller::ControllerState;
use crate::event::EventType;
use crate::skin::{Skin, SkinElementType};
use crate::tree::NodeId;
use crate::widget::{PointerInput, Widget, WidgetDesc, WidgetKind};
use farso_core::geometry::{Point, Rect};
use std::any::Any;

/// Frame thickness without a skin.
pub const WINDOW_BORDER: i32 = 1;
/// Title bar height without a skin.
pub const TITLE_BAR_HEIGHT: i32 = 20;
pub const CLOSE_BUTTON_SIZE: i32 = 12;
const CLOSE_BUTTON_MARGIN: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interaction {
    Idle,
    /// Pressed inside while inactive; the release decides.
    PendingActivate,
    /// Following the pointer; `offset` is the press point relative to the
    /// window position.
    Dragging { offset: Point },
}

/// A top level window with a title bar and a close button.
///
/// Created closed (hidden). [`Window::open`] shows it and makes it the
/// active widget.
#[derive(Debug)]
pub struct Window {
    open: bool,
    interaction: Interaction,
    movable: bool,
    closable: bool,
    close_button: Option<NodeId>,
}

impl Default for Window {
    fn default() -> Self {
        Self {
            open: false,
            interaction: Interaction::Idle,
            movable: true,
            closable: true,
            close_button: None,
        }
    }
}

impl Window {
    pub fn create(
        ui: &mut ControllerState,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        caption: &str,
    ) -> NodeId {
        let desc = WidgetDesc::new(x, y, width, height).caption(caption);
        let id = ui.add_widget(None, desc, Box::new(Window::default()));
        ui.set_visible(id, false);

        let button = Button::create(
            ui,
            Some(id),
            WidgetDesc::new(0, 0, CLOSE_BUTTON_SIZE, CLOSE_BUTTON_SIZE),
        );
        if let Some(window) = ui.widget_mut::<Window>(id) {
            window.close_button = Some(button);
        }
        ui.arrange(id);
        id
    }

    /// Shows the window and makes it the active widget.
    pub fn open(ui: &mut ControllerState, id: NodeId) {
        let Some(window) = ui.widget_mut::<Window>(id) else {
            return;
        };
        window.open = true;
        window.interaction = Interaction::Idle;
        ui.set_visible(id, true);
        ui.set_active_widget(Some(id));
        tracing::debug!("Opened window {id:?}");
    }

    /// Queues the window for removal, without raising an event.
    pub fn close(ui: &mut ControllerState, id: NodeId) {
        if ui.widget::<Window>(id).is_some() {
            ui.mark_to_remove_widget(id);
        }
    }

    pub fn set_movable(ui: &mut ControllerState, id: NodeId, movable: bool) {
        if let Some(window) = ui.widget_mut::<Window>(id) {
            window.movable = movable;
            if !movable && matches!(window.interaction, Interaction::Dragging { .. }) {
                window.interaction = Interaction::Idle;
            }
        }
    }

    /// A window that cannot be closed hides its close button.
    pub fn set_closable(ui: &mut ControllerState, id: NodeId, closable: bool) {
        if let Some(window) = ui.widget_mut::<Window>(id) {
            window.closable = closable;
            ui.arrange(id);
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_movable(&self) -> bool {
        self.movable
    }

    pub fn is_closable(&self) -> bool {
        self.closable
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.interaction, Interaction::Dragging { .. })
    }

    pub fn close_button(&self) -> Option<NodeId> {
        self.close_button
    }

    /// Strip between the window top and the body top, as wide as the body.
    pub fn title_bar(&self, bounds: Rect, skin: Option<&Skin>) -> Rect {
        let body = self.body(bounds, skin);
        Rect::new(body.x1, bounds.y1, body.x2, body.y1 - 1)
    }

    /// Close button area in the window's own bounds space.
    fn close_button_area(&self, ctx: &TreatContext<'_>, bounds: Rect) -> Option<Rect> {
        let button = self.close_button?;
        if !ctx.base_of(button)?.is_visible() {
            return None;
        }
        let body = self.body(bounds, ctx.skin());
        Some(ctx.bounds_of(button).translate(body.x1, body.y1))
    }
}

impl Widget for Window {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Window
    }

    fn draw(&mut self, ctx: &mut DrawContext<'_>) {
        let bounds = ctx.bounds();
        let base = ctx.base();
        let title = self.title_bar(bounds, ctx.skin());

        if !ctx.draw_skin_element(SkinElementType::Window, bounds) {
            ctx.fill(bounds, fallback::WINDOW_BACKGROUND);
            ctx.outline(bounds, fallback::WINDOW_FRAME);
        }
        let (element, color) = if base.is_active() {
            (SkinElementType::WindowTitleBar, fallback::TITLE_ACTIVE)
        } else {
            (SkinElementType::WindowTitleBarInactive, fallback::TITLE_INACTIVE)
        };
        if !ctx.draw_skin_element(element, title) {
            ctx.fill(title, color);
        }
        ctx.write_text(element, title, base.caption());
    }

    fn treat(&mut self, ctx: &mut TreatContext<'_>, input: &PointerInput, local: Point) -> bool {
        let bounds = ctx.bounds();
        let inside = bounds.contains_point(local);

        match self.interaction {
            Interaction::Dragging { offset } => {
                if input.left {
                    ctx.move_to(input.x - offset.x, input.y - offset.y);
                    ctx.set_event(EventType::WindowMoving);
                } else {
                    self.interaction = Interaction::Idle;
                    ctx.set_event(EventType::WindowMoveEnd);
                }
                true
            }
            Interaction::PendingActivate => {
                if input.left {
                    return false;
                }
                self.interaction = Interaction::Idle;
                if !inside {
                    return false;
                }
                ctx.activate();
                ctx.set_event(EventType::WindowActivated);
                true
            }
            Interaction::Idle => {
                if !input.just_pressed || !inside {
                    return false;
                }
                if !ctx.is_active() {
                    self.interaction = Interaction::PendingActivate;
                    ctx.set_event(EventType::WindowClicked);
                    return true;
                }
                let on_title = self.title_bar(bounds, ctx.skin()).contains_point(local);
                let on_close = self
                    .close_button_area(ctx, bounds)
                    .is_some_and(|area| area.contains_point(local));
                if !self.movable || !on_title || on_close {
                    return false;
                }
                let position = ctx.position();
                self.interaction = Interaction::Dragging {
                    offset: Point::new(input.x - position.x, input.y - position.y),
                };
                ctx.set_event(EventType::WindowMoveInit);
                true
            }
        }
    }

    fn after_child_treat(&mut self, ctx: &mut TreatContext<'_>) {
        if let Some(button) = self.close_button
            && ctx.last_event().is(button, EventType::ButtonRelease)
        {
            ctx.set_event(EventType::WindowWillClose);
            ctx.mark_to_remove();
        }
    }

    fn arrange(&mut self, ctx: &mut TreatContext<'_>) {
        let Some(button) = self.close_button else {
            return;
        };
        let Some(size) = ctx.base_of(button).map(|b| b.size()) else {
            self.close_button = None;
            return;
        };
        let bounds = ctx.bounds();
        let body = self.body(bounds, ctx.skin());
        let title_height = body.y1 - bounds.y1;
        let x = body.width() - size.width - CLOSE_BUTTON_MARGIN;
        let y = -title_height + (title_height - size.height) / 2;
        ctx.set_position_of(button, x, y);
        ctx.set_visible_of(button, self.closable);
    }

    fn body(&self, bounds: Rect, skin: Option<&Skin>) -> Rect {
        match skin.and_then(|s| s.element(SkinElementType::Window)) {
            Some(element) => element
                .body(bounds.width(), bounds.height())
                .translate(bounds.x1, bounds.y1),
            None => bounds.inset(
                WINDOW_BORDER,
                WINDOW_BORDER + TITLE_BAR_HEIGHT,
                WINDOW_BORDER,
                WINDOW_BORDER,
            ),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unskinned_geometry() {
        let window = Window::default();
        let bounds = Rect::from_size(0, 0, 300, 200);
        assert_eq!(window.body(bounds, None), Rect::new(1, 21, 298, 198));
        assert_eq!(window.title_bar(bounds, None), Rect::new(1, 0, 298, 20));
    }

    #[test]
    fn test_new_window_is_closed_and_idle() {
        let window = Window::default();
        assert!(!window.is_open());
        assert!(!window.is_dragging());
        assert!(window.is_movable() && window.is_closable());
    }
}

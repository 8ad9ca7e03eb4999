use super::fallback;
use crate::context::{DrawContext, TreatContext};
use crate::controller::ControllerState;
use crate::event::EventType;
use crate::skin::SkinElementType;
use crate::tree::NodeId;
use crate::widget::{PointerInput, Widget, WidgetDesc, WidgetKind};
use farso_core::geometry::Point;
use std::any::Any;

/// A push button.
///
/// Emits `ButtonPress` on the first pressed frame inside it, `ButtonOnPress`
/// while the press is held inside, and `ButtonRelease` when released inside.
/// Releasing outside cancels silently.
#[derive(Debug, Default)]
pub struct Button {
    pressed: bool,
    hovered: bool,
}

impl Button {
    pub fn create(ui: &mut ControllerState, parent: Option<NodeId>, desc: WidgetDesc) -> NodeId {
        ui.add_widget(parent, desc, Box::new(Button::default()))
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    fn element(&self, available: bool) -> SkinElementType {
        if !available {
            SkinElementType::ButtonDisabled
        } else if self.pressed {
            SkinElementType::ButtonPressed
        } else if self.hovered {
            SkinElementType::ButtonOver
        } else {
            SkinElementType::ButtonEnabled
        }
    }
}

impl Widget for Button {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Button
    }

    fn draw(&mut self, ctx: &mut DrawContext<'_>) {
        let bounds = ctx.bounds();
        let base = ctx.base();
        let mut element = self.element(base.is_available());
        // Skins often leave out the hover look.
        if element == SkinElementType::ButtonOver
            && ctx.skin().and_then(|s| s.element(element)).is_none()
        {
            element = SkinElementType::ButtonEnabled;
        }
        if !ctx.draw_skin_element(element, bounds) {
            let face = match element {
                SkinElementType::ButtonDisabled => fallback::BUTTON_DISABLED,
                SkinElementType::ButtonPressed => fallback::BUTTON_PRESSED,
                SkinElementType::ButtonOver => fallback::BUTTON_OVER,
                _ => fallback::BUTTON_FACE,
            };
            ctx.fill(bounds, face);
            ctx.outline(bounds, fallback::FRAME);
        }
        ctx.write_text(element, bounds, base.caption());
    }

    fn treat(&mut self, ctx: &mut TreatContext<'_>, input: &PointerInput, local: Point) -> bool {
        let inside = ctx.bounds().contains_point(local);
        if inside != self.hovered {
            self.hovered = inside;
            ctx.set_dirty();
        }

        if input.left {
            if !inside {
                return false;
            }
            if self.pressed {
                ctx.set_event(EventType::ButtonOnPress);
            } else {
                self.pressed = true;
                ctx.set_dirty();
                ctx.set_event(EventType::ButtonPress);
            }
            return true;
        }

        if !self.pressed {
            return false;
        }
        self.pressed = false;
        ctx.set_dirty();
        if inside {
            ctx.set_event(EventType::ButtonRelease);
        }
        inside
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

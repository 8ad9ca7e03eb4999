use super::fallback;
use crate::context::{DrawContext, TreatContext};
use crate::controller::ControllerState;
use crate::event::EventType;
use crate::skin::SkinElementType;
use crate::tree::NodeId;
use crate::widget::{PointerInput, Widget, WidgetDesc, WidgetKind};
use farso_core::geometry::{Point, Rect};
use std::any::Any;

/// Side of the check box square.
pub const CHECKBOX_SIZE: i32 = 12;

/// Two-state toggle. A press made inside is only recorded; the release
/// inside toggles.
#[derive(Debug, Default)]
pub struct CheckBox {
    checked: bool,
    pressed: bool,
}

impl CheckBox {
    /// Creates a check box at `(x, y)` with the default size.
    pub fn create(ui: &mut ControllerState, parent: Option<NodeId>, x: i32, y: i32) -> NodeId {
        let desc = WidgetDesc::new(x, y, CHECKBOX_SIZE, CHECKBOX_SIZE);
        ui.add_widget(parent, desc, Box::new(CheckBox::default()))
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    pub fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
    }
}

impl Widget for CheckBox {
    fn kind(&self) -> WidgetKind {
        WidgetKind::CheckBox
    }

    fn draw(&mut self, ctx: &mut DrawContext<'_>) {
        let bounds = ctx.bounds();
        let element = if !ctx.base().is_available() {
            SkinElementType::CheckBoxDisabled
        } else if self.checked {
            SkinElementType::CheckBoxChecked
        } else {
            SkinElementType::CheckBoxUnchecked
        };
        if ctx.draw_skin_element(element, bounds) {
            return;
        }
        // Redrawn in place, so the mark of a previous state must go.
        ctx.fill(bounds, fallback::BUTTON_FACE);
        ctx.outline(bounds, fallback::FRAME);
        if self.checked {
            let mark = Rect::new(bounds.x1 + 3, bounds.y1 + 3, bounds.x2 - 3, bounds.y2 - 3);
            ctx.fill(mark, fallback::CHECK_MARK);
        }
    }

    fn treat(&mut self, ctx: &mut TreatContext<'_>, input: &PointerInput, local: Point) -> bool {
        let inside = ctx.bounds().contains_point(local);
        if input.left {
            if input.just_pressed && inside {
                self.pressed = true;
            }
            return false;
        }
        if !std::mem::take(&mut self.pressed) || !inside {
            return false;
        }
        self.checked = !self.checked;
        ctx.set_dirty();
        ctx.set_event(if self.checked {
            EventType::CheckBoxChecked
        } else {
            EventType::CheckBoxUnchecked
        });
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

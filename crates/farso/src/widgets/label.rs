use crate::context::DrawContext;
use crate::controller::ControllerState;
use crate::skin::SkinElementType;
use crate::tree::NodeId;
use crate::widget::{Widget, WidgetDesc, WidgetKind};
use std::any::Any;

/// Static text: the widget caption.
#[derive(Debug, Default)]
pub struct Label;

impl Label {
    pub fn create(ui: &mut ControllerState, parent: Option<NodeId>, desc: WidgetDesc) -> NodeId {
        ui.add_widget(parent, desc, Box::new(Label))
    }
}

impl Widget for Label {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Label
    }

    fn draw(&mut self, ctx: &mut DrawContext<'_>) {
        let bounds = ctx.bounds();
        let base = ctx.base();
        let caption = base.caption();
        // Only a label with its own surface has nothing below to repaint it.
        if !ctx.draw_skin_element(SkinElementType::Label, bounds) && base.owns_renderer() {
            ctx.clear(bounds);
        }
        if !ctx.write_text(SkinElementType::Label, bounds, caption) {
            tracing::trace!("No font for label '{caption}'");
        }
    }

    fn redraws_background(&self) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

use crate::context::DrawContext;
use crate::controller::ControllerState;
use crate::skin::{Skin, SkinElementType};
use crate::tree::NodeId;
use crate::widget::{ContainerPlacement, Widget, WidgetDesc, WidgetKind};
use farso_core::geometry::Rect;
use std::any::Any;

/// Groups children and anchors them inside its body.
#[derive(Debug, Default)]
pub struct Container {
    placement: ContainerPlacement,
}

impl Container {
    pub fn new(placement: ContainerPlacement) -> Self {
        Self { placement }
    }

    pub fn create(
        ui: &mut ControllerState,
        parent: Option<NodeId>,
        desc: WidgetDesc,
        placement: ContainerPlacement,
    ) -> NodeId {
        ui.add_widget(parent, desc, Box::new(Container::new(placement)))
    }

    pub fn placement(&self) -> ContainerPlacement {
        self.placement
    }
}

impl Widget for Container {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Container
    }

    fn draw(&mut self, ctx: &mut DrawContext<'_>) {
        let bounds = ctx.bounds();
        ctx.draw_skin_element(SkinElementType::Container, bounds);
    }

    fn body(&self, bounds: Rect, skin: Option<&Skin>) -> Rect {
        match skin.and_then(|s| s.element(SkinElementType::Container)) {
            Some(element) => element
                .body(bounds.width(), bounds.height())
                .translate(bounds.x1, bounds.y1),
            None => bounds,
        }
    }

    fn redraws_background(&self) -> bool {
        false
    }

    fn child_placement(&self) -> Option<ContainerPlacement> {
        Some(self.placement)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

//! The per-widget contract.
//!
//! A widget is a [`WidgetBase`] (geometry, flags, relationships; owned by the
//! tree) plus a boxed [`Widget`] behaviour. The tree and the controller run
//! the composite operations (recursive draw, dispatch, dirty queries); a
//! behaviour only implements the four per-kind operations.

mod base;

pub use base::{WidgetBase, WidgetDesc, WidgetFlags};

use crate::context::{DrawContext, TreatContext};
use crate::skin::Skin;
use farso_core::geometry::{Point, Rect};
use std::any::Any;

/// Widget type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    Window,
    Button,
    CheckBox,
    Label,
    Container,
    TextEntry,
    Menu,
    Grid,
    Picture,
    /// Kinds defined outside this crate.
    Custom(u16),
}

/// How a container places its children inside its body.
///
/// Children keep their stored `(x, y)`; the placement reinterprets them as
/// offsets from the anchored edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContainerPlacement {
    #[default]
    TopLeft,
    TopRight,
    TopCentered,
    BottomLeft,
    BottomRight,
    BottomCentered,
    CenteredLeft,
    CenteredRight,
    Centered,
}

impl ContainerPlacement {
    fn horizontal(&self) -> Anchor {
        match self {
            Self::TopLeft | Self::BottomLeft | Self::CenteredLeft => Anchor::Start,
            Self::TopRight | Self::BottomRight | Self::CenteredRight => Anchor::End,
            Self::TopCentered | Self::BottomCentered | Self::Centered => Anchor::Center,
        }
    }

    fn vertical(&self) -> Anchor {
        match self {
            Self::TopLeft | Self::TopRight | Self::TopCentered => Anchor::Start,
            Self::BottomLeft | Self::BottomRight | Self::BottomCentered => Anchor::End,
            Self::CenteredLeft | Self::CenteredRight | Self::Centered => Anchor::Center,
        }
    }

    /// Resolves a child's x inside a body `available` pixels wide.
    pub fn resolve_x(&self, x: i32, width: i32, available: i32) -> i32 {
        self.horizontal().resolve(x, width, available)
    }

    /// Resolves a child's y inside a body `available` pixels high.
    pub fn resolve_y(&self, y: i32, height: i32, available: i32) -> i32 {
        self.vertical().resolve(y, height, available)
    }
}

#[derive(Clone, Copy)]
enum Anchor {
    Start,
    Center,
    End,
}

impl Anchor {
    fn resolve(self, offset: i32, extent: i32, available: i32) -> i32 {
        match self {
            Anchor::Start => offset,
            Anchor::Center => (available - extent) / 2 + offset,
            Anchor::End => available - extent - offset,
        }
    }
}

/// Raw pointer sample for one frame, in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerInput {
    pub left: bool,
    pub right: bool,
    /// Left went down this frame. Held frames after it are not presses.
    pub just_pressed: bool,
    pub x: i32,
    pub y: i32,
}

impl PointerInput {
    /// A sample without history: a held left button counts as just pressed.
    pub fn new(left: bool, right: bool, x: i32, y: i32) -> Self {
        Self {
            left,
            right,
            just_pressed: left,
            x,
            y,
        }
    }

    /// Derives the press edge from the left state of the previous frame.
    pub fn after(mut self, previous_left: bool) -> Self {
        self.just_pressed = self.left && !previous_left;
        self
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Behaviour of one widget kind.
pub trait Widget: Any + Send {
    fn kind(&self) -> WidgetKind;

    /// Draws this widget's own visuals into its renderer surface.
    ///
    /// Children are drawn afterwards by the tree.
    fn draw(&mut self, ctx: &mut DrawContext<'_>);

    /// Consumes input addressed to this widget itself.
    ///
    /// `local` is the pointer in the parent's body space (the own surface
    /// for root and floating widgets), the space of
    /// [`TreatContext::bounds`]. Returns true iff an event was registered.
    fn treat(&mut self, _ctx: &mut TreatContext<'_>, _input: &PointerInput, _local: Point) -> bool {
        false
    }

    /// Runs after children were dispatched (or none claimed anything).
    fn after_child_treat(&mut self, _ctx: &mut TreatContext<'_>) {}

    /// Re-places owned children after a resize or a skin change.
    fn arrange(&mut self, _ctx: &mut TreatContext<'_>) {}

    /// Content rectangle, in the same space as `bounds`.
    fn body(&self, bounds: Rect, _skin: Option<&Skin>) -> Rect {
        bounds
    }

    /// Whether `draw` covers the widget's whole area. Widgets that only
    /// paint over what is below make the owner repaint under them.
    fn redraws_background(&self) -> bool {
        true
    }

    /// Text editors keep receiving input while keyboard text entry is active.
    fn is_text_editor(&self) -> bool {
        false
    }

    /// Containers return how they place their children.
    fn child_placement(&self) -> Option<ContainerPlacement> {
        None
    }

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

use super::{ContainerPlacement, WidgetKind};
use crate::render_queue::RendererId;
use crate::tree::NodeId;
use bitflags::bitflags;
use farso_core::geometry::{Rect, Size};

bitflags! {
    /// State flags of a widget.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WidgetFlags: u8 {
        /// Participates in draw and hit-testing.
        const VISIBLE   = 1 << 0;
        /// Accepts input.
        const AVAILABLE = 1 << 1;
        /// Must be redrawn before the next composite.
        const DIRTY     = 1 << 2;
        /// Window activation. Only the controller sets this.
        const ACTIVE    = 1 << 3;
        /// Owns its renderer despite having a parent; geometry is in screen
        /// space, like a root.
        const FLOATING  = 1 << 4;
    }
}

impl Default for WidgetFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::AVAILABLE | Self::DIRTY
    }
}

/// Geometry and identity of a widget to create.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetDesc {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub caption: String,
    pub floating: bool,
}

impl WidgetDesc {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            ..Default::default()
        }
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }

    /// Gives the widget its own renderer even when it has a parent.
    pub fn floating(mut self) -> Self {
        self.floating = true;
        self
    }
}

/// Shared state of every widget, owned by the tree.
#[derive(Debug, Clone)]
pub struct WidgetBase {
    pub(crate) kind: WidgetKind,
    pub(crate) id: Option<String>,
    pub(crate) caption: String,
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) width: i32,
    pub(crate) height: i32,
    pub(crate) flags: WidgetFlags,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    /// Nearest ancestor defining a child placement. Recomputed on re-parent.
    pub(crate) container: Option<NodeId>,
    pub(crate) placement: Option<ContainerPlacement>,
    pub(crate) renderer: Option<RendererId>,
}

impl WidgetBase {
    pub(crate) fn new(kind: WidgetKind, desc: WidgetDesc) -> Self {
        let mut flags = WidgetFlags::default();
        flags.set(WidgetFlags::FLOATING, desc.floating);
        Self {
            kind,
            id: None,
            caption: desc.caption,
            x: desc.x,
            y: desc.y,
            width: desc.width,
            height: desc.height,
            flags,
            parent: None,
            children: Vec::new(),
            container: None,
            placement: None,
            renderer: None,
        }
    }

    pub fn kind(&self) -> WidgetKind {
        self.kind
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    /// Stored x, before any container placement.
    pub fn x(&self) -> i32 {
        self.x
    }

    /// Stored y, before any container placement.
    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// The widget's rectangle in its own surface, for root and floating
    /// widgets.
    pub fn local_rect(&self) -> Rect {
        Rect::from_size(0, 0, self.width, self.height)
    }

    pub fn flags(&self) -> WidgetFlags {
        self.flags
    }

    pub fn is_visible(&self) -> bool {
        self.flags.contains(WidgetFlags::VISIBLE)
    }

    pub fn is_available(&self) -> bool {
        self.flags.contains(WidgetFlags::AVAILABLE)
    }

    /// Own dirty flag only; see `WidgetTree::is_dirty` for the subtree.
    pub fn is_self_dirty(&self) -> bool {
        self.flags.contains(WidgetFlags::DIRTY)
    }

    pub fn is_active(&self) -> bool {
        self.flags.contains(WidgetFlags::ACTIVE)
    }

    pub fn is_floating(&self) -> bool {
        self.flags.contains(WidgetFlags::FLOATING)
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// True for widgets drawing into a renderer of their own.
    pub fn owns_renderer(&self) -> bool {
        self.parent.is_none() || self.is_floating()
    }

    pub fn renderer(&self) -> Option<RendererId> {
        self.renderer
    }

    pub fn container(&self) -> Option<NodeId> {
        self.container
    }
}

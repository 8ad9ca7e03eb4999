//! Widget ownership tree.
//!
//! Nodes live in a generational arena; a parent exclusively owns its
//! children, so removing a node removes its whole subtree. Coordinate
//! transforms and the recursive draw live here, input dispatch lives in the
//! stage because behaviours may call back into the controller while treated.

use crate::context::DrawContext;
use crate::error::{Error, Result};
use crate::font::FontManager;
use crate::render_queue::{RenderQueue, RendererId};
use crate::renderer::Draw;
use crate::skin::Skin;
use crate::widget::{Widget, WidgetBase, WidgetFlags};
use farso_core::alloc::{IndexSlot, SparseSet};
use farso_core::geometry::{Rect, Size};
use farso_core::profiling::profile_function;

/// Handle to a widget. Stale handles never alias a newer widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(IndexSlot);

pub(crate) struct Node {
    pub(crate) base: WidgetBase,
    /// `None` only while the behaviour is being called back.
    pub(crate) behavior: Option<Box<dyn Widget>>,
}

/// Everything a draw pass needs besides the tree.
pub(crate) struct DrawResources<'a> {
    pub(crate) queue: &'a mut RenderQueue,
    pub(crate) draw: &'a mut dyn Draw,
    pub(crate) skin: Option<&'a Skin>,
    pub(crate) fonts: &'a FontManager,
}

#[derive(Default)]
pub struct WidgetTree {
    nodes: SparseSet<Node>,
}

impl WidgetTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(id.0)
    }

    /// Every live node, in arena order.
    pub fn ids(&self) -> Vec<NodeId> {
        self.nodes.slots().into_iter().map(NodeId).collect()
    }

    pub(crate) fn insert(&mut self, mut base: WidgetBase, behavior: Box<dyn Widget>) -> NodeId {
        base.placement = behavior.child_placement();
        NodeId(self.nodes.push(Node {
            base,
            behavior: Some(behavior),
        }))
    }

    pub fn get_base(&self, id: NodeId) -> Option<&WidgetBase> {
        self.nodes.get(id.0).map(|node| &node.base)
    }

    pub(crate) fn get_base_mut(&mut self, id: NodeId) -> Option<&mut WidgetBase> {
        self.nodes.get_mut(id.0).map(|node| &mut node.base)
    }

    /// Fails with [`Error::UnknownWidget`] on a destroyed handle.
    pub fn try_base(&self, id: NodeId) -> Result<&WidgetBase> {
        self.get_base(id).ok_or(Error::UnknownWidget(id))
    }

    /// Panics on a destroyed handle.
    pub fn base(&self, id: NodeId) -> &WidgetBase {
        match self.try_base(id) {
            Ok(base) => base,
            Err(err) => panic!("{err}"),
        }
    }

    pub(crate) fn base_mut(&mut self, id: NodeId) -> &mut WidgetBase {
        match self.get_base_mut(id) {
            Some(base) => base,
            None => panic!("widget {id:?} was destroyed"),
        }
    }

    pub fn behavior(&self, id: NodeId) -> Option<&dyn Widget> {
        self.nodes.get(id.0).and_then(|node| node.behavior.as_deref())
    }

    pub(crate) fn behavior_mut(&mut self, id: NodeId) -> Option<&mut (dyn Widget + 'static)> {
        self.nodes
            .get_mut(id.0)
            .and_then(|node| node.behavior.as_deref_mut())
    }

    pub(crate) fn take_behavior(&mut self, id: NodeId) -> Option<Box<dyn Widget>> {
        self.nodes.get_mut(id.0).and_then(|node| node.behavior.take())
    }

    /// Puts back a behaviour taken with `take_behavior`. Dropped if the node
    /// vanished meanwhile.
    pub(crate) fn restore_behavior(&mut self, id: NodeId, behavior: Box<dyn Widget>) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.behavior = Some(behavior);
        }
    }

    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.get_base(node).and_then(|b| b.parent);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.get_base(id).and_then(|b| b.parent);
        }
        false
    }

    pub(crate) fn attach(&mut self, parent: NodeId, child: NodeId) {
        assert!(
            child != parent && !self.is_ancestor(child, parent),
            "cannot attach widget {child:?} inside its own subtree"
        );
        self.base_mut(parent).children.push(child);
        self.base_mut(child).parent = Some(parent);
        self.refresh_containers(child);
    }

    pub(crate) fn detach(&mut self, child: NodeId) {
        let Some(parent) = self.base_mut(child).parent.take() else {
            return;
        };
        if let Some(base) = self.get_base_mut(parent) {
            base.children.retain(|c| *c != child);
        }
        self.refresh_containers(child);
    }

    fn nearest_container(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.get_base(id)?.parent;
        while let Some(ancestor) = current {
            let base = self.get_base(ancestor)?;
            if base.placement.is_some() {
                return Some(ancestor);
            }
            current = base.parent;
        }
        None
    }

    fn refresh_containers(&mut self, id: NodeId) {
        for node in self.subtree(id) {
            let container = self.nearest_container(node);
            self.base_mut(node).container = container;
        }
    }

    /// `id` and all its descendants, parents before children.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            let Some(base) = self.get_base(node) else {
                continue;
            };
            out.push(node);
            stack.extend(base.children.iter().rev().copied());
        }
        out
    }

    /// Unlinks and destroys `id` with its descendants, handing back their
    /// bases so the caller can release renderers and references.
    pub(crate) fn remove_subtree(&mut self, id: NodeId) -> Vec<(NodeId, WidgetBase)> {
        profile_function!();
        if !self.contains(id) {
            return Vec::new();
        }
        self.detach(id);
        self.subtree(id)
            .into_iter()
            .filter_map(|node| self.nodes.remove(node.0).map(|n| (node, n.base)))
            .collect()
    }

    /// Own flag or any descendant's.
    pub fn is_dirty(&self, id: NodeId) -> bool {
        let Some(base) = self.get_base(id) else {
            return false;
        };
        base.is_self_dirty() || base.children.iter().any(|child| self.is_dirty(*child))
    }

    pub fn set_dirty(&mut self, id: NodeId) {
        if let Some(base) = self.get_base_mut(id) {
            base.flags.insert(WidgetFlags::DIRTY);
        }
    }

    /// Dirties `id` and its parent, whose area under `id` must be repainted.
    pub fn set_dirty_with_parent(&mut self, id: NodeId) {
        let parent = self.get_base(id).and_then(|b| b.parent);
        self.set_dirty(id);
        if let Some(parent) = parent {
            self.set_dirty_for_repaint(parent);
        }
    }

    /// Dirties `id`. A widget that paints no background of its own also
    /// dirties its ancestors in the same surface, up to the first one that
    /// does.
    pub fn set_dirty_for_repaint(&mut self, id: NodeId) {
        self.set_dirty(id);
        let mut current = id;
        while !self.redraws_background(current)
            && let Some(parent) = self
                .get_base(current)
                .filter(|b| !b.owns_renderer())
                .and_then(|b| b.parent)
        {
            self.set_dirty(parent);
            current = parent;
        }
    }

    /// A behaviour that is taken out for dispatch counts as opaque.
    fn redraws_background(&self, id: NodeId) -> bool {
        self.behavior(id).is_none_or(|b| b.redraws_background())
    }

    pub fn mark_all_dirty(&mut self) {
        for id in self.ids() {
            self.set_dirty(id);
        }
    }

    fn clear_dirty_subtree(&mut self, id: NodeId) {
        for node in self.subtree(id) {
            self.base_mut(node).flags.remove(WidgetFlags::DIRTY);
        }
    }

    pub fn root_of(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.get_base(current).and_then(|b| b.parent) {
            current = parent;
        }
        current
    }

    /// Nearest node, `id` included, drawing into a renderer of its own.
    pub fn owner_of(&self, id: NodeId) -> NodeId {
        let mut current = id;
        loop {
            let base = self.base(current);
            match base.parent {
                Some(parent) if !base.is_floating() => current = parent,
                _ => return current,
            }
        }
    }

    pub fn container_of(&self, id: NodeId) -> Option<NodeId> {
        self.get_base(id).and_then(|b| b.container)
    }

    pub fn renderer_of(&self, id: NodeId) -> Option<RendererId> {
        self.get_base(self.owner_of(id)).and_then(|b| b.renderer)
    }

    fn body_of(&self, id: NodeId, bounds: Rect, skin: Option<&Skin>) -> Rect {
        self.behavior(id).map_or(bounds, |b| b.body(bounds, skin))
    }

    /// Size of the body of `id`, which does not depend on where it sits.
    pub fn body_size(&self, id: NodeId, skin: Option<&Skin>) -> Size {
        let base = self.base(id);
        self.body_of(id, Rect::from_size(0, 0, base.width, base.height), skin)
            .size()
    }

    fn placement_of(&self, id: NodeId) -> Option<(NodeId, crate::widget::ContainerPlacement)> {
        let container = self.get_base(id)?.container?;
        Some((container, self.get_base(container)?.placement?))
    }

    /// X relative to the parent body, after the container placement.
    pub fn x(&self, id: NodeId, skin: Option<&Skin>) -> i32 {
        let base = self.base(id);
        if base.owns_renderer() {
            return base.x;
        }
        match self.placement_of(id) {
            Some((container, placement)) => {
                placement.resolve_x(base.x, base.width, self.body_size(container, skin).width)
            }
            None => base.x,
        }
    }

    /// Y relative to the parent body, after the container placement.
    pub fn y(&self, id: NodeId, skin: Option<&Skin>) -> i32 {
        let base = self.base(id);
        if base.owns_renderer() {
            return base.y;
        }
        match self.placement_of(id) {
            Some((container, placement)) => {
                placement.resolve_y(base.y, base.height, self.body_size(container, skin).height)
            }
            None => base.y,
        }
    }

    /// Hit-test rectangle of `id` in its parent's body space, or in its own
    /// surface for root and floating widgets.
    pub fn bounds_in_parent(&self, id: NodeId, skin: Option<&Skin>) -> Rect {
        let base = self.base(id);
        if base.owns_renderer() {
            return base.local_rect();
        }
        Rect::from_size(self.x(id, skin), self.y(id, skin), base.width, base.height)
    }

    pub fn body(&self, id: NodeId, skin: Option<&Skin>) -> Rect {
        self.body_of(id, self.bounds_in_parent(id, skin), skin)
    }

    /// Bounds of `id` in the surface of its owning renderer.
    pub fn absolute_bounds(&self, id: NodeId, skin: Option<&Skin>) -> Rect {
        let base = self.base(id);
        match base.parent {
            Some(parent) if !base.is_floating() => {
                let origin = self.body_with_parents_applied(parent, skin).top_left();
                self.bounds_in_parent(id, skin).translate(origin.x, origin.y)
            }
            _ => base.local_rect(),
        }
    }

    /// Body of `id` in the surface of its owning renderer.
    pub fn body_with_parents_applied(&self, id: NodeId, skin: Option<&Skin>) -> Rect {
        self.body_of(id, self.absolute_bounds(id, skin), skin)
    }

    /// Draws an owning node into its renderer surface and flags the renderer
    /// for upload if anything was drawn.
    pub(crate) fn draw(&mut self, id: NodeId, force: bool, res: &mut DrawResources<'_>) -> bool {
        profile_function!();
        let Some(base) = self.get_base(id) else {
            return false;
        };
        if !base.is_visible() {
            return false;
        }
        let Some(rid) = base.renderer else {
            return false;
        };
        let Some(surface) = res.queue.surface_mut(rid) else {
            return false;
        };
        surface.lock();
        let area = surface.rect();
        let drew = self.draw_node(id, force, area, rid, res);
        if let Some(surface) = res.queue.surface_mut(rid) {
            surface.unlock();
        }
        if drew {
            res.queue.mark_upload(rid);
        }
        drew
    }

    fn draw_node(
        &mut self,
        id: NodeId,
        force: bool,
        parent_body: Rect,
        rid: RendererId,
        res: &mut DrawResources<'_>,
    ) -> bool {
        let base = self.base(id);
        if !base.is_visible() {
            // Nothing to paint; showing it again dirties it.
            self.clear_dirty_subtree(id);
            return false;
        }
        let redraw = force || base.is_self_dirty();
        let bounds = if base.owns_renderer() {
            base.local_rect()
        } else {
            self.bounds_in_parent(id, res.skin)
                .translate(parent_body.x1, parent_body.y1)
        };

        let Some(node) = self.nodes.get_mut(id.0) else {
            return false;
        };
        let Node { base, behavior } = node;
        let body = match behavior.as_deref_mut() {
            Some(behavior) => {
                if redraw && let Some(surface) = res.queue.surface_mut(rid) {
                    let mut ctx = DrawContext::new(
                        base,
                        surface,
                        &mut *res.draw,
                        res.skin,
                        res.fonts,
                        parent_body,
                        bounds,
                    );
                    behavior.draw(&mut ctx);
                }
                behavior.body(bounds, res.skin)
            }
            None => bounds,
        };
        if redraw {
            base.flags.remove(WidgetFlags::DIRTY);
        }

        let children = base.children.clone();
        let mut drew = redraw;
        for child in children {
            let floating = self.get_base(child).is_some_and(|b| b.is_floating());
            if floating {
                self.draw(child, false, res);
            } else {
                drew |= self.draw_node(child, redraw, body, rid, res);
            }
        }
        drew
    }
}

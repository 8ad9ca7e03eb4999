//! Root widgets, focus, z-order, deferred removal and input dispatch.
//!
//! The stage is the part of the controller state that behaviours may reach
//! through a [`TreatContext`]. It never talks to the backend except through
//! the widget renderers it already holds.

use crate::context::TreatContext;
use crate::event::{Event, EventType};
use crate::render_queue::{RenderQueue, RendererId};
use crate::skin::Skin;
use crate::tree::{NodeId, WidgetTree};
use crate::widget::{PointerInput, WidgetFlags, WidgetKind};
use farso_core::alloc::HashMap;
use farso_core::geometry::Point;
use farso_core::profiling::{profile_function, profile_scope};

#[derive(Default)]
pub(crate) struct Stage {
    pub(crate) tree: WidgetTree,
    /// Dispatch order, most recently brought forward first.
    pub(crate) roots: Vec<NodeId>,
    pub(crate) renderers: RenderQueue,
    pub(crate) active: Option<NodeId>,
    pub(crate) bring_front_pending: bool,
    pub(crate) last_event: Event,
    pub(crate) text_editor: Option<NodeId>,
    pub(crate) removals: Vec<NodeId>,
    pub(crate) ids: HashMap<String, NodeId>,
    pub(crate) pointer_over: Option<NodeId>,
    /// Left button state of the previous pass.
    pub(crate) previous_left: bool,
}

impl Stage {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_event(&mut self, owner: NodeId, kind: EventType) {
        tracing::trace!("Event {kind:?} from {owner:?}");
        self.last_event = Event::new(owner, kind);
    }

    /// At most one widget is active. The previous one loses its flag in the
    /// same call; z-order is re-applied at the next pass either way.
    pub(crate) fn set_active_widget(&mut self, id: Option<NodeId>) {
        let id = id.filter(|id| self.tree.contains(*id));
        if let Some(previous) = self.active
            && Some(previous) != id
            && let Some(base) = self.tree.get_base_mut(previous)
        {
            base.flags.remove(WidgetFlags::ACTIVE);
            self.tree.set_dirty(previous);
        }
        if let Some(current) = id {
            self.tree.base_mut(current).flags.insert(WidgetFlags::ACTIVE);
            self.tree.set_dirty(current);
        }
        if self.active != id {
            tracing::debug!("Active widget {:?} -> {:?}", self.active, id);
        }
        self.active = id;
        self.bring_front_pending = true;
    }

    pub(crate) fn mark_to_remove(&mut self, id: NodeId) {
        if !self.removals.contains(&id) {
            self.removals.push(id);
        }
    }

    /// Destroys `id` and its subtree, releasing the renderers they owned and
    /// every reference the stage kept to them.
    pub(crate) fn remove_widget(&mut self, id: NodeId) -> bool {
        profile_function!();
        let Some(base) = self.tree.get_base(id) else {
            return false;
        };
        match base.parent {
            Some(parent) => self.tree.set_dirty_for_repaint(parent),
            None => self.roots.retain(|root| *root != id),
        }

        let removed = self.tree.remove_subtree(id);
        for (node, base) in &removed {
            if let Some(renderer) = base.renderer {
                self.renderers.remove(renderer);
            }
            if let Some(name) = &base.id {
                self.ids.remove(name);
            }
            if self.active == Some(*node) {
                self.active = None;
            }
            if self.text_editor == Some(*node) {
                self.text_editor = None;
            }
            if self.pointer_over == Some(*node) {
                self.pointer_over = None;
            }
            self.removals.retain(|pending| pending != node);
        }
        self.renderers.assign_sub_groups();
        tracing::debug!("Removed widget {id:?} ({} nodes)", removed.len());
        true
    }

    /// Destroys every queued widget. Returns whether anything was removed.
    pub(crate) fn drain_removals(&mut self) -> bool {
        let pending = std::mem::take(&mut self.removals);
        let mut removed_any = false;
        for id in pending {
            removed_any |= self.remove_widget(id);
        }
        if removed_any && let Some(front) = self.active.or_else(|| self.roots.first().copied()) {
            let root = self.tree.root_of(front);
            self.bring_front(root);
        }
        removed_any
    }

    /// Moves `root` first in dispatch order and its renderers (floating
    /// descendants in front of it) first in paint order.
    pub(crate) fn bring_front(&mut self, root: NodeId) {
        if let Some(pos) = self.roots.iter().position(|r| *r == root) {
            let root = self.roots.remove(pos);
            self.roots.insert(0, root);
        }
        let mut front: Vec<RendererId> = self
            .tree
            .subtree(root)
            .into_iter()
            .skip(1)
            .filter_map(|id| self.tree.get_base(id))
            .filter(|base| base.is_floating())
            .filter_map(|base| base.renderer)
            .collect();
        front.extend(self.tree.get_base(root).and_then(|b| b.renderer));
        self.renderers.bring_to_front(&front);
        tracing::debug!("Brought {root:?} to front");
    }

    /// Re-applies z-order for a focus change since the last pass.
    pub(crate) fn apply_pending_z_order(&mut self) {
        if !std::mem::take(&mut self.bring_front_pending) {
            return;
        }
        if let Some(active) = self.active.filter(|id| self.tree.contains(*id)) {
            let root = self.tree.root_of(active);
            self.bring_front(root);
        }
    }

    /// Active root first, then every other root in list order.
    pub(crate) fn dispatch_order(&self) -> Vec<NodeId> {
        let active_root = self
            .active
            .filter(|id| self.tree.contains(*id))
            .map(|id| self.tree.root_of(id));
        active_root
            .into_iter()
            .chain(self.roots.iter().copied().filter(|r| Some(*r) != active_root))
            .collect()
    }

    /// Root and floating widgets move their renderer only; other widgets
    /// dirty their parent to repaint the vacated area.
    pub(crate) fn set_position(&mut self, id: NodeId, x: i32, y: i32) {
        let Some(base) = self.tree.get_base_mut(id) else {
            return;
        };
        if base.x == x && base.y == y {
            return;
        }
        base.x = x;
        base.y = y;
        if base.owns_renderer() {
            if let Some(renderer) = base.renderer.and_then(|r| self.renderers.get_mut(r)) {
                renderer.set_position(x, y);
            }
        } else {
            self.tree.set_dirty_with_parent(id);
        }
    }

    pub(crate) fn set_visible(&mut self, id: NodeId, visible: bool) {
        let Some(base) = self.tree.get_base_mut(id) else {
            return;
        };
        if base.is_visible() == visible {
            return;
        }
        base.flags.set(WidgetFlags::VISIBLE, visible);
        if base.owns_renderer()
            && let Some(renderer) = base.renderer.and_then(|r| self.renderers.get_mut(r))
        {
            if visible {
                renderer.show();
            } else {
                renderer.hide();
            }
        }
        if visible {
            self.tree.set_dirty_for_repaint(id);
        } else {
            self.tree.set_dirty_with_parent(id);
        }
    }

    pub(crate) fn set_available(&mut self, id: NodeId, available: bool) {
        if let Some(base) = self.tree.get_base_mut(id) {
            base.flags.set(WidgetFlags::AVAILABLE, available);
            self.tree.set_dirty_for_repaint(id);
        }
    }

    pub(crate) fn set_caption(&mut self, id: NodeId, caption: &str) {
        if let Some(base) = self.tree.get_base_mut(id)
            && base.caption != caption
        {
            base.caption = caption.to_owned();
            self.tree.set_dirty_for_repaint(id);
        }
    }

    /// Panics when `name` is already registered to another widget.
    pub(crate) fn set_id_reference(&mut self, id: NodeId, name: &str) {
        if let Some(existing) = self.ids.get(name) {
            assert!(*existing == id, "duplicate widget id '{name}'");
            return;
        }
        let base = self.tree.base_mut(id);
        if let Some(old) = base.id.replace(name.to_owned()) {
            self.ids.remove(&old);
        }
        self.ids.insert(name.to_owned(), id);
    }

    /// Lets the behaviour of `id` re-place its children.
    pub(crate) fn arrange(&mut self, id: NodeId, skin: Option<&Skin>) {
        if let Some(mut behavior) = self.tree.take_behavior(id) {
            behavior.arrange(&mut TreatContext::new(id, self, skin));
            self.tree.restore_behavior(id, behavior);
        }
    }

    pub(crate) fn arrange_all(&mut self, skin: Option<&Skin>) {
        for id in self.tree.ids() {
            self.arrange(id, skin);
        }
    }

    /// Treats an owning widget with the pointer converted into its surface.
    pub(crate) fn treat_root(&mut self, id: NodeId, input: &PointerInput, skin: Option<&Skin>) -> bool {
        profile_function!();
        let Some(base) = self.tree.get_base(id) else {
            return false;
        };
        if !base.is_visible() || !base.is_available() {
            return false;
        }
        let origin = base
            .renderer
            .and_then(|r| self.renderers.get(r))
            .map_or(Point::new(base.x, base.y), |r| r.position());
        let local = Point::new(input.x - origin.x, input.y - origin.y);
        self.treat_node(id, input, local, skin)
    }

    fn treat_node(&mut self, id: NodeId, input: &PointerInput, local: Point, skin: Option<&Skin>) -> bool {
        let Some(base) = self.tree.get_base(id) else {
            return false;
        };
        if !base.is_visible() || !base.is_available() {
            return false;
        }
        let Some(mut behavior) = self.tree.take_behavior(id) else {
            return false;
        };

        let suppressed = self.text_editor.is_some_and(|editor| editor != id) && !behavior.is_text_editor();
        let claimed = !suppressed && behavior.treat(&mut TreatContext::new(id, self, skin), input, local);
        self.tree.restore_behavior(id, behavior);
        if claimed {
            return true;
        }

        // The node may have been moved by its own treat; look it up again.
        let Some(base) = self.tree.get_base(id) else {
            return false;
        };
        let inactive_window = base.kind() == WidgetKind::Window && !base.is_active();
        if !inactive_window {
            profile_scope!("treat_children");
            let body = self.tree.body(id, skin);
            for child in base.children.clone() {
                let claimed = if self.tree.get_base(child).is_some_and(|b| b.is_floating()) {
                    self.treat_root(child, input, skin)
                } else {
                    let child_local = Point::new(local.x - body.x1, local.y - body.y1);
                    self.treat_node(child, input, child_local, skin)
                };
                if claimed {
                    break;
                }
            }
        }

        if let Some(mut behavior) = self.tree.take_behavior(id) {
            behavior.after_child_treat(&mut TreatContext::new(id, self, skin));
            self.tree.restore_behavior(id, behavior);
        }
        !self.last_event.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::DrawContext;
    use crate::widget::{Widget, WidgetBase, WidgetDesc};
    use std::any::Any;

    /// Claims every press inside its bounds.
    struct Pad;

    impl Widget for Pad {
        fn kind(&self) -> WidgetKind {
            WidgetKind::Custom(1)
        }
        fn draw(&mut self, _ctx: &mut DrawContext<'_>) {}
        fn treat(&mut self, ctx: &mut TreatContext<'_>, input: &PointerInput, local: Point) -> bool {
            if input.left && ctx.bounds().contains_point(local) {
                ctx.set_event(EventType::Custom(7));
                return true;
            }
            false
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn add(stage: &mut Stage, parent: Option<NodeId>, desc: WidgetDesc) -> NodeId {
        let id = stage
            .tree
            .insert(WidgetBase::new(WidgetKind::Custom(1), desc), Box::new(Pad));
        match parent {
            Some(parent) => stage.tree.attach(parent, id),
            None => stage.roots.push(id),
        }
        id
    }

    #[test]
    fn test_single_active_widget() {
        let mut stage = Stage::new();
        let a = add(&mut stage, None, WidgetDesc::new(0, 0, 10, 10));
        let b = add(&mut stage, None, WidgetDesc::new(0, 0, 10, 10));

        stage.set_active_widget(Some(a));
        assert!(stage.tree.base(a).is_active());
        stage.set_active_widget(Some(b));
        assert!(!stage.tree.base(a).is_active());
        assert!(stage.tree.base(b).is_active());
        assert_eq!(stage.active, Some(b));
        assert!(stage.bring_front_pending);
    }

    #[test]
    fn test_first_claim_wins_among_siblings() {
        let mut stage = Stage::new();
        let root = add(&mut stage, None, WidgetDesc::new(0, 0, 100, 100));
        // The root only claims presses it owns; move it away from the point.
        stage.tree.base_mut(root).width = 1;
        stage.tree.base_mut(root).height = 1;
        let first = add(&mut stage, Some(root), WidgetDesc::new(10, 10, 20, 20));
        let _second = add(&mut stage, Some(root), WidgetDesc::new(10, 10, 20, 20));

        let input = PointerInput::new(true, false, 15, 15);
        assert!(stage.treat_root(root, &input, None));
        assert_eq!(stage.last_event.owner, Some(first));
    }

    #[test]
    fn test_text_edit_mode_suppresses_other_widgets() {
        let mut stage = Stage::new();
        let a = add(&mut stage, None, WidgetDesc::new(0, 0, 10, 10));
        let editor = add(&mut stage, None, WidgetDesc::new(0, 0, 10, 10));
        stage.text_editor = Some(editor);

        let input = PointerInput::new(true, false, 5, 5);
        assert!(!stage.treat_root(a, &input, None));
        assert!(stage.treat_root(editor, &input, None));
    }

    #[test]
    fn test_removal_is_deferred() {
        let mut stage = Stage::new();
        let root = add(&mut stage, None, WidgetDesc::new(0, 0, 10, 10));
        let child = add(&mut stage, Some(root), WidgetDesc::new(0, 0, 5, 5));
        stage.set_id_reference(child, "child");
        stage.set_active_widget(Some(child));

        stage.mark_to_remove(root);
        assert!(stage.tree.contains(child));
        assert!(stage.drain_removals());
        assert!(!stage.tree.contains(root));
        assert!(!stage.tree.contains(child));
        assert!(stage.roots.is_empty());
        assert!(stage.active.is_none());
        assert!(stage.ids.is_empty());
        assert!(!stage.drain_removals());
    }

    #[test]
    #[should_panic(expected = "duplicate widget id")]
    fn test_duplicate_id_panics() {
        let mut stage = Stage::new();
        let a = add(&mut stage, None, WidgetDesc::new(0, 0, 10, 10));
        let b = add(&mut stage, None, WidgetDesc::new(0, 0, 10, 10));
        stage.set_id_reference(a, "ok");
        stage.set_id_reference(b, "ok");
    }

    #[test]
    fn test_dispatch_order_starts_with_active_root() {
        let mut stage = Stage::new();
        let a = add(&mut stage, None, WidgetDesc::new(0, 0, 10, 10));
        let b = add(&mut stage, None, WidgetDesc::new(0, 0, 10, 10));
        let child = add(&mut stage, Some(b), WidgetDesc::new(0, 0, 5, 5));
        stage.set_active_widget(Some(child));
        assert_eq!(stage.dispatch_order(), vec![b, a]);
    }
}

//! Paint order of widget renderers.
//!
//! The queue is independent of the root list: the root list decides who gets
//! input first, the queue decides who gets painted last (front). Both are
//! kept in step by `bring_front`.

use crate::renderer::{Surface, WidgetRenderer};
use crate::tree::NodeId;
use farso_core::alloc::{IndexSlot, SparseSet};
use farso_core::profiling::profile_function;

/// Lowest sub-group handed to widget renderers.
pub const RENDER_SUB_GROUP_MIN: u8 = 1;
/// Sub-group of the frontmost widget renderer.
pub const RENDER_SUB_GROUP_MAX: u8 = 253;
/// Reserved for the cursor image.
pub const CURSOR_SUB_GROUP: u8 = 254;
/// Reserved for the cursor tip, above everything.
pub const CURSOR_TIP_SUB_GROUP: u8 = 255;

/// Handle to a renderer in the [`RenderQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RendererId(IndexSlot);

struct Slot {
    renderer: Box<dyn WidgetRenderer>,
    owner: Option<NodeId>,
    needs_upload: bool,
}

#[derive(Default)]
pub struct RenderQueue {
    slots: SparseSet<Slot>,
    /// Front first.
    order: Vec<RendererId>,
}

impl RenderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: RendererId) -> bool {
        self.slots.contains(id.0)
    }

    /// Adds `renderer` in front of every other one.
    pub fn insert(&mut self, renderer: Box<dyn WidgetRenderer>, owner: Option<NodeId>) -> RendererId {
        let id = RendererId(self.slots.push(Slot {
            renderer,
            owner,
            needs_upload: true,
        }));
        self.order.insert(0, id);
        self.assign_sub_groups();
        id
    }

    pub fn remove(&mut self, id: RendererId) -> Option<Box<dyn WidgetRenderer>> {
        let slot = self.slots.remove(id.0)?;
        self.order.retain(|r| *r != id);
        Some(slot.renderer)
    }

    /// Swaps the renderer behind `id` keeping its place in the queue.
    pub fn replace(&mut self, id: RendererId, renderer: Box<dyn WidgetRenderer>) -> Option<Box<dyn WidgetRenderer>> {
        let slot = self.slots.get_mut(id.0)?;
        let group = slot.renderer.render_queue_sub_group();
        let old = std::mem::replace(&mut slot.renderer, renderer);
        slot.renderer.set_render_queue_sub_group(group);
        slot.needs_upload = true;
        Some(old)
    }

    pub fn get(&self, id: RendererId) -> Option<&dyn WidgetRenderer> {
        self.slots.get(id.0).map(|slot| slot.renderer.as_ref())
    }

    pub fn get_mut(&mut self, id: RendererId) -> Option<&mut (dyn WidgetRenderer + 'static)> {
        self.slots.get_mut(id.0).map(|slot| slot.renderer.as_mut())
    }

    pub fn surface_mut(&mut self, id: RendererId) -> Option<&mut dyn Surface> {
        self.get_mut(id).map(|r| r.surface_mut())
    }

    pub fn owner(&self, id: RendererId) -> Option<NodeId> {
        self.slots.get(id.0).and_then(|slot| slot.owner)
    }

    /// Renderer ids, front first.
    pub fn order(&self) -> &[RendererId] {
        &self.order
    }

    /// Moves `ids` to the front; `ids[0]` ends up frontmost.
    pub fn bring_to_front(&mut self, ids: &[RendererId]) {
        self.order.retain(|r| !ids.contains(r));
        let front = ids.iter().copied().filter(|id| self.slots.contains(id.0));
        self.order.splice(0..0, front.collect::<Vec<_>>());
        self.assign_sub_groups();
    }

    /// Front to back from [`RENDER_SUB_GROUP_MAX`] down, clamping at
    /// [`RENDER_SUB_GROUP_MIN`].
    pub fn assign_sub_groups(&mut self) {
        for (depth, id) in self.order.iter().enumerate() {
            let group = (RENDER_SUB_GROUP_MAX as usize)
                .saturating_sub(depth)
                .max(RENDER_SUB_GROUP_MIN as usize) as u8;
            if let Some(slot) = self.slots.get_mut(id.0) {
                slot.renderer.set_render_queue_sub_group(group);
            }
        }
    }

    pub fn mark_upload(&mut self, id: RendererId) {
        if let Some(slot) = self.slots.get_mut(id.0) {
            slot.needs_upload = true;
        }
    }

    pub fn needs_upload(&self, id: RendererId) -> bool {
        self.slots.get(id.0).is_some_and(|slot| slot.needs_upload)
    }

    /// Uploads every flagged surface. Returns how many were uploaded.
    pub fn upload_pending(&mut self) -> usize {
        profile_function!();
        let mut uploaded = 0;
        for id in &self.order {
            if let Some(slot) = self.slots.get_mut(id.0)
                && slot.needs_upload
            {
                slot.renderer.upload_surface();
                slot.needs_upload = false;
                uploaded += 1;
            }
        }
        uploaded
    }

    /// Paints every visible renderer back to front.
    pub fn render_all(&mut self) {
        profile_function!();
        for id in self.order.iter().rev() {
            if let Some(slot) = self.slots.get_mut(id.0)
                && slot.renderer.is_visible()
            {
                let depth = slot.renderer.render_queue_sub_group();
                slot.renderer.render(depth);
            }
        }
    }

    /// Owner of the frontmost visible renderer covering `(x, y)`. A
    /// renderer without an owner still hides whatever is behind it.
    pub fn owner_at(&self, x: i32, y: i32) -> Option<NodeId> {
        self.order
            .iter()
            .filter_map(|id| self.slots.get(id.0))
            .find(|slot| slot.renderer.is_visible() && slot.renderer.screen_rect().contains(x, y))
            .and_then(|slot| slot.owner)
    }

    /// Drops every renderer.
    pub fn clear(&mut self) {
        for id in std::mem::take(&mut self.order) {
            self.slots.remove(id.0);
        }
    }
}

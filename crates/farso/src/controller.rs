//! The controller context.
//!
//! One [`Controller`] exists per UI. It owns the widget tree, the render
//! queue, focus and z-order, the skin, fonts and the cursor, all behind one
//! coarse lock. The host calls [`Controller::verify_events`] once per frame.

use crate::config::ControllerConfig;
use crate::cursor::Cursor;
use crate::error::Result;
use crate::event::{Event, EventType};
use crate::font::{Font, FontManager};
use crate::render_queue::{RenderQueue, RendererId};
use crate::renderer::{ControllerRendererJunction, Renderer};
use crate::skin::{Skin, SkinElementType};
use crate::stage::Stage;
use crate::tree::{DrawResources, NodeId, WidgetTree};
use crate::widget::{PointerInput, Widget, WidgetBase, WidgetDesc};
use farso_core::profiling::{profile_function, profile_scope};
use parking_lot::{Mutex, MutexGuard};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything the controller guards. Reached through [`Controller::lock`].
pub struct ControllerState {
    renderer: Box<dyn Renderer>,
    junction: Box<dyn ControllerRendererJunction>,
    stage: Stage,
    skin: Option<Skin>,
    cursor: Cursor,
    fonts: Arc<FontManager>,
    config: ControllerConfig,
}

impl ControllerState {
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn renderer(&self) -> &dyn Renderer {
        self.renderer.as_ref()
    }

    pub fn renderer_mut(&mut self) -> &mut dyn Renderer {
        self.renderer.as_mut()
    }

    pub fn tree(&self) -> &WidgetTree {
        &self.stage.tree
    }

    pub fn base(&self, id: NodeId) -> Option<&WidgetBase> {
        self.stage.tree.get_base(id)
    }

    /// Like [`ControllerState::base`], for callers propagating errors.
    pub fn try_base(&self, id: NodeId) -> Result<&WidgetBase> {
        self.stage.tree.try_base(id)
    }

    /// Root widgets in dispatch order, most recently brought forward first.
    pub fn roots(&self) -> &[NodeId] {
        &self.stage.roots
    }

    pub fn render_queue(&self) -> &RenderQueue {
        &self.stage.renderers
    }

    pub fn fonts(&self) -> &Arc<FontManager> {
        &self.fonts
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Creates a widget under `parent`, or a root widget for `None`.
    ///
    /// Root and floating widgets get a renderer of their own.
    pub fn add_widget(&mut self, parent: Option<NodeId>, desc: WidgetDesc, behavior: Box<dyn Widget>) -> NodeId {
        profile_function!();
        let kind = behavior.kind();
        let id = self.stage.tree.insert(WidgetBase::new(kind, desc), behavior);
        match parent {
            Some(parent) => {
                self.stage.tree.attach(parent, id);
                self.stage.tree.set_dirty(parent);
            }
            None => self.stage.roots.insert(0, id),
        }
        if self.stage.tree.base(id).owns_renderer() {
            self.attach_renderer(id);
        }
        tracing::trace!("Added {kind:?} widget {id:?}");
        id
    }

    fn attach_renderer(&mut self, id: NodeId) {
        let base = self.stage.tree.base(id);
        let (x, y, visible) = (base.x(), base.y(), base.is_visible());
        let mut renderer = self
            .renderer
            .create_widget_renderer(base.width().max(1), base.height().max(1));
        renderer.set_position(x, y);
        if visible {
            renderer.show();
        } else {
            renderer.hide();
        }
        let rid = self.stage.renderers.insert(renderer, Some(id));
        self.stage.tree.base_mut(id).renderer = Some(rid);
    }

    /// Destroys `id` and its subtree now. Prefer
    /// [`ControllerState::mark_to_remove_widget`] from inside a pass.
    pub fn remove_widget(&mut self, id: NodeId) -> bool {
        self.stage.remove_widget(id)
    }

    /// Queues `id` for removal at the top of the next pass.
    pub fn mark_to_remove_widget(&mut self, id: NodeId) {
        self.stage.mark_to_remove(id);
    }

    /// Moves `id` under `parent` (or makes it a root), creating or dropping
    /// its renderer as ownership changes.
    ///
    /// Panics when `parent` is `id` or one of its descendants.
    pub fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        let Some(base) = self.stage.tree.get_base(id) else {
            return;
        };
        if base.parent() == parent {
            return;
        }
        if let Some(parent) = parent {
            assert!(
                parent != id && !self.stage.tree.is_ancestor(id, parent),
                "cannot re-parent widget {id:?} into its own subtree"
            );
        }
        match base.parent() {
            Some(old) => {
                self.stage.tree.detach(id);
                self.stage.tree.set_dirty(old);
            }
            None => self.stage.roots.retain(|root| *root != id),
        }
        match parent {
            Some(parent) => {
                self.stage.tree.attach(parent, id);
                self.stage.tree.set_dirty(parent);
            }
            None => self.stage.roots.insert(0, id),
        }

        let base = self.stage.tree.base(id);
        match (base.owns_renderer(), base.renderer()) {
            (true, None) => self.attach_renderer(id),
            (false, Some(rid)) => {
                self.stage.renderers.remove(rid);
                self.stage.tree.base_mut(id).renderer = None;
            }
            _ => {}
        }
        self.stage.tree.set_dirty(id);
        self.stage.renderers.assign_sub_groups();
    }

    pub fn set_active_widget(&mut self, id: Option<NodeId>) {
        self.stage.set_active_widget(id);
    }

    pub fn active_widget(&self) -> Option<NodeId> {
        self.stage.active
    }

    /// The event of the current pass, or of the last one once it finished.
    pub fn last_event(&self) -> Event {
        self.stage.last_event
    }

    pub fn set_event(&mut self, owner: NodeId, kind: EventType) {
        self.stage.set_event(owner, kind);
    }

    /// Registers `name` for `id`. Panics when `name` belongs to another
    /// widget.
    pub fn set_id_reference(&mut self, id: NodeId, name: &str) {
        self.stage.set_id_reference(id, name);
    }

    pub fn widget_by_id(&self, name: &str) -> Option<NodeId> {
        self.stage.ids.get(name).copied()
    }

    /// A renderer outside any widget, painted with the widget renderers.
    pub fn create_new_widget_renderer(&mut self, width: i32, height: i32) -> RendererId {
        let renderer = self.renderer.create_widget_renderer(width, height);
        self.stage.renderers.insert(renderer, None)
    }

    /// Removes a renderer created with
    /// [`ControllerState::create_new_widget_renderer`]. Renderers owned by a
    /// widget go with their widget only.
    pub fn remove_widget_renderer(&mut self, id: RendererId) -> bool {
        if let Some(owner) = self.stage.renderers.owner(id) {
            tracing::warn!("Renderer {id:?} belongs to widget {owner:?}, not removed");
            return false;
        }
        self.stage.renderers.remove(id).is_some()
    }

    /// Typed access to the behaviour of `id`.
    pub fn widget<T: Widget>(&self, id: NodeId) -> Option<&T> {
        self.stage.tree.behavior(id)?.as_any().downcast_ref::<T>()
    }

    /// Mutable typed access; marks the widget dirty.
    pub fn widget_mut<T: Widget>(&mut self, id: NodeId) -> Option<&mut T> {
        if !self.stage.tree.behavior(id)?.as_any().is::<T>() {
            return None;
        }
        self.stage.tree.set_dirty_for_repaint(id);
        self.stage.tree.behavior_mut(id)?.as_any_mut().downcast_mut::<T>()
    }

    pub fn set_position(&mut self, id: NodeId, x: i32, y: i32) {
        self.stage.set_position(id, x, y);
    }

    /// Resizes `id`. Root and floating widgets get a new renderer of the new
    /// size in the same place of the queue.
    pub fn set_size(&mut self, id: NodeId, width: i32, height: i32) {
        let Some(base) = self.stage.tree.get_base_mut(id) else {
            return;
        };
        if base.width == width && base.height == height {
            return;
        }
        base.width = width;
        base.height = height;
        let (x, y, visible) = (base.x, base.y, base.is_visible());
        if base.owns_renderer()
            && let Some(rid) = base.renderer
        {
            let mut renderer = self
                .renderer
                .create_widget_renderer(width.max(1), height.max(1));
            renderer.set_position(x, y);
            if visible {
                renderer.show();
            } else {
                renderer.hide();
            }
            self.stage.renderers.replace(rid, renderer);
        }
        self.stage.tree.set_dirty_with_parent(id);
        self.arrange(id);
    }

    pub fn set_caption(&mut self, id: NodeId, caption: &str) {
        self.stage.set_caption(id, caption);
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        self.stage.set_visible(id, visible);
    }

    pub fn show(&mut self, id: NodeId) {
        self.stage.set_visible(id, true);
    }

    pub fn hide(&mut self, id: NodeId) {
        self.stage.set_visible(id, false);
    }

    pub fn enable(&mut self, id: NodeId) {
        self.stage.set_available(id, true);
    }

    pub fn disable(&mut self, id: NodeId) {
        self.stage.set_available(id, false);
    }

    pub fn set_dirty(&mut self, id: NodeId) {
        self.stage.tree.set_dirty(id);
    }

    /// Lets the behaviour of `id` re-place the children it manages.
    pub fn arrange(&mut self, id: NodeId) {
        self.stage.arrange(id, self.skin.as_ref());
    }

    /// Moves `root` in front of every other root, in dispatch and paint
    /// order.
    pub fn bring_front(&mut self, root: NodeId) {
        self.stage.bring_front(root);
    }

    /// Enters keyboard text-edit mode with `editor`, or leaves it for `None`.
    /// Meanwhile only text editors receive input.
    pub fn set_text_editor(&mut self, editor: Option<NodeId>) {
        self.stage.text_editor = editor.filter(|id| self.stage.tree.contains(*id));
    }

    pub fn text_editor(&self) -> Option<NodeId> {
        self.stage.text_editor
    }

    /// Whether the pointer was over any widget during the last pass.
    pub fn is_pointer_over_widget(&self) -> bool {
        self.stage.pointer_over.is_some()
    }

    /// Owner of the frontmost renderer under the pointer in the last pass.
    pub fn pointer_over(&self) -> Option<NodeId> {
        self.stage.pointer_over
    }

    pub fn skin(&self) -> Option<&Skin> {
        self.skin.as_ref()
    }

    /// Loads and applies the skin at `path`.
    ///
    /// On failure the error is logged and the controller falls back to no
    /// skin. Either way every widget is redrawn.
    pub fn load_skin(&mut self, path: impl AsRef<Path>) -> bool {
        profile_function!();
        let path = path.as_ref();
        let loaded = match Skin::load(path, self.renderer.as_mut()) {
            Ok(skin) => {
                self.load_skin_fonts(&skin);
                self.skin = Some(skin);
                tracing::debug!("Skin swapped to {}", path.display());
                true
            }
            Err(err) => {
                tracing::warn!("Failed to load skin {}: {err}", path.display());
                self.skin = None;
                false
            }
        };
        self.stage.tree.mark_all_dirty();
        self.stage.arrange_all(self.skin.as_ref());
        loaded
    }

    pub fn unload_skin(&mut self) {
        if self.skin.take().is_some() {
            tracing::debug!("Skin unloaded");
        }
        self.stage.tree.mark_all_dirty();
        self.stage.arrange_all(None);
    }

    fn load_skin_fonts(&mut self, skin: &Skin) {
        let mut paths: Vec<PathBuf> = SkinElementType::ALL
            .iter()
            .filter_map(|kind| skin.font_for(*kind))
            .map(Path::to_path_buf)
            .collect();
        paths.sort();
        paths.dedup();
        for path in &paths {
            self.load_font(path);
        }
        if let Some(default) = skin.default_font()
            && self.fonts.get(default).is_some()
        {
            self.fonts.set_default_font(Some(default.to_path_buf()));
        }
    }

    /// Loads a font through the backend, or returns the cached one.
    pub fn load_font(&mut self, path: impl AsRef<Path>) -> Option<Arc<dyn Font>> {
        let path = path.as_ref();
        let renderer = &mut self.renderer;
        match self.fonts.get_or_load(path, |p| renderer.load_font(p)) {
            Ok(font) => Some(font),
            Err(err) => {
                tracing::warn!("{err}");
                None
            }
        }
    }

    /// Sets the cursor image. A failure keeps the previous image.
    pub fn set_cursor(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        match self
            .cursor
            .set_image(path, self.renderer.as_mut(), self.junction.as_mut())
        {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("Failed to set cursor: {err}");
                false
            }
        }
    }

    /// Shows `tip` next to the cursor, or removes it for `None`.
    pub fn set_cursor_tip(&mut self, tip: Option<&str>) {
        let font = self
            .skin
            .as_ref()
            .and_then(|skin| skin.font_for(SkinElementType::CursorTip))
            .and_then(|path| self.fonts.get(path))
            .or_else(|| self.fonts.default_font());
        let screen = self.renderer.screen_size();
        self.cursor.set_tip(
            tip,
            font,
            self.skin.as_ref(),
            self.renderer.draw(),
            self.junction.as_mut(),
            screen,
        );
    }

    pub fn set_cursor_visible(&mut self, visible: bool) {
        self.cursor.set_visible(visible);
    }

    /// Redraws the owning widget of `id` (or just what is dirty in it).
    /// Returns whether anything was drawn.
    pub fn draw_widget(&mut self, id: NodeId, force: bool) -> bool {
        if !self.stage.tree.contains(id) {
            return false;
        }
        let owner = self.stage.tree.owner_of(id);
        self.draw_owner(owner, force)
    }

    fn draw_owner(&mut self, owner: NodeId, force: bool) -> bool {
        profile_scope!("draw_owner");
        if let Some(atlas) = self.skin.as_mut().and_then(|s| s.atlas_mut()) {
            atlas.lock();
        }
        let mut res = DrawResources {
            queue: &mut self.stage.renderers,
            draw: self.renderer.draw(),
            skin: self.skin.as_ref(),
            fonts: &self.fonts,
        };
        let drew = self.stage.tree.draw(owner, force, &mut res);
        if let Some(atlas) = self.skin.as_mut().and_then(|s| s.atlas_mut()) {
            atlas.unlock();
        }
        drew
    }

    /// One frame: turns the pointer sample into at most one event, redraws
    /// what is dirty and composites when the backend asks for it.
    ///
    /// Roots after the first claim are only redrawn. While the left button
    /// is held, only the active root and the root under the pointer are
    /// treated, so a press made elsewhere never reaches a window the pointer
    /// is dragged into.
    ///
    /// Returns whether an event was produced.
    pub fn verify_events(&mut self, left: bool, right: bool, x: i32, y: i32) -> bool {
        profile_function!();
        self.stage.last_event = Event::NONE;
        self.renderer.enter_2d_mode();

        self.stage.drain_removals();
        self.stage.apply_pending_z_order();

        let input = PointerInput::new(left, right, x, y).after(self.stage.previous_left);
        self.stage.previous_left = left;
        let active_root = self
            .stage
            .active
            .filter(|id| self.stage.tree.contains(*id))
            .map(|id| self.stage.tree.root_of(id));
        let hovered_root = self
            .stage
            .renderers
            .owner_at(x, y)
            .map(|owner| self.stage.tree.root_of(owner));

        let mut claimed = false;
        for root in self.stage.dispatch_order() {
            // Roots under another one only see release frames.
            let reachable = !left || Some(root) == active_root || Some(root) == hovered_root;
            if !claimed && reachable {
                claimed = self.stage.treat_root(root, &input, self.skin.as_ref());
            }
            let visible = self.stage.tree.get_base(root).is_some_and(|b| b.is_visible());
            if visible && self.stage.tree.is_dirty(root) {
                self.draw_owner(root, false);
            }
        }
        self.stage.renderers.upload_pending();

        self.stage.pointer_over = self.stage.renderers.owner_at(x, y);
        let screen = self.renderer.screen_size();
        self.cursor.update(input.position(), screen);

        if self.renderer.should_manual_render() {
            profile_scope!("manual_render");
            self.stage.renderers.render_all();
            self.cursor.render();
        }

        self.renderer.restore_3d_mode();
        let event = self.stage.last_event;
        if !event.is_none() {
            tracing::trace!("Pass produced {:?} from {:?}", event.kind, event.owner);
        }
        !event.is_none()
    }

    fn shutdown(&mut self) {
        for root in self.stage.roots.clone() {
            self.stage.remove_widget(root);
        }
        self.stage.removals.clear();
        self.stage.renderers.clear();
        self.skin = None;
        self.fonts.clear();
    }
}

/// The UI context. Created by [`Controller::init`], torn down by
/// [`Controller::finish`].
///
/// Methods on the controller lock for the duration of the call; use
/// [`Controller::lock`] to batch several operations.
pub struct Controller {
    state: Mutex<ControllerState>,
    fonts: Arc<FontManager>,
}

impl Controller {
    pub fn init(mut renderer: Box<dyn Renderer>, config: ControllerConfig) -> Self {
        profile_function!();
        let mut junction = renderer.create_junction();
        let cursor = Cursor::new(junction.as_mut(), &config);
        let fonts = Arc::new(FontManager::new());
        let mut state = ControllerState {
            renderer,
            junction,
            stage: Stage::new(),
            skin: None,
            cursor,
            fonts: Arc::clone(&fonts),
            config: config.clone(),
        };

        if let Some(font) = &config.default_font
            && state.load_font(font).is_some()
        {
            fonts.set_default_font(Some(font.clone()));
        }
        if let Some(skin) = &config.skin {
            state.load_skin(skin);
        }
        if let Some(image) = &config.cursor_image {
            state.set_cursor(image);
        }

        tracing::info!("Controller initialized");
        Controller {
            state: Mutex::new(state),
            fonts,
        }
    }

    /// Destroys every widget, then releases the skin, fonts and cursor.
    pub fn finish(self) {
        let mut state = self.state.into_inner();
        state.shutdown();
        drop(state);
        tracing::info!("Controller finished");
    }

    pub fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock()
    }

    /// The font cache. Usable without taking the controller lock.
    pub fn fonts(&self) -> Arc<FontManager> {
        Arc::clone(&self.fonts)
    }

    pub fn verify_events(&self, left: bool, right: bool, x: i32, y: i32) -> bool {
        self.lock().verify_events(left, right, x, y)
    }

    pub fn load_skin(&self, path: impl AsRef<Path>) -> bool {
        self.lock().load_skin(path)
    }

    pub fn set_cursor(&self, path: impl AsRef<Path>) -> bool {
        self.lock().set_cursor(path)
    }

    pub fn set_cursor_tip(&self, tip: Option<&str>) {
        self.lock().set_cursor_tip(tip);
    }

    pub fn set_cursor_visible(&self, visible: bool) {
        self.lock().set_cursor_visible(visible);
    }

    pub fn set_active_widget(&self, id: Option<NodeId>) {
        self.lock().set_active_widget(id);
    }

    pub fn set_event(&self, owner: NodeId, kind: EventType) {
        self.lock().set_event(owner, kind);
    }

    pub fn last_event(&self) -> Event {
        self.lock().last_event()
    }
}

static_assertions::assert_impl_all!(Controller: Send, Sync);

//! Widget ownership, renderer lifetimes and dirty propagation.

use farso::widgets::{Button, Container, Label, Window};
use farso::{Controller, ControllerConfig, WidgetDesc};
use farso_test_utils::{CallLog, MockRenderer, RenderCall};

/// Serial of the cursor renderer, created by `Controller::init`.
const CURSOR: usize = 0;

fn controller() -> (Controller, CallLog) {
    farso_core::logging::try_init();
    let backend = MockRenderer::new();
    let log = backend.log();
    (Controller::init(Box::new(backend), ControllerConfig::default()), log)
}

#[test]
fn test_root_and_floating_widgets_own_renderers() {
    let (ui, log) = controller();
    let mut state = ui.lock();

    let root = Container::create(&mut state, None, WidgetDesc::new(10, 10, 100, 80), Default::default());
    let label = Label::create(&mut state, Some(root), WidgetDesc::new(4, 4, 40, 10).caption("plain"));
    let popup = Label::create(&mut state, Some(root), WidgetDesc::new(200, 200, 40, 10).floating());

    assert!(state.base(root).unwrap().renderer().is_some());
    assert!(state.base(label).unwrap().renderer().is_none());
    assert!(state.base(popup).unwrap().renderer().is_some());
    assert_eq!(state.roots(), &[root]);
    assert_eq!(state.tree().owner_of(label), root);
    assert_eq!(state.tree().owner_of(popup), popup);
    assert_eq!(log.live_renderers(), vec![CURSOR, 1, 2]);

    drop(state);
    ui.finish();
}

#[test]
fn test_remove_widget_drops_subtree_and_renderers() {
    let (ui, log) = controller();
    let mut state = ui.lock();

    let root = Container::create(&mut state, None, WidgetDesc::new(0, 0, 100, 80), Default::default());
    let inner = Container::create(&mut state, Some(root), WidgetDesc::new(0, 0, 50, 40), Default::default());
    Label::create(&mut state, Some(inner), WidgetDesc::new(0, 0, 20, 10));
    Label::create(&mut state, Some(inner), WidgetDesc::new(0, 0, 20, 10).floating());
    state.set_id_reference(inner, "inner");
    assert_eq!(state.tree().len(), 4);

    assert!(state.remove_widget(root));
    assert!(state.tree().is_empty());
    assert!(state.roots().is_empty());
    assert!(state.render_queue().is_empty());
    assert_eq!(state.widget_by_id("inner"), None);
    assert_eq!(log.live_renderers(), vec![CURSOR]);

    // Stale handles are ignored.
    assert!(!state.remove_widget(root));
    assert!(state.base(inner).is_none());
    assert!(matches!(state.try_base(inner), Err(farso::Error::UnknownWidget(id)) if id == inner));

    drop(state);
    ui.finish();
}

#[test]
fn test_set_parent_moves_renderer_ownership() {
    let (ui, log) = controller();
    let mut state = ui.lock();

    let a = Container::create(&mut state, None, WidgetDesc::new(0, 0, 100, 100), Default::default());
    let b = Container::create(&mut state, None, WidgetDesc::new(0, 0, 30, 30), Default::default());
    assert_eq!(state.roots(), &[b, a]);

    state.set_parent(b, Some(a));
    assert_eq!(state.roots(), &[a]);
    assert_eq!(state.base(b).unwrap().parent(), Some(a));
    assert!(state.base(b).unwrap().renderer().is_none());
    assert_eq!(log.dropped(), vec![2]);

    state.set_parent(b, None);
    assert_eq!(state.roots(), &[b, a]);
    assert!(state.base(b).unwrap().renderer().is_some());
    assert_eq!(log.live_renderers(), vec![CURSOR, 1, 3]);

    drop(state);
    ui.finish();
}

#[test]
#[should_panic(expected = "cannot re-parent")]
fn test_set_parent_into_descendant_panics() {
    let (ui, _log) = controller();
    let mut state = ui.lock();
    let a = Container::create(&mut state, None, WidgetDesc::new(0, 0, 100, 100), Default::default());
    let b = Container::create(&mut state, Some(a), WidgetDesc::new(0, 0, 50, 50), Default::default());
    state.set_parent(a, Some(b));
}

#[test]
#[should_panic(expected = "duplicate widget id 'ok'")]
fn test_duplicate_id_panics() {
    let (ui, _log) = controller();
    let mut state = ui.lock();
    let a = Button::create(&mut state, None, WidgetDesc::new(0, 0, 10, 10));
    let b = Button::create(&mut state, None, WidgetDesc::new(0, 0, 10, 10));
    state.set_id_reference(a, "ok");
    state.set_id_reference(a, "ok");
    state.set_id_reference(b, "ok");
}

#[test]
fn test_deferred_removal_happens_next_pass() {
    let (ui, log) = controller();
    let root = {
        let mut state = ui.lock();
        let root = Button::create(&mut state, None, WidgetDesc::new(0, 0, 40, 20));
        state.set_active_widget(Some(root));
        state.mark_to_remove_widget(root);
        assert!(state.base(root).is_some());
        root
    };

    ui.verify_events(false, false, 500, 500);
    let state = ui.lock();
    assert!(state.base(root).is_none());
    assert_eq!(state.active_widget(), None);
    assert_eq!(log.live_renderers(), vec![CURSOR]);
}

#[test]
fn test_only_dirty_widgets_are_redrawn() {
    let (ui, log) = controller();
    let button = {
        let mut state = ui.lock();
        Button::create(&mut state, None, WidgetDesc::new(0, 0, 50, 20).caption("Go"))
    };

    ui.verify_events(false, false, 500, 500);
    let first = log.count_draws();
    assert!(first > 0);
    assert_eq!(log.count_uploads(), 1);
    assert!(!ui.lock().tree().is_dirty(button));

    // Nothing changed: nothing is drawn or uploaded.
    ui.verify_events(false, false, 500, 500);
    assert_eq!(log.count_draws(), first);
    assert_eq!(log.count_uploads(), 1);

    ui.lock().set_caption(button, "Stop");
    assert!(ui.lock().tree().is_dirty(button));
    ui.verify_events(false, false, 500, 500);
    assert_eq!(log.count_draws(), 2 * first);
    assert_eq!(log.count_uploads(), 2);
}

#[test]
fn test_child_change_dirties_owner() {
    let (ui, log) = controller();
    let (root, child) = {
        let mut state = ui.lock();
        let root = Container::create(&mut state, None, WidgetDesc::new(0, 0, 100, 80), Default::default());
        let child = Button::create(&mut state, Some(root), WidgetDesc::new(10, 10, 40, 20));
        (root, child)
    };
    ui.verify_events(false, false, 500, 500);
    assert!(!ui.lock().tree().is_dirty(root));

    ui.lock().disable(child);
    {
        let state = ui.lock();
        assert!(state.tree().is_dirty(root));
        assert!(!state.base(root).unwrap().is_self_dirty());
    }

    log.clear();
    ui.verify_events(false, false, 500, 500);
    assert!(!ui.lock().tree().is_dirty(root));
    assert!(log.count_draws() > 0);
}

#[test]
fn test_draw_widget_is_idempotent() {
    let (ui, log) = controller();
    let button = {
        let mut state = ui.lock();
        Button::create(&mut state, None, WidgetDesc::new(0, 0, 50, 20))
    };

    let mut state = ui.lock();
    assert!(state.draw_widget(button, false));
    let drawn = log.count_draws();
    assert!(!state.draw_widget(button, false));
    assert_eq!(log.count_draws(), drawn);

    assert!(state.draw_widget(button, true));
    assert_eq!(log.count_draws(), 2 * drawn);
}

#[test]
fn test_hidden_widget_is_not_drawn() {
    let (ui, log) = controller();
    let button = {
        let mut state = ui.lock();
        let button = Button::create(&mut state, None, WidgetDesc::new(0, 0, 50, 20));
        state.hide(button);
        button
    };
    ui.verify_events(false, false, 500, 500);
    assert_eq!(log.count_draws(), 0);
    assert!(log.calls().contains(&RenderCall::Hide { renderer: 1 }));

    ui.lock().show(button);
    ui.verify_events(false, false, 500, 500);
    assert!(log.count_draws() > 0);
}

#[test]
fn test_resize_replaces_renderer_in_place() {
    let (ui, log) = controller();
    let mut state = ui.lock();
    let a = Button::create(&mut state, None, WidgetDesc::new(5, 5, 50, 20));
    let b = Button::create(&mut state, None, WidgetDesc::new(5, 5, 50, 20));
    let order = state.render_queue().order().to_vec();

    state.set_size(a, 80, 30);
    assert_eq!(state.render_queue().order(), order.as_slice());
    let rid = state.base(a).unwrap().renderer().unwrap();
    let renderer = state.render_queue().get(rid).unwrap();
    assert_eq!((renderer.size().width, renderer.size().height), (80, 30));
    assert_eq!(renderer.position().x, 5);
    assert_eq!(log.dropped(), vec![1]);
    assert!(state.base(b).is_some());
}

#[test]
fn test_label_change_repaints_what_is_below() {
    let (ui, _log) = controller();
    let (window, group, label, button) = {
        let mut state = ui.lock();
        let window = Window::create(&mut state, 0, 0, 300, 200, "Host");
        let group = Container::create(&mut state, Some(window), WidgetDesc::new(0, 0, 200, 100), Default::default());
        let label = Label::create(&mut state, Some(group), WidgetDesc::new(4, 4, 120, 12).caption("Long old caption"));
        let button = Button::create(&mut state, Some(window), WidgetDesc::new(10, 120, 50, 20));
        Window::open(&mut state, window);
        (window, group, label, button)
    };
    ui.verify_events(false, false, 500, 500);

    let mut state = ui.lock();
    state.set_caption(label, "B");
    for id in [label, group, window] {
        assert!(state.base(id).unwrap().is_self_dirty());
    }
    drop(state);
    ui.verify_events(false, false, 500, 500);

    // A button paints its whole face, so only the button itself redraws.
    let mut state = ui.lock();
    state.set_caption(button, "Go");
    assert!(state.base(button).unwrap().is_self_dirty());
    assert!(!state.base(window).unwrap().is_self_dirty());
}

#[test]
fn test_shorter_caption_is_drawn_over_repainted_background() {
    let backend = MockRenderer::new().with_font("sans.ttf");
    let log = backend.log();
    let config = ControllerConfig::default().with_default_font("sans.ttf");
    let ui = Controller::init(Box::new(backend), config);
    let label = {
        let mut state = ui.lock();
        let window = Window::create(&mut state, 0, 0, 300, 200, "Host");
        let label = Label::create(&mut state, Some(window), WidgetDesc::new(4, 4, 120, 12).caption("Long old caption"));
        Window::open(&mut state, window);
        label
    };
    ui.verify_events(false, false, 500, 500);

    log.clear();
    ui.lock().set_caption(label, "B");
    ui.verify_events(false, false, 500, 500);
    let draws: Vec<RenderCall> = log.calls().into_iter().filter(RenderCall::is_draw).collect();
    let fill = draws
        .iter()
        .position(|call| matches!(call, RenderCall::FillRectangle { .. }));
    let text = draws
        .iter()
        .position(|call| matches!(call, RenderCall::Text { text, .. } if text == "B"));
    assert!(fill.is_some() && text.is_some());
    assert!(fill < text);
}

#[test]
fn test_root_label_clears_its_surface() {
    let (ui, log) = controller();
    let label = {
        let mut state = ui.lock();
        Label::create(&mut state, None, WidgetDesc::new(0, 0, 80, 12).caption("first"))
    };
    ui.verify_events(false, false, 500, 500);

    log.clear();
    ui.lock().set_caption(label, "second");
    ui.verify_events(false, false, 500, 500);
    assert!(log.calls().iter().any(|call| matches!(call, RenderCall::Clear { .. })));
}

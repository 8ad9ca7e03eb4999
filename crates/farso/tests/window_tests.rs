//! Window focus, dragging and closing.

use farso::widgets::Window;
use farso::{Controller, ControllerConfig, EventType, NodeId, Point};
use farso_test_utils::{CallLog, MockRenderer};

fn controller() -> (Controller, CallLog) {
    farso_core::logging::try_init();
    let backend = MockRenderer::new();
    let log = backend.log();
    (Controller::init(Box::new(backend), ControllerConfig::default()), log)
}

fn open_window(ui: &Controller, x: i32, y: i32, width: i32, height: i32) -> NodeId {
    let mut state = ui.lock();
    let window = Window::create(&mut state, x, y, width, height, "Window");
    Window::open(&mut state, window);
    window
}

#[test]
fn test_new_window_is_hidden_until_opened() {
    let (ui, _log) = controller();
    let mut state = ui.lock();
    let window = Window::create(&mut state, 100, 100, 300, 200, "Hidden");
    assert!(!state.base(window).unwrap().is_visible());
    assert_eq!(state.active_widget(), None);

    Window::open(&mut state, window);
    assert!(state.base(window).unwrap().is_visible());
    assert!(state.widget::<Window>(window).unwrap().is_open());
    assert_eq!(state.active_widget(), Some(window));
}

#[test]
fn test_drag_moves_window_and_renderer() {
    let (ui, log) = controller();
    let window = open_window(&ui, 100, 100, 300, 200);

    assert!(ui.verify_events(true, false, 150, 105));
    assert!(ui.last_event().is(window, EventType::WindowMoveInit));

    assert!(ui.verify_events(true, false, 160, 105));
    assert!(ui.last_event().is(window, EventType::WindowMoving));
    {
        let state = ui.lock();
        let base = state.base(window).unwrap();
        assert_eq!((base.x(), base.y()), (110, 100));
        assert!(state.widget::<Window>(window).unwrap().is_dragging());
    }
    // The window renderer is serial 1, after the cursor.
    assert_eq!(log.last_position(1), Some(Point::new(110, 100)));

    assert!(ui.verify_events(false, false, 160, 105));
    assert!(ui.last_event().is(window, EventType::WindowMoveEnd));
    assert!(!ui.lock().widget::<Window>(window).unwrap().is_dragging());
}

#[test]
fn test_immovable_window_does_not_drag() {
    let (ui, _log) = controller();
    let window = open_window(&ui, 100, 100, 300, 200);
    Window::set_movable(&mut ui.lock(), window, false);

    assert!(!ui.verify_events(true, false, 150, 105));
    ui.verify_events(true, false, 170, 120);
    let state = ui.lock();
    assert_eq!(state.base(window).unwrap().x(), 100);
}

#[test]
fn test_click_activates_window_underneath() {
    let (ui, _log) = controller();
    let a = open_window(&ui, 100, 100, 300, 200);
    let b = open_window(&ui, 500, 100, 200, 200);
    assert_eq!(ui.lock().active_widget(), Some(b));

    assert!(ui.verify_events(true, false, 150, 200));
    assert!(ui.last_event().is(a, EventType::WindowClicked));
    assert!(ui.verify_events(false, false, 150, 200));
    assert!(ui.last_event().is(a, EventType::WindowActivated));

    {
        let state = ui.lock();
        assert_eq!(state.active_widget(), Some(a));
        assert!(state.base(a).unwrap().is_active());
        assert!(!state.base(b).unwrap().is_active());
    }

    // Z-order follows focus at the next pass.
    ui.verify_events(false, false, 150, 200);
    let state = ui.lock();
    assert_eq!(state.roots()[0], a);
    let front = state.render_queue().order()[0];
    assert_eq!(state.render_queue().owner(front), Some(a));
}

#[test]
fn test_press_outside_active_window_reaches_nothing_else() {
    let (ui, _log) = controller();
    let a = open_window(&ui, 100, 100, 300, 200);
    let b = open_window(&ui, 120, 120, 300, 200);
    // `b` is active and covers the point, `a` is underneath it.
    assert!(!ui.verify_events(true, false, 300, 250));
    assert!(!ui.verify_events(false, false, 300, 250));
    let state = ui.lock();
    assert_eq!(state.active_widget(), Some(b));
    assert!(!state.base(a).unwrap().is_active());
}

#[test]
fn test_press_dragged_into_inactive_window_does_not_activate() {
    let (ui, _log) = controller();
    let a = open_window(&ui, 100, 100, 300, 200);
    let b = open_window(&ui, 500, 100, 200, 200);
    ui.set_active_widget(Some(a));

    // Pressed on empty screen, then dragged into `b` and released there.
    assert!(!ui.verify_events(false, false, 50, 50));
    assert!(!ui.verify_events(true, false, 50, 50));
    assert!(!ui.verify_events(true, false, 550, 150));
    assert!(!ui.verify_events(false, false, 550, 150));

    let state = ui.lock();
    assert_eq!(state.active_widget(), Some(a));
    assert!(!state.base(b).unwrap().is_active());
}

#[test]
fn test_press_made_inside_inactive_window_still_activates() {
    let (ui, _log) = controller();
    let a = open_window(&ui, 100, 100, 300, 200);
    let b = open_window(&ui, 500, 100, 200, 200);
    ui.set_active_widget(Some(a));
    ui.verify_events(false, false, 550, 150);

    assert!(ui.verify_events(true, false, 550, 150));
    assert!(ui.last_event().is(b, EventType::WindowClicked));
    // Held frames after the press are not new presses.
    assert!(!ui.verify_events(true, false, 560, 150));
    assert!(ui.verify_events(false, false, 560, 150));
    assert!(ui.last_event().is(b, EventType::WindowActivated));
}

#[test]
fn test_close_button_closes_window() {
    let (ui, log) = controller();
    let window = open_window(&ui, 100, 100, 300, 200);
    let button = ui
        .lock()
        .widget::<Window>(window)
        .and_then(|w| w.close_button())
        .unwrap();

    // Close button sits at (283..=294, 4..=15) inside the window.
    assert!(ui.verify_events(true, false, 388, 110));
    assert!(ui.last_event().is(button, EventType::ButtonPress));
    assert!(ui.verify_events(false, false, 388, 110));
    assert!(ui.last_event().is(window, EventType::WindowWillClose));
    assert!(ui.lock().base(window).is_some());

    ui.verify_events(false, false, 388, 110);
    let state = ui.lock();
    assert!(state.base(window).is_none());
    assert!(state.base(button).is_none());
    assert_eq!(state.active_widget(), None);
    assert_eq!(log.dropped(), vec![1]);
}

#[test]
fn test_unclosable_window_hides_close_button() {
    let (ui, _log) = controller();
    let window = open_window(&ui, 100, 100, 300, 200);
    let mut state = ui.lock();
    Window::set_closable(&mut state, window, false);
    let button = state.widget::<Window>(window).and_then(|w| w.close_button()).unwrap();
    assert!(!state.base(button).unwrap().is_visible());
    drop(state);

    // Pressing where the button was starts a drag instead.
    assert!(ui.verify_events(true, false, 388, 110));
    assert!(ui.last_event().is(window, EventType::WindowMoveInit));
}

#[test]
fn test_close_without_event() {
    let (ui, _log) = controller();
    let window = open_window(&ui, 100, 100, 300, 200);
    Window::close(&mut ui.lock(), window);
    assert!(!ui.verify_events(false, false, 0, 0));
    assert!(ui.lock().base(window).is_none());
}

//! Loading, swapping and drawing with skins from disk.

use farso::skin::SkinElementType;
use farso::widgets::{Button, Window};
use farso::{Controller, ControllerConfig, Rect, WidgetDesc};
use farso_test_utils::{CallLog, MockRenderer, RenderCall};
use std::fs;
use std::path::{Path, PathBuf};

const SKIN: &str = "\
image = atlas.png
font = sans.ttf

[button_enabled]
background = 0,0,7,7

[window]
top_left = 0,8,3,11
top = 4,8,7,31
background = 8,8,15,15
";

fn write_skin(dir: &Path, source: &str) -> PathBuf {
    fs::write(dir.join("atlas.png"), b"png").unwrap();
    fs::write(dir.join("sans.ttf"), b"ttf").unwrap();
    let path = dir.join("clean.skin");
    fs::write(&path, source).unwrap();
    path
}

fn controller() -> (Controller, CallLog) {
    let backend = MockRenderer::new();
    let log = backend.log();
    (Controller::init(Box::new(backend), ControllerConfig::default()), log)
}

#[test]
fn test_skin_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_skin(dir.path(), SKIN);
    let backend = MockRenderer::new();
    let log = backend.log();
    let ui = Controller::init(Box::new(backend), ControllerConfig::default().with_skin(&path));

    let state = ui.lock();
    let skin = state.skin().unwrap();
    assert_eq!(skin.path(), path.as_path());
    assert!(skin.atlas().is_some());
    assert!(skin.element(SkinElementType::ButtonEnabled).is_some());
    assert!(log.calls().contains(&RenderCall::LoadImage {
        path: dir.path().join("atlas.png")
    }));
    assert!(state.fonts().default_font().is_some());
}

#[test]
fn test_skinned_widgets_blit_from_atlas() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_skin(dir.path(), SKIN);
    let (ui, log) = controller();
    assert!(ui.load_skin(&path));
    {
        let mut state = ui.lock();
        Button::create(&mut state, None, WidgetDesc::new(0, 0, 40, 20).caption("Go"));
    }

    ui.verify_events(false, false, 500, 500);
    assert_eq!(log.count(|c| matches!(c, RenderCall::FillRectangle { .. })), 0);
    assert!(log.count(|c| matches!(c, RenderCall::Blit { .. })) > 0);
    assert!(log.calls().iter().any(|call| matches!(
        call,
        RenderCall::Text { text, .. } if text == "Go"
    )));
}

#[test]
fn test_skin_defines_window_body() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_skin(dir.path(), SKIN);
    let (ui, _log) = controller();
    assert!(ui.load_skin(&path));

    let mut state = ui.lock();
    let window = Window::create(&mut state, 0, 0, 200, 100, "Skinned");
    let body = state.tree().body(window, state.skin());
    // The title strip is 24 pixels high in the atlas.
    assert_eq!(body.y1, 24);
    let title = state
        .widget::<Window>(window)
        .unwrap()
        .title_bar(Rect::from_size(0, 0, 200, 100), state.skin());
    assert_eq!(title.y2, 23);
}

#[test]
fn test_missing_skin_falls_back_and_redraws() {
    let (ui, _log) = controller();
    let button = {
        let mut state = ui.lock();
        Button::create(&mut state, None, WidgetDesc::new(0, 0, 40, 20))
    };
    ui.verify_events(false, false, 500, 500);
    assert!(!ui.lock().tree().is_dirty(button));

    assert!(!ui.load_skin("no/such/dir/missing.skin"));
    let state = ui.lock();
    assert!(state.skin().is_none());
    assert!(state.tree().is_dirty(button));
}

#[test]
fn test_malformed_skin_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_skin(dir.path(), "[window\ntop = 0,0,1,1\n");
    let (ui, _log) = controller();
    assert!(!ui.load_skin(&path));
    assert!(ui.lock().skin().is_none());
}

#[test]
fn test_missing_atlas_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lonely.skin");
    fs::write(&path, "image = nowhere.png\n").unwrap();
    let (ui, _log) = controller();
    assert!(!ui.load_skin(&path));
}

#[test]
fn test_swapping_skin_redraws_everything() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_skin(dir.path(), SKIN);
    let (ui, _log) = controller();
    let button = {
        let mut state = ui.lock();
        Button::create(&mut state, None, WidgetDesc::new(0, 0, 40, 20))
    };
    ui.verify_events(false, false, 500, 500);

    assert!(ui.load_skin(&path));
    assert!(ui.lock().tree().is_dirty(button));
    ui.verify_events(false, false, 500, 500);

    let mut state = ui.lock();
    state.unload_skin();
    assert!(state.skin().is_none());
    assert!(state.tree().is_dirty(button));
}

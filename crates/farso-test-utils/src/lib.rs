//! Test utilities for the Farso widget toolkit.
//!
//! The main component is a recording backend: [`MockRenderer`] implements
//! every backend trait of `farso::renderer` without touching pixels, and
//! writes what the controller asked for into a shared [`CallLog`].
//!
//! # Example
//!
//! ```rust
//! use farso::{Controller, ControllerConfig};
//! use farso_test_utils::{MockRenderer, RenderCall};
//!
//! let backend = MockRenderer::new();
//! let log = backend.log();
//! let ui = Controller::init(Box::new(backend), ControllerConfig::default());
//!
//! ui.verify_events(false, false, 0, 0);
//! assert_eq!(log.count(|call| matches!(call, RenderCall::Enter2d)), 1);
//! ui.finish();
//! ```
//!
//! # Design
//!
//! Mocks record through `&mut self` methods of the backend traits, but the
//! log must stay readable after the backend moved into the controller. The
//! log is therefore an `Arc<Mutex<_>>` shared by every mock object.

pub mod mock_render;

pub use mock_render::*;

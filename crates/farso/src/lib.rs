//! Farso - retained-mode widget toolkit for real-time applications
//!
//! Farso overlays interactive UI on top of a rendering loop it does not own:
//! - A widget ownership tree with explicit positions and container anchoring
//! - Per-frame translation of raw pointer samples into semantic events
//! - Dirty tracking, so only what changed is redrawn
//! - Windows with focus, z-order and dragging
//! - Atlas backed skins
//!
//! Pixels are the backend's business: it implements the traits in
//! [`renderer`] and [`font`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! # use farso::{Controller, ControllerConfig, Renderer};
//! # use farso::widgets::{CheckBox, Window};
//! # fn example(backend: Box<dyn Renderer>) {
//! let ui = Controller::init(backend, ControllerConfig::default().with_skin("skins/clean.skin"));
//! {
//!     let mut state = ui.lock();
//!     let window = Window::create(&mut state, 100, 100, 300, 200, "Settings");
//!     CheckBox::create(&mut state, Some(window), 10, 10);
//!     Window::open(&mut state, window);
//! }
//!
//! // Once per frame, with the sampled pointer state:
//! // let produced = ui.verify_events(left, right, x, y);
//! // match ui.last_event().kind { ... }
//! # ui.finish();
//! # }
//! ```

pub mod config;
pub mod context;
pub mod controller;
pub mod cursor;
pub mod error;
pub mod event;
pub mod font;
pub mod render_queue;
pub mod renderer;
pub mod skin;
mod stage;
pub mod tree;
pub mod widget;
pub mod widgets;

pub use config::ControllerConfig;
pub use context::{DrawContext, TreatContext};
pub use controller::{Controller, ControllerState};
pub use cursor::{Cursor, tip_position};
pub use error::{Error, Result};
pub use event::{Event, EventType};
pub use font::{Font, FontAlignment, FontManager};
pub use render_queue::{RenderQueue, RendererId};
pub use renderer::{ControllerRendererJunction, Draw, Renderer, Surface, WidgetRenderer};
pub use skin::{Skin, SkinElement, SkinElementType};
pub use tree::{NodeId, WidgetTree};
pub use widget::{ContainerPlacement, PointerInput, Widget, WidgetBase, WidgetDesc, WidgetFlags, WidgetKind};

pub use farso_core::geometry::{Color, Point, Rect, Size};

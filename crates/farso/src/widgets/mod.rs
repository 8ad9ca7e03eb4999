//! The widgets the core ships.
//!
//! Each kind only implements the per-widget contract; look and placement
//! come from the skin, with a flat fallback look when no skin is loaded.

mod button;
mod checkbox;
mod container;
mod label;
mod window;

pub use button::Button;
pub use checkbox::{CHECKBOX_SIZE, CheckBox};
pub use container::Container;
pub use label::Label;
pub use window::{CLOSE_BUTTON_SIZE, TITLE_BAR_HEIGHT, WINDOW_BORDER, Window};

/// Colors used when the skin has no element for a widget.
pub(crate) mod fallback {
    use farso_core::geometry::Color;

    pub const WINDOW_BACKGROUND: Color = Color::rgb(48, 48, 52);
    pub const WINDOW_FRAME: Color = Color::rgb(20, 20, 22);
    pub const TITLE_ACTIVE: Color = Color::rgb(52, 92, 150);
    pub const TITLE_INACTIVE: Color = Color::rgb(80, 80, 86);
    pub const BUTTON_FACE: Color = Color::rgb(90, 90, 98);
    pub const BUTTON_OVER: Color = Color::rgb(110, 110, 120);
    pub const BUTTON_PRESSED: Color = Color::rgb(60, 60, 66);
    pub const BUTTON_DISABLED: Color = Color::rgb(70, 70, 70);
    pub const FRAME: Color = Color::rgb(30, 30, 30);
    pub const CHECK_MARK: Color = Color::rgb(230, 230, 230);
}

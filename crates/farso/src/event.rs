//! Semantic UI events produced by the per-frame dispatch.

use crate::tree::NodeId;

/// UI event types.
///
/// `None` is the normal state of most frames: nothing was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EventType {
    #[default]
    None,

    /// Left press inside an inactive window.
    WindowClicked,
    /// A window became the active widget through a click.
    WindowActivated,
    /// Left press on an active window's title bar started a drag.
    WindowMoveInit,
    /// The window follows the pointer while the drag is held.
    WindowMoving,
    /// The drag was released.
    WindowMoveEnd,
    /// The close button was released; the window is queued for removal.
    WindowWillClose,

    /// First frame of a press inside a button.
    ButtonPress,
    /// Following frames while the press is held inside the button.
    ButtonOnPress,
    /// The press was released inside the button.
    ButtonRelease,

    CheckBoxChecked,
    CheckBoxUnchecked,

    /// Reserved for behaviours outside this crate.
    Custom(u16),
}

/// The last dispatched event: who raised it and what it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Event {
    pub owner: Option<NodeId>,
    pub kind: EventType,
}

impl Event {
    pub const NONE: Event = Event {
        owner: None,
        kind: EventType::None,
    };

    pub fn new(owner: NodeId, kind: EventType) -> Self {
        Self {
            owner: Some(owner),
            kind,
        }
    }

    pub fn is_none(&self) -> bool {
        self.kind == EventType::None
    }

    /// True when `owner` raised an event of `kind`.
    pub fn is(&self, owner: NodeId, kind: EventType) -> bool {
        self.owner == Some(owner) && self.kind == kind
    }
}

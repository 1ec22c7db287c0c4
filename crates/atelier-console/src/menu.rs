//! Contextual action menu controller.
//!
//! # Design
//! - One controller owns the single open menu for the whole view. Opening
//!   from a second trigger replaces the first; there is never more than one
//!   menu visible.
//! - Placement is right-aligned with the trigger so the menu hugs the
//!   button in a right-justified actions column instead of overflowing the
//!   viewport. Coordinates are `top` from the viewport top and `right`
//!   from the viewport's right edge.
//! - Anchor geometry is captured once at open time. Scroll and resize
//!   invalidate it, so both close the menu rather than chase the trigger.

/// Vertical gap between the trigger's bottom edge and the menu, in pixels.
pub const MENU_GAP_PX: f64 = 4.0;

/// Viewport-relative bounding box of a menu trigger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorRect {
    /// Distance from the viewport top to the trigger's top edge.
    pub top: f64,
    /// Distance from the viewport top to the trigger's bottom edge.
    pub bottom: f64,
    /// Distance from the viewport left to the trigger's left edge.
    pub left: f64,
    /// Distance from the viewport left to the trigger's right edge.
    pub right: f64,
}

/// Fixed placement for the open menu.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MenuPosition {
    /// Offset from the viewport top.
    pub top: f64,
    /// Offset from the viewport's right edge.
    pub right: f64,
}

/// The currently open menu: which trigger owns it and where it sits.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuAnchor {
    /// Identifier of the trigger that opened the menu, usually an entity id.
    pub trigger_id: String,
    /// Computed fixed placement.
    pub position: MenuPosition,
}

/// Owns the open/closed state of the view's single contextual menu.
#[derive(Debug, Default)]
pub struct MenuController {
    open: Option<MenuAnchor>,
}

impl MenuController {
    /// A controller with no menu open.
    #[must_use]
    pub const fn new() -> Self {
        Self { open: None }
    }

    /// The open menu, if any.
    #[must_use]
    pub const fn open_menu(&self) -> Option<&MenuAnchor> {
        self.open.as_ref()
    }

    /// Whether the menu owned by `trigger_id` is the one currently open.
    #[must_use]
    pub fn is_open_for(&self, trigger_id: &str) -> bool {
        self.open
            .as_ref()
            .is_some_and(|anchor| anchor.trigger_id == trigger_id)
    }

    /// Open the menu for a trigger, replacing any menu already open.
    pub fn open(&mut self, trigger_id: &str, anchor: AnchorRect, viewport_width: f64) {
        let position = MenuPosition {
            top: anchor.bottom + MENU_GAP_PX,
            right: viewport_width - anchor.right,
        };
        self.open = Some(MenuAnchor {
            trigger_id: trigger_id.to_string(),
            position,
        });
    }

    /// Close the menu. A no-op when nothing is open.
    pub fn close(&mut self) {
        self.open = None;
    }

    /// Toggle the menu for a trigger.
    ///
    /// Closes when this trigger's menu is open; otherwise opens here, which
    /// also covers switching from another trigger's menu.
    pub fn toggle(&mut self, trigger_id: &str, anchor: AnchorRect, viewport_width: f64) {
        if self.is_open_for(trigger_id) {
            self.close();
        } else {
            self.open(trigger_id, anchor, viewport_width);
        }
    }

    /// A click landed outside the menu and its trigger.
    pub fn handle_outside_click(&mut self) {
        self.close();
    }

    /// The page scrolled; the captured anchor is stale.
    pub fn handle_scroll(&mut self) {
        self.close();
    }

    /// The viewport resized; the captured anchor is stale.
    pub fn handle_resize(&mut self) {
        self.close();
    }

    /// An item was selected. Returns the owning trigger id so the caller
    /// can dispatch the chosen action; the menu closes either way.
    pub fn select_item(&mut self) -> Option<String> {
        self.open.take().map(|anchor| anchor.trigger_id)
    }
}

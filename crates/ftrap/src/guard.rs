#![forbid(unsafe_code)]

//! Guard elements at the trap region boundaries.
//!
//! Guards are invisible, zero-size, tab-reachable placeholders rendered at
//! the leading and trailing edges of the protected region. Their presence
//! lets the engine observe "focus is about to leave the region" and
//! redirect it. A disabled trap keeps its guards in the tree but makes
//! them tab-unreachable, preserving structure and layout.

/// Marker attribute identifying guard nodes in the host tree.
pub const FOCUS_GUARD: &str = "data-focus-guard";

/// Tab index marking a guard as unreachable via tab navigation.
pub const UNREACHABLE: i32 = -1;

/// Which boundary a guard sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardEdge {
    /// Before the region, first in tab order.
    Leading,
    /// Before the region, directly adjacent to its first element.
    Nearest,
    /// After the region.
    Trailing,
}

/// One guard placeholder with its derived reachability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusGuard {
    pub edge: GuardEdge,
    pub tab_index: i32,
}

impl FocusGuard {
    /// Whether tab navigation can reach this guard.
    #[must_use]
    pub const fn is_reachable(&self) -> bool {
        self.tab_index >= 0
    }
}

/// Caller-requested guard suppression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GuardSuppression {
    /// Render all guards.
    #[default]
    None,
    /// Suppress only the trailing guard.
    Tail,
    /// Render no guards at all.
    All,
}

/// Derive the guard set for one render.
///
/// Not persisted state: recomputed from the disabled flag and suppression
/// request every time the trap is laid out.
#[must_use]
pub fn guard_rail(disabled: bool, suppression: GuardSuppression) -> Vec<FocusGuard> {
    if suppression == GuardSuppression::All {
        return Vec::new();
    }

    let index = |reachable_index: i32| {
        if disabled {
            UNREACHABLE
        } else {
            reachable_index
        }
    };

    let mut guards = vec![
        FocusGuard {
            edge: GuardEdge::Leading,
            tab_index: index(0),
        },
        FocusGuard {
            edge: GuardEdge::Nearest,
            tab_index: index(1),
        },
    ];

    if suppression != GuardSuppression::Tail {
        guards.push(FocusGuard {
            edge: GuardEdge::Trailing,
            tab_index: index(0),
        });
    }

    guards
}

// =========================================================================
// Tests
// =========================================================================

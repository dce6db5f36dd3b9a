#![forbid(unsafe_code)]

//! Focusable-node abstraction.
//!
//! The trap never inspects node internals. It only needs two capabilities:
//! ask a node whether it can currently receive focus, and tell it to take
//! focus. Everything else (tab order, visibility, ranking) belongs to the
//! focus engine behind the `ftrap` crate's engine trait.
//!
//! # Design Notes
//!
//! - Nodes are compared by *reference identity* (`Rc::ptr_eq`), never by
//!   value. A re-created node with identical content is a different node.
//! - `focus` returns `bool` rather than `Result`: a detached target is a
//!   silent no-op, matching standard focus-call semantics. There is nothing
//!   for a caller to recover from.

use std::rc::Rc;

/// Options applied to a focus call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FocusOptions {
    /// Focus the target without scrolling it into view.
    pub prevent_scroll: bool,
}

impl FocusOptions {
    /// Create default focus options.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            prevent_scroll: false,
        }
    }

    /// Set the prevent-scroll flag.
    #[must_use]
    pub const fn with_prevent_scroll(mut self, prevent_scroll: bool) -> Self {
        self.prevent_scroll = prevent_scroll;
        self
    }
}

/// A node in the host UI tree that can receive focus.
pub trait Focusable {
    /// Move focus to this node.
    ///
    /// Returns `false` when the node is detached or otherwise cannot take
    /// focus; callers treat that as a silent no-op.
    fn focus(&self, options: Option<&FocusOptions>) -> bool;

    /// Whether the node currently supports being focused.
    fn is_focusable(&self) -> bool;
}

/// Shared handle to a focusable node.
pub type NodeRef = Rc<dyn Focusable>;

/// Compare two optional node handles by reference identity.
#[must_use]
pub fn same_node(a: Option<&NodeRef>, b: Option<&NodeRef>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        _ => false,
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ProbeNode;

    #[test]
    fn same_node_identity_not_value() {
        let a = ProbeNode::named("a").handle();
        let b = ProbeNode::named("a").handle();

        assert!(same_node(Some(&a), Some(&a)));
        assert!(!same_node(Some(&a), Some(&b)));
    }

    #[test]
    fn same_node_none_cases() {
        let a = ProbeNode::named("a").handle();

        assert!(same_node(None, None));
        assert!(!same_node(Some(&a), None));
        assert!(!same_node(None, Some(&a)));
    }

    #[test]
    fn same_node_clone_is_same() {
        let a = ProbeNode::named("a").handle();
        let a2 = a.clone();
        assert!(same_node(Some(&a), Some(&a2)));
    }

    #[test]
    fn focus_options_builder() {
        let opts = FocusOptions::new().with_prevent_scroll(true);
        assert!(opts.prevent_scroll);
        assert!(!FocusOptions::default().prevent_scroll);
    }
}

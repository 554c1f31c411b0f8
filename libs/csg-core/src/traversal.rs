//! # Traversal Framework (C5)
//!
//! A generic prefix/postfix walker over the node tree. The traverser knows
//! nothing about node semantics; a [`Visitor`] implementation (the
//! geometry evaluator, the CSG tree builder) supplies that by inspecting
//! `node.kind` and deciding how the per-node [`TraversalState`] should be
//! updated for descendants.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use glam::DMat4;
use rayon::prelude::*;

use crate::node::Node;

/// What the traverser should do after a visitor call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Proceed as normal (descend into children after prefix; return
    /// normally after postfix).
    Continue,
    /// Skip this node's children and its postfix call. Only meaningful as
    /// a prefix return value.
    Prune,
    /// Unwind the entire traversal immediately.
    Abort,
}

/// Per-frame mutable state threaded through the traversal, copied (and
/// optionally updated by the visitor) from parent to child.
#[derive(Debug, Clone)]
pub struct TraversalState {
    /// Accumulated affine transform from the root to this node.
    pub transform: DMat4,
    /// Accumulated color, if any ancestor (or this node) set one.
    pub color: Option<[f32; 4]>,
    /// Index of the parent node, or `None` at the root.
    pub parent_index: Option<u32>,
    /// Number of children the current node has (set before the prefix
    /// call so a visitor can special-case leaves or single-child nodes).
    pub child_count: usize,
    /// True inside a `Render` subtree: prefer kernel-backed evaluation
    /// over the 2D clipping library even for geometry that could be
    /// represented either way.
    pub prefer_kernel: bool,
}

impl Default for TraversalState {
    fn default() -> Self {
        Self {
            transform: DMat4::IDENTITY,
            color: None,
            parent_index: None,
            child_count: 0,
            prefer_kernel: false,
        }
    }
}

/// A shared, cooperative cancellation flag. Cloning shares the same
/// underlying flag; [`CancellationToken::cancel`] from any clone is
/// observed by every traversal checking [`CancellationToken::is_cancelled`].
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Builds a fresh, not-yet-cancelled token.
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Requests cancellation; observed by in-flight and future checks.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// True once [`Self::cancel`] has been called on this token or a clone.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Implemented by anything that wants to walk the node tree.
///
/// `prefix` runs top-down and returns both a [`Control`] and the state
/// descendants should see (typically `state` with this node's own effect
/// folded in — e.g. a composed transform). `postfix` runs bottom-up, after
/// every descendant's postfix has completed, and does the actual geometry
/// computation in the evaluator's case.
pub trait Visitor {
    /// Prefix (top-down) call.
    fn prefix(&self, state: TraversalState, node: &Node) -> (Control, TraversalState);

    /// Postfix (bottom-up) call.
    fn postfix(&self, state: &TraversalState, node: &Node) -> Control;

    /// Whether this visitor may be invoked concurrently for sibling
    /// subtrees. Required before [`traverse_parallel`] will actually
    /// parallelize; a `false` answer causes callers to fall back to
    /// [`traverse`].
    fn is_thread_safe(&self) -> bool {
        false
    }
}

fn child_frame(parent_state: &TraversalState, node: &Node) -> TraversalState {
    let mut state = parent_state.clone();
    state.parent_index = Some(node.index);
    state.child_count = node.children.len();
    state
}

/// Walks `node` and its descendants on the calling thread. At each node:
/// builds a fresh state, calls `visitor.prefix`, recurses into children in
/// declaration order unless pruned or aborted, then calls
/// `visitor.postfix`.
pub fn traverse<V: Visitor>(
    visitor: &V,
    node: &Node,
    parent_state: &TraversalState,
    cancel: &CancellationToken,
) -> Control {
    if cancel.is_cancelled() {
        return Control::Abort;
    }
    let state = child_frame(parent_state, node);
    let (control, state) = visitor.prefix(state, node);
    match control {
        Control::Abort => return Control::Abort,
        Control::Prune => return Control::Continue,
        Control::Continue => {}
    }
    for child in &node.children {
        if traverse(visitor, child, &state, cancel) == Control::Abort {
            return Control::Abort;
        }
    }
    visitor.postfix(&state, node)
}

/// Walks `node` and its descendants, dispatching each node's postfix work
/// to rayon's work-stealing pool once every descendant's postfix has
/// completed (so `postfix(X)` always happens-after `postfix(Y)` for every
/// descendant `Y` of `X`, matching the sequential traversal's ordering
/// guarantee).
///
/// Prefix calls still run serially, top-down, on the calling thread — they
/// build the state chain each child depends on, so they cannot be
/// parallelized without changing the contract. Falls back to [`traverse`]
/// if `visitor.is_thread_safe()` is false.
pub fn traverse_parallel<V>(
    visitor: &V,
    node: &Node,
    parent_state: &TraversalState,
    cancel: &CancellationToken,
) -> Control
where
    V: Visitor + Sync,
{
    if !visitor.is_thread_safe() {
        return traverse(visitor, node, parent_state, cancel);
    }
    if cancel.is_cancelled() {
        return Control::Abort;
    }
    let state = child_frame(parent_state, node);
    let (control, state) = visitor.prefix(state, node);
    match control {
        Control::Abort => return Control::Abort,
        Control::Prune => return Control::Continue,
        Control::Continue => {}
    }

    let aborted = AtomicBool::new(false);
    node.children.par_iter().for_each(|child| {
        if cancel.is_cancelled() || aborted.load(Ordering::Relaxed) {
            return;
        }
        if traverse_parallel(visitor, child, &state, cancel) == Control::Abort {
            aborted.store(true, Ordering::Relaxed);
        }
    });
    if aborted.load(Ordering::Relaxed) {
        return Control::Abort;
    }
    visitor.postfix(&state, node)
}

use crate::{node::NodeId, tree::EvaluationTree};

/// The state of a single attempt at matching a data instance against an [`EvaluationTree`].
///
/// The tree itself is never modified: each context works on a private copy of the tree's
/// counters, which means that any number of contexts can share the same tree, including across
/// threads. A context must however be driven by one caller at a time.
///
/// The counter of a node is the number of its children that are still undecided (`1` for a
/// predicate that has not been evaluated), `0` once it was decided `true` and `-1` once it was
/// decided `false`.
///
/// The session is an opaque value handed to the subscriptions when they get suspended.
#[derive(Debug)]
pub struct EvaluationContext<'t, S = ()> {
    tree: &'t EvaluationTree<S>,
    counters: Vec<i32>,
    session: S,
}

impl<'t, S> EvaluationContext<'t, S> {
    pub fn new(tree: &'t EvaluationTree<S>) -> Self
    where
        S: Default,
    {
        Self::with_session(tree, S::default())
    }

    pub fn with_session(tree: &'t EvaluationTree<S>, session: S) -> Self {
        Self {
            tree,
            counters: tree.initial_counters().to_vec(),
            session,
        }
    }

    #[inline]
    pub const fn tree(&self) -> &'t EvaluationTree<S> {
        self.tree
    }

    #[inline]
    pub fn counters(&self) -> &[i32] {
        &self.counters
    }

    #[inline]
    pub const fn session(&self) -> &S {
        &self.session
    }

    #[inline]
    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    /// Whether the outcome of the match is known; no further decision may be reported once it
    /// is.
    #[inline]
    pub fn is_decided(&self) -> bool {
        self.counters[0] <= 0
    }

    /// The outcome of the match, if it is known.
    #[inline]
    pub fn verdict(&self) -> Option<bool> {
        match self.counters[0] {
            0 => Some(true),
            counter if counter < 0 => Some(false),
            _ => None,
        }
    }

    /// Whether the instance matched. An undecided evaluation does not match.
    #[inline]
    pub fn is_matching(&self) -> bool {
        self.verdict().unwrap_or(false)
    }

    /// Report the raw result of the predicate `leaf`.
    ///
    /// See [`crate::PredicateNode::report_decision()`].
    ///
    /// # Panics
    ///
    /// Panics if `leaf` is not a predicate node.
    pub fn report(&mut self, leaf: NodeId, value: bool) -> Option<bool> {
        let tree = self.tree;
        match tree.node(leaf).as_predicate() {
            Some(predicate) => predicate.report_decision(value, self),
            None => unreachable!("node {leaf} is not a predicate; this is a bug"),
        }
    }

    /// Restore the initial counters so that the context can be used to match another instance.
    pub fn reset(&mut self) {
        self.counters.copy_from_slice(self.tree.initial_counters());
    }

    #[inline]
    pub(crate) fn counter(&self, id: NodeId) -> i32 {
        self.counters[id]
    }

    #[inline]
    pub(crate) fn set_counter(&mut self, id: NodeId, value: i32) {
        self.counters[id] = value;
    }

    #[inline]
    pub(crate) fn decrement(&mut self, id: NodeId) -> i32 {
        self.counters[id] -= 1;
        self.counters[id]
    }
}

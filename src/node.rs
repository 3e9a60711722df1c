use crate::{
    context::EvaluationContext,
    predicates::Predicate,
    schema::AttributePath,
    subscription::{AttributeDispatcher, Subscription},
};
use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use std::{
    fmt::{Display, Formatter},
    ops::Range,
    ptr,
    sync::Weak,
};
use tracing::trace;

pub type NodeId = usize;

/// Counter of a node that has been decided to be `true`.
pub(crate) const DECIDED_TRUE: i32 = 0;
/// Counter of a node that has been decided to be `false`.
pub(crate) const DECIDED_FALSE: i32 = -1;
/// Counter of a predicate that has not been evaluated yet.
pub(crate) const UNDECIDED_PREDICATE: i32 = 1;

#[inline]
pub(crate) const fn state(value: bool) -> i32 {
    if value {
        DECIDED_TRUE
    } else {
        DECIDED_FALSE
    }
}

/// A node of an [`crate::EvaluationTree`].
///
/// Nodes are laid out in preorder: a node occupies the slot `start` and its whole subtree
/// occupies the contiguous slots `start..end`. The parent is referred to by its position only.
#[derive(Debug)]
pub struct EvaluationNode<S> {
    parent: Option<NodeId>,
    start: NodeId,
    end: NodeId,
    kind: NodeKind<S>,
}

#[derive(Debug)]
pub enum NodeKind<S> {
    And,
    Or,
    Predicate(PredicateNode<S>),
}

impl<S> EvaluationNode<S> {
    pub(crate) fn new(parent: Option<NodeId>, start: NodeId, kind: NodeKind<S>) -> Self {
        Self {
            parent,
            start,
            end: start + 1,
            kind,
        }
    }

    #[inline]
    pub(crate) fn close(&mut self, end: NodeId) {
        self.end = end;
    }

    #[inline]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub const fn id(&self) -> NodeId {
        self.start
    }

    /// The slots of this node and of all its descendants.
    #[inline]
    pub const fn span(&self) -> Range<NodeId> {
        self.start..self.end
    }

    #[inline]
    pub const fn kind(&self) -> &NodeKind<S> {
        &self.kind
    }

    #[inline]
    pub const fn as_predicate(&self) -> Option<&PredicateNode<S>> {
        match &self.kind {
            NodeKind::Predicate(predicate) => Some(predicate),
            _ => None,
        }
    }

    /// Handle the decision reported by `child`, which is this node itself when this is a
    /// predicate.
    ///
    /// Returns the verdict of the whole tree if this call decided the root.
    pub(crate) fn handle_child_value(
        &self,
        child: NodeId,
        value: bool,
        context: &mut EvaluationContext<'_, S>,
    ) -> Option<bool> {
        match &self.kind {
            NodeKind::And => {
                self.ensure_undecided(context);
                if !value {
                    return self.decide(false, context);
                }
                if context.decrement(self.start) == 0 {
                    return self.decide(true, context);
                }
                context.tree().node(child).set_state(true, context);
                None
            }
            NodeKind::Or => {
                self.ensure_undecided(context);
                if value {
                    return self.decide(true, context);
                }
                if context.decrement(self.start) == 0 {
                    return self.decide(false, context);
                }
                context.tree().node(child).set_state(false, context);
                None
            }
            NodeKind::Predicate(predicate) => {
                debug_assert_eq!(child, self.start);
                assert!(
                    !context.is_decided(),
                    "predicate node {} reported after the evaluation was decided; this is a bug",
                    self.start
                );
                let value = value != predicate.negated;
                trace!(node = self.start, value, "predicate decided");
                context.set_counter(self.start, state(value));
                match self.parent {
                    Some(parent) => {
                        context
                            .tree()
                            .node(parent)
                            .handle_child_value(self.start, value, context)
                    }
                    None => {
                        predicate.suspend_subscription(context.session_mut());
                        Some(value)
                    }
                }
            }
        }
    }

    fn ensure_undecided(&self, context: &EvaluationContext<'_, S>) {
        assert!(
            context.counter(self.start) > 0 && !context.is_decided(),
            "node {} has already been decided; this is a bug",
            self.start
        );
    }

    fn decide(&self, value: bool, context: &mut EvaluationContext<'_, S>) -> Option<bool> {
        trace!(node = self.start, value, "node decided");
        self.set_state(value, context);
        match self.parent {
            Some(parent) => context
                .tree()
                .node(parent)
                .handle_child_value(self.start, value, context),
            None => Some(value),
        }
    }

    /// Force every predicate of this subtree that is still waiting for a value to `value`,
    /// suspend their subscriptions and mark this node as decided.
    pub(crate) fn set_state(&self, value: bool, context: &mut EvaluationContext<'_, S>) {
        let tree = context.tree();
        let state = state(value);
        for id in self.span() {
            if context.counter(id) == UNDECIDED_PREDICATE {
                context.set_counter(id, state);
                if let Some(predicate) = tree.node(id).as_predicate() {
                    predicate.suspend_subscription(context.session_mut());
                }
            }
        }
        context.set_counter(self.start, state);
    }
}

impl<S> Display for EvaluationNode<S> {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        match &self.kind {
            NodeKind::And => write!(formatter, "AND"),
            NodeKind::Or => write!(formatter, "OR"),
            NodeKind::Predicate(predicate) => write!(formatter, "{predicate}"),
        }
    }
}

/// A leaf of the evaluation tree: a [`Predicate`] applied to the value(s) of an attribute path.
#[derive(Debug)]
pub struct PredicateNode<S> {
    id: NodeId,
    predicate: Predicate,
    negated: bool,
    path: AttributePath,
    subscription: RwLock<Option<Weak<dyn Subscription<S>>>>,
}

impl<S> PredicateNode<S> {
    pub(crate) fn new(
        id: NodeId,
        predicate: Predicate,
        negated: bool,
        path: AttributePath,
    ) -> Self {
        Self {
            id,
            predicate,
            negated,
            path,
            subscription: RwLock::new(None),
        }
    }

    #[inline]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub const fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    #[inline]
    pub const fn is_negated(&self) -> bool {
        self.negated
    }

    #[inline]
    pub const fn is_repeated(&self) -> bool {
        self.path.is_repeated()
    }

    #[inline]
    pub const fn path(&self) -> &AttributePath {
        &self.path
    }

    /// Whether this predicate already has a value in the given match attempt.
    #[inline]
    pub fn is_decided(&self, context: &EvaluationContext<'_, S>) -> bool {
        context.counter(self.id) <= 0
    }

    /// Report the raw result of the predicate for the instance being matched.
    ///
    /// The result is negated if needed and propagated towards the root. Returns the verdict of
    /// the whole tree if it got decided by this report.
    ///
    /// # Panics
    ///
    /// Panics if `context` is not a match attempt of the tree this predicate belongs to, if the
    /// evaluation has already been decided or if this report decides a node that was already
    /// decided. Callers are expected to check [`EvaluationContext::is_decided()`] (and
    /// [`PredicateNode::is_decided()`] for repeated attributes) before evaluating the predicate.
    pub fn report_decision(
        &self,
        value: bool,
        context: &mut EvaluationContext<'_, S>,
    ) -> Option<bool> {
        let tree = context.tree();
        let node = tree
            .nodes()
            .get(self.id)
            .filter(|node| node.as_predicate().is_some_and(|leaf| ptr::eq(leaf, self)));
        let Some(node) = node else {
            panic!(
                "predicate node {} reported into the match attempt of another tree; this is a bug",
                self.id
            );
        };
        node.handle_child_value(self.id, value, context)
    }

    /// Register interest in the values of this predicate's attribute path.
    ///
    /// # Panics
    ///
    /// Panics if the predicate is already subscribed.
    pub fn subscribe<D>(&self, dispatcher: &mut D, callback: D::Callback)
    where
        D: AttributeDispatcher<S>,
    {
        let slot = self.subscription.upgradable_read();
        assert!(
            slot.is_none(),
            "predicate node {} is already subscribed; this is a bug",
            self.id
        );
        let subscription = dispatcher.subscribe(self, callback);
        *RwLockUpgradableReadGuard::upgrade(slot) = Some(subscription);
    }

    /// Cancel the subscription, if any.
    pub fn unsubscribe(&self) {
        let subscription = self.subscription.write().take();
        if let Some(subscription) = subscription.as_ref().and_then(Weak::upgrade) {
            subscription.cancel();
        }
    }

    #[inline]
    pub fn is_subscribed(&self) -> bool {
        self.subscription.read().is_some()
    }

    /// Ask the subscription to stop delivering values for the match attempt of `session`.
    ///
    /// The subscription is kept since other match attempts still need it.
    pub fn suspend_subscription(&self, session: &mut S) {
        let subscription = self.subscription.read().as_ref().and_then(Weak::upgrade);
        if let Some(subscription) = subscription {
            trace!(node = self.id, "suspending subscription");
            subscription.suspend(session);
        }
    }
}

/// A dropped predicate cancels its subscription, so that dispatchers can release it.
impl<S> Drop for PredicateNode<S> {
    fn drop(&mut self) {
        let subscription = self.subscription.get_mut().take();
        if let Some(subscription) = subscription.as_ref().and_then(Weak::upgrade) {
            subscription.cancel();
        }
    }
}

impl<S> Display for PredicateNode<S> {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        if self.negated {
            write!(formatter, "NOT ")?;
        }
        write!(formatter, "⟨{}, {}⟩", self.path, self.predicate)
    }
}

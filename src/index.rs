use crate::{
    context::EvaluationContext,
    node::{EvaluationNode, NodeId, PredicateNode},
    schema::AttributePath,
    session::MatchSession,
    subscription::{AttributeDispatcher, Subscription},
    values::Value,
};
use slab::Slab;
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Weak,
    },
};
use tracing::{debug, trace};

/// A minimal in-process attribute dispatcher.
///
/// Evaluation trees subscribe their predicates to the index under a filter key `C`. The values of
/// a data instance are then handed to [`PredicateIndex::dispatch()`] one attribute at a time; the
/// index evaluates the predicates interested in that attribute and reports their results to the
/// match attempt.
///
/// The index does not walk object graphs itself: whoever inspects the data instance is
/// responsible for translating the attribute paths and for dispatching every value of a repeated
/// attribute.
#[derive(Debug)]
pub struct PredicateIndex<C> {
    subscriptions: Slab<Entry<C>>,
    by_paths: HashMap<AttributePath, Vec<usize>>,
}

#[derive(Debug)]
struct Entry<C> {
    filter: C,
    leaf: NodeId,
    // Address of the subscribed predicate, which stays put for as long as its tree lives.
    address: usize,
    path: AttributePath,
    subscription: Arc<IndexedSubscription>,
}

/// The handle given to a predicate subscribed to a [`PredicateIndex`].
#[derive(Debug)]
pub struct IndexedSubscription {
    key: usize,
    cancelled: AtomicBool,
}

impl IndexedSubscription {
    #[inline]
    pub fn key(&self) -> usize {
        self.key
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Subscription<MatchSession> for IndexedSubscription {
    fn suspend(&self, session: &mut MatchSession) {
        session.suspend(self.key);
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }
}

impl<C> Default for PredicateIndex<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> PredicateIndex<C> {
    pub fn new() -> Self {
        Self {
            subscriptions: Slab::new(),
            by_paths: HashMap::new(),
        }
    }

    /// The number of subscriptions held by the index, including the cancelled ones that have not
    /// been purged yet.
    #[inline]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Start a match attempt whose session is sized for the current subscriptions.
    pub fn session(&self) -> MatchSession {
        MatchSession::with_capacity(self.subscriptions.capacity())
    }

    /// Hand the `value` of the attribute at `path` (`None` when it is null) to the predicates of
    /// `filter`.
    ///
    /// Predicates that are suspended or already decided in this match attempt are skipped. A value
    /// that does not satisfy a predicate on a repeated attribute is ignored since another element
    /// of the collection may still satisfy it. Dispatching stops as soon as the match attempt is
    /// decided.
    ///
    /// Returns the verdict if this call decided the match attempt.
    ///
    /// # Panics
    ///
    /// Panics if `context` is not a match attempt of the tree subscribed under `filter`.
    pub fn dispatch(
        &self,
        filter: &C,
        context: &mut EvaluationContext<'_, MatchSession>,
        path: &AttributePath,
        value: Option<&Value>,
    ) -> Option<bool>
    where
        C: PartialEq,
    {
        let keys = self.by_paths.get(path)?;
        let tree = context.tree();
        for &key in keys {
            if context.is_decided() {
                break;
            }

            let entry = &self.subscriptions[key];
            if entry.filter != *filter
                || entry.subscription.is_cancelled()
                || context.session().is_suspended(key)
            {
                continue;
            }

            let leaf = tree
                .nodes()
                .get(entry.leaf)
                .and_then(EvaluationNode::as_predicate)
                .filter(|leaf| address(leaf) == entry.address);
            let Some(leaf) = leaf else {
                panic!(
                    "subscription {key} dispatched into the match attempt of another tree; \
                     this is a bug"
                );
            };
            if leaf.is_decided(context) {
                continue;
            }

            let matches = leaf.predicate().matches(value);
            trace!(key, leaf = entry.leaf, matches, "dispatched attribute value");
            if matches || !leaf.is_repeated() {
                if let Some(verdict) = leaf.report_decision(matches, context) {
                    return Some(verdict);
                }
            }
        }

        None
    }

    /// Drop the subscriptions that have been cancelled, including those of dropped trees.
    pub fn purge(&mut self) {
        let cancelled: Vec<_> = self
            .subscriptions
            .iter()
            .filter(|(_, entry)| entry.subscription.is_cancelled())
            .map(|(key, _)| key)
            .collect();

        for &key in &cancelled {
            let entry = self.subscriptions.remove(key);
            if let Some(keys) = self.by_paths.get_mut(&entry.path) {
                keys.retain(|other| *other != key);
                if keys.is_empty() {
                    self.by_paths.remove(&entry.path);
                }
            }
        }
        debug!(purged = cancelled.len(), remaining = self.len(), "purged predicate index");
    }
}

#[inline]
fn address(leaf: &PredicateNode<MatchSession>) -> usize {
    leaf as *const PredicateNode<MatchSession> as usize
}

impl<C> AttributeDispatcher<MatchSession> for PredicateIndex<C> {
    type Callback = C;

    fn subscribe(
        &mut self,
        leaf: &PredicateNode<MatchSession>,
        callback: Self::Callback,
    ) -> Weak<dyn Subscription<MatchSession>> {
        let vacant = self.subscriptions.vacant_entry();
        let key = vacant.key();
        let subscription = Arc::new(IndexedSubscription {
            key,
            cancelled: AtomicBool::new(false),
        });
        vacant.insert(Entry {
            filter: callback,
            leaf: leaf.id(),
            address: address(leaf),
            path: leaf.path().clone(),
            subscription: Arc::clone(&subscription),
        });
        self.by_paths
            .entry(leaf.path().clone())
            .or_default()
            .push(key);

        let subscription: Arc<dyn Subscription<MatchSession>> = subscription;
        Arc::downgrade(&subscription)
    }
}

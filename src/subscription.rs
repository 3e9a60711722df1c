use crate::node::PredicateNode;
use std::sync::Weak;

/// A predicate leaf's registered interest in the values of an attribute path.
///
/// Subscriptions are owned by whoever dispatches the attribute values; evaluation trees only keep
/// a [`Weak`] handle to them.
pub trait Subscription<S>: Send + Sync {
    /// Stop delivering values to the leaf for the match attempt identified by `session`.
    ///
    /// This must not destroy the subscription: other match attempts keep using it.
    fn suspend(&self, session: &mut S);

    /// Stop delivering values to the leaf for good.
    fn cancel(&self);
}

/// The component that walks data instances and feeds attribute values to predicate leaves.
pub trait AttributeDispatcher<S> {
    /// Identifies which filter the leaf belongs to when its values are dispatched.
    type Callback;

    fn subscribe(
        &mut self,
        leaf: &PredicateNode<S>,
        callback: Self::Callback,
    ) -> Weak<dyn Subscription<S>>;
}

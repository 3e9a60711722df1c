use crate::{
    node::{NodeId, PredicateNode},
    schema::{AttributeDefinition, AttributeTable},
    subscription::{AttributeDispatcher, Subscription},
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Weak,
};

pub mod ast {
    macro_rules! and {
        ($($child:expr),+ $(,)?) => {
            $crate::ast::BooleanExpr::And(vec![$($child),+])
        };
    }

    macro_rules! or {
        ($($child:expr),+ $(,)?) => {
            $crate::ast::BooleanExpr::Or(vec![$($child),+])
        };
    }

    macro_rules! not {
        ($child:expr) => {
            $crate::ast::BooleanExpr::not($child)
        };
    }

    macro_rules! equal {
        ($path:expr, $value:expr) => {
            $crate::ast::BooleanExpr::equal($path, $value)
        };
    }

    macro_rules! less {
        ($path:expr, $value:expr) => {
            $crate::ast::BooleanExpr::less($path, $value)
        };
    }

    macro_rules! less_or_equal {
        ($path:expr, $value:expr) => {
            $crate::ast::BooleanExpr::less_or_equal($path, $value)
        };
    }

    macro_rules! greater {
        ($path:expr, $value:expr) => {
            $crate::ast::BooleanExpr::greater($path, $value)
        };
    }

    macro_rules! greater_or_equal {
        ($path:expr, $value:expr) => {
            $crate::ast::BooleanExpr::greater_or_equal($path, $value)
        };
    }

    macro_rules! is_null {
        ($path:expr) => {
            $crate::ast::BooleanExpr::is_null($path)
        };
    }

    macro_rules! like {
        ($path:expr, $pattern:expr) => {
            $crate::ast::BooleanExpr::like($path, $pattern)
        };
        ($path:expr, $pattern:expr, $escape:expr) => {
            $crate::ast::BooleanExpr::Like {
                path: $path.to_owned(),
                pattern: $pattern.to_owned(),
                escape: Some($escape),
            }
        };
    }

    macro_rules! matches_regex {
        ($path:expr, $pattern:expr) => {
            $crate::ast::BooleanExpr::regex($path, $pattern)
        };
    }

    pub(crate) use and;
    pub(crate) use equal;
    pub(crate) use greater;
    pub(crate) use greater_or_equal;
    pub(crate) use is_null;
    pub(crate) use less;
    pub(crate) use less_or_equal;
    pub(crate) use like;
    pub(crate) use matches_regex;
    pub(crate) use not;
    pub(crate) use or;
}

/// A person with an address, some phone numbers and some aliases.
pub fn define_attributes() -> AttributeTable {
    AttributeTable::new(&[
        AttributeDefinition::scalar("age"),
        AttributeDefinition::embedded("address", &[AttributeDefinition::scalar("street")]),
        AttributeDefinition::repeated_embedded(
            "phone_numbers",
            &[AttributeDefinition::scalar("number")],
        ),
        AttributeDefinition::scalar("name"),
        AttributeDefinition::scalar("surname"),
        AttributeDefinition::repeated("aliases"),
    ])
    .unwrap()
}

/// A session that records the predicates whose subscription got suspended, in order.
pub type Suspended = Vec<NodeId>;

#[derive(Debug)]
struct RecordingSubscription {
    leaf: NodeId,
    cancelled: AtomicBool,
}

impl Subscription<Suspended> for RecordingSubscription {
    fn suspend(&self, session: &mut Suspended) {
        session.push(self.leaf);
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    subscriptions: Vec<Arc<RecordingSubscription>>,
}

impl RecordingDispatcher {
    pub fn cancelled(&self) -> usize {
        self.subscriptions
            .iter()
            .filter(|subscription| subscription.cancelled.load(Ordering::Relaxed))
            .count()
    }
}

impl AttributeDispatcher<Suspended> for RecordingDispatcher {
    type Callback = ();

    fn subscribe(
        &mut self,
        leaf: &PredicateNode<Suspended>,
        _: Self::Callback,
    ) -> Weak<dyn Subscription<Suspended>> {
        let subscription = Arc::new(RecordingSubscription {
            leaf: leaf.id(),
            cancelled: AtomicBool::new(false),
        });
        self.subscriptions.push(Arc::clone(&subscription));
        let subscription: Arc<dyn Subscription<Suspended>> = subscription;
        Arc::downgrade(&subscription)
    }
}

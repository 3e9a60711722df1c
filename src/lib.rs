//! An incremental evaluator for boolean filter expressions.
//!
//! A filter is compiled once into an immutable [`EvaluationTree`]. Each data instance to test is
//! then matched through its own [`EvaluationContext`], to which the results of the predicates are
//! reported one at a time, in any order, as the attribute values of the instance get discovered.
//! The verdict is reached as soon as possible: the branches that can no longer change the outcome
//! are short-circuited and their predicates are told to stop listening.
//!
//! # Examples
//!
//! Matching people against a filter with the reference [`PredicateIndex`]:
//!
//! ```
//! use be_tree::{
//!     compile, AttributeDefinition, AttributeTable, BooleanExpr, EvaluationTree, MatchSession,
//!     PathTranslator, PredicateIndex, Value,
//! };
//!
//! // Describe the attributes of the data instances
//! let attributes = AttributeTable::new(&[
//!     AttributeDefinition::scalar("name"),
//!     AttributeDefinition::scalar("age"),
//!     AttributeDefinition::repeated_embedded(
//!         "phone_numbers",
//!         &[AttributeDefinition::scalar("number")],
//!     ),
//! ])
//! .unwrap();
//!
//! // name = 'John' AND (age < 30 OR phone_numbers.number LIKE '0040%')
//! let filter = BooleanExpr::and([
//!     BooleanExpr::equal("name", "John"),
//!     BooleanExpr::or([
//!         BooleanExpr::less("age", 30),
//!         BooleanExpr::like("phone_numbers.number", "0040%"),
//!     ]),
//! ]);
//!
//! // Compile the filter and subscribe its predicates to the index
//! let mut index = PredicateIndex::new();
//! let tree: EvaluationTree<MatchSession> = compile(&filter, &attributes).unwrap();
//! tree.subscribe(&mut index, "young-johns");
//!
//! // Feed the attributes of an instance
//! let instance = [
//!     ("name", Value::from("John")),
//!     ("age", Value::from(42)),
//!     ("phone_numbers.number", Value::from("0031234")),
//!     ("phone_numbers.number", Value::from("0040123")),
//! ];
//! let mut context = tree.context();
//! for (path, value) in &instance {
//!     let path = attributes.translate(path).unwrap();
//!     if index.dispatch(&"young-johns", &mut context, &path, Some(value)).is_some() {
//!         break;
//!     }
//! }
//!
//! assert!(context.is_matching());
//! ```
//!
//! # Evaluation
//!
//! The nodes of a tree are stored in preorder, so that every subtree occupies a contiguous range
//! of slots. Every match attempt works on its own copy of the tree's counters:
//!
//! * a positive counter is the number of children of an operator that are still undecided, or `1`
//!   for a predicate that has not been evaluated yet;
//! * `0` means that the node has been decided `true` and `-1` that it has been decided `false`.
//!
//! An `AND` is decided `false` by its first `false` child and `true` once all its children are
//! `true`; an `OR` is the dual. Once a node is decided, every predicate of its subtree that is
//! still waiting for a value is forced to the node's value and its subscription is suspended for
//! this match attempt.
//!
//! # Supported expressions
//!
//! * Boolean operators: `AND` and `OR` with any positive number of operands;
//! * Comparisons: `=`, `<`, `<=`, `>`, `>=`. They are compiled into intervals;
//! * Null checks: `IS NULL`;
//! * Patterns: `LIKE` (with `%`, `_` and an optional escape character) and regular expressions;
//! * `NOT` directly above a null check or a pattern. Negated comparisons are expected to be
//!   expressed with the opposite operator instead;
//! * A constant `TRUE` or `FALSE`, as the whole expression only.
mod ast;
mod compiler;
mod context;
mod error;
mod index;
mod node;
mod predicates;
mod schema;
mod session;
mod subscription;
#[cfg(test)]
mod test_utils;
mod tree;
mod values;

pub use crate::{
    ast::{BooleanExpr, ComparisonOperator},
    compiler::compile,
    context::EvaluationContext,
    error::CompileError,
    index::{IndexedSubscription, PredicateIndex},
    node::{EvaluationNode, NodeId, NodeKind, PredicateNode},
    predicates::{Interval, Pattern, Predicate},
    schema::{
        AttributeDefinition, AttributeId, AttributePath, AttributeTable, PathTranslator,
        SchemaError,
    },
    session::MatchSession,
    subscription::{AttributeDispatcher, Subscription},
    tree::EvaluationTree,
    values::Value,
};

use crate::{
    context::EvaluationContext,
    node::{state, EvaluationNode, NodeId, NodeKind, PredicateNode},
    subscription::AttributeDispatcher,
};
use std::fmt::{Display, Formatter};
use tracing::debug;

/// A compiled boolean expression.
///
/// The tree is immutable once compiled; all the state of a match attempt lives in an
/// [`EvaluationContext`], so a single tree can be shared by any number of concurrent matches.
///
/// The nodes are stored in preorder, the root being the first one. A tree compiled from a
/// constant expression has no nodes at all and a single counter holding the constant's value.
#[derive(Debug)]
pub struct EvaluationTree<S = ()> {
    nodes: Vec<EvaluationNode<S>>,
    initial_counters: Vec<i32>,
}

impl<S> EvaluationTree<S> {
    pub(crate) fn new(nodes: Vec<EvaluationNode<S>>, initial_counters: Vec<i32>) -> Self {
        debug_assert_eq!(nodes.len(), initial_counters.len());
        Self {
            nodes,
            initial_counters,
        }
    }

    pub(crate) fn constant(value: bool) -> Self {
        Self {
            nodes: vec![],
            initial_counters: vec![state(value)],
        }
    }

    #[inline]
    pub fn nodes(&self) -> &[EvaluationNode<S>] {
        &self.nodes
    }

    /// # Panics
    ///
    /// Panics if `id` is not a node of this tree.
    #[inline]
    pub fn node(&self, id: NodeId) -> &EvaluationNode<S> {
        &self.nodes[id]
    }

    #[inline]
    pub fn initial_counters(&self) -> &[i32] {
        &self.initial_counters
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the tree was compiled from a constant expression.
    #[inline]
    pub fn is_constant(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn predicates(&self) -> impl Iterator<Item = &PredicateNode<S>> {
        self.nodes.iter().filter_map(EvaluationNode::as_predicate)
    }

    /// The direct children of the node `id`, in order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &EvaluationNode<S>> + '_ {
        let end = self.nodes[id].span().end;
        let mut next = id + 1;
        std::iter::from_fn(move || {
            if next >= end {
                return None;
            }
            let child = &self.nodes[next];
            next = child.span().end;
            Some(child)
        })
    }

    /// Subscribe every predicate of the tree to the `dispatcher`.
    ///
    /// # Panics
    ///
    /// Panics if one of the predicates is already subscribed.
    pub fn subscribe<D>(&self, dispatcher: &mut D, callback: D::Callback)
    where
        D: AttributeDispatcher<S>,
        D::Callback: Clone,
    {
        let mut count = 0;
        for predicate in self.predicates() {
            predicate.subscribe(dispatcher, callback.clone());
            count += 1;
        }
        debug!(predicates = count, "subscribed evaluation tree");
    }

    /// Cancel the subscriptions of every predicate of the tree.
    pub fn unsubscribe(&self) {
        self.predicates().for_each(PredicateNode::unsubscribe);
        debug!("unsubscribed evaluation tree");
    }

    /// Start a match attempt with a default session.
    pub fn context(&self) -> EvaluationContext<'_, S>
    where
        S: Default,
    {
        EvaluationContext::new(self)
    }

    pub fn context_with(&self, session: S) -> EvaluationContext<'_, S> {
        EvaluationContext::with_session(self, session)
    }

    /// Render the tree in the Graphviz format.
    pub fn to_graphviz(&self) -> String {
        let mut builder = String::with_capacity(64 * (self.nodes.len() + 1));
        builder.push_str("digraph {\n");
        builder.push_str("rankdir = TB;\n");
        builder.push_str(r#"node [shape = "record"];"#);
        builder.push('\n');

        let mut relations = Vec::with_capacity(self.nodes.len());
        builder.push_str("\n// nodes\n");
        if self.is_constant() {
            builder.push_str(&format!(
                r#"node_0 [label = "{{0 | {}}}", style = "rounded"];"#,
                self.initial_counters[0] == 0
            ));
            builder.push('\n');
        }
        for node in &self.nodes {
            let id = node.id();
            let span = node.span();
            let node_line = match node.kind() {
                NodeKind::Predicate(predicate) => format!(
                    r#"node_{id} [label = "{{{id} | {} | {} | counter: {}}}", style = "rounded"];"#,
                    escape_label(&predicate.path().to_string()),
                    escape_label(&predicate.predicate().to_string()),
                    self.initial_counters[id]
                ),
                _ => format!(
                    r#"node_{id} [label = "{{{id} | {node} | span: {}..{} | counter: {}}}"];"#,
                    span.start, span.end, self.initial_counters[id]
                ),
            };
            builder.push_str(&node_line);
            builder.push('\n');

            if let Some(parent) = node.parent() {
                relations.push(format!("node_{parent} -> node_{id};"));
            }
        }

        builder.push_str("\n// edges\n");
        for relation in relations {
            builder.push_str(&relation);
            builder.push('\n');
        }

        builder.push('}');
        builder
    }

    fn format_node(&self, id: NodeId, formatter: &mut Formatter) -> std::fmt::Result {
        let node = &self.nodes[id];
        if let NodeKind::Predicate(predicate) = node.kind() {
            return write!(formatter, "{predicate}");
        }

        write!(formatter, "{node}(")?;
        for (position, child) in self.children(id).enumerate() {
            if position > 0 {
                write!(formatter, ", ")?;
            }
            self.format_node(child.id(), formatter)?;
        }
        write!(formatter, ")")
    }
}

impl<S> Display for EvaluationTree<S> {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        if self.is_constant() {
            let value = if self.initial_counters[0] == 0 { "TRUE" } else { "FALSE" };
            return write!(formatter, "{value}");
        }
        self.format_node(0, formatter)
    }
}

fn escape_label(label: &str) -> String {
    label
        .chars()
        .fold(String::with_capacity(label.len()), |mut escaped, character| {
            if matches!(character, '{' | '}' | '|' | '<' | '>' | '"' | '\\') {
                escaped.push('\\');
            }
            escaped.push(character);
            escaped
        })
}

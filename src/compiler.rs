use crate::{
    ast::BooleanExpr,
    error::CompileError,
    node::{EvaluationNode, NodeId, NodeKind, PredicateNode, UNDECIDED_PREDICATE},
    predicates::{Interval, Pattern, Predicate},
    schema::PathTranslator,
    tree::EvaluationTree,
};
use tracing::debug;

/// Compile a boolean expression into an [`EvaluationTree`].
///
/// The property paths of the expression are resolved with the `translator`. Constants are only
/// accepted as the whole expression and negations are only accepted directly above a null check
/// or a pattern match.
///
/// # Examples
///
/// ```
/// use be_tree::{compile, AttributeDefinition, AttributeTable, BooleanExpr, EvaluationTree};
///
/// let attributes = AttributeTable::new(&[
///     AttributeDefinition::scalar("name"),
///     AttributeDefinition::scalar("age"),
/// ])
/// .unwrap();
/// let expression = BooleanExpr::and([
///     BooleanExpr::equal("name", "John"),
///     BooleanExpr::less("age", 30),
/// ]);
///
/// let tree: EvaluationTree = compile(&expression, &attributes).unwrap();
///
/// assert_eq!(3, tree.len());
/// assert_eq!(&[2, 1, 1], tree.initial_counters());
/// ```
pub fn compile<S>(
    expression: &BooleanExpr,
    translator: &impl PathTranslator,
) -> Result<EvaluationTree<S>, CompileError> {
    if let BooleanExpr::Constant(value) = expression {
        debug!(value, "compiled constant expression");
        return Ok(EvaluationTree::constant(*value));
    }

    let mut compiler = Compiler {
        translator,
        nodes: vec![],
        counters: vec![],
    };
    compiler.compile_node(expression, None)?;
    debug!(nodes = compiler.nodes.len(), "compiled boolean expression");
    Ok(EvaluationTree::new(compiler.nodes, compiler.counters))
}

struct Compiler<'a, T, S> {
    translator: &'a T,
    nodes: Vec<EvaluationNode<S>>,
    counters: Vec<i32>,
}

impl<T: PathTranslator, S> Compiler<'_, T, S> {
    fn compile_node(
        &mut self,
        expression: &BooleanExpr,
        parent: Option<NodeId>,
    ) -> Result<(), CompileError> {
        match expression {
            BooleanExpr::And(children) => {
                self.compile_operator(expression, NodeKind::And, children, parent)
            }
            BooleanExpr::Or(children) => {
                self.compile_operator(expression, NodeKind::Or, children, parent)
            }
            BooleanExpr::Not(child) if child.is_predicate() => {
                self.compile_predicate(child, true, parent)
            }
            expression if expression.is_predicate() => {
                self.compile_predicate(expression, false, parent)
            }
            expression => Err(CompileError::UnsupportedExpression(expression.to_string())),
        }
    }

    fn compile_operator(
        &mut self,
        expression: &BooleanExpr,
        kind: NodeKind<S>,
        children: &[BooleanExpr],
        parent: Option<NodeId>,
    ) -> Result<(), CompileError> {
        if children.is_empty() {
            return Err(CompileError::UnsupportedExpression(expression.to_string()));
        }

        let id = self.nodes.len();
        self.nodes.push(EvaluationNode::new(parent, id, kind));
        self.counters.push(children.len() as i32);
        for child in children {
            self.compile_node(child, Some(id))?;
        }
        let end = self.nodes.len();
        self.nodes[id].close(end);
        Ok(())
    }

    fn compile_predicate(
        &mut self,
        expression: &BooleanExpr,
        negated: bool,
        parent: Option<NodeId>,
    ) -> Result<(), CompileError> {
        let (path, predicate) = match expression {
            BooleanExpr::Comparison {
                path,
                operator,
                value,
            } => {
                let interval = Interval::from_comparison(*operator, value.clone());
                (path, Predicate::Interval(interval))
            }
            BooleanExpr::IsNull { path } => (path, Predicate::IsNull),
            BooleanExpr::Like {
                path,
                pattern,
                escape,
            } => {
                let pattern = compile_pattern(pattern, |pattern| Pattern::like(pattern, *escape))?;
                (path, Predicate::Pattern(pattern))
            }
            BooleanExpr::Regex { path, pattern } => {
                let pattern = compile_pattern(pattern, Pattern::regex)?;
                (path, Predicate::Pattern(pattern))
            }
            _ => unreachable!("{expression} is not a predicate; this is a bug"),
        };
        if negated && predicate.is_interval() {
            return Err(CompileError::NegatedInterval(expression.to_string()));
        }

        let path = self
            .translator
            .translate(path)
            .ok_or_else(|| CompileError::UnknownProperty(path.to_owned()))?;
        let id = self.nodes.len();
        let leaf = PredicateNode::new(id, predicate, negated, path);
        self.nodes.push(EvaluationNode::new(parent, id, NodeKind::Predicate(leaf)));
        self.counters.push(UNDECIDED_PREDICATE);
        Ok(())
    }
}

fn compile_pattern(
    pattern: &str,
    compile: impl FnOnce(&str) -> Result<Pattern, regex::Error>,
) -> Result<Pattern, CompileError> {
    compile(pattern).map_err(|source| CompileError::InvalidPattern {
        pattern: pattern.to_owned(),
        source,
    })
}

use be_tree::{
    compile, AttributeDefinition, AttributeTable, BooleanExpr, EvaluationTree, MatchSession,
    PathTranslator, PredicateIndex, Value,
};
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use itertools::Itertools;
use serde::Deserialize;

const MATCHING_FILE: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/benches/data/matching.json"
));

fn define_attributes() -> AttributeTable {
    AttributeTable::new(&[
        AttributeDefinition::scalar("exchange_id"),
        AttributeDefinition::scalar("country"),
        AttributeDefinition::scalar("city"),
        AttributeDefinition::repeated("deal_ids"),
        AttributeDefinition::repeated("segment_ids"),
    ])
    .unwrap()
}

// exchange_id = 1 AND (country = 'CA' AND city = 'QC' OR country = 'US' AND city = 'AZ')
// AND deal_ids LIKE 'deal-%'
fn an_expression() -> BooleanExpr {
    BooleanExpr::and([
        BooleanExpr::equal("exchange_id", 1),
        BooleanExpr::or([
            BooleanExpr::and([
                BooleanExpr::equal("country", "CA"),
                BooleanExpr::equal("city", "QC"),
            ]),
            BooleanExpr::and([
                BooleanExpr::equal("country", "US"),
                BooleanExpr::equal("city", "AZ"),
            ]),
        ]),
        BooleanExpr::like("deal_ids", "deal-%"),
    ])
}

pub fn compile_expression(c: &mut Criterion) {
    let attributes = define_attributes();
    let expression = an_expression();
    c.bench_function("compile", |b| {
        b.iter(|| {
            let _ = std::hint::black_box(compile::<()>(&expression, &attributes));
        })
    });
}

pub fn evaluate(c: &mut Criterion) {
    let attributes = define_attributes();
    let tree: EvaluationTree = compile(&an_expression(), &attributes).unwrap();
    c.bench_function("evaluate", |b| {
        b.iter_batched(
            || tree.context(),
            |mut context| {
                context.report(1, true);
                context.report(7, false);
                context.report(4, true);
                context.report(5, true);
                let _ = std::hint::black_box(context.report(9, true));
            },
            BatchSize::SmallInput,
        )
    });
}

pub fn dispatch(c: &mut Criterion) {
    let attributes = define_attributes();
    let mut index = PredicateIndex::new();
    let tree: EvaluationTree<MatchSession> = compile(&an_expression(), &attributes).unwrap();
    tree.subscribe(&mut index, 1u64);
    let instance = [
        ("exchange_id", Value::from(1)),
        ("country", Value::from("US")),
        ("city", Value::from("AZ")),
        ("deal_ids", Value::from("other-1")),
        ("deal_ids", Value::from("deal-2")),
    ]
    .into_iter()
    .map(|(path, value)| (attributes.translate(path).unwrap(), value))
    .collect_vec();
    c.bench_function("dispatch", |b| {
        b.iter(|| {
            let mut context = tree.context();
            for (path, value) in &instance {
                if index.dispatch(&1, &mut context, path, Some(value)).is_some() {
                    break;
                }
            }
            std::hint::black_box(context.is_matching())
        })
    });
}

#[derive(Deserialize)]
struct MatchingContent {
    attributes: Vec<Attribute>,
    filters: Vec<Filter>,
    instances: Vec<Vec<(String, Option<Literal>)>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum AttributeKind {
    Scalar,
    Repeated,
}

#[derive(Deserialize)]
struct Attribute {
    name: String,
    kind: AttributeKind,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Literal {
    Boolean(bool),
    Integer(i64),
    String(String),
}

impl From<&Literal> for Value {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Boolean(value) => Value::from(*value),
            Literal::Integer(value) => Value::from(*value),
            Literal::String(value) => Value::from(value.as_str()),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum Expression {
    And(Vec<Expression>),
    Or(Vec<Expression>),
    Not(Box<Expression>),
    Equal(String, Literal),
    Less(String, Literal),
    Greater(String, Literal),
    IsNull(String),
    Like(String, String),
}

impl From<&Expression> for BooleanExpr {
    fn from(expression: &Expression) -> Self {
        match expression {
            Expression::And(children) => BooleanExpr::and(children.iter().map(Into::into)),
            Expression::Or(children) => BooleanExpr::or(children.iter().map(Into::into)),
            Expression::Not(child) => BooleanExpr::not(child.as_ref().into()),
            Expression::Equal(path, value) => BooleanExpr::equal(path, value),
            Expression::Less(path, value) => BooleanExpr::less(path, value),
            Expression::Greater(path, value) => BooleanExpr::greater(path, value),
            Expression::IsNull(path) => BooleanExpr::is_null(path),
            Expression::Like(path, pattern) => BooleanExpr::like(path, pattern),
        }
    }
}

#[derive(Deserialize)]
struct Filter {
    id: u64,
    expression: Expression,
}

pub fn dispatch_with_files(c: &mut Criterion) {
    let content: MatchingContent = serde_json::from_str(MATCHING_FILE).unwrap();
    let definitions = content
        .attributes
        .iter()
        .map(|Attribute { name, kind }| match kind {
            AttributeKind::Scalar => AttributeDefinition::scalar(name),
            AttributeKind::Repeated => AttributeDefinition::repeated(name),
        })
        .collect_vec();
    let attributes = AttributeTable::new(&definitions).unwrap();
    let mut index = PredicateIndex::new();
    let filters = content
        .filters
        .iter()
        .map(|Filter { id, expression }| {
            let tree: EvaluationTree<MatchSession> =
                compile(&expression.into(), &attributes).unwrap();
            tree.subscribe(&mut index, *id);
            (*id, tree)
        })
        .collect_vec();
    let instances = content
        .instances
        .iter()
        .map(|instance| {
            instance
                .iter()
                .map(|(path, value)| {
                    (
                        attributes.translate(path).unwrap(),
                        value.as_ref().map(Value::from),
                    )
                })
                .collect_vec()
        })
        .collect_vec();

    c.bench_function("dispatch_with_files", |b| {
        b.iter(|| {
            let mut matches = 0;
            for instance in &instances {
                for (id, tree) in &filters {
                    let mut context = tree.context_with(index.session());
                    for (path, value) in instance {
                        if index.dispatch(id, &mut context, path, value.as_ref()).is_some() {
                            break;
                        }
                    }
                    matches += usize::from(context.is_matching());
                }
            }
            std::hint::black_box(matches)
        })
    });
}

criterion_group!(
    benches,
    compile_expression,
    evaluate,
    dispatch,
    dispatch_with_files
);
criterion_main!(benches);

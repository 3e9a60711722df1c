use be_tree::{
    compile, AttributeDefinition, AttributeTable, BooleanExpr, EvaluationTree, MatchSession,
    PathTranslator, PredicateIndex, Value,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Describe the people being matched
    let attributes = AttributeTable::new(&[
        AttributeDefinition::scalar("name"),
        AttributeDefinition::scalar("surname"),
        AttributeDefinition::scalar("age"),
        AttributeDefinition::embedded("address", &[AttributeDefinition::scalar("street")]),
        AttributeDefinition::repeated_embedded(
            "phone_numbers",
            &[AttributeDefinition::scalar("number")],
        ),
    ])
    .unwrap();

    // Register the filters
    let filters = [
        (
            1,
            BooleanExpr::and([
                BooleanExpr::equal("name", "John"),
                BooleanExpr::less("age", 30),
            ]),
        ),
        (
            2,
            BooleanExpr::or([
                BooleanExpr::like("phone_numbers.number", "0040%"),
                BooleanExpr::equal("surname", "Batman"),
            ]),
        ),
        (
            3,
            BooleanExpr::and([
                BooleanExpr::not(BooleanExpr::is_null("address.street")),
                BooleanExpr::greater_or_equal("age", 18),
            ]),
        ),
    ];
    let mut index = PredicateIndex::new();
    let trees = filters
        .iter()
        .map(|(id, expression)| {
            let tree: EvaluationTree<MatchSession> = compile(expression, &attributes).unwrap();
            tree.subscribe(&mut index, *id);
            println!("Filter {id}: {expression}");
            println!("  compiled to {tree}");
            (*id, tree)
        })
        .collect::<Vec<_>>();

    // Match a person against every filter
    let person = [
        ("name", Some(Value::from("John"))),
        ("surname", Some(Value::from("Doe"))),
        ("age", Some(Value::from(24))),
        ("address.street", None),
        ("phone_numbers.number", Some(Value::from("0031234567"))),
        ("phone_numbers.number", Some(Value::from("0040123456"))),
    ];
    for (id, tree) in &trees {
        let mut context = tree.context_with(index.session());
        for (path, value) in &person {
            let path = attributes.translate(path).unwrap();
            if index.dispatch(id, &mut context, &path, value.as_ref()).is_some() {
                break;
            }
        }

        match context.verdict() {
            Some(true) => println!("Filter {id} matched"),
            Some(false) => println!("Filter {id} did not match"),
            None => println!("Filter {id} is undecided and therefore did not match"),
        }
    }
}

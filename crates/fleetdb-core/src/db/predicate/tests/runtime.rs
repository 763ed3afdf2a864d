use super::TestRow;
use crate::{
    db::predicate::{
        CompareOp, ComparePredicate, Predicate, QueryMode, RelationFilter, Truth, eval, matches,
        normalize,
    },
    value::Value,
};

fn driver() -> TestRow {
    TestRow::default()
        .with("name", "Ada Lovelace")
        .with("rating", Value::Null)
        .with("years", 7)
        .with("tags", vec!["Hazmat", "Reefer"])
}

fn ci(field: &str, op: CompareOp, value: impl Into<Value>) -> Predicate {
    Predicate::Compare(ComparePredicate::new(field, op, value).with_mode(QueryMode::Insensitive))
}

#[test]
fn null_literal_with_equals_is_a_null_test() {
    let row = driver();

    assert!(matches(&row, &Predicate::eq("rating", Value::Null)));
    assert!(!matches(&row, &Predicate::ne("rating", Value::Null)));
    assert!(matches(&row, &Predicate::ne("years", Value::Null)));
}

#[test]
fn comparisons_on_null_fields_are_unknown() {
    let row = driver();
    let gt = Predicate::gt("rating", 3);

    assert_eq!(eval(&row, &gt), Truth::Unknown);
    assert_eq!(eval(&row, &!gt.clone()), Truth::Unknown);
    assert!(!matches(&row, &(gt.clone() | !gt)));
}

#[test]
fn unknown_is_absorbed_by_false_and_true() {
    let row = driver();
    let unknown = Predicate::lt("rating", 1);

    assert_eq!(
        eval(&row, &(unknown.clone() & Predicate::False)),
        Truth::False
    );
    assert_eq!(eval(&row, &(unknown | Predicate::True)), Truth::True);
}

#[test]
fn missing_fields_never_match() {
    let row = driver();

    assert!(!matches(&row, &Predicate::eq("missing", 1)));
    assert!(!matches(&row, &Predicate::is_null("missing")));
}

#[test]
fn insensitive_mode_applies_to_every_text_operator() {
    let row = driver();

    assert!(matches(&row, &ci("name", CompareOp::Eq, "ada lovelace")));
    assert!(!matches(&row, &ci("name", CompareOp::Ne, "ADA LOVELACE")));
    assert!(matches(&row, &ci("name", CompareOp::Contains, "LOVE")));
    assert!(matches(&row, &ci("name", CompareOp::StartsWith, "ada")));
    assert!(matches(&row, &ci("name", CompareOp::EndsWith, "LACE")));
    assert!(matches(&row, &ci("name", CompareOp::Gt, "ADA")));
    assert!(matches(&row, &ci("name", CompareOp::Lte, "ada lovelace")));
    assert!(matches(
        &row,
        &ci("name", CompareOp::In, vec!["x", "ADA LOVELACE"])
    ));
    assert!(!matches(
        &row,
        &ci("name", CompareOp::NotIn, vec!["ada lovelace"])
    ));
    assert!(matches(&row, &ci("tags", CompareOp::Has, "hazmat")));

    assert!(!matches(&row, &Predicate::eq("name", "ada lovelace")));
    assert!(!matches(
        &row,
        &Predicate::Compare(ComparePredicate::new("name", CompareOp::Contains, "LOVE"))
    ));
}

#[test]
fn in_with_null_element_is_unknown_on_miss() {
    let row = driver();
    let items = Value::List(vec![Value::Int(1), Value::Null]);
    let pred = Predicate::Compare(ComparePredicate::new("years", CompareOp::In, items.clone()));

    assert_eq!(eval(&row, &pred), Truth::Unknown);

    let not_in = Predicate::Compare(ComparePredicate::new("years", CompareOp::NotIn, items));
    assert_eq!(eval(&row, &not_in), Truth::Unknown);
}

#[test]
fn numeric_comparisons_widen() {
    let row = driver();

    assert!(matches(&row, &Predicate::eq("years", 7u64)));
    assert!(matches(&row, &Predicate::lt("years", 7.5)));
    assert!(matches(&row, &Predicate::in_("years", vec![1u8, 7])));
}

#[test]
fn list_operators() {
    let row = driver();
    let has_every = |items: Vec<&str>| {
        Predicate::Compare(ComparePredicate::new("tags", CompareOp::HasEvery, items))
    };
    let has_some = |items: Vec<&str>| {
        Predicate::Compare(ComparePredicate::new("tags", CompareOp::HasSome, items))
    };

    assert!(matches(&row, &has_every(vec!["Reefer", "Hazmat"])));
    assert!(!matches(&row, &has_every(vec!["Reefer", "Tanker"])));
    assert!(matches(&row, &has_every(vec![])));
    assert!(matches(&row, &has_some(vec!["Tanker", "Reefer"])));
    assert!(!matches(&row, &has_some(vec![])));
    assert!(!matches(
        &row,
        &Predicate::IsEmpty {
            field: "tags".into()
        }
    ));
}

#[test]
fn to_many_quantifiers() {
    let trip = |status: &str| TestRow::default().with("status", Value::enum_variant(status));
    let row = driver().relate("trips", vec![trip("COMPLETED"), trip("PLANNED")]);
    let completed = Box::new(Predicate::eq("status", Value::enum_variant("COMPLETED")));

    let some = Predicate::relation("trips", RelationFilter::Some(completed.clone()));
    let none = Predicate::relation("trips", RelationFilter::None(completed.clone()));
    let every = Predicate::relation("trips", RelationFilter::Every(completed.clone()));

    assert!(matches(&row, &some));
    assert!(!matches(&row, &none));
    assert!(!matches(&row, &every));

    let idle = driver().relate("trips", Vec::new());
    assert!(!matches(&idle, &some));
    assert!(matches(&idle, &none));
    assert!(matches(&idle, &every));
}

#[test]
fn to_one_quantifiers() {
    let vehicle = TestRow::default().with("plate", "FLT-001");
    let assigned = driver().relate("vehicle", vec![vehicle]);
    let unassigned = driver().relate("vehicle", Vec::new());
    let plate = || Some(Box::new(Predicate::eq("plate", "FLT-001")));

    let is = Predicate::relation("vehicle", RelationFilter::Is(plate()));
    let is_not = Predicate::relation("vehicle", RelationFilter::IsNot(plate()));
    let absent = Predicate::relation("vehicle", RelationFilter::Is(None));
    let present = Predicate::relation("vehicle", RelationFilter::IsNot(None));

    assert!(matches(&assigned, &is));
    assert!(!matches(&assigned, &is_not));
    assert!(matches(&assigned, &present));
    assert!(!matches(&assigned, &absent));

    assert!(!matches(&unassigned, &is));
    assert!(matches(&unassigned, &is_not));
    assert!(matches(&unassigned, &absent));
}

#[test]
fn relation_quantifiers_treat_unknown_as_non_matching() {
    let trip = TestRow::default().with("distance", Value::Null);
    let row = driver().relate("trips", vec![trip]);
    let long = Box::new(Predicate::gt("distance", 100));

    assert!(matches(
        &row,
        &Predicate::relation("trips", RelationFilter::None(long.clone()))
    ));
    assert!(!matches(
        &row,
        &Predicate::relation("trips", RelationFilter::Every(long.clone()))
    ));
    // every(p) is not rewritten as none(NOT p): NOT Unknown is still Unknown
    assert!(matches(
        &row,
        &Predicate::relation("trips", RelationFilter::None(Box::new(!*long)))
    ));
}

#[test]
fn normalize_flattens_and_orders_children() {
    let a = Predicate::eq("a", 1);
    let b = Predicate::eq("b", 2);
    let nested = Predicate::And(vec![
        Predicate::True,
        Predicate::And(vec![b.clone(), a.clone()]),
        Predicate::not(Predicate::not(a.clone())),
    ]);

    assert_eq!(normalize(&nested), Predicate::And(vec![a, b]));
}

#[test]
fn normalize_short_circuits_constants() {
    let a = Predicate::eq("a", 1);

    assert_eq!(
        normalize(&Predicate::Or(vec![a.clone(), Predicate::True])),
        Predicate::True
    );
    assert_eq!(
        normalize(&Predicate::And(vec![a.clone(), Predicate::False])),
        Predicate::False
    );
    assert_eq!(normalize(&Predicate::Or(vec![])), Predicate::False);
    assert_eq!(normalize(&Predicate::not(Predicate::True)), Predicate::False);
}

#[test]
fn normalize_rewrites_null_literals() {
    assert_eq!(
        normalize(&Predicate::eq("rating", Value::Null)),
        Predicate::is_null("rating")
    );
    assert_eq!(
        normalize(&Predicate::ne("rating", Value::Null)),
        Predicate::is_not_null("rating")
    );
}

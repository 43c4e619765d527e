//! Integration tests for the specification engine.
//!
//! These tests exercise the full pipeline: building specifications,
//! combining them, extracting shaping metadata, and projecting onto the
//! in-memory queryable.

use pretty_assertions::assert_eq;

use criteria::{
    CallOp, Expr, KeySelector, Predicate, Specification, VecQuery, all, apply_paging,
    extract_fetch, extract_order, extract_paging, project, r#where,
};

#[derive(Debug, Clone, PartialEq)]
struct Person {
    name: &'static str,
    age: i64,
}

fn people() -> Vec<Person> {
    vec![
        Person { name: "ada", age: 17 },
        Person { name: "bo", age: 20 },
        Person { name: "cy", age: 30 },
    ]
}

fn adults() -> Specification<Person> {
    Specification::new(Predicate::new("p", |p: &Person| p.age >= 18).labeled("age >= 18"))
}

fn age_key() -> KeySelector<Person> {
    KeySelector::new("p", |p: &Person| p.age).labeled("age")
}

fn name_key() -> KeySelector<Person> {
    KeySelector::new("p", |p: &Person| p.name).labeled("name")
}

fn names(items: Vec<Person>) -> Vec<&'static str> {
    items.into_iter().map(|p| p.name).collect()
}

#[test]
fn test_direct_evaluation_scenario() {
    let base = adults();
    let verdicts: Vec<bool> = people()
        .iter()
        .map(|p| base.is_satisfied_by(p))
        .collect();
    assert_eq!(verdicts, vec![false, true, true]);
}

#[test]
fn test_or_of_two_specifications_scenario() {
    let minors = Specification::new(Predicate::new("p", |p: &Person| p.age < 18));
    let seniors = Specification::new(Predicate::new("p", |p: &Person| p.age >= 65));
    let spec = minors.or(&seniors);

    let verdicts: Vec<bool> = [10, 30, 70]
        .iter()
        .map(|&age| spec.is_satisfied_by(&Person { name: "t", age }))
        .collect();
    assert_eq!(verdicts, vec![true, false, true]);
}

#[test]
fn test_take_after_order_projection_scenario() {
    let spec = adults().order_by_descending(age_key()).take(1);

    let query = project(VecQuery::new(people()), &spec);
    let query = apply_paging(query, spec.expression());

    assert_eq!(
        query.into_vec(),
        vec![Person { name: "cy", age: 30 }]
    );
}

#[test]
fn test_shaping_metadata_survives_and() {
    let shaped = adults().order_by(age_key()).take(5);
    let narrowed = shaped.and(Predicate::new("p", |p: &Person| p.age < 25));

    let expr = narrowed.expression();
    assert!(extract_order(expr, CallOp::OrderBy).is_some());
    assert_eq!(extract_paging(expr, CallOp::Take), 5);

    let query = project(VecQuery::new(people()), &narrowed);
    let query = apply_paging(query, narrowed.expression());
    assert_eq!(names(query.into_vec()), vec!["bo"]);
}

#[test]
fn test_then_by_projection_breaks_ties() {
    let tied = vec![
        Person { name: "zed", age: 30 },
        Person { name: "amy", age: 30 },
        Person { name: "kit", age: 20 },
    ];
    let spec = adults().order_by(age_key()).then_by(name_key());

    let query = project(VecQuery::new(tied), &spec);
    assert_eq!(names(query.into_vec()), vec!["kit", "amy", "zed"]);
}

#[test]
fn test_fetch_paths_reach_the_collaborator() {
    let spec = adults().fetch("orders");
    let query = project(VecQuery::new(people()), &spec);
    assert_eq!(query.fetched_paths().len(), 1);
    assert_eq!(query.fetched_paths()[0].as_str(), "orders");
}

#[test]
fn test_paging_not_applied_by_project() {
    let spec = adults().take(1);
    let query = project(VecQuery::new(people()), &spec);
    // Two adults survive the filter; the take(1) lives in the tree only.
    assert_eq!(query.into_vec().len(), 2);
}

#[test]
fn test_skip_zero_indistinguishable_from_absent() {
    let with_zero = adults().skip(0);
    let without = adults();
    assert_eq!(
        extract_paging(with_zero.expression(), CallOp::Skip),
        extract_paging(without.expression(), CallOp::Skip)
    );
}

#[test]
fn test_round_trip_equality_and_hash() {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of<V: Hash>(value: &V) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    let condition = Predicate::new("p", |p: &Person| p.age >= 18);
    let expr = Expr::source().filter(condition.clone()).order_by(age_key()).take(5);

    let spec = Specification::from_expr(expr.clone());
    assert_eq!(spec.expression(), &expr);

    let other = Specification::from_expr(expr.clone());
    assert_eq!(spec, other);
    assert_eq!(hash_of(&spec), hash_of(&other));

    let different = Specification::from_expr(Expr::source().filter(condition).take(5));
    assert_ne!(spec, different);
}

#[test]
fn test_and_associativity_in_truth_value() {
    let under_65 = Predicate::new("p", |p: &Person| p.age < 65);
    let even_age = Predicate::new("p", |p: &Person| p.age % 2 == 0);

    let left = adults().and(under_65.clone()).and(even_age.clone());
    let right_inner = Specification::new(under_65).and(even_age);
    let right = adults().and(&right_inner);

    for age in [10, 18, 21, 64, 65, 70] {
        let item = Person { name: "t", age };
        assert_eq!(left.is_satisfied_by(&item), right.is_satisfied_by(&item));
    }
}

#[test]
fn test_not_negates_whole_conjunction() {
    let under_25 = Predicate::new("p", |p: &Person| p.age < 25);
    let negated = adults().and(under_25).not();

    for person in people() {
        let conjunction = person.age >= 18 && person.age < 25;
        assert_eq!(negated.is_satisfied_by(&person), !conjunction);
    }
}

#[test]
fn test_and_with_specification_uses_condition_only() {
    let other = Specification::new(Predicate::new("p", |p: &Person| p.age < 25))
        .order_by_descending(age_key())
        .skip(1)
        .fetch("orders");
    let spec = adults().and(&other);

    let expr = spec.expression();
    assert_eq!(extract_order(expr, CallOp::OrderByDescending), None);
    assert_eq!(extract_paging(expr, CallOp::Skip), 0);
    assert_eq!(extract_fetch(expr), None);
    assert!(spec.is_satisfied_by(&Person { name: "bo", age: 20 }));
    assert!(!spec.is_satisfied_by(&Person { name: "cy", age: 30 }));
}

#[test]
fn test_where_and_all_prefilter_a_queryable() {
    let query = r#where(
        VecQuery::new(people()),
        Predicate::new("p", |p: &Person| p.age >= 18),
    );
    assert_eq!(query.into_vec().len(), 2);

    let query = all(VecQuery::new(people()));
    assert_eq!(query.into_vec().len(), 3);
}

#[test]
fn test_display_renders_the_tree() {
    let spec = adults().order_by_descending(age_key()).take(1);
    assert_eq!(
        spec.to_string(),
        "source.where(|p| age >= 18).take(1).order_by_descending(convert(|p| age))"
    );
}

#[test]
fn test_specification_usable_as_map_key() {
    use std::collections::HashMap;

    let condition = Predicate::new("p", |p: &Person| p.age >= 18);
    let a = Specification::new(condition.clone());
    let b = Specification::new(condition);

    let mut cache: HashMap<Specification<Person>, &'static str> = HashMap::new();
    cache.insert(a, "adults");
    assert_eq!(cache.get(&b), Some(&"adults"));
}

#[test]
fn test_shared_specification_across_threads() {
    use std::sync::Arc;
    use std::thread;

    let spec = Arc::new(adults());
    let handles: Vec<_> = (0..4i64)
        .map(|i| {
            let spec = Arc::clone(&spec);
            thread::spawn(move || spec.is_satisfied_by(&Person { name: "t", age: 15 + i * 5 }))
        })
        .collect();

    let verdicts: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(verdicts, vec![false, true, true, true]);
}

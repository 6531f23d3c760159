mod common;

use cfgnorm::{CfgError, CleaningOptions, Variable};
use common::{bodies_of, eps, grammar, t, v};
use hashbrown::HashSet;
use pretty_assertions::assert_eq;

const SCENARIO: &str = "S A B\na b eps\nS\nS AB\nA a\nA eps\nB b";

fn variables(names: &[&str]) -> HashSet<Variable> {
    names.iter().map(|name| Variable::new(name)).collect()
}

#[test]
fn test_scenario_nullable_symbols() {
    let cfg = grammar(SCENARIO);
    assert_eq!(cfg.get_nullable_symbols(), variables(&["A"]));
    assert!(!cfg.generates_epsilon());
}

#[test]
fn test_scenario_without_epsilon() {
    let cfg = grammar(SCENARIO)
        .without_epsilon(&CleaningOptions::default())
        .unwrap();

    assert_eq!(
        cfg.get_productions_of(&Variable::new("S")),
        &[vec![v("A"), v("B")], vec![v("B")]]
    );
    assert_eq!(cfg.get_productions_of(&Variable::new("A")), &[vec![t("a")]]);
    assert_eq!(cfg.get_productions_of(&Variable::new("B")), &[vec![t("b")]]);
    assert!(cfg.get_nullable_symbols().is_empty());
}

#[test]
fn test_scenario_cleaned() {
    let original = grammar(SCENARIO);
    let cfg = original.cleaned(&CleaningOptions::default()).unwrap();

    // S -> B is a unit production and is replaced by B's body
    assert_eq!(
        cfg.get_productions_of(&Variable::new("S")),
        &[vec![v("A"), v("B")], vec![t("b")]]
    );
    assert_eq!(bodies_of(&cfg, "A"), HashSet::from([vec![t("a")]]));
    assert_eq!(bodies_of(&cfg, "B"), HashSet::from([vec![t("b")]]));
    assert_eq!(cfg.variables(), original.variables());
    assert!(cfg.is_cleaned());
    assert!(!original.is_cleaned());
}

#[test]
fn test_nullable_chain() {
    let cfg = grammar("S A B C\na\nS\nS ABC\nA B\nB C\nC eps\nC a");
    assert_eq!(cfg.get_nullable_symbols(), variables(&["S", "A", "B", "C"]));
    assert!(cfg.generates_epsilon());

    let cfg = cfg.without_epsilon(&CleaningOptions::default()).unwrap();
    // the 7 non-empty subsequences of ABC, plus the empty string on the start symbol
    assert_eq!(bodies_of(&cfg, "S").len(), 8);
    assert!(bodies_of(&cfg, "S").contains(&eps()));
    assert_eq!(bodies_of(&cfg, "A"), HashSet::from([vec![v("B")]]));
    assert_eq!(bodies_of(&cfg, "B"), HashSet::from([vec![v("C")]]));
    assert_eq!(bodies_of(&cfg, "C"), HashSet::from([vec![t("a")]]));
    assert!(cfg.generates_epsilon());
}

#[test]
fn test_without_epsilon_keeps_start_epsilon_only() {
    let cfg = grammar("S A\na b\nS\nS AbA\nA a\nA eps")
        .without_epsilon(&CleaningOptions::default())
        .unwrap();

    assert_eq!(
        bodies_of(&cfg, "S"),
        HashSet::from([
            vec![v("A"), t("b"), v("A")],
            vec![t("b"), v("A")],
            vec![v("A"), t("b")],
            vec![t("b")],
        ])
    );
    assert_eq!(bodies_of(&cfg, "A"), HashSet::from([vec![t("a")]]));
    assert!(!cfg.generates_epsilon());
}

#[test]
fn test_too_many_nullable_positions() {
    let cfg = grammar("S A\na\nS\nS AAA\nA a\nA eps");
    let options = CleaningOptions::default().with_max_nullable_positions(2);

    assert!(matches!(
        cfg.without_epsilon(&options),
        Err(CfgError::TooManyNullablePositions { count: 3, limit: 2, .. })
    ));
    assert!(matches!(
        cfg.cleaned(&options),
        Err(CfgError::TooManyNullablePositions { .. })
    ));
    assert!(cfg
        .without_epsilon(&CleaningOptions::default().with_max_nullable_positions(3))
        .is_ok());
}

#[test]
fn test_unit_closure() {
    let cfg = grammar("S A B C\na\nS\nS A\nA B\nB A\nB C\nC a");
    let closure = cfg.get_unit_closure();

    assert_eq!(closure[&Variable::new("S")], variables(&["S", "A", "B", "C"]));
    assert_eq!(closure[&Variable::new("A")], variables(&["A", "B", "C"]));
    assert_eq!(closure[&Variable::new("B")], variables(&["A", "B", "C"]));
    assert_eq!(closure[&Variable::new("C")], variables(&["C"]));
}

#[test]
fn test_without_unit_productions() {
    let cfg = grammar("S A B C\na b\nS\nS A\nS bS\nA B\nB A\nB C\nC a")
        .without_unit_productions()
        .unwrap();

    assert_eq!(
        bodies_of(&cfg, "S"),
        HashSet::from([vec![t("b"), v("S")], vec![t("a")]])
    );
    for head in ["A", "B", "C"] {
        assert_eq!(bodies_of(&cfg, head), HashSet::from([vec![t("a")]]));
    }
    assert!(cfg.get_productions().iter().all(|p| !p.is_unit()));
}

#[test]
fn test_unit_elimination_requires_epsilon_free_input() {
    let cfg = grammar("S A\na\nS\nS A\nA a\nA eps");

    assert!(matches!(
        cfg.without_unit_productions(),
        Err(CfgError::Precondition { stage: "unit elimination", .. })
    ));
}

#[test]
fn test_unit_elimination_does_not_copy_start_epsilon() {
    let cfg = grammar("S A\na\nS\nS aA\nS eps\nA S")
        .cleaned(&CleaningOptions::default())
        .unwrap();

    assert_eq!(
        bodies_of(&cfg, "S"),
        HashSet::from([vec![t("a"), v("A")], vec![t("a")], eps()])
    );
    assert_eq!(
        bodies_of(&cfg, "A"),
        HashSet::from([vec![t("a"), v("A")], vec![t("a")]])
    );
}

#[test]
fn test_generating_and_reachable_symbols() {
    let cfg = grammar("S A B C D\na b\nS\nS AB\nS a\nA b\nB B\nC a\nD eps");

    assert_eq!(cfg.get_generating_symbols(), variables(&["S", "A", "C", "D"]));
    assert_eq!(cfg.get_reachable_symbols(), variables(&["S", "A", "B"]));
}

#[test]
fn test_useless_generating_pass_runs_first() {
    // A is only reachable through S -> AB, which dies with the non-generating B
    let cfg = grammar("S A B\na b\nS\nS AB\nS a\nA b")
        .without_useless_symbols()
        .unwrap();

    assert_eq!(cfg.variables(), &variables(&["S"]));
    assert_eq!(bodies_of(&cfg, "S"), HashSet::from([vec![t("a")]]));
    assert_eq!(cfg.terminals().len(), 2);
}

#[test]
fn test_empty_language() {
    let original = grammar("S A\na\nS\nS aS\nS A\nA aA");
    let cfg = original.cleaned(&CleaningOptions::default()).unwrap();

    assert_eq!(cfg.variables(), &variables(&["S"]));
    assert_eq!(cfg.production_count(), 0);
    assert!(cfg.is_empty());
    assert!(cfg.is_cleaned());
    assert_eq!(cfg.terminals(), original.terminals());
    assert_eq!(cfg.get_start_symbol(), original.get_start_symbol());
}

#[test]
fn test_epsilon_only_language() {
    let cfg = grammar("S A\na\nS\nS AA\nA eps")
        .cleaned(&CleaningOptions::default())
        .unwrap();

    assert_eq!(cfg.variables(), &variables(&["S"]));
    assert_eq!(bodies_of(&cfg, "S"), HashSet::from([eps()]));
    assert!(cfg.generates_epsilon());
    assert!(cfg.is_cleaned());
}

#[test]
fn test_cleaning_stages_are_idempotent() {
    let options = CleaningOptions::default();
    let cfg = grammar("S A B C\na b\nS\nS ASB\nS C\nS b\nA aA\nA eps\nB bB\nB b\nC aC");

    let no_epsilon = cfg.without_epsilon(&options).unwrap();
    assert_eq!(no_epsilon.without_epsilon(&options).unwrap(), no_epsilon);

    let no_unit = no_epsilon.without_unit_productions().unwrap();
    assert_eq!(no_unit.without_unit_productions().unwrap(), no_unit);

    let no_useless = no_unit.without_useless_symbols().unwrap();
    assert_eq!(no_useless.without_useless_symbols().unwrap(), no_useless);

    let cleaned = cfg.cleaned(&options).unwrap();
    assert_eq!(cleaned, no_useless);
    assert_eq!(cleaned.cleaned(&options).unwrap(), cleaned);
    assert!(!cleaned.variables().contains(&Variable::new("C")));
}

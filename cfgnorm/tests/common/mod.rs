#![allow(dead_code)]

use cfgnorm::cfg::production::is_epsilon_body;
use cfgnorm::{Body, Derivation, Symbol, Terminal, Variable, CFG};
use hashbrown::{HashMap, HashSet};
use proptest::prelude::*;

pub fn v(name: &str) -> Symbol {
    Symbol::V(Variable::new(name))
}

pub fn t(name: &str) -> Symbol {
    Symbol::T(Terminal::new(name))
}

pub fn eps() -> Body {
    vec![Symbol::Epsilon]
}

pub fn terminals(word: &str) -> Vec<Terminal> {
    word.chars().map(|c| Terminal::new(&c.to_string())).collect()
}

pub fn grammar(text: &str) -> CFG {
    CFG::from_text(text).expect("test grammar should parse")
}

/// Bodies of `head` as a set.
pub fn bodies_of(cfg: &CFG, head: &str) -> HashSet<Body> {
    cfg.get_productions_of(&Variable::new(head))
        .iter()
        .cloned()
        .collect()
}

/// Every terminal string of length at most `max_len` derivable from `variable`.
///
/// Computed as a least fixpoint over all productions, so it is exact for any grammar,
/// including ones with epsilon and unit productions.
pub fn bounded_language_of(
    cfg: &CFG,
    variable: &Variable,
    max_len: usize,
) -> HashSet<Vec<Terminal>> {
    let mut language: HashMap<Variable, HashSet<Vec<Terminal>>> = HashMap::new();
    loop {
        let mut changed = false;
        for (head, bodies) in cfg.productions() {
            for body in bodies {
                let mut words: HashSet<Vec<Terminal>> = HashSet::from([vec![]]);
                if !is_epsilon_body(body) {
                    for symbol in body {
                        let options: HashSet<Vec<Terminal>> = match symbol {
                            Symbol::T(terminal) => HashSet::from([vec![terminal.clone()]]),
                            Symbol::V(var) => language.get(var).cloned().unwrap_or_default(),
                            Symbol::Epsilon => HashSet::from([vec![]]),
                        };
                        let mut next = HashSet::new();
                        for prefix in &words {
                            for suffix in &options {
                                if prefix.len() + suffix.len() <= max_len {
                                    let mut word = prefix.clone();
                                    word.extend(suffix.iter().cloned());
                                    next.insert(word);
                                }
                            }
                        }
                        words = next;
                        if words.is_empty() {
                            break;
                        }
                    }
                }
                let entry = language.entry(head.clone()).or_default();
                for word in words {
                    changed |= entry.insert(word);
                }
            }
        }
        if !changed {
            break;
        }
    }
    language.remove(variable).unwrap_or_default()
}

pub fn bounded_language(cfg: &CFG, max_len: usize) -> HashSet<Vec<Terminal>> {
    bounded_language_of(cfg, cfg.get_start_symbol(), max_len)
}

/// Re-applies the derivation's rules from the start symbol, always rewriting the leftmost
/// variable, and checks every recorded form and the final string.
pub fn replays(cfg: &CFG, derivation: &Derivation) -> bool {
    let mut form = vec![Symbol::V(cfg.get_start_symbol().clone())];
    for step in &derivation.steps {
        let Some(index) = form.iter().position(Symbol::is_variable) else {
            return false;
        };
        if form[index] != Symbol::V(step.production.head.clone()) {
            return false;
        }
        if !cfg
            .get_productions_of(&step.production.head)
            .contains(&step.production.body)
        {
            return false;
        }
        let replacement: Vec<Symbol> = if is_epsilon_body(&step.production.body) {
            vec![]
        } else {
            step.production.body.clone()
        };
        let mut next = form[..index].to_vec();
        next.extend(replacement);
        next.extend_from_slice(&form[index + 1..]);
        form = next;
        if form != step.form {
            return false;
        }
    }
    let expected: Vec<Symbol> = derivation.result.iter().cloned().map(Symbol::T).collect();
    form == expected
}

/// All words over `alphabet` of length at most `max_len`.
pub fn all_words(alphabet: &[&str], max_len: usize) -> Vec<Vec<Terminal>> {
    let mut words = vec![vec![]];
    let mut layer: Vec<Vec<Terminal>> = vec![vec![]];
    for _ in 0..max_len {
        let mut next = Vec::new();
        for word in &layer {
            for letter in alphabet {
                let mut longer = word.clone();
                longer.push(Terminal::new(letter));
                next.push(longer);
            }
        }
        words.extend(next.iter().cloned());
        layer = next;
    }
    words
}

pub const VARIABLE_NAMES: [&str; 4] = ["S", "A", "B", "C"];
pub const TERMINAL_NAMES: [&str; 2] = ["a", "b"];

fn arb_symbol() -> impl Strategy<Value = Symbol> {
    prop_oneof![
        3 => prop::sample::select(VARIABLE_NAMES.to_vec()).prop_map(v),
        2 => prop::sample::select(TERMINAL_NAMES.to_vec()).prop_map(t),
    ]
}

fn arb_body() -> impl Strategy<Value = Body> {
    prop_oneof![
        1 => Just(eps()),
        5 => prop::collection::vec(arb_symbol(), 1..=3),
    ]
}

/// Small random grammars over `S A B C` and `a b`, with epsilon and unit productions.
pub fn arb_grammar() -> impl Strategy<Value = CFG> {
    prop::collection::vec(prop::collection::vec(arb_body(), 0..=3), VARIABLE_NAMES.len()).prop_map(
        |bodies_per_variable| {
            let variables = VARIABLE_NAMES.iter().map(|n| Variable::new(n)).collect();
            let terminals = TERMINAL_NAMES.iter().map(|n| Terminal::new(n)).collect();
            let productions = VARIABLE_NAMES
                .iter()
                .map(|n| Variable::new(n))
                .zip(bodies_per_variable);
            CFG::new(variables, terminals, Variable::new("S"), productions)
                .expect("generated grammar is well formed")
        },
    )
}

use std::collections::VecDeque;
use std::fmt::{Display, Formatter};
use tracing::{debug, trace, warn};

use crate::cfg::cfg::CFG;
use crate::cfg::production::{is_epsilon_body, join_symbols, Production, Symbol};
use crate::cfg::terminal::Terminal;
use crate::cfg::text::split_longest_match;
use crate::cfg::variable::Variable;
use crate::error::CfgError;
use crate::language::Language;
use crate::options::SearchOptions;

/// One rewrite of a leftmost derivation: the rule applied and the sentential form it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivationStep {
    pub production: Production,
    pub form: Vec<Symbol>,
}

impl DerivationStep {
    pub fn form_string(&self) -> String {
        join_symbols(&self.form)
    }
}

/// A leftmost derivation from the start symbol to a string of terminals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Derivation {
    pub start: Variable,
    pub steps: Vec<DerivationStep>,
    pub result: Vec<Terminal>,
}

impl Derivation {
    pub fn result_string(&self) -> String {
        join_symbols(&self.result.iter().cloned().map(Symbol::T).collect::<Vec<_>>())
    }

    /// The applied rules, in order.
    pub fn productions(&self) -> impl Iterator<Item = &Production> {
        self.steps.iter().map(|step| &step.production)
    }
}

impl Display for Derivation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Start: {}", self.start)?;
        for step in &self.steps {
            writeln!(f, "Apply {}  =>  {}", step.production, step.form_string())?;
        }
        write!(f, "Result: {}", self.result_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A derivation producing exactly the target.
    Found(Derivation),
    /// Every branch within the explored space was discarded; the target was not derived.
    /// Conclusive only when no sentential form can shrink, i.e. for epsilon-free grammars and
    /// grammars in normal form.
    NotFound,
    /// The iteration budget ran out with branches left. Inconclusive.
    BudgetExhausted { iterations: usize },
}

impl SearchOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found(_))
    }

    pub fn derivation(&self) -> Option<&Derivation> {
        match self {
            SearchOutcome::Found(derivation) => Some(derivation),
            _ => None,
        }
    }
}

fn matches_target(form: &[Symbol], target: &[Terminal]) -> bool {
    form.len() == target.len()
        && form
            .iter()
            .zip(target)
            .all(|(symbol, terminal)| matches!(symbol, Symbol::T(t) if t == terminal))
}

impl CFG {
    /// Breadth-first search over leftmost derivations for one producing `target`.
    ///
    /// Frontier entries are popped oldest first, so the first derivation found is a shortest
    /// one. Forms longer than the target (or than one symbol, for an empty target) are
    /// discarded. That prune is only sound when no sentential form can shrink, i.e. on an
    /// epsilon-free grammar or one in normal form. On other grammars the search may miss
    /// derivations.
    ///
    /// At most `options.max_iterations` entries are popped; running out is reported as
    /// [`SearchOutcome::BudgetExhausted`], not as a failure.
    pub fn search(&self, target: &[Terminal], options: &SearchOptions) -> SearchOutcome {
        let start = self.get_start_symbol();
        let mut frontier: VecDeque<(Vec<Symbol>, Vec<DerivationStep>)> =
            VecDeque::from([(vec![Symbol::V(start.clone())], vec![])]);

        let mut iterations = 0;
        while iterations < options.max_iterations {
            let Some((form, history)) = frontier.pop_front() else {
                debug!(iterations, "search space exhausted");
                return SearchOutcome::NotFound;
            };
            iterations += 1;

            // Find the leftmost variable
            let leftmost = form
                .iter()
                .enumerate()
                .find_map(|(index, symbol)| symbol.as_variable().map(|variable| (index, variable)));
            let Some((index, variable)) = leftmost else {
                if matches_target(&form, target) {
                    debug!(iterations, steps = history.len(), "derivation found");
                    return SearchOutcome::Found(Derivation {
                        start: start.clone(),
                        steps: history,
                        result: target.to_vec(),
                    });
                }
                continue;
            };
            // A lone variable is never pruned, so `start -> eps` can still reach an empty target
            if form.len() > target.len().max(1) {
                continue;
            }
            for body in self.get_productions_of(variable) {
                let mut next = Vec::with_capacity(form.len() + body.len());
                next.extend_from_slice(&form[..index]);
                if !is_epsilon_body(body) {
                    next.extend(body.iter().cloned());
                }
                next.extend_from_slice(&form[index + 1..]);

                let mut next_history = Vec::with_capacity(history.len() + 1);
                next_history.extend(history.iter().cloned());
                next_history.push(DerivationStep {
                    production: Production::new(variable.clone(), body.clone()),
                    form: next.clone(),
                });
                trace!(form = %join_symbols(&next), "enqueued");
                frontier.push_back((next, next_history));
            }
        }

        if frontier.is_empty() {
            return SearchOutcome::NotFound;
        }
        warn!(iterations, pending = frontier.len(), "search budget exhausted");
        SearchOutcome::BudgetExhausted { iterations }
    }

    /// Like [`CFG::search`], splitting `target` into terminals by longest match on their names.
    pub fn search_str(
        &self,
        target: &str,
        options: &SearchOptions,
    ) -> Result<SearchOutcome, CfgError> {
        let terminal_names: Vec<&str> = self.terminals().iter().map(Terminal::get_name).collect();
        let tokens = split_longest_match(target, &terminal_names)
            .map_err(|offset| CfgError::UnknownTerminal(target[offset..].to_string()))?;
        let terminals: Vec<Terminal> = tokens.into_iter().map(Terminal::new).collect();
        Ok(self.search(&terminals, options))
    }
}

impl Language for CFG {
    fn accepts(&self, input: &[Terminal]) -> bool {
        self.search(input, &SearchOptions::default()).is_found()
    }

    fn accepts_string(&self, input: &str) -> bool {
        self.search_str(input, &SearchOptions::default())
            .is_ok_and(|outcome| outcome.is_found())
    }
}

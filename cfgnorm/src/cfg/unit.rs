use hashbrown::{HashMap, HashSet};
use tracing::{debug, trace};

use crate::cfg::cfg::{push_unique, ProductionMap, CFG};
use crate::cfg::production::{is_epsilon_body, is_unit_body, Symbol};
use crate::cfg::variable::Variable;
use crate::error::CfgError;

impl CFG {
    /// Returns, for every variable `A`, the variables reachable from `A` through chains of
    /// unit productions (`A -> B`), always including `A` itself.
    pub fn get_unit_closure(&self) -> HashMap<Variable, HashSet<Variable>> {
        let mut unit_productions: HashMap<&Variable, HashSet<&Variable>> = HashMap::new();
        for (head, productions) in self.productions() {
            for production in productions {
                if let [Symbol::V(body)] = production.as_slice() {
                    unit_productions.entry(head).or_default().insert(body);
                }
            }
        }

        let mut closure: HashMap<Variable, HashSet<Variable>> = self
            .variables()
            .iter()
            .map(|var| (var.clone(), HashSet::from([var.clone()])))
            .collect();
        // pairs (A, B) with B in U(A) whose unit successors still have to be followed
        let mut to_process: Vec<(&Variable, &Variable)> =
            self.variables().iter().map(|var| (var, var)).collect();
        while let Some((head, body)) = to_process.pop() {
            let Some(next_bodies) = unit_productions.get(body) else {
                continue;
            };
            for next_body in next_bodies {
                let reached = closure.entry(head.clone()).or_default();
                if reached.insert((*next_body).clone()) {
                    trace!(from = %head, to = %next_body, "unit pair");
                    to_process.push((head, *next_body));
                }
            }
        }

        closure
    }

    /// Removes unit productions from the CFG
    ///
    /// Each variable `A` receives the non-unit bodies of every `B` in its unit closure. The
    /// input must be epsilon-free apart from `start -> eps`, and that body is never copied
    /// into another head.
    pub fn without_unit_productions(&self) -> Result<Self, CfgError> {
        self.check_invariants()?;
        let start = self.get_start_symbol();
        if let Some((head, _)) = self
            .productions()
            .iter()
            .find(|(head, bodies)| *head != start && bodies.iter().any(|b| is_epsilon_body(b)))
        {
            return Err(CfgError::Precondition {
                stage: "unit elimination",
                reason: format!(
                    "`{head}` has an epsilon production; remove epsilon productions first"
                ),
            });
        }

        let closure = self.get_unit_closure();

        let mut new_productions = ProductionMap::with_capacity(self.variables().len());
        // keep the original head order, then any variable without productions
        let heads = self
            .productions()
            .keys()
            .chain(self.variables().iter().filter(|v| !self.productions().contains_key(*v)));
        for head in heads {
            let bodies = new_productions.entry(head.clone()).or_default();
            let Some(reached) = closure.get(head) else {
                continue;
            };
            // the head's own bodies first, then the rest of the closure in production order
            let ordered = std::iter::once(head).chain(
                self.productions()
                    .keys()
                    .filter(|b| *b != head && reached.contains(*b)),
            );
            for body_head in ordered {
                for production in self.get_productions_of(body_head) {
                    if is_unit_body(production) {
                        continue;
                    }
                    if is_epsilon_body(production) && head != start {
                        continue;
                    }
                    push_unique(bodies, production.clone());
                }
            }
        }

        let result = self.with_productions(self.variables().clone(), new_productions);
        debug!(
            before = self.production_count(),
            after = result.production_count(),
            "removed unit productions"
        );
        Ok(result)
    }
}

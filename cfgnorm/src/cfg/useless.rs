use hashbrown::HashSet;
use std::collections::VecDeque;
use tracing::debug;

use crate::cfg::cfg::{ProductionMap, CFG};
use crate::cfg::production::Symbol;
use crate::cfg::variable::Variable;
use crate::error::CfgError;

impl CFG {
    /// Returns the variables that derive at least one terminal string.
    ///
    /// An epsilon body counts as a terminal string (the empty one).
    pub fn get_generating_symbols(&self) -> HashSet<Variable> {
        self._get_generating_symbols(false)
    }

    /// Returns the variables that occur in some sentential form derived from the start symbol.
    pub fn get_reachable_symbols(&self) -> HashSet<Variable> {
        let start = self.get_start_symbol();
        let mut reachable_symbols = HashSet::from([start.clone()]);
        let mut to_process = VecDeque::from([start]);
        while let Some(symbol) = to_process.pop_front() {
            for production in self.get_productions_of(symbol) {
                for next_symbol in production.iter().filter_map(Symbol::as_variable) {
                    if reachable_symbols.insert(next_symbol.clone()) {
                        to_process.push_back(next_symbol);
                    }
                }
            }
        }

        reachable_symbols
    }

    /// Returns a new CFG restricted to `symbols`: other variables and every body mentioning
    /// one of them are dropped. The start symbol is always kept, possibly without bodies.
    pub fn reduced_to_symbols(&self, symbols: &HashSet<Variable>) -> Self {
        let start = self.get_start_symbol();
        let keep = |v: &Variable| symbols.contains(v) || v == start;

        let variables: HashSet<Variable> = self
            .variables()
            .iter()
            .filter(|v| keep(*v))
            .cloned()
            .collect();
        let mut productions = ProductionMap::with_capacity(variables.len());
        for (head, bodies) in self.productions() {
            if !keep(head) {
                continue;
            }
            let retained = bodies
                .iter()
                .filter(|body| {
                    body.iter()
                        .all(|s| s.as_variable().map_or(true, |v| symbols.contains(v)))
                })
                .cloned()
                .collect();
            productions.insert(head.clone(), retained);
        }
        if !productions.contains_key(start) {
            productions.insert(start.clone(), vec![]);
        }

        self.with_productions(variables, productions)
    }

    /// Removes non-generating symbols, then symbols unreachable from the start symbol.
    ///
    /// The order matters: a variable may only be reachable through a body that mentions a
    /// non-generating variable. If the start symbol is not generating, the result has no
    /// productions at all; the language is empty.
    pub fn without_useless_symbols(&self) -> Result<Self, CfgError> {
        self.check_invariants()?;
        let generating_symbols = self.get_generating_symbols();
        // Filter out non-generating symbols from the productions
        let cfg_temp = self.reduced_to_symbols(&generating_symbols);
        let reachable_symbols = cfg_temp.get_reachable_symbols();
        let result = cfg_temp.reduced_to_symbols(&reachable_symbols);
        debug!(
            generating = generating_symbols.len(),
            reachable = reachable_symbols.len(),
            variables = result.variables().len(),
            "removed useless symbols"
        );
        if !generating_symbols.contains(self.get_start_symbol()) {
            debug!(start = %self.get_start_symbol(), "start symbol is not generating, language is empty");
        }
        Ok(result)
    }
}

use hashbrown::HashSet;
use tracing::debug;

use crate::cfg::cfg::{push_unique, ProductionMap, CFG};
use crate::cfg::production::{is_epsilon_body, is_unit_body, Body, Symbol};
use crate::cfg::terminal::Terminal;
use crate::cfg::variable::Variable;
use crate::error::CfgError;
use crate::options::CleaningOptions;

/// Mints variable names that collide with no variable or terminal of a grammar, nor with any
/// name minted before. Names depend only on the grammar and the order of requests.
#[derive(Debug, Clone)]
pub(crate) struct FreshNames {
    taken: HashSet<String>,
    counter: usize,
}

impl FreshNames {
    pub fn for_grammar(cfg: &CFG) -> Self {
        let taken = cfg
            .variables()
            .iter()
            .map(|v| v.name.clone())
            .chain(cfg.terminals().iter().map(|t| t.name.clone()))
            .collect();
        FreshNames { taken, counter: 1 }
    }

    /// `X` followed by the upper-cased terminal (`a` gives `XA`), or `X<n>` when that is taken.
    pub fn for_terminal(&mut self, terminal: &Terminal) -> Variable {
        let preferred = format!("X{}", terminal.get_name().to_uppercase());
        if self.taken.insert(preferred.clone()) {
            return Variable::from_string(preferred);
        }
        self.numbered("X")
    }

    /// `<prefix><n>` with the smallest counter value not yet used or taken.
    pub fn numbered(&mut self, prefix: &str) -> Variable {
        loop {
            let candidate = format!("{prefix}{}", self.counter);
            self.counter += 1;
            if self.taken.insert(candidate.clone()) {
                return Variable::from_string(candidate);
            }
        }
    }
}

impl CFG {
    /// Cleans the CFG: epsilon productions, then unit productions, then useless symbols.
    ///
    /// Each stage relies on what the previous one established, so the order is fixed.
    pub fn cleaned(&self, options: &CleaningOptions) -> Result<Self, CfgError> {
        let cfg_clean = self.without_epsilon(options)?;
        let cfg_clean = cfg_clean.without_unit_productions()?;
        cfg_clean.without_useless_symbols()
    }

    /// Cleans the CFG and converts the result to Chomsky Normal Form.
    pub fn normalized(&self, options: &CleaningOptions) -> Result<Self, CfgError> {
        self.cleaned(options)?.to_normal_form()
    }

    /// Ensures that terminals only appear in single-terminal productions. (part 1 of normal
    /// form construction)
    ///
    /// Every terminal in a body of length two or more is replaced by a variable dedicated to
    /// it, whose only production is `X -> a`. One variable is minted per terminal and reused.
    pub fn with_only_single_terminal_productions(&self) -> Self {
        let mut fresh = FreshNames::for_grammar(self);
        self._with_only_single_terminal_productions(&mut fresh)
    }

    fn _with_only_single_terminal_productions(&self, fresh: &mut FreshNames) -> Self {
        let mut variables = self.variables().clone();
        let mut productions_list = ProductionMap::with_capacity(self.productions().len());
        // keep track of which symbols needed to be introduced
        let mut added_variables: Vec<(Terminal, Variable)> = Vec::new();

        for (head, productions) in self.productions() {
            let mut productions_list_head = Vec::with_capacity(productions.len());
            for production in productions {
                if production.len() == 1 {
                    push_unique(&mut productions_list_head, production.clone());
                    continue;
                }
                // replace the terminals with new variables
                let new_production: Body = production
                    .iter()
                    .map(|symbol| match symbol {
                        Symbol::T(terminal) => {
                            let existing = added_variables
                                .iter()
                                .find(|(t, _)| t == terminal)
                                .map(|(_, v)| v.clone());
                            let variable = existing.unwrap_or_else(|| {
                                let variable = fresh.for_terminal(terminal);
                                added_variables.push((terminal.clone(), variable.clone()));
                                variable
                            });
                            Symbol::V(variable)
                        }
                        _ => symbol.clone(),
                    })
                    .collect();
                push_unique(&mut productions_list_head, new_production);
            }
            productions_list.insert(head.clone(), productions_list_head);
        }

        // add productions for the new variables
        for (terminal, variable) in added_variables {
            variables.insert(variable.clone());
            productions_list.insert(variable, vec![vec![Symbol::T(terminal)]]);
        }

        self.with_productions(variables, productions_list)
    }

    /// Decomposes productions of the form `A -> B C D E` into `A -> B X`, `X -> C Y` and
    /// `Y -> D E`. (part 2 of normal form construction)
    ///
    /// A body of length `k` becomes a chain of `k - 1` binary productions, each link headed by
    /// a fresh variable with exactly one production.
    pub fn with_decomposed_productions(&self) -> Self {
        let mut fresh = FreshNames::for_grammar(self);
        self._with_decomposed_productions(&mut fresh)
    }

    fn _with_decomposed_productions(&self, fresh: &mut FreshNames) -> Self {
        let mut variables = self.variables().clone();
        let mut productions_list = ProductionMap::with_capacity(self.productions().len());
        let mut added_productions: Vec<(Variable, Body)> = Vec::new();

        // only iterate over the "old" productions
        for (head, productions) in self.productions() {
            let mut productions_list_head = Vec::with_capacity(productions.len());
            for production in productions {
                if production.len() <= 2 {
                    push_unique(&mut productions_list_head, production.clone());
                    continue;
                }

                // Create the new productions
                let mut cur_head: Option<Variable> = None;
                for symbol in &production[..production.len() - 2] {
                    let new_variable = fresh.numbered("Y");
                    variables.insert(new_variable.clone());
                    let new_production = vec![symbol.clone(), Symbol::V(new_variable.clone())];
                    match cur_head {
                        None => push_unique(&mut productions_list_head, new_production),
                        Some(link) => added_productions.push((link, new_production)),
                    }
                    cur_head = Some(new_variable);
                }
                let last = production[production.len() - 2..].to_vec();
                if let Some(link) = cur_head {
                    added_productions.push((link, last));
                }
            }
            productions_list.insert(head.clone(), productions_list_head);
        }

        for (link, production) in added_productions {
            productions_list.insert(link, vec![production]);
        }

        self.with_productions(variables, productions_list)
    }

    /// Converts a cleaned CFG to Chomsky Normal Form.
    ///
    /// Afterwards every body is a single terminal or exactly two variables. The one exception
    /// is `start -> eps`, kept when the empty string is in the language.
    ///
    /// The input must be free of unit productions and of epsilon productions other than
    /// `start -> eps`; see [`CFG::cleaned`].
    pub fn to_normal_form(&self) -> Result<Self, CfgError> {
        self.check_invariants()?;
        let start = self.get_start_symbol();
        for (head, bodies) in self.productions() {
            for body in bodies {
                let reason = if is_unit_body(body) {
                    Some("unit production")
                } else if is_epsilon_body(body) && head != start {
                    Some("epsilon production")
                } else {
                    None
                };
                if let Some(reason) = reason {
                    return Err(CfgError::Precondition {
                        stage: "normal form conversion",
                        reason: format!("`{head}` has a {reason}; clean the grammar first"),
                    });
                }
            }
        }
        if self.is_normal_form() {
            return Ok(self.clone());
        }

        let mut fresh = FreshNames::for_grammar(self);
        let no_terminal_cfg = self._with_only_single_terminal_productions(&mut fresh);
        let decomposed_cfg = no_terminal_cfg._with_decomposed_productions(&mut fresh);
        debug!(
            variables_before = self.variables().len(),
            variables_after = decomposed_cfg.variables().len(),
            productions_after = decomposed_cfg.production_count(),
            "converted to normal form"
        );

        Ok(decomposed_cfg)
    }
}

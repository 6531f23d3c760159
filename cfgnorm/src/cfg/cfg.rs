use hashbrown::{HashMap, HashSet};
use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use std::fmt::{Display, Formatter};
use tracing::trace;

use crate::cfg::production::{is_epsilon_body, is_unit_body, Body, Production, Symbol};
use crate::cfg::terminal::Terminal;
use crate::cfg::variable::Variable;
use crate::error::CfgError;

/// Production rules keyed by head, in insertion order. Bodies under one head never repeat.
pub type ProductionMap = IndexMap<Variable, Vec<Body>>;

/// Appends `body` unless an equal body is already present.
pub fn push_unique(bodies: &mut Vec<Body>, body: Body) {
    if !bodies.contains(&body) {
        bodies.push(body);
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ImpactsAndRemainingList {
    pub heads: Vec<Variable>,                                       // head index -> variable
    pub impacts_terminals: HashMap<Terminal, Vec<(usize, usize)>>, // terminal -> (head, body) occurrences
    pub impacts_variables: HashMap<Variable, Vec<(usize, usize)>>, // variable -> (head, body) occurrences
    pub remaining_list: Vec<Vec<usize>>, // head -> symbols still unresolved per body
    pub added_impacts: Vec<usize>,       // heads with an epsilon body
}

#[derive(Debug, Clone)]
pub struct CFG {
    variables: HashSet<Variable>,
    terminals: HashSet<Terminal>,
    start_symbol: Variable,
    productions: ProductionMap,

    _impacts_and_remaining_list: OnceCell<ImpactsAndRemainingList>,
    _is_cleaned: OnceCell<bool>,
    _in_normal_form: OnceCell<bool>,
}

impl CFG {
    /// Creates a new Context-Free Grammar, validating every structural invariant.
    ///
    /// Repeated bodies under one head are kept once, in first-seen order.
    pub fn new<I>(
        variables: HashSet<Variable>,
        terminals: HashSet<Terminal>,
        start_symbol: Variable,
        productions: I,
    ) -> Result<Self, CfgError>
    where
        I: IntoIterator<Item = (Variable, Vec<Body>)>,
    {
        let mut production_map = ProductionMap::new();
        for (head, bodies) in productions {
            let entry = production_map.entry(head).or_default();
            for body in bodies {
                push_unique(entry, body);
            }
        }
        let cfg = CFG::from_parts(variables, terminals, start_symbol, production_map);
        cfg.check_invariants()?;
        Ok(cfg)
    }

    /// A convenience constructor to create a CFG from a start symbol and a list of productions.
    ///
    /// Variables are collected from the heads and bodies, terminals from the bodies.
    pub fn from_start_and_productions(
        start_variable: Variable,
        productions: Vec<Production>,
    ) -> Result<Self, CfgError> {
        let mut variables = HashSet::from([start_variable.clone()]);
        let mut terminals = HashSet::new();
        let mut production_map = ProductionMap::new();

        for production in productions {
            variables.insert(production.head.clone());
            for symbol in &production.body {
                match symbol {
                    Symbol::V(var) => {
                        variables.insert(var.clone());
                    }
                    Symbol::T(term) => {
                        terminals.insert(term.clone());
                    }
                    Symbol::Epsilon => {}
                }
            }
            production_map
                .entry(production.head)
                .or_default()
                .push(production.body);
        }

        CFG::new(variables, terminals, start_variable, production_map)
    }

    /// Assembles a grammar without validation. Stages use this for outputs they build from an
    /// already validated grammar.
    pub(crate) fn from_parts(
        variables: HashSet<Variable>,
        terminals: HashSet<Terminal>,
        start_symbol: Variable,
        productions: ProductionMap,
    ) -> Self {
        CFG {
            variables,
            terminals,
            start_symbol,
            productions,
            _impacts_and_remaining_list: OnceCell::new(),
            _is_cleaned: OnceCell::new(),
            _in_normal_form: OnceCell::new(),
        }
    }

    /// Same terminals and start symbol, new variables and productions.
    pub(crate) fn with_productions(
        &self,
        variables: HashSet<Variable>,
        productions: ProductionMap,
    ) -> Self {
        CFG::from_parts(
            variables,
            self.terminals.clone(),
            self.start_symbol.clone(),
            productions,
        )
    }

    /// Checks that the grammar is well formed:
    /// - the start symbol is a variable,
    /// - variables and terminals do not share a name,
    /// - productions are keyed by variables only,
    /// - bodies are non-empty, use only known symbols, and the empty marker only alone.
    pub fn check_invariants(&self) -> Result<(), CfgError> {
        if !self.variables.contains(&self.start_symbol) {
            return Err(CfgError::UnknownStart(self.start_symbol.display()));
        }
        if let Some(variable) = self
            .variables
            .iter()
            .find(|v| self.terminals.contains(v.get_name()))
        {
            return Err(CfgError::OverlappingSymbol(variable.display()));
        }
        for (head, bodies) in &self.productions {
            if !self.variables.contains(head) {
                return Err(CfgError::UndeclaredHead(head.display()));
            }
            for body in bodies {
                if body.is_empty() || (body.len() > 1 && body.contains(&Symbol::Epsilon)) {
                    return Err(CfgError::MisplacedEpsilon {
                        head: head.display(),
                    });
                }
                for symbol in body {
                    let known = match symbol {
                        Symbol::V(v) => self.variables.contains(v),
                        Symbol::T(t) => self.terminals.contains(t),
                        Symbol::Epsilon => true,
                    };
                    if !known {
                        return Err(CfgError::UndefinedSymbol {
                            head: head.display(),
                            symbol: symbol.get_name().to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    pub fn variables(&self) -> &HashSet<Variable> {
        &self.variables
    }

    pub fn terminals(&self) -> &HashSet<Terminal> {
        &self.terminals
    }

    /// Returns the start symbol of the grammar
    pub fn get_start_symbol(&self) -> &Variable {
        &self.start_symbol
    }

    pub fn productions(&self) -> &ProductionMap {
        &self.productions
    }

    /// Returns the bodies of a given variable (empty if it has none)
    pub fn get_productions_of(&self, variable: &Variable) -> &[Body] {
        self.productions
            .get(variable)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns the production rules for the grammar
    pub fn get_productions(&self) -> Vec<Production> {
        self.productions
            .iter()
            .flat_map(|(head, bodies)| {
                bodies
                    .iter()
                    .map(move |body| Production::new(head.clone(), body.clone()))
            })
            .collect()
    }

    pub fn production_count(&self) -> usize {
        self.productions.values().map(Vec::len).sum()
    }

    /// Checks if the CFG generates epsilon (the empty string).
    pub fn generates_epsilon(&self) -> bool {
        self.get_nullable_symbols().contains(&self.start_symbol)
    }

    /// The language is empty when the start symbol cannot derive any terminal string.
    pub fn is_empty(&self) -> bool {
        !self.get_generating_symbols().contains(&self.start_symbol)
    }

    pub fn is_normal_form(&self) -> bool {
        *self._in_normal_form.get_or_init(|| self._is_normal_form())
    }

    /// Every body is one terminal or two variables; `start -> eps` is the only other body allowed.
    fn _is_normal_form(&self) -> bool {
        for (head, bodies) in &self.productions {
            for body in bodies {
                let ok = match body.as_slice() {
                    [Symbol::T(_)] => true,
                    [Symbol::V(_), Symbol::V(_)] => true,
                    [Symbol::Epsilon] => *head == self.start_symbol,
                    _ => false,
                };
                if !ok {
                    return false;
                }
            }
        }
        true
    }

    pub fn is_cleaned(&self) -> bool {
        *self._is_cleaned.get_or_init(|| self._is_cleaned())
    }

    /// No epsilon bodies outside the start symbol, no unit productions, and every variable both
    /// generating and reachable. A grammar reduced to a bare start symbol (empty language)
    /// also counts as cleaned.
    fn _is_cleaned(&self) -> bool {
        let no_epsilon_or_unit = self.productions.iter().all(|(head, bodies)| {
            bodies.iter().all(|body| {
                !is_unit_body(body) && (!is_epsilon_body(body) || *head == self.start_symbol)
            })
        });
        if !no_epsilon_or_unit {
            return false;
        }
        let generating = self.get_generating_symbols();
        let reachable = self.get_reachable_symbols();
        let all_useful = self
            .variables
            .iter()
            .all(|v| generating.contains(v) && reachable.contains(v));
        let bare_start = self.variables.len() == 1 && self.production_count() == 0;
        all_useful || bare_start
    }

    pub(crate) fn get_impacts_and_remaining_list(&self) -> &ImpactsAndRemainingList {
        self._impacts_and_remaining_list
            .get_or_init(|| self._get_impacts_and_remaining_list())
    }

    fn _get_impacts_and_remaining_list(&self) -> ImpactsAndRemainingList {
        let heads: Vec<Variable> = self.productions.keys().cloned().collect();
        let mut added_impacts = Vec::new();
        // map head -> "remaining size of each of its bodies"
        let mut remaining_list = Vec::with_capacity(self.productions.len());
        // map symbol -> impacts
        let mut impacts_terminals: HashMap<Terminal, Vec<(usize, usize)>> = HashMap::new();
        let mut impacts_variables: HashMap<Variable, Vec<(usize, usize)>> = HashMap::new();
        for (head, (_, bodies)) in self.productions.iter().enumerate() {
            let mut remaining = Vec::with_capacity(bodies.len());
            for body in bodies {
                if is_epsilon_body(body) {
                    added_impacts.push(head);
                    continue;
                }

                remaining.push(body.len());
                let index_impact = remaining.len() - 1;
                for symbol in body {
                    match symbol {
                        Symbol::T(t) => impacts_terminals
                            .entry(t.clone())
                            .or_default()
                            .push((head, index_impact)),
                        Symbol::V(v) => impacts_variables
                            .entry(v.clone())
                            .or_default()
                            .push((head, index_impact)),
                        Symbol::Epsilon => {}
                    }
                }
            }
            remaining_list.push(remaining);
        }
        ImpactsAndRemainingList {
            heads,
            impacts_terminals,
            impacts_variables,
            remaining_list,
            added_impacts,
        }
    }

    /// Least fixpoint of "some body has only resolved symbols", shared by the nullable and
    /// generating computations.
    ///
    /// Heads with an epsilon body are resolved from the start. For generating symbols every
    /// terminal is resolved as well; for nullable symbols no terminal ever is.
    pub(crate) fn _get_generating_symbols(&self, nullable: bool) -> HashSet<Variable> {
        let impact_and_remaining_list = self.get_impacts_and_remaining_list();
        let mut generating_symbols: HashSet<Variable> = HashSet::new();
        let mut to_process: Vec<Symbol> = vec![];

        let heads = &impact_and_remaining_list.heads;
        for &head in &impact_and_remaining_list.added_impacts {
            let variable = &heads[head];
            if generating_symbols.insert(variable.clone()) {
                to_process.push(Symbol::V(variable.clone()));
            }
        }
        if !nullable {
            to_process.extend(self.terminals.iter().cloned().map(Symbol::T));
        }

        let mut remaining_lists = impact_and_remaining_list.remaining_list.clone();
        let impacts_terminals = &impact_and_remaining_list.impacts_terminals;
        let impacts_variables = &impact_and_remaining_list.impacts_variables;
        while let Some(symbol) = to_process.pop() {
            let impacts = match &symbol {
                Symbol::T(t) => impacts_terminals.get(t),
                Symbol::V(v) => impacts_variables.get(v),
                Symbol::Epsilon => None,
            };
            let Some(impacts) = impacts else {
                continue;
            };
            for &(head, index_impact) in impacts {
                let head_variable = &heads[head];
                if generating_symbols.contains(head_variable) {
                    continue;
                }
                remaining_lists[head][index_impact] -= 1;
                if remaining_lists[head][index_impact] == 0 {
                    trace!(variable = %head_variable, resolved_by = %symbol.get_name(), "resolved");
                    generating_symbols.insert(head_variable.clone());
                    to_process.push(Symbol::V(head_variable.clone()));
                }
            }
        }

        generating_symbols
    }
}

/// Equality of grammars as sets: same variables, terminals and start, and the same set of bodies
/// under every head. Body order and heads without bodies are ignored.
impl PartialEq for CFG {
    fn eq(&self, other: &Self) -> bool {
        fn body_sets(cfg: &CFG) -> HashMap<&Variable, HashSet<&Body>> {
            cfg.productions
                .iter()
                .filter(|(_, bodies)| !bodies.is_empty())
                .map(|(head, bodies)| (head, bodies.iter().collect()))
                .collect()
        }
        self.variables == other.variables
            && self.terminals == other.terminals
            && self.start_symbol == other.start_symbol
            && body_sets(self) == body_sets(other)
    }
}

impl Eq for CFG {}

impl Display for CFG {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

use std::fmt::{Display, Formatter};

use crate::cfg::terminal::{Terminal, EPSILON};
use crate::cfg::variable::Variable;

#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Symbol {
    T(Terminal),
    V(Variable),
    /// The empty string. Only ever appears as the sole symbol of a body.
    Epsilon,
}

/// A production body: a sequence of symbols, or `[Symbol::Epsilon]` for an epsilon production.
pub type Body = Vec<Symbol>;

impl Symbol {
    pub fn get_name(&self) -> &str {
        match self {
            Symbol::T(t) => t.get_name(),
            Symbol::V(v) => v.get_name(),
            Symbol::Epsilon => EPSILON,
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Symbol::V(_))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::T(_))
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Symbol::V(v) => Some(v),
            _ => None,
        }
    }
}

pub fn epsilon_body() -> Body {
    vec![Symbol::Epsilon]
}

pub fn is_epsilon_body(body: &[Symbol]) -> bool {
    matches!(body, [Symbol::Epsilon])
}

/// A body consisting of exactly one variable.
pub fn is_unit_body(body: &[Symbol]) -> bool {
    matches!(body, [Symbol::V(_)])
}

/// Joins symbol names, without separator when every name is a single character.
pub fn join_symbols<'a, I>(symbols: I) -> String
where
    I: IntoIterator<Item = &'a Symbol>,
{
    let names: Vec<&str> = symbols.into_iter().map(|s| s.get_name()).collect();
    if names.iter().all(|n| n.chars().count() == 1) {
        names.concat()
    } else {
        names.join(" ")
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Production {
    pub head: Variable, // The head of the production (e.g., "S", "A")
    pub body: Body,     // The body of the production (e.g., "Ab", "aS", "eps")
}

impl Production {
    /// Create a new Production
    pub fn new(head: Variable, body: Body) -> Self {
        Production { head, body }
    }

    pub fn is_unit(&self) -> bool {
        is_unit_body(&self.body)
    }

    pub fn is_epsilon(&self) -> bool {
        is_epsilon_body(&self.body)
    }

    /// Display the production as a string
    pub fn display(&self) -> String {
        format!("{} -> {}", self.head.get_name(), join_symbols(&self.body))
    }
}

impl Display for Production {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

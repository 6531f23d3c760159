use std::borrow::Borrow;
use std::fmt::{Display, Formatter};

/// Keyword used for the empty string when a grammar is written out.
pub const EPSILON: &str = "eps";

// Spellings of the empty string accepted when reading a grammar.
pub const TERMINAL_EPSILON_SYMBOLS: [&str; 6] = [EPSILON, "epsilon", "ε", "ϵ", "Є", "$"];

pub fn is_epsilon_keyword(name: &str) -> bool {
    TERMINAL_EPSILON_SYMBOLS.contains(&name)
}

#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Terminal {
    pub name: String, // Textual representation of the symbol
}

impl Terminal {
    /// Create a new Terminal
    pub fn new(name: &str) -> Self {
        Terminal {
            name: name.to_string(),
        }
    }

    /// Create a new Terminal from a String
    pub fn from_string(name: String) -> Self {
        Terminal { name }
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn display(&self) -> String {
        self.name.clone()
    }
}

impl Borrow<str> for Terminal {
    fn borrow(&self) -> &str {
        &self.name
    }
}

impl Display for Terminal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

use std::borrow::Borrow;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Variable {
    pub name: String, // The name of the variable (e.g., "S", "A", "XA")
}

impl Variable {
    /// Create a new Variable
    pub fn new(name: &str) -> Self {
        Variable {
            name: name.to_string(),
        }
    }

    /// Create a new Variable from a String
    pub fn from_string(name: String) -> Self {
        Variable { name }
    }

    /// Get the name of the variable
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Display the variable as its name
    pub fn display(&self) -> String {
        self.name.clone()
    }
}

// Hash of a single-field struct equals the hash of the field, so lookups by &str are sound.
impl Borrow<str> for Variable {
    fn borrow(&self) -> &str {
        &self.name
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

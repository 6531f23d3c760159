pub mod cfg;
pub mod error;
pub mod language;
pub mod options;

pub use cfg::cfg::CFG;
pub use cfg::derivation::{Derivation, DerivationStep, SearchOutcome};
pub use cfg::production::{Body, Production, Symbol};
pub use cfg::terminal::Terminal;
pub use cfg::variable::Variable;
pub use error::{CfgError, ParseError};
pub use language::Language;
pub use options::{CleaningOptions, SearchOptions};

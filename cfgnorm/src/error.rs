//! Error types for grammar construction, loading and transformation.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading a grammar from text.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Fewer than the three required non-blank lines.
    #[error("grammar text has {found} non-blank lines, expected at least 3 (variables, terminals, start)")]
    TooFewLines { found: usize },

    /// A rule line that names a head but no body.
    #[error("line {line}: rule for `{head}` has no body")]
    MissingBody { line: usize, head: String },

    /// A rule head that was not declared as a variable.
    #[error("line {line}: rule head `{head}` is not a declared variable")]
    UndeclaredHead { line: usize, head: String },

    /// Part of a body that matches no declared variable or terminal.
    #[error("line {line}: `{text}` is neither a declared variable nor a declared terminal")]
    UnknownSymbol { line: usize, text: String },

    /// The start line names something that is not a declared variable.
    #[error("start symbol `{0}` is not a declared variable")]
    UnknownStart(String),

    /// A name declared both as a variable and as a terminal.
    #[error("`{0}` is declared both as a variable and as a terminal")]
    OverlappingSymbol(String),

    /// Error reading a grammar file.
    #[error("I/O error reading {path}: {error}")]
    Io {
        path: PathBuf,
        error: std::io::Error,
    },
}

/// Errors raised by the grammar model and its transformations.
#[derive(Debug, Error)]
pub enum CfgError {
    /// A body refers to a symbol that is not in the grammar.
    #[error("production of `{head}` refers to undefined symbol `{symbol}`")]
    UndefinedSymbol { head: String, symbol: String },

    /// The start symbol is not one of the grammar's variables.
    #[error("start symbol `{0}` is not a variable of the grammar")]
    UnknownStart(String),

    /// The empty marker appears inside a longer body, or a body is empty.
    #[error("production of `{head}` uses the empty marker outside a lone `eps` body")]
    MisplacedEpsilon { head: String },

    /// Productions keyed by something that is not a variable of the grammar.
    #[error("productions are given for `{0}`, which is not a variable of the grammar")]
    UndeclaredHead(String),

    /// A name used both as a variable and as a terminal.
    #[error("`{0}` is both a variable and a terminal")]
    OverlappingSymbol(String),

    /// A stage was called on a grammar that does not meet its input requirements.
    #[error("{stage}: {reason}")]
    Precondition { stage: &'static str, reason: String },

    /// Epsilon elimination would enumerate too many variants of one body.
    #[error("a body of `{head}` has {count} nullable positions (limit {limit}); epsilon elimination would emit 2^{count} variants")]
    TooManyNullablePositions {
        head: String,
        count: usize,
        limit: usize,
    },

    /// A query string contains text that matches no terminal.
    #[error("`{0}` is not a terminal of the grammar")]
    UnknownTerminal(String),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

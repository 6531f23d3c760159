use hashbrown::HashSet;
use rustc_hash::FxHashMap;
use std::path::Path;

use crate::cfg::cfg::{ProductionMap, CFG};
use crate::cfg::production::{epsilon_body, is_epsilon_body, Body, Symbol};
use crate::cfg::terminal::{is_epsilon_keyword, Terminal, EPSILON, TERMINAL_EPSILON_SYMBOLS};
use crate::cfg::variable::Variable;
use crate::error::{CfgError, ParseError};

/// Splits `text` into a sequence of `names`, trying longer names first at every position and
/// backtracking when the rest of `text` cannot be split. On failure returns the furthest byte
/// offset at which no name matched.
pub(crate) fn split_longest_match<'n>(text: &str, names: &[&'n str]) -> Result<Vec<&'n str>, usize> {
    let mut sorted: Vec<&'n str> = names.iter().copied().filter(|n| !n.is_empty()).collect();
    sorted.sort_by(|a, b| b.len().cmp(&a.len()));

    let mut tokens = Vec::new();
    // offsets from which no split exists
    let mut dead = vec![false; text.len() + 1];
    let mut furthest = 0;
    if split_from(text, 0, &sorted, &mut dead, &mut furthest, &mut tokens) {
        Ok(tokens)
    } else {
        Err(furthest)
    }
}

fn split_from<'n>(
    text: &str,
    offset: usize,
    sorted: &[&'n str],
    dead: &mut [bool],
    furthest: &mut usize,
    tokens: &mut Vec<&'n str>,
) -> bool {
    if offset == text.len() {
        return true;
    }
    if dead[offset] {
        return false;
    }
    let rest = &text[offset..];
    for name in sorted.iter().filter(|name| rest.starts_with(**name)) {
        tokens.push(*name);
        if split_from(text, offset + name.len(), sorted, dead, furthest, tokens) {
            return true;
        }
        tokens.pop();
    }
    *furthest = (*furthest).max(offset);
    dead[offset] = true;
    false
}

/// Names declared on a header line. Whitespace-separated names are taken as they are; a line
/// without whitespace is one name per character (`SABC`). Spellings of the empty string are
/// reserved and never declared.
fn declared_names(line: &str) -> Vec<String> {
    if line.split_whitespace().nth(1).is_some() {
        return line
            .split_whitespace()
            .filter(|name| !is_epsilon_keyword(name))
            .map(str::to_string)
            .collect();
    }
    let mut keywords = TERMINAL_EPSILON_SYMBOLS;
    // `epsilon` contains `eps`
    keywords.sort_by(|a, b| b.len().cmp(&a.len()));
    let mut line = line.trim().to_string();
    for keyword in keywords {
        line = line.replace(keyword, "");
    }
    line.chars().map(|c| c.to_string()).collect()
}

/// Writes a header line that [`declared_names`] reads back as exactly `names`.
fn header_line(names: &[&str]) -> String {
    match names {
        [] => EPSILON.to_string(),
        // a lone multi-character name would be split per character
        [name] if name.chars().count() > 1 => format!("{name} {EPSILON}"),
        _ => names.join(" "),
    }
}

impl CFG {
    /// Reads a context-free grammar from text.
    ///
    /// Blank lines are ignored. The remaining lines are:
    ///   1. the variables, e.g. `S A B` (or `SAB`),
    ///   2. the terminals, e.g. `a b eps`; the epsilon keyword is not a terminal,
    ///   3. the start symbol,
    ///   4. one rule per line (possibly none), `head body`, where `body` is a string of declared symbols such
    ///      as `aAB` (or `a A B`), or `eps` for the empty string.
    ///
    /// Bodies are split by longest match over the declared names. Accepted spellings of the
    /// empty string are `eps`, `epsilon`, `ε`, `ϵ`, `Є` and `$`.
    pub fn from_text(text: &str) -> Result<Self, CfgError> {
        let lines: Vec<(usize, &str)> = text
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty())
            .collect();
        if lines.len() < 3 {
            return Err(ParseError::TooFewLines { found: lines.len() }.into());
        }

        let variables: HashSet<Variable> = declared_names(lines[0].1)
            .into_iter()
            .map(Variable::from_string)
            .collect();
        let terminals: HashSet<Terminal> = declared_names(lines[1].1)
            .into_iter()
            .map(Terminal::from_string)
            .collect();
        if let Some(variable) = variables.iter().find(|v| terminals.contains(v.get_name())) {
            return Err(ParseError::OverlappingSymbol(variable.display()).into());
        }

        let start_name = lines[2].1;
        if !variables.contains(start_name) {
            return Err(ParseError::UnknownStart(start_name.to_string()).into());
        }
        let start_symbol = Variable::new(start_name);

        let mut symbol_table: FxHashMap<&str, Symbol> = FxHashMap::default();
        for variable in &variables {
            symbol_table.insert(variable.get_name(), Symbol::V(variable.clone()));
        }
        for terminal in &terminals {
            symbol_table.insert(terminal.get_name(), Symbol::T(terminal.clone()));
        }
        let names: Vec<&str> = symbol_table.keys().copied().collect();

        let mut productions = ProductionMap::new();
        for &(line_number, line) in &lines[3..] {
            let (head, body) = CFG::read_line(line_number, line, &variables, &names, &symbol_table)?;
            productions.entry(head).or_insert_with(Vec::new).push(body);
        }

        CFG::new(variables, terminals, start_symbol, productions)
    }

    /// Reads a grammar file in the format of [`CFG::from_text`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CfgError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|error| ParseError::Io {
            path: path.to_path_buf(),
            error,
        })?;
        CFG::from_text(&text)
    }

    /// Parses one rule line into its head and body.
    fn read_line(
        line_number: usize,
        line: &str,
        variables: &HashSet<Variable>,
        names: &[&str],
        symbol_table: &FxHashMap<&str, Symbol>,
    ) -> Result<(Variable, Body), ParseError> {
        let mut parts = line.split_whitespace();
        let head_text = parts.next().unwrap_or_default();
        if !variables.contains(head_text) {
            return Err(ParseError::UndeclaredHead {
                line: line_number,
                head: head_text.to_string(),
            });
        }
        let head = Variable::new(head_text);

        let mut body = Vec::new();
        let mut saw_component = false;
        for body_component in parts {
            saw_component = true;
            // Epsilon is represented by an empty body until the end of the line
            if is_epsilon_keyword(body_component) && !symbol_table.contains_key(body_component) {
                continue;
            }
            let tokens = split_longest_match(body_component, names).map_err(|offset| {
                ParseError::UnknownSymbol {
                    line: line_number,
                    text: body_component[offset..].to_string(),
                }
            })?;
            body.extend(tokens.into_iter().map(|name| symbol_table[name].clone()));
        }
        if !saw_component {
            return Err(ParseError::MissingBody {
                line: line_number,
                head: head_text.to_string(),
            });
        }
        if body.is_empty() {
            body = epsilon_body();
        }
        Ok((head, body))
    }

    /// Writes the grammar in the format read by [`CFG::from_text`].
    ///
    /// Variables and terminals are sorted; rules follow the production order. Body symbols are
    /// concatenated when every name in the grammar is one character, space-separated otherwise.
    pub fn to_text(&self) -> String {
        let mut variables: Vec<&str> = self.variables().iter().map(Variable::get_name).collect();
        variables.sort_unstable();
        let mut terminals: Vec<&str> = self.terminals().iter().map(Terminal::get_name).collect();
        terminals.sort_unstable();
        let compact = variables
            .iter()
            .chain(terminals.iter())
            .all(|name| name.chars().count() == 1);

        let mut result = String::new();
        result.push_str(&header_line(&variables));
        result.push('\n');
        result.push_str(&header_line(&terminals));
        result.push('\n');
        result.push_str(self.get_start_symbol().get_name());
        for (head, bodies) in self.productions() {
            for body in bodies {
                result.push('\n');
                result.push_str(head.get_name());
                result.push(' ');
                if is_epsilon_body(body) {
                    result.push_str(EPSILON);
                } else {
                    let separator = if compact { "" } else { " " };
                    let names: Vec<&str> = body.iter().map(Symbol::get_name).collect();
                    result.push_str(&names.join(separator));
                }
            }
        }
        result
    }
}

use hashbrown::HashSet;
use tracing::debug;

use crate::cfg::cfg::{push_unique, ProductionMap, CFG};
use crate::cfg::production::{epsilon_body, is_epsilon_body, Body, Symbol};
use crate::cfg::variable::Variable;
use crate::error::CfgError;
use crate::options::CleaningOptions;

impl CFG {
    /// Returns the variables that can derive the empty string.
    pub fn get_nullable_symbols(&self) -> HashSet<Variable> {
        self._get_generating_symbols(true)
    }

    /// Number of positions in `body` holding a nullable variable.
    ///
    /// Epsilon elimination emits up to `2^n` variants of a body with `n` such positions.
    pub fn nullable_positions(body: &[Symbol], nullable_symbols: &HashSet<Variable>) -> usize {
        body.iter()
            .filter(|s| s.as_variable().is_some_and(|v| nullable_symbols.contains(v)))
            .count()
    }

    /// Generates all production variants when removing nullable symbols.
    ///
    /// One variant per subset of nullable positions, each with exactly that subset deleted.
    fn _production_without_nullable(
        production: &[Symbol],
        nullable_symbols: &HashSet<Variable>,
    ) -> Vec<Body> {
        if production.is_empty() {
            return vec![vec![]];
        }
        let first_nullable_index = production
            .iter()
            .position(|x| x.as_variable().is_some_and(|v| nullable_symbols.contains(v)));
        match first_nullable_index {
            Some(index) => {
                let all_further_productions =
                    CFG::_production_without_nullable(&production[index + 1..], nullable_symbols);
                let mut all_up_to_index = production[..index].to_vec();
                let mut all_productions = Vec::with_capacity(all_further_productions.len() * 2);
                // keep the symbol
                all_up_to_index.push(production[index].clone());
                all_productions.extend(all_further_productions.iter().map(|x| {
                    let mut new_production = all_up_to_index.clone();
                    new_production.extend(x.iter().cloned());
                    new_production
                }));
                // drop the symbol
                all_up_to_index.pop();
                all_productions.extend(all_further_productions.iter().map(|x| {
                    let mut new_production = all_up_to_index.clone();
                    new_production.extend(x.iter().cloned());
                    new_production
                }));
                all_productions
            }
            None => vec![production.to_vec()],
        }
    }

    /// Removes epsilon productions from the CFG
    ///
    /// Every body is replaced by its variants with any subset of nullable positions deleted;
    /// variants that end up empty are dropped. If the start symbol is nullable it alone gets
    /// `start -> eps` back, so the empty string stays in the language.
    ///
    /// A body with `k` nullable positions yields up to `2^k` variants. Bodies above
    /// `options.max_nullable_positions` are rejected rather than enumerated.
    pub fn without_epsilon(&self, options: &CleaningOptions) -> Result<Self, CfgError> {
        self.check_invariants()?;
        let nullable_symbols = self.get_nullable_symbols();
        debug!(nullable = nullable_symbols.len(), "computed nullable symbols");

        let mut new_productions = ProductionMap::with_capacity(self.productions().len());
        for (head, productions) in self.productions() {
            let bodies = new_productions.entry(head.clone()).or_default();
            for production in productions {
                if is_epsilon_body(production) {
                    continue;
                }
                let count = CFG::nullable_positions(production, &nullable_symbols);
                if count > options.max_nullable_positions {
                    return Err(CfgError::TooManyNullablePositions {
                        head: head.display(),
                        count,
                        limit: options.max_nullable_positions,
                    });
                }
                for variant in CFG::_production_without_nullable(production, &nullable_symbols) {
                    // filter out empty productions
                    if !variant.is_empty() {
                        push_unique(bodies, variant);
                    }
                }
            }
        }

        let start = self.get_start_symbol();
        if nullable_symbols.contains(start) {
            push_unique(
                new_productions.entry(start.clone()).or_default(),
                epsilon_body(),
            );
        }

        let result = self.with_productions(self.variables().clone(), new_productions);
        debug!(
            before = self.production_count(),
            after = result.production_count(),
            "removed epsilon productions"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::terminal::Terminal;

    fn v(name: &str) -> Symbol {
        Symbol::V(Variable::new(name))
    }

    fn t(name: &str) -> Symbol {
        Symbol::T(Terminal::new(name))
    }

    #[test]
    fn variants_cover_every_subset_of_nullable_positions() {
        let nullable = HashSet::from([Variable::new("A"), Variable::new("B")]);
        let body = vec![v("A"), t("x"), v("B")];
        let variants: HashSet<Body> = CFG::_production_without_nullable(&body, &nullable)
            .into_iter()
            .collect();
        let expected: HashSet<Body> = HashSet::from([
            vec![v("A"), t("x"), v("B")],
            vec![t("x"), v("B")],
            vec![v("A"), t("x")],
            vec![t("x")],
        ]);
        assert_eq!(variants, expected);
    }

    #[test]
    fn all_nullable_body_includes_empty_variant() {
        let nullable = HashSet::from([Variable::new("A")]);
        let variants = CFG::_production_without_nullable(&[v("A")], &nullable);
        assert_eq!(variants, vec![vec![v("A")], vec![]]);
    }

    #[test]
    fn counts_nullable_positions() {
        let nullable = HashSet::from([Variable::new("A")]);
        let body = vec![v("A"), v("A"), t("a"), v("B")];
        assert_eq!(CFG::nullable_positions(&body, &nullable), 2);
    }
}

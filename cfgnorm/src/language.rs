use crate::cfg::terminal::Terminal;

pub trait Language {
    fn accepts(&self, input: &[Terminal]) -> bool;

    /// Splits the string into one terminal per character and checks whether it is accepted.
    fn accepts_string(&self, input: &str) -> bool {
        let input_symbols: Vec<Terminal> = input
            .chars()
            .map(|c| Terminal::from_string(c.to_string()))
            .collect();

        self.accepts(&input_symbols)
    }
}

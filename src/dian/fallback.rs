/// Ordered candidates for one field; the first non-empty result wins.
///
/// Candidates are evaluated lazily, left to right.
pub struct FallbackChain<'a> {
    candidates: Vec<Box<dyn Fn() -> String + 'a>>,
}

impl<'a> FallbackChain<'a> {
    pub fn new() -> Self {
        Self {
            candidates: Vec::new(),
        }
    }

    pub fn or(mut self, candidate: impl Fn() -> String + 'a) -> Self {
        self.candidates.push(Box::new(candidate));
        self
    }

    /// Add a candidate only when `enabled`.
    pub fn or_if(self, enabled: bool, candidate: impl Fn() -> String + 'a) -> Self {
        if enabled { self.or(candidate) } else { self }
    }

    pub fn resolve(&self) -> String {
        self.candidates
            .iter()
            .map(|c| c())
            .find(|v| !v.is_empty())
            .unwrap_or_default()
    }
}

impl Default for FallbackChain<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn first_non_empty_wins() {
        let chain = FallbackChain::new()
            .or(String::new)
            .or(|| "generic".to_string())
            .or(|| "never".to_string());
        assert_eq!(chain.resolve(), "generic");
    }

    #[test]
    fn later_candidates_are_not_evaluated() {
        let calls = Cell::new(0);
        let chain = FallbackChain::new()
            .or(|| "first".to_string())
            .or(|| {
                calls.set(calls.get() + 1);
                "second".to_string()
            });
        assert_eq!(chain.resolve(), "first");
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn disabled_and_empty_chains() {
        let chain = FallbackChain::new().or_if(false, || "skipped".to_string());
        assert_eq!(chain.resolve(), "");
    }
}

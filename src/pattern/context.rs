//! State shared by every level of one top-level generation.

use std::collections::HashMap;

use rand::RngCore;

use crate::error::{ErrorKind, PatternError, resolve_position};
use crate::random;

use super::lexer;
use super::node::{Generated, SubPattern};

/// Evaluation context threaded (mutably borrowed) through all recursive
/// sub-pattern evaluations.
pub struct Context<'r> {
    rng: &'r mut dyn RngCore,
    /// Generated text of each group, by id.
    groups: HashMap<u32, String>,
    last_group_id: u32,
    /// Start offset of each enclosing sub-pattern within its parent, outermost first.
    spans: Vec<usize>,
}

impl<'r> Context<'r> {
    pub fn new(rng: &'r mut dyn RngCore) -> Self {
        Self {
            rng,
            groups: HashMap::new(),
            last_group_id: 0,
            spans: Vec::new(),
        }
    }

    /// Uniform index in `[0, n)`.
    pub fn uniform(&mut self, n: usize) -> usize {
        random::uniform(&mut *self.rng, n)
    }

    pub fn rng(&mut self) -> &mut dyn RngCore {
        &mut *self.rng
    }

    /// Build an error at a position local to the sub-pattern being evaluated.
    pub fn error(
        &self,
        kind: ErrorKind,
        local_pos: usize,
        mark_len: usize,
        msg: impl Into<String>,
    ) -> PatternError {
        PatternError::at(kind, resolve_position(local_pos, &self.spans), mark_len, msg)
    }

    /// Allocate the next group id.
    pub fn open_group(&mut self) -> u32 {
        self.last_group_id += 1;
        self.last_group_id
    }

    pub fn last_group_id(&self) -> u32 {
        self.last_group_id
    }

    /// Make the next allocated group id `id + 1`.
    pub fn set_last_group_id(&mut self, id: u32) {
        self.last_group_id = id;
    }

    pub fn record_group(&mut self, id: u32, text: String) {
        self.groups.insert(id, text);
    }

    pub fn group_text(&self, id: u32) -> Option<&str> {
        self.groups.get(&id).map(String::as_str)
    }

    /// Evaluate a sub-pattern of the current input.
    pub fn evaluate(&mut self, sub: &SubPattern) -> Result<Generated, PatternError> {
        self.spans.push(sub.offset);
        let result = lexer::run(self, &sub.text);
        self.spans.pop();
        result
    }

    /// Entropy `sub` would contribute, measured against a snapshot of the
    /// group table so the live context is left untouched.
    ///
    /// Group ids allocated inside `sub` start after `first_group_id`.
    pub fn estimate_entropy(
        &mut self,
        sub: &SubPattern,
        first_group_id: u32,
    ) -> Result<f64, PatternError> {
        let mut probe = Context {
            rng: &mut *self.rng,
            groups: self.groups.clone(),
            last_group_id: first_group_id,
            spans: self.spans.clone(),
        };
        probe.evaluate(sub).map(|generated| generated.entropy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn sub(s: &str, offset: usize) -> SubPattern {
        SubPattern::new(s.chars().collect(), offset)
    }

    #[test]
    fn group_ids_are_sequential() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut ctx = Context::new(&mut rng);
        assert_eq!(ctx.open_group(), 1);
        assert_eq!(ctx.open_group(), 2);
        assert_eq!(ctx.last_group_id(), 2);
    }

    #[test]
    fn errors_resolve_through_spans() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut ctx = Context::new(&mut rng);
        let err = ctx.evaluate(&sub("ab\\9", 3)).unwrap_err();
        assert_eq!(err.pos(), Some(5));
        assert_eq!(err.mark_len(), 2);
        // the span stack unwinds even on error
        let err = ctx.evaluate(&sub("\\9", 0)).unwrap_err();
        assert_eq!(err.pos(), Some(0));
    }

    #[test]
    fn estimate_leaves_live_context_untouched() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut ctx = Context::new(&mut rng);
        let entropy = ctx.estimate_entropy(&sub("(x)[ab]", 0), 0).unwrap();
        assert!((entropy - 1.0).abs() < 1e-12);
        assert_eq!(ctx.last_group_id(), 0);
        assert_eq!(ctx.group_text(1), None);
    }

    #[test]
    fn estimate_sees_existing_groups() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut ctx = Context::new(&mut rng);
        ctx.record_group(1, "abc".to_string());
        let entropy = ctx.estimate_entropy(&sub("\\1", 0), 1).unwrap();
        assert_eq!(entropy, 0.0);
    }
}

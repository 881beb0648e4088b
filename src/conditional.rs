use crate::{ParseResult, expression::Expression};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BranchKind {
    If,
    ElseIf,
    Else,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Branch {
    kind: BranchKind,
    taken: bool,
}

/// Branch bookkeeping for one `{if}...{/if}` block.
///
/// Branches are registered in source order and the first one whose condition
/// holds is taken; every later branch, `else` included, is not.
#[derive(Debug, Default)]
pub(crate) struct Conditional {
    branches: Vec<Branch>,
    closed: bool,
}

impl Conditional {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_if(&mut self, condition: &Expression) -> ParseResult<bool> {
        debug_assert!(self.branches.is_empty(), "if must be the first branch");
        self.add(BranchKind::If, condition)
    }

    pub(crate) fn add_else_if(&mut self, condition: &Expression) -> ParseResult<bool> {
        self.add(BranchKind::ElseIf, condition)
    }

    pub(crate) fn add_else(&mut self) -> bool {
        self.register(BranchKind::Else, true)
    }

    /// Finalises the block and returns the kind of the branch that was taken.
    pub(crate) fn close_if(&mut self) -> Option<BranchKind> {
        self.closed = true;
        self.branches
            .iter()
            .find(|branch| branch.taken)
            .map(|branch| branch.kind)
    }

    fn add(&mut self, kind: BranchKind, condition: &Expression) -> ParseResult<bool> {
        // Evaluated even when an earlier branch won, so a malformed condition
        // fails the same way wherever it appears.
        let holds = condition.evaluate()?;
        Ok(self.register(kind, holds))
    }

    fn register(&mut self, kind: BranchKind, holds: bool) -> bool {
        debug_assert!(!self.closed, "branch added after {{/if}}");
        debug_assert!(
            self.branches
                .last()
                .is_none_or(|branch| branch.kind != BranchKind::Else),
            "branch added after else"
        );
        let taken = holds && !self.branches.iter().any(|branch| branch.taken);
        self.branches.push(Branch { kind, taken });
        taken
    }
}

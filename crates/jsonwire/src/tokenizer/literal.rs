//! Incremental matcher for keyword literals.
//!
//! Matches `true`, `false` and `null`, plus `NaN`, `Infinity` and
//! `-Infinity` when non-numeric numbers are enabled. The matcher holds the
//! remaining expected bytes so a literal can be suspended mid-word across
//! input chunks.

/// Which literal completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LiteralKind {
    True,
    False,
    Null,
    NaN,
    Infinity,
    NegInfinity,
}

/// Outcome of feeding one character.
pub(crate) enum Step {
    /// Matched, more bytes expected.
    NeedMore,
    /// Matched and the literal is complete.
    Done(LiteralKind),
    /// Did not match the expected byte.
    Reject,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct LiteralMatcher {
    remaining: &'static [u8],
    kind: LiteralKind,
}

impl LiteralMatcher {
    /// Starts matching after the first character has been consumed.
    ///
    /// `None` when `first` cannot begin any enabled literal.
    pub(crate) fn after_first(first: char, allow_non_numeric: bool) -> Option<Self> {
        let (remaining, kind): (&'static [u8], _) = match first {
            't' => (b"rue", LiteralKind::True),
            'f' => (b"alse", LiteralKind::False),
            'n' => (b"ull", LiteralKind::Null),
            'N' if allow_non_numeric => (b"aN", LiteralKind::NaN),
            'I' if allow_non_numeric => (b"nfinity", LiteralKind::Infinity),
            _ => return None,
        };
        Some(LiteralMatcher { remaining, kind })
    }

    /// Matcher for `-Infinity` entered from the number sign state, after the
    /// `I` has been consumed.
    pub(crate) fn neg_infinity_after_i() -> Self {
        LiteralMatcher {
            remaining: b"nfinity",
            kind: LiteralKind::NegInfinity,
        }
    }

    pub(crate) fn step(&mut self, c: char) -> Step {
        let Some((&expected, rest)) = self.remaining.split_first() else {
            return Step::Reject;
        };
        if expected as char != c {
            return Step::Reject;
        }
        self.remaining = rest;
        if rest.is_empty() {
            Step::Done(self.kind)
        } else {
            Step::NeedMore
        }
    }
}

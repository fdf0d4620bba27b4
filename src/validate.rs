//! Bracket validation for Brainfuck sources.
//!
//! Only `[` and `]` matter here; every other character is skipped. A source is
//! valid when, reading the brackets left to right, the number of closes never
//! exceeds the number of opens and both counts are equal at the end.

use std::fmt;

/// Which side of the loop was unmatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmatchedBracketKind {
    Open,
    Close,
}

impl fmt::Display for UnmatchedBracketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmatchedBracketKind::Open => write!(f, "'['"),
            UnmatchedBracketKind::Close => write!(f, "']'"),
        }
    }
}

/// Location of the first bracket that breaks balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnmatchedBracket {
    /// Character index (not byte index) into the source.
    pub ip: usize,
    pub kind: UnmatchedBracketKind,
}

/// Returns `true` if the source code has no unbalanced brackets.
pub fn validate(source: &str) -> bool {
    let mut depth: i64 = 0;
    for b in source.chars().filter(|c| matches!(c, '[' | ']')) {
        depth += if b == '[' { 1 } else { -1 };
        if depth < 0 {
            return false;
        }
    }

    depth == 0
}

/// Find the bracket responsible for an invalid source, if any.
///
/// A `]` that closes nothing is reported as soon as it is seen. Otherwise the
/// innermost `[` still open at the end of the source is reported.
pub fn find_unmatched(source: &str) -> Option<UnmatchedBracket> {
    let mut open: Vec<usize> = Vec::new();
    for (ip, c) in source.chars().enumerate() {
        match c {
            '[' => open.push(ip),
            ']' => {
                if open.pop().is_none() {
                    return Some(UnmatchedBracket { ip, kind: UnmatchedBracketKind::Close });
                }
            }
            _ => {}
        }
    }

    open.last().map(|&ip| UnmatchedBracket { ip, kind: UnmatchedBracketKind::Open })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_sources_are_valid() {
        assert!(validate(""));
        assert!(validate("[[[]]]"));
        assert!(validate("++++>>>----<<<.,...,,,[[]]"));
        assert!(validate("no brackets at all"));
    }

    #[test]
    fn unbalanced_sources_are_invalid() {
        assert!(!validate("[[["));
        assert!(!validate("]]"));
        assert!(!validate("[[][]][]]"));
        assert!(!validate("]"));
        // Balanced totals but closed before opened.
        assert!(!validate("]["));
    }

    #[test]
    fn stray_close_is_located() {
        let found = find_unmatched("+[-]]+");
        assert_eq!(found, Some(UnmatchedBracket { ip: 4, kind: UnmatchedBracketKind::Close }));
    }

    #[test]
    fn innermost_open_is_located() {
        let found = find_unmatched("[+[-]+[");
        assert_eq!(found, Some(UnmatchedBracket { ip: 6, kind: UnmatchedBracketKind::Open }));
    }

    #[test]
    fn location_uses_char_indices() {
        // 'é' is two bytes but one instruction position.
        let found = find_unmatched("é]");
        assert_eq!(found, Some(UnmatchedBracket { ip: 1, kind: UnmatchedBracketKind::Close }));
    }

    #[test]
    fn valid_source_has_no_unmatched_bracket() {
        assert_eq!(find_unmatched("+[>[-]<]"), None);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Build a bracket string from a random walk that never dips below zero and
    /// is closed off at the end.
    fn balanced_from_walk(steps: &[bool]) -> String {
        let mut depth = 0usize;
        let mut out = String::new();
        for &open in steps {
            if open || depth == 0 {
                out.push('[');
                depth += 1;
            } else {
                out.push(']');
                depth -= 1;
            }
        }
        out.extend(std::iter::repeat(']').take(depth));
        out
    }

    proptest! {
        #[test]
        fn balanced_walks_validate(steps in prop::collection::vec(any::<bool>(), 0..128)) {
            let src = balanced_from_walk(&steps);
            prop_assert!(validate(&src));
            prop_assert_eq!(find_unmatched(&src), None);
        }

        #[test]
        fn extra_close_anywhere_is_invalid(
            steps in prop::collection::vec(any::<bool>(), 0..128),
            at in any::<prop::sample::Index>(),
        ) {
            let mut chars: Vec<char> = balanced_from_walk(&steps).chars().collect();
            let pos = at.index(chars.len() + 1);
            chars.insert(pos, ']');
            let src: String = chars.into_iter().collect();
            prop_assert!(!validate(&src));
            prop_assert!(find_unmatched(&src).is_some());
        }

        #[test]
        fn extra_open_anywhere_is_invalid(
            steps in prop::collection::vec(any::<bool>(), 0..128),
            at in any::<prop::sample::Index>(),
        ) {
            let mut chars: Vec<char> = balanced_from_walk(&steps).chars().collect();
            let pos = at.index(chars.len() + 1);
            chars.insert(pos, '[');
            let src: String = chars.into_iter().collect();
            prop_assert!(!validate(&src));
        }

        #[test]
        fn validate_agrees_with_locator(src in "[\\[\\]+a-]{0,64}") {
            prop_assert_eq!(validate(&src), find_unmatched(&src).is_none());
        }
    }
}

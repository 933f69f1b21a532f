//! Whole-identifier search and replace over shader text.
//!
//! A match is only accepted when it is not glued to another identifier: the
//! character before it must not be an identifier character and the character
//! after it must not be one either. Member accesses (`foo.name`) can be
//! excluded as well, see [`PeriodRule`].

/// How a `.` directly in front of a match is treated.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PeriodRule {
    /// `foo.name` does not match `name`.
    Exclude,
    /// `foo.name` matches `name`.
    Allow,
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn token_ranges<'a>(
    source: &'a str,
    token: &'a str,
    periods: PeriodRule,
) -> impl Iterator<Item = usize> + 'a {
    source
        .match_indices(token)
        .map(|(start, _)| start)
        .filter(move |&start| !token.is_empty() && is_free(source, start, token.len(), periods))
}

fn is_free(source: &str, start: usize, len: usize, periods: PeriodRule) -> bool {
    let before = source[..start].chars().next_back();
    let after = source[start + len..].chars().next();

    let glued_before = match before {
        Some('.') => periods == PeriodRule::Exclude,
        Some(c) => is_identifier_char(c),
        None => false,
    };
    let glued_after = after.is_some_and(is_identifier_char);

    !glued_before && !glued_after
}

/// Counts the free occurrences of `token` in `source`.
pub fn count_tokens(source: &str, token: &str, periods: PeriodRule) -> usize {
    token_ranges(source, token, periods).count()
}

/// `true` if `token` appears at least once as a free identifier.
pub fn contains_token(source: &str, token: &str, periods: PeriodRule) -> bool {
    token_ranges(source, token, periods).next().is_some()
}

/// Replaces every free occurrence of `token` and returns the new text with the
/// number of replacements made.
pub fn replace_token(
    source: &str,
    token: &str,
    replacement: &str,
    periods: PeriodRule,
) -> (String, usize) {
    let mut out = String::with_capacity(source.len());
    let mut last = 0;
    let mut count = 0;

    for start in token_ranges(source, token, periods) {
        out.push_str(&source[last..start]);
        out.push_str(replacement);
        last = start + token.len();
        count += 1;
    }
    out.push_str(&source[last..]);

    (out, count)
}

//! Glob syntax compilation (spec §6): `?`, `*`, `**`, `[...]`, `{a,b,c}`, `\`.
//!
//! Compiled patterns are cached by `(separator, canonical normalization,
//! pattern text)` in a small `moka::sync::Cache`, the same "repeated
//! compilation of the same input is worth memoizing" concern the teacher
//! reaches for `moka`'s sync feature to cover elsewhere in its stack.

use std::fmt;
use std::sync::{Arc, OnceLock};

use moka::sync::Cache;

use super::normalize::PathNormalization;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobError {
    pub position: usize,
    pub reason: String,
}

impl fmt::Display for GlobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid glob pattern at position {}: {}", self.position, self.reason)
    }
}
impl std::error::Error for GlobError {}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(char),
    AnyChar,
    AnyRun,
    AnyRunAcrossSeparators,
    Class { negate: bool, ranges: Vec<(char, char)> },
    Alternation(Vec<Vec<Token>>),
}

/// A compiled glob pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobMatcher {
    tokens: Arc<Vec<Token>>,
    separator: char,
    normalization: PathNormalization,
}

type CacheKey = (char, u8, String);

fn cache() -> &'static Cache<CacheKey, Arc<Vec<Token>>> {
    static CACHE: OnceLock<Cache<CacheKey, Arc<Vec<Token>>>> = OnceLock::new();
    CACHE.get_or_init(|| Cache::new(256))
}

/// Compiles `pattern` for matching path strings that use `separator`,
/// normalizing both pattern and candidate with `normalization` before
/// comparing (so pattern matching agrees with name equality/lookup).
pub fn compile_glob(
    pattern: &str,
    separator: char,
    normalization: PathNormalization,
) -> Result<GlobMatcher, GlobError> {
    let key: CacheKey = (separator, normalization.bits(), pattern.to_owned());
    if let Some(tokens) = cache().get(&key) {
        return Ok(GlobMatcher { tokens, separator, normalization });
    }
    let tokens = Arc::new(parse(pattern)?);
    cache().insert(key, tokens.clone());
    Ok(GlobMatcher { tokens, separator, normalization })
}

fn parse(pattern: &str) -> Result<Vec<Token>, GlobError> {
    let chars: Vec<char> = pattern.chars().collect();
    let (tokens, end) = parse_sequence(&chars, 0, false)?;
    if end != chars.len() {
        return Err(GlobError { position: end, reason: "unmatched '}'".into() });
    }
    Ok(tokens)
}

fn parse_sequence(chars: &[char], mut i: usize, in_alternation: bool) -> Result<(Vec<Token>, usize), GlobError> {
    let mut tokens = Vec::new();
    while i < chars.len() {
        match chars[i] {
            '}' | ',' if in_alternation => break,
            '\\' => {
                let next = chars.get(i + 1).ok_or_else(|| GlobError {
                    position: i,
                    reason: "dangling escape at end of pattern".into(),
                })?;
                tokens.push(Token::Literal(*next));
                i += 2;
            }
            '?' => {
                tokens.push(Token::AnyChar);
                i += 1;
            }
            '*' => {
                if chars.get(i + 1) == Some(&'*') {
                    tokens.push(Token::AnyRunAcrossSeparators);
                    i += 2;
                } else {
                    tokens.push(Token::AnyRun);
                    i += 1;
                }
            }
            '[' => {
                let (class, next) = parse_class(chars, i + 1)?;
                tokens.push(class);
                i = next;
            }
            '{' => {
                let mut branches = Vec::new();
                let mut cursor = i + 1;
                loop {
                    let (branch, next) = parse_sequence(chars, cursor, true)?;
                    branches.push(branch);
                    cursor = next;
                    match chars.get(cursor) {
                        Some(',') => cursor += 1,
                        Some('}') => {
                            cursor += 1;
                            break;
                        }
                        _ => {
                            return Err(GlobError { position: cursor, reason: "unterminated '{'".into() })
                        }
                    }
                }
                if branches.iter().any(|b| b.iter().any(|t| matches!(t, Token::Alternation(_)))) {
                    return Err(GlobError { position: i, reason: "nested '{...}' is not allowed".into() });
                }
                tokens.push(Token::Alternation(branches));
                i = cursor;
            }
            c => {
                tokens.push(Token::Literal(c));
                i += 1;
            }
        }
    }
    Ok((tokens, i))
}

fn parse_class(chars: &[char], mut i: usize) -> Result<(Token, usize), GlobError> {
    let start = i;
    let negate = matches!(chars.get(i), Some('!'));
    if negate {
        i += 1;
    }
    let mut ranges = Vec::new();
    let class_start = i;
    while chars.get(i) != Some(&']') {
        let lo = *chars
            .get(i)
            .ok_or_else(|| GlobError { position: start - 1, reason: "unterminated '['".into() })?;
        if chars.get(i + 1) == Some(&'-') && chars.get(i + 2).is_some() && chars.get(i + 2) != Some(&']') {
            let hi = chars[i + 2];
            ranges.push((lo, hi));
            i += 3;
        } else {
            ranges.push((lo, lo));
            i += 1;
        }
    }
    if i == class_start {
        return Err(GlobError { position: start - 1, reason: "empty character class".into() });
    }
    Ok((Token::Class { negate, ranges }, i + 1))
}

impl GlobMatcher {
    pub fn is_match(&self, candidate: &str) -> bool {
        let normalized: Vec<char> = self.normalization.normalize(candidate).chars().collect();
        match_sequence(&self.tokens, &normalized, self.separator)
    }
}

fn match_sequence(tokens: &[Token], input: &[char], separator: char) -> bool {
    match_at(tokens, 0, input, 0, separator)
}

fn match_at(tokens: &[Token], ti: usize, input: &[char], ii: usize, separator: char) -> bool {
    if ti == tokens.len() {
        return ii == input.len();
    }
    match &tokens[ti] {
        Token::Literal(c) => {
            ii < input.len() && input[ii] == *c && match_at(tokens, ti + 1, input, ii + 1, separator)
        }
        Token::AnyChar => {
            ii < input.len() && input[ii] != separator && match_at(tokens, ti + 1, input, ii + 1, separator)
        }
        Token::AnyRun => {
            for next_ii in ii..=input.len() {
                if input[ii..next_ii].contains(&separator) {
                    break;
                }
                if match_at(tokens, ti + 1, input, next_ii, separator) {
                    return true;
                }
            }
            false
        }
        Token::AnyRunAcrossSeparators => {
            for next_ii in ii..=input.len() {
                if match_at(tokens, ti + 1, input, next_ii, separator) {
                    return true;
                }
            }
            false
        }
        Token::Class { negate, ranges } => {
            if ii >= input.len() {
                return false;
            }
            let c = input[ii];
            let hit = ranges.iter().any(|(lo, hi)| *lo <= c && c <= *hi);
            (hit != *negate) && match_at(tokens, ti + 1, input, ii + 1, separator)
        }
        Token::Alternation(branches) => branches.iter().any(|branch| {
            let mut combined = branch.clone();
            combined.extend_from_slice(&tokens[ti + 1..]);
            match_at(&combined, 0, input, ii, separator)
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(pattern: &str) -> GlobMatcher {
        compile_glob(pattern, '/', PathNormalization::none()).unwrap()
    }

    #[test]
    fn double_star_crosses_separators() {
        assert!(m("**/*.java").is_match("/foo/bar/Baz.java"));
    }

    #[test]
    fn single_star_does_not_cross_separators() {
        assert!(m("*.java").is_match("Baz.java"));
        assert!(!m("*.java").is_match("foo/Baz.java"));
    }

    #[test]
    fn character_class_is_case_sensitive_by_default() {
        assert!(m("/[a-z]*").is_match("/foo"));
        assert!(!m("/[a-z]*").is_match("/Foo"));
    }

    #[test]
    fn alternation_matches_any_branch() {
        let glob = m("**/*.{java,class}");
        assert!(glob.is_match("/foo/Bar.java"));
        assert!(glob.is_match("/foo/Bar.class"));
        assert!(!glob.is_match("/foo/Bar.txt"));
    }

    #[test]
    fn nested_alternation_is_rejected() {
        assert!(compile_glob("{a,{b,c}}", '/', PathNormalization::none()).is_err());
    }

    #[test]
    fn negated_class() {
        assert!(compile_glob("[!0-9]", '/', PathNormalization::none()).unwrap().is_match("a"));
        assert!(!compile_glob("[!0-9]", '/', PathNormalization::none()).unwrap().is_match("5"));
    }
}

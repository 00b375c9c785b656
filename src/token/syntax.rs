//! Grammar primitives for grant-list values: delimiters, keywords and the
//! low-level split/check helpers the decoder is built from.

pub const PIPE: char = '|';
pub const OPEN_BRACKET: char = '[';
pub const CLOSE_BRACKET: char = ']';

/// Deferred-list marker. Case-sensitive.
pub const LIST_KEYWORD: &str = "%LIST";
/// All-marker. Matched case-insensitively, written upper case.
pub const ALL_KEYWORD: &str = "ALL";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeparatorProblem {
    Empty,
    Leading,
    Trailing,
    Doubled,
}

impl SeparatorProblem {
    pub fn describe(self, separator: char) -> String {
        match self {
            Self::Empty => "contains no segments".to_string(),
            Self::Leading => format!("may not start with {separator}"),
            Self::Trailing => format!("may not end with {separator}"),
            Self::Doubled => format!("may not contain {separator}{separator}"),
        }
    }
}

/// Reject values that would produce an empty segment when split on `separator`.
pub fn check_illegal_separator(separator: char, value: &str) -> Result<(), SeparatorProblem> {
    if value.is_empty() {
        return Err(SeparatorProblem::Empty);
    }
    if value.starts_with(separator) {
        return Err(SeparatorProblem::Leading);
    }
    if value.ends_with(separator) {
        return Err(SeparatorProblem::Trailing);
    }
    let mut previous = None;
    for ch in value.chars() {
        if ch == separator && previous == Some(separator) {
            return Err(SeparatorProblem::Doubled);
        }
        previous = Some(ch);
    }
    Ok(())
}

/// Bracket opened without a closing bracket at the very end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnterminatedBracket;

/// Split `value` into the payload and the text inside a trailing `[...]`.
///
/// The first `[` starts the condition and the value must end with `]`.
/// Anything between is returned untouched, brackets included.
pub fn split_condition(value: &str) -> Result<(&str, Option<&str>), UnterminatedBracket> {
    let Some(open) = value.find(OPEN_BRACKET) else {
        return Ok((value, None));
    };
    if !value.ends_with(CLOSE_BRACKET) {
        return Err(UnterminatedBracket);
    }
    Ok((&value[..open], Some(&value[open + 1..value.len() - 1])))
}

/// Strip the first matching prefix from `segment`.
pub fn strip_any_prefix<'a>(segment: &'a str, prefixes: &[&str]) -> Option<&'a str> {
    prefixes
        .iter()
        .find_map(|prefix| segment.strip_prefix(*prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separator_check_flags_every_empty_segment_shape() {
        assert_eq!(check_illegal_separator(PIPE, "Buckler|Tower"), Ok(()));
        assert_eq!(check_illegal_separator(PIPE, "Buckler"), Ok(()));
        assert_eq!(check_illegal_separator(PIPE, ""), Err(SeparatorProblem::Empty));
        assert_eq!(check_illegal_separator(PIPE, "|Buckler"), Err(SeparatorProblem::Leading));
        assert_eq!(check_illegal_separator(PIPE, "Buckler|"), Err(SeparatorProblem::Trailing));
        assert_eq!(
            check_illegal_separator(PIPE, "Buckler||Tower"),
            Err(SeparatorProblem::Doubled)
        );
        assert_eq!(check_illegal_separator(PIPE, "|"), Err(SeparatorProblem::Leading));
    }

    #[test]
    fn split_condition_handles_present_absent_and_broken_brackets() {
        assert_eq!(split_condition("Buckler"), Ok(("Buckler", None)));
        assert_eq!(
            split_condition("Buckler[CLASS=Fighter]"),
            Ok(("Buckler", Some("CLASS=Fighter")))
        );
        assert_eq!(split_condition("Buckler[]"), Ok(("Buckler", Some(""))));
        assert_eq!(split_condition("Buckler["), Err(UnterminatedBracket));
        assert_eq!(split_condition("Buckler[A]|Tower"), Err(UnterminatedBracket));
        assert_eq!(split_condition("[A]"), Ok(("", Some("A"))));
        assert_eq!(split_condition("["), Err(UnterminatedBracket));
    }

    #[test]
    fn strip_any_prefix_tries_each_spelling() {
        let prefixes = ["SHIELDTYPE.", "SHIELDTYPE="];
        assert_eq!(strip_any_prefix("SHIELDTYPE.Heavy", &prefixes), Some("Heavy"));
        assert_eq!(strip_any_prefix("SHIELDTYPE=Heavy", &prefixes), Some("Heavy"));
        assert_eq!(strip_any_prefix("SHIELDTYPEHeavy", &prefixes), None);
    }
}

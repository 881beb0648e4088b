//! Formatting of parse failures.
//!
//! Messages take the shape `Unexpected <found>; expected <expected>.` so a
//! failure deep inside a long template still names the offending token and,
//! when known, the `{if}` that was left open.

use crate::{
    error::{ParseError, ParseErrorKind},
    token::{Token, TokenKind},
};

/// Literals longer than this are shortened in messages.
const MAX_LITERAL_CHARS: usize = 23;
const TRUNCATED_CHARS: usize = 20;

/// Expected description for the tag that closes a conditional.
pub(crate) const CLOSING_TAG: &str = "{/if}";

/// Describes a token as `'<literal>' (<kind>)`, or the end of its context.
pub(crate) fn describe_found(token: &Token) -> String {
    if token.is(TokenKind::Eos) {
        return format!("end of {} on line {}", token.context(), token.line());
    }

    let value = token.value();
    let literal = if value.chars().count() > MAX_LITERAL_CHARS {
        let mut short: String = value.chars().take(TRUNCATED_CHARS).collect();
        short.push_str("...");
        short
    } else {
        value.to_owned()
    };
    format!("'{literal}' ({})", token.kind())
}

/// Appends the location of the opening tag, if there is one.
pub(crate) fn describe_expected(expected: &str, found: &Token, opening: Option<&Token>) -> String {
    match opening {
        Some(opening) if opening.context() != found.context() => format!(
            "{expected} for the {{if}} on line {} of {}",
            opening.line(),
            opening.context()
        ),
        Some(opening) => format!("{expected} for the {{if}} on line {}", opening.line()),
        None => expected.to_owned(),
    }
}

pub(crate) fn unexpected(found: &Token, expected: &str, opening: Option<&Token>) -> ParseError {
    ParseError::new(
        found.line(),
        found.context(),
        ParseErrorKind::UnexpectedToken {
            found: describe_found(found),
            expected: describe_expected(expected, found, opening),
        },
    )
}

/// The stream ended while `opening` was still waiting for its `{/if}`.
pub(crate) fn missing_closing_tag(found: &Token, opening: &Token) -> ParseError {
    ParseError::new(
        opening.line(),
        opening.context(),
        ParseErrorKind::MissingClosingTag {
            found: describe_found(found),
            expected: describe_expected(CLOSING_TAG, found, Some(opening)),
            opened_on: opening.line(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ntest::timeout(100)]
    fn test_describe_short_literal() {
        let token = Token::new(TokenKind::Variable, "member_id", 1, "page");
        assert_eq!(describe_found(&token), "'member_id' (variable)");
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_describe_truncates_long_literals() {
        let exact = "a".repeat(23);
        let token = Token::new(TokenKind::String, exact.as_str(), 1, "page");
        assert_eq!(describe_found(&token), format!("'{exact}' (string)"));

        let token = Token::new(TokenKind::String, "abcdefghijklmnopqrstuvwxyz", 1, "page");
        assert_eq!(describe_found(&token), "'abcdefghijklmnopqrst...' (string)");
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_describe_end_of_stream() {
        let token = Token::new(TokenKind::Eos, "", 12, "site/index");
        assert_eq!(describe_found(&token), "end of site/index on line 12");
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_missing_closing_tag_references_opening_line() {
        let opening = Token::new(TokenKind::LeftDelimiter, "{", 3, "page");
        let end = Token::new(TokenKind::Eos, "", 40, "page");
        let err = missing_closing_tag(&end, &opening);

        assert_eq!(err.line, 3);
        assert_eq!(
            err.kind,
            ParseErrorKind::MissingClosingTag {
                found: "end of page on line 40".to_string(),
                expected: "{/if} for the {if} on line 3".to_string(),
                opened_on: 3,
            }
        );
        assert_eq!(
            err.to_string(),
            "Unexpected end of page on line 40; expected {/if} for the {if} on line 3."
        );
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_opening_in_another_context_is_named() {
        let opening = Token::new(TokenKind::LeftDelimiter, "{", 2, "layout");
        let found = Token::new(TokenKind::Else, "if:else", 9, "page");
        let err = unexpected(&found, CLOSING_TAG, Some(&opening));
        assert_eq!(
            err.to_string(),
            "Unexpected 'if:else' (else tag); expected {/if} for the {if} on line 2 of layout."
        );
    }
}

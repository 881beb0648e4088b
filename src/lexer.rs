use std::borrow::Cow;

use crate::token::{DEFAULT_CONTEXT, Token, TokenKind};

/// Tag openers recognised in template text. Longer keywords come first so
/// `{if:elseif` is never read as `{if:else`.
const OPENERS: [(&str, TokenKind); 4] = [
    ("{if:elseif", TokenKind::ElseIf),
    ("{if:else", TokenKind::Else),
    ("{if", TokenKind::If),
    ("{/if", TokenKind::EndIf),
];

const COMMENT_OPEN: &str = "{!--";
const COMMENT_CLOSE: &str = "--}";

/// Symbolic operators, longest first.
const OPERATORS: [&str; 10] = ["==", "!=", "<>", "<=", ">=", "&&", "||", "<", ">", "^"];
const WORD_OPERATORS: [&str; 3] = ["and", "or", "xor"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Text,
    Tag,
    Done,
}

const fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

const fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ':' | '-')
}

/// Splits template source into the tokens consumed by [`crate::Parser`].
///
/// Outside of conditional tags everything is [`TokenKind::Text`], except for
/// `{!-- comments --}`. A `\{` escapes a brace so it never opens a tag. The
/// lexer never fails: malformed input surfaces as [`TokenKind::Misc`] tokens
/// or an early [`TokenKind::Eos`] for the parser to report.
///
/// ```
/// use condlate::{Lexer, TokenKind};
///
/// let kinds: Vec<TokenKind> = Lexer::new("{if a}A{/if}").map(|t| t.kind()).collect();
/// assert_eq!(kinds.first(), Some(&TokenKind::LeftDelimiter));
/// assert_eq!(kinds.last(), Some(&TokenKind::Eos));
/// ```
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    context: Cow<'a, str>,
    pos: usize,
    /// Current line number (1-indexed)
    line: usize,
    mode: Mode,
    pending: Option<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::with_context(input, DEFAULT_CONTEXT)
    }

    /// `context` names the source in error messages, e.g. a template name.
    pub fn with_context<C: Into<Cow<'a, str>>>(input: &'a str, context: C) -> Self {
        Self {
            input,
            context: context.into(),
            pos: 0,
            line: 1,
            mode: Mode::Text,
            pending: None,
        }
    }

    fn rest(&self) -> &'a str {
        self.rest_at(self.pos)
    }

    fn rest_at(&self, pos: usize) -> &'a str {
        self.input.get(pos..).unwrap_or_default()
    }

    const fn eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Peek if the remaining input starts with `s`
    fn peek(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Consumes `len` bytes, counting any newlines crossed, and returns them.
    fn advance(&mut self, len: usize) -> &'a str {
        let end = self.pos.saturating_add(len).min(self.input.len());
        let consumed = self.input.get(self.pos..end).unwrap_or_default();
        self.line = self.line.saturating_add(consumed.matches('\n').count());
        self.pos = end;
        consumed
    }

    fn token<V: Into<String>>(&self, kind: TokenKind, value: V, line: usize) -> Token {
        Token::new(kind, value, line, self.context.as_ref())
    }

    /// The tag opener starting at byte `pos`, if the keyword is not just the
    /// prefix of a longer name.
    fn opener_at(&self, pos: usize) -> Option<(&'static str, TokenKind)> {
        let rest = self.rest_at(pos);
        OPENERS.iter().copied().find(|(opener, _)| {
            rest.strip_prefix(opener)
                .is_some_and(|after| after.chars().next().is_none_or(|c| !is_name_char(c)))
        })
    }

    fn lex_text(&mut self) -> Token {
        let line = self.line;
        if self.eof() {
            self.mode = Mode::Done;
            return self.token(TokenKind::Eos, "", line);
        }

        if let Some((opener, kind)) = self.opener_at(self.pos) {
            let delimiter = self.advance(1);
            let keyword = self.advance(opener.len().saturating_sub(1));
            self.pending = Some(self.token(kind, keyword, line));
            self.mode = Mode::Tag;
            return self.token(TokenKind::LeftDelimiter, delimiter, line);
        }

        if self.peek(COMMENT_OPEN) {
            let body = self.rest().get(COMMENT_OPEN.len()..).unwrap_or_default();
            let len = body
                .find(COMMENT_CLOSE)
                .map_or(self.rest().len(), |end| {
                    COMMENT_OPEN
                        .len()
                        .saturating_add(end)
                        .saturating_add(COMMENT_CLOSE.len())
                });
            let comment = self.advance(len);
            return self.token(TokenKind::Comment, comment, line);
        }

        let mut text = String::new();
        while let Some(c) = self.peek_char() {
            if self.peek("\\{") {
                self.advance(1);
                text.push_str(self.advance(1));
                continue;
            }
            if c == '{' && (self.peek(COMMENT_OPEN) || self.opener_at(self.pos).is_some()) {
                break;
            }
            text.push_str(self.advance(c.len_utf8()));
        }
        self.token(TokenKind::Text, text, line)
    }

    fn lex_tag(&mut self) -> Token {
        let line = self.line;
        let Some(c) = self.peek_char() else {
            self.mode = Mode::Done;
            return self.token(TokenKind::Eos, "", line);
        };

        if c.is_whitespace() {
            let rest = self.rest();
            let len = rest
                .find(|c: char| !c.is_whitespace())
                .unwrap_or(rest.len());
            let whitespace = self.advance(len);
            return self.token(TokenKind::Whitespace, whitespace, line);
        }

        match c {
            '}' => {
                self.mode = Mode::Text;
                let delimiter = self.advance(1);
                self.token(TokenKind::RightDelimiter, delimiter, line)
            }
            '{' => self.lex_embedded_tag(line),
            '(' => {
                let paren = self.advance(1);
                self.token(TokenKind::LeftParen, paren, line)
            }
            ')' => {
                let paren = self.advance(1);
                self.token(TokenKind::RightParen, paren, line)
            }
            '"' | '\'' => self.lex_string(c, line),
            _ if self.at_number() => self.lex_number(line),
            _ => {
                if let Some(operator) = OPERATORS.iter().find(|operator| self.peek(operator)) {
                    let operator = self.advance(operator.len());
                    return self.token(TokenKind::Operator, operator, line);
                }
                if is_name_start(c) {
                    return self.lex_word(line);
                }
                let misc = self.advance(c.len_utf8());
                self.token(TokenKind::Misc, misc, line)
            }
        }
    }

    fn at_number(&self) -> bool {
        let mut chars = self.rest().chars();
        match chars.next() {
            Some('-') => chars.next().is_some_and(|c| c.is_ascii_digit()),
            Some(c) => c.is_ascii_digit(),
            None => false,
        }
    }

    /// `-?digits(.digits)?`
    fn lex_number(&mut self, line: usize) -> Token {
        let rest = self.rest();
        let sign = usize::from(rest.starts_with('-'));
        let digits = |s: &str| s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());

        let unsigned = rest.get(sign..).unwrap_or_default();
        let mut len = sign.saturating_add(digits(unsigned));
        if let Some(fraction) = rest.get(len..).and_then(|s| s.strip_prefix('.')) {
            let fraction_len = digits(fraction);
            if fraction_len > 0 {
                len = len.saturating_add(1).saturating_add(fraction_len);
            }
        }
        let number = self.advance(len);
        self.token(TokenKind::Number, number, line)
    }

    /// Quoted string with `\` escapes. An unterminated string swallows the rest
    /// of the input as a single misc token.
    fn lex_string(&mut self, quote: char, line: usize) -> Token {
        let rest = self.rest();
        let mut value = String::new();
        let mut chars = rest.char_indices().skip(1);
        while let Some((offset, c)) = chars.next() {
            if c == quote {
                self.advance(offset.saturating_add(c.len_utf8()));
                return self.token(TokenKind::String, value, line);
            }
            if c == '\\' {
                match chars.next() {
                    Some((_, escaped)) => value.push(escaped),
                    None => break,
                }
                continue;
            }
            value.push(c);
        }
        let raw = self.advance(rest.len());
        self.token(TokenKind::Misc, raw, line)
    }

    /// A balanced `{...}` inside a condition, kept verbatim.
    fn lex_embedded_tag(&mut self, line: usize) -> Token {
        let rest = self.rest();
        let mut depth = 0_usize;
        for (offset, c) in rest.char_indices() {
            match c {
                '{' => depth = depth.saturating_add(1),
                '}' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        let tag = self.advance(offset.saturating_add(1));
                        return self.token(TokenKind::Tag, tag, line);
                    }
                }
                _ => {}
            }
        }
        let raw = self.advance(rest.len());
        self.token(TokenKind::Misc, raw, line)
    }

    fn lex_word(&mut self, line: usize) -> Token {
        let rest = self.rest();
        let len = rest.find(|c: char| !is_name_char(c)).unwrap_or(rest.len());
        let word = self.advance(len);

        let kind = if WORD_OPERATORS
            .iter()
            .any(|operator| word.eq_ignore_ascii_case(operator))
        {
            TokenKind::Operator
        } else if word.eq_ignore_ascii_case("true") || word.eq_ignore_ascii_case("false") {
            TokenKind::Bool
        } else {
            TokenKind::Variable
        };
        self.token(kind, word, line)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if let Some(token) = self.pending.take() {
            return Some(token);
        }
        match self.mode {
            Mode::Text => Some(self.lex_text()),
            Mode::Tag => Some(self.lex_tag()),
            Mode::Done => None,
        }
    }
}

/// Lexes `input` in full. The last token is always [`TokenKind::Eos`].
pub fn tokenize<'a, C: Into<Cow<'a, str>>>(input: &'a str, context: C) -> Vec<Token> {
    Lexer::with_context(input, context).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input, "test").iter().map(Token::kind).collect()
    }

    fn values(input: &str) -> Vec<String> {
        tokenize(input, "test")
            .into_iter()
            .map(|token| token.value().to_owned())
            .collect()
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_empty_input() {
        assert_eq!(kinds(""), vec![TokenKind::Eos]);
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_plain_text_passes_through() {
        let tokens = tokenize("Hello {name}, welcome to {site:title}!", "test");
        assert_eq!(tokens.len(), 2);
        assert!(tokens[0].is(TokenKind::Text));
        assert_eq!(tokens[0].value(), "Hello {name}, welcome to {site:title}!");
        assert!(tokens[1].is(TokenKind::Eos));
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_simple_conditional() {
        use TokenKind::*;
        assert_eq!(
            kinds("A{if show}B{/if}C"),
            vec![
                Text,
                LeftDelimiter,
                If,
                Whitespace,
                Variable,
                RightDelimiter,
                Text,
                LeftDelimiter,
                EndIf,
                RightDelimiter,
                Text,
                Eos
            ]
        );
        assert_eq!(
            values("A{if show}B{/if}C"),
            vec!["A", "{", "if", " ", "show", "}", "B", "{", "/if", "}", "C", ""]
        );
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_branch_keywords() {
        use TokenKind::*;
        assert_eq!(
            kinds("{if:elseif x}{if:else}"),
            vec![
                LeftDelimiter,
                ElseIf,
                Whitespace,
                Variable,
                RightDelimiter,
                LeftDelimiter,
                Else,
                RightDelimiter,
                Eos
            ]
        );
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_keyword_needs_a_boundary() {
        assert_eq!(kinds("{iffy}{if_set}{/iframe}"), vec![TokenKind::Text, TokenKind::Eos]);
        assert_eq!(kinds("{if:elsewhere}"), vec![TokenKind::Text, TokenKind::Eos]);
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_expression_tokens() {
        use TokenKind::*;
        let tokens = tokenize(
            r#"{if (count >= -2.5 AND name != "it's") || {exp:tag id="1"} xor TRUE}"#,
            "test",
        );
        let significant: Vec<(TokenKind, &str)> = tokens
            .iter()
            .filter(|token| !token.is(Whitespace))
            .map(|token| (token.kind(), token.value()))
            .collect();
        assert_eq!(
            significant,
            vec![
                (LeftDelimiter, "{"),
                (If, "if"),
                (LeftParen, "("),
                (Variable, "count"),
                (Operator, ">="),
                (Number, "-2.5"),
                (Operator, "AND"),
                (Variable, "name"),
                (Operator, "!="),
                (String, "it's"),
                (RightParen, ")"),
                (Operator, "||"),
                (Tag, r#"{exp:tag id="1"}"#),
                (Operator, "xor"),
                (Bool, "TRUE"),
                (RightDelimiter, "}"),
                (Eos, ""),
            ]
        );
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_string_escapes() {
        let tokens = tokenize(r#"{if 'a\'b' == "c\\d"}"#, "test");
        let strings: Vec<&str> = tokens
            .iter()
            .filter(|token| token.is(TokenKind::String))
            .map(Token::value)
            .collect();
        assert_eq!(strings, vec!["a'b", "c\\d"]);
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_unterminated_string_is_misc() {
        let tokens = tokenize("{if \"open}", "test");
        assert_eq!(tokens[3].kind(), TokenKind::Misc);
        assert_eq!(tokens[3].value(), "\"open}");
        assert!(tokens[4].is(TokenKind::Eos));
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_comments() {
        let tokens = tokenize("a{!-- note {if x} --}b{!-- open", "test");
        assert_eq!(
            tokens.iter().map(Token::kind).collect::<Vec<_>>(),
            vec![
                TokenKind::Text,
                TokenKind::Comment,
                TokenKind::Text,
                TokenKind::Comment,
                TokenKind::Eos
            ]
        );
        assert_eq!(tokens[1].value(), "{!-- note {if x} --}");
        assert_eq!(tokens[3].value(), "{!-- open");
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_escaped_brace_never_opens_a_tag() {
        let tokens = tokenize("\\{if x} literal", "test");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].value(), "{if x} literal");
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_line_numbers_and_context() {
        let tokens = tokenize("one\ntwo\n{if\n  a}\nthree\n{/if}", "page");
        let opening = &tokens[1];
        assert!(opening.is(TokenKind::LeftDelimiter));
        assert_eq!(opening.line(), 3);
        assert_eq!(opening.context(), "page");

        let variable = tokens.iter().find(|t| t.is(TokenKind::Variable)).unwrap();
        assert_eq!(variable.line(), 4);

        let closing = tokens.iter().find(|t| t.is(TokenKind::EndIf)).unwrap();
        assert_eq!(closing.line(), 6);
        assert_eq!(tokens.last().unwrap().line(), 6);
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_unclosed_tag_ends_the_stream() {
        assert_eq!(
            kinds("{if a"),
            vec![
                TokenKind::LeftDelimiter,
                TokenKind::If,
                TokenKind::Whitespace,
                TokenKind::Variable,
                TokenKind::Eos
            ]
        );
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_unknown_characters_are_misc() {
        let tokens = tokenize("{if a = b}", "test");
        assert!(tokens.iter().any(|t| t.is(TokenKind::Misc) && t.value() == "="));
    }
}

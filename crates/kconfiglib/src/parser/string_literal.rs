use crate::parser::{Expected, KConfigError, Located, PeekableChars};

/// Parse a quoted string literal from the stream.
///
/// The stream must be pointing at the opening quote (`"` or `'`). A backslash quotes the following
/// character verbatim, so `"\a"` is `a` and `"\\"` is a single backslash. The literal ends at the
/// matching unescaped quote; literals cannot span lines.
pub(crate) fn parse_string_literal(chars: &mut PeekableChars, quote: char) -> Result<String, KConfigError> {
    let start = chars.location();

    let Some(c) = chars.next() else {
        return Err(KConfigError::unexpected_eof(Expected::StringLiteral, start));
    };

    if c != quote {
        return Err(KConfigError::unexpected(c, quote, start));
    }

    let mut value = String::new();

    loop {
        let Some(c) = chars.next() else {
            return Err(KConfigError::unexpected_eof(quote, chars.location()));
        };

        match c {
            c if c == quote => return Ok(value),
            '\n' => return Err(KConfigError::syntax("Unterminated string literal", start)),
            '\\' => {
                let Some(escaped) = chars.next() else {
                    return Err(KConfigError::unexpected_eof(Expected::Any, chars.location()));
                };

                if escaped == '\n' {
                    return Err(KConfigError::syntax("Unterminated string literal", start));
                }

                value.push(escaped);
            }
            _ => value.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::parse_string_literal,
        crate::parser::PeekableChars,
        std::path::Path,
    };

    fn parse(input: &str) -> Result<String, String> {
        let mut chars = PeekableChars::new(input, Path::new("test"));
        let quote = input.chars().next().unwrap();
        parse_string_literal(&mut chars, quote).map_err(|e| e.to_string())
    }

    #[test]
    fn string_literal_basic() {
        assert_eq!(parse(r#""Hello, world!""#).unwrap(), "Hello, world!");
    }

    #[test]
    fn string_literal_single_quotes() {
        assert_eq!(parse(r#"'weird "quoted" name'"#).unwrap(), "weird \"quoted\" name");
    }

    #[test]
    fn string_literal_backslash_quotes_verbatim() {
        // Escapes carry no special meaning; the backslash simply quotes the next character.
        assert_eq!(parse(r#""\a\\'\b\c\"'d""#).unwrap(), r#"a\'bc"'d"#);
        assert_eq!(parse(r#""\n""#).unwrap(), "n");
    }

    #[test]
    fn string_literal_unterminated() {
        assert!(parse(r#""oops"#).is_err());
        assert!(parse(r#""oops\"#).is_err());
        assert!(parse(r#""oops'"#).is_err());
        assert!(parse("\"oops\nconfig X\"").is_err());
    }
}

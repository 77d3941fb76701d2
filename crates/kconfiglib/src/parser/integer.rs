use crate::parser::{Expected, KConfigError, Located, PeekableChars, Token};

/// Parse an integer literal in decimal, `0x`/`0X` hexadecimal, or leading-zero octal form.
///
/// Hexadecimal literals keep their base in the returned token so that comparisons against
/// hex-typed symbols behave correctly.
pub(crate) fn parse_integer_literal(chars: &mut PeekableChars) -> Result<Token, KConfigError> {
    let start = chars.location();

    let Some(c) = chars.peek() else {
        return Err(KConfigError::unexpected_eof(Expected::IntegerLiteral, start));
    };

    if c == '+' || c == '-' {
        parse_decimal_literal(chars).map(Token::IntLit)
    } else if chars.starts_with("0x") || chars.starts_with("0X") {
        parse_hex_literal(chars).map(Token::HexLit)
    } else if chars.starts_with('0') {
        parse_octal_literal(chars).map(Token::IntLit)
    } else if !c.is_ascii_digit() {
        Err(KConfigError::unexpected(c, Expected::IntegerLiteral, start))
    } else {
        parse_decimal_literal(chars).map(Token::IntLit)
    }
}

fn parse_decimal_literal(chars: &mut PeekableChars) -> Result<i64, KConfigError> {
    let mut literal = String::new();
    let start = chars.location();

    let Some(c) = chars.peek() else {
        return Err(KConfigError::unexpected_eof(Expected::IntegerLiteral, start));
    };

    if c == '+' || c == '-' {
        literal.push(c);
        _ = chars.next();
    }

    loop {
        let Some(c) = chars.peek() else {
            break;
        };

        if c.is_ascii_digit() {
            literal.push(c);
            _ = chars.next();
        } else {
            break;
        }
    }

    #[allow(clippy::from_str_radix_10)]
    i64::from_str_radix(&literal, 10).map_err(|_| KConfigError::invalid_integer(literal, start))
}

fn parse_hex_literal(chars: &mut PeekableChars) -> Result<u64, KConfigError> {
    let mut literal = String::new();
    let start = chars.location();

    let Some(c) = chars.next() else {
        return Err(KConfigError::unexpected_eof(Expected::IntegerLiteral, start));
    };
    if c != '0' {
        return Err(KConfigError::unexpected(c, Expected::IntegerLiteral, start));
    }

    let Some(radix_char) = chars.next() else {
        return Err(KConfigError::unexpected_eof(Expected::IntegerLiteral, start));
    };
    if radix_char != 'x' && radix_char != 'X' {
        return Err(KConfigError::unexpected(radix_char, Expected::IntegerLiteral, start));
    }

    loop {
        let Some(c) = chars.peek() else {
            break;
        };

        if c.is_ascii_hexdigit() {
            literal.push(c);
            _ = chars.next();
        } else {
            break;
        }
    }

    if literal.is_empty() {
        return Err(KConfigError::invalid_integer(format!("0{radix_char}"), start));
    }

    u64::from_str_radix(&literal, 16)
        .map_err(|_| KConfigError::invalid_integer(format!("0{radix_char}{literal}"), start))
}

fn parse_octal_literal(chars: &mut PeekableChars) -> Result<i64, KConfigError> {
    let mut literal = String::new();
    let start = chars.location();

    let Some(c) = chars.peek() else {
        return Err(KConfigError::unexpected_eof(Expected::IntegerLiteral, start));
    };
    if c != '0' {
        return Err(KConfigError::unexpected(c, Expected::IntegerLiteral, start));
    }

    loop {
        let Some(c) = chars.peek() else {
            break;
        };

        if ('0'..='7').contains(&c) {
            literal.push(c);
            _ = chars.next();
        } else {
            break;
        }
    }

    if literal.is_empty() {
        return Ok(0);
    }

    i64::from_str_radix(&literal, 8).map_err(|_| KConfigError::invalid_integer(format!("0{literal}"), start))
}

#[cfg(test)]
mod tests {
    use {
        super::parse_integer_literal,
        crate::parser::{PeekableChars, Token},
        std::path::Path,
    };

    fn parse(input: &str) -> Result<Token, String> {
        let mut chars = PeekableChars::new(input, Path::new("test"));
        parse_integer_literal(&mut chars).map_err(|e| e.to_string())
    }

    #[test]
    fn decimal_literals() {
        assert_eq!(parse("37").unwrap(), Token::IntLit(37));
        assert_eq!(parse("+42").unwrap(), Token::IntLit(42));
        assert_eq!(parse("-10").unwrap(), Token::IntLit(-10));
    }

    #[test]
    fn hex_literals_keep_their_base() {
        assert_eq!(parse("0x37").unwrap(), Token::HexLit(0x37));
        assert_eq!(parse("0XdeadBEEF").unwrap(), Token::HexLit(0xdead_beef));
        assert!(parse("0x").is_err());
    }

    #[test]
    fn octal_literals() {
        assert_eq!(parse("0").unwrap(), Token::IntLit(0));
        assert_eq!(parse("010").unwrap(), Token::IntLit(8));
        assert_eq!(parse("0777").unwrap(), Token::IntLit(0o777));
    }

    #[test]
    fn sign_without_digits_is_an_error() {
        assert!(parse("-").is_err());
        assert!(parse("+x").is_err());
    }
}

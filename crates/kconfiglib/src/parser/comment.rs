use crate::parser::{
    Expected, KConfigError, LocExpr, LocString, Located, Location, PeekableChars, PeekableTokenLines, Token,
};

/// A standalone `comment "text"` block, shown in menus with its text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Comment {
    /// The comment text.
    pub text: LocString,

    /// Dependencies from `depends on` lines following the comment.
    pub depends_on: Vec<LocExpr>,
}

impl Comment {
    /// Parse a comment block, including any trailing `depends on` lines.
    pub fn parse(lines: &mut PeekableTokenLines) -> Result<Self, KConfigError> {
        let Some(mut tokens) = lines.next() else {
            panic!("Expected comment block");
        };

        let (cmd, text) = tokens.read_cmd_str_lit(true)?;
        debug_assert_eq!(cmd.token, Token::Comment);

        let mut depends_on = Vec::new();

        loop {
            let Some(tokens) = lines.peek() else {
                break;
            };

            let Some(cmd) = tokens.peek() else {
                panic!("Expected command token");
            };

            match cmd.token {
                Token::Depends => {
                    let Some(mut tokens) = lines.next() else {
                        panic!("Expected line");
                    };
                    depends_on.push(LocExpr::parse_depends_on(&mut tokens)?);
                }

                _ => break,
            }
        }

        Ok(Self {
            text,
            depends_on,
        })
    }
}

impl Located for Comment {
    fn location(&self) -> Location {
        self.text.location()
    }
}

/// Consume a `#` line comment from the stream.
///
/// The stream must be pointing at a `#` character. This and the rest of the line, up to and
/// including the newline, will be consumed. The comment text itself is discarded.
pub(crate) fn parse_comment(chars: &mut PeekableChars) -> Result<(), KConfigError> {
    let Some(c) = chars.next() else {
        return Err(KConfigError::unexpected_eof(Expected::Any, chars.location()));
    };

    if c != '#' {
        return Err(KConfigError::unexpected(c, "#", chars.location()));
    }

    _ = chars.read_until('\n');
    if chars.peek() == Some('\n') {
        _ = chars.next();
    }

    Ok(())
}

use {
    crate::parser::{
        comment::parse_comment, integer::parse_integer_literal, string_literal::parse_string_literal,
        token::parse_keyword_or_symbol, Expected, KConfigError, LocExpr, LocString, LocToken, Located, Location,
        Token,
    },
    std::{iter::FusedIterator, ops::Deref, path::Path},
};

/// An iterator over a string slice from a file that returns characters and can peek at the next character.
///
/// This is more powerful than Peekable<Chars>:
/// * It can return the remainder of the string.
/// * It can peek at the rest of the current line.
/// * [`&str`][str] methods such as [`starts_with()`][str::starts_with()] can be used via [`Deref`][Deref].
/// * It can return the location of the current position.
#[derive(Clone, Debug)]
pub struct PeekableChars<'buf> {
    base: &'buf str,
    offset: usize,
    location: Location,
}

impl<'buf> PeekableChars<'buf> {
    /// Create a new PeekableChars from a string slice and filename.
    pub fn new(base: &'buf str, filename: &Path) -> Self {
        Self {
            base,
            offset: 0,
            location: Location::start_of(filename),
        }
    }

    /// Returns the underlying string.
    #[inline(always)]
    pub fn base_str(&self) -> &'buf str {
        self.base
    }

    /// Returns the current offset in the string.
    #[inline(always)]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the remaining length, in bytes, of the string.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.base.len() - self.offset
    }

    /// Returns true if there are no more bytes to read.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.offset >= self.base.len()
    }

    /// Peek at the next character in the string.
    #[inline(always)]
    pub fn peek(&self) -> Option<char> {
        self.base[self.offset..].chars().next()
    }

    /// Peek at the remainder of the current line, not including the newline. The stream is not
    /// advanced.
    pub fn peek_line(&self) -> &'buf str {
        let rest = &self.base[self.offset..];
        match rest.find('\n') {
            Some(n) => &rest[..n],
            None => rest,
        }
    }

    /// Advances the offset by the given number of bytes.
    pub fn advance(&mut self, n: usize) {
        let target = self.offset + n;

        if target > self.base.len() {
            panic!("{n} advances to {target}, which is past the end of the string");
        }

        while self.offset < target {
            if self.next().is_none() {
                break;
            }
        }

        if self.offset != target {
            panic!("{n} advances to {target}, which is not a char boundary");
        }
    }

    /// Read characters until the given predicate returns true or the end of the string is reached.
    pub fn read_until(&mut self, predicate: impl CharPredicate) -> &'buf str {
        let start = self.offset;

        while let Some(c) = self.peek() {
            if predicate.matches(c) {
                break;
            }

            self.offset += c.len_utf8();
            self.location.advance_char(c);
        }

        &self.base[start..self.offset]
    }
}

impl Located for PeekableChars<'_> {
    fn location(&self) -> Location {
        self.location
    }
}

impl<'buf> Deref for PeekableChars<'buf> {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.base[self.offset..]
    }
}

impl<'buf> Iterator for PeekableChars<'buf> {
    type Item = char;

    fn next(&mut self) -> Option<Self::Item> {
        match self.peek() {
            Some(c) => {
                self.offset += c.len_utf8();
                self.location.advance_char(c);
                Some(c)
            }
            None => None,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let max = self.base.len() - self.offset;
        let min = (max + 3) / 4;
        (min, Some(max))
    }
}

impl<'buf> FusedIterator for PeekableChars<'buf> {}

/// A trait for predicates that match characters.
pub trait CharPredicate {
    /// Returns true if the character matches the predicate.
    fn matches(&self, c: char) -> bool;
}

impl<F> CharPredicate for F
where
    F: Fn(char) -> bool,
{
    fn matches(&self, c: char) -> bool {
        self(c)
    }
}

impl CharPredicate for char {
    fn matches(&self, c: char) -> bool {
        *self == c
    }
}

/// An iterator over lines of tokens that can peek ahead at the next line without consuming it.
pub struct PeekableTokenLines<'buf> {
    base: &'buf [Vec<LocToken>],
    offset: usize,
}

impl<'buf> PeekableTokenLines<'buf> {
    /// Peek at the next line of tokens.
    #[inline(always)]
    pub fn peek(&self) -> Option<TokenLine<'buf>> {
        if self.offset < self.base.len() {
            Some(TokenLine {
                base: &self.base[self.offset],
                offset: 0,
            })
        } else {
            None
        }
    }

    /// Return the remainder of the lines.
    #[inline(always)]
    pub fn remainder(&self) -> &'buf [Vec<LocToken>] {
        &self.base[self.offset..]
    }

    /// Return the lines that have already been processed.
    #[inline(always)]
    pub fn processed(&self) -> &'buf [Vec<LocToken>] {
        &self.base[..self.offset]
    }

    /// Advances the offset by the given number of lines.
    #[inline(always)]
    pub fn advance(&mut self, n: usize) {
        self.offset += n;
        if self.offset > self.base.len() {
            self.offset = self.base.len();
        }
    }
}

impl<'buf> Iterator for PeekableTokenLines<'buf> {
    type Item = TokenLine<'buf>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.peek() {
            Some(line) => {
                self.offset += 1;
                Some(line)
            }
            None => None,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.base.len() - self.offset;
        (n, Some(n))
    }
}

impl<'buf> FusedIterator for PeekableTokenLines<'buf> {}

/// An extension trait for `&[Vec<Token>]` that provides `peek_lines()`.
pub trait PeekableTokenLinesExt {
    /// Return a [`PeekableTokenLines`] iterator over the slice.
    fn peek_lines(&self) -> PeekableTokenLines;
}

impl PeekableTokenLinesExt for [Vec<LocToken>] {
    fn peek_lines(&self) -> PeekableTokenLines {
        PeekableTokenLines {
            base: self,
            offset: 0,
        }
    }
}

/// An iterator over a single line of tokens that can peek ahead at the next token without consuming it.
#[derive(Debug)]
pub struct TokenLine<'buf> {
    base: &'buf [LocToken],
    offset: usize,
}

impl<'buf> TokenLine<'buf> {
    /// Create a new `TokenLine` from the given slice of tokens.
    pub fn new(base: &'buf [LocToken]) -> Self {
        Self {
            base,
            offset: 0,
        }
    }

    /// Returns the underlying line of tokens as a slice.
    #[inline(always)]
    pub fn line(&self) -> &'buf [LocToken] {
        self.base
    }

    /// Returns the current token offset in the line.
    #[inline(always)]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the remaining number of tokens to read in the line.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.base.len() - self.offset
    }

    /// Returns true if there are no more tokens to read.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.offset >= self.base.len()
    }

    /// Peek at the next token in the line.
    #[inline(always)]
    pub fn peek(&self) -> Option<&'buf LocToken> {
        if self.offset < self.base.len() {
            Some(&self.base[self.offset])
        } else {
            None
        }
    }

    /// Peek at the nth token in the line.
    #[inline(always)]
    pub fn peek_at(&self, n: usize) -> Option<&'buf LocToken> {
        if self.offset + n < self.base.len() {
            Some(&self.base[self.offset + n])
        } else {
            None
        }
    }

    /// Read a command followed by a symbol from the line.
    pub fn read_cmd_sym(&mut self, require_eol: bool) -> Result<(&LocToken, LocString), KConfigError> {
        let Some(cmd) = self.next() else {
            panic!("Expected keyword");
        };

        let Some(name) = self.next() else {
            return Err(KConfigError::missing(Expected::Symbol, cmd.location()));
        };

        let Some(name) = name.symbol_value() else {
            return Err(KConfigError::unexpected(name, Expected::Symbol, name.location()));
        };

        if require_eol {
            if let Some(unexpected) = self.next() {
                return Err(KConfigError::unexpected(unexpected, Expected::Eol, unexpected.location()));
            }
        }

        let name = name.to_loc_string();

        Ok((cmd, name))
    }

    /// Read a command followed by a string literal from the line.
    pub fn read_cmd_str_lit(&mut self, require_eol: bool) -> Result<(&LocToken, LocString), KConfigError> {
        let Some(cmd) = self.next() else {
            panic!("Expected keyword");
        };

        let Some(str_lit) = self.next() else {
            return Err(KConfigError::missing(Expected::StringLiteral, cmd.location()));
        };

        let Some(str_lit) = str_lit.string_literal_value() else {
            return Err(KConfigError::unexpected(str_lit, Expected::StringLiteral, str_lit.location()));
        };

        if require_eol {
            if let Some(unexpected) = self.next() {
                return Err(KConfigError::unexpected(unexpected, Expected::Eol, unexpected.location()));
            }
        }

        let str_lit = str_lit.to_loc_string();

        Ok((cmd, str_lit))
    }

    /// Read an `if <expr>` expression, if present.
    pub fn read_if_expr(&mut self, require_eof: bool) -> Result<Option<LocExpr>, KConfigError> {
        let Some(if_token) = self.next() else {
            return Ok(None);
        };

        if if_token.token != Token::If {
            return Err(KConfigError::unexpected(if_token, Expected::IfOrEol, if_token.location()));
        }

        let expr = LocExpr::parse(if_token.location(), self)?;

        if require_eof {
            if let Some(unexpected) = self.next() {
                return Err(KConfigError::unexpected(unexpected, Expected::Eol, unexpected.location()));
            }
        }

        Ok(Some(expr))
    }

    /// Read the help text from a `help` block.
    ///
    /// This is tokenized as [`Token::Help`] followed by a [`Token::StrLit`].
    ///
    /// If the line is not a `help` block, this returns an error.
    pub fn read_help(&mut self) -> Result<LocString, KConfigError> {
        let Some(cmd) = self.next() else {
            panic!("Expected keyword");
        };

        if cmd.token != Token::Help {
            return Err(KConfigError::unexpected(cmd, Expected::Help, cmd.location()));
        }

        let Some(text) = self.next() else {
            return Err(KConfigError::missing(Expected::StringLiteral, cmd.location()));
        };

        let Some(text) = text.string_literal_value() else {
            return Err(KConfigError::unexpected(text, Expected::StringLiteral, text.location()));
        };

        if let Some(unexpected) = self.peek() {
            return Err(KConfigError::unexpected(unexpected, Expected::Eol, unexpected.location()));
        };

        let text = text.to_loc_string();
        Ok(text)
    }
}

impl<'buf> Iterator for TokenLine<'buf> {
    type Item = &'buf LocToken;

    fn next(&mut self) -> Option<Self::Item> {
        match self.peek() {
            Some(c) => {
                self.offset += 1;
                Some(c)
            }
            None => None,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.base.len() - self.offset;
        (n, Some(n))
    }
}

impl<'buf> FusedIterator for TokenLine<'buf> {}

/// Parse the input stream into lines of tokens.
pub fn parse_stream(mut chars: PeekableChars) -> Result<Vec<Vec<LocToken>>, KConfigError> {
    let mut lines = vec![];

    loop {
        let line = parse_line(&mut chars)?;
        if line.is_empty() {
            break;
        }

        lines.push(line);
    }

    Ok(lines)
}

/// Parse the next non-empty line from the stream.
///
/// This returns an empty vector if EOF is reached without parsing any tokens.
pub fn parse_line(chars: &mut PeekableChars) -> Result<Vec<LocToken>, KConfigError> {
    'outer: loop {
        let mut tokens = vec![];

        loop {
            let Some(c) = chars.peek() else {
                // EOF reached. Return what we have.
                return Ok(tokens);
            };

            match c {
                '#' | '\n' => {
                    if c == '#' {
                        parse_comment(chars)?;
                    } else {
                        _ = chars.next();
                    }

                    if tokens.is_empty() {
                        // This line is empty; continue parsing from the next line.
                        continue 'outer;
                    } else if tokens.len() == 1 && tokens[0].token == Token::Help {
                        // This is a help block. Parse the help text and return it as a string literal.
                        let start = chars.location();
                        tokens.push(LocToken::new(Token::StrLit(read_help_block(chars)), start));
                        return Ok(tokens);
                    } else {
                        // This line is not empty; return what we have.
                        return Ok(tokens);
                    }
                }

                '"' | '\'' => {
                    let start = chars.location();
                    let s = parse_string_literal(chars, c)?;
                    tokens.push(LocToken::new(Token::StrLit(s), start));
                }

                '-' if chars.starts_with("---help---") => {
                    let start = chars.location();
                    chars.advance("---help---".len());
                    tokens.push(LocToken::new(Token::Help, start));
                }

                '+' | '-' | '0'..='9' => {
                    let start = chars.location();
                    let token = parse_integer_literal(chars)?;
                    tokens.push(LocToken::new(token, start));
                }

                c if c.is_whitespace() => {
                    _ = chars.next();
                }

                c if c.is_alphabetic() || c == '_' => {
                    let token = parse_keyword_or_symbol(chars)?;
                    tokens.push(token);
                }

                '&' if chars.starts_with("&&") => {
                    let start = chars.location();
                    _ = chars.next();
                    _ = chars.next();
                    tokens.push(LocToken::new(Token::And, start));
                }

                '|' if chars.starts_with("||") => {
                    let start = chars.location();
                    _ = chars.next();
                    _ = chars.next();
                    tokens.push(LocToken::new(Token::Or, start));
                }

                '=' => {
                    let start = chars.location();
                    _ = chars.next();
                    tokens.push(LocToken::new(Token::Eq, start));
                }

                '!' => {
                    let start = chars.location();
                    _ = chars.next();
                    let op = if chars.peek() == Some('=') {
                        _ = chars.next();
                        Token::Ne
                    } else {
                        Token::Not
                    };

                    tokens.push(LocToken::new(op, start));
                }

                '(' => {
                    let start = chars.location();
                    _ = chars.next();
                    tokens.push(LocToken::new(Token::LParen, start));
                }

                ')' => {
                    let start = chars.location();
                    _ = chars.next();
                    tokens.push(LocToken::new(Token::RParen, start));
                }

                '<' => {
                    let start = chars.location();
                    _ = chars.next();
                    let op = if chars.peek() == Some('=') {
                        _ = chars.next();
                        Token::Le
                    } else {
                        Token::Lt
                    };

                    tokens.push(LocToken::new(op, start));
                }

                '>' => {
                    let start = chars.location();
                    _ = chars.next();
                    let op = if chars.peek() == Some('=') {
                        _ = chars.next();
                        Token::Ge
                    } else {
                        Token::Gt
                    };

                    tokens.push(LocToken::new(op, start));
                }

                '\\' if chars.starts_with("\\\n") => {
                    // Line continuation. Skip the backslash and newline.
                    _ = chars.next();
                    _ = chars.next();
                }

                _ => return Err(KConfigError::syntax(c, chars.location())),
            }
        }
    }
}

/// Read a help block from the stream.
///
/// The first non-blank line of the block sets the reference indentation, measured in columns with
/// tab stops every 8. The block continues until the first non-blank line indented less than the
/// reference; that line is left in the stream. Captured lines keep any indentation beyond the
/// reference column. Blank lines inside the block are preserved, while blank lines before and
/// after the block are dropped.
///
/// A `help` keyword directly followed by a flush-left line yields an empty (but present) help
/// text.
fn read_help_block(chars: &mut PeekableChars) -> String {
    let mut help = String::new();
    let mut reference = 0;
    let mut pending_blanks = 0;

    while !chars.is_empty() {
        let line = chars.peek_line();

        if line.trim_end().is_empty() {
            chars.advance(line.len());
            if chars.peek() == Some('\n') {
                _ = chars.next();
            }

            // Blank lines are only emitted once a later in-block line arrives. Blank lines
            // before the first captured line and after the last one vanish.
            if !help.is_empty() {
                pending_blanks += 1;
            }

            continue;
        }

        let (indent, expanded) = expand_line(line);

        if reference == 0 {
            if indent == 0 {
                break;
            }

            reference = indent;
        } else if indent < reference {
            break;
        }

        chars.advance(line.len());
        if chars.peek() == Some('\n') {
            _ = chars.next();
        }

        for _ in 0..pending_blanks {
            help.push('\n');
        }
        pending_blanks = 0;

        help.push_str(&expanded[reference..]);
        help.push('\n');
    }

    help
}

/// Expand tabs to 8-column stops. Returns the indentation width in columns together with the
/// expanded line.
fn expand_line(line: &str) -> (usize, String) {
    let mut expanded = String::with_capacity(line.len());
    let mut column = 0;
    let mut indent = None;

    for c in line.chars() {
        if c == '\t' {
            let next = (column + 8) & !7;
            while column < next {
                expanded.push(' ');
                column += 1;
            }
        } else {
            if indent.is_none() && c != ' ' {
                indent = Some(column);
            }

            expanded.push(c);
            column += 1;
        }
    }

    (indent.unwrap_or(column), expanded)
}

#[cfg(test)]
mod tests {
    use {
        super::{parse_stream, PeekableChars},
        crate::parser::{LocToken, Token},
        std::path::Path,
    };

    fn tokenize(input: &str) -> Vec<Vec<LocToken>> {
        parse_stream(PeekableChars::new(input, Path::new("test"))).unwrap()
    }

    fn help_text(input: &str) -> String {
        let lines = tokenize(input);
        for line in &lines {
            if line.len() == 2 && line[0].token == Token::Help {
                let Token::StrLit(text) = &line[1].token else {
                    panic!("help line not followed by a string literal: {line:?}");
                };
                return text.clone();
            }
        }
        panic!("no help block found");
    }

    #[test]
    fn tokenize_basic_lines() {
        let lines = tokenize("config FOO\n\tbool \"foo\"\n\tdepends on BAR && !BAZ\n");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0][0].token, Token::Config);
        assert_eq!(lines[0][1].token, Token::Symbol("FOO".into()));
        assert_eq!(lines[1][0].token, Token::Bool);
        assert_eq!(lines[1][1].token, Token::StrLit("foo".into()));
        assert_eq!(
            lines[2].iter().map(|t| t.token.clone()).collect::<Vec<_>>(),
            vec![
                Token::Depends,
                Token::On,
                Token::Symbol("BAR".into()),
                Token::And,
                Token::Not,
                Token::Symbol("BAZ".into())
            ]
        );
    }

    #[test]
    fn tokenize_line_continuation() {
        let lines = tokenize("config FOO\n\tdepends on BAR && \\\n\t\tBAZ\n");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].len(), 5);
        assert_eq!(lines[1][4].token, Token::Symbol("BAZ".into()));
    }

    #[test]
    fn tokenize_comments_and_blank_lines() {
        let lines = tokenize("# leading comment\n\nconfig FOO # trailing comment\n\n\tbool\n");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), 2);
        assert_eq!(lines[1][0].token, Token::Bool);
    }

    #[test]
    fn tokenize_dashed_help_keyword() {
        let lines = tokenize("config FOO\n\tbool\n\t---help---\n\t  text\n");
        assert_eq!(lines[2][0].token, Token::Help);
        assert_eq!(lines[2][1].token, Token::StrLit("text\n".into()));
    }

    #[test]
    fn help_reference_indent_is_tab_aware() {
        // The first line sets the reference at a tab plus two spaces (10 columns). Deeper
        // indentation is kept relative to it, and inner blank lines survive while the trailing
        // one is trimmed.
        let input = "config TRICKY\n\tbool\n\thelp\n\n\t  a\n\t   b\n\t    c\n\n\t   d\n\t    e\n\t     f\n\n\n\t  g\n\t   h\n\t    i\n\nconfig NEXT\n\tbool\n";
        assert_eq!(help_text(input), "a\n b\n  c\n\n d\n  e\n   f\n\n\ng\n h\n  i\n");
    }

    #[test]
    fn help_terminated_by_flush_left_comment() {
        let input = "config FOO\n\tbool\n\thelp\n\t  a\n\t  b\n\t  c\n# stop\nconfig NEXT\n\tbool\n";
        assert_eq!(help_text(input), "a\nb\nc\n");

        // The terminating lines must remain in the stream.
        let lines = tokenize(input);
        let last = lines.last().unwrap();
        assert_eq!(last[0].token, Token::Bool);
    }

    #[test]
    fn help_with_no_indented_lines_is_empty() {
        let input = "config FOO\n\tbool\n\thelp\nconfig NEXT\n\tbool\n";
        assert_eq!(help_text(input), "");

        let lines = tokenize(input);
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[3][0].token, Token::Config);
    }

    #[test]
    fn help_spaces_and_tabs_mix() {
        // Eight spaces and a tab reach the same column, so both lines are part of the block.
        let input = "config FOO\n\tbool\n\thelp\n\tfirst\n        second\nconfig NEXT\n\tbool\n";
        assert_eq!(help_text(input), "first\nsecond\n");
    }
}

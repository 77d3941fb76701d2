use {
    crate::parser::{Expected, KConfigError, LitValue, LocToken, Located, Location, Token, TokenLine},
    std::fmt::{Display, Formatter, Result as FmtResult},
};

/// An expression in the Kconfig language.
///
/// Operator precedence, from loosest to tightest binding: `||`, `&&`, the comparisons, `!`.
/// Comparisons do not associate and only accept terminals (symbols and literals) as operands, so
/// `!A = B` negates the comparison rather than the symbol.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Expr {
    /// Named symbol reference (terminal).
    Symbol(String),

    /// Literal constant (terminal): `n`/`m`/`y`, a quoted string, or a number.
    Literal(LitValue),

    /// Tristate negation: swaps `y` and `n`, keeps `m`.
    Not(Box<Expr>),

    /// Tristate AND, the minimum of both sides.
    And(Box<Expr>, Box<Expr>),

    /// Tristate OR, the maximum of both sides.
    Or(Box<Expr>, Box<Expr>),

    /// Equality comparison.
    Eq(Box<Expr>, Box<Expr>),

    /// Inequality comparison.
    Ne(Box<Expr>, Box<Expr>),

    /// Less-than comparison.
    Lt(Box<Expr>, Box<Expr>),

    /// Less-than-or-equal comparison.
    Le(Box<Expr>, Box<Expr>),

    /// Greater-than comparison.
    Gt(Box<Expr>, Box<Expr>),

    /// Greater-than-or-equal comparison.
    Ge(Box<Expr>, Box<Expr>),
}

/// An expression with a location.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LocExpr {
    /// The expression.
    pub expr: Expr,

    /// The location of the expression.
    pub location: Location,
}

impl LocExpr {
    /// Create a new located expression.
    pub fn new(expr: Expr, location: Location) -> Self {
        Self {
            expr,
            location,
        }
    }

    /// Parse an expression from the remaining tokens on the line.
    ///
    /// `prev` is the location reported when the line is already empty. Parsing stops at the first
    /// token that cannot extend the expression (such as a trailing `if`); the caller decides
    /// whether leftovers are an error.
    pub fn parse(prev: Location, tokens: &mut TokenLine) -> Result<Self, KConfigError> {
        let Some(first) = tokens.peek() else {
            return Err(KConfigError::missing(Expected::Expr, prev));
        };

        let location = first.location();
        let expr = Expr::parse_or(prev, tokens)?;
        Ok(Self::new(expr, location))
    }

    /// Parse a `depends on <expr>` line, including the leading keywords.
    pub fn parse_depends_on(tokens: &mut TokenLine) -> Result<Self, KConfigError> {
        let Some(cmd) = tokens.next() else {
            panic!("Expected depends keyword");
        };
        debug_assert_eq!(cmd.token, Token::Depends);

        let Some(on_token) = tokens.next() else {
            return Err(KConfigError::missing(Expected::On, cmd.location()));
        };

        if on_token.token != Token::On {
            return Err(KConfigError::unexpected(on_token, Expected::On, on_token.location()));
        }

        let expr = Self::parse(on_token.location(), tokens)?;

        if let Some(unexpected) = tokens.next() {
            return Err(KConfigError::unexpected(unexpected, Expected::Eol, unexpected.location()));
        }

        Ok(expr)
    }

    /// Parse a `visible if <expr>` line, including the leading keywords.
    pub fn parse_visible_if(tokens: &mut TokenLine) -> Result<Self, KConfigError> {
        let Some(cmd) = tokens.next() else {
            panic!("Expected visible keyword");
        };
        debug_assert_eq!(cmd.token, Token::Visible);

        let Some(if_token) = tokens.next() else {
            return Err(KConfigError::missing(Expected::If, cmd.location()));
        };

        if if_token.token != Token::If {
            return Err(KConfigError::unexpected(if_token, Expected::If, if_token.location()));
        }

        let expr = Self::parse(if_token.location(), tokens)?;

        if let Some(unexpected) = tokens.next() {
            return Err(KConfigError::unexpected(unexpected, Expected::Eol, unexpected.location()));
        }

        Ok(expr)
    }

    /// Indicates whether this expression references the named symbol at any depth.
    #[inline(always)]
    pub fn references(&self, name: &str) -> bool {
        self.expr.references(name)
    }
}

impl Located for LocExpr {
    fn location(&self) -> Location {
        self.location
    }
}

impl Display for LocExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.expr, f)
    }
}

impl Expr {
    /// Parse an `||` production from the remaining tokens on the line.
    fn parse_or(prev: Location, tokens: &mut TokenLine) -> Result<Self, KConfigError> {
        let mut expr = Self::parse_and(prev, tokens)?;

        while let Some(op) = tokens.peek() {
            if op.token != Token::Or {
                break;
            }
            _ = tokens.next();

            let rhs = Self::parse_and(op.location(), tokens)?;
            expr = Self::Or(Box::new(expr), Box::new(rhs));
        }

        Ok(expr)
    }

    /// Parse an `&&` production from the remaining tokens on the line.
    fn parse_and(prev: Location, tokens: &mut TokenLine) -> Result<Self, KConfigError> {
        let mut expr = Self::parse_factor(prev, tokens)?;

        while let Some(op) = tokens.peek() {
            if op.token != Token::And {
                break;
            }
            _ = tokens.next();

            let rhs = Self::parse_factor(op.location(), tokens)?;
            expr = Self::And(Box::new(expr), Box::new(rhs));
        }

        Ok(expr)
    }

    /// Parse a factor: a negation, a parenthesized expression, or a terminal optionally followed
    /// by a comparison against another terminal.
    fn parse_factor(prev: Location, tokens: &mut TokenLine) -> Result<Self, KConfigError> {
        let Some(token) = tokens.next() else {
            return Err(KConfigError::missing(Expected::Expr, prev));
        };

        match &token.token {
            Token::Not => {
                let operand = Self::parse_factor(token.location(), tokens)?;
                Ok(Self::Not(Box::new(operand)))
            }

            Token::LParen => {
                let inner = Self::parse_or(token.location(), tokens)?;

                let Some(close) = tokens.next() else {
                    return Err(KConfigError::missing(Expected::RParen, token.location()));
                };

                if close.token != Token::RParen {
                    return Err(KConfigError::unexpected(close, Expected::RParen, close.location()));
                }

                Ok(inner)
            }

            _ => {
                let lhs = Self::terminal(token)?;

                let Some(op) = tokens.peek() else {
                    return Ok(lhs);
                };

                if !op.is_relation() {
                    return Ok(lhs);
                }
                _ = tokens.next();

                let Some(rhs_token) = tokens.next() else {
                    return Err(KConfigError::missing(Expected::SymbolOrValue, op.location()));
                };
                let rhs = Self::terminal(rhs_token)?;

                let (lhs, rhs) = (Box::new(lhs), Box::new(rhs));
                Ok(match op.token {
                    Token::Eq => Self::Eq(lhs, rhs),
                    Token::Ne => Self::Ne(lhs, rhs),
                    Token::Lt => Self::Lt(lhs, rhs),
                    Token::Le => Self::Le(lhs, rhs),
                    Token::Gt => Self::Gt(lhs, rhs),
                    Token::Ge => Self::Ge(lhs, rhs),
                    _ => unreachable!("is_relation covers all comparison tokens"),
                })
            }
        }
    }

    /// Convert a single token into a terminal expression.
    fn terminal(token: &LocToken) -> Result<Self, KConfigError> {
        match token.token.literal_value() {
            Some(LitValue::Symbol(name)) => Ok(Self::Symbol(name)),
            Some(value) => Ok(Self::Literal(value)),
            None => Err(KConfigError::unexpected(token, Expected::SymbolOrValue, token.location())),
        }
    }

    /// AND the given expressions together, left to right. Returns `None` for an empty iterator.
    pub fn conjoin<I: IntoIterator<Item = Expr>>(conds: I) -> Option<Expr> {
        let mut result: Option<Expr> = None;

        for cond in conds {
            result = Some(match result {
                Some(acc) => Expr::And(Box::new(acc), Box::new(cond)),
                None => cond,
            });
        }

        result
    }

    /// OR the given expressions together, left to right. Returns `None` for an empty iterator.
    pub fn disjoin<I: IntoIterator<Item = Expr>>(conds: I) -> Option<Expr> {
        let mut result: Option<Expr> = None;

        for cond in conds {
            result = Some(match result {
                Some(acc) => Expr::Or(Box::new(acc), Box::new(cond)),
                None => cond,
            });
        }

        result
    }

    /// Visit every symbol reference in this expression, in left-to-right order.
    pub fn for_each_symbol<F: FnMut(&str)>(&self, f: &mut F) {
        match self {
            Self::Symbol(name) => f(name),
            Self::Literal(LitValue::Symbol(name)) => f(name),
            Self::Literal(_) => (),
            Self::Not(e) => e.for_each_symbol(f),
            Self::And(a, b)
            | Self::Or(a, b)
            | Self::Eq(a, b)
            | Self::Ne(a, b)
            | Self::Lt(a, b)
            | Self::Le(a, b)
            | Self::Gt(a, b)
            | Self::Ge(a, b) => {
                a.for_each_symbol(f);
                b.for_each_symbol(f);
            }
        }
    }

    /// Indicates whether this expression references the named symbol at any depth.
    pub fn references(&self, name: &str) -> bool {
        let mut found = false;
        self.for_each_symbol(&mut |s| found |= s == name);
        found
    }

    /// The binding strength of this node. Higher binds tighter.
    fn precedence(&self) -> u8 {
        match self {
            Self::Or(..) => 0,
            Self::And(..) => 1,
            Self::Eq(..) | Self::Ne(..) | Self::Lt(..) | Self::Le(..) | Self::Gt(..) | Self::Ge(..) => 2,
            Self::Not(_) => 3,
            Self::Symbol(_) | Self::Literal(_) => 4,
        }
    }

    /// Format an operand of a binary operator, parenthesizing when needed so that re-parsing the
    /// output reproduces this tree. `&&`/`||` display left-associated; the right operand is
    /// parenthesized even at equal precedence.
    fn fmt_operand(&self, f: &mut Formatter<'_>, parent: u8, right: bool) -> FmtResult {
        let mine = self.precedence();
        if mine < parent || (right && mine == parent) {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Symbol(name) => f.write_str(name),
            Self::Literal(value) => Display::fmt(value, f),
            Self::Not(e) => {
                f.write_str("!")?;
                e.fmt_operand(f, self.precedence(), false)
            }
            Self::And(a, b) => {
                a.fmt_operand(f, self.precedence(), false)?;
                f.write_str(" && ")?;
                b.fmt_operand(f, self.precedence(), true)
            }
            Self::Or(a, b) => {
                a.fmt_operand(f, self.precedence(), false)?;
                f.write_str(" || ")?;
                b.fmt_operand(f, self.precedence(), true)
            }
            Self::Eq(a, b) => write!(f, "{a} = {b}"),
            Self::Ne(a, b) => write!(f, "{a} != {b}"),
            Self::Lt(a, b) => write!(f, "{a} < {b}"),
            Self::Le(a, b) => write!(f, "{a} <= {b}"),
            Self::Gt(a, b) => write!(f, "{a} > {b}"),
            Self::Ge(a, b) => write!(f, "{a} >= {b}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::{Expr, LocExpr},
        crate::parser::{parse_stream, LitValue, PeekableChars, TokenLine, Tristate},
        std::path::Path,
    };

    fn parse(input: &str) -> Result<Expr, String> {
        let lines = parse_stream(PeekableChars::new(input, Path::new("test"))).map_err(|e| e.to_string())?;
        let Some(line) = lines.first() else {
            return Err("empty input".into());
        };
        assert_eq!(lines.len(), 1, "expected a single line of tokens: {input:?}");

        let mut tokens = TokenLine::new(line);
        let start = tokens.peek().unwrap().location;
        let expr = LocExpr::parse(start, &mut tokens).map_err(|e| e.to_string())?;

        if let Some(leftover) = tokens.peek() {
            return Err(format!("leftover token {leftover}"));
        }

        Ok(expr.expr)
    }

    fn sym(name: &str) -> Box<Expr> {
        Box::new(Expr::Symbol(name.into()))
    }

    #[test]
    fn and_binds_tighter_than_or() {
        assert_eq!(
            parse("A || B && C").unwrap(),
            Expr::Or(sym("A"), Box::new(Expr::And(sym("B"), sym("C")))),
        );
    }

    #[test]
    fn binary_operators_are_left_associative() {
        assert_eq!(
            parse("A && B && C").unwrap(),
            Expr::And(Box::new(Expr::And(sym("A"), sym("B"))), sym("C")),
        );
    }

    #[test]
    fn not_binds_the_comparison_not_the_symbol() {
        // `!` applies to the whole comparison because comparisons only accept terminals.
        assert_eq!(
            parse("!A = B").unwrap(),
            Expr::Not(Box::new(Expr::Eq(sym("A"), sym("B")))),
        );
    }

    #[test]
    fn parentheses_override_precedence() {
        assert_eq!(
            parse("(A || B) && C").unwrap(),
            Expr::And(Box::new(Expr::Or(sym("A"), sym("B"))), sym("C")),
        );
    }

    #[test]
    fn tristate_names_parse_as_literals() {
        assert_eq!(parse("y").unwrap(), Expr::Literal(LitValue::Tristate(Tristate::True)));
        assert_eq!(
            parse("A = m").unwrap(),
            Expr::Eq(sym("A"), Box::new(Expr::Literal(LitValue::Tristate(Tristate::Maybe)))),
        );
    }

    #[test]
    fn numeric_and_string_literals() {
        assert_eq!(
            parse("A >= 0x1e3").unwrap(),
            Expr::Ge(sym("A"), Box::new(Expr::Literal(LitValue::Hex(0x1e3)))),
        );
        assert_eq!(
            parse("B != \"lammchen\"").unwrap(),
            Expr::Ne(sym("B"), Box::new(Expr::Literal(LitValue::String("lammchen".into())))),
        );
        assert_eq!(
            parse("C < -55").unwrap(),
            Expr::Lt(sym("C"), Box::new(Expr::Literal(LitValue::Int(-55)))),
        );
    }

    #[test]
    fn malformed_expressions_are_rejected() {
        for bad in ["", "&", "|", "!", "(", ")", "=", "(X", "X &&", "&& X", "X ||", "|| X", "X =", "X (", "!X = y = n"]
        {
            assert!(parse(bad).is_err(), "{bad:?} parsed successfully");
        }
    }

    #[test]
    fn display_round_trips_structurally() {
        for input in [
            "A && B || !C",
            "!(A || B) && C",
            "A = \"value\" || B != y",
            "X0 < 0x37 && X1 >= 10",
            "A || (B || C)",
        ] {
            let expr = parse(input).unwrap();
            let redisplayed = parse(&expr.to_string()).unwrap();
            assert_eq!(expr, redisplayed, "display of {input:?} was {expr}");
        }
    }
}

use {
    crate::parser::{Located, Location},
    std::fmt::{Display, Formatter, Result as FmtResult, Write},
};

/// Literal value data.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LitValue {
    /// Hex value
    Hex(u64),

    /// Integer value.
    Int(i64),

    /// String value.
    String(String),

    /// Symbol.
    Symbol(String),

    /// Tristate value.
    Tristate(Tristate),
}

impl Display for LitValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Hex(value) => write!(f, "{value:#x}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::String(value) => write_str_lit(f, value),
            Self::Symbol(name) => f.write_str(name),
            Self::Tristate(value) => f.write_str(value.name()),
        }
    }
}

/// Write a string as a double-quoted Kconfig literal, escaping quotes and backslashes.
pub(crate) fn write_str_lit<W: Write + ?Sized>(f: &mut W, s: &str) -> FmtResult {
    f.write_str("\"")?;
    for c in s.chars() {
        if c == '"' || c == '\\' {
            write!(f, "\\{c}")?;
        } else {
            write!(f, "{c}")?;
        }
    }
    f.write_str("\"")
}

/// A literal value with a location.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LocLitValue {
    /// The literal value.
    pub value: LitValue,

    /// The location of the literal value.
    pub location: Location,
}

/// A tristate value.
///
/// This takes on `false`, `maybe`, or `true`, corresponding with `n`, `m`, and `y`. Variants are
/// ordered `n < m < y` so that `min`/`max` give the usual tristate AND/OR.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum Tristate {
    /// `false` (`n`) tristate value.
    False,

    /// `maybe` (`m`) tristate value.
    Maybe,

    /// `true` (`y`) tristate value.
    True,
}

impl LocLitValue {
    /// Create a new `LocLitValue` from the given literal value and location.
    #[inline(always)]
    pub fn new(value: LitValue, location: Location) -> Self {
        Self {
            value,
            location,
        }
    }
}

impl Located for LocLitValue {
    fn location(&self) -> Location {
        self.location
    }
}

impl Tristate {
    /// Tristate negation: `y` and `n` swap, `m` stays `m`.
    pub fn not(self) -> Self {
        match self {
            Self::False => Self::True,
            Self::Maybe => Self::Maybe,
            Self::True => Self::False,
        }
    }

    /// Tristate AND, the minimum of the two values.
    #[inline(always)]
    pub fn and(self, other: Self) -> Self {
        self.min(other)
    }

    /// Tristate OR, the maximum of the two values.
    #[inline(always)]
    pub fn or(self, other: Self) -> Self {
        self.max(other)
    }

    /// The Kconfig name of this value: `n`, `m`, or `y`.
    pub fn name(self) -> &'static str {
        match self {
            Self::False => "n",
            Self::Maybe => "m",
            Self::True => "y",
        }
    }

    /// Parse a Kconfig tristate name (`n`, `m`, or `y`).
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "n" => Some(Self::False),
            "m" => Some(Self::Maybe),
            "y" => Some(Self::True),
            _ => None,
        }
    }
}

impl Display for Tristate {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}

impl From<bool> for Tristate {
    #[inline(always)]
    fn from(value: bool) -> Self {
        if value {
            Self::True
        } else {
            Self::False
        }
    }
}

impl TryFrom<Tristate> for bool {
    type Error = TristateMaybe;

    #[inline(always)]
    fn try_from(value: Tristate) -> Result<bool, Self::Error> {
        match value {
            Tristate::False => Ok(false),
            Tristate::True => Ok(true),
            Tristate::Maybe => Err(TristateMaybe),
        }
    }
}

/// Error returned when converting a `Tristate` to a `bool` when the `Tristate` is `maybe`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TristateMaybe;

#[cfg(test)]
mod tests {
    use super::Tristate::{self, False, Maybe, True};

    #[test]
    fn tristate_ordering() {
        assert!(False < Maybe);
        assert!(Maybe < True);
    }

    #[test]
    fn tristate_and_is_min() {
        assert_eq!(False.and(False), False);
        assert_eq!(False.and(Maybe), False);
        assert_eq!(False.and(True), False);
        assert_eq!(Maybe.and(Maybe), Maybe);
        assert_eq!(Maybe.and(True), Maybe);
        assert_eq!(True.and(True), True);
        assert_eq!(True.and(Maybe), Maybe);
    }

    #[test]
    fn tristate_or_is_max() {
        assert_eq!(False.or(False), False);
        assert_eq!(False.or(Maybe), Maybe);
        assert_eq!(False.or(True), True);
        assert_eq!(Maybe.or(Maybe), Maybe);
        assert_eq!(Maybe.or(True), True);
        assert_eq!(True.or(True), True);
    }

    #[test]
    fn tristate_not_keeps_maybe() {
        assert_eq!(False.not(), True);
        assert_eq!(Maybe.not(), Maybe);
        assert_eq!(True.not(), False);
    }

    #[test]
    fn tristate_names() {
        for t in [False, Maybe, True] {
            assert_eq!(Tristate::from_name(t.name()), Some(t));
        }
        assert_eq!(Tristate::from_name("x"), None);
    }
}

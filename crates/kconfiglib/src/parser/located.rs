use {
    crate::parser::Location,
    std::fmt::{Display, Formatter, Result as FmtResult},
};

/// A trait for values that carry a source location.
pub trait Located {
    /// Returns the location of the value.
    fn location(&self) -> Location;
}

/// An owned string together with its location.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LocString {
    /// The string value.
    pub value: String,

    /// The location of the string.
    pub location: Location,
}

impl LocString {
    /// Create a new located string.
    pub fn new(value: impl Into<String>, location: Location) -> Self {
        Self {
            value: value.into(),
            location,
        }
    }

    /// The string value.
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl AsRef<str> for LocString {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl Display for LocString {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        self.value.fmt(f)
    }
}

impl Located for LocString {
    fn location(&self) -> Location {
        self.location
    }
}

/// A borrowed string slice together with its location.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LocStr<'a> {
    /// The string value.
    pub value: &'a str,

    /// The location of the string.
    pub location: Location,
}

impl<'a> LocStr<'a> {
    /// Create a new located string slice.
    pub fn new(value: &'a str, location: Location) -> Self {
        Self {
            value,
            location,
        }
    }

    /// Convert this into an owned [`LocString`].
    pub fn to_loc_string(&self) -> LocString {
        LocString::new(self.value, self.location)
    }
}

impl AsRef<str> for LocStr<'_> {
    fn as_ref(&self) -> &str {
        self.value
    }
}

impl Display for LocStr<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        self.value.fmt(f)
    }
}

impl Located for LocStr<'_> {
    fn location(&self) -> Location {
        self.location
    }
}

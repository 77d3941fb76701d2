use std::fmt::{Display, Formatter, Result as FmtResult};

/// Symbol/choice types.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Type {
    #[default]
    Unknown,
    Bool,
    Tristate,
    String,
    Int,
    Hex,
}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Type::Unknown => write!(f, "unknown"),
            Type::Bool => write!(f, "bool"),
            Type::Tristate => write!(f, "tristate"),
            Type::String => write!(f, "string"),
            Type::Int => write!(f, "int"),
            Type::Hex => write!(f, "hex"),
        }
    }
}


//! Expression evaluation against a symbol graph and an assignment of values.
//!
//! The graph is immutable; the [`Assignment`] is owned by the caller and may be revised and
//! re-evaluated without rebuilding the graph. Symbols without an assigned value fall back to
//! their first applicable `default`, and to `n` when no default applies.

use {
    crate::{
        parser::{Expr, KConfigError, LitValue, Tristate, Type},
        Symbol, SymbolGraph, SymbolId,
    },
    std::{
        cmp::Ordering,
        collections::HashMap,
        fmt::{Display, Formatter, Result as FmtResult},
    },
};

/// A concrete configuration value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Value {
    /// A tristate (or bool) value.
    Tristate(Tristate),

    /// A decimal integer value.
    Int(i64),

    /// A hexadecimal integer value.
    Hex(u64),

    /// A string value.
    String(String),
}

impl Value {
    /// Interpret the value as a tristate.
    ///
    /// Strings named `y`, `m`, or `n` map to the corresponding tristate; any other non-tristate
    /// value is `n`.
    pub fn to_tristate(&self) -> Tristate {
        match self {
            Self::Tristate(t) => *t,
            Self::String(s) => Tristate::from_name(s).unwrap_or(Tristate::False),
            Self::Int(_) | Self::Hex(_) => Tristate::False,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Tristate(t) => f.write_str(t.name()),
            Self::Int(i) => write!(f, "{i}"),
            Self::Hex(h) => write!(f, "{h:#x}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<Tristate> for Value {
    fn from(t: Tristate) -> Self {
        Self::Tristate(t)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Tristate(if b {
            Tristate::True
        } else {
            Tristate::False
        })
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

/// A mutable assignment of values to symbol names.
#[derive(Clone, Debug, Default)]
pub struct Assignment {
    values: HashMap<String, Value>,
}

impl Assignment {
    /// Create an empty assignment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value of a symbol.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// Remove the value of a symbol, letting it fall back to its defaults.
    pub fn unset(&mut self, name: &str) {
        self.values.remove(name);
    }

    /// Get the assigned value of a symbol, if any.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Remove all assigned values.
    pub fn clear(&mut self) {
        self.values.clear();
    }
}

/// Evaluates expressions against a [`SymbolGraph`] and an [`Assignment`].
///
/// Evaluation never mutates either; separate evaluators over the same graph and assignment may
/// run concurrently.
pub struct Evaluator<'a> {
    graph: &'a SymbolGraph,
    assignment: &'a Assignment,
}

impl<'a> Evaluator<'a> {
    /// Create an evaluator over the given graph and assignment.
    pub fn new(graph: &'a SymbolGraph, assignment: &'a Assignment) -> Self {
        Self {
            graph,
            assignment,
        }
    }

    /// Evaluate an expression to a value.
    ///
    /// Fails with a type error when operands of a comparison are incompatible and with a
    /// cyclic-dependency error when a symbol's default chain loops back on itself.
    pub fn eval(&self, expr: &Expr) -> Result<Value, KConfigError> {
        self.eval_inner(expr, &mut Vec::new())
    }

    /// Evaluate an expression to a tristate. See [`eval`](Self::eval).
    pub fn tristate(&self, expr: &Expr) -> Result<Tristate, KConfigError> {
        Ok(self.eval(expr)?.to_tristate())
    }

    /// The current value of the named symbol: its assigned value, or its first applicable
    /// default, or `n`.
    pub fn symbol_value(&self, name: &str) -> Result<Value, KConfigError> {
        self.resolve_name(name, &mut Vec::new())
    }

    fn eval_inner(&self, expr: &Expr, stack: &mut Vec<SymbolId>) -> Result<Value, KConfigError> {
        match expr {
            Expr::Symbol(name) => self.resolve_name(name, stack),
            Expr::Literal(lit) => self.literal_value(lit, stack),

            Expr::Not(e) => {
                let t = self.eval_inner(e, stack)?.to_tristate();
                Ok(Value::Tristate(t.not()))
            }

            Expr::And(a, b) => {
                let a = self.eval_inner(a, stack)?.to_tristate();
                let b = self.eval_inner(b, stack)?.to_tristate();
                Ok(Value::Tristate(a.and(b)))
            }

            Expr::Or(a, b) => {
                let a = self.eval_inner(a, stack)?.to_tristate();
                let b = self.eval_inner(b, stack)?.to_tristate();
                Ok(Value::Tristate(a.or(b)))
            }

            Expr::Eq(a, b) => self.compare_eq(a, b, stack, false),
            Expr::Ne(a, b) => self.compare_eq(a, b, stack, true),

            Expr::Lt(a, b) => self.compare_ord(a, b, stack, |o| o == Ordering::Less),
            Expr::Le(a, b) => self.compare_ord(a, b, stack, |o| o != Ordering::Greater),
            Expr::Gt(a, b) => self.compare_ord(a, b, stack, |o| o == Ordering::Greater),
            Expr::Ge(a, b) => self.compare_ord(a, b, stack, |o| o != Ordering::Less),
        }
    }

    fn literal_value(&self, lit: &LitValue, stack: &mut Vec<SymbolId>) -> Result<Value, KConfigError> {
        match lit {
            LitValue::Tristate(t) => Ok(Value::Tristate(*t)),
            LitValue::Int(i) => Ok(Value::Int(*i)),
            LitValue::Hex(h) => Ok(Value::Hex(*h)),
            LitValue::String(s) => Ok(Value::String(s.clone())),
            LitValue::Symbol(name) => self.resolve_name(name, stack),
        }
    }

    /// Resolve a symbol name to its current value.
    fn resolve_name(&self, name: &str, stack: &mut Vec<SymbolId>) -> Result<Value, KConfigError> {
        if let Some(value) = self.assignment.get(name) {
            return Ok(value.clone());
        }

        let Some(id) = self.graph.lookup(name) else {
            return Ok(Value::Tristate(Tristate::False));
        };

        if stack.contains(&id) {
            return Err(KConfigError::cycle(name, None));
        }

        let Some(symbol) = self.graph.symbol(id) else {
            return Ok(Value::Tristate(Tristate::False));
        };

        stack.push(id);
        let result = self.resolve_defaults(symbol, stack);
        stack.pop();
        result
    }

    /// The first default whose condition is not `n`, coerced to the symbol's type, or `n`.
    fn resolve_defaults(&self, symbol: &Symbol, stack: &mut Vec<SymbolId>) -> Result<Value, KConfigError> {
        for default in &symbol.defaults {
            let applies = match &default.condition {
                Some(cond) => self.eval_inner(cond, stack)?.to_tristate() != Tristate::False,
                None => true,
            };

            if applies {
                let value = self.eval_inner(&default.value, stack)?;
                return Ok(coerce_to_type(value, symbol.r#type));
            }
        }

        Ok(Value::Tristate(Tristate::False))
    }

    fn compare_eq(
        &self,
        a: &Expr,
        b: &Expr,
        stack: &mut Vec<SymbolId>,
        negate: bool,
    ) -> Result<Value, KConfigError> {
        let a = self.eval_inner(a, stack)?;
        let b = self.eval_inner(b, stack)?;
        let equal = values_equal(&a, &b)?;
        Ok(Value::Tristate(truth(equal != negate)))
    }

    fn compare_ord(
        &self,
        a: &Expr,
        b: &Expr,
        stack: &mut Vec<SymbolId>,
        accept: impl Fn(Ordering) -> bool,
    ) -> Result<Value, KConfigError> {
        let a = self.eval_inner(a, stack)?;
        let b = self.eval_inner(b, stack)?;
        let ordering = values_cmp(&a, &b)?;
        Ok(Value::Tristate(truth(accept(ordering))))
    }
}

fn truth(value: bool) -> Tristate {
    if value {
        Tristate::True
    } else {
        Tristate::False
    }
}

/// Coerce a resolved default value to the symbol's declared type.
///
/// The interesting case is hex: a bare decimal literal on a hex symbol is read base-16, so
/// `default 37` on a hex symbol yields `0x37`.
fn coerce_to_type(value: Value, r#type: Type) -> Value {
    match (r#type, value) {
        (Type::Hex, Value::Int(i)) => match u64::from_str_radix(&i.to_string(), 16) {
            Ok(h) => Value::Hex(h),
            Err(_) => Value::Int(i),
        },

        (Type::Hex, Value::String(s)) => match parse_hex_str(&s) {
            Some(h) => Value::Hex(h),
            None => Value::String(s),
        },

        (Type::Int, Value::String(s)) => match s.parse::<i64>() {
            Ok(i) => Value::Int(i),
            Err(_) => Value::String(s),
        },

        (Type::Bool | Type::Tristate, Value::String(s)) => match Tristate::from_name(&s) {
            Some(t) => Value::Tristate(t),
            None => Value::String(s),
        },

        (_, value) => value,
    }
}

fn parse_hex_str(s: &str) -> Option<u64> {
    let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    u64::from_str_radix(digits, 16).ok()
}

/// The numeric interpretation of a value, if it has one.
fn numeric(value: &Value) -> Option<i128> {
    match value {
        Value::Int(i) => Some(i128::from(*i)),
        Value::Hex(h) => Some(i128::from(*h)),
        Value::String(s) => {
            if let Some(digits) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                u64::from_str_radix(digits, 16).ok().map(i128::from)
            } else {
                s.parse::<i64>().ok().map(i128::from)
            }
        }
        Value::Tristate(_) => None,
    }
}

fn values_equal(a: &Value, b: &Value) -> Result<bool, KConfigError> {
    match (a, b) {
        (Value::Tristate(x), Value::Tristate(y)) => Ok(x == y),

        (Value::Tristate(x), Value::String(s)) | (Value::String(s), Value::Tristate(x)) => {
            match Tristate::from_name(s) {
                Some(y) => Ok(*x == y),
                None => Err(KConfigError::type_error(format!("cannot compare tristate {x} and string \"{s}\""))),
            }
        }

        (Value::Tristate(x), Value::Int(_) | Value::Hex(_)) | (Value::Int(_) | Value::Hex(_), Value::Tristate(x)) => {
            Err(KConfigError::type_error(format!("cannot compare tristate {x} and a number")))
        }

        (Value::String(x), Value::String(y)) => Ok(x == y),

        _ => match (numeric(a), numeric(b)) {
            (Some(x), Some(y)) => Ok(x == y),
            _ => Err(KConfigError::type_error(format!("cannot compare {a} and {b}"))),
        },
    }
}

fn values_cmp(a: &Value, b: &Value) -> Result<Ordering, KConfigError> {
    if let (Value::String(x), Value::String(y)) = (a, b) {
        return Ok(x.cmp(y));
    }

    match (numeric(a), numeric(b)) {
        (Some(x), Some(y)) => Ok(x.cmp(&y)),
        _ => Err(KConfigError::type_error(format!("cannot order {a} and {b}"))),
    }
}

#[cfg(test)]
mod tests {
    use {
        super::{Assignment, Evaluator, Value},
        crate::{
            parser::{parse_stream, KConfig, KConfigErrorKind, LocExpr, Location, PeekableChars, PeekableTokenLinesExt,
                Tristate::{False, Maybe, True}},
            SymbolGraph,
        },
        std::path::Path,
    };

    fn graph(input: &str) -> SymbolGraph {
        let kconfig =
            KConfig::parse_str(PeekableChars::new(input, Path::new("eval-test")), Path::new("/tmp"), &()).unwrap();
        SymbolGraph::build(&kconfig).unwrap()
    }

    fn empty_graph() -> SymbolGraph {
        SymbolGraph::build(&KConfig::default()).unwrap()
    }

    fn expr(input: &str) -> crate::parser::Expr {
        let filename = Path::new("expr");
        let tokens = parse_stream(PeekableChars::new(input, filename)).unwrap();
        let mut lines = tokens.peek_lines();
        let mut line = lines.next().unwrap();
        LocExpr::parse(Location::start_of(filename), &mut line).unwrap().expr
    }

    #[test]
    fn tristate_algebra() {
        let graph = empty_graph();
        let mut assignment = Assignment::new();
        assignment.set("D", Maybe);
        let eval = Evaluator::new(&graph, &assignment);

        assert_eq!(eval.tristate(&expr("D && y")).unwrap(), Maybe);
        assert_eq!(eval.tristate(&expr("D || n")).unwrap(), Maybe);
        assert_eq!(eval.tristate(&expr("!D")).unwrap(), Maybe);

        assignment.set("D", True);
        let eval = Evaluator::new(&graph, &assignment);
        assert_eq!(eval.tristate(&expr("!D")).unwrap(), False);

        assignment.set("D", False);
        let eval = Evaluator::new(&graph, &assignment);
        assert_eq!(eval.tristate(&expr("n || (y && n || (m || D))")).unwrap(), Maybe);
    }

    #[test]
    fn unset_symbols_are_n() {
        let graph = empty_graph();
        let assignment = Assignment::new();
        let eval = Evaluator::new(&graph, &assignment);

        assert_eq!(eval.tristate(&expr("MISSING")).unwrap(), False);
        assert_eq!(eval.tristate(&expr("!MISSING")).unwrap(), True);
        assert_eq!(eval.tristate(&expr("MISSING = n")).unwrap(), True);
    }

    #[test]
    fn equality_comparisons() {
        let graph = empty_graph();
        let mut assignment = Assignment::new();
        assignment.set("T", Maybe);
        assignment.set("I", 55);
        assignment.set("S", "hello");
        let eval = Evaluator::new(&graph, &assignment);

        assert_eq!(eval.tristate(&expr("T = m")).unwrap(), True);
        assert_eq!(eval.tristate(&expr("T != y")).unwrap(), True);
        assert_eq!(eval.tristate(&expr("T = \"m\"")).unwrap(), True);
        assert_eq!(eval.tristate(&expr("I = 55")).unwrap(), True);
        assert_eq!(eval.tristate(&expr("I = 0x37")).unwrap(), True);
        assert_eq!(eval.tristate(&expr("I != 54")).unwrap(), True);
        assert_eq!(eval.tristate(&expr("S = \"hello\"")).unwrap(), True);
        assert_eq!(eval.tristate(&expr("S != \"world\"")).unwrap(), True);
    }

    #[test]
    fn ordering_comparisons() {
        let graph = empty_graph();
        let mut assignment = Assignment::new();
        assignment.set("I", 55);
        assignment.set("A", "abc");
        assignment.set("B", "abd");
        let eval = Evaluator::new(&graph, &assignment);

        assert_eq!(eval.tristate(&expr("I < 56")).unwrap(), True);
        assert_eq!(eval.tristate(&expr("I <= 55")).unwrap(), True);
        assert_eq!(eval.tristate(&expr("I > 0x36")).unwrap(), True);
        assert_eq!(eval.tristate(&expr("I >= 56")).unwrap(), False);
        assert_eq!(eval.tristate(&expr("A < B")).unwrap(), True);
    }

    #[test]
    fn type_errors() {
        let graph = empty_graph();
        let mut assignment = Assignment::new();
        assignment.set("T", True);
        assignment.set("S", "abc");
        let eval = Evaluator::new(&graph, &assignment);

        for input in ["T = 5", "T < 5", "S = 5", "S < 5"] {
            let e = eval.tristate(&expr(input)).unwrap_err();
            assert!(matches!(e.kind, KConfigErrorKind::Type(_)), "{input}: {e}");
        }
    }

    #[test]
    fn defaults_resolve_through_chains() {
        let graph = graph(
            r##"config A
    tristate "a"
    default B

config B
    tristate "b"
    default m

config H
    hex "h"
    default 37

config COND
    bool "cond"
    default y if MISSING
    default n
"##,
        );

        let assignment = Assignment::new();
        let eval = Evaluator::new(&graph, &assignment);

        assert_eq!(eval.symbol_value("A").unwrap(), Value::Tristate(Maybe));
        assert_eq!(eval.symbol_value("B").unwrap(), Value::Tristate(Maybe));
        assert_eq!(eval.symbol_value("H").unwrap(), Value::Hex(0x37));
        assert_eq!(eval.symbol_value("COND").unwrap(), Value::Tristate(False));

        // Assignments take precedence over defaults.
        let mut assignment = Assignment::new();
        assignment.set("B", False);
        let eval = Evaluator::new(&graph, &assignment);
        assert_eq!(eval.symbol_value("A").unwrap(), Value::Tristate(False));
    }

    #[test]
    fn default_cycles_are_detected() {
        let graph = graph(
            r##"config A
    tristate "a"
    default B

config B
    tristate "b"
    default A
"##,
        );

        let assignment = Assignment::new();
        let eval = Evaluator::new(&graph, &assignment);

        let e = eval.symbol_value("A").unwrap_err();
        assert!(matches!(e.kind, KConfigErrorKind::CyclicDependency(_)), "{e}");

        // Breaking the cycle with an assignment resolves both symbols.
        let mut assignment = Assignment::new();
        assignment.set("B", Maybe);
        let eval = Evaluator::new(&graph, &assignment);
        assert_eq!(eval.symbol_value("A").unwrap(), Value::Tristate(Maybe));
    }

    #[test]
    fn evaluation_is_idempotent() {
        let graph = empty_graph();
        let mut assignment = Assignment::new();
        assignment.set("D", Maybe);
        let eval = Evaluator::new(&graph, &assignment);

        let e = expr("!(D && y) || D = m");
        let first = eval.eval(&e).unwrap();
        let second = eval.eval(&e).unwrap();
        assert_eq!(first, second);
    }
}

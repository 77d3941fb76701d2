use std::{
    collections::{BTreeMap, HashMap},
    env::VarError,
};

/// A trait for performing variable lookups while evaluating `source` filenames.
pub trait Context {
    /// Returns the value of the given variable, or an error if the variable could not be found.
    fn var(&self, name: &str) -> Result<String, VarError>;
}

/// A [context][Context] that uses the process environment for variable lookups.
pub struct SystemContext;

impl Context for SystemContext {
    fn var(&self, name: &str) -> Result<String, VarError> {
        std::env::var(name)
    }
}

impl Context for BTreeMap<String, String> {
    fn var(&self, name: &str) -> Result<String, VarError> {
        self.get(name).cloned().ok_or(VarError::NotPresent)
    }
}

impl Context for HashMap<String, String> {
    fn var(&self, name: &str) -> Result<String, VarError> {
        self.get(name).cloned().ok_or(VarError::NotPresent)
    }
}

/// A context with no variables. Useful when the input is known not to contain `source`
/// directives with variable references.
impl Context for () {
    fn var(&self, _name: &str) -> Result<String, VarError> {
        Err(VarError::NotPresent)
    }
}

/// Create a closure around a context for [`env_with_context`][shellexpand::env_with_context].
pub(crate) fn context_closure<C>(context: &C) -> impl Fn(&str) -> Result<Option<String>, VarError> + '_
where
    C: Context,
{
    move |var| context.var(var).map(Some)
}

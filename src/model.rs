use crate::form::FormOptions;

/// A model to be documented: a form type name plus construction options.
///
/// Two models are equivalent when both the type name and the options are
/// equal; that identity drives deduplication in the model registry.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    type_name: String,
    options: FormOptions,
}

impl Model {
    pub fn new(type_name: impl Into<String>, options: FormOptions) -> Self {
        Self {
            type_name: type_name.into(),
            options,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn options(&self) -> &FormOptions {
        &self.options
    }

    /// Canonical identity key: type name plus canonically ordered options
    pub fn identity_key(&self) -> String {
        format!("{}|{}", self.type_name, self.options.canonical_key())
    }

    /// Short name used as the base for the definition name: the final
    /// segment of a `::`, `\` or `.` separated type path.
    pub fn short_name(&self) -> &str {
        self.type_name
            .rsplit(|c| c == ':' || c == '\\' || c == '.')
            .next()
            .unwrap_or(&self.type_name)
    }
}

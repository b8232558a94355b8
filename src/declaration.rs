use crate::ctype::CType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Function,
    Method,
    Constructor,
    Destructor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredParameter {
    pub name: Option<String>,
    pub ty: CType,
}

/// A candidate for mocking as found in the input, independent of the parser which produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub kind: DeclarationKind,
    pub name: String,
    /// Enclosing namespaces and classes, outermost first.
    pub scopes: Vec<String>,
    pub return_type: CType,
    pub parameters: Vec<DeclaredParameter>,
    pub is_variadic: bool,
    /// A definition exists somewhere in the translation unit.
    pub has_body: bool,
    pub is_deleted: bool,
    pub is_defaulted: bool,
    pub is_template: bool,
    pub is_const: bool,
    pub is_static: bool,
    pub is_noexcept: bool,
}

impl Declaration {
    pub fn qualified_name(&self) -> String {
        self.scopes
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.name.as_str()))
            .collect::<Vec<_>>()
            .join("::")
    }
}

/// Builders for declarations in tests.
#[cfg(test)]
impl Declaration {
    pub fn new<S: Into<String>>(kind: DeclarationKind, name: S, return_type: CType) -> Self {
        Declaration {
            kind,
            name: name.into(),
            scopes: Vec::new(),
            return_type,
            parameters: Vec::new(),
            is_variadic: false,
            has_body: false,
            is_deleted: false,
            is_defaulted: false,
            is_template: false,
            is_const: false,
            is_static: false,
            is_noexcept: false,
        }
    }

    pub fn in_scopes<S: Into<String>>(mut self, scopes: impl IntoIterator<Item = S>) -> Self {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_parameter(mut self, name: Option<&str>, ty: CType) -> Self {
        self.parameters.push(DeclaredParameter {
            name: name.map(str::to_string),
            ty,
        });
        self
    }
}

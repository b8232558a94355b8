use crate::classifier::{classify_parameter, classify_return, MockedType};
use crate::config::{Config, ExprMod, OverrideSpec};
use crate::ctype::CType;
use crate::declaration::{Declaration, DeclarationKind};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionKind {
    Function,
    Method { is_const: bool, is_static: bool },
    Constructor,
    Destructor,
}

/// A type which can neither be classified nor has an override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedType {
    pub type_spelling: String,
    pub function_name: String,
    /// `None` for the return value.
    pub parameter_name: Option<String>,
}

impl Display for UnsupportedType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.parameter_name {
            Some(parameter) => write!(
                f,
                "Unsupported type '{}' for parameter '{}' of function '{}'",
                self.type_spelling, parameter, self.function_name
            ),
            None => write!(
                f,
                "Unsupported type '{}' for return value of function '{}'",
                self.type_spelling, self.function_name
            ),
        }
    }
}

impl std::error::Error for UnsupportedType {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    name: String,
    ty: CType,
    mocked_type: MockedType,
    override_spec: Option<OverrideSpec>,
}

impl Parameter {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &CType {
        &self.ty
    }

    pub fn mocked_type(&self) -> MockedType {
        self.mocked_type
    }

    pub fn override_spec(&self) -> Option<&OverrideSpec> {
        self.override_spec.as_ref()
    }

    pub fn expr_mod(&self) -> Option<&ExprMod> {
        self.override_spec.as_ref().and_then(OverrideSpec::expr_mod)
    }

    /// Type of the argument as handed to the mock runtime.
    pub fn passed_type(&self) -> &CType {
        self.ty.passed()
    }

    pub fn is_pointer_like(&self) -> bool {
        self.passed_type().canonical().is_pointer_like()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnValue {
    ty: CType,
    /// `None` for `void`.
    mocked_type: Option<MockedType>,
    override_spec: Option<OverrideSpec>,
}

impl ReturnValue {
    fn void() -> Self {
        ReturnValue {
            ty: CType::new("void", crate::ctype::TypeKind::Void),
            mocked_type: None,
            override_spec: None,
        }
    }

    pub fn ty(&self) -> &CType {
        &self.ty
    }

    pub fn mocked_type(&self) -> Option<MockedType> {
        self.mocked_type
    }

    pub fn expr_mod(&self) -> Option<&ExprMod> {
        self.override_spec.as_ref().and_then(OverrideSpec::expr_mod)
    }

    pub fn is_void(&self) -> bool {
        self.mocked_type.is_none()
    }
}

/// A mockable free function, method, constructor or destructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    kind: FunctionKind,
    name: String,
    scopes: Vec<String>,
    is_noexcept: bool,
    return_value: ReturnValue,
    parameters: Vec<Parameter>,
}

fn is_operator(name: &str) -> bool {
    name.strip_prefix("operator").map_or(false, |rest| {
        !rest.starts_with(|c: char| c.is_alphanumeric() || c == '_')
    })
}

impl Function {
    /// Builds the record for a declaration. Returns `Ok(None)` if the declaration cannot be
    /// replaced by a mock at all, and an error if a type involved needs an override which is
    /// missing.
    pub fn parse(decl: &Declaration, config: &Config) -> Result<Option<Self>, UnsupportedType> {
        if decl.has_body
            || decl.is_deleted
            || decl.is_defaulted
            || decl.is_template
            || decl.is_variadic
            || is_operator(&decl.name)
        {
            return Ok(None);
        }

        let kind = match decl.kind {
            DeclarationKind::Function => FunctionKind::Function,
            DeclarationKind::Method => FunctionKind::Method {
                is_const: decl.is_const,
                is_static: decl.is_static,
            },
            DeclarationKind::Constructor => FunctionKind::Constructor,
            DeclarationKind::Destructor => FunctionKind::Destructor,
        };

        let qualified_name = decl.qualified_name();
        let use_underlying = config.use_underlying_typedef_type();

        let return_value = match kind {
            FunctionKind::Constructor | FunctionKind::Destructor => ReturnValue::void(),
            _ if decl.return_type.canonical().is_void() => ReturnValue {
                ty: decl.return_type.clone(),
                mocked_type: None,
                override_spec: None,
            },
            _ => {
                let override_spec = config
                    .return_override(&qualified_name, &decl.return_type.spelling)
                    .cloned();
                let mocked_type = match &override_spec {
                    Some(spec) => spec.mocked_type(),
                    None => classify_return(&decl.return_type, use_underlying).ok_or_else(|| {
                        UnsupportedType {
                            type_spelling: decl.return_type.spelling.clone(),
                            function_name: qualified_name.clone(),
                            parameter_name: None,
                        }
                    })?,
                };
                ReturnValue {
                    ty: decl.return_type.clone(),
                    mocked_type: Some(mocked_type),
                    override_spec,
                }
            }
        };

        let parameters = decl
            .parameters
            .iter()
            .enumerate()
            .map(|(index, p)| -> Result<Parameter, UnsupportedType> {
                let name = match &p.name {
                    Some(name) if !name.is_empty() => name.clone(),
                    _ => format!("_unnamedArg{}", index),
                };
                let override_spec = config
                    .parameter_override(&qualified_name, &name, &p.ty.spelling)
                    .cloned();
                let mocked_type = match &override_spec {
                    Some(spec) => spec.mocked_type(),
                    None => classify_parameter(&p.ty, use_underlying).ok_or_else(|| {
                        UnsupportedType {
                            type_spelling: p.ty.spelling.clone(),
                            function_name: qualified_name.clone(),
                            parameter_name: Some(name.clone()),
                        }
                    })?,
                };
                Ok(Parameter {
                    name,
                    ty: p.ty.clone(),
                    mocked_type,
                    override_spec,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(Function {
            kind,
            name: decl.name.clone(),
            scopes: decl.scopes.clone(),
            is_noexcept: decl.is_noexcept,
            return_value,
            parameters,
        }))
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    pub fn qualified_name(&self) -> String {
        self.scopes
            .iter()
            .chain(std::iter::once(&self.name))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("::")
    }

    /// Qualified name of the owning class, for methods, constructors and destructors.
    pub fn class_name(&self) -> Option<String> {
        match self.kind {
            FunctionKind::Function => None,
            _ => Some(self.scopes.join("::")),
        }
    }

    /// Name of the generated expectation helper, which lives in the scope namespaces.
    pub fn expectation_name(&self) -> String {
        let class = self.scopes.last().map(String::as_str).unwrap_or_default();
        match self.kind {
            FunctionKind::Constructor => format!("{}$ctor", class),
            FunctionKind::Destructor => format!("{}$dtor", class),
            _ => self.name.clone(),
        }
    }

    /// Whether calls are bound to the object they are invoked on.
    pub fn binds_object(&self) -> bool {
        match self.kind {
            FunctionKind::Function => false,
            FunctionKind::Method { is_static, .. } => !is_static,
            FunctionKind::Constructor | FunctionKind::Destructor => true,
        }
    }

    pub fn is_const(&self) -> bool {
        matches!(self.kind, FunctionKind::Method { is_const: true, .. })
    }

    pub fn is_noexcept(&self) -> bool {
        self.is_noexcept
    }

    pub fn has_return_type(&self) -> bool {
        matches!(self.kind, FunctionKind::Function | FunctionKind::Method { .. })
    }

    pub fn return_value(&self) -> &ReturnValue {
        &self.return_value
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }
}

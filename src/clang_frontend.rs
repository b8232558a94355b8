use crate::ast_iterators::{function_declarations, IterableEntity};
use crate::ctype::{CType, IntRank, TypeKind};
use crate::declaration::{Declaration, DeclarationKind, DeclaredParameter};
use clang::diagnostic::Severity;
use clang::*;
use std::fmt::{Display, Formatter};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDiagnostic {
    pub level: DiagnosticLevel,
    pub text: String,
}

/// Everything the generator needs from a translation unit, detached from libclang.
#[derive(Debug, Clone, Default)]
pub struct ParsedUnit {
    pub diagnostics: Vec<ParseDiagnostic>,
    pub declarations: Vec<Declaration>,
}

impl ParsedUnit {
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.level == DiagnosticLevel::Error)
    }
}

#[derive(Debug)]
pub enum FrontendError {
    LibclangUnavailable(String),
    SourceError(SourceError),
}

impl Display for FrontendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FrontendError::LibclangUnavailable(reason) => {
                write!(f, "libclang could not be loaded: {}", reason)
            }
            FrontendError::SourceError(err) => {
                write!(f, "The input file could not be parsed: {}", err)
            }
        }
    }
}

pub fn clang_arguments(
    is_cpp: bool,
    language_standard: Option<&str>,
    include_paths: &[String],
) -> Vec<String> {
    let mut arguments = vec![
        "-x".to_string(),
        if is_cpp { "c++" } else { "c" }.to_string(),
    ];
    if let Some(standard) = language_standard {
        arguments.push(format!("-std={}", standard));
    }
    arguments.extend(include_paths.iter().map(|path| format!("-I{}", path)));
    arguments
}

/// Parses `path`, or `contents` under that name when given, and detaches the result from libclang.
/// The clang instance lives only for the duration of this call.
pub fn parse_header(
    path: &Path,
    arguments: &[String],
    contents: Option<&str>,
) -> Result<ParsedUnit, FrontendError> {
    let clang = Clang::new().map_err(FrontendError::LibclangUnavailable)?;
    let index = Index::new(&clang, false, false);

    let unsaved: Vec<_> = contents
        .map(|code| Unsaved::new(path, code))
        .into_iter()
        .collect();
    let tu = index
        .parser(path)
        .arguments(arguments)
        .unsaved(&unsaved)
        .parse()
        .map_err(FrontendError::SourceError)?;

    Ok(detach(&tu))
}

pub fn detach(tu: &TranslationUnit) -> ParsedUnit {
    let diagnostics: Vec<_> = tu
        .get_diagnostics()
        .iter()
        .filter_map(|d| {
            let level = match d.get_severity() {
                Severity::Error | Severity::Fatal => DiagnosticLevel::Error,
                Severity::Warning => DiagnosticLevel::Warning,
                Severity::Ignored | Severity::Note => return None,
            };
            Some(ParseDiagnostic {
                level,
                text: d.formatter().format(),
            })
        })
        .collect();

    let declarations = if diagnostics.iter().any(|d| d.level == DiagnosticLevel::Error) {
        Vec::new()
    } else {
        function_declarations(&tu.get_entity())
            .into_iter()
            .filter_map(|e| convert_declaration(&e))
            .collect()
    };

    ParsedUnit {
        diagnostics,
        declarations,
    }
}

fn has_token_pair(entity: &Entity, first: &str, second: &str) -> bool {
    entity.get_range().map_or(false, |range| {
        let spellings: Vec<_> = range
            .tokenize()
            .iter()
            .map(|t| t.get_spelling())
            .collect();
        spellings.windows(2).any(|w| w[0] == first && w[1] == second)
    })
}

pub fn convert_declaration(entity: &Entity) -> Option<Declaration> {
    let kind = match entity.get_kind() {
        EntityKind::FunctionDecl => DeclarationKind::Function,
        EntityKind::Method => DeclarationKind::Method,
        EntityKind::Constructor => DeclarationKind::Constructor,
        EntityKind::Destructor => DeclarationKind::Destructor,
        _ => return None,
    };
    let name = entity.get_name()?;

    let return_type = entity
        .get_result_type()
        .map(|t| convert_type(&t))
        .unwrap_or_else(|| CType::new("void", TypeKind::Void));

    let parameters = entity
        .get_arguments()
        .unwrap_or_default()
        .into_iter()
        .map(|arg| DeclaredParameter {
            name: arg.get_name().filter(|n| !n.is_empty()),
            ty: arg
                .get_type()
                .map(|t| convert_type(&t))
                .unwrap_or_else(|| CType::new("", TypeKind::Other)),
        })
        .collect();

    Some(Declaration {
        kind,
        name,
        scopes: entity.enclosing_scopes(),
        return_type,
        parameters,
        is_variadic: entity.is_variadic(),
        has_body: entity.is_definition() || entity.get_definition().is_some(),
        is_deleted: has_token_pair(entity, "=", "delete"),
        is_defaulted: has_token_pair(entity, "=", "default"),
        is_template: entity.get_template().is_some(),
        is_const: entity.is_const_method(),
        is_static: entity.is_static_method(),
        is_noexcept: matches!(
            entity.get_exception_specification(),
            Some(ExceptionSpecification::BasicNoexcept)
        ),
    })
}

fn integer(signed: bool, rank: IntRank) -> TypeKind {
    TypeKind::Integer { signed, rank }
}

fn convert_kind(ty: &Type) -> TypeKind {
    use clang::TypeKind as K;

    let boxed = |t: Option<Type>| {
        Box::new(
            t.map(|t| convert_type(&t))
                .unwrap_or_else(|| CType::new("", TypeKind::Other)),
        )
    };

    match ty.get_kind() {
        K::Void => TypeKind::Void,
        K::Bool => TypeKind::Bool,
        K::CharS => TypeKind::Char { signed: true },
        K::CharU => TypeKind::Char { signed: false },
        K::SChar => integer(true, IntRank::Char),
        K::UChar => integer(false, IntRank::Char),
        K::WChar => integer(true, IntRank::Int),
        K::Char16 => integer(false, IntRank::Short),
        K::Char32 => integer(false, IntRank::Int),
        K::Short => integer(true, IntRank::Short),
        K::UShort => integer(false, IntRank::Short),
        K::Int => integer(true, IntRank::Int),
        K::UInt => integer(false, IntRank::Int),
        K::Long => integer(true, IntRank::Long),
        K::ULong => integer(false, IntRank::Long),
        K::LongLong | K::Int128 => integer(true, IntRank::LongLong),
        K::ULongLong | K::UInt128 => integer(false, IntRank::LongLong),
        K::Float | K::Double | K::LongDouble => TypeKind::Floating,
        K::Pointer => TypeKind::Pointer {
            pointee: boxed(ty.get_pointee_type()),
        },
        K::LValueReference => TypeKind::Reference {
            referent: boxed(ty.get_pointee_type()),
            rvalue: false,
        },
        K::RValueReference => TypeKind::Reference {
            referent: boxed(ty.get_pointee_type()),
            rvalue: true,
        },
        K::ConstantArray => TypeKind::Array {
            element: boxed(ty.get_element_type()),
            size: ty.get_size(),
        },
        K::IncompleteArray | K::VariableArray | K::DependentSizedArray => TypeKind::Array {
            element: boxed(ty.get_element_type()),
            size: None,
        },
        K::Record => TypeKind::Record,
        K::Enum => TypeKind::Enum {
            underlying: boxed(
                ty.get_declaration()
                    .and_then(|d| d.get_enum_underlying_type()),
            ),
        },
        K::Typedef => TypeKind::Typedef {
            underlying: boxed(Some(ty.get_canonical_type())),
        },
        K::FunctionPrototype | K::FunctionNoPrototype => TypeKind::Function,
        _ => TypeKind::Other,
    }
}

pub fn convert_type(ty: &Type) -> CType {
    // `struct Foo`, `ns::Foo` and friends are sugar over the named type.
    if ty.get_kind() == clang::TypeKind::Elaborated {
        if let Some(named) = ty.get_elaborated_type() {
            let mut converted = convert_type(&named);
            converted.spelling = ty.get_display_name();
            converted.is_const = ty.is_const_qualified();
            return converted;
        }
    }

    CType {
        spelling: ty.get_display_name(),
        kind: convert_kind(ty),
        is_const: ty.is_const_qualified(),
        is_pod: ty.is_pod(),
    }
}

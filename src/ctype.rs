//! A parser-independent model of C/C++ types, capturing just what is needed to decide how a
//! value crosses the mock boundary and how it is spelled in generated code.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IntRank {
    Char,
    Short,
    Int,
    Long,
    LongLong,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Void,
    Bool,
    /// Plain `char`, as opposed to `signed char` and `unsigned char`.
    Char { signed: bool },
    Integer { signed: bool, rank: IntRank },
    Floating,
    Enum { underlying: Box<CType> },
    Pointer { pointee: Box<CType> },
    Reference { referent: Box<CType>, rvalue: bool },
    Array { element: Box<CType>, size: Option<usize> },
    Record,
    /// An alias; `underlying` is the canonical (fully desugared) type.
    Typedef { underlying: Box<CType> },
    Function,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CType {
    pub spelling: String,
    pub kind: TypeKind,
    pub is_const: bool,
    pub is_pod: bool,
}

impl CType {
    pub fn new<S: Into<String>>(spelling: S, kind: TypeKind) -> Self {
        let is_pod = match &kind {
            TypeKind::Void | TypeKind::Function | TypeKind::Other | TypeKind::Record => false,
            TypeKind::Reference { .. } => false,
            TypeKind::Typedef { underlying } => underlying.is_pod,
            TypeKind::Array { element, .. } => element.is_pod,
            _ => true,
        };
        CType {
            spelling: spelling.into(),
            kind,
            is_const: false,
            is_pod,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self.kind, TypeKind::Void)
    }

    pub fn is_reference(&self) -> bool {
        matches!(self.kind, TypeKind::Reference { .. })
    }

    /// Whether values of this type are handled through their address: pointers and arrays.
    pub fn is_pointer_like(&self) -> bool {
        matches!(self.kind, TypeKind::Pointer { .. } | TypeKind::Array { .. })
    }

    /// The type after looking through aliases.
    pub fn canonical(&self) -> &CType {
        match &self.kind {
            TypeKind::Typedef { underlying } => underlying.canonical(),
            _ => self,
        }
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.canonical().kind, TypeKind::Enum { .. })
    }

    pub fn is_function_pointer(&self) -> bool {
        match &self.canonical().kind {
            TypeKind::Pointer { pointee } => {
                matches!(pointee.canonical().kind, TypeKind::Function)
            }
            _ => false,
        }
    }

    /// The type a pointer, array or reference designates; the type itself otherwise.
    pub fn target(&self) -> &CType {
        match &self.kind {
            TypeKind::Pointer { pointee } => pointee,
            TypeKind::Array { element, .. } => element,
            TypeKind::Reference { referent, .. } => referent,
            TypeKind::Typedef { underlying } if self.is_pointer_like_alias() => {
                underlying.target()
            }
            _ => self,
        }
    }

    /// The type as it crosses the mock boundary. A reference to a const pointer is passed as the
    /// pointer itself.
    pub fn passed(&self) -> &CType {
        match &self.kind {
            TypeKind::Reference {
                referent,
                rvalue: false,
            } if referent.is_const && referent.canonical().is_pointer_like() => referent,
            _ => self,
        }
    }

    fn is_pointer_like_alias(&self) -> bool {
        self.canonical().is_pointer_like()
    }

    /// Spelling without top-level `const`, as needed for `sizeof` and casts.
    pub fn unqualified_spelling(&self) -> String {
        strip_const(&self.spelling)
    }
}

fn strip_const(spelling: &str) -> String {
    let spelling = spelling.trim();
    if let Some(rest) = spelling.strip_prefix("const ") {
        rest.trim().to_string()
    } else if let Some(rest) = spelling.strip_suffix(" const") {
        rest.trim().to_string()
    } else {
        spelling.to_string()
    }
}

/// Combines a type spelling and an identifier into a declaration, placing the identifier inside
/// declarator parentheses or before array brackets where needed.
pub fn declare(spelling: &str, name: &str) -> String {
    if let Some(pos) = spelling.find("(*)") {
        return format!("{}(*{}){}", &spelling[..pos], name, &spelling[pos + 3..]);
    }
    if let Some(pos) = spelling.find('[') {
        return format!("{} {}{}", spelling[..pos].trim_end(), name, &spelling[pos..]);
    }
    if spelling.ends_with('*') || spelling.ends_with('&') {
        format!("{}{}", spelling, name)
    } else {
        format!("{} {}", spelling, name)
    }
}

use crate::ctype::{CType, IntRank, TypeKind};

/// How a value crosses the mock boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockedType {
    Bool,
    Int,
    UnsignedInt,
    Long,
    UnsignedLong,
    Double,
    String,
    Pointer,
    ConstPointer,
    Output,
    InputPOD,
    OutputPOD,
    InputOfType,
    OutputOfType,
    MemoryBuffer,
    Skip,
}

impl MockedType {
    /// Whether the value itself (rather than its address) is handed to the mock runtime.
    pub fn is_value(self) -> bool {
        matches!(
            self,
            MockedType::Bool
                | MockedType::Int
                | MockedType::UnsignedInt
                | MockedType::Long
                | MockedType::UnsignedLong
                | MockedType::Double
        )
    }
}

pub fn classify_parameter(ty: &CType, use_underlying_typedef_type: bool) -> Option<MockedType> {
    Classifier {
        use_underlying_typedef_type,
        is_return: false,
    }
    .classify(ty)
}

pub fn classify_return(ty: &CType, use_underlying_typedef_type: bool) -> Option<MockedType> {
    Classifier {
        use_underlying_typedef_type,
        is_return: true,
    }
    .classify(ty)
}

struct Classifier {
    use_underlying_typedef_type: bool,
    is_return: bool,
}

impl Classifier {
    fn classify(&self, ty: &CType) -> Option<MockedType> {
        match &ty.kind {
            TypeKind::Bool => Some(MockedType::Bool),
            TypeKind::Char { signed } => Some(signed_or_unsigned(*signed, IntRank::Char)),
            TypeKind::Integer { signed, rank } => Some(signed_or_unsigned(*signed, *rank)),
            TypeKind::Floating => Some(MockedType::Double),
            TypeKind::Enum { underlying } => self.classify(underlying),
            TypeKind::Pointer { pointee } => Some(self.classify_pointer(pointee)),
            TypeKind::Array { element, .. } => Some(self.classify_pointer(element)),
            TypeKind::Reference { referent, rvalue } => {
                if *rvalue {
                    None
                } else if self.is_return {
                    Some(if referent.is_const {
                        MockedType::ConstPointer
                    } else {
                        MockedType::Pointer
                    })
                } else {
                    self.classify_reference(referent)
                }
            }
            TypeKind::Typedef { underlying } => {
                if self.use_underlying_typedef_type || underlying.is_pointer_like() {
                    self.classify(underlying)
                } else {
                    None
                }
            }
            TypeKind::Void | TypeKind::Record | TypeKind::Function | TypeKind::Other => None,
        }
    }

    fn classify_pointer(&self, pointee: &CType) -> MockedType {
        let pointee_base = if self.use_underlying_typedef_type {
            pointee.canonical()
        } else {
            pointee
        };

        if pointee.is_const {
            if matches!(pointee_base.kind, TypeKind::Char { .. }) {
                MockedType::String
            } else {
                MockedType::ConstPointer
            }
        } else if pointee.is_pod {
            MockedType::Output
        } else {
            MockedType::Pointer
        }
    }

    fn classify_reference(&self, referent: &CType) -> Option<MockedType> {
        let is_record = matches!(referent.canonical().kind, TypeKind::Record);

        if referent.is_const {
            match self.classify(referent) {
                Some(t) => Some(t),
                None if is_record && referent.is_pod => Some(MockedType::InputPOD),
                None => None,
            }
        } else if is_record {
            Some(if referent.is_pod {
                MockedType::OutputPOD
            } else {
                MockedType::Pointer
            })
        } else if referent.is_pod {
            Some(MockedType::Output)
        } else {
            Some(MockedType::Pointer)
        }
    }
}

fn signed_or_unsigned(signed: bool, rank: IntRank) -> MockedType {
    match (signed, rank >= IntRank::Long) {
        (true, false) => MockedType::Int,
        (false, false) => MockedType::UnsignedInt,
        (true, true) => MockedType::Long,
        (false, true) => MockedType::UnsignedLong,
    }
}

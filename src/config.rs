use crate::classifier::MockedType;
use crate::string_utils::{count_char, trim};
use std::collections::BTreeMap;
use thiserror::Error;

const INPUT_OF_TYPE_PREFIX: &str = "InputOfType:";
const OUTPUT_OF_TYPE_PREFIX: &str = "OutputOfType:";
const MEMORY_BUFFER_PREFIX: &str = "MemoryBuffer:";

const RETURN_TYPES: &[(&str, MockedType)] = &[
    ("Bool", MockedType::Bool),
    ("Int", MockedType::Int),
    ("UnsignedInt", MockedType::UnsignedInt),
    ("LongInt", MockedType::Long),
    ("UnsignedLongInt", MockedType::UnsignedLong),
    ("Double", MockedType::Double),
    ("String", MockedType::String),
    ("Pointer", MockedType::Pointer),
    ("ConstPointer", MockedType::ConstPointer),
    ("Output", MockedType::Output),
];

const PARAMETER_ONLY_TYPES: &[(&str, MockedType)] = &[
    ("InputPOD", MockedType::InputPOD),
    ("OutputPOD", MockedType::OutputPOD),
    ("Skip", MockedType::Skip),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverrideError {
    #[error("Invalid override option <{0}>")]
    MissingSeparator(String),
    #[error("Override option key cannot be empty <{0}>")]
    EmptyKey(String),
    #[error("Override option value cannot be empty <{0}>")]
    EmptyValue(String),
    #[error("Invalid override option key format <{0}>")]
    InvalidKeyFormat(String),
    #[error("Override option type cannot be empty <{0}>")]
    EmptyType(String),
    #[error("Override option argument expression cannot be empty <{0}>")]
    EmptyExprMod(String),
    #[error(
        "Override option argument expression does not contain parameter name placeholder ($) <{0}>"
    )]
    MissingPlaceholder(String),
    #[error(
        "Override option argument expression contains more than one parameter name placeholder ($) <{0}>"
    )]
    MultiplePlaceholders(String),
    #[error("Invalid override option type '{ty}' <{option}>")]
    InvalidType { ty: String, option: String },
    #[error("Override option exposed type cannot be empty <{0}>")]
    EmptyExposedType(String),
    #[error("Override option expectation argument type cannot be empty <{0}>")]
    EmptyExpectationArgType(String),
    #[error("Override option size expression cannot be empty <{0}>")]
    EmptySizeExpr(String),
    #[error("Override option size expression can only be given once <{0}>")]
    DuplicateSizeExpr(String),
    #[error(
        "Override option size expression contains more than one parameter name placeholder ($) <{0}>"
    )]
    MultipleSizePlaceholders(String),
    #[error("Skip override cannot have an argument expression modifier <{0}>")]
    SkipWithExprMod(String),
    #[error("Override option key '{key}' can only be passed once <{option}>")]
    DuplicateKey { key: String, option: String },
}

pub type OverrideResult<T> = std::result::Result<T, OverrideError>;

/// Text surrounding a `$` placeholder. Applying it substitutes the placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprMod {
    front: String,
    back: String,
}

impl ExprMod {
    pub fn apply(&self, expr: &str) -> String {
        format!("{}{}{}", self.front, expr, self.back)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeExpr {
    front: String,
    back: String,
    has_placeholder: bool,
}

impl SizeExpr {
    pub fn apply(&self, name: &str) -> String {
        if self.has_placeholder {
            format!("{}{}{}", self.front, name, self.back)
        } else {
            self.front.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideSpec {
    mocked_type: MockedType,
    exposed_type_name: Option<String>,
    expectation_arg_type_name: Option<String>,
    expr_mod: Option<ExprMod>,
    size_expr: Option<SizeExpr>,
}

impl OverrideSpec {
    pub fn mocked_type(&self) -> MockedType {
        self.mocked_type
    }

    pub fn exposed_type_name(&self) -> Option<&str> {
        self.exposed_type_name.as_deref()
    }

    pub fn expectation_arg_type_name(&self) -> Option<&str> {
        self.expectation_arg_type_name.as_deref()
    }

    pub fn expr_mod(&self) -> Option<&ExprMod> {
        self.expr_mod.as_ref()
    }

    pub fn size_expr(&self) -> Option<&SizeExpr> {
        self.size_expr.as_ref()
    }

    fn parse(value: &str, is_return: bool, option: &str) -> OverrideResult<Self> {
        let (type_str, modifier) = match value.split_once('~') {
            Some((t, m)) => {
                let (t, m) = (t.trim(), m.trim());
                if t.is_empty() {
                    return Err(OverrideError::EmptyType(option.to_string()));
                }
                if m.is_empty() {
                    return Err(OverrideError::EmptyExprMod(option.to_string()));
                }
                (t, Some(m))
            }
            None => (value, None),
        };

        if let Some(spec) = Self::parse_simple(type_str, is_return) {
            return match modifier {
                Some(_) if spec == MockedType::Skip => {
                    Err(OverrideError::SkipWithExprMod(option.to_string()))
                }
                Some(m) => Ok(Self::simple(spec, Some(parse_expr_mod(m, option)?))),
                None => Ok(Self::simple(spec, None)),
            };
        }

        if !is_return {
            if let Some(rest) = type_str.strip_prefix(INPUT_OF_TYPE_PREFIX) {
                return Self::parse_of_type(MockedType::InputOfType, rest, modifier, option);
            }
            if let Some(rest) = type_str.strip_prefix(OUTPUT_OF_TYPE_PREFIX) {
                return Self::parse_of_type(MockedType::OutputOfType, rest, modifier, option);
            }
            if let Some(rest) = type_str.strip_prefix(MEMORY_BUFFER_PREFIX) {
                return Self::parse_memory_buffer(rest.trim(), modifier, option);
            }
        }

        Err(OverrideError::InvalidType {
            ty: type_str.to_string(),
            option: option.to_string(),
        })
    }

    fn parse_simple(type_str: &str, is_return: bool) -> Option<MockedType> {
        let parameter_only: &[(&str, MockedType)] = if is_return {
            &[]
        } else {
            PARAMETER_ONLY_TYPES
        };
        RETURN_TYPES
            .iter()
            .chain(parameter_only.iter())
            .find(|(name, _)| *name == type_str)
            .map(|&(_, t)| t)
    }

    fn simple(mocked_type: MockedType, expr_mod: Option<ExprMod>) -> Self {
        OverrideSpec {
            mocked_type,
            exposed_type_name: None,
            expectation_arg_type_name: None,
            expr_mod,
            size_expr: None,
        }
    }

    fn parse_of_type(
        mocked_type: MockedType,
        rest: &str,
        modifier: Option<&str>,
        option: &str,
    ) -> OverrideResult<Self> {
        let (exposed, expectation) = match rest.split_once('<') {
            Some((e, a)) => (e.trim(), a.trim()),
            None => (rest.trim(), rest.trim()),
        };
        if exposed.is_empty() {
            return Err(OverrideError::EmptyExposedType(option.to_string()));
        }
        if expectation.is_empty() {
            return Err(OverrideError::EmptyExpectationArgType(option.to_string()));
        }

        Ok(OverrideSpec {
            mocked_type,
            exposed_type_name: Some(exposed.to_string()),
            expectation_arg_type_name: Some(expectation.to_string()),
            expr_mod: modifier.map(|m| parse_expr_mod(m, option)).transpose()?,
            size_expr: None,
        })
    }

    fn parse_memory_buffer(
        rest: &str,
        modifier: Option<&str>,
        option: &str,
    ) -> OverrideResult<Self> {
        let size_expr = match (rest.is_empty(), modifier) {
            (true, None) => return Err(OverrideError::EmptySizeExpr(option.to_string())),
            (false, Some(_)) => return Err(OverrideError::DuplicateSizeExpr(option.to_string())),
            (true, Some(m)) => {
                let ExprMod { front, back } = parse_expr_mod(m, option)?;
                SizeExpr {
                    front,
                    back,
                    has_placeholder: true,
                }
            }
            (false, None) => match count_char(rest, '$') {
                0 => SizeExpr {
                    front: rest.to_string(),
                    back: String::new(),
                    has_placeholder: false,
                },
                1 => {
                    let (front, back) = rest.split_once('$').unwrap_or((rest, ""));
                    SizeExpr {
                        front: front.to_string(),
                        back: back.to_string(),
                        has_placeholder: true,
                    }
                }
                _ => return Err(OverrideError::MultipleSizePlaceholders(option.to_string())),
            },
        };

        Ok(OverrideSpec {
            mocked_type: MockedType::MemoryBuffer,
            exposed_type_name: None,
            expectation_arg_type_name: None,
            expr_mod: None,
            size_expr: Some(size_expr),
        })
    }
}

fn parse_expr_mod(modifier: &str, option: &str) -> OverrideResult<ExprMod> {
    match count_char(modifier, '$') {
        0 => Err(OverrideError::MissingPlaceholder(option.to_string())),
        1 => {
            let (front, back) = modifier.split_once('$').unwrap_or((modifier, ""));
            Ok(ExprMod {
                front: front.to_string(),
                back: back.to_string(),
            })
        }
        _ => Err(OverrideError::MultiplePlaceholders(option.to_string())),
    }
}

/// Classifies an override key, returning whether it applies to a return value.
fn classify_key(key: &str, option: &str) -> OverrideResult<bool> {
    let hashes = count_char(key, '#');
    let ats = count_char(key, '@');

    if hashes == 1 && ats == 0 {
        Ok(false)
    } else if ats == 1 && hashes == 0 && (key.starts_with('@') || key.ends_with('@')) {
        Ok(true)
    } else {
        Err(OverrideError::InvalidKeyFormat(option.to_string()))
    }
}

/// Generation settings which affect how declarations are interpreted.
#[derive(Debug, Clone, Default)]
pub struct Config {
    language_standard: Option<String>,
    use_underlying_typedef_type: bool,
    overrides: BTreeMap<String, OverrideSpec>,
}

impl Config {
    pub fn new<S: AsRef<str>>(
        language_standard: Option<String>,
        use_underlying_typedef_type: bool,
        override_options: &[S],
    ) -> OverrideResult<Self> {
        let mut overrides = BTreeMap::new();

        for option in override_options {
            let option = option.as_ref();
            let (key, value) = option
                .split_once('=')
                .ok_or_else(|| OverrideError::MissingSeparator(option.to_string()))?;
            let (key, value) = (trim(key), trim(value));

            if key.is_empty() {
                return Err(OverrideError::EmptyKey(option.to_string()));
            }
            if value.is_empty() {
                return Err(OverrideError::EmptyValue(option.to_string()));
            }

            let is_return = classify_key(&key, option)?;
            let spec = OverrideSpec::parse(&value, is_return, option)?;

            if overrides.insert(key.to_string(), spec).is_some() {
                return Err(OverrideError::DuplicateKey {
                    key: key.to_string(),
                    option: option.to_string(),
                });
            }
        }

        Ok(Config {
            language_standard,
            use_underlying_typedef_type,
            overrides,
        })
    }

    pub fn language_standard(&self) -> Option<&str> {
        self.language_standard.as_deref()
    }

    pub fn use_underlying_typedef_type(&self) -> bool {
        self.use_underlying_typedef_type
    }

    pub fn parameter_override(
        &self,
        function_name: &str,
        parameter_name: &str,
        parameter_type: &str,
    ) -> Option<&OverrideSpec> {
        [
            format!("{}#{}", function_name, parameter_name),
            format!("#{}", parameter_name),
            format!("#{}", parameter_type),
            format!("{}#", function_name),
        ]
        .iter()
        .find_map(|key| self.overrides.get(key))
    }

    pub fn return_override(&self, function_name: &str, return_type: &str) -> Option<&OverrideSpec> {
        [format!("{}@", function_name), format!("@{}", return_type)]
            .iter()
            .find_map(|key| self.overrides.get(key))
    }
}

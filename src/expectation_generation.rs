use crate::classifier::MockedType;
use crate::function::{Function, Parameter};
use crate::mock_generation::{const_pointer_to, parameter_call_kind, runtime_type_name};
use itertools::Itertools;

const EXPECTATION_NAMESPACE: &str = "expect";
const OBJECT_ARGUMENT: &str = "__object__";
const RETURN_ARGUMENT: &str = "__return__";
const NUM_CALLS_ARGUMENT: &str = "__numCalls__";

struct ExpectationArgument {
    declaration: String,
    name: String,
}

impl ExpectationArgument {
    fn new(ty: &str, name: String) -> Self {
        ExpectationArgument {
            declaration: format!("{} {}", ty, name),
            name,
        }
    }

    fn wrapped(ty: &str, name: &str) -> Self {
        Self::new(&format!("CppUMockGen::Parameter<{}>", ty), name.to_string())
    }
}

fn sizeof_argument(param: &Parameter) -> String {
    format!("__sizeof_{}", param.name())
}

fn target_spelling(param: &Parameter) -> String {
    param.passed_type().target().unqualified_spelling()
}

fn expectation_arg_type(param: &Parameter) -> String {
    param
        .override_spec()
        .and_then(|s| s.expectation_arg_type_name())
        .unwrap_or_default()
        .to_string()
}

fn exposed_type(param: &Parameter) -> &str {
    param
        .override_spec()
        .and_then(|s| s.exposed_type_name())
        .unwrap_or_default()
}

/// Type the expectation helper accepts for `param`, wrapped in `CppUMockGen::Parameter`.
fn parameter_type(param: &Parameter) -> String {
    match param.mocked_type() {
        MockedType::Output | MockedType::InputPOD | MockedType::OutputPOD => {
            const_pointer_to(&target_spelling(param))
        }
        MockedType::InputOfType | MockedType::OutputOfType => {
            const_pointer_to(&expectation_arg_type(param))
        }
        MockedType::MemoryBuffer => "const unsigned char*".to_string(),
        t => runtime_type_name(t).unwrap_or_default().to_string(),
    }
}

fn arguments(function: &Function) -> Vec<ExpectationArgument> {
    let mut arguments = Vec::new();

    if function.binds_object() {
        let class = function.class_name().unwrap_or_default();
        arguments.push(ExpectationArgument::wrapped(
            &format!("const {}*", class),
            OBJECT_ARGUMENT,
        ));
    }

    for param in function.parameters() {
        if param.mocked_type() == MockedType::Skip {
            continue;
        }
        arguments.push(ExpectationArgument::wrapped(
            &parameter_type(param),
            param.name(),
        ));
        if param.mocked_type() == MockedType::MemoryBuffer {
            arguments.push(ExpectationArgument::new("size_t", sizeof_argument(param)));
        }
    }

    if let Some(return_type) = function
        .return_value()
        .mocked_type()
        .and_then(runtime_type_name)
    {
        arguments.push(ExpectationArgument::new(
            return_type,
            RETURN_ARGUMENT.to_string(),
        ));
    }

    arguments
}

/// The `.with…Parameter(…)` call an expectation adds for `param`, or `None` if it is skipped.
fn expected_call_parameter(param: &Parameter) -> Option<String> {
    let name = param.name();
    let value = format!("{}.getValue()", name);

    let call = match param.mocked_type() {
        MockedType::Skip => return None,
        MockedType::Output | MockedType::OutputPOD => format!(
            "withOutputParameterReturning(\"{}\", {}, sizeof({}))",
            name,
            value,
            target_spelling(param)
        ),
        MockedType::InputPOD => format!(
            "withMemoryBufferParameter(\"{}\", reinterpret_cast<const unsigned char*>({}), sizeof({}))",
            name,
            value,
            target_spelling(param)
        ),
        MockedType::InputOfType => format!(
            "withParameterOfType(\"{}\", \"{}\", {})",
            exposed_type(param),
            name,
            value
        ),
        MockedType::OutputOfType => format!(
            "withOutputParameterOfTypeReturning(\"{}\", \"{}\", {})",
            exposed_type(param),
            name,
            value
        ),
        MockedType::MemoryBuffer => format!(
            "withMemoryBufferParameter(\"{}\", {}, {})",
            name,
            value,
            sizeof_argument(param)
        ),
        t => format!(
            "with{}Parameter(\"{}\", {})",
            parameter_call_kind(t).unwrap_or_default(),
            name,
            value
        ),
    };

    Some(call)
}

fn open_namespaces(function: &Function) -> String {
    std::iter::once(EXPECTATION_NAMESPACE.to_string())
        .chain(function.scopes().iter().map(|s| format!("{}$", s)))
        .map(|ns| format!("namespace {} {{", ns))
        .join(" ")
}

fn close_namespaces(function: &Function) -> String {
    std::iter::repeat("}")
        .take(function.scopes().len() + 1)
        .join(" ")
}

fn prototypes(function: &Function) -> (String, String) {
    let name = function.expectation_name();
    let arguments = arguments(function);
    let declarations = arguments.iter().map(|a| a.declaration.as_str());

    let single = format!(
        "MockExpectedCall& {}({})",
        name,
        declarations.clone().join(", ")
    );
    let counted = format!(
        "MockExpectedCall& {}({})",
        name,
        std::iter::once(format!("unsigned int {}", NUM_CALLS_ARGUMENT).as_str())
            .chain(declarations)
            .join(", ")
    );
    (single, counted)
}

pub fn generate_expectation_declaration(function: &Function) -> String {
    let (single, counted) = prototypes(function);
    format!(
        "{}\n{};\n{};\n{}\n",
        open_namespaces(function),
        single,
        counted,
        close_namespaces(function)
    )
}

pub fn generate_expectation_definition(function: &Function) -> String {
    let (single, counted) = prototypes(function);
    let name = function.expectation_name();
    let arguments = arguments(function);

    let forwarded = std::iter::once("1")
        .chain(arguments.iter().map(|a| a.name.as_str()))
        .join(", ");

    let parameter_calls: Vec<_> = function
        .parameters()
        .iter()
        .filter_map(|p| expected_call_parameter(p).map(|call| (p.name(), call)))
        .collect();

    let mut body = String::new();
    if !parameter_calls.is_empty() {
        body.push_str("    bool __ignoreOtherParams__ = false;\n");
    }
    body.push_str(&format!(
        "    MockExpectedCall& __expectedCall__ = mock().expectNCalls({}, \"{}\");\n",
        NUM_CALLS_ARGUMENT,
        function.qualified_name()
    ));
    if function.binds_object() {
        body.push_str(&format!(
            "    if(!{0}.isIgnored()) {{ __expectedCall__.onObject(const_cast<void*>(static_cast<const void*>({0}.getValue()))); }}\n",
            OBJECT_ARGUMENT
        ));
    }
    for (param_name, call) in &parameter_calls {
        body.push_str(&format!(
            "    if({0}.isIgnored()) {{ __ignoreOtherParams__ = true; }} else {{ __expectedCall__.{1}; }}\n",
            param_name, call
        ));
    }
    if !parameter_calls.is_empty() {
        body.push_str(
            "    if(__ignoreOtherParams__) { __expectedCall__.ignoreOtherParameters(); }\n",
        );
    }
    if !function.return_value().is_void() {
        body.push_str(&format!(
            "    __expectedCall__.andReturnValue({});\n",
            RETURN_ARGUMENT
        ));
    }
    body.push_str("    return __expectedCall__;\n");

    format!(
        "{open}\n{single}\n{{\n    return {name}({forwarded});\n}}\n\n{counted}\n{{\n{body}}}\n{close}\n",
        open = open_namespaces(function),
        single = single,
        name = name,
        forwarded = forwarded,
        counted = counted,
        body = body,
        close = close_namespaces(function),
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Config;
    use crate::ctype::types::*;
    use crate::ctype::CType;
    use crate::declaration::{Declaration, DeclarationKind};
    use crate::test_utils::assert_eq_upto_whitespace;
    use pretty_assertions::assert_eq;

    fn function(decl: Declaration, overrides: &[&str]) -> Function {
        let config = Config::new(None, false, overrides).unwrap();
        Function::parse(&decl, &config).unwrap().unwrap()
    }

    #[test]
    fn declaration_for_function_with_return() {
        let f = function(
            Declaration::new(DeclarationKind::Function, "function1", int())
                .with_parameter(Some("a"), int()),
            &[],
        );
        assert_eq!(
            generate_expectation_declaration(&f),
            "namespace expect {\n\
             MockExpectedCall& function1(CppUMockGen::Parameter<int> a, int __return__);\n\
             MockExpectedCall& function1(unsigned int __numCalls__, CppUMockGen::Parameter<int> a, int __return__);\n\
             }\n"
        );
    }

    #[test]
    fn definition_for_function_with_return() {
        let f = function(
            Declaration::new(DeclarationKind::Function, "function1", int())
                .with_parameter(Some("a"), int()),
            &[],
        );
        assert_eq_upto_whitespace(
            &generate_expectation_definition(&f),
            r#"
                namespace expect {
                MockExpectedCall& function1(CppUMockGen::Parameter<int> a, int __return__)
                {
                    return function1(1, a, __return__);
                }

                MockExpectedCall& function1(unsigned int __numCalls__, CppUMockGen::Parameter<int> a, int __return__)
                {
                    bool __ignoreOtherParams__ = false;
                    MockExpectedCall& __expectedCall__ = mock().expectNCalls(__numCalls__, "function1");
                    if(a.isIgnored()) { __ignoreOtherParams__ = true; } else { __expectedCall__.withIntParameter("a", a.getValue()); }
                    if(__ignoreOtherParams__) { __expectedCall__.ignoreOtherParameters(); }
                    __expectedCall__.andReturnValue(__return__);
                    return __expectedCall__;
                }
                }
            "#,
        );
    }

    #[test]
    fn constructor_helper_binds_object_without_return() {
        let ctor = function(
            Declaration::new(DeclarationKind::Constructor, "C", void()).in_scopes(vec!["C"]),
            &[],
        );
        assert_eq_upto_whitespace(
            &generate_expectation_declaration(&ctor),
            r#"
                namespace expect { namespace C$ {
                MockExpectedCall& C$ctor(CppUMockGen::Parameter<const C*> __object__);
                MockExpectedCall& C$ctor(unsigned int __numCalls__, CppUMockGen::Parameter<const C*> __object__);
                } }
            "#,
        );
        assert_eq_upto_whitespace(
            &generate_expectation_definition(&ctor),
            r#"
                namespace expect { namespace C$ {
                MockExpectedCall& C$ctor(CppUMockGen::Parameter<const C*> __object__)
                {
                    return C$ctor(1, __object__);
                }

                MockExpectedCall& C$ctor(unsigned int __numCalls__, CppUMockGen::Parameter<const C*> __object__)
                {
                    MockExpectedCall& __expectedCall__ = mock().expectNCalls(__numCalls__, "C::C");
                    if(!__object__.isIgnored()) { __expectedCall__.onObject(const_cast<void*>(static_cast<const void*>(__object__.getValue()))); }
                    return __expectedCall__;
                }
                } }
            "#,
        );
    }

    #[test]
    fn destructor_helper_name() {
        let dtor = function(
            Declaration::new(DeclarationKind::Destructor, "~C", void())
                .in_scopes(vec!["ns", "C"]),
            &[],
        );
        assert!(generate_expectation_declaration(&dtor).starts_with(
            "namespace expect { namespace ns$ { namespace C$ {\n\
             MockExpectedCall& C$dtor(CppUMockGen::Parameter<const ns::C*> __object__);"
        ));
    }

    #[test]
    fn output_buffers_and_skipped_parameters() {
        let f = function(
            Declaration::new(DeclarationKind::Function, "read", pointer_to(const_(char_())))
                .with_parameter(Some("out"), pointer_to(int()))
                .with_parameter(Some("buf"), pointer_to(const_(void())))
                .with_parameter(Some("ignored"), int())
                .with_parameter(Some("obj"), pointer_to(record("Foo", false))),
            &[
                "read#buf=MemoryBuffer:16",
                "read#ignored=Skip",
                "read#obj=OutputOfType:Foo<Bar",
            ],
        );
        assert_eq_upto_whitespace(
            &generate_expectation_definition(&f),
            r#"
                namespace expect {
                MockExpectedCall& read(CppUMockGen::Parameter<const int*> out, CppUMockGen::Parameter<const unsigned char*> buf, size_t __sizeof_buf, CppUMockGen::Parameter<const Bar*> obj, const char* __return__)
                {
                    return read(1, out, buf, __sizeof_buf, obj, __return__);
                }

                MockExpectedCall& read(unsigned int __numCalls__, CppUMockGen::Parameter<const int*> out, CppUMockGen::Parameter<const unsigned char*> buf, size_t __sizeof_buf, CppUMockGen::Parameter<const Bar*> obj, const char* __return__)
                {
                    bool __ignoreOtherParams__ = false;
                    MockExpectedCall& __expectedCall__ = mock().expectNCalls(__numCalls__, "read");
                    if(out.isIgnored()) { __ignoreOtherParams__ = true; } else { __expectedCall__.withOutputParameterReturning("out", out.getValue(), sizeof(int)); }
                    if(buf.isIgnored()) { __ignoreOtherParams__ = true; } else { __expectedCall__.withMemoryBufferParameter("buf", buf.getValue(), __sizeof_buf); }
                    if(obj.isIgnored()) { __ignoreOtherParams__ = true; } else { __expectedCall__.withOutputParameterOfTypeReturning("Foo", "obj", obj.getValue()); }
                    if(__ignoreOtherParams__) { __expectedCall__.ignoreOtherParameters(); }
                    __expectedCall__.andReturnValue(__return__);
                    return __expectedCall__;
                }
                }
            "#,
        );
    }

    #[test]
    fn const_references_to_pointers_expect_the_pointer() {
        let const_pointer = |ty: CType| {
            let spelling = format!("{}const", ty.spelling);
            CType {
                spelling,
                is_const: true,
                ..ty
            }
        };
        let f = function(
            Declaration::new(DeclarationKind::Function, "f", void())
                .with_parameter(Some("a"), lvalue_ref_to(const_pointer(pointer_to(void()))))
                .with_parameter(Some("c"), lvalue_ref_to(const_pointer(pointer_to(int())))),
            &[],
        );
        let definition = generate_expectation_definition(&f);
        assert!(definition.contains(
            "CppUMockGen::Parameter<void*> a, CppUMockGen::Parameter<const int*> c"
        ));
        assert!(definition.contains("__expectedCall__.withPointerParameter(\"a\", a.getValue());"));
        assert!(definition.contains(
            "__expectedCall__.withOutputParameterReturning(\"c\", c.getValue(), sizeof(int));"
        ));
    }

    #[test]
    fn string_override_expects_plain_c_string() {
        let f = function(
            Declaration::new(DeclarationKind::Function, "f", void()).with_parameter(
                Some("s"),
                lvalue_ref_to(const_(record("std::string", false))),
            ),
            &["#const std::string &=String~$.c_str()"],
        );
        let definition = generate_expectation_definition(&f);
        assert!(definition.contains("CppUMockGen::Parameter<const char*> s"));
        assert!(definition.contains("__expectedCall__.withStringParameter(\"s\", s.getValue());"));
    }
}

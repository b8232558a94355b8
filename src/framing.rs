use crate::output_file_parser::{GENERATION_OPTIONS_PREFIX, USER_CODE_BEGIN, USER_CODE_END};

pub const MOCK_RUNTIME_INCLUDES: &[&str] =
    &["<CppUTest/TestHarness.h>", "<CppUTestExt/MockSupport.h>"];
pub const EXPECTATION_RUNTIME_INCLUDES: &[&str] = &["<CppUMockGen.hpp>"];

pub fn banner(regen_opts: &str) -> String {
    format!(
        "/*\n\
         \x20* This file has been auto-generated by CppUMockGen v{}.\n\
         \x20*\n\
         \x20* Contents will NOT be preserved if it is regenerated!!!\n\
         \x20*\n\
         \x20* {}{}\n\
         \x20*/\n",
        env!("CARGO_PKG_VERSION"),
        GENERATION_OPTIONS_PREFIX,
        regen_opts
    )
}

pub fn runtime_includes(includes: &[&str]) -> String {
    includes
        .iter()
        .map(|include| format!("#include {}\n", include))
        .collect()
}

/// Includes the mocked header, with C linkage unless it is C++.
pub fn input_include(include_path: &str, is_cpp: bool) -> String {
    if is_cpp {
        format!("#include \"{}\"\n", include_path)
    } else {
        format!(
            "extern \"C\" {{\n#include \"{}\"\n}}\n",
            include_path
        )
    }
}

pub fn user_code_block(user_code: &str) -> String {
    let mut block = format!("// {}\n", USER_CODE_BEGIN);
    block.push_str(user_code);
    if !user_code.is_empty() && !user_code.ends_with('\n') {
        block.push('\n');
    }
    block.push_str(&format!("// {}\n", USER_CODE_END));
    block
}

use crate::clang_frontend::{clang_arguments, parse_header, DiagnosticLevel, ParsedUnit};
use crate::config::Config;
use crate::console::Console;
use crate::expectation_generation::{
    generate_expectation_declaration, generate_expectation_definition,
};
use crate::framing::{
    banner, input_include, runtime_includes, user_code_block, EXPECTATION_RUNTIME_INCLUDES,
    MOCK_RUNTIME_INCLUDES,
};
use crate::function::Function;
use crate::mock_generation::generate_mock;
use crate::string_utils::{relative_path, to_lower};
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Why a header could not be turned into mocks. The details have been reported to the console
/// by the time this is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationFailure {
    Input,
    Parse,
}

impl Display for GenerationFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationFailure::Input => f.write_str("the input file could not be processed"),
            GenerationFailure::Parse => f.write_str("the input file could not be parsed"),
        }
    }
}

const CPP_HEADER_EXTENSIONS: &[&str] = &["hpp", "hh", "hxx"];

pub fn resolve_language(
    interpret_as_cpp: bool,
    language_standard: Option<&str>,
    input: &Path,
) -> bool {
    if interpret_as_cpp {
        return true;
    }
    if let Some(standard) = language_standard {
        let standard = to_lower(standard);
        if standard.starts_with("c++") || standard.starts_with("gnu++") {
            return true;
        }
    }
    input
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| CPP_HEADER_EXTENSIONS.contains(&to_lower(ext).as_str()))
}

/// The mockable functions of one input header.
#[derive(Debug)]
pub struct Parser {
    input_path: PathBuf,
    is_cpp: bool,
    functions: Vec<Function>,
}

impl Parser {
    pub fn parse<W: Write>(
        input: &Path,
        config: &Config,
        interpret_as_cpp: bool,
        include_paths: &[String],
        console: &mut Console<W>,
    ) -> Result<Parser, GenerationFailure> {
        let is_cpp = resolve_language(interpret_as_cpp, config.language_standard(), input);

        if !input.is_file() {
            console.input_error(&format!(
                "Input file '{}' does not exist",
                input.display()
            ));
            return Err(GenerationFailure::Input);
        }

        let arguments = clang_arguments(is_cpp, config.language_standard(), include_paths);
        let unit = parse_header(input, &arguments, None).map_err(|e| {
            console.parse_error(&e.to_string());
            GenerationFailure::Parse
        })?;

        Self::from_parsed_unit(input, is_cpp, unit, config, console)
    }

    /// Second half of [`Parser::parse`]: reports diagnostics and keeps the mockable declarations.
    pub fn from_parsed_unit<W: Write>(
        input: &Path,
        is_cpp: bool,
        unit: ParsedUnit,
        config: &Config,
        console: &mut Console<W>,
    ) -> Result<Parser, GenerationFailure> {
        for diagnostic in &unit.diagnostics {
            match diagnostic.level {
                DiagnosticLevel::Error => console.parse_error(&diagnostic.text),
                DiagnosticLevel::Warning => console.parse_warning(&diagnostic.text),
            }
        }
        if unit.has_errors() {
            return Err(GenerationFailure::Parse);
        }

        let mut functions = Vec::new();
        let mut unsupported = false;
        for declaration in &unit.declarations {
            match Function::parse(declaration, config) {
                Ok(Some(function)) => functions.push(function),
                Ok(None) => {}
                Err(err) => {
                    console.input_error(&err.to_string());
                    unsupported = true;
                }
            }
        }
        if unsupported {
            return Err(GenerationFailure::Input);
        }

        if functions.is_empty() {
            console.input_error("The input file does not contain any mockable function or method");
            return Err(GenerationFailure::Input);
        }

        Ok(Parser {
            input_path: input.to_path_buf(),
            is_cpp,
            functions,
        })
    }

    fn input_include(&self, base_dir: &Path) -> String {
        input_include(&relative_path(base_dir, &self.input_path), self.is_cpp)
    }

    pub fn generate_mock<W: Write>(
        &self,
        regen_opts: &str,
        user_code: &str,
        base_dir: &Path,
        out: &mut W,
    ) -> std::io::Result<()> {
        writeln!(out, "{}", banner(regen_opts))?;
        writeln!(out, "{}", runtime_includes(MOCK_RUNTIME_INCLUDES))?;
        writeln!(out, "{}", self.input_include(base_dir))?;
        for function in &self.functions {
            writeln!(out, "{}", generate_mock(function))?;
        }
        write!(out, "{}", user_code_block(user_code))
    }

    pub fn generate_expectation_header<W: Write>(
        &self,
        regen_opts: &str,
        base_dir: &Path,
        out: &mut W,
    ) -> std::io::Result<()> {
        writeln!(out, "{}", banner(regen_opts))?;
        writeln!(out, "{}", runtime_includes(EXPECTATION_RUNTIME_INCLUDES))?;
        write!(out, "{}", self.input_include(base_dir))?;
        for function in &self.functions {
            write!(out, "\n{}", generate_expectation_declaration(function))?;
        }
        Ok(())
    }

    pub fn generate_expectation_impl<W: Write>(
        &self,
        regen_opts: &str,
        header_include: &str,
        out: &mut W,
    ) -> std::io::Result<()> {
        writeln!(out, "{}", banner(regen_opts))?;
        writeln!(out, "#include \"{}\"", header_include)?;
        for function in &self.functions {
            write!(out, "\n{}", generate_expectation_definition(function))?;
        }
        Ok(())
    }
}

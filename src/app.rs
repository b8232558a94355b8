use crate::cli::*;
use crate::config::Config;
use crate::console::Console;
use crate::error::CLIError::*;
use crate::error::*;
use crate::output_file_parser::OutputFileParser;
use crate::parser::Parser;
use crate::string_utils::{normalize_dir_path, quote_option, split_options};
use clap::Parser as _;
use itertools::Itertools;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const STDOUT_MARKER: &str = "@";
const MOCK_SUFFIX: &str = "_mock.cpp";
const EXPECTATION_SUFFIX: &str = "_expect.hpp";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

/// Where an output option points to. Directories receive a filename derived from the input.
pub fn resolve_output(option: &str, input: &Path, suffix: &str) -> OutputTarget {
    if option == STDOUT_MARKER {
        return OutputTarget::Stdout;
    }

    let path = PathBuf::from(option);
    if option.ends_with('/') || option.ends_with('\\') || path.is_dir() {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        OutputTarget::File(path.join(format!("{}{}", stem, suffix)))
    } else {
        OutputTarget::File(path)
    }
}

pub struct CppUMockGenApp {
    opts: CppUMockGenOpts,
}

impl CppUMockGenApp {
    pub fn new(opts: CppUMockGenOpts) -> CLIResult<Self> {
        let opts = if opts.regen {
            regenerated_options(opts)?
        } else {
            opts
        };
        Ok(CppUMockGenApp { opts })
    }

    #[cfg(test)]
    pub fn opts(&self) -> &CppUMockGenOpts {
        &self.opts
    }

    /// The options which reproduce the generated files, in a canonical order. Output locations are
    /// left out since regeneration always targets the files being regenerated.
    pub fn generation_options(&self) -> String {
        let opts = &self.opts;
        let mut tokens: Vec<&str> = Vec::new();

        if let Some(input) = &opts.input {
            tokens.extend(&["-i", input.as_str()]);
        }
        if opts.cpp {
            tokens.push("-x");
        }
        if let Some(std) = &opts.std {
            tokens.extend(&["-s", std.as_str()]);
        }
        if opts.underlying_typedef {
            tokens.push("-u");
        }
        for path in &opts.include_path {
            tokens.extend(&["-I", path.as_str()]);
        }
        if let Some(base) = &opts.base_directory {
            tokens.extend(&["-B", base.as_str()]);
        }
        for type_override in &opts.type_override {
            tokens.extend(&["-t", type_override.as_str()]);
        }

        tokens.into_iter().map(quote_option).join(" ")
    }

    pub fn run<W: Write>(&self, console: &mut Console<W>) -> CLIResult<()> {
        if self.opts.version {
            println!("CppUMockGen v{}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }

        if self.opts.mock_output.is_none() && self.opts.expect_output.is_none() {
            return Err(NoOutputRequested);
        }

        let config = Config::new(
            self.opts.std.clone(),
            self.opts.underlying_typedef,
            &self.opts.type_override,
        )
        .map_err(InvalidOverride)?;

        let input = PathBuf::from(self.opts.input.as_deref().unwrap_or_default());
        let include_paths: Vec<_> = self
            .opts
            .include_path
            .iter()
            .map(|path| normalize_dir_path(path))
            .collect();
        let parser = Parser::parse(&input, &config, self.opts.cpp, &include_paths, console)
            .map_err(Generation)?;

        let regen_opts = self.generation_options();

        if let Some(output) = &self.opts.mock_output {
            self.write_mock(&parser, &input, output, &regen_opts, console)?;
        }
        if let Some(output) = &self.opts.expect_output {
            self.write_expectations(&parser, &input, output, &regen_opts, console)?;
        }

        Ok(())
    }

    fn base_directory(&self, output: Option<&Path>) -> PathBuf {
        if let Some(base) = &self.opts.base_directory {
            return PathBuf::from(normalize_dir_path(base));
        }
        output
            .and_then(Path::parent)
            .filter(|dir| !dir.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    }

    fn write_mock<W: Write>(
        &self,
        parser: &Parser,
        input: &Path,
        output: &str,
        regen_opts: &str,
        console: &mut Console<W>,
    ) -> CLIResult<()> {
        match resolve_output(output, input, MOCK_SUFFIX) {
            OutputTarget::Stdout => {
                let stdout = std::io::stdout();
                parser
                    .generate_mock(regen_opts, "", &self.base_directory(None), &mut stdout.lock())
                    .map_err(StdoutNotWritable)
            }
            OutputTarget::File(path) => {
                let existing = OutputFileParser::parse(&path)
                    .map_err(|e| OutputFileNotReadable(path.clone(), e))?;
                let mut buffer = Vec::new();
                parser
                    .generate_mock(
                        regen_opts,
                        existing.user_code(),
                        &self.base_directory(Some(&path)),
                        &mut buffer,
                    )
                    .and_then(|_| std::fs::write(&path, buffer))
                    .map_err(|e| OutputFileNotWritable(path.clone(), e))?;
                console.success(&format!("Mock generated into '{}'", path.display()));
                Ok(())
            }
        }
    }

    fn write_expectations<W: Write>(
        &self,
        parser: &Parser,
        input: &Path,
        output: &str,
        regen_opts: &str,
        console: &mut Console<W>,
    ) -> CLIResult<()> {
        match resolve_output(output, input, EXPECTATION_SUFFIX) {
            OutputTarget::Stdout => {
                let header_include = format!(
                    "{}{}",
                    input
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    EXPECTATION_SUFFIX
                );
                let stdout = std::io::stdout();
                let mut out = stdout.lock();
                parser
                    .generate_expectation_header(regen_opts, &self.base_directory(None), &mut out)
                    .and_then(|_| {
                        parser.generate_expectation_impl(regen_opts, &header_include, &mut out)
                    })
                    .map_err(StdoutNotWritable)
            }
            OutputTarget::File(path) => {
                let header = path.with_extension("hpp");
                let implementation = path.with_extension("cpp");
                let header_include = header
                    .file_name()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();

                let mut buffer = Vec::new();
                parser
                    .generate_expectation_header(
                        regen_opts,
                        &self.base_directory(Some(&header)),
                        &mut buffer,
                    )
                    .and_then(|_| std::fs::write(&header, &buffer))
                    .map_err(|e| OutputFileNotWritable(header.clone(), e))?;

                buffer.clear();
                parser
                    .generate_expectation_impl(regen_opts, &header_include, &mut buffer)
                    .and_then(|_| std::fs::write(&implementation, &buffer))
                    .map_err(|e| OutputFileNotWritable(implementation.clone(), e))?;

                console.success(&format!(
                    "Expectations generated into '{}' and '{}'",
                    header.display(),
                    implementation.display()
                ));
                Ok(())
            }
        }
    }
}

/// The file holding the stored generation options for an output option given with `--regen`.
fn regeneration_source(opts: &CppUMockGenOpts) -> CLIResult<PathBuf> {
    let (output, is_expectation) = match (&opts.mock_output, &opts.expect_output) {
        (Some(mock), _) => (mock, false),
        (None, Some(expect)) => (expect, true),
        (None, None) => return Err(NoOutputRequested),
    };

    let path = PathBuf::from(output);
    if output == STDOUT_MARKER || path.is_dir() || (!path.is_file() && !is_expectation) {
        return Err(RegenerationTargetNotAFile(output.clone()));
    }

    Ok(if is_expectation {
        path.with_extension("hpp")
    } else {
        path
    })
}

fn regenerated_options(opts: CppUMockGenOpts) -> CLIResult<CppUMockGenOpts> {
    let source = regeneration_source(&opts)?;
    let stored = OutputFileParser::parse(&source)
        .map_err(|e| OutputFileNotReadable(source.clone(), e))?;
    if stored.generation_options().is_empty() {
        return Err(GenerationOptionsNotFound(source));
    }

    let arguments = std::iter::once("CppUMockGen".to_string())
        .chain(split_options(stored.generation_options()));
    let mut regenerated = CppUMockGenOpts::try_parse_from(arguments).map_err(InvalidArguments)?;
    regenerated.mock_output = opts.mock_output;
    regenerated.expect_output = opts.expect_output;
    Ok(regenerated)
}

use crate::config::OverrideError;
use crate::parser::GenerationFailure;
use colored::Colorize;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub trait Termination {
    fn report(self) -> i32;
}

#[derive(Debug)]
pub enum CLIError {
    InvalidArguments(clap::Error),
    InvalidOverride(OverrideError),
    NoOutputRequested,
    RegenerationTargetNotAFile(String),
    GenerationOptionsNotFound(PathBuf),
    /// Details have already been written to the console.
    Generation(GenerationFailure),
    OutputFileNotReadable(PathBuf, std::io::Error),
    OutputFileNotWritable(PathBuf, std::io::Error),
    StdoutNotWritable(std::io::Error),
}

impl CLIError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CLIError::InvalidArguments(err) if !err.use_stderr() => 0,
            CLIError::InvalidArguments(_)
            | CLIError::InvalidOverride(_)
            | CLIError::NoOutputRequested
            | CLIError::RegenerationTargetNotAFile(_)
            | CLIError::GenerationOptionsNotFound(_) => 1,
            CLIError::Generation(GenerationFailure::Input) => 2,
            CLIError::Generation(GenerationFailure::Parse) => 3,
            CLIError::OutputFileNotReadable(..)
            | CLIError::OutputFileNotWritable(..)
            | CLIError::StdoutNotWritable(_) => 4,
        }
    }
}

impl Display for CLIError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CLIError::InvalidArguments(clap_err) => Display::fmt(clap_err, f),
            CLIError::InvalidOverride(override_err) => f.write_fmt(format_args!(
                "Invalid type override: {}",
                override_err.to_string().italic(),
            )),
            CLIError::NoOutputRequested => f.write_str(
                "At least one of the mock output (-m) or the expectation output (-e) must be specified",
            ),
            CLIError::RegenerationTargetNotAFile(output) => f.write_fmt(format_args!(
                "Regeneration requires an existing output file, but '{}' is not one",
                output.yellow(),
            )),
            CLIError::GenerationOptionsNotFound(path) => f.write_fmt(format_args!(
                "No generation options found in '{}'",
                path.display().to_string().yellow(),
            )),
            CLIError::Generation(failure) => Display::fmt(failure, f),
            CLIError::OutputFileNotReadable(path, io_err) => f.write_fmt(format_args!(
                "Failed to read existing output file '{}': {}",
                path.display().to_string().yellow(),
                io_err.to_string().italic(),
            )),
            CLIError::OutputFileNotWritable(path, io_err) => f.write_fmt(format_args!(
                "Failed to write output file '{}': {}",
                path.display().to_string().yellow(),
                io_err.to_string().italic(),
            )),
            CLIError::StdoutNotWritable(io_err) => f.write_fmt(format_args!(
                "Failed to write to standard output: {}",
                io_err.to_string().italic(),
            )),
        }
    }
}

impl std::error::Error for CLIError {}

pub type CLIResult<T> = std::result::Result<T, CLIError>;

impl Termination for CLIResult<()> {
    fn report(self) -> i32 {
        match self {
            Ok(()) => 0,
            Err(CLIError::InvalidArguments(clap_err)) => {
                let _ = clap_err.print();
                CLIError::InvalidArguments(clap_err).exit_code()
            }
            Err(CLIError::Generation(failure)) => CLIError::Generation(failure).exit_code(),
            Err(err) => {
                eprintln!("{} {}", "error:".red().bold(), &err);
                err.exit_code()
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cli::CppUMockGenOpts;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[test]
    fn exit_codes() {
        let success: CLIResult<()> = Ok(());
        assert_eq!(success.report(), 0);
        assert_eq!(CLIError::NoOutputRequested.exit_code(), 1);
        assert_eq!(
            CLIError::InvalidOverride(OverrideError::EmptyKey("=".to_string())).exit_code(),
            1
        );
        assert_eq!(CLIError::Generation(GenerationFailure::Input).exit_code(), 2);
        assert_eq!(CLIError::Generation(GenerationFailure::Parse).exit_code(), 3);
        assert_eq!(
            CLIError::StdoutNotWritable(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
                .exit_code(),
            4
        );
    }

    #[test]
    fn help_is_not_a_failure() {
        let help = CppUMockGenOpts::try_parse_from(&["CppUMockGen", "--help"]).unwrap_err();
        assert_eq!(CLIError::InvalidArguments(help).exit_code(), 0);

        let unknown = CppUMockGenOpts::try_parse_from(&["CppUMockGen", "--bogus"]).unwrap_err();
        assert_eq!(CLIError::InvalidArguments(unknown).exit_code(), 1);
    }

    #[test]
    fn invalid_override_message_names_the_option() {
        colored::control::set_override(false);
        let err = CLIError::InvalidOverride(OverrideError::EmptyKey("=".to_string()));
        assert_eq!(
            err.to_string(),
            "Invalid type override: Override option key cannot be empty <=>"
        );
    }
}

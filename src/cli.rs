use clap::Parser;

/// A tool for generating CppUTest mocks and type-safe expectation helpers for the functions and
/// methods declared in a C or C++ header file.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[clap(name = "CppUMockGen", author = "Jonas Greitemann <jgreitemann@gmail.com>")]
#[clap(disable_version_flag = true)]
pub struct CppUMockGenOpts {
    /// Path to the header file containing the functions to be mocked.
    #[clap(short, long, required_unless_present_any = &["regen", "version"])]
    pub input: Option<String>,

    /// Output for the mock implementation. Either a file, a directory (the filename is then
    /// derived from the input file) or `@` for stdout. Existing files are overwritten, except for
    /// their user code block.
    #[clap(short, long)]
    pub mock_output: Option<String>,

    /// Output for the expectation helpers, like `--mock-output`. Both a header (`.hpp`) and an
    /// implementation (`.cpp`) are written.
    #[clap(short, long)]
    pub expect_output: Option<String>,

    /// Force interpretation of the input file as C++.
    #[clap(short = 'x', long)]
    pub cpp: bool,

    /// Language standard passed to the parser (e.g. `c99`, `c++17`). A C++ standard implies
    /// `--cpp`.
    #[clap(short, long)]
    pub std: Option<String>,

    /// Mock typedefs according to their underlying type instead of requiring an override.
    #[clap(short, long)]
    pub underlying_typedef: bool,

    /// Include path for the parser; can be used multiple times.
    #[clap(short = 'I', long)]
    pub include_path: Vec<String>,

    /// Directory relative to which the input file is included from the generated files. Defaults
    /// to the directory of each output file.
    #[clap(short = 'B', long)]
    pub base_directory: Option<String>,

    /// Override for the mocking of a parameter or return type, as `KEY=VALUE`; can be used
    /// multiple times.
    #[clap(short, long)]
    pub type_override: Vec<String>,

    /// Regenerate the given outputs using the options stored in the existing files.
    #[clap(short, long)]
    pub regen: bool,

    /// Print version information.
    #[clap(short = 'v', long, short_alias = 'V')]
    pub version: bool,
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Result<CppUMockGenOpts, clap::Error> {
        CppUMockGenOpts::try_parse_from(std::iter::once("CppUMockGen").chain(args.iter().copied()))
    }

    #[test]
    fn short_options() {
        let opts = parse(&[
            "-i", "foo.h", "-m", "mocks/", "-e", "@", "-x", "-s", "c++14", "-u", "-I", "inc1",
            "-I", "inc2", "-B", "base", "-t", "#p=Skip", "-t", "f@=Int",
        ])
        .unwrap();
        assert_eq!(
            opts,
            CppUMockGenOpts {
                input: Some("foo.h".to_string()),
                mock_output: Some("mocks/".to_string()),
                expect_output: Some("@".to_string()),
                cpp: true,
                std: Some("c++14".to_string()),
                underlying_typedef: true,
                include_path: vec!["inc1".to_string(), "inc2".to_string()],
                base_directory: Some("base".to_string()),
                type_override: vec!["#p=Skip".to_string(), "f@=Int".to_string()],
                regen: false,
                version: false,
            }
        );
    }

    #[test]
    fn input_is_required_unless_regenerating() {
        assert!(parse(&["-m", "@"]).is_err());
        assert!(parse(&["-r", "-m", "foo_mock.cpp"]).is_ok());
        assert!(parse(&["-v"]).is_ok());
    }

    #[test]
    fn unknown_options_are_rejected() {
        assert!(parse(&["-i", "foo.h", "--frobnicate"]).is_err());
    }
}

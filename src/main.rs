mod app;
mod ast_iterators;
mod clang_frontend;
mod classifier;
mod cli;
mod config;
mod console;
mod ctype;
mod declaration;
mod error;
mod expectation_generation;
mod framing;
mod function;
mod mock_generation;
mod output_file_parser;
mod parser;
mod string_utils;

#[cfg(test)]
mod test_utils;

use crate::app::CppUMockGenApp;
use crate::cli::CppUMockGenOpts;
use crate::console::Console;
use crate::error::{CLIError, Termination};
use clap::Parser;

fn main() {
    let mut console = Console::stderr();
    // `CLIError` is reported on stderr too, so it follows the console's colour decision.
    colored::control::set_override(console.colorize());
    let exit_code = CppUMockGenOpts::try_parse()
        .map_err(CLIError::InvalidArguments)
        .and_then(CppUMockGenApp::new)
        .and_then(|app| app.run(&mut console))
        .report();
    std::process::exit(exit_code);
}

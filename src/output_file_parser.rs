use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub const USER_CODE_BEGIN: &str = "CPPUMOCKGEN_USER_CODE_BEGIN";
pub const USER_CODE_END: &str = "CPPUMOCKGEN_USER_CODE_END";
pub const GENERATION_OPTIONS_PREFIX: &str = "Generation options: ";

/// State recovered from a previously generated file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OutputFileParser {
    user_code: String,
    generation_options: String,
}

/// Whether `line` is a `//` or `/*` comment whose content starts with `marker`.
pub fn is_marker_line(line: &str, marker: &str) -> bool {
    let line = line.trim_start();
    line.strip_prefix("//")
        .or_else(|| line.strip_prefix("/*"))
        .map_or(false, |rest| rest.trim_start().starts_with(marker))
}

impl OutputFileParser {
    /// Reads the file at `path`. A file which does not exist (or cannot be opened) yields empty
    /// results.
    pub fn parse(path: &Path) -> std::io::Result<Self> {
        match File::open(path) {
            Ok(file) => Self::parse_reader(BufReader::new(file)),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn parse_reader<R: BufRead>(mut reader: R) -> std::io::Result<Self> {
        let mut parsed = Self::default();
        let mut captured = String::new();
        let mut capturing = false;
        let mut line = String::new();

        while reader.read_line(&mut line)? > 0 {
            if capturing {
                if is_marker_line(&line, USER_CODE_END) {
                    capturing = false;
                    parsed.user_code = std::mem::take(&mut captured);
                } else {
                    captured.push_str(&line);
                }
            } else if is_marker_line(&line, USER_CODE_BEGIN) {
                capturing = true;
                captured.clear();
            } else if let Some(pos) = line.find(GENERATION_OPTIONS_PREFIX) {
                parsed.generation_options = line[pos + GENERATION_OPTIONS_PREFIX.len()..]
                    .trim_end()
                    .to_string();
            }
            line.clear();
        }

        // An unterminated block means the file was tampered with; nothing is preserved then.
        Ok(parsed)
    }

    pub fn user_code(&self) -> &str {
        &self.user_code
    }

    pub fn generation_options(&self) -> &str {
        &self.generation_options
    }
}

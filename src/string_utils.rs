use itertools::Itertools;
use std::path::{Component, Path, PathBuf};

pub fn trim(s: &str) -> String {
    s.trim().to_string()
}

pub fn to_lower(s: &str) -> String {
    s.to_lowercase()
}

pub fn count_char(s: &str, c: char) -> usize {
    s.chars().filter(|&x| x == c).count()
}

/// Converts backslashes to forward slashes and makes sure that a non-empty path ends with a
/// single `/`.
pub fn normalize_dir_path(path: &str) -> String {
    let mut normalized = path.replace('\\', "/");
    if !normalized.is_empty() && !normalized.ends_with('/') {
        normalized.push('/');
    }
    normalized
}

fn absolute(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    // Lexical normalization; `canonicalize` would resolve symlinks and fail for paths that do
    // not exist yet.
    joined
        .components()
        .fold(PathBuf::new(), |mut acc, component| {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    acc.pop();
                }
                other => acc.push(other.as_os_str()),
            }
            acc
        })
}

/// Path of `to_file` relative to the directory `from_dir`, using `/` as separator regardless of
/// platform, as required for `#include` directives.
pub fn relative_path(from_dir: &Path, to_file: &Path) -> String {
    let from = absolute(from_dir);
    let to = absolute(to_file);

    let from_components: Vec<_> = from.components().collect();
    let to_components: Vec<_> = to.components().collect();

    let common = from_components
        .iter()
        .zip(to_components.iter())
        .take_while(|(a, b)| a == b)
        .count();

    if common == 0 {
        return to.to_string_lossy().replace('\\', "/");
    }

    std::iter::repeat("..".to_string())
        .take(from_components.len() - common)
        .chain(
            to_components[common..]
                .iter()
                .map(|c| c.as_os_str().to_string_lossy().into_owned()),
        )
        .join("/")
}

/// Quotes a command line token for the generation options line so that [`split_options`] can
/// recover it exactly.
pub fn quote_option(token: &str) -> String {
    if !token.is_empty() && !token.contains(|c: char| c.is_whitespace() || c == '"' || c == '\\')
    {
        return token.to_string();
    }

    let mut quoted = String::with_capacity(token.len() + 2);
    quoted.push('"');
    for c in token.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

pub fn split_options(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut in_quotes = false;
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                in_token = true;
            }
            '\\' if in_quotes => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            c if c.is_whitespace() && !in_quotes => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if in_token {
        tokens.push(current);
    }

    tokens
}

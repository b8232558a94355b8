use crate::clang_frontend::clang_arguments;
use clang::*;
use itertools::Itertools;
use std::num::Wrapping;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

// libclang permits a single `Clang` instance per process.
static CLANG_LOCK: Mutex<()> = Mutex::new(());

pub fn clang_lock() -> MutexGuard<'static, ()> {
    CLANG_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn libclang_available() -> bool {
    match Clang::new() {
        Ok(_) => true,
        Err(reason) => {
            eprintln!("skipping test, libclang is unavailable: {}", reason);
            false
        }
    }
}

/// Runs `callback` while holding the clang lock, or returns `None` if libclang cannot be loaded.
pub fn with_libclang<R, C: FnOnce() -> R>(callback: C) -> Option<R> {
    let _guard = clang_lock();
    if libclang_available() {
        Some(callback())
    } else {
        None
    }
}

pub fn is_cpp_filename(filename: &str) -> bool {
    !filename.ends_with(".h")
}

pub fn get_temp_filename(filename: &str) -> PathBuf {
    std::env::temp_dir().join(filename)
}

pub fn test_tu_from_source<R, C: FnOnce(&TranslationUnit) -> R>(
    code: &str,
    filename: &str,
    callback: C,
) -> Option<R> {
    let _guard = clang_lock();
    let clang = match Clang::new() {
        Ok(clang) => clang,
        Err(reason) => {
            eprintln!("skipping test, libclang is unavailable: {}", reason);
            return None;
        }
    };
    let index = Index::new(&clang, false, false);
    let path = get_temp_filename(filename);
    let file = Unsaved::new(&path, code);
    let is_cpp = is_cpp_filename(filename);
    let standard = if is_cpp { Some("c++17") } else { None };

    let tu = index
        .parser(&path)
        .unsaved(&[file])
        .arguments(&clang_arguments(is_cpp, standard, &[]))
        .parse()
        .unwrap();

    Some(callback(&tu))
}

pub fn write_header(dir: &Path, filename: &str, code: &str) -> PathBuf {
    let path = dir.join(filename);
    std::fs::write(&path, code).unwrap();
    path
}

fn split_around<P: FnMut(char) -> bool>(input: &str, pat: P) -> Vec<&str> {
    use std::iter::once;
    once(Wrapping(usize::MAX))
        .chain(input.match_indices(pat).map(|t| Wrapping(t.0)))
        .chain(once(Wrapping(input.len())))
        .tuple_windows()
        .map(|(a, b)| [((a + Wrapping(1)).0, b.0), (b.0, b.0 + 1)])
        .flatten()
        .filter(|(a, b)| b - a > 0)
        .filter(|(a, _)| *a < input.len())
        .map(|(a, b)| &input[a..b])
        .collect()
}

pub fn assert_eq_upto_whitespace(left: &str, right: &str) {
    fn tokens(input: &str) -> Vec<&str> {
        input
            .split_ascii_whitespace()
            .map(|token| split_around(token, |c| "{[()]},.;:+-*/&|^!%#@=<>\"".contains(c)))
            .flatten()
            .collect()
    }

    if tokens(left) != tokens(right) {
        assert_eq!(left, right);
    }
}

//! Clone detection and argument rewriting.
//!
//! Arguments are treated as opaque tokens. The only things recognized are the
//! literal `clone` token and a few options that consume the following token.
//! A non-subcommand token that happens to equal `clone` is a false positive,
//! and options outside [`VALUE_OPTIONS`] are assumed to take no separate value.

use std::ffi::{OsStr, OsString};
use std::path::Path;

const CLONE: &str = "clone";

/// Flag injected in front of the mirror path.
pub const REFERENCE_FLAG: &str = "--reference";

/// Options whose value is passed as the next token.
pub const VALUE_OPTIONS: [&str; 3] = ["--depth", "--single-branch", "--branch"];

fn as_os_str<S: AsRef<OsStr>>(arg: &S) -> &OsStr {
    arg.as_ref()
}

fn is_clone(arg: &OsStr) -> bool {
    arg == OsStr::new(CLONE)
}

fn is_option(arg: &OsStr) -> bool {
    arg.as_encoded_bytes().starts_with(b"-")
}

fn takes_value(arg: &OsStr) -> bool {
    VALUE_OPTIONS.iter().any(|opt| arg == OsStr::new(opt))
}

/// True when the literal `clone` token appears anywhere in `args`.
pub fn is_clone_invocation<S: AsRef<OsStr>>(args: &[S]) -> bool {
    args.iter().any(|arg| is_clone(arg.as_ref()))
}

/// Return the clone source: the first non-option token after the first `clone`.
pub fn extract_source<S: AsRef<OsStr>>(args: &[S]) -> Option<OsString> {
    let start = args.iter().position(|arg| is_clone(arg.as_ref()))?;
    let mut rest = args[start + 1..].iter().map(|arg| as_os_str(arg));

    while let Some(arg) = rest.next() {
        if is_option(arg) {
            if takes_value(arg) {
                rest.next();
            }
            continue;
        }
        return Some(arg.to_os_string());
    }

    None
}

/// True when `source` names something that exists on this host.
pub fn is_local_source(source: &OsStr) -> bool {
    Path::new(source).exists()
}

/// Copy `args`, inserting `--reference <mirror>` right after the first `clone`.
pub fn insert_reference<S: AsRef<OsStr>>(args: &[S], mirror: &Path) -> Vec<OsString> {
    let mut rewritten = Vec::with_capacity(args.len() + 2);
    let mut inserted = false;

    for arg in args {
        let arg = as_os_str(arg);
        rewritten.push(arg.to_os_string());
        if !inserted && is_clone(arg) {
            inserted = true;
            rewritten.push(OsString::from(REFERENCE_FLAG));
            rewritten.push(mirror.as_os_str().to_os_string());
        }
    }

    rewritten
}

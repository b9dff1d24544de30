//! Compilation of `@def` argument lists and bodies into [`Macro`] values.

use crate::lexer::{is_ident_continue, is_ident_start};
use crate::macros::{Macro, PLACEHOLDER};
use jmp_common::{JmpError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static ARGUMENT_LIST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\$[A-Za-z_][0-9A-Za-z_]*(?:\s*\$[A-Za-z_][0-9A-Za-z_]*)*)?$")
        .expect("argument list pattern is valid")
});

static ARGUMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$[A-Za-z_][0-9A-Za-z_]*").expect("argument pattern is valid"));

/// Parse the argument-list block of `@def`.
///
/// The list is empty or a sequence of `$name` tokens separated by optional
/// whitespace. Names keep their `$` prefix.
pub fn parse_arguments(list: &str) -> Result<Vec<String>> {
    if !ARGUMENT_LIST.is_match(list) {
        return Err(JmpError::syntax(format!("malformed argument list '{list}'")));
    }

    let mut args: Vec<String> = Vec::new();
    for found in ARGUMENT.find_iter(list) {
        let arg = found.as_str();
        if args.iter().any(|existing| existing == arg) {
            return Err(JmpError::semantics(format!("duplicate argument '{arg}'")));
        }
        args.push(arg.to_string());
    }

    Ok(args)
}

/// Compile a raw macro body against the declared arguments.
///
/// Two passes over the body:
///
/// 1. Every `$name` is inspected left to right. When preceded by `@`, the
///    `@` is dropped and `$name` stays literal. A declared argument collapses
///    to a single [`PLACEHOLDER`] whose offset is recorded. Anything else is
///    left alone.
/// 2. Each remaining `@$` followed by a non identifier start (or nothing)
///    loses its `@`; a match spans three characters, so matches never
///    overlap. Recorded offsets past a removed `@` shift left.
pub fn compile_body(body: &str, args: &[String]) -> Macro {
    let mut chars: Vec<char> = body.chars().collect();
    let mut positions: Vec<Vec<usize>> = vec![Vec::new(); args.len()];

    let mut i = 0;
    while i < chars.len() {
        if chars[i] != '$' || !chars.get(i + 1).is_some_and(|&c| is_ident_start(c)) {
            i += 1;
            continue;
        }

        if i > 0 && chars[i - 1] == '@' {
            chars.remove(i - 1);
            // `i` now points just past the `$`
            continue;
        }

        let end = identifier_end(&chars, i + 1);
        let token: String = chars[i..end].iter().collect();
        match args.iter().position(|arg| *arg == token) {
            Some(index) => {
                chars[i] = PLACEHOLDER;
                chars.drain(i + 1..end);
                positions[index].push(i);
                i += 1;
            }
            None => i = end,
        }
    }

    let (chars, removed) = strip_escaped_dollars(&chars);
    for offsets in &mut positions {
        for offset in offsets.iter_mut() {
            let shift = removed.iter().filter(|&&at| at < *offset).count();
            *offset -= shift;
        }
    }

    Macro::normal(positions, chars.into_iter().collect())
}

fn identifier_end(chars: &[char], start: usize) -> usize {
    let mut end = start;
    while end < chars.len() && is_ident_continue(chars[end]) {
        end += 1;
    }
    end
}

/// Drop the `@` of every `@$` escape; returns the new body and the offsets
/// (in the input) of the removed characters.
fn strip_escaped_dollars(chars: &[char]) -> (Vec<char>, Vec<usize>) {
    let mut stripped = Vec::with_capacity(chars.len());
    let mut removed = Vec::new();

    let mut i = 0;
    while i < chars.len() {
        let is_escape = chars[i] == '@'
            && chars.get(i + 1) == Some(&'$')
            && !chars.get(i + 2).is_some_and(|&c| is_ident_start(c));

        if is_escape {
            removed.push(i);
            let stop = (i + 3).min(chars.len());
            stripped.extend_from_slice(&chars[i + 1..stop]);
            i = stop;
        } else {
            stripped.push(chars[i]);
            i += 1;
        }
    }

    (stripped, removed)
}

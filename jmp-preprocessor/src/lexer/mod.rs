//! Character-level input handling: the rewrite buffer, macro name
//! classification and brace-balanced block reading.

use jmp_common::{JmpError, Result};
use std::collections::VecDeque;
use std::io::BufRead;

/// Result of classifying the token that follows an `@`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameToken {
    /// `[A-Za-z_][A-Za-z0-9_]*`
    Name(String),
    /// One of `@ { } $`
    Escape(char),
    /// Any other character; it has been consumed
    Invalid(char),
    EndOfInput,
}

/// How `@` is treated inside a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockMode {
    /// `@@`, `@{` and `@}` collapse to the escaped character.
    Normal,
    /// Escape markers are kept verbatim (macro bodies and arguments).
    Raw,
}

pub fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

pub fn is_ident_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

pub fn is_escape(ch: char) -> bool {
    matches!(ch, '@' | '{' | '}' | '$')
}

/// Input stream with insertion at the read cursor.
///
/// Lines are pulled from the source lazily, only once everything already
/// buffered has been consumed. Text pushed back is read before anything that
/// was buffered or not yet pulled.
pub struct InputBuffer<R> {
    source: R,
    pending: VecDeque<char>,
    keep_whitespace: bool,
    exhausted: bool,
}

impl<R: BufRead> InputBuffer<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            pending: VecDeque::new(),
            keep_whitespace: true,
            exhausted: false,
        }
    }

    pub fn keep_whitespace(&self) -> bool {
        self.keep_whitespace
    }

    /// Whether whitespace is returned by reads that do not force it
    pub fn set_keep_whitespace(&mut self, keep: bool) {
        self.keep_whitespace = keep;
    }

    /// Read the next character, or `None` once the source is exhausted.
    ///
    /// Unless `force_whitespace` is set, whitespace is skipped while
    /// whitespace preservation is off.
    pub fn read(&mut self, force_whitespace: bool) -> Result<Option<char>> {
        loop {
            let ch = match self.pending.pop_front() {
                Some(ch) => ch,
                None => {
                    if !self.fill()? {
                        return Ok(None);
                    }
                    continue;
                }
            };

            if !force_whitespace && !self.keep_whitespace && ch.is_whitespace() {
                continue;
            }

            return Ok(Some(ch));
        }
    }

    /// Insert `text` at the cursor so it is read next
    pub fn pushback(&mut self, text: &str) {
        for ch in text.chars().rev() {
            self.pending.push_front(ch);
        }
    }

    fn fill(&mut self) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }

        let mut line = String::new();
        let read = self
            .source
            .read_line(&mut line)
            .map_err(|e| JmpError::input(format!("failed to read input: {e}")))?;

        if read == 0 {
            self.exhausted = true;
            return Ok(false);
        }

        self.pending.extend(line.chars());
        Ok(true)
    }

    /// Classify what follows an already consumed `@`.
    ///
    /// Whitespace is always significant here: it terminates a name and is
    /// an invalid escape.
    pub fn read_name(&mut self) -> Result<NameToken> {
        let first = match self.read(true)? {
            Some(ch) => ch,
            None => return Ok(NameToken::EndOfInput),
        };

        if is_ident_start(first) {
            let mut name = String::from(first);
            while let Some(ch) = self.read(true)? {
                if is_ident_continue(ch) {
                    name.push(ch);
                } else {
                    self.pending.push_front(ch);
                    break;
                }
            }
            Ok(NameToken::Name(name))
        } else if is_escape(first) {
            Ok(NameToken::Escape(first))
        } else {
            Ok(NameToken::Invalid(first))
        }
    }

    /// Read up to the `}` matching an already consumed `{`.
    ///
    /// Returns `None` when the input ends before the block is closed. The
    /// character following an `@` never changes the nesting depth.
    pub fn read_block(&mut self, mode: BlockMode) -> Result<Option<String>> {
        let mut block = String::new();
        let mut depth = 0usize;
        let mut after_at = false;

        while let Some(ch) = self.read(true)? {
            if after_at {
                after_at = false;
                if mode == BlockMode::Raw || !matches!(ch, '@' | '{' | '}') {
                    block.push('@');
                }
                block.push(ch);
                continue;
            }

            match ch {
                '@' => {
                    after_at = true;
                    continue;
                }
                '{' => depth += 1,
                '}' => {
                    if depth == 0 {
                        return Ok(Some(block));
                    }
                    depth -= 1;
                }
                _ => {}
            }
            block.push(ch);
        }

        Ok(None)
    }

    /// Read one argument of a user macro invocation.
    ///
    /// A `{...}` block is taken raw, `@name` is kept unexpanded for the
    /// rescan of the expansion, anything else is a single character.
    pub fn read_argument(&mut self) -> Result<String> {
        let ch = self
            .read(false)?
            .ok_or_else(|| JmpError::semantics("input ends before all macro arguments were read"))?;

        match ch {
            '{' => self
                .read_block(BlockMode::Raw)?
                .ok_or_else(|| JmpError::syntax("unterminated block in macro argument")),
            '@' => Ok(match self.read_name()? {
                NameToken::Name(name) => format!("@{name}"),
                NameToken::Escape(escaped) => escaped.to_string(),
                NameToken::Invalid(_) | NameToken::EndOfInput => "@".to_string(),
            }),
            other => Ok(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn buffer(text: &str) -> InputBuffer<Cursor<Vec<u8>>> {
        InputBuffer::new(Cursor::new(text.as_bytes().to_vec()))
    }

    fn read_all(input: &mut InputBuffer<Cursor<Vec<u8>>>) -> String {
        let mut out = String::new();
        while let Some(ch) = input.read(false).unwrap() {
            out.push(ch);
        }
        out
    }

    #[test]
    fn test_reads_across_lines() {
        let mut input = buffer("ab\ncd\n");
        assert_eq!(read_all(&mut input), "ab\ncd\n");
        assert_eq!(input.read(false).unwrap(), None);
    }

    #[test]
    fn test_pushback_is_read_before_remaining_input() {
        let mut input = buffer("abc");
        assert_eq!(input.read(false).unwrap(), Some('a'));
        input.pushback("XY");
        assert_eq!(read_all(&mut input), "XYbc");
    }

    #[test]
    fn test_pushback_before_first_read() {
        let mut input = buffer("tail");
        input.pushback("head ");
        assert_eq!(read_all(&mut input), "head tail");
    }

    #[test]
    fn test_whitespace_skipped_unless_forced() {
        let mut input = buffer("a b\n c");
        input.set_keep_whitespace(false);
        assert_eq!(input.read(false).unwrap(), Some('a'));
        assert_eq!(input.read(true).unwrap(), Some(' '));
        assert_eq!(read_all(&mut input), "bc");
    }

    #[test]
    fn test_read_name_pushes_back_terminator() {
        let mut input = buffer("foo_1 bar");
        assert_eq!(input.read_name().unwrap(), NameToken::Name("foo_1".to_string()));
        assert_eq!(input.read(false).unwrap(), Some(' '));
    }

    #[test]
    fn test_read_name_at_end_of_input() {
        let mut input = buffer("name");
        assert_eq!(input.read_name().unwrap(), NameToken::Name("name".to_string()));
        assert_eq!(buffer("").read_name().unwrap(), NameToken::EndOfInput);
    }

    #[test]
    fn test_read_name_classification() {
        for escape in ['@', '{', '}', '$'] {
            let mut input = buffer(&escape.to_string());
            assert_eq!(input.read_name().unwrap(), NameToken::Escape(escape));
        }
        assert_eq!(buffer("1abc").read_name().unwrap(), NameToken::Invalid('1'));
        assert_eq!(buffer(" x").read_name().unwrap(), NameToken::Invalid(' '));
    }

    #[test]
    fn test_read_name_ignores_whitespace_policy() {
        let mut input = buffer("ab c");
        input.set_keep_whitespace(false);
        assert_eq!(input.read_name().unwrap(), NameToken::Name("ab".to_string()));
        assert_eq!(input.read(false).unwrap(), Some('c'));
    }

    #[test]
    fn test_read_block_nesting() {
        let mut input = buffer("a{b}c}rest");
        assert_eq!(input.read_block(BlockMode::Normal).unwrap(), Some("a{b}c".to_string()));
        assert_eq!(read_all(&mut input), "rest");
    }

    #[test]
    fn test_read_block_normal_escapes() {
        let mut input = buffer("@@ @{ @} @x @$}");
        assert_eq!(
            input.read_block(BlockMode::Normal).unwrap(),
            Some("@ { } @x @$".to_string())
        );
    }

    #[test]
    fn test_read_block_raw_keeps_escapes() {
        let mut input = buffer("@@ @{ @} @x}");
        assert_eq!(
            input.read_block(BlockMode::Raw).unwrap(),
            Some("@@ @{ @} @x".to_string())
        );
    }

    #[test]
    fn test_escaped_braces_do_not_change_depth() {
        let mut input = buffer("@{}tail");
        assert_eq!(input.read_block(BlockMode::Normal).unwrap(), Some("{".to_string()));
        let mut input = buffer("@{}tail");
        assert_eq!(input.read_block(BlockMode::Raw).unwrap(), Some("@{".to_string()));
    }

    #[test]
    fn test_read_block_keeps_whitespace() {
        let mut input = buffer(" a\n b }");
        input.set_keep_whitespace(false);
        assert_eq!(input.read_block(BlockMode::Normal).unwrap(), Some(" a\n b ".to_string()));
    }

    #[test]
    fn test_unterminated_block() {
        assert_eq!(buffer("abc").read_block(BlockMode::Normal).unwrap(), None);
        assert_eq!(buffer("a{b}").read_block(BlockMode::Normal).unwrap(), None);
        assert_eq!(buffer("a@").read_block(BlockMode::Raw).unwrap(), None);
    }

    #[test]
    fn test_read_argument_forms() {
        let mut input = buffer("x{a@{b}@name@@@!");
        assert_eq!(input.read_argument().unwrap(), "x");
        assert_eq!(input.read_argument().unwrap(), "a@{b");
        assert_eq!(input.read_argument().unwrap(), "@name");
        assert_eq!(input.read_argument().unwrap(), "@");
        assert_eq!(input.read_argument().unwrap(), "@");
        assert!(input.read_argument().is_err());
    }

    #[test]
    fn test_read_argument_errors() {
        let err = buffer("").read_argument().unwrap_err();
        assert!(matches!(err, JmpError::Semantics { .. }));
        let err = buffer("{open").read_argument().unwrap_err();
        assert!(matches!(err, JmpError::Syntax { .. }));
    }
}

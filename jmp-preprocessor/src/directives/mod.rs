use crate::lexer::{BlockMode, NameToken};
use crate::macros::NULL_MACRO;
use crate::{parser, Engine};
use jmp_common::{JmpError, Result};
use log::debug;
use std::io::{BufRead, Write};

impl<R: BufRead, W: Write> Engine<R, W> {
    /// Handle `@def@name{args}{body}`
    pub(crate) fn handle_def(&mut self) -> Result<()> {
        let name = self.read_macro_name("@def")?;
        if name != NULL_MACRO {
            self.macros.release(&name, self.redefinition_forbidden)?;
        }

        let arg_list = self.read_definition_block(BlockMode::Normal, "argument list")?;
        let args = parser::parse_arguments(&arg_list)?;
        let body = self.read_definition_block(BlockMode::Raw, "body")?;
        let compiled = parser::compile_body(&body, &args);

        if name == NULL_MACRO {
            debug!("ignoring definition of @{NULL_MACRO}");
            return Ok(());
        }

        debug!(
            "defined @{name} with {} argument(s), body of {} characters",
            compiled.arity,
            compiled.body.chars().count()
        );
        self.macros.insert(name, compiled);
        Ok(())
    }

    /// Handle `@let@target@source`
    pub(crate) fn handle_let(&mut self) -> Result<()> {
        let target = self.read_macro_name("@let")?;
        let source = self.read_macro_name("@let")?;

        if target == NULL_MACRO {
            return Ok(());
        }

        if source == NULL_MACRO {
            debug!("deleting @{target}");
            return self.macros.delete(&target);
        }

        let Some(value) = self.macros.get(&source).cloned() else {
            return Err(JmpError::semantics(format!(
                "cannot bind @{target} to undefined macro '@{source}'"
            )));
        };

        self.macros.release(&target, self.redefinition_forbidden)?;
        debug!("binding @{target} to a copy of @{source}");
        self.macros.insert(target, value);
        Ok(())
    }

    /// Handle `@set{+INPUT_SPACES}` and `@set{-INPUT_SPACES}`
    pub(crate) fn handle_set(&mut self) -> Result<()> {
        match self.input.read(false)? {
            Some('{') => {}
            Some(ch) => {
                return Err(JmpError::syntax(format!(
                    "expected '{{' after @set, found '{}'",
                    ch.escape_debug()
                )))
            }
            None => return Err(JmpError::semantics("input ends after @set")),
        }

        let payload = self
            .input
            .read_block(BlockMode::Normal)?
            .ok_or_else(|| JmpError::syntax("unterminated @set block"))?;

        let keep = match payload.as_str() {
            "+INPUT_SPACES" => true,
            "-INPUT_SPACES" => false,
            other => {
                return Err(JmpError::semantics(format!("unknown @set option '{other}'")));
            }
        };

        debug!("input whitespace {}", if keep { "kept" } else { "dropped" });
        self.input.set_keep_whitespace(keep);
        Ok(())
    }

    /// Read the `@name` operand of a built-in
    fn read_macro_name(&mut self, builtin: &str) -> Result<String> {
        match self.input.read(false)? {
            Some('@') => {}
            Some(ch) => {
                return Err(JmpError::syntax(format!(
                    "expected a macro name after {builtin}, found '{}'",
                    ch.escape_debug()
                )))
            }
            None => {
                return Err(JmpError::semantics(format!(
                    "input ends before the macro name of {builtin}"
                )))
            }
        }

        match self.input.read_name()? {
            NameToken::Name(name) => Ok(name),
            NameToken::EndOfInput => Err(JmpError::semantics(format!(
                "input ends before the macro name of {builtin}"
            ))),
            NameToken::Escape(ch) | NameToken::Invalid(ch) => Err(JmpError::syntax(format!(
                "'@{}' is not a macro name in {builtin}",
                ch.escape_debug()
            ))),
        }
    }

    /// Read one of the two `{...}` blocks of `@def`
    fn read_definition_block(&mut self, mode: BlockMode, what: &str) -> Result<String> {
        match self.input.read(false)? {
            Some('{') => self
                .input
                .read_block(mode)?
                .ok_or_else(|| JmpError::semantics(format!("unterminated {what} block in @def"))),
            Some(ch) => Err(JmpError::semantics(format!(
                "expected {what} block in @def, found '{}'",
                ch.escape_debug()
            ))),
            None => Err(JmpError::semantics(format!("input ends before {what} block in @def"))),
        }
    }
}

pub mod lexer;
pub mod macros;
pub mod parser;
pub mod directives;


use jmp_common::{JmpError, Result};
use log::trace;
use std::io::{BufRead, Write};

use lexer::{BlockMode, InputBuffer, NameToken};
pub use macros::{Macro, MacroKind, MacroTable};

/// Settings fixed for the whole run
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    /// Reject every rebinding of an existing name, not only protected ones
    pub redefinition_forbidden: bool,
    /// Text processed before the input source
    pub seed: Option<String>,
}

/// Main macro processor
///
/// Reads characters from the input buffer, writes literal text to the output
/// and rewrites the buffer with the expansion of every user macro call, so
/// expansions are rescanned before any later input.
pub struct Engine<R, W> {
    input: InputBuffer<R>,
    output: W,
    macros: MacroTable,
    redefinition_forbidden: bool,
}

impl<R: BufRead, W: Write> Engine<R, W> {
    /// Create an engine with default options
    pub fn new(input: R, output: W) -> Self {
        Self::with_options(input, output, EngineOptions::default())
    }

    pub fn with_options(input: R, output: W, options: EngineOptions) -> Self {
        let mut input = InputBuffer::new(input);
        if let Some(seed) = &options.seed {
            input.pushback(seed);
        }

        Self {
            input,
            output,
            macros: MacroTable::bootstrap(),
            redefinition_forbidden: options.redefinition_forbidden,
        }
    }

    pub fn macros(&self) -> &MacroTable {
        &self.macros
    }

    /// Whether top-level whitespace is copied to the output
    pub fn keeps_whitespace(&self) -> bool {
        self.input.keep_whitespace()
    }

    /// Consume the engine, returning the output sink
    pub fn into_output(self) -> W {
        self.output
    }

    /// Process the whole input.
    ///
    /// Stops at the first error; output written up to that point is left in
    /// the sink.
    pub fn run(&mut self) -> Result<()> {
        while let Some(ch) = self.input.read(false)? {
            match ch {
                '@' => self.handle_at()?,
                '{' => {
                    let block = self
                        .input
                        .read_block(BlockMode::Normal)?
                        .ok_or_else(|| JmpError::syntax("unterminated block"))?;
                    self.write_str(&block)?;
                }
                '}' | '$' => {
                    return Err(JmpError::syntax(format!("unexpected '{ch}' outside of a block")));
                }
                _ => self.write_char(ch)?,
            }
        }

        self.output
            .flush()
            .map_err(|e| JmpError::output(format!("failed to flush output: {e}")))
    }

    fn handle_at(&mut self) -> Result<()> {
        match self.input.read_name()? {
            NameToken::Name(name) => self.invoke(&name),
            NameToken::Escape(ch) => self.write_char(ch),
            NameToken::Invalid(ch) => Err(JmpError::syntax(format!(
                "invalid character '{}' after '@'",
                ch.escape_debug()
            ))),
            NameToken::EndOfInput => Err(JmpError::semantics("input ends after '@'")),
        }
    }

    fn invoke(&mut self, name: &str) -> Result<()> {
        let kind = self
            .macros
            .get(name)
            .map(|m| m.kind)
            .ok_or_else(|| JmpError::semantics(format!("undefined macro '@{name}'")))?;

        match kind {
            MacroKind::Null => Ok(()),
            MacroKind::Normal => self.expand_call(name),
            MacroKind::Def => self.handle_def(),
            MacroKind::Let => self.handle_let(),
            MacroKind::Set => self.handle_set(),
        }
    }

    /// Collect the arguments of a user macro and push its expansion back
    fn expand_call(&mut self, name: &str) -> Result<()> {
        let Some(macro_def) = self.macros.get(name) else {
            return Err(JmpError::semantics(format!("undefined macro '@{name}'")));
        };

        let mut args = Vec::with_capacity(macro_def.arity);
        for _ in 0..macro_def.arity {
            args.push(self.input.read_argument()?);
        }

        let expansion = macro_def.expand(&args);
        trace!("@{name} expands to {} characters", expansion.chars().count());
        self.input.pushback(&expansion);
        Ok(())
    }

    fn write_char(&mut self, ch: char) -> Result<()> {
        let mut buf = [0u8; 4];
        self.write_str(ch.encode_utf8(&mut buf))
    }

    fn write_str(&mut self, text: &str) -> Result<()> {
        self.output
            .write_all(text.as_bytes())
            .map_err(|e| JmpError::output(format!("failed to write output: {e}")))
    }
}

/// Process `input` in memory with the given options
pub fn process_str(input: &str, options: EngineOptions) -> Result<String> {
    let mut engine = Engine::with_options(input.as_bytes(), Vec::new(), options);
    engine.run()?;
    String::from_utf8(engine.into_output())
        .map_err(|e| JmpError::output(format!("output is not valid UTF-8: {e}")))
}

//! Loads LS-8 program listings.
//!
//! A listing holds one byte per line, written in binary. Everything after a
//! `#` is a comment:
//!
//! ```text
//! # print8.ls8
//! 10000010 # LDI R0,8
//! 00000000
//! 00001000
//! 01000111 # PRN R0
//! 00000000
//! 00000001 # HLT
//! ```

use std::borrow::Cow;
use std::error;
use std::path::Path;
use std::str::FromStr;
use std::{fmt, fs, str::Lines};

use color_eyre::eyre::{self, WrapErr};

use super::{Byte, Memory};

/// Widest token a listing line may hold.
const MAX_DIGITS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    InvalidAddress { address: usize },
    InvalidNumber { radix: u32 },
    TooManyDigits,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::InvalidAddress { address } => {
                write!(f, "memory has no address `0x{:x}`", address)
            }
            ParseErrorKind::InvalidNumber { radix } => {
                write!(f, "failed to parse number with radix `{}`", radix)
            }
            ParseErrorKind::TooManyDigits => {
                write!(f, "a byte has at most {} binary digits", MAX_DIGITS)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    kind: ParseErrorKind,
    context: Option<Cow<'static, str>>,
    line_nr: usize,
}

impl ParseError {
    fn new<C, S>(kind: ParseErrorKind, context: C, line_nr: usize) -> Self
    where
        C: Into<Option<S>>,
        S: Into<Cow<'static, str>>,
    {
        Self {
            kind,
            context: context.into().map(|inner| inner.into()),
            line_nr,
        }
    }

    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    /// 1-based number of the offending line
    pub fn line_nr(&self) -> usize {
        self.line_nr
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(
                f,
                "error [ln: {}]: {} - {}",
                self.line_nr, self.kind, context
            )
        } else {
            write!(f, "error [ln: {}]: {}", self.line_nr, self.kind)
        }
    }
}

impl error::Error for ParseError {}

pub type Result<T, E = ParseError> = std::result::Result<T, E>;

#[derive(Debug, Clone)]
pub struct Parser<'a, const S: usize> {
    lines: Lines<'a>,
    line_nr: usize,
    address: usize,
    memory: Memory<S>,
}

impl<'a, const S: usize> Parser<'a, S> {
    /// Creates a new parser for `data` which will populate `memory` from address 0.
    pub fn new(data: &'a str, memory: Memory<S>) -> Self {
        Self {
            lines: data.lines(),
            line_nr: 0,
            address: 0,
            memory,
        }
    }

    /// Consumes `self` and tries to parse all of the listing into memory.
    ///
    /// # Errors
    ///
    /// All errors which may occur are collected and returned at the end.
    pub fn parse(mut self) -> Result<Memory<S>, Vec<ParseError>> {
        let mut errors = Vec::new();

        while let Some(res) = self.parse_next_line() {
            if let Err(err) = res {
                log::error!("{}", err);
                errors.push(err);
            }
        }

        if errors.is_empty() {
            log::debug!("Loaded {} bytes", self.address);
            Ok(self.memory)
        } else {
            Err(errors)
        }
    }

    /// Tries to parse the next line of the listing. Each byte should be located
    /// on its own line.
    fn parse_next_line(&mut self) -> Option<Result<()>> {
        let line = self.lines.next()?;
        self.line_nr += 1;

        let token = line.split('#').next().unwrap_or_default().trim();

        if token.is_empty() {
            // Comment or empty line; skip
            return Some(Ok(()));
        }

        Some(self.parse_byte(token))
    }

    /// Tries to parse `token` as a binary byte and writes it at the next address.
    ///
    /// # Examples
    ///
    /// - `10000010`
    /// - `1`
    fn parse_byte(&mut self, token: &str) -> Result<()> {
        if token.len() > MAX_DIGITS {
            return Err(ParseError::new(
                ParseErrorKind::TooManyDigits,
                format!("`{}` has {} digits", token, token.len()),
                self.line_nr,
            ));
        }

        let byte = Byte::from_str_radix(token, 2).map_err(|_| {
            ParseError::new(
                ParseErrorKind::InvalidNumber { radix: 2 },
                format!("`{}` is not a binary number", token),
                self.line_nr,
            )
        })?;

        self.write_byte(byte)
    }

    /// Writes `byte` into memory at [self.address](`Parser::address`), then
    /// advances the address by one.
    ///
    /// # Errors
    ///
    /// This will return an error if the listing does not fit into memory.
    fn write_byte(&mut self, byte: Byte) -> Result<()> {
        match self.memory.data.get_mut(self.address) {
            Some(cell) => {
                *cell = byte;
                self.address += 1;
                Ok(())
            }
            None => Err(ParseError::new(
                ParseErrorKind::InvalidAddress {
                    address: self.address,
                },
                "program is larger than memory",
                self.line_nr,
            )),
        }
    }
}

impl<const S: usize> FromStr for Memory<S> {
    type Err = Vec<ParseError>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parser::new(s, Memory::default()).parse()
    }
}

impl<const S: usize> Memory<S> {
    /// Loads a listing from `path` into a fresh memory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> eyre::Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read `{}`", path.display()))?;

        data.parse().map_err(|errors: Vec<ParseError>| {
            let lines: Vec<String> = errors.iter().map(ToString::to_string).collect();
            eyre::eyre!(
                "failed to load `{}`:\n{}",
                path.display(),
                lines.join("\n")
            )
        })
    }
}

// Dialect: delimiter / line ending / quote / header / trim configuration.
//
// Built once per parser and resolved into a `Structural` triple that the
// scanner copies into its hot loop.

use crate::error::{Error, Result};

/// The three bytes the scanner classifies in every window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Structural {
    pub delimiter: u8,
    pub line_ending: u8,
    pub quote: u8,
}

impl Default for Structural {
    fn default() -> Self {
        Structural {
            delimiter: b',',
            line_ending: b'\n',
            quote: b'"',
        }
    }
}

/// Parsing dialect for a `Parser`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialect {
    pub delimiter: u8,
    pub line_ending: u8,
    pub quote: u8,
    /// When true the first row is the header and `rows()` starts after it.
    pub has_header: bool,
    /// Bytes removed from both ends of a cell by `Cell::trimmed`.
    pub trim: Vec<u8>,
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect {
            delimiter: b',',
            line_ending: b'\n',
            quote: b'"',
            has_header: true,
            trim: vec![b' ', b'\t'],
        }
    }
}

impl Dialect {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_line_ending(mut self, line_ending: u8) -> Self {
        self.line_ending = line_ending;
        self
    }

    pub fn with_quote(mut self, quote: u8) -> Self {
        self.quote = quote;
        self
    }

    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    pub fn with_trim(mut self, trim: &[u8]) -> Self {
        self.trim = trim.to_vec();
        self
    }

    /// Check that the structural bytes are pairwise distinct and not trimmed.
    pub fn validate(&self) -> Result<()> {
        let Structural {
            delimiter,
            line_ending,
            quote,
        } = self.structural();

        if delimiter == quote {
            return Err(Error::InvalidDialect(format!(
                "delimiter and quote are both {:?}",
                delimiter as char
            )));
        }
        if delimiter == line_ending {
            return Err(Error::InvalidDialect(format!(
                "delimiter and line ending are both {:?}",
                delimiter as char
            )));
        }
        if quote == line_ending {
            return Err(Error::InvalidDialect(format!(
                "quote and line ending are both {:?}",
                quote as char
            )));
        }
        if let Some(&b) = self
            .trim
            .iter()
            .find(|&&b| b == delimiter || b == quote || b == line_ending)
        {
            return Err(Error::InvalidDialect(format!(
                "trim set contains structural byte {:?}",
                b as char
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn structural(&self) -> Structural {
        Structural {
            delimiter: self.delimiter,
            line_ending: self.line_ending,
            quote: self.quote,
        }
    }

    #[inline]
    pub fn is_trim(&self, byte: u8) -> bool {
        match self.trim.len() {
            0 => false,
            1 => byte == self.trim[0],
            2 => byte == self.trim[0] || byte == self.trim[1],
            _ => self.trim.contains(&byte),
        }
    }
}

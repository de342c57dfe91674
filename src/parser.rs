// Boundary iterator: Parser -> Rows -> Row -> Cells -> Cell
//
// Rows are found with a line-end scanner over the whole input, cells with
// a delimiter scanner confined to one row (a row span holds no unquoted
// line ending, so the first delimiter is the whole answer). Every view borrows the
// parser's source; nothing is copied until `Cell::unescaped` has to
// collapse a doubled quote.

use std::borrow::Cow;
use std::fmt;
use std::ops::Range;
use std::path::Path;

use crate::core::{field, Backend, Chunker, FindMode};
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::source::{MmapSource, Source};

/// Parser over one source.
pub struct Parser<S: Source> {
    source: S,
    dialect: Dialect,
    backend: Backend,
}

impl<S: Source> Parser<S> {
    /// Parser with the default dialect: `,` `\n` `"`, header row, trims
    /// spaces and tabs.
    pub fn new(source: S) -> Self {
        Parser {
            source,
            dialect: Dialect::default(),
            backend: Backend::detect(),
        }
    }

    pub fn with_dialect(source: S, dialect: Dialect) -> Result<Self> {
        dialect.validate()?;
        Ok(Parser {
            source,
            dialect,
            backend: Backend::detect(),
        })
    }

    /// Parser from an already validated dialect.
    pub(crate) fn from_parts(source: S, dialect: Dialect, backend: Backend) -> Self {
        Parser {
            source,
            dialect,
            backend: backend.resolve(),
        }
    }

    /// Force a scanner backend. Unavailable backends fall back to bitwise
    /// windows.
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend.resolve();
        self
    }

    /// Data rows, after the header when the dialect has one.
    pub fn rows(&self) -> Rows<'_> {
        let mut rows = self.all_rows();
        if self.dialect.has_header {
            rows.next();
        }
        rows
    }

    /// Every row including the header.
    pub fn all_rows(&self) -> Rows<'_> {
        Rows::new(self.as_bytes(), &self.dialect, self.backend)
    }

    /// The header row, if the dialect has one and the input is not empty.
    pub fn header(&self) -> Option<Row<'_>> {
        if self.dialect.has_header {
            self.all_rows().next()
        } else {
            None
        }
    }

    /// Position of the header cell whose trimmed value equals `name`.
    pub fn index_of(&self, name: &str) -> Result<usize> {
        let header = self.header().ok_or(Error::MissingHeader)?;
        header
            .cells()
            .position(|cell| cell.trimmed() == name.as_bytes())
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.source.as_bytes()
    }
}

impl Parser<MmapSource> {
    /// Map `path` and parse it with the default dialect.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Parser::new(MmapSource::open(path)?))
    }

    pub fn open_with_dialect(path: impl AsRef<Path>, dialect: Dialect) -> Result<Self> {
        Parser::with_dialect(MmapSource::open(path)?, dialect)
    }
}

impl<S: Source> fmt::Debug for Parser<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("len", &self.as_bytes().len())
            .field("dialect", &self.dialect)
            .field("backend", &self.backend)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// Forward iterator over records.
#[derive(Debug, Clone)]
pub struct Rows<'a> {
    chunker: Chunker<'a>,
    dialect: &'a Dialect,
    pos: usize,
}

impl<'a> Rows<'a> {
    /// Rows of a borrowed input, header included, without a `Parser`.
    pub fn new(input: &'a [u8], dialect: &'a Dialect, backend: Backend) -> Self {
        Rows {
            chunker: Chunker::new(input, dialect.structural(), backend),
            dialect,
            pos: 0,
        }
    }
}

impl<'a> Iterator for Rows<'a> {
    type Item = Row<'a>;

    fn next(&mut self) -> Option<Row<'a>> {
        let input = self.chunker.input();
        let len = input.len();
        if self.pos >= len {
            return None;
        }

        let start = self.pos;
        let line_end = self.chunker.find(FindMode::LineEnd, start, len).line_end;
        self.pos = (line_end + 1).min(len);

        Some(Row::new(
            input,
            start..row_end(input, start, line_end, self.dialect),
            self.dialect,
            self.chunker.backend(),
        ))
    }
}

/// End of a row's content: drops a `\r` before a `\n` line ending.
#[inline]
pub(crate) fn row_end(input: &[u8], start: usize, line_end: usize, dialect: &Dialect) -> usize {
    if dialect.line_ending == b'\n' && line_end > start && input[line_end - 1] == b'\r' {
        line_end - 1
    } else {
        line_end
    }
}

/// One record.
#[derive(Clone, Copy)]
pub struct Row<'a> {
    input: &'a [u8],
    start: usize,
    end: usize,
    dialect: &'a Dialect,
    backend: Backend,
}

#[allow(clippy::len_without_is_empty)]
impl<'a> Row<'a> {
    pub(crate) fn new(
        input: &'a [u8],
        span: Range<usize>,
        dialect: &'a Dialect,
        backend: Backend,
    ) -> Self {
        Row {
            input,
            start: span.start,
            end: span.end,
            dialect,
            backend,
        }
    }

    /// Row bytes without the line ending.
    pub fn raw(&self) -> &'a [u8] {
        &self.input[self.start..self.end]
    }

    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn cells(&self) -> Cells<'a> {
        Cells {
            chunker: Chunker::new(self.input, self.dialect.structural(), self.backend),
            dialect: self.dialect,
            pos: self.start,
            end: self.end,
            done: false,
        }
    }

    /// Number of cells. A blank row has one empty cell.
    pub fn len(&self) -> usize {
        self.cells().count()
    }

    pub fn cell(&self, index: usize) -> Result<Cell<'a>> {
        let mut count = 0;
        for cell in self.cells() {
            if count == index {
                return Ok(cell);
            }
            count += 1;
        }
        Err(Error::FieldIndexOutOfRange { index, count })
    }

    /// Cells at `indexes`, in the order given, from a single pass.
    pub fn cells_at<const N: usize>(&self, indexes: [usize; N]) -> Result<[Cell<'a>; N]> {
        let mut out = [Cell::empty(self.input, self.start, self.dialect); N];
        let mut found = [false; N];
        let wanted = indexes.iter().copied().max().map_or(0, |m| m + 1);

        let mut count = 0;
        for (i, cell) in self.cells().enumerate().take(wanted) {
            for (slot, &index) in indexes.iter().enumerate() {
                if index == i {
                    out[slot] = cell;
                    found[slot] = true;
                }
            }
            count = i + 1;
        }

        match found.iter().position(|&f| !f) {
            Some(missing) => Err(Error::FieldIndexOutOfRange {
                index: indexes[missing],
                count,
            }),
            None => Ok(out),
        }
    }
}

impl fmt::Debug for Row<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Row")
            .field("span", &self.span())
            .field("raw", &String::from_utf8_lossy(self.raw()))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

/// Forward iterator over the cells of one row.
#[derive(Debug, Clone)]
pub struct Cells<'a> {
    chunker: Chunker<'a>,
    dialect: &'a Dialect,
    pos: usize,
    end: usize,
    done: bool,
}

impl<'a> Iterator for Cells<'a> {
    type Item = Cell<'a>;

    fn next(&mut self) -> Option<Cell<'a>> {
        if self.done {
            return None;
        }
        let start = self.pos;
        let delimiter = self.chunker.find(FindMode::Delimiter, start, self.end).delimiter;
        if delimiter < self.end {
            self.pos = delimiter + 1;
        } else {
            self.done = true;
        }
        Some(Cell {
            input: self.chunker.input(),
            start,
            end: delimiter,
            dialect: self.dialect,
        })
    }
}

impl std::iter::FusedIterator for Cells<'_> {}

/// One field of a row.
#[derive(Clone, Copy)]
pub struct Cell<'a> {
    input: &'a [u8],
    start: usize,
    end: usize,
    dialect: &'a Dialect,
}

impl<'a> Cell<'a> {
    fn empty(input: &'a [u8], at: usize, dialect: &'a Dialect) -> Self {
        Cell {
            input,
            start: at,
            end: at,
            dialect,
        }
    }

    /// Exact bytes between the surrounding boundaries, quotes included.
    pub fn raw(&self) -> &'a [u8] {
        &self.input[self.start..self.end]
    }

    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Outer quote pair stripped from the raw span, then the dialect's trim
    /// set removed from both ends. Doubled quotes are left as they are.
    pub fn trimmed(&self) -> &'a [u8] {
        field::cell_trimmed(self.raw(), &self.dialect.trim, self.dialect.quote)
    }

    /// `trimmed` with doubled quotes collapsed.
    pub fn unescaped(&self) -> Cow<'a, [u8]> {
        field::collapse_quotes(self.trimmed(), self.dialect.quote)
    }

    pub fn unescaped_string(&self) -> String {
        String::from_utf8_lossy(&self.unescaped()).into_owned()
    }
}

impl fmt::Debug for Cell<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cell")
            .field("span", &self.span())
            .field("raw", &String::from_utf8_lossy(self.raw()))
            .finish()
    }
}

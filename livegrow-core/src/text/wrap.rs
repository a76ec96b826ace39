//! Greedy word wrapping
//!
//! Splits a message on whitespace runs and packs the words into lines of
//! at most `columns` characters. Words longer than a line are cut to the
//! line width and the rest of the word is dropped.
//!
//! Lengths are counted in `char`s, which matches the one-cell-per-glyph
//! model of HD44780 style panels.

use core::str::SplitWhitespace;

use heapless::String;

/// Widest supported display line
pub const MAX_COLUMNS: usize = 40;

/// Byte capacity of a [`Line`], enough for `MAX_COLUMNS` of any `char`
pub const LINE_CAPACITY: usize = MAX_COLUMNS * 4;

/// One display row of text
pub type Line = String<LINE_CAPACITY>;

/// Wrap `message` into lines of at most `columns` characters
///
/// `columns` is clamped into `1..=MAX_COLUMNS`. Empty or whitespace-only
/// input yields exactly one empty line.
pub fn wrap(message: &str, columns: usize) -> Wrap<'_> {
    Wrap {
        words: message.split_whitespace(),
        columns: columns.clamp(1, MAX_COLUMNS),
        pending: None,
        emitted: false,
    }
}

/// Iterator over wrapped lines, created by [`wrap`]
#[derive(Debug, Clone)]
pub struct Wrap<'a> {
    words: SplitWhitespace<'a>,
    columns: usize,
    /// Word that did not fit on the previous line
    pending: Option<&'a str>,
    emitted: bool,
}

impl Wrap<'_> {
    /// Line width in characters
    pub fn columns(&self) -> usize {
        self.columns
    }
}

impl Iterator for Wrap<'_> {
    type Item = Line;

    fn next(&mut self) -> Option<Line> {
        let mut line = Line::new();
        let mut len = 0;

        while let Some(word) = self.pending.take().or_else(|| self.words.next()) {
            let word_len = word.chars().count();

            if word_len > self.columns {
                if len > 0 {
                    // Flush what we have; the long word gets its own line
                    self.pending = Some(word);
                    break;
                }
                for c in word.chars().take(self.columns) {
                    let _ = line.push(c);
                }
                self.emitted = true;
                return Some(line);
            }

            let needed = len + usize::from(len > 0) + word_len;
            if needed > self.columns {
                self.pending = Some(word);
                break;
            }

            if len > 0 {
                let _ = line.push(' ');
            }
            let _ = line.push_str(word);
            len = needed;
        }

        if len > 0 || !self.emitted {
            self.emitted = true;
            Some(line)
        } else {
            None
        }
    }
}

impl core::iter::FusedIterator for Wrap<'_> {}

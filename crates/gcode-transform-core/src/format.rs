//! Rendering of transformed numbers and in-place rewriting of lines.
//!
//! A rewrite never re-serializes a line. It collects [`Patch`]es against the
//! original text and applies them in one forward pass, so whitespace, other
//! words and the comment come out byte-identical.

use glam::DVec2;

use crate::line::{ParsedLine, Span, Word};

/// Fixed-point renderer with a set number of decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberFormat {
    precision: usize,
}

impl NumberFormat {
    pub fn new(precision: usize) -> Self {
        Self { precision }
    }

    /// Render `value` with exactly `precision` decimals. Values that round to
    /// zero are written without a sign.
    pub fn render(&self, value: f64) -> String {
        let text = format!("{value:.prec$}", prec = self.precision);
        match text.strip_prefix('-') {
            Some(unsigned) if unsigned.bytes().all(|b| b == b'0' || b == b'.') => {
                unsigned.to_string()
            }
            _ => text,
        }
    }
}

/// A single replacement in a line.
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    /// Byte span to replace; zero-width to insert
    pub span: Span,
    pub new_text: String,
}

/// Patches against one source line, applied in a single forward pass.
#[derive(Debug, Default)]
pub struct PatchSet {
    patches: Vec<Patch>,
}

impl PatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, span: Span, new_text: String) {
        self.patches.push(Patch { span, new_text });
    }

    pub fn insert(&mut self, offset: usize, new_text: String) {
        self.patches.push(Patch {
            span: Span::at(offset),
            new_text,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    /// Apply all patches to `source`.
    ///
    /// Patches sharing a start offset keep the order they were added in, so an
    /// insertion queued before a replacement at the same offset lands first.
    pub fn apply(&self, source: &str) -> String {
        if self.patches.is_empty() {
            return source.to_string();
        }

        let mut sorted: Vec<&Patch> = self.patches.iter().collect();
        sorted.sort_by_key(|p| p.span.start);

        debug_assert!(
            sorted
                .windows(2)
                .all(|w| w[0].span.end <= w[1].span.start && w[1].span.end <= source.len())
        );

        let mut out = String::with_capacity(source.len() + 16);
        let mut cursor = 0;
        for patch in sorted {
            if patch.span.start > cursor {
                out.push_str(&source[cursor..patch.span.start]);
            }
            out.push_str(&patch.new_text);
            cursor = patch.span.end;
        }
        if cursor < source.len() {
            out.push_str(&source[cursor..]);
        }
        out
    }
}

fn render_word(letter: char, value: f64, format: &NumberFormat) -> String {
    format!("{letter}{}", format.render(value))
}

/// Rewrite the X/Y words of a linear move.
///
/// Every existing word for an emitted axis is replaced (keeping the letter's
/// case). An emitted axis with no word in the line is inserted next to its
/// sibling: a new `X` goes before the first `Y`, a new `Y` goes after the last
/// `X`. Axes not emitted are left untouched.
pub fn rewrite_motion(
    line: &ParsedLine<'_>,
    values: DVec2,
    emit: (bool, bool),
    format: &NumberFormat,
) -> String {
    let mut patches = PatchSet::new();
    let xs: Vec<&Word> = line.words_for('X').collect();
    let ys: Vec<&Word> = line.words_for('Y').collect();

    if emit.0 && xs.is_empty() {
        if let Some(first_y) = ys.first() {
            patches.insert(
                first_y.span.start,
                format!("{} ", render_word('X', values.x, format)),
            );
        }
    }

    for (emitted, words, value) in [(emit.0, &xs, values.x), (emit.1, &ys, values.y)] {
        if !emitted {
            continue;
        }
        for word in words {
            patches.replace(word.span, render_word(word.written_letter, value, format));
        }
    }

    if emit.1 && ys.is_empty() {
        if let Some(last_x) = xs.last() {
            patches.insert(
                last_x.span.end,
                format!(" {}", render_word('Y', values.y, format)),
            );
        }
    }

    patches.apply(line.raw)
}

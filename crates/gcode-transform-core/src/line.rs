//! Line tokenizer.
//!
//! A line is split into its code part and an optional `;` comment. The code
//! part is split on whitespace; every token keeps its byte [`Span`] in the
//! original line so a rewrite can touch exactly the bytes it changes.

/// Comment marker; everything from here to the end of the line is kept verbatim.
pub const COMMENT_MARKER: char = ';';

/// Byte span in a source line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Zero-width span, used to insert text.
    pub fn at(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }
}

/// The closed set of commands the transformer distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `G90`
    SetAbsoluteMode,
    /// `G91`
    SetRelativeMode,
    /// `G0`/`G1`
    LinearMove,
    /// `G2`/`G3`. Recognized only so they can be reported; never rewritten.
    ArcMove,
    Other,
}

impl Command {
    /// Classify the first token of a line. Matching is case-insensitive and
    /// tolerates leading zeros (`G01`).
    pub fn from_token(token: &str) -> Self {
        let Some(number) = token.strip_prefix(['G', 'g']) else {
            return Command::Other;
        };
        if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
            return Command::Other;
        }
        match number.parse::<u32>() {
            Ok(0 | 1) => Command::LinearMove,
            Ok(2 | 3) => Command::ArcMove,
            Ok(90) => Command::SetAbsoluteMode,
            Ok(91) => Command::SetRelativeMode,
            _ => Command::Other,
        }
    }

    pub fn is_recognized(self) -> bool {
        self != Command::Other
    }
}

/// A `<letter><number>` token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Word {
    /// Upper-cased letter.
    pub letter: char,
    /// The letter exactly as written, so a rewrite keeps its case.
    pub written_letter: char,
    pub value: f64,
    pub span: Span,
}

/// Letter-to-value mapping in first-seen order. A repeated letter overwrites
/// the earlier value but keeps its position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    entries: Vec<(char, f64)>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, letter: char, value: f64) {
        let letter = letter.to_ascii_uppercase();
        match self.entries.iter_mut().find(|(l, _)| *l == letter) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((letter, value)),
        }
    }

    pub fn get(&self, letter: char) -> Option<f64> {
        let letter = letter.to_ascii_uppercase();
        self.entries
            .iter()
            .find(|(l, _)| *l == letter)
            .map(|&(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One tokenized input line.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine<'a> {
    /// The line as read, comment included, terminator excluded.
    pub raw: &'a str,
    pub command: Command,
    pub parameters: Parameters,
    /// Every word token in line order, duplicates included.
    pub words: Vec<Word>,
    /// Span of the comment, marker included.
    pub comment: Option<Span>,
}

impl<'a> ParsedLine<'a> {
    pub fn parse(raw: &'a str) -> Self {
        let (code_end, comment) = match raw.find(COMMENT_MARKER) {
            Some(idx) => (idx, Some(Span::new(idx, raw.len()))),
            None => (raw.len(), None),
        };

        let mut tokens = split_tokens(&raw[..code_end]).into_iter();
        let command = tokens
            .next()
            .map(|(_, token)| Command::from_token(token))
            .unwrap_or(Command::Other);

        let mut parameters = Parameters::new();
        let mut words = Vec::new();
        if command.is_recognized() {
            for (span, token) in tokens {
                // Anything that is not a clean word stays an opaque token.
                let Some((written_letter, value)) = parse_word(token) else {
                    continue;
                };
                let letter = written_letter.to_ascii_uppercase();
                parameters.insert(letter, value);
                words.push(Word {
                    letter,
                    written_letter,
                    value,
                    span,
                });
            }
        }

        Self {
            raw,
            command,
            parameters,
            words,
            comment,
        }
    }

    pub fn comment_text(&self) -> Option<&'a str> {
        self.comment.map(|span| &self.raw[span.start..span.end])
    }

    /// All word tokens carrying `letter` (upper-case).
    pub fn words_for(&self, letter: char) -> impl Iterator<Item = &Word> + '_ {
        self.words.iter().filter(move |w| w.letter == letter)
    }
}

fn split_tokens(code: &str) -> Vec<(Span, &str)> {
    let mut tokens = Vec::new();
    let mut start = None;
    for (i, ch) in code.char_indices() {
        if ch.is_whitespace() {
            if let Some(s) = start.take() {
                tokens.push((Span::new(s, i), &code[s..i]));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        tokens.push((Span::new(s, code.len()), &code[s..]));
    }
    tokens
}

/// Split `<letter><number>` into its parts. Returns the letter as written.
pub fn parse_word(token: &str) -> Option<(char, f64)> {
    let mut chars = token.chars();
    let letter = chars.next().filter(char::is_ascii_alphabetic)?;
    let value = parse_strict_number(chars.as_str())?;
    Some((letter, value))
}

/// Optional sign, digits with at most one decimal point, at least one digit.
/// No exponents, no `inf`/`nan`.
fn parse_strict_number(text: &str) -> Option<f64> {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    let mut seen_digit = false;
    let mut seen_dot = false;
    for b in digits.bytes() {
        match b {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => return None,
        }
    }
    if !seen_digit {
        return None;
    }
    text.parse().ok()
}

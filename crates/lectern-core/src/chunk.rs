//! Paragraph- and sentence-boundary passage chunker.
//!
//! Splits extracted document text into passages that respect a
//! configurable `max_words` budget. Paragraphs are kept whole whenever they
//! fit; only paragraphs that are themselves over budget are broken down
//! further, and then only at sentence boundaries.
//!
//! # Algorithm
//!
//! 1. Split text into paragraphs on blank lines. Blank or whitespace-only
//!    paragraphs are skipped.
//! 2. A paragraph within the budget is one piece. A paragraph over the
//!    budget is split into sentences (`.`, `!` and `?` all terminate a
//!    sentence) and each sentence is one piece.
//! 3. Pieces are packed greedily: if appending a piece would push the
//!    current passage past `max_words` (and the passage is not empty), the
//!    passage is sealed and a new one starts with the piece.
//! 4. The last passage is emitted if non-empty.
//!
//! A sentence longer than the budget is never split; it becomes (part of)
//! a passage that exceeds `max_words`. Sentences glued together without a
//! space (`point.Next`) are still separated, and rejoined with a space.
//!
//! # Example
//!
//! ```rust
//! use lectern_core::chunk::chunk_text;
//!
//! let passages = chunk_text("Hello world.\n\nSecond paragraph.", 300);
//! assert_eq!(passages, vec!["Hello world. Second paragraph.".to_string()]);
//! ```

/// Default word budget per passage.
pub const DEFAULT_MAX_WORDS: usize = 300;

/// Split `text` into passages of at most `max_words` words where possible.
///
/// Pieces inside a passage are joined with a single space. No returned
/// passage is empty, and every non-whitespace character of `text` appears
/// exactly once, in order, across the returned passages.
pub fn chunk_text(text: &str, max_words: usize) -> Vec<String> {
    let mut packer = Packer::new(max_words);

    for paragraph in split_paragraphs(text) {
        let words = word_count(&paragraph);
        if words > max_words {
            for sentence in split_sentences(&paragraph) {
                packer.push(sentence, word_count(sentence));
            }
        } else {
            packer.push(&paragraph, words);
        }
    }

    packer.finish()
}

/// Number of whitespace-separated words in `s`.
pub fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

/// Greedy accumulator implementing the fits/overflow rule.
struct Packer {
    max_words: usize,
    current: String,
    current_words: usize,
    passages: Vec<String>,
}

impl Packer {
    fn new(max_words: usize) -> Self {
        Self {
            max_words,
            current: String::new(),
            current_words: 0,
            passages: Vec::new(),
        }
    }

    fn push(&mut self, piece: &str, words: usize) {
        if self.current_words + words > self.max_words && !self.current.is_empty() {
            self.seal();
        }
        if !self.current.is_empty() {
            self.current.push(' ');
        }
        self.current.push_str(piece);
        self.current_words += words;
    }

    fn seal(&mut self) {
        self.passages.push(std::mem::take(&mut self.current));
        self.current_words = 0;
    }

    fn finish(mut self) -> Vec<String> {
        if !self.current.is_empty() {
            self.seal();
        }
        self.passages
    }
}

/// Split text into trimmed, non-empty paragraphs separated by blank lines.
///
/// A line containing only whitespace counts as blank, so `\r\n` input and
/// lines padded with spaces by PDF extraction split the same way as `\n\n`.
fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut lines: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            flush_paragraph(&mut lines, &mut paragraphs);
        } else {
            lines.push(line);
        }
    }
    flush_paragraph(&mut lines, &mut paragraphs);

    paragraphs
}

fn flush_paragraph(lines: &mut Vec<&str>, paragraphs: &mut Vec<String>) {
    if lines.is_empty() {
        return;
    }
    let paragraph = lines.join("\n");
    let trimmed = paragraph.trim();
    if !trimmed.is_empty() {
        paragraphs.push(trimmed.to_string());
    }
    lines.clear();
}

/// Split a paragraph into sentences, keeping each terminator with its
/// sentence.
///
/// A run of terminators (`?!`, `...`) closes a sentence when followed by
/// whitespace or the end of the paragraph. PDF extraction often drops the
/// space between sentences, so a run between a lowercase letter and an
/// uppercase one (`point.Next`) closes a sentence too. `3.14`, `e.g.x` and
/// `U.S.A` stay in one piece.
fn split_sentences(paragraph: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = paragraph.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !is_terminator(c) {
            continue;
        }
        let mut end = i + c.len_utf8();
        while let Some(&(j, next)) = chars.peek() {
            if !is_terminator(next) {
                break;
            }
            end = j + next.len_utf8();
            chars.next();
        }
        let at_boundary = match chars.peek() {
            Some(&(_, next)) => {
                next.is_whitespace()
                    || (next.is_uppercase()
                        && paragraph[..i]
                            .chars()
                            .next_back()
                            .is_some_and(char::is_lowercase))
            }
            None => true,
        };
        if at_boundary {
            push_sentence(&paragraph[start..end], &mut sentences);
            start = end;
        }
    }
    push_sentence(&paragraph[start..], &mut sentences);

    sentences
}

fn push_sentence<'a>(raw: &'a str, sentences: &mut Vec<&'a str>) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed);
    }
}

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

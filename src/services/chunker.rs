//! Paragraph-aware text chunking
//!
//! Splits lesson text on blank lines and greedily packs paragraphs into
//! chunks near `target_size` characters. A short trailing paragraph is
//! repeated at the start of the next chunk so neighbouring chunks share
//! context. Paragraphs longer than 1.5x the target are re-split on sentence
//! boundaries and packed the same way.

use crate::domain::models::ChunkingConfig;

const PARAGRAPH_SEPARATOR: &str = "\n\n";
const SENTENCE_SEPARATOR: &str = " ";

/// Splits text into overlapping, size-bounded chunks
///
/// Pure function of its input and configuration. The configuration is not
/// validated here; `ConfigLoader::validate` rejects `overlap >= target_size`.
#[derive(Debug, Clone, Default)]
pub struct TextChunker {
    config: ChunkingConfig,
}

impl TextChunker {
    pub fn new(config: ChunkingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Chunk `text` into an ordered sequence of non-empty chunks.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut packer = Packer::new(&self.config, PARAGRAPH_SEPARATOR);

        for paragraph in split_paragraphs(text) {
            if self.is_oversized(&paragraph) {
                packer.flush(&mut chunks);
                self.chunk_sentences(&paragraph, &mut chunks);
            } else {
                packer.push(paragraph, &mut chunks);
            }
        }
        packer.flush(&mut chunks);

        chunks
    }

    fn is_oversized(&self, paragraph: &str) -> bool {
        char_len(paragraph).saturating_mul(2) > self.config.target_size.saturating_mul(3)
    }

    fn chunk_sentences(&self, paragraph: &str, out: &mut Vec<String>) {
        let mut packer = Packer::new(&self.config, SENTENCE_SEPARATOR);
        for sentence in split_sentences(paragraph) {
            if char_len(&sentence) > self.config.target_size {
                for piece in hard_split(&sentence, self.config.target_size) {
                    packer.push(piece, out);
                }
            } else {
                packer.push(sentence, out);
            }
        }
        packer.flush(out);
    }
}

/// Greedy accumulator shared by the paragraph and sentence passes.
struct Packer<'a> {
    config: &'a ChunkingConfig,
    separator: &'static str,
    parts: Vec<String>,
    len: usize,
}

impl<'a> Packer<'a> {
    fn new(config: &'a ChunkingConfig, separator: &'static str) -> Self {
        Self {
            config,
            separator,
            parts: Vec::new(),
            len: 0,
        }
    }

    fn push(&mut self, unit: String, out: &mut Vec<String>) {
        let unit_len = char_len(&unit);
        if !self.parts.is_empty() && self.len + self.separator.len() + unit_len > self.config.target_size {
            let carry = self
                .parts
                .last()
                .filter(|last| char_len(last) < self.config.overlap)
                .cloned();
            self.flush(out);
            if let Some(carry) = carry {
                self.len = char_len(&carry);
                self.parts.push(carry);
            }
        }

        if !self.parts.is_empty() {
            self.len += self.separator.len();
        }
        self.len += unit_len;
        self.parts.push(unit);
    }

    /// Emit whatever is pending without carrying anything forward.
    fn flush(&mut self, out: &mut Vec<String>) {
        if !self.parts.is_empty() {
            out.push(self.parts.join(self.separator));
        }
        self.parts.clear();
        self.len = 0;
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Blank-line separated paragraphs, trimmed, empties dropped.
fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut lines: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            push_paragraph(&mut paragraphs, &lines);
            lines.clear();
        } else {
            lines.push(line.trim_end());
        }
    }
    push_paragraph(&mut paragraphs, &lines);

    paragraphs
}

fn push_paragraph(paragraphs: &mut Vec<String>, lines: &[&str]) {
    let paragraph = lines.join("\n");
    let paragraph = paragraph.trim();
    if !paragraph.is_empty() {
        paragraphs.push(paragraph.to_string());
    }
}

/// Split on ". ", restoring the period the split consumed.
fn split_sentences(paragraph: &str) -> Vec<String> {
    let pieces: Vec<&str> = paragraph.split(". ").collect();
    let last = pieces.len().saturating_sub(1);

    pieces
        .iter()
        .enumerate()
        .filter_map(|(i, piece)| {
            let piece = piece.trim();
            if piece.is_empty() {
                None
            } else if i < last {
                Some(format!("{piece}."))
            } else {
                Some(piece.to_string())
            }
        })
        .collect()
}

/// Cut text into windows of at most `max` characters, preferring to break
/// on whitespace.
fn hard_split(text: &str, max: usize) -> Vec<String> {
    let max = max.max(1);
    let mut pieces = Vec::new();
    let mut rest = text.trim();

    while char_len(rest) > max {
        let cut = rest
            .char_indices()
            .nth(max)
            .map_or(rest.len(), |(i, _)| i);
        let split_at = rest[..cut]
            .rfind(char::is_whitespace)
            .filter(|&i| i > 0)
            .unwrap_or(cut);

        let piece = rest[..split_at].trim_end();
        if !piece.is_empty() {
            pieces.push(piece.to_string());
        }
        rest = rest[split_at..].trim_start();
    }

    if !rest.is_empty() {
        pieces.push(rest.to_string());
    }
    pieces
}

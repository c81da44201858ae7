//! Anchor identifiers for headings.
//!
//! Base slugs come from the `slug` crate, with Chinese text transliterated via
//! `pinyin` first so a heading like “基线对齐” anchors as `ji-xian-dui-qi`
//! rather than collapsing to nothing.

use std::collections::HashSet;

use pinyin::{Pinyin, ToPinyin};
use slug::slugify;
use thiserror::Error;

/// Errors that can occur while deriving a slug.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug source text is empty")]
    EmptyInput,
    #[error("failed to derive slug from `{input}`")]
    Unrepresentable { input: String },
}

/// Derive a base slug: lowercase, runs of non-alphanumerics become one hyphen,
/// no leading or trailing hyphens.
pub fn derive_slug(input: &str) -> Result<String, SlugError> {
    if input.trim().is_empty() {
        return Err(SlugError::EmptyInput);
    }

    let candidate = slugify(transliterate_to_ascii(input));
    if candidate.is_empty() {
        return Err(SlugError::Unrepresentable {
            input: input.to_string(),
        });
    }

    Ok(candidate)
}

/// Assigns unique anchors to the headings of one indexing pass.
///
/// A single counter serves both fallbacks: headings without usable text become
/// `heading-<n>`, and collisions become `<slug>-<n>`. The counter only grows,
/// so no suffix is handed out twice in a pass.
#[derive(Debug, Default)]
pub struct HeadingSlugger {
    assigned: HashSet<String>,
    counter: usize,
}

impl HeadingSlugger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn anchor_for(&mut self, heading: &str) -> String {
        let anchor = match derive_slug(heading) {
            Ok(base) if !self.assigned.contains(&base) => base,
            Ok(base) => self.next_free(|n| format!("{base}-{n}")),
            Err(_) => self.next_free(|n| format!("heading-{n}")),
        };
        self.assigned.insert(anchor.clone());
        anchor
    }

    fn next_free(&mut self, candidate: impl Fn(usize) -> String) -> String {
        loop {
            self.counter += 1;
            let anchor = candidate(self.counter);
            if !self.assigned.contains(&anchor) {
                return anchor;
            }
        }
    }
}

fn transliterate_to_ascii(input: &str) -> String {
    let mut output = String::with_capacity(input.len());

    for ch in input.chars() {
        if ch.is_ascii() {
            output.push(ch);
        } else if let Some(py) = ch.to_pinyin() {
            push_syllable(&mut output, py);
        } else if ch.is_whitespace() {
            output.push(' ');
        } else {
            // slugify folds or drops whatever is left
            output.push(ch);
        }
    }

    output
}

fn push_syllable(buffer: &mut String, pinyin: Pinyin) {
    if !buffer.is_empty() && !buffer.ends_with(' ') {
        buffer.push(' ');
    }
    buffer.push_str(pinyin.plain());
}

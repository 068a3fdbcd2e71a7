//! Word-level diff between the draft and the rewritten text.
//!
//! This is a display aid, not a minimal edit script: a greedy walk with a
//! short lookahead window, which is enough to highlight what the rewrite
//! touched.

use crate::types::{DiffHunk, HunkKind};

/// How far ahead the walk looks for a resynchronizing token.
const LOOKAHEAD: usize = 3;

/// A run of whitespace or a run of non-whitespace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub is_whitespace: bool,
    /// Byte offsets into the source string.
    pub start: usize,
    pub end: usize,
}

pub fn tokenize(s: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut current: Option<bool> = None;

    for (idx, ch) in s.char_indices() {
        let ws = ch.is_whitespace();
        match current {
            Some(prev) if prev == ws => {}
            Some(prev) => {
                tokens.push(Token {
                    text: &s[start..idx],
                    is_whitespace: prev,
                    start,
                    end: idx,
                });
                start = idx;
                current = Some(ws);
            }
            None => current = Some(ws),
        }
    }
    if let Some(ws) = current {
        tokens.push(Token {
            text: &s[start..],
            is_whitespace: ws,
            start,
            end: s.len(),
        });
    }
    tokens
}

/// Hunks describing where `refined` differs from `original`.
///
/// Empty when the texts are equal, and never empty when they differ.
pub fn compute_diff(original: &str, refined: &str) -> Vec<DiffHunk> {
    if original == refined {
        return Vec::new();
    }

    let a = tokenize(original);
    let b = tokenize(refined);
    let mut hunks = Vec::new();
    let (mut i, mut j) = (0, 0);

    loop {
        while i < a.len() && j < b.len() && a[i].text == b[j].text {
            i += 1;
            j += 1;
        }
        if i >= a.len() && j >= b.len() {
            break;
        }

        let mut deleted = deletion_run(&a, &b, i, j);
        let mut inserted = deletion_run(&b, &a, j, i);
        if deleted == 0 && inserted == 0 {
            // Both heads reappear inside the window: a local transposition.
            deleted = usize::from(i < a.len());
            inserted = usize::from(j < b.len());
        }

        hunks.push(DiffHunk {
            kind: HunkKind::Change,
            original_span: i..i + deleted,
            refined_span: j..j + inserted,
            original_text: join(&a[i..i + deleted]),
            refined_text: join(&b[j..j + inserted]),
        });
        i += deleted;
        j += inserted;
    }

    hunks
}

/// Tokens of `from` starting at `i` that do not appear in the lookahead
/// window of `to` starting at `j`. Insertions are the same walk mirrored.
fn deletion_run(from: &[Token<'_>], to: &[Token<'_>], i: usize, j: usize) -> usize {
    let window = &to[j.min(to.len())..(j + LOOKAHEAD).min(to.len())];
    from[i.min(from.len())..]
        .iter()
        .take_while(|token| !window.iter().any(|w| w.text == token.text))
        .count()
}

fn join(tokens: &[Token<'_>]) -> String {
    tokens.iter().map(|t| t.text).collect()
}

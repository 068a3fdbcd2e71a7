//! Conversation context harvesting.
//!
//! Scans the page for message-like elements, classifies who wrote each one,
//! orders them chronologically and keeps as many as fit in the token budget.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::classify::Classifier;
use crate::config::{RedraftConfig, SelectorTables, ordered_groups};
use crate::extract::{clean, estimate_tokens, rendered_text};
use crate::host::{HostDocument, HostElement};
use crate::types::{ConversationMessage, Sender};

const FALLBACK_SELECTOR: &str = "div, li, article, section";
const FALLBACK_CLASS_HINTS: &[&str] = &["message", "chat", "conversation", "msg"];
const MEDIA_TAGS: &[&str] = &["img", "picture", "video", "svg", "canvas", "figure"];
const PREVIEW_CHARS: usize = 200;

struct Candidate<E> {
    element: E,
    text: String,
    timestamp: Option<i64>,
}

/// Conversation messages visible on the page, oldest first, within `budget`
/// estimated tokens.
pub fn harvest<D: HostDocument>(
    document: &D,
    classifier: &Classifier,
    config: &RedraftConfig,
    budget: usize,
) -> Vec<ConversationMessage> {
    let tables = &config.tables;
    let mut candidates = collect_candidates(document, classifier, config);
    if candidates.is_empty() {
        tracing::debug!(target: "redraft::harvest", "no selector matches, scanning blocks");
        candidates = collect_fallback(document, classifier, config);
    }

    let ordered = chronological(candidates);
    let current_user = current_user(document, tables);

    let mut messages = Vec::new();
    let mut used = 0;
    for candidate in ordered {
        let tokens = estimate_tokens(&candidate.text);
        if used + tokens > budget {
            tracing::debug!(target: "redraft::harvest", used, tokens, budget, "budget reached");
            break;
        }
        used += tokens;

        let sender = authorship(&candidate.element, tables, current_user.as_deref());
        tracing::debug!(
            target: "redraft::harvest",
            sender = sender.label(),
            tokens,
            timestamp = ?candidate.timestamp,
            preview = %preview(&candidate.text),
            "included"
        );
        messages.push(ConversationMessage {
            text: candidate.text,
            sender,
            timestamp: candidate.timestamp,
        });
    }

    tracing::debug!(target: "redraft::harvest", count = messages.len(), tokens = used, "harvest done");
    messages
}

fn collect_candidates<D: HostDocument>(
    document: &D,
    classifier: &Classifier,
    config: &RedraftConfig,
) -> Vec<Candidate<D::Element>> {
    let tables = &config.tables;
    let hostname = document.hostname();
    let mut visited: Vec<D::Element> = Vec::new();
    let mut accepted: Vec<Candidate<D::Element>> = Vec::new();
    let mut seen = HashSet::new();

    for group in ordered_groups(&tables.message_groups, &hostname) {
        for selector in &group.selectors {
            for node in document.query_selector_all(selector) {
                if visited.iter().any(|v| v.same_node(&node)) {
                    continue;
                }
                visited.push(node.clone());

                let overlaps = accepted
                    .iter()
                    .any(|c| c.element.contains(&node) || node.contains(&c.element));
                if overlaps || is_editable(classifier, &node) || is_media(&node, tables) {
                    continue;
                }

                let text = clean(&message_text(&node, tables));
                if text.chars().count() < config.min_message_chars || !seen.insert(text.clone()) {
                    continue;
                }
                tracing::trace!(target: "redraft::harvest", selector = %selector, chars = text.len(), "candidate");
                accepted.push(Candidate {
                    timestamp: timestamp(&node, tables),
                    element: node,
                    text,
                });
            }
        }
    }
    accepted
}

/// Block elements that look like messages by class or role. Only the
/// innermost of nested matches is kept.
fn collect_fallback<D: HostDocument>(
    document: &D,
    classifier: &Classifier,
    config: &RedraftConfig,
) -> Vec<Candidate<D::Element>> {
    let tables = &config.tables;
    let blocks: Vec<(D::Element, String)> = document
        .query_selector_all(FALLBACK_SELECTOR)
        .into_iter()
        .filter(|node| looks_like_message(node))
        .filter(|node| !is_editable(classifier, node) && !is_media(node, tables))
        .filter_map(|node| {
            let raw = rendered_text(&node);
            let raw = raw.trim();
            let len = raw.chars().count();
            (len > config.fallback_min_chars
                && len < config.fallback_max_chars
                && !raw.contains("\n\n\n"))
            .then(|| (node, raw.to_string()))
        })
        .collect();

    let mut seen = HashSet::new();
    let mut accepted = Vec::new();
    for (idx, (node, raw)) in blocks.iter().enumerate() {
        let has_inner = blocks
            .iter()
            .enumerate()
            .any(|(other, (inner, _))| other != idx && node.contains(inner));
        if has_inner {
            continue;
        }
        let text = clean(raw);
        if text.chars().count() < config.min_message_chars || !seen.insert(text.clone()) {
            continue;
        }
        accepted.push(Candidate {
            element: node.clone(),
            timestamp: timestamp(node, tables),
            text,
        });
    }
    accepted
}

fn looks_like_message<E: HostElement>(node: &E) -> bool {
    let class_name = node.class_name().to_ascii_lowercase();
    FALLBACK_CLASS_HINTS.iter().any(|hint| class_name.contains(hint))
        || node
            .attribute("role")
            .is_some_and(|role| role == "listitem" || role == "article")
}

fn is_editable<E: HostElement>(classifier: &Classifier, node: &E) -> bool {
    node.is_content_editable() || classifier.classify(node).is_some()
}

/// Visual-only elements: media class names, image roles and markers, and
/// media tags without text.
fn is_media<E: HostElement>(node: &E, tables: &SelectorTables) -> bool {
    let class_name = node.class_name().to_ascii_lowercase();
    let media_class = class_name
        .split_whitespace()
        .flat_map(|token| token.split(['-', '_']))
        .any(|part| {
            tables
                .media_class_signatures
                .iter()
                .any(|sig| part == sig.as_str() || part.strip_suffix('s') == Some(sig.as_str()))
        });
    if media_class {
        return true;
    }

    if node.attribute("role").as_deref() == Some("img") {
        return true;
    }
    let test_id = node.attribute("data-testid").unwrap_or_default().to_ascii_lowercase();
    if test_id.contains("image") || test_id.contains("photo") {
        return true;
    }

    MEDIA_TAGS.contains(&node.tag_name().as_str()) && clean(&rendered_text(node)).is_empty()
}

fn message_text<E: HostElement>(node: &E, tables: &SelectorTables) -> String {
    tables
        .message_text_selectors
        .iter()
        .find_map(|selector| node.query_selector(selector))
        .map(|inner| rendered_text(&inner))
        .unwrap_or_else(|| rendered_text(node))
}

fn timestamp<E: HostElement>(node: &E, tables: &SelectorTables) -> Option<i64> {
    let element = tables
        .timestamp_selectors
        .iter()
        .find_map(|selector| node.query_selector(selector))?;
    let raw = element
        .attribute("datetime")
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| rendered_text(&element));
    parse_timestamp(&raw)
}

/// RFC 3339, ISO date-time or date, or epoch milliseconds.
pub fn parse_timestamp(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp_millis());
    }
    if raw.len() >= 10 && raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw.parse().ok();
    }
    None
}

/// Document order, then timestamped messages re-sorted among the slots they
/// occupy. Untimestamped messages keep their place.
fn chronological<E: HostElement>(mut candidates: Vec<Candidate<E>>) -> Vec<Candidate<E>> {
    candidates.sort_by(|a, b| {
        if a.element.same_node(&b.element) {
            std::cmp::Ordering::Equal
        } else if a.element.precedes(&b.element) {
            std::cmp::Ordering::Less
        } else {
            std::cmp::Ordering::Greater
        }
    });

    let slots: Vec<usize> = candidates
        .iter()
        .enumerate()
        .filter_map(|(idx, c)| c.timestamp.map(|_| idx))
        .collect();
    let mut by_time = slots.clone();
    by_time.sort_by_key(|&idx| candidates[idx].timestamp);

    let mut taken: Vec<Option<Candidate<E>>> = candidates.into_iter().map(Some).collect();
    let mut placement: Vec<usize> = (0..taken.len()).collect();
    for (slot, source) in slots.iter().zip(by_time) {
        placement[*slot] = source;
    }
    placement
        .into_iter()
        .filter_map(|source| taken[source].take())
        .collect()
}

/// Self if any authorship signal fires, else Other.
fn authorship<E: HostElement>(
    node: &E,
    tables: &SelectorTables,
    current_user: Option<&str>,
) -> Sender {
    if let Some(indicator) = tables
        .self_indicators
        .iter()
        .find(|indicator| node.closest(indicator).is_some())
    {
        tracing::trace!(target: "redraft::harvest", %indicator, "self via indicator");
        return Sender::Myself;
    }

    if tables
        .edit_affordances
        .iter()
        .any(|selector| node.query_selector(selector).is_some())
    {
        tracing::trace!(target: "redraft::harvest", "self via edit affordance");
        return Sender::Myself;
    }

    if let Some(user) = current_user {
        let author = node.attribute("data-author").or_else(|| {
            tables
                .author_selectors
                .iter()
                .find_map(|selector| node.query_selector(selector))
                .map(|el| el.attribute("data-author").unwrap_or_else(|| clean(&rendered_text(&el))))
        });
        if author.is_some_and(|author| author.trim().eq_ignore_ascii_case(user)) {
            tracing::trace!(target: "redraft::harvest", "self via author name");
            return Sender::Myself;
        }
    }

    if node.layout_hints().is_right_aligned() {
        tracing::trace!(target: "redraft::harvest", "self via alignment");
        return Sender::Myself;
    }

    Sender::Other
}

/// Display name of the signed-in user, when the page exposes it.
fn current_user<D: HostDocument>(document: &D, tables: &SelectorTables) -> Option<String> {
    tables
        .current_user_selectors
        .iter()
        .flat_map(|selector| document.query_selector_all(selector))
        .find_map(|el| {
            el.attribute("data-current-user")
                .or_else(|| el.attribute("content"))
                .filter(|v| !v.trim().is_empty())
                .or_else(|| Some(clean(&rendered_text(&el))))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        })
}

fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        return text.to_string();
    }
    let mut out: String = text.chars().take(PREVIEW_CHARS).collect();
    out.push('…');
    out
}

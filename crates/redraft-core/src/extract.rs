//! Reading text out of surfaces and page elements.

use std::sync::LazyLock;

use regex_lite::Regex;

use crate::host::HostElement;
use crate::types::{EditableSurface, SurfaceKind};

/// Lines shorter than this made only of symbols and digits are noise.
const SHORT_NOISE_LINE: usize = 8;

/// Boilerplate prefixes, each followed by a separator.
static PREFIX_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^(?i)edited\s*[·•|:\-]\s*",
        r"^(?i)replying to\s+@?\S+\s*[·•|:\-]\s*",
        r"^(?i)(sent|delivered|seen|read)\s*[·•|]\s*",
        r"^(?i)(pinned|forwarded)\s*[·•|:\-]\s*",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Whole lines that carry no message content.
static BOILERPLATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?i)(",
        r"\d[\d.,]*\s*[km]?\s+(likes?|replies|reply|comments?|reposts?|retweets?|shares?|views?|reactions?)",
        r"|loading(\.\.\.|…)?",
        r"|reply|like|share|edited|show more|show less|see more|see less|more|retweet|repost",
        r"|copy link|view replies|hide replies",
        r")$",
    ))
    .unwrap()
});

/// Current text of a surface as the user sees it.
///
/// Form controls return their value untouched. Editable regions are read
/// through their rendered text and cleaned.
pub fn extract_text<E: HostElement>(surface: &EditableSurface<E>) -> String {
    let raw = read_raw(&surface.element, &surface.kind);
    match surface.kind {
        SurfaceKind::PlainControl => raw,
        SurfaceKind::ContentEditable | SurfaceKind::FrameworkEditor(_) => clean(&raw),
    }
}

/// Same read as [`extract_text`] without cleaning, used to verify writes.
pub fn read_raw<E: HostElement>(element: &E, kind: &SurfaceKind) -> String {
    match kind {
        SurfaceKind::PlainControl => element.value().unwrap_or_default(),
        SurfaceKind::ContentEditable | SurfaceKind::FrameworkEditor(_) => rendered_text(element),
    }
}

/// `innerText`, falling back to `textContent` when it is missing or empty.
pub fn rendered_text<E: HostElement>(element: &E) -> String {
    element
        .inner_text()
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| element.text_content())
}

/// Strips page chrome and noise from extracted text.
///
/// Idempotent. A line with content is only ever shortened by removing a
/// boilerplate prefix that ends in a separator.
pub fn clean(s: &str) -> String {
    let normalized = s
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\u{a0}', " ");

    let mut lines: Vec<String> = Vec::new();
    for line in normalized.split('\n') {
        let line = strip_prefixes(&collapse_line(line));
        if line.is_empty() {
            lines.push(line);
            continue;
        }
        if BOILERPLATE_RE.is_match(&line) || is_short_noise(&line) {
            continue;
        }
        lines.push(line);
    }

    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    for line in lines {
        if line.is_empty() && out.last().is_none_or(|prev| prev.is_empty()) {
            continue;
        }
        out.push(line);
    }
    while out.last().is_some_and(|line| line.is_empty()) {
        out.pop();
    }
    out.join("\n")
}

fn collapse_line(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_prefixes(line: &str) -> String {
    let mut current = line.to_string();
    loop {
        let stripped = PREFIX_RES
            .iter()
            .find_map(|re| re.find(&current).map(|m| current[m.end()..].trim().to_string()));
        match stripped {
            Some(rest) if rest != current => current = rest,
            _ => return current,
        }
    }
}

fn is_short_noise(line: &str) -> bool {
    line.chars().count() < SHORT_NOISE_LINE && !line.chars().any(char::is_alphabetic)
}

/// All whitespace runs to a single space, trimmed.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Rough token count: one token per four characters.
pub fn estimate_tokens(s: &str) -> usize {
    s.chars().count().div_ceil(4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockDocument;

    #[test]
    fn test_clean_line_endings_and_spaces() {
        assert_eq!(clean("a\r\nb\rc"), "a\nb\nc");
        assert_eq!(clean("  hello\u{a0}\u{a0}  world\t!  "), "hello world !");
    }

    #[test]
    fn test_clean_strips_prefixes_repeatedly() {
        assert_eq!(
            clean("Edited · Replying to @sam · sounds good to me"),
            "sounds good to me"
        );
        assert_eq!(clean("Edited · "), "");
    }

    #[test]
    fn test_clean_drops_boilerplate_lines() {
        let input = "Great idea!\n12 likes\nReply\nShow more\nLoading…\n1.2K views";
        assert_eq!(clean(input), "Great idea!");
    }

    #[test]
    fn test_clean_keeps_content_lines_intact() {
        // Boilerplate words inside content are left alone.
        let input = "I like this reply a lot\nShare it with the team";
        assert_eq!(clean(input), input);
    }

    #[test]
    fn test_clean_short_symbol_lines() {
        assert_eq!(clean("see you\n12:30\n·\n--\nok"), "see you\nok");
        // Long digit runs are content.
        assert_eq!(clean("123 456 7890"), "123 456 7890");
    }

    #[test]
    fn test_clean_blank_runs() {
        assert_eq!(clean("\n\n a \n\n\n\n b \n\n"), "a\n\nb");
        assert_eq!(clean("a\n\nLike\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_clean_is_idempotent() {
        let samples = [
            "",
            "hello",
            "  Edited ·   Replying to @x · ok then \r\n\r\n\r\n3 replies\nLike\n",
            "· \n a\u{a0}b \n\n\n\nShow more\n\n c ",
            "Edited · Edited · \n\nfoo",
            "12\nLoading...\n\n\n42 Likes\nreal text\n\n",
        ];
        for sample in samples {
            let once = clean(sample);
            assert_eq!(clean(&once), once, "input: {sample:?}");
        }
    }

    #[test]
    fn test_normalize_and_estimate() {
        assert_eq!(normalize_whitespace("  a \n\t b  "), "a b");
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }

    #[test]
    fn test_extract_by_kind() {
        let doc = MockDocument::new("example.com");
        let area = doc.body().child("textarea").with_value("  raw\u{a0}value  ");
        let editor = doc
            .body()
            .child("div")
            .attr("contenteditable", "true")
            .text("  Edited · draft  text ");

        let plain = EditableSurface::new(area, SurfaceKind::PlainControl);
        assert_eq!(extract_text(&plain), "  raw\u{a0}value  ");

        let rich = EditableSurface::new(editor.clone(), SurfaceKind::ContentEditable);
        assert_eq!(extract_text(&rich), "draft text");
        assert_eq!(
            read_raw(&editor, &SurfaceKind::ContentEditable),
            "  Edited · draft  text "
        );
    }
}

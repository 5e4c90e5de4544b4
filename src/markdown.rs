use std::sync::LazyLock;

use regex::Regex;

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap());
static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h([1-6])[^>]*>(.*?)</h[1-6]>").unwrap());
static PARA_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<p[^>]*>(.*?)</p>").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Best-effort HTML → Markdown conversion: title, headings and paragraphs
/// only, emitted in a fixed order with a source attribution footer.
///
/// Never fails; empty input yields an empty string. Output is byte-identical
/// for identical inputs.
pub fn to_markdown(html: &str, source_url: &str) -> String {
    if html.is_empty() {
        return String::new();
    }

    let mut md = format!("# Content from {}\n\n", source_url);

    if let Some(caps) = TITLE_RE.captures(html) {
        md.push_str(&format!("## {}\n\n", strip_tags(&caps[1]).trim()));
    }

    for caps in HEADING_RE.captures_iter(html) {
        let level: usize = caps[1].parse().unwrap_or(1);
        let text = strip_tags(&caps[2]);
        md.push_str(&format!("{} {}\n\n", "#".repeat(level), text.trim()));
    }

    for caps in PARA_RE.captures_iter(html) {
        let text = strip_tags(&caps[1]);
        let text = text.trim();
        if !text.is_empty() {
            md.push_str(&format!("{}\n\n", text));
        }
    }

    md.push_str(&format!("\n---\n*Content scraped from: {}*", source_url));
    md
}

fn strip_tags(fragment: &str) -> String {
    TAG_RE.replace_all(fragment, "").to_string()
}

// ── Tests ──

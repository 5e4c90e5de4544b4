use std::sync::LazyLock;

use regex::Regex;

static STYLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style[^>]*>(.*?)</style>").unwrap());
static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script([^>]*)>(.*?)</script>").unwrap());
static SRC_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bsrc\s*=").unwrap());

/// Inner text of every inline `<style>` block, trimmed, in document order.
/// Blocks that are empty after trimming are dropped.
pub fn extract_styles(html: &str) -> Vec<String> {
    STYLE_RE
        .captures_iter(html)
        .map(|caps| caps[1].trim().to_string())
        .filter(|block| !block.is_empty())
        .collect()
}

/// Inner text of every inline `<script>` block, trimmed, in document order.
/// A script whose opening tag carries a `src` attribute is external and
/// skipped regardless of body content; empty-after-trim bodies are dropped.
pub fn extract_scripts(html: &str) -> Vec<String> {
    SCRIPT_RE
        .captures_iter(html)
        .filter(|caps| !SRC_ATTR_RE.is_match(&caps[1]))
        .map(|caps| caps[2].trim().to_string())
        .filter(|block| !block.is_empty())
        .collect()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn styles_in_document_order() {
        let html = "<style>a{}</style><div></div><STYLE media=\"print\">b{}</STYLE>";
        assert_eq!(extract_styles(html), vec!["a{}", "b{}"]);
    }

    #[test]
    fn empty_style_block_dropped() {
        let html = "<style>   \n  </style><style>body{color:red}</style>";
        assert_eq!(extract_styles(html), vec!["body{color:red}"]);
    }

    #[test]
    fn no_styles_yields_empty() {
        assert!(extract_styles("<html><body><p>hi</p></body></html>").is_empty());
        assert!(extract_styles("").is_empty());
    }

    #[test]
    fn multiline_style_trimmed() {
        let html = "<style type=\"text/css\">\n  body { margin: 0; }\n</style>";
        assert_eq!(extract_styles(html), vec!["body { margin: 0; }"]);
    }

    #[test]
    fn scripts_in_document_order() {
        let html = "<script>one()</script><p>x</p><script>two()</script><script>three()</script>";
        assert_eq!(extract_scripts(html), vec!["one()", "two()", "three()"]);
    }

    #[test]
    fn external_script_skipped() {
        let html = "<script src=\"/app.js\">ignored()</script><script>kept()</script>";
        assert_eq!(extract_scripts(html), vec!["kept()"]);
    }

    #[test]
    fn src_in_body_does_not_exclude() {
        // Only the opening tag decides whether a script is external.
        let html = "<script>img.src = 'x.png';</script>";
        assert_eq!(extract_scripts(html), vec!["img.src = 'x.png';"]);
    }

    #[test]
    fn case_insensitive_script_tags() {
        let html = "<SCRIPT type=\"module\">run()</SCRIPT>";
        assert_eq!(extract_scripts(html), vec!["run()"]);
    }

    #[test]
    fn empty_script_body_dropped() {
        let html = "<script></script><script>\n\t</script>";
        assert!(extract_scripts(html).is_empty());
    }

    #[test]
    fn fixture_counts() {
        let html = std::fs::read_to_string("tests/fixtures/landing.html").unwrap();
        assert_eq!(extract_styles(&html).len(), 2);
        // Two inline scripts; the external analytics script is excluded.
        assert_eq!(extract_scripts(&html).len(), 2);
    }
}

//! Markup for buffered notices.
//!
//! Three output shapes:
//! - [`notices_fragment`]: bare `<p class="{type}">{message}</p>` runs, for
//!   callers that embed notices in their own layout.
//! - [`admin_markup`]: dismissible notice blocks for administrative pages.
//! - [`frontend_script`]: one `notice_show(...)` call per message inside a
//!   document-ready handler, for the front-end toast widget.
//!
//! Blank messages are skipped everywhere.  Message sanitization is delegated
//! to a [`Sanitize`] implementation supplied by the host.

use std::fmt::Write;
use std::sync::OnceLock;

use regex::Regex;

use nb_domain::notice::NoticeType;

use crate::buffer::NoticeBuffer;

/// Host-supplied message filter applied before block or script output.
pub trait Sanitize: Send + Sync {
    fn sanitize(&self, message: &str) -> String;
}

/// Trusts messages as-is.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThrough;

impl Sanitize for PassThrough {
    fn sanitize(&self, message: &str) -> String {
        message.to_owned()
    }
}

/// Entity-escapes `& < > " '` so messages render as plain text.
#[derive(Debug, Default, Clone, Copy)]
pub struct EscapeHtml;

impl Sanitize for EscapeHtml {
    fn sanitize(&self, message: &str) -> String {
        let mut out = String::with_capacity(message.len());
        for c in message.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#039;"),
                _ => out.push(c),
            }
        }
        out
    }
}

fn octet_regex() -> &'static Regex {
    static OCTET: OnceLock<Regex> = OnceLock::new();
    OCTET.get_or_init(|| Regex::new(r"%[a-fA-F0-9][a-fA-F0-9]").expect("static regex"))
}

/// Reduce a notice type to a CSS-class-safe token: percent-encoded octets
/// are removed, then anything outside `[A-Za-z0-9_-]`.
pub fn css_class(ty: &NoticeType) -> String {
    octet_regex()
        .replace_all(ty.as_str(), "")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Escape a message for a double-quoted JavaScript string literal.
///
/// Backslash-escapes quotes, backslashes and NUL, turns line breaks into
/// escapes, and breaks up `</` so the literal cannot close the script tag.
pub fn js_escape(message: &str) -> String {
    let mut out = String::with_capacity(message.len() + 8);
    let mut prev = '\0';
    for c in message.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            '/' if prev == '<' => out.push_str("\\/"),
            _ => out.push(c),
        }
        prev = c;
    }
    out
}

/// Non-blank, trimmed `(type, message)` pairs in buffer order.
pub fn visible(buffer: &NoticeBuffer) -> impl Iterator<Item = (&NoticeType, &str)> {
    buffer
        .messages()
        .map(|(t, m)| (t, m.trim()))
        .filter(|(_, m)| !m.is_empty())
}

pub fn notices_fragment(buffer: &NoticeBuffer) -> String {
    notices_fragment_with(buffer, &PassThrough)
}

/// [`notices_fragment`] with every message run through `sanitizer`.
pub fn notices_fragment_with(buffer: &NoticeBuffer, sanitizer: &dyn Sanitize) -> String {
    let mut out = String::new();
    for (ty, msg) in visible(buffer) {
        let _ = write!(
            out,
            r#"<p class="{}">{}</p>"#,
            css_class(ty),
            sanitizer.sanitize(msg)
        );
    }
    out
}

pub fn admin_markup(buffer: &NoticeBuffer, sanitizer: &dyn Sanitize) -> String {
    let mut inner = String::new();
    for (ty, msg) in visible(buffer) {
        let _ = write!(
            inner,
            "<div class=\"notice is-dismissible notice-{}\">\n    <p>{}</p>\n</div>",
            css_class(ty),
            sanitizer.sanitize(msg),
        );
    }
    format!(r#"<div class="nb-backend-notices-wrap">{inner}</div>"#)
}

pub fn frontend_script(buffer: &NoticeBuffer, sanitizer: &dyn Sanitize) -> String {
    let mut inner = String::new();
    for (ty, msg) in visible(buffer) {
        let _ = write!(
            inner,
            "\nnotice_show(\"{}\", \"{}\");\n",
            js_escape(&sanitizer.sanitize(msg)),
            css_class(ty),
        );
    }
    format!(
        "<script type=\"text/javascript\">\nwindow.jQuery(document).ready(function () {{{inner}}});\n</script>"
    )
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_with(entries: &[(&str, &str)]) -> NoticeBuffer {
        let mut b = NoticeBuffer::with_types(&nb_domain::notice::resolve_types::<String>(&[]));
        for (ty, msg) in entries {
            b.extend_unique(&NoticeType::new(ty), vec![msg.to_string()]);
        }
        b
    }

    #[test]
    fn css_class_strips_unsafe_characters() {
        assert_eq!(css_class(&NoticeType::new("error")), "error");
        assert_eq!(css_class(&NoticeType::new("my type!")), "mytype");
        assert_eq!(css_class(&NoticeType::new("a%20b")), "ab");
        assert_eq!(css_class(&NoticeType::new("snake_case-ok")), "snake_case-ok");
    }

    #[test]
    fn fragment_is_concatenated_paragraphs() {
        let b = buffer_with(&[("error", "Bad input"), ("success", "Saved")]);
        assert_eq!(
            notices_fragment(&b),
            r#"<p class="error">Bad input</p><p class="success">Saved</p>"#
        );
    }

    #[test]
    fn fragment_with_sanitizer_escapes_markup() {
        let b = buffer_with(&[("error", "<img src=x onerror=alert(1)>")]);
        assert_eq!(
            notices_fragment_with(&b, &EscapeHtml),
            r#"<p class="error">&lt;img src=x onerror=alert(1)&gt;</p>"#
        );
        assert_eq!(
            notices_fragment(&b),
            r#"<p class="error"><img src=x onerror=alert(1)></p>"#
        );
    }

    #[test]
    fn blank_messages_are_skipped_and_trimmed() {
        let b = buffer_with(&[("neutral", "   "), ("error", "  padded  ")]);
        assert_eq!(notices_fragment(&b), r#"<p class="error">padded</p>"#);
        assert_eq!(visible(&b).count(), 1);
    }

    #[test]
    fn admin_markup_wraps_dismissible_blocks() {
        let b = buffer_with(&[("success", "<b>Done</b>")]);
        let html = admin_markup(&b, &EscapeHtml);
        assert!(html.starts_with(r#"<div class="nb-backend-notices-wrap">"#));
        assert!(html.contains(r#"<div class="notice is-dismissible notice-success">"#));
        assert!(html.contains("<p>&lt;b&gt;Done&lt;/b&gt;</p>"));
        assert!(html.ends_with("</div></div>"));
    }

    #[test]
    fn frontend_script_calls_notice_show_per_message() {
        let b = buffer_with(&[("error", "Say \"hi\""), ("success", "ok")]);
        let js = frontend_script(&b, &PassThrough);
        assert!(js.starts_with("<script type=\"text/javascript\">"));
        assert!(js.contains("\nnotice_show(\"Say \\\"hi\\\"\", \"error\");\n"));
        assert!(js.contains("\nnotice_show(\"ok\", \"success\");\n"));
        assert_eq!(js.matches("notice_show(").count(), 2);
        assert!(js.ends_with("});\n</script>"));
    }

    #[test]
    fn js_escape_cannot_close_script() {
        assert_eq!(js_escape("</script>"), "<\\/script>");
        assert_eq!(js_escape("it's\na\\b"), "it\\'s\\na\\\\b");
    }

    #[test]
    fn escape_html_entities() {
        assert_eq!(EscapeHtml.sanitize(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#039;&amp;&#039;&lt;/a&gt;");
    }
}

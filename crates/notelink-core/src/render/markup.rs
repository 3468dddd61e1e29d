use crate::model::Note;
use crate::utils::to_posix;

/// Escape text for use in HTML bodies and double-quoted attribute values.
pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Writing into a String cannot fail.
    let _ = pulldown_cmark_escape::escape_html(&mut out, text);
    out
}

fn page_attr(page: Option<u32>) -> String {
    page.map(|p| format!(" data-page=\"{p}\"")).unwrap_or_default()
}

pub(crate) fn link(note: &Note, target: &str, text: &str, page: Option<u32>) -> String {
    format!(
        "<span class=\"wikilink\" data-wiki-target=\"{}\" data-note-id=\"{}\"{} role=\"link\" tabindex=\"0\">{}</span>",
        escape_html(target),
        escape_html(note.id.as_str()),
        page_attr(page),
        escape_html(text)
    )
}

pub(crate) fn unresolved(target: &str, text: &str) -> String {
    format!(
        "<span class=\"wikilink wikilink--unresolved\" data-wiki-target=\"{}\" data-unresolved=\"true\" role=\"link\" tabindex=\"0\">{}</span>",
        escape_html(target),
        escape_html(text)
    )
}

/// Block wrapper around transcluded markdown.
pub(crate) fn embed(note: &Note, target: &str, inner: &str) -> String {
    format!(
        "<div class=\"wikilink-embed\" data-wiki-target=\"{}\" data-note-id=\"{}\">{}</div>",
        escape_html(target),
        escape_html(note.id.as_str()),
        inner
    )
}

/// Placeholder element for PDFs, images, notebooks and other non-markdown embeds.
pub(crate) fn typed_embed(note: &Note, target: &str, page: Option<u32>, inline: bool) -> String {
    let src = note
        .absolute_path
        .as_deref()
        .map(|p| format!(" data-src=\"{}\"", escape_html(&to_posix(p))))
        .unwrap_or_default();
    format!(
        "<div class=\"wikilink-embed wikilink-embed--{}{}\" data-wiki-target=\"{}\" data-note-id=\"{}\"{}{}>{}</div>",
        note.note_type.as_str(),
        if inline { " wikilink-embed--inline" } else { "" },
        escape_html(target),
        escape_html(note.id.as_str()),
        src,
        page_attr(page),
        escape_html(&note.title)
    )
}

pub(crate) fn cycle(note: &Note, target: &str) -> String {
    format!(
        "<div class=\"wikilink-embed wikilink-embed--cycle\" data-wiki-target=\"{}\" data-note-id=\"{}\">{}</div>",
        escape_html(target),
        escape_html(note.id.as_str()),
        escape_html(target)
    )
}

/// Embed output is block markup; links render as spans.
pub(crate) fn is_block(html: &str) -> bool {
    !html.is_empty() && !html.starts_with("<span")
}

/// Escaped source shown when the pipeline fails.
pub(crate) fn fallback(source: &str) -> String {
    format!("<pre class=\"markdown-fallback\">{}</pre>", escape_html(source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NoteType;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; 'Jerry'&lt;/a&gt;"
        );
    }

    #[test]
    fn test_typed_embed_attributes() {
        let note = Note::new("m", "Manual", NoteType::Pdf).with_path("/ws/docs/manual.pdf");
        let html = typed_embed(&note, "Manual.pdf#3", Some(3), true);
        assert!(html.starts_with(
            "<div class=\"wikilink-embed wikilink-embed--pdf wikilink-embed--inline\""
        ));
        assert!(html.contains("data-src=\"/ws/docs/manual.pdf\""));
        assert!(html.contains("data-page=\"3\""));
    }

    #[test]
    fn test_fallback_escapes_source() {
        assert_eq!(
            fallback("<b>&</b>"),
            "<pre class=\"markdown-fallback\">&lt;b&gt;&amp;&lt;/b&gt;</pre>"
        );
    }
}

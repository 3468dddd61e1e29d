use crate::config::RenderConfig;
use ammonia::Builder;

const EXTRA_TAGS: &[&str] = &[
    "section", "input", "button", "select", "option", "textarea", "label", "fieldset", "legend",
    "form", "video", "audio", "source", "track",
];

const GENERIC_ATTRIBUTES: &[&str] = &["class", "style", "id", "role", "tabindex", "title"];

const EVENT_HANDLERS: &[&str] = &[
    "onclick", "ondblclick", "onmousedown", "onmouseup", "onmouseover", "onmouseout",
    "onmousemove", "onkeydown", "onkeyup", "onkeypress", "onchange", "oninput", "onsubmit",
    "onfocus", "onblur", "onload", "onerror",
];

const MEDIA_ATTRIBUTES: &[&str] = &[
    "src", "controls", "autoplay", "loop", "muted", "poster", "width", "height", "preload",
];

const FORM_ATTRIBUTES: &[&str] = &[
    "type", "name", "value", "checked", "disabled", "placeholder", "readonly", "selected",
    "multiple",
];

/// Allow-list HTML sanitizer applied to every rendered preview.
pub(crate) struct Sanitizer {
    builder: Builder<'static>,
}

impl Sanitizer {
    pub fn new(config: &RenderConfig) -> Self {
        let mut builder = Builder::default();
        builder
            .add_tags(EXTRA_TAGS.iter().copied())
            .add_generic_attributes(GENERIC_ATTRIBUTES.iter().copied())
            .add_generic_attribute_prefixes(["data-", "aria-"])
            .add_tag_attributes("input", FORM_ATTRIBUTES.iter().copied())
            .add_tag_attributes("button", FORM_ATTRIBUTES.iter().copied())
            .add_tag_attributes("select", FORM_ATTRIBUTES.iter().copied())
            .add_tag_attributes("option", FORM_ATTRIBUTES.iter().copied())
            .add_tag_attributes("textarea", ["name", "rows", "cols", "placeholder", "readonly"])
            .add_tag_attributes("label", ["for"])
            .add_tag_attributes("form", ["method"])
            .add_tag_attributes("video", MEDIA_ATTRIBUTES.iter().copied())
            .add_tag_attributes("audio", MEDIA_ATTRIBUTES.iter().copied())
            .add_tag_attributes("source", ["src", "type"])
            .add_tag_attributes("track", ["src", "kind", "srclang", "label", "default"]);

        if config.allow_iframes {
            builder.add_tags(["iframe"]).add_tag_attributes(
                "iframe",
                ["src", "width", "height", "allow", "allowfullscreen", "frameborder"],
            );
        }
        if config.allow_event_handlers {
            builder.add_generic_attributes(EVENT_HANDLERS.iter().copied());
        }

        Self { builder }
    }

    pub fn clean(&self, html: &str) -> String {
        self.builder.clean(html).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sanitizer() -> Sanitizer {
        Sanitizer::new(&RenderConfig::default())
    }

    #[test]
    fn test_script_removed_with_content() {
        let out = sanitizer().clean("<p>hi</p><script>alert('x')</script>");
        assert!(!out.contains("script"));
        assert!(!out.contains("alert"));
        assert!(out.contains("<p>hi</p>"));
    }

    #[test]
    fn test_structural_and_data_attributes_survive() {
        let out = sanitizer().clean(
            r#"<section class="box" data-source-block="2" aria-label="x" role="note"><input type="checkbox" checked="" disabled=""></section>"#,
        );
        assert!(out.contains("<section"));
        assert!(out.contains(r#"class="box""#));
        assert!(out.contains(r#"data-source-block="2""#));
        assert!(out.contains(r#"aria-label="x""#));
        assert!(out.contains(r#"type="checkbox""#));
    }

    #[test]
    fn test_event_handlers_are_opt_in() {
        let html = r#"<div onclick="go()">x</div>"#;
        assert!(!sanitizer().clean(html).contains("onclick"));

        let permissive = Sanitizer::new(&RenderConfig {
            allow_event_handlers: true,
            ..RenderConfig::default()
        });
        assert!(permissive.clean(html).contains(r#"onclick="go()""#));
    }

    #[test]
    fn test_iframes_follow_config() {
        let html = r#"<iframe src="https://example.com/embed"></iframe>"#;
        assert!(sanitizer().clean(html).contains("<iframe"));

        let strict = Sanitizer::new(&RenderConfig {
            allow_iframes: false,
            ..RenderConfig::default()
        });
        assert!(!strict.clean(html).contains("iframe"));
    }
}

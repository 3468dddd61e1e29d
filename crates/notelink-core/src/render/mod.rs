//! Markdown preview rendering.
//!
//! Pipeline:
//! 1. wikilink tokens are swapped for placeholders
//! 2. pulldown-cmark converts the markdown, placeholders in code are restored
//!    to their literal text and the rest become link or embed markup
//! 3. top-level blocks are tagged with `data-source-block` when a source map is requested
//! 4. ammonia sanitizes the result
//!
//! A panic in stages 1 to 3 degrades to the escaped source in a `<pre>`.

mod markup;
mod placeholder;
mod sanitize;
mod source_map;

pub use source_map::SourceMapEntry;

use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::index::WikiIndex;
use crate::line_map::LineMap;
use crate::model::{Note, NoteId};
use crate::resolve::{display_target, parse_wiki_target, ResolveContext};
use crate::syntax::{WikiLinkKind, WikiToken};
use placeholder::{Extracted, Piece};
use pulldown_cmark::{html, Event, Options, Parser, Tag, TagEnd};
use sanitize::Sanitizer;
use serde::Serialize;
use std::ops::Range;
use std::panic::{catch_unwind, AssertUnwindSafe};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub collect_source_map: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOutput {
    pub html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_map: Option<Vec<SourceMapEntry>>,
}

/// Render markdown to sanitized HTML with default render settings.
pub fn render_markdown_preview(
    index: &WikiIndex,
    source: &str,
    context: Option<&ResolveContext>,
    options: RenderOptions,
) -> RenderOutput {
    MarkdownRenderer::new(index, RenderConfig::default()).render(source, context, options)
}

pub struct MarkdownRenderer<'a> {
    index: &'a WikiIndex,
    config: RenderConfig,
    sanitizer: Sanitizer,
}

/// Notes currently being transcluded, innermost last.
struct EmbedState {
    stack: Vec<NoteId>,
    depth: usize,
    max_depth: usize,
}

impl EmbedState {
    fn new(context: Option<&ResolveContext>, max_depth: usize) -> Self {
        Self {
            stack: context.and_then(|c| c.note_id.clone()).into_iter().collect(),
            depth: 0,
            max_depth,
        }
    }

    fn enter(&mut self, id: &NoteId) -> bool {
        if self.depth >= self.max_depth || self.stack.contains(id) {
            return false;
        }
        self.stack.push(id.clone());
        self.depth += 1;
        true
    }

    fn leave(&mut self) {
        if self.depth > 0 {
            self.stack.pop();
            self.depth -= 1;
        }
    }
}

fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_YAML_STYLE_METADATA_BLOCKS
}

/// Top-level events that open a block in the output.
fn opens_block(event: &Event<'_>) -> bool {
    match event {
        Event::Start(Tag::MetadataBlock(_)) => false,
        Event::Start(_) | Event::Rule => true,
        _ => false,
    }
}

/// Run `f`, turning a panic into a `RenderError`.
fn guarded<T>(f: impl FnOnce() -> T) -> Result<T, RenderError> {
    catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        RenderError::Panicked(message)
    })
}

/// Escaped source in a `<pre>`, with an empty source map when one was requested.
fn fallback_output(source: &str, options: RenderOptions, err: RenderError) -> RenderOutput {
    log::error!("Markdown render failed, showing source instead: {}", err);
    RenderOutput {
        html: markup::fallback(source),
        source_map: options.collect_source_map.then(Vec::new),
    }
}

/// If the paragraph opened at `start` holds nothing but block markup from an
/// embed, drop the paragraph and return that markup to stand as the block itself.
fn take_lone_embed(events: &mut Vec<Event<'_>>, start: usize) -> Option<String> {
    let html = match events.get(start..)? {
        [Event::Start(Tag::Paragraph), Event::InlineHtml(html)] if markup::is_block(html) => {
            html.to_string()
        }
        _ => return None,
    };
    events.truncate(start);
    Some(html)
}

impl<'a> MarkdownRenderer<'a> {
    pub fn new(index: &'a WikiIndex, config: RenderConfig) -> Self {
        let sanitizer = Sanitizer::new(&config);
        Self {
            index,
            config,
            sanitizer,
        }
    }

    /// Render, falling back to the escaped source if the pipeline fails.
    pub fn render(
        &self,
        source: &str,
        context: Option<&ResolveContext>,
        options: RenderOptions,
    ) -> RenderOutput {
        match self.try_render(source, context, options) {
            Ok(output) => output,
            Err(err) => fallback_output(source, options, err),
        }
    }

    pub fn try_render(
        &self,
        source: &str,
        context: Option<&ResolveContext>,
        options: RenderOptions,
    ) -> Result<RenderOutput, RenderError> {
        let (html, blocks) =
            guarded(|| self.render_document(source, context, options.collect_source_map))?;
        let html = self.sanitizer.clean(&html);

        let source_map = options.collect_source_map.then(|| {
            let lines = LineMap::new(source);
            blocks
                .into_iter()
                .enumerate()
                .map(|(block, range)| SourceMapEntry::new(block, range, &lines))
                .collect()
        });

        Ok(RenderOutput { html, source_map })
    }

    /// Stages 1 to 3. Returns unsanitized HTML and, when collecting, the
    /// original byte range of each tagged block in tag order.
    fn render_document(
        &self,
        source: &str,
        context: Option<&ResolveContext>,
        collect: bool,
    ) -> (String, Vec<Range<usize>>) {
        let doc = placeholder::extract(source);
        let mut embeds = EmbedState::new(context, self.config.max_embed_depth);
        let (html, ranges) = self.render_fragment(&doc, context, &mut embeds, collect);
        if !collect {
            return (html, Vec::new());
        }

        let (html, attached) = source_map::attach(&html);
        let blocks = attached
            .into_iter()
            .filter_map(|n| ranges.get(n))
            .map(|r| doc.offsets.to_original(r.start)..doc.offsets.to_original(r.end))
            .collect();
        (html, blocks)
    }

    fn render_fragment(
        &self,
        doc: &Extracted,
        context: Option<&ResolveContext>,
        embeds: &mut EmbedState,
        collect: bool,
    ) -> (String, Vec<Range<usize>>) {
        let mut events: Vec<Event<'_>> = Vec::new();
        let mut ranges = Vec::new();
        let mut pending = String::new();
        let mut depth = 0usize;
        let mut literal = false;
        let mut images = 0usize;
        let mut paragraph: Option<usize> = None;

        for (event, range) in Parser::new_ext(&doc.text, parser_options()).into_offset_iter() {
            if let Event::Text(text) = &event {
                pending.push_str(text);
                continue;
            }
            self.flush_text(&mut pending, literal || images > 0, doc, context, embeds, &mut events);

            if collect && depth == 0 && opens_block(&event) {
                events.push(Event::Html(source_map::marker(ranges.len()).into()));
                ranges.push(range);
            }

            match &event {
                Event::Start(tag) => {
                    depth += 1;
                    if matches!(tag, Tag::Image { .. }) {
                        images += 1;
                    }
                }
                Event::End(tag) => {
                    depth = depth.saturating_sub(1);
                    if matches!(tag, TagEnd::Image) {
                        images = images.saturating_sub(1);
                    }
                }
                _ => {}
            }

            match &event {
                Event::Start(Tag::Paragraph) => paragraph = Some(events.len()),
                Event::End(TagEnd::Paragraph) => {
                    let lone = paragraph
                        .take()
                        .and_then(|start| take_lone_embed(&mut events, start));
                    if let Some(block) = lone {
                        events.push(Event::Html(block.into()));
                        continue;
                    }
                }
                _ => {}
            }

            let event = match event {
                Event::Start(tag @ (Tag::CodeBlock(_) | Tag::MetadataBlock(_))) => {
                    literal = true;
                    Event::Start(tag)
                }
                Event::End(tag @ (TagEnd::CodeBlock | TagEnd::MetadataBlock(_))) => {
                    literal = false;
                    Event::End(tag)
                }
                Event::Code(code) => Event::Code(doc.restore(&code).into()),
                Event::Html(raw) => Event::Html(self.substitute(&raw, doc, context, embeds).into()),
                Event::InlineHtml(raw) => {
                    Event::InlineHtml(self.substitute(&raw, doc, context, embeds).into())
                }
                Event::Start(Tag::Link {
                    link_type,
                    dest_url,
                    title,
                    id,
                }) => Event::Start(Tag::Link {
                    link_type,
                    dest_url: doc.restore(&dest_url).into(),
                    title: doc.restore(&title).into(),
                    id,
                }),
                Event::Start(Tag::Image {
                    link_type,
                    dest_url,
                    title,
                    id,
                }) => Event::Start(Tag::Image {
                    link_type,
                    dest_url: doc.restore(&dest_url).into(),
                    title: doc.restore(&title).into(),
                    id,
                }),
                other => other,
            };
            events.push(event);
        }
        self.flush_text(&mut pending, literal, doc, context, embeds, &mut events);

        let mut out = String::with_capacity(doc.text.len() * 3 / 2);
        html::push_html(&mut out, events.into_iter());
        (out, ranges)
    }

    /// Emit buffered text: literal inside code, otherwise text runs
    /// interleaved with rendered wikilinks.
    fn flush_text(
        &self,
        pending: &mut String,
        literal: bool,
        doc: &Extracted,
        context: Option<&ResolveContext>,
        embeds: &mut EmbedState,
        events: &mut Vec<Event<'_>>,
    ) {
        if pending.is_empty() {
            return;
        }
        let text = std::mem::take(pending);
        if literal {
            events.push(Event::Text(doc.restore(&text).into()));
            return;
        }

        for piece in placeholder::pieces(&text) {
            match piece {
                Piece::Text(t) => events.push(Event::Text(t.to_string().into())),
                Piece::Token(n) => match doc.tokens.get(n) {
                    Some(token) => events.push(Event::InlineHtml(
                        self.wikilink_html(doc, token, context, embeds).into(),
                    )),
                    None => events.push(Event::Text(doc.restore(&text).into())),
                },
            }
        }
    }

    /// Replace placeholders inside raw HTML with rendered wikilinks.
    fn substitute(
        &self,
        raw: &str,
        doc: &Extracted,
        context: Option<&ResolveContext>,
        embeds: &mut EmbedState,
    ) -> String {
        let mut out = String::with_capacity(raw.len());
        for piece in placeholder::pieces(raw) {
            match piece {
                Piece::Text(t) => out.push_str(t),
                Piece::Token(n) => match doc.tokens.get(n) {
                    Some(token) => out.push_str(&self.wikilink_html(doc, token, context, embeds)),
                    None => out.push_str(&doc.restore(raw)),
                },
            }
        }
        out
    }

    fn wikilink_html(
        &self,
        doc: &Extracted,
        token: &WikiToken,
        context: Option<&ResolveContext>,
        embeds: &mut EmbedState,
    ) -> String {
        let raw = token.raw(&doc.source);
        let result = parse_wiki_target(self.index, raw, context);
        let target = display_target(raw);
        let note = result.note_id.as_ref().and_then(|id| self.index.note(id));

        match (token.kind, note) {
            (_, None) => {
                let text = result.alias.as_deref().unwrap_or(&target);
                markup::unresolved(&target, text)
            }
            (WikiLinkKind::Reference, Some(note)) => {
                let text = result.alias.as_deref().unwrap_or(&target);
                markup::link(note, &target, text, result.page)
            }
            (kind, Some(note)) => self.embed_html(kind, note, &target, result.page, embeds),
        }
    }

    fn embed_html(
        &self,
        kind: WikiLinkKind,
        note: &Note,
        target: &str,
        page: Option<u32>,
        embeds: &mut EmbedState,
    ) -> String {
        let inline = kind == WikiLinkKind::InlineEmbed;
        if !note.note_type.is_markdown_capable() {
            return markup::typed_embed(note, target, page, inline);
        }
        if !embeds.enter(&note.id) {
            log::warn!(
                "Not transcluding {} ({}): cycle or depth limit {} reached",
                target,
                note.id,
                self.config.max_embed_depth
            );
            return markup::cycle(note, target);
        }

        let nested = placeholder::extract(note.content.as_deref().unwrap_or_default());
        let nested_context = ResolveContext::for_note(note.id.clone());
        let (inner, _) = self.render_fragment(&nested, Some(&nested_context), embeds, false);
        embeds.leave();

        if inline {
            inner
        } else {
            markup::embed(note, target, &inner)
        }
    }
}

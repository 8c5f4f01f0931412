use super::markup::parse_document;
use super::{FormatParser, ParseError, Representation};
use crate::classify::ContentCategory;
use pulldown_cmark::{html, Options, Parser};

/// Markdown: rendered to HTML, then parsed like any other markup. Total.
pub struct ProseParser;

/// Render Markdown (with the GitHub extensions) to HTML.
pub fn render_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

impl FormatParser for ProseParser {
    fn category(&self) -> ContentCategory {
        ContentCategory::Prose
    }

    fn parse(&self, content: &str) -> Result<Representation, ParseError> {
        Ok(Representation::Document(parse_document(&render_html(content))))
    }
}

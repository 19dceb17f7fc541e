//! README Viewer
//! Converts the dataset README from Markdown into display blocks and draws
//! them with egui, with a contents list built from the level 1-3 headings.

use egui::{Align, Color32, RichText};
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

/// Deepest heading level listed in the contents.
pub const TOC_MAX_LEVEL: u8 = 3;

const LIST_INDENT: f32 = 16.0;
const LINK_COLOR: Color32 = Color32::from_rgb(3, 102, 214);

/// A run of inline text sharing one style.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarkdownSpan {
    pub text: String,
    pub strong: bool,
    pub emphasis: bool,
    pub strikethrough: bool,
    pub code: bool,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkdownBlock {
    Heading {
        level: u8,
        spans: Vec<MarkdownSpan>,
    },
    Paragraph(Vec<MarkdownSpan>),
    ListItem {
        depth: usize,
        /// Bullet or number; empty for continuation paragraphs.
        marker: String,
        spans: Vec<MarkdownSpan>,
    },
    Quote(Vec<MarkdownSpan>),
    Code {
        language: Option<String>,
        text: String,
    },
    Table {
        header: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Rule,
}

/// Contents entry pointing at a heading block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub level: u8,
    pub title: String,
    pub block: usize,
}

/// Concatenated text of a span run.
pub fn plain_text(spans: &[MarkdownSpan]) -> String {
    spans.iter().map(|s| s.text.as_str()).collect()
}

#[derive(Default)]
struct TableState {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
    row: Vec<String>,
    cell: String,
}

/// Event-driven conversion state.
#[derive(Default)]
struct BlockBuilder {
    blocks: Vec<MarkdownBlock>,
    spans: Vec<MarkdownSpan>,
    strong: usize,
    emphasis: usize,
    strikethrough: usize,
    link: Option<String>,
    heading: Option<u8>,
    code: Option<(Option<String>, String)>,
    /// Next number per open list, `None` for bullet lists.
    lists: Vec<Option<u64>>,
    item: Option<(usize, String)>,
    quote_depth: usize,
    table: Option<TableState>,
}

impl BlockBuilder {
    fn process<'a>(mut self, parser: impl Iterator<Item = Event<'a>>) -> Vec<MarkdownBlock> {
        for event in parser {
            match event {
                Event::Start(tag) => self.start_tag(tag),
                Event::End(tag) => self.end_tag(tag),
                Event::Text(text) => self.text(&text, false),
                Event::Code(code) => self.text(&code, true),
                Event::SoftBreak => self.text(" ", false),
                Event::HardBreak => self.text("\n", false),
                Event::Rule => {
                    self.flush();
                    self.blocks.push(MarkdownBlock::Rule);
                }
                Event::TaskListMarker(checked) => {
                    self.text(if checked { "☑ " } else { "☐ " }, false)
                }
                _ => {}
            }
        }
        self.flush();
        self.blocks
    }

    fn start_tag(&mut self, tag: Tag) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush();
                self.heading = Some(level as u8);
            }
            Tag::CodeBlock(kind) => {
                self.flush();
                let language = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                    _ => None,
                };
                self.code = Some((language, String::new()));
            }
            Tag::BlockQuote(_) => {
                self.flush();
                self.quote_depth += 1;
            }
            Tag::List(start) => {
                // Text of the parent item comes before its nested list
                self.flush();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush();
                let depth = self.lists.len().saturating_sub(1);
                let marker = match self.lists.last_mut() {
                    Some(Some(next)) => {
                        let marker = format!("{}.", next);
                        *next += 1;
                        marker
                    }
                    _ => "•".to_string(),
                };
                self.item = Some((depth, marker));
            }
            Tag::Table(_) => {
                self.flush();
                self.table = Some(TableState::default());
            }
            Tag::Emphasis => self.emphasis += 1,
            Tag::Strong => self.strong += 1,
            Tag::Strikethrough => self.strikethrough += 1,
            Tag::Link { dest_url, .. } => self.link = Some(dest_url.to_string()),
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) => {
                let level = self.heading.take().unwrap_or(1);
                let spans = std::mem::take(&mut self.spans);
                self.blocks.push(MarkdownBlock::Heading { level, spans });
            }
            TagEnd::Paragraph => self.flush(),
            TagEnd::CodeBlock => {
                if let Some((language, mut text)) = self.code.take() {
                    text.truncate(text.trim_end_matches('\n').len());
                    self.blocks.push(MarkdownBlock::Code { language, text });
                }
            }
            TagEnd::BlockQuote(_) => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
            }
            TagEnd::Item => {
                self.flush();
                self.item = None;
            }
            TagEnd::TableCell => {
                if let Some(table) = &mut self.table {
                    let cell = std::mem::take(&mut table.cell);
                    table.row.push(cell.trim().to_string());
                }
            }
            TagEnd::TableHead => {
                if let Some(table) = &mut self.table {
                    table.header = std::mem::take(&mut table.row);
                }
            }
            TagEnd::TableRow => {
                if let Some(table) = &mut self.table {
                    let row = std::mem::take(&mut table.row);
                    table.rows.push(row);
                }
            }
            TagEnd::Table => {
                if let Some(TableState { header, rows, .. }) = self.table.take() {
                    self.blocks.push(MarkdownBlock::Table { header, rows });
                }
            }
            TagEnd::Emphasis => self.emphasis = self.emphasis.saturating_sub(1),
            TagEnd::Strong => self.strong = self.strong.saturating_sub(1),
            TagEnd::Strikethrough => self.strikethrough = self.strikethrough.saturating_sub(1),
            TagEnd::Link => self.link = None,
            _ => {}
        }
    }

    fn text(&mut self, text: &str, code: bool) {
        if let Some((_, buffer)) = &mut self.code {
            buffer.push_str(text);
            return;
        }
        if let Some(table) = &mut self.table {
            table.cell.push_str(text);
            return;
        }

        let span = MarkdownSpan {
            text: text.to_string(),
            strong: self.strong > 0,
            emphasis: self.emphasis > 0,
            strikethrough: self.strikethrough > 0,
            code,
            link: self.link.clone(),
        };
        // Merge with the previous run when the style is unchanged
        match self.spans.last_mut() {
            Some(last) if Self::same_style(last, &span) => last.text.push_str(&span.text),
            _ => self.spans.push(span),
        }
    }

    fn same_style(a: &MarkdownSpan, b: &MarkdownSpan) -> bool {
        a.strong == b.strong
            && a.emphasis == b.emphasis
            && a.strikethrough == b.strikethrough
            && a.code == b.code
            && a.link == b.link
    }

    /// Close the pending inline run as a block of the current context.
    fn flush(&mut self) {
        if self.heading.is_some() || self.spans.is_empty() {
            return;
        }
        let spans = std::mem::take(&mut self.spans);

        let block = if let Some((depth, marker)) = &mut self.item {
            let block = MarkdownBlock::ListItem {
                depth: *depth,
                marker: marker.clone(),
                spans,
            };
            marker.clear();
            block
        } else if self.quote_depth > 0 {
            MarkdownBlock::Quote(spans)
        } else {
            MarkdownBlock::Paragraph(spans)
        };
        self.blocks.push(block);
    }
}

/// Parsed README ready for display.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReadmeView {
    pub blocks: Vec<MarkdownBlock>,
    pub toc: Vec<TocEntry>,
    scroll_to: Option<usize>,
}

impl ReadmeView {
    pub fn parse(markdown: &str) -> Self {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS;
        let blocks = BlockBuilder::default().process(Parser::new_ext(markdown, options));

        let toc = blocks
            .iter()
            .enumerate()
            .filter_map(|(block, b)| match b {
                MarkdownBlock::Heading { level, spans } if *level <= TOC_MAX_LEVEL => {
                    Some(TocEntry {
                        level: *level,
                        title: plain_text(spans),
                        block,
                    })
                }
                _ => None,
            })
            .collect();

        Self {
            blocks,
            toc,
            scroll_to: None,
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        if self.toc.len() > 1 {
            egui::CollapsingHeader::new(RichText::new("Contents").strong())
                .default_open(true)
                .show(ui, |ui| {
                    for entry in &self.toc {
                        ui.horizontal(|ui| {
                            ui.add_space(f32::from(entry.level - 1) * LIST_INDENT);
                            if ui.link(entry.title.as_str()).clicked() {
                                self.scroll_to = Some(entry.block);
                            }
                        });
                    }
                });
            ui.add_space(8.0);
        }

        let target = self.scroll_to.take();
        for (i, block) in self.blocks.iter().enumerate() {
            let response = Self::draw_block(ui, i, block);
            if target == Some(i) {
                response.scroll_to_me(Some(Align::TOP));
            }
        }
    }

    fn draw_block(ui: &mut egui::Ui, index: usize, block: &MarkdownBlock) -> egui::Response {
        match block {
            MarkdownBlock::Heading { level, spans } => {
                let size = match level {
                    1 => 22.0,
                    2 => 18.0,
                    3 => 16.0,
                    _ => 14.0,
                };
                ui.add_space(6.0);
                let response = ui.label(RichText::new(plain_text(spans)).size(size).strong());
                if *level <= 2 {
                    ui.separator();
                }
                response
            }
            MarkdownBlock::Paragraph(spans) => {
                ui.horizontal_wrapped(|ui| Self::draw_spans(ui, spans))
                    .response
            }
            MarkdownBlock::ListItem {
                depth,
                marker,
                spans,
            } => {
                ui.horizontal_wrapped(|ui| {
                    ui.add_space(*depth as f32 * LIST_INDENT);
                    ui.label(if marker.is_empty() { " " } else { marker.as_str() });
                    Self::draw_spans(ui, spans);
                })
                .response
            }
            MarkdownBlock::Quote(spans) => {
                ui.horizontal_wrapped(|ui| {
                    ui.label(RichText::new("▎").color(Color32::GRAY));
                    for span in spans {
                        ui.label(RichText::new(&span.text).italics().color(Color32::GRAY));
                    }
                })
                .response
            }
            MarkdownBlock::Code { language, text } => {
                egui::Frame::none()
                    .fill(ui.visuals().code_bg_color)
                    .rounding(4.0)
                    .inner_margin(8.0)
                    .show(ui, |ui| {
                        if let Some(language) = language {
                            ui.label(RichText::new(language).size(10.0).color(Color32::GRAY));
                        }
                        ui.label(RichText::new(text).monospace());
                    })
                    .response
            }
            MarkdownBlock::Table { header, rows } => {
                egui::Grid::new(("readme_table", index))
                    .striped(true)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        for title in header {
                            ui.label(RichText::new(title).strong());
                        }
                        ui.end_row();
                        for row in rows {
                            for cell in row {
                                ui.label(cell.as_str());
                            }
                            ui.end_row();
                        }
                    })
                    .response
            }
            MarkdownBlock::Rule => ui.separator(),
        }
    }

    fn draw_spans(ui: &mut egui::Ui, spans: &[MarkdownSpan]) {
        ui.spacing_mut().item_spacing.x = 0.0;
        for span in spans {
            let mut text = RichText::new(&span.text);
            if span.strong {
                text = text.strong();
            }
            if span.emphasis {
                text = text.italics();
            }
            if span.strikethrough {
                text = text.strikethrough();
            }
            if span.code {
                text = text.code();
            }
            match &span.link {
                Some(url) => {
                    ui.hyperlink_to(text.color(LINK_COLOR), url);
                }
                None => {
                    ui.label(text);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(block: &MarkdownBlock) -> String {
        match block {
            MarkdownBlock::Heading { spans, .. }
            | MarkdownBlock::Paragraph(spans)
            | MarkdownBlock::ListItem { spans, .. }
            | MarkdownBlock::Quote(spans) => plain_text(spans),
            MarkdownBlock::Code { text, .. } => text.clone(),
            MarkdownBlock::Table { .. } | MarkdownBlock::Rule => String::new(),
        }
    }

    #[test]
    fn test_headings_and_contents() {
        let view = ReadmeView::parse(
            "# City population\n\nIntro.\n\n## Data\n\n### Sources\n\n#### Notes\n\nEnd.\n",
        );
        assert_eq!(
            view.blocks[0],
            MarkdownBlock::Heading {
                level: 1,
                spans: vec![MarkdownSpan {
                    text: "City population".to_string(),
                    ..Default::default()
                }],
            }
        );

        let titles: Vec<(u8, &str)> = view
            .toc
            .iter()
            .map(|e| (e.level, e.title.as_str()))
            .collect();
        assert_eq!(titles, [(1, "City population"), (2, "Data"), (3, "Sources")]);
        for entry in &view.toc {
            assert!(matches!(
                view.blocks[entry.block],
                MarkdownBlock::Heading { level, .. } if level == entry.level
            ));
        }
    }

    #[test]
    fn test_inline_styles_and_links() {
        let view = ReadmeView::parse(
            "Data from **stat.gov.kz**, see [the repo](https://github.com/open-data-kazakhstan).\n",
        );
        assert_eq!(view.blocks.len(), 1);
        let MarkdownBlock::Paragraph(spans) = &view.blocks[0] else {
            panic!("expected a paragraph, got {:?}", view.blocks[0]);
        };
        assert_eq!(
            plain_text(spans),
            "Data from stat.gov.kz, see the repo."
        );

        let strong: Vec<&str> = spans
            .iter()
            .filter(|s| s.strong)
            .map(|s| s.text.as_str())
            .collect();
        assert_eq!(strong, ["stat.gov.kz"]);

        let link = spans.iter().find(|s| s.link.is_some()).unwrap();
        assert_eq!(link.text, "the repo");
        assert_eq!(
            link.link.as_deref(),
            Some("https://github.com/open-data-kazakhstan")
        );
    }

    #[test]
    fn test_lists() {
        let view = ReadmeView::parse("- region\n  - city\n- total\n\n1. one\n2. two\n");
        let items: Vec<(usize, &str, String)> = view
            .blocks
            .iter()
            .map(|b| match b {
                MarkdownBlock::ListItem { depth, marker, .. } => {
                    (*depth, marker.as_str(), text_of(b))
                }
                other => panic!("unexpected block {:?}", other),
            })
            .collect();
        assert_eq!(
            items,
            [
                (0, "•", "region".to_string()),
                (1, "•", "city".to_string()),
                (0, "•", "total".to_string()),
                (0, "1.", "one".to_string()),
                (0, "2.", "two".to_string()),
            ]
        );
    }

    #[test]
    fn test_code_block_keeps_language() {
        let view = ReadmeView::parse("```python\nimport pandas as pd\nprint(1)\n```\n");
        assert_eq!(
            view.blocks,
            [MarkdownBlock::Code {
                language: Some("python".to_string()),
                text: "import pandas as pd\nprint(1)".to_string(),
            }]
        );

        let view = ReadmeView::parse("    indented\n");
        assert!(matches!(
            &view.blocks[0],
            MarkdownBlock::Code { language: None, text } if text == "indented"
        ));
    }

    #[test]
    fn test_table() {
        let view = ReadmeView::parse(
            "| Field | Type |\n|---|---|\n| region | string |\n| total | `integer` |\n",
        );
        assert_eq!(
            view.blocks,
            [MarkdownBlock::Table {
                header: vec!["Field".to_string(), "Type".to_string()],
                rows: vec![
                    vec!["region".to_string(), "string".to_string()],
                    vec!["total".to_string(), "integer".to_string()],
                ],
            }]
        );
    }

    #[test]
    fn test_quote_and_rule() {
        let view = ReadmeView::parse("> Licensed under ODC-PDDL\n\n---\n\nAfter.\n");
        assert_eq!(view.blocks.len(), 3);
        assert!(matches!(&view.blocks[0], MarkdownBlock::Quote(_)));
        assert_eq!(text_of(&view.blocks[0]), "Licensed under ODC-PDDL");
        assert_eq!(view.blocks[1], MarkdownBlock::Rule);
        assert_eq!(text_of(&view.blocks[2]), "After.");
    }

    #[test]
    fn test_plain_text_readme() {
        let view = ReadmeView::parse("README unavailable: timeout");
        assert!(view.toc.is_empty());
        assert_eq!(view.blocks.len(), 1);
        assert_eq!(text_of(&view.blocks[0]), "README unavailable: timeout");
    }
}

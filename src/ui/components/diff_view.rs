use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use diffdrill::engine::diff::{DiffSpan, SpanKind, diff_chars};
use crate::ui::theme::Theme;

/// Target text with the edits still required from `current` marked inline:
/// characters to add are highlighted, characters to remove are struck out.
pub struct DiffView<'a> {
    current: &'a str,
    target: &'a str,
    theme: &'a Theme,
    block: Option<Block<'a>>,
}

impl<'a> DiffView<'a> {
    pub fn new(current: &'a str, target: &'a str, theme: &'a Theme) -> Self {
        Self {
            current,
            target,
            theme,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

/// Splits spans into display lines, keeping each fragment's kind. Removed
/// newlines are shown as `↵` so the deletion stays visible.
pub fn span_lines(spans: &[DiffSpan]) -> Vec<Vec<(SpanKind, String)>> {
    let mut lines: Vec<Vec<(SpanKind, String)>> = vec![Vec::new()];
    for span in spans {
        let mut pieces = span.text.split('\n').peekable();
        while let Some(piece) = pieces.next() {
            let Some(line) = lines.last_mut() else {
                break;
            };
            if !piece.is_empty() {
                line.push((span.kind, piece.to_string()));
            }
            if pieces.peek().is_none() {
                break;
            }
            if span.kind == SpanKind::Delete {
                line.push((span.kind, "\u{21b5}".to_string()));
            } else {
                lines.push(Vec::new());
            }
        }
    }
    lines
}

impl Widget for DiffView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let spans = diff_chars(self.current, self.target);

        let lines: Vec<Line> = span_lines(&spans)
            .into_iter()
            .map(|fragments| {
                Line::from(
                    fragments
                        .into_iter()
                        .map(|(kind, text)| {
                            let style = match kind {
                                SpanKind::Equal => Style::default().fg(colors.fg()),
                                SpanKind::Insert => Style::default()
                                    .fg(colors.diff_insert())
                                    .bg(colors.diff_insert_bg())
                                    .add_modifier(Modifier::BOLD),
                                SpanKind::Delete => Style::default()
                                    .fg(colors.diff_delete())
                                    .bg(colors.diff_delete_bg())
                                    .add_modifier(Modifier::CROSSED_OUT),
                            };
                            Span::styled(text, style)
                        })
                        .collect::<Vec<_>>(),
                )
            })
            .collect();

        let mut paragraph = Paragraph::new(lines);
        if let Some(block) = self.block {
            paragraph = paragraph.block(block);
        }
        paragraph.render(area, buf);
    }
}

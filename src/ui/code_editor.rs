use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::theme::Theme;

const TAB_WIDTH: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditResult {
    /// Text changed; the caller should forward the full content.
    Changed,
    /// Only the cursor moved.
    Moved,
    Unhandled,
}

/// Multi-line plain-text editor. Owns the buffer for one attempt and is
/// rebuilt whenever the session's editor epoch changes.
pub struct CodeEditor {
    text: String,
    /// Cursor position as a char index (0 = before first char).
    cursor: usize,
    /// Column the cursor tries to keep while moving vertically.
    preferred_col: Option<usize>,
    epoch: u64,
}

impl CodeEditor {
    pub fn new(text: &str, epoch: u64) -> Self {
        Self {
            text: text.to_string(),
            cursor: 0,
            preferred_col: None,
            epoch,
        }
    }

    pub fn value(&self) -> &str {
        &self.text
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// (line, column) of the cursor, both zero-based char counts.
    pub fn cursor_position(&self) -> (usize, usize) {
        let mut line = 0;
        let mut col = 0;
        for ch in self.text.chars().take(self.cursor) {
            if ch == '\n' {
                line += 1;
                col = 0;
            } else {
                col += 1;
            }
        }
        (line, col)
    }

    pub fn handle(&mut self, key: KeyEvent) -> EditResult {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if !matches!(key.code, KeyCode::Up | KeyCode::Down) {
            self.preferred_col = None;
        }
        match key.code {
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                EditResult::Moved
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(self.len());
                EditResult::Moved
            }
            KeyCode::Up => self.move_vertical(-1),
            KeyCode::Down => self.move_vertical(1),
            KeyCode::Home => {
                self.cursor = self.line_start(self.cursor);
                EditResult::Moved
            }
            KeyCode::End => {
                self.cursor = self.line_end(self.cursor);
                EditResult::Moved
            }
            KeyCode::Char('a') if ctrl => {
                self.cursor = self.line_start(self.cursor);
                EditResult::Moved
            }
            KeyCode::Char('e') if ctrl => {
                self.cursor = self.line_end(self.cursor);
                EditResult::Moved
            }
            KeyCode::Char('w') if ctrl => self.delete_word_back(),
            KeyCode::Char('u') if ctrl => {
                let start = self.line_start(self.cursor);
                self.delete_range(start, self.cursor)
            }
            KeyCode::Backspace => {
                if self.cursor == 0 {
                    return EditResult::Unhandled;
                }
                self.delete_range(self.cursor - 1, self.cursor)
            }
            KeyCode::Delete => {
                if self.cursor >= self.len() {
                    return EditResult::Unhandled;
                }
                self.delete_range(self.cursor, self.cursor + 1)
            }
            KeyCode::Enter => {
                let indent: String = self
                    .current_line()
                    .chars()
                    .take_while(|c| *c == ' ' || *c == '\t')
                    .collect();
                self.insert_str(&format!("\n{indent}"));
                EditResult::Changed
            }
            KeyCode::Tab => {
                self.insert_str(&" ".repeat(TAB_WIDTH));
                EditResult::Changed
            }
            KeyCode::Char(ch) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                self.insert_str(&ch.to_string());
                EditResult::Changed
            }
            _ => EditResult::Unhandled,
        }
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Convert char index to byte offset.
    fn char_to_byte(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map(|(b, _)| b)
            .unwrap_or(self.text.len())
    }

    fn insert_str(&mut self, s: &str) {
        let byte_offset = self.char_to_byte(self.cursor);
        self.text.insert_str(byte_offset, s);
        self.cursor += s.chars().count();
    }

    fn delete_range(&mut self, start: usize, end: usize) -> EditResult {
        if start >= end {
            return EditResult::Unhandled;
        }
        let start_byte = self.char_to_byte(start);
        let end_byte = self.char_to_byte(end);
        self.text.replace_range(start_byte..end_byte, "");
        self.cursor = start;
        EditResult::Changed
    }

    /// Unix word rubout: skip whitespace, then non-whitespace.
    fn delete_word_back(&mut self) -> EditResult {
        let chars: Vec<char> = self.text.chars().collect();
        let mut pos = self.cursor;
        while pos > 0 && chars[pos - 1].is_whitespace() {
            pos -= 1;
        }
        while pos > 0 && !chars[pos - 1].is_whitespace() {
            pos -= 1;
        }
        self.delete_range(pos, self.cursor)
    }

    fn line_start(&self, idx: usize) -> usize {
        let chars: Vec<char> = self.text.chars().collect();
        let mut pos = idx.min(chars.len());
        while pos > 0 && chars[pos - 1] != '\n' {
            pos -= 1;
        }
        pos
    }

    fn line_end(&self, idx: usize) -> usize {
        let chars: Vec<char> = self.text.chars().collect();
        let mut pos = idx.min(chars.len());
        while pos < chars.len() && chars[pos] != '\n' {
            pos += 1;
        }
        pos
    }

    fn current_line(&self) -> &str {
        let start = self.char_to_byte(self.line_start(self.cursor));
        let end = self.char_to_byte(self.line_end(self.cursor));
        &self.text[start..end]
    }

    fn move_vertical(&mut self, direction: isize) -> EditResult {
        let start = self.line_start(self.cursor);
        let col = *self.preferred_col.get_or_insert(self.cursor - start);
        let target_start = if direction < 0 {
            if start == 0 {
                return EditResult::Unhandled;
            }
            self.line_start(start - 1)
        } else {
            let end = self.line_end(self.cursor);
            if end >= self.len() {
                return EditResult::Unhandled;
            }
            end + 1
        };
        let target_end = self.line_end(target_start);
        self.cursor = (target_start + col).min(target_end);
        EditResult::Moved
    }
}

/// Renders a [`CodeEditor`] with its cursor.
pub struct CodeEditorView<'a> {
    editor: &'a CodeEditor,
    theme: &'a Theme,
    focused: bool,
    block: Option<Block<'a>>,
}

impl<'a> CodeEditorView<'a> {
    pub fn new(editor: &'a CodeEditor, theme: &'a Theme, focused: bool) -> Self {
        Self {
            editor,
            theme,
            focused,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl Widget for CodeEditorView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let base = Style::default().fg(colors.fg());
        let cursor_style = Style::default()
            .fg(colors.cursor_fg())
            .bg(colors.cursor_bg())
            .add_modifier(Modifier::BOLD);

        let (cursor_line, cursor_col) = self.editor.cursor_position();
        let mut lines: Vec<Line> = Vec::new();
        for (idx, raw) in self.editor.value().split('\n').enumerate() {
            if !self.focused || idx != cursor_line {
                lines.push(Line::from(Span::styled(raw.to_string(), base)));
                continue;
            }
            let before: String = raw.chars().take(cursor_col).collect();
            let at = raw.chars().nth(cursor_col);
            let after: String = raw.chars().skip(cursor_col + 1).collect();
            let mut spans = vec![Span::styled(before, base)];
            spans.push(Span::styled(at.unwrap_or(' ').to_string(), cursor_style));
            if at.is_some() {
                spans.push(Span::styled(after, base));
            }
            lines.push(Line::from(spans));
        }

        let inner_height = self
            .block
            .as_ref()
            .map(|b| b.inner(area).height)
            .unwrap_or(area.height) as usize;
        let scroll = cursor_line.saturating_sub(inner_height.saturating_sub(1));

        let mut paragraph = Paragraph::new(lines).scroll((scroll as u16, 0));
        if let Some(block) = self.block {
            paragraph = paragraph.block(block);
        }
        paragraph.render(area, buf);
    }
}

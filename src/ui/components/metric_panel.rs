use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rating {
    Good,
    Neutral,
    Bad,
}

/// Two cutoffs splitting a reading into good/neutral/bad. When `inverted`,
/// lower readings are better.
#[derive(Clone, Copy, Debug)]
pub struct Cutoffs {
    pub center: f64,
    pub upper: f64,
    pub inverted: bool,
}

pub const TIME_CUTOFFS: Cutoffs = Cutoffs {
    center: 15.0,
    upper: 30.0,
    inverted: true,
};
pub const SPEED_CUTOFFS: Cutoffs = Cutoffs {
    center: 50.0,
    upper: 75.0,
    inverted: false,
};
pub const COMPLETION_CUTOFFS: Cutoffs = Cutoffs {
    center: 50.0,
    upper: 75.0,
    inverted: false,
};
pub const STROKES_CUTOFFS: Cutoffs = Cutoffs {
    center: 15.0,
    upper: 30.0,
    inverted: true,
};

impl Cutoffs {
    pub fn rate(&self, value: f64) -> Rating {
        if self.inverted {
            if value <= self.center {
                Rating::Good
            } else if value <= self.upper {
                Rating::Neutral
            } else {
                Rating::Bad
            }
        } else if value >= self.upper {
            Rating::Good
        } else if value >= self.center {
            Rating::Neutral
        } else {
            Rating::Bad
        }
    }
}

/// `MM:SS` for the live timer.
pub fn format_clock(secs: f64) -> String {
    let whole = secs.max(0.0).floor() as u64;
    format!("{:02}:{:02}", whole / 60, whole % 60)
}

pub struct MetricPanel<'a> {
    elapsed_secs: f64,
    speed_ccpm: u32,
    completion_percent: u8,
    keystrokes: u32,
    theme: &'a Theme,
}

impl<'a> MetricPanel<'a> {
    pub fn new(
        elapsed_secs: f64,
        speed_ccpm: u32,
        completion_percent: u8,
        keystrokes: u32,
        theme: &'a Theme,
    ) -> Self {
        Self {
            elapsed_secs,
            speed_ccpm,
            completion_percent,
            keystrokes,
            theme,
        }
    }

    fn rating_color(&self, rating: Rating) -> Color {
        let colors = &self.theme.colors;
        match rating {
            Rating::Good => colors.rating_good(),
            Rating::Neutral => colors.rating_neutral(),
            Rating::Bad => colors.rating_bad(),
        }
    }
}

impl Widget for MetricPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let readings = [
            (
                "Time",
                format_clock(self.elapsed_secs),
                TIME_CUTOFFS.rate(self.elapsed_secs),
            ),
            (
                "Speed",
                format!("{} CCPM", self.speed_ccpm),
                SPEED_CUTOFFS.rate(self.speed_ccpm as f64),
            ),
            (
                "Completion",
                format!("{}%", self.completion_percent),
                COMPLETION_CUTOFFS.rate(self.completion_percent as f64),
            ),
            (
                "Strokes",
                self.keystrokes.to_string(),
                STROKES_CUTOFFS.rate(self.keystrokes as f64),
            ),
        ];

        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 4); 4])
            .split(area);

        for ((title, value, rating), cell) in readings.into_iter().zip(cells.iter()) {
            let block = Block::bordered()
                .title(format!(" {title} "))
                .border_style(Style::default().fg(colors.border()));
            let inner = block.inner(*cell);
            block.render(*cell, buf);
            Paragraph::new(Line::from(Span::styled(
                value,
                Style::default()
                    .fg(self.rating_color(rating))
                    .add_modifier(Modifier::BOLD),
            )))
            .centered()
            .render(inner, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_rating_is_inverted() {
        assert_eq!(TIME_CUTOFFS.rate(0.0), Rating::Good);
        assert_eq!(TIME_CUTOFFS.rate(15.0), Rating::Good);
        assert_eq!(TIME_CUTOFFS.rate(15.1), Rating::Neutral);
        assert_eq!(TIME_CUTOFFS.rate(30.0), Rating::Neutral);
        assert_eq!(TIME_CUTOFFS.rate(31.0), Rating::Bad);
    }

    #[test]
    fn test_speed_rating() {
        assert_eq!(SPEED_CUTOFFS.rate(0.0), Rating::Bad);
        assert_eq!(SPEED_CUTOFFS.rate(50.0), Rating::Neutral);
        assert_eq!(SPEED_CUTOFFS.rate(75.0), Rating::Good);
    }

    #[test]
    fn test_completion_and_strokes() {
        assert_eq!(COMPLETION_CUTOFFS.rate(100.0), Rating::Good);
        assert_eq!(COMPLETION_CUTOFFS.rate(49.0), Rating::Bad);
        assert_eq!(STROKES_CUTOFFS.rate(16.0), Rating::Neutral);
        assert_eq!(STROKES_CUTOFFS.rate(40.0), Rating::Bad);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0.0), "00:00");
        assert_eq!(format_clock(59.9), "00:59");
        assert_eq!(format_clock(125.0), "02:05");
        assert_eq!(format_clock(-3.0), "00:00");
    }

    #[test]
    fn test_panel_renders_values() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 80, 3);
        let mut buf = Buffer::empty(area);
        MetricPanel::new(61.0, 42, 50, 7, &theme).render(area, &mut buf);
        let text: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("01:01"));
        assert!(text.contains("42 CCPM"));
        assert!(text.contains("50%"));
    }
}

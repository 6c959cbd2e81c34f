use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget};

use diffdrill::session::result::CompletionSnapshot;
use crate::ui::theme::Theme;

pub const TIME_BIN_WIDTH: f64 = 2.5;
pub const STROKES_BIN_WIDTH: f64 = 5.0;
pub const CCPM_BIN_WIDTH: f64 = 100.0;
const MAX_BINS: usize = 25;

/// Bin 0 covers `[0, width/2]`; bin n covers the `width`-wide interval
/// centred on `n * width`. Values past the last bin have no bin.
pub fn bin_index(value: f64, width: f64) -> Option<usize> {
    if !value.is_finite() || value < 0.0 || width <= 0.0 {
        return None;
    }
    let half = width / 2.0;
    let idx = if value <= half {
        0
    } else {
        ((value - half) / width).floor() as usize + 1
    };
    (idx < MAX_BINS).then_some(idx)
}

/// Share of the population (0..=100) this value beats.
pub fn percentile(counts: &[u32], bin: Option<usize>, higher_is_better: bool) -> Option<u8> {
    let bin = bin?;
    let total: u64 = counts.iter().map(|&c| c as u64).sum();
    if total == 0 {
        return None;
    }
    let beaten: u64 = if higher_is_better {
        counts.iter().take(bin).map(|&c| c as u64).sum()
    } else {
        counts.iter().skip(bin + 1).map(|&c| c as u64).sum()
    };
    Some(((beaten as f64 / total as f64) * 100.0).round() as u8)
}

/// `MM:SS.ss` for the results view.
pub fn format_duration(secs: f64) -> String {
    let secs = secs.max(0.0);
    let mins = (secs / 60.0).floor() as u64;
    format!("{mins:02}:{:05.2}", secs - mins as f64 * 60.0)
}

pub struct ResultsPopup<'a> {
    snapshot: &'a CompletionSnapshot,
    theme: &'a Theme,
}

impl<'a> ResultsPopup<'a> {
    pub fn new(snapshot: &'a CompletionSnapshot, theme: &'a Theme) -> Self {
        Self { snapshot, theme }
    }

    fn row(&self, label: &str, value: String, best: Option<String>, beats: bool, rank: Option<u8>) -> Line<'a> {
        let colors = &self.theme.colors;
        let mut spans = vec![
            Span::styled(format!("  {label:<12}"), Style::default().fg(colors.text_dim())),
            Span::styled(format!("{value:<12}"), Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD)),
        ];
        if let Some(best) = best {
            spans.push(Span::styled(
                format!("best {best:<10}"),
                Style::default().fg(colors.text_dim()),
            ));
        }
        if beats {
            spans.push(Span::styled(" new best ", Style::default().fg(colors.success())));
        }
        if let Some(rank) = rank {
            spans.push(Span::styled(
                format!(" beats {rank}%"),
                Style::default().fg(colors.accent()),
            ));
        }
        Line::from(spans)
    }
}

impl Widget for ResultsPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let snap = self.snapshot;
        let population = snap.problem.population();
        let best = snap.problem.standing().best();

        Clear.render(area, buf);
        let block = Block::bordered()
            .title(format!(" {} complete ", snap.problem.problem_id()))
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines = vec![
            Line::from(""),
            self.row(
                "Time",
                format_duration(snap.elapsed_secs),
                best.and_then(|b| b.time_secs).map(format_duration),
                snap.beats_best_time(),
                percentile(&population.time, bin_index(snap.elapsed_secs, TIME_BIN_WIDTH), false),
            ),
            self.row(
                "Strokes",
                snap.keystrokes.to_string(),
                best.and_then(|b| b.key_strokes).map(|v| v.to_string()),
                snap.beats_best_key_strokes(),
                percentile(
                    &population.key_strokes,
                    bin_index(snap.keystrokes as f64, STROKES_BIN_WIDTH),
                    false,
                ),
            ),
            self.row(
                "Speed",
                format!("{} CCPM", snap.speed_ccpm),
                best.and_then(|b| b.ccpm).map(|v| v.to_string()),
                snap.beats_best_ccpm(),
                percentile(&population.ccpm, bin_index(snap.speed_ccpm as f64, CCPM_BIN_WIDTH), true),
            ),
            Line::from(""),
        ];
        if !snap.is_logged_in {
            lines.push(Line::from(Span::styled(
                "  Guest attempt: not recorded",
                Style::default().fg(colors.text_dim()),
            )));
        }
        lines.push(Line::from(Span::styled(
            format!("  finished {}", snap.completed_at.format("%Y-%m-%d %H:%M:%S UTC")),
            Style::default().fg(colors.text_dim()),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "  [r] Retry  [n] Next problem  [Ctrl+C] Quit",
            Style::default().fg(colors.accent()),
        )));

        Paragraph::new(lines).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_index_edges() {
        assert_eq!(bin_index(0.0, 2.5), Some(0));
        assert_eq!(bin_index(1.25, 2.5), Some(0));
        assert_eq!(bin_index(1.3, 2.5), Some(1));
        assert_eq!(bin_index(5.0, 2.5), Some(2));
        assert_eq!(bin_index(1_000.0, 2.5), None);
        assert_eq!(bin_index(f64::NAN, 2.5), None);
    }

    #[test]
    fn test_percentile_lower_is_better() {
        let counts = [1, 2, 3, 4];
        // Users in bins 2 and 3 are slower.
        assert_eq!(percentile(&counts, Some(1), false), Some(70));
        assert_eq!(percentile(&counts, Some(3), false), Some(0));
    }

    #[test]
    fn test_percentile_higher_is_better() {
        let counts = [5, 5, 0, 0];
        assert_eq!(percentile(&counts, Some(1), true), Some(50));
        assert_eq!(percentile(&counts, Some(0), true), Some(0));
    }

    #[test]
    fn test_percentile_without_population() {
        assert_eq!(percentile(&[], Some(0), true), None);
        assert_eq!(percentile(&[0, 0], Some(1), true), None);
        assert_eq!(percentile(&[1], None, true), None);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "00:00.00");
        assert_eq!(format_duration(75.5), "01:15.50");
    }
}

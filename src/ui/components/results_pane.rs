use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::app::Presented;
use crate::engine::summary::PRACTICE_HINT;
use crate::ui::layout::LayoutTier;
use crate::ui::theme::Theme;

/// Statistics and the selected word list, side by side when there is room.
pub struct ResultsPane<'a> {
    presented: Option<&'a Presented>,
    scroll: u16,
    theme: &'a Theme,
}

impl<'a> ResultsPane<'a> {
    pub fn new(presented: Option<&'a Presented>, scroll: u16, theme: &'a Theme) -> Self {
        Self {
            presented,
            scroll,
            theme,
        }
    }
}

/// Style each rendered line: headings in the accent color, the closing hint
/// in italics.
fn styled_lines<'t>(text: &'t str, theme: &Theme, heading: &str) -> Vec<Line<'t>> {
    let colors = &theme.colors;
    text.lines()
        .map(|line| {
            let style = if line == heading {
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD)
            } else if line == PRACTICE_HINT {
                Style::default()
                    .fg(colors.text_muted())
                    .add_modifier(Modifier::ITALIC)
            } else {
                Style::default().fg(colors.fg())
            };
            Line::from(Span::styled(line, style))
        })
        .collect()
}

impl Widget for ResultsPane<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let Some(presented) = self.presented else {
            let block = Block::bordered()
                .title(" Results ")
                .border_style(Style::default().fg(colors.border()))
                .style(Style::default().bg(colors.bg()));
            Paragraph::new(Line::from(Span::styled(
                "Press Enter to pick today's words.",
                Style::default().fg(colors.text_muted()),
            )))
            .block(block)
            .render(area, buf);
            return;
        };

        let tier = LayoutTier::from_area(area);
        let direction = if tier.side_by_side() {
            Direction::Horizontal
        } else {
            Direction::Vertical
        };
        let sections = Layout::default()
            .direction(direction)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(area);

        let stats = Paragraph::new(styled_lines(
            &presented.statistics,
            self.theme,
            "Practice Statistics",
        ))
        .block(
            Block::bordered()
                .title(" Statistics ")
                .border_style(Style::default().fg(colors.border()))
                .style(Style::default().bg(colors.bg())),
        )
        .scroll((self.scroll, 0));
        stats.render(sections[0], buf);

        let words = Paragraph::new(styled_lines(
            &presented.word_list,
            self.theme,
            "Today's Practice Words",
        ))
        .wrap(Wrap { trim: false })
        .block(
            Block::bordered()
                .title(" Words ")
                .border_style(Style::default().fg(colors.border_focused()))
                .style(Style::default().bg(colors.bg())),
        )
        .scroll((self.scroll, 0));
        words.render(sections[1], buf);
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::session::practice::PracticeResult;
    use crate::sheet::record::WordRecord;

    #[test]
    fn heading_and_hint_get_distinct_styles() {
        let theme = Theme::default();
        let text = format!("Today's Practice Words\n1. cat\n{PRACTICE_HINT}");
        let lines = styled_lines(&text, &theme, "Today's Practice Words");

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].spans[0].style.fg, Some(theme.colors.accent()));
        assert_eq!(lines[1].spans[0].style.fg, Some(theme.colors.fg()));
        assert!(lines[2].spans[0].style.add_modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn renders_word_list_from_result() {
        let theme = Theme::default();
        let result = PracticeResult {
            dataset: vec![WordRecord::new("cat", "Animals", 1)],
            selection: vec![WordRecord::new("cat", "Animals", 1)],
        };
        let presented = Presented::new(result, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        let area = Rect::new(0, 0, 120, 24);
        let mut buf = Buffer::empty(area);

        ResultsPane::new(Some(&presented), 0, &theme).render(area, &mut buf);

        let mut text = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                text.push_str(buf[(x, y)].symbol());
            }
        }
        assert!(text.contains("1. cat (Animals)"));
        assert!(text.contains("Total Words: 1"));
    }
}

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};

use crate::app::StatusLine;
use crate::session::practice::Severity;
use crate::ui::theme::Theme;

pub struct StatusBar<'a> {
    status: &'a StatusLine,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    pub fn new(status: &'a StatusLine, theme: &'a Theme) -> Self {
        Self { status, theme }
    }
}

fn marker(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "\u{2022}",
        Severity::Warn => "!",
        Severity::Error => "\u{2717}",
        Severity::Success => "\u{2713}",
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let color = colors.severity(self.status.severity);

        let line = Line::from(vec![
            Span::styled(
                format!(" {} ", marker(self.status.severity)),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(self.status.message.as_str(), Style::default().fg(color)),
        ]);
        Paragraph::new(line)
            .style(Style::default().bg(colors.bg()))
            .render(area, buf);
    }
}

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::app::FormField;
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

/// Word count and sheet URL fields plus the fetch trigger.
pub struct PracticeForm<'a> {
    word_count: &'a LineInput,
    sheet_url: &'a LineInput,
    focus: FormField,
    busy: bool,
    theme: &'a Theme,
}

impl<'a> PracticeForm<'a> {
    pub fn new(
        word_count: &'a LineInput,
        sheet_url: &'a LineInput,
        focus: FormField,
        busy: bool,
        theme: &'a Theme,
    ) -> Self {
        Self {
            word_count,
            sheet_url,
            focus,
            busy,
            theme,
        }
    }

    fn field(&self, title: &str, input: &LineInput, focused: bool) -> Paragraph<'static> {
        let colors = &self.theme.colors;
        let (before, cursor, after) = input.render_parts();

        let mut spans = vec![Span::styled(
            before.to_string(),
            Style::default().fg(colors.fg()),
        )];
        if focused {
            let cursor_text = cursor.map(|c| c.to_string()).unwrap_or_else(|| " ".to_string());
            spans.push(Span::styled(
                cursor_text,
                Style::default().fg(colors.bg()).bg(colors.accent()),
            ));
        } else if let Some(c) = cursor {
            spans.push(Span::styled(c.to_string(), Style::default().fg(colors.fg())));
        }
        spans.push(Span::styled(after.to_string(), Style::default().fg(colors.fg())));

        let border = if focused {
            colors.border_focused()
        } else {
            colors.border()
        };
        let block = Block::bordered()
            .title(format!(" {title} "))
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.bg()));

        Paragraph::new(Line::from(spans)).block(block)
    }
}

pub fn trigger_label(busy: bool) -> &'static str {
    if busy {
        " Fetching... "
    } else {
        " [Enter] Get Practice Words "
    }
}

impl Widget for PracticeForm<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(area);
        let fields = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(22), Constraint::Min(20)])
            .split(rows[0]);

        self.field(
            "Words to practice",
            self.word_count,
            self.focus == FormField::WordCount,
        )
        .render(fields[0], buf);
        self.field(
            "Google Sheet URL",
            self.sheet_url,
            self.focus == FormField::SheetUrl,
        )
        .render(fields[1], buf);

        let trigger_style = if self.busy {
            Style::default().fg(colors.text_muted()).bg(colors.accent_dim())
        } else {
            Style::default()
                .fg(colors.bg())
                .bg(colors.accent())
                .add_modifier(Modifier::BOLD)
        };
        Paragraph::new(Line::from(Span::styled(trigger_label(self.busy), trigger_style)))
            .centered()
            .render(rows[1], buf);
    }
}

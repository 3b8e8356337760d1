use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutTier {
    Wide,   // ≥90 cols: statistics beside the word list
    Narrow, // <90 cols: statistics above the word list
}

impl LayoutTier {
    pub fn from_area(area: Rect) -> Self {
        if area.width >= 90 {
            LayoutTier::Wide
        } else {
            LayoutTier::Narrow
        }
    }

    pub fn side_by_side(&self) -> bool {
        *self == LayoutTier::Wide
    }
}

pub struct AppLayout {
    pub header: Rect,
    pub form: Rect,
    pub status: Rect,
    pub results: Rect,
    pub footer: Rect,
}

impl AppLayout {
    pub fn new(area: Rect) -> Self {
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(4),
                Constraint::Length(1),
                Constraint::Min(6),
                Constraint::Length(1),
            ])
            .split(area);

        Self {
            header: vertical[0],
            form: vertical[1],
            status: vertical[2],
            results: vertical[3],
            footer: vertical[4],
        }
    }
}

pub fn pack_hint_lines(hints: &[&str], width: usize) -> Vec<String> {
    if width == 0 || hints.is_empty() {
        return Vec::new();
    }

    let prefix = " ";
    let separator = "  ";
    let mut out: Vec<String> = Vec::new();
    let mut current = prefix.to_string();
    let mut has_hint = false;

    for hint in hints {
        if hint.is_empty() {
            continue;
        }
        let candidate = if has_hint {
            format!("{current}{separator}{hint}")
        } else {
            format!("{current}{hint}")
        };
        if candidate.chars().count() <= width {
            current = candidate;
            has_hint = true;
        } else {
            if has_hint {
                out.push(current);
            }
            current = format!("{prefix}{hint}");
            has_hint = true;
        }
    }

    if has_hint {
        out.push(current);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_switches_at_ninety_columns() {
        assert_eq!(LayoutTier::from_area(Rect::new(0, 0, 89, 30)), LayoutTier::Narrow);
        assert_eq!(LayoutTier::from_area(Rect::new(0, 0, 90, 30)), LayoutTier::Wide);
    }

    #[test]
    fn layout_fills_the_area() {
        let layout = AppLayout::new(Rect::new(0, 0, 100, 30));
        assert_eq!(layout.header.height, 1);
        assert_eq!(layout.form.height, 4);
        assert_eq!(layout.footer.y, 29);
        assert_eq!(layout.results.height, 30 - 1 - 4 - 1 - 1);
    }

    #[test]
    fn hints_pack_into_lines() {
        let lines = pack_hint_lines(&["[Enter] Fetch", "[Tab] Next field", "[q] Quit"], 20);
        assert_eq!(lines, vec![" [Enter] Fetch", " [Tab] Next field", " [q] Quit"]);

        let wide = pack_hint_lines(&["[Enter] Fetch", "[q] Quit"], 80);
        assert_eq!(wide, vec![" [Enter] Fetch  [q] Quit"]);
    }

    #[test]
    fn hints_empty_cases() {
        assert!(pack_hint_lines(&[], 40).is_empty());
        assert!(pack_hint_lines(&["x"], 0).is_empty());
    }
}

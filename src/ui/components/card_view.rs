use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use tango::session::faces::CardFaces;

use crate::ui::theme::Theme;

pub struct CardView<'a> {
    pub faces: &'a CardFaces,
    pub is_flipped: bool,
    pub is_favorite: bool,
    pub position: usize,
    pub total: usize,
    pub theme: &'a Theme,
}

impl<'a> CardView<'a> {
    pub fn new(faces: &'a CardFaces, theme: &'a Theme) -> Self {
        Self {
            faces,
            is_flipped: false,
            is_favorite: false,
            position: 0,
            total: 0,
            theme,
        }
    }

    pub fn flipped(mut self, is_flipped: bool) -> Self {
        self.is_flipped = is_flipped;
        self
    }

    pub fn favorite(mut self, is_favorite: bool) -> Self {
        self.is_favorite = is_favorite;
        self
    }

    pub fn position(mut self, position: usize, total: usize) -> Self {
        self.position = position;
        self.total = total;
        self
    }
}

impl Widget for CardView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let mut block = Block::bordered()
            .title(format!(" {}/{} ", self.position + 1, self.total))
            .border_style(Style::default().fg(colors.card_border()))
            .style(Style::default().bg(colors.bg()));
        if self.is_favorite {
            block = block.title_top(
                Line::from(Span::styled(
                    " \u{2605} ",
                    Style::default().fg(colors.favorite()),
                ))
                .right_aligned(),
            );
        }
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let mut lines = vec![Line::from(Span::styled(
            self.faces.front.as_str(),
            Style::default()
                .fg(colors.fg())
                .add_modifier(Modifier::BOLD),
        ))];

        if self.is_flipped {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "\u{2500}".repeat(inner.width.min(24) as usize),
                Style::default().fg(colors.border()),
            )));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                self.faces.back.as_str(),
                Style::default()
                    .fg(colors.card_back())
                    .add_modifier(Modifier::BOLD),
            )));
            if !self.faces.back_hint.is_empty() {
                lines.push(Line::from(Span::styled(
                    self.faces.back_hint.as_str(),
                    Style::default().fg(colors.muted()),
                )));
            }
        } else {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "press space to flip",
                Style::default().fg(colors.muted()),
            )));
        }

        let height = lines.len() as u16;
        let top = inner.y + inner.height.saturating_sub(height) / 2;
        let text_area = Rect::new(inner.x, top, inner.width, inner.height.min(height));
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(text_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(view: CardView<'_>) -> String {
        let area = Rect::new(0, 0, 40, 12);
        let mut buf = Buffer::empty(area);
        view.render(area, &mut buf);
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    fn faces() -> CardFaces {
        CardFaces {
            front: "dog".to_string(),
            back: "inu".to_string(),
            back_hint: "hint".to_string(),
        }
    }

    #[test]
    fn test_back_hidden_until_flipped() {
        let theme = Theme::default();
        let faces = faces();
        let front = rendered(CardView::new(&faces, &theme).position(0, 3));
        assert!(front.contains("dog"));
        assert!(!front.contains("inu"));
        assert!(front.contains("1/3"));

        let back = rendered(CardView::new(&faces, &theme).flipped(true));
        assert!(back.contains("inu"));
        assert!(back.contains("hint"));
    }
}

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use tango::engine::stats::{DayPerformance, StatsPeriod, StudySummary};

use crate::ui::theme::Theme;

pub struct StatsPanel<'a> {
    pub summary: &'a StudySummary,
    pub days: &'a [DayPerformance],
    pub period: StatsPeriod,
    pub theme: &'a Theme,
}

impl<'a> StatsPanel<'a> {
    pub fn new(
        summary: &'a StudySummary,
        days: &'a [DayPerformance],
        period: StatsPeriod,
        theme: &'a Theme,
    ) -> Self {
        Self {
            summary,
            days,
            period,
            theme,
        }
    }
}

impl Widget for StatsPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Statistics ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(8), Constraint::Min(0)])
            .split(inner);

        let label = Style::default().fg(colors.fg());
        let value = Style::default()
            .fg(colors.accent())
            .add_modifier(Modifier::BOLD);
        let s = self.summary;
        let rate = s.success_rate();
        let rate_color = if rate >= 80 {
            colors.correct()
        } else if rate >= 50 {
            colors.warning()
        } else {
            colors.incorrect()
        };

        let rows: Vec<(&str, String, Style)> = vec![
            ("Words", s.total_words.to_string(), value),
            ("Studied", s.studied_words.to_string(), value),
            ("Understood", s.total_understood.to_string(), value),
            ("Not yet", s.total_ng.to_string(), value),
            ("Points", s.total_points.to_string(), value),
            (
                "Success rate",
                format!("{rate}%"),
                value.fg(rate_color),
            ),
        ];
        let summary_lines: Vec<Line> = rows
            .into_iter()
            .map(|(name, text, style)| {
                Line::from(vec![
                    Span::styled(format!("  {name:<14}"), label),
                    Span::styled(text, style),
                ])
            })
            .collect();
        Paragraph::new(summary_lines).render(layout[0], buf);

        let muted = Style::default().fg(colors.muted());
        let reviewed: usize = self.days.iter().map(|d| d.total).sum();
        let understood: usize = self.days.iter().map(|d| d.understood).sum();
        let period_rate = if reviewed == 0 {
            0
        } else {
            ((understood as f64 / reviewed as f64) * 100.0).round() as u32
        };
        let mut day_lines = vec![
            Line::from(vec![
                Span::styled(
                    format!("  Last {} days", self.period.days()),
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  {reviewed} reviewed, {understood} understood ({period_rate}%)"),
                    muted,
                ),
            ]),
            Line::from(Span::styled(
                format!("  {:<12}{:>9}{:>12}{:>7}", "Date", "Reviewed", "Understood", "%"),
                muted,
            )),
        ];
        // newest first; longer periods are cut to the rows that fit
        let rows = (layout[1].height as usize).saturating_sub(day_lines.len());
        for day in self.days.iter().rev().take(rows) {
            let style = if day.total == 0 { muted } else { label };
            day_lines.push(Line::from(Span::styled(
                format!(
                    "  {:<12}{:>9}{:>12}{:>6}%",
                    day.date.format("%Y-%m-%d").to_string(),
                    day.total,
                    day.understood,
                    day.percentage()
                ),
                style,
            )));
        }
        Paragraph::new(day_lines).render(layout[1], buf);
    }
}

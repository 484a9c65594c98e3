mod app;
mod event;
mod ui;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use tracing::{info, warn};

use tango::config::Config;
use tango::engine::card_store::OrderingMode;
use tango::engine::stats::{self, StatsPeriod, StudySummary};
use tango::logging;
use tango::source::{self, word_list};
use tango::store::json_store::JsonStore;
use tango::store::schema::ExportData;

use app::{App, AppScreen, SETTINGS_FIELDS, StatusKind};
use event::{AppEvent, EventHandler};
use ui::components::card_view::CardView;
use ui::components::progress_bar::ProgressBar;
use ui::components::stats_panel::StatsPanel;
use ui::layout::{StudyLayout, pack_hint_lines};

#[derive(Parser)]
#[command(
    name = "tango",
    version,
    about = "Terminal vocabulary flashcards with spaced review"
)]
struct Cli {
    #[arg(short, long, help = "Word list file (tab-separated)")]
    words: Option<PathBuf>,

    #[arg(short, long, help = "Word list URL (tab-separated)")]
    url: Option<String>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Card order (sequential, shuffled)")]
    order: Option<OrderingMode>,

    #[arg(long, help = "New words seen before weak words are boosted")]
    threshold: Option<u32>,

    #[arg(long, help = "Print a study summary and exit")]
    summary: bool,

    #[arg(
        long,
        default_value = "week",
        help = "Performance window for --summary (week, month, 3months)"
    )]
    period: StatsPeriod,

    #[arg(long, value_name = "PATH", help = "Export study data to a JSON file and exit")]
    export: Option<PathBuf>,

    #[arg(long, value_name = "PATH", help = "Import study data from a JSON file and exit")]
    import: Option<PathBuf>,

    #[arg(
        long,
        value_name = "PATH",
        help = "Write the word list with current counters as TSV and exit"
    )]
    dump_words: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_else(|err| {
        eprintln!("Warning: {err:#}; using default settings");
        Config::default()
    });
    if let Some(ref path) = cli.words {
        config.word_list_path = Some(path.to_string_lossy().to_string());
    }
    if let Some(url) = cli.url {
        config.word_list_url = Some(url);
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    if let Some(order) = cli.order {
        config.ordering = order;
    }
    if let Some(threshold) = cli.threshold {
        config.new_words_threshold = threshold;
    }
    config.validate();

    let _log_guard =
        match logging::init_file_logging(&config.log_level, &logging::default_log_dir()) {
            Ok(guard) => Some(guard),
            Err(err) => {
                eprintln!("Warning: logging disabled: {err:#}");
                None
            }
        };

    if let Some(ref path) = cli.import {
        return import_data(path);
    }
    if let Some(ref path) = cli.export {
        return export_data(&config, path);
    }

    let loaded = source::load_cards(&config);
    let store = match JsonStore::new() {
        Ok(store) => Some(store),
        Err(err) => {
            warn!(error = %format!("{err:#}"), "study data will not be saved");
            None
        }
    };
    let mut app = App::new(config, loaded, store, Utc::now())?;

    if cli.summary {
        print_summary(&app, cli.period);
        return Ok(());
    }
    if let Some(ref path) = cli.dump_words {
        let tsv = word_list::to_tsv(app.session.store().cards());
        fs::write(path, tsv).with_context(|| format!("writing {}", path.display()))?;
        println!("Wrote {} words to {}", app.session.store().len(), path.display());
        return Ok(());
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(250));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    app.save_data(Utc::now());
    info!("session ended");

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn import_data(path: &Path) -> Result<()> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let data: ExportData =
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
    let store = JsonStore::new()?;
    store.import_all(&data)?;
    let mut config = data.config;
    config.validate();
    config.save()?;
    info!(path = %path.display(), "imported study data");
    println!("Imported study data from {}", path.display());
    Ok(())
}

fn export_data(config: &Config, path: &Path) -> Result<()> {
    let store = JsonStore::new()?;
    let data = store.export_all(config);
    let json = serde_json::to_string_pretty(&data)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "exported study data");
    println!("Exported study data to {}", path.display());
    Ok(())
}

fn print_summary(app: &App, period: StatsPeriod) {
    let cards = app.session.store().cards();
    let summary = StudySummary::from_cards(cards);
    println!("Source:       {}", app.source);
    println!("Words:        {}", summary.total_words);
    println!("Studied:      {}", summary.studied_words);
    println!("Understood:   {}", summary.total_understood);
    println!("Not yet:      {}", summary.total_ng);
    println!("Points:       {}", summary.total_points);
    println!("Success rate: {}%", summary.success_rate());

    let studied = stats::studied_cards(cards);
    if !studied.is_empty() {
        println!();
        println!("Word scores:");
        for card in studied {
            println!("{:>4}. {} ({})", card.id + 1, card.term, card.meaning);
            println!(
                "      understood {}, NG {}, points {}",
                card.understood_count, card.ng_count, card.total_points
            );
        }
    }

    println!();
    println!("Last {} days:", period.days());
    println!("{:<12}{:>9}{:>12}{:>7}", "Date", "Reviewed", "Understood", "%");
    for day in stats::period_performance(cards, period, Utc::now().date_naive()) {
        println!(
            "{:<12}{:>9}{:>12}{:>6}%",
            day.date.format("%Y-%m-%d").to_string(),
            day.total,
            day.understood,
            day.percentage()
        );
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick | AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Study => handle_study_key(app, key),
        AppScreen::Stats => handle_stats_key(app, key),
        AppScreen::Settings => handle_settings_key(app, key),
    }
}

fn handle_study_key(app: &mut App, key: KeyEvent) {
    let now = Utc::now();
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char(' ') | KeyCode::Enter => app.flip(now),
        KeyCode::Char('j') | KeyCode::Right => app.answer(true, now),
        KeyCode::Char('f') | KeyCode::Left => app.answer(false, now),
        KeyCode::Char('*') => app.toggle_favorite(now),
        KeyCode::Char('v') => app.toggle_favorites_only(now),
        KeyCode::Char('o') => app.toggle_ordering(now),
        KeyCode::Char('s') => app.go_to_stats(),
        KeyCode::Char('c') => app.go_to_settings(),
        _ => {}
    }
}

fn handle_stats_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('s') => app.go_to_study(),
        KeyCode::Tab | KeyCode::Char('p') => app.cycle_stats_period(),
        KeyCode::Char('1') => app.stats_period = StatsPeriod::Week,
        KeyCode::Char('2') => app.stats_period = StatsPeriod::Month,
        KeyCode::Char('3') => app.stats_period = StatsPeriod::ThreeMonths,
        _ => {}
    }
}

fn handle_settings_key(app: &mut App, key: KeyEvent) {
    let now = Utc::now();
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.leave_settings(),
        KeyCode::Up | KeyCode::Char('k') => {
            app.settings_selected = app.settings_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if app.settings_selected + 1 < SETTINGS_FIELDS {
                app.settings_selected += 1;
            }
        }
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
            app.settings_cycle_forward(now);
        }
        KeyCode::Left | KeyCode::Char('h') => {
            app.settings_cycle_backward(now);
        }
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Study => render_study(frame, app),
        AppScreen::Stats => render_stats(frame, app),
        AppScreen::Settings => render_settings(frame, app),
    }
}

fn render_study(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let hints = [
        "[space] flip",
        "[j/\u{2192}] knew it",
        "[f/\u{2190}] didn't",
        "[*] favorite",
        "[v] favorites only",
        "[o] order",
        "[s] stats",
        "[c] settings",
        "[q] quit",
    ];
    let hint_lines = pack_hint_lines(&hints, area.width as usize);
    let layout = StudyLayout::new(area, hint_lines.len() as u16);

    let store = app.session.store();
    let mode_text = if store.favorites_only() {
        format!(" {} | favorites", store.ordering())
    } else {
        format!(" {}", store.ordering())
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " tango ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{mode_text} | {}", app.source),
            Style::default().fg(colors.muted()).bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, layout.header);

    if let (Some(current), Some(faces)) = (app.current(), app.faces()) {
        let card_area = ui::layout::centered_rect(60, 90, layout.card);
        let view = CardView::new(&faces, app.theme)
            .flipped(current.is_flipped)
            .favorite(current.card.is_favorite)
            .position(current.position, current.total);
        frame.render_widget(view, card_area);
    }

    if let Some(progress_area) = layout.progress {
        let active = store.active_cards();
        let studied = active.iter().filter(|c| c.last_studied.is_some()).count();
        let bar = ProgressBar::new("Studied", stats::progress(&active), app.theme)
            .detail(format!("({studied}/{})", active.len()));
        frame.render_widget(bar, progress_area);
    }

    if let Some(ref status) = app.status {
        let color = match status.kind {
            StatusKind::Info => colors.fg(),
            StatusKind::Correct => colors.correct(),
            StatusKind::Incorrect => colors.incorrect(),
            StatusKind::Warning => colors.warning(),
        };
        let line = Paragraph::new(Line::from(Span::styled(
            format!(" {}", status.text),
            Style::default().fg(color),
        )));
        frame.render_widget(line, layout.status);
    }

    let footer_lines: Vec<Line> = hint_lines
        .into_iter()
        .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.muted()))))
        .collect();
    frame.render_widget(Paragraph::new(footer_lines), layout.footer);
}

fn render_stats(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let cards = app.session.store().cards();
    let summary = StudySummary::from_cards(cards);
    let days = stats::period_performance(cards, app.stats_period, Utc::now().date_naive());
    let centered = ui::layout::centered_rect(60, 90, layout[0]);
    frame.render_widget(
        StatsPanel::new(&summary, &days, app.stats_period, app.theme),
        centered,
    );

    let footer = Paragraph::new(Line::from(Span::styled(
        " [p/1-3] Week/Month/3 months  [ESC/s] Back ",
        Style::default().fg(colors.muted()),
    )));
    frame.render_widget(footer, layout[1]);
}

fn render_settings(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let centered = ui::layout::centered_rect(60, 80, area);

    let block = Block::bordered()
        .title(" Settings ")
        .border_style(Style::default().fg(colors.accent()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(centered);
    block.render(centered, frame.buffer_mut());

    let fields = app.settings_fields();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(fields.len() as u16 * 3),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(inner);

    let header = Paragraph::new(Line::from(Span::styled(
        "  Use arrows to navigate, Enter/Right to change, ESC to save & exit",
        Style::default().fg(colors.muted()),
    )));
    header.render(layout[0], frame.buffer_mut());

    let field_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            fields
                .iter()
                .map(|_| Constraint::Length(3))
                .collect::<Vec<_>>(),
        )
        .split(layout[1]);

    for (i, (label, value)) in fields.iter().enumerate() {
        let is_selected = i == app.settings_selected;
        let indicator = if is_selected { " > " } else { "   " };

        let label_style = Style::default()
            .fg(if is_selected {
                colors.accent()
            } else {
                colors.fg()
            })
            .add_modifier(if is_selected {
                Modifier::BOLD
            } else {
                Modifier::empty()
            });
        let value_style = Style::default().fg(if is_selected {
            colors.card_back()
        } else {
            colors.muted()
        });

        let lines = vec![
            Line::from(Span::styled(format!("{indicator}{label}:"), label_style)),
            Line::from(Span::styled(format!("  < {value} >"), value_style)),
        ];
        Paragraph::new(lines).render(field_layout[i], frame.buffer_mut());
    }

    let footer = Paragraph::new(Line::from(Span::styled(
        "  [ESC] Save & back  [Enter/arrows] Change value",
        Style::default().fg(colors.accent()),
    )));
    footer.render(layout[3], frame.buffer_mut());
}

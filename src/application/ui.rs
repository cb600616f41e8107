use std::io;
use std::time::Instant;

use anyhow::Result;
use crossterm::cursor;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use ratatui::backend::CrosstermBackend;
use ratatui::prelude::*;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Clear;
use ratatui::widgets::Gauge;
use ratatui::widgets::List;
use ratatui::widgets::ListItem;
use ratatui::widgets::ListState;
use ratatui::widgets::Padding;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Wrap;
use ratatui::Terminal;
use tokio::sync::mpsc;

use crate::domain::models::Action;
use crate::domain::models::ActionRegistry;
use crate::domain::models::ChannelMode;
use crate::domain::models::ChannelStatus;
use crate::domain::models::Event;
use crate::domain::models::Indicator;
use crate::domain::models::Notice;
use crate::domain::models::NoticeKind;
use crate::domain::services::events::EventsService;
use crate::domain::services::AppState;
use crate::domain::services::Modal;
use crate::domain::services::Snapshots;

fn status_color(status: ChannelStatus) -> Color {
    match status {
        ChannelStatus::Connected => return Color::Green,
        ChannelStatus::Connecting => return Color::Yellow,
        ChannelStatus::Disconnected => return Color::Red,
    }
}

fn indicator_color(indicator: Indicator) -> Color {
    match indicator {
        Indicator::Neutral => return Color::Reset,
        Indicator::Success => return Color::Green,
        Indicator::Failure => return Color::Red,
    }
}

fn centered_rect(percent_x: u16, height: u16, rect: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(rect);

    return Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1];
}

fn render_header<B: Backend>(frame: &mut Frame<B>, rect: Rect, app_state: &AppState) {
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Length(24), Constraint::Min(1)])
        .split(rect);

    let mut status = vec![Span::styled(
        app_state.status.to_string(),
        Style::default().fg(status_color(app_state.status)),
    )];
    if app_state.locked {
        status.push(Span::raw(" | "));
        status.push(Span::styled("submitted", Style::default().fg(Color::Cyan)));
    }
    frame.render_widget(
        Paragraph::new(Line::from(status)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(format!("taskdeck {}", app_state.mode)),
        ),
        layout[0],
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title("Assignment clock");
    match &app_state.clock {
        Some(clock) => {
            frame.render_widget(
                Gauge::default()
                    .block(block)
                    .gauge_style(Style::default().fg(Color::Magenta))
                    .ratio(clock.progress())
                    .label(format!("{} ({})", clock.display(), clock.state())),
                layout[1],
            );
        }
        None => {
            frame.render_widget(Paragraph::new("No assignment running").block(block), layout[1]);
        }
    }
}

fn render_list<B: Backend>(frame: &mut Frame<B>, rect: Rect, app_state: &AppState) {
    let (title, items) = match app_state.mode {
        ChannelMode::Control => {
            let running = app_state
                .session
                .active_assignment_id
                .as_deref()
                .filter(|_| return app_state.session.running);

            let items = app_state
                .assignments
                .iter()
                .map(|e| {
                    let mut marker = "  ";
                    if Some(e.identity()) == running {
                        marker = "▶ ";
                    } else if e.completed {
                        marker = "✓ ";
                    }
                    return ListItem::new(format!(
                        "{marker}{} ({}m)",
                        e.name,
                        e.total_time_seconds / 60
                    ));
                })
                .collect::<Vec<ListItem>>();

            ("Assignments", items)
        }
        ChannelMode::Feedback => {
            let items = app_state
                .regions
                .iter()
                .map(|e| {
                    let mut checkbox = "    ";
                    if e.is_test() {
                        checkbox = if e.checked { "[x] " } else { "[ ] " };
                    }
                    return ListItem::new(format!("{checkbox}{}", e.id))
                        .style(Style::default().fg(indicator_color(e.indicator)));
                })
                .collect::<Vec<ListItem>>();

            ("Outputs", items)
        }
    };

    let mut state = ListState::default();
    if !items.is_empty() {
        state.select(app_state.selected);
    }

    frame.render_stateful_widget(
        List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .title(title),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED)),
        rect,
        &mut state,
    );
}

fn render_details<B: Backend>(frame: &mut Frame<B>, rect: Rect, app_state: &AppState) {
    let mut text = vec![];
    let mut title = "Notices".to_string();

    if app_state.mode == ChannelMode::Feedback {
        if let Some(region) = app_state
            .selected
            .and_then(|e| return app_state.regions.get(e))
        {
            title = format!("Output: {}", region.id);
            text.extend(region.text.lines().map(|e| return Line::from(e.to_string())));
            text.push(Line::from(""));
        }
    }

    for notice in app_state.notices.iter().rev() {
        let color = match notice.kind {
            NoticeKind::Success => Color::Green,
            NoticeKind::Info => Color::Cyan,
            NoticeKind::Alert => Color::Red,
        };
        text.push(Line::from(vec![
            Span::styled(
                notice.at.format("%H:%M:%S ").to_string(),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(notice.text.to_string(), Style::default().fg(color)),
        ]));
    }

    frame.render_widget(
        Paragraph::new(text).wrap(Wrap { trim: false }).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(title)
                .padding(Padding::new(1, 1, 0, 0)),
        ),
        rect,
    );
}

fn render_help<B: Backend>(frame: &mut Frame<B>, rect: Rect, registry: &ActionRegistry) {
    let mut help = registry.describe();
    help.push("ctrl+c quit".to_string());

    frame.render_widget(
        Paragraph::new(help.join(" | ")).style(Style::default().fg(Color::DarkGray)),
        rect,
    );
}

fn render_modal<B: Backend>(frame: &mut Frame<B>, app_state: &AppState) {
    match &app_state.modal {
        Some(Modal::Confirm(prompt, _)) => {
            let rect = centered_rect(60, 7, frame.size());
            frame.render_widget(Clear, rect);
            frame.render_widget(
                Paragraph::new(vec![
                    Line::from(prompt.message.to_string()),
                    Line::from(""),
                    Line::from(Span::styled(
                        "y / Enter to confirm, n / Esc to cancel",
                        Style::default().fg(Color::DarkGray),
                    )),
                ])
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_type(BorderType::Double)
                        .title(prompt.title.to_string())
                        .padding(Padding::new(1, 1, 0, 0)),
                ),
                rect,
            );
        }
        Some(Modal::Prompt(_, textarea)) => {
            let rect = centered_rect(60, 3, frame.size());
            frame.render_widget(Clear, rect);
            frame.render_widget(textarea.widget(), rect);
        }
        None => {}
    }
}

async fn start_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app_state: &mut AppState<'_>,
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let mut events = EventsService::new(rx);
    let mut last_tick = Instant::now();

    loop {
        let now = Instant::now();
        app_state.tick(now.duration_since(last_tick));
        last_tick = now;

        terminal.draw(|frame| {
            let layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints(vec![
                    Constraint::Length(3),
                    Constraint::Min(1),
                    Constraint::Length(1),
                ])
                .split(frame.size());

            let body = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![Constraint::Percentage(35), Constraint::Percentage(65)])
                .split(layout[1]);

            render_header(frame, layout[0], app_state);
            render_list(frame, body[0], app_state);
            render_details(frame, body[1], app_state);
            render_help(frame, layout[2], &app_state.registry);
            render_modal(frame, app_state);
        })?;

        match events.next().await? {
            Event::KeyboardCTRLC() => {
                break;
            }
            Event::KeyboardInput(input) => {
                app_state.handle_input(input, &tx)?;
            }
            Event::Reload() => {
                tracing::info!("Reloading session state");
                match Snapshots::default().load().await {
                    Ok(snapshot) => app_state.reset(snapshot),
                    Err(err) => {
                        tracing::error!(error = ?err, "Unable to read snapshot");
                        app_state.add_notice(Notice::alert(&format!(
                            "Unable to read the session snapshot: {err}"
                        )));
                    }
                }
                tx.send(Action::Resynchronize())?;
            }
            Event::UITick() => {}
            event => {
                app_state.apply(event);
            }
        }
    }

    return Ok(());
}

pub fn destruct_terminal_for_panic() {
    let _ = disable_raw_mode();
    let _ = crossterm::execute!(io::stdout(), LeaveAlternateScreen);
    let _ = crossterm::execute!(io::stdout(), cursor::Show);
}

pub async fn start(
    mode: ChannelMode,
    registry: ActionRegistry,
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let snapshot = Snapshots::default().load().await?;
    let mut app_state = AppState::new(mode, registry, snapshot);

    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    enable_raw_mode()?;
    crossterm::execute!(stdout, EnterAlternateScreen)?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;

    let res = start_loop(&mut terminal, &mut app_state, tx, rx).await;

    disable_raw_mode()?;
    crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    return res;
}

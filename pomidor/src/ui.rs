use crate::app::{App, AppMode, Field};
use crate::config::accent;
use pomidor_core::display::ring_points;
use pomidor_core::{Mode, Phase};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Flex, Layout, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Points},
        Block, BorderType, Borders, Clear, Paragraph, Tabs,
    },
    Frame,
};

const RING_SAMPLES: usize = 360;

pub fn draw(f: &mut Frame, app: &App) {
    let theme = &app.config.theme;
    f.render_widget(
        Block::default().style(Style::default().bg(theme.background)),
        f.area(),
    );
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_header(f, chunks[0], app);
    draw_tabs(f, chunks[1], app);
    draw_timer(f, chunks[2], app);
    draw_status_bar(f, chunks[3], app);

    if app.mode == AppMode::Settings {
        draw_settings_overlay(f, app);
    }
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.config.theme;
    let text = Line::from(vec![Span::styled(
        "pomidor",
        Style::default()
            .fg(theme.foreground)
            .add_modifier(Modifier::BOLD),
    )]);
    f.render_widget(
        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(theme.track)),
        ),
        area,
    );
}

fn draw_tabs(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.config.theme;
    let color = accent(&app.snapshot.settings.selected_color);
    let titles: Vec<Line> = Mode::ALL
        .iter()
        .enumerate()
        .map(|(i, mode)| Line::from(format!(" {} {} ", i + 1, mode.label())))
        .collect();
    let tabs = Tabs::new(titles)
        .select(app.snapshot.mode.index())
        .style(Style::default().fg(theme.muted))
        .highlight_style(
            Style::default()
                .fg(theme.background)
                .bg(color)
                .add_modifier(Modifier::BOLD),
        )
        .divider(" ");
    let [tabs_area] = Layout::horizontal([Constraint::Length(48)])
        .flex(Flex::Center)
        .areas(area);
    f.render_widget(tabs, tabs_area);
}

fn draw_timer(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.config.theme;
    let snapshot = &app.snapshot;
    let color = accent(&snapshot.settings.selected_color);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.track));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let track = ring_points(1.0, 1.0, RING_SAMPLES);
    let elapsed = ring_points(snapshot.progress(), 1.0, RING_SAMPLES);
    let track_color = theme.track;
    // Terminal cells are about twice as tall as wide.
    let aspect = inner.width as f64 / (inner.height.max(1) as f64 * 2.0);
    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([-1.3 * aspect, 1.3 * aspect])
        .y_bounds([-1.3, 1.3])
        .paint(move |ctx| {
            ctx.draw(&Points {
                coords: &track,
                color: track_color,
            });
            ctx.draw(&Points {
                coords: &elapsed,
                color,
            });
        });
    f.render_widget(canvas, inner);

    let centre = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .split(inner);

    f.render_widget(
        Paragraph::new(snapshot.clock())
            .style(
                Style::default()
                    .fg(theme.foreground)
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center),
        centre[1],
    );
    f.render_widget(
        Paragraph::new(Span::styled(
            spaced(snapshot.button_label()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        centre[2],
    );

    let detail = match (snapshot.phase, app.ends_at()) {
        (Phase::Running, Some(end)) => format!("ends at {}", end.format("%H:%M")),
        (Phase::Expired, _) => format!("next: {}", snapshot.next_mode.label()),
        _ => format!("#{} · {}", snapshot.completed_focus + 1, snapshot.mode.label()),
    };
    f.render_widget(
        Paragraph::new(detail)
            .style(Style::default().fg(theme.muted))
            .alignment(Alignment::Center),
        centre[3],
    );
}

fn draw_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.config.theme;
    let color = accent(&app.snapshot.settings.selected_color);
    let mode_text = match app.mode {
        AppMode::Normal => "TIMER",
        AppMode::Settings => "SETTINGS",
    };
    let help = match app.mode {
        AppMode::Normal => "space:start/pause │ r:reset │ 1-3/←→:mode │ s:settings │ q:quit",
        AppMode::Settings => "↑↓:field │ ←→:change │ enter:apply │ esc:close",
    };
    let flags = format!(
        " auto-cycle:{} sound:{} ",
        on_off(app.snapshot.settings.auto_cycle_enabled),
        on_off(app.snapshot.settings.sound_enabled)
    );
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", mode_text),
            Style::default()
                .bg(color)
                .fg(theme.background)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::raw(help),
    ]);
    f.render_widget(
        Paragraph::new(line).style(Style::default().bg(theme.track).fg(theme.muted)),
        area,
    );
    f.render_widget(
        Paragraph::new(flags)
            .style(Style::default().fg(theme.muted))
            .alignment(Alignment::Right),
        area,
    );
}

fn draw_settings_overlay(f: &mut Frame, app: &App) {
    let theme = &app.config.theme;
    let settings = &app.snapshot.settings;
    let color = accent(&settings.selected_color);
    let area = centered_rect(50, 60, f.area());
    f.render_widget(Clear, area);
    let block = Block::default()
        .title(" Settings ")
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(color))
        .style(Style::default().bg(theme.background));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines: Vec<Line> = Field::ALL
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let value = match field {
                Field::Minutes(mode) => format!("‹ {:>3} › min", app.form.inputs.get(*mode)),
                Field::AutoCycle => on_off(settings.auto_cycle_enabled).to_string(),
                Field::Sound => on_off(settings.sound_enabled).to_string(),
                Field::Font => format!("‹ {} ›", settings.selected_font),
                Field::Color => format!("‹ {} ›", settings.selected_color),
            };
            let selected = i == app.form.selected;
            let marker = if selected { "▸ " } else { "  " };
            let style = if selected {
                Style::default().fg(color).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.foreground)
            };
            let mut spans = vec![
                Span::styled(marker, Style::default().fg(color)),
                Span::styled(format!("{:<12}", field.label()), style),
                Span::styled(value, style),
            ];
            if *field == Field::Color {
                spans.push(Span::styled(" ██", Style::default().fg(color)));
            }
            Line::from(spans)
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner);
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

fn spaced(label: &str) -> String {
    label
        .chars()
        .map(String::from)
        .collect::<Vec<_>>()
        .join(" ")
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_label_is_letter_spaced() {
        assert_eq!(spaced("PAUSE"), "P A U S E");
    }

    #[test]
    fn popup_is_centred() {
        let r = centered_rect(50, 50, Rect::new(0, 0, 100, 40));
        assert_eq!(r, Rect::new(25, 10, 50, 20));
    }
}

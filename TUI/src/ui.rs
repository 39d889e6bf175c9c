use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use crate::app::{ActivityKind, App};
use crate::catalog::DefenseLayer;
use crate::config::COMMANDS;
use crate::ui_state::{Focus, Screen};

// Copper Sapphire Morning color palette
const BG_DARK: Color = Color::Rgb(12, 12, 16);           // Deep background
const BG_PANEL: Color = Color::Rgb(18, 18, 24);          // Slightly lighter for panels

// Sapphire blues
const SAPPHIRE: Color = Color::Rgb(101, 150, 243);       // #6596F3 - Primary accent
const CYAN_LIGHT: Color = Color::Rgb(178, 220, 226);     // #B2DCE2 - Light cyan

// Copper/warm tones
const COPPER: Color = Color::Rgb(138, 72, 38);           // #8A4826 - Copper
const PALE_YELLOW: Color = Color::Rgb(234, 208, 148);    // #EAD094 - Pale yellow

// Accent colors
const BURGUNDY: Color = Color::Rgb(204, 92, 68);         // #CC5C44 - Warnings/errors
const OLIVE: Color = Color::Rgb(131, 179, 102);          // #83B366 - Success/green
const LAVENDER: Color = Color::Rgb(211, 164, 234);       // #D3A4EA - Purple accent

// Text colors
const TEXT_PRIMARY: Color = Color::Rgb(240, 240, 245);   // Near white
const TEXT_SECONDARY: Color = Color::Rgb(180, 180, 190); // Light gray
const TEXT_MUTED: Color = Color::Rgb(105, 116, 133);     // #697485 - Medium gray

// Border colors (subtle)
const BORDER_DIM: Color = Color::Rgb(45, 50, 60);        // Dim border
const BORDER_ACCENT: Color = Color::Rgb(70, 85, 110);    // Accent border

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

fn spinner(anim_frame: usize) -> &'static str {
    SPINNER_FRAMES[(anim_frame / 6) % SPINNER_FRAMES.len()]
}

/// Truncate to a display width, appending an ellipsis when cut
fn truncate_to_width(text: &str, max_width: usize) -> String {
    let total: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= max_width {
        return text.to_string();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

fn layer_color(layer: &DefenseLayer) -> Color {
    layer
        .rgb()
        .map(|(r, g, b)| Color::Rgb(r, g, b))
        .unwrap_or(SAPPHIRE)
}

pub fn draw(frame: &mut Frame, app: &App) {
    // Fill entire background
    let bg = Block::default().style(Style::default().bg(BG_DARK));
    frame.render_widget(bg, frame.area());

    match app.ui.screen {
        Screen::Home => draw_home(frame, app),
        Screen::Layers => draw_layers(frame, app),
    }
}

fn draw_home(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let v_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Length(5),   // Title container
            Constraint::Length(3),   // Subtitle
            Constraint::Length(3),   // Hint
            Constraint::Min(0),
        ])
        .split(area);

    let title_width = 44.min(area.width);
    let title_area = Rect {
        x: area.x + (area.width.saturating_sub(title_width)) / 2,
        y: v_chunks[1].y,
        width: title_width,
        height: v_chunks[1].height,
    };
    draw_glass_border(frame, title_area, app.animation_frame);

    // Title letters pulse through the layer colors, outermost to innermost
    let title = "D E F E N S E   I N   D E P T H";
    let spans: Vec<Span> = title
        .chars()
        .enumerate()
        .map(|(i, ch)| {
            let idx = (i / 2 + app.animation_frame / 20) % app.rings.len().max(1);
            let color = app.rings.get(idx).map(|l| layer_color(l)).unwrap_or(SAPPHIRE);
            Span::styled(ch.to_string(), Style::default().fg(color).add_modifier(Modifier::BOLD))
        })
        .collect();
    let inner = Rect {
        x: title_area.x + 1,
        y: title_area.y + 2,
        width: title_area.width.saturating_sub(2),
        height: 1,
    };
    frame.render_widget(Paragraph::new(Line::from(spans)).alignment(Alignment::Center), inner);

    let subtitle = Paragraph::new("Seven layers, one checklist at a time")
        .alignment(Alignment::Center)
        .style(Style::default().fg(TEXT_SECONDARY));
    frame.render_widget(subtitle, v_chunks[2]);

    // Press any key hint with copper glow
    let glow = (app.animation_frame as f64 / 45.0).sin().abs() * 0.5 + 0.5;
    let r = (138.0 + (216.0 - 138.0) * glow) as u8;
    let g = (72.0 + (180.0 - 72.0) * glow) as u8;
    let b = (38.0 + (169.0 - 38.0) * glow) as u8;
    let hint = Paragraph::new("[ Press any key to start ]")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Rgb(r, g, b)));
    frame.render_widget(hint, v_chunks[3]);
}

fn draw_glass_border(frame: &mut Frame, area: Rect, anim_frame: usize) {
    // Animated border - cycles between sapphire and copper
    let t = (anim_frame as f64 / 120.0).sin() * 0.5 + 0.5;
    let r = (84.0 + (138.0 - 84.0) * t) as u8;
    let g = (112.0 + (72.0 - 112.0) * t) as u8;
    let b = (156.0 + (38.0 - 156.0) * t) as u8;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(r, g, b)));
    frame.render_widget(block, area);
}

fn draw_layers(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let padded = Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    };

    let command_height = if app.ui.focus == Focus::Command { 3 } else { 0 };
    let v_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(8),                  // Rings + detail
            Constraint::Length(command_height),  // Command line
            Constraint::Length(1),               // Status bar
        ])
        .split(padded);

    let h_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(app.config.ring_panel_width),
            Constraint::Length(1),
            Constraint::Min(30),
        ])
        .split(v_chunks[0]);

    draw_rings(frame, app, h_chunks[0]);
    draw_detail(frame, app, h_chunks[2]);
    if command_height > 0 {
        draw_command_input(frame, app, v_chunks[1]);
    }
    draw_status_bar(frame, app, v_chunks[2]);

    if app.showing_command_popup() {
        draw_command_popup(frame, app, h_chunks[2], v_chunks[1].y);
    }
    if app.ui.show_activity {
        draw_activity_popup(frame, app, h_chunks[2]);
    }
    if app.ui.show_help {
        draw_help_popup(frame, area);
    }
}

/// Concentric ring view; falls back to a flat list when the panel is too small.
fn draw_rings(frame: &mut Frame, app: &App, area: Rect) {
    let rings = app.rings.len() as u16;
    if area.height < rings * 2 + 1 || area.width < rings * 4 + 6 {
        draw_ring_list(frame, app, area);
        return;
    }

    let selected = app.state.selected_id();
    let mut ring_area = area;
    for (i, layer) in app.rings.iter().enumerate() {
        let is_cursor = i == app.ui.cursor;
        let is_selected = selected == Some(layer.id.as_str());
        let color = layer_color(layer);

        let border_type = if is_selected {
            BorderType::Thick
        } else if is_cursor {
            BorderType::Double
        } else {
            BorderType::Rounded
        };
        let marker = if is_selected { "● " } else { "" };
        let mut title_style = Style::default().fg(color);
        if is_cursor {
            title_style = title_style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
        }

        let block = Block::default()
            .title(Span::styled(format!(" {}{} ", marker, layer.name), title_style))
            .borders(Borders::ALL)
            .border_type(border_type)
            .border_style(Style::default().fg(color));

        let inner = block.inner(ring_area);
        frame.render_widget(block, ring_area);
        ring_area = Rect {
            x: inner.x + 1,
            width: inner.width.saturating_sub(2),
            ..inner
        };
    }

    // Core of the rings: what is being protected
    if ring_area.height > 0 {
        let core = Paragraph::new(Line::from(Span::styled(
            "assets",
            Style::default().fg(TEXT_MUTED).add_modifier(Modifier::ITALIC),
        )))
        .alignment(Alignment::Center);
        let core_area = Rect {
            y: ring_area.y + ring_area.height / 2,
            height: 1,
            ..ring_area
        };
        frame.render_widget(core, core_area);
    }
}

fn draw_ring_list(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(Span::styled(" Layers ", Style::default().fg(SAPPHIRE).add_modifier(Modifier::BOLD)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_ACCENT));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let selected = app.state.selected_id();
    let lines: Vec<Line> = app
        .rings
        .iter()
        .enumerate()
        .map(|(i, layer)| {
            let is_cursor = i == app.ui.cursor;
            let is_selected = selected == Some(layer.id.as_str());
            let indicator = if is_cursor { ">" } else { " " };
            let dot = if is_selected { "●" } else { "○" };
            let name_style = if is_cursor {
                Style::default().fg(CYAN_LIGHT).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(TEXT_SECONDARY)
            };
            Line::from(vec![
                Span::styled(format!("{} ", indicator), Style::default().fg(CYAN_LIGHT)),
                Span::styled(format!("{} ", dot), Style::default().fg(layer_color(layer))),
                Span::styled(layer.name.clone(), name_style),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_detail(frame: &mut Frame, app: &App, area: Rect) {
    let Some(layer) = &app.state.selected_layer else {
        draw_intro(frame, app, area);
        return;
    };
    let color = layer_color(layer);

    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", layer.name),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
        .style(Style::default().bg(BG_PANEL));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(layer.description.clone(), Style::default().fg(TEXT_PRIMARY))),
        Line::from(""),
        Line::from(Span::styled(
            "Key points",
            Style::default().fg(COPPER).add_modifier(Modifier::BOLD),
        )),
    ];
    for detail in &layer.details {
        lines.push(Line::from(vec![
            Span::styled("  • ", Style::default().fg(color)),
            Span::styled(detail.clone(), Style::default().fg(TEXT_SECONDARY)),
        ]));
    }
    lines.push(Line::from(""));
    lines.extend(checklist_lines(app));

    let detail = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(detail, Rect {
        x: inner.x + 1,
        width: inner.width.saturating_sub(2),
        ..inner
    });
}

fn checklist_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        "AI security checklist",
        Style::default().fg(LAVENDER).add_modifier(Modifier::BOLD),
    ))];

    if app.state.is_loading {
        lines.push(Line::from(vec![
            Span::styled(format!("  {} ", spinner(app.animation_frame)), Style::default().fg(SAPPHIRE)),
            Span::styled("Generating checklist...", Style::default().fg(TEXT_SECONDARY)),
        ]));
    } else if let Some(error) = &app.state.error {
        lines.push(Line::from(vec![
            Span::styled("  ✗ ", Style::default().fg(BURGUNDY)),
            Span::styled(error.clone(), Style::default().fg(BURGUNDY)),
        ]));
        lines.push(Line::from(Span::styled(
            "  Press g to try again",
            Style::default().fg(TEXT_MUTED),
        )));
    } else if let Some(items) = &app.state.generated_checklist {
        for (i, item) in items.iter().enumerate() {
            lines.push(Line::from(vec![
                Span::styled(format!("  {}. ", i + 1), Style::default().fg(OLIVE)),
                Span::styled(item.clone(), Style::default().fg(TEXT_PRIMARY)),
            ]));
        }
        lines.push(Line::from(Span::styled(
            "  y copy  g regenerate",
            Style::default().fg(TEXT_MUTED),
        )));
    } else {
        let hint = if app.offline {
            "  Offline: checklist generation is unavailable"
        } else {
            "  Press g to generate a checklist"
        };
        lines.push(Line::from(Span::styled(hint, Style::default().fg(TEXT_MUTED))));
    }

    lines
}

fn draw_intro(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(Span::styled(" No layer selected ", Style::default().fg(TEXT_MUTED)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_DIM));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cursor_name = app
        .cursor_layer()
        .map(|l| l.name.clone())
        .unwrap_or_default();
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Each ring is one layer of defense.",
            Style::default().fg(TEXT_SECONDARY),
        )),
        Line::from(Span::styled(
            " An attacker has to get through all of them to reach your data.",
            Style::default().fg(TEXT_SECONDARY),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(" ↑/↓ ", Style::default().fg(SAPPHIRE).add_modifier(Modifier::BOLD)),
            Span::styled("move   ", Style::default().fg(TEXT_MUTED)),
            Span::styled("Enter ", Style::default().fg(SAPPHIRE).add_modifier(Modifier::BOLD)),
            Span::styled(format!("select {}", cursor_name), Style::default().fg(TEXT_MUTED)),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn draw_command_input(frame: &mut Frame, app: &App, area: Rect) {
    // Pulsing border while the command line has focus
    let glow = (app.animation_frame as f64 / 90.0).sin() * 0.3 + 0.7;
    let border_color = Color::Rgb((101.0 * glow) as u8, (150.0 * glow) as u8, (243.0 * glow) as u8);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cursor = if app.animation_frame % 30 < 15 { "|" } else { " " };
    let input = Paragraph::new(format!(" {}{}", app.ui.input, cursor))
        .style(Style::default().fg(TEXT_PRIMARY));
    frame.render_widget(input, inner);
}

fn draw_command_popup(frame: &mut Frame, app: &App, detail_area: Rect, input_y: u16) {
    let filtered = app.get_filtered_commands();
    if filtered.is_empty() {
        return;
    }

    let popup_height = (filtered.len() + 2) as u16;
    let popup_width = 44.min(detail_area.width.saturating_sub(4));
    let popup_area = Rect {
        x: detail_area.x + 2,
        y: input_y.saturating_sub(popup_height),
        width: popup_width,
        height: popup_height,
    };

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(Span::styled(" Commands ", Style::default().fg(COPPER).add_modifier(Modifier::BOLD)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(COPPER))
        .style(Style::default().bg(BG_PANEL));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let lines: Vec<Line> = filtered
        .iter()
        .enumerate()
        .map(|(i, (cmd, desc))| {
            // Tab completes to the first match
            let style = if i == 0 {
                Style::default().fg(CYAN_LIGHT).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(TEXT_SECONDARY)
            };
            Line::from(vec![
                Span::styled(format!(" {} ", cmd), style),
                Span::styled(format!("- {}", desc), Style::default().fg(TEXT_MUTED)),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans: Vec<Span> = Vec::new();

    if app.offline {
        spans.push(Span::styled(" offline ", Style::default().fg(BG_DARK).bg(TEXT_MUTED)));
        spans.push(Span::raw(" "));
    }
    if app.is_generating() {
        spans.push(Span::styled(
            format!("{} generating ", spinner(app.animation_frame)),
            Style::default().fg(SAPPHIRE),
        ));
    }

    if let Some(status) = &app.ui.status_message {
        let used: usize = spans.iter().map(|s| s.width()).sum();
        let room = (area.width as usize).saturating_sub(used + 1);
        spans.push(Span::styled(
            truncate_to_width(status, room),
            Style::default().fg(PALE_YELLOW),
        ));
    } else {
        for (key, label) in [("↑↓", "move"), ("Enter", "select"), ("g", "generate"), ("/", "cmds"), ("?", "help"), ("q", "quit")] {
            spans.push(Span::styled(key, Style::default().fg(SAPPHIRE).add_modifier(Modifier::BOLD)));
            spans.push(Span::styled(format!(" {}  ", label), Style::default().fg(TEXT_MUTED)));
        }
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_activity_popup(frame: &mut Frame, app: &App, detail_area: Rect) {
    let popup_height = (app.activity.len() as u16 + 2).clamp(3, 12);
    let popup_width = 60.min(detail_area.width.saturating_sub(4));
    let popup_area = Rect {
        x: detail_area.x + 2,
        y: detail_area.y + 1,
        width: popup_width,
        height: popup_height.min(detail_area.height),
    };

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(Span::styled(" Activity ", Style::default().fg(SAPPHIRE).add_modifier(Modifier::BOLD)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_ACCENT))
        .style(Style::default().bg(Color::Rgb(16, 20, 28)));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    if app.activity.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(" Nothing yet", Style::default().fg(TEXT_MUTED))),
            inner,
        );
        return;
    }

    // Newest entries at the bottom, keep the tail visible
    let visible = inner.height as usize;
    let skip = app.activity.len().saturating_sub(visible);
    let max_msg = (inner.width as usize).saturating_sub(13);
    let lines: Vec<Line> = app
        .activity
        .iter()
        .skip(skip)
        .map(|entry| {
            let (icon, color) = match entry.kind {
                ActivityKind::Selection => ("›", CYAN_LIGHT),
                ActivityKind::Request => ("…", SAPPHIRE),
                ActivityKind::Success => ("✓", OLIVE),
                ActivityKind::Failure => ("✗", BURGUNDY),
            };
            Line::from(vec![
                Span::styled(
                    format!(" {} ", entry.timestamp.format("%H:%M:%S")),
                    Style::default().fg(TEXT_MUTED),
                ),
                Span::styled(format!("{} ", icon), Style::default().fg(color)),
                Span::styled(truncate_to_width(&entry.message, max_msg), Style::default().fg(TEXT_PRIMARY)),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_help_popup(frame: &mut Frame, area: Rect) {
    let keys = [
        ("↑ ↓ / k j", "Move between rings"),
        ("Enter / Space", "Select layer"),
        ("Backspace", "Clear selection"),
        ("g", "Generate checklist"),
        ("y", "Copy checklist"),
        ("a", "Activity log"),
        ("/", "Command line"),
        ("Esc / q", "Close popup / quit"),
    ];

    let popup_height = (keys.len() + COMMANDS.len() + 5) as u16;
    let popup_width = 52.min(area.width.saturating_sub(4));
    let popup_area = Rect {
        x: area.x + area.width.saturating_sub(popup_width) / 2,
        y: area.y + area.height.saturating_sub(popup_height) / 2,
        width: popup_width,
        height: popup_height.min(area.height),
    };

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(Span::styled(" Help ", Style::default().fg(LAVENDER).add_modifier(Modifier::BOLD)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(LAVENDER))
        .style(Style::default().bg(BG_PANEL));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let mut lines = vec![Line::from(Span::styled(" Keys", Style::default().fg(COPPER).add_modifier(Modifier::BOLD)))];
    for (key, desc) in keys {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<15}", key), Style::default().fg(SAPPHIRE)),
            Span::styled(desc, Style::default().fg(TEXT_SECONDARY)),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(" Commands", Style::default().fg(COPPER).add_modifier(Modifier::BOLD))));
    for (cmd, desc) in COMMANDS {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<15}", cmd), Style::default().fg(SAPPHIRE)),
            Span::styled(*desc, Style::default().fg(TEXT_SECONDARY)),
        ]));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::backend::OfflineBackend;
    use crate::catalog::LayerCatalog;
    use crate::config::Config;
    use crate::controller::Controller;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn offline_app() -> App {
        let controller = Controller::new(
            Arc::new(LayerCatalog::defense_in_depth().unwrap()),
            Arc::new(OfflineBackend),
        );
        App::new(Arc::new(controller), Config::default(), true)
    }

    fn render(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("exactly10!", 10), "exactly10!");
        assert_eq!(truncate_to_width("a longer message", 8), "a longe…");
        // Wide characters count double
        assert_eq!(truncate_to_width("防御纵深", 5), "防御…");
    }

    #[test]
    fn test_spinner_cycles() {
        assert_eq!(spinner(0), "⠋");
        assert_eq!(spinner(6), "⠙");
        assert_eq!(spinner(60), "⠋");
    }

    #[test]
    fn test_home_screen_renders() {
        let app = offline_app();
        let screen = render(&app, 100, 30);
        assert!(screen.contains("Press any key to start"));
    }

    #[test]
    fn test_layers_screen_shows_rings_and_selection() {
        let mut app = offline_app();
        app.ui.screen = Screen::Layers;
        app.dispatch(Action::Select { id: "network".to_string() });

        let screen = render(&app, 120, 40);

        assert!(screen.contains("Physical Security"));
        assert!(screen.contains("● Network"));
        assert!(screen.contains("Deny by default."));
        assert!(screen.contains("Offline: checklist generation is unavailable"));
    }

    #[test]
    fn test_small_terminal_falls_back_to_list() {
        let mut app = offline_app();
        app.ui.screen = Screen::Layers;
        app.ui.show_help = true;
        app.ui.show_activity = true;

        let screen = render(&app, 60, 12);
        assert!(screen.contains("Help"));

        app.ui.show_help = false;
        app.ui.show_activity = false;
        let screen = render(&app, 60, 12);
        assert!(screen.contains("Layers"));
        assert!(screen.contains("> ○ Physical Security"));
    }
}

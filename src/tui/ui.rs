//! UI rendering for the visualizer.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    style::{Color, Style, Modifier},
};
use crate::cpu::{decode, BusEndpoint, BusEvent, BusKind, ComponentId};
use crate::labels;
use super::app::{Overlay, VisualizerApp};

/// Main draw function.
pub fn draw(frame: &mut Frame, app: &VisualizerApp) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Min(12),
            Constraint::Length(7),
            Constraint::Length(3),
        ])
        .split(frame.area());

    draw_banner(frame, rows[0], app);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(50),
            Constraint::Percentage(50),
        ])
        .split(rows[1]);

    draw_registers(frame, columns[0], app);
    draw_memory(frame, columns[1], app);
    draw_bus(frame, rows[2], app);
    draw_status(frame, rows[3], app);

    match app.overlay {
        Overlay::None => {}
        Overlay::Buses => draw_bus_info(frame),
        Overlay::Registers => draw_register_info(frame),
    }
}

/// Phase, description and explanation of the current step.
fn draw_banner(frame: &mut Frame, area: Rect, app: &VisualizerApp) {
    let step = app.engine.step();
    let content = vec![
        Line::from(Span::styled(
            labels::step_banner(step),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            labels::step_explanation(step),
            Style::default().fg(Color::Gray),
        )),
    ];

    let paragraph = Paragraph::new(content)
        .wrap(Wrap { trim: true })
        .block(Block::default()
            .title(format!(" {} ", step.phase()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)));

    frame.render_widget(paragraph, area);
}

/// Draw CPU registers.
fn draw_registers(frame: &mut Frame, area: Rect, app: &VisualizerApp) {
    let regs = app.engine.registers();
    let active = app.engine.active_highlight();

    let row = |name: &str, value: String, id: ComponentId| {
        let style = if active == Some(id) {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        let marker = if active == Some(id) { "▶ " } else { "  " };
        Line::from(vec![
            Span::styled(marker.to_string(), style),
            Span::raw(format!("{:<4}", name)),
            Span::styled(value, style),
        ])
    };

    let content = vec![
        Line::from(Span::styled("Control Unit", Style::default().fg(Color::DarkGray))),
        row("PC", regs.pc.to_string(), ComponentId::Pc),
        row("MAR", regs.mar_text(), ComponentId::Mar),
        row("MDR", regs.mdr_text().to_string(), ComponentId::Mdr),
        row("CIR", regs.cir_text().to_string(), ComponentId::Cir),
        Line::from(Span::styled(
            match regs.cir.as_deref().map(decode::decode) {
                Some(Ok(instr)) if instr.opcode.takes_operand() => {
                    format!("      {} → address {}", instr.opcode, instr.operand)
                }
                Some(Ok(instr)) => format!("      {}", instr.opcode),
                Some(Err(e)) => format!("      {}", e),
                None => String::new(),
            },
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled("ALU", Style::default().fg(Color::DarkGray))),
        row("ACC", regs.acc.to_string(), ComponentId::Acc),
    ];

    let cpu_active = active.map(|c| c.is_register()).unwrap_or(false);
    let border = if cpu_active { Color::Yellow } else { Color::Green };

    let paragraph = Paragraph::new(content)
        .block(Block::default()
            .title(" CPU ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)));

    frame.render_widget(paragraph, area);
}

/// Draw memory view.
fn draw_memory(frame: &mut Frame, area: Rect, app: &VisualizerApp) {
    let active = app.engine.active_highlight();
    let pc = app.engine.registers().pc;

    let items: Vec<ListItem> = app.engine.memory().dump()
        .into_iter()
        .map(|(addr, cell)| {
            let is_active = active == Some(ComponentId::RamCell(addr));
            let prefix = if is_active { "▶ " } else { "  " };
            let text = format!("{}{:>2}: {}", prefix, addr, cell);

            let style = if is_active {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if addr == pc {
                Style::default().fg(Color::Cyan)
            } else if cell == crate::cpu::memory::EMPTY_CELL {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::White)
            };

            ListItem::new(text).style(style)
        })
        .collect();

    let ram_active = matches!(active, Some(ComponentId::RamCell(_)));
    let border = if ram_active { Color::Yellow } else { Color::Magenta };

    let list = List::new(items)
        .block(Block::default()
            .title(" RAM ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)));

    frame.render_widget(list, area);
}

/// Draw the bus lane with the moving transfer dot.
fn draw_bus(frame: &mut Frame, area: Rect, app: &VisualizerApp) {
    let width = area.width.saturating_sub(2) as usize;
    let bus = app.engine.bus_event().filter(|b| b.is_moving());

    let mut lane: Vec<char> = vec!['─'; width];
    let mut labels_row: Vec<char> = vec![' '; width];
    for endpoint in [BusEndpoint::ControlUnit, BusEndpoint::Ram, BusEndpoint::Alu] {
        let col = lane_column(endpoint.position(), width);
        if let Some(c) = lane.get_mut(col) {
            *c = '┼';
        }
        let label = endpoint.label();
        let start = col.saturating_sub(label.len() / 2);
        for (i, ch) in label.chars().enumerate() {
            if let Some(c) = labels_row.get_mut(start + i) {
                *c = ch;
            }
        }
    }

    let mut lane_spans = Vec::new();
    match bus {
        Some(event) => {
            let dot = lane_column(event.position_at(app.engine.progress()), width);
            let before: String = lane.iter().take(dot).collect();
            let after: String = lane.iter().skip(dot + 1).collect();
            lane_spans.push(Span::styled(before, Style::default().fg(Color::DarkGray)));
            lane_spans.push(Span::styled("●", Style::default().fg(bus_color(event.kind)).add_modifier(Modifier::BOLD)));
            lane_spans.push(Span::styled(after, Style::default().fg(Color::DarkGray)));
        }
        None => {
            let text: String = lane.iter().collect();
            lane_spans.push(Span::styled(text, Style::default().fg(Color::DarkGray)));
        }
    }

    let mut content = vec![
        Line::from(labels_row.into_iter().collect::<String>()),
        Line::from(lane_spans),
    ];
    if let Some(event) = app.engine.bus_event() {
        content.push(Line::from(Span::styled(
            format!("{}: {}", event.kind.name(), event.rationale),
            Style::default().fg(bus_color(event.kind)),
        )));
    }

    let title = match bus {
        Some(event) => format!(" System Bus ({}) ", describe_route(event)),
        None => " System Bus ".to_string(),
    };

    let paragraph = Paragraph::new(content)
        .wrap(Wrap { trim: false })
        .block(Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue)));

    frame.render_widget(paragraph, area);
}

/// Draw status bar.
fn draw_status(frame: &mut Frame, area: Rect, app: &VisualizerApp) {
    let button_style = if app.engine.is_halted() || app.engine.is_busy() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    };

    let mut spans = vec![
        Span::styled(format!("[n] {}", app.button_label()), button_style),
        Span::raw("  [x] Reset  [b] Bus Info  [g] Registers  [q] Quit   "),
        Span::styled(app.status.clone(), Style::default().fg(Color::White)),
    ];
    if let Some(fault) = app.engine.last_fault() {
        spans.push(Span::styled(format!("  ⚠ {}", fault), Style::default().fg(Color::Red)));
    }

    let status = Paragraph::new(Line::from(spans))
        .block(Block::default()
            .title(" Status ")
            .borders(Borders::ALL));

    frame.render_widget(status, area);
}

/// The three buses, as a popup.
fn draw_bus_info(frame: &mut Frame) {
    let mut content = Vec::new();
    for kind in BusKind::ALL {
        content.push(Line::from(Span::styled(
            format!("● {}", kind.name()),
            Style::default().fg(bus_color(kind)).add_modifier(Modifier::BOLD),
        )));
        content.push(Line::from(labels::describe_bus(kind)));
        content.push(Line::from(""));
    }
    draw_popup(frame, " The three buses in Von Neumann Architecture ", content);
}

/// Register reference, as a popup.
fn draw_register_info(frame: &mut Frame) {
    let mut content = Vec::new();
    for (name, text) in labels::REGISTER_INFO {
        content.push(Line::from(Span::styled(
            name,
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        )));
        content.push(Line::from(text));
        content.push(Line::from(""));
    }
    draw_popup(frame, " The registers in Von Neumann Architecture ", content);
}

fn draw_popup(frame: &mut Frame, title: &str, content: Vec<Line>) {
    let area = centered(frame.area(), 80, 80);
    let popup = Paragraph::new(content)
        .wrap(Wrap { trim: true })
        .block(Block::default()
            .title(title.to_string())
            .title_bottom(" Esc to close ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)));

    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}

/// A rectangle of the given percentage size in the middle of `area`.
fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// Column of a lane position (percent) inside a lane `width` cells wide.
fn lane_column(percent: u16, width: usize) -> usize {
    if width == 0 {
        return 0;
    }
    (percent as usize * (width - 1)) / 100
}

fn describe_route(event: &BusEvent) -> String {
    format!("{} → {}", event.source.endpoint().label(), event.destination.endpoint().label())
}

/// Address blue, data red, control green.
fn bus_color(kind: BusKind) -> Color {
    match kind {
        BusKind::Address => Color::Blue,
        BusKind::Data => Color::Red,
        BusKind::Control => Color::Green,
    }
}

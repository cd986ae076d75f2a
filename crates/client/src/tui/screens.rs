use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};

use nimmt::render::PlayerMarker;
use nimmt::{BoardLayout, Card, ConnectionState, Point, Scene};

use super::{Controls, Focus};
use crate::play::Board;

pub fn render(frame: &mut Frame, board: &Board<'_>, controls: Controls, notice: Option<&str>) {
    let area = frame.area();

    let block = Block::default()
        .title(" 6 nimmt! ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    render_board(frame, chunks[0], board.scene, controls);
    render_status(frame, chunks[1], board, notice);

    let help = Paragraph::new("Tab Hand/Stacks  ←→ Move  Enter Play  1-9 Pick stack  Q Quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(help, chunks[2]);
}

fn render_board(frame: &mut Frame, area: Rect, scene: &Scene, controls: Controls) {
    let layout = scene.layout;
    let stack_count = scene.stacks.len();

    for (index, marker) in scene.players.iter().enumerate() {
        if let Some(rect) = place(area, layout.marker(index), layout.marker_spacing, 1) {
            frame.render_widget(Paragraph::new(marker_glyph(marker)), rect);
        }
    }

    for (row, stack) in scene.stacks.iter().enumerate() {
        let selected = controls.focus == Focus::Stacks && controls.cursor == row;
        if stack.cards.is_empty() && selected {
            draw_slot(frame, area, &layout, layout.pile_slot(row, 0), Color::Yellow);
        }
        for (slot, view) in stack.cards.iter().enumerate() {
            if !view.hidden {
                let border = if selected { Color::Yellow } else { Color::White };
                draw_card(frame, area, &layout, layout.pile_slot(row, slot), view.card, border);
            }
        }
    }

    for (index, other) in scene.others.iter().enumerate() {
        let label = format!("{} ({})", other.name, other.total);
        draw_label(frame, area, &layout, layout.other_block(stack_count, index), label);
        if let Some(card) = other.played {
            let at = layout.other_played(stack_count, index);
            draw_card(frame, area, &layout, at, card, Color::White);
        }
    }

    if let Some(own) = &scene.own {
        let label = format!("{} ({} pts)", own.name, own.total);
        draw_label(frame, area, &layout, layout.own_label(stack_count), label);
        if let Some(card) = own.played {
            draw_card(frame, area, &layout, layout.own_played(stack_count), card, Color::Green);
        }
        for (position, hand_card) in own.hand.iter().enumerate() {
            let selected = controls.focus == Focus::Hand && controls.cursor == position;
            let border = if selected { Color::Yellow } else { Color::White };
            let at = layout.hand_slot(stack_count, position);
            draw_card(frame, area, &layout, at, hand_card.card, border);
        }
    }

    for sprite in &scene.sprites {
        draw_card(frame, area, &layout, sprite.at, sprite.card, Color::Magenta);
    }
}

fn render_status(frame: &mut Frame, area: Rect, board: &Board<'_>, notice: Option<&str>) {
    let (label, color) = match board.state {
        ConnectionState::Synchronized => ("online", Color::Green),
        ConnectionState::AwaitingReconnectAck => ("syncing", Color::Yellow),
        ConnectionState::Connecting => ("connecting", Color::Yellow),
        ConnectionState::Disconnected => ("offline", Color::Red),
    };

    let mut spans = vec![
        Span::styled(label, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::styled(
            format!("  {}", board.address),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    let chooser = board.scene.players.iter().find(|marker| marker.choosing_stack);
    match chooser {
        Some(marker) if marker.is_self && board.gate.awaiting_stack_choice() => {
            spans.push(Span::styled(
                "  Choose a stack to take",
                Style::default().fg(Color::Yellow),
            ));
        }
        Some(marker) if !marker.is_self => {
            spans.push(Span::styled(
                format!("  Waiting for {} to take a stack", marker.player),
                Style::default().fg(Color::DarkGray),
            ));
        }
        _ => {}
    }
    if let Some(notice) = notice {
        spans.push(Span::styled(
            format!("  {}", notice),
            Style::default().fg(Color::Red),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn marker_glyph(marker: &PlayerMarker) -> Span<'static> {
    let (glyph, color) = if marker.choosing_stack {
        ("!", Color::Red)
    } else if marker.awaiting_card {
        ("…", Color::Yellow)
    } else {
        ("●", Color::Green)
    };
    let mut style = Style::default().fg(color);
    if marker.is_self {
        style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
    }
    Span::styled(glyph, style)
}

fn draw_card(
    frame: &mut Frame,
    area: Rect,
    layout: &BoardLayout,
    at: Point,
    card: Card,
    border: Color,
) {
    let Some(rect) = place(area, at, layout.card_width, layout.card_height) else {
        return;
    };
    let lines = vec![
        Line::from(Span::styled(
            card.face.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("+{}", card.value),
            Style::default().fg(Color::Red),
        )),
    ];
    let widget = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border)),
    );
    frame.render_widget(Clear, rect);
    frame.render_widget(widget, rect);
}

fn draw_slot(frame: &mut Frame, area: Rect, layout: &BoardLayout, at: Point, border: Color) {
    if let Some(rect) = place(area, at, layout.card_width, layout.card_height) {
        let widget = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border));
        frame.render_widget(widget, rect);
    }
}

fn draw_label(frame: &mut Frame, area: Rect, layout: &BoardLayout, at: Point, label: String) {
    if let Some(rect) = place(area, at, layout.block_width, 1) {
        frame.render_widget(Paragraph::new(label), rect);
    }
}

/// Maps board cells onto the terminal, clipped to `area`. `None` when
/// nothing of it would be visible.
fn place(area: Rect, at: Point, width: u16, height: u16) -> Option<Rect> {
    let x = area.x.saturating_add(at.x.max(0.0).round() as u16);
    let y = area.y.saturating_add(at.y.max(0.0).round() as u16);
    let rect = Rect::new(x, y, width, height).intersection(area);
    (!rect.is_empty()).then_some(rect)
}

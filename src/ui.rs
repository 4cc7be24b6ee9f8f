use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{block::Title, Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};

use crate::action::Action;
use crate::battle::{self, BattleCommand, BattleKind, BattleState};
use crate::creature::Creature;
use crate::grid::{Cell, Position};
use crate::state::{AppState, Direction as MoveDir, Screen, BATTLE_LOG_WINDOW, MAP_LOG_WINDOW};

const BG_BASE: Color = Color::Rgb(24, 36, 26);
const BG_PANEL: Color = Color::Rgb(34, 58, 38);
const BG_PANEL_ALT: Color = Color::Rgb(28, 48, 32);
const BG_HEADER: Color = Color::Rgb(26, 46, 34);
const TEXT_MAIN: Color = Color::Rgb(228, 236, 214);
const TEXT_DIM: Color = Color::Rgb(172, 186, 160);
const ACCENT_GREEN: Color = Color::Rgb(104, 204, 120);
const ACCENT_GOLD: Color = Color::Rgb(222, 196, 120);
const ACCENT_RED: Color = Color::Rgb(220, 96, 96);
const HIGHLIGHT_BG: Color = ACCENT_GREEN;
const HIGHLIGHT_TEXT: Color = Color::Rgb(16, 26, 18);
const BORDER_ACCENT: Color = Color::Rgb(74, 98, 82);

const CELL_GRASS: Color = Color::Rgb(38, 120, 64);
const CELL_CENTER: Color = Color::Rgb(214, 110, 130);
const CELL_MART: Color = Color::Rgb(92, 140, 210);

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    frame.render_widget(Block::default().style(Style::default().bg(BG_BASE)), area);
    if area.width < 30 || area.height < 16 {
        let warning = Paragraph::new("Terminal too small - expand window.")
            .style(Style::default().fg(TEXT_DIM))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(warning, area);
        return;
    }
    match state.screen {
        Screen::Start => render_start(frame, area, state),
        Screen::Map => render_map_screen(frame, area, state),
        Screen::Battle => render_battle(frame, area, state),
    }
}

pub fn handle_key(key: KeyEvent, state: &AppState) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }
    match state.screen {
        Screen::Start => handle_start_key(key, state),
        Screen::Map => handle_map_key(key),
        Screen::Battle => handle_battle_key(key, state),
    }
}

fn handle_start_key(key: KeyEvent, state: &AppState) -> Option<Action> {
    let count = state.data.starters.len();
    match key.code {
        KeyCode::Up | KeyCode::Char('w') => {
            let new_idx = if state.starter_cursor == 0 {
                count.saturating_sub(1)
            } else {
                state.starter_cursor - 1
            };
            Some(Action::StarterSelect(new_idx))
        }
        KeyCode::Down | KeyCode::Char('s') => {
            let new_idx = if state.starter_cursor + 1 >= count {
                0
            } else {
                state.starter_cursor + 1
            };
            Some(Action::StarterSelect(new_idx))
        }
        KeyCode::Enter => Some(Action::StarterConfirm),
        KeyCode::Char('q') => Some(Action::Quit),
        _ => None,
    }
}

fn handle_map_key(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Up | KeyCode::Char('w') => Some(Action::Move(MoveDir::Up)),
        KeyCode::Down | KeyCode::Char('s') => Some(Action::Move(MoveDir::Down)),
        KeyCode::Left | KeyCode::Char('a') => Some(Action::Move(MoveDir::Left)),
        KeyCode::Right | KeyCode::Char('d') => Some(Action::Move(MoveDir::Right)),
        KeyCode::Char('r') => Some(Action::MapRefresh),
        KeyCode::Char('b') => Some(Action::ShopBuy),
        KeyCode::Char('q') => Some(Action::Quit),
        _ => None,
    }
}

fn handle_battle_key(key: KeyEvent, state: &AppState) -> Option<Action> {
    let battle = state.battle.as_ref()?;
    let len = menu_entries(battle, &state.party).len();

    match key.code {
        KeyCode::Up => Some(Action::BattleMenuSelect(wrap_prev(battle.cursor, len))),
        KeyCode::Down => Some(Action::BattleMenuSelect(wrap_next(battle.cursor, len))),
        KeyCode::Enter => Some(Action::BattleMenuConfirm),
        KeyCode::Esc if battle.switching => Some(Action::BattleSwitchClose),
        KeyCode::Char(digit @ '1'..='9') => {
            let index = digit as usize - '1' as usize;
            if battle.switching {
                Some(Action::BattleSwitch(index))
            } else if index < 4 {
                Some(Action::BattleAttack(index))
            } else {
                None
            }
        }
        KeyCode::Char('c') if !battle.switching => Some(Action::BattleCatch),
        KeyCode::Char('r') if !battle.switching => Some(Action::BattleRun),
        KeyCode::Char('s') if !battle.switching => Some(Action::BattleSwitchOpen),
        _ => None,
    }
}

fn wrap_prev(cursor: usize, len: usize) -> usize {
    if cursor == 0 {
        len.saturating_sub(1)
    } else {
        cursor - 1
    }
}

fn wrap_next(cursor: usize, len: usize) -> usize {
    if cursor + 1 >= len {
        0
    } else {
        cursor + 1
    }
}

fn render_start(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = panel_block(" CHOOSE YOUR STARTER ", BG_PANEL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = vec![
        Line::from(Span::styled(
            "Pick the Pokémon that will travel with you.",
            Style::default().fg(TEXT_DIM),
        )),
        Line::from(""),
    ];
    for (idx, starter) in state.data.starters.iter().enumerate() {
        let moves: Vec<String> = starter.moves.iter().map(|mv| mv.label()).collect();
        let label = format!(
            " {:<12} HP {:>3}   {} ",
            starter.name,
            starter.max_hp,
            moves.join(", ")
        );
        lines.push(menu_line(&label, idx == state.starter_cursor));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "↑/↓: Choose  |  Enter: Confirm  |  Q: Quit",
        Style::default().fg(TEXT_DIM),
    )));

    let paragraph = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, inner);
}

fn render_map_screen(frame: &mut Frame, area: Rect, state: &AppState) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(MAP_LOG_WINDOW as u16 + 2),
            Constraint::Length(1),
        ])
        .split(area);

    render_map_header(frame, layout[0], state);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(30)])
        .split(layout[1]);
    render_grid(frame, columns[0], state);
    render_party_panel(frame, columns[1], state);
    render_log(frame, layout[2], state, MAP_LOG_WINDOW);
    render_map_help(frame, layout[3], state);
}

fn render_map_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = panel_block(" ROUTE ", BG_HEADER);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let line = Line::from(vec![
        Span::styled(
            format!("₽{}", state.money),
            Style::default()
                .fg(ACCENT_GOLD)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  •  "),
        Span::styled(format!("Balls {}", state.pokeballs), Style::default().fg(TEXT_MAIN)),
        Span::raw("  •  "),
        Span::styled(format!("Caught {}", state.caught.len()), Style::default().fg(TEXT_MAIN)),
        Span::raw("  •  "),
        Span::styled(
            format!("Trainers beaten {}", state.defeated_trainers.len()),
            Style::default().fg(TEXT_DIM),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}

fn render_grid(frame: &mut Frame, area: Rect, state: &AppState) {
    let title = format!(" MAP {}x{} ", state.grid.rows, state.grid.cols);
    let block = panel_block(title.as_str(), BG_PANEL_ALT);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = (0..state.grid.rows)
        .map(|row| {
            let spans: Vec<Span> = (0..state.grid.cols)
                .map(|col| {
                    let (glyph, style) = cell_glyph(state, Position::new(row, col));
                    Span::styled(format!(" {glyph}"), style)
                })
                .collect();
            Line::from(spans)
        })
        .collect();
    frame.render_widget(Paragraph::new(Text::from(lines)), inner);
}

/// Glyph for one map cell. The player always wins.
pub fn cell_glyph(state: &AppState, pos: Position) -> (char, Style) {
    if pos == state.player {
        return (
            '@',
            Style::default()
                .fg(ACCENT_GOLD)
                .add_modifier(Modifier::BOLD),
        );
    }
    match state.grid.cell(pos).unwrap_or(Cell::Empty) {
        Cell::Empty => ('.', Style::default().fg(TEXT_DIM)),
        Cell::Grass => ('"', Style::default().fg(CELL_GRASS)),
        Cell::Center => ('+', Style::default().fg(CELL_CENTER).add_modifier(Modifier::BOLD)),
        Cell::Mart => ('$', Style::default().fg(CELL_MART).add_modifier(Modifier::BOLD)),
        Cell::Trainer if state.is_trainer_cleared(pos) => ('✓', Style::default().fg(ACCENT_GREEN)),
        Cell::Trainer => ('T', Style::default().fg(ACCENT_RED).add_modifier(Modifier::BOLD)),
    }
}

fn render_party_panel(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = panel_block(" PARTY ", BG_PANEL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = Vec::new();
    for member in &state.party {
        lines.extend(member_lines(member));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "@ you  \" grass  + center",
        Style::default().fg(TEXT_DIM),
    )));
    lines.push(Line::from(Span::styled(
        "T trainer  ✓ beaten  $ mart",
        Style::default().fg(TEXT_DIM),
    )));
    let paragraph = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, inner);
}

fn member_lines(member: &Creature) -> Vec<Line<'static>> {
    let mut name = vec![Span::styled(
        member.name.clone(),
        Style::default()
            .fg(ACCENT_GREEN)
            .add_modifier(Modifier::BOLD),
    )];
    if member.is_fainted() {
        name.push(Span::styled(" (fainted)", Style::default().fg(ACCENT_RED)));
    }
    vec![Line::from(name), hp_line(member.hp, member.max_hp)]
}

fn render_log(frame: &mut Frame, area: Rect, state: &AppState, window: usize) {
    let block = panel_block(" LOG ", BG_PANEL_ALT);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let window = window.min(inner.height as usize);
    let lines: Vec<Line> = state
        .log
        .recent(window)
        .map(|entry| Line::from(entry.to_string()))
        .collect();
    let paragraph = Paragraph::new(Text::from(lines))
        .style(Style::default().fg(TEXT_MAIN))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, inner);
}

fn render_map_help(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut text = "WASD/Arrows: Move  |  R: New map  |  Q: Quit".to_string();
    if state.current_cell() == Some(Cell::Mart) {
        text.push_str(&format!(
            "  |  B: Buy a Pokéball (₽{})",
            state.data.economy.pokeball_price
        ));
    }
    let paragraph = Paragraph::new(text).style(Style::default().fg(TEXT_DIM));
    frame.render_widget(paragraph, area);
}

fn render_battle(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(battle) = state.battle.as_ref() else {
        return;
    };
    // Entries plus the key hint and borders; the log keeps at least one line.
    let entries = menu_entries(battle, &state.party).len() as u16;
    let commands = (entries + 3).min(area.height.saturating_sub(4 + 4 + 3));
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Length(commands),
            Constraint::Min(3),
        ])
        .split(area);

    render_enemy_panel(frame, layout[0], battle);
    render_player_panel(frame, layout[1], state);
    render_commands(frame, layout[2], state, battle);
    render_log(frame, layout[3], state, BATTLE_LOG_WINDOW);
}

fn render_enemy_panel(frame: &mut Frame, area: Rect, battle: &BattleState) {
    let title = match battle.kind {
        BattleKind::Wild => " WILD ".to_string(),
        BattleKind::Trainer => format!(
            " TRAINER {} ({}/{}) ",
            battle.trainer_name().to_ascii_uppercase(),
            battle.active_enemy + 1,
            battle.enemies.len()
        ),
    };
    let block = panel_block(title.as_str(), BG_PANEL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(enemy) = battle.enemy() else {
        return;
    };
    frame.render_widget(Paragraph::new(Text::from(member_lines(enemy))), inner);
}

fn render_player_panel(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = panel_block(" YOU ", BG_PANEL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = match state.active_member() {
        Some(member) => member_lines(member),
        None => vec![Line::from(Span::styled(
            "All your Pokémon have fainted...",
            Style::default().fg(ACCENT_RED),
        ))],
    };
    frame.render_widget(Paragraph::new(Text::from(lines)), inner);
}

fn render_commands(frame: &mut Frame, area: Rect, state: &AppState, battle: &BattleState) {
    let title = if battle.switching { " SWITCH " } else { " COMMAND " };
    let block = panel_block(title, BG_PANEL_ALT);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Scroll so the cursor stays on screen above the hint.
    let visible = (inner.height as usize).saturating_sub(1).max(1);
    let offset = (battle.cursor + 1).saturating_sub(visible);
    let mut lines: Vec<Line> = menu_entries(battle, &state.party)
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(idx, label)| menu_line(label, idx == battle.cursor))
        .collect();
    let hint = match (battle.switching, battle.kind) {
        (true, _) => "↑/↓ + Enter or 1-9: Switch  |  Esc: Back",
        (false, BattleKind::Wild) => "↑/↓ + Enter  |  1-4: Attack  C: Catch  R: Run  S: Switch",
        (false, BattleKind::Trainer) => "↑/↓ + Enter  |  1-4: Attack  S: Switch",
    };
    lines.push(Line::from(Span::styled(hint, Style::default().fg(TEXT_DIM))));
    frame.render_widget(Paragraph::new(Text::from(lines)), inner);
}

/// Labels of the open battle menu: the party while the switch picker is
/// open, the command list otherwise.
fn menu_entries(battle: &BattleState, party: &[Creature]) -> Vec<String> {
    if battle.switching {
        return party
            .iter()
            .enumerate()
            .map(|(idx, member)| {
                let status = if member.is_fainted() { " (fainted)" } else { "" };
                format!(
                    " {}. {} {}/{}{} ",
                    idx + 1,
                    member.name,
                    member.hp,
                    member.max_hp,
                    status
                )
            })
            .collect();
    }
    let Some(active) = battle::first_living(party).and_then(|idx| party.get(idx)) else {
        return Vec::new();
    };
    battle::commands(battle, party)
        .into_iter()
        .map(|command| match command {
            BattleCommand::Attack(idx) => active
                .moves
                .get(idx)
                .map(|mv| format!(" {}. {} ", idx + 1, mv.label()))
                .unwrap_or_default(),
            BattleCommand::Catch => " Catch ".to_string(),
            BattleCommand::Run => " Run ".to_string(),
            BattleCommand::Switch => " Switch ".to_string(),
        })
        .collect()
}

fn hp_line(current: u16, max: u16) -> Line<'static> {
    let width: usize = 12;
    let ratio = if max == 0 {
        0.0
    } else {
        current as f32 / max as f32
    };
    let filled = ((ratio * width as f32).round() as usize).min(width);
    let empty = width.saturating_sub(filled);
    let color = if ratio > 0.5 {
        ACCENT_GREEN
    } else if ratio > 0.2 {
        ACCENT_GOLD
    } else {
        ACCENT_RED
    };
    Line::from(vec![
        Span::raw("HP "),
        Span::styled(
            "█".repeat(filled),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled("░".repeat(empty), Style::default().fg(TEXT_DIM)),
        Span::raw(format!(" {current}/{max}")),
    ])
}

fn panel_block<'a, T>(title: T, bg: Color) -> Block<'a>
where
    T: Into<Title<'a>>,
{
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(title)
        .style(Style::default().bg(bg).fg(TEXT_MAIN))
        .border_style(Style::default().fg(BORDER_ACCENT))
}

fn menu_line(label: &str, selected: bool) -> Line<'static> {
    let style = if selected {
        Style::default()
            .fg(HIGHLIGHT_TEXT)
            .bg(HIGHLIGHT_BG)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(TEXT_MAIN)
    };
    Line::from(Span::styled(label.to_string(), style))
}

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use std::{io, path::PathBuf};
use tracing::info;

mod format;
mod input;
mod logging;
mod payment;
mod profit;
mod store;

use format::{format_with_commas, parse_formatted};
use input::TextInput;
use payment::monthly_payment;
use profit::{ExtraFieldPatch, Field, FieldKind, ProfitModel};
use store::{FileStore, Store};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Screen {
    Profit,
    Payment,
}

/// A focusable position on the profit form, in display order: the four
/// required fields, then seller concessions, then extra fields.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Slot {
    Field(Field),
    Extra(usize),
}

const BASE_SLOTS: [Slot; 5] = [
    Slot::Field(Field::SalePrice),
    Slot::Field(Field::CommissionPct),
    Slot::Field(Field::CurrentMortgageLoan),
    Slot::Field(Field::ClosingCosts),
    Slot::Field(Field::SellerConcessions),
];

#[derive(Debug)]
struct AddFieldDialog {
    label: String,
    kind: FieldKind,
}

impl AddFieldDialog {
    fn new() -> Self {
        Self {
            label: String::new(),
            kind: FieldKind::Dollar,
        }
    }
}

#[derive(Debug)]
struct PaymentForm {
    principal: TextInput,
    rate: TextInput,
    years: TextInput,
    focus: usize,
    result: Option<f64>,
}

impl PaymentForm {
    fn new() -> Self {
        Self {
            principal: TextInput::new(true),
            rate: TextInput::new(false),
            years: TextInput::new(false),
            focus: 0,
            result: None,
        }
    }

    fn focused_input(&mut self) -> &mut TextInput {
        match self.focus {
            0 => &mut self.principal,
            1 => &mut self.rate,
            _ => &mut self.years,
        }
    }

    fn compute(&mut self) {
        self.result = Some(monthly_payment(
            parse_formatted(self.principal.text()),
            parse_formatted(self.rate.text()),
            parse_formatted(self.years.text()),
        ));
    }
}

struct App<S: Store> {
    screen: Screen,
    model: ProfitModel<S>,
    focus: usize,
    editor: TextInput,
    dialog: Option<AddFieldDialog>,
    payment: PaymentForm,
}

impl<S: Store> App<S> {
    fn new(model: ProfitModel<S>) -> Self {
        let mut app = Self {
            screen: Screen::Profit,
            model,
            focus: 0,
            editor: TextInput::new(true),
            dialog: None,
            payment: PaymentForm::new(),
        };
        app.refresh_editor();
        app
    }

    fn slot_count(&self) -> usize {
        BASE_SLOTS.len() + self.model.extra_fields().len()
    }

    fn focused_slot(&self) -> Slot {
        match BASE_SLOTS.get(self.focus) {
            Some(slot) => *slot,
            None => Slot::Extra(self.focus - BASE_SLOTS.len()),
        }
    }

    /// Only the commission field edits raw percent text; every money-typed
    /// field runs through the grouped editor.
    fn slot_grouped(&self, slot: Slot) -> bool {
        slot != Slot::Field(Field::CommissionPct)
    }

    /// Reseeds the line editor from the model after a focus change or a
    /// structural edit, caret at the end.
    fn refresh_editor(&mut self) {
        let slot = self.focused_slot();
        let text = match slot {
            Slot::Field(field) => self.model.text(field).to_string(),
            Slot::Extra(i) => self.model.extra_fields()[i].value.clone(),
        };
        self.editor = TextInput::with_text(&text, self.slot_grouped(slot));
    }

    /// Forwards the editor's current text into the model, which persists
    /// it; the profit readout re-derives on the next frame.
    fn push_editor(&mut self) {
        let text = self.editor.text().to_string();
        match self.focused_slot() {
            Slot::Field(field) => self.model.set_field(field, text),
            Slot::Extra(i) => {
                let id = self.model.extra_fields()[i].id;
                self.model.update_extra_field(
                    id,
                    ExtraFieldPatch {
                        value: Some(text),
                        ..Default::default()
                    },
                );
            }
        }
    }

    fn move_focus_up(&mut self) {
        if self.focus > 0 {
            self.focus -= 1;
            self.refresh_editor();
        }
    }

    fn move_focus_down(&mut self) {
        if self.focus + 1 < self.slot_count() {
            self.focus += 1;
            self.refresh_editor();
        }
    }

    fn toggle_focused_kind(&mut self) {
        match self.focused_slot() {
            Slot::Field(field) => {
                if let Some(kind) = self.model.kind(field) {
                    self.model.set_kind(field, kind.toggled());
                }
            }
            Slot::Extra(i) => {
                let field = &self.model.extra_fields()[i];
                let (id, kind) = (field.id, field.kind);
                self.model.update_extra_field(
                    id,
                    ExtraFieldPatch {
                        kind: Some(kind.toggled()),
                        ..Default::default()
                    },
                );
            }
        }
    }

    fn remove_focused_extra(&mut self) {
        if let Slot::Extra(i) = self.focused_slot() {
            let id = self.model.extra_fields()[i].id;
            self.model.remove_extra_field(id);
            self.focus = self.focus.min(self.slot_count() - 1);
            self.refresh_editor();
        }
    }
}

fn main() -> Result<()> {
    let data_dir = dirs::data_local_dir()
        .map(|dir| dir.join("homeseller"))
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&data_dir)?;
    logging::init(&data_dir.join("homeseller.log"))?;
    info!("starting");

    let store = FileStore::open(data_dir.join("state.json"));
    let model = ProfitModel::load(store);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let app = App::new(model);
    let res = run_app(&mut terminal, app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{:?}", err)
    }

    Ok(())
}

fn run_app<B: Backend, S: Store>(terminal: &mut Terminal<B>, mut app: App<S>) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, &mut app))?;

        if let Event::Key(key) = event::read()? {
            let quit = match app.screen {
                Screen::Profit => {
                    if app.dialog.is_some() {
                        handle_dialog_input(&mut app, key);
                        false
                    } else {
                        handle_profit_input(&mut app, key)
                    }
                }
                Screen::Payment => handle_payment_input(&mut app, key),
            };
            if quit {
                return Ok(());
            }
        }
    }
}

fn handle_profit_input<S: Store>(app: &mut App<S>, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => return true,
        KeyCode::Char('p') => app.screen = Screen::Payment,
        KeyCode::Char('a') => app.dialog = Some(AddFieldDialog::new()),
        KeyCode::Char('d') => app.remove_focused_extra(),
        KeyCode::Tab => app.toggle_focused_kind(),
        KeyCode::Up => app.move_focus_up(),
        KeyCode::Down => app.move_focus_down(),
        KeyCode::Left => app.editor.move_left(),
        KeyCode::Right => app.editor.move_right(),
        KeyCode::Backspace => {
            app.editor.backspace();
            app.push_editor();
        }
        KeyCode::Delete => {
            app.editor.delete();
            app.push_editor();
        }
        KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => {
            app.editor.insert_char(c);
            app.push_editor();
        }
        // Enter forces a recomputation; profit is derived every frame, so
        // there is nothing extra to do.
        KeyCode::Enter => {}
        _ => {}
    }
    false
}

fn handle_dialog_input<S: Store>(app: &mut App<S>, key: KeyEvent) {
    let Some(dialog) = app.dialog.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Esc => app.dialog = None,
        KeyCode::Tab => dialog.kind = dialog.kind.toggled(),
        KeyCode::Backspace => {
            dialog.label.pop();
        }
        KeyCode::Enter => {
            if let Some(dialog) = app.dialog.take() {
                app.model.add_extra_field(dialog.label, dialog.kind);
                app.focus = app.slot_count() - 1;
                app.refresh_editor();
            }
        }
        KeyCode::Char(c) => dialog.label.push(c),
        _ => {}
    }
}

fn handle_payment_input<S: Store>(app: &mut App<S>, key: KeyEvent) -> bool {
    let form = &mut app.payment;
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => return true,
        KeyCode::Char('p') => app.screen = Screen::Profit,
        KeyCode::Up => form.focus = form.focus.saturating_sub(1),
        KeyCode::Down | KeyCode::Tab => form.focus = (form.focus + 1).min(2),
        KeyCode::Left => form.focused_input().move_left(),
        KeyCode::Right => form.focused_input().move_right(),
        KeyCode::Backspace => form.focused_input().backspace(),
        KeyCode::Delete => form.focused_input().delete(),
        KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => {
            form.focused_input().insert_char(c)
        }
        KeyCode::Enter => form.compute(),
        _ => {}
    }
    false
}

fn ui<S: Store>(f: &mut Frame, app: &mut App<S>) {
    match app.screen {
        Screen::Profit => {
            render_profit_screen(f, app);
            if app.dialog.is_some() {
                render_add_field_dialog(f, app);
            }
        }
        Screen::Payment => render_payment_screen(f, app),
    }
}

fn render_profit_screen<S: Store>(f: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title = Paragraph::new("Home Sale Profit Calculator")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(title, chunks[0]);

    f.render_widget(Paragraph::new(profit_line(app)), chunks[1]);

    let mut lines: Vec<Line> = Vec::new();
    lines.push(section_line("Required Fields"));
    for (i, slot) in BASE_SLOTS.iter().enumerate().take(4) {
        lines.push(field_line(app, *slot, i));
    }
    lines.push(Line::from(""));
    lines.push(section_line("Optional Fields"));
    lines.push(field_line(app, BASE_SLOTS[4], 4));
    lines.push(Line::from(""));
    lines.push(section_line("Additional Fields"));
    for i in 0..app.model.extra_fields().len() {
        lines.push(field_line(app, Slot::Extra(i), BASE_SLOTS.len() + i));
    }

    let fields = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Inputs"));
    f.render_widget(fields, chunks[2]);

    let help = Paragraph::new(
        "↑/↓: field | ←/→: caret | Tab: $/% | a: add field | d: delete field | p: payment calculator | q: quit",
    )
    .style(Style::default().fg(Color::DarkGray))
    .alignment(Alignment::Center);
    f.render_widget(help, chunks[3]);
}

fn profit_line<S: Store>(app: &App<S>) -> Line<'static> {
    match app.model.profit() {
        None => Line::from(Span::styled(
            "Profit: enter all required fields",
            Style::default().fg(Color::DarkGray),
        )),
        Some(profit) => {
            let color = if profit > 0.0 {
                Color::Green
            } else if profit < 0.0 {
                Color::Red
            } else {
                Color::White
            };
            Line::from(vec![
                Span::styled("Profit: ", Style::default().add_modifier(Modifier::BOLD)),
                Span::styled(
                    format!("${}", format_with_commas(&format!("{:.2}", profit))),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
            ])
        }
    }
}

fn section_line(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))
}

fn field_line<S: Store>(app: &App<S>, slot: Slot, index: usize) -> Line<'static> {
    let label = match slot {
        Slot::Field(Field::SalePrice) => "Sale Price ($)".to_string(),
        Slot::Field(Field::CommissionPct) => "Sales Commission (%)".to_string(),
        Slot::Field(Field::CurrentMortgageLoan) => {
            "Current Mortgage Loan Remaining ($)".to_string()
        }
        Slot::Field(Field::ClosingCosts) => format!(
            "Estimated Closing Costs ({})",
            app.model
                .kind(Field::ClosingCosts)
                .unwrap_or(FieldKind::Dollar)
                .symbol()
        ),
        Slot::Field(Field::SellerConcessions) => format!(
            "Seller Concessions ({})",
            app.model
                .kind(Field::SellerConcessions)
                .unwrap_or(FieldKind::Dollar)
                .symbol()
        ),
        Slot::Extra(i) => {
            let field = &app.model.extra_fields()[i];
            format!("{} ({})", field.label, field.kind.symbol())
        }
    };

    let focused = index == app.focus;
    let marker = if focused { "▶ " } else { "  " };
    let label_style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let mut spans = vec![
        Span::styled(marker.to_string(), label_style),
        Span::styled(format!("{label}: "), label_style),
    ];
    if focused {
        spans.extend(caret_spans(&app.editor));
    } else {
        let text = match slot {
            Slot::Field(field) => app.model.text(field).to_string(),
            Slot::Extra(i) => app.model.extra_fields()[i].value.clone(),
        };
        spans.push(Span::raw(text));
    }
    Line::from(spans)
}

/// The focused field's text with the character under the caret rendered
/// reversed. Inputs are ASCII only, so byte slicing is safe here.
fn caret_spans(editor: &TextInput) -> Vec<Span<'static>> {
    let text = editor.text();
    let caret = editor.caret().min(text.len());
    let value_style = Style::default().fg(Color::Yellow);
    let caret_style = value_style.add_modifier(Modifier::REVERSED);

    let before = text[..caret].to_string();
    let (under, after) = if caret < text.len() {
        (
            text[caret..caret + 1].to_string(),
            text[caret + 1..].to_string(),
        )
    } else {
        (" ".to_string(), String::new())
    };
    vec![
        Span::styled(before, value_style),
        Span::styled(under, caret_style),
        Span::styled(after, value_style),
    ]
}

fn render_payment_screen<S: Store>(f: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(2),
                Constraint::Min(1),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title = Paragraph::new("Mortgage Payment Calculator")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(title, chunks[0]);

    let form = &app.payment;
    render_payment_input(f, chunks[1], "Principal ($)", &form.principal, form.focus == 0);
    render_payment_input(
        f,
        chunks[2],
        "Annual Interest Rate (%)",
        &form.rate,
        form.focus == 1,
    );
    render_payment_input(f, chunks[3], "Loan Term (years)", &form.years, form.focus == 2);

    if let Some(payment) = form.result {
        let result = Paragraph::new(Line::from(vec![
            Span::styled(
                "Monthly Payment: ",
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("${}", format_with_commas(&format!("{:.2}", payment))),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
        ]));
        f.render_widget(result, chunks[4]);
    }

    let help = Paragraph::new("↑/↓/Tab: field | Enter: calculate | p: profit calculator | q: quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(help, chunks[5]);
}

fn render_payment_input(f: &mut Frame, area: Rect, title: &str, input: &TextInput, focused: bool) {
    let block = Block::default().borders(Borders::ALL).title(title);
    let paragraph = if focused {
        Paragraph::new(Line::from(caret_spans(input))).block(block)
    } else {
        Paragraph::new(input.text().to_string())
            .style(Style::default().fg(Color::Yellow))
            .block(block)
    };
    f.render_widget(paragraph, area);
}

fn render_add_field_dialog<S: Store>(f: &mut Frame, app: &App<S>) {
    let Some(dialog) = app.dialog.as_ref() else {
        return;
    };
    let area = centered_rect(46, 8, f.size());
    f.render_widget(Clear, area);

    let dollar_option = if dialog.kind == FieldKind::Dollar {
        "▶ Dollar Amount"
    } else {
        "  Dollar Amount"
    };
    let percent_option = if dialog.kind == FieldKind::Percent {
        "▶ Percentage"
    } else {
        "  Percentage"
    };
    let selected = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let unselected = Style::default().fg(Color::DarkGray);

    let lines = vec![
        Line::from(vec![
            Span::raw("Label: "),
            Span::styled(
                format!("{}█", dialog.label),
                Style::default().fg(Color::Yellow),
            ),
        ]),
        Line::from(""),
        Line::from(dollar_option).style(if dialog.kind == FieldKind::Dollar {
            selected
        } else {
            unselected
        }),
        Line::from(percent_option).style(if dialog.kind == FieldKind::Percent {
            selected
        } else {
            unselected
        }),
        Line::from(""),
        Line::from(Span::styled(
            "Tab: type | Enter: add | Esc: cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let dialog_widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Add New Field"));
    f.render_widget(dialog_widget, area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

use std::mem;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap,
};
use ratatui::Frame;
use tracing::warn;

use crate::db::{AppointmentStore, Database, DoctorStore, PatientStore};
use crate::error::StoreResult;

use super::forms::{
    handle_form_key, AppointmentForm, ConfirmDelete, DoctorForm, EntityForm, FieldKind,
    FormAction, FormMode, PatientForm, PickerOption,
};
use super::helpers::{centered_rect, describe_store_error, surface_error};
use super::screens::{appointment_rows, doctor_rows, patient_rows, RecordTable, View};
use super::theme::Theme;

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
const HEADER_HEIGHT: u16 = 3;
const SEARCH_HEIGHT: u16 = 3;
/// Rows skipped by PageUp/PageDown.
const PAGE_STEP: isize = 10;

/// Fine-grained modes layered over the current view.
enum Mode {
    Normal,
    Searching,
    Patient(PatientForm),
    Doctor(DoctorForm),
    Appointment(AppointmentForm),
    ConfirmDelete(ConfirmDelete),
    ConfirmQuit,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self, theme: &Theme) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(theme.info),
            StatusKind::Error => Style::default().fg(theme.error),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    patients: PatientStore,
    doctors: DoctorStore,
    appointments: AppointmentStore,
    theme: Theme,
    view: View,
    table: RecordTable,
    /// Patient filter; kept after Enter, cleared by Esc or a view switch.
    search: String,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    /// Build the app over `db` and load the patient list. A failed load is
    /// reported in the footer rather than returned.
    pub fn new(db: Database, theme: Theme) -> Self {
        let mut app = Self {
            patients: PatientStore::new(db.clone()),
            doctors: DoctorStore::new(db.clone()),
            appointments: AppointmentStore::new(db),
            theme,
            view: View::Patients,
            table: RecordTable::new(View::Patients),
            search: String::new(),
            mode: Mode::Normal,
            status: None,
        };
        app.refresh(None);
        app
    }

    /// Process one key press. Returns `true` once the user confirmed quitting.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code),
            Mode::Searching => self.handle_search(code),
            Mode::Patient(form) => self.handle_patient_form(code, form),
            Mode::Doctor(form) => self.handle_doctor_form(code, form),
            Mode::Appointment(form) => self.handle_appointment_form(code, form),
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm),
            Mode::ConfirmQuit => self.handle_confirm_quit(code, &mut exit),
        };

        exit
    }

    fn handle_normal_key(&mut self, code: KeyCode) -> Mode {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Mode::ConfirmQuit,
            KeyCode::Char('1') => self.switch_view(View::Patients),
            KeyCode::Char('2') => self.switch_view(View::Doctors),
            KeyCode::Char('3') => self.switch_view(View::Appointments),
            KeyCode::Tab => self.switch_view(self.view.next()),
            KeyCode::BackTab => self.switch_view(self.view.previous()),
            KeyCode::Up | KeyCode::Char('k') => self.table.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.table.move_selection(1),
            KeyCode::PageUp => self.table.move_selection(-PAGE_STEP),
            KeyCode::PageDown => self.table.move_selection(PAGE_STEP),
            KeyCode::Home => self.table.select_first(),
            KeyCode::End => self.table.select_last(),
            KeyCode::Char('r') => {
                self.clear_status();
                self.refresh(self.table.current_id());
            }
            KeyCode::Char('+') | KeyCode::Char('a') => {
                self.clear_status();
                if let Some(mode) = self.open_create_form() {
                    return mode;
                }
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                self.clear_status();
                if let Some(mode) = self.open_edit_form() {
                    return mode;
                }
            }
            KeyCode::Char('-') | KeyCode::Char('d') => {
                self.clear_status();
                if let Some(confirm) = self.pending_delete() {
                    return Mode::ConfirmDelete(confirm);
                }
            }
            KeyCode::Char('/') | KeyCode::Char('f') => {
                if self.view == View::Patients {
                    self.clear_status();
                    return Mode::Searching;
                }
                self.set_status(
                    format!("Search is not available for {}.", self.view.title().to_lowercase()),
                    StatusKind::Error,
                );
            }
            _ => {}
        }
        Mode::Normal
    }

    fn handle_search(&mut self, code: KeyCode) -> Mode {
        match code {
            KeyCode::Esc => {
                self.search.clear();
                self.refresh(None);
                self.set_status("Search cleared.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Enter => {
                if !self.search.trim().is_empty() {
                    self.set_status(
                        format!("{} matching patient(s).", self.table.len()),
                        StatusKind::Info,
                    );
                }
                return Mode::Normal;
            }
            KeyCode::Up => self.table.move_selection(-1),
            KeyCode::Down => self.table.move_selection(1),
            KeyCode::Backspace => {
                self.search.pop();
                self.refresh(None);
            }
            KeyCode::Char(ch) => {
                self.search.push(ch);
                self.refresh(None);
            }
            _ => {}
        }
        Mode::Searching
    }

    fn handle_patient_form(&mut self, code: KeyCode, mut form: PatientForm) -> Mode {
        match handle_form_key(&mut form, code) {
            FormAction::Continue => Mode::Patient(form),
            FormAction::Cancel => {
                self.set_status(format!("{} cancelled.", form.title()), StatusKind::Info);
                Mode::Normal
            }
            FormAction::Submit => self.submit_patient(form),
        }
    }

    fn handle_doctor_form(&mut self, code: KeyCode, mut form: DoctorForm) -> Mode {
        match handle_form_key(&mut form, code) {
            FormAction::Continue => Mode::Doctor(form),
            FormAction::Cancel => {
                self.set_status(format!("{} cancelled.", form.title()), StatusKind::Info);
                Mode::Normal
            }
            FormAction::Submit => self.submit_doctor(form),
        }
    }

    fn handle_appointment_form(&mut self, code: KeyCode, mut form: AppointmentForm) -> Mode {
        match handle_form_key(&mut form, code) {
            FormAction::Continue => Mode::Appointment(form),
            FormAction::Cancel => {
                self.set_status(format!("{} cancelled.", form.title()), StatusKind::Info);
                Mode::Normal
            }
            FormAction::Submit => self.submit_appointment(form),
        }
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmDelete) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                let result = match confirm.view {
                    View::Patients => self.patients.delete(confirm.id),
                    View::Doctors => self.doctors.delete(confirm.id),
                    View::Appointments => self.appointments.delete(confirm.id),
                };
                match result {
                    Ok(()) => {
                        self.refresh(None);
                        self.set_status(
                            format!("{} deleted.", confirm.view.entity()),
                            StatusKind::Info,
                        );
                        Mode::Normal
                    }
                    Err(err) => {
                        let action = format!("delete {}", confirm.view.noun());
                        self.set_status(describe_store_error(&err, &action), StatusKind::Error);
                        Mode::ConfirmDelete(confirm)
                    }
                }
            }
            _ => Mode::ConfirmDelete(confirm),
        }
    }

    fn handle_confirm_quit(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                *exit = true;
                Mode::Normal
            }
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => Mode::Normal,
            _ => Mode::ConfirmQuit,
        }
    }

    /// Show `view` with its full list. Choosing the current view again
    /// drops any kept search filter.
    fn switch_view(&mut self, view: View) {
        self.view = view;
        self.search.clear();
        self.table = RecordTable::new(view);
        self.clear_status();
        self.refresh(None);
    }

    /// Reload the current view, keeping `select` highlighted when present.
    fn refresh(&mut self, select: Option<i64>) {
        match self.fetch_rows() {
            Ok(rows) => {
                self.table.set_rows(rows);
                if let Some(id) = select {
                    self.table.select_id(id);
                }
            }
            Err(err) => {
                self.table.set_rows(Vec::new());
                self.report_failure(&format!("load {}", self.view.title().to_lowercase()), &err);
            }
        }
    }

    fn fetch_rows(&self) -> Result<Vec<Vec<String>>> {
        match self.view {
            View::Patients => {
                let term = self.search.trim();
                let patients = if term.is_empty() {
                    self.patients.list()
                } else {
                    self.patients.search(term)
                }
                .context("failed to load patients")?;
                Ok(patient_rows(&patients))
            }
            View::Doctors => {
                let doctors = self.doctors.list().context("failed to load doctors")?;
                Ok(doctor_rows(&doctors))
            }
            View::Appointments => {
                let appointments = self
                    .appointments
                    .list()
                    .context("failed to load appointments")?;
                Ok(appointment_rows(&appointments))
            }
        }
    }

    fn open_create_form(&mut self) -> Option<Mode> {
        match self.view {
            View::Patients => Some(Mode::Patient(PatientForm::create(today()))),
            View::Doctors => Some(Mode::Doctor(DoctorForm::create())),
            View::Appointments => match self.picker_options() {
                Ok((patients, doctors)) => Some(Mode::Appointment(AppointmentForm::create(
                    patients,
                    doctors,
                    Local::now().naive_local(),
                ))),
                Err(err) => {
                    self.report_failure("open appointment form", &err);
                    None
                }
            },
        }
    }

    fn open_edit_form(&mut self) -> Option<Mode> {
        let Some(id) = self.table.current_id() else {
            self.set_status("Please select a record.", StatusKind::Error);
            return None;
        };
        match self.load_edit_form(id) {
            Ok(Some(mode)) => Some(mode),
            Ok(None) => {
                self.set_status(
                    format!("{} {id} no longer exists.", self.view.entity()),
                    StatusKind::Error,
                );
                self.refresh(None);
                None
            }
            Err(err) => {
                self.report_failure(&format!("load {}", self.view.noun()), &err);
                None
            }
        }
    }

    fn load_edit_form(&self, id: i64) -> Result<Option<Mode>> {
        let mode = match self.view {
            View::Patients => self
                .patients
                .get(id)?
                .map(|patient| Mode::Patient(PatientForm::edit(&patient))),
            View::Doctors => self
                .doctors
                .get(id)?
                .map(|doctor| Mode::Doctor(DoctorForm::edit(&doctor))),
            View::Appointments => match self.appointments.get(id)? {
                Some(appointment) => {
                    let (patients, doctors) = self.picker_options()?;
                    Some(Mode::Appointment(AppointmentForm::edit(
                        &appointment,
                        patients,
                        doctors,
                    )))
                }
                None => None,
            },
        };
        Ok(mode)
    }

    fn picker_options(&self) -> Result<(Vec<PickerOption>, Vec<PickerOption>)> {
        let patients = self.patients.list().context("failed to load patients")?;
        let doctors = self.doctors.list().context("failed to load doctors")?;
        Ok((
            PickerOption::patients(&patients),
            PickerOption::doctors(&doctors),
        ))
    }

    fn pending_delete(&mut self) -> Option<ConfirmDelete> {
        let Some(id) = self.table.current_id() else {
            self.set_status("Please select a record.", StatusKind::Error);
            return None;
        };
        let row = self.table.current_row().unwrap_or_default();
        let summary = match self.view {
            View::Patients => format!("{} {}", cell(row, 1), cell(row, 2)),
            View::Doctors => format!("Dr. {} {}", cell(row, 1), cell(row, 2)),
            View::Appointments => format!("{} at {}", cell(row, 3), cell(row, 4)),
        };
        Some(ConfirmDelete {
            view: self.view,
            id,
            summary,
        })
    }

    fn submit_patient(&mut self, mut form: PatientForm) -> Mode {
        let fields = match form.submit() {
            Ok(fields) => fields,
            Err(err) => {
                form.focus(err.field);
                form.error = Some(err.message());
                return Mode::Patient(form);
            }
        };
        let result = match form.mode {
            FormMode::Create => self.patients.create(&fields),
            FormMode::Edit { id } => self.patients.update(id, &fields).map(|()| id),
        };
        match self.finish_save(result, form.mode) {
            Ok(()) => Mode::Normal,
            Err(message) => {
                form.error = Some(message);
                Mode::Patient(form)
            }
        }
    }

    fn submit_doctor(&mut self, mut form: DoctorForm) -> Mode {
        let fields = match form.submit() {
            Ok(fields) => fields,
            Err(err) => {
                form.focus(err.field);
                form.error = Some(err.message());
                return Mode::Doctor(form);
            }
        };
        let result = match form.mode {
            FormMode::Create => self.doctors.create(&fields),
            FormMode::Edit { id } => self.doctors.update(id, &fields).map(|()| id),
        };
        match self.finish_save(result, form.mode) {
            Ok(()) => Mode::Normal,
            Err(message) => {
                form.error = Some(message);
                Mode::Doctor(form)
            }
        }
    }

    fn submit_appointment(&mut self, mut form: AppointmentForm) -> Mode {
        let fields = match form.submit(today()) {
            Ok(fields) => fields,
            Err(err) => {
                form.focus(err.field);
                form.error = Some(err.message());
                return Mode::Appointment(form);
            }
        };
        let result = match form.mode {
            FormMode::Create => self.appointments.create(&fields),
            FormMode::Edit { id } => self.appointments.update(id, &fields).map(|()| id),
        };
        match self.finish_save(result, form.mode) {
            Ok(()) => Mode::Normal,
            Err(message) => {
                form.error = Some(message);
                Mode::Appointment(form)
            }
        }
    }

    /// Reload and report after a create or update. On failure the message is
    /// handed back so the form can show it too.
    fn finish_save(&mut self, result: StoreResult<i64>, mode: FormMode) -> Result<(), String> {
        match result {
            Ok(id) => {
                let verb = match mode {
                    FormMode::Create => "added",
                    FormMode::Edit { .. } => "updated",
                };
                self.set_status(format!("{} {verb}.", self.view.entity()), StatusKind::Info);
                self.refresh(Some(id));
                Ok(())
            }
            Err(err) => {
                let message = describe_store_error(&err, &format!("save {}", self.view.noun()));
                warn!(error = %err, view = self.view.title(), "save failed");
                self.set_status(message.clone(), StatusKind::Error);
                Err(message)
            }
        }
    }

    fn report_failure(&mut self, action: &str, err: &anyhow::Error) {
        warn!(error = %format!("{err:#}"), action, "action failed");
        self.set_status(
            format!("Failed to {action}: {}", surface_error(err)),
            StatusKind::Error,
        );
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let show_search = matches!(self.mode, Mode::Searching) || !self.search.is_empty();

        let mut constraints = vec![Constraint::Length(HEADER_HEIGHT)];
        if show_search {
            constraints.push(Constraint::Length(SEARCH_HEIGHT));
        }
        constraints.push(Constraint::Min(0));
        constraints.push(Constraint::Length(FOOTER_HEIGHT));

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        self.draw_tabs(frame, chunks[0]);
        let table_area = if show_search {
            self.draw_search_bar(frame, chunks[1]);
            chunks[2]
        } else {
            chunks[1]
        };
        self.draw_table(frame, table_area);
        self.draw_footer(frame, chunks[chunks.len() - 1]);

        match &self.mode {
            Mode::Patient(form) => self.draw_form(frame, area, form),
            Mode::Doctor(form) => self.draw_form(frame, area, form),
            Mode::Appointment(form) => self.draw_form(frame, area, form),
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::ConfirmQuit => self.draw_confirm_quit(frame, area),
            Mode::Normal | Mode::Searching => {}
        }
    }

    fn draw_tabs(&self, frame: &mut Frame, area: Rect) {
        let titles = View::ALL
            .iter()
            .map(|view| format!("{} {}", view.index() + 1, view.title()));
        let tabs = Tabs::new(titles)
            .select(self.view.index())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Hospital Manager"),
            )
            .highlight_style(
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, area);
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Search patients");
        let inner = block.inner(area);
        let paragraph = Paragraph::new(Span::raw(format!("Search: {}", self.search))).block(block);
        frame.render_widget(paragraph, area);

        if matches!(self.mode, Mode::Searching) {
            let cursor_x = inner.x + "Search: ".len() as u16 + self.search.chars().count() as u16;
            frame.set_cursor_position((cursor_x.min(inner.right()), inner.y));
        }
    }

    fn draw_table(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("{} ({})", self.view.title(), self.table.len()));

        if self.table.is_empty() {
            let message = if self.search.trim().is_empty() {
                format!("No {} yet. Press + to add one.", self.view.title().to_lowercase())
            } else {
                format!("No patients match \"{}\".", self.search.trim())
            };
            let paragraph = Paragraph::new(Span::styled(
                message,
                Style::default().fg(self.theme.muted),
            ))
            .alignment(Alignment::Center)
            .block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        let header = Row::new(self.view.headers().iter().map(|title| Cell::from(*title))).style(
            Style::default()
                .fg(self.theme.header)
                .add_modifier(Modifier::BOLD),
        );
        let widths = self
            .table
            .column_widths()
            .into_iter()
            .map(Constraint::Length);
        let rows = self.table.display_rows().into_iter().map(Row::new);

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .column_spacing(2)
            .row_highlight_style(
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::REVERSED),
            )
            .highlight_symbol("> ");

        let mut state = TableState::default().with_selected(Some(self.table.selected));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(
                status.text.clone(),
                status.kind.style(&self.theme),
            )])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(self.theme.accent)
            .add_modifier(Modifier::BOLD);
        let bindings: &[(&str, &str)] = match &self.mode {
            Mode::Normal => &[
                ("[1-3/Tab]", " View   "),
                ("[↑↓]", " Select   "),
                ("[+]", " Add   "),
                ("[e]", " Edit   "),
                ("[-]", " Delete   "),
                ("[/]", " Search   "),
                ("[q]", " Quit"),
            ],
            Mode::Searching => &[
                ("[Type]", " Filter   "),
                ("[Enter]", " Keep   "),
                ("[Esc]", " Clear"),
            ],
            Mode::Patient(_) | Mode::Doctor(_) | Mode::Appointment(_) => &[
                ("[Tab/↑↓]", " Field   "),
                ("[←→]", " Choose   "),
                ("[Enter]", " Save   "),
                ("[Esc]", " Cancel"),
            ],
            Mode::ConfirmDelete(_) | Mode::ConfirmQuit => {
                &[("[y]", " Confirm   "), ("[n/Esc]", " Cancel")]
            }
        };
        let spans = bindings
            .iter()
            .flat_map(|(key, label)| {
                [
                    Span::styled(key.to_string(), key_style),
                    Span::raw(label.to_string()),
                ]
            })
            .collect::<Vec<_>>();
        Line::from(spans)
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect, form: &dyn EntityForm) {
        let popup_area = centered_rect(70, 70, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(form.title()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let form_lines = form.lines();
        let active = form.active_index();
        let label_width = form_lines
            .iter()
            .map(|line| line.label.chars().count())
            .max()
            .unwrap_or(0);

        let mut lines = Vec::with_capacity(form_lines.len() + 2);
        for (idx, line) in form_lines.iter().enumerate() {
            let label_style = if idx == active {
                Style::default()
                    .fg(self.theme.focus)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let mut spans = vec![Span::styled(
                format!("{:>label_width$}: ", line.label),
                label_style,
            )];
            if line.value.is_empty() {
                spans.push(Span::styled(
                    line.placeholder,
                    Style::default().fg(self.theme.muted),
                ));
            } else {
                spans.push(Span::raw(line.value.clone()));
            }
            if idx == active && line.kind == FieldKind::Choice {
                spans.push(Span::styled("  ◀ ▶", Style::default().fg(self.theme.muted)));
            }
            lines.push(Line::from(spans));
        }
        lines.push(Line::from(""));

        if let Some(error) = form.error() {
            lines.push(Line::from(Span::styled(
                error.to_string(),
                Style::default().fg(self.theme.error),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • Esc to cancel",
                Style::default().fg(self.theme.muted),
            )));
        }

        frame.render_widget(Paragraph::new(lines), inner);

        if let Some(line) = form_lines.get(active) {
            let cursor_y = inner.y + active as u16;
            if line.kind == FieldKind::Text && cursor_y < inner.bottom() {
                let cursor_x =
                    inner.x + (label_width + 2 + line.value.chars().count()) as u16;
                frame.set_cursor_position((cursor_x.min(inner.right()), cursor_y));
            }
        }
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Delete")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!(
                "Delete {} {}?",
                confirm.view.noun(),
                confirm.summary
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(self.theme.muted),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_confirm_quit(&self, frame: &mut Frame, area: Rect) {
        let popup_area = centered_rect(50, 25, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Quit").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from("Are you sure you want to quit?"),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to quit or N / Esc to stay.",
                Style::default().fg(self.theme.muted),
            )),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveTime};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use tempfile::TempDir;

    use super::*;
    use crate::models::{AppointmentFields, AppointmentStatus, DoctorFields, PatientFields};
    use crate::validation::PatientField;

    fn test_app() -> (TempDir, App) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path().join("hospital.db"));
        (dir, App::new(db, Theme::default()))
    }

    fn press(app: &mut App, codes: &[KeyCode]) {
        for code in codes {
            app.handle_key(*code);
        }
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch));
        }
    }

    fn patient(first: &str, last: &str, national_id: &str) -> PatientFields {
        PatientFields {
            first_name: first.into(),
            last_name: last.into(),
            national_id: national_id.into(),
            ..PatientFields::default()
        }
    }

    fn status_text(app: &App) -> &str {
        app.status.as_ref().map(|s| s.text.as_str()).unwrap_or("")
    }

    fn fill_patient_form(app: &mut App, national_id: &str) {
        app.handle_key(KeyCode::Char('+'));
        type_text(app, "Ali");
        app.handle_key(KeyCode::Tab);
        type_text(app, "Rezaei");
        app.handle_key(KeyCode::Tab);
        type_text(app, national_id);
    }

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 30)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn adding_a_patient_through_the_form() {
        let (_dir, mut app) = test_app();
        fill_patient_form(&mut app, "1234567890");
        app.handle_key(KeyCode::Enter);

        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.table.len(), 1);
        assert_eq!(app.table.rows[0][3], "1234567890");
        assert_eq!(status_text(&app), "Patient added.");
    }

    #[test]
    fn invalid_national_id_focuses_the_field() {
        let (_dir, mut app) = test_app();
        fill_patient_form(&mut app, "123");
        press(&mut app, &[KeyCode::Tab, KeyCode::Enter]);

        match &app.mode {
            Mode::Patient(form) => {
                assert_eq!(form.active, PatientField::NationalId);
                assert_eq!(
                    form.error.as_deref(),
                    Some("National ID must be exactly 10 digits.")
                );
            }
            _ => panic!("form should stay open"),
        }
        assert!(app.table.is_empty());
    }

    #[test]
    fn duplicate_national_id_keeps_form_open() {
        let (_dir, mut app) = test_app();
        app.patients
            .create(&patient("Sara", "Ahmadi", "1234567890"))
            .unwrap();
        fill_patient_form(&mut app, "1234567890");
        app.handle_key(KeyCode::Enter);

        let expected = "National ID already exists. Please enter a different value.";
        match &app.mode {
            Mode::Patient(form) => assert_eq!(form.error.as_deref(), Some(expected)),
            _ => panic!("form should stay open"),
        }
        assert_eq!(status_text(&app), expected);
        assert_eq!(app.patients.list().unwrap().len(), 1);
    }

    #[test]
    fn edit_and_delete_need_a_selection() {
        let (_dir, mut app) = test_app();
        app.handle_key(KeyCode::Char('e'));
        assert_eq!(status_text(&app), "Please select a record.");
        app.handle_key(KeyCode::Char('-'));
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(status_text(&app), "Please select a record.");
    }

    #[test]
    fn editing_keeps_the_id_and_untouched_fields() {
        let (_dir, mut app) = test_app();
        let mut fields = patient("Ali", "Rezaei", "1234567890");
        fields.phone = "0912".into();
        let id = app.patients.create(&fields).unwrap();
        app.handle_key(KeyCode::Char('r'));

        app.handle_key(KeyCode::Char('e'));
        type_text(&mut app, "reza");
        app.handle_key(KeyCode::Enter);

        let updated = app.patients.get(id).unwrap().unwrap();
        assert_eq!(updated.fields.first_name, "Alireza");
        assert_eq!(updated.fields.phone, "0912");
        assert_eq!(status_text(&app), "Patient updated.");
    }

    #[test]
    fn delete_asks_before_removing() {
        let (_dir, mut app) = test_app();
        app.patients
            .create(&patient("Ali", "Rezaei", "1234567890"))
            .unwrap();
        app.handle_key(KeyCode::Char('r'));

        press(&mut app, &[KeyCode::Char('d'), KeyCode::Char('n')]);
        assert_eq!(app.table.len(), 1);

        app.handle_key(KeyCode::Char('d'));
        match &app.mode {
            Mode::ConfirmDelete(confirm) => assert_eq!(confirm.summary, "Ali Rezaei"),
            _ => panic!("expected a confirmation"),
        }
        app.handle_key(KeyCode::Char('y'));
        assert!(app.table.is_empty());
        assert_eq!(status_text(&app), "Patient deleted.");
    }

    #[test]
    fn live_search_filters_and_esc_restores() {
        let (_dir, mut app) = test_app();
        app.patients
            .create(&patient("Ali", "Rezaei", "1234567890"))
            .unwrap();
        app.patients
            .create(&patient("Sara", "Ahmadi", "0987654321"))
            .unwrap();
        app.handle_key(KeyCode::Char('r'));

        app.handle_key(KeyCode::Char('/'));
        type_text(&mut app, "Sara");
        assert_eq!(app.table.len(), 1);

        app.handle_key(KeyCode::Enter);
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.search, "Sara");
        assert_eq!(app.table.len(), 1);

        press(&mut app, &[KeyCode::Char('f'), KeyCode::Esc]);
        assert!(app.search.is_empty());
        assert_eq!(app.table.len(), 2);
    }

    #[test]
    fn search_is_patients_only() {
        let (_dir, mut app) = test_app();
        app.handle_key(KeyCode::Char('2'));
        app.handle_key(KeyCode::Char('/'));
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(status_text(&app), "Search is not available for doctors.");
    }

    #[test]
    fn switching_views_clears_the_search() {
        let (_dir, mut app) = test_app();
        app.handle_key(KeyCode::Char('/'));
        type_text(&mut app, "x");
        app.handle_key(KeyCode::Enter);
        press(&mut app, &[KeyCode::Tab, KeyCode::BackTab]);
        assert_eq!(app.view, View::Patients);
        assert!(app.search.is_empty());
    }

    #[test]
    fn reselecting_the_current_view_reloads_the_full_list() {
        let (_dir, mut app) = test_app();
        app.patients
            .create(&patient("Ali", "Rezaei", "1234567890"))
            .unwrap();
        app.patients
            .create(&patient("Sara", "Ahmadi", "0987654321"))
            .unwrap();
        app.handle_key(KeyCode::Char('/'));
        type_text(&mut app, "Sara");
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.table.len(), 1);

        app.handle_key(KeyCode::Char('1'));
        assert_eq!(app.view, View::Patients);
        assert!(app.search.is_empty());
        assert_eq!(app.table.len(), 2);
    }

    #[test]
    fn quitting_requires_confirmation() {
        let (_dir, mut app) = test_app();
        assert!(!app.handle_key(KeyCode::Char('q')));
        assert!(!app.handle_key(KeyCode::Char('n')));
        assert!(matches!(app.mode, Mode::Normal));
        assert!(!app.handle_key(KeyCode::Esc));
        assert!(app.handle_key(KeyCode::Char('y')));
    }

    #[test]
    fn booking_an_appointment_with_pickers() {
        let (_dir, mut app) = test_app();
        app.patients
            .create(&patient("Ali", "Rezaei", "1234567890"))
            .unwrap();
        app.doctors
            .create(&DoctorFields {
                first_name: "Sara".into(),
                last_name: "Karimi".into(),
                specialty: "Cardiology".into(),
                ..DoctorFields::default()
            })
            .unwrap();

        app.handle_key(KeyCode::Char('3'));
        app.handle_key(KeyCode::Char('+'));
        press(
            &mut app,
            &[KeyCode::Right, KeyCode::Tab, KeyCode::Right, KeyCode::Enter],
        );

        assert!(matches!(app.mode, Mode::Normal), "{}", status_text(&app));
        assert_eq!(app.table.len(), 1);
        assert_eq!(app.table.rows[0][1], "Ali Rezaei");
        assert_eq!(app.table.rows[0][2], "Sara Karimi");
        assert_eq!(app.table.rows[0][5], "Active");
    }

    #[test]
    fn past_appointment_can_still_be_edited() {
        let (_dir, mut app) = test_app();
        let patient_id = app
            .patients
            .create(&patient("Ali", "Rezaei", "1234567890"))
            .unwrap();
        let id = app
            .appointments
            .create(&AppointmentFields {
                patient_id,
                doctor_id: 42,
                date: today() - Duration::days(3),
                time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                status: AppointmentStatus::Active,
                notes: String::new(),
            })
            .unwrap();

        app.handle_key(KeyCode::Char('3'));
        assert_eq!(app.table.rows[0][2], "");
        app.handle_key(KeyCode::Char('e'));
        match &app.mode {
            Mode::Appointment(form) => {
                assert_eq!(form.mode, FormMode::Edit { id });
                assert_eq!(form.input.patient_id, Some(patient_id));
                assert_eq!(form.input.doctor_id, None);
            }
            _ => panic!("expected the appointment form"),
        }
    }

    #[test]
    fn draws_the_table_and_footer() {
        let (_dir, mut app) = test_app();
        app.patients
            .create(&patient("Ali", "Rezaei", "1234567890"))
            .unwrap();
        app.handle_key(KeyCode::Char('r'));

        let screen = render(&app);
        assert!(screen.contains("Patients (1)"));
        assert!(screen.contains("National ID"));
        assert!(screen.contains("1234567890"));
        assert!(screen.contains("Quit"));
    }

    #[test]
    fn draws_forms_over_the_table() {
        let (_dir, mut app) = test_app();
        app.handle_key(KeyCode::Char('2'));
        let screen = render(&app);
        assert!(screen.contains("No doctors yet"));

        app.handle_key(KeyCode::Char('a'));
        let screen = render(&app);
        assert!(screen.contains("Add Doctor"));
        assert!(screen.contains("Specialty"));
    }
}

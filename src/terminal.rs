// Terminal front end: prompts, dialogs and the screen loop

use colored::Colorize;
use eyre::Result;
use rollbook::{
    AuthClient, FormField, FormMode, LoginForm, Navigator, PersistentKv, Presenter, RecordListController, SaveOutcome,
    Screen, ScreenStack, Student, logout,
};
use std::io::{BufRead, Write};
use tracing::warn;

const CLEAR_FIELD: &str = "-";

const HELP: &str = "commands: list, add, edit <id>, set <field> <value>, form, save, cancel, delete <id>, view <id>, logout, quit";

pub struct Terminal<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Prompt for one line; `None` at end of input
    fn read_line(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn heading(&mut self, title: &str) -> Result<()> {
        writeln!(self.output, "\n{}", title.bold().underline())?;
        Ok(())
    }

    fn notice(&mut self, message: &str) {
        if let Err(e) = writeln!(self.output, "{}", message.yellow()) {
            warn!(error = ?e, "Failed to write notice");
        }
    }

    pub fn print_records(&mut self, records: &[Student]) -> Result<()> {
        if records.is_empty() {
            writeln!(self.output, "{}", "No students yet".dimmed())?;
            return Ok(());
        }

        writeln!(
            self.output,
            "{}",
            format!("{:<15} {:<24} {:<24} {:>4} {:>6}", "ID", "NAME", "EMAIL", "AGE", "GRADE").bold()
        )?;
        for s in records {
            writeln!(
                self.output,
                "{:<15} {:<24} {:<24} {:>4} {:>6}",
                s.id,
                s.full_name(),
                s.email,
                s.age,
                s.grade
            )?;
        }
        Ok(())
    }

    fn print_form<K: PersistentKv>(&mut self, controller: &RecordListController<K>) -> Result<()> {
        match controller.mode() {
            FormMode::Adding => writeln!(self.output, "{}", "Adding new student".cyan())?,
            FormMode::Editing(id) => writeln!(self.output, "{}", format!("Editing {}", id).cyan())?,
        }
        for field in FormField::ALL {
            writeln!(self.output, "  {:<11} {}", field.label(), controller.form().get(field))?;
        }
        Ok(())
    }
}

impl<R: BufRead, W: Write> Presenter for Terminal<R, W> {
    fn alert(&mut self, title: &str, message: &str) {
        if let Err(e) = writeln!(self.output, "{} {}", format!("[{}]", title).bold(), message) {
            warn!(error = ?e, "Failed to write alert");
        }
    }

    fn confirm(&mut self, title: &str, message: &str) -> bool {
        let label = format!("{} {} [y/N] ", format!("[{}]", title).red().bold(), message);
        match self.read_line(&label) {
            Ok(Some(answer)) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Ok(None) => false,
            Err(e) => {
                warn!(error = ?e, "Failed to read confirmation");
                false
            }
        }
    }

    fn show_detail(&mut self, student: &Student) {
        let lines = [
            ("ID", student.id.as_str()),
            ("First name", student.first_name.as_str()),
            ("Last name", student.last_name.as_str()),
            ("Email", student.email.as_str()),
            ("Age", student.age.as_str()),
            ("Grade", student.grade.as_str()),
        ];
        for (label, value) in lines {
            if let Err(e) = writeln!(self.output, "  {:<11} {}", label.bold(), value) {
                warn!(error = ?e, "Failed to write detail");
                return;
            }
        }
    }
}

/// Run screens until the user quits or input ends
pub fn run_session<R, W, A, K>(term: &mut Terminal<R, W>, client: &A, kv: &mut K) -> Result<()>
where
    R: BufRead,
    W: Write,
    A: AuthClient,
    K: PersistentKv,
{
    let mut nav = ScreenStack::default();

    loop {
        let keep_going = match nav.current() {
            Screen::Login => login_screen(term, client, &mut nav)?,
            Screen::Records => records_screen(term, &mut *kv, &mut nav)?,
        };
        if !keep_going {
            return Ok(());
        }
    }
}

fn login_screen<R: BufRead, W: Write, A: AuthClient>(
    term: &mut Terminal<R, W>,
    client: &A,
    nav: &mut ScreenStack,
) -> Result<bool> {
    term.heading("Login")?;

    let Some(email) = term.read_line("Email: ")? else {
        return Ok(false);
    };
    let Some(password) = term.read_line("Password: ")? else {
        return Ok(false);
    };

    LoginForm::new(email, password).submit(client, nav, term);
    Ok(true)
}

fn records_screen<R: BufRead, W: Write, K: PersistentKv>(
    term: &mut Terminal<R, W>,
    kv: K,
    nav: &mut ScreenStack,
) -> Result<bool> {
    term.heading("Students")?;
    let mut controller = RecordListController::mount(kv);
    term.print_records(controller.records())?;
    writeln!(term.output, "{}", HELP.dimmed())?;

    loop {
        let Some(line) = term.read_line("> ")? else {
            return Ok(false);
        };
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        match command {
            "" => {}
            "list" => term.print_records(controller.records())?,
            "add" => {
                controller.cancel_edit();
                if !fill_form(term, &mut controller)? {
                    return Ok(false);
                }
                save_form(term, &mut controller);
            }
            "edit" => match controller.store().get(rest).cloned() {
                Some(student) => {
                    controller.start_edit(&student);
                    if !fill_form(term, &mut controller)? {
                        return Ok(false);
                    }
                    save_form(term, &mut controller);
                }
                None => term.alert("Not found", &format!("No student with id {}", rest)),
            },
            "set" => {
                let (name, value) = rest.split_once(' ').unwrap_or((rest, ""));
                match name.parse::<FormField>() {
                    Ok(field) => controller.form_mut().set(field, value.trim()),
                    Err(e) => term.alert("Form", &e),
                }
            }
            "form" => term.print_form(&controller)?,
            "save" => save_form(term, &mut controller),
            "cancel" => controller.cancel_edit(),
            "delete" => {
                if controller.store().get(rest).is_none() {
                    term.alert("Not found", &format!("No student with id {}", rest));
                } else if controller.delete(rest, term) {
                    term.alert("Deleted", "Student removed");
                    warn_if_unsynced(term, &controller);
                }
            }
            "view" => {
                if !controller.view(rest, term) {
                    term.alert("Not found", &format!("No student with id {}", rest));
                }
            }
            "logout" => {
                logout(nav);
                return Ok(true);
            }
            "quit" | "exit" => return Ok(false),
            "help" => writeln!(term.output, "{}", HELP)?,
            other => term.alert("Unknown command", &format!("{} ({})", other, HELP)),
        }
    }
}

/// Prompt for every field; empty input keeps the current value and `-` clears it. False at end of input
fn fill_form<R: BufRead, W: Write, K: PersistentKv>(
    term: &mut Terminal<R, W>,
    controller: &mut RecordListController<K>,
) -> Result<bool> {
    for field in FormField::ALL {
        let current = controller.form().get(field).to_string();
        let label = if current.is_empty() {
            format!("{}: ", field.label())
        } else {
            format!("{} [{}] (- to clear): ", field.label(), current)
        };

        let Some(value) = term.read_line(&label)? else {
            return Ok(false);
        };
        match value.as_str() {
            "" => {}
            CLEAR_FIELD => controller.form_mut().set(field, ""),
            other => controller.form_mut().set(field, other),
        }
    }
    Ok(true)
}

fn save_form<R: BufRead, W: Write, K: PersistentKv>(term: &mut Terminal<R, W>, controller: &mut RecordListController<K>) {
    match controller.save() {
        Ok(SaveOutcome::Added(id)) => term.alert("Saved", &format!("Student {} added", id)),
        Ok(SaveOutcome::Updated(id)) => term.alert("Saved", &format!("Student {} updated", id)),
        Err(e) => {
            term.alert("Validation error", &e.to_string());
            return;
        }
    }
    warn_if_unsynced(term, controller);
}

fn warn_if_unsynced<R: BufRead, W: Write, K: PersistentKv>(term: &mut Terminal<R, W>, controller: &RecordListController<K>) {
    if !controller.store().is_synced() {
        term.notice("Changes are kept for this session but could not be written to storage");
    }
}

// Records screen controller: form state and user actions over the store

use crate::kv::PersistentKv;
use crate::presenter::Presenter;
use crate::record::{FormField, Record as _, Student, StudentForm};
use crate::store::{RecordStore, now_ms};
use std::fmt;
use tracing::{debug, info};

/// Which record, if any, the form is editing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Adding,
    Editing(String),
}

/// Result of a successful save
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Added(String),
    Updated(String),
}

/// A required form field was left empty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationError {
    pub field: FormField,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is required", self.field)
    }
}

impl std::error::Error for ValidationError {}

/// Mediates add, edit, delete and view actions against a [`RecordStore`]
pub struct RecordListController<K: PersistentKv> {
    store: RecordStore<Student, K>,
    form: StudentForm,
    edit_id: Option<String>,
    last_id: i64,
}

impl<K: PersistentKv> RecordListController<K> {
    pub fn new(store: RecordStore<Student, K>) -> Self {
        let last_id = store
            .records()
            .iter()
            .filter_map(|r| r.id.parse::<i64>().ok())
            .max()
            .unwrap_or(0);

        Self {
            store,
            form: StudentForm::default(),
            edit_id: None,
            last_id,
        }
    }

    /// Hydrate a store from `kv` and start in add mode
    pub fn mount(kv: K) -> Self {
        Self::new(RecordStore::open(kv))
    }

    pub fn records(&self) -> &[Student] {
        self.store.records()
    }

    pub fn store(&self) -> &RecordStore<Student, K> {
        &self.store
    }

    pub fn form(&self) -> &StudentForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut StudentForm {
        &mut self.form
    }

    pub fn mode(&self) -> FormMode {
        match &self.edit_id {
            Some(id) => FormMode::Editing(id.clone()),
            None => FormMode::Adding,
        }
    }

    /// Load `record` into the form for editing
    pub fn start_edit(&mut self, record: &Student) {
        debug!(id = %record.id, "start_edit: called");
        self.form = record.form();
        self.edit_id = Some(record.id.clone());
    }

    /// Drop the in-progress edit and go back to add mode
    pub fn cancel_edit(&mut self) {
        self.form.clear();
        self.edit_id = None;
    }

    /// Validate the form and apply it as an add or an update
    ///
    /// On validation failure nothing changes, including the form.
    pub fn save(&mut self) -> Result<SaveOutcome, ValidationError> {
        if let Some(field) = self.form.missing_required() {
            debug!(%field, "save: validation failed");
            return Err(ValidationError { field });
        }

        let fields = std::mem::take(&mut self.form);
        let outcome = match self.edit_id.take() {
            Some(id) => {
                self.store.update(&id, fields);
                SaveOutcome::Updated(id)
            }
            None => {
                let id = self.next_id();
                self.store.add(Student::from_fields(id.clone(), fields));
                SaveOutcome::Added(id)
            }
        };

        info!(?outcome, count = self.store.len(), "Saved student");
        Ok(outcome)
    }

    /// Remove `id` after the user confirms; false when declined or unknown
    pub fn delete<P: Presenter>(&mut self, id: &str, presenter: &mut P) -> bool {
        let Some(student) = self.store.get(id) else {
            debug!(id, "delete: no matching record");
            return false;
        };

        let message = format!("Delete {}? This cannot be undone.", student.full_name());
        if !presenter.confirm("Delete student", &message) {
            debug!(id, "delete: declined");
            return false;
        }

        self.store.remove(id);
        if self.edit_id.as_deref() == Some(id) {
            self.cancel_edit();
        }

        info!(id, count = self.store.len(), "Deleted student");
        true
    }

    /// Show `id` in the read-only detail view; false when unknown
    pub fn view<P: Presenter>(&self, id: &str, presenter: &mut P) -> bool {
        match self.store.get(id) {
            Some(student) => {
                presenter.show_detail(student);
                true
            }
            None => false,
        }
    }

    fn next_id(&mut self) -> String {
        let id = now_ms().max(self.last_id + 1);
        self.last_id = id;
        id.to_string()
    }
}

//! View state for the single-page client.
//!
//! Each concern is one tagged enum, so combinations like "editing while
//! submitting a create" cannot be represented.

use crate::api::{Book, BookInput, BooksApi, ClientError};
use crate::form::BookForm;

/// Status of the initial (or a repeated) list fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

/// Form mode; `Submitting` remembers which mode to return to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    Creating,
    Editing { id: String },
    Submitting { editing: Option<String> },
}

/// Modal content drawn above the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    None,
    ConfirmDelete { id: String, title: String },
    Alert(String),
}

/// A validated request produced by [`App::begin_submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Create(BookInput),
    Update { id: String, input: BookInput },
}

#[derive(Debug, Clone)]
pub struct App {
    pub books: Vec<Book>,
    pub load: LoadState,
    pub form: BookForm,
    pub form_state: FormState,
    pub form_error: Option<String>,
    pub overlay: Overlay,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            books: Vec::new(),
            load: LoadState::Loading,
            form: BookForm::default(),
            form_state: FormState::Creating,
            form_error: None,
            overlay: Overlay::None,
        }
    }

    /// Id of the record being edited, also while its update is in flight.
    pub fn editing_id(&self) -> Option<&str> {
        match &self.form_state {
            FormState::Editing { id } => Some(id),
            FormState::Submitting { editing } => editing.as_deref(),
            FormState::Creating => None,
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.form_state, FormState::Submitting { .. })
    }

    pub async fn load(&mut self, api: &dyn BooksApi) {
        self.load = LoadState::Loading;
        match api.list().await {
            Ok(books) => {
                self.books = books;
                self.load = LoadState::Ready;
            }
            Err(err) => self.load = LoadState::Failed(err.to_string()),
        }
    }

    /// Validate the buffer and enter `Submitting`. Returns `None` when a
    /// request is already in flight or validation failed.
    pub fn begin_submit(&mut self) -> Option<Submission> {
        if self.is_submitting() {
            return None;
        }

        let input = match self.form.validate() {
            Ok(input) => input,
            Err(err) => {
                self.form_error = Some(err.to_string());
                return None;
            }
        };
        self.form_error = None;

        let editing = self.editing_id().map(str::to_string);
        self.form_state = FormState::Submitting {
            editing: editing.clone(),
        };

        Some(match editing {
            Some(id) => Submission::Update { id, input },
            None => Submission::Create(input),
        })
    }

    /// Apply the server's answer; the list only ever reflects returned records.
    pub fn finish_submit(&mut self, result: Result<Book, ClientError>) {
        let editing = match &self.form_state {
            FormState::Submitting { editing } => editing.clone(),
            _ => return,
        };
        self.form_state = FormState::Creating;

        match result {
            Ok(saved) => {
                match editing {
                    Some(id) => {
                        if let Some(slot) = self.books.iter_mut().find(|book| book.id == id) {
                            *slot = saved;
                        }
                    }
                    None => self.books.push(saved),
                }
                self.form.clear();
                self.form_error = None;
            }
            Err(err) => {
                self.form_error = Some(err.to_string());
                self.form_state = match editing {
                    Some(id) => FormState::Editing { id },
                    None => FormState::Creating,
                };
            }
        }
    }

    /// Send a submission obtained from [`App::begin_submit`].
    pub async fn dispatch(&mut self, submission: Submission, api: &dyn BooksApi) {
        let result = match &submission {
            Submission::Create(input) => api.create(input).await,
            Submission::Update { id, input } => api.update(id, input).await,
        };
        self.finish_submit(result);
    }

    pub async fn submit(&mut self, api: &dyn BooksApi) {
        if let Some(submission) = self.begin_submit() {
            self.dispatch(submission, api).await;
        }
    }

    /// Copy a record into the form and switch to edit mode.
    pub fn edit(&mut self, index: usize) {
        if self.is_submitting() {
            return;
        }
        let Some(book) = self.books.get(index) else {
            return;
        };

        self.form = BookForm::from_book(book);
        self.form_state = FormState::Editing {
            id: book.id.clone(),
        };
        self.form_error = None;
    }

    /// Leave edit mode without issuing a request.
    pub fn cancel_edit(&mut self) {
        if self.is_submitting() {
            return;
        }
        self.form.clear();
        self.form_state = FormState::Creating;
        self.form_error = None;
    }

    pub fn request_delete(&mut self, index: usize) {
        if let Some(book) = self.books.get(index) {
            self.overlay = Overlay::ConfirmDelete {
                id: book.id.clone(),
                title: book.title.clone(),
            };
        }
    }

    pub fn dismiss_overlay(&mut self) {
        self.overlay = Overlay::None;
    }

    /// Issue the delete the user just confirmed.
    pub async fn confirm_delete(&mut self, api: &dyn BooksApi) {
        let id = match &self.overlay {
            Overlay::ConfirmDelete { id, .. } => id.clone(),
            _ => return,
        };
        self.overlay = Overlay::None;

        match api.delete(&id).await {
            Ok(()) => {
                self.books.retain(|book| book.id != id);
                if matches!(&self.form_state, FormState::Editing { id: editing } if *editing == id) {
                    self.cancel_edit();
                }
            }
            Err(err) => self.overlay = Overlay::Alert(err.to_string()),
        }
    }
}

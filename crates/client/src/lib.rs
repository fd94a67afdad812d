//! Terminal client for the book store: one view holding a create/edit form
//! above the list of books.

pub mod api;
pub mod form;
pub mod state;
pub mod ui;

pub use api::{Book, BookInput, BooksApi, ClientError, HttpBooksApi};
pub use state::App;

use crate::api::{Book, BookInput};

/// Editable inputs, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Author,
    PublishedYear,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Title, Field::Author, Field::PublishedYear];

    pub fn label(self) -> &'static str {
        match self {
            Field::Title => "Title",
            Field::Author => "Author",
            Field::PublishedYear => "PublishedYear",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("All fields are required.")]
    MissingField,
    #[error("Published Year must be a valid 4-digit number.")]
    InvalidYear,
}

/// Raw text buffer behind the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookForm {
    pub title: String,
    pub author: String,
    pub published_year: String,
}

impl BookForm {
    pub fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            published_year: book.published_year.to_string(),
        }
    }

    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Author => &self.author,
            Field::PublishedYear => &self.published_year,
        }
    }

    pub fn value_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Title => &mut self.title,
            Field::Author => &mut self.author,
            Field::PublishedYear => &mut self.published_year,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Runs before any request is issued; text is sent as typed.
    pub fn validate(&self) -> Result<BookInput, FormError> {
        if Field::ALL
            .iter()
            .any(|&field| self.value(field).trim().is_empty())
        {
            return Err(FormError::MissingField);
        }

        if !is_four_digit_year(&self.published_year) {
            return Err(FormError::InvalidYear);
        }

        let published_year = self
            .published_year
            .parse()
            .map_err(|_| FormError::InvalidYear)?;

        Ok(BookInput {
            title: self.title.clone(),
            author: self.author.clone(),
            published_year,
        })
    }
}

fn is_four_digit_year(text: &str) -> bool {
    text.len() == 4 && text.bytes().all(|b| b.is_ascii_digit())
}

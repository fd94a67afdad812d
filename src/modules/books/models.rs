use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

/// A persisted book as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Storage-assigned identifier (24 hex characters)
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub author: String,
    pub published_year: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Validated, writable fields of a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookFields {
    pub title: String,
    pub author: String,
    pub published_year: i32,
}

impl BookFields {
    pub fn new(title: impl Into<String>, author: impl Into<String>, published_year: i32) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            published_year,
        }
    }
}

/// Request body for create and update, accepted as-is and checked by
/// [`NewBook::validate`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    /// Text, or a number or boolean cast to text
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub author: Option<Value>,
    /// Integer, or a string holding one
    #[serde(default)]
    pub published_year: Option<Value>,
}

/// One failed field constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub error: &'static str,
}

impl FieldError {
    const REQUIRED: &'static str = "required";
    const NOT_INTEGER: &'static str = "must be an integer";
    const NOT_STRING: &'static str = "must be a string";

    fn required(field: &'static str) -> Self {
        Self {
            field,
            error: Self::REQUIRED,
        }
    }
}

impl NewBook {
    /// Check every required field, reporting all failures at once.
    pub fn validate(&self) -> Result<BookFields, Vec<FieldError>> {
        let mut errors = Vec::new();

        let title = required_text("title", self.title.as_ref(), &mut errors);
        let author = required_text("author", self.author.as_ref(), &mut errors);
        let published_year = match parse_year(self.published_year.as_ref()) {
            Ok(year) => Some(year),
            Err(error) => {
                errors.push(error);
                None
            }
        };

        match (title, author, published_year) {
            (Some(title), Some(author), Some(published_year)) => Ok(BookFields {
                title,
                author,
                published_year,
            }),
            _ => Err(errors),
        }
    }
}

/// Scalars are cast to text; arrays and objects are rejected.
fn required_text(
    field: &'static str,
    value: Option<&Value>,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    let text = match value {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(Value::Number(number)) => Some(number.to_string()),
        Some(Value::Bool(flag)) => Some(flag.to_string()),
        Some(_) => {
            errors.push(FieldError {
                field,
                error: FieldError::NOT_STRING,
            });
            return None;
        }
    };

    match text {
        Some(text) if !text.trim().is_empty() => Some(text),
        _ => {
            errors.push(FieldError::required(field));
            None
        }
    }
}

/// Numbers must be integral; strings are cast the way a document schema would.
fn parse_year(value: Option<&Value>) -> Result<i32, FieldError> {
    let not_integer = FieldError {
        field: "publishedYear",
        error: FieldError::NOT_INTEGER,
    };

    let year = match value {
        None | Some(Value::Null) => return Err(FieldError::required("publishedYear")),
        Some(Value::String(text)) if text.trim().is_empty() => {
            return Err(FieldError::required("publishedYear"))
        }
        Some(Value::String(text)) => text.trim().parse::<i64>().ok(),
        Some(Value::Number(number)) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|f| f.fract() == 0.0)
                .map(|f| f as i64)
        }),
        Some(_) => None,
    };

    year.and_then(|y| i32::try_from(y).ok()).ok_or(not_integer)
}

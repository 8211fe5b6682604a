// decides which lookup a piece of user text should run

/// Digits in a document id (brazilian CPF).
pub const DOCUMENT_ID_DIGITS: usize = 11;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Carries the text exactly as typed. The digit count only picks the
    /// lookup, so "12345678900" won't find a row stored as "123.456.789-00".
    ByDocumentId(String),
    ByNameFragment(String),
}

impl Query {
    pub fn classify(text: &str) -> Self {
        // ascii only: superscripts and other scripts' digits don't count
        let digits = text.chars().filter(|c| c.is_ascii_digit()).count();

        if digits == DOCUMENT_ID_DIGITS {
            Query::ByDocumentId(text.to_string())
        } else {
            Query::ByNameFragment(text.to_string())
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Query::ByDocumentId(text) | Query::ByNameFragment(text) => text,
        }
    }
}

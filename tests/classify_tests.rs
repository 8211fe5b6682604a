// tests for picking a lookup from raw text

use peoplebot::{DOCUMENT_ID_DIGITS, Query};

#[test]
fn test_formatted_document_id() {
    let query = Query::classify("123.456.789-00");
    assert_eq!(query, Query::ByDocumentId("123.456.789-00".to_string()));
}

#[test]
fn test_bare_document_id() {
    let query = Query::classify("12345678900");
    assert_eq!(query, Query::ByDocumentId("12345678900".to_string()));
}

#[test]
fn test_document_id_keeps_original_text() {
    // the digit count only picks the lookup, the key is the text as typed
    let query = Query::classify(" (11) 999-990000 ");
    assert_eq!(query, Query::ByDocumentId(" (11) 999-990000 ".to_string()));
    assert_eq!(query.text(), " (11) 999-990000 ");
}

#[test]
fn test_name() {
    let query = Query::classify("Maria");
    assert_eq!(query, Query::ByNameFragment("Maria".to_string()));
}

#[test]
fn test_ten_digits_is_a_name() {
    let query = Query::classify("1234567890");
    assert!(matches!(query, Query::ByNameFragment(_)));
}

#[test]
fn test_twelve_digits_is_a_name() {
    let query = Query::classify("123.456.789-001");
    assert!(matches!(query, Query::ByNameFragment(_)));
}

#[test]
fn test_digits_mixed_with_letters() {
    let text = "abc12345def678xyz900";
    assert_eq!(
        text.chars().filter(char::is_ascii_digit).count(),
        DOCUMENT_ID_DIGITS
    );
    assert!(matches!(Query::classify(text), Query::ByDocumentId(_)));
}

#[test]
fn test_empty_is_a_name() {
    assert_eq!(Query::classify(""), Query::ByNameFragment(String::new()));
}

#[test]
fn test_non_ascii_digits_do_not_count() {
    // eleven arabic-indic digits
    let query = Query::classify("١٢٣٤٥٦٧٨٩٠٠");
    assert!(matches!(query, Query::ByNameFragment(_)));
}

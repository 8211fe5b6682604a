// tests for bot api payload shapes

use peoplebot::router::Menu;
use peoplebot::telegram::{InlineKeyboard, Update};

#[test]
fn test_parse_text_update() {
    let update: Update = serde_json::from_str(
        r#"{
            "update_id": 7,
            "message": {
                "message_id": 3,
                "date": 1700000000,
                "chat": {"id": -100, "type": "private"},
                "from": {"id": 1, "is_bot": false, "first_name": "Ana"},
                "text": "Maria"
            }
        }"#,
    )
    .unwrap();

    let message = update.message.unwrap();
    assert_eq!(update.update_id, 7);
    assert_eq!(message.chat.id, -100);
    assert_eq!(message.text.as_deref(), Some("Maria"));
    assert!(update.callback_query.is_none());
}

#[test]
fn test_parse_callback_update() {
    let update: Update = serde_json::from_str(
        r#"{
            "update_id": 8,
            "callback_query": {
                "id": "abc",
                "from": {"id": 1, "is_bot": false, "first_name": "Ana"},
                "chat_instance": "x",
                "data": "list_all",
                "message": {"message_id": 9, "date": 0, "chat": {"id": 5, "type": "private"}}
            }
        }"#,
    )
    .unwrap();

    let query = update.callback_query.unwrap();
    assert_eq!(query.id, "abc");
    assert_eq!(query.data.as_deref(), Some("list_all"));
    let message = query.message.unwrap();
    assert_eq!(message.message_id, 9);
    assert!(message.text.is_none());
}

#[test]
fn test_menu_becomes_one_button_per_row() {
    let keyboard = InlineKeyboard::from(&Menu::main());
    let json = serde_json::to_value(&keyboard).unwrap();

    let rows = json["inline_keyboard"].as_array().unwrap();
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|row| row.as_array().unwrap().len() == 1));
    assert_eq!(rows[0][0]["callback_data"], "list_all");
    assert_eq!(rows[3][0]["text"], "ℹ️ Help");
}

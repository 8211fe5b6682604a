// telegram bot api client - only the methods the bot actually calls

use crate::Error;
use crate::router::{Menu, Style};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

const API_URL: &str = "https://api.telegram.org";

// the only update kinds the bot reacts to
const ALLOWED_UPDATES: [&str; 2] = ["message", "callback_query"];

#[derive(Clone)]
pub struct Telegram {
    client: reqwest::Client,
    base: String,
}

// every bot api answer comes wrapped like this
#[derive(Deserialize)]
struct Envelope<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub data: Option<String>,
    pub message: Option<Message>,
}

#[derive(Serialize)]
struct GetUpdates {
    offset: i64,
    timeout: u64,
    allowed_updates: [&'static str; 2],
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboard>,
}

#[derive(Serialize)]
struct EditMessageText<'a> {
    chat_id: i64,
    message_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboard>,
}

#[derive(Serialize)]
struct AnswerCallbackQuery<'a> {
    callback_query_id: &'a str,
}

#[derive(Serialize)]
struct SetWebhook<'a> {
    url: &'a str,
    allowed_updates: [&'static str; 2],
}

#[derive(Serialize)]
struct DeleteWebhook {}

#[derive(Serialize)]
struct GetMe {}

#[derive(Debug, Serialize, PartialEq)]
pub struct InlineKeyboard {
    pub inline_keyboard: Vec<Vec<InlineButton>>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct InlineButton {
    pub text: String,
    pub callback_data: String,
}

impl From<&Menu> for InlineKeyboard {
    // one button per row
    fn from(menu: &Menu) -> Self {
        Self {
            inline_keyboard: menu
                .choices
                .iter()
                .map(|c| {
                    vec![InlineButton {
                        text: c.label.to_string(),
                        callback_data: c.id.to_string(),
                    }]
                })
                .collect(),
        }
    }
}

fn parse_mode(style: Style) -> Option<&'static str> {
    match style {
        Style::Plain => None,
        Style::Markdown => Some("Markdown"),
    }
}

// failures come back as a 4xx with ok=false and a description
fn parse_envelope<R: DeserializeOwned>(method: &str, body: &str) -> Result<R, Error> {
    let envelope: Envelope<R> = serde_json::from_str(body)?;

    if !envelope.ok {
        let reason = envelope
            .description
            .unwrap_or_else(|| format!("{method} failed"));
        return Err(Error::Telegram(reason));
    }

    envelope
        .result
        .ok_or_else(|| Error::Telegram(format!("{method} returned no result")))
}

impl Telegram {
    pub fn new(token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: format!("{API_URL}/bot{token}"),
        }
    }

    async fn call<P, R>(&self, method: &str, params: &P) -> Result<R, Error>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        // request urls carry the token, keep it out of error messages
        let response = self
            .client
            .post(format!("{}/{method}", self.base))
            .json(params)
            .send()
            .await
            .map_err(|e| Error::Http(e.without_url()))?;

        let body = response
            .text()
            .await
            .map_err(|e| Error::Http(e.without_url()))?;

        parse_envelope(method, &body)
    }

    /// The bot's own account, used to tell which `/command@name` is ours.
    pub async fn get_me(&self) -> Result<User, Error> {
        self.call("getMe", &GetMe {}).await
    }

    /// Long poll. `timeout` is in seconds.
    pub async fn get_updates(&self, offset: i64, timeout: u64) -> Result<Vec<Update>, Error> {
        let params = GetUpdates {
            offset,
            timeout,
            allowed_updates: ALLOWED_UPDATES,
        };
        self.call("getUpdates", &params).await
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        style: Style,
        menu: Option<&Menu>,
    ) -> Result<(), Error> {
        let params = SendMessage {
            chat_id,
            text,
            parse_mode: parse_mode(style),
            reply_markup: menu.map(InlineKeyboard::from),
        };
        let _: serde_json::Value = self.call("sendMessage", &params).await?;
        Ok(())
    }

    pub async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        style: Style,
        menu: Option<&Menu>,
    ) -> Result<(), Error> {
        let params = EditMessageText {
            chat_id,
            message_id,
            text,
            parse_mode: parse_mode(style),
            reply_markup: menu.map(InlineKeyboard::from),
        };
        let _: serde_json::Value = self.call("editMessageText", &params).await?;
        Ok(())
    }

    pub async fn answer_callback_query(&self, id: &str) -> Result<(), Error> {
        let params = AnswerCallbackQuery {
            callback_query_id: id,
        };
        let _: bool = self.call("answerCallbackQuery", &params).await?;
        Ok(())
    }

    pub async fn set_webhook(&self, url: &str) -> Result<(), Error> {
        let params = SetWebhook {
            url,
            allowed_updates: ALLOWED_UPDATES,
        };
        let _: bool = self.call("setWebhook", &params).await?;
        Ok(())
    }

    // polling is refused while a webhook is registered
    pub async fn delete_webhook(&self) -> Result<(), Error> {
        let _: bool = self.call("deleteWebhook", &DeleteWebhook {}).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_result() {
        let sent: bool = parse_envelope("setWebhook", r#"{"ok":true,"result":true}"#).unwrap();
        assert!(sent);
    }

    #[test]
    fn test_envelope_failure_keeps_description() {
        let err = parse_envelope::<bool>(
            "sendMessage",
            r#"{"ok":false,"error_code":400,"description":"Bad Request: can't parse entities"}"#,
        )
        .unwrap_err();

        assert!(matches!(err, Error::Telegram(ref reason) if reason.contains("can't parse")));
    }

    #[test]
    fn test_envelope_missing_result() {
        let err = parse_envelope::<bool>("getMe", r#"{"ok":true}"#).unwrap_err();
        assert!(matches!(err, Error::Telegram(ref reason) if reason == "getMe returned no result"));
    }

    #[test]
    fn test_envelope_not_json() {
        let err = parse_envelope::<bool>("getMe", "<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}

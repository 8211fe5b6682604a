// runtime glue - turns telegram updates into events and sends replies back

use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::router::{self, Delivery, Event, Menu, Reply};
use crate::telegram::{Telegram, Update};
use crate::{Error, Limits, Store};

// seconds telegram may hold a getUpdates call open
const POLL_TIMEOUT: u64 = 30;
const RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct Bot {
    store: Store,
    api: Telegram,
    limits: Limits,
    username: Option<String>,
}

// where an event came from, so the reply can find its way back
#[derive(Debug, PartialEq)]
struct Origin {
    chat_id: i64,
    message_id: Option<i64>,
}

// what an update asks of us: a button press to acknowledge and/or an event to route
#[derive(Debug, PartialEq)]
struct Incoming {
    callback_id: Option<String>,
    routed: Option<(Event, Origin)>,
}

// one outbound api call
#[derive(Debug, PartialEq)]
enum Step<'a> {
    Edit {
        message_id: i64,
        text: &'a str,
        menu: Option<&'a Menu>,
    },
    Send {
        text: &'a str,
        menu: Option<&'a Menu>,
    },
}

impl Bot {
    pub fn new(store: Store, api: Telegram, limits: Limits) -> Self {
        Self {
            store,
            api,
            limits,
            username: None,
        }
    }

    /// Ask telegram who we are so commands addressed to other bots get skipped.
    pub async fn connect(store: Store, api: Telegram, limits: Limits) -> Result<Self, Error> {
        let me = api.get_me().await?;
        info!(username = me.username.as_deref().unwrap_or("?"), "connected to telegram");

        Ok(Self {
            username: me.username,
            ..Self::new(store, api, limits)
        })
    }

    pub fn api(&self) -> &Telegram {
        &self.api
    }

    /// Handle one update end to end. Failures are logged, never returned,
    /// so one bad event can't take the bot down.
    pub async fn handle(&self, update: Update) {
        let update_id = update.update_id;
        let incoming = incoming(update, self.username.as_deref());

        // clears the spinner on the pressed button, even if we ignore the press
        if let Some(id) = &incoming.callback_id
            && let Err(e) = self.api.answer_callback_query(id).await
        {
            warn!(error = %e, "failed to answer callback query");
        }

        let Some((event, origin)) = incoming.routed else {
            debug!(update_id, "ignoring update without a routable event");
            return;
        };
        debug!(update_id, ?event, "handling event");

        let reply = match router::route(&self.store, &event).await {
            Ok(Some(reply)) => reply,
            Ok(None) => {
                debug!(update_id, "nothing to answer");
                return;
            }
            Err(e) => {
                error!(error = %e, update_id, "lookup failed");
                Reply::failure()
            }
        };

        if let Err(e) = self.deliver(&origin, &reply).await {
            warn!(error = %e, chat_id = origin.chat_id, "failed to send reply");
        }
    }

    async fn deliver(&self, origin: &Origin, reply: &Reply) -> Result<(), Error> {
        let chunks = self.limits.split(&reply.text);

        for step in plan(&chunks, reply, origin.message_id) {
            match step {
                Step::Edit {
                    message_id,
                    text,
                    menu,
                } => {
                    self.api
                        .edit_message_text(origin.chat_id, message_id, text, reply.style, menu)
                        .await?
                }
                Step::Send { text, menu } => {
                    self.api
                        .send_message(origin.chat_id, text, reply.style, menu)
                        .await?
                }
            }
        }

        Ok(())
    }

    /// Long-poll for updates until ctrl-c. Each update runs in its own task.
    pub async fn run_polling(&self) -> Result<(), Error> {
        self.api.delete_webhook().await?;
        info!("polling telegram for updates");

        let mut offset = 0;
        loop {
            let polled = tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("shutting down");
                    return Ok(());
                }
                polled = self.api.get_updates(offset, POLL_TIMEOUT) => polled,
            };

            let updates = match polled {
                Ok(updates) => updates,
                Err(e) => {
                    warn!(error = %e, "getUpdates failed, retrying");
                    tokio::time::sleep(RETRY_DELAY).await;
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);
                let bot = self.clone();
                tokio::spawn(async move { bot.handle(update).await });
            }
        }
    }
}

fn incoming(update: Update, username: Option<&str>) -> Incoming {
    if let Some(query) = update.callback_query {
        // inline-mode presses carry no message, there is nothing to edit or answer in
        let routed = match (query.message, query.data) {
            (Some(message), Some(data)) => Some((
                Event::Button(data),
                Origin {
                    chat_id: message.chat.id,
                    message_id: Some(message.message_id),
                },
            )),
            _ => None,
        };
        return Incoming {
            callback_id: Some(query.id),
            routed,
        };
    }

    let routed = update.message.and_then(|message| {
        let event = Event::from_text(message.text.as_deref()?, username)?;
        let origin = Origin {
            chat_id: message.chat.id,
            message_id: None,
        };
        Some((event, origin))
    });

    Incoming {
        callback_id: None,
        routed,
    }
}

// first chunk overwrites the pressed message when we can, the rest are new
// messages, and the menu hangs under the final piece
fn plan<'a>(chunks: &'a [String], reply: &'a Reply, message_id: Option<i64>) -> Vec<Step<'a>> {
    let last = chunks.len().saturating_sub(1);

    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            let menu = if i == last { reply.menu.as_ref() } else { None };

            match (i, reply.delivery, message_id) {
                (0, Delivery::ReplaceOrigin, Some(message_id)) => Step::Edit {
                    message_id,
                    text: chunk,
                    menu,
                },
                _ => Step::Send { text: chunk, menu },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(json: &str) -> Update {
        serde_json::from_str(json).unwrap()
    }

    fn chunks(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_text_update() {
        let incoming = incoming(
            update(r#"{"update_id":1,"message":{"message_id":3,"chat":{"id":10},"text":" Maria "}}"#),
            Some("people_bot"),
        );

        assert_eq!(
            incoming,
            Incoming {
                callback_id: None,
                routed: Some((
                    Event::Text("Maria".to_string()),
                    Origin {
                        chat_id: 10,
                        message_id: None,
                    }
                )),
            }
        );
    }

    #[test]
    fn test_command_update() {
        let incoming = incoming(
            update(
                r#"{"update_id":2,"message":{"message_id":4,"chat":{"id":10},"text":"/list@people_bot"}}"#,
            ),
            Some("people_bot"),
        );

        let (event, _) = incoming.routed.unwrap();
        assert_eq!(
            event,
            Event::Command {
                name: "list".to_string(),
                payload: String::new(),
            }
        );
    }

    #[test]
    fn test_command_for_other_bot_is_dropped() {
        let incoming = incoming(
            update(
                r#"{"update_id":3,"message":{"message_id":5,"chat":{"id":10},"text":"/start@other_bot"}}"#,
            ),
            Some("people_bot"),
        );

        assert!(incoming.routed.is_none());
        assert!(incoming.callback_id.is_none());
    }

    #[test]
    fn test_callback_update() {
        let incoming = incoming(
            update(
                r#"{"update_id":4,"callback_query":{"id":"cb9","data":"list_all","message":{"message_id":7,"chat":{"id":10}}}}"#,
            ),
            None,
        );

        assert_eq!(incoming.callback_id.as_deref(), Some("cb9"));
        assert_eq!(
            incoming.routed,
            Some((
                Event::Button("list_all".to_string()),
                Origin {
                    chat_id: 10,
                    message_id: Some(7),
                }
            ))
        );
    }

    #[test]
    fn test_callback_without_message_is_still_acknowledged() {
        let incoming = incoming(
            update(
                r#"{"update_id":5,"callback_query":{"id":"cb1","data":"list_all","inline_message_id":"x"}}"#,
            ),
            None,
        );

        assert_eq!(incoming.callback_id.as_deref(), Some("cb1"));
        assert!(incoming.routed.is_none());
    }

    #[test]
    fn test_callback_without_data_is_still_acknowledged() {
        let incoming = incoming(
            update(r#"{"update_id":6,"callback_query":{"id":"cb2","message":{"message_id":7,"chat":{"id":10}}}}"#),
            None,
        );

        assert_eq!(incoming.callback_id.as_deref(), Some("cb2"));
        assert!(incoming.routed.is_none());
    }

    #[test]
    fn test_update_without_text_is_dropped() {
        let incoming = incoming(
            update(r#"{"update_id":7,"message":{"message_id":3,"chat":{"id":10}}}"#),
            None,
        );
        assert_eq!(
            incoming,
            Incoming {
                callback_id: None,
                routed: None,
            }
        );
    }

    #[test]
    fn test_plan_replace_origin_over_several_chunks() {
        let reply = Reply::new("ignored")
            .with_menu(Menu::main())
            .replacing_origin();
        let chunks = chunks(&["one", "two", "three"]);
        let menu = Menu::main();

        let steps = plan(&chunks, &reply, Some(42));

        assert_eq!(
            steps,
            vec![
                Step::Edit {
                    message_id: 42,
                    text: "one",
                    menu: None,
                },
                Step::Send {
                    text: "two",
                    menu: None,
                },
                Step::Send {
                    text: "three",
                    menu: Some(&menu),
                },
            ]
        );
    }

    #[test]
    fn test_plan_replace_origin_without_message_sends() {
        let reply = Reply::new("ignored").replacing_origin();
        let chunks = chunks(&["one", "two"]);

        let steps = plan(&chunks, &reply, None);

        assert_eq!(
            steps,
            vec![
                Step::Send {
                    text: "one",
                    menu: None,
                },
                Step::Send {
                    text: "two",
                    menu: None,
                },
            ]
        );
    }

    #[test]
    fn test_plan_new_message_keeps_menu_on_single_chunk() {
        let reply = Reply::new("hi").with_menu(Menu::main());
        let chunks = chunks(&["hi"]);
        let menu = Menu::main();

        // a message id alone doesn't turn a new reply into an edit
        let steps = plan(&chunks, &reply, Some(42));

        assert_eq!(
            steps,
            vec![Step::Send {
                text: "hi",
                menu: Some(&menu),
            }]
        );
    }
}

// maps chat events to lookups and reply text
// holds no state between events, everything comes from the store

use crate::core::format::{format_document_id_result, format_listing, format_name_results};
use crate::{Error, Query, Store};

pub const LIST_ALL: &str = "list_all";
pub const SEARCH_NAME: &str = "search_name";
pub const SEARCH_DOCUMENT: &str = "search_document";
pub const HELP: &str = "help";

const WELCOME_TEXT: &str = "🤖 *People Lookup Bot*

Hi! I can help you look up people in our records.

*Available commands:*
• /start - Show this menu
• /list - List everyone
• /help - Show help

*How to use:*
• Use the buttons below
• Or just type the name or document ID of the person you are looking for

Pick an option:";

const HELP_TEXT: &str = "ℹ️ *Help - People Lookup Bot*

*How to use the bot:*

1️⃣ *Search by name:*
   • Type the person's name, or part of it
   • Example: \"João\" or \"Silva\"

2️⃣ *Search by document ID:*
   • Type the full 11-digit document ID exactly as registered
   • Example: \"123.456.789-00\"

3️⃣ *List everyone:*
   • Use /list or the matching button

*Commands:*
• /start - Main menu
• /list - List everyone
• /help - This help message

*Tips:*
• Name search ignores upper/lower case
• Any part of a name works";

const SEARCH_NAME_TEXT: &str = "🔍 *Search by name*

Type the name of the person you are looking for.
The full name or just part of it works.

Examples: João, Silva, Maria Santos";

const SEARCH_DOCUMENT_TEXT: &str = "📄 *Search by document ID*

Type the document ID of the person you are looking for, formatted as registered.

Example:
• 123.456.789-00";

const FAILURE_TEXT: &str = "⚠️ Something went wrong while looking that up. Please try again.";

/// Inbound chat event, already stripped of transport details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Command { name: String, payload: String },
    Text(String),
    Button(String),
}

impl Event {
    /// Parse a typed message. `/name@bot payload` becomes a command,
    /// anything else is trimmed free text. Returns `None` for a command
    /// addressed to some other bot than `username`.
    pub fn from_text(text: &str, username: Option<&str>) -> Option<Self> {
        let text = text.trim();

        if let Some(rest) = text.strip_prefix('/') {
            let (head, payload) = rest
                .split_once(char::is_whitespace)
                .unwrap_or((rest, ""));
            let (name, addressee) = match head.split_once('@') {
                Some((name, addressee)) => (name, Some(addressee)),
                None => (head, None),
            };

            if !name.is_empty() {
                if let (Some(addressee), Some(username)) = (addressee, username)
                    && !addressee.eq_ignore_ascii_case(username)
                {
                    return None;
                }

                return Some(Event::Command {
                    name: name.to_lowercase(),
                    payload: payload.trim().to_string(),
                });
            }
        }

        Some(Event::Text(text.to_string()))
    }
}

/// Rendering hint for the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Plain,
    Markdown,
}

/// Where a reply goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// A new message in the chat.
    New,
    /// Overwrite the message whose button was pressed.
    ReplaceOrigin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: &'static str,
    pub id: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    pub choices: Vec<Choice>,
}

impl Menu {
    pub fn main() -> Self {
        Self {
            choices: vec![
                Choice {
                    label: "📋 List all",
                    id: LIST_ALL,
                },
                Choice {
                    label: "🔍 Search by name",
                    id: SEARCH_NAME,
                },
                Choice {
                    label: "📄 Search by document ID",
                    id: SEARCH_DOCUMENT,
                },
                Choice {
                    label: "ℹ️ Help",
                    id: HELP,
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub style: Style,
    pub menu: Option<Menu>,
    pub delivery: Delivery,
}

impl Reply {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: Style::Markdown,
            menu: None,
            delivery: Delivery::New,
        }
    }

    /// Generic answer when the store can't be reached.
    pub fn failure() -> Self {
        Self {
            style: Style::Plain,
            ..Self::new(FAILURE_TEXT)
        }
    }

    pub fn with_menu(mut self, menu: Menu) -> Self {
        self.menu = Some(menu);
        self
    }

    pub fn replacing_origin(mut self) -> Self {
        self.delivery = Delivery::ReplaceOrigin;
        self
    }
}

/// Work out the reply for one event. `None` means the event is ignored.
pub async fn route(store: &Store, event: &Event) -> Result<Option<Reply>, Error> {
    let reply = match event {
        Event::Command { name, .. } => match name.as_str() {
            "start" => Reply::new(WELCOME_TEXT).with_menu(Menu::main()),
            "help" => Reply::new(HELP_TEXT),
            "list" => Reply::new(format_listing(&store.list_all().await?)),
            _ => return Ok(None),
        },

        Event::Button(id) => match id.as_str() {
            LIST_ALL => Reply::new(format_listing(&store.list_all().await?)).replacing_origin(),
            SEARCH_NAME => Reply::new(SEARCH_NAME_TEXT).replacing_origin(),
            SEARCH_DOCUMENT => Reply::new(SEARCH_DOCUMENT_TEXT).replacing_origin(),
            // help keeps the menu on screen
            HELP => Reply::new(HELP_TEXT),
            _ => return Ok(None),
        },

        Event::Text(text) => Reply::new(lookup(store, text).await?),
    };

    Ok(Some(reply))
}

/// Classify free text, run the matching query and format the result.
pub async fn lookup(store: &Store, text: &str) -> Result<String, Error> {
    match Query::classify(text) {
        Query::ByDocumentId(code) => {
            let person = store.find_by_document_id(&code).await?;
            Ok(format_document_id_result(person.as_ref(), &code))
        }
        Query::ByNameFragment(fragment) => {
            let people = store.find_by_name_part(&fragment).await?;
            Ok(format_name_results(&people, &fragment))
        }
    }
}

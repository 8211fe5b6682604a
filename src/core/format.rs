// turns lookup results into reply text
// replies use telegram's legacy markdown, so anything that came from a user
// or from a record goes through escape_markdown first. escapes don't work
// inside an entity, so such text never sits between bold markers

use super::db::Person;

/// Hard cap on one outbound telegram message, in characters.
pub const MESSAGE_LIMIT: usize = 4096;
/// Chunk size used once a message goes over the cap.
pub const CHUNK_SIZE: usize = 4000;

/// Outbound size policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub limit: usize,
    pub chunk_size: usize,
}

impl Limits {
    pub fn new(limit: usize, chunk_size: usize) -> Self {
        Self {
            limit,
            chunk_size: chunk_size.clamp(1, limit.max(1)),
        }
    }

    pub fn split(&self, message: &str) -> Vec<String> {
        split_for_transport(message, self.limit, self.chunk_size)
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::new(MESSAGE_LIMIT, CHUNK_SIZE)
    }
}

pub fn format_person(person: Option<&Person>) -> String {
    let Some(p) = person else {
        return "Person not found.".to_string();
    };

    let mut lines = vec![
        format!("👤 {}", bold_or_escaped(&p.name)),
        format!("📄 Document ID: {}", escape_markdown(&p.document_id)),
    ];

    push_field(&mut lines, "📧 Email", &p.email);
    push_field(&mut lines, "📞 Phone", &p.phone);
    push_field(&mut lines, "🏠 Address", &p.address);

    match (present(&p.city), present(&p.region)) {
        (Some(city), Some(region)) => lines.push(format!(
            "🏙️ City: {} - {}",
            escape_markdown(city),
            escape_markdown(region)
        )),
        (Some(only), None) | (None, Some(only)) => {
            lines.push(format!("🏙️ City: {}", escape_markdown(only)))
        }
        (None, None) => {}
    }

    push_field(&mut lines, "🎂 Birth date", &p.birth_date);
    push_field(&mut lines, "💼 Occupation", &p.occupation);

    lines.join("\n")
}

pub fn format_document_id_result(person: Option<&Person>, queried: &str) -> String {
    match person {
        Some(p) => format!(
            "🔍 *Result of search by document ID:*\n\n{}",
            format_person(Some(p))
        ),
        None => format!(
            "❌ No person found with document ID: {}",
            escape_markdown(queried)
        ),
    }
}

pub fn format_name_results(people: &[Person], queried: &str) -> String {
    match people {
        [] => format!("❌ No person found with name: {}", escape_markdown(queried)),
        [one] => format!(
            "🔍 *Result of search by name:*\n\n{}",
            format_person(Some(one))
        ),
        many => {
            let mut msg = format!(
                "🔍 *{} people found matching:* '{}'\n\n",
                many.len(),
                escape_markdown(queried)
            );
            for p in many {
                msg.push_str(&summary_line(p));
                msg.push('\n');
            }
            msg.push_str("\n💡 Send a document ID to see full details.");
            msg
        }
    }
}

pub fn format_listing(people: &[Person]) -> String {
    if people.is_empty() {
        return "❌ No people found in the database.".to_string();
    }

    let mut msg = String::from("📋 *All people:*\n\n");
    for p in people {
        msg.push_str(&summary_line(p));
        msg.push('\n');
    }
    msg.push_str(&format!("\n📊 Total: {}", people.len()));
    msg
}

/// Cut `message` into `chunk_size`-character pieces when it is longer than
/// `limit` characters. Pieces may break lines and words.
pub fn split_for_transport(message: &str, limit: usize, chunk_size: usize) -> Vec<String> {
    if message.chars().count() <= limit {
        return vec![message.to_string()];
    }

    let size = chunk_size.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (i, _) in message.char_indices() {
        if count == size {
            chunks.push(message[start..i].to_string());
            start = i;
            count = 0;
        }
        count += 1;
    }
    if start < message.len() {
        chunks.push(message[start..].to_string());
    }

    chunks
}

/// Backslash-escape the characters legacy markdown treats as markup.
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// bold when the text has no markup characters, escaped plain text otherwise
fn bold_or_escaped(text: &str) -> String {
    if text.contains(['_', '*', '`', '[']) {
        escape_markdown(text)
    } else {
        format!("*{text}*")
    }
}

fn summary_line(p: &Person) -> String {
    format!(
        "👤 {} - Document ID: {}",
        escape_markdown(&p.name),
        escape_markdown(&p.document_id)
    )
}

fn push_field(lines: &mut Vec<String>, label: &str, value: &Option<String>) {
    if let Some(v) = present(value) {
        lines.push(format!("{label}: {}", escape_markdown(v)));
    }
}

// empty strings count as missing
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Greeting shown when a chat widget opens with an empty history.
pub const WELCOME_MESSAGE: &str = "Hello! I'm ASK COSC, here to assist you with questions \
about Hacktoberfest 2024 and the CBIT Hacktoberfest Hackathon. How can I help you today?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    pub sender: Sender,
    pub message: String,
}

impl ChatEntry {
    pub fn user(message: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            message: message.into(),
        }
    }

    pub fn bot(message: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            message: message.into(),
        }
    }
}

/// Ordered message history for one chat widget instance.
///
/// Append-only per turn and owned by the session that created it; there is
/// no cross-session sharing or persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    entries: Vec<ChatEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a transcript seeded with the welcome greeting.
    pub fn with_welcome() -> Self {
        let mut transcript = Self::new();
        transcript.push(ChatEntry::bot(WELCOME_MESSAGE));
        transcript
    }

    pub fn push(&mut self, entry: ChatEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&ChatEntry> {
        self.entries.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_transcript_is_empty() {
        assert!(Transcript::new().is_empty());
    }

    #[test]
    fn with_welcome_seeds_a_single_bot_greeting() {
        let transcript = Transcript::with_welcome();

        assert_eq!(transcript.len(), 1);
        let entry = transcript.last().expect("greeting entry");
        assert_eq!(entry.sender, Sender::Bot);
        assert_eq!(entry.message, WELCOME_MESSAGE);
    }

    #[test]
    fn push_preserves_order() {
        let mut transcript = Transcript::new();
        transcript.push(ChatEntry::user("hi"));
        transcript.push(ChatEntry::bot("hello"));

        let senders: Vec<Sender> = transcript.entries().iter().map(|e| e.sender).collect();
        assert_eq!(senders, vec![Sender::User, Sender::Bot]);
    }
}

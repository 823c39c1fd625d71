//! One chat turn against the hosted completion API.
//!
//! A turn appends the user's message, sends the fixed system prompt plus the
//! full transcript to the completion endpoint, and appends the single reply.
//! At most one turn is outstanding at a time; submissions arriving while a
//! reply is in flight are rejected, not queued.

use crate::domain::transcript::{ChatEntry, Sender, Transcript};

/// Appended in place of a reply when the completion request fails in any way.
pub const FALLBACK_MESSAGE: &str = "Sorry, something went wrong. Please try again later.";

/// Persona and permitted topics for the ASK COSC assistant.
pub const SYSTEM_PROMPT: &str = r#"
    bot_identity:
    name: "ASK COSC"
    creator: "COSC (Chaitanya Bharathi Institute of Technology Open Source Community)"
    primary_role: "Assist users with questions about Hacktoberfest 2024 and CBIT Hacktoberfest Hackathon"

  event_info:
    name: "CBIT Hacktoberfest Hackathon'24"
    type: "24-hour virtual hackathon"
    dates: "October 26-27, 2024"
    registration:
      opens: "October 8, 2024, 6 PM"
      fee: "Free"
      process: "Sign up on the CBIT 2024 Hacktoberfest website"
    mode: "Online- through Discord"
    eligibility: "High school to final year bachelor's degree students in any field"

  cosc_team:
    president: "Matta Sai Kiran Goud"
    vice_president: "Akil Krishna"
    head_of_external_affairs: "Kousik Reddy"
    joint_secretaries:
      - "Mahathi Arya"
      - "Sameekruth Talari"
      - "Sri Guru Datta Pisupati"
      - "Adhit Simhadri"
    general_secretaries:
      - "G Harshith"
      - "Nithin Konda"
      - "Garlapati Ritesh"


  participation_info:
    who_can_participate: "All levels of technical expertise, from beginners to hackathon veterans" "Cross Institution teams are allowed"
    who_cannot_participate: "Masters/PhD/Post Graduate Students/Graduates/Working professionals"

  response_guidelines:
    - "Answer questions briefly"
    - "Offer insights about Hacktoberfest, open source, and Preptember"
    - "Core Committee Members are president, vice_president, head_of_external_affairs, general_secretaries, joint_secretaries."
    - "When asked about COSC members, mention the core committee members and just mention that there are other organising Committee Members"
    - "Guide participants to the Preptember page for more informative videos"
    - "Cross institution teams are allowed."
    - "Do not provide details about COSC members not listed; direct users to the contact page"
    - "Do not derogate any person or entity under any circumstance"
    - "If unable to answer, direct participants to contact us section on the website"
  "#;

/// One message in the completion request, in the API's role vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMessage {
    pub role: &'static str,
    pub content: String,
}

/// Errors at the completion-API source level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    /// Non-2xx response from the endpoint.
    Http { status: u16 },
    /// Connection, DNS, or timeout failure before a response arrived.
    Network,
    /// 2xx response whose body did not contain a reply.
    MalformedResponse,
}

/// Trait for the hosted completion endpoint.
pub trait CompletionClient {
    /// Sends the message list and returns the reply text.
    fn complete(&self, messages: &[RequestMessage]) -> Result<String, CompletionError>;
}

impl<T: CompletionClient + ?Sized> CompletionClient for &T {
    fn complete(&self, messages: &[RequestMessage]) -> Result<String, CompletionError> {
        (*self).complete(messages)
    }
}

/// Reasons a submission is rejected before any transcript mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    /// Message is empty after trimming whitespace.
    EmptyMessage,
    /// A prior turn's reply is still outstanding.
    TurnInFlight,
}

/// Token for an accepted turn; must be handed back to [`ChatTurnHandler::finish`].
#[derive(Debug)]
pub struct PendingTurn {
    _private: (),
}

/// Maps the system prompt and transcript into the API's message list.
/// The system message comes first, then the history in order, `user` for
/// user entries and `assistant` for bot entries.
pub fn build_request(system_prompt: &str, transcript: &Transcript) -> Vec<RequestMessage> {
    let mut messages = Vec::with_capacity(transcript.len() + 1);
    messages.push(RequestMessage {
        role: "system",
        content: system_prompt.to_owned(),
    });

    for entry in transcript.entries() {
        messages.push(RequestMessage {
            role: match entry.sender {
                Sender::User => "user",
                Sender::Bot => "assistant",
            },
            content: entry.message.clone(),
        });
    }

    messages
}

/// Owns one widget's transcript and enforces single-turn-at-a-time.
#[derive(Debug, Default)]
pub struct ChatTurnHandler {
    transcript: Transcript,
    in_flight: bool,
}

impl ChatTurnHandler {
    pub fn new(transcript: Transcript) -> Self {
        Self {
            transcript,
            in_flight: false,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Accepts a submission: validates the text, appends the user entry, and
    /// marks the turn in flight. Rejections leave the transcript untouched.
    pub fn begin(&mut self, text: &str) -> Result<PendingTurn, SubmitError> {
        if self.in_flight {
            return Err(SubmitError::TurnInFlight);
        }

        let text = text.trim();
        if text.is_empty() {
            return Err(SubmitError::EmptyMessage);
        }

        self.transcript.push(ChatEntry::user(text));
        self.in_flight = true;

        Ok(PendingTurn { _private: () })
    }

    /// Lands the completion result: the reply text on success, the fixed
    /// fallback on any failure. Clears the in-flight flag either way.
    pub fn finish(&mut self, _turn: PendingTurn, result: Result<String, CompletionError>) {
        let message = match result {
            Ok(reply) => reply,
            Err(error) => {
                tracing::warn!(?error, "completion request failed; using fallback reply");
                FALLBACK_MESSAGE.to_owned()
            }
        };

        self.transcript.push(ChatEntry::bot(message));
        self.in_flight = false;
    }

    /// Runs one full turn synchronously against the client.
    pub fn submit(
        &mut self,
        client: &dyn CompletionClient,
        text: &str,
    ) -> Result<&ChatEntry, SubmitError> {
        let turn = self.begin(text)?;
        let messages = build_request(SYSTEM_PROMPT, &self.transcript);
        let result = client.complete(&messages);
        self.finish(turn, result);

        Ok(self.transcript.last().expect("turn appended a bot entry"))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    struct StubClient {
        result: Result<String, CompletionError>,
        captured: RefCell<Option<Vec<RequestMessage>>>,
    }

    impl StubClient {
        fn replying(text: &str) -> Self {
            Self::with(Ok(text.to_owned()))
        }

        fn with(result: Result<String, CompletionError>) -> Self {
            Self {
                result,
                captured: RefCell::new(None),
            }
        }
    }

    impl CompletionClient for StubClient {
        fn complete(&self, messages: &[RequestMessage]) -> Result<String, CompletionError> {
            *self.captured.borrow_mut() = Some(messages.to_vec());
            self.result.clone()
        }
    }

    #[test]
    fn rejects_empty_and_whitespace_input_without_mutation() {
        let client = StubClient::replying("hi");
        let mut handler = ChatTurnHandler::default();

        assert_eq!(handler.submit(&client, ""), Err(SubmitError::EmptyMessage));
        assert_eq!(
            handler.submit(&client, "  \n\t "),
            Err(SubmitError::EmptyMessage)
        );
        assert!(handler.transcript().is_empty());
        assert!(client.captured.borrow().is_none());
    }

    #[test]
    fn successful_turn_appends_user_then_bot_entry() {
        let client = StubClient::replying("The hackathon runs October 26-27.");
        let mut handler = ChatTurnHandler::default();

        let reply = handler
            .submit(&client, "When is the hackathon?")
            .expect("turn accepted");

        assert_eq!(reply.sender, Sender::Bot);
        assert_eq!(reply.message, "The hackathon runs October 26-27.");

        let entries = handler.transcript().entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], ChatEntry::user("When is the hackathon?"));
    }

    #[test]
    fn trims_user_text_before_appending() {
        let client = StubClient::replying("ok");
        let mut handler = ChatTurnHandler::default();

        handler
            .submit(&client, "  hello there  ")
            .expect("turn accepted");

        assert_eq!(
            handler.transcript().entries()[0],
            ChatEntry::user("hello there")
        );
    }

    #[test]
    fn request_puts_system_prompt_first_and_maps_roles() {
        let client = StubClient::replying("reply");
        let mut handler = ChatTurnHandler::new(Transcript::with_welcome());

        handler.submit(&client, "who can participate?").expect("ok");

        let captured = client.captured.borrow();
        let messages = captured.as_ref().expect("request captured");
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[0].content, SYSTEM_PROMPT);
        assert_eq!(messages[1].role, "assistant");
        assert_eq!(messages[2].role, "user");
        assert_eq!(messages[2].content, "who can participate?");
    }

    #[test]
    fn http_failure_lands_the_fixed_fallback_reply() {
        let client = StubClient::with(Err(CompletionError::Http { status: 500 }));
        let mut handler = ChatTurnHandler::default();

        let reply = handler.submit(&client, "hello").expect("turn accepted");

        assert_eq!(reply.message, FALLBACK_MESSAGE);
        assert_eq!(handler.transcript().len(), 2);
    }

    #[test]
    fn network_failure_lands_the_fixed_fallback_reply() {
        let client = StubClient::with(Err(CompletionError::Network));
        let mut handler = ChatTurnHandler::default();

        let reply = handler.submit(&client, "hello").expect("turn accepted");

        assert_eq!(reply.message, FALLBACK_MESSAGE);
    }

    #[test]
    fn second_submission_while_turn_outstanding_is_rejected() {
        let mut handler = ChatTurnHandler::default();

        let turn = handler.begin("first question").expect("first accepted");
        assert!(matches!(
            handler.begin("second question"),
            Err(SubmitError::TurnInFlight)
        ));

        handler.finish(turn, Ok("answer".to_owned()));

        // Exactly one user and one bot entry for the accepted turn.
        let entries = handler.transcript().entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], ChatEntry::user("first question"));
        assert_eq!(entries[1], ChatEntry::bot("answer"));
    }

    #[test]
    fn handler_accepts_a_new_turn_after_the_previous_finishes() {
        let client = StubClient::replying("pong");
        let mut handler = ChatTurnHandler::default();

        handler.submit(&client, "ping").expect("first turn");
        handler.submit(&client, "ping again").expect("second turn");

        assert_eq!(handler.transcript().len(), 4);
    }

    #[test]
    fn build_request_on_empty_transcript_is_system_prompt_only() {
        let messages = build_request(SYSTEM_PROMPT, &Transcript::new());

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "system");
    }
}

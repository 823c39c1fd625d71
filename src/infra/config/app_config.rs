use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppConfig {
    pub logging: LogConfig,
    pub firebase: FirebaseConfig,
    pub groq: GroqConfig,
    pub chat: ChatConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
        }
    }
}

/// Identity provider and record store project settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub project_id: String,
    /// Collection holding one registration record per user id.
    pub teams_collection: String,
}

impl Default for FirebaseConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            project_id: "cbit-hacktoberfest".to_owned(),
            teams_collection: "teams".to_owned(),
        }
    }
}

/// Completion endpoint settings. The request shape is fixed; only the key
/// normally needs configuring (or the GROQ_API_KEY env var).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroqConfig {
    pub api_key: String,
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: "https://api.groq.com/openai/v1/chat/completions".to_owned(),
            model: "llama3-8b-8192".to_owned(),
            temperature: 0.7,
            max_tokens: 150,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatConfig {
    /// Per-character delay of the typing reveal, in milliseconds. Zero
    /// prints replies at once; transcript state is identical either way.
    pub typing_reveal_ms: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            typing_reveal_ms: 30,
        }
    }
}

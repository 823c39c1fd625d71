use serde::Deserialize;

use crate::infra::config::{AppConfig, ChatConfig, FirebaseConfig, GroqConfig, LogConfig};

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    pub logging: Option<FileLogConfig>,
    pub firebase: Option<FileFirebaseConfig>,
    pub groq: Option<FileGroqConfig>,
    pub chat: Option<FileChatConfig>,
}

impl FileConfig {
    pub fn merge_into(self, config: &mut AppConfig) {
        if let Some(logging) = self.logging {
            logging.merge_into(&mut config.logging);
        }

        if let Some(firebase) = self.firebase {
            firebase.merge_into(&mut config.firebase);
        }

        if let Some(groq) = self.groq {
            groq.merge_into(&mut config.groq);
        }

        if let Some(chat) = self.chat {
            chat.merge_into(&mut config.chat);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileLogConfig {
    pub level: Option<String>,
}

impl FileLogConfig {
    fn merge_into(self, config: &mut LogConfig) {
        if let Some(level) = self.level {
            config.level = level;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileFirebaseConfig {
    pub api_key: Option<String>,
    pub project_id: Option<String>,
    pub teams_collection: Option<String>,
}

impl FileFirebaseConfig {
    fn merge_into(self, config: &mut FirebaseConfig) {
        if let Some(api_key) = self.api_key {
            config.api_key = api_key;
        }

        if let Some(project_id) = self.project_id {
            config.project_id = project_id;
        }

        if let Some(teams_collection) = self.teams_collection {
            config.teams_collection = teams_collection;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileGroqConfig {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl FileGroqConfig {
    fn merge_into(self, config: &mut GroqConfig) {
        if let Some(api_key) = self.api_key {
            config.api_key = api_key;
        }

        if let Some(endpoint) = self.endpoint {
            config.endpoint = endpoint;
        }

        if let Some(model) = self.model {
            config.model = model;
        }

        if let Some(temperature) = self.temperature {
            config.temperature = temperature;
        }

        if let Some(max_tokens) = self.max_tokens {
            config.max_tokens = max_tokens;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileChatConfig {
    pub typing_reveal_ms: Option<u64>,
}

impl FileChatConfig {
    fn merge_into(self, config: &mut ChatConfig) {
        if let Some(typing_reveal_ms) = self.typing_reveal_ms {
            config.typing_reveal_ms = typing_reveal_ms;
        }
    }
}

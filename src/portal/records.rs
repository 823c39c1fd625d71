//! Registration record store adapter (Firestore REST API).
//!
//! One registration record lives at `teams/{uid}`; the gate only needs an
//! exists / not-exists answer, so the adapter issues a document GET and maps
//! 404 to "no record".

use crate::{
    infra::config::FirebaseConfig,
    portal::http::HttpRunner,
    usecases::navigate::{RegistrationLookup, SourceError},
};

const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";

pub struct FirestoreTeamLookup {
    runner: HttpRunner,
    base_url: String,
    project_id: String,
    collection: String,
    bearer_token: Option<String>,
}

impl FirestoreTeamLookup {
    pub fn new(config: &FirebaseConfig, bearer_token: Option<String>) -> Result<Self, SourceError> {
        let runner = HttpRunner::new().map_err(|_| SourceError::Unavailable)?;

        Ok(Self {
            runner,
            base_url: DEFAULT_BASE_URL.to_owned(),
            project_id: config.project_id.clone(),
            collection: config.teams_collection.clone(),
            bearer_token,
        })
    }

    fn document_url(&self, uid: &str) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents/{}/{}",
            self.base_url, self.project_id, self.collection, uid
        )
    }
}

impl RegistrationLookup for FirestoreTeamLookup {
    fn has_record(&self, uid: &str) -> Result<bool, SourceError> {
        let url = self.document_url(uid);

        self.runner.block_on(async {
            let mut request = self.runner.client().get(&url);
            if let Some(token) = self.bearer_token.as_deref() {
                request = request.bearer_auth(token);
            }

            let response = request.send().await.map_err(|error| {
                if error.is_timeout() {
                    SourceError::Timeout
                } else {
                    SourceError::Unavailable
                }
            })?;

            match response.status().as_u16() {
                200 => Ok(true),
                404 => Ok(false),
                401 | 403 => Err(SourceError::Denied),
                _ => Err(SourceError::Unavailable),
            }
        })
    }
}

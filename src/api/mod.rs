//! Quiz API types and the request plumbing between screens and the network.
//!
//! Screens never call the API directly: they hand a [`Request`] to a
//! [`Dispatch`] implementation and get back a [`Ticket`]. The matching
//! [`Reply`] arrives later through the event loop.

pub mod http;
pub mod worker;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ApiError;

/// A remote user record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "userName")]
    pub display_name: String,
    #[serde(default)]
    pub score: Option<u32>,
}

/// One round: clues describing a place and the candidate answers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Destination {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub clues: Vec<String>,
    #[serde(default)]
    pub options: Vec<String>,
}

/// Verdict for a submitted answer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnswerResult {
    pub correct: bool,
    #[serde(rename = "funFact", default, deserialize_with = "one_or_many")]
    pub fun_facts: Vec<String>,
}

/// `funFact` shows up both as a list and as a bare string.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
        Nothing(()),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(fact) => vec![fact],
        OneOrMany::Many(facts) => facts,
        OneOrMany::Nothing(()) => Vec::new(),
    })
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateUserBody<'a> {
    #[serde(rename = "userName")]
    pub user_name: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateUserResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FetchUserResponse {
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnswerBody<'a> {
    pub id: &'a str,
    #[serde(rename = "selectedAnswer")]
    pub selected_answer: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ScoreBody {
    pub score: u32,
}

/// The five calls the client makes against the quiz backend.
pub trait QuizApi: Send {
    fn fetch_destination(&self) -> Result<Destination, ApiError>;
    fn check_answer(&self, destination_id: &str, selected_answer: &str) -> Result<AnswerResult, ApiError>;
    fn create_user(&self, user_name: &str) -> Result<User, ApiError>;
    fn update_score(&self, user_id: &str, score: u32) -> Result<(), ApiError>;
    fn fetch_user(&self, user_id: &str) -> Result<User, ApiError>;
}

/// Identifies one dispatched request so its reply can be matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    FetchDestination,
    CheckAnswer { destination_id: String, selected_answer: String },
    CreateUser { user_name: String },
    UpdateScore { user_id: String, score: u32 },
    FetchUser { user_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Destination(Destination),
    Answer(AnswerResult),
    User(User),
    ScoreSaved,
}

#[derive(Debug)]
pub struct Reply {
    pub ticket: Ticket,
    pub result: Result<Payload, ApiError>,
}

impl Request {
    pub fn label(&self) -> &'static str {
        match self {
            Request::FetchDestination => "fetch_destination",
            Request::CheckAnswer { .. } => "check_answer",
            Request::CreateUser { .. } => "create_user",
            Request::UpdateScore { .. } => "update_score",
            Request::FetchUser { .. } => "fetch_user",
        }
    }

    pub fn execute(&self, api: &dyn QuizApi) -> Result<Payload, ApiError> {
        match self {
            Request::FetchDestination => api.fetch_destination().map(Payload::Destination),
            Request::CheckAnswer { destination_id, selected_answer } => {
                api.check_answer(destination_id, selected_answer).map(Payload::Answer)
            }
            Request::CreateUser { user_name } => api.create_user(user_name).map(Payload::User),
            Request::UpdateScore { user_id, score } => {
                api.update_score(user_id, *score).map(|()| Payload::ScoreSaved)
            }
            Request::FetchUser { user_id } => api.fetch_user(user_id).map(Payload::User),
        }
    }
}

/// Hands requests off to whatever performs them.
pub trait Dispatch {
    fn dispatch(&mut self, request: Request) -> Ticket;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_decodes_wire_names() {
        let user: User = serde_json::from_value(json!({ "_id": "u1", "userName": "Alice" }))
            .expect("user decodes");
        assert_eq!(user.id, "u1");
        assert_eq!(user.display_name, "Alice");
        assert_eq!(user.score, None);
    }

    #[test]
    fn destination_accepts_mongo_id() {
        let destination: Destination = serde_json::from_value(json!({
            "_id": "d7",
            "clues": ["Eiffel"],
            "options": ["Paris", "Rome"]
        }))
        .expect("destination decodes");
        assert_eq!(destination.id, "d7");
        assert_eq!(destination.options, vec!["Paris", "Rome"]);
    }

    #[test]
    fn fun_fact_list_and_single_string() {
        let many: AnswerResult =
            serde_json::from_value(json!({ "correct": false, "funFact": ["Rome is...", "Also..."] }))
                .expect("list decodes");
        assert_eq!(many.fun_facts.len(), 2);

        let one: AnswerResult = serde_json::from_value(json!({ "correct": true, "funFact": "Paris!" }))
            .expect("string decodes");
        assert_eq!(one.fun_facts, vec!["Paris!"]);

        let none: AnswerResult = serde_json::from_value(json!({ "correct": true })).expect("missing decodes");
        assert!(none.fun_facts.is_empty());

        let null: AnswerResult =
            serde_json::from_value(json!({ "correct": true, "funFact": null })).expect("null decodes");
        assert!(null.fun_facts.is_empty());
    }

    #[test]
    fn request_bodies_use_wire_names() {
        let body = serde_json::to_value(AnswerBody { id: "d1", selected_answer: "Rome" }).expect("encodes");
        assert_eq!(body, json!({ "id": "d1", "selectedAnswer": "Rome" }));

        let body = serde_json::to_value(CreateUserBody { user_name: "Alice" }).expect("encodes");
        assert_eq!(body, json!({ "userName": "Alice" }));
    }

    #[test]
    fn create_user_response_tolerates_missing_fields() {
        let response: CreateUserResponse =
            serde_json::from_value(json!({ "message": "name taken" })).expect("decodes");
        assert!(!response.success);
        assert!(response.user.is_none());
        assert_eq!(response.message.as_deref(), Some("name taken"));
    }
}

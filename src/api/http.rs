//! Reqwest-backed implementation of [`QuizApi`].

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::{
    AnswerBody, AnswerResult, CreateUserBody, CreateUserResponse, Destination, FetchUserResponse, QuizApi,
    ScoreBody, User,
};
use crate::error::ApiError;

pub struct HttpApi {
    client: Client,
    base: Url,
}

impl HttpApi {
    /// Build a client for `base`. With no timeout a hung call blocks until
    /// the server gives up.
    pub fn new(base: Url, timeout: Option<Duration>) -> Result<Self, ApiError> {
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl);
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    /// `base` with `segments` appended; an empty last segment keeps a trailing slash.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.header(ACCEPT, "application/json").send()?;
        let status = response.status();
        let body = response.bytes()?;
        if !status.is_success() {
            return Err(map_status_error(status, &body));
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ApiError {
    if status == StatusCode::NOT_FOUND {
        return ApiError::NotFound;
    }
    let message = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|value| value.get("message").and_then(Value::as_str).map(str::to_owned));
    warn!(status = status.as_u16(), ?message, "quiz API returned an error status");
    ApiError::Status { status: status.as_u16(), message }
}

/// A 2xx create can still be a refusal; only `success` with a user counts.
fn user_from_create(response: CreateUserResponse) -> Result<User, ApiError> {
    match response {
        CreateUserResponse { success: true, user: Some(user), .. } => Ok(user),
        CreateUserResponse { message, .. } => Err(ApiError::Rejected(message)),
    }
}

fn user_from_fetch(response: FetchUserResponse) -> Result<User, ApiError> {
    response.user.ok_or(ApiError::NotFound)
}

impl QuizApi for HttpApi {
    fn fetch_destination(&self) -> Result<Destination, ApiError> {
        let url = self.endpoint(&["destinations", ""])?;
        debug!(%url, "fetching destination");
        self.send_json(self.client.get(url))
    }

    fn check_answer(&self, destination_id: &str, selected_answer: &str) -> Result<AnswerResult, ApiError> {
        if destination_id.is_empty() || selected_answer.is_empty() {
            return Err(ApiError::InvalidInput("destination id and answer are required"));
        }
        let url = self.endpoint(&["destinations", "answer"])?;
        debug!(%url, destination_id, "checking answer");
        let body = AnswerBody { id: destination_id, selected_answer };
        self.send_json(self.client.patch(url).json(&body))
    }

    fn create_user(&self, user_name: &str) -> Result<User, ApiError> {
        let url = self.endpoint(&["users"])?;
        debug!(%url, user_name, "creating user");
        let response: CreateUserResponse = self.send_json(self.client.post(url).json(&CreateUserBody { user_name }))?;
        user_from_create(response)
    }

    fn update_score(&self, user_id: &str, score: u32) -> Result<(), ApiError> {
        let url = self.endpoint(&["users", user_id])?;
        debug!(%url, score, "reporting score");
        let response = self.client.patch(url).json(&ScoreBody { score }).send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.bytes()?;
            return Err(map_status_error(status, &body));
        }
        Ok(())
    }

    fn fetch_user(&self, user_id: &str) -> Result<User, ApiError> {
        if user_id.is_empty() {
            return Err(ApiError::InvalidInput("user id is required"));
        }
        let url = self.endpoint(&["users", user_id])?;
        debug!(%url, "fetching user");
        let response: FetchUserResponse = self.send_json(self.client.get(url))?;
        user_from_fetch(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn api(base: &str) -> HttpApi {
        HttpApi::new(Url::parse(base).expect("valid base"), None).expect("client builds")
    }

    #[rstest]
    #[case("http://quiz.test", &["destinations", ""], "http://quiz.test/destinations/")]
    #[case("http://quiz.test/api/", &["users"], "http://quiz.test/api/users")]
    #[case("http://quiz.test/api", &["destinations", "answer"], "http://quiz.test/api/destinations/answer")]
    #[case("http://quiz.test", &["users", "a b/c"], "http://quiz.test/users/a%20b%2Fc")]
    fn endpoints_append_to_base(#[case] base: &str, #[case] segments: &[&str], #[case] expected: &str) {
        assert_eq!(api(base).endpoint(segments).expect("endpoint").as_str(), expected);
    }

    #[test]
    fn rejects_base_without_path() {
        let base = Url::parse("mailto:quiz@example.com").expect("valid url");
        assert!(matches!(HttpApi::new(base, None), Err(ApiError::InvalidBaseUrl)));
    }

    #[test]
    fn blank_inputs_fail_before_any_request() {
        // Nothing listens on this port; reaching the network would be a transport error.
        let api = api("http://127.0.0.1:9");
        assert!(matches!(api.check_answer("", "Rome"), Err(ApiError::InvalidInput(_))));
        assert!(matches!(api.check_answer("d1", ""), Err(ApiError::InvalidInput(_))));
        assert!(matches!(api.fetch_user(""), Err(ApiError::InvalidInput(_))));
    }

    #[rstest]
    #[case(StatusCode::NOT_FOUND, b"{}".as_slice(), None)]
    #[case(StatusCode::BAD_REQUEST, br#"{"success":false,"message":"name taken"}"#.as_slice(), Some("name taken"))]
    #[case(StatusCode::INTERNAL_SERVER_ERROR, b"oops".as_slice(), None)]
    fn status_errors_keep_server_message(
        #[case] status: StatusCode,
        #[case] body: &[u8],
        #[case] message: Option<&str>,
    ) {
        let error = map_status_error(status, body);
        if status == StatusCode::NOT_FOUND {
            assert!(matches!(error, ApiError::NotFound));
        } else {
            assert_eq!(error.server_message(), message);
        }
    }

    fn create_response(json: &str) -> CreateUserResponse {
        serde_json::from_str(json).expect("valid create response")
    }

    fn fetch_response(json: &str) -> FetchUserResponse {
        serde_json::from_str(json).expect("valid fetch response")
    }

    #[test]
    fn successful_create_yields_the_user() {
        let response = create_response(r#"{"success":true,"user":{"_id":"u1","userName":"Alice"}}"#);
        let user = user_from_create(response).expect("user");
        assert_eq!(user.id, "u1");
        assert_eq!(user.display_name, "Alice");
    }

    #[rstest]
    #[case(r#"{"success":false,"message":"name taken"}"#, Some("name taken"))]
    #[case(r#"{"success":false}"#, None)]
    #[case(r#"{"success":true}"#, None)]
    #[case(r#"{"success":true,"user":null,"message":"try later"}"#, Some("try later"))]
    fn unsuccessful_create_is_a_rejection(#[case] json: &str, #[case] message: Option<&str>) {
        match user_from_create(create_response(json)) {
            Err(ApiError::Rejected(got)) => assert_eq!(got.as_deref(), message),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn fetched_user_keeps_best_score() {
        let response = fetch_response(r#"{"user":{"_id":"f1","userName":"Bob","score":7}}"#);
        let user = user_from_fetch(response).expect("user");
        assert_eq!(user.id, "f1");
        assert_eq!(user.score, Some(7));
    }

    #[rstest]
    #[case(r#"{"user":null}"#)]
    #[case(r#"{}"#)]
    fn missing_fetched_user_is_not_found(#[case] json: &str) {
        assert!(matches!(user_from_fetch(fetch_response(json)), Err(ApiError::NotFound)));
    }
}

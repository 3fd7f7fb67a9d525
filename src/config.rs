use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use url::Url;

/// Terminal client for the Travel Quiz destination game.
#[derive(Debug, Parser)]
#[command(name = "travel-quiz", version, about)]
pub struct Config {
    /// Base URL of the quiz API, e.g. `https://quiz.example/api`.
    #[arg(long, env = "QUIZ_API_BASE_URL")]
    pub api_base_url: Url,

    /// Origin that challenge links point at.
    #[arg(long, env = "QUIZ_SHARE_ORIGIN", default_value = "http://localhost:3000")]
    pub share_origin: Url,

    /// Where the cached identity lives. Defaults to a file next to the executable.
    #[arg(long, env = "QUIZ_IDENTITY_FILE")]
    pub identity_file: Option<PathBuf>,

    /// Log destination; the terminal itself belongs to the UI.
    #[arg(long, env = "QUIZ_LOG_FILE", default_value = "travel-quiz.log")]
    pub log_file: PathBuf,

    /// Give up on API calls after this many seconds. Unset means wait forever.
    #[arg(long, env = "QUIZ_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    /// Link to open at start, such as a challenge link from a friend.
    #[arg(long, default_value = "/")]
    pub open: String,
}

impl Config {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() {
        let config = Config::try_parse_from(["travel-quiz", "--api-base-url", "http://api.test"]).expect("parses");
        assert_eq!(config.api_base_url.as_str(), "http://api.test/");
        assert_eq!(config.share_origin.as_str(), "http://localhost:3000/");
        assert_eq!(config.open, "/");
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn invite_and_timeout_flags() {
        let config = Config::try_parse_from([
            "travel-quiz",
            "--api-base-url",
            "http://api.test",
            "--open",
            "/friend?toId=f1&userName=Alice",
            "--request-timeout-secs",
            "15",
        ])
        .expect("parses");
        assert_eq!(config.open, "/friend?toId=f1&userName=Alice");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn rejects_malformed_base_url() {
        assert!(Config::try_parse_from(["travel-quiz", "--api-base-url", "not a url"]).is_err());
    }

    #[test]
    fn command_definition_is_consistent() {
        use clap::CommandFactory;
        Config::command().debug_assert();
    }
}

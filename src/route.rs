//! Screen routes and the links that lead to them.

use url::Url;

/// Base used to resolve bare paths such as `/friend?toId=..`.
const LINK_BASE: &str = "http://localhost/";

/// Query parameters carried by a challenge link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invite {
    pub to_id: Option<String>,
    pub from_score: Option<String>,
    pub inviter: Option<String>,
}

impl Invite {
    /// Link sent to a friend: who they are, who challenged them and the score to beat.
    pub fn share_link(origin: &Url, to_id: &str, from_score: u32, inviter: &str) -> Url {
        let mut link = origin.clone();
        link.set_path("/friend");
        link.query_pairs_mut()
            .clear()
            .append_pair("toId", to_id)
            .append_pair("fromScore", &from_score.to_string())
            .append_pair("userName", inviter);
        link
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Intro { user_id: Option<String> },
    Play,
    Friend(Invite),
}

impl Route {
    pub fn all() -> [&'static str; 4] {
        [" Home ", " Intro ", " Play ", " Friend "]
    }

    pub fn index(&self) -> usize {
        match self {
            Route::Home => 0,
            Route::Intro { .. } => 1,
            Route::Play => 2,
            Route::Friend(_) => 3,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Intro { .. } => "/game",
            Route::Play => "/play",
            Route::Friend(_) => "/friend",
        }
    }

    /// Parse an absolute link or a bare path; unknown paths land on Home.
    pub fn parse(link: &str) -> Result<Route, url::ParseError> {
        let url = match Url::parse(link) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(LINK_BASE)?.join(link)?,
            Err(err) => return Err(err),
        };
        let param = |name: &str| {
            url.query_pairs()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.into_owned())
                .filter(|value| !value.is_empty())
        };

        Ok(match url.path().trim_end_matches('/') {
            "/game" => Route::Intro { user_id: param("userId") },
            "/play" => Route::Play,
            "/friend" => Route::Friend(Invite {
                to_id: param("toId"),
                from_score: param("fromScore"),
                inviter: param("userName"),
            }),
            _ => Route::Home,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/", Route::Home)]
    #[case("", Route::Home)]
    #[case("/nowhere", Route::Home)]
    #[case("/game", Route::Intro { user_id: None })]
    #[case("/game?userId=u9", Route::Intro { user_id: Some("u9".into()) })]
    #[case("/game?userId=", Route::Intro { user_id: None })]
    #[case("https://quiz.example/play/", Route::Play)]
    #[case("friend?toId=f1&userName=Alice", Route::Friend(Invite {
        to_id: Some("f1".into()),
        from_score: None,
        inviter: Some("Alice".into()),
    }))]
    fn parses_links(#[case] link: &str, #[case] expected: Route) {
        assert_eq!(Route::parse(link).expect("parses"), expected);
    }

    #[test]
    fn share_link_leads_back_to_the_invite() {
        let origin = Url::parse("https://quiz.example").expect("origin");
        let link = Invite::share_link(&origin, "f1", 7, "Ana María");
        assert_eq!(link.as_str(), "https://quiz.example/friend?toId=f1&fromScore=7&userName=Ana+Mar%C3%ADa");

        let route = Route::parse(link.as_str()).expect("parses");
        assert_eq!(
            route,
            Route::Friend(Invite {
                to_id: Some("f1".into()),
                from_score: Some("7".into()),
                inviter: Some("Ana María".into()),
            })
        );
    }

    #[test]
    fn malformed_absolute_link_is_an_error() {
        assert!(Route::parse("http://[::1").is_err());
    }
}

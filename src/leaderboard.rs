//! Online leaderboard
//!
//! Wire types for the `/scores` endpoint pair, query validation matching the
//! server's rules, a paging helper for the leaderboard table and, on wasm32,
//! a `fetch`-based client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rows per leaderboard page
pub const PAGE_SIZE: u32 = 20;
/// Name recorded when the player leaves the field blank
pub const ANONYMOUS_NAME: &str = "Anon";
/// Endpoint used when the page does not configure one
pub const DEFAULT_API_URL: &str = "/scores";

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("missing query params")]
    MissingLimit,
    #[error("invalid {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("can only order by time created or none, got {0:?}")]
    InvalidOrderBy(String),
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("request failed: {0}")]
    Network(String),
}

/// One stored score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScoreEntry {
    pub name: String,
    pub score: u32,
    /// Whole seconds the run lasted
    pub time_taken: u64,
    /// Unix seconds
    pub time_submitted: u64,
}

/// Body of a `GET /scores` response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoresResponse {
    pub results: Vec<ScoreEntry>,
}

/// Body of a `POST /scores` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScoreSubmission {
    pub name: String,
    pub score: u32,
    /// Whole seconds
    pub time: u64,
}

impl ScoreSubmission {
    /// Build a submission from a finished run. Blank names become
    /// [`ANONYMOUS_NAME`]; the time is truncated to whole seconds.
    pub fn from_results(score: u32, time_ms: u64, name: &str) -> Self {
        let name = name.trim();
        Self {
            name: if name.is_empty() {
                ANONYMOUS_NAME.to_string()
            } else {
                name.to_string()
            },
            score,
            time: time_ms / 1000,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderBy {
    /// Best score first, ties broken by time taken
    #[default]
    ScoreAndTime,
    /// Submission order
    TimeCreated,
}

/// Query parameters of `GET /scores`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoresQuery {
    pub limit: u32,
    pub offset: u32,
    pub order_by: OrderBy,
}

impl ScoresQuery {
    pub fn page(offset: u32) -> Self {
        Self {
            limit: PAGE_SIZE,
            offset,
            order_by: OrderBy::ScoreAndTime,
        }
    }

    /// Validate raw query-string pairs the way the server does: `limit` is
    /// required and `orderBy`, if present, must be `TimeCreated`.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, LeaderboardError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut limit = None;
        let mut offset = 0;
        let mut order_by = OrderBy::ScoreAndTime;

        for (key, value) in pairs {
            match key {
                "limit" => limit = Some(parse_number("limit", value)?),
                "offset" => offset = parse_number("offset", value)?,
                "orderBy" => {
                    if value != "TimeCreated" {
                        return Err(LeaderboardError::InvalidOrderBy(value.to_string()));
                    }
                    order_by = OrderBy::TimeCreated;
                }
                _ => {}
            }
        }

        Ok(Self {
            limit: limit.ok_or(LeaderboardError::MissingLimit)?,
            offset,
            order_by,
        })
    }

    /// `?limit=N&offset=M`, plus `&orderBy=TimeCreated` when set
    pub fn to_query_string(&self) -> String {
        let mut query = format!("?limit={}&offset={}", self.limit, self.offset);
        if self.order_by == OrderBy::TimeCreated {
            query.push_str("&orderBy=TimeCreated");
        }
        query
    }
}

fn parse_number(field: &'static str, value: &str) -> Result<u32, LeaderboardError> {
    value.parse().map_err(|_| LeaderboardError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

/// Tracks which page of the leaderboard table is showing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeaderboardPager {
    offset: u32,
}

impl LeaderboardPager {
    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn query(&self) -> ScoresQuery {
        ScoresQuery::page(self.offset)
    }

    pub fn reset(&mut self) {
        self.offset = 0;
    }

    pub fn next(&mut self) {
        self.offset += PAGE_SIZE;
    }

    /// Step back a page. Returns false if already on the first page.
    pub fn back(&mut self) -> bool {
        if self.offset == 0 {
            return false;
        }
        self.offset = self.offset.saturating_sub(PAGE_SIZE);
        true
    }

    /// Report how many rows a fetch returned. An empty page undoes the last
    /// advance; returns whether the rows should be shown.
    pub fn on_page_loaded(&mut self, rows: usize) -> bool {
        if rows == 0 {
            self.offset = self.offset.saturating_sub(PAGE_SIZE);
            return false;
        }
        true
    }

    /// 1-based rank of the `index`th row on the current page
    pub fn rank_of(&self, index: usize) -> usize {
        self.offset as usize + index + 1
    }
}

/// Render whole seconds as `HH:MM:SS`
pub fn format_time_taken(secs: u64) -> String {
    let hours = (secs / 3600) % 24;
    let mins = (secs / 60) % 60;
    format!("{:02}:{:02}:{:02}", hours, mins, secs % 60)
}

/// Describe a submission time relative to `now` (both Unix seconds)
pub fn format_submitted(submitted: u64, now: u64) -> String {
    let diff_mins = now.saturating_sub(submitted) / 60;
    let diff_hours = diff_mins / 60;
    let diff_days = diff_hours / 24;

    match (diff_days, diff_hours, diff_mins) {
        (1, _, _) => "Yesterday".to_string(),
        (d, _, _) if d >= 2 => format!("{} days ago", d),
        (_, 1, _) => "1 hour ago".to_string(),
        (_, h, _) if h >= 2 => format!("{} hours ago", h),
        (_, _, 1) => "1 min ago".to_string(),
        (_, _, m) if m >= 2 => format!("{} mins ago", m),
        _ => "Just now".to_string(),
    }
}

#[cfg(target_arch = "wasm32")]
mod client {
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Request, RequestInit, RequestMode, Response};

    use super::*;

    fn js_error(e: JsValue) -> LeaderboardError {
        LeaderboardError::Network(format!("{:?}", e))
    }

    async fn send(request: Request) -> Result<String, LeaderboardError> {
        let window =
            web_sys::window().ok_or_else(|| LeaderboardError::Network("no window".into()))?;
        let response: Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_error)?
            .dyn_into()
            .map_err(js_error)?;

        if !response.ok() {
            return Err(LeaderboardError::Status(response.status()));
        }

        let text = JsFuture::from(response.text().map_err(js_error)?)
            .await
            .map_err(js_error)?;
        Ok(text.as_string().unwrap_or_default())
    }

    /// `GET` one page of scores
    pub async fn fetch_scores(
        api_url: &str,
        query: &ScoresQuery,
    ) -> Result<ScoresResponse, LeaderboardError> {
        let opts = RequestInit::new();
        opts.set_method("GET");
        opts.set_mode(RequestMode::Cors);

        let url = format!("{}{}", api_url, query.to_query_string());
        let request = Request::new_with_str_and_init(&url, &opts).map_err(js_error)?;
        let body = send(request).await?;
        let page: ScoresResponse = serde_json::from_str(&body)?;

        log::info!(
            "Loaded {} leaderboard rows at offset {}",
            page.results.len(),
            query.offset
        );
        Ok(page)
    }

    /// `POST` a finished run
    pub async fn submit_score(
        api_url: &str,
        submission: &ScoreSubmission,
    ) -> Result<(), LeaderboardError> {
        let body = serde_json::to_string(submission)?;

        let opts = RequestInit::new();
        opts.set_method("POST");
        opts.set_mode(RequestMode::Cors);
        opts.set_body(&JsValue::from_str(&body));

        let request = Request::new_with_str_and_init(api_url, &opts).map_err(js_error)?;
        let headers = request.headers();
        headers.set("Accept", "application/json").map_err(js_error)?;
        headers
            .set("Content-Type", "application/json")
            .map_err(js_error)?;

        send(request).await?;
        log::info!("Submitted score {} for {}", submission.score, submission.name);
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use client::{fetch_scores, submit_score};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_requires_limit() {
        let err = ScoresQuery::from_pairs([("offset", "20")]).unwrap_err();
        assert!(matches!(err, LeaderboardError::MissingLimit));
        assert_eq!(err.to_string(), "missing query params");
    }

    #[test]
    fn test_query_order_by_validation() {
        let q = ScoresQuery::from_pairs([("limit", "20"), ("orderBy", "TimeCreated")]).unwrap();
        assert_eq!(q.order_by, OrderBy::TimeCreated);
        assert_eq!(q.offset, 0);

        let err = ScoresQuery::from_pairs([("limit", "20"), ("orderBy", "Score")]).unwrap_err();
        assert!(matches!(err, LeaderboardError::InvalidOrderBy(ref v) if v == "Score"));

        let err = ScoresQuery::from_pairs([("limit", "lots")]).unwrap_err();
        assert!(matches!(err, LeaderboardError::InvalidNumber { field: "limit", .. }));
    }

    #[test]
    fn test_query_string() {
        assert_eq!(ScoresQuery::page(40).to_query_string(), "?limit=20&offset=40");
        let q = ScoresQuery {
            order_by: OrderBy::TimeCreated,
            ..ScoresQuery::page(0)
        };
        assert_eq!(q.to_query_string(), "?limit=20&offset=0&orderBy=TimeCreated");
    }

    #[test]
    fn test_submission_body() {
        let s = ScoreSubmission::from_results(125, 61_999, "  ");
        assert_eq!(s.name, "Anon");
        assert_eq!(s.time, 61);
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, r#"{"Name":"Anon","Score":125,"Time":61}"#);

        assert_eq!(ScoreSubmission::from_results(5, 0, "Dot").name, "Dot");
    }

    #[test]
    fn test_response_parses() {
        let json = r#"{"results":[{"Name":"A","Score":40,"TimeTaken":12,"TimeSubmitted":1700000000}]}"#;
        let page: ScoresResponse = serde_json::from_str(json).unwrap();
        assert_eq!(page.results[0].score, 40);
        assert_eq!(page.results[0].time_taken, 12);

        let err = serde_json::from_str::<ScoresResponse>("{").map_err(LeaderboardError::from);
        assert!(matches!(err, Err(LeaderboardError::Json(_))));
    }

    #[test]
    fn test_pager() {
        let mut pager = LeaderboardPager::default();
        assert!(!pager.back());
        pager.next();
        pager.next();
        assert_eq!(pager.offset(), 40);
        assert_eq!(pager.rank_of(0), 41);

        // Ran off the end: stay on the last real page
        assert!(!pager.on_page_loaded(0));
        assert_eq!(pager.offset(), 20);
        assert!(pager.on_page_loaded(20));

        assert!(pager.back());
        assert_eq!(pager.query(), ScoresQuery::page(0));
    }

    #[test]
    fn test_time_formats() {
        assert_eq!(format_time_taken(0), "00:00:00");
        assert_eq!(format_time_taken(3_725), "01:02:05");

        let now = 1_700_000_000;
        assert_eq!(format_submitted(now - 10, now), "Just now");
        assert_eq!(format_submitted(now - 150, now), "2 mins ago");
        assert_eq!(format_submitted(now - 3_600, now), "1 hour ago");
        assert_eq!(format_submitted(now - 86_400, now), "Yesterday");
        assert_eq!(format_submitted(now - 3 * 86_400, now), "3 days ago");
    }
}

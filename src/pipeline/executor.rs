//! Pipeline execution: search, fetch each result, synthesize once

use super::models::{PipelineState, Query};
use crate::config::Settings;
use crate::engines::{GoogleSearch, SearchProvider};
use crate::error::Result;
use crate::fetch::{create_fetcher, ContentFetcher};
use crate::network::HttpClient;
use crate::results::PipelineOutcome;
use crate::synthesis::{create_synthesizer, SynthesisProvider};
use std::time::Instant;
use tracing::{debug, info};

/// Runs the search → fetch → synthesize sequence for one query at a time
///
/// Pages are fetched strictly one after another, in result order, so the
/// excerpts line up with the locators and at most one request is in flight.
pub struct Pipeline {
    search: Box<dyn SearchProvider>,
    fetcher: Box<dyn ContentFetcher>,
    synthesizer: Box<dyn SynthesisProvider>,
    result_count: usize,
}

impl Pipeline {
    /// Create a pipeline from already-built stages
    pub fn new(
        search: Box<dyn SearchProvider>,
        fetcher: Box<dyn ContentFetcher>,
        synthesizer: Box<dyn SynthesisProvider>,
    ) -> Self {
        Self {
            search,
            fetcher,
            synthesizer,
            result_count: 5,
        }
    }

    /// Build every stage from settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let client = HttpClient::with_settings(&settings.fetch)?;

        let search = GoogleSearch::new(client.clone(), &settings.search)?;
        let fetcher = create_fetcher(client.clone(), &settings.fetch);
        let synthesizer = create_synthesizer(client, &settings.synthesis)?;

        info!(
            "Pipeline ready: search={}, fetch={}, synthesis={}",
            search.name(),
            fetcher.strategy(),
            synthesizer.name()
        );

        Ok(Self::new(Box::new(search), fetcher, synthesizer)
            .with_result_count(settings.search.result_count))
    }

    /// Set the number of results kept per run (minimum 1)
    pub fn with_result_count(mut self, count: usize) -> Self {
        self.result_count = count.max(1);
        self
    }

    /// Run the pipeline for one query
    pub async fn run(&self, query: &Query) -> PipelineOutcome {
        self.run_observed(query, |_| {}).await
    }

    /// Run the pipeline, reporting every state transition to `observe`
    pub async fn run_observed<F>(&self, query: &Query, mut observe: F) -> PipelineOutcome
    where
        F: FnMut(PipelineState) + Send,
    {
        let start = Instant::now();
        let mut enter = |state: PipelineState| {
            debug!("Pipeline state: {}", state);
            observe(state);
        };

        enter(PipelineState::Idle);
        enter(PipelineState::Searching);
        let locators = self.search.search(query.as_str(), self.result_count).await;

        if locators.is_empty() {
            enter(PipelineState::NoResults);
            info!("No results for '{}'", query);
            return PipelineOutcome::NoResults;
        }

        let total = locators.len();
        let mut excerpts = Vec::with_capacity(total);
        for (i, locator) in locators.iter().enumerate() {
            enter(PipelineState::FetchingContent {
                index: i + 1,
                total,
            });
            excerpts.push(self.fetcher.fetch(&locator.link).await);
        }

        let readable = excerpts.iter().filter(|e| e.is_text()).count();
        debug!("{} of {} pages yielded text", readable, total);

        enter(PipelineState::Synthesizing);
        let synthesis = self.synthesizer.synthesize(query.as_str(), &excerpts).await;

        enter(PipelineState::Done);
        info!(
            "Finished '{}' with {} results in {:?}",
            query,
            total,
            start.elapsed()
        );

        PipelineOutcome::Completed {
            locators,
            excerpts,
            synthesis,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FetchStrategy, SynthesisBackend};
    use crate::fetch::Envelope;
    use crate::results::{
        ContentExcerpt, ResultLocator, SynthesisResult, FETCH_ERROR, NO_CONTENT, NO_RESULTS,
        SYNTHESIS_ERROR,
    };
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct StubSearch {
        locators: Vec<ResultLocator>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SearchProvider for StubSearch {
        fn name(&self) -> &str {
            "stub"
        }

        async fn search(&self, _query: &str, limit: usize) -> Vec<ResultLocator> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.locators.iter().take(limit).cloned().collect()
        }
    }

    /// Raw page text by URL; `None` simulates an unreachable page
    struct StubFetcher {
        pages: HashMap<String, Option<String>>,
        seen: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl ContentFetcher for StubFetcher {
        fn strategy(&self) -> FetchStrategy {
            FetchStrategy::Lightweight
        }

        async fn fetch(&self, url: &str) -> ContentExcerpt {
            self.seen.lock().unwrap().push(url.to_string());
            match self.pages.get(url) {
                Some(Some(text)) => Envelope::default().normalize(text),
                _ => ContentExcerpt::FetchError,
            }
        }
    }

    struct StubSynth {
        reply: SynthesisResult,
        seen: Arc<Mutex<Vec<Vec<ContentExcerpt>>>>,
    }

    #[async_trait]
    impl SynthesisProvider for StubSynth {
        fn name(&self) -> &str {
            "stub"
        }

        async fn synthesize(&self, _query: &str, excerpts: &[ContentExcerpt]) -> SynthesisResult {
            self.seen.lock().unwrap().push(excerpts.to_vec());
            self.reply.clone()
        }
    }

    struct Harness {
        pipeline: Pipeline,
        search_calls: Arc<AtomicUsize>,
        fetched: Arc<Mutex<Vec<String>>>,
        synthesized: Arc<Mutex<Vec<Vec<ContentExcerpt>>>>,
    }

    fn harness(pages: Vec<(&str, Option<String>)>, reply: SynthesisResult) -> Harness {
        let search_calls = Arc::new(AtomicUsize::new(0));
        let fetched = Arc::new(Mutex::new(Vec::new()));
        let synthesized = Arc::new(Mutex::new(Vec::new()));

        let locators = pages
            .iter()
            .enumerate()
            .map(|(i, (url, _))| ResultLocator::new(format!("Result {}", i + 1), *url))
            .collect();
        let pages = pages
            .into_iter()
            .map(|(url, text)| (url.to_string(), text))
            .collect();

        let pipeline = Pipeline::new(
            Box::new(StubSearch {
                locators,
                calls: search_calls.clone(),
            }),
            Box::new(StubFetcher {
                pages,
                seen: fetched.clone(),
            }),
            Box::new(StubSynth {
                reply,
                seen: synthesized.clone(),
            }),
        );

        Harness {
            pipeline,
            search_calls,
            fetched,
            synthesized,
        }
    }

    fn answer(text: &str) -> SynthesisResult {
        SynthesisResult::Answer(text.to_string())
    }

    fn long_text(c: char, n: usize) -> Option<String> {
        Some(std::iter::repeat(c).take(n).collect())
    }

    #[tokio::test]
    async fn test_no_results_short_circuits() {
        let h = harness(vec![], answer("unused"));
        let mut states = Vec::new();

        let outcome = h
            .pipeline
            .run_observed(&Query::new("test").unwrap(), |s| states.push(s))
            .await;

        assert_eq!(outcome, PipelineOutcome::NoResults);
        assert_eq!(outcome.answer(), NO_RESULTS);
        assert_eq!(h.search_calls.load(Ordering::SeqCst), 1);
        assert!(h.fetched.lock().unwrap().is_empty());
        assert!(h.synthesized.lock().unwrap().is_empty());
        assert_eq!(
            states,
            vec![
                PipelineState::Idle,
                PipelineState::Searching,
                PipelineState::NoResults
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_fetch_does_not_abort_batch() {
        let h = harness(
            vec![
                ("https://a.example", long_text('a', 300)),
                ("https://slow.example", None),
                ("https://c.example", long_text('c', 300)),
            ],
            answer("Sunny later."),
        );

        let outcome = h.pipeline.run(&Query::new("weather today").unwrap()).await;

        let PipelineOutcome::Completed {
            locators,
            excerpts,
            synthesis,
        } = outcome
        else {
            panic!("expected a completed run");
        };
        assert_eq!(locators.len(), 3);
        assert_eq!(excerpts.len(), 3);
        assert_eq!(
            excerpts.iter().filter(|e| e.as_str() == FETCH_ERROR).count(),
            1
        );
        assert_eq!(excerpts[1], ContentExcerpt::FetchError);
        assert_eq!(synthesis, answer("Sunny later."));

        let synthesized = h.synthesized.lock().unwrap();
        assert_eq!(synthesized.len(), 1);
        assert_eq!(synthesized[0], excerpts);
    }

    #[tokio::test]
    async fn test_fetches_in_result_order() {
        let urls = ["https://1.example", "https://2.example", "https://3.example"];
        let h = harness(
            urls.iter().map(|u| (*u, long_text('x', 200))).collect(),
            answer("ok"),
        );
        let mut states = Vec::new();

        h.pipeline
            .run_observed(&Query::new("order").unwrap(), |s| states.push(s))
            .await;

        assert_eq!(*h.fetched.lock().unwrap(), urls.to_vec());
        assert_eq!(
            states,
            vec![
                PipelineState::Idle,
                PipelineState::Searching,
                PipelineState::FetchingContent { index: 1, total: 3 },
                PipelineState::FetchingContent { index: 2, total: 3 },
                PipelineState::FetchingContent { index: 3, total: 3 },
                PipelineState::Synthesizing,
                PipelineState::Done,
            ]
        );
    }

    #[tokio::test]
    async fn test_short_page_becomes_no_content() {
        let h = harness(vec![("https://x.example", long_text('s', 50))], answer("a"));
        let outcome = h.pipeline.run(&Query::new("x").unwrap()).await;

        let PipelineOutcome::Completed { excerpts, .. } = outcome else {
            panic!("expected a completed run");
        };
        assert_eq!(excerpts, vec![ContentExcerpt::NoContent]);
        assert_eq!(excerpts[0].as_str(), NO_CONTENT);
    }

    #[tokio::test]
    async fn test_long_page_is_truncated() {
        let h = harness(vec![("https://x.example", long_text('l', 5000))], answer("a"));
        let outcome = h.pipeline.run(&Query::new("x").unwrap()).await;

        let PipelineOutcome::Completed { excerpts, .. } = outcome else {
            panic!("expected a completed run");
        };
        assert_eq!(excerpts[0], ContentExcerpt::Text("l".repeat(2000)));
    }

    #[tokio::test]
    async fn test_synthesis_runs_over_all_sentinels() {
        let h = harness(
            vec![("https://a.example", None), ("https://b.example", None)],
            SynthesisResult::Failed,
        );
        let outcome = h.pipeline.run(&Query::new("x").unwrap()).await;

        assert_eq!(outcome.answer(), SYNTHESIS_ERROR);
        assert_eq!(h.synthesized.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_result_count_limits_fetches() {
        let urls: Vec<String> = (1..=8).map(|i| format!("https://{}.example", i)).collect();
        let h = harness(
            urls.iter().map(|u| (u.as_str(), long_text('p', 200))).collect(),
            answer("ok"),
        );
        let pipeline = h.pipeline.with_result_count(5);

        let outcome = pipeline.run(&Query::new("many").unwrap()).await;
        assert_eq!(outcome.locators().len(), 5);
        assert_eq!(h.fetched.lock().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_repeated_runs_are_identical() {
        let h = harness(
            vec![
                ("https://a.example", long_text('a', 300)),
                ("https://b.example", None),
            ],
            answer("same"),
        );
        let query = Query::new("repeat").unwrap();

        let first = h.pipeline.run(&query).await;
        let second = h.pipeline.run(&query).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_end_to_end_against_mock_backends() {
        let server = MockServer::start().await;
        let base = server.uri();

        Mock::given(method("GET"))
            .and(path("/customsearch/v1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [
                { "title": "Forecast", "link": format!("{}/forecast", base) },
                { "title": "Slow", "link": format!("{}/slow", base) },
                { "title": "Radar", "link": format!("{}/radar", base) },
            ]})))
            .expect(1)
            .mount(&server)
            .await;

        let paragraph = format!("<p>{}</p>", "Clear skies expected through the evening. ".repeat(5));
        for page in ["/forecast", "/radar"] {
            Mock::given(method("GET"))
                .and(path(page))
                .respond_with(ResponseTemplate::new(200).set_body_string(paragraph.clone()))
                .mount(&server)
                .await;
        }
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(paragraph.clone())
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "content": "Expect a clear evening." } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut settings = Settings::default();
        settings.search.endpoint = format!("{}/customsearch/v1", base);
        settings.search.api_key = Some("g-key".into());
        settings.search.engine_id = Some("cx".into());
        settings.fetch.timeout = 0.5;
        settings.synthesis.provider = SynthesisBackend::Openai;
        settings.synthesis.openai.endpoint = format!("{}/v1", base);
        settings.synthesis.openai.api_key = Some("sk".into());

        let pipeline = Pipeline::from_settings(&settings).unwrap();
        let outcome = pipeline.run(&Query::new("weather today").unwrap()).await;

        let PipelineOutcome::Completed {
            locators,
            excerpts,
            synthesis,
        } = outcome
        else {
            panic!("expected a completed run");
        };
        assert_eq!(locators[1].title, "Slow");
        assert!(excerpts[0].is_text());
        assert_eq!(excerpts[1], ContentExcerpt::FetchError);
        assert!(excerpts[2].is_text());
        assert_eq!(synthesis.as_str(), "Expect a clear evening.");
    }
}

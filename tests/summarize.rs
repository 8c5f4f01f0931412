use source_atlas::contract::MockCompletionClient;
use source_atlas::rate_limit::RateLimiter;
use source_atlas::summarize::{Summarizer, Summary};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn test_two_summaries_are_spaced_by_the_limiter() {
    let calls: Arc<Mutex<Vec<Instant>>> = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&calls);

    let mut mock = MockCompletionClient::new();
    mock.expect_complete().times(2).returning(move |_| {
        recorded.lock().unwrap().push(Instant::now());
        Ok("ok".to_string())
    });

    let summarizer = Summarizer::new(Arc::new(mock), Arc::new(RateLimiter::from_millis(1000)), 100);
    summarizer.summarize("a.js", "const a = 1;").await;
    summarizer.summarize("b.js", "const b = 2;").await;

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    assert!(calls[1] - calls[0] >= Duration::from_millis(1000));
}

#[tokio::test]
async fn test_generated_summary_is_trimmed() {
    let mut mock = MockCompletionClient::new();
    mock.expect_complete()
        .times(1)
        .returning(|_| Ok("\n Renders the landing page.\n".to_string()));
    let summarizer = Summarizer::new(Arc::new(mock), Arc::new(RateLimiter::from_millis(0)), 100);

    let summary = summarizer.summarize("src/Landing.jsx", "export default 1;").await;
    assert_eq!(summary, Summary::Generated("Renders the landing page.".to_string()));
    assert!(!summary.is_fallback());
}

#[tokio::test]
async fn test_failure_is_not_retried() {
    let mut mock = MockCompletionClient::new();
    mock.expect_complete()
        .times(1)
        .returning(|_| Err("timeout".into()));
    let summarizer = Summarizer::new(Arc::new(mock), Arc::new(RateLimiter::from_millis(0)), 100);

    let summary = summarizer.summarize("x.css", "a{}").await;
    assert_eq!(summary, Summary::Fallback("Summary unavailable: timeout".to_string()));
}

#[test]
fn test_prompt_truncates_long_content_on_char_boundary() {
    let summarizer = Summarizer::new(
        Arc::new(MockCompletionClient::new()),
        Arc::new(RateLimiter::from_millis(0)),
        5,
    );

    let prompt = summarizer.prompt("notes.md", "héllo wörld");
    assert!(prompt.contains("`notes.md`"));
    assert!(prompt.contains("héllo"));
    assert!(!prompt.contains("wörld"));
    assert!(prompt.contains("content truncated"));

    let short = summarizer.prompt("a.md", "hi");
    assert!(!short.contains("content truncated"));
}

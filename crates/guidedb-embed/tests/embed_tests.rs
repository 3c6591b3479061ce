use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use guidedb_core::config::{EmbeddingSettings, ProviderKind};
use guidedb_core::{Embedder, Error, FnEmbedder};
use guidedb_embed::{
    embedder_from_settings, parse_embedding_response, status_error, HashEmbedder, RetryPolicy, Retrying,
};

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    dot / (na * nb)
}

#[test]
fn hash_embedder_shapes_and_determinism() {
    let embedder = HashEmbedder::new(1024);
    let v1 = embedder.embed("hello world").expect("embed");
    let v2 = embedder.embed("hello world").expect("embed");

    assert_eq!(v1.len(), 1024, "embedding dim is 1024");
    assert_eq!(embedder.dim(), Some(1024));
    assert_eq!(embedder.embedder_id(), "hash:d1024");

    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    for (a, b) in v1.iter().zip(v2.iter()) { assert!((a - b).abs() <= 1e-6); }
}

#[test]
fn hash_embedder_ranks_shared_vocabulary_higher() {
    let embedder = HashEmbedder::new(256);
    let query = embedder.embed("Marfan aortic root dilation").unwrap();
    let close = embedder.embed("Aortic root dilation in Marfan syndrome patients").unwrap();
    let far = embedder.embed("pregnancy exercise guidance for athletes").unwrap();

    assert!(cosine(&query, &close) > cosine(&query, &far));
}

#[test]
fn hash_embedder_empty_text_is_zero_vector() {
    let v = HashEmbedder::new(8).embed("").unwrap();
    assert!(v.iter().all(|x| *x == 0.0));
}

#[test]
fn retrying_recovers_from_transient_provider_errors() {
    let calls = AtomicUsize::new(0);
    let flaky = FnEmbedder::new("flaky", |_text: &str| {
        if calls.fetch_add(1, Ordering::SeqCst) < 2 {
            Err(Error::Provider("rate limited".to_string()))
        } else {
            Ok(vec![1.0, 0.0])
        }
    });
    let embedder = Retrying::new(flaky, RetryPolicy::new(3, Duration::from_millis(1)));

    assert_eq!(embedder.embed("x").unwrap(), vec![1.0, 0.0]);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn retrying_gives_up_after_the_configured_retries() {
    let calls = AtomicUsize::new(0);
    let down = FnEmbedder::new("down", |_text: &str| {
        calls.fetch_add(1, Ordering::SeqCst);
        Err(Error::Provider("503".to_string()))
    });
    let embedder = Retrying::new(down, RetryPolicy::new(2, Duration::from_millis(1)));

    assert!(matches!(embedder.embed("x"), Err(Error::Provider(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 3, "one call plus two retries");
}

#[test]
fn retrying_does_not_retry_non_provider_errors() {
    let calls = AtomicUsize::new(0);
    let broken = FnEmbedder::new("broken", |_text: &str| {
        calls.fetch_add(1, Ordering::SeqCst);
        Err(Error::InvalidArgument("empty input".to_string()))
    });
    let embedder = Retrying::new(broken, RetryPolicy::new(5, Duration::from_millis(1)));

    assert!(matches!(embedder.embed("x"), Err(Error::InvalidArgument(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn backoff_doubles_per_attempt() {
    let policy = RetryPolicy::new(4, Duration::from_millis(100));
    assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(100));
    assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(200));
    assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(400));
}

#[test]
fn parses_openai_embedding_payload() {
    let body = r#"{"object":"list","data":[{"object":"embedding","index":0,"embedding":[0.25,-0.5,1.0]}],"model":"text-embedding-3-large"}"#;
    assert_eq!(parse_embedding_response(body).unwrap(), vec![0.25, -0.5, 1.0]);
}

#[test]
fn malformed_or_empty_payloads_are_rejected() {
    for body in ["not json", r#"{"data":[]}"#, r#"{"data":[{"embedding":[]}]}"#] {
        let err = parse_embedding_response(body).unwrap_err();
        assert!(matches!(err, Error::ProviderRejected(_)), "{}", body);
        assert!(!err.is_retryable());
    }
}

#[test]
fn only_rate_limits_and_server_errors_are_retryable() {
    for status in [429, 500, 502, 503] {
        assert!(status_error(status, "busy").is_retryable(), "status {}", status);
    }
    for status in [400, 401, 403, 404] {
        let err = status_error(status, "Incorrect API key provided");
        assert!(matches!(err, Error::ProviderRejected(_)), "status {}", status);
        assert!(!err.is_retryable());
    }
}

#[test]
fn retrying_stops_at_a_rejected_request() {
    let calls = AtomicUsize::new(0);
    let unauthorized = FnEmbedder::new("unauthorized", |_text: &str| {
        calls.fetch_add(1, Ordering::SeqCst);
        Err(status_error(401, "Incorrect API key provided"))
    });
    let embedder = Retrying::new(unauthorized, RetryPolicy::new(5, Duration::from_millis(1)));

    assert!(matches!(embedder.embed("x"), Err(Error::ProviderRejected(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn hash_provider_from_settings() {
    let settings = EmbeddingSettings { provider: ProviderKind::Hash, hash_dim: 32, ..EmbeddingSettings::default() };
    let embedder = embedder_from_settings(&settings).unwrap();
    assert_eq!(embedder.dim(), Some(32));
    assert_eq!(embedder.embed("aortic").unwrap().len(), 32);
}

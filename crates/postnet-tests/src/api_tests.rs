//! Miner API tests, driven through the router in-process.

use crate::generators::{mine_block, mine_chain};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use postnet_api::{AppState, BlockchainJson, PostsJson};
use postnet_consensus::{generate_key, BlockJson, Digest32, Post, PostJson};
use postnet_state::MinerState;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Create a test API router with fresh state.
fn create_test_api() -> (Router, Arc<MinerState>) {
    let state = Arc::new(MinerState::new());
    let router = postnet_api::build_api(AppState::new(Arc::clone(&state), 3000));
    (router, state)
}

/// Helper to make a GET request and get the response body as JSON.
async fn get_json(router: &Router, path: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    (status, json)
}

/// Helper to make a POST request with a JSON body.
async fn post_json(router: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(path)
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    (status, json)
}

fn encoded_post(post: &Post) -> Value {
    serde_json::to_value(PostJson::encode(post)).unwrap()
}

fn encoded_chain(chain: &[postnet_consensus::Block]) -> Value {
    let body = BlockchainJson {
        blockchain: chain.iter().map(BlockJson::encode).collect(),
    };
    serde_json::to_value(body).unwrap()
}

// ============================================================================
// /read
// ============================================================================

#[tokio::test]
async fn read_returns_an_empty_chain_at_startup() {
    let (router, _state) = create_test_api();

    let (status, json) = get_json(&router, "/read").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["blockchain"], serde_json::json!([]));
}

#[tokio::test]
async fn read_round_trips_the_accepted_chain() {
    let (router, _state) = create_test_api();
    let key = generate_key();
    let chain = mine_chain(&key, &["a", "b"]);

    let (status, _) = post_json(&router, "/broadcast", encoded_chain(&chain)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = get_json(&router, "/read").await;
    assert_eq!(status, StatusCode::OK);
    let body: BlockchainJson = serde_json::from_value(json).unwrap();
    let decoded: Vec<_> = body
        .blockchain
        .iter()
        .map(|block| block.decode().unwrap())
        .collect();
    assert_eq!(decoded, chain);
}

// ============================================================================
// /write
// ============================================================================

#[tokio::test]
async fn write_accepts_a_signed_post() {
    let (router, state) = create_test_api();
    let key = generate_key();
    let post = Post::signed(&key, "Hello World");

    let (status, _) = post_json(&router, "/write", encoded_post(&post)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state.pending_posts(), vec![post]);
}

#[tokio::test]
async fn write_rejects_a_tampered_post() {
    let (router, state) = create_test_api();
    let key = generate_key();
    let mut encoded = PostJson::encode(&Post::signed(&key, "Hello World"));
    encoded.content = "Bye World".to_string();

    let (status, json) = post_json(
        &router,
        "/write",
        serde_json::to_value(encoded).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid post");
    assert!(state.pending_posts().is_empty());
}

#[tokio::test]
async fn write_rejects_malformed_base64() {
    let (router, _state) = create_test_api();
    let key = generate_key();
    let mut encoded = PostJson::encode(&Post::signed(&key, "x"));
    encoded.signature = "not base64!".to_string();

    let (status, json) = post_json(
        &router,
        "/write",
        serde_json::to_value(encoded).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("base64"));
}

#[tokio::test]
async fn write_rejects_a_duplicate_in_the_pool() {
    let (router, _state) = create_test_api();
    let key = generate_key();
    let post = Post::signed(&key, "once");

    let (status, _) = post_json(&router, "/write", encoded_post(&post)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = post_json(&router, "/write", encoded_post(&post)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("duplicated"));
}

#[tokio::test]
async fn write_rejects_a_post_already_on_the_chain() {
    let (router, state) = create_test_api();
    let key = generate_key();
    let post = Post::signed(&key, "mined");
    let chain = vec![mine_block(Digest32::zero(), vec![post.clone()])];

    let (status, _) = post_json(&router, "/broadcast", encoded_chain(&chain)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state.chain_len(), 1);

    let (status, json) = post_json(&router, "/write", encoded_post(&post)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("duplicated"));
    assert_eq!(state.chain_len(), 1);
    assert!(state.pending_posts().is_empty());
}

// ============================================================================
// /sync
// ============================================================================

#[tokio::test]
async fn sync_merges_new_posts() {
    let (router, state) = create_test_api();
    let key = generate_key();
    let posts = vec![Post::signed(&key, "a"), Post::signed(&key, "b")];
    let body = PostsJson {
        posts: posts.iter().map(PostJson::encode).collect(),
    };

    let (status, _) = post_json(&router, "/sync", serde_json::to_value(body).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state.pending_posts(), posts);
}

#[tokio::test]
async fn sync_rejects_the_whole_batch_on_one_bad_signature() {
    let (router, state) = create_test_api();
    let key = generate_key();
    let good = PostJson::encode(&Post::signed(&key, "good"));
    let mut bad = PostJson::encode(&Post::signed(&key, "bad"));
    bad.content = "forged".to_string();
    let body = PostsJson {
        posts: vec![good, bad],
    };

    let (status, json) = post_json(&router, "/sync", serde_json::to_value(body).unwrap()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "posts are invalid");
    assert!(state.pending_posts().is_empty());
}

#[tokio::test]
async fn sync_silently_skips_known_posts() {
    let (router, state) = create_test_api();
    let key = generate_key();
    let known = Post::signed(&key, "known");
    let fresh = Post::signed(&key, "fresh");
    state.admit_post(known.clone()).unwrap();

    let body = PostsJson {
        posts: vec![PostJson::encode(&known), PostJson::encode(&fresh)],
    };
    let (status, _) = post_json(&router, "/sync", serde_json::to_value(body).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state.pending_posts(), vec![known, fresh]);
}

// ============================================================================
// /broadcast
// ============================================================================

#[tokio::test]
async fn broadcast_ignores_chains_that_are_not_longer() {
    let (router, state) = create_test_api();
    let key = generate_key();
    let incumbent = mine_chain(&key, &["keep me"]);
    post_json(&router, "/broadcast", encoded_chain(&incumbent)).await;

    // an equal-length rival does not displace the incumbent
    let rival = mine_chain(&key, &["rival"]);
    let (status, _) = post_json(&router, "/broadcast", encoded_chain(&rival)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state.chain(), incumbent);
}

#[tokio::test]
async fn broadcast_ignores_a_forged_chain_without_error() {
    let (router, state) = create_test_api();

    // 100 well-formed blocks whose headers were never mined
    let mut forged = Vec::new();
    let mut prev_hash = Digest32::zero();
    for i in 0..100u32 {
        let block = postnet_consensus::Block {
            header: postnet_consensus::BlockHeader {
                prev_hash,
                summary: postnet_consensus::hash(&Vec::<Post>::new()),
                timestamp: i as i64,
                nonce: i,
            },
            posts: Vec::new(),
        };
        prev_hash = block.header.digest();
        forged.push(block);
    }

    let (status, _) = post_json(&router, "/broadcast", encoded_chain(&forged)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state.chain_len(), 0);
}

#[tokio::test]
async fn broadcast_accepts_a_longer_valid_chain() {
    let (router, state) = create_test_api();
    let key = generate_key();
    let short = mine_chain(&key, &["a"]);
    post_json(&router, "/broadcast", encoded_chain(&short)).await;

    let long = mine_chain(&key, &["b", "c"]);
    let (status, _) = post_json(&router, "/broadcast", encoded_chain(&long)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state.chain(), long);

    // the displaced post is pending again
    assert_eq!(state.pending_posts(), short[0].posts);
}

#[tokio::test]
async fn broadcast_rejects_malformed_blocks() {
    let (router, _state) = create_test_api();
    let body = serde_json::json!({
        "blockchain": [{
            "prev_hash": "???",
            "summary": "",
            "timestamp": 0,
            "nonce": 0,
            "posts": []
        }]
    });

    let (status, _) = post_json(&router, "/broadcast", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

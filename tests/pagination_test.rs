use feedsync::net::Method;
use feedsync::types::Keyed;
use feedsync::test_utils::{MockHttpClient, create_test_client, create_test_client_with_config, page_body};
use feedsync::{ApiError, Client, ClientConfig, ErrorKind, FetchOutcome, QueryIdentity};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

fn comment(id: i64) -> Value {
    json!({
        "postCommentId": id,
        "userId": 100 + id,
        "firstName": "Ada",
        "lastName": "Lovelace",
        "comment": format!("comment {id}"),
        "timestamp": "2024-03-01T12:00:00"
    })
}

fn chat(id: i64) -> Value {
    json!({
        "chatId": id,
        "chatType": "PRIVATE_CHAT",
        "privateChatUser": { "userId": 9, "firstName": "Alan", "lastName": "Turing" },
        "latestMessage": "hey"
    })
}

fn ids(client: &Client, identity: &QueryIdentity) -> Vec<i64> {
    client
        .cache()
        .items(identity)
        .iter()
        .map(|item| item.item_id().0)
        .collect()
}

#[tokio::test]
async fn test_post_comments_paginate_in_order() {
    let _ = env_logger::builder().is_test(true).try_init();
    let http = Arc::new(MockHttpClient::new());
    http.ok(
        Method::Get,
        "/post/42/comment",
        page_body("postCommentList", json!([comment(1), comment(2)]), 0, 2),
    )
    .ok(
        Method::Get,
        "/post/42/comment",
        page_body("postCommentList", json!([comment(3)]), 1, 2),
    );
    let client = create_test_client(http.clone());
    let comments = QueryIdentity::post_comments(42);

    let first = client.comments().fetch_next(42).await.unwrap();
    assert_eq!(
        first,
        FetchOutcome::Appended {
            page_no: 0,
            has_more: true,
            total_items: 2
        }
    );
    assert_eq!(ids(&client, &comments), vec![1, 2]);

    let second = client.comments().fetch_next(42).await.unwrap();
    assert_eq!(second.snapshot(), Some((3, false)));
    assert_eq!(ids(&client, &comments), vec![1, 2, 3]);

    let third = client.comments().fetch_next(42).await.unwrap();
    assert_eq!(third, FetchOutcome::Exhausted { total_items: 3 });
    assert_eq!(http.calls_to(Method::Get, "/post/42/comment"), 2);

    let requests = http.requests();
    assert!(requests[0].url.ends_with("/post/42/comment?pageNo=0&pageSize=10"));
    assert!(requests[1].url.ends_with("/post/42/comment?pageNo=1&pageSize=10"));
    assert_eq!(requests[0].header("Authorization"), Some("Bearer test-token"));
}

#[tokio::test]
async fn test_missing_token_sends_nothing() {
    let http = Arc::new(MockHttpClient::new());
    let client = Client::builder()
        .with_http_client(http.clone())
        .build()
        .unwrap();

    let err = client.posts().fetch_next().await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthenticated));
    assert_eq!(err.kind(), ErrorKind::Auth);
    assert_eq!(http.request_count(), 0);
}

#[tokio::test]
async fn test_concurrent_fetches_share_one_request() {
    let http = Arc::new(MockHttpClient::new());
    http.ok(
        Method::Get,
        "/chat/5",
        page_body("chatModels", json!([chat(1), chat(2)]), 0, 3),
    );
    http.set_delay(Duration::from_millis(20));
    let client = create_test_client(http.clone());

    let (chats_a, chats_b) = (client.chats(), client.chats());
    let (a, b) = tokio::join!(chats_a.fetch_next(5), chats_b.fetch_next(5));
    let outcomes = [a.unwrap(), b.unwrap()];

    assert!(outcomes.contains(&FetchOutcome::InFlight));
    assert_eq!(http.request_count(), 1);
    assert_eq!(client.cache().item_count(&QueryIdentity::user_chats(5)), 2);
}

#[tokio::test]
async fn test_failed_page_is_retried_with_same_index() {
    let http = Arc::new(MockHttpClient::new());
    http.fail(Method::Get, "/friends/list/3", "connection reset").ok(
        Method::Get,
        "/friends/list/3",
        page_body(
            "userList",
            json!([{ "userId": 8, "firstName": "Grace", "lastName": "Hopper" }]),
            0,
            1,
        ),
    );
    let client = create_test_client(http.clone());
    let friends = QueryIdentity::friend_list(3);

    let err = client.friends().fetch_list_next(3).await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(client.cache().item_count(&friends), 0);
    let failure = client.fetcher().last_error(&friends).unwrap();
    assert_eq!(failure.page_no, 0);

    client.friends().fetch_list_next(3).await.unwrap();
    assert_eq!(ids(&client, &friends), vec![8]);
    assert!(client.fetcher().last_error(&friends).is_none());

    let requests = http.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|r| r.url.contains("pageNo=0")));
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let http = Arc::new(MockHttpClient::new());
    http.ok(Method::Get, "/post/get/all", page_body("postList", json!([]), 0, 1));
    http.set_delay(Duration::from_millis(200));
    let client = create_test_client_with_config(
        http,
        ClientConfig::default().with_request_timeout(Duration::from_millis(20)),
    );

    let err = client.posts().fetch_next().await.unwrap_err();
    assert!(matches!(err, ApiError::Timeout(_)));
    assert!(err.is_retryable());
    assert!(client.fetcher().last_error(&QueryIdentity::all_posts()).is_some());
}

#[tokio::test]
async fn test_rejected_token_is_auth_failure() {
    let http = Arc::new(MockHttpClient::new());
    http.respond(Method::Get, "/notifications/1", 401, json!({ "error": "expired" }));
    let client = create_test_client(http);

    let err = client.notifications().fetch_next(1).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { status: 401 }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_invalidate_restarts_from_first_page() {
    let http = Arc::new(MockHttpClient::new());
    http.ok(
        Method::Get,
        "/chat/2",
        page_body("chatModels", json!([chat(1)]), 0, 2),
    );
    let client = create_test_client(http.clone());
    let chats = QueryIdentity::user_chats(2);

    client.chats().fetch_next(2).await.unwrap();
    client.cache().invalidate(&chats);
    assert!(client.list(&chats).is_none_or(|list| list.is_empty()));

    client.chats().fetch_next(2).await.unwrap();
    let requests = http.requests();
    assert!(requests[1].url.contains("pageNo=0"));
}

#[tokio::test]
async fn test_lists_are_isolated() {
    let http = Arc::new(MockHttpClient::new());
    http.ok(
        Method::Get,
        "/chat/1",
        page_body("chatModels", json!([chat(1)]), 0, 1),
    );
    http.respond(Method::Get, "/chat/2", 503, json!({ "error": "down" }));
    let client = create_test_client(http);

    client.chats().fetch_next(1).await.unwrap();
    assert!(client.chats().fetch_next(2).await.is_err());
    assert_eq!(ids(&client, &QueryIdentity::user_chats(1)), vec![1]);
}

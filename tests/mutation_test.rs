use feedsync::net::Method;
use feedsync::test_utils::{MockHttpClient, create_test_client, page_body};
use feedsync::types::{Item, Keyed, LikeState};
use feedsync::{ApiError, Client, MutationError, MutationOutcome, QueryIdentity, RequestOrigin};
use serde_json::{Value, json};
use std::sync::Arc;

fn post(id: i64, liked: bool, like_count: u64) -> Value {
    json!({
        "postId": id,
        "userId": 2,
        "firstName": "Grace",
        "lastName": "Hopper",
        "content": "compilers!",
        "liked": liked,
        "likeCount": like_count,
        "commentCount": 0
    })
}

fn notification(id: i64, kind: &str, read: bool) -> Value {
    json!({
        "notificationId": id,
        "notificationType": kind,
        "sender": { "userId": 50 + id, "firstName": "Alan", "lastName": "Turing" },
        "message": "hello",
        "read": read
    })
}

fn user(id: i64) -> Value {
    json!({ "userId": id, "firstName": "User", "lastName": id.to_string() })
}

fn ids(client: &Client, identity: &QueryIdentity) -> Vec<i64> {
    client
        .cache()
        .items(identity)
        .iter()
        .map(|item| item.item_id().0)
        .collect()
}

fn like_state(client: &Client, post_id: i64) -> Option<LikeState> {
    client
        .cache()
        .items(&QueryIdentity::all_posts())
        .iter()
        .find(|item| item.item_id().0 == post_id)
        .and_then(Item::like_state)
}

async fn client_with_posts(http: &Arc<MockHttpClient>) -> Arc<Client> {
    http.ok(
        Method::Get,
        "/post/get/all",
        page_body("postList", json!([post(1, false, 5), post(2, true, 1)]), 0, 1),
    );
    let client = create_test_client(http.clone());
    client.posts().fetch_next().await.unwrap();
    client
}

#[tokio::test]
async fn test_like_toggle_commits_on_success() {
    let _ = env_logger::builder().is_test(true).try_init();
    let http = Arc::new(MockHttpClient::new());
    let client = client_with_posts(&http).await;
    http.ok(Method::Post, "/post/1/like", json!({}));

    let outcome = client
        .posts()
        .toggle_like(&QueryIdentity::all_posts(), 1)
        .await
        .unwrap();

    assert_eq!(outcome, MutationOutcome::Applied);
    assert_eq!(
        like_state(&client, 1),
        Some(LikeState {
            liked: true,
            count: 6
        })
    );
}

#[tokio::test]
async fn test_like_toggle_rolls_back_on_failure() {
    let http = Arc::new(MockHttpClient::new());
    let client = client_with_posts(&http).await;
    http.respond(Method::Post, "/post/1/like", 500, json!({ "error": "boom" }));
    let mut failures = client.event_bus.mutation_failed.subscribe();

    let err = client
        .posts()
        .toggle_like(&QueryIdentity::all_posts(), 1)
        .await
        .unwrap_err();

    assert!(matches!(err, MutationError::Api(ApiError::Server { status: 500, .. })));
    assert_eq!(
        like_state(&client, 1),
        Some(LikeState {
            liked: false,
            count: 5
        })
    );
    let event = failures.recv().await.unwrap();
    assert_eq!(event.intent.item_id.0, 1);
}

#[tokio::test]
async fn test_deleted_notification_reappears_at_its_index() {
    let http = Arc::new(MockHttpClient::new());
    http.ok(
        Method::Get,
        "/notifications/7",
        page_body(
            "notificationModels",
            json!([
                notification(1, "POST_LIKED", false),
                notification(2, "POST_COMMENT", false),
                notification(3, "POST_LIKED", true)
            ]),
            0,
            1,
        ),
    );
    http.respond(Method::Delete, "/notifications/delete/2", 500, json!({}));
    let client = create_test_client(http.clone());
    client.notifications().fetch_next(7).await.unwrap();

    client.notifications().delete(7, 2).await.unwrap_err();

    assert_eq!(ids(&client, &QueryIdentity::notifications(7)), vec![1, 2, 3]);
    assert_eq!(http.calls_to(Method::Delete, "/notifications/delete/2"), 1);
}

#[tokio::test]
async fn test_mark_as_read_twice_sends_once() {
    let http = Arc::new(MockHttpClient::new());
    http.ok(
        Method::Get,
        "/notifications/7",
        page_body(
            "notificationModels",
            json!([notification(4, "POST_LIKED", false)]),
            0,
            1,
        ),
    );
    http.ok(Method::Put, "/notifications/read/4", json!({}));
    let client = create_test_client(http.clone());
    client.notifications().fetch_next(7).await.unwrap();

    let first = client.notifications().mark_as_read(7, 4).await.unwrap();
    let second = client.notifications().mark_as_read(7, 4).await.unwrap();

    assert_eq!(first, MutationOutcome::Applied);
    assert_eq!(second, MutationOutcome::AlreadyApplied);
    assert_eq!(http.calls_to(Method::Put, "/notifications/read/4"), 1);
}

#[tokio::test]
async fn test_accept_failure_never_deletes_notification() {
    let http = Arc::new(MockHttpClient::new());
    http.respond(Method::Post, "/friends/accept/51", 409, json!({ "error": "already friends" }));
    http.ok(Method::Delete, "/notifications/delete/1", json!({}));
    let client = create_test_client(http.clone());

    let err = client
        .friends()
        .accept(7, 51, RequestOrigin::Notification(1))
        .await
        .unwrap_err();

    assert!(matches!(err, MutationError::Api(ApiError::Conflict { status: 409, .. })));
    assert_eq!(http.calls_to(Method::Post, "/friends/accept/51"), 1);
    assert_eq!(http.calls_to(Method::Delete, "/notifications/delete/1"), 0);
}

#[tokio::test]
async fn test_accept_from_notification_removes_it() {
    let http = Arc::new(MockHttpClient::new());
    http.ok(
        Method::Get,
        "/notifications/7",
        page_body(
            "notificationModels",
            json!([
                notification(1, "FRIEND_REQUEST", false),
                notification(2, "POST_LIKED", false)
            ]),
            0,
            1,
        ),
    );
    http.ok(
        Method::Get,
        "/friends/list/7",
        page_body("userList", json!([user(30)]), 0, 1),
    );
    http.ok(Method::Post, "/friends/accept/51", json!({}));
    http.ok(Method::Delete, "/notifications/delete/1", json!({}));
    let client = create_test_client(http.clone());
    client.notifications().fetch_next(7).await.unwrap();
    client.friends().fetch_list_next(7).await.unwrap();

    client
        .friends()
        .accept(7, 51, RequestOrigin::Notification(1))
        .await
        .unwrap();

    assert_eq!(ids(&client, &QueryIdentity::notifications(7)), vec![2]);
    // friend list is refetched rather than patched
    assert_eq!(client.cache().item_count(&QueryIdentity::friend_list(7)), 0);
    let requests = http.requests();
    let accept = requests
        .iter()
        .position(|r| r.url.ends_with("/friends/accept/51"))
        .unwrap();
    let cleanup = requests
        .iter()
        .position(|r| r.url.ends_with("/notifications/delete/1"))
        .unwrap();
    assert!(accept < cleanup);
}

#[tokio::test]
async fn test_accept_from_request_list() {
    let http = Arc::new(MockHttpClient::new());
    http.ok(
        Method::Get,
        "/friends/request/7",
        page_body("userList", json!([user(51), user(52)]), 0, 1),
    );
    http.ok(Method::Post, "/friends/accept/51", json!({}));
    let client = create_test_client(http.clone());
    client.friends().fetch_requests_next(7).await.unwrap();

    let outcome = client
        .friends()
        .accept(7, 51, RequestOrigin::RequestList)
        .await
        .unwrap();

    assert_eq!(outcome, MutationOutcome::Applied);
    assert_eq!(ids(&client, &QueryIdentity::friend_requests(7)), vec![52]);
    assert_eq!(http.request_count(), 2);
}

#[tokio::test]
async fn test_decline_request_rolls_back() {
    let http = Arc::new(MockHttpClient::new());
    http.ok(
        Method::Get,
        "/friends/request/7",
        page_body("userList", json!([user(51), user(52)]), 0, 1),
    );
    http.fail(Method::Delete, "/friends/request/delete/51", "connection refused");
    let client = create_test_client(http.clone());
    client.friends().fetch_requests_next(7).await.unwrap();

    let err = client
        .friends()
        .delete_request(7, 51, RequestOrigin::RequestList)
        .await
        .unwrap_err();

    assert!(matches!(err, MutationError::Api(ApiError::Network(_))));
    assert_eq!(ids(&client, &QueryIdentity::friend_requests(7)), vec![51, 52]);
}

#[tokio::test]
async fn test_delete_post_refreshes_other_feeds() {
    let http = Arc::new(MockHttpClient::new());
    let client = client_with_posts(&http).await;
    http.ok(
        Method::Get,
        "/post/get/2",
        page_body("postList", json!([post(1, false, 5)]), 0, 1),
    );
    http.ok(Method::Delete, "/post/delete/1", json!({}));
    client.posts().fetch_user_posts_next(2).await.unwrap();

    client
        .posts()
        .delete(&QueryIdentity::all_posts(), 1)
        .await
        .unwrap();

    assert_eq!(ids(&client, &QueryIdentity::all_posts()), vec![2]);
    assert_eq!(client.cache().item_count(&QueryIdentity::user_posts(2)), 0);
}

#[tokio::test]
async fn test_mutation_without_token_is_rolled_back() {
    let http = Arc::new(MockHttpClient::new());
    let client = client_with_posts(&http).await;
    let anonymous = Client::builder()
        .with_http_client(http.clone())
        .build()
        .unwrap();
    let before = http.request_count();

    let err = anonymous
        .posts()
        .toggle_like(&QueryIdentity::all_posts(), 1)
        .await
        .unwrap_err();

    assert!(matches!(err, MutationError::Api(ApiError::Unauthenticated)));
    assert_eq!(http.request_count(), before);
    // the authenticated client's cache is untouched
    assert_eq!(like_state(&client, 1).map(|s| s.count), Some(5));
}

mod common;

use axum::http::StatusCode;
use blog_api::votes::repo::VoteRepo;
use common::{TestApp, TestUser};
use serde_json::{json, Value};

async fn vote(app: &TestApp, user: &TestUser, post_id: &Value, dir: u8) -> common::Response {
    app.post_json("/vote/", Some(&user.token), json!({ "post_id": post_id, "dir": dir }))
        .await
}

#[tokio::test]
async fn vote_on_post() {
    let app = TestApp::new();
    let user = app.user("h1@x.com", "pw").await;
    let post = app.create_post(&user, "First Post", true).await;

    let res = vote(&app, &user, &post["id"], 1).await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body, json!({ "message": "successfully added vote" }));

    let fetched = app.get(&format!("/posts/{}", post["id"]), None).await;
    assert_eq!(fetched.body["votes"], 1);
}

#[tokio::test]
async fn voting_twice_conflicts() {
    let app = TestApp::new();
    let user = app.user("h1@x.com", "pw").await;
    let post = app.create_post(&user, "First Post", true).await;

    assert_eq!(vote(&app, &user, &post["id"], 1).await.status, StatusCode::CREATED);

    let second = vote(&app, &user, &post["id"], 1).await;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(
        second.detail(),
        format!("user {} has already voted on post {}", user.id, post["id"])
    );

    let fetched = app.get(&format!("/posts/{}", post["id"]), None).await;
    assert_eq!(fetched.body["votes"], 1);
}

#[tokio::test]
async fn remove_vote_after_adding() {
    let app = TestApp::new();
    let user = app.user("h1@x.com", "pw").await;
    let post = app.create_post(&user, "First Post", true).await;

    vote(&app, &user, &post["id"], 1).await;
    let res = vote(&app, &user, &post["id"], 0).await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body, json!({ "message": "successfully deleted vote" }));

    let fetched = app.get(&format!("/posts/{}", post["id"]), None).await;
    assert_eq!(fetched.body["votes"], 0);
}

#[tokio::test]
async fn removing_a_vote_that_never_existed_succeeds() {
    let app = TestApp::new();
    let user = app.user("h1@x.com", "pw").await;
    let post = app.create_post(&user, "First Post", true).await;

    let res = vote(&app, &user, &post["id"], 0).await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["message"], "successfully deleted vote");
}

#[tokio::test]
async fn votes_from_different_users_add_up() {
    let app = TestApp::new();
    let a = app.user("a@x.com", "pw").await;
    let b = app.user("b@x.com", "pw").await;
    let post = app.create_post(&a, "Popular", true).await;

    vote(&app, &a, &post["id"], 1).await;
    vote(&app, &b, &post["id"], 1).await;

    let listed = app.get("/posts/", Some(&a.token)).await;
    assert_eq!(listed.body[0]["votes"], 2);
}

#[tokio::test]
async fn voting_on_missing_post_is_not_found() {
    let app = TestApp::new();
    let user = app.user("h1@x.com", "pw").await;
    for dir in [1, 0] {
        let res = vote(&app, &user, &json!(9999), dir).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert_eq!(res.detail(), "post with id 9999 does not exist");
    }
}

#[tokio::test]
async fn direction_must_be_zero_or_one() {
    let app = TestApp::new();
    let user = app.user("h1@x.com", "pw").await;
    let post = app.create_post(&user, "First Post", true).await;
    let res = vote(&app, &user, &post["id"], 2).await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(res.detail().contains("dir must be 0 or 1"), "{:?}", res.body);
}

#[tokio::test]
async fn malformed_vote_body_is_422_with_detail() {
    let app = TestApp::new();
    let user = app.user("h1@x.com", "pw").await;

    let broken = app.post_raw("/vote/", Some(&user.token), r#"{"post_id": 1,"#).await;
    assert_eq!(broken.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(!broken.detail().is_empty(), "{:?}", broken.body);

    let missing_dir = app
        .post_json("/vote/", Some(&user.token), json!({ "post_id": 1 }))
        .await;
    assert_eq!(missing_dir.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(missing_dir.detail().contains("dir"), "{:?}", missing_dir.body);
}

#[tokio::test]
async fn voting_requires_authentication() {
    let app = TestApp::new();
    let res = app
        .post_json("/vote/", None, json!({ "post_id": 1, "dir": 1 }))
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.detail(), "Not authenticated");
}

#[tokio::test]
async fn deleting_a_post_clears_its_votes() {
    let app = TestApp::new();
    let user = app.user("h1@x.com", "pw").await;
    let post = app.create_post(&user, "Short-lived", true).await;
    vote(&app, &user, &post["id"], 1).await;

    app.delete(&format!("/posts/{}", post["id"]), Some(&user.token)).await;

    let post_id = post["id"].as_i64().unwrap();
    assert!(!app.state.votes.exists(user.id, post_id).await.unwrap());
}

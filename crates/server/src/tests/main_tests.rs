use super::*;
use axum::{
    body,
    body::Body,
    http::{header, Request},
};
use tower::ServiceExt;

async fn test_app() -> Router {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    build_router(Arc::new(AppState {
        api: ApiContext { storage },
    }))
}

fn form_post(uri: &str, item_text: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!(
            "item_text={}",
            item_text.replace(' ', "+")
        )))
        .expect("request")
}

fn location(response: &axum::response::Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("location header")
        .to_str()
        .expect("location utf8")
        .to_string()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}

#[tokio::test]
async fn home_page_mentions_to_do_lists() {
    let app = test_app().await;
    let response = app
        .oneshot(Request::get("/").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("<title>To-Do lists</title>"));
    assert!(html.contains("To-Do"));
    assert!(html.contains(r#"placeholder="Enter a to-do item""#));
}

#[tokio::test]
async fn healthz_reports_ok() {
    let app = test_app().await;
    let response = app
        .oneshot(Request::get("/healthz").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn new_list_redirects_to_its_list_url() {
    let app = test_app().await;
    let response = app
        .clone()
        .oneshot(form_post("/lists/new", "Buy peacock feathers"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let target = location(&response);
    let list_id: i64 = target
        .strip_prefix("/lists/")
        .and_then(|rest| rest.strip_suffix('/'))
        .expect("redirect target shaped /lists/{id}/")
        .parse()
        .expect("numeric list id");
    assert!(list_id > 0);

    let response = app
        .oneshot(
            Request::get(target.as_str())
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("1: Buy peacock feathers"));
}

#[tokio::test]
async fn each_new_list_gets_its_own_url() {
    let app = test_app().await;
    let first = app
        .clone()
        .oneshot(form_post("/lists/new", "one"))
        .await
        .expect("first response");
    let second = app
        .oneshot(form_post("/lists/new", "two"))
        .await
        .expect("second response");
    assert_ne!(location(&first), location(&second));
}

#[tokio::test]
async fn added_items_render_in_submission_order() {
    let app = test_app().await;
    let response = app
        .clone()
        .oneshot(form_post("/lists/new", "Buy peacock feathers"))
        .await
        .expect("new list");
    let list_url = location(&response);

    let response = app
        .clone()
        .oneshot(form_post(
            &format!("{list_url}add_item"),
            "Use peacock feathers to make a fly",
        ))
        .await
        .expect("add item");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), list_url);

    let response = app
        .oneshot(
            Request::get(list_url.as_str())
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("list page");
    let html = body_text(response).await;
    let first = html.find("1: Buy peacock feathers").expect("first row");
    let second = html
        .find("2: Use peacock feathers to make a fly")
        .expect("second row");
    assert!(first < second);
}

#[tokio::test]
async fn view_of_unknown_list_returns_404() {
    let app = test_app().await;
    let response = app
        .oneshot(
            Request::get("/lists/42/")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn add_to_unknown_list_returns_404() {
    let app = test_app().await;
    let response = app
        .oneshot(form_post("/lists/42/add_item", "Buy milk"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_item_text_returns_400() {
    let app = test_app().await;
    let response = app
        .clone()
        .oneshot(form_post("/lists/new", ""))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let created = app
        .clone()
        .oneshot(form_post("/lists/new", "real item"))
        .await
        .expect("new list");
    let list_url = location(&created);
    let response = app
        .oneshot(form_post(&format!("{list_url}add_item"), ""))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

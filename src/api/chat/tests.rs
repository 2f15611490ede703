use axum::http::{Method, StatusCode};
use serde_json::json;
use time::Duration;
use tower::ServiceExt;

use crate::core::time::primitive_now_utc;
use crate::db::types::TutoringStatus;
use crate::test_support;

#[tokio::test]
async fn participants_exchange_trimmed_messages() {
    let ctx = test_support::setup_test_context().await;
    let (tutor_user, tutor) =
        test_support::insert_tutor(ctx.state.db(), "11.111.111-1", "Valentina").await;
    let student = test_support::insert_user(ctx.state.db(), "22.222.222-2", "Diego").await;
    let session = test_support::insert_session(
        ctx.state.db(),
        &tutor.id,
        &student.id,
        TutoringStatus::Accepted,
        primitive_now_utc() + Duration::days(1),
    )
    .await;
    let student_token = test_support::login_token(&ctx.state, &student).await;
    let tutor_token = test_support::login_token(&ctx.state, &tutor_user).await;
    let uri = format!("/chat/{}/messages", session.id);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &uri,
            Some(&student_token),
            Some(json!({ "mensaje": "  Hola profe  " })),
        ))
        .await
        .expect("post");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {body}");
    assert_eq!(body["content"], "Hola profe");
    assert_eq!(body["sender"], "Diego Prueba");
    assert_eq!(body["time"].as_str().map(str::len), Some(5));

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &uri,
            Some(&tutor_token),
            Some(json!({ "content": "Hola Diego" })),
        ))
        .await
        .expect("post");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/chat/{}", session.id),
            Some(&tutor_token),
            None,
        ))
        .await
        .expect("history");
    let body = test_support::read_json(response).await;
    let messages = body["messages"].as_array().expect("messages");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["content"], "Hola profe");
    assert_eq!(messages[1]["content"], "Hola Diego");
}

#[tokio::test]
async fn blank_message_is_rejected() {
    let ctx = test_support::setup_test_context().await;
    let (_, tutor) = test_support::insert_tutor(ctx.state.db(), "11.111.111-1", "Valentina").await;
    let student = test_support::insert_user(ctx.state.db(), "22.222.222-2", "Diego").await;
    let session = test_support::insert_session(
        ctx.state.db(),
        &tutor.id,
        &student.id,
        TutoringStatus::Pending,
        primitive_now_utc() + Duration::days(1),
    )
    .await;
    let token = test_support::login_token(&ctx.state, &student).await;

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/chat/{}/messages", session.id),
            Some(&token),
            Some(json!({ "content": "   " })),
        ))
        .await
        .expect("post");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "response: {body}");
    assert!(!body["errors"]["content"].is_null());
}

#[tokio::test]
async fn outsider_cannot_post() {
    let ctx = test_support::setup_test_context().await;
    let (_, tutor) = test_support::insert_tutor(ctx.state.db(), "11.111.111-1", "Valentina").await;
    let student = test_support::insert_user(ctx.state.db(), "22.222.222-2", "Diego").await;
    let outsider = test_support::insert_user(ctx.state.db(), "33.333.333-3", "Intruso").await;
    let session = test_support::insert_session(
        ctx.state.db(),
        &tutor.id,
        &student.id,
        TutoringStatus::Pending,
        primitive_now_utc() + Duration::days(1),
    )
    .await;
    let token = test_support::login_token(&ctx.state, &outsider).await;

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/chat/{}/messages", session.id),
            Some(&token),
            Some(json!({ "content": "hola" })),
        ))
        .await
        .expect("post");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

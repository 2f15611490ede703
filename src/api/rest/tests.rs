use axum::http::{Method, StatusCode};
use serde_json::json;
use time::Duration;
use tower::ServiceExt;

use crate::core::time::primitive_now_utc;
use crate::db::types::TutoringStatus;
use crate::repositories;
use crate::test_support::{self, TestContext};

async fn send(
    ctx: &TestContext,
    method: Method,
    uri: &str,
    token: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(method, uri, Some(token), body))
        .await
        .expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, body)
}

#[tokio::test]
async fn users_are_paginated_with_links() {
    let ctx = test_support::setup_test_context().await;
    let viewer = test_support::insert_user(ctx.state.db(), "10.000.000-0", "Lectora").await;
    for index in 1..=11 {
        test_support::insert_user(
            ctx.state.db(),
            &format!("20.000.{index:03}-1"),
            &format!("Alumno{index}"),
        )
        .await;
    }
    let token = test_support::login_token(&ctx.state, &viewer).await;

    let (status, body) = send(&ctx, Method::GET, "/api/v1/users", &token, None).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["count"], 12);
    assert_eq!(body["results"].as_array().map(Vec::len), Some(10));
    assert_eq!(body["next"], "/api/v1/users?page=2");
    assert!(body["previous"].is_null());

    let (status, body) = send(&ctx, Method::GET, "/api/v1/users?page=2", &token, None).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["results"].as_array().map(Vec::len), Some(2));
    assert!(body["next"].is_null());
    assert_eq!(body["previous"], "/api/v1/users");

    let uri = format!("/api/v1/users?page={}", i64::MAX);
    let (status, body) = send(&ctx, Method::GET, &uri, &token, None).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["results"].as_array().map(Vec::len), Some(0));
    assert!(body["next"].is_null());
}

#[tokio::test]
async fn rest_requires_authentication() {
    let ctx = test_support::setup_test_context().await;

    let response = ctx
        .app
        .oneshot(test_support::json_request(Method::GET, "/api/v1/tutors", None, None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn user_writes_are_staff_only_and_delete_deactivates() {
    let ctx = test_support::setup_test_context().await;
    let student = test_support::insert_user(ctx.state.db(), "22.222.222-2", "Diego").await;
    let target = test_support::insert_user(ctx.state.db(), "33.333.333-3", "Josefa").await;
    let staff = test_support::insert_staff(ctx.state.db(), "44.444.444-4", "Admin").await;
    let student_token = test_support::login_token(&ctx.state, &student).await;
    let staff_token = test_support::login_token(&ctx.state, &staff).await;
    let uri = format!("/api/v1/users/{}", target.id);

    let (status, _) = send(&ctx, Method::DELETE, &uri, &student_token, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&ctx, Method::DELETE, &uri, &staff_token, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let user = repositories::users::find_by_id(ctx.state.db(), &target.id)
        .await
        .expect("load user")
        .expect("row is kept");
    assert!(!user.is_active);
}

#[tokio::test]
async fn tutor_detail_nests_user_and_sessions_and_delete_is_soft() {
    let ctx = test_support::setup_test_context().await;
    let (tutor_user, tutor) =
        test_support::insert_tutor(ctx.state.db(), "11.111.111-1", "Valentina").await;
    let student = test_support::insert_user(ctx.state.db(), "22.222.222-2", "Diego").await;
    let staff = test_support::insert_staff(ctx.state.db(), "44.444.444-4", "Admin").await;
    test_support::insert_session(
        ctx.state.db(),
        &tutor.id,
        &student.id,
        TutoringStatus::Pending,
        primitive_now_utc() + Duration::days(1),
    )
    .await;
    let token = test_support::login_token(&ctx.state, &staff).await;
    let uri = format!("/api/v1/tutors/{}", tutor.id);

    let (status, body) = send(&ctx, Method::GET, &uri, &token, None).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["user"]["id"], tutor_user.id.as_str());
    assert_eq!(body["sessions"].as_array().map(Vec::len), Some(1));

    let (status, _) = send(&ctx, Method::DELETE, &uri, &token, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let tutor = repositories::tutors::find_by_id(ctx.state.db(), &tutor.id)
        .await
        .expect("load tutor")
        .expect("row is kept");
    assert!(!tutor.active);
}

#[tokio::test]
async fn session_detail_nests_messages_and_delete_cancels() {
    let ctx = test_support::setup_test_context().await;
    let (_, tutor) = test_support::insert_tutor(ctx.state.db(), "11.111.111-1", "Valentina").await;
    let student = test_support::insert_user(ctx.state.db(), "22.222.222-2", "Diego").await;
    let session = test_support::insert_session(
        ctx.state.db(),
        &tutor.id,
        &student.id,
        TutoringStatus::Accepted,
        primitive_now_utc() + Duration::days(1),
    )
    .await;
    let token = test_support::login_token(&ctx.state, &student).await;

    let (status, body) = send(
        &ctx,
        Method::POST,
        "/api/v1/messages",
        &token,
        Some(json!({ "session_id": session.id, "content": "  ¿Llevo el cuaderno?  " })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "response: {body}");
    let message_id = body["id"].as_str().expect("message id").to_string();

    let uri = format!("/api/v1/sessions/{}", session.id);
    let (status, body) = send(&ctx, Method::GET, &uri, &token, None).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["id"], session.id.as_str());
    assert_eq!(body["messages"][0]["content"], "¿Llevo el cuaderno?");

    let (status, _) =
        send(&ctx, Method::DELETE, &format!("/api/v1/messages/{message_id}"), &token, None)
            .await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let (status, _) = send(&ctx, Method::DELETE, &uri, &token, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let session = repositories::tutoring_sessions::find_by_id(ctx.state.db(), &session.id)
        .await
        .expect("load session")
        .expect("row is kept");
    assert_eq!(session.status, TutoringStatus::Cancelled);
}

#[tokio::test]
async fn session_create_validates_tutor_and_time() {
    let ctx = test_support::setup_test_context().await;
    let (tutor_user, tutor) =
        test_support::insert_tutor(ctx.state.db(), "11.111.111-1", "Valentina").await;
    let student = test_support::insert_user(ctx.state.db(), "22.222.222-2", "Diego").await;
    let student_token = test_support::login_token(&ctx.state, &student).await;
    let tutor_token = test_support::login_token(&ctx.state, &tutor_user).await;

    let payload = |scheduled_at: &str| {
        json!({
            "tutor_id": tutor.id,
            "subject_id": test_support::TEST_SUBJECT,
            "modality": "Presencial",
            "scheduled_at": scheduled_at,
            "topic": "Derivadas"
        })
    };

    let (status, body) = send(
        &ctx,
        Method::POST,
        "/api/v1/sessions",
        &student_token,
        Some(payload("2020-01-01T10:00:00Z")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "response: {body}");
    assert!(!body["errors"]["scheduled_at"].is_null(), "response: {body}");

    let (status, body) = send(
        &ctx,
        Method::POST,
        "/api/v1/sessions",
        &tutor_token,
        Some(payload("2999-01-01T10:00:00Z")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "response: {body}");
    assert!(!body["errors"]["tutor_id"].is_null(), "response: {body}");

    let (status, body) = send(
        &ctx,
        Method::POST,
        "/api/v1/sessions",
        &student_token,
        Some(payload("2999-01-01T10:00:00Z")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "response: {body}");
    assert_eq!(body["status"], "Pendiente");
    assert_eq!(body["duration_minutes"], 60);
}

#[tokio::test]
async fn students_only_list_their_own_sessions() {
    let ctx = test_support::setup_test_context().await;
    let (_, tutor) = test_support::insert_tutor(ctx.state.db(), "11.111.111-1", "Valentina").await;
    let student = test_support::insert_user(ctx.state.db(), "22.222.222-2", "Diego").await;
    let other = test_support::insert_user(ctx.state.db(), "33.333.333-3", "Josefa").await;
    for student_id in [&student.id, &other.id] {
        test_support::insert_session(
            ctx.state.db(),
            &tutor.id,
            student_id,
            TutoringStatus::Pending,
            primitive_now_utc() + Duration::days(1),
        )
        .await;
    }
    let staff = test_support::insert_staff(ctx.state.db(), "44.444.444-4", "Admin").await;

    let token = test_support::login_token(&ctx.state, &student).await;
    let (_, body) = send(&ctx, Method::GET, "/api/v1/sessions", &token, None).await;
    assert_eq!(body["count"], 1, "response: {body}");

    let token = test_support::login_token(&ctx.state, &staff).await;
    let (_, body) = send(&ctx, Method::GET, "/api/v1/sessions", &token, None).await;
    assert_eq!(body["count"], 2, "response: {body}");
}

#[tokio::test]
async fn staff_read_conversations_but_only_participants_post() {
    let ctx = test_support::setup_test_context().await;
    let (_, tutor) = test_support::insert_tutor(ctx.state.db(), "11.111.111-1", "Valentina").await;
    let student = test_support::insert_user(ctx.state.db(), "22.222.222-2", "Diego").await;
    let staff = test_support::insert_staff(ctx.state.db(), "44.444.444-4", "Admin").await;
    let session = test_support::insert_session(
        ctx.state.db(),
        &tutor.id,
        &student.id,
        TutoringStatus::Accepted,
        primitive_now_utc() + Duration::days(1),
    )
    .await;
    let token = test_support::login_token(&ctx.state, &staff).await;

    let (status, body) =
        send(&ctx, Method::GET, &format!("/api/v1/sessions/{}", session.id), &token, None).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");

    let (status, body) = send(
        &ctx,
        Method::POST,
        "/api/v1/messages",
        &token,
        Some(json!({ "session_id": session.id, "content": "Hola" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "response: {body}");

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE session_id = $1")
        .bind(&session.id)
        .fetch_one(ctx.state.db())
        .await
        .expect("count messages");
    assert_eq!(stored, 0);
}

#[tokio::test]
async fn only_the_tutor_edits_tutor_notes() {
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
    let uri = format!("/api/v1/sessions/{}", session.id);

    let (status, _) = send(
        &ctx,
        Method::PATCH,
        &uri,
        &student_token,
        Some(json!({ "tutor_notes": "Viene preparado" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Students can still change their own topic.
    let (status, body) =
        send(&ctx, Method::PATCH, &uri, &student_token, Some(json!({ "topic": "Integrales" })))
            .await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["topic"], "Integrales");
    assert_eq!(body["tutor_notes"], "");

    let (status, body) = send(
        &ctx,
        Method::PATCH,
        &uri,
        &tutor_token,
        Some(json!({ "tutor_notes": "Repasar regla de la cadena" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["tutor_notes"], "Repasar regla de la cadena");
}

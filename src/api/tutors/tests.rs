use axum::http::{Method, StatusCode};
use serde_json::json;
use time::{macros::time, Duration, OffsetDateTime};
use tower::ServiceExt;

use crate::db::types::DayOfWeek;
use crate::repositories;
use crate::test_support;

fn booking(slot: &str) -> serde_json::Value {
    json!({
        "hora_disponible": slot,
        "asignatura": test_support::TEST_SUBJECT,
        "modalidad": "Online",
        "tema_solicitud": "Recursividad"
    })
}

#[tokio::test]
async fn search_filters_by_name_and_specialty() {
    let ctx = test_support::setup_test_context().await;
    test_support::insert_tutor(ctx.state.db(), "11.111.111-1", "Valentina").await;
    let (_, other) = test_support::insert_tutor(ctx.state.db(), "22.222.222-2", "Matías").await;
    repositories::tutors::update(
        ctx.state.db(),
        &other.id,
        repositories::tutors::UpdateTutor {
            specialties: Some("Contabilidad".to_string()),
            ..Default::default()
        },
    )
    .await
    .expect("update specialties");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, "/tutors?nombre=valen", None, None))
        .await
        .expect("search");
    let body = test_support::read_json(response).await;
    let tutors = body["tutors"].as_array().expect("tutors");
    assert_eq!(tutors.len(), 1, "response: {body}");
    assert_eq!(tutors[0]["first_name"], "Valentina");
    assert_eq!(body["nombre"], "valen");

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            "/tutors?especialidad=contab",
            None,
            None,
        ))
        .await
        .expect("search");
    let body = test_support::read_json(response).await;
    let tutors = body["tutors"].as_array().expect("tutors");
    assert_eq!(tutors.len(), 1, "response: {body}");
    assert_eq!(tutors[0]["first_name"], "Matías");
}

#[tokio::test]
async fn booking_options_list_active_slots() {
    let ctx = test_support::setup_test_context().await;
    let (_, tutor) = test_support::insert_tutor(ctx.state.db(), "11.111.111-1", "Valentina").await;
    let student = test_support::insert_user(ctx.state.db(), "22.222.222-2", "Diego").await;
    test_support::insert_slot(ctx.state.db(), &tutor.id, DayOfWeek::Monday, time!(10:00)).await;
    let token = test_support::login_token(&ctx.state, &student).await;

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/tutors/{}/booking-options", tutor.id),
            Some(&token),
            None,
        ))
        .await
        .expect("options");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["slots"][0]["value"], "Lunes 10:00");
    assert_eq!(body["slots"][0]["label"], "Lunes 10:00 a 11:00");
    assert!(!body["subjects"].as_array().expect("subjects").is_empty());
}

#[tokio::test]
async fn booking_todays_weekday_lands_next_week() {
    let ctx = test_support::setup_test_context().await;
    let (tutor_user, tutor) =
        test_support::insert_tutor(ctx.state.db(), "11.111.111-1", "Valentina").await;
    let student = test_support::insert_user(ctx.state.db(), "22.222.222-2", "Diego").await;
    let offset = ctx.state.local_offset();
    let today = OffsetDateTime::now_utc().to_offset(offset);
    let day = DayOfWeek::from(today.weekday());
    test_support::insert_slot(ctx.state.db(), &tutor.id, day, time!(10:00)).await;
    let token = test_support::login_token(&ctx.state, &student).await;

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/tutors/{}/book", tutor.id),
            Some(&token),
            Some(booking(&format!("{} 10:00", day.label()))),
        ))
        .await
        .expect("book");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {body}");
    assert_eq!(body["session"]["status"], "Pendiente");
    assert_eq!(body["session"]["duration_minutes"], 60);

    let session_id = body["session"]["id"].as_str().expect("session id");
    let session = repositories::tutoring_sessions::find_by_id(ctx.state.db(), session_id)
        .await
        .expect("load session")
        .expect("session");
    let local = session.scheduled_at.assume_utc().to_offset(offset);
    assert_eq!(local.date(), today.date() + Duration::days(7));
    assert_eq!(local.time(), time!(10:00));

    let tutor_inbox: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = $1")
            .bind(&tutor_user.id)
            .fetch_one(ctx.state.db())
            .await
            .expect("count notifications");
    let student_inbox: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = $1")
            .bind(&student.id)
            .fetch_one(ctx.state.db())
            .await
            .expect("count notifications");
    assert_eq!(tutor_inbox, 1);
    assert_eq!(student_inbox, 1);
}

#[tokio::test]
async fn booking_rejects_unoffered_slot_and_bad_day() {
    let ctx = test_support::setup_test_context().await;
    let (_, tutor) = test_support::insert_tutor(ctx.state.db(), "11.111.111-1", "Valentina").await;
    let student = test_support::insert_user(ctx.state.db(), "22.222.222-2", "Diego").await;
    test_support::insert_slot(ctx.state.db(), &tutor.id, DayOfWeek::Monday, time!(10:00)).await;
    let token = test_support::login_token(&ctx.state, &student).await;

    for slot in ["Martes 10:00", "Funday 10:00"] {
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                &format!("/tutors/{}/book", tutor.id),
                Some(&token),
                Some(booking(slot)),
            ))
            .await
            .expect("book");
        let status = response.status();
        let body = test_support::read_json(response).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "response: {body}");
        assert!(!body["errors"]["slot"].is_null(), "response: {body}");
    }
}

#[tokio::test]
async fn tutor_cannot_book_themselves() {
    let ctx = test_support::setup_test_context().await;
    let (tutor_user, tutor) =
        test_support::insert_tutor(ctx.state.db(), "11.111.111-1", "Valentina").await;
    test_support::insert_slot(ctx.state.db(), &tutor.id, DayOfWeek::Monday, time!(10:00)).await;
    let token = test_support::login_token(&ctx.state, &tutor_user).await;

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/tutors/{}/book", tutor.id),
            Some(&token),
            Some(booking("Lunes 10:00")),
        ))
        .await
        .expect("book");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn booking_the_prophet_awards_achievement_once() {
    let ctx = test_support::setup_test_context().await;
    let (tutor_user, tutor) =
        test_support::insert_tutor(ctx.state.db(), "11.111.111-1", "Valentina").await;
    sqlx::query(
        "UPDATE users SET first_name = 'Como un Gran Pensador', last_name = 'Nostradamus'
         WHERE id = $1",
    )
    .bind(&tutor_user.id)
    .execute(ctx.state.db())
    .await
    .expect("rename tutor");
    let student = test_support::insert_user(ctx.state.db(), "22.222.222-2", "Diego").await;
    test_support::insert_slot(ctx.state.db(), &tutor.id, DayOfWeek::Monday, time!(10:00)).await;
    let token = test_support::login_token(&ctx.state, &student).await;

    for _ in 0..2 {
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                &format!("/tutors/{}/book", tutor.id),
                Some(&token),
                Some(booking("Lunes 10:00")),
            ))
            .await
            .expect("book");
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let awarded: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM user_achievements WHERE user_id = $1")
            .bind(&student.id)
            .fetch_one(ctx.state.db())
            .await
            .expect("count achievements");
    assert_eq!(awarded, 1);
}

#[tokio::test]
async fn booking_requires_login() {
    let ctx = test_support::setup_test_context().await;
    let (_, tutor) = test_support::insert_tutor(ctx.state.db(), "11.111.111-1", "Valentina").await;

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/tutors/{}/book", tutor.id),
            None,
            Some(booking("Lunes 10:00")),
        ))
        .await
        .expect("book");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

use axum::http::{header, Method, StatusCode};
use serde_json::json;
use time::Duration;
use tower::ServiceExt;

use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::test_support;

fn registration(rut: &str) -> serde_json::Value {
    json!({
        "rut": rut,
        "first_name": "Camila",
        "last_name": "Rojas",
        "email": "camila.rojas@inacapmail.cl",
        "sede": "INACAP Santiago Centro",
        "carrera": "Ingeniería en Informática",
        "semestre_actual": 3,
        "promedio_general": 5.8,
        "password1": "clave-segura-1",
        "password2": "clave-segura-1"
    })
}

async fn login(app: &axum::Router, rut: &str, password: &str) -> axum::response::Response {
    app.clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/login",
            None,
            Some(json!({ "rut": rut, "password": password })),
        ))
        .await
        .expect("login")
}

#[tokio::test]
async fn register_creates_student_and_logs_in() {
    let ctx = test_support::setup_test_context().await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/register",
            None,
            Some(registration("12.345.678-9")),
        ))
        .await
        .expect("register");

    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .expect("session cookie");
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {body}");
    assert!(cookie.starts_with("tutorias_session="));
    assert!(cookie.contains("HttpOnly"));
    assert_eq!(body["user"]["username"], "12.345.678-9");
    assert_eq!(body["user"]["is_tutor"], false);

    let groups: Vec<String> = sqlx::query_scalar(
        "SELECT g.name FROM user_groups ug JOIN groups g ON g.id = ug.group_id
         JOIN users u ON u.id = ug.user_id WHERE u.rut = $1",
    )
    .bind("12.345.678-9")
    .fetch_all(ctx.state.db())
    .await
    .expect("groups");
    assert_eq!(groups, vec!["Estudiantes".to_string()]);

    let session_cookie = cookie.split(';').next().expect("cookie pair");
    let response = ctx
        .app
        .oneshot(test_support::cookie_request(Method::GET, "/profile", session_cookie))
        .await
        .expect("profile");
    let status = response.status();
    let profile = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {profile}");
    assert_eq!(profile["first_name"], "Camila");
}

#[tokio::test]
async fn register_tutor_creates_profile() {
    let ctx = test_support::setup_test_context().await;

    let mut payload = registration("9.876.543-K");
    payload["es_tutor"] = json!(true);
    payload["especialidades"] = json!("Cálculo, Álgebra");
    payload["años_experiencia"] = json!(2);

    let response = ctx
        .app
        .oneshot(test_support::json_request(Method::POST, "/register", None, Some(payload)))
        .await
        .expect("register");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {body}");

    let user_id = body["user"]["id"].as_str().expect("user id");
    let tutor = repositories::tutors::find_by_user_id(ctx.state.db(), user_id)
        .await
        .expect("load tutor")
        .expect("tutor profile");
    assert_eq!(tutor.specialties, "Cálculo, Álgebra");
    assert_eq!(tutor.years_experience, 2);
    assert!((tutor.average_rating - 4.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn register_reports_field_errors() {
    let ctx = test_support::setup_test_context().await;

    let mut payload = registration("12.345.678-9");
    payload["password2"] = json!("otra-clave-2");
    payload["es_tutor"] = json!(true);

    let response = ctx
        .app
        .oneshot(test_support::json_request(Method::POST, "/register", None, Some(payload)))
        .await
        .expect("register");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "response: {body}");
    assert!(!body["errors"]["password2"].is_null(), "response: {body}");
    assert!(!body["errors"]["specialties"].is_null(), "response: {body}");
    assert!(!body["errors"]["years_experience"].is_null(), "response: {body}");
}

#[tokio::test]
async fn register_rejects_duplicate_rut() {
    let ctx = test_support::setup_test_context().await;
    test_support::insert_user(ctx.state.db(), "12.345.678-9", "Existing").await;

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/register",
            None,
            Some(registration("12.345.678-9")),
        ))
        .await
        .expect("register");
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let ctx = test_support::setup_test_context().await;
    test_support::insert_user(ctx.state.db(), "11.111.111-1", "Pedro").await;

    let response = login(&ctx.app, "11.111.111-1", "not-the-password").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn second_login_terminates_first_session() {
    let ctx = test_support::setup_test_context().await;
    test_support::insert_user(ctx.state.db(), "11.111.111-1", "Pedro").await;

    let first = login(&ctx.app, "11.111.111-1", test_support::TEST_PASSWORD).await;
    assert_eq!(first.status(), StatusCode::OK);
    let first_token = test_support::read_json(first).await["access_token"]
        .as_str()
        .expect("token")
        .to_string();

    let second = login(&ctx.app, "11.111.111-1", test_support::TEST_PASSWORD).await;
    assert_eq!(second.status(), StatusCode::OK);
    let second_token = test_support::read_json(second).await["access_token"]
        .as_str()
        .expect("token")
        .to_string();

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, "/profile", Some(&first_token), None))
        .await
        .expect("profile");
    let status = response.status();
    let cleared = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap_or_default();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "response: {body}");
    assert_eq!(body["notice"]["level"], "warning");
    assert_eq!(body["login_url"], "/login");
    assert!(cleared.contains("Max-Age=0"));

    let response = ctx
        .app
        .oneshot(test_support::json_request(Method::GET, "/profile", Some(&second_token), None))
        .await
        .expect("profile");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn idle_session_expires() {
    let ctx = test_support::setup_test_context().await;
    let user = test_support::insert_user(ctx.state.db(), "11.111.111-1", "Pedro").await;
    let token = test_support::login_token(&ctx.state, &user).await;

    sqlx::query("UPDATE auth_sessions SET last_activity = $1 WHERE user_id = $2")
        .bind(primitive_now_utc() - Duration::minutes(31))
        .bind(&user.id)
        .execute(ctx.state.db())
        .await
        .expect("age session");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, "/profile", Some(&token), None))
        .await
        .expect("profile");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "response: {body}");
    assert_eq!(body["notice"]["level"], "info");

    // The notice is shown once; afterwards the request is simply anonymous.
    let response = ctx
        .app
        .oneshot(test_support::json_request(Method::GET, "/profile", Some(&token), None))
        .await
        .expect("profile");
    let body = test_support::read_json(response).await;
    assert!(body["notice"].is_null(), "response: {body}");
}

#[tokio::test]
async fn activity_within_timeout_keeps_session() {
    let ctx = test_support::setup_test_context().await;
    let user = test_support::insert_user(ctx.state.db(), "11.111.111-1", "Pedro").await;
    let token = test_support::login_token(&ctx.state, &user).await;

    sqlx::query("UPDATE auth_sessions SET last_activity = $1 WHERE user_id = $2")
        .bind(primitive_now_utc() - Duration::minutes(29))
        .bind(&user.id)
        .execute(ctx.state.db())
        .await
        .expect("age session");

    let response = ctx
        .app
        .oneshot(test_support::json_request(Method::GET, "/profile", Some(&token), None))
        .await
        .expect("profile");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn logout_revokes_session() {
    let ctx = test_support::setup_test_context().await;
    let user = test_support::insert_user(ctx.state.db(), "11.111.111-1", "Pedro").await;
    let token = test_support::login_token(&ctx.state, &user).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::POST, "/logout", Some(&token), None))
        .await
        .expect("logout");
    assert_eq!(response.status(), StatusCode::OK);
    let cleared = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(cleared.starts_with("tutorias_session=;"));

    let response = ctx
        .app
        .oneshot(test_support::json_request(Method::GET, "/profile", Some(&token), None))
        .await
        .expect("profile");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

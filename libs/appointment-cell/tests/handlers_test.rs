use assert_matches::assert_matches;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path as url_path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::handlers;
use appointment_cell::models::{CancelAppointmentRequest, CreateAppointmentRequest};
use shared_models::error::AppError;
use shared_utils::test_utils::{MockStoreResponses, TestConfig, TestUser};

fn upcoming_monday() -> NaiveDate {
    let mut date = Utc::now().date_naive() + Duration::days(1);
    while date.weekday() != Weekday::Mon {
        date += Duration::days(1);
    }
    date
}

#[tokio::test]
async fn only_patients_can_book() {
    let state = TestConfig::default().to_arc();
    let doctor = TestUser::doctor("doctor@example.com").to_user();

    let result = handlers::create_appointment(
        State(state),
        Extension(doctor),
        Json(CreateAppointmentRequest {
            doctor_id: Some(Uuid::new_v4()),
            appointment_date: Some("2099-06-01".to_string()),
            appointment_time: Some("09:00".to_string()),
            duration_minutes: Some(30),
            appointment_type: Some("routine".to_string()),
            reason: Some("Persistent morning headaches".to_string()),
        }),
    )
    .await;

    assert_matches!(result, Err(AppError::Auth(_)));
}

#[tokio::test]
async fn missing_fields_surface_as_bad_request() {
    let state = TestConfig::default().to_arc();
    let patient = TestUser::patient("patient@example.com").to_user();

    let result = handlers::create_appointment(
        State(state),
        Extension(patient),
        Json(CreateAppointmentRequest {
            doctor_id: None,
            appointment_date: None,
            appointment_time: None,
            duration_minutes: None,
            appointment_type: None,
            reason: None,
        }),
    )
    .await;

    match result {
        Err(AppError::BadRequest(msg)) => {
            assert!(msg.contains("Missing required fields"));
        }
        other => panic!("Expected BadRequest, got {:?}", other.err()),
    }
}

#[tokio::test]
async fn successful_booking_returns_created_with_envelope() {
    let mock_server = MockServer::start().await;
    let monday = upcoming_monday();

    let patient_test_user = TestUser::patient("patient@example.com");
    let patient_id = Uuid::new_v4().to_string();
    let doctor_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(url_path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::patient_row(&patient_id, &patient_test_user.id, "Test Patient")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(url_path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::doctor_row(&doctor_id, "Dr. Elena Vargas", "Cardiology")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(url_path("/rest/v1/doctor_schedules"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::schedule_row(&doctor_id, 1, "08:00:00", "17:00:00")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(url_path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(url_path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockStoreResponses::appointment_row(
                &patient_id,
                &doctor_id,
                &monday.format("%Y-%m-%d").to_string(),
                "09:00",
                30,
                "scheduled",
            )
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(url_path("/rest/v1/audit_logs"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let state = TestConfig::with_base_url(&mock_server.uri()).to_arc();

    let (status, Json(body)) = handlers::create_appointment(
        State(state),
        Extension(patient_test_user.to_user()),
        Json(CreateAppointmentRequest {
            doctor_id: Some(doctor_id.parse().unwrap()),
            appointment_date: Some(monday.format("%Y-%m-%d").to_string()),
            appointment_time: Some("09:00".to_string()),
            duration_minutes: Some(30),
            appointment_type: Some("routine".to_string()),
            reason: Some("Persistent morning headaches".to_string()),
        }),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["estimated_end_time"], json!("09:30"));
    assert_eq!(body["data"]["doctor"]["name"], json!("Dr. Elena Vargas"));
}

#[tokio::test]
async fn cancel_of_missing_appointment_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(url_path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let state = TestConfig::with_base_url(&mock_server.uri()).to_arc();
    let patient = TestUser::patient("patient@example.com").to_user();

    let result = handlers::cancel_appointment(
        State(state),
        Path(Uuid::new_v4()),
        Extension(patient),
        Json(CancelAppointmentRequest {
            cancellation_reason: Some("Family emergency".to_string()),
        }),
    )
    .await;

    assert_matches!(result, Err(AppError::NotFound(_)));
}

#[tokio::test]
async fn store_failures_return_a_generic_retryable_error() {
    let mock_server = MockServer::start().await;
    let monday = upcoming_monday();

    let patient_test_user = TestUser::patient("patient@example.com");

    // The patient lookup blows up server-side.
    Mock::given(method("GET"))
        .and(url_path("/rest/v1/patients"))
        .and(query_param("user_id", format!("eq.{}", patient_test_user.id)))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&mock_server)
        .await;

    let state = TestConfig::with_base_url(&mock_server.uri()).to_arc();

    let result = handlers::create_appointment(
        State(state),
        Extension(patient_test_user.to_user()),
        Json(CreateAppointmentRequest {
            doctor_id: Some(Uuid::new_v4()),
            appointment_date: Some(monday.format("%Y-%m-%d").to_string()),
            appointment_time: Some("09:00".to_string()),
            duration_minutes: Some(30),
            appointment_type: Some("routine".to_string()),
            reason: Some("Persistent morning headaches".to_string()),
        }),
    )
    .await;

    match result {
        Err(AppError::Internal(msg)) => {
            // Generic retry wording, not the raw store error.
            assert!(msg.contains("try again"));
            assert!(!msg.contains("internal error"));
        }
        other => panic!("Expected Internal, got {:?}", other.err()),
    }
}

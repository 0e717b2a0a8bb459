use std::sync::Arc;

use assert_matches::assert_matches;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doctor_cell::models::DoctorError;
use doctor_cell::services::DoctorDirectoryService;
use shared_database::supabase::SupabaseClient;
use shared_utils::test_utils::{MockStoreResponses, TestConfig};

fn service_for(mock_server: &MockServer) -> DoctorDirectoryService {
    let config = TestConfig::with_base_url(&mock_server.uri()).to_app_config();
    DoctorDirectoryService::new(Arc::new(SupabaseClient::new(&config)))
}

#[tokio::test]
async fn fetches_a_doctor_by_id() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("id", format!("eq.{}", doctor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::doctor_row(&doctor_id.to_string(), "Dr. Elena Vargas", "Cardiology")
        ])))
        .mount(&mock_server)
        .await;

    let doctor = service_for(&mock_server).get_doctor(doctor_id).await.unwrap();

    assert_eq!(doctor.full_name, "Dr. Elena Vargas");
    assert!(doctor.is_bookable());
}

#[tokio::test]
async fn unknown_doctor_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let err = service_for(&mock_server)
        .get_doctor(Uuid::new_v4())
        .await
        .unwrap_err();

    assert_matches!(err, DoctorError::NotFound);
}

#[tokio::test]
async fn inactive_account_is_not_bookable() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();

    let mut row = MockStoreResponses::doctor_row(&doctor_id.to_string(), "Dr. Elena Vargas", "Cardiology");
    row["is_active"] = json!(false);
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
        .mount(&mock_server)
        .await;

    let doctor = service_for(&mock_server).get_doctor(doctor_id).await.unwrap();

    assert!(!doctor.is_bookable());
}

#[tokio::test]
async fn listing_returns_doctors_and_distinct_specializations() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("select", "specialization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "specialization": "Cardiology" },
            { "specialization": "Dermatology" },
            { "specialization": "Cardiology" },
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::doctor_row(&Uuid::new_v4().to_string(), "Dr. Elena Vargas", "Cardiology"),
            MockStoreResponses::doctor_row(&Uuid::new_v4().to_string(), "Dr. Luis Moreno", "Dermatology"),
        ])))
        .mount(&mock_server)
        .await;

    let listing = service_for(&mock_server).list_doctors(None).await.unwrap();

    assert_eq!(listing.doctors.len(), 2);
    assert_eq!(listing.specializations, vec!["Cardiology", "Dermatology"]);
}

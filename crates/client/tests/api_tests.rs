//! Integration tests for the typed endpoint groups: URL shape, wire
//! decoding, error classification and the multipart upload path.

use httpmock::Method::{DELETE, GET, POST, PUT};
use httpmock::MockServer;
use serde_json::json;
use url::Url;

use planora_client::api::documents::DocumentMeta;
use planora_client::api::mail::MailSettings;
use planora_client::api::projects::{NewProject, ProjectStatus};
use planora_client::transport::UploadPayload;
use planora_client::{ClientConfig, Environment, Error, Locale, PlanoraClient};

fn client_for(server: &MockServer) -> PlanoraClient {
    let config = ClientConfig::new(Environment::Staging)
        .with_api_url(Url::parse(&server.base_url()).unwrap())
        .with_upload_url(Url::parse(&server.base_url()).unwrap());
    let client = PlanoraClient::new(config).unwrap();
    client
        .store()
        .set("tok".into(), Some("refresh".into()), None, None);
    client
}

#[tokio::test]
async fn list_decodes_the_page_envelope() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/en/api/projects")
                .query_param("page", "0")
                .query_param("size", "2")
                .header("authorization", "Bearer tok");
            then.status(200).json_body(json!({
                "items": [
                    {
                        "id": "p-1",
                        "name": "Rollout",
                        "description": "Q1 rollout",
                        "status": "active",
                        "customerId": "c-9",
                        "startDate": "2026-01-05",
                        "endDate": null,
                        "createdAt": "2026-01-10T09:00:00Z"
                    },
                    {
                        "id": "p-2",
                        "name": "Archive",
                        "description": null,
                        "status": "on_hold",
                        "customerId": null,
                        "startDate": null,
                        "endDate": null,
                        "createdAt": "2026-02-01T12:30:00Z"
                    }
                ],
                "total": 5,
                "page": 0,
                "size": 2
            }));
        })
        .await;

    let client = client_for(&server);
    let page = client.projects().list(0, 2).await.unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].status, ProjectStatus::Active);
    assert_eq!(page.items[1].status, ProjectStatus::OnHold);
    assert!(page.has_next());
}

#[tokio::test]
async fn create_sends_camel_case_and_decodes_the_result() {
    let server = MockServer::start_async().await;

    let create = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/en/api/projects")
                .json_body_partial(r#"{ "name": "Rollout", "customerId": "c-9" }"#);
            then.status(201).json_body(json!({
                "id": "p-1",
                "name": "Rollout",
                "description": null,
                "status": "planned",
                "customerId": "c-9",
                "startDate": null,
                "endDate": null,
                "createdAt": "2026-03-01T08:00:00Z"
            }));
        })
        .await;

    let client = client_for(&server);
    let project = client
        .projects()
        .create(&NewProject {
            name: "Rollout".into(),
            description: None,
            status: ProjectStatus::Planned,
            customer_id: Some("c-9".into()),
            start_date: None,
            end_date: None,
        })
        .await
        .unwrap();

    assert_eq!(create.hits_async().await, 1);
    assert_eq!(project.id, "p-1");
    assert_eq!(project.status, ProjectStatus::Planned);
}

#[tokio::test]
async fn locale_switch_moves_subsequent_requests() {
    let server = MockServer::start_async().await;

    let en = server
        .mock_async(|when, then| {
            when.method(GET).path("/en/api/stats/dashboard");
            then.status(200).json_body(stats_body());
        })
        .await;
    let de = server
        .mock_async(|when, then| {
            when.method(GET).path("/de/api/stats/dashboard");
            then.status(200).json_body(stats_body());
        })
        .await;

    let client = client_for(&server);
    client.stats().dashboard().await.unwrap();

    client.config().set_locale(Locale::De);
    client.stats().dashboard().await.unwrap();

    assert_eq!(en.hits_async().await, 1);
    assert_eq!(de.hits_async().await, 1);
}

fn stats_body() -> serde_json::Value {
    json!({
        "projectsTotal": 4,
        "projectsByStatus": { "active": 3, "completed": 1 },
        "usersTotal": 12,
        "documentsTotal": 30
    })
}

#[tokio::test]
async fn dashboard_stats_decode_status_keys() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/en/api/stats/dashboard");
            then.status(200).json_body(stats_body());
        })
        .await;

    let client = client_for(&server);
    let stats = client.stats().dashboard().await.unwrap();

    assert_eq!(stats.projects_total, 4);
    assert_eq!(stats.projects_by_status[&ProjectStatus::Active], 3);
    assert_eq!(stats.projects_by_status[&ProjectStatus::Completed], 1);
}

#[tokio::test]
async fn not_found_and_forbidden_are_classified() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/en/api/projects/missing");
            then.status(404).json_body(json!({ "message": "project missing" }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(DELETE).path("/en/api/users/u-2");
            then.status(403).json_body(json!({ "message": "admins only" }));
        })
        .await;

    let client = client_for(&server);

    match client.projects().get("missing").await {
        Err(Error::NotFound { resource }) => assert_eq!(resource, "project missing"),
        other => panic!("expected NotFound, got {:?}", other.map(|p| p.id)),
    }
    match client.users().delete("u-2").await {
        Err(Error::Forbidden { message }) => assert_eq!(message, "admins only"),
        other => panic!("expected Forbidden, got {:?}", other),
    }
}

#[tokio::test]
async fn upload_goes_to_the_upload_host_as_multipart() {
    let server = MockServer::start_async().await;

    let upload = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/documents")
                .query_param("projectId", "p-1")
                .header("authorization", "Bearer tok")
                .header_exists("content-type");
            then.status(201).json_body(json!({
                "id": "d-1",
                "projectId": "p-1",
                "fileName": "plan.pdf",
                "contentType": "application/pdf",
                "sizeBytes": 3,
                "uploadedBy": "u-1",
                "uploadedAt": "2026-03-02T10:00:00Z"
            }));
        })
        .await;

    let client = client_for(&server);
    let meta: DocumentMeta = client
        .documents()
        .upload(
            "p-1",
            UploadPayload {
                field: "file".into(),
                file_name: "plan.pdf".into(),
                mime: "application/pdf".into(),
                bytes: vec![1, 2, 3],
            },
        )
        .await
        .unwrap();

    assert_eq!(upload.hits_async().await, 1);
    assert_eq!(meta.file_name, "plan.pdf");
    assert_eq!(meta.size_bytes, 3);
}

#[tokio::test]
async fn mail_settings_round_trip() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/en/api/mail/settings")
                .json_body_partial(r#"{ "host": "smtp.example.com", "useTls": true }"#);
            then.status(200).json_body(json!({
                "host": "smtp.example.com",
                "port": 587,
                "username": "mailer",
                "senderAddress": "noreply@example.com",
                "senderName": "Planora",
                "useTls": true
            }));
        })
        .await;

    let client = client_for(&server);
    let saved = client
        .mail()
        .update_settings(&MailSettings {
            host: "smtp.example.com".into(),
            port: 587,
            username: "mailer".into(),
            sender_address: "noreply@example.com".into(),
            sender_name: "Planora".into(),
            use_tls: true,
        })
        .await
        .unwrap();

    assert_eq!(saved.port, 587);
    assert!(saved.use_tls);
}

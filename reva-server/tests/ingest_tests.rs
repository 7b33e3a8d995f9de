//! Integration tests for the ingestion pipeline, run against a local stub
//! standing in for the external classification service.

use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use uuid::Uuid;

use reva_common::db::init_memory_database;
use reva_common::Label;
use reva_server::db::reviews as review_repo;
use reva_server::services::{ingest_group, parse_one, ClassifierClient, ClassifierError, IngestError};

/// Spawn a one-route stub classifier returning a canned status and body.
/// Returns the base URL to point the client at.
async fn spawn_stub(status: StatusCode, body: &'static [u8]) -> String {
    async fn respond(
        State((status, body)): State<(StatusCode, &'static [u8])>,
    ) -> (StatusCode, &'static [u8]) {
        (status, body)
    }

    let app = Router::new()
        .route("/labels/file", post(respond))
        .with_state((status, body));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn client_for(base_url: &str) -> ClassifierClient {
    ClassifierClient::new(base_url, Duration::from_secs(5)).expect("client")
}

const UPLOAD: &[u8] = b"ID,text,src\n0,first review text,web\n1,second review text,app\n";

const LABELED: &[u8] = b"ID,text,src,labels,confidence\n\
    0,first review text,web,Positive,0.91\n\
    1,second review text,app,Negative,0.64\n";

#[tokio::test]
async fn ingest_persists_labeled_batch_in_order() {
    let pool = init_memory_database().await.unwrap();
    let base_url = spawn_stub(StatusCode::OK, LABELED).await;
    let classifier = client_for(&base_url);

    let group_id = ingest_group(&pool, &classifier, UPLOAD.to_vec(), "reviews.csv")
        .await
        .expect("ingest should succeed");

    let stored = review_repo::reviews_by_group(&pool, group_id, 0).await.unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].sequence_index, 0);
    assert_eq!(stored[0].text, "first review text");
    assert_eq!(stored[0].source, "web");
    assert_eq!(stored[0].label, Label::Positive);
    assert!((stored[0].confidence - 0.91).abs() < 1e-9);
    assert_eq!(stored[1].label, Label::Negative);
    assert!(stored.iter().all(|r| r.group_id == group_id));
}

#[tokio::test]
async fn classifier_error_status_fails_and_persists_nothing() {
    let pool = init_memory_database().await.unwrap();
    let base_url = spawn_stub(StatusCode::INTERNAL_SERVER_ERROR, b"boom").await;
    let classifier = client_for(&base_url);

    let result = ingest_group(&pool, &classifier, UPLOAD.to_vec(), "reviews.csv").await;
    assert!(matches!(
        result,
        Err(IngestError::Classifier(ClassifierError::Status(500)))
    ));
    assert_eq!(review_repo::total_review_count(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn empty_classifier_body_is_a_distinct_failure() {
    let pool = init_memory_database().await.unwrap();
    let base_url = spawn_stub(StatusCode::OK, b"").await;
    let classifier = client_for(&base_url);

    let result = ingest_group(&pool, &classifier, UPLOAD.to_vec(), "reviews.csv").await;
    assert!(matches!(
        result,
        Err(IngestError::Classifier(ClassifierError::EmptyResult))
    ));
    assert_eq!(review_repo::total_review_count(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn header_only_response_persists_no_group() {
    let pool = init_memory_database().await.unwrap();
    let base_url = spawn_stub(StatusCode::OK, b"ID,text,src,labels,confidence\n").await;
    let classifier = client_for(&base_url);

    let result = ingest_group(&pool, &classifier, UPLOAD.to_vec(), "reviews.csv").await;
    assert!(matches!(result, Err(IngestError::EmptyResult)));
    assert_eq!(review_repo::total_review_count(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn single_unknown_label_rejects_the_whole_batch() {
    let pool = init_memory_database().await.unwrap();
    let body: &[u8] = b"ID,text,src,labels,confidence\n\
        0,first review text,web,Positive,0.91\n\
        1,second review text,app,Sarcastic,0.64\n";
    let base_url = spawn_stub(StatusCode::OK, body).await;
    let classifier = client_for(&base_url);

    let result = ingest_group(&pool, &classifier, UPLOAD.to_vec(), "reviews.csv").await;
    assert!(matches!(
        result,
        Err(IngestError::UnknownLabel { row: 1, .. })
    ));
    // Strict validation: not even the valid first row was persisted
    assert_eq!(review_repo::total_review_count(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn too_short_text_rejects_the_whole_batch() {
    let pool = init_memory_database().await.unwrap();
    let body: &[u8] = b"ID,text,src,labels,confidence\n\
        0,good,web,Positive,0.91\n";
    let base_url = spawn_stub(StatusCode::OK, body).await;
    let classifier = client_for(&base_url);

    let result = ingest_group(&pool, &classifier, UPLOAD.to_vec(), "reviews.csv").await;
    assert!(matches!(result, Err(IngestError::InvalidRecord { row: 0, .. })));
    assert_eq!(review_repo::total_review_count(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn unreadable_response_is_a_csv_error() {
    let pool = init_memory_database().await.unwrap();
    let body: &[u8] = b"ID,text,src,labels,confidence\n0,short row only\n";
    let base_url = spawn_stub(StatusCode::OK, body).await;
    let classifier = client_for(&base_url);

    let result = ingest_group(&pool, &classifier, UPLOAD.to_vec(), "reviews.csv").await;
    assert!(matches!(result, Err(IngestError::Csv(_))));
    assert_eq!(review_repo::total_review_count(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn parse_one_returns_labeled_review_without_persisting() {
    let pool = init_memory_database().await.unwrap();
    let body: &[u8] =
        b"ID,text,src,labels,confidence\n0,the product arrived broken,,Negative,0.97\n";
    let base_url = spawn_stub(StatusCode::OK, body).await;
    let classifier = client_for(&base_url);

    let review = parse_one(&classifier, "the product arrived broken")
        .await
        .expect("parse_one should succeed");
    assert_eq!(review.label, Label::Negative);
    assert_eq!(review.text, "the product arrived broken");
    assert!((review.confidence - 0.97).abs() < 1e-9);
    assert_eq!(review.group_id, Uuid::nil());

    // Nothing was persisted on this path
    assert_eq!(review_repo::total_review_count(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn parse_one_with_unknown_label_fails() {
    let body: &[u8] = b"ID,text,src,labels,confidence\n0,some review text,,Mixed,0.5\n";
    let base_url = spawn_stub(StatusCode::OK, body).await;
    let classifier = client_for(&base_url);

    let result = parse_one(&classifier, "some review text").await;
    assert!(matches!(result, Err(IngestError::UnknownLabel { .. })));
}

#[tokio::test]
async fn unreachable_classifier_is_a_transport_error() {
    // Nothing listens on this port
    let classifier = client_for("http://127.0.0.1:1");
    let result = classifier.classify(UPLOAD.to_vec(), "reviews.csv").await;
    assert!(matches!(result, Err(ClassifierError::Transport(_))));
}

//! End-to-end reconciliation against a scripted backend.

use std::sync::Arc;

use edms::{DecorateError, Document, DirectiveKind, MayanDecorator, MetadataMap};
use mayan_client::{MayanError, Method, MockTransport};
use serde_json::{json, Value};

const DOCUMENT: &str = "documents/42/";
const ENTRIES: &str = "documents/42/metadata/";
const SCHEMA: &str = "document_types/3/metadata_types/";

fn metadata(value: Value) -> MetadataMap {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {}", other),
    }
}

fn entry(id: u64, type_id: u64, name: &str, value: &str) -> Value {
    json!({
        "id": id,
        "url": format!("http://mayan.test/api/documents/42/metadata/{}/", id),
        "metadata_type": {"id": type_id, "name": name},
        "value": value
    })
}

fn binding(id: u64, type_id: u64, name: &str) -> Value {
    json!({
        "id": id,
        "required": false,
        "url": format!("http://mayan.test/api/document_types/3/metadata_types/{}/", id),
        "metadata_type": {"id": type_id, "name": name}
    })
}

/// Document 42 of type 3, with `bar` attached as entry 7 and `foo` available.
fn script_reads(mock: &MockTransport) {
    mock.on_get(
        DOCUMENT,
        json!({
            "id": 42,
            "label": "scan.pdf",
            "document_type": {
                "id": 3,
                "label": "Invoice",
                "url": "http://mayan.test/api/document_types/3/"
            }
        }),
    );
    mock.on_get(
        ENTRIES,
        json!({"count": 1, "results": [entry(7, 55, "bar", "old")], "next": null}),
    );
    mock.on_get(
        SCHEMA,
        json!({
            "count": 2,
            "results": [binding(1, 55, "bar"), binding(2, 1234, "foo")],
            "next": null
        }),
    );
}

fn scripted_backend() -> Arc<MockTransport> {
    let mock = Arc::new(MockTransport::new());
    script_reads(&mock);
    mock.on_write(Method::Patch, "documents/42/metadata/7/");
    mock.on_write(Method::Post, ENTRIES);
    mock.on_write(Method::Patch, DOCUMENT);
    mock.on_write(Method::Post, "documents/42/type/change/");
    mock.on_write(Method::Post, "documents/42/tags/attach/");
    mock.on_write(Method::Post, "cabinets/5/documents/add/");
    mock.on_write(Method::Post, "cabinets/6/documents/add/");
    mock
}

fn writes(mock: &MockTransport) -> Vec<(Method, String, Value)> {
    mock.writes()
        .into_iter()
        .map(|r| (r.method, r.path, r.body.unwrap_or(Value::Null)))
        .collect()
}

#[tokio::test]
async fn test_existing_entry_is_updated_in_place() {
    let mock = scripted_backend();
    let decorator = MayanDecorator::new(Arc::clone(&mock));

    let report = decorator
        .synchronize(42, None, &metadata(json!({"bar": "bar"})))
        .await
        .unwrap();

    assert_eq!(
        writes(&mock),
        vec![(
            Method::Patch,
            "documents/42/metadata/7/".to_string(),
            json!({"value": "bar"})
        )]
    );
    assert_eq!(report.updated, vec!["bar".to_string()]);
    assert!(report.created.is_empty());
}

#[tokio::test]
async fn test_missing_entry_is_created_from_schema() {
    let mock = scripted_backend();
    let decorator = MayanDecorator::new(Arc::clone(&mock));

    let report = decorator
        .synchronize(42, None, &metadata(json!({"foo": "foo"})))
        .await
        .unwrap();

    assert_eq!(
        writes(&mock),
        vec![(
            Method::Post,
            ENTRIES.to_string(),
            json!({"metadata_type_id": 1234, "value": "foo"})
        )]
    );
    assert_eq!(report.created, vec!["foo".to_string()]);
}

#[tokio::test]
async fn test_ordinary_keys_written_in_caller_order() {
    let mock = scripted_backend();
    let decorator = MayanDecorator::new(Arc::clone(&mock));

    decorator
        .synchronize(42, None, &metadata(json!({"foo": "1", "bar": "2"})))
        .await
        .unwrap();

    let paths: Vec<String> = writes(&mock).into_iter().map(|(_, path, _)| path).collect();
    assert_eq!(paths, vec![ENTRIES.to_string(), "documents/42/metadata/7/".to_string()]);
}

#[tokio::test]
async fn test_unknown_key_stops_further_writes() {
    let mock = scripted_backend();
    let decorator = MayanDecorator::new(Arc::clone(&mock));

    let err = decorator
        .synchronize(
            42,
            None,
            &metadata(json!({
                "bar": "x",
                "nope": "y",
                "foo": "z",
                "_suggested_tags": [1]
            })),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DecorateError::UnknownMetadataKey(ref key) if key == "nope"));
    assert!(err.is_client_error());
    // The write before the failure stays applied; nothing after it is sent.
    let paths: Vec<String> = writes(&mock).into_iter().map(|(_, path, _)| path).collect();
    assert_eq!(paths, vec!["documents/42/metadata/7/".to_string()]);
    assert_eq!(mock.shutdown_count(), 1);
}

#[tokio::test]
async fn test_tags_attached_in_order() {
    let mock = scripted_backend();
    let decorator = MayanDecorator::new(Arc::clone(&mock));

    let report = decorator
        .synchronize(42, None, &metadata(json!({"_suggested_tags": [3, "1"]})))
        .await
        .unwrap();

    assert_eq!(
        writes(&mock),
        vec![
            (Method::Post, "documents/42/tags/attach/".to_string(), json!({"tag": 3})),
            (Method::Post, "documents/42/tags/attach/".to_string(), json!({"tag": 1})),
        ]
    );
    assert_eq!(report.directives, vec![DirectiveKind::Tags]);
}

#[tokio::test]
async fn test_every_write_response_is_released() {
    let mock = scripted_backend();
    let decorator = MayanDecorator::new(Arc::clone(&mock));

    decorator
        .synchronize(
            42,
            None,
            &metadata(json!({
                "bar": "1",
                "foo": "2",
                "_suggested_filename": "invoice.pdf",
                "_suggested_tags": [1, 2],
                "_suggested_cabinets": [5]
            })),
        )
        .await
        .unwrap();

    assert_eq!(mock.writes().len(), 6);
    assert_eq!(mock.released_count(), 6);
    assert_eq!(mock.shutdown_count(), 1);
}

#[tokio::test]
async fn test_failed_write_is_released_and_aborts() {
    let mock = Arc::new(MockTransport::new());
    script_reads(&mock);
    mock.respond(
        Method::Patch,
        "documents/42/metadata/7/",
        400,
        r#"{"value":["invalid"]}"#,
    );
    mock.on_write(Method::Post, "documents/42/tags/attach/");
    let decorator = MayanDecorator::new(Arc::clone(&mock));

    let err = decorator
        .synchronize(
            42,
            None,
            &metadata(json!({"bar": "x", "_suggested_tags": [1]})),
        )
        .await
        .unwrap_err();

    match err {
        DecorateError::Client(MayanError::RemoteWrite { status, body }) => {
            assert_eq!(status, 400);
            assert!(body.contains("invalid"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(mock.writes().len(), 1);
    assert_eq!(mock.released_count(), 1);
}

#[tokio::test]
async fn test_directives_run_in_fixed_order() {
    let mock = scripted_backend();
    let decorator = MayanDecorator::new(Arc::clone(&mock));

    decorator
        .synchronize(
            42,
            None,
            &metadata(json!({
                "_suggested_cabinets": [5, 6],
                "_suggested_tags": 9,
                "_suggested_doctype": "4",
                "_suggested_filename": "invoice.pdf"
            })),
        )
        .await
        .unwrap();

    assert_eq!(
        writes(&mock),
        vec![
            (Method::Patch, DOCUMENT.to_string(), json!({"label": "invoice.pdf"})),
            (
                Method::Post,
                "documents/42/type/change/".to_string(),
                json!({"document_type_id": 4})
            ),
            (Method::Post, "documents/42/tags/attach/".to_string(), json!({"tag": 9})),
            (Method::Post, "cabinets/5/documents/add/".to_string(), json!({"document": 42})),
            (Method::Post, "cabinets/6/documents/add/".to_string(), json!({"document": 42})),
        ]
    );
}

#[tokio::test]
async fn test_directives_only_skip_metadata_reads() {
    let mock = scripted_backend();
    let decorator = MayanDecorator::new(Arc::clone(&mock));

    decorator
        .synchronize(42, None, &metadata(json!({"_suggested_tags": [1]})))
        .await
        .unwrap();

    assert_eq!(mock.get_count(DOCUMENT), 0);
    assert_eq!(mock.get_count(ENTRIES), 0);
    assert_eq!(mock.get_count(SCHEMA), 0);
}

#[tokio::test]
async fn test_metadata_read_once_per_call() {
    let mock = scripted_backend();
    let decorator = MayanDecorator::new(Arc::clone(&mock));

    decorator
        .synchronize(42, None, &metadata(json!({"bar": "1", "foo": "2"})))
        .await
        .unwrap();

    assert_eq!(mock.get_count(ENTRIES), 1);
    assert_eq!(mock.get_count(SCHEMA), 1);
}

#[tokio::test]
async fn test_invalid_directive_rejected_before_any_request() {
    let mock = scripted_backend();
    let decorator = MayanDecorator::new(Arc::clone(&mock));

    let err = decorator
        .synchronize(
            42,
            None,
            &metadata(json!({"bar": "1", "_suggested_tags": ["first"]})),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DecorateError::InvalidDirective { ref key, .. } if key == "_suggested_tags"));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_null_and_unrecognized_keys_are_no_ops() {
    let mock = scripted_backend();
    let decorator = MayanDecorator::new(Arc::clone(&mock));

    let report = decorator
        .synchronize(
            42,
            None,
            &metadata(json!({"_suggested_doctype": null, "_confidence": 0.9})),
        )
        .await
        .unwrap();

    assert!(mock.requests().is_empty());
    assert!(report.directives.is_empty());
    assert_eq!(mock.shutdown_count(), 1);
}

#[tokio::test]
async fn test_type_mismatch_does_not_block_writes() {
    let mock = scripted_backend();
    let decorator = MayanDecorator::new(Arc::clone(&mock));

    let report = decorator
        .synchronize(42, Some(9), &metadata(json!({"bar": "1"})))
        .await
        .unwrap();

    assert_eq!(report.updated, vec!["bar".to_string()]);
}

#[tokio::test]
async fn test_transport_failure_closes_session() {
    let mock = scripted_backend();
    mock.fail_next(1);
    let decorator = MayanDecorator::new(Arc::clone(&mock));

    let err = decorator
        .synchronize(42, None, &metadata(json!({"bar": "1"})))
        .await
        .unwrap_err();

    assert!(matches!(err, DecorateError::Client(MayanError::Transport(_))));
    assert!(!err.is_client_error());
    assert!(mock.writes().is_empty());
    assert_eq!(mock.shutdown_count(), 1);
}

#[tokio::test]
async fn test_decorate_uses_document_fields() {
    let mock = scripted_backend();
    let decorator = MayanDecorator::new(Arc::clone(&mock));

    let document = Document::new(42, "Invoice #1001")
        .with_type(3)
        .with_metadata([("foo", json!("Shanks"))]);
    let report = decorator.decorate(&document).await.unwrap();

    assert_eq!(report.document_id, 42);
    assert_eq!(report.created, vec!["foo".to_string()]);
}

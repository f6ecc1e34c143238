//! # API REST
//!
//! REST API implementation for HFR.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - Multipart record submissions (JSON document plus imaging uploads)
//! - Attachment serving
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS)
//!
//! Record submissions arrive as one multipart body: a `data` field holding
//! the `{patientData, followUps}` JSON document, plus optional file fields
//! named `<slot>_<kind>` (`fu1_xray`, `fu2_mri`, ...). Uploaded files are
//! stored through the attachment service before the record document is
//! saved, so the saved document always references stored bytes.

#![warn(rust_2018_idioms)]

use axum::{
    extract::{Multipart, Path as AxumPath, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use hfr_core::{
    AttachmentKind, CoreConfig, Demographics, FollowUpKey, FollowUps, PatientRecord, RecordError,
    RecordId, RecordStore,
};
use hfr_files::{AttachmentService, FilesError};

/// Application state for the REST API server
///
/// Contains shared state that needs to be accessible to all request
/// handlers; services are constructed per request from the configuration.
#[derive(Clone)]
pub struct AppState {
    cfg: Arc<CoreConfig>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_patients,
        create_patient,
        get_patient,
        update_patient,
        delete_patient,
        get_attachment,
    ),
    components(schemas(HealthRes, SavePatientRes, DeletePatientRes))
)]
struct ApiDoc;

/// Builds the REST application router.
///
/// The returned router carries all patient endpoints, the Swagger UI, and
/// a permissive CORS layer, and can be served directly or driven in tests
/// with `tower::ServiceExt::oneshot`.
pub fn app(cfg: Arc<CoreConfig>) -> Router {
    let state = AppState { cfg };

    Router::new()
        .route("/health", get(health))
        .route("/patients", get(list_patients))
        .route("/patients", post(create_patient))
        .route("/patients/:id", get(get_patient))
        .route("/patients/:id", put(update_patient))
        .route("/patients/:id", delete(delete_patient))
        .route("/patients/:id/attachments/*reference", get(get_attachment))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check response body.
#[derive(Serialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Response for create and update submissions.
#[derive(Serialize, ToSchema)]
pub struct SavePatientRes {
    pub success: bool,
    #[serde(rename = "patientId")]
    pub patient_id: String,
}

/// Response for deletions.
#[derive(Serialize, ToSchema)]
pub struct DeletePatientRes {
    pub success: bool,
}

/// The JSON document carried in a submission's `data` field.
#[derive(Deserialize)]
struct SaveRecordReq {
    #[serde(rename = "patientData")]
    patient_data: Demographics,
    #[serde(rename = "followUps", default)]
    follow_ups: FollowUps,
}

/// One uploaded imaging file from a multipart submission.
struct Upload {
    key: FollowUpKey,
    kind: AttachmentKind,
    filename: String,
    bytes: Vec<u8>,
}

/// A fully read multipart submission.
struct Submission {
    data: SaveRecordReq,
    uploads: Vec<Upload>,
}

type HandlerError = (StatusCode, &'static str);

/// Reads a record submission from a multipart body.
///
/// Unknown fields are ignored; the `data` field is required.
async fn read_submission(mut multipart: Multipart) -> Result<Submission, HandlerError> {
    let mut data = None;
    let mut uploads = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| (StatusCode::BAD_REQUEST, "Malformed multipart body"))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        if name == "data" {
            let raw = field
                .text()
                .await
                .map_err(|_| (StatusCode::BAD_REQUEST, "Malformed multipart body"))?;
            let parsed: SaveRecordReq = serde_json::from_str(&raw).map_err(|e| {
                tracing::error!("Invalid record payload: {:?}", e);
                (StatusCode::BAD_REQUEST, "Invalid record payload")
            })?;
            data = Some(parsed);
        } else if let Some((key, kind)) = parse_upload_field(&name) {
            let filename = field.file_name().unwrap_or("unknown").to_owned();
            let bytes = field
                .bytes()
                .await
                .map_err(|_| (StatusCode::BAD_REQUEST, "Malformed multipart body"))?;
            uploads.push(Upload {
                key,
                kind,
                filename,
                bytes: bytes.to_vec(),
            });
        }
    }

    let data = data.ok_or((StatusCode::BAD_REQUEST, "Missing data field"))?;
    Ok(Submission { data, uploads })
}

/// Parses an upload field name of the form `<slot>_<kind>`.
fn parse_upload_field(name: &str) -> Option<(FollowUpKey, AttachmentKind)> {
    let (slot, kind) = name.split_once('_')?;
    Some((
        FollowUpKey::from_str(slot).ok()?,
        AttachmentKind::from_str(kind).ok()?,
    ))
}

/// Stores a submission's uploads and attaches their references to the
/// record's follow-up slots.
fn attach_uploads(
    state: &AppState,
    record: &mut PatientRecord,
    uploads: Vec<Upload>,
) -> Result<(), HandlerError> {
    if uploads.is_empty() {
        return Ok(());
    }

    let service =
        AttachmentService::new(&state.cfg.records_dir(), record.id.clone()).map_err(|e| {
            tracing::error!("Attachment service error: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        })?;

    for upload in uploads {
        let stored = service.put(&upload.bytes, &upload.filename).map_err(|e| {
            tracing::error!("Store attachment error: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        })?;

        let slot = record.follow_ups.get_mut(upload.key);
        *slot = std::mem::take(slot)
            .with_attachment(upload.kind, Some(stored.reference.as_str().to_owned()));
    }

    Ok(())
}

fn parse_record_id(id: &str) -> Result<RecordId, HandlerError> {
    RecordId::parse(id).map_err(|e| {
        tracing::error!("Invalid record id: {:?}", e);
        (StatusCode::BAD_REQUEST, "Invalid record id")
    })
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Returns the current health status of the HFR REST API service.
/// This endpoint is used for monitoring and load balancer health checks.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "HFR REST API is alive".into(),
    })
}

#[utoipa::path(
    get,
    path = "/patients",
    responses(
        (status = 200, description = "Patient summaries, most recently created first")
    )
)]
/// List all patients in the registry
///
/// Returns identity and demographics for every stored patient record,
/// ordered by creation time with the most recent first.
#[axum::debug_handler]
async fn list_patients(
    State(state): State<AppState>,
) -> Json<Vec<hfr_core::PatientSummary>> {
    let store = RecordStore::new(state.cfg.clone());
    Json(store.list())
}

#[utoipa::path(
    post,
    path = "/patients",
    responses(
        (status = 200, description = "Patient created", body = SavePatientRes),
        (status = 400, description = "Bad request"),
        (status = 500, description = "Internal server error")
    )
)]
/// Create a new patient record
///
/// Accepts a multipart submission: the `data` field carries the
/// `{patientData, followUps}` document and optional `fuN_xray`/`fuN_mri`
/// file fields carry imaging uploads. A fresh record id is minted, uploads
/// are stored under the new record, and the document is saved.
///
/// # Errors
/// Returns `400 Bad Request` for malformed multipart bodies or payloads,
/// `500 Internal Server Error` if storage fails.
#[axum::debug_handler]
async fn create_patient(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<SavePatientRes>, HandlerError> {
    let submission = read_submission(multipart).await?;

    let mut record =
        PatientRecord::create(submission.data.patient_data, submission.data.follow_ups);
    attach_uploads(&state, &mut record, submission.uploads)?;

    let store = RecordStore::new(state.cfg.clone());
    match store.save(&record) {
        Ok(()) => Ok(Json(SavePatientRes {
            success: true,
            patient_id: record.id.to_string(),
        })),
        Err(e) => {
            tracing::error!("Save patient error: {:?}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/patients/{id}",
    responses(
        (status = 200, description = "Full patient record view"),
        (status = 400, description = "Bad request"),
        (status = 404, description = "Patient not found"),
        (status = 500, description = "Internal server error")
    )
)]
/// Get one patient's full record
///
/// Returns demographics plus all three follow-up slots, with any
/// structured assessment in structured form.
#[axum::debug_handler]
async fn get_patient(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<hfr_core::PatientView>, HandlerError> {
    let id = parse_record_id(&id)?;

    let store = RecordStore::new(state.cfg.clone());
    match store.get(&id) {
        Ok(record) => Ok(Json(record.to_view())),
        Err(RecordError::NotFound(_)) => Err((StatusCode::NOT_FOUND, "Patient not found")),
        Err(e) => {
            tracing::error!("Get patient error: {:?}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error"))
        }
    }
}

#[utoipa::path(
    put,
    path = "/patients/{id}",
    responses(
        (status = 200, description = "Patient updated", body = SavePatientRes),
        (status = 400, description = "Bad request"),
        (status = 404, description = "Patient not found"),
        (status = 500, description = "Internal server error")
    )
)]
/// Update an existing patient record
///
/// Takes the same multipart shape as creation. Demographics are replaced
/// wholesale; each follow-up slot keeps its stored attachment references
/// unless the submission carries a replacement image for that slot.
#[axum::debug_handler]
async fn update_patient(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    multipart: Multipart,
) -> Result<Json<SavePatientRes>, HandlerError> {
    let id = parse_record_id(&id)?;

    let store = RecordStore::new(state.cfg.clone());
    let mut record = match store.get(&id) {
        Ok(record) => record,
        Err(RecordError::NotFound(_)) => {
            return Err((StatusCode::NOT_FOUND, "Patient not found"));
        }
        Err(e) => {
            tracing::error!("Get patient error: {:?}", e);
            return Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error"));
        }
    };

    let submission = read_submission(multipart).await?;
    record.apply_update(submission.data.patient_data, submission.data.follow_ups);
    attach_uploads(&state, &mut record, submission.uploads)?;

    match store.save(&record) {
        Ok(()) => Ok(Json(SavePatientRes {
            success: true,
            patient_id: record.id.to_string(),
        })),
        Err(e) => {
            tracing::error!("Update patient error: {:?}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error"))
        }
    }
}

#[utoipa::path(
    delete,
    path = "/patients/{id}",
    responses(
        (status = 200, description = "Patient deleted", body = DeletePatientRes),
        (status = 400, description = "Bad request"),
        (status = 404, description = "Patient not found"),
        (status = 500, description = "Internal server error")
    )
)]
/// Delete a patient record
///
/// Removes the whole record: demographics, all three follow-up slots, and
/// any stored attachment binaries.
#[axum::debug_handler]
async fn delete_patient(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<DeletePatientRes>, HandlerError> {
    let id = parse_record_id(&id)?;

    let store = RecordStore::new(state.cfg.clone());
    match store.delete(&id) {
        Ok(()) => Ok(Json(DeletePatientRes { success: true })),
        Err(RecordError::NotFound(_)) => Err((StatusCode::NOT_FOUND, "Patient not found")),
        Err(e) => {
            tracing::error!("Delete patient error: {:?}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/patients/{id}/attachments/{reference}",
    responses(
        (status = 200, description = "Attachment bytes"),
        (status = 400, description = "Bad request"),
        (status = 404, description = "Attachment not found"),
        (status = 500, description = "Internal server error")
    )
)]
/// Serve an imaging attachment
///
/// Resolves an attachment reference previously stored on one of the
/// patient's follow-up slots and serves the bytes with a best-effort
/// content type.
#[axum::debug_handler]
async fn get_attachment(
    State(state): State<AppState>,
    AxumPath((id, reference)): AxumPath<(String, String)>,
) -> Result<Response, HandlerError> {
    let id = parse_record_id(&id)?;

    let service = AttachmentService::new(&state.cfg.records_dir(), id).map_err(|e| {
        tracing::error!("Attachment service error: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
    })?;

    match service.resolve(&reference) {
        Ok(bytes) => {
            let content_type = infer::get(&bytes)
                .map(|kind| kind.mime_type())
                .unwrap_or("application/octet-stream");
            Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
        }
        Err(
            FilesError::NotFound(_) | FilesError::InvalidReference(_) | FilesError::InvalidDigest(_),
        ) => Err((StatusCode::NOT_FOUND, "Attachment not found")),
        Err(e) => {
            tracing::error!("Resolve attachment error: {:?}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    const BOUNDARY: &str = "hfr-test-boundary";

    fn test_app(temp: &TempDir) -> Router {
        let cfg = CoreConfig::new(temp.path().join("data")).unwrap();
        app(Arc::new(cfg))
    }

    /// Builds a multipart body with a `data` JSON field plus file fields.
    fn multipart_body(data: &Value, files: &[(&str, &str, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"data\"\r\n\r\n{data}\r\n"
            )
            .as_bytes(),
        );
        for (name, filename, bytes) in files {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
                     filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn submission(method: &str, uri: &str, data: &Value, files: &[(&str, &str, &[u8])]) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(data, files)))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn sample_document() -> Value {
        json!({
            "patientData": {
                "name": "C. Roundtrip",
                "age": "71",
                "sex": "Male",
                "address": "4 Quay Street",
                "dateOfSurgery": "2026-02-20",
                "drugHx": "aspirin",
                "pmh": "",
                "psh": ""
            },
            "followUps": {
                "fu1": { "painScore": "4", "rom": "limited", "loda": "1cm", "hhsScore": "78" },
                "fu2": {},
                "fu3": {}
            }
        })
    }

    #[tokio::test]
    async fn health_reports_alive() {
        let temp = TempDir::new().unwrap();
        let app = test_app(&temp);

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn create_then_get_round_trips_the_document() {
        let temp = TempDir::new().unwrap();
        let app = test_app(&temp);

        let response = app
            .clone()
            .oneshot(submission("POST", "/patients", &sample_document(), &[]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let created = body_json(response).await;
        assert_eq!(created["success"], true);
        let id = created["patientId"].as_str().unwrap().to_owned();

        let response = app
            .oneshot(
                Request::get(format!("/patients/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let view = body_json(response).await;
        assert_eq!(view["patientData"]["id"], id.as_str());
        assert_eq!(view["patientData"]["name"], "C. Roundtrip");
        assert_eq!(view["followUps"]["fu1"]["painScore"], "4");
        assert_eq!(view["followUps"]["fu1"]["hhsScore"], "78");
        assert_eq!(view["followUps"]["fu2"]["painScore"], "");
    }

    #[tokio::test]
    async fn uploads_are_stored_and_served() {
        let temp = TempDir::new().unwrap();
        let app = test_app(&temp);

        let image = b"fake xray bytes";
        let response = app
            .clone()
            .oneshot(submission(
                "POST",
                "/patients",
                &sample_document(),
                &[("fu1_xray", "hip.png", image)],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let id = body_json(response).await["patientId"]
            .as_str()
            .unwrap()
            .to_owned();

        let response = app
            .clone()
            .oneshot(
                Request::get(format!("/patients/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let view = body_json(response).await;

        let reference = view["followUps"]["fu1"]["xray_path"].as_str().unwrap();
        assert!(reference.starts_with("files/sha256/"));
        assert_eq!(view["followUps"]["fu1"]["mri_path"], Value::Null);

        let response = app
            .oneshot(
                Request::get(format!("/patients/{id}/attachments/{reference}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], image);
    }

    #[tokio::test]
    async fn update_preserves_attachment_without_replacement() {
        let temp = TempDir::new().unwrap();
        let app = test_app(&temp);

        let response = app
            .clone()
            .oneshot(submission(
                "POST",
                "/patients",
                &sample_document(),
                &[("fu1_xray", "hip.png", b"original scan")],
            ))
            .await
            .unwrap();
        let id = body_json(response).await["patientId"]
            .as_str()
            .unwrap()
            .to_owned();

        // update with new scores and no new files
        let mut updated = sample_document();
        updated["followUps"]["fu1"]["painScore"] = json!("1");
        let response = app
            .clone()
            .oneshot(submission(
                "PUT",
                &format!("/patients/{id}"),
                &updated,
                &[],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::get(format!("/patients/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let view = body_json(response).await;

        assert_eq!(view["followUps"]["fu1"]["painScore"], "1");
        assert!(view["followUps"]["fu1"]["xray_path"]
            .as_str()
            .unwrap()
            .starts_with("files/sha256/"));
    }

    #[tokio::test]
    async fn unknown_and_invalid_ids_map_to_404_and_400() {
        let temp = TempDir::new().unwrap();
        let app = test_app(&temp);

        let unknown = RecordId::new();
        let response = app
            .clone()
            .oneshot(
                Request::get(format!("/patients/{unknown}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(
                Request::get("/patients/not-a-record-id")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_removes_the_record() {
        let temp = TempDir::new().unwrap();
        let app = test_app(&temp);

        let response = app
            .clone()
            .oneshot(submission("POST", "/patients", &sample_document(), &[]))
            .await
            .unwrap();
        let id = body_json(response).await["patientId"]
            .as_str()
            .unwrap()
            .to_owned();

        let response = app
            .clone()
            .oneshot(
                Request::delete(format!("/patients/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::get(format!("/patients/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_returns_created_patients() {
        let temp = TempDir::new().unwrap();
        let app = test_app(&temp);

        for name in ["First Patient", "Second Patient"] {
            let mut document = sample_document();
            document["patientData"]["name"] = json!(name);
            let response = app
                .clone()
                .oneshot(submission("POST", "/patients", &document, &[]))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app
            .oneshot(Request::get("/patients").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["name"].as_str().unwrap())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"First Patient"));
        assert!(names.contains(&"Second Patient"));
    }

    #[tokio::test]
    async fn submission_without_data_field_is_rejected() {
        let temp = TempDir::new().unwrap();
        let app = test_app(&temp);

        // files only, no data field
        let files_only = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"fu1_xray\"; \
             filename=\"hip.png\"\r\nContent-Type: application/octet-stream\r\n\r\nbytes\r\n--{BOUNDARY}--\r\n"
        )
        .into_bytes();

        let response = app
            .oneshot(
                Request::post("/patients")
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={BOUNDARY}"),
                    )
                    .body(Body::from(files_only))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

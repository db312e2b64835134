//! Axum application setup.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::AppState;
use crate::web::static_handler;

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/upload", post(handlers::upload))
        .route("/download/:filename", get(handlers::download))
        .route("/export/:export_type/:filename", get(handlers::export))
        .fallback(static_handler)
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the web server; returns after Ctrl+C.
pub async fn run_server(state: AppState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutting down");
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::Path;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use rust_xlsxwriter::Workbook;
    use serde_json::Value;
    use tower::ServiceExt;

    const BOUNDARY: &str = "recon-test-boundary";

    fn workbook(rows: &[&[&str]]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                if !value.is_empty() {
                    sheet.write_string(r as u32, c as u16, *value).unwrap();
                }
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    fn multipart(parts: &[(&str, &str, &[u8])]) -> Request<Body> {
        let mut body = Vec::new();
        for (name, file_name, content) in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    name, file_name
                )
                .as_bytes(),
            );
            body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn router(dir: &Path) -> Router {
        create_router(AppState::new(dir.to_path_buf(), 16 * 1024 * 1024))
    }

    fn staged_uploads(dir: &Path) -> usize {
        std::fs::read_dir(dir)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with("upload_"))
            .count()
    }

    #[tokio::test]
    async fn test_upload_requires_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let response = router(dir.path())
            .oneshot(multipart(&[("modon_file", "modon.xlsx", b"x")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Both Modon and Sakneen files are required");
    }

    #[tokio::test]
    async fn test_upload_rejects_non_excel() {
        let dir = tempfile::tempdir().unwrap();
        let response = router(dir.path())
            .oneshot(multipart(&[
                ("modon_file", "modon.csv", b"x"),
                ("sakneen_file", "sakneen.xlsx", b"x"),
            ]))
            .await
            .unwrap();

        let body = json_body(response).await;
        assert_eq!(body["error"], "Modon file must be an Excel file (.xlsx or .xls)");
    }

    #[tokio::test]
    async fn test_upload_rejects_empty_filename() {
        let dir = tempfile::tempdir().unwrap();
        let response = router(dir.path())
            .oneshot(multipart(&[
                ("modon_file", "", b""),
                ("sakneen_file", "sakneen.xlsx", b"x"),
            ]))
            .await
            .unwrap();

        let body = json_body(response).await;
        assert_eq!(body["error"], "Both files must be selected");
    }

    #[tokio::test]
    async fn test_upload_reconciles_and_serves_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let modon = workbook(&[
            &["Modon Inventory"],
            &[""],
            &["Unit Number", "EOI"],
            &["A1", "John Doe"],
            &["A2", ""],
        ]);
        let sakneen = workbook(&[
            &["UnitID", "Status"],
            &["A1", "Available"],
            &["A2", "Available"],
        ]);

        let app = router(dir.path());
        let response = app
            .clone()
            .oneshot(multipart(&[
                ("modon_file", "modon.xlsx", &modon),
                ("sakneen_file", "sakneen.xlsx", &sakneen),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["total_discrepancies"], 1);
        assert_eq!(body["discrepancies"][0]["unit_id"], "A1");
        assert_eq!(staged_uploads(dir.path()), 0);

        let download = app
            .clone()
            .oneshot(get("/download/sakneen_highlighted.xlsx"))
            .await
            .unwrap();
        assert_eq!(download.status(), StatusCode::OK);
        let disposition = download.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment"));

        let csv_path = body["export_files"]["csv"].as_str().unwrap();
        let csv_name = Path::new(csv_path).file_name().unwrap().to_str().unwrap();
        let export = app
            .oneshot(get(&format!("/export/csv/{}", csv_name)))
            .await
            .unwrap();
        assert_eq!(export.status(), StatusCode::OK);
        let bytes = to_bytes(export.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&bytes).starts_with("unit_id,"));
    }

    #[tokio::test]
    async fn test_upload_failure_record_cleans_staging() {
        let dir = tempfile::tempdir().unwrap();
        let response = router(dir.path())
            .oneshot(multipart(&[
                ("modon_file", "modon.xlsx", b"not a workbook"),
                ("sakneen_file", "sakneen.xlsx", b"not a workbook"),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let error = body["error"].as_str().unwrap();
        assert!(error.starts_with("Error processing files:"));
        assert!(error.contains("'modon.xlsx'"));
        assert!(!error.contains("upload_"));
        assert_eq!(staged_uploads(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_download_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let response = router(dir.path())
            .oneshot(get("/download/nothing.xlsx"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error"], "File not found");
    }

    #[tokio::test]
    async fn test_export_rejects_unknown_type() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("discrepancies_1.csv"), "x").unwrap();
        let app = router(dir.path());

        let response = app
            .clone()
            .oneshot(get("/export/pdf/discrepancies_1.csv"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error"], "Export file not found");

        let response = app
            .oneshot(get("/export/json/discrepancies_1.csv"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_index_page_is_served() {
        let dir = tempfile::tempdir().unwrap();
        let response = router(dir.path()).oneshot(get("/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/html");
    }
}

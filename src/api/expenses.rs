use std::path::PathBuf;

use serde_json::Value;

use super::transport::MultipartForm;
use super::{ApiClient, ApiError, ApiResult, RequestOptions};

#[derive(Debug, Clone, Default)]
pub struct ExpenseRequestInput {
    pub expense_type: String,
    pub amount: f64,
    pub note: Option<String>,
    pub branch_id: i64,
    pub requester_user_id: Option<i64>,
    pub vehicle_id: Option<i64>,
    pub receipts: Vec<PathBuf>,
}

pub struct ExpensesApi {
    client: ApiClient,
}

impl ExpensesApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Submits an expense request with its receipt files as multipart form data.
    pub async fn create_expense_request(&self, input: &ExpenseRequestInput) -> ApiResult<Value> {
        let form = build_form(input).await?;
        self.client
            .fetch("/api/expense-requests", RequestOptions::post().multipart(form))
            .await
    }
}

async fn build_form(input: &ExpenseRequestInput) -> ApiResult<MultipartForm> {
    let mut form = MultipartForm::new()
        .text("type", input.expense_type.clone())
        .text("amount", input.amount.to_string())
        .text("note", input.note.clone().unwrap_or_default())
        .text("branchId", input.branch_id.to_string());

    if let Some(user_id) = input.requester_user_id {
        form = form.text("requesterUserId", user_id.to_string());
    }
    if let Some(vehicle_id) = input.vehicle_id {
        form = form.text("vehicleId", vehicle_id.to_string());
    }

    for path in &input.receipts {
        let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::Io {
            path: path.clone(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "receipt".to_string());
        let mime = mime_guess::from_path(path).first_raw();
        form = form.file("files", file_name, bytes, mime);
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::api::transport::{MultipartPart, OutgoingBody};
    use crate::test_utils::{FakeTransport, header, test_client};

    #[tokio::test]
    async fn test_create_expense_request_builds_multipart() {
        let dir = tempdir().unwrap();
        let receipt = dir.path().join("fuel.JPG");
        std::fs::write(&receipt, b"jpeg-bytes").unwrap();

        let transport = FakeTransport::new();
        transport.respond_json(200, serde_json::json!({ "status": 200, "data": { "id": 31 } }));
        let api = ExpensesApi::new(test_client(&transport));

        let created = api
            .create_expense_request(&ExpenseRequestInput {
                expense_type: "FUEL".to_string(),
                amount: 350000.0,
                note: None,
                branch_id: 2,
                requester_user_id: Some(15),
                vehicle_id: None,
                receipts: vec![receipt],
            })
            .await
            .unwrap();

        assert_eq!(created, serde_json::json!({ "id": 31 }));

        let request = transport.last_request();
        assert_eq!(request.url, "http://api.test/api/expense-requests");
        assert_eq!(header(&request, "content-type"), None);
        let OutgoingBody::Multipart(form) = request.body else {
            panic!("expected a multipart body");
        };
        assert_eq!(form.text_value("type"), Some("FUEL"));
        assert_eq!(form.text_value("amount"), Some("350000"));
        assert_eq!(form.text_value("note"), Some(""));
        assert_eq!(form.text_value("requesterUserId"), Some("15"));
        assert_eq!(form.text_value("vehicleId"), None);
        let files: Vec<_> = form
            .parts()
            .iter()
            .filter(|(name, _)| name == "files")
            .collect();
        assert_eq!(files.len(), 1);
        assert!(matches!(
            &files[0].1,
            MultipartPart::File { file_name, mime: Some(mime), .. }
                if file_name == "fuel.JPG" && mime == "image/jpeg"
        ));
    }

    #[tokio::test]
    async fn test_receipt_content_types_follow_extension() {
        let dir = tempdir().unwrap();
        let names = ["scan.gif", "photo.webp", "invoice.pdf", "notes.unknownext"];
        let receipts: Vec<PathBuf> = names
            .iter()
            .map(|name| {
                let path = dir.path().join(name);
                std::fs::write(&path, b"bytes").unwrap();
                path
            })
            .collect();

        let transport = FakeTransport::new();
        let api = ExpensesApi::new(test_client(&transport));
        api.create_expense_request(&ExpenseRequestInput {
            expense_type: "MAINTENANCE".to_string(),
            amount: 120000.0,
            branch_id: 1,
            receipts,
            ..ExpenseRequestInput::default()
        })
        .await
        .unwrap();

        let OutgoingBody::Multipart(form) = transport.last_request().body else {
            panic!("expected a multipart body");
        };
        let mimes: Vec<(String, Option<String>)> = form
            .parts()
            .iter()
            .filter_map(|(_, part)| match part {
                MultipartPart::File { file_name, mime, .. } => {
                    Some((file_name.clone(), mime.clone()))
                }
                MultipartPart::Text(_) => None,
            })
            .collect();
        assert_eq!(
            mimes,
            vec![
                ("scan.gif".to_string(), Some("image/gif".to_string())),
                ("photo.webp".to_string(), Some("image/webp".to_string())),
                ("invoice.pdf".to_string(), Some("application/pdf".to_string())),
                ("notes.unknownext".to_string(), None),
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_receipt_is_an_io_error() {
        let transport = FakeTransport::new();
        let api = ExpensesApi::new(test_client(&transport));

        let err = api
            .create_expense_request(&ExpenseRequestInput {
                expense_type: "TOLL".to_string(),
                amount: 1.0,
                branch_id: 1,
                receipts: vec![PathBuf::from("/definitely/not/here.png")],
                ..ExpenseRequestInput::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Io { .. }));
        assert!(transport.requests().is_empty());
    }
}

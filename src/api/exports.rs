use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use super::query::QueryParams;
use super::{ApiClient, ApiError, ApiResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Excel,
    Csv,
}

impl ExportFormat {
    fn segment(&self) -> &'static str {
        match self {
            ExportFormat::Excel => "excel",
            ExportFormat::Csv => "csv",
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Excel => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RevenueExportQuery {
    pub branch_id: Option<i64>,
    pub customer_id: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub period: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ExpenseExportQuery {
    pub branch_id: Option<i64>,
    /// Accepted for call-site compatibility; the export endpoints no longer filter on it.
    pub cost_type: Option<String>,
    pub vehicle_id: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub period: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct InvoiceListExportQuery {
    pub branch_id: Option<i64>,
    pub customer_id: Option<i64>,
    pub payment_status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Report exports. These endpoints return files rather than JSON, so they skip
/// response normalization and are saved straight into the download directory.
pub struct ExportsApi {
    client: ApiClient,
    download_dir: PathBuf,
}

impl ExportsApi {
    pub fn new(client: ApiClient) -> Self {
        let download_dir = client.config().download_dir.clone();
        Self {
            client,
            download_dir,
        }
    }

    pub fn with_download_dir(mut self, download_dir: impl Into<PathBuf>) -> Self {
        self.download_dir = download_dir.into();
        self
    }

    /// Authenticated `GET` of `url`, saved as `filename` in the download directory.
    /// Returns the path written.
    pub async fn download_file(&self, url: &str, filename: &str) -> ApiResult<PathBuf> {
        let response = self.client.fetch_raw(url).await?;

        if !response.status.is_success() {
            warn!(url, status = response.status.as_u16(), "Export download failed");
            return Err(ApiError::Download {
                status: response.status.as_u16(),
            });
        }

        let path = self.download_dir.join(sanitize_filename(filename));
        save(&path, &response.body).await?;
        info!(path = %path.display(), bytes = response.body.len(), "Export saved");
        Ok(path)
    }

    pub async fn revenue_report(
        &self,
        format: ExportFormat,
        query: &RevenueExportQuery,
    ) -> ApiResult<PathBuf> {
        let path = QueryParams::new()
            .opt("branchId", query.branch_id)
            .opt("customerId", query.customer_id)
            .text("startDate", query.start_date.as_deref())
            .text("endDate", query.end_date.as_deref())
            .text("period", query.period.as_deref())
            .to_path(&format!("/api/export/revenue/{}", format.segment()));
        let filename = format!("revenue-report-{}.{}", timestamp_ms(), format.extension());
        self.download_file(&path, &filename).await
    }

    pub async fn expense_report(
        &self,
        format: ExportFormat,
        query: &ExpenseExportQuery,
    ) -> ApiResult<PathBuf> {
        let path = QueryParams::new()
            .opt("branchId", query.branch_id)
            .opt("vehicleId", query.vehicle_id)
            .text("startDate", query.start_date.as_deref())
            .text("endDate", query.end_date.as_deref())
            .text("period", query.period.as_deref())
            .to_path(&format!("/api/export/expense/{}", format.segment()));
        let filename = format!("expense-report-{}.{}", timestamp_ms(), format.extension());
        self.download_file(&path, &filename).await
    }

    pub async fn invoice_list(&self, query: &InvoiceListExportQuery) -> ApiResult<PathBuf> {
        let path = QueryParams::new()
            .opt("branchId", query.branch_id)
            .opt("customerId", query.customer_id)
            .text("paymentStatus", query.payment_status.as_deref())
            .text("startDate", query.start_date.as_deref())
            .text("endDate", query.end_date.as_deref())
            .to_path("/api/export/invoices/excel");
        let filename = format!("invoice-list-{}.xlsx", timestamp_ms());
        self.download_file(&path, &filename).await
    }

    pub async fn invoice_pdf(&self, invoice_id: i64) -> ApiResult<PathBuf> {
        let path = format!("/api/export/invoice/{}/pdf", invoice_id);
        let filename = format!("invoice-{}-{}.pdf", invoice_id, timestamp_ms());
        self.download_file(&path, &filename).await
    }
}

fn timestamp_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Keeps only the final path component so a filename cannot escape the download directory.
fn sanitize_filename(filename: &str) -> String {
    Path::new(filename)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "download".to_string())
}

async fn save(path: &Path, bytes: &[u8]) -> ApiResult<()> {
    let io_error = |source| ApiError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(io_error)?;
    }
    let mut file = fs::File::create(path).await.map_err(io_error)?;
    file.write_all(bytes).await.map_err(io_error)?;
    file.sync_all().await.map_err(io_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::test_utils::{FakeTransport, header, test_client_with_tokens};
    use crate::token_store::{TokenStore, Tokens};

    fn exports_api(transport: &std::sync::Arc<FakeTransport>, dir: &Path) -> ExportsApi {
        let tokens = TokenStore::in_memory();
        tokens.set_tokens(&Tokens::new("tok", "r"));
        ExportsApi::new(test_client_with_tokens(transport, tokens)).with_download_dir(dir)
    }

    #[tokio::test]
    async fn test_download_file_saves_bytes_with_bearer() {
        let dir = tempdir().unwrap();
        let transport = FakeTransport::new();
        transport.respond_bytes(200, b"%PDF-1.7 fake");
        let api = exports_api(&transport, dir.path());

        let saved = api
            .download_file("/api/export/invoice/5/pdf", "invoice-5.pdf")
            .await
            .unwrap();

        assert_eq!(saved, dir.path().join("invoice-5.pdf"));
        assert_eq!(std::fs::read(&saved).unwrap(), b"%PDF-1.7 fake");

        let request = transport.last_request();
        assert_eq!(request.url, "http://api.test/api/export/invoice/5/pdf");
        assert_eq!(header(&request, "authorization"), Some("Bearer tok"));
        assert_eq!(header(&request, "content-type"), None);
    }

    #[tokio::test]
    async fn test_download_failure_is_generic_and_writes_nothing() {
        let dir = tempdir().unwrap();
        let transport = FakeTransport::new();
        transport.respond_json(500, serde_json::json!({ "message": "report engine down" }));
        let api = exports_api(&transport, dir.path());

        let err = api
            .download_file("/api/export/revenue/excel", "revenue.xlsx")
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Download { status: 500 }));
        assert!(!err.is_api_error());
        assert!(!dir.path().join("revenue.xlsx").exists());
    }

    #[tokio::test]
    async fn test_expense_export_never_sends_cost_type() {
        let dir = tempdir().unwrap();
        let transport = FakeTransport::new();
        transport.respond_bytes(200, b"a,b\n1,2\n");
        let api = exports_api(&transport, dir.path());

        let saved = api
            .expense_report(
                ExportFormat::Csv,
                &ExpenseExportQuery {
                    branch_id: Some(1),
                    cost_type: Some("FUEL".to_string()),
                    vehicle_id: Some(7),
                    ..ExpenseExportQuery::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(
            transport.last_request().url,
            "http://api.test/api/export/expense/csv?branchId=1&vehicleId=7"
        );
        let name = saved.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("expense-report-") && name.ends_with(".csv"));
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("report.xlsx"), "report.xlsx");
        assert_eq!(sanitize_filename(".."), "download");
    }
}

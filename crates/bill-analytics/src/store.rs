//! Access to the external bill, budget and savings-target store
//!
//! The store is either the web backend's JSON API or a local data
//! directory holding the same documents.

#![allow(async_fn_in_trait)]

use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::bills::{self, Bill, Budgets, SavingsTarget};
use crate::constants;
use crate::error::StoreError;

/// Read/write operations the analytics engine needs from a store
pub trait BillStore {
    async fn fetch_bills(&self) -> Result<Vec<Bill>, StoreError>;

    async fn fetch_budgets(&self) -> Result<Budgets, StoreError>;

    /// None when no target has been saved yet
    async fn fetch_savings_target(&self) -> Result<Option<SavingsTarget>, StoreError>;

    async fn save_savings_target(&self, target: &SavingsTarget) -> Result<(), StoreError>;
}

// =============================================================================
// HTTP API
// =============================================================================

pub struct HttpStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, StoreError> {
        let url = self.url(path);
        debug!(%url, "fetching");
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

impl BillStore for HttpStore {
    async fn fetch_bills(&self) -> Result<Vec<Bill>, StoreError> {
        self.get_json(constants::BILLS_PATH).await
    }

    async fn fetch_budgets(&self) -> Result<Budgets, StoreError> {
        self.get_json(constants::BUDGETS_PATH).await
    }

    async fn fetch_savings_target(&self) -> Result<Option<SavingsTarget>, StoreError> {
        self.get_json(constants::SAVINGS_TARGET_PATH).await
    }

    async fn save_savings_target(&self, target: &SavingsTarget) -> Result<(), StoreError> {
        self.client
            .post(self.url(constants::SAVINGS_TARGET_PATH))
            .json(target)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

// =============================================================================
// Local data directory
// =============================================================================

/// JSON (or CSV for bills) files in one directory. Missing files read as
/// empty.
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn read_json<T: DeserializeOwned>(&self, filename: &str) -> Result<Option<T>, StoreError> {
        let path = self.data_dir.join(filename);
        if !path.exists() {
            debug!(path = %path.display(), "store file not found");
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }
}

impl BillStore for FileStore {
    async fn fetch_bills(&self) -> Result<Vec<Bill>, StoreError> {
        let json = self.data_dir.join(constants::BILLS_JSON_FILENAME);
        if json.exists() {
            return bills::load_from_json(&json);
        }
        let csv = self.data_dir.join(constants::BILLS_CSV_FILENAME);
        if csv.exists() {
            return bills::load_from_csv(&csv);
        }
        debug!(dir = %self.data_dir.display(), "no bill file in data directory");
        Ok(Vec::new())
    }

    async fn fetch_budgets(&self) -> Result<Budgets, StoreError> {
        Ok(self
            .read_json(constants::BUDGETS_FILENAME)?
            .unwrap_or_default())
    }

    async fn fetch_savings_target(&self) -> Result<Option<SavingsTarget>, StoreError> {
        // The file may hold a literal null
        Ok(self
            .read_json::<Option<SavingsTarget>>(constants::SAVINGS_TARGET_FILENAME)?
            .flatten())
    }

    async fn save_savings_target(&self, target: &SavingsTarget) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.data_dir)?;
        let path = self.data_dir.join(constants::SAVINGS_TARGET_FILENAME);
        std::fs::write(&path, serde_json::to_string_pretty(target)?)?;
        Ok(())
    }
}

/// Either store kind, chosen at startup
pub enum AnyStore {
    Http(HttpStore),
    File(FileStore),
}

impl BillStore for AnyStore {
    async fn fetch_bills(&self) -> Result<Vec<Bill>, StoreError> {
        match self {
            AnyStore::Http(store) => store.fetch_bills().await,
            AnyStore::File(store) => store.fetch_bills().await,
        }
    }

    async fn fetch_budgets(&self) -> Result<Budgets, StoreError> {
        match self {
            AnyStore::Http(store) => store.fetch_budgets().await,
            AnyStore::File(store) => store.fetch_budgets().await,
        }
    }

    async fn fetch_savings_target(&self) -> Result<Option<SavingsTarget>, StoreError> {
        match self {
            AnyStore::Http(store) => store.fetch_savings_target().await,
            AnyStore::File(store) => store.fetch_savings_target().await,
        }
    }

    async fn save_savings_target(&self, target: &SavingsTarget) -> Result<(), StoreError> {
        match self {
            AnyStore::Http(store) => store.save_savings_target(target).await,
            AnyStore::File(store) => store.save_savings_target(target).await,
        }
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// Everything the analytics pipeline reads from the store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub bills: Vec<Bill>,
    pub budgets: Budgets,
    pub target: Option<SavingsTarget>,
}

impl Snapshot {
    /// Fetch bills, budgets and the target. A failed fetch is logged and
    /// replaced by an empty value so the analytics still run.
    pub async fn load<S: BillStore>(store: &S) -> Self {
        let (bills, budgets, target) = tokio::join!(
            store.fetch_bills(),
            store.fetch_budgets(),
            store.fetch_savings_target()
        );

        let bills = bills.unwrap_or_else(|e| {
            warn!(error = %e, "failed to fetch bills, continuing with none");
            Vec::new()
        });
        let budgets = budgets.unwrap_or_else(|e| {
            warn!(error = %e, "failed to fetch budgets, continuing with none");
            Budgets::new()
        });
        let target = target.unwrap_or_else(|e| {
            warn!(error = %e, "failed to fetch savings target, continuing without one");
            None
        });

        debug!(bills = bills.len(), budgets = !budgets.is_empty(), "snapshot loaded");
        Self {
            bills,
            budgets,
            target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bills::UtilityType;
    use crate::filter::UtilityFilter;

    const BILLS_JSON: &str = r#"[
        {"id": 1, "utility_type": "Electricity", "amount": 120.5,
         "bill_date": "2024-01-10", "due_date": "2024-01-30", "status": "paid"},
        {"id": 2, "utility_type": "Water", "amount": 40,
         "bill_date": "2024-02-10T00:00:00", "due_date": "2024-03-01"}
    ]"#;

    #[tokio::test]
    async fn test_http_store_fetches_all_documents() {
        let mut server = mockito::Server::new_async().await;
        let _bills = server
            .mock("GET", "/api/bills")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(BILLS_JSON)
            .create_async()
            .await;
        let _budgets = server
            .mock("GET", "/api/budgets")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"all": 1800, "Electricity": 900}"#)
            .create_async()
            .await;
        let _target = server
            .mock("GET", "/api/savings-target")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"amount": 250}"#)
            .create_async()
            .await;

        let store = HttpStore::new(format!("{}/", server.url()));
        let snapshot = Snapshot::load(&store).await;

        assert_eq!(snapshot.bills.len(), 2);
        assert_eq!(snapshot.bills[1].utility_type, UtilityType::Water);
        assert_eq!(snapshot.budgets.for_filter(&UtilityFilter::All), Some(1800.0));
        assert_eq!(snapshot.target, Some(SavingsTarget { amount: 250.0 }));
    }

    #[tokio::test]
    async fn test_http_store_null_target() {
        let mut server = mockito::Server::new_async().await;
        let _target = server
            .mock("GET", "/api/savings-target")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("null")
            .create_async()
            .await;

        let store = HttpStore::new(server.url());
        assert_eq!(store.fetch_savings_target().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_http_store_failures_become_empty_snapshot() {
        let mut server = mockito::Server::new_async().await;
        let _bills = server
            .mock("GET", "/api/bills")
            .with_status(500)
            .with_body(r#"{"error": "database unavailable"}"#)
            .create_async()
            .await;

        let store = HttpStore::new(server.url());
        assert!(matches!(store.fetch_bills().await, Err(StoreError::Http(_))));

        let snapshot = Snapshot::load(&store).await;
        assert_eq!(snapshot, Snapshot::default());
    }

    #[tokio::test]
    async fn test_http_store_posts_target() {
        let mut server = mockito::Server::new_async().await;
        let post = server
            .mock("POST", "/api/savings-target")
            .match_body(mockito::Matcher::JsonString(r#"{"amount": 300.0}"#.to_string()))
            .with_status(200)
            .with_body(r#"{"amount": 300.0}"#)
            .create_async()
            .await;

        let store = HttpStore::new(server.url());
        store
            .save_savings_target(&SavingsTarget { amount: 300.0 })
            .await
            .unwrap();
        post.assert_async().await;
    }

    #[tokio::test]
    async fn test_file_store_reads_data_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bills.json"), BILLS_JSON).unwrap();
        std::fs::write(dir.path().join("budgets.json"), r#"{"water": 600}"#).unwrap();

        let store = FileStore::new(dir.path());
        let snapshot = Snapshot::load(&store).await;

        assert_eq!(snapshot.bills.len(), 2);
        let water = UtilityFilter::Only(UtilityType::Water);
        assert_eq!(snapshot.budgets.for_filter(&water), Some(600.0));
        assert_eq!(snapshot.target, None);
    }

    #[tokio::test]
    async fn test_file_store_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.fetch_bills().await.unwrap().is_empty());
        assert!(store.fetch_budgets().await.unwrap().is_empty());
        assert_eq!(store.fetch_savings_target().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_target_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));
        let target = SavingsTarget { amount: 125.0 };

        store.save_savings_target(&target).await.unwrap();
        assert_eq!(store.fetch_savings_target().await.unwrap(), Some(target));
    }

    #[tokio::test]
    async fn test_file_store_invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("budgets.json"), "not json").unwrap();
        let store = FileStore::new(dir.path());
        assert!(matches!(store.fetch_budgets().await, Err(StoreError::Json(_))));
    }

    #[tokio::test]
    async fn test_snapshot_load_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bills.json"), BILLS_JSON).unwrap();
        let store = AnyStore::File(FileStore::new(dir.path()));
        assert_eq!(Snapshot::load(&store).await, Snapshot::load(&store).await);
    }
}

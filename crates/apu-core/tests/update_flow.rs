// End-to-end update runs against the in-memory store
//
// Covers the file → records → store path and partial-failure handling.

use apu_core::{
    parse_parameters, MemoryParameterStore, Parameter, ParameterError, ParameterStore,
    ParameterType, PutRequest, StoredParameter, UpdateOptions, UpdateOutcome, Updater,
};
use async_trait::async_trait;

const PARAMETERS: &str = r#"
- name: /service/api/url
  value: https://api.internal
  description: Upstream API
  is_secure: false
- name: /service/api/token
  value: s3cr3t
  description: Upstream API token
  is_secure: true
- name: /service/feature/enabled
  value: "true"
"#;

/// Store that rejects writes to one name and delegates everything else
struct RejectingStore {
    inner: MemoryParameterStore,
    reject: &'static str,
}

#[async_trait]
impl ParameterStore for RejectingStore {
    async fn get_parameter(&self, name: &str) -> apu_core::Result<Option<StoredParameter>> {
        self.inner.get_parameter(name).await
    }

    async fn put_parameter(&self, request: &PutRequest) -> apu_core::Result<i64> {
        if request.name == self.reject {
            return Err(ParameterError::store_write(
                &request.name,
                "AccessDeniedException: not authorized to perform ssm:PutParameter",
            ));
        }
        self.inner.put_parameter(request).await
    }
}

#[tokio::test]
async fn test_file_applied_to_empty_store() {
    let parameters = parse_parameters(PARAMETERS).unwrap();
    let store = MemoryParameterStore::new();
    let updater = Updater::new(&store, UpdateOptions::default());

    let report = updater.update_all(&parameters).await;

    assert_eq!(report.written(), 3);
    assert!(!report.has_failures());
    assert_eq!(store.len(), 3);

    // One write per record, secure flag mapped to the store type
    let writes = store.writes();
    assert_eq!(writes.len(), 3);
    assert!(writes.iter().all(|w| w.overwrite));
    assert_eq!(writes[0].parameter_type, ParameterType::String);
    assert_eq!(writes[1].parameter_type, ParameterType::SecureString);
    assert_eq!(writes[2].parameter_type, ParameterType::String);
    assert_eq!(writes[2].description, None);
}

#[tokio::test]
async fn test_second_run_is_a_no_op() {
    let parameters = parse_parameters(PARAMETERS).unwrap();
    let store = MemoryParameterStore::new();
    let updater = Updater::new(&store, UpdateOptions::default());

    updater.update_all(&parameters).await;
    let report = updater.update_all(&parameters).await;

    assert_eq!(report.written(), 0);
    assert_eq!(report.unchanged(), 3);
    assert_eq!(store.writes().len(), 3);
}

#[tokio::test]
async fn test_failure_does_not_stop_the_run() {
    let parameters = parse_parameters(PARAMETERS).unwrap();
    let store = RejectingStore {
        inner: MemoryParameterStore::new(),
        reject: "/service/api/token",
    };
    let updater = Updater::new(&store, UpdateOptions::default());

    let report = updater.update_all(&parameters).await;

    assert_eq!(report.failed(), 1);
    assert_eq!(report.written(), 2);
    assert_eq!(report.skipped, 0);

    let (name, err) = report.failures().next().unwrap();
    assert_eq!(name, "/service/api/token");
    assert_eq!(err.code(), "E005");
    assert!(store.inner.get("/service/feature/enabled").is_some());
}

#[tokio::test]
async fn test_fail_fast_stops_after_first_failure() {
    let parameters = parse_parameters(PARAMETERS).unwrap();
    let store = RejectingStore {
        inner: MemoryParameterStore::new(),
        reject: "/service/api/token",
    };
    let updater = Updater::new(
        &store,
        UpdateOptions {
            fail_fast: true,
            ..Default::default()
        },
    );

    let report = updater.update_all(&parameters).await;

    assert_eq!(report.results.len(), 2);
    assert_eq!(report.skipped, 1);
    assert!(store.inner.get("/service/feature/enabled").is_none());
}

#[tokio::test]
async fn test_single_parameter_through_boxed_store() {
    let store: Box<dyn ParameterStore> = Box::new(MemoryParameterStore::new());
    let updater = Updater::new(store, UpdateOptions::default());
    let parameter = Parameter::new("/single/key", "value", "from flags", true);

    assert_eq!(
        updater.update(&parameter).await.unwrap(),
        UpdateOutcome::Created { version: 1 }
    );
    assert_eq!(
        updater.update(&parameter).await.unwrap(),
        UpdateOutcome::Unchanged { version: 1 }
    );
}

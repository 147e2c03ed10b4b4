use pricewatch_collector::{open_store, Config};

#[tokio::test]
async fn open_store_creates_database_and_table() {
    let tmp = tempfile::tempdir().unwrap();
    let db_path = tmp.path().join("nested").join("pricewatch.db");
    let db_path = db_path.to_str().unwrap().to_string();

    let config = Config::from_lookup(|key| match key {
        "PW_DB_PATH" => Some(db_path.clone()),
        "PW_SAMPLES_TABLE" => Some("prices".to_string()),
        _ => None,
    })
    .unwrap();

    let store = open_store(&config).await.unwrap();

    assert!(std::path::Path::new(&db_path).exists());
    assert_eq!(store.table().as_str(), "prices");
    assert_eq!(store.count_samples().unwrap(), 0);
}

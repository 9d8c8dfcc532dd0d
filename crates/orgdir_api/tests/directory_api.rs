use orgdir_api::{ApiError, DirectoryApi};
use orgdir_core::{DbError, RepoError, SeedOutcome};
use tempfile::TempDir;

async fn seeded_api() -> (TempDir, DirectoryApi) {
    let dir = tempfile::tempdir().unwrap();
    let api = DirectoryApi::new(dir.path().join("orgdir.sqlite3"));
    assert!(matches!(
        api.seed_demo().await.unwrap(),
        SeedOutcome::Seeded { .. }
    ));
    (dir, api)
}

#[tokio::test]
async fn seed_is_idempotent_across_calls() {
    let (_dir, api) = seeded_api().await;
    assert_eq!(api.seed_demo().await.unwrap(), SeedOutcome::AlreadyPopulated);
}

#[tokio::test]
async fn get_organization_maps_absence_to_not_found() {
    let (_dir, api) = seeded_api().await;

    let org = api.get_organization(1).await.unwrap();
    assert_eq!(org.name, "Кофемания Арбат");

    let err = api.get_organization(404).await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::NotFound {
            entity: "organization",
            id: 404
        }
    ));
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn occupation_lookup_switches_between_exact_and_subtree() {
    let (_dir, api) = seeded_api().await;

    let subtree = api.list_by_occupation(1, true, None).await.unwrap();
    assert_eq!(subtree.len(), 3);
    let exact = api.list_by_occupation(1, false, None).await.unwrap();
    assert!(exact.is_empty());
    let hierarchy = api.search_by_occupation_hierarchy(1).await.unwrap();
    assert_eq!(hierarchy, subtree);

    let err = api.list_by_occupation(1, true, Some(11)).await.unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn search_by_name_validates_parameters() {
    let (_dir, api) = seeded_api().await;

    let found = api.search_by_name("хлеб", Some(5)).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Кулинария Хлеб да Соль");

    assert_eq!(api.search_by_name("", None).await.unwrap_err().status_code(), 400);
    assert_eq!(
        api.search_by_name("к", Some(0)).await.unwrap_err().status_code(),
        400
    );
    assert_eq!(
        api.search_by_name("к", Some(101)).await.unwrap_err().status_code(),
        400
    );
}

#[tokio::test]
async fn geo_queries_validate_and_return_matches() {
    let (_dir, api) = seeded_api().await;

    let near = api
        .list_buildings_within_radius(55.7497, 37.5951, 500.0)
        .await
        .unwrap();
    assert_eq!(near.len(), 1);

    let area = api
        .list_organizations_within_bounds(55.7, 55.8, 37.5, 37.7)
        .await
        .unwrap();
    assert_eq!(area.buildings.len(), 2);
    assert_eq!(area.organizations.len(), 2);

    let in_box = api
        .list_buildings_within_bounds(55.7, 55.8, 37.5, 37.7)
        .await
        .unwrap();
    assert_eq!(in_box, area.buildings);

    let radius_area = api
        .list_organizations_within_radius(55.7497, 37.5951, 10_000.0)
        .await
        .unwrap();
    assert_eq!(radius_area, area);

    for err in [
        api.list_buildings_within_radius(91.0, 0.0, 10.0).await.unwrap_err(),
        api.list_buildings_within_radius(0.0, 0.0, 0.0).await.unwrap_err(),
        api.list_buildings_within_bounds(55.8, 55.7, 37.5, 37.7)
            .await
            .unwrap_err(),
        api.list_organizations_within_bounds(55.7, 55.8, 37.7, 37.5)
            .await
            .unwrap_err(),
    ] {
        assert!(matches!(err, ApiError::InvalidParameter { .. }), "{err}");
    }
}

#[tokio::test]
async fn invalid_parameters_do_not_create_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("never.sqlite3");
    let api = DirectoryApi::new(&path);

    assert!(api.search_by_name("", None).await.is_err());
    assert!(!path.exists());
}

#[tokio::test]
async fn unreadable_database_is_a_storage_error() {
    let dir = tempfile::tempdir().unwrap();
    // A directory cannot be opened as a database file.
    let api = DirectoryApi::new(dir.path());

    let err = api.list_buildings().await.unwrap_err();
    assert!(matches!(err, ApiError::Storage(_)), "{err}");
    assert_eq!(err.status_code(), 500);
    let source = std::error::Error::source(&err).unwrap();
    assert!(matches!(
        source.downcast_ref::<RepoError>(),
        Some(RepoError::Db(DbError::Sqlite(_)))
    ));
}

#[tokio::test]
async fn results_serialize_to_stable_json() {
    let (_dir, api) = seeded_api().await;
    let buildings = api.list_buildings().await.unwrap();

    let json = serde_json::to_value(&buildings).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 5);
    assert_eq!(json[0]["organization_id"], 1);
    assert_eq!(json[2]["address"], "г. Санкт-Петербург, Невский пр., 44");
}

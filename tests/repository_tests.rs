use zip_api::{
    InMemoryRepository, Repository, RepositoryError,
    models::{CreateCityRequest, CreateCountyRequest, NewUser, UpdateCityRequest, UpdateCountyRequest},
};

// --- Test Data Helpers ---

async fn seeded() -> (InMemoryRepository, i64, i64) {
    let repo = InMemoryRepository::new();
    let pest = repo
        .create_county(CreateCountyRequest {
            name: "Pest".to_string(),
        })
        .await
        .unwrap();
    let heves = repo
        .create_county(CreateCountyRequest {
            name: "Heves".to_string(),
        })
        .await
        .unwrap();
    (repo, pest.id, heves.id)
}

fn city(name: &str, zip_code: i32) -> CreateCityRequest {
    CreateCityRequest {
        name: name.to_string(),
        zip_code,
    }
}

// --- Counties ---

#[tokio::test]
async fn test_ids_are_sequential_and_never_reused() {
    let (repo, pest, heves) = seeded().await;
    assert_eq!((pest, heves), (1, 2));

    assert!(repo.delete_county(heves).await.unwrap());
    let next = repo
        .create_county(CreateCountyRequest {
            name: "Nógrád".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(next.id, 3);
}

#[tokio::test]
async fn test_update_county_patch_semantics() {
    let (repo, pest, _) = seeded().await;

    let unchanged = repo
        .update_county(pest, UpdateCountyRequest { name: None })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.name, "Pest");

    let renamed = repo
        .update_county(
            pest,
            UpdateCountyRequest {
                name: Some("Pest vármegye".to_string()),
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(renamed.name, "Pest vármegye");

    assert!(
        repo.update_county(99, UpdateCountyRequest::default())
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_delete_county_with_cities_violates_foreign_key() {
    let (repo, pest, _) = seeded().await;
    let vac = repo.create_city(pest, city("Vác", 2600)).await.unwrap();

    let result = repo.delete_county(pest).await;
    assert!(matches!(result, Err(RepositoryError::ForeignKeyViolation)));
    assert!(repo.find_county_by_id(pest).await.unwrap().is_some());

    assert!(repo.delete_city(pest, vac.id).await.unwrap());
    assert!(repo.delete_county(pest).await.unwrap());
    assert!(!repo.delete_county(pest).await.unwrap());
}

// --- Cities ---

#[tokio::test]
async fn test_create_city_requires_existing_county() {
    let (repo, _, _) = seeded().await;

    let result = repo.create_city(9999, city("Sehol", 1000)).await;

    assert!(matches!(result, Err(RepositoryError::ForeignKeyViolation)));
    assert!(repo.list_cities(9999).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_city_scoped_to_its_county() {
    let (repo, pest, heves) = seeded().await;
    let eger = repo.create_city(heves, city("Eger", 3300)).await.unwrap();

    assert!(
        repo.find_city_by_id_and_county(pest, eger.id)
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        repo.update_city(pest, eger.id, UpdateCityRequest::default())
            .await
            .unwrap()
            .is_none()
    );
    assert!(!repo.delete_city(pest, eger.id).await.unwrap());

    let found = repo
        .find_city_by_id_and_county(heves, eger.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found, eger);
}

#[tokio::test]
async fn test_update_city_changes_only_given_fields() {
    let (repo, pest, _) = seeded().await;
    let created = repo.create_city(pest, city("Vác", 2600)).await.unwrap();

    let updated = repo
        .update_city(
            pest,
            created.id,
            UpdateCityRequest {
                name: None,
                zip_code: Some(2601),
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.name, "Vác");
    assert_eq!(updated.zip_code, 2601);
    assert_eq!(updated.county_id, pest);
}

#[tokio::test]
async fn test_city_names_and_initial_candidates() {
    let (repo, pest, heves) = seeded().await;
    for (name, zip) in [("Érd", 2030), ("Esztergom", 2500), ("ecser", 2233)] {
        repo.create_city(pest, city(name, zip)).await.unwrap();
    }
    repo.create_city(heves, city("Eger", 3300)).await.unwrap();

    let names = repo.city_names(pest).await.unwrap();
    assert_eq!(names, vec!["Érd", "Esztergom", "ecser"]);

    let candidates: Vec<String> = repo
        .cities_by_initial(pest, "E")
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(candidates, vec!["Esztergom", "ecser"]);
}

// --- Users ---

#[tokio::test]
async fn test_create_user_is_idempotent_by_email() {
    let repo = InMemoryRepository::new();
    let new_user = |name: &str| NewUser {
        name: name.to_string(),
        email: "admin@example.com".to_string(),
        password_hash: "hash".to_string(),
    };

    let first = repo.create_user(new_user("First")).await.unwrap();
    let second = repo.create_user(new_user("Second")).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(second.name, "First");
    assert_eq!(repo.list_users().await.unwrap(), vec![first.clone()]);
    assert_eq!(repo.find_user_by_id(first.id).await.unwrap(), Some(first));
    assert!(
        repo.find_user_by_email("nobody@example.com")
            .await
            .unwrap()
            .is_none()
    );
}

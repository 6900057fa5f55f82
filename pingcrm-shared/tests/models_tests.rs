/// Integration tests for the models and the list queries built on them

use std::collections::BTreeSet;

use pingcrm_shared::db::migrations::run_migrations;
use pingcrm_shared::db::pool::{create_pool, DatabaseConfig};
use pingcrm_shared::models::contact::{Contact, ContactInput};
use pingcrm_shared::models::organization::{Organization, OrganizationInput};
use pingcrm_shared::models::user::{CreateUser, UpdateUser, User};
use pingcrm_shared::query::{ListFilters, TrashedFilter, PER_PAGE};
use pingcrm_shared::resources::ContactResource;
use sqlx::SqlitePool;

async fn setup() -> SqlitePool {
    let pool = create_pool(DatabaseConfig::in_memory()).await.expect("Failed to create pool");
    run_migrations(&pool).await.expect("Migrations should succeed");
    pool
}

async fn create_org(pool: &SqlitePool, name: &str, city: Option<&str>) -> i64 {
    Organization::create(
        pool,
        &OrganizationInput {
            name: name.to_string(),
            city: city.map(str::to_string),
            ..Default::default()
        },
    )
    .await
    .expect("Organization insert should succeed")
}

async fn create_contact(pool: &SqlitePool, organization_id: Option<i64>, first: &str, last: &str) -> i64 {
    Contact::create(
        pool,
        &ContactInput {
            organization_id,
            first_name: first.to_string(),
            last_name: last.to_string(),
            ..Default::default()
        },
    )
    .await
    .expect("Contact insert should succeed")
}

fn new_user(email: &str) -> CreateUser {
    CreateUser {
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        email: email.to_string(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
        owner: false,
        photo: None,
    }
}

async fn org_ids(pool: &SqlitePool, filters: &ListFilters) -> BTreeSet<i64> {
    let (rows, total) = Organization::paginate(pool, filters, 1, 100).await.expect("Paginate should succeed");
    assert_eq!(rows.len() as u64, total);
    rows.into_iter().map(|o| o.id).collect()
}

#[tokio::test]
async fn test_trashed_filters_partition_rows() {
    let pool = setup().await;

    let a = create_org(&pool, "Alpha", None).await;
    let b = create_org(&pool, "Beta", None).await;
    let c = create_org(&pool, "Gamma", None).await;
    assert!(Organization::soft_delete(&pool, b).await.unwrap());

    let active = org_ids(&pool, &ListFilters::new("", TrashedFilter::Active)).await;
    let only = org_ids(&pool, &ListFilters::new("", TrashedFilter::Only)).await;
    let with = org_ids(&pool, &ListFilters::new("", TrashedFilter::With)).await;

    assert_eq!(active, BTreeSet::from([a, c]));
    assert_eq!(only, BTreeSet::from([b]));
    assert!(active.is_disjoint(&only));
    assert_eq!(with, active.union(&only).copied().collect());
}

#[tokio::test]
async fn test_count_respects_trashed_filter() {
    let pool = setup().await;

    for name in ["A", "B", "C"] {
        create_org(&pool, name, None).await;
    }
    let deleted = create_org(&pool, "D", None).await;
    Organization::soft_delete(&pool, deleted).await.unwrap();

    let (_, total) = Organization::paginate(&pool, &ListFilters::default(), 1, PER_PAGE).await.unwrap();
    assert_eq!(total, 3);
}

#[tokio::test]
async fn test_search_is_case_insensitive_and_ordered() {
    let pool = setup().await;

    create_org(&pool, "Zeta Acme", None).await;
    create_org(&pool, "acme corp", None).await;
    create_org(&pool, "Unrelated", Some("ACMEVILLE")).await;
    create_org(&pool, "Other", Some("Paris")).await;

    let filters = ListFilters::new("acme", TrashedFilter::Active);
    let (rows, total) = Organization::paginate(&pool, &filters, 1, PER_PAGE).await.unwrap();

    assert_eq!(total, 3);
    let names: Vec<&str> = rows.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, ["Unrelated", "Zeta Acme", "acme corp"]);
}

#[tokio::test]
async fn test_search_input_is_bound_not_interpolated() {
    let pool = setup().await;
    create_org(&pool, "Acme", None).await;

    let filters = ListFilters::new("' OR 1=1; DROP TABLE organizations; --", TrashedFilter::With);
    let (rows, total) = Organization::paginate(&pool, &filters, 1, PER_PAGE).await.unwrap();

    assert!(rows.is_empty());
    assert_eq!(total, 0);
    assert!(Organization::exists(&pool, 1).await.unwrap());
}

#[tokio::test]
async fn test_pages_split_rows() {
    let pool = setup().await;

    for i in 0..25 {
        create_org(&pool, &format!("Org {i:02}"), None).await;
    }

    let filters = ListFilters::default();
    let (first, total) = Organization::paginate(&pool, &filters, 1, PER_PAGE).await.unwrap();
    let (last, _) = Organization::paginate(&pool, &filters, 3, PER_PAGE).await.unwrap();
    let (beyond, _) = Organization::paginate(&pool, &filters, 9, PER_PAGE).await.unwrap();

    assert_eq!(total, 25);
    assert_eq!(first.len(), 10);
    assert_eq!(first[0].name, "Org 00");
    assert_eq!(last.len(), 5);
    assert_eq!(last[4].name, "Org 24");
    assert!(beyond.is_empty());
}

#[tokio::test]
async fn test_soft_delete_and_restore() {
    let pool = setup().await;
    let id = create_org(&pool, "Acme", None).await;

    assert!(Organization::soft_delete(&pool, id).await.unwrap());
    let deleted = Organization::find_by_id(&pool, id).await.unwrap().expect("Row kept");
    let first_stamp = deleted.deleted_at.expect("Marked deleted");

    // Deleting again keeps the first timestamp
    assert!(Organization::soft_delete(&pool, id).await.unwrap());
    let again = Organization::find_by_id(&pool, id).await.unwrap().expect("Row kept");
    assert_eq!(again.deleted_at, Some(first_stamp));

    assert!(Organization::restore(&pool, id).await.unwrap());
    assert!(Organization::restore(&pool, id).await.unwrap());
    let restored = Organization::find_by_id(&pool, id).await.unwrap().expect("Row kept");
    assert!(restored.deleted_at.is_none());

    assert!(!Organization::soft_delete(&pool, 999).await.unwrap());
    assert!(!Organization::restore(&pool, 999).await.unwrap());
}

#[tokio::test]
async fn test_soft_deleting_organization_keeps_contacts() {
    let pool = setup().await;
    let org = create_org(&pool, "Acme", None).await;
    let contact = create_contact(&pool, Some(org), "Alice", "Johnson").await;

    Organization::soft_delete(&pool, org).await.unwrap();

    let row = Contact::find_by_id(&pool, contact).await.unwrap().expect("Contact kept");
    assert_eq!(row.organization_id, Some(org));
    assert!(row.deleted_at.is_none());
}

#[tokio::test]
async fn test_hard_delete_clears_reference() {
    let pool = setup().await;
    let org = create_org(&pool, "Acme", None).await;
    let contact = create_contact(&pool, Some(org), "Alice", "Johnson").await;

    sqlx::query("DELETE FROM organizations WHERE id = ?")
        .bind(org)
        .execute(&pool)
        .await
        .unwrap();

    let row = Contact::find_by_id(&pool, contact).await.unwrap().expect("Contact kept");
    assert_eq!(row.organization_id, None);
}

#[tokio::test]
async fn test_contact_requires_existing_organization() {
    let pool = setup().await;

    let result = Contact::create(
        &pool,
        &ContactInput {
            organization_id: Some(42),
            first_name: "No".to_string(),
            last_name: "Org".to_string(),
            ..Default::default()
        },
    )
    .await;

    assert!(result.is_err(), "Foreign key should reject unknown organization");
}

#[tokio::test]
async fn test_contact_list_joins_and_searches_organization() {
    let pool = setup().await;
    let acme = create_org(&pool, "Acme Corporation", None).await;
    create_contact(&pool, Some(acme), "Alice", "Johnson").await;
    create_contact(&pool, Some(acme), "Bob", "Williams").await;
    create_contact(&pool, None, "Eve", "Miller").await;

    let filters = ListFilters::new("acme", TrashedFilter::Active);
    let (rows, total) = Contact::paginate(&pool, &filters, 1, PER_PAGE).await.unwrap();
    assert_eq!(total, 2);

    let formatted: Vec<ContactResource> = rows.iter().map(ContactResource::from).collect();
    assert_eq!(formatted[0].name, "Alice Johnson");
    assert_eq!(formatted[0].organization.as_ref().map(|o| o.name.as_str()), Some("Acme Corporation"));

    let (all, total) = Contact::paginate(&pool, &ListFilters::default(), 1, PER_PAGE).await.unwrap();
    assert_eq!(total, 3);
    let eve = all.iter().find(|r| r.contact.first_name == "Eve").expect("Eve listed");
    assert!(eve.organization().is_none());
}

#[tokio::test]
async fn test_contact_list_trashed_applies_to_contacts() {
    let pool = setup().await;
    let acme = create_org(&pool, "Acme", None).await;
    let alice = create_contact(&pool, Some(acme), "Alice", "Johnson").await;
    create_contact(&pool, Some(acme), "Bob", "Williams").await;

    Contact::soft_delete(&pool, alice).await.unwrap();
    Organization::soft_delete(&pool, acme).await.unwrap();

    let (active, _) = Contact::paginate(&pool, &ListFilters::default(), 1, PER_PAGE).await.unwrap();
    let (only, _) = Contact::paginate(&pool, &ListFilters::new("", TrashedFilter::Only), 1, PER_PAGE)
        .await
        .unwrap();

    assert_eq!(active.len(), 1);
    assert_eq!(active[0].contact.first_name, "Bob");
    assert_eq!(only.len(), 1);
    assert_eq!(only[0].contact.id, alice);
}

#[tokio::test]
async fn test_active_contacts_for_organization() {
    let pool = setup().await;
    let acme = create_org(&pool, "Acme", None).await;
    let other = create_org(&pool, "Other", None).await;
    create_contact(&pool, Some(acme), "Bob", "Williams").await;
    create_contact(&pool, Some(acme), "Alice", "Johnson").await;
    let gone = create_contact(&pool, Some(acme), "Carl", "Adams").await;
    create_contact(&pool, Some(other), "Dan", "Brown").await;
    Contact::soft_delete(&pool, gone).await.unwrap();

    let contacts = Contact::list_active_for_organization(&pool, acme).await.unwrap();
    let names: Vec<&str> = contacts.iter().map(|c| c.last_name.as_str()).collect();
    assert_eq!(names, ["Johnson", "Williams"]);
}

#[tokio::test]
async fn test_organization_options_exclude_deleted() {
    let pool = setup().await;
    create_org(&pool, "Zeta", None).await;
    let gone = create_org(&pool, "Beta", None).await;
    create_org(&pool, "Alpha", None).await;
    Organization::soft_delete(&pool, gone).await.unwrap();

    let options = Organization::list_active_options(&pool).await.unwrap();
    let names: Vec<&str> = options.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, ["Alpha", "Zeta"]);
}

#[tokio::test]
async fn test_update_refreshes_row() {
    let pool = setup().await;
    let id = create_org(&pool, "Acme", Some("Paris")).await;

    let updated = Organization::update(
        &pool,
        id,
        &OrganizationInput {
            name: "Acme Europe".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(updated);

    let row = Organization::find_by_id(&pool, id).await.unwrap().expect("Row exists");
    assert_eq!(row.name, "Acme Europe");
    assert!(row.city.is_none());
    assert!(row.updated_at >= row.created_at);

    let missing = Organization::update(&pool, 999, &OrganizationInput::default()).await.unwrap();
    assert!(!missing);
}

#[tokio::test]
async fn test_user_email_lookup_and_uniqueness() {
    let pool = setup().await;
    let id = User::create(&pool, &new_user("jane@example.com")).await.unwrap();

    assert!(User::email_taken(&pool, "jane@example.com", None).await.unwrap());
    assert!(!User::email_taken(&pool, "jane@example.com", Some(id)).await.unwrap());
    assert!(!User::email_taken(&pool, "john@example.com", None).await.unwrap());

    User::soft_delete(&pool, id).await.unwrap();
    assert!(User::find_active_by_email(&pool, "jane@example.com").await.unwrap().is_none());
    assert!(User::find_active_by_id(&pool, id).await.unwrap().is_none());
    assert!(User::find_by_id(&pool, id).await.unwrap().is_some());

    // Deleted users still hold their address
    assert!(User::email_taken(&pool, "jane@example.com", None).await.unwrap());
    assert!(User::create(&pool, &new_user("jane@example.com")).await.is_err());
}

#[tokio::test]
async fn test_user_update_keeps_password_unless_given() {
    let pool = setup().await;
    let id = User::create(&pool, &new_user("jane@example.com")).await.unwrap();
    let before = User::find_by_id(&pool, id).await.unwrap().expect("User exists");

    let mut update = UpdateUser {
        first_name: "Jane".to_string(),
        last_name: "Smith".to_string(),
        email: "jane@example.com".to_string(),
        password_hash: None,
        owner: true,
        photo: None,
    };
    assert!(User::update(&pool, id, &update).await.unwrap());

    let after = User::find_by_id(&pool, id).await.unwrap().expect("User exists");
    assert_eq!(after.password, before.password);
    assert_eq!(after.first_name, "Jane");
    assert!(after.is_owner());

    update.password_hash = Some("$argon2id$new".to_string());
    User::update(&pool, id, &update).await.unwrap();
    let changed = User::find_by_id(&pool, id).await.unwrap().expect("User exists");
    assert_eq!(changed.password, "$argon2id$new");
}

#[tokio::test]
async fn test_user_list_order_and_search() {
    let pool = setup().await;
    for (first, last, email) in [
        ("Zed", "Adams", "zed@example.com"),
        ("Amy", "Brown", "amy@example.com"),
        ("Bea", "Adams", "bea@other.org"),
    ] {
        User::create(
            &pool,
            &CreateUser {
                first_name: first.to_string(),
                last_name: last.to_string(),
                ..new_user(email)
            },
        )
        .await
        .unwrap();
    }

    let (rows, _) = User::paginate(&pool, &ListFilters::default(), 1, PER_PAGE).await.unwrap();
    let names: Vec<&str> = rows.iter().map(|u| u.first_name.as_str()).collect();
    assert_eq!(names, ["Bea", "Zed", "Amy"]);

    let (rows, total) = User::paginate(&pool, &ListFilters::new("other.org", TrashedFilter::Active), 1, PER_PAGE)
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(rows[0].first_name, "Bea");
}

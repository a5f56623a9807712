//! End-to-end agent provisioning tests. These need a MongoDB replica set on
//! localhost:27017 (transactions are not available on standalone servers),
//! so they are ignored by default:
//!
//! ```text
//! cargo test --test provisioning_test -- --ignored
//! ```

mod common;

use common::TestApp;
use mongodb::bson::doc;
use recruitment_service::models::{Country, Role, StoredAsset, User};
use recruitment_service::utils::password::hash_password;
use serde_json::{json, Value};

async fn seed_country_and_role(app: &TestApp, country_name: &str) -> String {
    let role = Role::new("agent");
    app.db
        .roles()
        .insert_one(&role, None)
        .await
        .expect("seed agent role");

    let country = Country::new(
        country_name.to_string(),
        country_name.to_string(),
        vec!["deskripsi".to_string()],
        vec!["description".to_string()],
        StoredAsset {
            url: "http://localhost:8080/storage/images/flag.png".to_string(),
            public_id: Some("images/flag.png".to_string()),
        },
    );
    app.db
        .countries()
        .insert_one(&country, None)
        .await
        .expect("seed country");
    country.id.to_hex()
}

fn agent_payload(country_id: &str, name: &str, email: &str) -> Value {
    json!({
        "agent_name": name,
        "agent_email": email,
        "agent_phone_number": "+628123456789",
        "country": country_id,
    })
}

#[tokio::test]
#[ignore = "requires a running MongoDB replica set"]
async fn provisioning_creates_profile_detail_and_account() {
    let app = TestApp::spawn().await;
    let country_id = seed_country_and_role(&app, "japan").await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/api/agents", app.address))
        .json(&agent_payload(&country_id, "acme", "acme@example.com"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["agent_name"], "acme");
    assert_eq!(body["country"]["name_en"], "japan");
    assert_eq!(body["agent_detail"]["agent_email"], "acme@example.com");
    assert_eq!(
        body["message"],
        "Agent created along with user account (acme@example.com)"
    );

    // The login account exists, is active and is linked to the agent.
    let user = app
        .db
        .users()
        .find_one(doc! { "email": "acme@example.com" }, None)
        .await
        .unwrap()
        .expect("provisioned account");
    assert!(user.status);
    assert!(user.agent.is_some());

    app.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB replica set"]
async fn provisioned_agent_can_log_in_with_the_default_password() {
    let app = TestApp::spawn().await;
    let country_id = seed_country_and_role(&app, "korea").await;

    let client = reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .unwrap();
    client
        .post(format!("{}/api/agents", app.address))
        .json(&agent_payload(&country_id, "globex", "globex@example.com"))
        .send()
        .await
        .unwrap();

    let login = client
        .post(format!("{}/api/login", app.address))
        .json(&json!({
            "email": "globex@example.com",
            "password": common::AGENT_DEFAULT_PASSWORD,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(login.status(), 200);

    let me = client
        .get(format!("{}/api/me", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(me.status(), 200);
    let body: Value = me.json().await.unwrap();
    assert_eq!(body["email"], "globex@example.com");
    assert_eq!(body["role"]["role_name"], "agent");

    app.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB replica set"]
async fn duplicate_agent_name_is_a_conflict() {
    let app = TestApp::spawn().await;
    let country_id = seed_country_and_role(&app, "taiwan").await;

    let client = reqwest::Client::new();
    let first = client
        .post(format!("{}/api/agents", app.address))
        .json(&agent_payload(&country_id, "initech", "first@example.com"))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), 201);

    let second = client
        .post(format!("{}/api/agents", app.address))
        .json(&agent_payload(&country_id, "initech", "second@example.com"))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), 409);

    app.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB replica set"]
async fn duplicate_agent_email_is_a_conflict() {
    let app = TestApp::spawn().await;
    let country_id = seed_country_and_role(&app, "vietnam").await;

    let client = reqwest::Client::new();
    let first = client
        .post(format!("{}/api/agents", app.address))
        .json(&agent_payload(&country_id, "wayne", "shared@example.com"))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), 201);

    // Same contact email under a different agent name.
    let second = client
        .post(format!("{}/api/agents", app.address))
        .json(&agent_payload(&country_id, "stark", "shared@example.com"))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), 409);

    // An email already used by a plain login account also blocks provisioning.
    let admin_role = Role::new("admin");
    app.db.roles().insert_one(&admin_role, None).await.unwrap();
    let user = User::new(
        "taken@example.com".to_string(),
        hash_password("whatever").unwrap(),
        admin_role.id,
        None,
        true,
    );
    app.db.users().insert_one(&user, None).await.unwrap();

    let third = client
        .post(format!("{}/api/agents", app.address))
        .json(&agent_payload(&country_id, "oscorp", "taken@example.com"))
        .send()
        .await
        .unwrap();
    assert_eq!(third.status(), 409);

    // Only the first agent made it in; the conflicts wrote nothing.
    assert_eq!(app.db.agents().count_documents(None, None).await.unwrap(), 1);
    assert_eq!(
        app.db.agent_details().count_documents(None, None).await.unwrap(),
        1
    );

    app.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB replica set"]
async fn seeded_superadmin_can_log_in() {
    let app = TestApp::spawn().await;

    let role = Role::new("superadmin");
    app.db.roles().insert_one(&role, None).await.unwrap();
    let user = User::new(
        "superuser@example.com".to_string(),
        hash_password("supersecret").unwrap(),
        role.id,
        None,
        true,
    );
    app.db.users().insert_one(&user, None).await.unwrap();

    let client = reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .unwrap();
    let login = client
        .post(format!("{}/api/login", app.address))
        .json(&json!({
            "email": "superuser@example.com",
            "password": "supersecret",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(login.status(), 200);

    let me = client
        .get(format!("{}/api/me", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(me.status(), 200);
    let body: Value = me.json().await.unwrap();
    assert_eq!(body["email"], "superuser@example.com");
    assert_eq!(body["role"]["role_name"], "superadmin");

    app.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB replica set"]
async fn agent_listing_projects_requested_fields() {
    let app = TestApp::spawn().await;
    let country_id = seed_country_and_role(&app, "thailand").await;

    let client = reqwest::Client::new();
    let created = client
        .post(format!("{}/api/agents", app.address))
        .json(&agent_payload(&country_id, "cyberdyne", "cyberdyne@example.com"))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status(), 201);

    let listed = client
        .get(format!("{}/api/agents?fields=agent_name", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(listed.status(), 200);

    let body: Value = listed.json().await.unwrap();
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["agent_name"], "cyberdyne");
    // Unrequested fields are dropped; the id always survives projection.
    assert!(items[0]["id"].is_string());
    assert!(items[0].get("country").is_none());
    assert!(items[0].get("agent_detail").is_none());

    app.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB replica set"]
async fn unknown_country_fails_before_anything_is_written() {
    let app = TestApp::spawn().await;
    seed_country_and_role(&app, "malaysia").await;

    let client = reqwest::Client::new();
    let missing = client
        .post(format!("{}/api/agents", app.address))
        .json(&agent_payload(
            "64f0aa11bb22cc33dd44ee55",
            "umbrella",
            "umbrella@example.com",
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), 404);

    let invalid = client
        .post(format!("{}/api/agents", app.address))
        .json(&agent_payload("not-an-object-id", "umbrella", "umbrella@example.com"))
        .send()
        .await
        .unwrap();
    assert_eq!(invalid.status(), 400);

    let agents = app.db.agents().count_documents(None, None).await.unwrap();
    assert_eq!(agents, 0);

    app.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB replica set"]
async fn deleting_an_agent_removes_the_detail_and_account() {
    let app = TestApp::spawn().await;
    let country_id = seed_country_and_role(&app, "singapore").await;

    let client = reqwest::Client::new();
    let created: Value = client
        .post(format!("{}/api/agents", app.address))
        .json(&agent_payload(&country_id, "hooli", "hooli@example.com"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let agent_id = created["id"].as_str().unwrap().to_string();

    let deleted = client
        .delete(format!("{}/api/agents/{}", app.address, agent_id))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), 200);

    assert_eq!(app.db.agents().count_documents(None, None).await.unwrap(), 0);
    assert_eq!(
        app.db.agent_details().count_documents(None, None).await.unwrap(),
        0
    );
    assert_eq!(
        app.db
            .users()
            .count_documents(doc! { "email": "hooli@example.com" }, None)
            .await
            .unwrap(),
        0
    );

    app.cleanup().await;
}

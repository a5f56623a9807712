//! One-shot seeder that resets roles and bootstrap accounts.
//!
//! Run with `cargo run --bin seed`. Wipes the `roles` and `users`
//! collections before inserting, so it is for fresh environments only.

use recruitment_service::config::RecruitmentConfig;
use recruitment_service::models::role::Role;
use recruitment_service::models::user::User;
use recruitment_service::services::database::MongoDb;
use recruitment_service::utils::password::hash_password;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = RecruitmentConfig::from_env()?;
    init_tracing("seed", &config.log_level);

    let db = MongoDb::connect(&config.mongodb.uri, &config.mongodb.database).await?;

    db.roles().delete_many(mongodb::bson::doc! {}, None).await?;
    db.users().delete_many(mongodb::bson::doc! {}, None).await?;
    tracing::info!("Cleared roles and users collections");

    let mut role_ids = std::collections::HashMap::new();
    for name in ["superadmin", "admin", "agent"] {
        let role = Role::new(name);
        let result = db.roles().insert_one(&role, None).await?;
        let id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| anyhow::anyhow!("inserted role id was not an ObjectId"))?;
        role_ids.insert(name, id);
        tracing::info!(role = name, "Seeded role");
    }

    let accounts = [
        ("superuser@example.com", "supersecret", "superadmin"),
        ("admin@example.com", "admin123", "admin"),
    ];
    for (email, password, role_name) in accounts {
        let hash = hash_password(password)?;
        let user = User::new(email.to_string(), hash, role_ids[role_name], None, true);
        db.users().insert_one(&user, None).await?;
        tracing::info!(email, role = role_name, "Seeded account");
    }

    tracing::info!("Seeding complete");
    Ok(())
}

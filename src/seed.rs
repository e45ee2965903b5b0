use crate::{
    error::AppResult,
    services::auth_service,
    store::{NewCategory, NewUser, Store},
};

const DEFAULT_CATEGORIES: [(&str, &str); 5] = [
    ("Electronics", "electronics"),
    ("Clothing", "clothing"),
    ("Home", "home"),
    ("Beauty", "beauty"),
    ("Sports", "sports"),
];

/// Seeds the default admin account and the starter categories. Safe to call
/// more than once; existing rows are left alone.
pub fn seed_defaults(store: &dyn Store) -> AppResult<()> {
    if store.user_by_username("admin").is_none() {
        let password =
            std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());
        let password_hash = auth_service::hash_password(&password)?;
        let admin = store.create_user(NewUser {
            username: "admin".to_string(),
            email: "admin@shopsmart.com".to_string(),
            password_hash,
            name: Some("Admin User".to_string()),
            is_admin: true,
        });
        tracing::info!(user_id = admin.id, "seeded admin user");
    }

    for (name, slug) in DEFAULT_CATEGORIES {
        if store.category_by_slug(slug).is_none() {
            store.create_category(NewCategory {
                name: name.to_string(),
                slug: slug.to_string(),
            });
        }
    }

    Ok(())
}

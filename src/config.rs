use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub profile: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let profile = env::var("PROFILE").unwrap_or_else(|_| "default".to_string());

        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| {
            if profile == "default" {
                "sqlite://studienplaner.db?mode=rwc".to_string()
            } else {
                format!("sqlite://studienplaner_{}.db?mode=rwc", profile)
            }
        });

        Self {
            database_url,
            profile,
        }
    }
}

use sqlx::MySqlPool;
use sqlx::mysql::MySqlPoolOptions;

pub async fn init_db(database_url: &str) -> MySqlPool {
    // Connect lazily so the service comes up even if MySQL is briefly away;
    // usage lookups then degrade to "usage unknown".
    MySqlPoolOptions::new()
        .max_connections(10)
        .connect_lazy(database_url)
        .expect("DATABASE_URL is not a valid MySQL URL")
}

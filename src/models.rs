/// A stored long URL from the `urls` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Link {
    pub id: i64,
    pub url: String,
}

/// One recorded resolution from the `hits` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Hit {
    pub id: i64,
    pub url_id: i64,
    pub ip: String,
    /// Access time as Unix epoch seconds.
    pub access_time: i64,
}

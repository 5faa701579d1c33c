pub struct Env {
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub frontend_url: String,
    pub ip: String,
    pub port: u16,
    pub workers: usize,
}

impl Env {
    fn new() -> Self {
        let database_url = std::env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty());

        let db_max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .expect("DB_MAX_CONNECTIONS must be a valid u32 integer");

        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());
        let ip = std::env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .expect("PORT must be a valid u16 integer");
        let workers = std::env::var("WORKERS")
            .unwrap_or_else(|_| "2".to_string())
            .parse::<usize>()
            .expect("WORKERS must be a valid usize integer");
        Env { database_url, db_max_connections, frontend_url, ip, port, workers }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

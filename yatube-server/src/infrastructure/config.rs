use crate::application::pagination::PageSize;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Optional so that `serve --in-memory` can run without PostgreSQL.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub cors_origins: Vec<String>,
    /// Shared by every listing route.
    pub posts_per_page: PageSize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid PORT: {}", e))?;
        let database_url = std::env::var("DATABASE_URL").ok();
        let jwt_secret =
            std::env::var("JWT_SECRET").map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?;
        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".into()),
        );
        let posts_per_page = parse_page_size(std::env::var("POSTS_PER_PAGE").ok().as_deref())?;

        Ok(Self {
            host,
            port,
            database_url,
            jwt_secret,
            cors_origins,
            posts_per_page,
        })
    }

    pub fn require_database_url(&self) -> anyhow::Result<&str> {
        self.database_url
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_page_size(raw: Option<&str>) -> anyhow::Result<PageSize> {
    match raw {
        None => Ok(PageSize::default()),
        Some(value) => value
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(PageSize::new)
            .ok_or_else(|| anyhow::anyhow!("invalid POSTS_PER_PAGE: {value}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_defaults_to_ten() {
        assert_eq!(parse_page_size(None).unwrap().get(), 10);
        assert_eq!(parse_page_size(Some(" 25 ")).unwrap().get(), 25);
    }

    #[test]
    fn page_size_rejects_zero_and_garbage() {
        assert!(parse_page_size(Some("0")).is_err());
        assert!(parse_page_size(Some("ten")).is_err());
    }

    #[test]
    fn origins_are_trimmed_and_non_empty() {
        assert_eq!(
            parse_origins(" http://a.test , ,http://b.test"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }
}

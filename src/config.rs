use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_name: String,
    pub max_connections: u32,
    pub auto_migrate: bool,
    pub server_host: String,
    pub server_port: u16,
    pub image_store: ImageStoreConfig,
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStoreKind {
    Local,
    Cloudinary,
}

impl FromStr for ImageStoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(ImageStoreKind::Local),
            "cloudinary" | "remote" => Ok(ImageStoreKind::Cloudinary),
            other => Err(anyhow::anyhow!(
                "Unknown IMAGE_STORE '{}': expected 'local' or 'cloudinary'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ImageStoreConfig {
    Local {
        upload_dir: PathBuf,
        public_path: String,
    },
    Cloudinary(CloudinaryConfig),
}

#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: String,
    pub api_base: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_name = env::var("DB_DATABASE").unwrap_or_else(|_| "schooldb".to_string());

        // Build database_url from individual fields or use DATABASE_URL if provided
        let database_url = if let Ok(url) = env::var("DATABASE_URL") {
            url
        } else {
            let db_host = env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string());
            let db_port = env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string());
            let db_user = env::var("DB_USER").unwrap_or_else(|_| "postgres".to_string());
            let db_password = env::var("DB_PASSWORD").unwrap_or_else(|_| "postgres".to_string());

            // URL-encode password to handle special characters
            let encoded_password = urlencoding::encode(&db_password);

            format!(
                "postgres://{}:{}@{}:{}/{}",
                db_user, encoded_password, db_host, db_port, database_name
            )
        };

        let max_connections = parse_var("DB_MAX_CONNECTIONS", 10);
        let auto_migrate = parse_var("DB_AUTO_MIGRATE", true);

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let server_port = parse_var("SERVER_PORT", 3000);

        let kind: ImageStoreKind = env::var("IMAGE_STORE")
            .unwrap_or_else(|_| "local".to_string())
            .parse()?;

        let image_store = match kind {
            ImageStoreKind::Local => ImageStoreConfig::Local {
                upload_dir: env::var("UPLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("public/schoolImages")),
                public_path: public_path(
                    env::var("PUBLIC_PATH").unwrap_or_else(|_| "/schoolImages".to_string()),
                )?,
            },
            ImageStoreKind::Cloudinary => ImageStoreConfig::Cloudinary(CloudinaryConfig {
                cloud_name: required_var("CLOUDINARY_CLOUD_NAME")?,
                api_key: required_var("CLOUDINARY_API_KEY")?,
                api_secret: required_var("CLOUDINARY_API_SECRET")?,
                folder: env::var("CLOUDINARY_FOLDER").unwrap_or_else(|_| "school_images".to_string()),
                api_base: env::var("CLOUDINARY_API_BASE")
                    .unwrap_or_else(|_| "https://api.cloudinary.com/v1_1".to_string()),
            }),
        };

        let max_body_bytes = parse_var("MAX_BODY_BYTES", 8 * 1024 * 1024);

        Ok(Config {
            database_url,
            database_name,
            max_connections,
            auto_migrate,
            server_host,
            server_port,
            image_store,
            max_body_bytes,
        })
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.server_host, self.server_port);
        addr.parse().map_err(|e| anyhow::anyhow!("Invalid socket address: {}", e))
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Uploads are nested under this prefix, so it must be an absolute path
/// below the root.
fn public_path(value: String) -> anyhow::Result<String> {
    let value = value.trim();
    if !value.starts_with('/') {
        anyhow::bail!("PUBLIC_PATH must start with '/', got {:?}", value);
    }

    let trimmed = value.trim_end_matches('/');
    if trimmed.is_empty() {
        anyhow::bail!("PUBLIC_PATH cannot be the site root");
    }

    Ok(trimmed.to_string())
}

fn required_var(name: &str) -> anyhow::Result<String> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("{} must be set when IMAGE_STORE=cloudinary", name))
}

const DEFAULT_ENDPOINT: &str = "0.0.0.0:8080";

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StoreBackend {
    Memory,
    Postgresql { database_url: String },
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServiceConfig {
    pub endpoint: String,
    pub store: StoreBackend,
}

impl ServiceConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| dotenvy::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let endpoint = lookup("ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_owned());
        let database_url = lookup("DATABASE_URL");

        let store_name = match lookup("STORE") {
            Some(store) => store.to_ascii_lowercase(),
            None if database_url.is_some() => "postgresql".to_owned(),
            None => "memory".to_owned(),
        };

        let store = match store_name.as_str() {
            "memory" => StoreBackend::Memory,
            "postgresql" | "postgres" => match database_url {
                Some(database_url) => StoreBackend::Postgresql { database_url },
                None => {
                    return Err(anyhow::anyhow!(
                        "DATABASE_URL must be set for the postgresql store"
                    ))
                }
            },
            other => return Err(anyhow::anyhow!("unknown STORE {}", other)),
        };

        Ok(ServiceConfig { endpoint, store })
    }
}

use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat, builder::DefaultState};

const ENV_PREFIX: &str = "GESTOR_PIX";

#[derive(Clone, Debug, serde::Deserialize)]
pub struct GestorPixConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub debug: bool,
}

impl GestorPixConfig {
    pub fn from_file(config_path: &str) -> Result<Self, ConfigError> {
        Self::build(
            Config::builder().add_source(File::new(config_path, FileFormat::Toml)),
            environment(),
        )
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Self::build(
            Config::builder().add_source(File::from_str(contents, FileFormat::Toml)),
            environment(),
        )
    }

    // Environment always wins over the file.
    fn build(
        builder: ConfigBuilder<DefaultState>,
        environment: Environment,
    ) -> Result<Self, ConfigError> {
        let config: GestorPixConfig = builder
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        Ok(config)
    }
}

/// `GESTOR_PIX__API__BASE_URL` overrides `api.base_url`, and so on.
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX).separator("__")
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_resource")]
    pub resource: String,
}

fn default_resource() -> String {
    "clientepix".to_string()
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct LoggingConfig {
    pub directory: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            directory: "logs".to_string(),
        }
    }
}

use time::UtcOffset;

use super::parsing::{
    env_optional, env_or_default, parse_bool, parse_cors_origins, parse_environment, parse_i64,
    parse_u16, parse_u64, parse_utc_offset,
};
use super::secret::load_or_create_secret_key;
use super::types::{
    AdminSettings, ApiSettings, ConfigError, CorsSettings, DatabaseSettings, ExternalApiSettings,
    LocaleSettings, RedisSettings, RuntimeSettings, SecuritySettings, ServerHost, ServerPort,
    ServerSettings, Settings, TelemetrySettings,
};

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let host = env_or_default("TUTORIAS_HOST", "0.0.0.0");
        let port = env_or_default("TUTORIAS_PORT", "8000");

        let environment = parse_environment(
            env_optional("TUTORIAS_ENV").or_else(|| env_optional("ENVIRONMENT")),
        );
        let strict_config =
            env_optional("TUTORIAS_STRICT_CONFIG").map(|value| parse_bool(&value)).unwrap_or(false)
                || environment.is_production();
        let debug = env_optional("DEBUG")
            .map(|value| parse_bool(&value))
            .unwrap_or(!environment.is_production());

        let project_name = env_or_default("PROJECT_NAME", "INACAP Tutorías API");
        let version = env_or_default("VERSION", env!("CARGO_PKG_VERSION"));
        let api_v1_str = env_or_default("API_V1_STR", "/api/v1");
        let page_size = parse_i64("PAGE_SIZE", env_or_default("PAGE_SIZE", "10"))?;

        let secret_key = match env_optional("SECRET_KEY") {
            Some(value) => value,
            None => load_or_create_secret_key(),
        };
        let algorithm = env_or_default("ALGORITHM", "HS256");
        let session_cookie_age_seconds =
            parse_u64("SESSION_COOKIE_AGE", env_or_default("SESSION_COOKIE_AGE", "86400"))?;
        let idle_timeout_minutes =
            parse_u64("IDLE_TIMEOUT_MINUTES", env_or_default("IDLE_TIMEOUT_MINUTES", "30"))?;

        let cors_origins = parse_cors_origins(
            env_optional("BACKEND_CORS_ORIGINS").or_else(|| env_optional("ALLOWED_HOSTS")),
        )?;

        let postgres_server = env_or_default("POSTGRES_SERVER", "localhost");
        let postgres_port = parse_u16("POSTGRES_PORT", env_or_default("POSTGRES_PORT", "5432"))?;
        let postgres_user = env_or_default("POSTGRES_USER", "postgres");
        let postgres_password = env_or_default("POSTGRES_PASSWORD", "");
        let postgres_db = env_or_default("POSTGRES_DB", "inacap_tutorias");
        let database_url = env_optional("DATABASE_URL");
        let max_connections = parse_u16(
            "DATABASE_MAX_CONNECTIONS",
            env_or_default("DATABASE_MAX_CONNECTIONS", "20"),
        )?;
        let acquire_timeout_seconds = parse_u64(
            "DATABASE_ACQUIRE_TIMEOUT_SECONDS",
            env_or_default("DATABASE_ACQUIRE_TIMEOUT_SECONDS", "30"),
        )?;

        let redis_host = env_or_default("REDIS_HOST", "localhost");
        let redis_port = parse_u16("REDIS_PORT", env_or_default("REDIS_PORT", "6379"))?;
        let redis_db = parse_u16("REDIS_DB", env_or_default("REDIS_DB", "0"))?;
        let redis_password = env_or_default("REDIS_PASSWORD", "");

        let utc_offset =
            parse_utc_offset("LOCAL_UTC_OFFSET", env_or_default("LOCAL_UTC_OFFSET", "-03:00"))?;

        let countries_url = env_or_default(
            "COUNTRIES_API_URL",
            "https://restcountries.com/v3.1/region/south%20america",
        );
        let jsonplaceholder_url =
            env_or_default("JSONPLACEHOLDER_API_URL", "https://jsonplaceholder.typicode.com");
        let external_timeout_seconds = parse_u64(
            "EXTERNAL_API_TIMEOUT_SECONDS",
            env_or_default("EXTERNAL_API_TIMEOUT_SECONDS", "10"),
        )?;

        let first_superuser_rut = env_or_default("FIRST_SUPERUSER_RUT", "11111111-1");
        let first_superuser_password = env_or_default("FIRST_SUPERUSER_PASSWORD", "");

        let log_level = env_or_default("TUTORIAS_LOG_LEVEL", "info");
        let json = env_optional("TUTORIAS_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);
        let prometheus_enabled =
            env_optional("PROMETHEUS_ENABLED").map(|value| parse_bool(&value)).unwrap_or(false);

        let settings = Self {
            server: ServerSettings {
                host: ServerHost::parse(host)?,
                port: ServerPort::parse(port)?,
            },
            runtime: RuntimeSettings { environment, strict_config, debug },
            api: ApiSettings { project_name, version, api_v1_str, page_size },
            security: SecuritySettings {
                secret_key,
                algorithm,
                session_cookie_age_seconds,
                idle_timeout_minutes,
                secure_cookies: !debug,
            },
            cors: CorsSettings { origins: cors_origins },
            database: DatabaseSettings {
                postgres_server,
                postgres_port,
                postgres_user,
                postgres_password,
                postgres_db,
                database_url,
                max_connections: u32::from(max_connections.max(1)),
                acquire_timeout_seconds,
            },
            redis: RedisSettings {
                host: redis_host,
                port: redis_port,
                db: redis_db,
                password: redis_password,
            },
            locale: LocaleSettings { utc_offset },
            external_api: ExternalApiSettings {
                countries_url,
                jsonplaceholder_url,
                timeout_seconds: external_timeout_seconds,
            },
            admin: AdminSettings { first_superuser_rut, first_superuser_password },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
        };

        settings.validate()?;
        Ok(settings)
    }

    pub(crate) fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host.0, self.server.port.0)
    }

    pub(crate) fn server_host(&self) -> &str {
        &self.server.host.0
    }

    pub(crate) fn server_port(&self) -> u16 {
        self.server.port.0
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn security(&self) -> &SecuritySettings {
        &self.security
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub(crate) fn redis(&self) -> &RedisSettings {
        &self.redis
    }

    pub(crate) fn local_offset(&self) -> UtcOffset {
        self.locale.utc_offset
    }

    pub(crate) fn external_api(&self) -> &ExternalApiSettings {
        &self.external_api
    }

    pub(crate) fn admin(&self) -> &AdminSettings {
        &self.admin
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api.page_size <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "PAGE_SIZE",
                value: self.api.page_size.to_string(),
            });
        }

        if self.security.idle_timeout_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "IDLE_TIMEOUT_MINUTES",
                value: "0".to_string(),
            });
        }

        if self.security.session_cookie_age_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "SESSION_COOKIE_AGE",
                value: "0".to_string(),
            });
        }

        if self.external_api.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "EXTERNAL_API_TIMEOUT_SECONDS",
                value: "0".to_string(),
            });
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        if self.runtime.debug {
            return Err(ConfigError::DebugInProduction);
        }

        if self.database.database_url.is_none() && self.database.postgres_password.is_empty() {
            return Err(ConfigError::MissingSecret("POSTGRES_PASSWORD"));
        }

        if self.admin.first_superuser_password.is_empty() {
            return Err(ConfigError::MissingSecret("FIRST_SUPERUSER_PASSWORD"));
        }

        Ok(())
    }
}

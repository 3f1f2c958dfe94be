//! Integration tests for the environment layer.
//!
//! These tests build environments from `.env` files and settings files on
//! disk and read URL settings through them.

use std::fs;

use envurl::env::{EnvSettings, SETTINGS_FILE_NAME};
use envurl::prelude::*;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) {
    fs::write(dir.path().join(name), content).unwrap();
}

/// Test a settings module style setup from a .env file
#[test]
fn test_settings_from_dotenv() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        ".env",
        "DJANGO_DEBUG=True\n\
         DJANGO_ALLOWED_HOSTS=\"example.com, api.example.com\"\n\
         DATABASE_URL=postgres://app:secret@db/app?conn_max_age=600\n\
         CACHE_URL=redis://cache-1:6379/0,redis://cache-2:6379/0\n\
         EMAIL_URL=smtp+tls://mailer:pw@smtp.example.com\n",
    );

    let env = Env::with_source(MapEnvSource::new())
        .with_prefix("DJANGO_")
        .with_dotenv(DotEnv::discover(dir.path(), ".env", false).unwrap().unwrap());

    assert!(env.bool("DEBUG"));
    assert_eq!(env.list("ALLOWED_HOSTS"), vec!["example.com", "api.example.com"]);

    let db = env.database_url(None, &UrlArgs::new()).unwrap();
    assert_eq!(db.get_str("NAME"), Some("app"));
    assert_eq!(db.get_str("CONN_MAX_AGE"), Some("600"));

    let cache = env.cache_url(None, &UrlArgs::new()).unwrap();
    assert_eq!(
        cache.get("LOCATION"),
        Some(&ConfigValue::from(vec!["redis://cache-1:6379/0", "redis://cache-2:6379/0"]))
    );

    let email = env.email_url(None, &UrlArgs::new()).unwrap();
    assert_eq!(email.get_str("EMAIL_HOST_USER"), Some("mailer"));
    assert_eq!(email.get_int("EMAIL_PORT"), Some(587));
}

/// Test that process values beat .env values unless overwrite is set
#[test]
fn test_overwrite_precedence() {
    let dotenv = DotEnv::from_reader("QUEUE_URL=rabbitmq://from-file\n".as_bytes()).unwrap();
    let source = MapEnvSource::new().set("QUEUE_URL", "rabbitmq://from-process");

    let env = Env::with_source(source.clone()).with_dotenv(dotenv.clone());
    let queue = env.queue_url(None, &UrlArgs::new()).unwrap();
    assert_eq!(queue.get_str("RABBITMQ_HOST"), Some("from-process"));

    let env = Env::with_source(source).with_dotenv(dotenv).overwrite(true);
    let queue = env.queue_url(None, &UrlArgs::new()).unwrap();
    assert_eq!(queue.get_str("RABBITMQ_HOST"), Some("from-file"));
}

/// Test building an environment from envurl.toml
#[test]
fn test_settings_file() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        SETTINGS_FILE_NAME,
        r#"
        prefix = "SVC_"
        env_file = "service.env"
        search_parents = false

        [urls]
        search = "SVC_SEARCH"
        "#,
    );
    write(&dir, "service.env", "SVC_SEARCH=whoosh:///var/index?STORAGE=file\n");

    let settings = EnvSettings::from_file(dir.path().join(SETTINGS_FILE_NAME)).unwrap();
    let env = Env::with_source(MapEnvSource::new())
        .apply_settings(&settings, dir.path())
        .unwrap();

    assert_eq!(env.prefix(), Some("SVC_"));
    let search = env.search_url(None, &UrlArgs::new()).unwrap();
    assert_eq!(search.get_str("NAME"), Some("/var/index"));
    assert_eq!(search.get_str("STORAGE"), Some("file"));
}

/// Test deferred settings resolved after the environment is assembled
#[test]
fn test_deferred_settings() {
    let mut env = Env::with_source(
        MapEnvSource::new()
            .set("APP_WORKERS", "3")
            .set("APP_DATABASE_URL", "mysql://root@localhost/shop"),
    )
    .with_prefix("APP_");

    let settings = [
        ("WORKERS", DeferredSetting::of(ValueKind::Int)),
        ("DEBUG", DeferredSetting::of(ValueKind::Bool).default_value("off")),
        (
            "DATABASES",
            DeferredSetting::of(ValueKind::Database).name("DATABASE_URL"),
        ),
    ];

    // values set after declaration are picked up on resolution
    env.set("APP_WORKERS", "5");

    let mut resolver = SettingsResolver::new(&env);
    let resolved = resolver
        .resolve_all(settings.iter().map(|(name, setting)| (*name, setting)))
        .unwrap();

    assert_eq!(resolved.get("WORKERS"), Some(&ConfigValue::Int(5)));
    assert_eq!(resolved.get("DEBUG"), Some(&ConfigValue::Bool(false)));
    let db = resolved.get("DATABASES").and_then(ConfigValue::as_map).unwrap();
    assert_eq!(db.get_str("ENGINE"), Some("django.db.backends.mysql"));
    assert!(resolver.cached("APP_DATABASE_URL", ValueKind::Database).is_some());
}

/// Test that missing URL variables surface a clear error
#[test]
fn test_missing_url_variable() {
    let env = Env::with_source(MapEnvSource::new()).with_prefix("APP_");
    let err = env.cache_url(None, &UrlArgs::new()).unwrap_err();
    assert!(err.is_missing());
    assert_eq!(err.to_string(), "Environment variable 'APP_CACHE_URL' is not set");

    let cache = env
        .cache_url(None, &UrlArgs::new().default_url("dummycache://localhost"))
        .unwrap();
    assert_eq!(cache.get_str("BACKEND"), Some("django.core.cache.backends.dummy.DummyCache"));
}

/// Test that malformed URLs are reported through the env error
#[test]
fn test_malformed_url_variable() {
    let env = Env::with_source(MapEnvSource::new().set("DATABASE_URL", "not a url"));
    let err = env.database_url(None, &UrlArgs::new()).unwrap_err();
    assert!(matches!(err, EnvError::Url(ref inner) if inner.is_malformed()));
}

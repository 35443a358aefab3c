// ABOUTME: Integration tests for configuration parsing and validation.
// ABOUTME: Tests hl.yml parsing, defaults, the home layout, and workspace loading.

use hl::config::*;
use hl::error::Error;
use hl::types::AppName;
use std::time::Duration;

mod parsing {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let yaml = r#"
app: recipes
image: registry.example/recipes
health:
  url: http://recipes:8080/healthz
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.app.as_str(), "recipes");
        assert_eq!(config.image.registry(), Some("registry.example"));
        assert_eq!(config.image.name(), "recipes");
        assert_eq!(config.network, "traefik_proxy");
        assert_eq!(config.platforms.head, "linux/amd64");
        assert_eq!(config.platforms.len(), 1);
        assert_eq!(config.health.interval, Duration::from_secs(2));
        assert_eq!(config.health.timeout, Duration::from_secs(45));
        assert_eq!(
            config.migrations.command.iter().collect::<Vec<_>>(),
            vec!["bin/rails", "db:migrate"]
        );
        assert!(config.migrations.env.is_empty());
        assert!(config.secrets.is_empty());
    }

    #[test]
    fn parse_full_config() {
        let yaml = r#"
app: recipes
image: registry.example/recipes
domain: recipes.example.com
servicePort: 8080
network: edge
platforms: linux/amd64, linux/arm64
health:
  url: http://recipes:8080/healthz?deep=1
  interval: 500ms
  timeout: 1m
migrations:
  command: ["bundle", "exec", "rake", "db:migrate"]
  env:
    RAILS_ENV: production
    DISABLE_SPRING: "1"
secrets:
  - RAILS_MASTER_KEY
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.domain.as_deref(), Some("recipes.example.com"));
        assert_eq!(config.service_port, Some(8080));
        assert_eq!(config.network, "edge");
        assert_eq!(
            config.platforms.iter().collect::<Vec<_>>(),
            vec!["linux/amd64", "linux/arm64"]
        );
        assert_eq!(config.health.interval, Duration::from_millis(500));
        assert_eq!(config.health.timeout, Duration::from_secs(60));
        assert_eq!(config.migrations.command.len(), 4);

        let env: Vec<String> = config
            .migrations
            .env
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(env, vec!["DISABLE_SPRING=1", "RAILS_ENV=production"]);
        assert_eq!(config.secrets, vec!["RAILS_MASTER_KEY"]);
    }

    #[test]
    fn platforms_accept_a_list() {
        let yaml = r#"
app: recipes
image: recipes
platforms: [linux/arm64]
health:
  url: http://recipes/up
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.platforms.head, "linux/arm64");
    }
}

mod validation {
    use super::*;

    fn parse(yaml: &str) -> hl::error::Result<AppConfig> {
        AppConfig::from_yaml(yaml)
    }

    #[test]
    fn missing_health_returns_error() {
        assert!(parse("app: recipes\nimage: recipes\n").is_err());
    }

    #[test]
    fn tagged_image_returns_error() {
        let yaml = r#"
app: recipes
image: recipes:v1
health:
  url: http://recipes/up
"#;
        assert!(parse(yaml).is_err());
    }

    #[test]
    fn bad_duration_returns_error() {
        let yaml = r#"
app: recipes
image: recipes
health:
  url: http://recipes/up
  interval: 2 seconds
"#;
        assert!(parse(yaml).is_err());
    }

    #[test]
    fn zero_interval_returns_error() {
        let yaml = r#"
app: recipes
image: recipes
health:
  url: http://recipes/up
  interval: 0s
"#;
        assert!(matches!(parse(yaml), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn https_health_url_returns_error() {
        let yaml = r#"
app: recipes
image: recipes
health:
  url: https://recipes.example.com/up
"#;
        assert!(parse(yaml).is_err());
    }

    #[test]
    fn empty_migration_command_returns_error() {
        let yaml = r#"
app: recipes
image: recipes
health:
  url: http://recipes/up
migrations:
  command: []
"#;
        assert!(parse(yaml).is_err());
    }

    #[test]
    fn invalid_env_key_returns_error() {
        let yaml = r#"
app: recipes
image: recipes
health:
  url: http://recipes/up
migrations:
  env:
    BAD-KEY: x
"#;
        assert!(parse(yaml).is_err());
    }

    #[test]
    fn empty_platforms_returns_error() {
        let yaml = r#"
app: recipes
image: recipes
platforms: ""
health:
  url: http://recipes/up
"#;
        assert!(parse(yaml).is_err());
    }
}

mod layout {
    use super::*;

    #[test]
    fn home_layout_paths() {
        let home = HlHome::new("/srv/prj");
        let app = AppName::new("recipes").unwrap();
        assert_eq!(
            home.app_dir(&app),
            std::path::PathBuf::from("/srv/prj/apps/recipes")
        );
        assert_eq!(
            home.git_dir(&app),
            std::path::PathBuf::from("/srv/prj/git/recipes.git")
        );
    }

    #[test]
    fn home_from_env_prefers_hl_home() {
        temp_env::with_vars(
            [(HOME_ENV_VAR, Some("/custom/hl")), ("HOME", Some("/home/op"))],
            || {
                let home = HlHome::from_env().unwrap();
                assert_eq!(home.root(), std::path::Path::new("/custom/hl"));
            },
        );
    }

    #[test]
    fn home_from_env_falls_back_to_prj() {
        temp_env::with_vars(
            [(HOME_ENV_VAR, None::<&str>), ("HOME", Some("/home/op"))],
            || {
                let home = HlHome::from_env().unwrap();
                assert_eq!(home.root(), std::path::Path::new("/home/op/prj"));
            },
        );
    }

    #[test]
    fn home_from_env_without_any_home_fails() {
        temp_env::with_vars(
            [(HOME_ENV_VAR, None::<&str>), ("HOME", None::<&str>)],
            || {
                assert!(matches!(HlHome::from_env(), Err(Error::NoHome)));
            },
        );
    }
}

mod workspace {
    use super::*;

    const YAML: &str = r#"
app: recipes
image: registry.example/recipes
health:
  url: http://recipes:8080/healthz
"#;

    fn write_app(home: &HlHome, app: &str, yaml: &str) {
        let dir = home.app_dir(&AppName::new(app).unwrap());
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(CONFIG_FILENAME), yaml).unwrap();
    }

    #[tokio::test]
    async fn load_reads_app_config() {
        let temp = tempfile::tempdir().unwrap();
        let home = HlHome::new(temp.path());
        write_app(&home, "recipes", YAML);

        let app = AppName::new("recipes").unwrap();
        let workspace = AppWorkspace::load(&home, &app).await.unwrap();
        assert_eq!(workspace.app(), &app);
        assert_eq!(workspace.dir, home.app_dir(&app));
        assert!(workspace.env_file().is_none());

        std::fs::write(workspace.dir.join(ENV_FILENAME), "SECRET=1\n").unwrap();
        assert_eq!(
            workspace.env_file(),
            Some(workspace.dir.join(ENV_FILENAME))
        );
    }

    #[tokio::test]
    async fn missing_config_is_not_found() {
        let temp = tempfile::tempdir().unwrap();
        let home = HlHome::new(temp.path());

        let err = AppWorkspace::load(&home, &AppName::new("ghost").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound(_)));
    }

    #[tokio::test]
    async fn invalid_yaml_is_invalid_config_with_path() {
        let temp = tempfile::tempdir().unwrap();
        let home = HlHome::new(temp.path());
        write_app(&home, "recipes", "app: [unterminated\n");

        let err = AppWorkspace::load(&home, &AppName::new("recipes").unwrap())
            .await
            .unwrap_err();
        match err {
            Error::InvalidConfig(msg) => assert!(msg.contains(CONFIG_FILENAME)),
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn app_name_mismatch_is_invalid_config() {
        let temp = tempfile::tempdir().unwrap();
        let home = HlHome::new(temp.path());
        write_app(&home, "theme", YAML);

        let err = AppWorkspace::load(&home, &AppName::new("theme").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}

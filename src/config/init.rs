// ABOUTME: Config scaffolding for new apps.
// ABOUTME: Creates the app directory and an hl.yml template.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::types::{AppName, ImageRef};

use super::{AppConfig, CONFIG_FILENAME, HlHome};

#[derive(Debug, Clone)]
pub struct InitOptions {
    pub app: AppName,
    pub image: String,
    pub domain: Option<String>,
    pub port: u16,
    pub network: String,
    pub force: bool,
}

/// Write `<home>/apps/<app>/hl.yml`. Returns the written path.
pub fn init_config(home: &HlHome, options: &InitOptions) -> Result<PathBuf> {
    let image =
        ImageRef::parse_repository(&options.image).map_err(|e| Error::InvalidInput(e.to_string()))?;

    let dir = home.app_dir(&options.app);
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !options.force {
        return Err(Error::AlreadyExists(config_path));
    }

    std::fs::create_dir_all(&dir)?;
    let yaml = generate_template_yaml(options, &image);

    // The template must round-trip through the loader.
    AppConfig::from_yaml(&yaml)?;

    std::fs::write(&config_path, yaml)?;
    Ok(config_path)
}

fn generate_template_yaml(options: &InitOptions, image: &ImageRef) -> String {
    let domain = options
        .domain
        .as_deref()
        .map(|d| format!("domain: {d}\n"))
        .unwrap_or_default();

    format!(
        r#"app: {app}
image: {image}
{domain}servicePort: {port}
network: {network}
platforms: linux/amd64
health:
  url: http://{app}:{port}/healthz
  interval: 2s
  timeout: 45s
migrations:
  command: ["bin/rails", "db:migrate"]
  env:
    RAILS_ENV: "production"
secrets:
  - RAILS_MASTER_KEY
  - SECRET_KEY_BASE
"#,
        app = options.app,
        image = image,
        domain = domain,
        port = options.port,
        network = options.network,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(app: &str) -> InitOptions {
        InitOptions {
            app: AppName::new(app).unwrap(),
            image: "registry.example/recipes".to_string(),
            domain: Some("recipes.example.com".to_string()),
            port: 8080,
            network: "traefik_proxy".to_string(),
            force: false,
        }
    }

    #[test]
    fn template_round_trips() {
        let opts = options("recipes");
        let image = ImageRef::parse_repository(&opts.image).unwrap();
        let config = AppConfig::from_yaml(&generate_template_yaml(&opts, &image)).unwrap();

        assert_eq!(config.app.as_str(), "recipes");
        assert_eq!(config.image.to_string(), "registry.example/recipes");
        assert_eq!(config.health.url.to_string(), "http://recipes:8080/healthz");
        assert_eq!(config.service_port, Some(8080));
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let temp = tempfile::tempdir().unwrap();
        let home = HlHome::new(temp.path());
        let mut opts = options("recipes");

        init_config(&home, &opts).unwrap();
        let err = init_config(&home, &opts).unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));

        opts.force = true;
        assert!(init_config(&home, &opts).is_ok());
    }

    #[test]
    fn rejects_tagged_image() {
        let temp = tempfile::tempdir().unwrap();
        let home = HlHome::new(temp.path());
        let mut opts = options("recipes");
        opts.image = "registry.example/recipes:v1".to_string();

        assert!(matches!(
            init_config(&home, &opts),
            Err(Error::InvalidInput(_))
        ));
    }
}

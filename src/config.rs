//! Dashboard configuration: defaults, then `dashboard.toml`, then `DASHBOARD_*` env vars.

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const CONFIG_FILE: &str = "dashboard.toml";
pub const ENV_PREFIX: &str = "DASHBOARD_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Raw CSV with `region,total,male,female` columns.
    pub csv_url: String,
    /// README location; GitHub contents API or raw markdown.
    pub readme_url: String,
    pub repository_url: String,
    /// Suggested file name for "Download CSV".
    pub download_file_name: String,
    pub dataset_year: u16,
    pub chart_title: String,
    pub request_timeout_secs: u64,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            csv_url: "https://raw.githubusercontent.com/TyuninaA/VercelTesting/177d66a2442bc9649fb8431a95f138e8b681965e/city_population.csv".to_string(),
            readme_url: "https://api.github.com/repos/TyuninaA/DoD/contents/README.md".to_string(),
            repository_url: "https://github.com/open-data-kazakhstan/city-population".to_string(),
            download_file_name: "city_population.csv".to_string(),
            dataset_year: 2022,
            chart_title: "City population of Kazakhstan by region".to_string(),
            request_timeout_secs: 30,
            window_width: 1400.0,
            window_height: 900.0,
        }
    }
}

impl DashboardConfig {
    fn figment() -> Figment {
        Figment::from(Serialized::defaults(DashboardConfig::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load configuration. A missing config file is not an error.
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults_without_file() {
        Jail::expect_with(|_jail| {
            let config = DashboardConfig::load()?;
            assert_eq!(config, DashboardConfig::default());
            assert_eq!(config.dataset_year, 2022);
            Ok(())
        });
    }

    #[test]
    fn test_file_and_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                r#"
                csv_url = "https://example.org/population.csv"
                dataset_year = 2023
                "#,
            )?;
            jail.set_env("DASHBOARD_DATASET_YEAR", "2024");

            let config = DashboardConfig::load()?;
            assert_eq!(config.csv_url, "https://example.org/population.csv");
            assert_eq!(config.dataset_year, 2024);
            assert_eq!(config.download_file_name, "city_population.csv");
            Ok(())
        });
    }

    #[test]
    fn test_invalid_value_is_reported() {
        Jail::expect_with(|jail| {
            jail.set_env("DASHBOARD_DATASET_YEAR", "not-a-year");
            assert!(DashboardConfig::load().is_err());
            Ok(())
        });
    }

    #[test]
    fn test_timeout_has_floor() {
        let config = DashboardConfig {
            request_timeout_secs: 0,
            ..DashboardConfig::default()
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(1));
    }
}

use std::{
    num::NonZeroUsize,
    path::{Path, PathBuf},
    time::Duration,
};

use eyre::Context as _;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use leaderboard_sdk::{
    constants::{DEFAULT_API_URL, HISTORY_PAGE_SIZE, RANKING_PAGE_SIZE, USERS_PAGE_SIZE},
    LeaderboardOptions,
};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use url::Url;

mod output;

pub use self::output::{DisplayOptions, OutputFormat};

/// Prefix of the environment variables read into the config.
pub const ENV_PREFIX: &str = "LEADERBOARD_";

/// CLI configuration.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API root of the leaderboard service.
    api_url: String,
    /// Output format.
    output: OutputFormat,
    /// How long an award stays visible.
    #[serde_as(as = "DisplayFromStr")]
    award_display: humantime::Duration,
    /// Per-request timeout.
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    request_timeout: Option<humantime::Duration>,
    /// Page sizes of the list surfaces.
    page_size: PageSizes,
}

/// Page sizes of the list surfaces.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSizes {
    /// User selection list.
    pub users: NonZeroUsize,
    /// Ranking overflow list.
    pub ranking: NonZeroUsize,
    /// Claim history.
    pub history: NonZeroUsize,
}

impl Default for PageSizes {
    fn default() -> Self {
        Self {
            users: USERS_PAGE_SIZE,
            ranking: RANKING_PAGE_SIZE,
            history: HISTORY_PAGE_SIZE,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            output: OutputFormat::default(),
            award_display: Duration::from_millis(2000).into(),
            request_timeout: None,
            page_size: PageSizes::default(),
        }
    }
}

/// Values given on the command line, taking precedence over everything else.
#[derive(Debug, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) api_url: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) output: Option<OutputFormat>,
}

impl Config {
    /// Load from defaults, the config file if it exists, the environment,
    /// then the command line.
    pub fn load(path: &Path, overrides: &Overrides) -> eyre::Result<Self> {
        let config: Self = Self::figment(path, overrides)
            .extract()
            .wrap_err_with(|| format!("failed to load config from `{}`", path.display()))?;
        config.api_url()?;
        Ok(config)
    }

    fn figment(path: &Path, overrides: &Overrides) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if path.exists() {
            figment = figment.merge(Toml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(Serialized::defaults(overrides))
    }

    /// Default config file path.
    pub fn default_path() -> eyre::Result<PathBuf> {
        use etcetera::BaseStrategy;

        let strategy = etcetera::choose_base_strategy()?;
        Ok(strategy.config_dir().join("leaderboard").join("config.toml"))
    }

    /// Resolve a user-given config path, expanding `~` and env vars.
    pub fn resolve_path(path: &str) -> eyre::Result<PathBuf> {
        Ok(PathBuf::from(shellexpand::full(path)?.into_owned()))
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> eyre::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Get the API root.
    pub fn api_url(&self) -> eyre::Result<Url> {
        Url::parse(&self.api_url).wrap_err_with(|| format!("invalid API url `{}`", self.api_url))
    }

    /// Get the output format.
    pub fn output(&self) -> OutputFormat {
        self.output
    }

    /// Get the page sizes.
    pub fn page_size(&self) -> PageSizes {
        self.page_size
    }

    /// Get the SDK options.
    pub fn options(&self) -> LeaderboardOptions {
        LeaderboardOptions {
            award_display: self.award_display.into(),
            request_timeout: self.request_timeout.map(Into::into),
        }
    }
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn defaults_without_file() {
        Jail::expect_with(|jail| {
            let path = jail.directory().join("missing.toml");
            let config = Config::load(&path, &Overrides::default()).expect("load");
            assert_eq!(config.api_url().expect("url").as_str(), "http://localhost:5000/api");
            assert_eq!(config.output(), OutputFormat::Table);
            assert_eq!(config.page_size().users.get(), 5);
            assert_eq!(config.page_size().history.get(), 10);
            assert_eq!(config.options().award_display, Duration::from_secs(2));
            Ok(())
        });
    }

    #[test]
    fn file_env_and_flags_layer_in_order() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                api_url = "http://file.example/api"
                award_display = "3s"
                request_timeout = "500ms"

                [page_size]
                history = 20
                "#,
            )?;
            jail.set_env("LEADERBOARD_OUTPUT", "json");
            jail.set_env("LEADERBOARD_PAGE_SIZE__USERS", "8");
            let path = jail.directory().join("config.toml");

            let config = Config::load(&path, &Overrides::default()).expect("load");
            assert_eq!(config.api_url().expect("url").as_str(), "http://file.example/api");
            assert_eq!(config.output(), OutputFormat::Json);
            assert_eq!(config.page_size().users.get(), 8);
            assert_eq!(config.page_size().ranking.get(), 5);
            assert_eq!(config.page_size().history.get(), 20);
            let options = config.options();
            assert_eq!(options.award_display, Duration::from_secs(3));
            assert_eq!(options.request_timeout, Some(Duration::from_millis(500)));

            let overrides = Overrides {
                api_url: Some("http://flag.example/".parse().expect("url")),
                output: Some(OutputFormat::Table),
            };
            let config = Config::load(&path, &overrides).expect("load");
            assert_eq!(config.api_url().expect("url").as_str(), "http://flag.example/");
            assert_eq!(config.output(), OutputFormat::Table);
            Ok(())
        });
    }

    #[test]
    fn invalid_api_url_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("LEADERBOARD_API_URL", "not a url");
            let path = jail.directory().join("config.toml");
            assert!(Config::load(&path, &Overrides::default()).is_err());
            Ok(())
        });
    }

    #[test]
    fn zero_page_size_is_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[page_size]\nusers = 0\n")?;
            let path = jail.directory().join("config.toml");
            assert!(Config::load(&path, &Overrides::default()).is_err());
            Ok(())
        });
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        Jail::expect_with(|jail| {
            let text = Config::default().to_toml().expect("toml");
            jail.create_file("config.toml", &text)?;
            let path = jail.directory().join("config.toml");
            let config = Config::load(&path, &Overrides::default()).expect("load");
            assert_eq!(
                config.api_url().expect("url"),
                Config::default().api_url().expect("url")
            );
            assert_eq!(config.options().award_display, Duration::from_secs(2));
            Ok(())
        });
    }
}

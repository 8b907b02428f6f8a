use crate::config::types::{Config, CrawlerConfig, OutputConfig, SelectorConfig, UserAgentConfig};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Upper bound on simultaneous repository fetches
const MAX_CONCURRENCY: usize = 256;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_selector_config(&config.selectors)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must use http or https, got '{}'",
            base.scheme()
        )));
    }

    if config.request_timeout_ms < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_ms must be >= 1".to_string(),
        ));
    }

    if config.max_concurrent_enrichments < 1 || config.max_concurrent_enrichments > MAX_CONCURRENCY
    {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_enrichments must be between 1 and {}, got {}",
            MAX_CONCURRENCY, config.max_concurrent_enrichments
        )));
    }

    if config.crawl_deadline_ms == Some(0) {
        return Err(ConfigError::Validation(
            "crawl_deadline_ms must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    Ok(())
}

/// Validates that every selector compiles
fn validate_selector_config(config: &SelectorConfig) -> Result<(), ConfigError> {
    for selector in [&config.section, &config.item, &config.language_name] {
        compile_selector(selector)?;
    }
    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.results_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "results_dir cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Compiles a CSS selector, mapping failures into a config error
pub(crate) fn compile_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_base_url() {
        let mut config = Config::default();
        config.crawler.base_url = "not a url".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));

        config.crawler.base_url = "ftp://example.com".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));

        config.crawler.base_url = "http://127.0.0.1:8080".to_string();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_validate_concurrency_bounds() {
        let mut config = Config::default();
        config.crawler.max_concurrent_enrichments = 0;
        assert!(validate(&config).is_err());

        config.crawler.max_concurrent_enrichments = MAX_CONCURRENCY + 1;
        assert!(validate(&config).is_err());

        config.crawler.max_concurrent_enrichments = MAX_CONCURRENCY;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_validate_crawler_name() {
        let mut config = Config::default();
        config.user_agent.crawler_name = "".to_string();
        assert!(validate(&config).is_err());

        config.user_agent.crawler_name = "bad name!".to_string();
        assert!(validate(&config).is_err());

        config.user_agent.crawler_name = "Good-Name2".to_string();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_validate_selectors() {
        let mut config = Config::default();
        config.selectors.language_name = "span[".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidSelector { .. })
        ));
    }

    #[test]
    fn test_validate_deadline_and_output() {
        let mut config = Config::default();
        config.crawler.crawl_deadline_ms = Some(0);
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.output.results_dir = "   ".to_string();
        assert!(validate(&config).is_err());
    }
}

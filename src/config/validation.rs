use crate::config::types::{
    Config, ContentConfig, CrawlerConfig, FrontierConfig, OutputConfig, UserAgentConfig,
};
use crate::url::compile_patterns;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_content_config(&config.content)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_frontier_config(&config.frontier)?;
    Ok(())
}

/// Validates crawler limits
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_queue_size < 1 {
        return Err(ConfigError::Validation(
            "max_queue_size must be >= 1".to_string(),
        ));
    }

    if config.checkpoint_interval < 1 {
        return Err(ConfigError::Validation(
            "checkpoint_interval must be >= 1".to_string(),
        ));
    }

    if config.max_records < 1 {
        return Err(ConfigError::Validation(
            "max_records must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates content thresholds
fn validate_content_config(config: &ContentConfig) -> Result<(), ConfigError> {
    if config.min_text_length < 1 {
        return Err(ConfigError::Validation(
            "min_text_length must be >= 1".to_string(),
        ));
    }

    if !(0.0..=1.0).contains(&config.quality_threshold) {
        return Err(ConfigError::Validation(format!(
            "quality_threshold must be between 0.0 and 1.0, got {}",
            config.quality_threshold
        )));
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

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.dataset_path.is_empty() {
        return Err(ConfigError::Validation(
            "dataset_path cannot be empty".to_string(),
        ));
    }

    if config.checkpoint_path.is_empty() {
        return Err(ConfigError::Validation(
            "checkpoint_path cannot be empty".to_string(),
        ));
    }

    if config.dataset_path == config.checkpoint_path {
        return Err(ConfigError::Validation(
            "dataset_path and checkpoint_path must differ".to_string(),
        ));
    }

    Ok(())
}

/// Validates the allow-list, seeds and URL patterns
fn validate_frontier_config(config: &FrontierConfig) -> Result<(), ConfigError> {
    if config.allowed_domains.is_empty() {
        return Err(ConfigError::Validation(
            "allowed_domains must list at least one domain".to_string(),
        ));
    }

    for domain in &config.allowed_domains {
        validate_domain_string(domain)?;
    }

    if config.seeds.is_empty() {
        return Err(ConfigError::Validation(
            "seeds must list at least one URL".to_string(),
        ));
    }

    for seed in &config.seeds {
        let url = Url::parse(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Seed URL '{}' must use http or https",
                seed
            )));
        }
    }

    compile_patterns(&config.skip_patterns)?;
    compile_patterns(&config.priority_patterns)?;

    Ok(())
}

/// Validates a domain string
fn validate_domain_string(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' must contain at least one dot (e.g., 'example.com')",
            domain
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_domain_string() {
        assert!(validate_domain_string("dell.com").is_ok());
        assert!(validate_domain_string("support.hp.com").is_ok());
        assert!(validate_domain_string("h30434.www3.hp.com").is_ok());

        assert!(validate_domain_string("").is_err());
        assert!(validate_domain_string("localhost").is_err());
        assert!(validate_domain_string(".dell.com").is_err());
        assert!(validate_domain_string("dell.com.").is_err());
        assert!(validate_domain_string("dell..com").is_err());
        assert!(validate_domain_string("dell.com/support").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("admin@sub.example.com").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@domain").is_err());
        assert!(validate_email("a@b@c.com").is_err());
    }

    #[test]
    fn test_quality_threshold_range() {
        let mut content = ContentConfig::default();
        assert!(validate_content_config(&content).is_ok());

        content.quality_threshold = 1.5;
        assert!(validate_content_config(&content).is_err());

        content.quality_threshold = -0.1;
        assert!(validate_content_config(&content).is_err());
    }

    #[test]
    fn test_invalid_regex_rejected() {
        let frontier = FrontierConfig {
            allowed_domains: vec!["dell.com".to_string()],
            seeds: vec!["https://www.dell.com/".to_string()],
            skip_patterns: vec!["(unclosed".to_string()],
            priority_patterns: vec![],
        };

        let result = validate_frontier_config(&frontier);
        assert!(matches!(result, Err(ConfigError::InvalidRegex { .. })));
    }

    #[test]
    fn test_non_http_seed_rejected() {
        let frontier = FrontierConfig {
            allowed_domains: vec!["dell.com".to_string()],
            seeds: vec!["ftp://dell.com/manuals".to_string()],
            skip_patterns: vec![],
            priority_patterns: vec![],
        };

        assert!(validate_frontier_config(&frontier).is_err());
    }
}

//! AWS SDK client setup.

use aws_sdk_dynamodb::Client;

/// AWS client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsConfig {
    /// Custom endpoint URL (for local DynamoDB).
    pub endpoint_url: Option<String>,
    /// AWS region.
    pub region: String,
    /// Named profile from the shared AWS config files.
    pub profile: Option<String>,
}

impl AwsConfig {
    /// Returns a display string for the target environment.
    pub fn target_display(&self) -> String {
        match (&self.endpoint_url, &self.profile) {
            (Some(url), _) => format!("Local DynamoDB ({})", url),
            (None, Some(profile)) => format!(
                "AWS DynamoDB (region: {}, profile: {})",
                self.region, profile
            ),
            (None, None) => format!("AWS DynamoDB (region: {})", self.region),
        }
    }
}

/// Creates a DynamoDB client with the given configuration.
///
/// Credentials come from the default provider chain, narrowed to the
/// configured profile when one is set.
pub async fn create_client(config: &AwsConfig) -> Client {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.region.clone()));

    if let Some(profile) = &config.profile {
        loader = loader.profile_name(profile);
    }
    if let Some(endpoint) = &config.endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }

    let sdk_config = loader.load().await;
    Client::new(&sdk_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(endpoint_url: Option<&str>, profile: Option<&str>) -> AwsConfig {
        AwsConfig {
            endpoint_url: endpoint_url.map(str::to_string),
            region: "eu-west-1".to_string(),
            profile: profile.map(str::to_string),
        }
    }

    #[test]
    fn test_target_display_local() {
        let config = config(Some("http://localhost:8000"), Some("dev"));
        assert_eq!(
            config.target_display(),
            "Local DynamoDB (http://localhost:8000)"
        );
    }

    #[test]
    fn test_target_display_aws() {
        assert_eq!(
            config(None, None).target_display(),
            "AWS DynamoDB (region: eu-west-1)"
        );
        assert_eq!(
            config(None, Some("dev")).target_display(),
            "AWS DynamoDB (region: eu-west-1, profile: dev)"
        );
    }
}

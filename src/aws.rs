use aws_config::environment::EnvironmentVariableCredentialsProvider;
use aws_config::imds::credentials::ImdsCredentialsProvider;
use aws_config::profile::profile_file::{ProfileFileKind, ProfileFiles};
use aws_config::{Region, SdkConfig};
use aws_sdk_cloudwatchlogs::config::Credentials;
use log::{debug, info};

use crate::descriptor::Descriptor;
use crate::error::ConfigError;

lazy_static! {
    static ref AWS_REGIONS: Vec<&'static str> = vec![
        "us-east-1", "us-east-2", "us-west-1", "us-west-2",
        "af-south-1", "ap-east-1", "ap-south-1", "ap-south-2",
        "ap-southeast-1", "ap-southeast-2", "ap-southeast-3",
        "ap-southeast-4", "ap-southeast-5",
        "ap-northeast-1", "ap-northeast-2", "ap-northeast-3",
        "ca-central-1", "ca-west-1", "eu-central-1", "eu-central-2",
        "eu-west-1", "eu-west-2", "eu-west-3", "eu-south-1",
        "eu-south-2", "eu-north-1", "il-central-1", "me-central-1",
        "me-south-1", "sa-east-1", "us-gov-east-1", "us-gov-west-1",
        "cn-north-1", "cn-northwest-1",
    ];
}

pub fn find_region(input: &str) -> Option<&'static str> {
    AWS_REGIONS.iter().find(|&&region| region == input).copied()
}

/// Where request credentials come from, as written in the `credentials`
/// descriptor field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsSource {
    /// `env:`
    Environment,
    /// `iam:`
    InstanceRole,
    /// `anon:`
    Anonymous,
    /// `static:<key>:<secret>[:<token>]`
    Static {
        access_key_id: String,
        secret_access_key: String,
        session_token: Option<String>,
    },
    /// `<path>:<profile>`
    ProfileFile { path: String, profile: String },
    /// `<profile>`
    Profile(String),
}

impl CredentialsSource {
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidCredentials(redact(input));

        match input {
            "" => Err(invalid()),
            "env:" => Ok(CredentialsSource::Environment),
            "iam:" => Ok(CredentialsSource::InstanceRole),
            "anon:" => Ok(CredentialsSource::Anonymous),
            _ if input.starts_with("static:") => {
                let mut parts = input["static:".len()..].splitn(3, ':');
                let access_key_id = parts.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
                let secret_access_key =
                    parts.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
                let session_token = parts.next().filter(|s| !s.is_empty());
                Ok(CredentialsSource::Static {
                    access_key_id: access_key_id.to_string(),
                    secret_access_key: secret_access_key.to_string(),
                    session_token: session_token.map(str::to_string),
                })
            }
            _ => match input.rsplit_once(':') {
                Some((path, profile)) if !path.is_empty() && !profile.is_empty() => {
                    Ok(CredentialsSource::ProfileFile {
                        path: path.to_string(),
                        profile: profile.to_string(),
                    })
                }
                Some(_) => Err(invalid()),
                None => Ok(CredentialsSource::Profile(input.to_string())),
            },
        }
    }
}

fn redact(input: &str) -> String {
    if input.starts_with("static:") {
        "static:***".to_string()
    } else {
        input.to_string()
    }
}

/// An authenticated AWS configuration, built once and shared by reference
/// between writers and senders.
#[derive(Debug, Clone)]
pub struct Session {
    config: SdkConfig,
}

impl Session {
    /// Validates `region` and `credentials` without any network access.
    pub fn resolve(descriptor: &Descriptor) -> Result<(&'static str, CredentialsSource), ConfigError> {
        let region_str = descriptor.region()?;
        let region =
            find_region(region_str).ok_or_else(|| ConfigError::UnknownRegion(region_str.to_string()))?;
        let credentials = CredentialsSource::parse(descriptor.credentials()?)?;
        Ok((region, credentials))
    }

    pub async fn from_descriptor(descriptor: &Descriptor) -> Result<Self, ConfigError> {
        let (region, credentials) = Self::resolve(descriptor)?;
        Ok(Self::build(region, credentials).await)
    }

    pub async fn build(region: &'static str, credentials: CredentialsSource) -> Self {
        let mut loader = aws_config::from_env().region(Region::new(region));

        loader = match credentials {
            CredentialsSource::Environment => {
                debug!("Using credentials from environment");
                loader.credentials_provider(EnvironmentVariableCredentialsProvider::new())
            }
            CredentialsSource::InstanceRole => {
                debug!("Using credentials from instance metadata");
                loader.credentials_provider(ImdsCredentialsProvider::builder().build())
            }
            CredentialsSource::Anonymous => {
                debug!("Using anonymous requests");
                loader.no_credentials()
            }
            CredentialsSource::Static {
                access_key_id,
                secret_access_key,
                session_token,
            } => {
                debug!("Using static credentials");
                loader.credentials_provider(Credentials::new(
                    access_key_id,
                    secret_access_key,
                    session_token,
                    None,
                    "descriptor",
                ))
            }
            CredentialsSource::ProfileFile { path, profile } => {
                debug!("Using profile '{}' from {}", profile, path);
                let files = ProfileFiles::builder()
                    .with_file(ProfileFileKind::Credentials, path)
                    .build();
                loader.profile_files(files).profile_name(profile)
            }
            CredentialsSource::Profile(profile) => {
                debug!("Using profile '{}'", profile);
                loader.profile_name(profile)
            }
        };

        let config = loader.load().await;
        info!("AWS session ready in {}", region);
        Self { config }
    }

    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    pub fn logs_client(&self) -> aws_sdk_cloudwatchlogs::Client {
        aws_sdk_cloudwatchlogs::Client::new(&self.config)
    }

    pub fn sqs_client(&self) -> aws_sdk_sqs::Client {
        aws_sdk_sqs::Client::new(&self.config)
    }
}

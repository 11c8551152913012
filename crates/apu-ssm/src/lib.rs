//! AWS Systems Manager Parameter Store backend
//!
//! Wraps `aws-sdk-ssm` behind [`ParameterStore`]. Credentials and region come
//! from the standard AWS provider chain unless overridden in [`AwsConfig`].

use apu_config::AwsConfig;
use apu_core::{ParameterError, ParameterStore, ParameterType, PutRequest, StoredParameter};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_ssm::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_ssm::operation::get_parameter::GetParameterError;
use aws_sdk_ssm::types::ParameterType as SsmParameterType;
use aws_sdk_ssm::Client;
use tracing::{debug, info};

/// Parameter Store client
#[derive(Clone, Debug)]
pub struct SsmParameterStore {
    client: Client,
}

impl SsmParameterStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build the SDK client from the default AWS chain plus config overrides.
    pub async fn from_config(config: &AwsConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(profile) = &config.profile {
            loader = loader.profile_name(profile);
        }

        let shared_config = loader.load().await;

        let mut builder = aws_sdk_ssm::config::Builder::from(&shared_config);
        if let Some(endpoint) = config.endpoint_url.as_deref() {
            info!("Using custom SSM endpoint: {}", endpoint);
            builder = builder.endpoint_url(endpoint);
        }

        match shared_config.region() {
            Some(region) => info!("Using AWS region: {}", region),
            None => info!("No AWS region configured; requests will fail until one is set"),
        }

        Self::new(Client::from_conf(builder.build()))
    }
}

#[async_trait]
impl ParameterStore for SsmParameterStore {
    async fn get_parameter(&self, name: &str) -> apu_core::Result<Option<StoredParameter>> {
        // always decrypt so we can compare existing and new values
        let response = self
            .client
            .get_parameter()
            .name(name)
            .with_decryption(true)
            .send()
            .await;

        match response {
            Ok(output) => {
                let Some(parameter) = output.parameter() else {
                    return Ok(None);
                };
                debug!(name, version = parameter.version(), "GetParameter succeeded");

                Ok(Some(StoredParameter {
                    name: parameter.name().unwrap_or(name).to_string(),
                    value: parameter.value().unwrap_or_default().to_string(),
                    parameter_type: parameter
                        .r#type()
                        .map(from_sdk_type)
                        .unwrap_or(ParameterType::String),
                    version: parameter.version(),
                }))
            }
            Err(err) if is_not_found(&err) => Ok(None),
            Err(err) => Err(ParameterError::store_read(name, error_summary(name, &err))),
        }
    }

    async fn put_parameter(&self, request: &PutRequest) -> apu_core::Result<i64> {
        let mut call = self
            .client
            .put_parameter()
            .name(&request.name)
            .value(&request.value)
            .r#type(to_sdk_type(request.parameter_type))
            .overwrite(request.overwrite);

        if let Some(description) = &request.description {
            call = call.description(description);
        }
        if let Some(key_id) = &request.key_id {
            call = call.key_id(key_id);
        }

        let output = call.send().await.map_err(|err| {
            ParameterError::store_write(&request.name, error_summary(&request.name, &err))
        })?;

        Ok(output.version())
    }
}

fn is_not_found<R>(err: &SdkError<GetParameterError, R>) -> bool {
    err.as_service_error()
        .map(GetParameterError::is_parameter_not_found)
        .unwrap_or(false)
}

/// One-line reason for the summary; the full response goes to the debug log.
fn error_summary<E, R>(name: &str, err: &SdkError<E, R>) -> String
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    debug!(name, error = %DisplayErrorContext(err), "Parameter Store request failed");

    match (err.code(), err.message()) {
        (Some(code), Some(message)) if !message.is_empty() => format!("{code}: {message}"),
        (Some(code), _) => code.to_string(),
        // No service response, e.g. a connection or credentials failure
        (None, _) => DisplayErrorContext(err).to_string(),
    }
}

fn to_sdk_type(parameter_type: ParameterType) -> SsmParameterType {
    match parameter_type {
        ParameterType::String => SsmParameterType::String,
        ParameterType::StringList => SsmParameterType::StringList,
        ParameterType::SecureString => SsmParameterType::SecureString,
    }
}

fn from_sdk_type(parameter_type: &SsmParameterType) -> ParameterType {
    match parameter_type {
        SsmParameterType::SecureString => ParameterType::SecureString,
        SsmParameterType::StringList => ParameterType::StringList,
        _ => ParameterType::String,
    }
}

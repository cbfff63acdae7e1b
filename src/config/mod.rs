//! Configuration module for the taxonomy mapper

mod mapper_config;

pub use mapper_config::{
    ConfigError, ExternalConfig, FallbackConfig, MapperConfig, OrganizationConfig,
    ProgramDefaults,
};

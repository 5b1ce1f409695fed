mod env_overrides;
mod loader;
pub mod schema;
#[cfg(test)]
mod test_env;

pub use schema::{
    Config, DEFAULT_BASE_URL, MAX_GENERATE_COUNT, MIN_GENERATE_COUNT, ServiceConfig,
    SessionConfig,
};

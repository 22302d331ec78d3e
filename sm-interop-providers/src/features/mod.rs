pub mod invocation_gateway;
pub mod provider_registry;

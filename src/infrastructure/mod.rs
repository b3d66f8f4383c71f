// Infrastructure layer - External dependencies and adapters
pub mod chunked_json;
pub mod config;
pub mod gps_repository;
pub mod http_response;
pub mod upstream_error;
pub mod upstream_mapper;
pub mod weather_client;

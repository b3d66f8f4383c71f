// Application layer - use cases over injected data sources
pub mod assessment_service;
pub mod clock;
pub mod fleet_repository;
pub mod streaming_service;
pub mod weather_cache;

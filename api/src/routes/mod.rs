pub mod embeddings;
pub mod health_route;
pub mod search;
pub mod tuning;

pub mod search_route;

pub mod tuning_route;

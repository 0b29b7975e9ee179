pub mod migrate_route;

pub mod index_stats_route;

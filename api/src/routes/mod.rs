pub mod index_stats;
pub mod migrate;
pub mod similar_products;

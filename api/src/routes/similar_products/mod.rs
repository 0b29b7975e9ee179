pub mod similar_products_response;
pub mod similar_products_route;

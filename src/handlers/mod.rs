pub mod carousel_handlers;
pub mod health_handlers;

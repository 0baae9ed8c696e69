pub mod example_generator;
pub mod health_handler;
pub mod http_handler;
pub mod media_type;
pub mod mocker;
pub mod negotiator;
pub mod request_validator;
pub mod router;

#[cfg(test)]
mod example_generator_test;

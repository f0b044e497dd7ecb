mod auth_tests;
mod channel_tests;
mod health_tests;
mod post_tests;
mod user_tests;

pub mod helpers;
pub mod keys;
pub mod loggers;
pub mod redirect;

pub use keys::KeyApi;
pub use loggers::{LoggerApi, api_routes};
pub use redirect::{RedirectApi, redirect_routes};

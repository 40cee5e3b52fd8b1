pub mod constants;
pub mod string_utils;
pub mod url_utils;

pub use constants::*;
pub use string_utils::{contains_ci, escape_like, normalize_query, quote_filter_value};
pub use url_utils::{function_url, parse_base_url, table_url};

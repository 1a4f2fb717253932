mod url;

pub use self::url::{ShortenRequest, ShortenResponse, UrlRecord};

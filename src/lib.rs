//! Developer utility toolkit.
//!
//! Each module is a pure transform over caller input: identifiers, Base64 and
//! URL encoding, JSON, timestamp conversion, regex testing, Markdown, code
//! minification and beautification. The one exception is [`ip`], whose lookup
//! goes out to a remote service behind the [`IpLookup`] trait.
//!
//! Every fallible operation returns [`ToolResult`]; the HTTP layer in the
//! `server` crate maps [`ToolError`] kinds onto status codes.

pub mod beautify;
pub mod encoding;
pub mod error;
pub mod identifier;
pub mod ip;
pub mod json;
pub mod markdown;
pub mod minify;
pub mod pattern;
pub mod time;

mod lexer;

pub use beautify::{
    beautify, indentation_level, BeautifyLanguage, BeautifyOptions, BeautifyStats, TrailingComma,
};
pub use encoding::{
    decode_base64, decode_base64_text, decode_url, encode_base64, encode_url, is_valid_base64,
    is_valid_url_input, Operation, UrlMode,
};
pub use error::{ToolError, ToolResult};
pub use ip::{is_valid_ipv4, lookup_checked, IpInfo, IpLookup, Provider};
#[cfg(feature = "http-lookup")]
pub use ip::HttpIpLookup;
pub use markdown::{MarkdownOptions, TextStats};
pub use minify::{minify, MinifyLanguage, MinifyStats};
pub use pattern::{find_all_matches, RegexFlags, RegexMatch, SUPPORTED_FLAGS};
pub use time::{ConvertOperation, InputType, TimeConversion, TimeInput, TimeZoneSpec};

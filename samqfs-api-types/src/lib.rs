//! Basic API types used by the SAM-QFS media manager.

use proxmox_schema::{const_regex, ApiStringFormat, Schema, StringSchema};

#[rustfmt::skip]
#[macro_export]
macro_rules! SAFE_ID_REGEX_STR { () => { r"(?:[A-Za-z0-9_][A-Za-z0-9._\-]*)" }; }

#[rustfmt::skip]
#[macro_export]
macro_rules! VSN_NAME_REGEX_STR { () => { r"[A-Za-z0-9_\-.]{1,6}" }; }

mod acl;
pub use acl::*;

mod media;
pub use media::*;

const_regex! {
    /// Regex for safe identifiers.
    ///
    /// Used for library, pool and server names. Those names end up in
    /// file names and command lines, so we restrict them.
    pub SAFE_ID_REGEX = concat!(r"^", SAFE_ID_REGEX_STR!(), r"$");

    pub SINGLE_LINE_COMMENT_REGEX = r"^[[:^cntrl:]]*$";

    /// Labels written to tape are limited to six characters.
    pub VSN_NAME_REGEX = concat!(r"^", VSN_NAME_REGEX_STR!(), r"$");

    /// Two letter media type codes (e.g. 'li', 'lt', 'dk').
    pub MEDIA_TYPE_REGEX = r"^[a-z0-9]{2}$";
}

pub const SAFE_ID_FORMAT: ApiStringFormat = ApiStringFormat::Pattern(&SAFE_ID_REGEX);

pub const SINGLE_LINE_COMMENT_FORMAT: ApiStringFormat =
    ApiStringFormat::Pattern(&SINGLE_LINE_COMMENT_REGEX);

pub const SINGLE_LINE_COMMENT_SCHEMA: Schema = StringSchema::new("Comment (single line).")
    .format(&SINGLE_LINE_COMMENT_FORMAT)
    .schema();

pub const VSN_NAME_FORMAT: ApiStringFormat = ApiStringFormat::Pattern(&VSN_NAME_REGEX);

pub const MEDIA_TYPE_FORMAT: ApiStringFormat = ApiStringFormat::Pattern(&MEDIA_TYPE_REGEX);

pub const SERVER_NAME_SCHEMA: Schema = StringSchema::new("Managed server identifier.")
    .format(&SAFE_ID_FORMAT)
    .min_length(2)
    .max_length(32)
    .schema();

//! Strict `application/x-www-form-urlencoded` decoding.
//!
//! Escapes that decode to invalid UTF-8 are rejected rather than replaced.

use std::borrow::Cow;

use crate::flow::FlowError;

/// Split `input` into decoded key/value pairs, in order.
pub(crate) fn parse_pairs(input: &str) -> Result<Vec<(String, String)>, FlowError> {
    input
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            Ok((decode(key)?, decode(value)?))
        })
        .collect()
}

fn decode(raw: &str) -> Result<String, FlowError> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(Cow::into_owned)
        .map_err(|_| FlowError::Parse("form data is not valid UTF-8".into()))
}

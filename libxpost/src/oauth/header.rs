//! `Authorization` header rendering

use crate::oauth::encode::percent_encode;

pub const AUTH_SCHEME: &str = "OAuth";

/// Render `OAuth k1="v1", k2="v2", ...` from the signed `oauth_*` parameters.
///
/// Sorting happens here regardless of the input order, and anything that is
/// not an `oauth_*` parameter is left out. Values are percent-encoded once.
pub fn build_header<'a, I>(params: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut entries: Vec<(&str, &str)> = params
        .into_iter()
        .filter(|(key, _)| key.starts_with("oauth_"))
        .collect();
    entries.sort_unstable();

    let rendered = entries
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, percent_encode(v)))
        .collect::<Vec<_>>()
        .join(", ");

    format!("{AUTH_SCHEME} {rendered}")
}

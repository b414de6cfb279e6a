//! Canonical signing input for the `HMAC-Authentication` protocol.
//!
//! Two signing inputs exist:
//!
//! ```text
//! request:  Method ∥ UriString ∥ Body
//! uri-sign: UriString ∥ Separator ∥ QueryString
//! ```
//!
//! Fields are concatenated byte for byte without delimiters. Servers rebuild
//! the same bytes, so nothing here may normalize, sort, or re-encode input.

/// Build the signing input for a header-signed request or session message.
///
/// # Examples
///
/// ```
/// use hmacsign_auth::canonical::request_signing_input;
///
/// let input = request_signing_input("POST", "http://api.local/items?x=1", b"{}");
/// assert_eq!(input, b"POSThttp://api.local/items?x=1{}");
/// ```
#[must_use]
pub fn request_signing_input(method: &str, uri: &str, body: &[u8]) -> Vec<u8> {
    let mut input = Vec::with_capacity(method.len() + uri.len() + body.len());
    input.extend_from_slice(method.as_bytes());
    input.extend_from_slice(uri.as_bytes());
    input.extend_from_slice(body);
    input
}

/// Build the signing input for URI signing.
///
/// The separator is only emitted when `query` is non-empty; it is `&` when
/// `uri` already carries a `?`, and `?` otherwise.
///
/// # Examples
///
/// ```
/// use hmacsign_auth::canonical::uri_signing_input;
///
/// assert_eq!(uri_signing_input("http://h/p", ""), "http://h/p");
/// assert_eq!(uri_signing_input("http://h/p", "a=1"), "http://h/p?a=1");
/// assert_eq!(uri_signing_input("http://h/p?x=0", "a=1"), "http://h/p?x=0&a=1");
/// ```
#[must_use]
pub fn uri_signing_input(uri: &str, query: &str) -> String {
    if query.is_empty() {
        return uri.to_owned();
    }
    let separator = if uri.contains('?') { '&' } else { '?' };
    format!("{uri}{separator}{query}")
}

/// Build the URI returned to callers once the auth parameter is in `query`.
///
/// Unlike [`uri_signing_input`], a `uri` already containing `?` always gets
/// `&`, even if `query` is empty. Servers in the field depend on this exact
/// rendering, so the asymmetry is kept.
///
/// # Examples
///
/// ```
/// use hmacsign_auth::canonical::signed_uri;
///
/// assert_eq!(signed_uri("http://h/p", "hmacauthentication=x"), "http://h/p?hmacauthentication=x");
/// assert_eq!(signed_uri("http://h/p?x=0", ""), "http://h/p?x=0&");
/// ```
#[must_use]
pub fn signed_uri(uri: &str, query: &str) -> String {
    let separator = if uri.contains('?') {
        "&"
    } else if query.is_empty() {
        ""
    } else {
        "?"
    };
    format!("{uri}{separator}{query}")
}

/// Serialize query parameters as `application/x-www-form-urlencoded`,
/// preserving insertion order.
///
/// # Examples
///
/// ```
/// use hmacsign_auth::canonical::encode_query;
///
/// let pairs = [("q", "a b"), ("page", "2")];
/// assert_eq!(encode_query(pairs.iter().copied()), "q=a+b&page=2");
/// ```
#[must_use]
pub fn encode_query<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

//! Case-insensitive HTTP header store.
//!
//! Header names are validated against the token character set and normalized
//! to lowercase on insertion, so lookups are case-insensitive and each name
//! appears at most once. Appending to an existing name joins the values with
//! `", "`, matching how user agents combine repeated headers.

use crate::errors::FetchError;

/// Returns true for characters allowed in a header field name.
fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'-' | b'#'
                | b'$'
                | b'%'
                | b'&'
                | b'\''
                | b'*'
                | b'+'
                | b'.'
                | b'^'
                | b'_'
                | b'`'
                | b'|'
                | b'~'
                | b'!'
        )
}

fn normalize_name(name: &str) -> Result<String, FetchError> {
    if name.is_empty() || !name.bytes().all(is_name_byte) {
        return Err(FetchError::InvalidHeaderName(name.to_string()));
    }
    Ok(name.to_ascii_lowercase())
}

/// Header collection with lowercase-normalized, unique names.
///
/// Entries keep insertion order. Values are stored verbatim; a second
/// [`append`](Headers::append) for the same name extends the existing value
/// with `", "` instead of adding a duplicate entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from name/value pairs, validating every name.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, FetchError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut headers = Headers::new();
        for (name, value) in pairs {
            headers.append(name, value)?;
        }
        Ok(headers)
    }

    /// Add a value for `name`. When the name is already present the value is
    /// merged into the existing entry with a `", "` separator.
    pub fn append(&mut self, name: &str, value: &str) -> Result<(), FetchError> {
        let name = normalize_name(name)?;
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, existing)) => {
                existing.push_str(", ");
                existing.push_str(value);
            }
            None => self.entries.push((name, value.to_string())),
        }
        Ok(())
    }

    /// Set `name` to `value`, replacing any existing value.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), FetchError> {
        let name = normalize_name(name)?;
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.entries.push((name, value.to_string())),
        }
        Ok(())
    }

    /// Look up a header value. Lookup is case-insensitive; a name that would
    /// never validate simply does not match anything.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn delete(&mut self, name: &str) {
        self.entries.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> HeadersIter<'_> {
        HeadersIter {
            inner: self.entries.iter(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, v)| v.as_str())
    }

    /// Parse a raw header block as received from the transport.
    ///
    /// Accepts CRLF or LF delimited `Name: value` lines. A line break followed
    /// by a space or tab is an obsolete continuation and folds into the
    /// previous line as a single space. Lines without a name, or with a name
    /// the validator rejects, are skipped; server-supplied garbage must not
    /// poison an otherwise delivered response.
    pub fn parse_raw(raw: &str) -> Headers {
        let mut headers = Headers::new();
        for line in fold_continuations(raw).lines() {
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            if let Err(e) = headers.append(name, value.trim()) {
                log::warn!("skipping response header line {line:?}: {e}");
            }
        }
        headers
    }
}

/// Borrowing iterator over header `(name, value)` pairs.
pub struct HeadersIter<'a> {
    inner: std::slice::Iter<'a, (String, String)>,
}

impl<'a> Iterator for HeadersIter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a str, &'a str);
    type IntoIter = HeadersIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Sources a request or response may take its initial headers from.
///
/// `Raw` is an escape hatch: the pairs are handed to the transport verbatim,
/// bypassing name validation. The header store built from them drops invalid
/// names, so introspection through the descriptor stays well-formed while the
/// wire sees exactly what the caller supplied.
#[derive(Debug, Clone)]
pub enum HeadersInit {
    Store(Headers),
    Pairs(Vec<(String, String)>),
    Raw(Vec<(String, String)>),
}

impl From<Headers> for HeadersInit {
    fn from(headers: Headers) -> Self {
        HeadersInit::Store(headers)
    }
}

impl HeadersInit {
    /// Resolve into a validated store plus the raw pass-through pairs, if any.
    pub(crate) fn resolve(self) -> Result<(Headers, Option<Vec<(String, String)>>), FetchError> {
        match self {
            HeadersInit::Store(headers) => Ok((headers, None)),
            HeadersInit::Pairs(pairs) => {
                let mut headers = Headers::new();
                for (name, value) in &pairs {
                    headers.append(name, value)?;
                }
                Ok((headers, None))
            }
            HeadersInit::Raw(pairs) => {
                let mut headers = Headers::new();
                for (name, value) in &pairs {
                    if let Err(e) = headers.append(name, value) {
                        log::warn!("raw header {name:?} not representable in store: {e}");
                    }
                }
                Ok((headers, Some(pairs)))
            }
        }
    }
}

/// Fold obsolete line folding (a line break followed by SP/HT) into a single
/// space so each logical header occupies one line.
fn fold_continuations(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' || c == '\n' {
            if c == '\r' && chars.peek() == Some(&'\n') {
                chars.next();
            }
            if chars.peek().is_some_and(|&n| n == ' ' || n == '\t') {
                while chars.peek().is_some_and(|&n| n == ' ' || n == '\t') {
                    chars.next();
                }
                out.push(' ');
            } else {
                out.push('\n');
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_then_get() {
        let mut headers = Headers::new();
        headers.append("Accept", "text/html").unwrap();
        assert_eq!(headers.get("accept"), Some("text/html"));
        assert_eq!(headers.get("ACCEPT"), Some("text/html"));
    }

    #[test]
    fn second_append_joins_with_comma_space() {
        let mut headers = Headers::new();
        headers.append("Accept", "first").unwrap();
        headers.append("ACCEPT", "second").unwrap();
        assert_eq!(headers.get("accept"), Some("first, second"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn set_overwrites() {
        let mut headers = Headers::new();
        headers.append("X-Token", "a").unwrap();
        headers.set("x-token", "b").unwrap();
        assert_eq!(headers.get("X-Token"), Some("b"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn delete_and_has() {
        let mut headers = Headers::new();
        headers.set("Content-Type", "text/plain").unwrap();
        assert!(headers.has("content-type"));
        headers.delete("CONTENT-TYPE");
        assert!(!headers.has("content-type"));
        assert!(headers.is_empty());
    }

    #[test]
    fn invalid_name_rejected() {
        let mut headers = Headers::new();
        assert!(matches!(
            headers.append("Bad Name", "x"),
            Err(FetchError::InvalidHeaderName(_))
        ));
        assert!(matches!(
            headers.set("", "x"),
            Err(FetchError::InvalidHeaderName(_))
        ));
        assert!(matches!(
            headers.append("Beyond\u{00e9}", "x"),
            Err(FetchError::InvalidHeaderName(_))
        ));
    }

    #[test]
    fn names_stored_lowercase_in_insertion_order() {
        let headers =
            Headers::from_pairs([("B-Second", "2"), ("A-First", "1"), ("C-Third", "3")]).unwrap();
        let keys: Vec<&str> = headers.keys().collect();
        assert_eq!(keys, vec!["b-second", "a-first", "c-third"]);
    }

    #[test]
    fn from_pairs_propagates_validation() {
        assert!(Headers::from_pairs([("ok", "1"), ("not ok", "2")]).is_err());
    }

    #[test]
    fn iteration_yields_pairs() {
        let mut headers = Headers::new();
        headers.set("a", "1").unwrap();
        headers.set("b", "2").unwrap();
        let pairs: Vec<(&str, &str)> = (&headers).into_iter().collect();
        assert_eq!(pairs, vec![("a", "1"), ("b", "2")]);
        let values: Vec<&str> = headers.values().collect();
        assert_eq!(values, vec!["1", "2"]);
    }

    #[test]
    fn parse_raw_crlf_and_lf() {
        let headers = Headers::parse_raw("Content-Type: text/plain\r\nX-One: 1\nX-Two: a:b\r\n");
        assert_eq!(headers.get("content-type"), Some("text/plain"));
        assert_eq!(headers.get("x-one"), Some("1"));
        // only the first colon separates name and value
        assert_eq!(headers.get("x-two"), Some("a:b"));
    }

    #[test]
    fn parse_raw_folds_continuation_lines() {
        let headers = Headers::parse_raw("X-Long: part one\r\n\t part two\r\nX-Next: n\r\n");
        assert_eq!(headers.get("x-long"), Some("part one part two"));
        assert_eq!(headers.get("x-next"), Some("n"));
    }

    #[test]
    fn parse_raw_skips_garbage_lines() {
        let headers = Headers::parse_raw("no-colon-line\r\n: no name\r\nGood: yes\r\n");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("good"), Some("yes"));
    }

    #[test]
    fn parse_raw_joins_repeated_names() {
        let headers = Headers::parse_raw("Set-Thing: a\r\nSet-Thing: b\r\n");
        assert_eq!(headers.get("set-thing"), Some("a, b"));
    }

    #[test]
    fn raw_init_keeps_pairs_but_sanitizes_store() {
        let init = HeadersInit::Raw(vec![
            ("X Weird".to_string(), "1".to_string()),
            ("X-Fine".to_string(), "2".to_string()),
        ]);
        let (store, raw) = init.resolve().unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("x-fine"), Some("2"));
        let raw = raw.unwrap();
        assert_eq!(raw[0].0, "X Weird");
    }
}

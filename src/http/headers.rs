//! HTTP headers abstraction for [`HttpRequest`](crate::http::request::HttpRequest) and
//! [`HttpResponse`](crate::http::response::HttpResponse)
//!
//! Headers are stored in an ordered map to preserve insertion order.
//! Lookup is case-insensitive and keys are unique: setting a header that
//! already exists replaces its value. The name under which a header was
//! first set is the one used when serializing.
//!
//! This abstraction does not enforce any HTTP semantics or constraints.
//! Higher-level types such as [`HttpRequest`](crate::http::request::HttpRequest)
//! and [`HttpResponse`](crate::http::response::HttpResponse) are responsible for
//! applying their own rules by wrapping or constraining access to this structure.

use indexmap::IndexMap;

#[derive(Debug)]
struct Header {
    name: String,
    value: String,
}

#[derive(Debug)]
pub struct HttpHeaders {
    // keyed by the lowercased header name
    headers: IndexMap<String, Header>,
}

impl HttpHeaders {
    pub fn new() -> Self {
        Self {
            headers: IndexMap::new(),
        }
    }

    pub fn set_raw(&mut self, name: &str, value: &str) {
        let key = name.to_ascii_lowercase();
        match self.headers.get_mut(&key) {
            Some(h) => h.value = value.to_string(),
            None => {
                self.headers.insert(
                    key,
                    Header {
                        name: name.to_string(),
                        value: value.to_string(),
                    },
                );
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|h| h.value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.headers.contains_key(&name.to_ascii_lowercase())
    }

    pub fn remove(&mut self, name: &str) {
        self.headers.shift_remove(&name.to_ascii_lowercase());
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn stringify(&self) -> String {
        let mut result = String::new();
        for h in self.headers.values() {
            result.push_str(&format!("{}: {}\r\n", h.name, h.value));
        }
        result
    }
}

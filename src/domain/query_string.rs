use std::fmt;

/// Ordered query-string pairs. Keys keep their first-seen position so that
/// rewriting one filter does not reshuffle the rest of the URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct QueryString {
    pairs: Vec<(String, String)>,
}

impl QueryString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        let mut query = QueryString::new();
        for part in raw.split('&').filter(|part| !part.is_empty()) {
            let (key, value) = part.split_once('=').unwrap_or((part, ""));
            let key = decode_component(key);
            if key.is_empty() || query.get(&key).is_some() {
                continue;
            }
            query.pairs.push((key, decode_component(value)));
        }
        query
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key.to_string(), value)),
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k != key);
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl fmt::Display for QueryString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, (key, value)) in self.pairs.iter().enumerate() {
            if idx > 0 {
                f.write_str("&")?;
            }
            write!(
                f,
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )?;
        }
        Ok(())
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(spaced)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigateOptions {
    pub replace: bool,
    pub scroll: bool,
}

impl NavigateOptions {
    /// Filter changes push a history entry and keep the viewport where it is.
    pub const FILTER: NavigateOptions = NavigateOptions {
        replace: false,
        scroll: false,
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: QueryString,
}

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: QueryString::new(),
        }
    }

    pub fn parse(href: &str) -> Self {
        let (path, query) = href.split_once('?').unwrap_or((href, ""));
        Self {
            path: path.to_string(),
            query: QueryString::parse(query),
        }
    }

    pub fn href(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query)
        }
    }
}

/// Back stack of visited locations for one mounted view.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    current: Location,
    back: Vec<Location>,
    last_options: Option<NavigateOptions>,
}

impl History {
    pub fn new(initial: Location) -> Self {
        Self {
            current: initial,
            back: Vec::new(),
            last_options: None,
        }
    }

    pub fn current(&self) -> &Location {
        &self.current
    }

    pub fn last_options(&self) -> Option<NavigateOptions> {
        self.last_options
    }

    pub fn navigate(&mut self, next: Location, options: NavigateOptions) {
        self.last_options = Some(options);
        if next == self.current {
            return;
        }
        let previous = std::mem::replace(&mut self.current, next);
        if !options.replace {
            self.back.push(previous);
        }
    }

    pub fn can_go_back(&self) -> bool {
        !self.back.is_empty()
    }

    pub fn back(&mut self) -> bool {
        match self.back.pop() {
            Some(previous) => {
                self.current = previous;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_decodes_and_keeps_first_duplicate() {
        let query = QueryString::parse("?search=acme%20corp&status=new,won&status=lost&owner=");

        assert_eq!(query.get("search"), Some("acme corp"));
        assert_eq!(query.get("status"), Some("new,won"));
        assert_eq!(query.get("owner"), Some(""));
        assert_eq!(query.to_string(), "search=acme%20corp&status=new%2Cwon&owner=");
    }

    #[test]
    fn set_rewrites_in_place_and_display_encodes() {
        let mut query = QueryString::parse("search=a&page=3");
        query.set("search", "b c");
        query.set("limit", "50");

        assert_eq!(query.to_string(), "search=b%20c&page=3&limit=50");
    }

    #[test]
    fn history_push_and_back() {
        let mut history = History::new(Location::parse("/leads?page=2"));
        history.navigate(Location::parse("/leads?page=3"), NavigateOptions::FILTER);

        assert!(history.can_go_back());
        assert_eq!(history.last_options().map(|o| o.scroll), Some(false));
        assert!(history.back());
        assert_eq!(history.current().href(), "/leads?page=2");
        assert!(!history.back());
    }
}

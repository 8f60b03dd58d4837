//! Route matching module
//!
//! Path patterns are segment templates such as
//! `/api/restaurantes/{id}/pedidos/{pid}`. Literal segments compare ASCII
//! case-insensitively; `{name}` segments capture one non-empty segment.

/// One segment of a compiled pattern
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(&'static str),
    Capture(&'static str),
}

/// A compiled path template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    source: &'static str,
    segments: Vec<Segment>,
}

/// Values captured from a matched path, in pattern order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    values: Vec<(&'static str, String)>,
}

impl PathPattern {
    pub fn new(source: &'static str) -> Self {
        let segments = split_segments(source)
            .map(|seg| {
                seg.strip_prefix('{')
                    .and_then(|s| s.strip_suffix('}'))
                    .map_or(Segment::Literal(seg), Segment::Capture)
            })
            .collect();
        Self { source, segments }
    }

    pub const fn as_str(&self) -> &'static str {
        self.source
    }

    /// Match `path` (query string already removed) against this pattern
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let mut params = PathParams::default();
        let mut parts = split_segments(path);

        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Literal(lit) => {
                    if !lit.eq_ignore_ascii_case(part) {
                        return None;
                    }
                }
                Segment::Capture(name) => {
                    if part.is_empty() {
                        return None;
                    }
                    params.values.push((*name, part.to_string()));
                }
            }
        }

        // Extra trailing segments mean a longer path, not a match
        if parts.next().is_some() {
            return None;
        }
        Some(params)
    }
}

impl PathParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Captured segment parsed as a 32-bit id; `None` when absent or non-numeric
    pub fn int(&self, name: &str) -> Option<i32> {
        self.get(name).and_then(|v| v.parse().ok())
    }
}

/// Segments after the leading `/`; `"/"` yields a single empty segment
fn split_segments(path: &str) -> std::str::Split<'_, char> {
    path.strip_prefix('/').unwrap_or(path).split('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_match_is_case_insensitive() {
        let pattern = PathPattern::new("/api/restaurantes");
        assert!(pattern.matches("/api/restaurantes").is_some());
        assert!(pattern.matches("/API/Restaurantes").is_some());
        assert!(pattern.matches("/api/restaurantes/").is_none());
        assert!(pattern.matches("/api/restaurantes/7").is_none());
        assert!(pattern.matches("/api").is_none());
    }

    #[test]
    fn test_captures() {
        let pattern = PathPattern::new("/api/restaurantes/{id}/pedidos/{pid}");
        let params = pattern.matches("/api/restaurantes/7/pedidos/31").unwrap();
        assert_eq!(params.get("id"), Some("7"));
        assert_eq!(params.int("pid"), Some(31));
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn test_non_numeric_capture_still_matches() {
        let pattern = PathPattern::new("/api/pedidos/{id}/finalizar");
        let params = pattern.matches("/api/pedidos/abc/finalizar").unwrap();
        assert_eq!(params.get("id"), Some("abc"));
        assert_eq!(params.int("id"), None);
    }

    #[test]
    fn test_empty_capture_does_not_match() {
        let pattern = PathPattern::new("/api/usuarios/{cedula}");
        assert!(pattern.matches("/api/usuarios/").is_none());
        assert!(pattern.matches("/api/usuarios/1-234-567").is_some());
    }

    #[test]
    fn test_overlapping_prefixes_are_distinct() {
        let list = PathPattern::new("/api/restaurantes/{id}/pedidos");
        let detail = PathPattern::new("/api/restaurantes/{id}/pedidos/{pid}");
        let status = PathPattern::new("/api/restaurantes/{id}/pedidos/{pid}/estado");

        let path = "/api/restaurantes/7/pedidos/3";
        assert!(list.matches(path).is_none());
        assert!(detail.matches(path).is_some());
        assert!(status.matches(path).is_none());
        assert!(status.matches("/api/restaurantes/7/pedidos/3/estado").is_some());
    }
}

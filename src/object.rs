use crate::part::BufferedPart;

/// A fully materialized `multipart/related` compound object.
///
/// The root part, when present, is always at index 0. Non-root parts keep
/// their relative wire order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompoundObject {
    media_type: Option<String>,
    start: Option<String>,
    start_info: Option<String>,
    parts: Vec<BufferedPart>,
}

impl CompoundObject {
    /// Creates an empty object carrying the `type`, canonical `start` and
    /// `start-info` parameters.
    pub fn new(
        media_type: Option<String>,
        start: Option<String>,
        start_info: Option<String>,
    ) -> Self {
        Self {
            media_type,
            start,
            start_info,
            parts: Vec::new(),
        }
    }

    /// Appends a part; a root part is moved in front of everything collected
    /// so far.
    pub fn push(&mut self, part: BufferedPart) {
        if part.is_root() {
            self.parts.insert(0, part);
        } else {
            self.parts.push(part);
        }
    }

    /// Declared media type of the root part (`type` parameter).
    pub fn media_type(&self) -> Option<&str> {
        self.media_type.as_deref()
    }

    /// Canonical Content-ID of the root part (`start` parameter).
    pub fn start(&self) -> Option<&str> {
        self.start.as_deref()
    }

    /// Auxiliary `start-info` parameter.
    pub fn start_info(&self) -> Option<&str> {
        self.start_info.as_deref()
    }

    /// Returns the root part.
    pub fn root(&self) -> Option<&BufferedPart> {
        self.parts.first().filter(|part| part.is_root())
    }

    /// Finds a part by canonical Content-ID, e.g. to resolve a `cid:` URL.
    pub fn part_by_content_id(&self, content_id: &str) -> Option<&BufferedPart> {
        let wanted = content_id.strip_prefix("cid:").unwrap_or(content_id);
        if wanted.is_empty() {
            return None;
        }

        self.parts.iter().find(|part| part.content_id() == wanted)
    }

    /// Returns all parts, root first.
    pub fn parts(&self) -> &[BufferedPart] {
        &self.parts
    }

    /// Consumes the object and returns its parts, root first.
    pub fn into_parts(self) -> Vec<BufferedPart> {
        self.parts
    }

    /// Returns an iterator over the parts, root first.
    pub fn iter(&self) -> std::slice::Iter<'_, BufferedPart> {
        self.parts.iter()
    }

    /// Returns the number of parts.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Returns `true` when the object has no parts.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl<'a> IntoIterator for &'a CompoundObject {
    type Item = &'a BufferedPart;
    type IntoIter = std::slice::Iter<'a, BufferedPart>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.iter()
    }
}

impl IntoIterator for CompoundObject {
    type Item = BufferedPart;
    type IntoIter = std::vec::IntoIter<BufferedPart>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.into_iter()
    }
}

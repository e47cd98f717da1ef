/// Settings shared by address creation and resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XPointerOptions {
    wrap_scheme: bool,
    prefer_ids: bool,
    ancestor_ids: bool,
    element_scheme: bool,
}

impl Default for XPointerOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl XPointerOptions {
    pub fn new() -> Self {
        Self { wrap_scheme: true, prefer_ids: true, ancestor_ids: true, element_scheme: true }
    }

    /// Wrap created addresses as `xpointer(...)`.
    pub fn with_wrap_scheme(mut self, wrap: bool) -> Self {
        self.wrap_scheme = wrap;
        self
    }

    pub fn wrap_scheme(&self) -> bool {
        self.wrap_scheme
    }

    /// Address elements carrying an id as `id("X")`.
    pub fn with_prefer_ids(mut self, prefer: bool) -> Self {
        self.prefer_ids = prefer;
        self
    }

    pub fn prefer_ids(&self) -> bool {
        self.prefer_ids
    }

    /// Start child paths at the nearest ancestor carrying an id instead of the root.
    pub fn with_ancestor_ids(mut self, enabled: bool) -> Self {
        self.ancestor_ids = enabled;
        self
    }

    pub fn ancestor_ids(&self) -> bool {
        self.ancestor_ids
    }

    /// Accept the `element()` scheme when resolving.
    pub fn with_element_scheme(mut self, enabled: bool) -> Self {
        self.element_scheme = enabled;
        self
    }

    pub fn element_scheme(&self) -> bool {
        self.element_scheme
    }
}

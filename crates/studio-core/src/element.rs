/// Observable properties of an event target.
///
/// Implemented per platform so the classifier never touches a DOM API directly.
pub trait Element {
    /// Upper-case tag name for HTML elements (`INPUT`, `SELECT`, ...).
    fn tag_name(&self) -> String;

    /// The `type` property of an `INPUT`; `None` for other elements.
    fn input_type(&self) -> Option<String>;

    /// Checked state at the time the event is observed.
    fn checked(&self) -> bool;

    /// Current form value, if the element has one.
    fn value(&self) -> Option<String>;

    fn is_tag(&self, tag: &str) -> bool {
        self.tag_name().eq_ignore_ascii_case(tag)
    }
}

impl<T: Element + ?Sized> Element for &T {
    fn tag_name(&self) -> String {
        (**self).tag_name()
    }

    fn input_type(&self) -> Option<String> {
        (**self).input_type()
    }

    fn checked(&self) -> bool {
        (**self).checked()
    }

    fn value(&self) -> Option<String> {
        (**self).value()
    }
}

/// Derives a unique selector string for an element.
pub trait SelectorService<E: ?Sized> {
    fn selector_for(&self, element: &E) -> String;
}

impl<E: ?Sized, F> SelectorService<E> for F
where
    F: Fn(&E) -> String,
{
    fn selector_for(&self, element: &E) -> String {
        self(element)
    }
}

//! Class reference keys
//!
//! A [`ClassRef`] names one class: the namespace context that defines it plus
//! its fully qualified name. The context is compared by identity (`Arc`
//! pointer), never by contents — two structurally identical contexts are still
//! distinct namespaces, and the same name under each of them is a distinct
//! cache subject.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A cache key for one class in one namespace context.
///
/// `C` is the caller's namespace-context type and stays opaque to the cache.
/// A reference without a context ([`ClassRef::rooted`]) addresses the root
/// namespace, which is a first-class key like any other.
///
/// Cloning is cheap: two reference-count bumps.
pub struct ClassRef<C> {
    context: Option<Arc<C>>,
    name: Arc<str>,
}

impl<C> ClassRef<C> {
    /// Create a reference to `name` as defined by `context`.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty. Caching under a degenerate key is a
    /// contract violation, not a recoverable condition.
    #[must_use]
    pub fn new(context: Arc<C>, name: impl Into<Arc<str>>) -> Self {
        Self {
            context: Some(context),
            name: checked_name(name),
        }
    }

    /// Create a reference to `name` in the root namespace.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty.
    #[must_use]
    pub fn rooted(name: impl Into<Arc<str>>) -> Self {
        Self {
            context: None,
            name: checked_name(name),
        }
    }

    /// The fully qualified class name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The defining namespace context, or `None` for the root namespace.
    #[inline]
    #[must_use]
    pub fn context(&self) -> Option<&Arc<C>> {
        self.context.as_ref()
    }

    /// Whether this reference addresses the root namespace.
    #[inline]
    #[must_use]
    pub fn is_rooted(&self) -> bool {
        self.context.is_none()
    }

    /// Shared handle to the name, used as the inner-table key.
    pub(crate) fn name_key(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    // A live `Arc` allocation never sits at address zero, so the root
    // sentinel cannot collide with a scoped context.
    fn context_addr(&self) -> usize {
        self.context.as_ref().map_or(0, |ctx| Arc::as_ptr(ctx).addr())
    }
}

impl<C> Clone for ClassRef<C> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
            name: Arc::clone(&self.name),
        }
    }
}

impl<C> PartialEq for ClassRef<C> {
    fn eq(&self, other: &Self) -> bool {
        self.context_addr() == other.context_addr() && self.name == other.name
    }
}

impl<C> Eq for ClassRef<C> {}

impl<C> Hash for ClassRef<C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.context_addr().hash(state);
        self.name.hash(state);
    }
}

impl<C> fmt::Debug for ClassRef<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassRef")
            .field("name", &self.name)
            .field("context", &self.context.as_ref().map(Arc::as_ptr))
            .finish()
    }
}

fn checked_name(name: impl Into<Arc<str>>) -> Arc<str> {
    let name = name.into();
    assert!(!name.is_empty(), "class name must not be empty");
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn same_context_and_name_are_equal() {
        let ctx = Arc::new(String::from("app"));
        let a = ClassRef::new(Arc::clone(&ctx), "com.example.Page");
        let b = ClassRef::new(ctx, "com.example.Page");

        assert_eq!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn identical_content_is_not_the_same_context() {
        // Two contexts with equal contents are still separate namespaces.
        let a = ClassRef::new(Arc::new(String::from("app")), "com.example.Page");
        let b = ClassRef::new(Arc::new(String::from("app")), "com.example.Page");

        assert_ne!(a, b);
    }

    #[test]
    fn root_differs_from_scoped() {
        let scoped = ClassRef::new(Arc::new(()), "com.example.Page");
        let rooted = ClassRef::rooted("com.example.Page");

        assert!(rooted.is_rooted());
        assert!(!scoped.is_rooted());
        assert_ne!(scoped, rooted);
        assert_eq!(rooted, ClassRef::rooted("com.example.Page"));
    }

    #[test]
    fn different_names_differ() {
        let ctx = Arc::new(());
        let a = ClassRef::new(Arc::clone(&ctx), "com.example.Page");
        let b = ClassRef::new(ctx, "com.example.Form");

        assert_ne!(a, b);
    }

    #[test]
    fn usable_as_hash_map_key() {
        let ctx = Arc::new(());
        let mut map = HashMap::new();
        map.insert(ClassRef::new(Arc::clone(&ctx), "com.example.Page"), 1);
        map.insert(ClassRef::rooted("com.example.Page"), 2);

        assert_eq!(
            map.get(&ClassRef::new(ctx, "com.example.Page")),
            Some(&1)
        );
        assert_eq!(map.get(&ClassRef::<()>::rooted("com.example.Page")), Some(&2));
        assert_eq!(map.len(), 2);
    }

    #[test]
    #[should_panic(expected = "class name must not be empty")]
    fn empty_name_is_rejected() {
        let _ = ClassRef::new(Arc::new(()), "");
    }

    #[test]
    #[should_panic(expected = "class name must not be empty")]
    fn empty_rooted_name_is_rejected() {
        let _ = ClassRef::<()>::rooted("");
    }
}

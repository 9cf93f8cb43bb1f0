use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

const NAMESPACE: &str = "lifecycle";

/// Namespaced, typed key into [`Resources`](super::Resources)
///
/// The key is displayed as `lifecycle.<name>`, which keeps plugin keys from
/// colliding with anything else sharing the store. The type parameter pins
/// the type of the value stored under it.
///
/// ```rust
/// use plugin_lifecycle::resource::ResourceKey;
///
/// const LISTEN_ADDR: ResourceKey<String> = ResourceKey::new("http.addr");
/// assert_eq!(LISTEN_ADDR.to_string(), "lifecycle.http.addr");
/// ```
pub struct ResourceKey<T> {
    name: Cow<'static, str>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ResourceKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            _marker: PhantomData,
        }
    }

    /// Key with a name computed at runtime
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            _marker: PhantomData,
        }
    }

    /// The bare name, without the namespace
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T> Clone for ResourceKey<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for ResourceKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceKey")
            .field("name", &self.name)
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> fmt::Display for ResourceKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", NAMESPACE, self.name)
    }
}

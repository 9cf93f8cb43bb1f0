//! Shared resource store
//!
//! Plugins publish resources (a server handle, a connection pool) during
//! their `initialize` phase; later plugins and the caller read them back,
//! either by type or by [`ResourceKey`]. The store also carries the
//! cancellation signal fired once teardown has finished.

mod key;
mod store;

pub use key::ResourceKey;
pub use store::Resources;

/// Implemented by anything that carries a [`Resources`] store
pub trait HasResources {
    fn resources(&self) -> &Resources;
}

impl HasResources for Resources {
    fn resources(&self) -> &Resources {
        self
    }
}

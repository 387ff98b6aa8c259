//! Route lookup.
//!
//! # Responsibilities
//! - Store routes in registration order
//! - Resolve (method, path) to the first route accepting both
//!
//! # Design Decisions
//! - Append-only: no removal, no in-place mutation of a stored route
//! - Copy-on-write snapshot swapped atomically (`ArcSwap`), so lookups never take a lock
//! - O(n) scan short-circuited on first match; no specificity ranking
//! - Duplicate templates are allowed; the earlier registration always wins

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::routing::route::Route;

/// Registration-ordered, concurrently readable route table.
pub struct RouteRegistry {
    routes: ArcSwap<Vec<Arc<Route>>>,
}

impl RouteRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            routes: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Append a route. Never rejects duplicates.
    ///
    /// Safe to call while other threads are resolving: readers keep the
    /// snapshot they loaded, new lookups see the extended table.
    pub fn add(&self, route: Route) -> Arc<Route> {
        let route = Arc::new(route);
        self.routes.rcu(|current| {
            let mut next = Vec::with_capacity(current.len() + 1);
            next.extend(current.iter().cloned());
            next.push(route.clone());
            next
        });

        tracing::debug!(
            route = %route.label(),
            pattern = %route.template(),
            methods = %route.methods(),
            "Route registered"
        );
        route
    }

    /// Return the first-registered route whose template matches `path` and
    /// whose method set contains `method` (compared uppercase).
    pub fn resolve(&self, method: &str, path: &str) -> Option<Arc<Route>> {
        self.routes
            .load()
            .iter()
            .find(|route| route.accepts(method, path))
            .cloned()
    }

    /// A point-in-time copy of the table, in registration order.
    pub fn snapshot(&self) -> Arc<Vec<Arc<Route>>> {
        self.routes.load_full()
    }

    pub fn len(&self) -> usize {
        self.routes.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RouteRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RouteRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteRegistry")
            .field("routes", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::context::RequestContext;
    use crate::dispatch::handler::{Handler, HandlerResult};
    use crate::http::response::WebResponse;
    use crate::routing::route::RouteSpec;

    fn handler() -> Arc<dyn Handler> {
        Arc::new(|_ctx: &mut RequestContext| HandlerResult::Response(WebResponse::ok()))
    }

    fn route(spec: RouteSpec) -> Route {
        Route::new(spec, handler()).unwrap()
    }

    #[test]
    fn test_empty_registry_resolves_nothing() {
        let registry = RouteRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.resolve("GET", "/").is_none());
    }

    #[test]
    fn test_first_registered_wins() {
        let registry = RouteRegistry::new();
        registry.add(route(RouteSpec::new("/a/{x}").name("r1")));
        registry.add(route(RouteSpec::new("/a/b").name("r2")));

        let found = registry.resolve("GET", "/a/b").unwrap();
        assert_eq!(found.label(), "r1");
    }

    #[test]
    fn test_method_filters_candidates() {
        let registry = RouteRegistry::new();
        registry.add(route(RouteSpec::new("/items").method("POST").name("create")));
        registry.add(route(RouteSpec::new("/items").name("list")));

        assert_eq!(registry.resolve("GET", "/items").unwrap().label(), "list");
        assert_eq!(registry.resolve("post", "/items").unwrap().label(), "create");
        assert!(registry.resolve("DELETE", "/items").is_none());
    }

    #[test]
    fn test_duplicates_coexist() {
        let registry = RouteRegistry::new();
        registry.add(route(RouteSpec::new("/dup").name("first")));
        registry.add(route(RouteSpec::new("/dup").name("second")));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.resolve("GET", "/dup").unwrap().label(), "first");
    }

    #[test]
    fn test_snapshot_is_stable_across_appends() {
        let registry = RouteRegistry::new();
        registry.add(route(RouteSpec::new("/one")));
        let before = registry.snapshot();

        registry.add(route(RouteSpec::new("/two")));

        assert_eq!(before.len(), 1);
        assert_eq!(registry.snapshot().len(), 2);
        assert!(registry.resolve("GET", "/two").is_some());
    }
}

//! Endpoint catalog.
//!
//! The catalog is the single source of endpoint types for a registration pass. Types
//! get in either through explicit calls ([`Catalog::register`],
//! [`Catalog::register_with`]) or through link-time submissions made with
//! [`register_endpoint!`](crate::register_endpoint), which
//! [`Catalog::from_inventory`] collects.

use std::any::TypeId;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::descriptor::Endpoint;
use crate::errors::DiscoveryError;

type Factory = Arc<dyn Fn() -> anyhow::Result<Arc<dyn Endpoint>> + Send + Sync>;

/// Link-time registration record produced by [`register_endpoint!`](crate::register_endpoint)
pub struct EndpointRegistration {
    pub type_id: fn() -> TypeId,
    pub type_name: fn() -> &'static str,
    pub factory: fn() -> anyhow::Result<Arc<dyn Endpoint>>,
}

inventory::collect!(EndpointRegistration);

/// Factory for endpoint types constructed through `Default`
///
/// # Errors
/// Never fails; the signature matches [`EndpointRegistration::factory`].
pub fn construct_default<T: Endpoint + Default>() -> anyhow::Result<Arc<dyn Endpoint>> {
    Ok(Arc::new(T::default()))
}

/// Submit an endpoint type to the link-time catalog.
///
/// ```ignore
/// #[derive(Default)]
/// struct ListOrders;
/// impl Endpoint for ListOrders { /* ... */ }
/// routegate::register_endpoint!(ListOrders);
///
/// // Fallible construction: `fn() -> anyhow::Result<Search>`
/// routegate::register_endpoint!(Search, ctor = Search::from_env);
/// ```
#[macro_export]
macro_rules! register_endpoint {
    ($ty:ty) => {
        $crate::__private::inventory::submit! {
            $crate::catalog::EndpointRegistration {
                type_id: ::std::any::TypeId::of::<$ty>,
                type_name: ::std::any::type_name::<$ty>,
                factory: $crate::catalog::construct_default::<$ty>,
            }
        }
    };
    ($ty:ty, ctor = $ctor:expr) => {
        $crate::__private::inventory::submit! {
            $crate::catalog::EndpointRegistration {
                type_id: ::std::any::TypeId::of::<$ty>,
                type_name: ::std::any::type_name::<$ty>,
                factory: {
                    fn __routegate_make()
                    -> $crate::__private::anyhow::Result<
                        ::std::sync::Arc<dyn $crate::descriptor::Endpoint>,
                    > {
                        let endpoint: $ty = ($ctor)()?;
                        Ok(::std::sync::Arc::new(endpoint))
                    }
                    __routegate_make
                },
            }
        }
    };
}

#[derive(Clone)]
struct CatalogEntry {
    type_id: TypeId,
    type_name: String,
    factory: Factory,
}

/// Endpoint type selected by [`Catalog::discover`]
#[derive(Clone)]
pub struct DiscoveredEndpoint {
    name: String,
    factory: Factory,
}

impl DiscoveredEndpoint {
    /// Fully qualified type name; used in logs, errors and policy names
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Construct the single instance used for this registration pass.
    ///
    /// # Errors
    /// Whatever the type's factory reports.
    pub fn instantiate(&self) -> anyhow::Result<Arc<dyn Endpoint>> {
        (self.factory)()
    }
}

impl fmt::Debug for DiscoveredEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscoveredEndpoint")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Registry of endpoint types available to the registration driver
#[derive(Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    excluded_prefixes: Vec<String>,
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding every type submitted with [`register_endpoint!`](crate::register_endpoint)
    /// anywhere in the linked binary
    #[must_use]
    pub fn from_inventory() -> Self {
        let mut catalog = Self::new();
        for reg in inventory::iter::<EndpointRegistration> {
            let factory = reg.factory;
            catalog.push((reg.type_id)(), (reg.type_name)(), Arc::new(factory));
        }
        catalog
    }

    /// Register an endpoint type constructed through `Default`
    #[must_use]
    pub fn register<T: Endpoint + Default>(mut self) -> Self {
        self.push(
            TypeId::of::<T>(),
            std::any::type_name::<T>(),
            Arc::new(construct_default::<T>),
        );
        self
    }

    /// Register an endpoint type with a fallible constructor
    #[must_use]
    pub fn register_with<T, F>(mut self, factory: F) -> Self
    where
        T: Endpoint,
        F: Fn() -> anyhow::Result<T> + Send + Sync + 'static,
    {
        self.push(
            TypeId::of::<T>(),
            std::any::type_name::<T>(),
            Arc::new(move || -> anyhow::Result<Arc<dyn Endpoint>> { Ok(Arc::new(factory()?)) }),
        );
        self
    }

    /// Skip types whose path starts with any of `prefixes`
    #[must_use]
    pub fn exclude_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_prefixes
            .extend(prefixes.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Endpoint types to register, de-duplicated by [`TypeId`] and sorted by type name.
    ///
    /// The first registration of a type wins. Distinct types that print the same
    /// name are all kept, in registration order.
    ///
    /// # Errors
    /// Returns [`DiscoveryError`] when nothing is left after filtering.
    pub fn discover(&self) -> Result<Vec<DiscoveredEndpoint>, DiscoveryError> {
        let mut seen: HashSet<TypeId> = HashSet::new();
        let mut selected: Vec<DiscoveredEndpoint> = Vec::new();
        let mut excluded = 0usize;

        for entry in &self.entries {
            if self.is_excluded(&entry.type_name) {
                tracing::trace!(endpoint = %entry.type_name, "Excluded by namespace filter");
                excluded += 1;
                continue;
            }
            if seen.insert(entry.type_id) {
                selected.push(DiscoveredEndpoint {
                    name: entry.type_name.clone(),
                    factory: Arc::clone(&entry.factory),
                });
            }
        }

        if selected.is_empty() {
            return Err(DiscoveryError { excluded });
        }

        selected.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(selected)
    }

    fn push(&mut self, type_id: TypeId, type_name: &str, factory: Factory) {
        self.entries.push(CatalogEntry {
            type_id,
            type_name: type_name.to_owned(),
            factory,
        });
    }

    fn is_excluded(&self, type_name: &str) -> bool {
        self.excluded_prefixes
            .iter()
            .any(|prefix| type_name.starts_with(prefix.as_str()))
    }
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field(
                "entries",
                &self.entries.iter().map(|e| &e.type_name).collect::<Vec<_>>(),
            )
            .field("excluded_prefixes", &self.excluded_prefixes)
            .finish()
    }
}

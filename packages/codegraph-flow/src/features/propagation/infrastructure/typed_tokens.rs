//! Typed token manager
//!
//! [`TokenManager`] over [`SymbolSet`] where every symbol is an abstract
//! object with a declared type. Objects are memoized per allocation site,
//! so re-running an analysis hands out the same symbols again.
//!
//! Type filters keep the tokens whose type is the named type or one of its
//! (transitive) subtypes. They read the shared registry at apply time,
//! which keeps them correct for objects allocated after the filter was
//! built.

use crate::features::propagation::domain::{Symbol, SymbolSet};
use crate::features::propagation::ports::{FilterRef, TokenManager};
use parking_lot::{Mutex, RwLock};
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;

#[derive(Debug, Default)]
struct TypeRegistry {
    type_ids: FxHashMap<String, u32>,
    type_names: Vec<String>,
    /// Direct supertypes per type id
    supertypes: Vec<Vec<u32>>,
    /// Type id per symbol
    symbol_types: Vec<u32>,
    sites: FxHashMap<String, Symbol>,
}

impl TypeRegistry {
    fn intern(&mut self, name: &str) -> u32 {
        if let Some(&id) = self.type_ids.get(name) {
            return id;
        }
        let id = self.type_names.len() as u32;
        self.type_ids.insert(name.to_string(), id);
        self.type_names.push(name.to_string());
        self.supertypes.push(Vec::new());
        id
    }

    fn is_subtype(&self, sub: u32, sup: u32) -> bool {
        let mut stack = vec![sub];
        let mut seen = FxHashSet::default();
        while let Some(ty) = stack.pop() {
            if ty == sup {
                return true;
            }
            if seen.insert(ty) {
                stack.extend(self.supertypes[ty as usize].iter().copied());
            }
        }
        false
    }

    fn symbol_type(&self, symbol: Symbol) -> Option<u32> {
        self.symbol_types.get(symbol as usize).copied()
    }
}

/// Symbol-based token manager with a class hierarchy
#[derive(Default)]
pub struct TypedTokenManager {
    registry: Arc<RwLock<TypeRegistry>>,
    filters: Mutex<FxHashMap<u32, FilterRef<SymbolSet>>>,
}

impl std::fmt::Debug for TypedTokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.registry.read();
        f.debug_struct("TypedTokenManager")
            .field("types", &registry.type_names.len())
            .field("symbols", &registry.symbol_types.len())
            .field("cached_filters", &self.filters.lock().len())
            .finish()
    }
}

impl TypedTokenManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `name` with its direct supertypes, returns its type id
    pub fn declare_type(&self, name: &str, supertypes: &[&str]) -> u32 {
        let mut registry = self.registry.write();
        let id = registry.intern(name);
        for sup in supertypes {
            let sup_id = registry.intern(sup);
            if !registry.supertypes[id as usize].contains(&sup_id) {
                registry.supertypes[id as usize].push(sup_id);
            }
        }
        id
    }

    /// Abstract object allocated at `site`
    ///
    /// The first call for a site fixes the object's type.
    pub fn object(&self, type_name: &str, site: &str) -> Symbol {
        let mut registry = self.registry.write();
        if let Some(&symbol) = registry.sites.get(site) {
            return symbol;
        }
        let ty = registry.intern(type_name);
        let symbol = registry.symbol_types.len() as Symbol;
        registry.symbol_types.push(ty);
        registry.sites.insert(site.to_string(), symbol);
        symbol
    }

    pub fn type_of(&self, symbol: Symbol) -> Option<String> {
        let registry = self.registry.read();
        registry
            .symbol_type(symbol)
            .map(|ty| registry.type_names[ty as usize].clone())
    }

    pub fn is_subtype(&self, sub: &str, sup: &str) -> bool {
        let registry = self.registry.read();
        match (registry.type_ids.get(sub), registry.type_ids.get(sup)) {
            (Some(&sub), Some(&sup)) => registry.is_subtype(sub, sup),
            _ => false,
        }
    }

    pub fn symbol_count(&self) -> usize {
        self.registry.read().symbol_types.len()
    }
}

impl TokenManager<SymbolSet> for TypedTokenManager {
    fn type_filter(&self, type_name: &str) -> Option<FilterRef<SymbolSet>> {
        let target = self.analysis_type(type_name)?;

        let mut filters = self.filters.lock();
        if let Some(filter) = filters.get(&target) {
            return Some(Arc::clone(filter));
        }

        let registry = Arc::clone(&self.registry);
        let filter: FilterRef<SymbolSet> = Arc::new(move |mut tokens: SymbolSet| {
            let registry = registry.read();
            tokens.retain(|&symbol| {
                registry
                    .symbol_type(symbol)
                    .is_some_and(|ty| registry.is_subtype(ty, target))
            });
            tokens
        });
        filters.insert(target, Arc::clone(&filter));
        Some(filter)
    }

    fn analysis_type(&self, type_name: &str) -> Option<u32> {
        self.registry.read().type_ids.get(type_name).copied()
    }

    fn reset(&self) {
        self.filters.lock().clear();
    }
}

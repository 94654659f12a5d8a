// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Memoized class to trait mapping.
//!
//! A class exposes every trait it uses directly, every trait used by its
//! ancestors, and every trait those traits use in turn. The set is computed
//! on first request and cached for the rest of the run; the cache is never
//! invalidated, so rewrites made during the run do not change answers.
//!
//! Classes the resolver does not know end the ancestor walk. So does an
//! ancestor cycle, which is logged and otherwise treated as the end of the
//! chain.

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::{trace, warn};

use crate::visitor::declarations::{ClassResolver, DeclarationTable};

pub struct CapabilityIndex {
    resolver: Box<dyn ClassResolver>,
    cache: HashMap<String, BTreeSet<String>>,
}

impl Default for CapabilityIndex {
    fn default() -> Self {
        Self::new(DeclarationTable::new())
    }
}

impl std::fmt::Debug for CapabilityIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityIndex")
            .field("cached_classes", &self.cache.len())
            .finish()
    }
}

fn normalize(fqcn: &str) -> String {
    fqcn.trim_start_matches('\\').to_ascii_lowercase()
}

impl CapabilityIndex {
    pub fn new(resolver: impl ClassResolver + 'static) -> Self {
        CapabilityIndex {
            resolver: Box::new(resolver),
            cache: HashMap::new(),
        }
    }

    /// Fully qualified traits exposed by `class`, inherited ones included.
    pub fn capabilities_of(&mut self, class: &str) -> &BTreeSet<String> {
        let key = normalize(class);
        if !self.cache.contains_key(&key) {
            let traits = self.compute(class);
            trace!(class, traits = traits.len(), "computed capabilities");
            self.cache.insert(key.clone(), traits);
        }
        &self.cache[&key]
    }

    /// Returns true if `class` exposes `capability`. Names compare
    /// case-insensitively.
    pub fn uses_capability(&mut self, class: &str, capability: &str) -> bool {
        let wanted = normalize(capability);
        self.capabilities_of(class)
            .iter()
            .any(|t| normalize(t) == wanted)
    }

    /// Method names declared by a trait, if its declaration is known.
    pub fn trait_members(&self, capability: &str) -> Option<Vec<String>> {
        self.resolver
            .trait_decl(capability)
            .map(|declaration| declaration.members.clone())
    }

    /// Number of classes computed so far.
    pub fn cached_classes(&self) -> usize {
        self.cache.len()
    }

    fn compute(&self, class: &str) -> BTreeSet<String> {
        let mut traits = BTreeSet::new();
        let mut seen_classes = HashSet::new();
        let mut current = Some(class.trim_start_matches('\\').to_string());
        while let Some(name) = current.take() {
            if !seen_classes.insert(normalize(&name)) {
                warn!(class, ancestor = %name, "ancestor cycle, stopping walk");
                break;
            }
            let Some(declaration) = self.resolver.class(&name) else {
                break;
            };
            for used in &declaration.traits {
                self.add_trait(used, &mut traits);
            }
            current = declaration.parent.clone();
        }
        traits
    }

    /// Add a trait and, transitively, the traits it uses.
    fn add_trait(&self, name: &str, traits: &mut BTreeSet<String>) {
        let mut pending = vec![name.trim_start_matches('\\').to_string()];
        let mut seen = HashSet::new();
        while let Some(name) = pending.pop() {
            if !seen.insert(normalize(&name)) {
                continue;
            }
            if let Some(declaration) = self.resolver.trait_decl(&name) {
                pending.extend(declaration.traits.iter().cloned());
            }
            traits.insert(name);
        }
    }
}

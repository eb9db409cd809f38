//! Domain-to-adapter resolution
//!
//! The registry owns the adapter table (built-ins plus user overrides) and
//! the per-domain binding table. Resolution is a pure configuration lookup:
//! a domain-specific binding, falling back to the configured default
//! adapter, with any domain-specific extra arguments merged onto the named
//! base adapter.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;

use super::error::RegistryError;
use super::{BackendAdapter, EnvValue, builtin_adapters};
use crate::config::{AdapterOverride, DocrConfig, DomainBinding};

/// Static adapter configuration, built once at startup
#[derive(Debug)]
pub struct AdapterRegistry {
    adapters: HashMap<String, Arc<BackendAdapter>>,
    domains: HashMap<String, DomainBinding>,
    default_adapter: String,
}

impl AdapterRegistry {
    /// Build the registry from the built-in table and user configuration
    ///
    /// Adapter overrides are applied here so that invalid references and
    /// patterns fail at setup rather than at first lookup.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError` if an override references an unknown adapter
    /// or carries an invalid error pattern.
    pub fn from_config(config: &DocrConfig) -> Result<Self, RegistryError> {
        let mut adapters: HashMap<String, BackendAdapter> = builtin_adapters()
            .into_iter()
            .map(|a| (a.name.clone(), a))
            .collect();

        for (name, user_override) in &config.adapters {
            let adapter =
                adapters
                    .get_mut(name)
                    .ok_or_else(|| RegistryError::UnknownAdapter {
                        name: name.clone(),
                        referenced_by: format!("adapter override '{name}'"),
                    })?;
            apply_override(adapter, user_override)?;
        }

        Ok(Self {
            adapters: adapters
                .into_iter()
                .map(|(name, adapter)| (name, Arc::new(adapter)))
                .collect(),
            domains: config.domains.clone(),
            default_adapter: config.default_adapter.clone(),
        })
    }

    /// Resolve the adapter for a domain key (e.g. a file type)
    ///
    /// Unmapped domains resolve to the default adapter. Domain bindings
    /// merge their extra arguments onto the base adapter.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::UnknownAdapter` if the binding (or the
    /// default) references an adapter name that does not exist.
    pub fn resolve(&self, domain: &str) -> Result<Arc<BackendAdapter>, RegistryError> {
        match self.domains.get(domain) {
            Some(binding) => {
                let base = self.adapters.get(&binding.adapter).ok_or_else(|| {
                    RegistryError::UnknownAdapter {
                        name: binding.adapter.clone(),
                        referenced_by: format!("domain '{domain}'"),
                    }
                })?;
                if binding.extra_args.is_empty() {
                    return Ok(Arc::clone(base));
                }
                let mut merged = (**base).clone();
                merged.args.extend(binding.extra_args.iter().cloned());
                Ok(Arc::new(merged))
            }
            None => self
                .adapters
                .get(&self.default_adapter)
                .cloned()
                .ok_or_else(|| RegistryError::UnknownAdapter {
                    name: self.default_adapter.clone(),
                    referenced_by: "default_adapter".to_string(),
                }),
        }
    }

    /// Look up a base adapter by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<BackendAdapter>> {
        self.adapters.get(name).cloned()
    }

    /// Iterate all base adapters, sorted by name
    #[must_use]
    pub fn adapters(&self) -> Vec<Arc<BackendAdapter>> {
        let mut all: Vec<_> = self.adapters.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }
}

/// Merge a user override onto a base adapter
fn apply_override(
    adapter: &mut BackendAdapter,
    user_override: &AdapterOverride,
) -> Result<(), RegistryError> {
    if let Some(args) = &user_override.args {
        adapter.args = args.clone();
    }
    for (key, value) in &user_override.env {
        adapter
            .env
            .retain(|(existing, _)| existing != key);
        adapter
            .env
            .push((key.clone(), EnvValue::Literal(value.clone())));
    }
    for pattern in &user_override.error_patterns {
        let compiled = Regex::new(pattern).map_err(|source| RegistryError::InvalidPattern {
            adapter: adapter.name.clone(),
            pattern: pattern.clone(),
            source,
        })?;
        adapter.error_patterns.push(compiled);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(
        domains: &[(&str, DomainBinding)],
        adapters: &[(&str, AdapterOverride)],
    ) -> DocrConfig {
        DocrConfig {
            domains: domains
                .iter()
                .map(|(k, v)| ((*k).to_string(), v.clone()))
                .collect(),
            adapters: adapters
                .iter()
                .map(|(k, v)| ((*k).to_string(), v.clone()))
                .collect(),
            ..DocrConfig::default()
        }
    }

    #[test]
    fn test_unmapped_domain_resolves_to_default() {
        let registry = AdapterRegistry::from_config(&DocrConfig::default()).unwrap();
        let adapter = registry.resolve("text").unwrap();
        assert_eq!(adapter.name, "man");
    }

    #[test]
    fn test_domain_binding_selects_adapter() {
        let config = config_with(
            &[(
                "cpp",
                DomainBinding {
                    adapter: "cppman".into(),
                    extra_args: vec![],
                },
            )],
            &[],
        );
        let registry = AdapterRegistry::from_config(&config).unwrap();
        assert_eq!(registry.resolve("cpp").unwrap().name, "cppman");
    }

    #[test]
    fn test_domain_extra_args_merge_onto_base() {
        let config = config_with(
            &[(
                "posix",
                DomainBinding {
                    adapter: "man".into(),
                    extra_args: vec!["-s".into(), "3p".into()],
                },
            )],
            &[],
        );
        let registry = AdapterRegistry::from_config(&config).unwrap();
        let adapter = registry.resolve("posix").unwrap();
        assert!(adapter.args.ends_with(&["-s".to_string(), "3p".to_string()]));
        // base adapter is untouched
        assert!(registry.get("man").unwrap().args.is_empty());
    }

    #[test]
    fn test_unknown_base_adapter_is_a_setup_error() {
        let config = config_with(
            &[],
            &[(
                "rustdoc",
                AdapterOverride {
                    args: Some(vec![]),
                    env: Default::default(),
                    error_patterns: vec![],
                },
            )],
        );
        let err = AdapterRegistry::from_config(&config).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownAdapter { name, .. } if name == "rustdoc"));
    }

    #[test]
    fn test_unknown_domain_target_fails_at_resolve() {
        let config = config_with(
            &[(
                "rust",
                DomainBinding {
                    adapter: "rustdoc".into(),
                    extra_args: vec![],
                },
            )],
            &[],
        );
        let registry = AdapterRegistry::from_config(&config).unwrap();
        assert!(registry.resolve("rust").is_err());
    }

    #[test]
    fn test_override_env_replaces_existing_key() {
        let mut env = std::collections::HashMap::new();
        env.insert("MANWIDTH".to_string(), "120".to_string());
        let config = config_with(
            &[],
            &[(
                "man",
                AdapterOverride {
                    args: None,
                    env,
                    error_patterns: vec![],
                },
            )],
        );
        let registry = AdapterRegistry::from_config(&config).unwrap();
        let man = registry.get("man").unwrap();
        let widths: Vec<_> = man.env.iter().filter(|(k, _)| k == "MANWIDTH").collect();
        assert_eq!(widths.len(), 1);
        assert_eq!(widths[0].1, EnvValue::Literal("120".into()));
    }

    #[test]
    fn test_invalid_override_pattern_is_rejected() {
        let config = config_with(
            &[],
            &[(
                "man",
                AdapterOverride {
                    args: None,
                    env: Default::default(),
                    error_patterns: vec!["(".into()],
                },
            )],
        );
        assert!(matches!(
            AdapterRegistry::from_config(&config),
            Err(RegistryError::InvalidPattern { .. })
        ));
    }
}

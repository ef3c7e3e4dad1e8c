//! Template registry - merges every template source into per-view candidate lists
//!
//! Merge order for each view:
//! 1. The macro-supplied template, if the device macros name an existing file
//! 2. Convention-named templates for the device's ancestor chain
//! 3. The built-in default for the view
//!
//! A path already listed at a higher priority is not listed again.

use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;

use crate::ancestors::AncestorResolver;
use crate::config::SearchConfig;
use crate::device::DeviceType;
use crate::macros::{MacroResolver, Macros};
use crate::search::{absolutize, DirectorySearch};
use crate::template::{TemplateCandidate, TemplateList, TemplateSource};
use crate::view::View;

/// Candidate lists for every view
pub type TemplateLists = BTreeMap<View, TemplateList>;

static EMPTY_LIST: TemplateList = TemplateList::new();

const FALLBACK_EXTENSION: &str = "ui";

/// Per-view template candidates for the currently bound device
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    resolver: AncestorResolver,
    search: DirectorySearch,
    builtin_dir: PathBuf,
    lists: TemplateLists,
}

impl TemplateRegistry {
    /// Create an empty registry from search configuration
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            resolver: AncestorResolver::new(config.root_type.clone()),
            search: DirectorySearch::new(config.directories.clone(), config.extensions.clone()),
            builtin_dir: absolutize(&config.builtin_dir),
            lists: empty_lists(),
        }
    }

    pub fn search(&self) -> &DirectorySearch {
        &self.search
    }

    pub fn resolver(&self) -> &AncestorResolver {
        &self.resolver
    }

    /// Path of the built-in default template for `view`
    ///
    /// The first extension with an existing file wins; if none exists the
    /// path uses the highest-precedence extension.
    pub fn default_template(&self, view: View) -> PathBuf {
        let path = |ext: &str| self.builtin_dir.join(format!("{}.{}", view.label(), ext));
        let extensions = self.search.extensions();
        extensions
            .iter()
            .map(|ext| path(ext))
            .find(|candidate| candidate.is_file())
            .unwrap_or_else(|| path(extensions.first().map(String::as_str).unwrap_or(FALLBACK_EXTENSION)))
    }

    /// Compute candidate lists without storing them
    ///
    /// With no device type only the macro and default sources contribute.
    /// Repeated calls with the same inputs and filesystem state return equal
    /// lists.
    pub fn compute(&self, device_type: Option<&DeviceType>, macros: &Macros) -> TemplateLists {
        let ancestors = device_type
            .map(|ty| self.resolver.resolve(ty))
            .unwrap_or_default();

        if let Some(ty) = device_type {
            debug!(device_type = %ty.name, ancestors = ?ancestors, "Searching for templates");
        }

        let mut lists = TemplateLists::new();
        for view in View::ALL {
            let mut list = TemplateList::new();

            if let Some(candidate) = MacroResolver::candidate(macros, view) {
                debug!(view = %view, path = %candidate.path.display(), "Adding macro template");
                list.push(candidate);
            }

            for path in self.search.find(&ancestors, view) {
                if list.contains(&path) {
                    continue;
                }
                debug!(view = %view, path = %path.display(), total = list.len() + 1, "Found new template");
                list.push(TemplateCandidate::new(path, TemplateSource::Hierarchy));
            }

            list.push(TemplateCandidate::new(
                self.default_template(view),
                TemplateSource::Default,
            ));

            lists.insert(view, list);
        }
        lists
    }

    /// Recompute and store the candidate lists
    pub fn recompute(&mut self, device_type: Option<&DeviceType>, macros: &Macros) -> &TemplateLists {
        self.lists = self.compute(device_type, macros);
        &self.lists
    }

    /// Drop all candidates
    pub fn clear(&mut self) {
        self.lists = empty_lists();
    }

    pub fn lists(&self) -> &TemplateLists {
        &self.lists
    }

    /// Candidates for `view`, highest priority first
    pub fn templates(&self, view: View) -> &TemplateList {
        self.lists.get(&view).unwrap_or(&EMPTY_LIST)
    }

    /// Highest-priority candidate for `view`
    pub fn best(&self, view: View) -> Option<&TemplateCandidate> {
        self.templates(view).first()
    }
}

fn empty_lists() -> TemplateLists {
    View::ALL.into_iter().map(|view| (view, TemplateList::new())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    struct Fixture {
        templates: TempDir,
        builtin: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                templates: TempDir::new().unwrap(),
                builtin: TempDir::new().unwrap(),
            }
        }

        fn touch(&self, name: &str) -> PathBuf {
            let path = self.templates.path().join(name);
            std::fs::write(&path, "").unwrap();
            path
        }

        fn registry(&self) -> TemplateRegistry {
            TemplateRegistry::new(&SearchConfig {
                directories: vec![self.templates.path().to_path_buf()],
                builtin_dir: self.builtin.path().to_path_buf(),
                ..SearchConfig::default()
            })
        }

        fn builtin(&self, name: &str) -> PathBuf {
            self.builtin.path().join(name)
        }
    }

    fn motor() -> DeviceType {
        DeviceType::new("Motor").with_parents(["PositionerBase", "Device"])
    }

    #[test]
    fn test_hierarchy_then_default() {
        let fx = Fixture::new();
        let motor_detailed = fx.touch("Motor_detailed.ui");

        let mut registry = fx.registry();
        registry.recompute(Some(&motor()), &Macros::new());

        let detailed = registry.templates(View::Detailed);
        assert_eq!(
            detailed.paths(),
            vec![motor_detailed.as_path(), fx.builtin("detailed.ui").as_path()]
        );
        assert_eq!(detailed.first().unwrap().source, TemplateSource::Hierarchy);

        let embedded = registry.templates(View::Embedded);
        assert_eq!(embedded.len(), 1);
        assert_eq!(embedded.first().unwrap().source, TemplateSource::Default);
    }

    #[test]
    fn test_macro_comes_first() {
        let fx = Fixture::new();
        fx.touch("Motor_detailed.ui");
        let custom_dir = TempDir::new().unwrap();
        let custom = custom_dir.path().join("custom.ui");
        std::fs::write(&custom, "").unwrap();

        let macros: Macros = [("detailed".to_string(), custom.display().to_string())].into();
        let registry = fx.registry();
        let lists = registry.compute(Some(&motor()), &macros);

        let detailed = &lists[&View::Detailed];
        assert_eq!(detailed.first().unwrap().path, custom);
        assert_eq!(detailed.first().unwrap().source, TemplateSource::Macro);
        assert_eq!(detailed.len(), 3);
    }

    #[test]
    fn test_macro_duplicate_of_hierarchy_listed_once() {
        let fx = Fixture::new();
        let motor_detailed = fx.touch("Motor_detailed.ui");
        let macros: Macros = [(
            "detailed_screen".to_string(),
            motor_detailed.display().to_string(),
        )]
        .into();

        let lists = fx.registry().compute(Some(&motor()), &macros);
        let detailed = &lists[&View::Detailed];
        let hits = detailed.iter().filter(|c| c.path == motor_detailed).count();
        assert_eq!(hits, 1);
        assert_eq!(detailed.first().unwrap().source, TemplateSource::Macro);
        assert_eq!(detailed.len(), 2);
    }

    #[test]
    fn test_macro_alias_of_hierarchy_listed_once() {
        let fx = Fixture::new();
        let motor_detailed = fx.touch("Motor_detailed.ui");
        std::fs::create_dir(fx.templates.path().join("sub")).unwrap();
        let aliased = fx.templates.path().join("sub/../Motor_detailed.ui");
        let macros: Macros = [("detailed".to_string(), aliased.display().to_string())].into();

        let lists = fx.registry().compute(Some(&motor()), &macros);
        let detailed = &lists[&View::Detailed];
        assert_eq!(detailed.len(), 2);
        assert_eq!(detailed.first().unwrap().source, TemplateSource::Macro);
        assert!(!detailed.iter().any(|c| c.path == motor_detailed));
    }

    #[test]
    fn test_default_is_always_last_and_unique() {
        let fx = Fixture::new();
        let fake_default = fx.builtin("engineering.ui");
        std::fs::write(&fake_default, "").unwrap();
        let macros: Macros = [("engineering".to_string(), fake_default.display().to_string())].into();

        let lists = fx.registry().compute(Some(&motor()), &macros);
        let engineering = &lists[&View::Engineering];
        assert_eq!(engineering.len(), 1);
        assert_eq!(engineering.first().unwrap().source, TemplateSource::Macro);

        for view in View::ALL {
            let list = &lists[&view];
            let defaults = list.iter().filter(|c| c.path == fx.builtin(&format!("{}.ui", view.label()))).count();
            assert_eq!(defaults, 1);
        }
    }

    #[test]
    fn test_recompute_is_deterministic() {
        let fx = Fixture::new();
        fx.touch("Motor_detailed.ui");
        fx.touch("PositionerBase_detailed.toml");
        fx.touch("PositionerBase_engineering.ui");

        let mut registry = fx.registry();
        let first = registry.recompute(Some(&motor()), &Macros::new()).clone();
        let second = registry.recompute(Some(&motor()), &Macros::new()).clone();
        assert_eq!(first, second);
    }

    #[test]
    fn test_root_type_templates_are_not_matched() {
        let fx = Fixture::new();
        fx.touch("Device_detailed.ui");
        let lists = fx.registry().compute(Some(&motor()), &Macros::new());
        assert_eq!(lists[&View::Detailed].len(), 1);
    }

    #[test]
    fn test_new_registry_is_empty() {
        let fx = Fixture::new();
        let registry = fx.registry();
        for view in View::ALL {
            assert!(registry.templates(view).is_empty());
            assert!(registry.best(view).is_none());
        }
    }

    #[test]
    fn test_clear() {
        let fx = Fixture::new();
        let mut registry = fx.registry();
        registry.recompute(None, &Macros::new());
        assert_eq!(registry.templates(View::Detailed).len(), 1);
        registry.clear();
        assert!(registry.templates(View::Detailed).is_empty());
    }

    #[test]
    fn test_default_extension_follows_precedence() {
        let registry = TemplateRegistry::new(&SearchConfig {
            extensions: vec!["toml".to_string(), "ui".to_string()],
            builtin_dir: PathBuf::from("/opt/builtin"),
            ..SearchConfig::default()
        });
        assert_eq!(
            registry.default_template(View::Embedded),
            Path::new("/opt/builtin/embedded.toml")
        );
    }

    #[test]
    fn test_default_uses_existing_extension() {
        let fx = Fixture::new();
        let shipped = fx.builtin("detailed.ui");
        std::fs::write(&shipped, "").unwrap();

        let registry = TemplateRegistry::new(&SearchConfig {
            extensions: vec!["toml".to_string(), "ui".to_string()],
            builtin_dir: fx.builtin.path().to_path_buf(),
            ..SearchConfig::default()
        });
        assert_eq!(registry.default_template(View::Detailed), shipped);
        assert_eq!(registry.default_template(View::Embedded), fx.builtin("embedded.toml"));
    }

    #[test]
    fn test_shipped_defaults_survive_reordered_extensions() {
        let registry = TemplateRegistry::new(&SearchConfig {
            extensions: vec!["toml".to_string(), "ui".to_string()],
            ..SearchConfig::default()
        });
        for view in View::ALL {
            assert!(registry.default_template(view).is_file());
        }
    }
}

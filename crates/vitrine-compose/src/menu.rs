//! Template selection menu
//!
//! Groups every candidate template under its view title. Selecting an action
//! forces that template on the composer.

use serde::Serialize;
use std::path::PathBuf;
use vitrine_core::{TemplateLists, TemplateSource, View};

use crate::composer::DisplayComposer;

/// One selectable template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuAction {
    /// Text shown for the action (the template's file name)
    pub text: String,
    pub path: PathBuf,
    pub source: TemplateSource,
}

impl MenuAction {
    /// Force this action's template on `composer`
    pub fn select(&self, composer: &mut DisplayComposer) {
        composer.set_forced_override(self.path.clone());
    }
}

/// Actions for one view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuGroup {
    pub view: View,
    /// Capitalized view label (e.g. "Detailed")
    pub title: String,
    pub actions: Vec<MenuAction>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionMenu {
    pub groups: Vec<MenuGroup>,
}

impl SelectionMenu {
    pub fn from_lists(lists: &TemplateLists) -> Self {
        let groups = lists
            .iter()
            .map(|(view, list)| MenuGroup {
                view: *view,
                title: view.title(),
                actions: list
                    .iter()
                    .map(|candidate| MenuAction {
                        text: candidate.file_name(),
                        path: candidate.path.clone(),
                        source: candidate.source,
                    })
                    .collect(),
            })
            .collect();
        Self { groups }
    }

    pub fn group(&self, view: View) -> Option<&MenuGroup> {
        self.groups.iter().find(|g| g.view == view)
    }

    /// Find an action by view and display text
    pub fn action(&self, view: View, text: &str) -> Option<&MenuAction> {
        self.group(view)?.actions.iter().find(|a| a.text == text)
    }

    /// Plain text rendering: one heading per view, one line per action
    pub fn render(&self) -> String {
        let mut out = String::new();
        for group in &self.groups {
            out.push_str(&group.title);
            out.push('\n');
            for action in &group.actions {
                out.push_str(&format!("  {} ({})\n", action.text, action.path.display()));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::PanelLoader;
    use std::rc::Rc;
    use tempfile::TempDir;
    use vitrine_core::{DeviceType, GenericDevice, SearchConfig, TemplateRegistry};

    #[test]
    fn test_menu_groups_by_view_title() {
        let templates = TempDir::new().unwrap();
        std::fs::write(templates.path().join("Motor_detailed.ui"), "").unwrap();

        let mut registry = TemplateRegistry::new(&SearchConfig {
            directories: vec![templates.path().to_path_buf()],
            ..SearchConfig::default()
        });
        registry.recompute(Some(&DeviceType::new("Motor")), &Default::default());

        let menu = SelectionMenu::from_lists(registry.lists());
        let titles: Vec<&str> = menu.groups.iter().map(|g| g.title.as_str()).collect();
        assert_eq!(titles, vec!["Embedded", "Detailed", "Engineering"]);

        let detailed = menu.group(View::Detailed).unwrap();
        let texts: Vec<&str> = detailed.actions.iter().map(|a| a.text.as_str()).collect();
        assert_eq!(texts, vec!["Motor_detailed.ui", "detailed.ui"]);
        assert!(menu.render().contains("Detailed\n  Motor_detailed.ui ("));
    }

    #[test]
    fn test_selecting_action_forces_template() {
        let templates = TempDir::new().unwrap();
        std::fs::write(
            templates.path().join("Motor_engineering.ui"),
            "title = \"${name} expert\"\n",
        )
        .unwrap();
        let registry = TemplateRegistry::new(&SearchConfig {
            directories: vec![templates.path().to_path_buf()],
            ..SearchConfig::default()
        });
        let device = Rc::new(GenericDevice::new("m1", DeviceType::new("Motor")));
        let mut composer = DisplayComposer::from_device(registry, Rc::new(PanelLoader::new()), device, None, None);

        let menu = composer.build_selection_menu();
        let action = menu.action(View::Engineering, "Motor_engineering.ui").unwrap().clone();
        action.select(&mut composer);

        assert_eq!(composer.forced_override(), Some(action.path.as_path()));
        assert_eq!(composer.current_template(), Some(action.path.as_path()));
        assert_eq!(composer.display().root().describe(), "panel: m1 expert");
    }
}

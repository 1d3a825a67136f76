//! Project metadata edits.

use crate::action::ProjectAction;
use crate::state::project::ProjectMeta;

/// Apply a metadata edit. Returns false when nothing changed or the edit was
/// rejected (empty name, non-positive size).
pub fn reduce_project(action: &ProjectAction, meta: &mut ProjectMeta) -> bool {
    match action {
        ProjectAction::Rename(name) => {
            let name = name.trim();
            if name.is_empty() || name == meta.name {
                return false;
            }
            meta.name = name.to_string();
            true
        }
        ProjectAction::Resize { width, height } => {
            if *width <= 0.0 || *height <= 0.0 || (meta.width, meta.height) == (*width, *height) {
                return false;
            }
            meta.width = *width;
            meta.height = *height;
            true
        }
        ProjectAction::SetBackground(color) => replace(&mut meta.background_color, *color),
        ProjectAction::SetGeometryFlipped(flipped) => replace(&mut meta.geometry_flipped, *flipped),
        ProjectAction::SetGyroEnabled(enabled) => replace(&mut meta.gyro_enabled, *enabled),
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rename_rejects_blank_and_same_name() {
        let mut meta = ProjectMeta::new("p", "Dusk", 390.0, 844.0);
        assert!(!reduce_project(&ProjectAction::Rename("  ".into()), &mut meta));
        assert!(!reduce_project(&ProjectAction::Rename("Dusk".into()), &mut meta));
        assert!(reduce_project(&ProjectAction::Rename(" Dawn ".into()), &mut meta));
        assert_eq!(meta.name, "Dawn");
    }

    #[test]
    fn resize_requires_positive_extent() {
        let mut meta = ProjectMeta::new("p", "Dusk", 390.0, 844.0);
        assert!(!reduce_project(&ProjectAction::Resize { width: 0.0, height: 10.0 }, &mut meta));
        assert!(reduce_project(&ProjectAction::Resize { width: 430.0, height: 932.0 }, &mut meta));
        assert_eq!((meta.width, meta.height), (430.0, 932.0));
    }

    #[test]
    fn toggles_report_change_only_once() {
        let mut meta = ProjectMeta::new("p", "Dusk", 390.0, 844.0);
        assert!(reduce_project(&ProjectAction::SetGyroEnabled(true), &mut meta));
        assert!(!reduce_project(&ProjectAction::SetGyroEnabled(true), &mut meta));
    }
}

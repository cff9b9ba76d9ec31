//! Project metadata and on-disk layout.
//!
//! A project directory holds the edited timeline, render options, and the
//! asset files the timeline references.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::element::{FileType, TimelineElement};
use crate::options::RenderOptions;
use crate::timeline::Timeline;

/// Top-level project file (`meta/project.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Schema version.
    pub version: String,

    /// Human-readable project name.
    pub name: String,

    /// Unique project identifier (UUID).
    pub id: String,

    /// Creation timestamp (ISO 8601).
    pub created_at: String,

    /// Last modified timestamp (ISO 8601).
    pub modified_at: String,

    /// Render settings for preview and export.
    #[serde(default)]
    pub options: RenderOptions,
}

impl Project {
    /// Create a new project with default render settings.
    pub fn new(name: impl Into<String>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            version: "1.0".to_string(),
            name: name.into(),
            id: uuid_v4(),
            created_at: now.clone(),
            modified_at: now,
            options: RenderOptions::default(),
        }
    }

    /// Refresh the modification timestamp.
    pub fn touch(&mut self) {
        self.modified_at = chrono::Utc::now().to_rfc3339();
    }
}

/// The complete in-memory representation of a loaded project.
#[derive(Debug, Clone)]
pub struct LoadedProject {
    /// Filesystem path to the project directory.
    pub root: PathBuf,

    /// Project metadata.
    pub project: Project,

    /// Editing timeline.
    pub timeline: Timeline,
}

impl LoadedProject {
    /// Load a project from a directory.
    pub fn load(root: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let root = root.as_ref().to_path_buf();

        let project_path = root.join("meta").join("project.json");
        let timeline_path = root.join("meta").join("timeline.json");

        let project_json =
            std::fs::read_to_string(&project_path).map_err(|e| ProjectError::IoError {
                path: project_path.clone(),
                source: e,
            })?;

        let project: Project =
            serde_json::from_str(&project_json).map_err(|e| ProjectError::ParseError {
                path: project_path,
                source: e,
            })?;

        let timeline = if timeline_path.exists() {
            let timeline_json =
                std::fs::read_to_string(&timeline_path).map_err(|e| ProjectError::IoError {
                    path: timeline_path.clone(),
                    source: e,
                })?;
            serde_json::from_str(&timeline_json).map_err(|e| ProjectError::ParseError {
                path: timeline_path,
                source: e,
            })?
        } else {
            Timeline::new()
        };

        Ok(Self {
            root,
            project,
            timeline,
        })
    }

    /// Save project and timeline to disk.
    pub fn save(&self) -> Result<(), ProjectError> {
        let meta_dir = self.root.join("meta");
        std::fs::create_dir_all(&meta_dir).map_err(|e| ProjectError::IoError {
            path: meta_dir.clone(),
            source: e,
        })?;

        let project_path = meta_dir.join("project.json");
        let project_json =
            serde_json::to_string_pretty(&self.project).map_err(|e| ProjectError::ParseError {
                path: project_path.clone(),
                source: e,
            })?;
        std::fs::write(&project_path, project_json).map_err(|e| ProjectError::IoError {
            path: project_path,
            source: e,
        })?;

        let timeline_path = meta_dir.join("timeline.json");
        let timeline_json =
            serde_json::to_string_pretty(&self.timeline).map_err(|e| ProjectError::ParseError {
                path: timeline_path.clone(),
                source: e,
            })?;
        std::fs::write(&timeline_path, timeline_json).map_err(|e| ProjectError::IoError {
            path: timeline_path,
            source: e,
        })?;

        Ok(())
    }

    /// Create a new project on disk with the standard directory structure.
    pub fn create(root: impl AsRef<Path>, name: impl Into<String>) -> Result<Self, ProjectError> {
        let root = root.as_ref().to_path_buf();

        for subdir in &["assets", "meta", "cache", "exports"] {
            std::fs::create_dir_all(root.join(subdir)).map_err(|e| ProjectError::IoError {
                path: root.join(subdir),
                source: e,
            })?;
        }

        let loaded = Self {
            root,
            project: Project::new(name),
            timeline: Timeline::new(),
        };
        loaded.save()?;
        Ok(loaded)
    }

    /// Validate that every file the timeline references exists on disk.
    pub fn validate_sources(&self) -> Vec<String> {
        let mut errors = vec![];

        let check = |errors: &mut Vec<String>, label: &str, key: &str, raw: &str| {
            if raw.is_empty() {
                errors.push(format!("{label} element '{key}' has no source path"));
                return;
            }
            let path = Path::new(raw);
            let resolved = if path.is_absolute() {
                path.to_path_buf()
            } else {
                self.root.join(path)
            };
            if !resolved.exists() {
                errors.push(format!("{label} source missing for '{key}': {raw}"));
            }
        };

        for (key, element) in self.timeline.iter() {
            match element.filetype() {
                FileType::Video | FileType::Image | FileType::Gif | FileType::Audio => {
                    check(
                        &mut errors,
                        element.filetype().as_str(),
                        key,
                        element.local_path(),
                    );
                }
                FileType::Shape => {}
                FileType::Text => {
                    if let TimelineElement::Text(text) = element {
                        if !text.font_path.is_empty() && !Path::new(&text.font_path).exists() {
                            errors
                                .push(format!("font missing for '{key}': {}", text.font_path));
                        }
                    }
                }
            }
        }

        errors
    }
}

/// Errors that can occur when working with projects.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid project: {message}")]
    ValidationError { message: String },
}

/// Generate a simple UUID v4 without external dependency.
pub fn uuid_v4() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!(
        "{:08x}-{:04x}-4{:03x}-{:04x}-{:012x}",
        (seed & 0xFFFFFFFF) as u32,
        ((seed >> 32) & 0xFFFF) as u16,
        ((seed >> 48) & 0x0FFF) as u16,
        (((seed >> 60) & 0x3F) | 0x80) as u16 | (((seed >> 66) & 0x3FF) as u16) << 6,
        (seed >> 76) & 0xFFFFFFFFFFFF,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::ElementAnimation;
    use crate::element::{ElementCommon, ImageElement, Point, VisualCommon};

    fn image_at(key: &str, path: &str) -> TimelineElement {
        TimelineElement::Image(ImageElement {
            common: ElementCommon {
                key: key.to_string(),
                priority: 1,
                start_time: 0.0,
                duration: 1000.0,
                location: Point::new(0.0, 0.0),
                local_path: path.to_string(),
                timeline_color: String::new(),
            },
            visual: VisualCommon::sized(100.0, 100.0),
            animation: ElementAnimation::default(),
        })
    }

    #[test]
    fn test_project_creation() {
        let project = Project::new("Launch Teaser");
        assert_eq!(project.name, "Launch Teaser");
        assert_eq!(project.version, "1.0");
        assert_eq!(project.options.fps, 60);
    }

    #[test]
    fn test_project_serialization() {
        let project = Project::new("Round Trip");
        let json = serde_json::to_string_pretty(&project).unwrap();
        let parsed: Project = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.name, "Round Trip");
        assert_eq!(parsed.id, project.id);
    }

    #[test]
    fn test_loaded_project_create_and_load() {
        let dir = std::env::temp_dir().join("montage_test_project");
        let _ = std::fs::remove_dir_all(&dir);

        let mut created = LoadedProject::create(&dir, "Integration Test").unwrap();
        created.timeline.insert(image_at("img", "assets/a.png"));
        created.save().unwrap();

        let loaded = LoadedProject::load(&dir).unwrap();
        assert_eq!(loaded.project.name, "Integration Test");
        assert_eq!(loaded.timeline.len(), 1);
        assert!(loaded.timeline.contains_key("img"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_validate_sources_reports_missing() {
        let dir = std::env::temp_dir().join("montage_test_validate");
        let _ = std::fs::remove_dir_all(&dir);

        let mut loaded = LoadedProject::create(&dir, "Validate Test").unwrap();
        loaded.timeline.insert(image_at("img", "assets/gone.png"));

        let errors = loaded.validate_sources();
        assert!(!errors.is_empty());
        assert!(errors.iter().any(|e| e.contains("image source missing")));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_project_deserialization_defaults_options_for_legacy_files() {
        let mut value = serde_json::to_value(Project::new("Legacy")).unwrap();
        value
            .as_object_mut()
            .expect("project should be object")
            .remove("options");

        let parsed: Project = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.options, RenderOptions::default());
    }

    #[test]
    fn test_uuid_v4_shape() {
        let id = uuid_v4();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 5);
        assert_eq!(parts[0].len(), 8);
        assert!(parts[2].starts_with('4'));
    }
}

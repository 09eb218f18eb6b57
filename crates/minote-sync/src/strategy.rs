//! Folder-per-directory versus flat-with-tag organization

use minote_config::CategoryMode;

/// Decides where a note lives and how its category is labelled
pub trait CategoryStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Directory, relative to the mirror root, holding notes of `folder_name`
    fn note_dir(&self, folder_name: &str) -> String;

    /// Whether folder renames move directories on disk
    fn tracks_renames(&self) -> bool;

    /// Hierarchical category tag for front matter
    fn category_tag(&self, tag_prefix: &str, folder_name: &str) -> String {
        format!("{}/folder/{}", tag_prefix, folder_name)
    }
}

/// One directory per remote folder
#[derive(Debug, Clone, Copy, Default)]
pub struct FolderLayout;

impl CategoryStrategy for FolderLayout {
    fn name(&self) -> &'static str {
        "folder"
    }

    fn note_dir(&self, folder_name: &str) -> String {
        folder_name.to_string()
    }

    fn tracks_renames(&self) -> bool {
        true
    }
}

/// Every note in the mirror root, the folder only survives as a tag
#[derive(Debug, Clone, Copy, Default)]
pub struct TagLayout;

impl CategoryStrategy for TagLayout {
    fn name(&self) -> &'static str {
        "tag"
    }

    fn note_dir(&self, _folder_name: &str) -> String {
        String::new()
    }

    fn tracks_renames(&self) -> bool {
        false
    }
}

pub fn strategy_for(mode: CategoryMode) -> Box<dyn CategoryStrategy> {
    match mode {
        CategoryMode::Folder => Box::new(FolderLayout),
        CategoryMode::Tag => Box::new(TagLayout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layouts() {
        let folder = strategy_for(CategoryMode::Folder);
        assert_eq!(folder.note_dir("Work"), "Work");
        assert!(folder.tracks_renames());

        let tag = strategy_for(CategoryMode::Tag);
        assert_eq!(tag.note_dir("Work"), "");
        assert!(!tag.tracks_renames());
        assert_eq!(tag.category_tag("minote", "Work"), "minote/folder/Work");
    }
}

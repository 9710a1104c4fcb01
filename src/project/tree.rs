//! ASCII tree rendering for a manifest's group hierarchy.

use super::{ObjectId, ProjectDocument};

const IN_EVERY_TARGET: char = '●';
const IN_SOME_TARGETS: char = '◐';
const IN_NO_TARGET: char = '○';

/// Membership symbol for a file reference across the document's targets.
fn membership_symbol(document: &ProjectDocument, id: &ObjectId) -> char {
    let total = document.targets().len();
    let members = document
        .targets()
        .iter()
        .filter(|t| t.compile_sources().contains(id))
        .count();

    match members {
        0 => IN_NO_TARGET,
        n if n == total => IN_EVERY_TARGET,
        _ => IN_SOME_TARGETS,
    }
}

/// Render the group tree below the main group.
///
/// Example output:
/// ```text
/// App
/// ├── engine/
/// │   ├── net/
/// │   │   └── ● socket.cpp
/// │   └── ◐ math.cpp
/// └── ○ Info.plist
/// ```
///
/// Groups are suffixed with `/`; virtual groups (no path segment) are not.
#[must_use]
pub fn render_tree(document: &ProjectDocument) -> String {
    let mut output = String::new();
    let Some(main) = document.group(document.main_group()) else {
        return output;
    };

    output.push_str(main.name());
    output.push('\n');
    render_children(&mut output, document, main.id(), "");
    output
}

/// Recursively render a group's child groups, then its files.
fn render_children(output: &mut String, document: &ProjectDocument, id: &ObjectId, prefix: &str) {
    let Some(group) = document.group(id) else {
        return;
    };

    let total = group.children().len() + group.files().len();
    let mut index = 0;

    for child_id in group.children() {
        index += 1;
        let Some(child) = document.group(child_id) else {
            continue;
        };
        let is_last = index == total;

        output.push_str(prefix);
        output.push_str(if is_last { "└── " } else { "├── " });
        output.push_str(child.name());
        if !child.is_virtual() {
            output.push('/');
        }
        output.push('\n');

        let continuation = if is_last { "    " } else { "│   " };
        render_children(output, document, child_id, &format!("{prefix}{continuation}"));
    }

    for file_id in group.files() {
        index += 1;
        let Some(file) = document.file(file_id) else {
            continue;
        };

        output.push_str(prefix);
        output.push_str(if index == total { "└── " } else { "├── " });
        output.push(membership_symbol(document, file_id));
        output.push(' ');
        output.push_str(file.path());
        output.push('\n');
    }
}

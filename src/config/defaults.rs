//! Default configuration document
//!
//! Written by `init` when a workspace has no configuration yet. Each entry
//! demonstrates one feature of the definition format.

use crate::models::{ConfigDocument, DisplayIntent, TerminalDefinition};

/// Name of the demo group in the default document
pub const DEMO_GROUP: &str = "my_group_name";

/// Persistent key of the demo persistent terminal
pub const DEMO_PERSISTENT_KEY: &str = "demo_persistent";

const SUBSTITUTION_DEMO: &str = "echo \"workspaceFolder: [workspaceFolder]\\nworkspaceFolderBasename: [workspaceFolderBasename]\\nfile: [file]\\nrelativeFile: [relativeFile]\\nfileBasename: [fileBasename]\\nfileBasenameNoExtension: [fileBasenameNoExtension]\\nfileDirname: [fileDirname]\\nfileExtname: [fileExtname]\\ncwd: [cwd]\\nlineNumber: [lineNumber]\"";

const GROUP_DEMO: &str = "echo \"I will open alongside split terminals with the same group name\"";

/// The document `init` writes
pub fn default_document() -> ConfigDocument {
    let mut single = TerminalDefinition::new("Single", "echo \"Hello World\"");
    single.description = Some("This is a description".to_string());
    single.display = DisplayIntent {
        open: false,
        focus: true,
    };

    let multi = TerminalDefinition::with_commands(
        "Multi",
        [
            "echo \"Did you know?\"",
            "echo \"You can execute multiple commands\"",
        ],
    );

    let mut single_no_exec = TerminalDefinition::new("Single - No execution", "Press enter to run me");
    single_no_exec.execute = false;

    let mut multi_no_exec = TerminalDefinition::with_commands(
        "Multi - No execution",
        [
            "echo \"Only the last command won't be executed\"",
            "Press enter to run me",
        ],
    );
    multi_no_exec.execute = false;

    let mut persistent = TerminalDefinition::new(
        "Persistent",
        "echo \"I'm persistent! Try to close the launcher and re-execute this command\"",
    );
    persistent.display.focus = true;
    persistent.only_single = true;
    persistent.persistent = Some(DEMO_PERSISTENT_KEY.to_string());

    let mut substitution = TerminalDefinition::new("Variable Substitution", SUBSTITUTION_DEMO);
    substitution.description =
        Some("Many special strings can be substituted dynamically".to_string());

    let mut only_single =
        TerminalDefinition::new("Only Single", "echo \"I will not run with the others\"");
    only_single.display.open = true;
    only_single.only_single = true;

    let mut group_first = TerminalDefinition::new("Group terminal", GROUP_DEMO);
    group_first.group = Some(DEMO_GROUP.to_string());

    let mut group_second = TerminalDefinition::new("Another group terminal", GROUP_DEMO);
    group_second.group = Some(DEMO_GROUP.to_string());

    ConfigDocument {
        autorun: false,
        terminals: vec![
            single,
            multi,
            single_no_exec,
            multi_no_exec,
            persistent,
            substitution,
            only_single,
            group_first,
            group_second,
        ],
    }
}

//! Templates compiled into the binary.
//!
//! Each entry is addressed by its logical name (for example `prd.md`); the
//! source file on disk carries an extra `.j2` suffix.

/// PRD document template.
pub const PRD: &str = "prd.md";

/// Changelog document template.
pub const CHANGELOG: &str = "changelog.md";

/// Pull-request body template.
pub const PR_BODY: &str = "pr_body.md";

const BUILTINS: &[(&str, &str)] = &[
    (PRD, include_str!("../templates/prd.md.j2")),
    (CHANGELOG, include_str!("../templates/changelog.md.j2")),
    (PR_BODY, include_str!("../templates/pr_body.md.j2")),
];

/// Returns the embedded source for a logical template name.
pub fn source(name: &str) -> Option<&'static str> {
    BUILTINS
        .iter()
        .find(|(builtin, _)| *builtin == name)
        .map(|(_, source)| *source)
}

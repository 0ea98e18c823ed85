pub mod balance;
pub mod build;
pub mod chat;
pub mod comment;
pub mod component;
pub mod feedback;
pub mod rating;
pub mod transaction;
pub mod user;
pub mod view;

/// Escapes `%`, `_` and `\` so user input is matched literally inside ILIKE.
pub(crate) fn like_pattern(search: &str) -> String {
    let escaped = search
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

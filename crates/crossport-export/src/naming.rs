//! Output-name derivation utilities.
//!
//! Output identifiers are always forward-slash separated, relative to
//! the export root, and derived deterministically from the asset's
//! source location. All functions here are pure.

/// Default extension for exported leaf animation clips.
pub const CLIP_EXTENSION: &str = ".ani";

/// Derive the output identifier for a source location, or `None` for a
/// missing source (callers treat `None` as "not exportable").
pub fn resolve_output_name(source: Option<&str>, suffix: &str) -> Option<String> {
    source.map(|s| replace_extension(s, suffix))
}

/// Replace the extension of `name` with `new_ext`, or append `new_ext`
/// when `name` has no extension after its last path separator.
pub fn replace_extension(name: &str, new_ext: &str) -> String {
    let last_dot = name.rfind('.').map(|i| i as isize).unwrap_or(-1);
    let last_slash = name.rfind('/').map(|i| i as isize).unwrap_or(-1);
    if last_dot > last_slash {
        format!("{}{}", &name[..last_dot as usize], new_ext)
    } else {
        format!("{}{}", name, new_ext)
    }
}

/// Strip a source-engine prefix (e.g. `Assets/`) case-insensitively.
pub fn strip_source_prefix<'a>(path: &'a str, prefix: &str) -> &'a str {
    match path.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => &path[prefix.len()..],
        _ => path,
    }
}

/// Normalize path separators to forward slashes.
pub fn to_asset_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Replace characters that are invalid in target-engine resource names
/// with underscores.
pub fn safe_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

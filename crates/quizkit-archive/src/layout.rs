//! Archive paths and file naming.
//!
//! ```text
//! quiz/manifest.json
//! quiz/page_<segment>/page_config.json
//! quiz/page_<segment>/answers.json
//! quiz/page_<segment>/assets/<question-segment>.<ext>
//! ```
//!
//! Paths stored inside records (`configFile`, `answersFile`, question
//! images) are relative: manifest paths to `quiz/`, image paths to the
//! directory of the page config that names them.

use std::collections::HashSet;

pub const ROOT_DIR: &str = "quiz";
pub const MANIFEST_FILE: &str = "manifest.json";
pub const PAGE_CONFIG_FILE: &str = "page_config.json";
pub const ANSWERS_FILE: &str = "answers.json";
pub const ASSETS_DIR: &str = "assets";

/// Full entry name of the manifest.
pub fn manifest_path() -> String {
    format!("{ROOT_DIR}/{MANIFEST_FILE}")
}

/// Reduce an id to `[A-Za-z0-9_-]`, replacing everything else with `_`.
pub fn sanitize_segment(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Hands out unique path segments within one directory.
///
/// Distinct ids can sanitize to the same segment (`a/b` and `a?b`), so
/// later ones get a numeric suffix.
#[derive(Debug, Default)]
pub struct SegmentAllocator {
    used: HashSet<String>,
}

impl SegmentAllocator {
    pub fn allocate(&mut self, raw: &str) -> String {
        let mut base = sanitize_segment(raw);
        if base.is_empty() {
            base.push('_');
        }
        let mut candidate = base.clone();
        let mut n = 2;
        while self.used.contains(&candidate) {
            candidate = format!("{base}_{n}");
            n += 1;
        }
        self.used.insert(candidate.clone());
        candidate
    }
}

/// Directory part of a `/`-separated path, without the trailing slash.
pub fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(dir, _)| dir)
}

/// Resolve `relative` against `base` inside the `quiz/` root.
///
/// Returns the full entry name, or `None` when the path is absolute or
/// contains a `..` segment.
pub fn resolve(base: &str, relative: &str) -> Option<String> {
    if relative.starts_with('/') || relative.contains('\\') {
        return None;
    }
    let mut parts: Vec<&str> = vec![ROOT_DIR];
    for part in base.split('/').chain(relative.split('/')) {
        match part {
            "" | "." => {}
            ".." => return None,
            _ => parts.push(part),
        }
    }
    (parts.len() > 1).then(|| parts.join("/"))
}

/// File name for exporting a quiz called `name`.
///
/// Cyrillic is transliterated, the result lower-cased, characters that are
/// invalid in file names replaced with `_`, and runs of whitespace or
/// underscores collapsed. An empty result becomes `quiz`.
pub fn suggested_file_name(name: &str) -> String {
    let mut transliterated = String::with_capacity(name.len());
    for c in name.chars() {
        match transliterate(c) {
            Some(latin) => transliterated.push_str(latin),
            None => transliterated.push(c),
        }
    }

    let mut sanitized = String::with_capacity(transliterated.len());
    let mut in_run = false;
    for c in transliterated.trim().to_lowercase().chars() {
        let c = if matches!(c, '/' | '\\' | '?' | '%' | '*' | ':' | '|' | '"' | '<' | '>') {
            '_'
        } else {
            c
        };
        if c.is_whitespace() || c == '_' {
            if !in_run {
                sanitized.push('_');
            }
            in_run = true;
        } else {
            sanitized.push(c);
            in_run = false;
        }
    }

    if sanitized.is_empty() {
        sanitized.push_str("quiz");
    }
    sanitized.push_str(".zip");
    sanitized
}

fn transliterate(c: char) -> Option<&'static str> {
    let latin = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "y",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' | 'ь' | 'Ъ' | 'Ь' => "",
        'ы' => "y",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        'А' => "A",
        'Б' => "B",
        'В' => "V",
        'Г' => "G",
        'Д' => "D",
        'Е' => "E",
        'Ё' => "Yo",
        'Ж' => "Zh",
        'З' => "Z",
        'И' => "I",
        'Й' => "Y",
        'К' => "K",
        'Л' => "L",
        'М' => "M",
        'Н' => "N",
        'О' => "O",
        'П' => "P",
        'Р' => "R",
        'С' => "S",
        'Т' => "T",
        'У' => "U",
        'Ф' => "F",
        'Х' => "H",
        'Ц' => "Ts",
        'Ч' => "Ch",
        'Ш' => "Sh",
        'Щ' => "Sch",
        'Ы' => "Y",
        'Э' => "E",
        'Ю' => "Yu",
        'Я' => "Ya",
        _ => return None,
    };
    Some(latin)
}

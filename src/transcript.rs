/*!
 * Bilingual transcript of a translated story.
 *
 * All source paragraphs under a banner naming the source language, then
 * all translated paragraphs under the target-language banner.
 */

use anyhow::Result;

use crate::language_utils;
use crate::translation::TranslationEntry;

/// Banner line for a language, e.g. `********* SPANISH *********`
pub fn banner(language_name: &str) -> String {
    format!("********* {} *********", language_name.to_uppercase())
}

/// Render paragraph pairs with explicit language names
pub fn render(entries: &[TranslationEntry], source_name: &str, target_name: &str) -> String {
    let mut out = String::new();

    out.push_str(&banner(source_name));
    out.push('\n');
    for entry in entries {
        out.push_str(&entry.source);
        out.push('\n');
    }

    out.push_str(&banner(target_name));
    out.push('\n');
    for entry in entries {
        out.push_str(&entry.target);
        out.push('\n');
    }

    out
}

/// Render paragraph pairs, naming the languages from their codes
pub fn render_for_languages(
    entries: &[TranslationEntry],
    source_language: &str,
    target_language: &str,
) -> Result<String> {
    let source_name = language_utils::get_language_name(source_language)?;
    let target_name = language_utils::get_language_name(target_language)?;
    Ok(render(entries, &source_name, &target_name))
}

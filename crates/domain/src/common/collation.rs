//! Locale-aware ordering of display names.
//!
//! Names are compared on a primary-strength key: diacritics are folded to
//! their Latin base letter and case is ignored, so "Éclair" sorts beside
//! "eclair" rather than after "zephyr". Callers that need a total order break
//! ties themselves (see `compare_names`).

use std::cmp::Ordering;

/// Primary collation key of `name`.
pub fn collation_key(name: &str) -> Vec<char> {
    name.chars()
        .flat_map(expand_ligature)
        .map(strip_diacritic)
        .flat_map(char::to_lowercase)
        .collect()
}

/// Compare two names by collation key, then by raw text.
///
/// The raw comparison keeps the ordering total for names that share a key
/// ("Shield" vs "shield").
pub fn compare_names(left: &str, right: &str) -> Ordering {
    collation_key(left)
        .cmp(&collation_key(right))
        .then_with(|| left.cmp(right))
}

fn expand_ligature(ch: char) -> Vec<char> {
    match ch {
        '\u{00C6}' => vec!['A', 'E'],
        '\u{00E6}' => vec!['a', 'e'],
        '\u{0152}' => vec!['O', 'E'],
        '\u{0153}' => vec!['o', 'e'],
        '\u{00DF}' => vec!['s', 's'],
        _ => vec![ch],
    }
}

/// Base letter for Latin-1 Supplement accented letters.
fn strip_diacritic(ch: char) -> char {
    match ch {
        '\u{00C0}'..='\u{00C5}' => 'A',
        '\u{00E0}'..='\u{00E5}' => 'a',
        '\u{00C7}' => 'C',
        '\u{00E7}' => 'c',
        '\u{00C8}'..='\u{00CB}' => 'E',
        '\u{00E8}'..='\u{00EB}' => 'e',
        '\u{00CC}'..='\u{00CF}' => 'I',
        '\u{00EC}'..='\u{00EF}' => 'i',
        '\u{00D1}' => 'N',
        '\u{00F1}' => 'n',
        '\u{00D2}'..='\u{00D6}' | '\u{00D8}' => 'O',
        '\u{00F2}'..='\u{00F6}' | '\u{00F8}' => 'o',
        '\u{00D9}'..='\u{00DC}' => 'U',
        '\u{00F9}'..='\u{00FC}' => 'u',
        '\u{00DD}' => 'Y',
        '\u{00FD}' | '\u{00FF}' => 'y',
        _ => ch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_is_ignored_on_primary_key() {
        assert_eq!(collation_key("Fireball"), collation_key("fireball"));
        assert_eq!(compare_names("acid splash", "Blight"), Ordering::Less);
    }

    #[test]
    fn accented_letters_sort_with_their_base() {
        let mut names = vec!["Zephyr Strike", "Éclair", "Earthquake"];
        names.sort_by(|a, b| compare_names(a, b));
        assert_eq!(names, vec!["Earthquake", "Éclair", "Zephyr Strike"]);
    }

    #[test]
    fn punctuation_stays_in_the_key() {
        assert_ne!(
            collation_key("Tasha's Hideous Laughter"),
            collation_key("Tashas Hideous Laughter")
        );
        assert_eq!(
            collation_key("Mordenkainen's Sword"),
            "mordenkainen's sword".chars().collect::<Vec<_>>()
        );
    }

    #[test]
    fn equal_keys_fall_back_to_raw_text() {
        assert_eq!(compare_names("Shield", "shield"), Ordering::Less);
        assert_eq!(compare_names("Shield", "Shield"), Ordering::Equal);
    }
}

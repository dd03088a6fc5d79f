//! Merging of character lists across collections and pages.

use std::cmp::Ordering;
use std::collections::HashSet;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::marvel::Character;

/// Merge character lists into one deduplicated, name-sorted roster.
///
/// Lists are concatenated in call order and the first occurrence of each id
/// wins, including its `event` label. The result is ordered by
/// [`compare_names`], with the id as final tie-break so the order is total.
pub fn merge_characters<I, L>(lists: I) -> Vec<Character>
where
    I: IntoIterator<Item = L>,
    L: IntoIterator<Item = Character>,
{
    let mut seen = HashSet::new();
    let mut merged: Vec<Character> = lists
        .into_iter()
        .flatten()
        .filter(|c| seen.insert(c.id))
        .collect();

    merged.sort_by(|a, b| compare_names(&a.name, &b.name).then(a.id.cmp(&b.id)));
    merged
}

/// Merge incoming pages into an existing roster. Existing entries win.
pub fn merge_into<I>(existing: Vec<Character>, incoming: I) -> Vec<Character>
where
    I: IntoIterator<Item = Vec<Character>>,
{
    merge_characters(std::iter::once(existing).chain(incoming))
}

/// Locale-aware name comparison.
///
/// Primary strength compares the canonical decomposition (NFD) with
/// combining marks removed and case folded, ordering spacing and punctuation
/// before digits before letters. Ties fall back to accents, then to case with
/// lowercase first. Composed and decomposed spellings compare equal.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let secondary = |s: &str| -> Vec<char> { s.nfd().flat_map(char::to_lowercase).collect() };
    let tertiary = |s: &str| -> Vec<bool> { s.nfd().map(char::is_uppercase).collect() };

    primary_key(a)
        .cmp(&primary_key(b))
        .then_with(|| secondary(a).cmp(&secondary(b)))
        .then_with(|| tertiary(a).cmp(&tertiary(b)))
}

fn primary_key(s: &str) -> Vec<(u8, char)> {
    let mut key = Vec::with_capacity(s.len());
    for c in s
        .nfd()
        .flat_map(char::to_lowercase)
        .filter(|c| !is_combining_mark(*c))
    {
        match undecomposed_base(c) {
            Some(base) => key.extend(base.chars().map(|b| (char_class(b), b))),
            None => key.push((char_class(c), c)),
        }
    }
    key
}

fn char_class(c: char) -> u8 {
    if c.is_alphabetic() {
        2
    } else if c.is_numeric() {
        1
    } else {
        0
    }
}

/// Base letters for Latin letters that have no canonical decomposition
/// (stroked letters and ligatures), so NFD leaves them intact.
fn undecomposed_base(c: char) -> Option<&'static str> {
    let base = match c {
        'ł' => "l",
        'đ' | 'ð' => "d",
        'ø' => "o",
        'ħ' => "h",
        'ŧ' => "t",
        'ı' => "i",
        'ß' => "ss",
        'æ' => "ae",
        'œ' => "oe",
        'þ' => "th",
        _ => return None,
    };
    Some(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(id: u64, name: &str, event: &str) -> Character {
        Character::new(id, name).with_event(event)
    }

    fn names(list: &[Character]) -> Vec<&str> {
        list.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_merge_sorts_by_name() {
        let merged = merge_characters(vec![vec![
            c(3, "Wolverine", "x"),
            c(1, "Beast", "x"),
            c(2, "Iron Man", "a"),
        ]]);
        assert_eq!(names(&merged), vec!["Beast", "Iron Man", "Wolverine"]);
    }

    #[test]
    fn test_merge_dedupes_first_wins() {
        let avengers = vec![c(1, "Wolverine", "Avengers"), c(2, "Thor", "Avengers")];
        let xmen = vec![c(1, "Wolverine", "X-Men"), c(3, "Cyclops", "X-Men")];

        let merged = merge_characters(vec![avengers, xmen]);

        assert_eq!(merged.len(), 3);
        let wolverine = merged.iter().find(|c| c.id == 1).unwrap();
        assert_eq!(wolverine.event.as_deref(), Some("Avengers"));
    }

    #[test]
    fn test_merge_idempotent() {
        let list = vec![
            c(5, "Storm", "x"),
            c(2, "Hulk", "a"),
            c(9, "Gambit", "x"),
            c(2, "Hulk", "a"),
        ];
        let once = merge_characters(vec![list.clone()]);
        let twice = merge_characters(vec![list.clone(), list]);
        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
    }

    #[test]
    fn test_merge_into_existing_wins() {
        let existing = vec![c(1, "Rogue", "X-Men")];
        let merged = merge_into(
            existing,
            vec![vec![c(1, "Rogue", "Avengers"), c(2, "Vision", "Avengers")]],
        );
        assert_eq!(names(&merged), vec!["Rogue", "Vision"]);
        assert_eq!(merged[0].event.as_deref(), Some("X-Men"));
    }

    #[test]
    fn test_merge_empty_inputs() {
        let empty: Vec<Vec<Character>> = vec![];
        assert!(merge_characters(empty).is_empty());
        assert!(merge_characters(vec![Vec::<Character>::new(), Vec::new()]).is_empty());

        let existing = vec![c(1, "Rogue", "X-Men")];
        let merged = merge_into(existing.clone(), Vec::<Vec<Character>>::new());
        assert_eq!(merged, existing);
    }

    #[test]
    fn test_same_name_ordered_by_id() {
        let merged = merge_characters(vec![vec![c(20, "Thor", "a"), c(10, "Thor", "b")]]);
        assert_eq!(merged[0].id, 10);
        assert_eq!(merged[1].id, 20);
    }

    #[test]
    fn test_compare_names_ignores_case() {
        assert_eq!(compare_names("beast", "Cyclops"), Ordering::Less);
        assert_eq!(compare_names("Angel", "apocalypse"), Ordering::Less);
        assert_eq!(compare_names("a", "A"), Ordering::Less);
        assert_eq!(compare_names("Thor", "Thor"), Ordering::Equal);
    }

    #[test]
    fn test_compare_names_accents_sort_with_base_letter() {
        assert_eq!(compare_names("Émilie", "Frank"), Ordering::Less);
        assert_eq!(compare_names("Dazzler", "Émilie"), Ordering::Less);
        assert_eq!(compare_names("Emilie", "Émilie"), Ordering::Less);
    }

    #[test]
    fn test_compare_names_letters_outside_latin1() {
        assert_eq!(compare_names("Şahin", "Zorro"), Ordering::Less);
        assert_eq!(compare_names("Ǻngel", "Beast"), Ordering::Less);
        assert_eq!(compare_names("Łukasz", "Mystique"), Ordering::Less);
        assert_eq!(compare_names("Ðeath", "Electro"), Ordering::Less);
        assert_eq!(compare_names("Øyvind", "Psylocke"), Ordering::Less);
        assert_eq!(compare_names("Ærith", "Banshee"), Ordering::Less);
    }

    #[test]
    fn test_compare_names_composed_equals_decomposed() {
        assert_eq!(compare_names("Ángel", "A\u{301}ngel"), Ordering::Equal);
        assert_eq!(compare_names("Sahin", "Şahin"), Ordering::Less);
    }

    #[test]
    fn test_compare_names_punctuation_before_letters() {
        assert_eq!(compare_names("Spider-Man", "SpiderWoman"), Ordering::Less);
        assert_eq!(compare_names("3-D Man", "A-Bomb"), Ordering::Less);
        assert_eq!(
            compare_names("Beast (Earth-616)", "Beast (Ultimate)"),
            Ordering::Less
        );
    }

    #[test]
    fn test_merge_output_always_sorted() {
        let merged = merge_characters(vec![
            vec![c(1, "zzz", "a"), c(2, "Ångström", "a"), c(3, "_under", "a")],
            vec![c(4, "Mystique", "x"), c(5, "mystique", "x"), c(6, "42", "x")],
        ]);
        for pair in merged.windows(2) {
            assert_ne!(
                compare_names(&pair[0].name, &pair[1].name),
                Ordering::Greater,
                "{} > {}",
                pair[0].name,
                pair[1].name
            );
        }
    }
}

//! English singularization for adder/remover discovery.
//!
//! Given a plural member name, produce the candidate singulars to probe as
//! `add_{singular}`/`remove_{singular}` pairs. The rules are deliberately
//! small: common irregulars, the productive `-ies`/`-ves`/`-es`/`-s`
//! suffixes, and the identity form for uninflected plurals like `sheep`.
//! Only the final underscore-separated word is inflected, so
//! `archived_stories` yields `archived_story`.

use smallvec::SmallVec;

const IRREGULARS: &[(&str, &str)] = &[
    ("children", "child"),
    ("people", "person"),
    ("men", "man"),
    ("women", "woman"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("geese", "goose"),
    ("mice", "mouse"),
];

/// Candidate singular forms of `plural`, most specific first, deduplicated,
/// ending with the identity form.
pub(crate) fn singular_candidates(plural: &str) -> SmallVec<[String; 4]> {
    let (prefix, word) = match plural.rfind('_') {
        Some(at) => (&plural[..=at], &plural[at + 1..]),
        None => ("", plural),
    };

    let mut candidates: SmallVec<[String; 4]> = SmallVec::new();
    let mut push = |singular: String| {
        if !candidates.contains(&singular) {
            candidates.push(singular);
        }
    };

    for &(irregular, singular) in IRREGULARS {
        if word == irregular {
            push(format!("{prefix}{singular}"));
        }
    }

    if let Some(stem) = word.strip_suffix("ies") {
        // stories -> story
        push(format!("{prefix}{stem}y"));
    }

    if let Some(stem) = word.strip_suffix("ves") {
        // leaves -> leaf, knives -> knife
        push(format!("{prefix}{stem}f"));
        push(format!("{prefix}{stem}fe"));
    }

    const ES_CLASSES: &[&str] = &["ches", "shes", "sses", "xes", "zes", "oes"];
    if ES_CLASSES.iter().any(|class| word.ends_with(class)) {
        // boxes -> box, heroes -> hero
        push(format!("{prefix}{}", &word[..word.len() - 2]));
    }

    if let Some(stem) = word.strip_suffix('s') {
        if !word.ends_with("ss") && !stem.is_empty() {
            // questions -> question
            push(format!("{prefix}{stem}"));
        }
    }

    push(plural.to_string());
    candidates
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::singular_candidates;

    fn singulars(plural: &str) -> Vec<String> {
        singular_candidates(plural).into_vec()
    }

    #[test]
    fn irregular_forms_come_first() {
        assert_eq!(singulars("children"), ["child", "children"]);
        assert_eq!(singulars("mice"), ["mouse", "mice"]);
    }

    #[test]
    fn productive_suffixes() {
        assert_eq!(singulars("stories"), ["story", "storie", "stories"]);
        assert_eq!(singulars("movies"), ["movy", "movie", "movies"]);
        assert_eq!(singulars("boxes"), ["box", "boxe", "boxes"]);
        assert_eq!(
            singulars("knives"),
            ["knif", "knife", "knive", "knives"]
        );
        assert_eq!(singulars("questions"), ["question", "questions"]);
    }

    #[test]
    fn uninflected_plurals_fall_back_to_identity() {
        assert_eq!(singulars("sheep"), ["sheep"]);
        assert_eq!(singulars("address"), ["address"]);
    }

    #[test]
    fn only_the_last_word_is_inflected() {
        assert_eq!(
            singulars("archived_stories"),
            ["archived_story", "archived_storie", "archived_stories"]
        );
    }
}

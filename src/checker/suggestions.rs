use crate::checker::wordlist::WordList;

/// Generate spelling suggestions using edit distance
pub fn generate(word: &str, list: &WordList, max_suggestions: usize) -> Vec<String> {
    let mut suggestions = Vec::new();
    if max_suggestions == 0 {
        return suggestions;
    }
    let length = word.chars().count();

    // 1. Three-character prefix matches (fast)
    if length >= 3 {
        let mut prefix_matches = list.words_with_prefix(&char_prefix(word, 3));
        prefix_matches.sort_by_key(|w| edit_distance(word, w));
        prefix_matches.truncate(max_suggestions);

        for suggestion in prefix_matches {
            if edit_distance(word, &suggestion) <= 2 {
                suggestions.push(suggestion);
            }
        }
    }

    if suggestions.len() >= max_suggestions {
        suggestions.truncate(max_suggestions);
        return suggestions;
    }

    // 2. Common single-edit transformations
    for transform in generate_transformations(word) {
        if list.contains(&transform) && !suggestions.contains(&transform) {
            suggestions.push(transform);
            if suggestions.len() >= max_suggestions {
                return suggestions;
            }
        }
    }

    // 3. Two-character prefix with a looser distance
    if length >= 2 {
        let mut prefix_matches = list.words_with_prefix(&char_prefix(word, 2));
        prefix_matches.sort_by_key(|w| edit_distance(word, w));

        for candidate in prefix_matches {
            if edit_distance(word, &candidate) <= 3 && !suggestions.contains(&candidate) {
                suggestions.push(candidate);
                if suggestions.len() >= max_suggestions {
                    return suggestions;
                }
            }
        }
    }

    // 4. Bounded full scan, short words only
    if length <= 3 {
        let mut candidates: Vec<_> = list
            .all_words()
            .into_iter()
            .filter(|w| w.chars().count().abs_diff(length) <= 1)
            .take(100)
            .filter_map(|w| {
                let dist = edit_distance(word, &w);
                if dist <= 2 && !suggestions.contains(&w) {
                    Some((dist, w))
                } else {
                    None
                }
            })
            .collect();

        candidates.sort_by_key(|(dist, _)| *dist);

        for (_, candidate) in candidates {
            suggestions.push(candidate);
            if suggestions.len() >= max_suggestions {
                break;
            }
        }
    }

    suggestions.truncate(max_suggestions);
    suggestions
}

fn char_prefix(word: &str, count: usize) -> String {
    word.chars().take(count).collect()
}

/// Levenshtein distance between two strings
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();
    let mut current = vec![0; b_chars.len() + 1];

    for (i, a_char) in a_chars.iter().enumerate() {
        current[0] = i + 1;
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b_chars.len()]
}

/// Deletions, adjacent swaps and common letter confusions
fn generate_transformations(word: &str) -> Vec<String> {
    let mut transformations = Vec::new();
    let chars: Vec<char> = word.chars().collect();

    for i in 0..chars.len() {
        let mut new_word = chars.clone();
        new_word.remove(i);
        transformations.push(new_word.iter().collect());
    }

    for i in 0..chars.len().saturating_sub(1) {
        let mut new_word = chars.clone();
        new_word.swap(i, i + 1);
        transformations.push(new_word.iter().collect());
    }

    let common_replacements = [
        ('a', 'e'),
        ('e', 'i'),
        ('i', 'o'),
        ('o', 'u'),
        ('b', 'v'),
        ('c', 'k'),
        ('f', 'v'),
        ('g', 'j'),
        ('m', 'n'),
        ('s', 'z'),
        ('t', 'd'),
    ];

    for (i, &ch) in chars.iter().enumerate() {
        for &(from, to) in &common_replacements {
            if ch == from {
                let mut new_word = chars.clone();
                new_word[i] = to;
                transformations.push(new_word.iter().collect());
            }
        }
    }

    transformations
}

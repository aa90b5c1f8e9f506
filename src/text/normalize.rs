use std::collections::HashMap;

/// Lowercase, drop punctuation and symbols, collapse whitespace, trim.
pub fn normalize(text: &str) -> String {
    let stripped: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Classic dynamic-programming edit distance over chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Two rolling rows of the (a.len()+1) x (b.len()+1) table.
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            let deletion = prev[j + 1] + 1;
            let insertion = curr[j] + 1;
            curr[j + 1] = substitution.min(deletion).min(insertion);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// `1 - distance / max_len` on normalised text.
///
/// Empty input on either side scores 0; texts that normalise to the same
/// string score 1.
pub fn edit_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let na = normalize(a);
    let nb = normalize(b);
    if na == nb {
        return 1.0;
    }

    let max_len = na.chars().count().max(nb.chars().count());
    if max_len == 0 {
        return 1.0;
    }

    1.0 - levenshtein(&na, &nb) as f64 / max_len as f64
}

fn bigrams(text: &str) -> Vec<(char, char)> {
    let chars: Vec<char> = text.to_lowercase().chars().collect();
    chars.windows(2).map(|w| (w[0], w[1])).collect()
}

/// Sørensen–Dice coefficient over character bigrams.
///
/// This is the cheap approximation used when embeddings are unavailable.
pub fn dice_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a.to_lowercase() == b.to_lowercase() {
        return 1.0;
    }

    let left = bigrams(a);
    let right = bigrams(b);
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let mut counts: HashMap<(char, char), usize> = HashMap::new();
    for pair in &left {
        *counts.entry(*pair).or_insert(0) += 1;
    }

    let mut matches = 0usize;
    for pair in &right {
        if let Some(count) = counts.get_mut(pair)
            && *count > 0
        {
            *count -= 1;
            matches += 1;
        }
    }

    (2 * matches) as f64 / (left.len() + right.len()) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levenshtein_known_distances() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("flaw", "lawn"), 2);
        assert_eq!(levenshtein("same", "same"), 0);
    }

    #[test]
    fn dice_never_exceeds_one_with_repeated_bigrams() {
        let score = dice_similarity("ab", "ababab");
        assert!(score <= 1.0 && score > 0.0, "score = {}", score);
    }
}

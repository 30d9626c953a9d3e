/// Cosine similarity; 0.0 when either side is empty, zero, or the
/// dimensions differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let (dot, na, nb) = a
        .iter()
        .zip(b.iter())
        .fold((0.0f32, 0.0f32, 0.0f32), |(d, aa, bb), (x, y)| {
            (d + (x * y), aa + (x * x), bb + (y * y))
        });

    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na.sqrt() * nb.sqrt())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredMatch {
    pub index: usize,
    pub score: f32,
}

/// Highest-scoring vector. A later vector replaces the current best only when
/// strictly greater, so ties resolve to the smallest index.
pub fn best_match<V: AsRef<[f32]>>(query: &[f32], vectors: &[V]) -> Option<ScoredMatch> {
    let mut best: Option<ScoredMatch> = None;
    for (index, v) in vectors.iter().enumerate() {
        let score = cosine_similarity(query, v.as_ref());
        match best {
            Some(b) if score > b.score => best = Some(ScoredMatch { index, score }),
            None => best = Some(ScoredMatch { index, score }),
            _ => {}
        }
    }
    best
}

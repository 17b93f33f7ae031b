use abstractor_core::{Element, ElementType};

/// Drop running headers and page footers tagged by the deterministic pass.
///
/// Returns the number of removed elements.
pub fn strip_headers_footers(elements: &mut Vec<Element>) -> usize {
    let before = elements.len();
    elements.retain(|e| !matches!(e.tag(), Some(ElementType::Header | ElementType::Footer)));
    let removed = before - elements.len();
    tracing::info!(removed, kept = elements.len(), "stripped headers and footers");
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use abstractor_core::{Position, Signature};

    #[test]
    fn test_strip_keeps_everything_else() {
        let sig = Signature::new("STIX-Regular", 8.5, 4);
        let mut elements: Vec<Element> = (0..4)
            .map(|i| Element::text(i, 1, "x", sig.clone(), Position::new(0.0, 0.0, 1.0, 1.0)))
            .collect();
        elements[0].classify(ElementType::Header);
        elements[1].classify(ElementType::Footer);
        elements[2].classify(ElementType::Session);
        let removed = strip_headers_footers(&mut elements);
        assert_eq!(removed, 2);
        let ids: Vec<u64> = elements.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }
}

use std::collections::BTreeMap;

use abstractor_core::{Element, SignatureStats};

const MAX_EXAMPLES: usize = 3;
const MAX_EXAMPLE_CHARS: usize = 50;

/// Count text spans per signature, keeping the first few texts as examples.
pub fn build_signature_catalog(elements: &[Element]) -> BTreeMap<String, SignatureStats> {
    let mut catalog: BTreeMap<String, SignatureStats> = BTreeMap::new();
    for elem in elements.iter().filter(|e| e.is_text()) {
        let Some(sig) = &elem.signature else {
            continue;
        };
        let entry = catalog.entry(sig.key()).or_insert_with(|| SignatureStats {
            font: sig.font().to_string(),
            size: sig.size(),
            flags: sig.flags(),
            count: 0,
            examples: Vec::new(),
        });
        entry.count += 1;
        if entry.examples.len() < MAX_EXAMPLES {
            entry
                .examples
                .push(elem.text_str().chars().take(MAX_EXAMPLE_CHARS).collect());
        }
    }
    catalog
}

/// Catalog entries by descending frequency, ties broken by key.
pub fn by_frequency(catalog: &BTreeMap<String, SignatureStats>) -> Vec<(&str, &SignatureStats)> {
    let mut entries: Vec<(&str, &SignatureStats)> =
        catalog.iter().map(|(k, v)| (k.as_str(), v)).collect();
    entries.sort_by(|a, b| b.1.count.cmp(&a.1.count).then(a.0.cmp(b.0)));
    entries
}

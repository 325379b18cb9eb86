use tracing::debug;

/// Default topic vocabulary. A single hit anywhere in the title or summary
/// is enough.
pub const QUANTUM_KEYWORDS: &[&str] = &[
    "quantum",
    "qubit",
    "qubits",
    "superposition",
    "entanglement",
    "quantum computer",
    "quantum computing",
    "quantum supremacy",
    "quantum advantage",
    "quantum processor",
    "quantum algorithm",
    "quantum cryptography",
    "quantum network",
    "quantum internet",
    "quantum simulation",
    "quantum error",
    "quantum gate",
    "ibm quantum",
    "google quantum",
    "d-wave",
    "ionq",
    "rigetti",
    "quantum machine learning",
];

/// Case-insensitive keyword match over an article's text fields.
#[derive(Debug, Clone)]
pub struct RelevanceFilter {
    keywords: Vec<String>,
}

impl RelevanceFilter {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    pub fn is_relevant(&self, title: &str, summary: &str) -> bool {
        let content = format!("{} {}", title, summary).to_lowercase();
        let hit = self.keywords.iter().find(|k| content.contains(k.as_str()));
        if let Some(keyword) = hit {
            debug!("Matched keyword '{}' in '{}'", keyword, title);
        }
        hit.is_some()
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl Default for RelevanceFilter {
    fn default() -> Self {
        Self::new(QUANTUM_KEYWORDS)
    }
}

/// Relevance against the default vocabulary.
pub fn is_relevant(title: &str, summary: &str) -> bool {
    RelevanceFilter::default().is_relevant(title, summary)
}

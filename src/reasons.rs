use rand::Rng;

use crate::error::LoadError;

// The rejection reasons, loaded once at startup and immutable after
pub struct ReasonStore {
    reasons: Vec<String>,
}

impl ReasonStore {
    pub fn load(path: &str) -> Result<Self, LoadError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, LoadError> {
        let reasons: Vec<String> = serde_json::from_str(raw)?;
        if reasons.is_empty() {
            return Err(LoadError::Empty);
        }
        Ok(Self { reasons })
    }

    // Pick a random reason
    pub fn pick(&self) -> &str {
        let idx = rand::rng().random_range(0..self.reasons.len());
        &self.reasons[idx]
    }

    pub fn len(&self) -> usize {
        self.reasons.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_a_json_array_of_strings() {
        let store = ReasonStore::from_json(r#"["No.", "Still no.", "Ask again never."]"#).unwrap();
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn pick_returns_an_element_of_the_list() {
        let store = ReasonStore::from_json(r#"["No.", "Still no."]"#).unwrap();
        for _ in 0..20 {
            let reason = store.pick();
            assert!(reason == "No." || reason == "Still no.");
        }
    }

    #[test]
    fn empty_list_is_rejected() {
        assert!(matches!(
            ReasonStore::from_json("[]"),
            Err(LoadError::Empty)
        ));
    }

    #[test]
    fn non_array_input_is_rejected() {
        assert!(matches!(
            ReasonStore::from_json(r#"{"reason": "No."}"#),
            Err(LoadError::Parse(_))
        ));
    }
}

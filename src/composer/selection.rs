/// Platforms picked for the current draft, in the order they were picked
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `id` if absent, remove it if present. Returns true if it is now selected.
    pub fn toggle(&mut self, id: &str) -> bool {
        if let Some(pos) = self.ids.iter().position(|p| p == id) {
            self.ids.remove(pos);
            false
        } else {
            self.ids.push(id.to_string());
            true
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|p| p == id)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn take(&mut self) -> Vec<String> {
        std::mem::take(&mut self.ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut sel = Selection::new();

        assert!(sel.toggle("facebook"));
        assert!(sel.contains("facebook"));
        assert!(!sel.toggle("facebook"));
        assert!(sel.is_empty());
    }

    #[test]
    fn test_keeps_pick_order() {
        let mut sel = Selection::new();
        sel.toggle("youtube");
        sel.toggle("facebook");
        sel.toggle("linkedin");

        assert_eq!(sel.ids(), ["youtube", "facebook", "linkedin"]);
    }

    #[test]
    fn test_double_toggle_restores_membership() {
        let mut sel = Selection::new();
        sel.toggle("facebook");
        sel.toggle("twitter");
        let before = sel.clone();

        sel.toggle("facebook");
        sel.toggle("facebook");

        let mut a = before.ids().to_vec();
        let mut b = sel.ids().to_vec();
        a.sort();
        b.sort();
        assert_eq!(a, b);
        assert_eq!(sel.len(), 2);
    }

    #[test]
    fn test_never_duplicates() {
        let mut sel = Selection::new();
        for _ in 0..5 {
            sel.toggle("instagram");
        }
        assert_eq!(sel.ids(), ["instagram"]);
    }
}

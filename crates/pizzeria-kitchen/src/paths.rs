use std::path::PathBuf;

/// FIFO path for the reception-to-kitchen channel dedicated to `kitchen_id`
/// (spec.md §6 "FIFOs").
#[must_use]
pub fn reception_to_kitchen(prefix: &str, kitchen_id: u64) -> PathBuf {
    PathBuf::from(format!("{prefix}_reception_to_kitchen_{kitchen_id}"))
}

/// FIFO path for the single kitchen-to-reception channel shared by every
/// kitchen (spec.md §6 "FIFOs").
#[must_use]
pub fn kitchen_to_reception(prefix: &str) -> PathBuf {
    PathBuf::from(format!("{prefix}_kitchen_to_reception"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_follow_the_spec_template() {
        assert_eq!(
            reception_to_kitchen("/tmp/plazza", 3),
            PathBuf::from("/tmp/plazza_reception_to_kitchen_3")
        );
        assert_eq!(
            kitchen_to_reception("/tmp/plazza"),
            PathBuf::from("/tmp/plazza_kitchen_to_reception")
        );
    }
}

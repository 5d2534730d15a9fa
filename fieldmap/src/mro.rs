//! C3 linearization shared by entity classes and models.

use crate::errors::{SchemaError, SchemaResult};

/// Compute the method resolution order of `root`.
///
/// `parents` returns the direct bases of a name in declaration order, or an
/// error when the name is unknown. The result starts with `root` itself.
pub(crate) fn linearize<F>(root: &str, parents: &F) -> SchemaResult<Vec<String>>
where
    F: Fn(&str) -> SchemaResult<Vec<String>>,
{
    linearize_guarded(root, parents, &mut Vec::new())
}

fn linearize_guarded<F>(root: &str, parents: &F, visiting: &mut Vec<String>) -> SchemaResult<Vec<String>>
where
    F: Fn(&str) -> SchemaResult<Vec<String>>,
{
    if visiting.iter().any(|name| name == root) {
        return Err(SchemaError::CyclicInheritance(root.to_string()));
    }
    visiting.push(root.to_string());

    let bases = parents(root)?;
    let mut sequences = Vec::with_capacity(bases.len() + 1);
    for base in &bases {
        sequences.push(linearize_guarded(base, parents, visiting)?);
    }
    sequences.push(bases);
    visiting.pop();

    let mut order = vec![root.to_string()];
    merge(&mut sequences, &mut order).ok_or_else(|| SchemaError::InconsistentHierarchy(root.to_string()))?;
    Ok(order)
}

/// Repeatedly take the first head that does not appear in the tail of any sequence.
fn merge(sequences: &mut [Vec<String>], order: &mut Vec<String>) -> Option<()> {
    loop {
        if sequences.iter().all(Vec::is_empty) {
            return Some(());
        }

        let head = sequences
            .iter()
            .filter_map(|seq| seq.first())
            .find(|candidate| sequences.iter().all(|seq| !seq.iter().skip(1).any(|name| name == *candidate)))?
            .clone();

        for seq in sequences.iter_mut() {
            if seq.first() == Some(&head) {
                seq.remove(0);
            }
        }
        order.push(head);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn graph(edges: &[(&str, &[&str])]) -> HashMap<String, Vec<String>> {
        edges
            .iter()
            .map(|(name, bases)| (name.to_string(), bases.iter().map(|b| b.to_string()).collect()))
            .collect()
    }

    fn mro_of(edges: &[(&str, &[&str])], root: &str) -> SchemaResult<Vec<String>> {
        let graph = graph(edges);
        linearize(root, &|name: &str| {
            graph
                .get(name)
                .cloned()
                .ok_or_else(|| SchemaError::UnknownBase { class: root.to_string(), base: name.to_string() })
        })
    }

    #[test]
    fn diamond_visits_shared_root_last() {
        let order = mro_of(&[("O", &[]), ("A", &["O"]), ("B", &["O"]), ("C", &["A", "B"])], "C").unwrap();
        assert_eq!(order, vec!["C", "A", "B", "O"]);
    }

    #[test]
    fn textbook_example() {
        let edges: &[(&str, &[&str])] = &[
            ("O", &[]),
            ("A", &["O"]),
            ("B", &["O"]),
            ("C", &["O"]),
            ("D", &["O"]),
            ("E", &["O"]),
            ("K1", &["A", "B", "C"]),
            ("K2", &["D", "B", "E"]),
            ("K3", &["D", "A"]),
            ("Z", &["K1", "K2", "K3"]),
        ];
        let order = mro_of(edges, "Z").unwrap();
        assert_eq!(order, vec!["Z", "K1", "K2", "K3", "D", "A", "B", "C", "E", "O"]);
    }

    #[test]
    fn inconsistent_order_is_rejected() {
        let err = mro_of(&[("O", &[]), ("A", &["O"]), ("B", &["O"]), ("X", &["A", "B"]), ("Y", &["B", "A"]), ("Z", &["X", "Y"])], "Z")
            .unwrap_err();
        assert!(matches!(err, SchemaError::InconsistentHierarchy(name) if name == "Z"));
    }

    #[test]
    fn cycles_are_rejected() {
        let err = mro_of(&[("A", &["B"]), ("B", &["A"])], "A").unwrap_err();
        assert!(matches!(err, SchemaError::CyclicInheritance(_)));
    }
}

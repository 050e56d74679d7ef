//! Entity trait: records with a stable identity.

/// A persisted record addressed by a strongly-typed id.
pub trait Entity {
    /// Human-readable resource name, used in messages such as "Mentor not found".
    const KIND: &'static str;

    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}

/// Build the canonical "<Kind> not found" message for an entity type.
pub fn not_found_message<E: Entity>() -> String {
    format!("{} not found", E::KIND)
}

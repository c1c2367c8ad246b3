//! Identifier generation for added nodes.

use uuid::Uuid;

/// Source of fresh node identifiers.
pub trait IdGenerator: Send + Sync {
    /// Returns an identifier not handed out before.
    fn generate(&self) -> String;
}

/// Generates random (version 4) UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

impl<G: IdGenerator + ?Sized> IdGenerator for &G {
    fn generate(&self) -> String {
        (**self).generate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_generator_is_unique() {
        let generator = UuidGenerator;
        let first = generator.generate();
        assert_ne!(first, generator.generate());
        assert!(Uuid::parse_str(&first).is_ok());
    }
}

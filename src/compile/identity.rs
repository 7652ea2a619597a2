//! Concept identity resolution.
//!
//! An atomic concept reference resolves to a canonical identity string: its
//! explicit opaque identifier when it has one, otherwise a name-based UUID
//! derived from the terminology namespace and the concept's code. The
//! derivation depends only on its inputs, so independent compiler runs agree.

use md5::{Digest, Md5};
use uuid::Uuid;

use crate::dl::{Concept, Feature, Role};
use crate::error::{CompileError, CompileResult};
use crate::lego::ConceptRef;
use crate::registry::Origin;

use super::{CompileContext, ExpressionCompiler};

/// Version-3 (MD5, name-based) UUID over raw bytes, with no namespace UUID.
///
/// This is the conventional derivation for SNOMED concept UUIDs, so codes
/// resolved here line up with identities produced by other terminology tools.
pub fn name_uuid_from_bytes(bytes: &[u8]) -> Uuid {
    let digest: [u8; 16] = Md5::digest(bytes).into();
    uuid::Builder::from_md5_bytes(digest).into_uuid()
}

/// ISO-8859-1 encoding of `text`. Characters outside Latin-1 become `?`.
pub fn latin1_bytes(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

/// Identity of a coded concept within `namespace`.
pub fn coded_identity(namespace: &str, code: u64) -> String {
    let name = format!("{namespace}{code}");
    name_uuid_from_bytes(&latin1_bytes(&name)).to_string()
}

/// Resolves concept references to identity strings.
#[derive(Debug, Clone, Copy)]
pub struct IdentityResolver<'a> {
    namespace: &'a str,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(namespace: &'a str) -> Self {
        Self { namespace }
    }

    /// Resolve a reference, failing with `MissingIdentity` when it carries
    /// neither a non-empty opaque identifier nor a code.
    pub fn resolve(&self, concept: &ConceptRef) -> CompileResult<String> {
        if let Some(uuid) = concept.uuid.as_deref().filter(|u| !u.is_empty()) {
            return Ok(uuid.to_string());
        }
        if let Some(code) = concept.sctid {
            return Ok(coded_identity(self.namespace, code));
        }
        Err(CompileError::MissingIdentity {
            description: concept.description(),
        })
    }
}

impl ExpressionCompiler {
    pub fn resolver(&self) -> IdentityResolver<'_> {
        IdentityResolver::new(&self.config().snomed_namespace)
    }

    /// Resolve a concept reference to an atomic concept and register it.
    pub(crate) fn atomic_concept(
        &self,
        concept: &ConceptRef,
        ctx: &mut CompileContext,
    ) -> CompileResult<Concept> {
        let identity = self.resolver().resolve(concept)?;
        ctx.registry.register(
            identity.clone(),
            Origin::Concept {
                description: concept.desc.clone(),
            },
        );
        Ok(Concept::Atomic(identity))
    }

    /// Resolve a relation type used as a role.
    pub(crate) fn role_for(
        &self,
        concept: &ConceptRef,
        ctx: &mut CompileContext,
    ) -> CompileResult<Role> {
        let identity = self.resolver().resolve(concept)?;
        ctx.registry.register(identity.clone(), Origin::Role);
        Ok(Role::new(identity))
    }

    /// Resolve a relation type used as a feature.
    pub(crate) fn feature_for(
        &self,
        concept: &ConceptRef,
        ctx: &mut CompileContext,
    ) -> CompileResult<Feature> {
        let identity = self.resolver().resolve(concept)?;
        ctx.registry.register(identity.clone(), Origin::Feature);
        Ok(Feature::new(identity))
    }

    /// The shared grouping role.
    pub(crate) fn role_group(&self, ctx: &mut CompileContext) -> Role {
        ctx.registry.register(self.config().role_group.clone(), Origin::Role);
        Role::new(self.config().role_group.clone())
    }
}

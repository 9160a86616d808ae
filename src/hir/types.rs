//! Types as the facade hands them out.
//!
//! A [`KType`] is a [`SemType`] stamped with the session token and the
//! type-checking domain it came from. Error types are ordinary values: they
//! carry a reason and no candidate symbols, and every query keeps working on
//! them.

use std::fmt;

use smol_str::SmolStr;

use super::session::AnalysisSession;
use super::symbols::Symbol;
use super::token::ValidityToken;
use crate::base::ClassId;
use crate::model::{ClassKind, SemType, TypeEnvironment, TypeProjection, Variance};

#[derive(Clone)]
pub struct KType {
    token: ValidityToken,
    ty: SemType,
    domain: u64,
}

/// One type argument of a [`KType`].
#[derive(Debug, Clone, PartialEq)]
pub enum KTypeProjection {
    Star,
    Projected { variance: Variance, ty: KType },
}

impl KType {
    pub(crate) fn new(token: ValidityToken, ty: SemType, domain: u64) -> Self {
        Self { token, ty, domain }
    }

    pub fn token(&self) -> &ValidityToken {
        &self.token
    }

    /// Identity of the type-checking domain this type belongs to.
    pub fn domain(&self) -> u64 {
        self.domain
    }

    /// The underlying type value.
    #[track_caller]
    pub fn semantic(&self, session: &AnalysisSession) -> &SemType {
        session.assert_accessible(&self.token);
        &self.ty
    }

    pub(crate) fn raw(&self) -> &SemType {
        &self.ty
    }

    pub fn is_marked_nullable(&self, session: &AnalysisSession) -> bool {
        self.semantic(session).is_nullable()
    }

    pub fn can_be_null(&self, session: &AnalysisSession) -> bool {
        self.semantic(session).can_be_null()
    }

    /// Class of a usual class type.
    pub fn class_id(&self, session: &AnalysisSession) -> Option<ClassId> {
        self.semantic(session).class_id().cloned()
    }

    pub fn type_arguments(&self, session: &AnalysisSession) -> Vec<KTypeProjection> {
        self.semantic(session)
            .arguments()
            .iter()
            .map(|argument| match argument {
                TypeProjection::Star { .. } => KTypeProjection::Star,
                TypeProjection::Projected { variance, ty } => KTypeProjection::Projected {
                    variance: *variance,
                    ty: self.derive(ty.clone()),
                },
            })
            .collect()
    }

    pub fn is_error(&self, session: &AnalysisSession) -> bool {
        self.semantic(session).is_error()
    }

    /// Diagnostic of an error type.
    pub fn error_message(&self, session: &AnalysisSession) -> Option<SmolStr> {
        match self.semantic(session) {
            SemType::Error { reason, .. } => Some(reason.clone()),
            _ => None,
        }
    }

    /// Symbols an unresolved name could have meant. The facade never guesses,
    /// so this is always empty.
    pub fn candidate_symbols(&self, session: &AnalysisSession) -> Vec<Symbol> {
        session.assert_accessible(&self.token);
        Vec::new()
    }

    /// `fun interface` types.
    pub fn is_functional_interface_type(&self, session: &AnalysisSession) -> bool {
        let Some(class_id) = self.semantic(session).class_id() else {
            return false;
        };
        session
            .class_record(class_id)
            .is_some_and(|r| r.kind == ClassKind::Interface && r.flags.is_fun_interface)
    }

    pub fn with_nullability(&self, session: &AnalysisSession, nullable: bool) -> KType {
        self.derive(self.semantic(session).with_nullability(nullable))
    }

    /// Symbol of the class of a usual class type.
    pub fn class_symbol(&self, session: &AnalysisSession) -> Option<Symbol> {
        let class_id = self.semantic(session).class_id()?;
        session.class_symbol(class_id)
    }

    /// Rendered form, for debugging output.
    pub fn render(&self, session: &AnalysisSession) -> String {
        self.semantic(session).to_string()
    }

    fn derive(&self, ty: SemType) -> KType {
        KType::new(self.token.clone(), ty, self.domain)
    }
}

impl PartialEq for KType {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token && self.domain == other.domain && self.ty == other.ty
    }
}

impl fmt::Debug for KType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KType({})", self.ty)
    }
}

impl fmt::Display for KType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.ty, f)
    }
}

impl AnalysisSession {
    /// Stamp a type value with this session.
    pub(crate) fn ktype(&self, ty: SemType) -> KType {
        KType::new(self.token().clone(), ty, self.checker_domain())
    }
}

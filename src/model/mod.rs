//! Collaborators of the facade and their reference implementations.
//!
//! ```text
//! oracle.rs    InferenceOracle + BindingFacts      (what the facade asks)
//! graph.rs     ModuleGraph, TypeChecker, envs      (where records come from)
//! records.rs   ClassRecord, CallableRecord, SemType
//! ---------------------------------------------------------------------
//! memory.rs    InMemoryModuleGraph
//! builtins.rs  minimal standard library
//! checker.rs   HierarchyTypeChecker
//! lower.rs     syntactic lowering of declarations
//! lexical.rs   syntactic lexical scope chains
//! recorded.rs  RecordedOracle
//! ```

pub mod builtins;
pub mod checker;
pub mod graph;
pub mod lexical;
pub mod lower;
pub mod memory;
pub mod oracle;
pub mod recorded;
pub mod records;

pub use checker::HierarchyTypeChecker;
pub use graph::{ModuleGraph, PackageFragment, ResolutionEnv, TypeChecker, TypeEnvironment};
pub use memory::InMemoryModuleGraph;
pub use oracle::{
    AnalysisMode, AnalysisRequest, BindingFacts, FrameKind, ImplicitReceiverCast, InferenceOracle,
    LexicalFrame, LexicalScopeChain, OwnerRef, ReceiverFact, ReceiverKind, ResolvedTarget,
    ScopeEntry, SmartCastFact,
};
pub use recorded::RecordedOracle;
pub use records::{
    AnnotationRecord, CallableFlags, CallableKind, CallableRecord, ClassFlags, ClassKind,
    ClassRecord, ConstantValue, DeclRecord, Modality, SemType, SourceRef, SymbolOrigin,
    TypeAliasRecord, TypeParameterRecord, TypeProjection, ValueParameterRecord, Variance,
    Visibility,
};

//! IDE-facing query components over an [`AnalysisSession`].
//!
//! Each module answers one family of questions a tool asks about code.
//! Everything takes the session first and returns session-bound handles.
//!
//! ```text
//! analysis.rs              AnalysisHost          (owns state, opens sessions)
//!     │
//!     ▼
//! symbol_provider.rs       declaration → Symbol
//! scope_provider.rs        scopes, imports, position context
//! symbol_at_position.rs    offset → declaration / reference target
//! containing_declaration   Symbol → enclosing Symbol
//! expression_type.rs       expression → KType
//! smart_casts.rs           stable smart casts, receiver casts
//! subtyping.rs             equality and subtyping of KTypes
//! type_creator.rs          class types from ids or symbols
//! inheritors.rs            sealed inheritors, enum entries
//! platform_type.rs         JVM projection of types
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use semfacade::ide::{AnalysisHost, scope_provider};
//!
//! let mut host = AnalysisHost::with_builtins(settings);
//! host.set_file_text("a.kt", "class A { fun f() {} }");
//!
//! let session = host.analysis_session();
//! let class = symbol_provider::class_symbol_by_id(&session, &ClassId::parse("A")).unwrap();
//! let members = scope_provider::member_scope(&session, &class);
//! ```

mod analysis;
pub mod containing_declaration;
pub mod expression_type;
pub mod inheritors;
pub mod platform_type;
pub mod scope_provider;
pub mod smart_casts;
pub mod subtyping;
pub mod symbol_at_position;
pub mod symbol_provider;
pub mod type_creator;

pub use analysis::AnalysisHost;
pub use containing_declaration::containing_declaration;
pub use expression_type::expression_type;
pub use inheritors::{enum_entries, sealed_inheritors};
pub use platform_type::{PlatformType, platform_type};
pub use scope_provider::{ImplicitReceiver, ScopeContext, scope_context_for_position};
pub use smart_casts::{ImplicitReceiverSmartCast, SmartCastInfo, implicit_receiver_smart_casts, smart_cast_info};
pub use subtyping::{is_equal, is_subtype_of};
pub use symbol_at_position::{declaration_at_offset, reference_at_offset};
pub use type_creator::{ClassTypeBuilder, build_class_type};

//! Centralized limits and thresholds for the lowering workspace.
//!
//! Keeping these values in one place prevents duplicate definitions with
//! inconsistent values between the semantic model, the lowering core and the
//! CLI.

// =============================================================================
// Stack growth (Type Converter / substitution)
// =============================================================================

/// Remaining stack below which structural recursion over types grows the
/// stack instead of recursing further on the current segment.
///
/// Type nesting is unbounded (`List<List<List<...>>>`), so the converter and
/// the substitution walker grow the stack on demand rather than imposing a
/// depth limit.
pub const STACK_RED_ZONE: usize = 64 * 1024;

/// Size of each freshly allocated stack segment.
pub const STACK_GROWTH_SIZE: usize = 1024 * 1024;

// =============================================================================
// Hierarchy limits
// =============================================================================

/// Maximum supertype chain depth followed while searching for a supertype
/// path or computing inherited member scopes.
///
/// Frontends reject cyclic hierarchies before lowering; this limit is the
/// backstop that turns a malformed tree into an invariant-violation error
/// instead of a stack overflow.
///
/// ```text
/// interface A : B
/// interface B : A   // rejected by the frontend, caught here otherwise
/// ```
pub const MAX_HIERARCHY_DEPTH: usize = 256;

/// Maximum depth for bound chasing when erasing a type parameter
/// (`T : U`, `U : V`, ...). Past this depth the parameter erases to the top
/// type.
pub const MAX_BOUND_CHASE_DEPTH: usize = 32;

/// Maximum depth for the structural subtype check used to pick the most
/// specific inherited member.
pub const MAX_SUBTYPE_DEPTH: usize = 64;

// =============================================================================
// Capacity hints
// =============================================================================

/// Initial capacity of the declaration storage identity map.
pub const INITIAL_STORAGE_CAPACITY: usize = 1024;

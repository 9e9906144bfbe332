use crate::{MethodCall, MethodResolution, TypeEnv};

use super::env::TyContext;

/// Resolve a method call against a receiver type using Java overload
/// resolution rules.
///
/// Side-effect free with respect to the global environment: capture
/// conversion allocations land in the supplied [`TyContext`] and die with it.
pub fn resolve_method_call(ctx: &mut TyContext<'_>, call: &MethodCall<'_>) -> MethodResolution {
    let receiver_parts = ctx.normalize_receiver_for_member_access(&call.receiver);

    let env_ro: &dyn TypeEnv = &*ctx;
    crate::resolve::resolve_method_call_impl(env_ro, call, receiver_parts)
}

//! Text and JSON rendering of linkable declarations.
//!
//! Dumping forces every lazy field of the dumped declarations, so it doubles
//! as the "lower everything" driver used by the CLI and tests.

use crate::declaration::{LinkDecl, LinkDeclKind, LinkExpr, LinkOrigin, ParameterKind, ValueParameter};
use crate::error::LoweringResult;
use crate::ids::LinkDeclId;
use crate::session::LoweringSession;
use crate::types::{LinkType, LinkTypeArg};
use declink_semantic::{ConstValue, Modality, SemDeclId, Variance};
use serde::Serialize;
use std::fmt::Write as _;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamDump {
    pub name: String,
    pub kind: ParameterKind,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_vararg: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclDump {
    pub id: LinkDeclId,
    pub kind: LinkDeclKind,
    pub name: String,
    pub qualified_name: String,
    pub origin: LinkOrigin,
    pub modality: Modality,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_static: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub type_parameters: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispatch_receiver: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension_receiver: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub value_parameters: Vec<ParamDump>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub overridden: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_source: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub supertypes: Vec<String>,
    /// Declared members, then fake overrides.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<DeclDump>,
}

// =============================================================================
// Collecting
// =============================================================================

/// What a dump includes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DumpFilter {
    /// Only these top-level classes; everything when empty.
    pub classes: Vec<String>,
    /// Leave fake overrides out of class member lists.
    pub skip_fake_overrides: bool,
}

/// Dump the top-level declarations selected by `filter`, in tree order.
pub fn dump_tree(session: &LoweringSession, filter: &DumpFilter) -> LoweringResult<Vec<DeclDump>> {
    roots(session, &filter.classes)
        .into_iter()
        .map(|root| dump_semantic(session, root, filter))
        .collect()
}

/// The top-level declarations a dump starts from, in tree order.
pub fn roots(session: &LoweringSession, classes: &[String]) -> Vec<SemDeclId> {
    let tree = session.tree();
    tree.top_level()
        .iter()
        .copied()
        .filter(|&id| {
            classes.is_empty()
                || (tree.class(id).is_some() && classes.iter().any(|name| name == tree.decl_name(id)))
        })
        .collect()
}

pub fn dump_semantic(session: &LoweringSession, decl: SemDeclId, filter: &DumpFilter) -> LoweringResult<DeclDump> {
    let node = session.resolve(decl, None)?;
    dump_decl(session, &node, filter)
}

pub fn dump_decl(session: &LoweringSession, node: &LinkDecl, filter: &DumpFilter) -> LoweringResult<DeclDump> {
    let tree = session.tree();
    let mut dump = DeclDump {
        id: node.id(),
        kind: node.kind(),
        name: tree.name(node.name()).to_string(),
        qualified_name: display_name(session, node),
        origin: node.origin(),
        modality: node.modality(),
        is_static: node.is_static(),
        type_parameters: node
            .type_parameters()
            .iter()
            .filter_map(|&id| session.type_parameter(id))
            .map(|info| tree.name(info.name).to_string())
            .collect(),
        dispatch_receiver: None,
        extension_receiver: None,
        value_parameters: Vec::new(),
        return_type: None,
        overridden: Vec::new(),
        annotations: node
            .annotations(session)?
            .iter()
            .map(|a| {
                let class = render_decl_ref(session, a.class);
                if a.args.is_empty() {
                    format!("@{class}")
                } else {
                    let args: Vec<String> = a
                        .args
                        .iter()
                        .map(|(name, value)| format!("{} = {}", tree.name(*name), render_const(value)))
                        .collect();
                    format!("@{class}({})", args.join(", "))
                }
            })
            .collect(),
        initial_signature: None,
        container_source: node.container_source().map(|source| match source.facade {
            Some(facade) => format!("{}/{}", tree.name(source.module), tree.name(facade)),
            None => tree.name(source.module).to_string(),
        }),
        supertypes: Vec::new(),
        members: Vec::new(),
    };

    match node.kind() {
        LinkDeclKind::Class => {
            dump.dispatch_receiver = node
                .this_receiver(session)?
                .map(|this| render_type(session, &this.ty));
            dump.supertypes = node
                .supertypes(session)?
                .iter()
                .map(|ty| render_type(session, ty))
                .collect();
            for &member in node.declared_members(session)? {
                let member = session.decl(member)?;
                dump.members.push(dump_decl(session, &member, filter)?);
            }
            if !filter.skip_fake_overrides {
                for member in session.overrides_of(node.semantic())?.iter() {
                    let member = session.decl(member)?;
                    dump.members.push(dump_decl(session, &member, filter)?);
                }
            }
        }
        LinkDeclKind::Function | LinkDeclKind::Property => {
            dump.dispatch_receiver = node
                .dispatch_receiver_parameter(session)?
                .map(|p| render_type(session, &p.ty));
            dump.extension_receiver = node
                .extension_receiver_parameter(session)?
                .map(|p| render_type(session, &p.ty));
            let params = node.value_parameters(session)?;
            dump.value_parameters = params
                .iter()
                .map(|p| ParamDump {
                    name: tree.name(p.name).to_string(),
                    kind: p.kind,
                    ty: render_type(session, &p.ty),
                    default: p
                        .default
                        .as_ref()
                        .map(|expr| render_expr(session, node.id(), params, expr)),
                    is_vararg: p.is_vararg,
                })
                .collect();
            dump.return_type = Some(render_type(session, node.return_type(session)?));
            dump.overridden = node
                .overridden_symbols(session)?
                .iter()
                .map(|&id| render_decl_ref(session, id))
                .collect();
            if node.kind() == LinkDeclKind::Function {
                dump.initial_signature = node
                    .initial_signature(session)?
                    .map(|id| render_decl_ref(session, id));
            }
        }
    }
    Ok(dump)
}

// =============================================================================
// Rendering
// =============================================================================

/// `Outer.Inner` for classes, `Context.member` for members (the context is
/// the inheriting class for fake overrides).
pub fn display_name(session: &LoweringSession, node: &LinkDecl) -> String {
    let tree = session.tree();
    match (node.kind(), node.context()) {
        (LinkDeclKind::Class, _) | (_, None) => tree.qualified_name(node.semantic()),
        (_, Some(context)) => format!("{}.{}", tree.qualified_name(context), tree.name(node.name())),
    }
}

fn render_decl_ref(session: &LoweringSession, id: LinkDeclId) -> String {
    match session.decl(id) {
        Ok(node) => display_name(session, &node),
        Err(_) => id.to_string(),
    }
}

pub fn render_type(session: &LoweringSession, ty: &LinkType) -> String {
    let mut out = String::new();
    write_type(session, ty, &mut out);
    out
}

fn write_type(session: &LoweringSession, ty: &LinkType, out: &mut String) {
    match ty {
        LinkType::Class { class, args, nullable } => {
            out.push_str(&render_decl_ref(session, *class));
            if !args.is_empty() {
                out.push('<');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    match arg {
                        LinkTypeArg::Star => out.push('*'),
                        LinkTypeArg::Type { variance, ty } => {
                            match variance {
                                Variance::In => out.push_str("in "),
                                Variance::Out => out.push_str("out "),
                                Variance::Invariant => {}
                            }
                            write_type(session, ty, out);
                        }
                    }
                }
                out.push('>');
            }
            if *nullable {
                out.push('?');
            }
        }
        LinkType::TypeParameter { param, nullable } => {
            match session.type_parameter(*param) {
                Some(info) => out.push_str(session.tree().name(info.name)),
                None => out.push_str(&param.to_string()),
            }
            if *nullable {
                out.push('?');
            }
        }
        LinkType::Error => out.push_str("<error>"),
    }
}

fn render_const(value: &ConstValue) -> String {
    match value {
        ConstValue::Null => "null".to_string(),
        ConstValue::Bool(b) => b.to_string(),
        ConstValue::Int(i) => i.to_string(),
        ConstValue::String(s) => format!("{s:?}"),
    }
}

fn render_expr(
    session: &LoweringSession,
    owner: LinkDeclId,
    params: &[ValueParameter],
    expr: &LinkExpr,
) -> String {
    match expr {
        LinkExpr::Const(value) => render_const(value),
        LinkExpr::ValueParameter { owner: target, index } => {
            match params.get(*index as usize).filter(|_| *target == owner) {
                Some(param) => session.tree().name(param.name).to_string(),
                None => format!("{target}#{index}"),
            }
        }
        LinkExpr::Declaration(id) => render_decl_ref(session, *id),
        LinkExpr::Call { callee, args } => {
            let args: Vec<String> = args
                .iter()
                .map(|arg| render_expr(session, owner, params, arg))
                .collect();
            format!("{}({})", render_decl_ref(session, *callee), args.join(", "))
        }
    }
}

/// Kotlin-like text rendering, one declaration per line, members indented.
pub fn render_text(dumps: &[DeclDump]) -> String {
    let mut out = String::new();
    for dump in dumps {
        write_text(dump, 0, &mut out);
    }
    out
}

fn write_text(dump: &DeclDump, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for annotation in &dump.annotations {
        let _ = writeln!(out, "{indent}{annotation}");
    }
    let _ = write!(out, "{indent}");
    if dump.origin == LinkOrigin::FakeOverride {
        out.push_str("/* fake override */ ");
    }
    match dump.modality {
        Modality::Abstract => out.push_str("abstract "),
        Modality::Open => out.push_str("open "),
        Modality::Final => {}
    }
    if dump.is_static {
        out.push_str("static ");
    }
    let type_params = if dump.type_parameters.is_empty() {
        String::new()
    } else {
        format!("<{}> ", dump.type_parameters.join(", "))
    };
    match dump.kind {
        LinkDeclKind::Class => {
            let _ = write!(out, "class {}", dump.qualified_name);
            if !dump.type_parameters.is_empty() {
                let _ = write!(out, "<{}>", dump.type_parameters.join(", "));
            }
            if !dump.supertypes.is_empty() {
                let _ = write!(out, " : {}", dump.supertypes.join(", "));
            }
            if dump.members.is_empty() {
                out.push('\n');
            } else {
                out.push_str(" {\n");
                for member in &dump.members {
                    write_text(member, depth + 1, out);
                }
                let _ = writeln!(out, "{indent}}}");
            }
            return;
        }
        LinkDeclKind::Function => {
            let _ = write!(out, "fun {type_params}");
        }
        LinkDeclKind::Property => {
            let _ = write!(out, "val {type_params}");
        }
    }
    let contexts: Vec<&str> = dump
        .value_parameters
        .iter()
        .filter(|p| p.kind == ParameterKind::Context)
        .map(|p| p.ty.as_str())
        .collect();
    if !contexts.is_empty() {
        let _ = write!(out, "context({}) ", contexts.join(", "));
    }
    if let Some(receiver) = &dump.dispatch_receiver {
        let _ = write!(out, "[{receiver}] ");
    }
    if let Some(receiver) = &dump.extension_receiver {
        let _ = write!(out, "{receiver}.");
    }
    out.push_str(&dump.name);
    if dump.kind == LinkDeclKind::Function {
        let params: Vec<String> = dump
            .value_parameters
            .iter()
            .filter(|p| p.kind == ParameterKind::Regular)
            .map(|p| {
                let mut text = String::new();
                if p.is_vararg {
                    text.push_str("vararg ");
                }
                let _ = write!(text, "{}: {}", p.name, p.ty);
                if let Some(default) = &p.default {
                    let _ = write!(text, " = {default}");
                }
                text
            })
            .collect();
        let _ = write!(out, "({})", params.join(", "));
    }
    if let Some(ret) = &dump.return_type {
        let _ = write!(out, ": {ret}");
    }
    if !dump.overridden.is_empty() {
        let _ = write!(out, " overrides {}", dump.overridden.join(", "));
    }
    if let Some(initial) = &dump.initial_signature {
        let _ = write!(out, " from {initial}");
    }
    if let Some(source) = &dump.container_source {
        let _ = write!(out, " in {source}");
    }
    out.push('\n');
}

pub fn render_json(dumps: &[DeclDump]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(dumps)
}

#[cfg(test)]
#[path = "../tests/dump_tests.rs"]
mod tests;

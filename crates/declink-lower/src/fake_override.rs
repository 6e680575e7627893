//! Synthetic ("fake") override generation.
//!
//! For every class the generator computes a [`ClassScope`]: the inheritable
//! members the class declares plus one fake override for each inherited
//! member it does not redeclare. Scopes are built bottom-up from the
//! supertypes' scopes and memoized per class for the lifetime of the
//! session.
//!
//! Inherited members are grouped by their erased signature as seen from the
//! class. Within a group, members overridden by a sibling candidate are
//! dropped; what is left is either a unique target, an intersection with a
//! most specific return type, or a conflict. Conflicts are reported to the
//! diagnostic sink and resolved in favour of the first candidate in
//! supertype declaration order.

use crate::error::{LoweringError, LoweringResult};
use crate::hierarchy;
use crate::ids::LinkDeclId;
use crate::session::LoweringSession;
use crate::signature::{SignatureKey, signature_key};
use crate::substitution::Substitution;
use dashmap::DashMap;
use declink_common::Diagnostic;
use declink_common::diagnostics::diagnostic_messages;
use declink_semantic::{SemDeclId, SemType, SemanticTree};
use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::{debug, trace, warn};

// =============================================================================
// Scopes
// =============================================================================

/// One member visible in a class scope.
#[derive(Clone, Debug)]
pub struct ScopeMember {
    pub link: LinkDeclId,
    /// The semantic member this entry lowers.
    pub sem: SemDeclId,
    /// The class that declares `sem`.
    pub declaring: SemDeclId,
    /// Maps `declaring`'s type parameters into the scope's class.
    pub subst: Arc<Substitution>,
    pub is_fake_override: bool,
    pub is_abstract: bool,
    /// Erased signature in the scope's class.
    pub key: SignatureKey,
}

#[derive(Debug)]
pub struct ClassScope {
    pub class: SemDeclId,
    /// Inheritable members declared by the class itself.
    pub declared: Vec<ScopeMember>,
    /// Fake overrides in first-found order.
    pub fake_overrides: Vec<ScopeMember>,
}

impl ClassScope {
    /// Declared members first, then fake overrides.
    pub fn members(&self) -> impl Iterator<Item = &ScopeMember> {
        self.declared.iter().chain(&self.fake_overrides)
    }
}

/// The fake overrides of one class. Restartable: every call to
/// [`iter`](Self::iter) starts from the beginning.
#[derive(Clone, Debug)]
pub struct FakeOverrides {
    scope: Arc<ClassScope>,
}

impl FakeOverrides {
    pub fn class(&self) -> SemDeclId {
        self.scope.class
    }

    pub fn iter(&self) -> impl Iterator<Item = LinkDeclId> + '_ {
        self.scope.fake_overrides.iter().map(|m| m.link)
    }

    pub fn len(&self) -> usize {
        self.scope.fake_overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scope.fake_overrides.is_empty()
    }

    pub fn to_vec(&self) -> Vec<LinkDeclId> {
        self.iter().collect()
    }
}

// =============================================================================
// Generator
// =============================================================================

#[derive(Clone, Debug)]
struct Candidate {
    member: ScopeMember,
    /// Maps the member's declaring class into the class being built.
    subst: Arc<Substitution>,
    return_type: SemType,
    /// Direct supertype the candidate was found through.
    via: SemDeclId,
    /// Every inherited node lowering the candidate's member, one per path.
    links: SmallVec<[LinkDeclId; 2]>,
}

#[derive(Default)]
pub struct FakeOverrideGenerator {
    scopes: DashMap<SemDeclId, Arc<OnceCell<Arc<ClassScope>>>>,
    base_symbols: DashMap<LinkDeclId, Arc<[LinkDeclId]>>,
    substitutions: DashMap<LinkDeclId, Arc<Substitution>>,
}

impl FakeOverrideGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The memoized scope of `class`, building it (and its supertypes'
    /// scopes) on first request.
    pub fn scope(&self, session: &LoweringSession, class: SemDeclId) -> LoweringResult<Arc<ClassScope>> {
        let cell = match self.scopes.get(&class) {
            Some(cell) => cell.clone(),
            None => {
                let tree = session.tree();
                if tree.class(class).is_none() {
                    return Err(if tree.contains(class) {
                        LoweringError::NotAClass(class)
                    } else {
                        LoweringError::UnknownDeclaration(class)
                    });
                }
                // Cells are only ever initialized along acyclic supertype
                // edges, so building never waits on itself.
                hierarchy::check_acyclic(tree, class, session.options().max_hierarchy_depth)?;
                self.scopes.entry(class).or_default().clone()
            }
        };
        cell.get_or_try_init(|| self.build_scope(session, class).map(Arc::new))
            .cloned()
    }

    /// Base symbols recorded for a fake override built by this generator.
    pub fn base_symbols(&self, fake_override: LinkDeclId) -> Option<Arc<[LinkDeclId]>> {
        self.base_symbols.get(&fake_override).map(|r| r.clone())
    }

    /// Substitution used for a fake override built by this generator.
    pub fn substitution(&self, fake_override: LinkDeclId) -> Option<Arc<Substitution>> {
        self.substitutions.get(&fake_override).map(|r| r.clone())
    }

    pub fn fake_overrides(&self, session: &LoweringSession, class: SemDeclId) -> LoweringResult<FakeOverrides> {
        Ok(FakeOverrides {
            scope: self.scope(session, class)?,
        })
    }

    #[tracing::instrument(level = "debug", skip(self, session))]
    fn build_scope(&self, session: &LoweringSession, class: SemDeclId) -> LoweringResult<ClassScope> {
        let tree = session.tree();
        let sem_class = tree.class(class).ok_or(LoweringError::NotAClass(class))?;
        let identity = Arc::new(Substitution::identity());

        let mut declared = Vec::new();
        for &member in &sem_class.members {
            let Some(view) = tree.callable(member) else {
                continue;
            };
            if view.is_static {
                continue;
            }
            let link = session.resolve(member, None)?.id();
            declared.push(ScopeMember {
                link,
                sem: member,
                declaring: class,
                subst: identity.clone(),
                is_fake_override: false,
                is_abstract: view.is_abstract(),
                key: signature_key(tree, &view, &identity),
            });
        }
        let declared_keys: FxHashSet<&SignatureKey> = declared.iter().map(|m| &m.key).collect();

        let mut groups: IndexMap<SignatureKey, SmallVec<[Candidate; 2]>> = IndexMap::new();
        for (super_class, supertype) in hierarchy::direct_supertypes(tree, class) {
            let super_scope = self.scope(session, super_class)?;
            let step = Substitution::for_supertype(tree, supertype);
            for member in super_scope.members() {
                let Some(view) = tree.callable(member.sem) else {
                    continue;
                };
                let subst = Arc::new(step.compose(tree, &member.subst));
                let key = signature_key(tree, &view, &subst);
                if declared_keys.contains(&key) {
                    continue;
                }
                let return_type = subst.apply(tree, view.return_type);
                let mut links = SmallVec::new();
                links.push(member.link);
                groups.entry(key).or_default().push(Candidate {
                    member: member.clone(),
                    subst,
                    return_type,
                    via: super_class,
                    links,
                });
            }
        }

        let mut chosen_sems: FxHashSet<SemDeclId> = FxHashSet::default();
        let mut fake_overrides = Vec::with_capacity(groups.len());
        for (key, candidates) in groups {
            let candidates = self.collapse(session, class, candidates);
            let Some(chosen) = self.choose(session, class, &candidates) else {
                continue;
            };
            if !chosen_sems.insert(chosen.member.sem) {
                self.report(
                    session,
                    Diagnostic::from_message(
                        diagnostic_messages::INCONSISTENT_INHERITED_SIGNATURE,
                        member_subject(tree, class, chosen.member.sem),
                        &[
                            &tree.qualified_name(class),
                            tree.decl_name(chosen.member.sem),
                            &tree.qualified_name(first_via(&candidates, chosen.member.sem)),
                        ],
                    ),
                );
                continue;
            }

            let node = session
                .storage()
                .get(session.classifiers(), chosen.member.sem, Some(class))?;
            let mut bases: SmallVec<[LinkDeclId; 2]> = SmallVec::new();
            for &link in candidates.iter().flat_map(|c| &c.links) {
                if !bases.contains(&link) {
                    bases.push(link);
                }
            }
            trace!(class = %class, fake_override = %node.id(), bases = ?bases, "fake override");
            self.base_symbols.insert(node.id(), bases.into_iter().collect());
            self.substitutions.insert(node.id(), chosen.subst.clone());
            fake_overrides.push(ScopeMember {
                link: node.id(),
                sem: chosen.member.sem,
                declaring: chosen.member.declaring,
                subst: chosen.subst.clone(),
                is_fake_override: true,
                is_abstract: candidates.iter().all(|c| c.member.is_abstract),
                key,
            });
        }

        debug!(
            class = %class,
            declared = declared.len(),
            fake_overrides = fake_overrides.len(),
            "scope built"
        );
        Ok(ClassScope {
            class,
            declared,
            fake_overrides,
        })
    }

    /// Merge candidates that lower the same semantic member and drop those
    /// overridden by a sibling candidate. A merged candidate keeps the nodes
    /// of every path it was inherited through.
    fn collapse(
        &self,
        session: &LoweringSession,
        class: SemDeclId,
        candidates: SmallVec<[Candidate; 2]>,
    ) -> SmallVec<[Candidate; 2]> {
        let tree = session.tree();
        let mut unique: SmallVec<[Candidate; 2]> = SmallVec::new();
        for candidate in candidates {
            match unique.iter_mut().find(|c| c.member.sem == candidate.member.sem) {
                Some(first) => {
                    if first.return_type == candidate.return_type {
                        if !first.links.contains(&candidate.member.link) {
                            first.links.push(candidate.member.link);
                        }
                    } else {
                        self.report(
                            session,
                            Diagnostic::from_message(
                                diagnostic_messages::INCONSISTENT_INHERITED_SIGNATURE,
                                member_subject(tree, class, first.member.sem),
                                &[
                                    &tree.qualified_name(class),
                                    tree.decl_name(first.member.sem),
                                    &tree.qualified_name(first.via),
                                ],
                            ),
                        );
                    }
                }
                None => unique.push(candidate),
            }
        }

        let declaring: SmallVec<[SemDeclId; 2]> = unique.iter().map(|c| c.member.declaring).collect();
        unique.retain(|c| {
            !declaring
                .iter()
                .any(|&other| hierarchy::is_proper_subclass(tree, other, c.member.declaring))
        });
        unique
    }

    /// Pick the target among collapsed candidates, reporting conflicts.
    fn choose<'c>(
        &self,
        session: &LoweringSession,
        class: SemDeclId,
        candidates: &'c [Candidate],
    ) -> Option<&'c Candidate> {
        let tree = session.tree();
        let first = candidates.first()?;
        if candidates.len() == 1 {
            return Some(first);
        }
        let second = &candidates[1];
        let subject = member_subject(tree, class, first.member.sem);
        let names = [
            tree.qualified_name(class),
            tree.decl_name(first.member.sem).to_string(),
            tree.qualified_name(first.member.declaring),
            tree.qualified_name(second.member.declaring),
        ];
        let args: [&str; 4] = [&names[0], &names[1], &names[2], &names[3]];
        let related = member_subject(tree, second.member.declaring, second.member.sem);

        let implementations = candidates.iter().filter(|c| !c.member.is_abstract).count();
        if implementations > 1 {
            self.report(
                session,
                Diagnostic::from_message(
                    diagnostic_messages::CONFLICTING_INHERITED_IMPLEMENTATIONS,
                    subject,
                    &args,
                )
                .with_related(related, "Also inherited from here."),
            );
            return Some(first);
        }
        // A single inherited implementation is the target whatever the
        // abstract candidates declare.
        if implementations == 1 {
            return candidates.iter().find(|c| !c.member.is_abstract);
        }

        let most_specific = candidates.iter().find(|c| {
            candidates
                .iter()
                .all(|other| hierarchy::is_subtype(tree, &c.return_type, &other.return_type))
        });
        match most_specific {
            Some(chosen) => Some(chosen),
            None => {
                self.report(
                    session,
                    Diagnostic::from_message(diagnostic_messages::AMBIGUOUS_INHERITED_MEMBER, subject, &args)
                        .with_related(related, "Also inherited from here."),
                );
                Some(first)
            }
        }
    }

    fn report(&self, session: &LoweringSession, diagnostic: Diagnostic) {
        warn!(code = diagnostic.code, subject = %diagnostic.subject, "override conflict");
        if session.options().report_override_conflicts {
            session.sink().report(diagnostic);
        }
    }
}

fn member_subject(tree: &SemanticTree, class: SemDeclId, member: SemDeclId) -> String {
    format!("{}.{}", tree.qualified_name(class), tree.decl_name(member))
}

fn first_via(candidates: &[Candidate], sem: SemDeclId) -> SemDeclId {
    candidates
        .iter()
        .find(|c| c.member.sem == sem)
        .map_or(sem, |c| c.via)
}

#[cfg(test)]
#[path = "../tests/fake_override_tests.rs"]
mod tests;
